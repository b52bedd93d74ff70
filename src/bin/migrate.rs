//! Operator entry point for the built-in schema migrations.
//!
//! $ cargo run --bin keystone-migrate -- --settings=settings/dev.toml
//! $ cargo run --bin keystone-migrate -- --migration finance_manual_status --rollback

use clap::Parser;
use keystone::application_impl::RealSchemaEvolver;
use keystone::application_port::*;
use keystone::infra_mysql::MySqlSchemaCatalog;
use keystone::logger::*;
use keystone::migrations::MigrationRegistry;
use keystone::settings::parse_settings;
use sqlx::mysql::MySqlPoolOptions;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "keystone-migrate")]
struct MigrateCli {
    #[arg(long)]
    settings: Option<String>,
    /// Migration to run; repeat to run several. Runs all when omitted.
    #[arg(long = "migration")]
    migrations: Vec<String>,
    #[arg(long)]
    rollback: bool,
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = MigrateCli::parse();

    let logger = Logger::new_bootstrap();
    let settings = parse_settings(cli.settings.as_deref())?;
    logger.reload_from_config(&LogConfig::from(&settings.log))?;

    let registry = MigrationRegistry::builtin()?;
    if cli.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let selected: Vec<&Migration> = if cli.migrations.is_empty() {
        registry.all().iter().collect()
    } else {
        cli.migrations
            .iter()
            .map(|name| {
                registry
                    .find(name)
                    .ok_or_else(|| anyhow::anyhow!("unknown migration: {name}"))
            })
            .collect::<anyhow::Result<_>>()?
    };

    let pool = MySqlPoolOptions::new()
        .max_connections(1)
        .connect(&settings.database.url)
        .await?;
    let evolver = RealSchemaEvolver::new(Arc::new(MySqlSchemaCatalog::new(pool.clone())));

    let direction = if cli.rollback {
        MigrationDirection::Down
    } else {
        MigrationDirection::Up
    };

    let mut failed = false;
    for migration in selected {
        let report = evolver.run_migration(migration, direction).await;
        println!("{report}");
        if !report.completed {
            failed = true;
            break;
        }
    }

    pool.close().await;

    if failed {
        return Err(anyhow::anyhow!("migration failed"));
    }
    Ok(())
}
