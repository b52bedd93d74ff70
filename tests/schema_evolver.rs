use keystone::application_impl::RealSchemaEvolver;
use keystone::application_port::*;
use keystone::domain_model::*;
use keystone::infra_memory::MemorySchemaCatalog;
use keystone::migrations::MigrationRegistry;
use std::sync::Arc;

fn setup() -> (Arc<MemorySchemaCatalog>, RealSchemaEvolver) {
    let catalog = Arc::new(MemorySchemaCatalog::new());
    (catalog.clone(), RealSchemaEvolver::new(catalog))
}

fn share_enabled() -> SchemaChangeDescriptor {
    SchemaChangeDescriptor::add_column(
        "deliverables",
        "share_enabled TINYINT default 1".parse().unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn share_enabled_scenario() {
    let (catalog, evolver) = setup();
    catalog.create_table("deliverables", &["id", "title"]).unwrap();
    let change = share_enabled();

    let first = evolver.ensure_schema_change(&change).await.unwrap();
    let after_first = catalog.snapshot();
    let second = evolver.ensure_schema_change(&change).await.unwrap();

    assert_eq!(first, SchemaChangeOutcome::Applied);
    assert_eq!(second, SchemaChangeOutcome::AlreadyApplied);
    assert_eq!(catalog.snapshot(), after_first);
    assert_eq!(catalog.mutations(), 1);
    assert_eq!(
        catalog.columns("deliverables"),
        vec!["id", "title", "share_enabled"]
    );
}

#[tokio::test]
async fn present_change_issues_no_mutation() {
    let (catalog, evolver) = setup();
    catalog.create_table("deliverables", &["id", "share_enabled"]).unwrap();

    let outcome = evolver.ensure_schema_change(&share_enabled()).await.unwrap();

    assert_eq!(outcome, SchemaChangeOutcome::AlreadyApplied);
    assert_eq!(catalog.mutations(), 0);
}

#[tokio::test]
async fn index_is_added_once() {
    let (catalog, evolver) = setup();
    catalog.create_table("finance_contracts", &["id", "manual_status"]).unwrap();
    let change = SchemaChangeDescriptor::add_index(
        "finance_contracts",
        IndexSpec::new(
            "idx_manual_status",
            vec![IndexPart::column("manual_status").unwrap()],
        )
        .unwrap(),
    )
    .unwrap();

    assert_eq!(
        evolver.ensure_schema_change(&change).await.unwrap(),
        SchemaChangeOutcome::Applied
    );
    assert_eq!(
        evolver.ensure_schema_change(&change).await.unwrap(),
        SchemaChangeOutcome::AlreadyApplied
    );
    assert_eq!(catalog.mutations(), 1);
}

#[tokio::test]
async fn missing_table_fails_during_introspection() {
    let (catalog, evolver) = setup();

    let err = evolver.ensure_schema_change(&share_enabled()).await.unwrap_err();

    assert_eq!(err.stage(), FailureStage::Introspection);
    assert!(err.to_string().contains("deliverables"));
    assert_eq!(catalog.mutations(), 0);
}

#[tokio::test]
async fn failure_stage_tracks_where_it_happened() {
    let (catalog, evolver) = setup();
    catalog.create_table("deliverables", &["id"]).unwrap();

    catalog.set_fail_introspection(true);
    let err = evolver.ensure_schema_change(&share_enabled()).await.unwrap_err();
    assert_eq!(err.stage(), FailureStage::Introspection);

    catalog.set_fail_introspection(false);
    catalog.set_fail_mutation(true);
    let before = catalog.snapshot();
    let err = evolver.ensure_schema_change(&share_enabled()).await.unwrap_err();
    assert_eq!(err.stage(), FailureStage::Mutation);
    assert_eq!(catalog.snapshot(), before);
}

#[tokio::test]
async fn revert_is_idempotent() {
    let (catalog, evolver) = setup();
    catalog.create_table("deliverables", &["id"]).unwrap();
    let change = share_enabled();
    let pristine = catalog.snapshot();

    evolver.ensure_schema_change(&change).await.unwrap();
    assert_eq!(
        evolver.revert_schema_change(&change).await.unwrap(),
        RevertOutcome::Reverted
    );
    assert_eq!(
        evolver.revert_schema_change(&change).await.unwrap(),
        RevertOutcome::AlreadyAbsent
    );
    assert_eq!(catalog.snapshot(), pristine);
    assert_eq!(catalog.mutations(), 2);
}

#[tokio::test]
async fn builtin_migration_runs_up_then_down() {
    let (catalog, evolver) = setup();
    catalog.create_table("finance_installments", &["id", "status", "amount"]).unwrap();
    catalog.create_table("finance_contracts", &["id", "status"]).unwrap();
    let pristine = catalog.snapshot();
    let registry = MigrationRegistry::builtin().unwrap();
    let migration = registry.find("finance_manual_status").unwrap();

    let up = evolver.run_migration(migration, MigrationDirection::Up).await;
    assert!(up.completed);
    assert_eq!(up.changes.len(), 4);
    assert!(up
        .changes
        .iter()
        .all(|c| matches!(c.status, ChangeStatus::Applied)));
    assert_eq!(
        catalog.columns("finance_installments"),
        vec!["id", "status", "manual_status", "amount"]
    );

    let again = evolver.run_migration(migration, MigrationDirection::Up).await;
    assert!(again
        .changes
        .iter()
        .all(|c| matches!(c.status, ChangeStatus::AlreadyApplied)));

    let down = evolver
        .run_migration(migration, MigrationDirection::Down)
        .await;
    assert!(down.completed);
    // indexes are dropped before the columns they cover
    assert_eq!(down.changes[0].kind, ChangeKind::AddIndex);
    assert_eq!(down.changes[0].table.as_str(), "finance_contracts");
    assert_eq!(catalog.snapshot(), pristine);
}

#[tokio::test]
async fn migration_stops_at_first_failure() {
    // customer_files lacks the `category` column the new column is placed after
    let (catalog, evolver) = setup();
    catalog.create_table("customer_files", &["id", "customer_id"]).unwrap();
    let registry = MigrationRegistry::builtin().unwrap();
    let migration = registry.find("customer_files_folder_path").unwrap();

    let report = evolver.run_migration(migration, MigrationDirection::Up).await;

    assert!(!report.completed);
    assert_eq!(report.changes.len(), 1);
    match &report.changes[0].status {
        ChangeStatus::Failed { stage, .. } => assert_eq!(*stage, FailureStage::Mutation),
        other => panic!("unexpected status: {other:?}"),
    }
    assert_eq!(catalog.mutations(), 0);
    assert!(report.to_string().contains("stopped after a failure"));
}

#[tokio::test]
async fn commented_column_with_unique_index_applies_once() {
    let (catalog, evolver) = setup();
    catalog
        .create_table("customers", &["id", "customer_code", "name"])
        .unwrap();
    let registry = MigrationRegistry::builtin().unwrap();
    let migration = registry.find("customers_group_code").unwrap();

    let up = evolver.run_migration(migration, MigrationDirection::Up).await;
    let snapshot = catalog.snapshot();
    let again = evolver.run_migration(migration, MigrationDirection::Up).await;

    assert!(up.completed && again.completed);
    assert!(up
        .changes
        .iter()
        .all(|c| matches!(c.status, ChangeStatus::Applied)));
    assert!(again
        .changes
        .iter()
        .all(|c| matches!(c.status, ChangeStatus::AlreadyApplied)));
    assert_eq!(catalog.snapshot(), snapshot);
    assert_eq!(
        catalog.columns("customers"),
        vec!["id", "customer_code", "group_code", "name"]
    );
}
