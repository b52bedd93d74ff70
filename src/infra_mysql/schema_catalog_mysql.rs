use super::ddl::{alter_statement, revert_statement};
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use sqlx::MySqlPool;

/// Introspects through `information_schema` for the connection's current
/// database. Names are always bound as parameters there; only the validated
/// identifiers of a descriptor reach DDL text.
pub struct MySqlSchemaCatalog {
    pool: MySqlPool,
}

impl MySqlSchemaCatalog {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlSchemaCatalog { pool }
    }

    async fn execute_ddl(&self, sql: String, context: &'static str) -> Result<(), StoreError> {
        debug!(%sql, "executing ddl");
        sqlx::raw_sql(&sql)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::new(context, e))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl SchemaCatalog for MySqlSchemaCatalog {
    async fn table_exists(&self, table: &TableName) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
SELECT COUNT(*)
FROM information_schema.TABLES
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?
"#,
        )
        .bind(table.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::new("query information_schema.TABLES", e))?;

        Ok(count > 0)
    }

    async fn column_exists(&self, table: &TableName, column: &Ident) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
SELECT COUNT(*)
FROM information_schema.COLUMNS
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND COLUMN_NAME = ?
"#,
        )
        .bind(table.as_str())
        .bind(column.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::new("query information_schema.COLUMNS", e))?;

        Ok(count > 0)
    }

    async fn index_exists(&self, table: &TableName, index: &Ident) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
SELECT COUNT(*)
FROM information_schema.STATISTICS
WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ?
"#,
        )
        .bind(table.as_str())
        .bind(index.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::new("query information_schema.STATISTICS", e))?;

        Ok(count > 0)
    }

    async fn apply(&self, descriptor: &SchemaChangeDescriptor) -> Result<(), StoreError> {
        self.execute_ddl(alter_statement(descriptor), "alter table").await
    }

    async fn revert(&self, descriptor: &SchemaChangeDescriptor) -> Result<(), StoreError> {
        self.execute_ddl(revert_statement(descriptor), "alter table").await
    }
}
