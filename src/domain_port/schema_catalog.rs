use super::StoreError;
use crate::domain_model::*;

/// Live schema introspection and mutation for one database.
///
/// `apply` and `revert` must each issue a single statement, so a change is
/// either fully present or fully absent afterwards.
#[async_trait::async_trait]
pub trait SchemaCatalog: Send + Sync {
    async fn table_exists(&self, table: &TableName) -> Result<bool, StoreError>;

    async fn column_exists(&self, table: &TableName, column: &Ident) -> Result<bool, StoreError>;

    async fn index_exists(&self, table: &TableName, index: &Ident) -> Result<bool, StoreError>;

    async fn apply(&self, descriptor: &SchemaChangeDescriptor) -> Result<(), StoreError>;

    async fn revert(&self, descriptor: &SchemaChangeDescriptor) -> Result<(), StoreError>;
}
