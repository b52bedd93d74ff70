use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;
use std::fmt::Write;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Debug, Clone, Default)]
struct TableState {
    columns: Vec<(Ident, String)>,
    indexes: Vec<(Ident, String)>,
}

impl TableState {
    fn has_column(&self, name: &Ident) -> bool {
        self.columns.iter().any(|(c, _)| c == name)
    }

    fn has_index(&self, name: &Ident) -> bool {
        self.indexes.iter().any(|(i, _)| i == name)
    }
}

/// Schema catalog kept in memory. Mirrors the MySQL rules that matter for
/// evolution: duplicate names and unknown referenced columns are rejected.
#[derive(Default)]
pub struct MemorySchemaCatalog {
    tables: DashMap<String, TableState>,
    mutations: AtomicUsize,
    fail_introspection: AtomicBool,
    fail_mutation: AtomicBool,
}

impl MemorySchemaCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&self, table: &str, columns: &[&str]) -> Result<(), DefinitionError> {
        let mut state = TableState::default();
        for column in columns {
            state.columns.push((Ident::new(*column)?, String::new()));
        }
        self.tables.insert(Ident::new(table)?.to_string(), state);
        Ok(())
    }

    /// Number of mutation statements executed.
    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    pub fn set_fail_introspection(&self, fail: bool) {
        self.fail_introspection.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_mutation(&self, fail: bool) {
        self.fail_mutation.store(fail, Ordering::SeqCst);
    }

    pub fn columns(&self, table: &str) -> Vec<String> {
        self.tables
            .get(table)
            .map(|t| t.columns.iter().map(|(c, _)| c.to_string()).collect())
            .unwrap_or_default()
    }

    /// Deterministic textual dump of every table.
    pub fn snapshot(&self) -> String {
        let mut names: Vec<String> = self.tables.iter().map(|t| t.key().clone()).collect();
        names.sort();

        let mut out = String::new();
        for name in names {
            if let Some(table) = self.tables.get(&name) {
                let _ = writeln!(out, "TABLE {name}");
                for (column, definition) in &table.columns {
                    let _ = writeln!(out, "  COLUMN {column} {definition}");
                }
                for (index, definition) in &table.indexes {
                    let _ = writeln!(out, "  INDEX {index} {definition}");
                }
            }
        }
        out
    }

    fn check_introspection(&self) -> Result<(), StoreError> {
        if self.fail_introspection.load(Ordering::SeqCst) {
            return Err(StoreError::new("introspect", "metadata unavailable"));
        }
        Ok(())
    }

    fn lookup<T>(
        &self,
        table: &TableName,
        f: impl FnOnce(&TableState) -> T,
    ) -> Result<Option<T>, StoreError> {
        self.check_introspection()?;
        Ok(self.tables.get(table.as_str()).map(|t| f(t.value())))
    }

    fn mutate(
        &self,
        table: &TableName,
        f: impl FnOnce(&mut TableState) -> Result<(), String>,
    ) -> Result<(), StoreError> {
        if self.fail_mutation.load(Ordering::SeqCst) {
            return Err(StoreError::new("alter table", "lock wait timeout exceeded"));
        }
        let mut entry = self
            .tables
            .get_mut(table.as_str())
            .ok_or_else(|| StoreError::new("alter table", format!("table `{table}` doesn't exist")))?;

        // Work on a copy so a rejected statement leaves the table untouched.
        let mut next = entry.value().clone();
        f(&mut next).map_err(|e| StoreError::new("alter table", e))?;
        *entry.value_mut() = next;
        self.mutations.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn add_column(state: &mut TableState, column: &ColumnSpec) -> Result<(), String> {
    if state.has_column(&column.name) {
        return Err(format!("duplicate column name '{}'", column.name));
    }
    let entry = (column.name.clone(), format!("{:?}", column));
    match &column.position {
        ColumnPosition::Last => state.columns.push(entry),
        ColumnPosition::First => state.columns.insert(0, entry),
        ColumnPosition::After(other) => {
            let at = state
                .columns
                .iter()
                .position(|(c, _)| c == other)
                .ok_or_else(|| format!("unknown column '{other}'"))?;
            state.columns.insert(at + 1, entry);
        }
    }
    Ok(())
}

fn add_index(state: &mut TableState, index: &IndexSpec) -> Result<(), String> {
    if state.has_index(&index.name) {
        return Err(format!("duplicate key name '{}'", index.name));
    }
    if let Some(part) = index.parts.iter().find(|p| !state.has_column(&p.column)) {
        return Err(format!("key column '{}' doesn't exist in table", part.column));
    }
    state
        .indexes
        .push((index.name.clone(), format!("{:?}", index)));
    Ok(())
}

#[async_trait::async_trait]
impl SchemaCatalog for MemorySchemaCatalog {
    async fn table_exists(&self, table: &TableName) -> Result<bool, StoreError> {
        Ok(self.lookup(table, |_| ())?.is_some())
    }

    async fn column_exists(&self, table: &TableName, column: &Ident) -> Result<bool, StoreError> {
        Ok(self.lookup(table, |t| t.has_column(column))?.unwrap_or(false))
    }

    async fn index_exists(&self, table: &TableName, index: &Ident) -> Result<bool, StoreError> {
        Ok(self.lookup(table, |t| t.has_index(index))?.unwrap_or(false))
    }

    async fn apply(&self, descriptor: &SchemaChangeDescriptor) -> Result<(), StoreError> {
        self.mutate(&descriptor.target_table, |state| match &descriptor.change {
            SchemaChange::AddColumn(column) => add_column(state, column),
            SchemaChange::AddIndex(index) => add_index(state, index),
        })
    }

    async fn revert(&self, descriptor: &SchemaChangeDescriptor) -> Result<(), StoreError> {
        self.mutate(&descriptor.target_table, |state| match &descriptor.change {
            SchemaChange::AddColumn(column) => {
                let before = state.columns.len();
                state.columns.retain(|(c, _)| c != &column.name);
                if state.columns.len() == before {
                    return Err(format!("can't drop '{}'; check that it exists", column.name));
                }
                Ok(())
            }
            SchemaChange::AddIndex(index) => {
                let before = state.indexes.len();
                state.indexes.retain(|(i, _)| i != &index.name);
                if state.indexes.len() == before {
                    return Err(format!("can't drop '{}'; check that it exists", index.name));
                }
                Ok(())
            }
        })
    }
}
