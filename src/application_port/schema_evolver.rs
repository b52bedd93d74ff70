use crate::domain_model::*;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    Introspection,
    Mutation,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Introspection => f.write_str("introspection"),
            FailureStage::Mutation => f.write_str("mutation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    #[error("schema operation on `{table}` failed during {stage}: {cause}")]
    OperationFailed {
        stage: FailureStage,
        table: String,
        cause: String,
    },
}

impl SchemaError {
    pub fn stage(&self) -> FailureStage {
        match self {
            SchemaError::OperationFailed { stage, .. } => *stage,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationDirection {
    Up,
    Down,
}

/// A named, ordered group of schema changes shipped together.
#[derive(Debug, Clone)]
pub struct Migration {
    pub name: &'static str,
    pub changes: Vec<SchemaChangeDescriptor>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ChangeStatus {
    Applied,
    AlreadyApplied,
    Reverted,
    AlreadyAbsent,
    Failed { stage: FailureStage, error: String },
}

impl From<SchemaChangeOutcome> for ChangeStatus {
    fn from(outcome: SchemaChangeOutcome) -> Self {
        match outcome {
            SchemaChangeOutcome::Applied => ChangeStatus::Applied,
            SchemaChangeOutcome::AlreadyApplied => ChangeStatus::AlreadyApplied,
        }
    }
}

impl From<RevertOutcome> for ChangeStatus {
    fn from(outcome: RevertOutcome) -> Self {
        match outcome {
            RevertOutcome::Reverted => ChangeStatus::Reverted,
            RevertOutcome::AlreadyAbsent => ChangeStatus::AlreadyAbsent,
        }
    }
}

impl From<SchemaError> for ChangeStatus {
    fn from(error: SchemaError) -> Self {
        ChangeStatus::Failed {
            stage: error.stage(),
            error: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangeReport {
    pub table: TableName,
    pub kind: ChangeKind,
    pub object: Ident,
    #[serde(flatten)]
    pub status: ChangeStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub migration: String,
    pub direction: MigrationDirection,
    pub changes: Vec<ChangeReport>,
    pub completed: bool,
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, ">>> {} ({:?})", self.migration, self.direction)?;
        for change in &self.changes {
            let status = match &change.status {
                ChangeStatus::Applied => "applied".to_string(),
                ChangeStatus::AlreadyApplied => "already applied".to_string(),
                ChangeStatus::Reverted => "reverted".to_string(),
                ChangeStatus::AlreadyAbsent => "already absent".to_string(),
                ChangeStatus::Failed { error, .. } => format!("FAILED: {error}"),
            };
            writeln!(f, "    {}.{}: {}", change.table, change.object, status)?;
        }
        if self.completed {
            write!(f, "Migration completed successfully.")
        } else {
            write!(f, "Migration stopped after a failure.")
        }
    }
}

#[async_trait::async_trait]
pub trait SchemaEvolver: Send + Sync {
    async fn ensure_schema_change(
        &self,
        descriptor: &SchemaChangeDescriptor,
    ) -> Result<SchemaChangeOutcome, SchemaError>;

    async fn revert_schema_change(
        &self,
        descriptor: &SchemaChangeDescriptor,
    ) -> Result<RevertOutcome, SchemaError>;

    /// Runs every change in order (reverse order for `Down`), stopping at the
    /// first failure.
    async fn run_migration(
        &self,
        migration: &Migration,
        direction: MigrationDirection,
    ) -> MigrationReport {
        let mut report = MigrationReport {
            migration: migration.name.to_string(),
            direction,
            changes: Vec::with_capacity(migration.changes.len()),
            completed: true,
        };

        let ordered: Vec<&SchemaChangeDescriptor> = match direction {
            MigrationDirection::Up => migration.changes.iter().collect(),
            MigrationDirection::Down => migration.changes.iter().rev().collect(),
        };

        for descriptor in ordered {
            let status = match direction {
                MigrationDirection::Up => self
                    .ensure_schema_change(descriptor)
                    .await
                    .map(ChangeStatus::from),
                MigrationDirection::Down => self
                    .revert_schema_change(descriptor)
                    .await
                    .map(ChangeStatus::from),
            }
            .unwrap_or_else(ChangeStatus::from);

            let failed = matches!(status, ChangeStatus::Failed { .. });
            report.changes.push(ChangeReport {
                table: descriptor.target_table.clone(),
                kind: descriptor.kind(),
                object: descriptor.change.object_name().clone(),
                status,
            });
            if failed {
                report.completed = false;
                break;
            }
        }

        report
    }
}
