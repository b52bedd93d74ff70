use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use std::sync::Arc;

/// Check-then-alter evolver.
///
/// The check and the alter are separate statements with nothing held in
/// between, so two concurrent runs of the same change can both observe it as
/// absent; the loser then fails at the storage layer with a duplicate
/// column/index error.
pub struct RealSchemaEvolver {
    catalog: Arc<dyn SchemaCatalog>,
}

impl RealSchemaEvolver {
    pub fn new(catalog: Arc<dyn SchemaCatalog>) -> Self {
        Self { catalog }
    }

    fn failed(stage: FailureStage, table: &TableName, e: StoreError) -> SchemaError {
        error!(%table, %stage, error = %e, "schema operation failed");
        SchemaError::OperationFailed {
            stage,
            table: table.to_string(),
            cause: e.to_string(),
        }
    }

    /// Moves the run to `Failed` and traces the transition.
    fn abandon(
        descriptor: &SchemaChangeDescriptor,
        from: EvolutionState,
        error: SchemaError,
    ) -> SchemaError {
        let state = EvolutionState::Failed;
        debug!(change = %descriptor, ?from, ?state, "abandoned");
        error
    }

    async fn is_present(&self, descriptor: &SchemaChangeDescriptor) -> Result<bool, SchemaError> {
        let table = &descriptor.target_table;

        let table_exists = self
            .catalog
            .table_exists(table)
            .await
            .map_err(|e| Self::failed(FailureStage::Introspection, table, e))?;
        if !table_exists {
            return Err(Self::failed(
                FailureStage::Introspection,
                table,
                StoreError::new("introspect", format!("table `{table}` does not exist")),
            ));
        }

        let present = match &descriptor.change {
            SchemaChange::AddColumn(column) => {
                self.catalog.column_exists(table, &column.name).await
            }
            SchemaChange::AddIndex(index) => self.catalog.index_exists(table, &index.name).await,
        };
        present.map_err(|e| Self::failed(FailureStage::Introspection, table, e))
    }
}

#[async_trait::async_trait]
impl SchemaEvolver for RealSchemaEvolver {
    async fn ensure_schema_change(
        &self,
        descriptor: &SchemaChangeDescriptor,
    ) -> Result<SchemaChangeOutcome, SchemaError> {
        let mut state = EvolutionState::NotChecked;

        let present = match self.is_present(descriptor).await {
            Ok(present) => present,
            Err(e) => return Err(Self::abandon(descriptor, state, e)),
        };
        state = state.after_check(present);
        debug!(change = %descriptor, ?state, "introspected");

        if !present {
            if let Err(e) = self.catalog.apply(descriptor).await {
                let e = Self::failed(FailureStage::Mutation, &descriptor.target_table, e);
                return Err(Self::abandon(descriptor, state, e));
            }
        }

        state = state.finish();
        debug!(change = %descriptor, ?state, "finished");

        match state {
            EvolutionState::Applied => {
                info!(change = %descriptor, "schema change applied");
                Ok(SchemaChangeOutcome::Applied)
            }
            EvolutionState::NoOp => Ok(SchemaChangeOutcome::AlreadyApplied),
            other => Err(SchemaError::OperationFailed {
                stage: FailureStage::Mutation,
                table: descriptor.target_table.to_string(),
                cause: format!("evolution ended in unexpected state {other:?}"),
            }),
        }
    }

    async fn revert_schema_change(
        &self,
        descriptor: &SchemaChangeDescriptor,
    ) -> Result<RevertOutcome, SchemaError> {
        if !self.is_present(descriptor).await? {
            debug!(change = %descriptor, "nothing to revert");
            return Ok(RevertOutcome::AlreadyAbsent);
        }

        self.catalog
            .revert(descriptor)
            .await
            .map_err(|e| Self::failed(FailureStage::Mutation, &descriptor.target_table, e))?;

        info!(change = %descriptor, "schema change reverted");
        Ok(RevertOutcome::Reverted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra_memory::MemorySchemaCatalog;
    use std::io;
    use std::sync::Mutex;

    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLog {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture() -> (CapturedLog, tracing::subscriber::DefaultGuard) {
        let log = CapturedLog::default();
        let writer = log.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (log, tracing::subscriber::set_default(subscriber))
    }

    fn change() -> SchemaChangeDescriptor {
        SchemaChangeDescriptor::add_column(
            "deliverables",
            "share_enabled TINYINT default 1".parse().unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn mutation_failure_is_traced_as_failed_state() {
        let (log, _guard) = capture();
        let catalog = Arc::new(MemorySchemaCatalog::new());
        catalog.create_table("deliverables", &["id"]).unwrap();
        catalog.set_fail_mutation(true);
        let evolver = RealSchemaEvolver::new(catalog);

        let err = evolver.ensure_schema_change(&change()).await.unwrap_err();

        assert_eq!(err.stage(), FailureStage::Mutation);
        let text = log.text();
        assert!(text.contains("from=CheckedAbsent"), "{text}");
        assert!(text.contains("state=Failed"), "{text}");
    }

    #[tokio::test]
    async fn introspection_failure_is_traced_as_failed_state() {
        let (log, _guard) = capture();
        let evolver = RealSchemaEvolver::new(Arc::new(MemorySchemaCatalog::new()));

        let err = evolver.ensure_schema_change(&change()).await.unwrap_err();

        assert_eq!(err.stage(), FailureStage::Introspection);
        let text = log.text();
        assert!(text.contains("from=NotChecked"), "{text}");
        assert!(text.contains("state=Failed"), "{text}");
    }

    #[tokio::test]
    async fn present_change_finishes_as_noop() {
        let (log, _guard) = capture();
        let catalog = Arc::new(MemorySchemaCatalog::new());
        catalog.create_table("deliverables", &["id", "share_enabled"]).unwrap();
        let evolver = RealSchemaEvolver::new(catalog);

        let outcome = evolver.ensure_schema_change(&change()).await.unwrap();

        assert_eq!(outcome, SchemaChangeOutcome::AlreadyApplied);
        assert!(log.text().contains("state=NoOp"));
    }
}
