use super::patches::builtin;
use crate::application_port::Migration;
use crate::domain_model::DefinitionError;

pub struct MigrationRegistry {
    migrations: Vec<Migration>,
}

impl MigrationRegistry {
    pub fn new(migrations: Vec<Migration>) -> Self {
        Self { migrations }
    }

    pub fn builtin() -> Result<Self, DefinitionError> {
        Ok(Self::new(builtin()?))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.migrations.iter().map(|m| m.name).collect()
    }

    pub fn find(&self, name: &str) -> Option<&Migration> {
        self.migrations.iter().find(|m| m.name == name)
    }

    pub fn all(&self) -> &[Migration] {
        &self.migrations
    }
}
