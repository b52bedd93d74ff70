mod auth_service;
mod schema_evolver;

pub use auth_service::*;
pub use schema_evolver::*;
