//! In-process backends for local development and tests.

mod credential_repo_memory;
mod schema_catalog_memory;
mod session_store_memory;

pub use credential_repo_memory::*;
pub use schema_catalog_memory::*;
pub use session_store_memory::*;
