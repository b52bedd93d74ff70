// store

mod session_store;

pub use session_store::*;

// repo

mod credential_repo;
mod schema_catalog;
mod store_error;

pub use credential_repo::*;
pub use schema_catalog::*;
pub use store_error::*;
