mod credential_repo_mysql;
mod ddl;
mod schema_catalog_mysql;

pub use credential_repo_mysql::*;
pub use ddl::*;
pub use schema_catalog_mysql::*;

mod util;
