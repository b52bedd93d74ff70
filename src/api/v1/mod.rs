mod access;
mod error;
mod handler;
mod router;

pub use access::*;
pub use error::recover_error;
pub use router::routes;
