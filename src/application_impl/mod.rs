mod auth_service_fake;
mod auth_service_impl;
mod schema_evolver_impl;

pub use auth_service_fake::*;
pub use auth_service_impl::*;
pub use schema_evolver_impl::*;
