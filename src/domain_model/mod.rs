mod schema;
mod session;
mod user;

pub use schema::*;
pub use session::*;
pub use user::*;
