//! Schema patches shipped with the application. Each one is safe to run again
//! after it has been applied.

mod patches;
mod registry;

pub use patches::*;
pub use registry::*;
