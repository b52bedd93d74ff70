//! Settings come from a TOML file, optionally overridden through
//! `KEYSTONE__<SECTION>__<KEY>` environment variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
