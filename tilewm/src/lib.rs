//! The `tilewm` front end: the TOML configuration and logging setup shared by the binaries.
pub mod config;
pub mod utils;

pub use config::{Config, load};
