//! Configuration module for sprite-pack
//!
//! Provides types, discovery and parsing for `spack.toml` project configuration.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
