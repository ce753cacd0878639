//! Runner configuration for apiprobe
//!
//! Hierarchical configuration with discovery and precedence: CLI > file > defaults.
//! See [`Config`] for the TOML layout.

mod config;

pub use config::*;
