//! Command-line interface for apiprobe
//!
//! ## Module Structure
//!
//! - `args`: CLI argument definitions and parsing structures (clap)
//! - `run`: Main entry point and command dispatch
//! - `commands`: Command implementations
//! - `report`: Error output

pub mod args;
mod commands;
mod report;
mod run;

pub use args::{Cli, Commands};
pub use run::run;
