//! Test configuration documents for apiprobe
//!
//! - [`rules`] maps one declared parameter to its input generator
//! - [`ConfigRuleEngine`] builds a whole document from an API description
//! - [`io`] persists and reloads documents as YAML

pub mod filter;
pub mod generator;
pub mod io;
pub mod model;
pub mod rules;

pub use filter::Filter;
pub use generator::ConfigRuleEngine;
pub use model::{
    AuthSpec, GenParameter, GeneratorKind, GeneratorSpec, HeaderParam, Operation, QueryParam,
    TestConfiguration, TestConfigurationDocument, TestParameter, TestPath,
};
