//! OpenAPI/Swagger document model for apiprobe
//!
//! Loads Swagger 2.0 and OpenAPI 3.x documents (YAML or JSON) into an
//! [`ApiSpec`] that keeps paths and operations in declaration order and
//! flattens every parameter into a [`ParameterDescriptor`].

mod loader;
mod model;

pub use loader::{load_spec, parse_spec};
pub use model::{
    ApiSpec, HttpMethod, OperationSpec, ParamType, ParameterDescriptor, ParameterLocation,
    PathSpec,
};
