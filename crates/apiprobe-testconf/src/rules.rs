//! Generator rule table
//!
//! Pure mapping from one declared parameter to the generator that feeds it.
//! Query and path parameters get a typed generator; every other location gets
//! a two-value placeholder list that users are expected to edit.

use apiprobe_openapi::{ParamType, ParameterDescriptor};
use apiprobe_utils::error::TestConfError;
use std::fmt;

use crate::model::{GeneratorKind, GeneratorSpec, TestParameter};

/// Weight given to parameters the API does not require
pub const OPTIONAL_PARAMETER_WEIGHT: f32 = 0.5;

/// Placeholder values for parameters outside query and path
pub const FALLBACK_VALUES: [&str; 2] = ["value 1", "value 2"];

/// Type a query/path parameter resolves to before dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedType {
    String,
    Number,
    Integer,
    Boolean,
    Enum(Vec<String>),
    /// No generator exists for this type
    Unsupported(String),
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Integer => write!(f, "integer"),
            Self::Boolean => write!(f, "boolean"),
            Self::Enum(_) => write!(f, "enum"),
            Self::Unsupported(name) => write!(f, "{name}"),
        }
    }
}

/// Resolve the type of a query/path parameter
///
/// Arrays resolve to their item type; a non-empty enumeration overrides
/// whatever was declared.
#[must_use]
pub fn resolve_type(descriptor: &ParameterDescriptor) -> ResolvedType {
    if !descriptor.enum_values.is_empty() {
        return ResolvedType::Enum(descriptor.enum_values.clone());
    }

    let effective = match &descriptor.declared_type {
        ParamType::Array(Some(item)) => item.as_ref(),
        other => other,
    };

    match effective {
        ParamType::String => ResolvedType::String,
        ParamType::Number => ResolvedType::Number,
        ParamType::Integer => ResolvedType::Integer,
        ParamType::Boolean => ResolvedType::Boolean,
        other => ResolvedType::Unsupported(other.to_string()),
    }
}

/// Weight for a parameter given whether it is required
#[must_use]
pub const fn weight_for(required: bool) -> Option<f32> {
    if required {
        None
    } else {
        Some(OPTIONAL_PARAMETER_WEIGHT)
    }
}

/// Generator specification for one parameter
///
/// # Errors
/// Returns `TestConfError::UnsupportedParameterType` when a query or path
/// parameter resolves to a type without a generator.
pub fn generator_spec_for(descriptor: &ParameterDescriptor) -> Result<GeneratorSpec, TestConfError> {
    if !descriptor.location.is_query_or_path() {
        return Ok(GeneratorSpec::new(GeneratorKind::RandomInputValue)
            .with_param("values", FALLBACK_VALUES));
    }

    let spec = match resolve_type(descriptor) {
        ResolvedType::String => {
            GeneratorSpec::new(GeneratorKind::RandomEnglishWord).with_param("maxWords", ["1"])
        }
        ResolvedType::Number | ResolvedType::Integer => {
            GeneratorSpec::new(GeneratorKind::RandomNumber)
                .with_param("type", ["integer"])
                .with_param("min", ["1"])
                .with_param("max", ["100"])
        }
        ResolvedType::Boolean => GeneratorSpec::new(GeneratorKind::RandomBoolean),
        ResolvedType::Enum(values) => {
            GeneratorSpec::new(GeneratorKind::RandomInputValue).with_param("values", values)
        }
        ResolvedType::Unsupported(resolved_type) => {
            return Err(TestConfError::UnsupportedParameterType {
                parameter: descriptor.name.clone(),
                location: descriptor.location.to_string(),
                resolved_type,
            });
        }
    };
    Ok(spec)
}

/// Full test parameter (name, weight and generator) for one parameter
///
/// # Errors
/// See [`generator_spec_for`].
pub fn generator_for(descriptor: &ParameterDescriptor) -> Result<TestParameter, TestConfError> {
    Ok(TestParameter {
        name: descriptor.name.clone(),
        weight: weight_for(descriptor.required),
        generator: generator_spec_for(descriptor)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use apiprobe_openapi::ParameterLocation;
    use proptest::prelude::*;

    fn query(declared_type: ParamType, required: bool) -> ParameterDescriptor {
        ParameterDescriptor::new("q", ParameterLocation::Query, declared_type, required)
    }

    #[test]
    fn test_required_integer_path_parameter() {
        let descriptor =
            ParameterDescriptor::new("id", ParameterLocation::Path, ParamType::Integer, true);
        let param = generator_for(&descriptor).unwrap();

        assert_eq!(param.name, "id");
        assert_eq!(param.weight, None);
        assert_eq!(param.generator.kind, GeneratorKind::RandomNumber);
        assert_eq!(param.generator.values_of("type"), ["integer"]);
        assert_eq!(param.generator.values_of("min"), ["1"]);
        assert_eq!(param.generator.values_of("max"), ["100"]);
    }

    #[test]
    fn test_optional_enum_query_parameter() {
        let descriptor = query(ParamType::String, false).with_enum(["open", "closed"]);
        let param = generator_for(&descriptor).unwrap();

        assert_eq!(param.weight, Some(0.5));
        assert_eq!(param.generator.kind, GeneratorKind::RandomInputValue);
        assert_eq!(param.generator.values_of("values"), ["open", "closed"]);
    }

    #[test]
    fn test_string_and_boolean_dispatch() {
        let word = generator_for(&query(ParamType::String, true)).unwrap();
        assert_eq!(word.generator.kind, GeneratorKind::RandomEnglishWord);
        assert_eq!(word.generator.values_of("maxWords"), ["1"]);

        let flag = generator_for(&query(ParamType::Boolean, true)).unwrap();
        assert_eq!(flag.generator.kind, GeneratorKind::RandomBoolean);
        assert!(flag.generator.gen_parameters.is_empty());
    }

    #[test]
    fn test_array_resolves_to_item_type() {
        let descriptor = query(ParamType::Array(Some(Box::new(ParamType::Number))), true);
        let param = generator_for(&descriptor).unwrap();
        assert_eq!(param.generator.kind, GeneratorKind::RandomNumber);
    }

    #[test]
    fn test_unsupported_query_type_is_rejected() {
        for declared in [
            ParamType::Other("object".to_string()),
            ParamType::Array(None),
            ParamType::Array(Some(Box::new(ParamType::Other("file".to_string())))),
        ] {
            let err = generator_for(&query(declared, true)).unwrap_err();
            assert!(matches!(err, TestConfError::UnsupportedParameterType { .. }));
        }
    }

    #[test]
    fn test_unsupported_error_names_the_resolved_type() {
        let err = generator_for(&query(ParamType::Other("object".to_string()), true)).unwrap_err();
        assert!(err.to_string().contains("object"));
        assert!(err.to_string().contains("query or path"));
    }

    fn any_param_type() -> impl Strategy<Value = ParamType> {
        let leaf = prop_oneof![
            Just(ParamType::String),
            Just(ParamType::Number),
            Just(ParamType::Integer),
            Just(ParamType::Boolean),
            "[a-z]{1,8}".prop_map(ParamType::Other),
        ];
        leaf.prop_recursive(2, 4, 1, |inner| {
            prop_oneof![
                Just(ParamType::Array(None)),
                inner.prop_map(|t| ParamType::Array(Some(Box::new(t)))),
            ]
        })
    }

    fn any_non_query_location() -> impl Strategy<Value = ParameterLocation> {
        prop_oneof![
            Just(ParameterLocation::Header),
            Just(ParameterLocation::Body),
            Just(ParameterLocation::FormData),
            Just(ParameterLocation::Cookie),
        ]
    }

    proptest! {
        #[test]
        fn prop_weight_depends_only_on_required(
            declared in any_param_type(),
            location in any_non_query_location(),
            required in any::<bool>(),
        ) {
            let descriptor = ParameterDescriptor::new("p", location, declared, required);
            let param = generator_for(&descriptor).unwrap();
            prop_assert_eq!(param.weight, if required { None } else { Some(0.5) });
        }

        #[test]
        fn prop_non_query_path_always_falls_back(
            declared in any_param_type(),
            location in any_non_query_location(),
            values in proptest::collection::vec("[a-z]{1,6}", 0..4),
        ) {
            let descriptor = ParameterDescriptor::new("p", location, declared, true).with_enum(values);
            let spec = generator_spec_for(&descriptor).unwrap();
            prop_assert_eq!(&spec.kind, &GeneratorKind::RandomInputValue);
            prop_assert_eq!(spec.values_of("values"), ["value 1", "value 2"]);
        }

        #[test]
        fn prop_enum_wins_over_declared_type(
            declared in any_param_type(),
            values in proptest::collection::vec("[a-z]{1,6}", 1..5),
        ) {
            let descriptor = query(declared, true).with_enum(values.clone());
            let spec = generator_spec_for(&descriptor).unwrap();
            prop_assert_eq!(&spec.kind, &GeneratorKind::RandomInputValue);
            prop_assert_eq!(spec.values_of("values"), values.as_slice());
        }
    }
}
