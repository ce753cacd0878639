//! Document loading
//!
//! Documents are walked as `serde_yaml::Value` trees because the YAML mapping
//! keeps insertion order; JSON documents are parsed with `preserve_order` and
//! converted. Local `$ref`s (`#/...`) are followed for parameters and schemas.

use camino::Utf8Path;
use serde_yaml::{Mapping, Value};
use std::str::FromStr;
use tracing::{debug, warn};

use apiprobe_utils::error::TestConfError;

use crate::model::{
    ApiSpec, HttpMethod, OperationSpec, ParamType, ParameterDescriptor, ParameterLocation,
    PathSpec,
};

const MAX_REF_DEPTH: usize = 16;

/// Load a document from disk
///
/// # Errors
/// Returns `TestConfError::SpecLoad` when the file cannot be read or parsed.
pub fn load_spec(path: &Utf8Path) -> Result<ApiSpec, TestConfError> {
    let content = std::fs::read_to_string(path).map_err(|e| TestConfError::SpecLoad {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    parse_spec(&content, path.as_str())
}

/// Parse document text; `origin` is only used in error messages
///
/// # Errors
/// Returns `TestConfError::SpecLoad` for malformed documents or a missing `paths` object.
pub fn parse_spec(content: &str, origin: &str) -> Result<ApiSpec, TestConfError> {
    let load_err = |reason: String| TestConfError::SpecLoad {
        path: origin.to_string(),
        reason,
    };

    let root: Value = if content.trim_start().starts_with('{') {
        let json: serde_json::Value =
            serde_json::from_str(content).map_err(|e| load_err(e.to_string()))?;
        serde_yaml::to_value(json).map_err(|e| load_err(e.to_string()))?
    } else {
        serde_yaml::from_str(content).map_err(|e| load_err(e.to_string()))?
    };

    let Some(root_map) = root.as_mapping() else {
        return Err(load_err("document root is not an object".to_string()));
    };

    let info = root_map.get("info");
    let title = info
        .and_then(|i| i.get("title"))
        .and_then(Value::as_str)
        .unwrap_or("untitled")
        .to_string();
    let version = info
        .and_then(|i| i.get("version"))
        .and_then(scalar_to_string);

    let Some(paths) = root_map.get("paths").and_then(Value::as_mapping) else {
        return Err(load_err("document has no 'paths' object".to_string()));
    };

    let mut out = Vec::with_capacity(paths.len());
    for (key, item) in paths {
        let Some(template) = key.as_str() else {
            continue;
        };
        if template.starts_with("x-") {
            continue;
        }
        let item = resolve(&root, item);
        let Some(item) = item.as_mapping() else {
            warn!(path = %template, "path item is not an object; skipping");
            continue;
        };
        out.push(PathSpec {
            template: template.to_string(),
            operations: operations_of(&root, template, item),
        });
    }

    debug!(title = %title, paths = out.len(), "Loaded API specification");
    Ok(ApiSpec {
        title,
        version,
        paths: out,
    })
}

fn operations_of(root: &Value, template: &str, item: &Mapping) -> Vec<OperationSpec> {
    let shared = item
        .get("parameters")
        .map(|p| parameters_of(root, template, p))
        .unwrap_or_default();

    let mut operations = Vec::new();
    for (key, op) in item {
        let Some(method) = key.as_str().and_then(|k| HttpMethod::from_str(k).ok()) else {
            continue;
        };
        let own = op
            .get("parameters")
            .map(|p| parameters_of(root, template, p))
            .unwrap_or_default();

        operations.push(OperationSpec {
            method,
            operation_id: op
                .get("operationId")
                .and_then(Value::as_str)
                .map(str::to_string),
            parameters: merge_parameters(&shared, own),
        });
    }
    operations
}

/// Path-level parameters first; an operation parameter with the same name and
/// location replaces the shared one in place.
fn merge_parameters(
    shared: &[ParameterDescriptor],
    own: Vec<ParameterDescriptor>,
) -> Vec<ParameterDescriptor> {
    let mut merged = shared.to_vec();
    for param in own {
        match merged
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            Some(slot) => *slot = param,
            None => merged.push(param),
        }
    }
    merged
}

fn parameters_of(root: &Value, template: &str, list: &Value) -> Vec<ParameterDescriptor> {
    let Some(items) = list.as_sequence() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|raw| {
            let param = resolve(root, raw);
            let descriptor = descriptor_of(root, param);
            if descriptor.is_none() {
                warn!(path = %template, "unreadable parameter declaration; skipping");
            }
            descriptor
        })
        .collect()
}

fn descriptor_of(root: &Value, param: &Value) -> Option<ParameterDescriptor> {
    let name = param.get("name")?.as_str()?.to_string();
    let location = ParameterLocation::from_str(param.get("in")?.as_str()?).ok()?;
    let required = param
        .get("required")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    // Swagger 2 keeps type information on the parameter, OpenAPI 3 in `schema`
    let typed = match param.get("schema") {
        Some(schema) if param.get("type").is_none() => resolve(root, schema),
        _ => param,
    };

    Some(ParameterDescriptor {
        name,
        location,
        declared_type: type_of(root, typed, 0),
        enum_values: enum_of(typed),
        required,
    })
}

fn type_of(root: &Value, typed: &Value, depth: usize) -> ParamType {
    let items = if depth < MAX_REF_DEPTH {
        typed
            .get("items")
            .map(|items| type_of(root, resolve(root, items), depth + 1))
    } else {
        None
    };
    ParamType::from_keyword(typed.get("type").and_then(Value::as_str), items)
}

fn enum_of(typed: &Value) -> Vec<String> {
    typed
        .get("enum")
        .and_then(Value::as_sequence)
        .map(|values| values.iter().filter_map(scalar_to_string).collect())
        .unwrap_or_default()
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Follow local `$ref` pointers; unresolvable references return the input
fn resolve<'a>(root: &'a Value, value: &'a Value) -> &'a Value {
    let mut current = value;
    for _ in 0..MAX_REF_DEPTH {
        let Some(reference) = current.get("$ref").and_then(Value::as_str) else {
            return current;
        };
        let Some(pointer) = reference.strip_prefix("#/") else {
            warn!(reference = %reference, "external $ref not supported");
            return current;
        };
        let mut target = root;
        for segment in pointer.split('/') {
            let segment = segment.replace("~1", "/").replace("~0", "~");
            match target.get(segment.as_str()) {
                Some(next) => target = next,
                None => {
                    warn!(reference = %reference, "unresolved $ref");
                    return current;
                }
            }
        }
        current = target;
    }
    current
}
