//! `$ref` and `dependencies` resolution.
//!
//! A form schema may point into its own `definitions` with `$ref` and may
//! declare property `dependencies` whose effect depends on the current data
//! (a field appearing only once another field has a value, or a branch of a
//! `oneOf` chosen by a discriminating `enum`). [`retrieve_schema`] turns such
//! a schema into the concrete schema for the given data.
//!
//! Only local references of the form `#/definitions/<path>` are supported.

use serde_json::{Map, Value};
use tracing::{debug, warn};

use schemaform_core::{FormError, FormResult};

use crate::defaults::{default_form_state, merge_maps};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Upper bound on chained `$ref` hops before a schema is declared cyclic.
const MAX_REF_DEPTH: usize = 64;

/// Resolves schemas and their default data.
///
/// Implementations must be pure: the same inputs always produce the same
/// outputs, so that deriving form state twice from one configuration yields
/// identical results.
pub trait SchemaResolver: Send + Sync {
    /// Computes the effective form data: `supplied` overlaid on the defaults
    /// implied by `schema`. `None` means the host supplied no data at all.
    fn resolve_default_data(
        &self,
        schema: &Value,
        supplied: Option<&Value>,
        definitions: &Value,
    ) -> FormResult<Value>;

    /// Returns the concrete schema for `data`.
    fn resolve_schema(&self, schema: &Value, definitions: &Value, data: &Value)
        -> FormResult<Value>;
}

/// The stock [`SchemaResolver`], backed by [`default_form_state`] and
/// [`retrieve_schema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSchemaResolver;

impl SchemaResolver for DefaultSchemaResolver {
    fn resolve_default_data(
        &self,
        schema: &Value,
        supplied: Option<&Value>,
        definitions: &Value,
    ) -> FormResult<Value> {
        default_form_state(schema, supplied, definitions)
    }

    fn resolve_schema(
        &self,
        schema: &Value,
        definitions: &Value,
        data: &Value,
    ) -> FormResult<Value> {
        retrieve_schema(schema, definitions, data)
    }
}

/// Returns the `definitions` object of a schema, or an empty object.
pub fn definitions_of(schema: &Value) -> Value {
    schema
        .get("definitions")
        .filter(|d| d.is_object())
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

/// Looks up a `#/definitions/...` reference.
///
/// Path segments are JSON-pointer unescaped (`~1` is `/`, `~0` is `~`), and
/// intermediate definitions that are themselves `$ref`s are followed.
///
/// # Errors
///
/// Returns [`FormError::UnresolvedReference`] if the reference is not local
/// or names a missing definition, and [`FormError::InvalidSchema`] if the
/// references form a cycle.
pub fn find_schema_definition(reference: &str, definitions: &Value) -> FormResult<Value> {
    find_definition_at(reference, definitions, 0)
}

fn find_definition_at(reference: &str, definitions: &Value, depth: usize) -> FormResult<Value> {
    if depth > MAX_REF_DEPTH {
        return Err(FormError::InvalidSchema(format!(
            "reference cycle through {reference}"
        )));
    }
    let path = reference
        .strip_prefix(DEFINITIONS_PREFIX)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| FormError::UnresolvedReference(reference.to_string()))?;

    let mut current = definitions.clone();
    for raw in path.split('/') {
        let part = raw.replace("~1", "/").replace("~0", "~");
        let mut hops = depth;
        while let Some(inner) = current.get("$ref").and_then(Value::as_str).map(str::to_owned) {
            hops += 1;
            current = find_definition_at(&inner, definitions, hops)?;
        }
        current = current
            .get(&part)
            .cloned()
            .ok_or_else(|| FormError::UnresolvedReference(reference.to_string()))?;
    }
    Ok(current)
}

/// Resolves `$ref` and `dependencies` at the top level of `schema` for `data`.
///
/// Keywords written next to a `$ref` override those of the referenced
/// definition. Nested property schemas are left untouched; callers resolve
/// them as they descend.
///
/// # Errors
///
/// Fails if a reference cannot be resolved, references are cyclic, or a
/// dependency `oneOf` is not an array.
pub fn retrieve_schema(schema: &Value, definitions: &Value, data: &Value) -> FormResult<Value> {
    retrieve_at(schema, definitions, data, 0)
}

fn retrieve_at(schema: &Value, definitions: &Value, data: &Value, depth: usize) -> FormResult<Value> {
    if depth > MAX_REF_DEPTH {
        return Err(FormError::InvalidSchema(
            "schema references nest too deeply".to_string(),
        ));
    }
    let Some(object) = schema.as_object() else {
        return Ok(schema.clone());
    };

    if let Some(reference) = object.get("$ref") {
        let reference = reference
            .as_str()
            .ok_or_else(|| FormError::InvalidSchema("$ref must be a string".to_string()))?;
        let target = find_schema_definition(reference, definitions)?;
        let mut merged = match target {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in object {
            if key != "$ref" {
                merged.insert(key.clone(), value.clone());
            }
        }
        return retrieve_at(&Value::Object(merged), definitions, data, depth + 1);
    }

    if object.contains_key("dependencies") {
        let resolved = resolve_dependencies(object, definitions, data, depth)?;
        return retrieve_at(&Value::Object(resolved), definitions, data, depth + 1);
    }

    Ok(schema.clone())
}

/// Applies the `dependencies` whose trigger property is present in `data`.
fn resolve_dependencies(
    schema: &Map<String, Value>,
    definitions: &Value,
    data: &Value,
    depth: usize,
) -> FormResult<Map<String, Value>> {
    let mut resolved = schema.clone();
    let Some(Value::Object(dependencies)) = resolved.remove("dependencies") else {
        return Ok(resolved);
    };
    let Some(present) = data.as_object() else {
        return Ok(resolved);
    };

    for (key, dependency) in &dependencies {
        if !present.contains_key(key) {
            continue;
        }
        match dependency {
            Value::Array(required) => {
                resolved = with_dependent_properties(resolved, required);
            }
            Value::Object(_) => {
                resolved =
                    with_dependent_schema(resolved, definitions, data, key, dependency, depth)?;
            }
            _ => {}
        }
    }
    Ok(resolved)
}

fn with_dependent_properties(
    mut schema: Map<String, Value>,
    additionally_required: &[Value],
) -> Map<String, Value> {
    let mut required = match schema.remove("required") {
        Some(Value::Array(existing)) => existing,
        _ => Vec::new(),
    };
    for name in additionally_required {
        if !required.contains(name) {
            required.push(name.clone());
        }
    }
    schema.insert("required".to_string(), Value::Array(required));
    schema
}

fn with_dependent_schema(
    schema: Map<String, Value>,
    definitions: &Value,
    data: &Value,
    key: &str,
    dependency: &Value,
    depth: usize,
) -> FormResult<Map<String, Value>> {
    let Value::Object(mut dependent) = retrieve_at(dependency, definitions, data, depth + 1)? else {
        return Ok(schema);
    };
    let one_of = dependent.remove("oneOf");
    let merged = merge_maps(&schema, &dependent, true);

    match one_of {
        None => Ok(merged),
        Some(Value::Array(branches)) => {
            let branches = branches
                .iter()
                .map(|branch| {
                    if branch.get("$ref").is_some() {
                        retrieve_at(branch, definitions, data, depth + 1)
                    } else {
                        Ok(branch.clone())
                    }
                })
                .collect::<FormResult<Vec<_>>>()?;
            with_exactly_one_subschema(merged, definitions, data, key, &branches, depth)
        }
        Some(other) => Err(FormError::InvalidSchema(format!(
            "dependency oneOf for '{key}' must be an array, got {other}"
        ))),
    }
}

fn with_exactly_one_subschema(
    schema: Map<String, Value>,
    definitions: &Value,
    data: &Value,
    key: &str,
    branches: &[Value],
    depth: usize,
) -> FormResult<Map<String, Value>> {
    let matching: Vec<&Map<String, Value>> = branches
        .iter()
        .filter_map(Value::as_object)
        .filter(|branch| {
            branch
                .get("properties")
                .and_then(|p| p.get(key))
                .is_some_and(|condition| condition_matches(key, condition, data))
        })
        .collect();

    let [branch] = matching.as_slice() else {
        warn!(
            dependency = key,
            matches = matching.len(),
            "ignoring oneOf in dependencies because there isn't exactly one subschema that is valid"
        );
        return Ok(schema);
    };

    let mut dependent = (*branch).clone();
    let mut properties = dependent
        .get("properties")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();
    properties.remove(key);
    dependent.insert("properties".to_string(), Value::Object(properties));

    match retrieve_at(&Value::Object(dependent), definitions, data, depth + 1)? {
        Value::Object(resolved) => Ok(merge_maps(&schema, &resolved, true)),
        _ => Ok(schema),
    }
}

/// Checks `data[key]` against the discriminating property schema of a
/// `oneOf` branch.
fn condition_matches(key: &str, condition: &Value, data: &Value) -> bool {
    let mut properties = Map::new();
    properties.insert(key.to_string(), condition.clone());
    let mut wrapper = Map::new();
    wrapper.insert("type".to_string(), Value::String("object".to_string()));
    wrapper.insert("properties".to_string(), Value::Object(properties));

    match jsonschema::validator_for(&Value::Object(wrapper)) {
        Ok(validator) => validator.is_valid(data),
        Err(err) => {
            debug!(dependency = key, error = %err, "dependency condition is not a valid schema");
            false
        }
    }
}
