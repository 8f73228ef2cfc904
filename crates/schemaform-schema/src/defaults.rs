//! Default form data.
//!
//! [`compute_defaults`] walks a schema and collects the values implied by
//! `default` keywords, nested object properties, fixed array items, and
//! `minItems`. [`default_form_state`] overlays the data the host supplied on
//! top of those defaults; supplied values always win.

use serde_json::{Map, Value};

use schemaform_core::{FormError, FormResult};

use crate::resolve::{find_schema_definition, retrieve_schema};

/// Upper bound on schema nesting while computing defaults.
const MAX_DEFAULTS_DEPTH: usize = 64;

/// Deep-merges `over` into `base`.
///
/// Nested objects are merged key by key; any other value in `over` replaces
/// the one in `base`. With `concat_arrays`, two arrays under the same key are
/// concatenated instead (used when merging schemas, where `required` lists
/// accumulate).
///
/// # Examples
///
/// ```
/// use schemaform_schema::merge_objects;
/// use serde_json::json;
///
/// let merged = merge_objects(&json!({"a": {"b": 1}, "c": 2}), &json!({"a": {"d": 3}}), false);
/// assert_eq!(merged, json!({"a": {"b": 1, "d": 3}, "c": 2}));
/// ```
pub fn merge_objects(base: &Value, over: &Value, concat_arrays: bool) -> Value {
    match (base, over) {
        (Value::Object(left), Value::Object(right)) => {
            Value::Object(merge_maps(left, right, concat_arrays))
        }
        (_, over) => over.clone(),
    }
}

pub(crate) fn merge_maps(
    base: &Map<String, Value>,
    over: &Map<String, Value>,
    concat_arrays: bool,
) -> Map<String, Value> {
    let mut acc = base.clone();
    for (key, right) in over {
        let merged = match (base.get(key), right) {
            (Some(Value::Object(left)), Value::Object(right)) => {
                Value::Object(merge_maps(left, right, concat_arrays))
            }
            (Some(Value::Array(left)), Value::Array(right)) if concat_arrays => {
                Value::Array(left.iter().chain(right).cloned().collect())
            }
            _ => right.clone(),
        };
        acc.insert(key.clone(), merged);
    }
    acc
}

/// Computes the default value implied by `schema`.
///
/// `parent_defaults` is the default the enclosing schema assigns to this
/// position; an object `default` on this schema is merged over it. Returns
/// `None` when the schema implies no value at all.
///
/// # Errors
///
/// Fails if a `$ref` cannot be resolved or the schema nests beyond a sane depth.
pub fn compute_defaults(
    schema: &Value,
    parent_defaults: Option<&Value>,
    definitions: &Value,
) -> FormResult<Option<Value>> {
    compute_at(schema, parent_defaults.cloned(), definitions, 0)
}

fn compute_at(
    schema: &Value,
    parent: Option<Value>,
    definitions: &Value,
    depth: usize,
) -> FormResult<Option<Value>> {
    if depth > MAX_DEFAULTS_DEPTH {
        return Err(FormError::InvalidSchema(
            "schema nests too deeply to compute defaults".to_string(),
        ));
    }
    let Some(object) = schema.as_object() else {
        return Ok(parent);
    };

    let mut defaults = parent;
    if let Some(own) = object.get("default") {
        defaults = Some(match (defaults.take(), own) {
            (Some(Value::Object(inherited)), Value::Object(own)) => {
                Value::Object(merge_maps(&inherited, own, false))
            }
            _ => own.clone(),
        });
    } else if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
        let target = find_schema_definition(reference, definitions)?;
        return compute_at(&target, defaults, definitions, depth + 1);
    } else if let Some(Value::Array(items)) = object.get("items") {
        if items.iter().all(Value::is_object) {
            let fixed = items
                .iter()
                .map(|item| {
                    compute_at(item, None, definitions, depth + 1).map(|d| d.unwrap_or(Value::Null))
                })
                .collect::<FormResult<Vec<_>>>()?;
            defaults = Some(Value::Array(fixed));
        }
    }

    match schema_type(object) {
        Some("object") => {
            let mut computed = Map::new();
            if let Some(properties) = object.get("properties").and_then(Value::as_object) {
                for (key, property) in properties {
                    let inherited = defaults.as_ref().and_then(|d| d.get(key)).cloned();
                    if let Some(value) = compute_at(property, inherited, definitions, depth + 1)? {
                        computed.insert(key.clone(), value);
                    }
                }
            }
            Ok(Some(Value::Object(computed)))
        }
        Some("array") => {
            let min_items = object
                .get("minItems")
                .and_then(Value::as_u64)
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0);
            if min_items == 0 {
                return Ok(defaults);
            }
            if is_multi_select(object, definitions)? {
                return Ok(Some(defaults.unwrap_or_else(|| Value::Array(Vec::new()))));
            }
            let mut entries = match defaults {
                Some(Value::Array(entries)) => entries,
                _ => Vec::new(),
            };
            if entries.len() < min_items {
                let filler = match object.get("items") {
                    Some(items @ Value::Object(_)) => {
                        compute_at(items, None, definitions, depth + 1)?.unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                };
                entries.resize(min_items, filler);
            }
            Ok(Some(Value::Array(entries)))
        }
        _ => Ok(defaults),
    }
}

/// Computes the effective form data for `schema`.
///
/// - No supplied data: the schema defaults (or `null`).
/// - Supplied object: deep-merged over the object defaults.
/// - Supplied `null`: the schema defaults.
/// - Any other supplied value: used as-is.
///
/// # Errors
///
/// Returns [`FormError::InvalidSchema`] if `schema` is not an object, and
/// propagates reference-resolution failures.
pub fn default_form_state(
    schema: &Value,
    supplied: Option<&Value>,
    definitions: &Value,
) -> FormResult<Value> {
    if !schema.is_object() {
        return Err(FormError::InvalidSchema(format!(
            "expected a schema object, got {schema}"
        )));
    }
    let resolved = retrieve_schema(schema, definitions, supplied.unwrap_or(&Value::Null))?;
    let defaults = compute_defaults(&resolved, schema.get("default"), definitions)?;

    Ok(match supplied {
        None | Some(Value::Null) => defaults.unwrap_or(Value::Null),
        Some(Value::Object(data)) => {
            let base = match defaults {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            };
            Value::Object(merge_maps(&base, data, false))
        }
        Some(other) => other.clone(),
    })
}

fn schema_type(schema: &Map<String, Value>) -> Option<&str> {
    match schema.get("type") {
        Some(Value::String(ty)) => Some(ty.as_str()),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|ty| *ty != "null"),
        _ if schema.contains_key("properties") || schema.contains_key("additionalProperties") => {
            Some("object")
        }
        _ => None,
    }
}

/// An array of unique enum values renders as a multi-select, which starts empty.
fn is_multi_select(schema: &Map<String, Value>, definitions: &Value) -> FormResult<bool> {
    if schema.get("uniqueItems") != Some(&Value::Bool(true)) {
        return Ok(false);
    }
    let Some(items) = schema.get("items") else {
        return Ok(false);
    };
    let items = retrieve_schema(items, definitions, &Value::Null)?;
    Ok(items.get("enum").is_some_and(Value::is_array))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_merge_objects_concat_arrays() {
        let merged = merge_objects(
            &json!({"required": ["a"], "x": 1}),
            &json!({"required": ["b"]}),
            true,
        );
        assert_eq!(merged, json!({"required": ["a", "b"], "x": 1}));
    }

    #[test]
    fn test_merge_objects_arrays_replace_without_concat() {
        let merged = merge_objects(&json!({"list": [1, 2]}), &json!({"list": [3]}), false);
        assert_eq!(merged, json!({"list": [3]}));
    }

    #[test]
    fn test_compute_defaults_scalar() {
        let d = compute_defaults(&json!({"type": "string", "default": "x"}), None, &json!({}))
            .unwrap();
        assert_eq!(d, Some(json!("x")));
    }

    #[test]
    fn test_compute_defaults_no_default() {
        let d = compute_defaults(&json!({"type": "string"}), None, &json!({})).unwrap();
        assert_eq!(d, None);
    }

    #[test]
    fn test_compute_defaults_nested_object() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": {"type": "string", "default": "anon"},
                "bio": {"type": "string"},
                "address": {
                    "type": "object",
                    "properties": {"city": {"type": "string", "default": "Paris"}}
                }
            }
        });
        let d = compute_defaults(&schema, None, &json!({})).unwrap();
        assert_eq!(d, Some(json!({"name": "anon", "address": {"city": "Paris"}})));
    }

    #[test]
    fn test_compute_defaults_parent_default_flows_down() {
        let schema = json!({
            "type": "object",
            "default": {"name": "from-parent", "email": "parent@example.com"},
            "properties": {
                "name": {"type": "string", "default": "own"},
                "email": {"type": "string"}
            }
        });
        let d = compute_defaults(&schema, None, &json!({})).unwrap();
        assert_eq!(d, Some(json!({"name": "own", "email": "parent@example.com"})));
    }

    #[test]
    fn test_compute_defaults_ref() {
        let defs = json!({"n": {"type": "integer", "default": 7}});
        let d = compute_defaults(&json!({"$ref": "#/definitions/n"}), None, &defs).unwrap();
        assert_eq!(d, Some(json!(7)));
    }

    #[test]
    fn test_compute_defaults_fixed_items() {
        let schema = json!({
            "type": "array",
            "items": [{"type": "string", "default": "a"}, {"type": "integer"}]
        });
        let d = compute_defaults(&schema, None, &json!({})).unwrap();
        assert_eq!(d, Some(json!(["a", null])));
    }

    #[test]
    fn test_compute_defaults_min_items_filled() {
        let schema = json!({
            "type": "array",
            "minItems": 3,
            "default": ["x"],
            "items": {"type": "string", "default": "fill"}
        });
        let d = compute_defaults(&schema, None, &json!({})).unwrap();
        assert_eq!(d, Some(json!(["x", "fill", "fill"])));
    }

    #[test]
    fn test_compute_defaults_multi_select_starts_empty() {
        let schema = json!({
            "type": "array",
            "minItems": 2,
            "uniqueItems": true,
            "items": {"type": "string", "enum": ["a", "b", "c"]}
        });
        let d = compute_defaults(&schema, None, &json!({})).unwrap();
        assert_eq!(d, Some(json!([])));
    }

    #[test]
    fn test_default_form_state_rejects_non_object_schema() {
        let err = default_form_state(&json!("string"), None, &json!({})).unwrap_err();
        assert!(matches!(err, FormError::InvalidSchema(_)));
    }

    #[test]
    fn test_default_form_state_supplied_wins() {
        let schema = json!({
            "type": "object",
            "properties": {
                "a": {"type": "string", "default": "da"},
                "b": {"type": "string", "default": "db"}
            }
        });
        let state = default_form_state(&schema, Some(&json!({"a": "mine", "c": 1})), &json!({}))
            .unwrap();
        assert_eq!(state, json!({"a": "mine", "b": "db", "c": 1}));
    }

    #[test]
    fn test_default_form_state_without_data() {
        let schema = json!({"type": "object", "properties": {"a": {"type": "string"}}});
        assert_eq!(default_form_state(&schema, None, &json!({})).unwrap(), json!({}));
    }

    #[test]
    fn test_default_form_state_null_falls_back() {
        let schema = json!({"type": "string", "default": "fallback"});
        assert_eq!(
            default_form_state(&schema, Some(&Value::Null), &json!({})).unwrap(),
            json!("fallback")
        );
    }

    #[test]
    fn test_default_form_state_scalar_supplied() {
        let schema = json!({"type": "boolean", "default": true});
        assert_eq!(
            default_form_state(&schema, Some(&json!(false)), &json!({})).unwrap(),
            json!(false)
        );
    }
}
