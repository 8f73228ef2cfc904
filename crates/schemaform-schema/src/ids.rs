//! Stable field ids.
//!
//! Every rendered field is keyed by an id derived from its position in the
//! schema: the root gets the id prefix (or the ui schema's `ui:rootFieldId`),
//! and each object property appends `_<name>` to its parent's id. The ids
//! depend only on the schema shape, so they stay stable while data changes.

use std::collections::BTreeMap;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use serde_json::Value;

use schemaform_core::FormResult;

use crate::resolve::retrieve_schema;

/// A tree of field ids mirroring the object structure of a schema.
///
/// Serializes as `{"$id": "root", "name": {"$id": "root_name"}, ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSchema {
    /// The id of the field at this position.
    pub id: String,
    /// Ids of the object properties below this position.
    pub children: BTreeMap<String, IdSchema>,
}

impl IdSchema {
    /// Creates a leaf id.
    pub fn leaf(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            children: BTreeMap::new(),
        }
    }

    /// Returns the id subtree for a property, if the schema declares it.
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.get(name)
    }

    /// Follows a path of property names down the tree.
    pub fn lookup<'a, I>(&self, path: I) -> Option<&Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        path.into_iter()
            .try_fold(self, |node, segment| node.children.get(segment))
    }
}

impl Serialize for IdSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len() + 1))?;
        map.serialize_entry("$id", &self.id)?;
        for (name, child) in &self.children {
            map.serialize_entry(name, child)?;
        }
        map.end()
    }
}

/// Derives the id tree for a resolved schema.
pub trait IdentityDeriver: Send + Sync {
    /// `root_id` overrides the root id (from `ui:rootFieldId`); otherwise the
    /// root is named after `id_prefix`.
    fn derive_ids(
        &self,
        schema: &Value,
        root_id: Option<&str>,
        definitions: &Value,
        data: &Value,
        id_prefix: &str,
    ) -> FormResult<IdSchema>;
}

/// The stock [`IdentityDeriver`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultIdentityDeriver;

impl IdentityDeriver for DefaultIdentityDeriver {
    fn derive_ids(
        &self,
        schema: &Value,
        root_id: Option<&str>,
        definitions: &Value,
        data: &Value,
        id_prefix: &str,
    ) -> FormResult<IdSchema> {
        let root = root_id.unwrap_or(id_prefix);
        to_id_schema(schema, root, definitions, data)
    }
}

fn to_id_schema(schema: &Value, id: &str, definitions: &Value, data: &Value) -> FormResult<IdSchema> {
    let Some(object) = schema.as_object() else {
        return Ok(IdSchema::leaf(id));
    };

    if object.contains_key("$ref") || object.contains_key("dependencies") {
        let resolved = retrieve_schema(schema, definitions, data)?;
        return to_id_schema(&resolved, id, definitions, data);
    }

    if let Some(items) = object.get("items") {
        if items.get("$ref").is_none() {
            return to_id_schema(items, id, definitions, data);
        }
    }

    if object.get("type").and_then(Value::as_str) != Some("object") {
        return Ok(IdSchema::leaf(id));
    }

    let mut node = IdSchema::leaf(id);
    if let Some(properties) = object.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            let field_id = format!("{id}_{name}");
            let field_data = data.get(name).unwrap_or(&Value::Null);
            let child = to_id_schema(property, &field_id, definitions, field_data)?;
            node.children.insert(name.clone(), child);
        }
    }
    Ok(node)
}
