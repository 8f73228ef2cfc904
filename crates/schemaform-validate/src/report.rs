//! Error entries, error trees, and reports.
//!
//! Validation produces two views of the same errors:
//!
//! - a flat, ordered list of [`ErrorEntry`] values, used for the error summary;
//! - an [`ErrorSchema`] tree keyed by property name, used to show each
//!   field's own errors next to it.
//!
//! An [`ErrorReport`] owns both and is only ever built from one source, so the
//! two views can never describe different validation passes.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// Name used for the root field in error stacks.
const ROOT_FIELD: &str = "root";

/// Key under which a node's own messages are serialized.
const ERRORS_KEY: &str = "__errors";

/// A path of property names from the root of the form data.
///
/// Displays as `.a.b`; the root path displays as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// The path of the form's root value.
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Builds a path from property names.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Parses a JSON pointer such as `/address/city`.
    ///
    /// `~1` and `~0` escapes are decoded. An empty pointer is the root.
    pub fn from_pointer(pointer: &str) -> Self {
        Self(
            pointer
                .split('/')
                .skip(1)
                .map(|segment| segment.replace("~1", "/").replace("~0", "~"))
                .collect(),
        )
    }

    /// Returns a new path one level below this one.
    #[must_use]
    pub fn child(&self, name: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(name.into());
        Self(segments)
    }

    /// The property names along the path.
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The field name errors at this path are attributed to.
    pub fn field_name(&self) -> &str {
        self.0.last().map_or(ROOT_FIELD, String::as_str)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, ".{segment}")?;
        }
        Ok(())
    }
}

/// A single validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    /// Where in the data the error applies.
    pub path: FieldPath,
    /// The human-readable message.
    pub message: String,
    /// The field the error is attributed to (last path segment, or `root`).
    pub source_field: String,
}

impl ErrorEntry {
    /// Creates an entry attributed to the last segment of `path`.
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        let source_field = path.field_name().to_string();
        Self {
            path,
            message: message.into(),
            source_field,
        }
    }

    /// The summary line for this error, e.g. `pass2: Passwords don't match.`.
    pub fn stack(&self) -> String {
        format!("{}: {}", self.source_field, self.message)
    }
}

/// Errors arranged by field, mirroring the shape of the form data.
///
/// Custom validators receive a tree and add messages to the fields they
/// check:
///
/// ```
/// use schemaform_validate::ErrorSchema;
///
/// let mut errors = ErrorSchema::new();
/// errors.child("pass2").add_error("Passwords don't match.");
/// assert_eq!(errors.get("pass2").unwrap().errors(), ["Passwords don't match."]);
/// ```
///
/// Serializes as `{"__errors": [...], "<field>": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorSchema {
    errors: Vec<String>,
    children: BTreeMap<String, ErrorSchema>,
}

impl ErrorSchema {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from flat entries, placing each message at its path.
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a ErrorEntry>,
    {
        let mut schema = Self::new();
        for entry in entries {
            schema.at_path(&entry.path).add_error(entry.message.clone());
        }
        schema
    }

    /// Adds a message to this node.
    pub fn add_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self
    }

    /// Returns the node for a property, creating it if needed.
    pub fn child(&mut self, name: &str) -> &mut Self {
        self.children.entry(name.to_string()).or_default()
    }

    /// Returns the node at `path`, creating intermediate nodes if needed.
    pub fn at_path(&mut self, path: &FieldPath) -> &mut Self {
        path.segments()
            .iter()
            .fold(self, |node, segment| node.child(segment))
    }

    /// Returns the node for a property, if it exists.
    pub fn get(&self, name: &str) -> Option<&Self> {
        self.children.get(name)
    }

    /// The messages attached directly to this node.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Returns `true` if neither this node nor any descendant holds a message.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Merges another tree into this one. Messages at the same node are
    /// appended after the existing ones.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        for (name, child) in other.children {
            self.children.entry(name).or_default().merge(child);
        }
    }

    /// Removes descendant nodes that hold no messages.
    pub fn prune(&mut self) {
        for child in self.children.values_mut() {
            child.prune();
        }
        self.children.retain(|_, child| !child.is_empty());
    }

    /// Flattens the tree into entries: a node's own messages first, then its
    /// children in name order.
    pub fn to_error_list(&self) -> Vec<ErrorEntry> {
        let mut out = Vec::new();
        self.collect(&FieldPath::root(), &mut out);
        out
    }

    fn collect(&self, path: &FieldPath, out: &mut Vec<ErrorEntry>) {
        out.extend(
            self.errors
                .iter()
                .map(|message| ErrorEntry::new(path.clone(), message.clone())),
        );
        for (name, child) in &self.children {
            child.collect(&path.child(name.clone()), out);
        }
    }
}

impl Serialize for ErrorSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.children.len() + 1))?;
        map.serialize_entry(ERRORS_KEY, &self.errors)?;
        for (name, child) in &self.children {
            map.serialize_entry(name, child)?;
        }
        map.end()
    }
}

/// The outcome of one validation pass: the flat list and the tree, together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    errors: Vec<ErrorEntry>,
    error_schema: ErrorSchema,
}

impl ErrorReport {
    /// A report with no errors.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a report from a tree; the list is derived from it.
    pub fn from_schema(error_schema: ErrorSchema) -> Self {
        Self {
            errors: error_schema.to_error_list(),
            error_schema,
        }
    }

    /// Builds a report from a list; the tree is derived from it and the
    /// list keeps its order.
    pub fn from_entries(errors: Vec<ErrorEntry>) -> Self {
        let error_schema = ErrorSchema::from_entries(&errors);
        Self {
            errors,
            error_schema,
        }
    }

    /// The ordered error list.
    pub fn errors(&self) -> &[ErrorEntry] {
        &self.errors
    }

    /// The per-field error tree.
    pub const fn error_schema(&self) -> &ErrorSchema {
        &self.error_schema
    }

    /// Returns `true` if the pass found no errors.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the entries recorded at exactly `path`.
    pub fn errors_at<'a>(&'a self, path: &'a FieldPath) -> impl Iterator<Item = &'a ErrorEntry> + 'a {
        self.errors.iter().filter(move |entry| entry.path == *path)
    }
}
