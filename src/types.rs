//! Document value objects parsed from JSON:API fragments.
//!
//! Parsing is lenient on purpose: a malformed fragment (missing members,
//! wrong member types) still produces a value object, so the validators can
//! inspect it and report structured errors instead of failing at parse time.

use serde_json::{Map, Value};

/// The `data` member name.
pub const DATA: &str = "data";
/// The `type` member name.
pub const TYPE: &str = "type";
/// The `id` member name.
pub const ID: &str = "id";
/// The `attributes` member name.
pub const ATTRIBUTES: &str = "attributes";
/// The `relationships` member name.
pub const RELATIONSHIPS: &str = "relationships";
/// The `meta` member name.
pub const META: &str = "meta";

/// A `(type, id)` pair naming a domain record.
///
/// Either member may be absent or empty; completeness is a validation
/// concern, not a parsing one. Numeric ids in the source document are
/// tolerated and canonicalized to their string form, so `"1"` and `1`
/// name the same record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceIdentifier {
    resource_type: Option<String>,
    id: Option<String>,
    meta: Option<Map<String, Value>>,
}

impl ResourceIdentifier {
    /// Create an identifier programmatically.
    pub fn new(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            resource_type: Some(resource_type.into()),
            id: Some(id.into()),
            meta: None,
        }
    }

    /// Parse an identifier from a resource identifier object.
    ///
    /// Non-object values yield an identifier with no type and no id.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self {
            resource_type: map.get(TYPE).and_then(member_string),
            id: map.get(ID).and_then(member_string),
            meta: map.get(META).and_then(Value::as_object).cloned(),
        }
    }

    pub fn type_name(&self) -> Option<&str> {
        self.resource_type.as_deref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.meta.as_ref()
    }

    /// True if the `type` member is present and non-empty.
    pub fn has_type(&self) -> bool {
        self.resource_type.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// True if the `id` member is present and non-empty.
    pub fn has_id(&self) -> bool {
        self.id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// Complete iff both type and id are present and non-empty.
    pub fn is_complete(&self) -> bool {
        self.has_type() && self.has_id()
    }

    /// Do two identifiers name the same record?
    ///
    /// Ids parsed from numbers were canonicalized to strings, so this is a
    /// plain value comparison.
    pub fn is_same(&self, other: &ResourceIdentifier) -> bool {
        self.resource_type == other.resource_type && self.id == other.id
    }

    /// Identity-map key in `type:id` form.
    pub fn key(&self) -> String {
        format!(
            "{}:{}",
            self.resource_type.as_deref().unwrap_or(""),
            self.id.as_deref().unwrap_or("")
        )
    }
}

impl std::fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Coerce a `type`/`id` member to its string form.
///
/// Strings pass through; numbers are canonicalized; other shapes are treated
/// as absent (the validators will report the missing member).
fn member_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// A relationship member of a resource: has-one, has-many, or malformed.
///
/// The shape of the `data` member decides which: object or null is has-one,
/// array is has-many, anything else (or an absent `data` member) is neither.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Relationship {
    data: Option<Value>,
    meta: Option<Map<String, Value>>,
}

impl Relationship {
    /// Parse a relationship from its document fragment.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        Self {
            data: map.get(DATA).cloned(),
            meta: map.get(META).and_then(Value::as_object).cloned(),
        }
    }

    /// True if the `data` member is present (including `data: null`).
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.meta.as_ref()
    }

    /// Has-one iff `data` is an object or null.
    pub fn is_has_one(&self) -> bool {
        matches!(self.data, Some(Value::Object(_)) | Some(Value::Null))
    }

    /// Has-many iff `data` is an array.
    pub fn is_has_many(&self) -> bool {
        matches!(self.data, Some(Value::Array(_)))
    }

    /// True for a has-one relationship that actually carries an identifier
    /// (`data` is an object, not null).
    pub fn has_identifier(&self) -> bool {
        matches!(self.data, Some(Value::Object(_)))
    }

    /// The single identifier of a has-one relationship, if present.
    pub fn identifier(&self) -> Option<ResourceIdentifier> {
        match &self.data {
            Some(value @ Value::Object(_)) => Some(ResourceIdentifier::from_value(value)),
            _ => None,
        }
    }

    /// The ordered identifiers of a has-many relationship.
    ///
    /// Empty for anything that is not an array-shaped `data` member.
    pub fn identifiers(&self) -> Vec<ResourceIdentifier> {
        match &self.data {
            Some(Value::Array(items)) => items.iter().map(ResourceIdentifier::from_value).collect(),
            _ => Vec::new(),
        }
    }
}

/// A resource object: the `data` member of a resource document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resource {
    identifier: ResourceIdentifier,
    attributes: Option<Value>,
    relationships: Vec<(String, Relationship)>,
    meta: Option<Map<String, Value>>,
}

impl Resource {
    /// Parse a resource object from the document's `data` member.
    pub fn from_value(value: &Value) -> Self {
        let Some(map) = value.as_object() else {
            return Self::default();
        };

        let relationships = map
            .get(RELATIONSHIPS)
            .and_then(Value::as_object)
            .map(|rels| {
                rels.iter()
                    .map(|(key, rel)| (key.clone(), Relationship::from_value(rel)))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            identifier: ResourceIdentifier::from_value(value),
            attributes: map.get(ATTRIBUTES).cloned(),
            relationships,
            meta: map.get(META).and_then(Value::as_object).cloned(),
        }
    }

    pub fn identifier(&self) -> &ResourceIdentifier {
        &self.identifier
    }

    pub fn type_name(&self) -> Option<&str> {
        self.identifier.type_name()
    }

    pub fn id(&self) -> Option<&str> {
        self.identifier.id()
    }

    pub fn attributes(&self) -> Option<&Value> {
        self.attributes.as_ref()
    }

    /// Relationships in document order.
    pub fn relationships(&self) -> impl Iterator<Item = (&str, &Relationship)> {
        self.relationships.iter().map(|(k, r)| (k.as_str(), r))
    }

    pub fn relationship(&self, key: &str) -> Option<&Relationship> {
        self.relationships
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, r)| r)
    }

    pub fn meta(&self) -> Option<&Map<String, Value>> {
        self.meta.as_ref()
    }
}
