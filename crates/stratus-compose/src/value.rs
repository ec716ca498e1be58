//! Configuration values and lazily-resolved references.
//!
//! A [`Value`] is what a resource's configuration holds at construction time.
//! Runtime attributes of other resources are never literals: they are carried
//! as [`Value::Ref`] placeholders and only turned into deferred tokens during
//! synthesis.

use std::collections::BTreeMap;
use std::fmt;

/// A pointer to a runtime attribute of a declared resource.
///
/// References can only be obtained from a [`UnitBuilder`](crate::unit::UnitBuilder)
/// or a [`ResourceHandle`](crate::unit::ResourceHandle), which validate the
/// target and the attribute name when the reference is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Reference {
    unit: String,
    identifier: String,
    attribute: String,
}

impl Reference {
    pub(crate) fn new(
        unit: impl Into<String>,
        identifier: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        Self {
            unit: unit.into(),
            identifier: identifier.into(),
            attribute: attribute.into(),
        }
    }

    /// Unit owning the target resource.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Identifier of the target resource.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Attribute of the target resource.
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// Renders the deferred token the provisioning engine resolves at apply time.
    ///
    /// References into the unit being rendered are written `${identifier.attribute}`;
    /// references into an imported unit are qualified as `${unit::identifier.attribute}`.
    #[must_use]
    pub fn token(&self, from_unit: &str) -> String {
        if self.unit == from_unit {
            format!("${{{}.{}}}", self.identifier, self.attribute)
        } else {
            format!("${{{}::{}.{}}}", self.unit, self.identifier, self.attribute)
        }
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}.{}", self.unit, self.identifier, self.attribute)
    }
}

/// A configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit absence of a value.
    Null,
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// String literal.
    String(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested key-sorted mapping.
    Map(BTreeMap<String, Value>),
    /// Unresolved reference to another resource's attribute.
    Ref(Reference),
}

impl Value {
    /// Builds an empty list value.
    #[must_use]
    pub const fn list() -> Self {
        Self::List(Vec::new())
    }

    /// Returns the string literal, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer, if this is one.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the list items, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the reference, if this is one.
    #[must_use]
    pub const fn as_reference(&self) -> Option<&Reference> {
        match self {
            Self::Ref(r) => Some(r),
            _ => None,
        }
    }

    /// Collects every reference contained in this value, depth first.
    #[must_use]
    pub fn references(&self) -> Vec<&Reference> {
        let mut found = Vec::new();
        self.collect_references(&mut found);
        found
    }

    fn collect_references<'a>(&'a self, found: &mut Vec<&'a Reference>) {
        match self {
            Self::Ref(r) => found.push(r),
            Self::List(items) => {
                for item in items {
                    item.collect_references(found);
                }
            }
            Self::Map(map) => {
                for value in map.values() {
                    value.collect_references(found);
                }
            }
            Self::Null | Self::Bool(_) | Self::Integer(_) | Self::Float(_) | Self::String(_) => {}
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u16> for Value {
    fn from(v: u16) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Reference> for Value {
    fn from(v: Reference) -> Self {
        Self::Ref(v)
    }
}

impl From<Properties> for Value {
    fn from(v: Properties) -> Self {
        Self::Map(v.0)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// A key-sorted configuration mapping.
///
/// Used both for a resource's top-level configuration and for nested blocks
/// such as a health check or a lifecycle rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Properties(BTreeMap<String, Value>);

impl Properties {
    /// Creates an empty mapping.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Sets `key` to `value`, returning the updated mapping.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let _ = self.0.insert(key.into(), value.into());
        self
    }

    /// Sets `key` to `value`, returning the previous value if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Returns the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable handle to the value under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    /// Whether `key` is set.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Iterates over entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every reference contained in any value, in key order.
    #[must_use]
    pub fn references(&self) -> Vec<&Reference> {
        let mut found = Vec::new();
        for value in self.0.values() {
            value.collect_references(&mut found);
        }
        found
    }
}

impl IntoIterator for Properties {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
