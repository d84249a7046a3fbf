//! Item values as a closed set of kinds.
//!
//! Request bodies arrive as JSON; [`Value::from_json`] turns them into
//! [`Value`]s with the caller deciding whether arrays are lists or sets.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use serde_json::Number;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    #[error("Set member {index} does not match the type of the first member")]
    MixedSet { index: usize },
    #[error("Set member {index} is not a string or number")]
    UnsupportedSetMember { index: usize },
    #[error("Duplicate set member at {index}")]
    DuplicateSetMember { index: usize },
}

/// How JSON arrays are read at the API boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ArrayKind {
    #[default]
    List,
    Set,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(Number),
    Boolean(bool),
    Null,
    List(Vec<Value>),
    Set(Set),
    Map(Fields),
}

/// Homogeneous, duplicate-free collection of primitives.
///
/// Member order is kept for encoding but ignored by equality.
#[derive(Debug, Clone)]
pub enum Set {
    Strings(Vec<String>),
    Numbers(Vec<Number>),
}

impl Set {
    pub fn len(&self) -> usize {
        match self {
            Set::Strings(members) => members.len(),
            Set::Numbers(members) => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn same_members<T: PartialEq>(a: &[T], b: &[T]) -> bool {
    a.len() == b.len() && a.iter().all(|member| b.contains(member))
}

impl PartialEq for Set {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Set::Strings(a), Set::Strings(b)) => same_members(a, b),
            (Set::Numbers(a), Set::Numbers(b)) => same_members(a, b),
            _ => false,
        }
    }
}

impl Value {
    pub fn from_json(json: serde_json::Value, arrays: ArrayKind) -> Result<Self, ValueError> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(elements) if elements.is_empty() => Value::List(Vec::new()),
            serde_json::Value::Array(elements) => match arrays {
                ArrayKind::List => Value::List(
                    elements
                        .into_iter()
                        .map(|e| Value::from_json(e, arrays))
                        .collect::<Result<_, _>>()?,
                ),
                ArrayKind::Set => set_from_json(elements)?,
            },
            serde_json::Value::Object(map) => Value::Map(Fields::from_json(map, arrays)?),
        })
    }

    /// Builds a string set. Empty input yields an empty list.
    pub fn string_set<I, S>(members: I) -> Result<Self, ValueError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Vec<String> = members.into_iter().map(Into::into).collect();
        if members.is_empty() {
            return Ok(Value::List(Vec::new()));
        }
        check_unique(&members)?;
        Ok(Value::Set(Set::Strings(members)))
    }

    /// Builds a number set. Empty input yields an empty list.
    pub fn number_set<I>(members: I) -> Result<Self, ValueError>
    where
        I: IntoIterator<Item = Number>,
    {
        let members: Vec<Number> = members.into_iter().collect();
        if members.is_empty() {
            return Ok(Value::List(Vec::new()));
        }
        check_unique(&members)?;
        Ok(Value::Set(Set::Numbers(members)))
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Null => serde_json::Value::Null,
            Value::List(elements) => {
                serde_json::Value::Array(elements.iter().map(Value::to_json).collect())
            }
            Value::Set(Set::Strings(members)) => serde_json::Value::Array(
                members
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect(),
            ),
            Value::Set(Set::Numbers(members)) => serde_json::Value::Array(
                members
                    .iter()
                    .cloned()
                    .map(serde_json::Value::Number)
                    .collect(),
            ),
            Value::Map(fields) => serde_json::Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<Fields> for Value {
    fn from(fields: Fields) -> Self {
        Value::Map(fields)
    }
}

fn set_from_json(elements: Vec<serde_json::Value>) -> Result<Value, ValueError> {
    match &elements[0] {
        serde_json::Value::String(_) => {
            let mut members = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                match element {
                    serde_json::Value::String(s) => members.push(s),
                    _ => return Err(ValueError::MixedSet { index }),
                }
            }
            Value::string_set(members)
        }
        serde_json::Value::Number(_) => {
            let mut members = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                match element {
                    serde_json::Value::Number(n) => members.push(n),
                    _ => return Err(ValueError::MixedSet { index }),
                }
            }
            Value::number_set(members)
        }
        _ => Err(ValueError::UnsupportedSetMember { index: 0 }),
    }
}

fn check_unique<T: PartialEq>(members: &[T]) -> Result<(), ValueError> {
    for (index, member) in members.iter().enumerate() {
        if members[..index].contains(member) {
            return Err(ValueError::DuplicateSetMember { index });
        }
    }
    Ok(())
}

/// Field name to value mapping that keeps insertion order.
///
/// Order matters for update expressions and response bodies; equality does
/// not look at it, since stored maps come back unordered.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    entries: Vec<(String, Value)>,
}

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(
        map: serde_json::Map<String, serde_json::Value>,
        arrays: ArrayKind,
    ) -> Result<Self, ValueError> {
        let mut fields = Fields::new();
        for (key, value) in map {
            fields.insert(key, Value::from_json(value, arrays)?);
        }
        Ok(fields)
    }

    /// Inserts or replaces a field. A replaced field keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sort_keys(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
}

impl PartialEq for Fields {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut fields = Fields::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::String(s) => serializer.serialize_str(s),
            Value::Number(n) => n.serialize(serializer),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Null => serializer.serialize_unit(),
            Value::List(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Set(Set::Strings(members)) => members.serialize(serializer),
            Value::Set(Set::Numbers(members)) => members.serialize(serializer),
            Value::Map(fields) => fields.serialize(serializer),
        }
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
