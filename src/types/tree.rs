//! Runtime representation of a populated resource.
//!
//! A [`ResourceTree`] is an ordered map from field name to [`Value`].
//! Presence is explicit: a field is absent when its key is missing, so a
//! legitimately zero or empty scalar (`0`, `false`, `""`) still counts as
//! populated. An empty list carries no elements and is treated as absent.

use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{FhirConformanceError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    Boolean(bool),
    Number(serde_json::Number),
    String(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Scalar::Boolean(_) => "boolean",
            Scalar::Number(_) => "number",
            Scalar::String(_) => "string",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Boolean(b) => write!(f, "{b}"),
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::String(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Scalar {
    fn from(value: bool) -> Self {
        Scalar::Boolean(value)
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<i32> for Scalar {
    fn from(value: i32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<u32> for Scalar {
    fn from(value: u32) -> Self {
        Scalar::Number(value.into())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::String(value.to_string())
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::String(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Scalar(Scalar),
    Node(ResourceTree),
    List(Vec<Value>),
}

impl Value {
    pub fn is_populated(&self) -> bool {
        match self {
            Value::List(items) => !items.is_empty(),
            Value::Scalar(_) | Value::Node(_) => true,
        }
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Node(_) => "object",
            Value::List(_) => "list",
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Value::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&ResourceTree> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Converts a JSON value. `null` yields `None`, i.e. an absent field.
    pub fn from_json(value: &JsonValue) -> Result<Option<Self>> {
        let converted = match value {
            JsonValue::Null => return Ok(None),
            JsonValue::Bool(b) => Value::Scalar(Scalar::Boolean(*b)),
            JsonValue::Number(n) => Value::Scalar(Scalar::Number(n.clone())),
            JsonValue::String(s) => Value::Scalar(Scalar::String(s.clone())),
            JsonValue::Object(_) => Value::Node(ResourceTree::from_json(value)?),
            JsonValue::Array(items) => {
                let mut list = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    match Value::from_json(item)? {
                        Some(converted) => list.push(converted),
                        None => {
                            return Err(FhirConformanceError::invalid_document(format!(
                                "null entry at array index {index}"
                            )));
                        }
                    }
                }
                Value::List(list)
            }
        };
        Ok(Some(converted))
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

macro_rules! scalar_value_from {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::Scalar(value.into())
                }
            }
        )*
    };
}

scalar_value_from!(bool, i64, i32, u32, &str, String);

impl From<ResourceTree> for Value {
    fn from(tree: ResourceTree) -> Self {
        Value::Node(tree)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceTree {
    fields: BTreeMap<String, Value>,
}

impl ResourceTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a resource node carrying `resourceType`.
    pub fn resource(resource_type: &str) -> Self {
        Self::new().with(crate::types::DEFAULT_DISCRIMINATOR_FIELD, resource_type)
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn with_list<I, V>(mut self, name: impl Into<String>, items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.insert(name, Value::List(items.into_iter().map(Into::into).collect()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        self.fields.get_mut(name)
    }

    /// True when the field holds a value other than an empty list.
    pub fn is_populated(&self, name: &str) -> bool {
        self.get(name).is_some_and(Value::is_populated)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of nodes, counting this one.
    pub fn node_count(&self) -> usize {
        fn count(value: &Value) -> usize {
            match value {
                Value::Scalar(_) => 0,
                Value::Node(node) => node.node_count(),
                Value::List(items) => items.iter().map(count).sum(),
            }
        }
        1 + self.fields.values().map(count).sum::<usize>()
    }

    /// Builds a tree from a JSON object. `null` members are dropped.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| {
            FhirConformanceError::invalid_document("resource root must be a JSON object")
        })?;

        let mut tree = ResourceTree::new();
        for (key, member) in object {
            if let Some(converted) = Value::from_json(member)? {
                tree.fields.insert(key.clone(), converted);
            }
        }
        Ok(tree)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_json(&value)
    }
}
