//! Schema - Attribute schemas for resource configuration
//!
//! Provider crates declare a schema per resource type, enabling validation
//! of a decoded configuration before any translation happens. Mutually
//! exclusive attributes declare each other through `conflicts_with`.

use std::collections::HashMap;
use std::fmt;

use crate::value::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    String,
    Int,
    Float,
    Bool,
    /// Integer constrained to an inclusive range
    IntBetween(i64, i64),
    /// Custom type (with validation function)
    Custom {
        name: String,
        validate: fn(&Value) -> Result<(), String>,
    },
    List(Box<AttributeType>),
    /// Nested block: a single-element list of a map with its own schema
    Block(Box<ResourceSchema>),
}

impl AttributeType {
    /// Check if a value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Float, Value::Float(_) | Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::IntBetween(min, max), Value::Int(n)) => {
                if (*min..=*max).contains(n) {
                    Ok(())
                } else {
                    Err(TypeError::OutOfRange {
                        min: *min,
                        max: *max,
                        got: *n,
                    })
                }
            }

            (AttributeType::Custom { validate, .. }, v) => {
                validate(v).map_err(|message| TypeError::ValidationFailed { message })
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.validate(item).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            // A block may be written inline or as a single-element list of
            // one map; an empty list counts as absent.
            (AttributeType::Block(schema), Value::Map(map)) => schema.validate_block(map),
            (AttributeType::Block(schema), Value::List(items)) => match items.as_slice() {
                [] => Ok(()),
                [Value::Map(map)] => schema.validate_block(map),
                _ => Err(TypeError::TypeMismatch {
                    expected: self.type_name(),
                    got: value.type_name().to_string(),
                }),
            },

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name().to_string(),
            }),
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Float => "Float".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::IntBetween(min, max) => format!("IntBetween({min}, {max})"),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Block(schema) => format!("Block<{}>", schema.resource_type),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Type error
#[derive(Debug, Clone, thiserror::Error)]
pub enum TypeError {
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Required attribute '{name}' is missing")]
    MissingRequired { name: String },

    #[error("Attribute '{name}' conflicts with '{with}'")]
    Conflict { name: String, with: String },

    #[error("Value must be between {min} and {max}, got {got}")]
    OutOfRange { min: i64, max: i64, got: i64 },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    /// Sibling attributes that may not be set together with this one
    pub conflicts_with: Vec<String>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            conflicts_with: Vec::new(),
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn conflicts_with(mut self, siblings: Vec<String>) -> Self {
        self.conflicts_with = siblings;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    /// Validate a decoded attribute map against this schema
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        for (name, schema) in &self.attributes {
            if schema.required && !attributes.contains_key(name) {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        for (name, value) in attributes {
            let Some(schema) = self.attributes.get(name) else {
                // Unknown attributes are allowed (for extensibility)
                continue;
            };

            if let Err(e) = schema.attr_type.validate(value) {
                errors.push(e);
            }

            for sibling in &schema.conflicts_with {
                if attributes.contains_key(sibling) {
                    errors.push(TypeError::Conflict {
                        name: name.clone(),
                        with: sibling.clone(),
                    });
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validate a nested block's attribute map, surfacing the first error
    fn validate_block(&self, attributes: &HashMap<String, Value>) -> Result<(), TypeError> {
        match self.validate(attributes) {
            Ok(()) => Ok(()),
            Err(errors) => {
                Err(errors
                    .into_iter()
                    .next()
                    .unwrap_or(TypeError::ValidationFailed {
                        message: "invalid block".to_string(),
                    }))
            }
        }
    }
}

/// Build a conflicts-with list from the full sibling set, excluding the
/// attribute the list is for. Always allocates a fresh Vec: the caller may
/// reuse `all` for every sibling without one call's result aliasing
/// another's backing storage.
pub fn conflicts_excluding(all: &[&str], except: &str) -> Vec<String> {
    all.iter()
        .filter(|name| **name != except)
        .map(|name| (*name).to_string())
        .collect()
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// Integer constrained to an inclusive range
    pub fn int_between(min: i64, max: i64) -> AttributeType {
        AttributeType::IntBetween(min, max)
    }

    /// Non-empty string
    pub fn non_empty_string() -> AttributeType {
        AttributeType::Custom {
            name: "NonEmptyString".to_string(),
            validate: |value| match value {
                Value::String(s) if !s.is_empty() => Ok(()),
                Value::String(_) => Err("value must not be empty".to_string()),
                _ => Err("expected string".to_string()),
            },
        }
    }
}
