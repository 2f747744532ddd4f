//! Schema - Define type schemas for resources
//!
//! Providers define schemas for each resource type and data source. The same
//! schema validates user configuration, supplies static defaults, decides
//! which changes force replacement, and guards every value written back into
//! state.

use std::collections::HashMap;
use std::fmt;

use crate::resource::Value;

/// Attribute type
#[derive(Debug, Clone)]
pub enum AttributeType {
    /// String
    String,
    /// Integer
    Int,
    /// Boolean
    Bool,
    /// Custom type (with validation function)
    Custom {
        name: String,
        base: Box<AttributeType>,
        validate: fn(&Value) -> Result<(), String>,
    },
    /// List
    List(Box<AttributeType>),
    /// Map
    Map(Box<AttributeType>),
    /// Nested record with its own attribute schemas
    Object(HashMap<String, AttributeSchema>),
}

/// Whether a value is checked as user configuration or as state read back from the service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Config,
    State,
}

impl AttributeType {
    /// Check if a configuration value conforms to this type
    pub fn validate(&self, value: &Value) -> Result<(), TypeError> {
        self.check(value, Mode::Config)
    }

    /// Check only the shape of a value (no required/computed rules)
    pub fn check_shape(&self, value: &Value) -> Result<(), TypeError> {
        self.check(value, Mode::State)
    }

    fn check(&self, value: &Value, mode: Mode) -> Result<(), TypeError> {
        match (self, value) {
            (AttributeType::String, Value::String(_)) => Ok(()),
            (AttributeType::Int, Value::Int(_)) => Ok(()),
            (AttributeType::Bool, Value::Bool(_)) => Ok(()),

            (AttributeType::Custom { validate, base, .. }, v) => {
                base.check(v, mode)?;
                if mode == Mode::Config {
                    validate(v).map_err(|msg| TypeError::ValidationFailed { message: msg })?;
                }
                Ok(())
            }

            (AttributeType::List(inner), Value::List(items)) => {
                for (i, item) in items.iter().enumerate() {
                    inner.check(item, mode).map_err(|e| TypeError::ListItemError {
                        index: i,
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Map(inner), Value::Map(map)) => {
                for (k, v) in map {
                    inner.check(v, mode).map_err(|e| TypeError::MapValueError {
                        key: k.clone(),
                        inner: Box::new(e),
                    })?;
                }
                Ok(())
            }

            (AttributeType::Object(attributes), Value::Map(map)) => {
                check_object(attributes, map, mode)
            }

            _ => Err(TypeError::TypeMismatch {
                expected: self.type_name(),
                got: value.type_name(),
            }),
        }
    }

    /// Attribute schemas of a nested record, looking through a block list
    pub fn object_schema(&self) -> Option<&HashMap<String, AttributeSchema>> {
        match self {
            AttributeType::Object(attributes) => Some(attributes),
            AttributeType::List(inner) => inner.object_schema(),
            _ => None,
        }
    }

    fn type_name(&self) -> String {
        match self {
            AttributeType::String => "String".to_string(),
            AttributeType::Int => "Int".to_string(),
            AttributeType::Bool => "Bool".to_string(),
            AttributeType::Custom { name, .. } => name.clone(),
            AttributeType::List(inner) => format!("List<{}>", inner.type_name()),
            AttributeType::Map(inner) => format!("Map<{}>", inner.type_name()),
            AttributeType::Object(_) => "Object".to_string(),
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

fn check_object(
    attributes: &HashMap<String, AttributeSchema>,
    map: &HashMap<String, Value>,
    mode: Mode,
) -> Result<(), TypeError> {
    if mode == Mode::Config {
        for (name, schema) in attributes {
            if schema.required && !map.contains_key(name) && schema.default.is_none() {
                return Err(TypeError::MissingRequired { name: name.clone() });
            }
        }
    }

    for (name, value) in map {
        let schema = attributes
            .get(name)
            .ok_or_else(|| TypeError::UnknownAttribute { name: name.clone() })?;
        schema.check(value, mode)?;
    }
    Ok(())
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

    #[error("Unknown attribute '{name}'")]
    UnknownAttribute { name: String },

    #[error("Attribute '{name}' is computed and cannot be set")]
    ComputedAttribute { name: String },

    #[error("Attribute '{name}' allows at most {max} items, got {got}")]
    TooManyItems { name: String, max: usize, got: usize },

    #[error("{name}: {inner}")]
    AttributeError { name: String, inner: Box<TypeError> },

    #[error("List item at index {index}: {inner}")]
    ListItemError { index: usize, inner: Box<TypeError> },

    #[error("Map value for key '{key}': {inner}")]
    MapValueError { key: String, inner: Box<TypeError> },
}

impl TypeError {
    /// Name of the top-level attribute this error concerns, if known
    pub fn attribute(&self) -> Option<&str> {
        match self {
            TypeError::MissingRequired { name }
            | TypeError::UnknownAttribute { name }
            | TypeError::ComputedAttribute { name }
            | TypeError::TooManyItems { name, .. }
            | TypeError::AttributeError { name, .. } => Some(name),
            _ => None,
        }
    }
}

impl Value {
    fn type_name(&self) -> String {
        match self {
            Value::String(_) => "String".to_string(),
            Value::Int(_) => "Int".to_string(),
            Value::Bool(_) => "Bool".to_string(),
            Value::List(_) => "List".to_string(),
            Value::Map(_) => "Map".to_string(),
        }
    }
}

/// Attribute schema
#[derive(Debug, Clone)]
pub struct AttributeSchema {
    pub name: String,
    pub attr_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    /// Set by the service; user configuration may only supply it when also optional
    pub computed: bool,
    /// A change to this attribute replaces the resource instead of updating it
    pub force_new: bool,
    pub default: Option<Value>,
    pub max_items: Option<usize>,
    pub description: Option<String>,
}

impl AttributeSchema {
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            default: None,
            max_items: None,
            description: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn computed(mut self) -> Self {
        self.computed = true;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_max_items(mut self, max: usize) -> Self {
        self.max_items = Some(max);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// True when only the service may set this attribute
    pub fn is_computed_only(&self) -> bool {
        self.computed && !self.required && !self.optional
    }

    fn check(&self, value: &Value, mode: Mode) -> Result<(), TypeError> {
        if mode == Mode::Config && self.is_computed_only() {
            return Err(TypeError::ComputedAttribute {
                name: self.name.clone(),
            });
        }

        self.attr_type
            .check(value, mode)
            .map_err(|e| TypeError::AttributeError {
                name: self.name.clone(),
                inner: Box::new(e),
            })?;

        if mode == Mode::Config
            && let (Some(max), Value::List(items)) = (self.max_items, value)
            && items.len() > max
        {
            return Err(TypeError::TooManyItems {
                name: self.name.clone(),
                max,
                got: items.len(),
            });
        }
        Ok(())
    }
}

/// Resource schema
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub resource_type: String,
    pub attributes: HashMap<String, AttributeSchema>,
    pub description: Option<String>,
}

impl ResourceSchema {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            attributes: HashMap::new(),
            description: None,
        }
    }

    pub fn attribute(mut self, schema: AttributeSchema) -> Self {
        self.attributes.insert(schema.name.clone(), schema);
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&AttributeSchema> {
        self.attributes.get(name)
    }

    /// Validate resource attributes
    pub fn validate(&self, attributes: &HashMap<String, Value>) -> Result<(), Vec<TypeError>> {
        let mut errors = Vec::new();

        // Check required attributes
        for (name, schema) in &self.attributes {
            if schema.required && !attributes.contains_key(name) && schema.default.is_none() {
                errors.push(TypeError::MissingRequired { name: name.clone() });
            }
        }

        // Type check each attribute
        for (name, value) in attributes {
            if let Some(schema) = self.attributes.get(name)
                && let Err(e) = schema.check(value, Mode::Config)
            {
                errors.push(e);
            }
            // Unknown top-level attributes are allowed (for flexibility)
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Fill in static defaults, including inside nested blocks
    pub fn apply_defaults(&self, attributes: &mut HashMap<String, Value>) {
        apply_object_defaults(&self.attributes, attributes);
    }

    /// Force-new attributes whose desired value differs from the current state
    ///
    /// Defaults are applied to both sides first. A member set in the current
    /// state but dropped from the desired configuration counts as a change,
    /// unless it is computed: the service fills those in.
    pub fn replacement_attributes(
        &self,
        current: &HashMap<String, Value>,
        desired: &HashMap<String, Value>,
    ) -> Vec<String> {
        let mut current = current.clone();
        let mut desired = desired.clone();
        self.apply_defaults(&mut current);
        self.apply_defaults(&mut desired);

        let mut names: Vec<String> = self
            .attributes
            .values()
            .filter(|schema| schema.force_new)
            .filter(|schema| match desired.get(&schema.name) {
                Some(want) => differs(
                    want,
                    current.get(&schema.name),
                    schema.attr_type.object_schema(),
                ),
                None => !schema.computed && current.contains_key(&schema.name),
            })
            .map(|schema| schema.name.clone())
            .collect();
        names.sort();
        names
    }
}

fn apply_object_defaults(
    schemas: &HashMap<String, AttributeSchema>,
    attributes: &mut HashMap<String, Value>,
) {
    for (name, schema) in schemas {
        if !attributes.contains_key(name)
            && let Some(default) = &schema.default
        {
            attributes.insert(name.clone(), default.clone());
        }

        let Some(nested) = schema.attr_type.object_schema() else {
            continue;
        };
        match attributes.get_mut(name) {
            Some(Value::Map(map)) => apply_object_defaults(nested, map),
            Some(Value::List(items)) => {
                for item in items {
                    if let Value::Map(map) = item {
                        apply_object_defaults(nested, map);
                    }
                }
            }
            _ => {}
        }
    }
}

fn differs(
    desired: &Value,
    current: Option<&Value>,
    nested: Option<&HashMap<String, AttributeSchema>>,
) -> bool {
    let Some(current) = current else {
        return true;
    };
    match (desired, current) {
        (Value::Map(want), Value::Map(have)) => {
            let member = |k: &str| nested.and_then(|n| n.get(k));
            let changed = want.iter().any(|(k, v)| {
                differs(v, have.get(k), member(k.as_str()).and_then(|s| s.attr_type.object_schema()))
            });
            let dropped = have
                .keys()
                .filter(|k| !want.contains_key(*k))
                .any(|k| !member(k.as_str()).is_some_and(|s| s.computed));
            changed || dropped
        }
        (Value::List(want), Value::List(have)) => {
            want.len() != have.len()
                || want.iter().zip(have).any(|(w, h)| differs(w, Some(h), nested))
        }
        _ => desired != current,
    }
}

/// Accumulates state attributes, rejecting values the schema does not declare
/// or whose shape does not match.
pub struct StateBuilder<'a> {
    schema: &'a ResourceSchema,
    attributes: HashMap<String, Value>,
}

impl<'a> StateBuilder<'a> {
    pub fn new(schema: &'a ResourceSchema) -> Self {
        Self {
            schema,
            attributes: HashMap::new(),
        }
    }

    /// Set one attribute
    pub fn set(&mut self, name: &str, value: Value) -> Result<(), TypeError> {
        let schema = self
            .schema
            .get(name)
            .ok_or_else(|| TypeError::UnknownAttribute {
                name: name.to_string(),
            })?;
        schema.check(&value, Mode::State)?;
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Copy every declared attribute of `values`; undeclared names are skipped
    pub fn merge(&mut self, values: HashMap<String, Value>) -> Result<(), TypeError> {
        for (name, value) in values {
            if self.schema.get(&name).is_some() {
                self.set(&name, value)?;
            }
        }
        Ok(())
    }

    pub fn build(self) -> HashMap<String, Value> {
        self.attributes
    }
}

/// Keep the declared members of a record and check their shape
pub fn project_object(
    schemas: &HashMap<String, AttributeSchema>,
    values: HashMap<String, Value>,
) -> Result<HashMap<String, Value>, TypeError> {
    let mut out = HashMap::new();
    for (name, value) in values {
        if let Some(schema) = schemas.get(&name) {
            schema.check(&value, Mode::State)?;
            out.insert(name, value);
        }
    }
    Ok(out)
}

/// Helper functions for common types
pub mod types {
    use super::*;

    /// List of strings
    pub fn string_list() -> AttributeType {
        AttributeType::List(Box::new(AttributeType::String))
    }

    /// Nested block: a list holding records of the given attributes
    pub fn block(attributes: Vec<AttributeSchema>) -> AttributeType {
        AttributeType::List(Box::new(object(attributes)))
    }

    /// Nested record of the given attributes
    pub fn object(attributes: Vec<AttributeSchema>) -> AttributeType {
        AttributeType::Object(
            attributes
                .into_iter()
                .map(|a| (a.name.clone(), a))
                .collect(),
        )
    }

    /// Secret group name: 2 to 64 characters, starting with a letter or digit
    pub fn secret_group_name() -> AttributeType {
        AttributeType::Custom {
            name: "SecretGroupName".to_string(),
            base: Box::new(AttributeType::String),
            validate: |value| {
                if let Value::String(s) = value {
                    validate_secret_group_name(s)
                } else {
                    Err("Expected string".to_string())
                }
            },
        }
    }
}

/// Validate a secret group name (e.g., "tf_name_42")
pub fn validate_secret_group_name(name: &str) -> Result<(), String> {
    let len = name.chars().count();
    if !(2..=64).contains(&len) {
        return Err(format!(
            "Invalid name '{}': must be 2-64 characters, got {}",
            name, len
        ));
    }
    if !name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric()) {
        return Err(format!(
            "Invalid name '{}': must start with a letter or digit",
            name
        ));
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')))
    {
        return Err(format!("Invalid name '{}': character '{}' not allowed", name, c));
    }
    Ok(())
}
