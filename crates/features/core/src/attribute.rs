//! Typed attribute definitions and their values.

use crate::error::AttributeError;
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumString};

/// Declared type of an attribute. The lowercase names appear in JSON discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AttributeType {
    #[default]
    String,
    Int,
    Float,
    Bool,
}

/// A concrete attribute value.
///
/// `Display` is the canonical wire coercion: floats use two decimals,
/// booleans are `y`/`n`.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl AttributeValue {
    #[must_use]
    pub const fn attribute_type(&self) -> AttributeType {
        match self {
            Self::String(_) => AttributeType::String,
            Self::Int(_) => AttributeType::Int,
            Self::Float(_) => AttributeType::Float,
            Self::Bool(_) => AttributeType::Bool,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Whether `filter` selects this stored value.
    ///
    /// The filter is coerced through this value's type first, so the string
    /// `"2.0"` matches the float `2.0`.
    #[must_use]
    pub fn matches(&self, filter: &Self) -> bool {
        if self.attribute_type() == filter.attribute_type() {
            return self == filter;
        }
        coerce_str("", self.attribute_type(), &filter.to_string())
            .is_ok_and(|coerced| coerced == *self)
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v:.2}"),
            Self::Bool(b) => f.write_str(if *b { "y" } else { "n" }),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Definition of a named, typed attribute on a Kind, Mixin or Action.
///
/// Attributes are optional and mutable unless declared otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Attribute {
    name: String,
    kind: AttributeType,
    required: bool,
    mutable: bool,
}

impl Attribute {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: AttributeType) -> Self {
        Self { name: name.into(), kind, required: false, mutable: true }
    }

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::String)
    }

    #[must_use]
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Int)
    }

    #[must_use]
    pub fn float(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Float)
    }

    #[must_use]
    pub fn bool(name: impl Into<String>) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn immutable(mut self) -> Self {
        self.mutable = false;
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> AttributeType {
        self.kind
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.required
    }

    #[must_use]
    pub const fn is_mutable(&self) -> bool {
        self.mutable
    }

    /// Coerces a wire string into this attribute's type.
    ///
    /// # Errors
    /// [`AttributeError::Invalid`] naming the attribute and the rejected value.
    pub fn from_string(&self, value: &str) -> Result<AttributeValue, AttributeError> {
        coerce_str(&self.name, self.kind, value)
    }

    /// Renders a value using this attribute's wire coercion.
    #[must_use]
    pub fn to_string(&self, value: &AttributeValue) -> String {
        match (self.kind, value) {
            (AttributeType::Float, AttributeValue::Int(i)) => format!("{i}.00"),
            _ => value.to_string(),
        }
    }

    /// Brings an arbitrary value to this attribute's type.
    ///
    /// Values already of the right type are kept untouched; anything else goes
    /// through its string form and [`Attribute::from_string`].
    ///
    /// # Errors
    /// [`AttributeError::Invalid`] when the value cannot be represented.
    #[allow(clippy::cast_precision_loss)]
    pub fn coerce(&self, value: AttributeValue) -> Result<AttributeValue, AttributeError> {
        if value.attribute_type() == self.kind {
            return Ok(value);
        }
        match value {
            AttributeValue::String(s) => self.from_string(&s),
            AttributeValue::Int(i) if self.kind == AttributeType::Float => {
                Ok(AttributeValue::Float(i as f64))
            },
            other => self.from_string(&other.to_string()),
        }
    }

    /// Discovery form of the name: `name{required}`, `name{immutable}` or `name`.
    #[must_use]
    pub fn discovery_name(&self) -> String {
        if self.required {
            format!("{}{{required}}", self.name)
        } else if !self.mutable {
            format!("{}{{immutable}}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Parses the discovery form produced by [`Attribute::discovery_name`].
    #[must_use]
    pub fn from_discovery_name(spec: &str) -> Self {
        if let Some(name) = spec.strip_suffix("{required}") {
            Self::string(name).required()
        } else if let Some(name) = spec.strip_suffix("{immutable}") {
            Self::string(name).immutable()
        } else {
            Self::string(spec)
        }
    }
}

fn coerce_str(name: &str, kind: AttributeType, value: &str) -> Result<AttributeValue, AttributeError> {
    let invalid = || AttributeError::Invalid { name: name.to_owned(), value: value.to_owned() };
    match kind {
        AttributeType::String => Ok(AttributeValue::String(value.to_owned())),
        AttributeType::Int => value.trim().parse().map(AttributeValue::Int).map_err(|_| invalid()),
        AttributeType::Float => {
            value.trim().parse().map(AttributeValue::Float).map_err(|_| invalid())
        },
        AttributeType::Bool => match value {
            "y" => Ok(AttributeValue::Bool(true)),
            "n" => Ok(AttributeValue::Bool(false)),
            _ => Err(invalid()),
        },
    }
}
