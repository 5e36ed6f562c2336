//! Field schemas supplied by the caller.
//!
//! A schema declares which fields a query may reference and what type of
//! value each field holds. Names are matched case-insensitively.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// The value type of a queryable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Date,
    Boolean,
}

impl FieldType {
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
        }
    }

    /// Whether range operators (`>=`, `<`, `..`) make sense for this type.
    pub fn is_ordered(self) -> bool {
        matches!(self, FieldType::Number | FieldType::Date)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "string" | "text" => Ok(FieldType::String),
            "number" | "numeric" => Ok(FieldType::Number),
            "date" => Ok(FieldType::Date),
            "boolean" | "bool" => Ok(FieldType::Boolean),
            other => Err(format!(
                "Unknown field type '{}'. Expected: string, number, date, or boolean",
                other
            )),
        }
    }
}

/// Declaration of one queryable column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

impl FieldSchema {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Date)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }
}

impl FromStr for FieldSchema {
    type Err = String;

    /// Parse the `name:type` shorthand used on the command line.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, ty) = s
            .split_once(':')
            .ok_or_else(|| format!("Expected 'name:type', got '{}'", s))?;
        if name.is_empty() {
            return Err(format!("Missing field name in '{}'", s));
        }
        Ok(FieldSchema::new(name, ty.parse()?))
    }
}

/// Lower-cased name → schema lookup table.
///
/// An empty map means unrestricted mode: field references are not checked.
#[derive(Debug, Clone, Default)]
pub struct SchemaMap<'a> {
    fields: HashMap<String, &'a FieldSchema>,
}

impl<'a> SchemaMap<'a> {
    pub fn new(schemas: &'a [FieldSchema]) -> Self {
        let fields = schemas
            .iter()
            .map(|schema| (schema.name.to_lowercase(), schema))
            .collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&'a FieldSchema> {
        self.fields.get(&field.to_lowercase()).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Declared names, as written in the schema (for suggestions).
    pub fn names(&self) -> Vec<&'a str> {
        let mut names: Vec<&str> = self.fields.values().map(|s| s.name.as_str()).collect();
        names.sort_unstable();
        names
    }
}
