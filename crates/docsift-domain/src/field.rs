//! Field module - declared output columns

use serde::{Deserialize, Serialize};
use std::fmt;

/// Type tag of a declared field
///
/// The set is closed: anything else in a task declaration is rejected when the
/// task is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Any text
    String,

    /// A finite numeric value
    Number,

    /// A true/false flag
    Boolean,

    /// An ISO-8601 calendar date (`YYYY-MM-DD`)
    Date,
}

impl FieldType {
    /// All type tags, in declaration order
    pub const ALL: [FieldType; 4] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Date,
    ];

    /// Get the type tag as it appears on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
        }
    }

    /// Parse a type token, ignoring case and surrounding whitespace
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" => Some(FieldType::String),
            "number" => Some(FieldType::Number),
            "boolean" => Some(FieldType::Boolean),
            "date" => Some(FieldType::Date),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid field type: {}", s))
    }
}

/// One declared output column of an extraction task
///
/// `type` is kept as the raw token: an unknown token must surface as a
/// compilation error for its own task rather than fail the whole request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Output key, unique within its task
    #[serde(default)]
    pub name: String,

    /// Raw type token (`string`, `number`, `boolean` or `date`)
    ///
    /// A missing token deserializes as empty and fails compilation.
    #[serde(rename = "type", default)]
    pub type_token: String,

    /// Free text used only to enrich the extraction instruction
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Whether absence or a type failure invalidates the whole record
    #[serde(default)]
    pub mandatory: bool,

    /// Whether the task yields zero or more rows instead of one record
    #[serde(default)]
    pub multi_row: bool,
}

impl FieldSpec {
    /// Create an optional, single-record field
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            type_token: field_type.as_str().to_string(),
            description: None,
            mandatory: false,
            multi_row: false,
        }
    }

    /// Mark the field as mandatory
    pub fn mandatory(mut self) -> Self {
        self.mandatory = true;
        self
    }

    /// Mark the field as row-producing
    pub fn multi_row(mut self) -> Self {
        self.multi_row = true;
        self
    }

    /// Attach a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The parsed type tag, if the token is valid
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(&self.type_token)
    }

    /// The description, treating blank text as absent
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
