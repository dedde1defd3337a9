//! Compiled contract types

use docsift_domain::FieldType;
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Validation rule for one declared field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldRule {
    /// Output key
    pub name: String,

    /// Declared type
    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Whether a violation on this field rejects the record
    pub mandatory: bool,

    /// Description carried into the instruction
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Shape of the payload a contract expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordShape {
    /// A single object
    Single,

    /// An array of objects with at least `min_rows` elements
    Rows {
        /// 1 when any field is mandatory, otherwise 0
        min_rows: usize,
    },
}

/// Static validation descriptor interpreted by [`crate::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSchema {
    /// Expected payload shape
    pub shape: RecordShape,

    /// Field rules in declaration order
    pub fields: Vec<FieldRule>,
}

impl ValidationSchema {
    /// Whether the contract expects an array of records
    pub fn is_multi_row(&self) -> bool {
        matches!(self.shape, RecordShape::Rows { .. })
    }

    /// Look up a rule by field name
    pub fn field(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of the mandatory fields, in declaration order
    pub fn mandatory_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.mandatory)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Render the schema as JSON Schema
    ///
    /// Optional fields admit `null` so a backend can mark them absent.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field_json_schema(field));
        }

        let record = json!({
            "type": "object",
            "properties": properties,
            "required": self.mandatory_fields(),
        });

        match self.shape {
            RecordShape::Single => record,
            RecordShape::Rows { min_rows } => json!({
                "type": "array",
                "items": record,
                "minItems": min_rows,
            }),
        }
    }
}

fn field_json_schema(field: &FieldRule) -> Value {
    let base = match field.field_type {
        FieldType::String | FieldType::Date => "string",
        FieldType::Number => "number",
        FieldType::Boolean => "boolean",
    };

    let mut schema = Map::new();
    if field.mandatory {
        schema.insert("type".to_string(), json!(base));
    } else {
        schema.insert("type".to_string(), json!([base, "null"]));
    }
    if field.field_type == FieldType::Date {
        schema.insert("format".to_string(), json!("date"));
    }
    if let Some(description) = &field.description {
        schema.insert("description".to_string(), json!(description));
    }
    Value::Object(schema)
}

/// A compiled, immutable extraction contract for one task
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledContract {
    aim: String,
    schema: ValidationSchema,
    instruction: String,
    json_schema: Value,
}

impl CompiledContract {
    pub(crate) fn new(aim: String, schema: ValidationSchema, instruction: String) -> Self {
        let json_schema = schema.to_json_schema();
        Self {
            aim,
            schema,
            instruction,
            json_schema,
        }
    }

    /// The task aim the contract was compiled from
    pub fn aim(&self) -> &str {
        &self.aim
    }

    /// The validation schema
    pub fn schema(&self) -> &ValidationSchema {
        &self.schema
    }

    /// The generated extraction instruction
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// JSON Schema for structured-output backends
    pub fn json_schema(&self) -> &Value {
        &self.json_schema
    }

    /// Whether the contract expects an array of records
    pub fn is_multi_row(&self) -> bool {
        self.schema.is_multi_row()
    }
}
