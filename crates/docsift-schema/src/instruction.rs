//! Extraction instruction generation

use crate::contract::{RecordShape, ValidationSchema};
use docsift_domain::FieldType;

/// Builds the extraction instruction for one compiled task
///
/// Output depends only on the inputs, so the same task always yields
/// byte-identical text.
pub struct InstructionBuilder<'a> {
    aim: &'a str,
    schema: &'a ValidationSchema,
    preamble: Option<&'a str>,
}

impl<'a> InstructionBuilder<'a> {
    /// Create a builder for the given aim and schema
    pub fn new(aim: &'a str, schema: &'a ValidationSchema) -> Self {
        Self {
            aim,
            schema,
            preamble: None,
        }
    }

    /// Prepend a fixed preamble (role text) to the instruction
    pub fn with_preamble(mut self, preamble: Option<&'a str>) -> Self {
        self.preamble = preamble.map(str::trim).filter(|p| !p.is_empty());
        self
    }

    /// Build the complete instruction
    pub fn build(&self) -> String {
        let mut out = String::new();

        if let Some(preamble) = self.preamble {
            out.push_str(preamble);
            out.push_str("\n\n");
        }

        // 1. Aim
        out.push_str("**Extraction Task Aim:**\n");
        let aim = self.aim.trim();
        out.push_str(if aim.is_empty() { NO_AIM } else { aim });
        out.push_str("\n\n");

        // 2. Field list
        out.push_str("**Required Schema:**\n");
        for field in &self.schema.fields {
            let flag = if field.mandatory { "MANDATORY" } else { "Optional" };
            out.push_str(&format!(
                "- **{}** ({}, {})",
                field.name, field.field_type, flag
            ));
            if let Some(description) = &field.description {
                out.push_str(" - ");
                out.push_str(description);
            }
            out.push('\n');
        }
        out.push('\n');

        // 3. Output shape
        out.push_str("**Required Output Format:**\n");
        out.push_str(&self.output_format());
        out.push_str("\n\n");

        // 4. Type rules for the types in use
        out.push_str("**Value Types:**\n");
        for ty in FieldType::ALL {
            if self.schema.fields.iter().any(|f| f.field_type == ty) {
                out.push_str(&format!("- {}: {}\n", ty, type_rule(ty)));
            }
        }
        out.push('\n');

        // 5. Extraction rules
        out.push_str(EXTRACTION_RULES);

        out
    }

    fn output_format(&self) -> String {
        let keys = self
            .schema
            .fields
            .iter()
            .map(|f| format!("\"{}\"", f.name))
            .collect::<Vec<_>>()
            .join(", ");

        match self.schema.shape {
            RecordShape::Single => {
                format!("Return a single JSON object with exactly these keys: {}.", keys)
            }
            RecordShape::Rows { min_rows } => {
                let mut text = format!(
                    "Return a JSON array of objects, one object per matching item. \
                     Each object must have exactly these keys: {}.",
                    keys
                );
                if min_rows == 0 {
                    text.push_str(" Return an empty array `[]` if no matching items are found.");
                } else {
                    text.push_str(" The array must contain at least one item.");
                }
                text
            }
        }
    }
}

fn type_rule(ty: FieldType) -> &'static str {
    match ty {
        FieldType::String => "plain text",
        FieldType::Number => {
            "a plain JSON number, without currency symbols or thousands separators"
        }
        FieldType::Boolean => "JSON `true` or `false`",
        FieldType::Date => "an ISO-8601 calendar date string (YYYY-MM-DD)",
    }
}

const NO_AIM: &str = "(no aim given; extract the fields below)";

const EXTRACTION_RULES: &str = r#"**Instructions:**
1. Carefully read the document content to find the information.
2. Extract all information matching the schema.
3. Format the output *exactly* as requested in the 'Required Output Format' section.
4. If a mandatory field is not found, set its value to `null`. Never invent values.
5. If an optional field is not found, set its value to `null`.
6. Return ONLY the JSON, with no explanations and no markdown formatting."#;
