//! Backend prompt assembly

/// Builds the backend prompt for one task attempt
///
/// The prompt is the compiled instruction followed by the document between
/// `---` fences. Every attempt of a task sends the same prompt.
pub struct PromptBuilder<'a> {
    instruction: &'a str,
    document: &'a str,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder
    pub fn new(instruction: &'a str, document: &'a str) -> Self {
        Self {
            instruction,
            document,
        }
    }

    /// Build the complete extraction prompt
    pub fn build(&self) -> String {
        let mut prompt = String::with_capacity(
            self.instruction.len() + self.document.len() + CLOSING.len() + 64,
        );

        // 1. Instruction from the compiled contract
        prompt.push_str(self.instruction);
        prompt.push_str("\n\n");

        // 2. The document to analyze
        prompt.push_str("DOCUMENT CONTENT (Markdown):\n");
        prompt.push_str("---\n");
        prompt.push_str(self.document);
        prompt.push_str("\n---\n\n");

        // 3. Output reminder
        prompt.push_str(CLOSING);

        prompt
    }
}

const CLOSING: &str = "Extract the data from the document content above and return ONLY the valid JSON \
that matches the requested output format. Do not include any other text, explanations, \
or markdown formatting.";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_layout() {
        let prompt = PromptBuilder::new("**Extraction Task Aim:**\nheader", "Invoice INV-001").build();

        assert!(prompt.starts_with("**Extraction Task Aim:**\nheader\n\n"));
        assert!(prompt.contains("DOCUMENT CONTENT (Markdown):\n---\nInvoice INV-001\n---\n\n"));
        assert!(prompt.ends_with("or markdown formatting."));
    }

    #[test]
    fn test_prompt_is_stable() {
        let a = PromptBuilder::new("instr", "doc").build();
        let b = PromptBuilder::new("instr", "doc").build();
        assert_eq!(a, b);
    }
}
