//! Document module - normalized content and its source

/// Where a document came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentSource {
    /// Original file name as supplied by the caller
    pub file_name: String,

    /// MIME type, when the caller supplied one
    pub mime_type: Option<String>,
}

impl DocumentSource {
    /// Create a source from a file name
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: None,
        }
    }

    /// Attach a MIME type
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// A document as handed to the pipeline
///
/// The content is either already normalized text (the usual case) or raw
/// input for a `DocumentNormalizer` to turn into text. It is never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    content: String,
    source: DocumentSource,
}

impl Document {
    /// Create a document
    pub fn new(content: impl Into<String>, source: DocumentSource) -> Self {
        Self {
            content: content.into(),
            source,
        }
    }

    /// The document content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The document source
    pub fn source(&self) -> &DocumentSource {
        &self.source
    }

    /// Whether the content holds anything besides whitespace
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}
