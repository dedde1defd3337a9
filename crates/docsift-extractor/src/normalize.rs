//! Document normalizers
//!
//! OCR and format conversion happen upstream. These two normalizers cover
//! the cases the pipeline handles itself: text that is already normalized,
//! and a fixed sample for running without an OCR service.

use docsift_domain::{Document, DocumentNormalizer};
use std::convert::Infallible;
use tracing::debug;

/// Treats the document content as already-normalized text
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughNormalizer;

impl DocumentNormalizer for PassthroughNormalizer {
    type Error = Infallible;

    fn normalize(&self, document: &Document) -> Result<String, Self::Error> {
        Ok(document.content().trim().to_string())
    }
}

/// Ignores the document and returns a fixed sample (invoice + meeting minutes)
#[derive(Debug, Clone, Copy, Default)]
pub struct MockNormalizer;

impl DocumentNormalizer for MockNormalizer {
    type Error = Infallible;

    fn normalize(&self, document: &Document) -> Result<String, Self::Error> {
        debug!(file_name = %document.source().file_name, "Using mock normalization");
        Ok(SAMPLE_MARKDOWN.trim().to_string())
    }
}

/// Sample markdown returned by `MockNormalizer`
pub const SAMPLE_MARKDOWN: &str = r#"
# Sample Invoice INV-123
**Invoice Date:** October 26, 2025
**Due Date:** November 10, 2025
**Billed To:**
 Acme Corp
 123 Main St
 Anytown, CA 90210
**Contact:** John Doe (john.doe@acme.com)
---
## Items
| Description        | Quantity | Unit Price | Total |
|--------------------|----------|------------|-------|
| Web Development    | 1        | 1500.00    | 1500.00 |
| Graphic Design     | 5        | 100.00     | 500.00  |
| Cloud Hosting (Yr) | 1        | 300.50     | 300.50  |
---
**Subtotal:** 2300.50
**Tax (10%):** 230.05
**Total Amount Due:** **2530.55**
**Notes:** Payment due within 15 days.
---
# Meeting Minutes - Project Phoenix
**Date:** 2025-10-25
**Attendees:** Alice, Bob, Charlie
**Project Manager:** Alice Smith
**Decisions:**
- Q4 Budget Approved: $50,000
- Launch date set for Dec 1st, 2025.
**Action Items:**
- Bob: Finalize API documentation by Nov 5, 2025.
- Charlie: Prepare marketing brief by Oct 30, 2025.
"#;
