//! docsift Domain Layer
//!
//! Value types and trait seams shared by every other docsift crate.
//!
//! ## Key Concepts
//!
//! - **Task**: one independently validated extraction unit with an aim and a
//!   declared field list
//! - **Field**: one output column with a type tag, mandatory flag and
//!   multiplicity flag
//! - **Document**: normalized text plus the identity of the file it came from
//! - **Backend**: the opaque inference capability the pipeline calls
//!
//! ## Architecture
//!
//! This crate holds no pipeline logic. Compilation lives in `docsift-schema`,
//! backends in `docsift-llm`, and orchestration in `docsift-extractor`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod field;
pub mod task;
pub mod traits;

// Re-exports for convenience
pub use document::{Document, DocumentSource};
pub use field::{FieldSpec, FieldType};
pub use task::ExtractionTask;
pub use traits::{DocumentNormalizer, ExtractionBackend};
