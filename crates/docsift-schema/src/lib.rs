//! docsift Schema Compiler
//!
//! Turns a runtime-declared field list into a compiled contract: a static
//! validation schema, a deterministic extraction instruction, and a JSON-Schema
//! rendering for backends that can constrain their output.
//!
//! The schema is a tagged descriptor (`FieldRule`, `RecordShape`) interpreted
//! by one generic validator; nothing is generated at runtime.
//!
//! # Examples
//!
//! ```
//! use docsift_domain::{ExtractionTask, FieldSpec, FieldType};
//! use docsift_schema::{compile, validate};
//! use serde_json::json;
//!
//! let task = ExtractionTask::new(
//!     "extract header",
//!     vec![
//!         FieldSpec::new("invoice_number", FieldType::String).mandatory(),
//!         FieldSpec::new("total_amount", FieldType::Number).mandatory(),
//!     ],
//! );
//!
//! let contract = compile(&task).unwrap();
//! assert!(contract.instruction().contains("invoice_number"));
//!
//! let payload = json!({"invoice_number": "INV-001", "total_amount": "120.00"});
//! let validated = validate(&payload, contract.schema()).unwrap();
//! assert_eq!(validated.data["total_amount"], json!(120.0));
//! ```

#![warn(missing_docs)]

mod coerce;
mod compiler;
mod contract;
mod error;
mod instruction;
mod validator;

pub use coerce::{coerce, CoercionError};
pub use compiler::{compile, SchemaCompiler};
pub use contract::{CompiledContract, FieldRule, RecordShape, ValidationSchema};
pub use error::{SchemaCompilationError, UnknownType};
pub use instruction::InstructionBuilder;
pub use validator::{validate, ValidatedPayload, ValidationFailure, Violation, ViolationReason};
