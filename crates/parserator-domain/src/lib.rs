//! Parserator Domain Layer
//!
//! Core value types for schema-driven extraction against the Parserator
//! parsing service. Everything here is pure and synchronous: no I/O, no
//! async, no shared mutable state.
//!
//! ## Key Concepts
//!
//! - **SchemaDescriptor**: ordered, validated description of the desired output shape
//! - **ParseRequest**: input text + schema + instructions/options, validated at build time
//! - **ParseResult**: `Success` with parsed data and metadata, or `Failure` with a typed error
//! - **Preset**: named, pre-built schema for a common use case (email, invoice, ...)
//!
//! ## Architecture
//!
//! Transport, retries and normalization of raw HTTP responses live in
//! `parserator-sdk`. This crate only defines what a request and a result
//! look like, and how a request is laid out on the wire.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api_key;
pub mod error;
pub mod options;
pub mod preset;
pub mod request;
pub mod result;
pub mod schema;

// Re-exports for convenience
pub use api_key::validate_api_key;
pub use error::DomainError;
pub use options::ParseOptions;
pub use preset::{get_preset, list_presets, preset_schema, Preset};
pub use request::{validate_input, ParseRequest, MAX_INPUT_CHARS};
pub use result::{ErrorKind, ParseFailure, ParseMetadata, ParseResult, ParseSuccess};
pub use schema::{FieldSpec, FieldType, SchemaDescriptor, MAX_FIELDS};
