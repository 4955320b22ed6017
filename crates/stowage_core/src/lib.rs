//! Core types and pure logic for stowage.
//!
//! This crate turns record data and a path template into a safe, relative
//! destination path:
//!
//! - [`sanitize`] makes record values safe to use as path segments
//! - [`build_identifiers`] flattens a record into `:token` values
//! - [`resolve_path`] renders a template into a [`ResolvedPath`]
//! - [`validate_upload`] classifies upload transport errors
//!
//! Nothing here touches the filesystem; see `stowage_storage` for placement.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod identifiers;
mod record;
mod sanitize;
mod template;
mod upload;
mod value;

pub use config::{FieldConfig, FieldConfigBuilder, FieldConfigBuilderError, StowageConfig};
pub use identifiers::{Builtins, IdentifierMap, MAX_DEPTH, build_identifiers, build_identifiers_at};
pub use record::Record;
pub use sanitize::{MAX_SEGMENT_CHARS, sanitize};
pub use template::{ResolvedPath, extension_of, resolve_path};
pub use upload::{UploadDescriptor, UploadErrorCode, UploadLimits, UploadOutcome, validate_upload};
pub use value::{FieldValue, RecordSnapshot};
