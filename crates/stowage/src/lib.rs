//! Stowage - template-driven placement of uploaded files.
//!
//! Given a record and a path template such as `uploads/:id/:md5`, stowage
//! computes a safe destination, moves the uploaded temporary file there, and
//! cleans up whatever file the record pointed at before.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use stowage::{RecordSnapshot, StowageConfig, UploadProcessor};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! stowage::init_tracing().ok();
//!
//! let processor = UploadProcessor::new(StowageConfig::load()?);
//! let mut record = RecordSnapshot::from_json(serde_json::json!({
//!     "id": 7,
//!     "avatar_file": { "name": "me.jpg", "tmp_name": "/tmp/php123", "error": 0 }
//! }))
//! .unwrap();
//!
//! processor.process(&mut record)?;
//! println!("{:?}", record.get("avatar"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - `stowage_error` - Error types
//! - `stowage_core` - Sanitizing, identifiers, templates, upload classification, configuration
//! - `stowage_storage` - Filesystem placement and stale-file cleanup
//!
//! This crate re-exports everything and adds the per-save [`UploadProcessor`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod processor;
mod telemetry;

pub use processor::{FieldOutcome, FieldReport, UploadProcessor};
pub use stowage_core::*;
pub use stowage_error::*;
pub use stowage_storage::*;
pub use telemetry::init_tracing;
