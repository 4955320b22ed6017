//! Filesystem placement of uploaded files.
//!
//! This crate moves a temporary upload to the path rendered by
//! `stowage_core`, and reconciles it with whatever file the record stored
//! before:
//!
//! - **Directories on demand**: parent directories are created under the root
//! - **Stale-file cleanup**: with overwrite enabled, the previous upload is
//!   removed unless it has the same name or is the protected default file
//! - **No clobbering**: with overwrite disabled, an existing destination fails
//!   the placement
//!
//! # Example
//!
//! ```rust
//! use stowage_core::{IdentifierMap, resolve_path};
//! use stowage_storage::{FilePlacement, FileSystemPlacement, PlacementOptions};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = tempfile::tempdir()?;
//! let upload = root.path().join("upload.tmp");
//! std::fs::write(&upload, b"bytes")?;
//!
//! let identifiers: IdentifierMap = [(":id", "7")].into_iter().collect();
//! let destination = resolve_path(&identifiers, "uploads/:id/avatar", "png")?;
//!
//! let engine = FileSystemPlacement::new(root.path());
//! let placed = engine.place(&upload, &destination, &PlacementOptions::default(), None)?;
//!
//! assert_eq!(placed.stored_value(), "uploads/7/avatar.png");
//! assert!(placed.absolute().exists());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod options;
mod placement;

pub use filesystem::FileSystemPlacement;
pub use options::{PlacementOptions, PlacementOptionsBuilder, PlacementOptionsBuilderError};
pub use placement::{FilePlacement, PlacementResult};
pub use stowage_error::{PlacementError, PlacementErrorKind};
