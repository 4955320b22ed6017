//! Error types for the stowage upload placement crates.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Every error converts into [`StowageError`], so `?` works across crates.
//!
//! # Examples
//!
//! ```
//! use stowage_error::{PathError, PathErrorKind, StowageResult};
//!
//! fn render() -> StowageResult<String> {
//!     Err(PathError::new(PathErrorKind::MissingTemplate))?
//! }
//!
//! assert!(render().is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod identifier;
mod path;
mod placement;
mod upload;

pub use config::ConfigError;
pub use error::{StowageError, StowageErrorKind, StowageResult};
pub use identifier::{IdentifierError, IdentifierErrorKind};
pub use path::{PathError, PathErrorKind};
pub use placement::{PlacementError, PlacementErrorKind};
pub use upload::{UploadError, UploadErrorKind};
