//! File placement error types.

/// Kinds of placement errors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PlacementErrorKind {
    /// Failed to create the destination directory
    #[display("Failed to create directory: {}", _0)]
    DirectoryCreation(String),
    /// Destination already exists and overwriting is disabled
    #[display("Destination already exists: {}", _0)]
    DestinationExists(String),
    /// Temporary upload file is missing
    #[display("Source file not found: {}", _0)]
    SourceMissing(String),
    /// Failed to copy the upload into place
    #[display("Failed to copy file: {}", _0)]
    Copy(String),
    /// Failed to rename the staged copy onto the destination
    #[display("Failed to rename file: {}", _0)]
    Rename(String),
}

/// Placement error with location tracking.
///
/// # Examples
///
/// ```
/// use stowage_error::{PlacementError, PlacementErrorKind};
///
/// let err = PlacementError::new(PlacementErrorKind::DestinationExists(
///     "uploads/7/avatar.jpg".to_string(),
/// ));
/// assert!(format!("{}", err).contains("already exists"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Placement Error: {} at line {} in {}", kind, line, file)]
pub struct PlacementError {
    /// The kind of error that occurred
    pub kind: PlacementErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl PlacementError {
    /// Create a new placement error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PlacementErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PlacementErrorKind {
        &self.kind
    }
}
