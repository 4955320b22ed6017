//! Path resolution errors.

/// Specific path resolution failures.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum PathErrorKind {
    /// No path template was supplied
    #[display("Missing path template")]
    MissingTemplate,
    /// The uploaded file name has no extension
    #[display("Missing file extension")]
    MissingExtension,
    /// The extension contains characters that are not allowed in a file name
    #[display("Invalid file extension: {}", _0)]
    InvalidExtension(String),
    /// A `:` placeholder in the template has no matching identifier
    #[display("Unresolved placeholder in path template: {}", _0)]
    UnresolvedToken(String),
    /// The rendered path contains a `.`, `..` or empty segment
    #[display("Path escapes its root: {}", _0)]
    Traversal(String),
}

/// Path resolution error with location tracking.
///
/// # Examples
///
/// ```
/// use stowage_error::{PathError, PathErrorKind};
///
/// let err = PathError::new(PathErrorKind::MissingExtension);
/// assert_eq!(err.kind(), &PathErrorKind::MissingExtension);
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Path Error: {} at line {} in {}", kind, line, file)]
pub struct PathError {
    kind: PathErrorKind,
    line: u32,
    file: &'static str,
}

impl PathError {
    /// Create a new path error with caller location tracking.
    #[track_caller]
    pub fn new(kind: PathErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &PathErrorKind {
        &self.kind
    }
}
