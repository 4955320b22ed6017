//! Top-level error wrapper types.

use crate::{ConfigError, IdentifierError, PathError, PlacementError, UploadError};

/// Every failure the stowage crates can surface.
///
/// # Examples
///
/// ```
/// use stowage_error::{ConfigError, StowageError};
///
/// let err: StowageError = ConfigError::new("missing path").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StowageErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Upload transport error
    #[from(UploadError)]
    Upload(UploadError),
    /// Identifier flattening error
    #[from(IdentifierError)]
    Identifier(IdentifierError),
    /// Path resolution error
    #[from(PathError)]
    Path(PathError),
    /// File placement error
    #[from(PlacementError)]
    Placement(PlacementError),
}

/// Stowage error with kind discrimination.
///
/// # Examples
///
/// ```
/// use stowage_error::{StowageErrorKind, StowageResult, UploadError, UploadErrorKind};
///
/// fn might_fail() -> StowageResult<()> {
///     Err(UploadError::new(UploadErrorKind::Partial))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), StowageErrorKind::Upload(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Stowage Error: {}", _0)]
pub struct StowageError(Box<StowageErrorKind>);

impl StowageError {
    /// Create a new error from a kind.
    pub fn new(kind: StowageErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StowageErrorKind {
        &self.0
    }
}

// Generic From implementation for any type that converts to StowageErrorKind
impl<T> From<T> for StowageError
where
    T: Into<StowageErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for stowage operations.
pub type StowageResult<T> = std::result::Result<T, StowageError>;
