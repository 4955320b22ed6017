//! Upload transport error types.

use std::fmt;

/// Kinds of upload transport failures.
///
/// The display form of each kind is the message surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UploadErrorKind {
    /// File is larger than the server-wide upload limit
    ServerSizeLimit(Option<String>),
    /// File is larger than the limit declared by the submitting form
    FormSizeLimit,
    /// Transfer was interrupted
    Partial,
    /// Server has no temporary directory to receive uploads
    MissingTempDir,
    /// Server could not write the upload to disk
    WriteFailed,
    /// A server extension rejected the upload
    ExtensionBlocked,
    /// Error code outside the known table
    Unknown(i64),
    /// Upload data is missing a required entry
    Malformed(String),
}

impl fmt::Display for UploadErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServerSizeLimit(Some(limit)) => write!(
                f,
                "The uploaded file exceeds the maximum upload size allowed by the server: {}",
                limit
            ),
            Self::ServerSizeLimit(None) => write!(
                f,
                "The uploaded file exceeds the maximum upload size allowed by the server."
            ),
            Self::FormSizeLimit => write!(
                f,
                "The uploaded file exceeds the maximum size specified in the submitted form."
            ),
            Self::Partial => write!(f, "The uploaded file was only partially uploaded."),
            Self::MissingTempDir => write!(f, "Missing a temporary folder."),
            Self::WriteFailed => write!(f, "Failed to write file to disk."),
            Self::ExtensionBlocked => write!(f, "A server extension stopped the file upload."),
            Self::Unknown(code) => write!(f, "Unknown upload error (code {}).", code),
            Self::Malformed(reason) => write!(f, "Malformed upload data: {}", reason),
        }
    }
}

/// Upload error with location tracking.
///
/// # Examples
///
/// ```
/// use stowage_error::{UploadError, UploadErrorKind};
///
/// let err = UploadError::new(UploadErrorKind::Partial);
/// assert!(format!("{}", err).contains("partially uploaded"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Upload Error: {} at line {} in {}", kind, line, file)]
pub struct UploadError {
    /// The kind of error that occurred
    pub kind: UploadErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl UploadError {
    /// Create a new upload error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: UploadErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> &UploadErrorKind {
        &self.kind
    }
}
