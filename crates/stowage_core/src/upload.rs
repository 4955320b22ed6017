//! Upload descriptors and transport error classification.

use crate::FieldValue;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use stowage_error::UploadErrorKind;
use tracing::{debug, instrument};

/// Raw metadata for one uploaded file, as handed over by the web layer.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct UploadDescriptor {
    /// Client-side file name
    name: String,
    /// Where the web layer stored the upload
    temporary_path: PathBuf,
    /// Size in bytes
    size: u64,
    /// Transport error code, `0` when the upload succeeded
    error: i64,
}

impl UploadDescriptor {
    /// Creates a descriptor.
    pub fn new(
        name: impl Into<String>,
        temporary_path: impl Into<PathBuf>,
        size: u64,
        error: i64,
    ) -> Self {
        Self {
            name: name.into(),
            temporary_path: temporary_path.into(),
            size,
            error,
        }
    }

    /// Reads a descriptor from a virtual field value.
    ///
    /// Recognized keys are `name`, `tmp_name`, `size` and `error`; anything
    /// else is ignored. Returns `None` when the value is not a mapping, which
    /// means the field has no pending upload.
    ///
    /// # Errors
    ///
    /// Returns [`UploadErrorKind::Malformed`] when `size` or `error` is not a
    /// number.
    pub fn from_value(value: &FieldValue) -> Option<Result<Self, UploadErrorKind>> {
        value.as_mapping()?;
        Some(Self::parse_mapping(value))
    }

    fn parse_mapping(value: &FieldValue) -> Result<Self, UploadErrorKind> {
        let size = number_entry(value, "size")?.unwrap_or(0).max(0) as u64;
        let error = number_entry(value, "error")?.unwrap_or(0);
        Ok(Self::new(
            text_entry(value, "name"),
            text_entry(value, "tmp_name"),
            size,
            error,
        ))
    }
}

fn text_entry(value: &FieldValue, key: &str) -> String {
    value
        .get(key)
        .and_then(FieldValue::as_scalar)
        .unwrap_or_default()
        .to_string()
}

fn number_entry(value: &FieldValue, key: &str) -> Result<Option<i64>, UploadErrorKind> {
    match value.get(key).and_then(FieldValue::as_scalar) {
        None | Some("") => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| UploadErrorKind::Malformed(format!("'{}' is not a number: {}", key, raw))),
    }
}

/// Known upload transport error codes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::FromRepr,
    strum::EnumIter,
    derive_more::Display,
)]
#[repr(i64)]
pub enum UploadErrorCode {
    /// Upload succeeded
    #[display("ok")]
    Ok = 0,
    /// Exceeds the server-wide size limit
    #[display("server size limit")]
    ServerSize = 1,
    /// Exceeds the size limit declared by the form
    #[display("form size limit")]
    FormSize = 2,
    /// Only part of the file arrived
    #[display("partial")]
    Partial = 3,
    /// No file was submitted
    #[display("no file")]
    NoFile = 4,
    /// No temporary directory on the server
    #[display("no temporary directory")]
    NoTmpDir = 6,
    /// Server could not write the file
    #[display("cannot write")]
    CantWrite = 7,
    /// A server extension stopped the upload
    #[display("extension")]
    Extension = 8,
}

/// Verdict for a single upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Upload is usable
    Proceed,
    /// Nothing was submitted; not an error
    Skip,
    /// Upload failed and the save must abort
    Fatal(UploadErrorKind),
}

impl UploadOutcome {
    /// Message for a fatal outcome.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::Fatal(kind) => Some(kind.to_string()),
            _ => None,
        }
    }
}

/// Size limit reported in server size-limit messages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UploadLimits {
    /// Human-readable maximum upload size, e.g. `"2M"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_file_size: Option<String>,
}

/// Classifies an upload by its transport error code.
///
/// # Example
///
/// ```
/// use stowage_core::{UploadDescriptor, UploadLimits, UploadOutcome, validate_upload};
///
/// let limits = UploadLimits::default();
/// let nothing = UploadDescriptor::new("", "", 0, 4);
/// assert_eq!(validate_upload(&nothing, &limits), UploadOutcome::Skip);
///
/// let ok = UploadDescriptor::new("photo.jpg", "/tmp/php123", 10, 0);
/// assert_eq!(validate_upload(&ok, &limits), UploadOutcome::Proceed);
/// ```
#[instrument(skip_all, fields(name = %descriptor.name, code = descriptor.error))]
pub fn validate_upload(descriptor: &UploadDescriptor, limits: &UploadLimits) -> UploadOutcome {
    let outcome = match UploadErrorCode::from_repr(descriptor.error) {
        Some(code) => classify(code, limits),
        None => UploadOutcome::Fatal(UploadErrorKind::Unknown(descriptor.error)),
    };

    let outcome = match outcome {
        UploadOutcome::Proceed if descriptor.temporary_path.as_os_str().is_empty() => {
            UploadOutcome::Fatal(UploadErrorKind::Malformed(
                "missing temporary file path".to_string(),
            ))
        }
        other => other,
    };

    debug!(outcome = ?outcome, "Classified upload");
    outcome
}

fn classify(code: UploadErrorCode, limits: &UploadLimits) -> UploadOutcome {
    match code {
        UploadErrorCode::Ok => UploadOutcome::Proceed,
        UploadErrorCode::NoFile => UploadOutcome::Skip,
        UploadErrorCode::ServerSize => {
            UploadOutcome::Fatal(UploadErrorKind::ServerSizeLimit(limits.max_file_size.clone()))
        }
        UploadErrorCode::FormSize => UploadOutcome::Fatal(UploadErrorKind::FormSizeLimit),
        UploadErrorCode::Partial => UploadOutcome::Fatal(UploadErrorKind::Partial),
        UploadErrorCode::NoTmpDir => UploadOutcome::Fatal(UploadErrorKind::MissingTempDir),
        UploadErrorCode::CantWrite => UploadOutcome::Fatal(UploadErrorKind::WriteFailed),
        UploadErrorCode::Extension => UploadOutcome::Fatal(UploadErrorKind::ExtensionBlocked),
    }
}
