//! Placement trait definition.

use crate::PlacementOptions;
use std::path::{Path, PathBuf};
use stowage_core::ResolvedPath;
use stowage_error::StowageResult;

/// Outcome of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct PlacementResult {
    /// Destination relative to the root
    relative: ResolvedPath,
    /// Value to persist in the record: prefix followed by the relative path
    stored_value: String,
    /// Where the file now lives
    absolute: PathBuf,
    /// Previous upload removed during cleanup, if any
    removed_stale: Option<PathBuf>,
}

impl PlacementResult {
    /// Creates a result.
    pub fn new(
        relative: ResolvedPath,
        stored_value: impl Into<String>,
        absolute: impl Into<PathBuf>,
        removed_stale: Option<PathBuf>,
    ) -> Self {
        Self {
            relative,
            stored_value: stored_value.into(),
            absolute: absolute.into(),
            removed_stale,
        }
    }
}

/// Moves uploaded files to their resolved destinations.
///
/// Implementations handle directory creation, cleanup of the file a record
/// previously pointed at, and the move itself.
pub trait FilePlacement: Send + Sync {
    /// Places `source` at `destination`.
    ///
    /// # Arguments
    ///
    /// * `source` - Temporary upload file
    /// * `destination` - Resolved path relative to the backend's root
    /// * `options` - Overwrite, prefix and default-file settings for this field
    /// * `prior` - The value currently stored in the record's field, if any
    ///
    /// # Returns
    ///
    /// A [`PlacementResult`] whose `stored_value` should be written back to
    /// the record.
    fn place(
        &self,
        source: &Path,
        destination: &ResolvedPath,
        options: &PlacementOptions,
        prior: Option<&str>,
    ) -> StowageResult<PlacementResult>;
}
