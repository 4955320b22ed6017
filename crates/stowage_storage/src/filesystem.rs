//! Filesystem-based placement implementation.
//!
//! Uploads are copied beside their destination and renamed into place, so a
//! reader never sees a half-written file when overwriting.

use crate::{FilePlacement, PlacementOptions, PlacementResult};
use std::fs::{self, File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Component, Path, PathBuf};
use stowage_core::ResolvedPath;
use stowage_error::{PlacementError, PlacementErrorKind, StowageResult};
use uuid::Uuid;

/// Filesystem placement backend.
///
/// Every destination is resolved relative to `root`:
///
/// ```text
/// /var/www/public/            <- root
/// └── uploads/
///     └── 7/
///         └── 5e3e0d0f163196cb9526d97be1b2ce26.jpg
/// ```
#[derive(Debug, Clone)]
pub struct FileSystemPlacement {
    root: PathBuf,
}

impl FileSystemPlacement {
    /// Create a placement backend rooted at `root`.
    ///
    /// The root itself is created lazily along with the first destination
    /// directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory destinations are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a resolved path.
    pub fn absolute(&self, destination: &ResolvedPath) -> PathBuf {
        destination
            .segments()
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }

    /// Create the destination's parent directories. Existing directories are fine.
    fn ensure_parent(&self, target: &Path) -> StowageResult<()> {
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PlacementError::new(PlacementErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }
        Ok(())
    }

    /// Remove the file the record pointed at before this upload.
    ///
    /// Best effort: a missing or undeletable file never fails the placement.
    fn remove_stale(
        &self,
        destination: &ResolvedPath,
        options: &PlacementOptions,
        prior: Option<&str>,
    ) -> Option<PathBuf> {
        let prior = prior.filter(|p| !p.is_empty())?;
        let stored = match options.prefix() {
            Some(prefix) if !prefix.is_empty() => {
                prior.strip_prefix(prefix.as_str()).unwrap_or(prior)
            }
            _ => prior,
        };

        let prior_name = basename(stored);
        if prior_name == destination.file_name() {
            tracing::debug!(prior = %stored, "Previous upload has the same name, keeping it");
            return None;
        }
        if let Some(default_file) = options.default_file() {
            if prior_name == basename(default_file) {
                tracing::debug!(prior = %stored, "Previous upload is the default file");
                return None;
            }
        }

        let Some(relative) = contained_relative(stored) else {
            tracing::warn!(prior = %stored, "Previous upload path leaves the root, keeping it");
            return None;
        };
        let stale = self.root.join(relative);

        match fs::remove_file(&stale) {
            Ok(()) => {
                tracing::info!(path = %stale.display(), "Removed previous upload");
                Some(stale)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %stale.display(), "Previous upload already gone");
                None
            }
            Err(e) => {
                tracing::warn!(
                    path = %stale.display(),
                    error = %e,
                    "Failed to remove previous upload"
                );
                None
            }
        }
    }

    /// Copy `source` to `target`, then remove `source`.
    fn move_into_place(&self, source: &Path, target: &Path, overwrite: bool) -> StowageResult<()> {
        if overwrite {
            let staging = staging_path(target);
            if let Err(e) = fs::copy(source, &staging) {
                let _ = fs::remove_file(&staging);
                return Err(PlacementError::new(PlacementErrorKind::Copy(format!(
                    "{} to {}: {}",
                    source.display(),
                    staging.display(),
                    e
                )))
                .into());
            }
            if let Err(e) = fs::rename(&staging, target) {
                let _ = fs::remove_file(&staging);
                return Err(PlacementError::new(PlacementErrorKind::Rename(format!(
                    "{} to {}: {}",
                    staging.display(),
                    target.display(),
                    e
                )))
                .into());
            }
        } else {
            copy_exclusive(source, target)?;
        }

        if let Err(e) = fs::remove_file(source) {
            tracing::warn!(
                source = %source.display(),
                error = %e,
                "Failed to remove temporary upload"
            );
        }
        Ok(())
    }
}

impl FilePlacement for FileSystemPlacement {
    #[tracing::instrument(
        skip(self, destination, options, prior),
        fields(destination = %destination, overwrite = options.overwrite())
    )]
    fn place(
        &self,
        source: &Path,
        destination: &ResolvedPath,
        options: &PlacementOptions,
        prior: Option<&str>,
    ) -> StowageResult<PlacementResult> {
        if !source.is_file() {
            return Err(PlacementError::new(PlacementErrorKind::SourceMissing(
                source.display().to_string(),
            ))
            .into());
        }

        let target = self.absolute(destination);
        self.ensure_parent(&target)?;

        let removed_stale = if options.overwrite() {
            self.remove_stale(destination, options, prior)
        } else {
            None
        };

        self.move_into_place(source, &target, options.overwrite())?;

        let stored_value = format!("{}{}", options.prefix_str(), destination);
        tracing::info!(
            path = %target.display(),
            stored = %stored_value,
            "Placed upload"
        );

        Ok(PlacementResult::new(
            destination.clone(),
            stored_value,
            target,
            removed_stale,
        ))
    }
}

/// Copy into a file that must not exist yet.
fn copy_exclusive(source: &Path, target: &Path) -> StowageResult<()> {
    let mut output = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
        .map_err(|e| {
            let kind = if e.kind() == ErrorKind::AlreadyExists {
                PlacementErrorKind::DestinationExists(target.display().to_string())
            } else {
                PlacementErrorKind::Copy(format!("{}: {}", target.display(), e))
            };
            PlacementError::new(kind)
        })?;

    let copied = File::open(source)
        .and_then(|mut input| io::copy(&mut input, &mut output))
        .and_then(|_| output.sync_all());

    if let Err(e) = copied {
        drop(output);
        let _ = fs::remove_file(target);
        return Err(PlacementError::new(PlacementErrorKind::Copy(format!(
            "{} to {}: {}",
            source.display(),
            target.display(),
            e
        )))
        .into());
    }
    Ok(())
}

/// Hidden sibling of `target` used while copying.
fn staging_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{}.{}.part", name, Uuid::now_v7().simple()))
}

/// Final segment of a stored path, ignoring trailing separators.
fn basename(path: &str) -> &str {
    path.trim_end_matches(['/', '\\'])
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
}

/// Relative form of a stored path, or `None` if it would leave the root.
fn contained_relative(stored: &str) -> Option<PathBuf> {
    let normalized = stored.replace('\\', "/");
    let relative = Path::new(normalized.trim_start_matches('/'));
    let mut clean = PathBuf::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if clean.as_os_str().is_empty() {
        None
    } else {
        Some(clean)
    }
}
