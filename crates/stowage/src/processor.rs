//! Per-save upload processing.
//!
//! For every configured field whose virtual field carries upload data, the
//! processor validates the upload, renders the destination from the record,
//! places the file and writes the stored path back into the record.

use stowage_core::{
    FieldConfig, FieldValue, Record, StowageConfig, UploadDescriptor, UploadOutcome,
    build_identifiers, extension_of, resolve_path, validate_upload,
};
use stowage_error::{ConfigError, StowageResult, UploadError};
use stowage_storage::{FilePlacement, FileSystemPlacement, PlacementOptions, PlacementResult};
use tracing::{debug, info, instrument};

/// What happened to one field with pending upload data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOutcome {
    /// The upload was placed and the field updated
    Placed(PlacementResult),
    /// No file was submitted; the field was left as it was
    Skipped,
}

/// Report for one processed field.
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct FieldReport {
    /// Field name
    field: String,
    /// Result of processing
    outcome: FieldOutcome,
}

/// A field with upload data waiting in its virtual field.
struct Pending<'a> {
    field: &'a str,
    config: &'a FieldConfig,
    template: &'a str,
    virtual_field: String,
    value: FieldValue,
}

/// Processes uploads for a record before it is persisted.
///
/// # Example
///
/// ```
/// use stowage::{FieldConfig, FieldValue, RecordSnapshot, StowageConfig, UploadProcessor};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let root = tempfile::tempdir()?;
/// let upload = root.path().join("php123");
/// std::fs::write(&upload, b"bytes")?;
///
/// let config = StowageConfig::new(root.path())
///     .with_field("avatar", FieldConfig::builder().path("uploads/:id/avatar").build()?);
/// let processor = UploadProcessor::new(config);
///
/// let mut record = RecordSnapshot::from_pairs([
///     ("id", FieldValue::from("7")),
///     (
///         "avatar_file",
///         FieldValue::mapping([
///             ("name", "me.PNG"),
///             ("tmp_name", upload.to_str().unwrap()),
///             ("error", "0"),
///         ]),
///     ),
/// ]);
///
/// processor.process(&mut record)?;
/// assert_eq!(record.get("avatar"), Some(&FieldValue::from("uploads/7/avatar.png")));
/// assert!(record.get("avatar_file").is_none());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct UploadProcessor<P = FileSystemPlacement> {
    config: StowageConfig,
    placement: P,
}

impl UploadProcessor<FileSystemPlacement> {
    /// Creates a processor that places files under the configured root.
    pub fn new(config: StowageConfig) -> Self {
        let placement = FileSystemPlacement::new(config.root().clone());
        Self { config, placement }
    }
}

impl<P: FilePlacement> UploadProcessor<P> {
    /// Creates a processor with a custom placement backend.
    pub fn with_placement(config: StowageConfig, placement: P) -> Self {
        Self { config, placement }
    }

    /// The active configuration.
    pub fn config(&self) -> &StowageConfig {
        &self.config
    }

    /// The placement backend.
    pub fn placement(&self) -> &P {
        &self.placement
    }

    /// Processes every configured field that has pending upload data.
    ///
    /// Fields are handled in name order. The virtual field is removed once its
    /// field is done, whether the upload was placed, skipped or failed.
    ///
    /// # Errors
    ///
    /// - [`ConfigError`] if a field with pending data has no path template;
    ///   checked for all fields before anything is changed
    /// - [`UploadError`] for upload transport failures
    /// - identifier, path and placement errors from the steps that follow
    #[instrument(skip_all, fields(fields = self.config.fields().len()))]
    pub fn process<R: Record + ?Sized>(&self, record: &mut R) -> StowageResult<Vec<FieldReport>> {
        let pending = self.pending(record)?;
        debug!(pending = pending.len(), "Found pending uploads");

        let mut reports = Vec::with_capacity(pending.len());
        for item in pending {
            let outcome = self.process_field(record, &item);
            record.unset(&item.virtual_field);
            reports.push(FieldReport {
                field: item.field.to_string(),
                outcome: outcome?,
            });
        }
        Ok(reports)
    }

    /// Collects fields with upload data, failing on any that lack a template.
    fn pending<R: Record + ?Sized>(&self, record: &R) -> StowageResult<Vec<Pending<'_>>> {
        let mut pending = Vec::new();
        for (field, config) in self.config.fields() {
            let virtual_field = self.config.virtual_field(field);
            let Some(value) = record.get(&virtual_field) else {
                continue;
            };
            if value.as_mapping().is_none() {
                continue;
            }
            let Some(template) = config.path().as_deref() else {
                return Err(ConfigError::new(format!(
                    "The path for the {} field is required.",
                    field
                ))
                .into());
            };
            pending.push(Pending {
                field,
                config,
                template,
                virtual_field,
                value,
            });
        }
        Ok(pending)
    }

    #[instrument(skip_all, fields(field = item.field))]
    fn process_field<R: Record + ?Sized>(
        &self,
        record: &mut R,
        item: &Pending<'_>,
    ) -> StowageResult<FieldOutcome> {
        let descriptor = match UploadDescriptor::from_value(&item.value) {
            Some(parsed) => parsed.map_err(UploadError::new)?,
            None => return Ok(FieldOutcome::Skipped),
        };

        match validate_upload(&descriptor, self.config.limits()) {
            UploadOutcome::Proceed => {}
            UploadOutcome::Skip => {
                debug!("No file submitted");
                return Ok(FieldOutcome::Skipped);
            }
            UploadOutcome::Fatal(kind) => return Err(UploadError::new(kind).into()),
        }

        let identifiers = build_identifiers(&record.snapshot(), item.config.field_identifiers())?;
        let extension = extension_of(descriptor.name()).unwrap_or_default();
        let destination = resolve_path(&identifiers, item.template, extension)?;

        let prior = record
            .get(item.field)
            .and_then(|value| value.as_scalar().map(str::to_string));
        let placed = self.placement.place(
            descriptor.temporary_path(),
            &destination,
            &PlacementOptions::from(item.config),
            prior.as_deref(),
        )?;

        record.set(item.field, FieldValue::from(placed.stored_value().as_str()));
        info!(stored = %placed.stored_value(), "Stored upload path");
        Ok(FieldOutcome::Placed(placed))
    }
}
