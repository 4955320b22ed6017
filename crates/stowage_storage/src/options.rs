//! Per-call placement parameters.

use stowage_core::FieldConfig;

/// Options for a single placement.
///
/// Derived from a [`FieldConfig`] for each upload and passed explicitly, so
/// one engine can serve many fields concurrently.
///
/// # Example
///
/// ```
/// use stowage_storage::PlacementOptions;
///
/// let options = PlacementOptions::builder()
///     .prefix("/media/")
///     .build()
///     .unwrap();
/// assert!(options.overwrite());
/// assert_eq!(options.prefix_str(), "/media/");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters, derive_builder::Builder)]
pub struct PlacementOptions {
    /// Replace an existing destination and remove the previous upload
    #[builder(default = "true")]
    #[getter(skip)]
    overwrite: bool,

    /// Prepended to the stored value, stripped from the previous value
    #[builder(default, setter(into, strip_option))]
    prefix: Option<String>,

    /// File protected from stale-file cleanup
    #[builder(default, setter(into, strip_option))]
    default_file: Option<String>,
}

impl PlacementOptions {
    /// Creates an options builder.
    pub fn builder() -> PlacementOptionsBuilder {
        PlacementOptionsBuilder::default()
    }

    /// Whether existing files may be replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// The prefix, or `""` when none is configured.
    pub fn prefix_str(&self) -> &str {
        self.prefix.as_deref().unwrap_or("")
    }
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            overwrite: true,
            prefix: None,
            default_file: None,
        }
    }
}

impl From<&FieldConfig> for PlacementOptions {
    fn from(field: &FieldConfig) -> Self {
        Self {
            overwrite: field.overwrite(),
            prefix: field.prefix().clone(),
            default_file: field.default_file().clone(),
        }
    }
}
