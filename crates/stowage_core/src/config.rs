//! Upload placement configuration.
//!
//! Configuration is loaded from TOML with a precedence system:
//! - Bundled defaults (include_str! from stowage.toml)
//! - User overrides (~/.config/stowage/stowage.toml, then ./stowage.toml)
//! - `STOWAGE_*` environment variables
//!
//! # Example
//!
//! ```toml
//! root = "/var/www/public"
//! suffix = "_file"
//!
//! [limits]
//! max_file_size = "8M"
//!
//! [fields.avatar]
//! path = "uploads/avatars/:id/:md5"
//! prefix = "/"
//! default_file = "uploads/avatars/default.png"
//! ```

use crate::UploadLimits;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use stowage_error::{ConfigError, StowageError, StowageResult};
use tracing::{debug, instrument};

/// Per-field placement settings.
///
/// # Example
///
/// ```
/// use stowage_core::FieldConfig;
///
/// let config = FieldConfig::builder()
///     .path("uploads/:id/:md5")
///     .overwrite(false)
///     .build()
///     .unwrap();
///
/// assert_eq!(config.path().as_deref(), Some("uploads/:id/:md5"));
/// assert!(!config.overwrite());
/// assert!(config.field_identifiers());
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    derive_getters::Getters,
    derive_builder::Builder,
)]
pub struct FieldConfig {
    /// Path template, e.g. `uploads/:id/:md5`. Required once a file is uploaded.
    #[builder(default, setter(into, strip_option))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    path: Option<String>,

    /// String prepended to the stored path. `false` disables it, `true` means empty.
    #[builder(default, setter(into, strip_option))]
    #[serde(
        default,
        deserialize_with = "flag_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    prefix: Option<String>,

    /// Replace existing files and clean up the previous upload.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    #[getter(skip)]
    overwrite: bool,

    /// File that must never be deleted during cleanup.
    #[builder(default, setter(into, strip_option))]
    #[serde(
        default,
        alias = "defaultFile",
        deserialize_with = "flag_or_string",
        skip_serializing_if = "Option::is_none"
    )]
    default_file: Option<String>,

    /// Expose record fields as `:field` identifiers.
    #[builder(default = "true")]
    #[serde(default = "default_true", alias = "fieldIdentifiers")]
    #[getter(skip)]
    field_identifiers: bool,
}

impl FieldConfig {
    /// Creates a field builder.
    pub fn builder() -> FieldConfigBuilder {
        FieldConfigBuilder::default()
    }

    /// Whether existing files are replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// Whether record fields are exposed as identifiers.
    pub fn field_identifiers(&self) -> bool {
        self.field_identifiers
    }
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            path: None,
            prefix: None,
            overwrite: true,
            default_file: None,
            field_identifiers: true,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_root() -> PathBuf {
    PathBuf::from("webroot")
}

fn default_suffix() -> String {
    "_file".to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum FlagOrString {
    Flag(bool),
    Text(String),
}

/// Reads `false` as unset, `true` as the empty string, and strings as given.
fn flag_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        match Option::<FlagOrString>::deserialize(deserializer)? {
            None | Some(FlagOrString::Flag(false)) => None,
            Some(FlagOrString::Flag(true)) => Some(String::new()),
            Some(FlagOrString::Text(text)) => Some(text),
        },
    )
}

/// Top-level stowage configuration.
///
/// # Example
///
/// ```
/// use stowage_core::{FieldConfig, StowageConfig};
///
/// let config = StowageConfig::new("/tmp/app")
///     .with_field("avatar", FieldConfig::builder().path("uploads/:id").build().unwrap());
///
/// assert_eq!(config.virtual_field("avatar"), "avatar_file");
/// assert!(config.fields().contains_key("avatar"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, derive_getters::Getters)]
pub struct StowageConfig {
    /// Base directory every resolved path is relative to
    #[serde(default = "default_root")]
    root: PathBuf,

    /// Suffix naming the virtual upload field
    #[serde(default = "default_suffix")]
    suffix: String,

    /// Upload size limits used in error messages
    #[serde(default)]
    limits: UploadLimits,

    /// Managed fields by name
    #[serde(default)]
    fields: BTreeMap<String, FieldConfig>,
}

impl Default for StowageConfig {
    fn default() -> Self {
        Self::new(default_root())
    }
}

impl StowageConfig {
    /// Creates a configuration with default suffix and no fields.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            suffix: default_suffix(),
            limits: UploadLimits::default(),
            fields: BTreeMap::new(),
        }
    }

    /// Sets the virtual field suffix.
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    /// Sets the upload limits.
    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Adds or replaces a managed field.
    pub fn with_field(mut self, name: impl Into<String>, field: FieldConfig) -> Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// Name of the virtual field carrying upload data for `field`.
    pub fn virtual_field(&self, field: &str) -> String {
        format!("{}{}", field, self.suffix)
    }

    /// Load configuration from a specific file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StowageResult<Self> {
        debug!("Loading configuration from file");

        Config::builder()
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                StowageError::from(ConfigError::new(format!(
                    "Failed to read configuration from {}: {}",
                    path.as_ref().display(),
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StowageError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }

    /// Load configuration with precedence: environment > user override > bundled default.
    ///
    /// Sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (stowage.toml shipped with the library)
    /// 2. User config in home directory (~/.config/stowage/stowage.toml)
    /// 3. User config in current directory (./stowage.toml)
    /// 4. `STOWAGE_*` environment variables, `__` separating nested keys
    ///    (`STOWAGE_ROOT`, `STOWAGE_LIMITS__MAX_FILE_SIZE`)
    ///
    /// User config files are optional and silently skipped if not found.
    #[instrument]
    pub fn load() -> StowageResult<Self> {
        debug!(
            "Loading configuration with precedence: env > current dir > home dir > bundled defaults"
        );
        Self::load_layered(environment())
    }

    fn load_layered(environment: Environment) -> StowageResult<Self> {
        const DEFAULT_CONFIG: &str = include_str!("../stowage.toml");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/stowage/stowage.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder
            .add_source(File::with_name("stowage").required(false))
            .add_source(environment);

        builder
            .build()
            .map_err(|e| {
                StowageError::from(ConfigError::new(format!(
                    "Failed to build configuration: {}",
                    e
                )))
            })?
            .try_deserialize()
            .map_err(|e| {
                StowageError::from(ConfigError::new(format!(
                    "Failed to parse configuration: {}",
                    e
                )))
            })
    }
}

/// `STOWAGE_` variables, with `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix("STOWAGE")
        .prefix_separator("_")
        .separator("__")
}
