use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use thiserror::Error;

use crate::version::error::VersionError;
use crate::version::pattern::VersionPattern;
use crate::version::types::ObservedVersion;

// =============================================================================
// Storage-related constants
// =============================================================================

/// Default base URL of the Cloud Storage JSON API
pub const DEFAULT_STORAGE_ENDPOINT: &str = "https://storage.googleapis.com";

/// User agent sent with every storage request
pub const USER_AGENT: &str = "gcs-resource/0.0.1";

// =============================================================================
// Logging-related constants
// =============================================================================

/// Environment variable holding the tracing filter directives
pub const LOG_FILTER_ENV: &str = "GCS_RESOURCE_LOG";

/// Environment variable selecting the log format (`json` or plain text)
pub const LOG_FORMAT_ENV: &str = "GCS_RESOURCE_LOG_FORMAT";

/// Filter used when `GCS_RESOURCE_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

// =============================================================================
// Files written next to a fetched artifact
// =============================================================================

/// Raw version text of a pattern-addressed artifact
pub const VERSION_FILE: &str = "version";

/// Generation of a fixed-object artifact
pub const GENERATION_FILE: &str = "generation";

/// Storage URL of the fetched artifact
pub const URL_FILE: &str = "url";

/// Errors for source and params validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("please specify the bucket")]
    MissingBucket,

    #[error("please specify either regexp or versioned_file")]
    AmbiguousMode,

    #[error("if set, initial_version must be an int64")]
    InvalidInitialVersion,

    #[error("use initial_content_text or initial_content_binary but not both")]
    ConflictingInitialContent,

    #[error("initial_content_binary could not be decoded to base64")]
    InvalidInitialContentBinary,

    #[error("use initial_path when regexp is set")]
    InitialVersionWithRegexp,

    #[error("use initial_version when versioned_file is set")]
    InitialPathWithVersionedFile,

    #[error("use initial_version or initial_path when initial content is set")]
    InitialContentWithoutVersion,

    #[error("please specify the file")]
    MissingFile,

    #[error("invalid skip_download value specified: {0}")]
    InvalidSkipDownload(String),

    #[error(transparent)]
    Pattern(#[from] VersionError),
}

/// Source configuration as received from the scheduler
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Source {
    pub bucket: String,
    pub regexp: Option<String>,
    pub versioned_file: Option<String>,
    pub initial_path: Option<String>,
    pub initial_version: Option<String>,
    pub initial_content_text: Option<String>,
    pub initial_content_binary: Option<String>,
    pub skip_download: bool,
    /// OAuth2 bearer token forwarded to the storage API
    pub access_token: Option<String>,
    /// Storage API base URL, for emulators
    pub endpoint: Option<String>,
}

/// How versions of the tracked artifact are addressed
#[derive(Debug, Clone)]
pub enum AddressingMode {
    /// A family of objects whose names embed a version
    Pattern(VersionPattern),
    /// One object whose storage generations are the versions
    FixedObject(String),
}

/// Synthetic version reported before any real artifact exists
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bootstrap {
    /// The initial path or initial generation
    pub version: ObservedVersion,
    /// Literal content materialized when the initial version is fetched
    pub content: Vec<u8>,
}

/// Connection settings for the storage client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    pub endpoint: String,
    pub access_token: Option<String>,
}

impl From<&Source> for StorageSettings {
    fn from(source: &Source) -> Self {
        Self {
            endpoint: non_empty(&source.endpoint)
                .unwrap_or(DEFAULT_STORAGE_ENDPOINT)
                .trim_end_matches('/')
                .to_string(),
            access_token: non_empty(&source.access_token).map(str::to_string),
        }
    }
}

/// Validated source configuration
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub bucket: String,
    pub mode: AddressingMode,
    pub bootstrap: Option<Bootstrap>,
    pub skip_download: bool,
    pub storage: StorageSettings,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

impl TryFrom<&Source> for SourceConfig {
    type Error = ConfigError;

    fn try_from(source: &Source) -> Result<Self, Self::Error> {
        if source.bucket.is_empty() {
            return Err(ConfigError::MissingBucket);
        }

        let regexp = non_empty(&source.regexp);
        let versioned_file = non_empty(&source.versioned_file);
        let initial_path = non_empty(&source.initial_path);
        let initial_content_text = non_empty(&source.initial_content_text);
        let initial_content_binary = non_empty(&source.initial_content_binary);

        if regexp.is_some() && versioned_file.is_some() {
            return Err(ConfigError::AmbiguousMode);
        }

        let initial_version = non_empty(&source.initial_version)
            .map(|v| v.parse::<i64>().map_err(|_| ConfigError::InvalidInitialVersion))
            .transpose()?;

        let content = match (initial_content_text, initial_content_binary) {
            (Some(_), Some(_)) => return Err(ConfigError::ConflictingInitialContent),
            (Some(text), None) => Some(text.as_bytes().to_vec()),
            (None, Some(binary)) => Some(
                STANDARD
                    .decode(binary)
                    .map_err(|_| ConfigError::InvalidInitialContentBinary)?,
            ),
            (None, None) => None,
        };

        if regexp.is_some() && initial_version.is_some() {
            return Err(ConfigError::InitialVersionWithRegexp);
        }

        if versioned_file.is_some() && initial_path.is_some() {
            return Err(ConfigError::InitialPathWithVersionedFile);
        }

        if content.is_some() && initial_version.is_none() && initial_path.is_none() {
            return Err(ConfigError::InitialContentWithoutVersion);
        }

        let mode = match (regexp, versioned_file) {
            (Some(regexp), None) => AddressingMode::Pattern(VersionPattern::new(regexp)?),
            (None, Some(path)) => AddressingMode::FixedObject(path.to_string()),
            _ => return Err(ConfigError::AmbiguousMode),
        };

        let bootstrap_version = match (initial_path, initial_version) {
            (Some(path), _) => Some(ObservedVersion::Path(path.to_string())),
            (None, Some(generation)) => Some(ObservedVersion::Generation(generation)),
            (None, None) => None,
        };

        let bootstrap = bootstrap_version.map(|version| Bootstrap {
            version,
            content: content.unwrap_or_default(),
        });

        Ok(Self {
            bucket: source.bucket.clone(),
            mode,
            bootstrap,
            skip_download: source.skip_download,
            storage: StorageSettings::from(source),
        })
    }
}

impl SourceConfig {
    /// The compiled pattern, in pattern mode
    pub fn pattern(&self) -> Option<&VersionPattern> {
        match &self.mode {
            AddressingMode::Pattern(pattern) => Some(pattern),
            AddressingMode::FixedObject(_) => None,
        }
    }

    /// Whether `version` is the configured bootstrap version
    pub fn is_bootstrap(&self, version: &ObservedVersion) -> bool {
        self.bootstrap
            .as_ref()
            .is_some_and(|bootstrap| &bootstrap.version == version)
    }
}
