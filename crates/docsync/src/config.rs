use serde::Deserialize;
use std::path::Path;

use crate::error::Result;

/// Root configuration for docsync.
///
/// Every field has a sensible default, so an empty JSON object is a valid
/// configuration.
///
/// # Examples
///
/// ```
/// use docsync::config::SyncConfig;
///
/// let json = r#"{
///     "tracker": { "track_active_editor": false },
///     "documents": { "ignore_path_casing": true }
/// }"#;
///
/// let config = SyncConfig::from_json(json).unwrap();
/// assert!(!config.tracker.track_active_editor);
/// assert!(config.documents.ignore_path_casing);
/// assert_eq!(config.documents.large_file_threshold, 50 * 1024 * 1024);
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
pub struct SyncConfig {
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub documents: DocumentsConfig,
}

impl SyncConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        tracing::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }
}

/// Configuration for the state tracker.
///
/// # Defaults
///
/// - `track_active_editor`: `true`
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Include the active editor in snapshots and deltas (default: true)
    #[serde(default = "default_true")]
    pub track_active_editor: bool,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            track_active_editor: true,
        }
    }
}

/// Configuration for document handling.
///
/// # Defaults
///
/// - `large_file_threshold`: `52428800` (50 MiB)
/// - `ignore_path_casing`: `false`
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentsConfig {
    /// Documents larger than this many bytes are not synchronized.
    /// Zero is rejected with a warning and replaced by the default.
    #[serde(
        default = "default_large_file_threshold",
        deserialize_with = "deserialize_threshold"
    )]
    pub large_file_threshold: usize,

    /// Treat URIs differing only in case as the same document.
    #[serde(default)]
    pub ignore_path_casing: bool,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            large_file_threshold: default_large_file_threshold(),
            ignore_path_casing: false,
        }
    }
}

// Default value functions
const fn default_true() -> bool {
    true
}

const fn default_large_file_threshold() -> usize {
    50 * 1024 * 1024
}

fn deserialize_threshold<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let threshold = usize::deserialize(deserializer)?;
    if threshold == 0 {
        tracing::warn!(
            "large_file_threshold of 0 would hide every document, using {} instead",
            default_large_file_threshold()
        );
        return Ok(default_large_file_threshold());
    }
    Ok(threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert!(config.tracker.track_active_editor);
        assert_eq!(config.documents.large_file_threshold, 52_428_800);
        assert!(!config.documents.ignore_path_casing);
    }

    #[test]
    fn test_empty_config_deserialization() {
        let config = SyncConfig::from_json("{}").unwrap();
        assert!(config.tracker.track_active_editor);
        assert_eq!(config.documents.large_file_threshold, 52_428_800);
    }

    #[test]
    fn test_partial_config_deserialization() {
        let json = r#"{
            "documents": {
                "large_file_threshold": 1024
            }
        }"#;

        let config = SyncConfig::from_json(json).unwrap();
        assert_eq!(config.documents.large_file_threshold, 1024);
        // Other fields should use defaults
        assert!(!config.documents.ignore_path_casing);
        assert!(config.tracker.track_active_editor);
    }

    #[test]
    fn test_zero_threshold_falls_back_to_default() {
        let json = r#"{ "large_file_threshold": 0 }"#;
        let config: DocumentsConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.large_file_threshold, 52_428_800);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let result = SyncConfig::from_json(r#"{ "tracker": { "track_active_editor": "yes" } }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tracker": {{ "track_active_editor": false }} }}"#).unwrap();

        let config = SyncConfig::load(file.path()).unwrap();
        assert!(!config.tracker.track_active_editor);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = SyncConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(crate::error::DocsyncError::Io(_))));
    }
}
