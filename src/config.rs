//! Startup configuration
//!
//! Every filesystem location the pipeline embeds in its output lives here,
//! resolved once at startup and passed down. Paths that end up inside the
//! generated settings and batch files are kept as strings because they
//! name locations on the SOCET SET workstation, not on the machine that
//! runs the generator.

use crate::types::{OrthoError, OrthoResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How an image identifier is matched against raw image filenames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStrategy {
    /// Identifier may appear anywhere in the filename
    #[default]
    Substring,
    /// Filename must start with the identifier
    Prefix,
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrthoConfig {
    /// SOCET SET installation root (contains `bin\start_socet`)
    pub install_root: String,
    /// Directory holding the `<project>.prj` descriptors
    pub data_root: String,
    /// Root under which `<project>\batch_dir\queue_batchlog.txt` is written
    pub log_root: String,
    /// Master project index; derived from `install_root` when unset
    pub location_list: Option<String>,
    pub match_strategy: MatchStrategy,
    /// Keep every support file matching a selection instead of the first
    pub collect_all_matches: bool,
}

impl Default for OrthoConfig {
    fn default() -> Self {
        Self {
            install_root: r"C:\SOCET_SET_5.6.0".to_string(),
            data_root: r"C:\SOCET_SET_5.6.0\data".to_string(),
            log_root: r"E:\Socet\data".to_string(),
            location_list: None,
            match_strategy: MatchStrategy::Substring,
            collect_all_matches: false,
        }
    }
}

impl OrthoConfig {
    /// Parse a JSON configuration document
    pub fn from_json(json: &str) -> OrthoResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| OrthoError::Config(format!("Failed to parse configuration: {}", e)))
    }

    /// Load configuration from an explicit file
    pub fn from_file<P: AsRef<Path>>(path: P) -> OrthoResult<Self> {
        let path = path.as_ref();
        log::info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            OrthoError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Resolve configuration: explicit file, then the per-user file, then defaults
    pub fn load(explicit: Option<&Path>) -> OrthoResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::user_config_path() {
            Some(path) if path.exists() => Self::from_file(path),
            _ => {
                log::debug!("No configuration file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// `<config dir>/orthoset/config.json`
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("orthoset").join("config.json"))
    }

    /// Location of the master project index
    pub fn location_list_path(&self) -> String {
        match &self.location_list {
            Some(path) => path.clone(),
            None => join_windows(&self.install_root, &["internal_dbs", "DEVICE", "location.list"]),
        }
    }

    /// The `start_socet` launcher
    pub fn start_socet(&self) -> String {
        join_windows(&self.install_root, &["bin", "start_socet"])
    }

    /// Project descriptor path as referenced from settings files
    pub fn project_file(&self, project: &str) -> String {
        join_windows(&self.data_root, &[format!("{}.prj", project).as_str()])
    }

    /// Queue log written by batch invocations of the project
    pub fn batch_log(&self, project: &str) -> String {
        join_windows(&self.log_root, &[project, "batch_dir", "queue_batchlog.txt"])
    }
}

/// Join path components with backslashes, as the SOCET SET workstation expects
pub fn join_windows(root: &str, parts: &[&str]) -> String {
    let mut joined = root.trim_end_matches(['\\', '/']).to_string();
    for part in parts {
        joined.push('\\');
        joined.push_str(part.trim_matches(['\\', '/']));
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = OrthoConfig::default();
        assert_eq!(config.start_socet(), r"C:\SOCET_SET_5.6.0\bin\start_socet");
        assert_eq!(config.project_file("gale"), r"C:\SOCET_SET_5.6.0\data\gale.prj");
        assert_eq!(
            config.batch_log("gale"),
            r"E:\Socet\data\gale\batch_dir\queue_batchlog.txt"
        );
        assert_eq!(
            config.location_list_path(),
            r"C:\SOCET_SET_5.6.0\internal_dbs\DEVICE\location.list"
        );
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = OrthoConfig::from_json(
            r#"{ "log_root": "D:\\logs\\", "match_strategy": "prefix" }"#,
        )
        .unwrap();
        assert_eq!(config.match_strategy, MatchStrategy::Prefix);
        assert_eq!(config.install_root, OrthoConfig::default().install_root);
        assert_eq!(config.batch_log("p"), r"D:\logs\p\batch_dir\queue_batchlog.txt");
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = OrthoConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, OrthoError::Config(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "collect_all_matches": true }"#).unwrap();
        let config = OrthoConfig::load(Some(path.as_path())).unwrap();
        assert!(config.collect_all_matches);
        assert_eq!(config.match_strategy, MatchStrategy::Substring);
    }
}
