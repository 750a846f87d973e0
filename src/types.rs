use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::PathBuf;

/// Sample count of a full-resolution (bin 1) image
pub const REFERENCE_SAMPLES: i64 = 20000;

/// Extension of raw image products in the imagery directory
pub const RAW_EXTENSION: &str = ".raw";

/// Extension of support files in the project data directory
pub const SUPPORT_EXTENSION: &str = ".sup";

/// Extension of terrain model header files
pub const TERRAIN_EXTENSION: &str = ".dth";

/// A registered SOCET SET project, resolved once per run
#[derive(Debug, Clone)]
pub struct Project {
    pub name: String,
    pub data_path: PathBuf,
    pub imagery_path: PathBuf,
}

/// Ground sample distance pair for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GsdPair {
    /// Meter-scale value, equal to the terrain grid spacing
    pub coarse: u32,
    /// Centimeter-scale value, `25 * bin class`
    pub fine: u32,
}

/// Working-set member: one selected image and its matched support file
#[derive(Debug, Clone, Serialize)]
pub struct ImageEntry {
    pub raw_path: PathBuf,
    pub identifier: String,
    pub support_file: String,
    /// Filled during classification
    pub bin_class: Option<u8>,
    /// Filled once the terrain spacing is known
    pub gsd: Option<GsdPair>,
}

impl ImageEntry {
    pub fn new(raw_path: PathBuf, identifier: String, support_file: String) -> Self {
        Self {
            raw_path,
            identifier,
            support_file,
            bin_class: None,
            gsd: None,
        }
    }

    /// Support filename without its `.sup` extension
    pub fn stem(&self) -> &str {
        self.support_file
            .strip_suffix(SUPPORT_EXTENSION)
            .unwrap_or(&self.support_file)
    }
}

/// Terrain model chosen for the run
#[derive(Debug, Clone)]
pub struct TerrainModel {
    pub stem: String,
    /// Normalized grid spacing in meters, validated to 1..=2
    pub spacing: u32,
}

/// Label convention of the corner lines in a boundary log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinateFamily {
    /// `Lon` / `Lat` labels
    Geographic,
    /// `X` / `Y` labels
    Projected,
}

impl std::fmt::Display for CoordinateFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoordinateFamily::Geographic => write!(f, "geographic"),
            CoordinateFamily::Projected => write!(f, "projected"),
        }
    }
}

/// Orthophoto footprint taken from a calcOrthoBdry log.
///
/// Values are kept as the exact text tokens from the log so they are
/// written to the settings files unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryExtent {
    pub family: CoordinateFamily,
    pub ll_x: String,
    pub ll_y: String,
    pub ur_x: String,
    pub ur_y: String,
}

/// Outcome of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub project: String,
    pub batch_file: PathBuf,
    pub settings_files: Vec<PathBuf>,
    pub images: Vec<ImageEntry>,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

impl RunSummary {
    /// Pretty-printed JSON record of the run
    pub fn to_json(&self) -> OrthoResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Error types for settings generation
#[derive(Debug, thiserror::Error)]
pub enum OrthoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Field '{field}' not found in {source_name}")]
    MissingField { field: String, source_name: String },

    #[error("Field '{field}' has malformed value '{value}'")]
    MalformedField { field: String, value: String },

    #[error("Validation failed: {0}")]
    ValidationFailure(String),

    #[error("File name '{0}' does not contain three '_'-separated identifier tokens")]
    MissingIdentifierTokens(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrthoError {
    pub fn missing(field: impl Into<String>, source_name: impl Into<String>) -> Self {
        OrthoError::MissingField {
            field: field.into(),
            source_name: source_name.into(),
        }
    }

    pub fn malformed(field: impl Into<String>, value: impl Into<String>) -> Self {
        OrthoError::MalformedField {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for settings generation
pub type OrthoResult<T> = Result<T, OrthoError>;
