//! orthoset: batch orthophoto settings generator for SOCET SET
//!
//! Pairs operator-selected raw images with their support files, derives
//! GSD tiers and the orthophoto footprint from SOCET SET text artifacts,
//! and writes one `orthophoto` settings file per image and tier together
//! with a `master_orthos_<n>.bat` script that runs them all.

pub mod types;
pub mod config;
pub mod io;
pub mod core;

// Re-export main types and functions for easier access
pub use crate::types::{
    BoundaryExtent, CoordinateFamily, GsdPair, ImageEntry, OrthoError, OrthoResult, Project,
    RunSummary, TerrainModel,
};
pub use crate::config::{MatchStrategy, OrthoConfig};
pub use crate::core::{Orchestrator, WorkingSet};
