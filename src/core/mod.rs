//! Settings derivation and generation pipeline

pub mod identifier;
pub mod matcher;
pub mod extract;
pub mod resolution;
pub mod render;
pub mod orchestrator;

// Re-export main types
pub use identifier::image_identifier;
pub use matcher::{MatchScope, SupportMatcher};
pub use extract::{normalize_spacing, validate_spacing, FieldKind, FieldSpec, ParameterExtractor};
pub use resolution::{bin_class, gsd_pair};
pub use render::{next_batch_name, BatchWriter, ConfigRenderer, RenderContext, SettingsDocument, Tier};
pub use orchestrator::{Orchestrator, WorkingSet};
