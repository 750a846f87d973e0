//! Host capabilities: operator prompts, directory listing, project lookup
//! and external tool invocation

pub mod chooser;
pub mod listing;
pub mod project;
pub mod tool;

pub use chooser::{Chooser, ConsoleChooser, FileFilter};
#[cfg(feature = "dialog")]
pub use chooser::DialogChooser;
pub use listing::{DirectoryLister, FsLister};
pub use project::{ProjectIndex, SocetProjectIndex};
pub use tool::{ProcessRunner, ToolRunner};
