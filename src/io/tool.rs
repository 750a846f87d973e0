use crate::config::OrthoConfig;
use crate::types::OrthoResult;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

/// External tool invocation. Runs are fire-and-forget: the caller does not
/// wait for, or inspect, the tool's outcome.
pub trait ToolRunner {
    fn run(&mut self, program: &str, args: &[String]) -> OrthoResult<()>;
}

/// Spawns the tool as a detached child process
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

impl ProcessRunner {
    /// Spawn the tool and hand the child to a thread that waits on it, so
    /// the process is reaped without blocking the caller.
    pub fn spawn_detached(
        program: &str,
        args: &[String],
    ) -> OrthoResult<JoinHandle<Option<ExitStatus>>> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .spawn()?;
        let pid = child.id();
        log::debug!("Started process {}", pid);

        let program = program.to_string();
        Ok(thread::spawn(move || match child.wait() {
            Ok(status) => {
                log::debug!("{} (pid {}) exited with {}", program, pid, status);
                Some(status)
            }
            Err(e) => {
                log::warn!("Could not wait on {} (pid {}): {}", program, pid, e);
                None
            }
        }))
    }
}

impl ToolRunner for ProcessRunner {
    fn run(&mut self, program: &str, args: &[String]) -> OrthoResult<()> {
        log::info!("Starting: {} {}", program, args.join(" "));
        Self::spawn_detached(program, args)?;
        Ok(())
    }
}

/// `start_socet -single calcOrthoBdry <project> <dtm>`
pub fn calc_ortho_boundary_command(
    config: &OrthoConfig,
    project: &str,
    terrain_path: &Path,
) -> (String, Vec<String>) {
    (
        config.start_socet(),
        vec![
            "-single".to_string(),
            "calcOrthoBdry".to_string(),
            project.to_string(),
            terrain_path.display().to_string(),
        ],
    )
}
