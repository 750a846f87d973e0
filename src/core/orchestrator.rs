//! Run sequencing: selection loop, parameter extraction, rendering

use crate::config::OrthoConfig;
use crate::core::extract::ParameterExtractor;
use crate::core::identifier::image_identifier;
use crate::core::matcher::{MatchScope, SupportMatcher};
use crate::core::render::{next_batch_name, BatchWriter, ConfigRenderer, RenderContext};
use crate::core::resolution::{bin_class, gsd_pair};
use crate::io::chooser::{Chooser, FileFilter};
use crate::io::listing::DirectoryLister;
use crate::io::project::{image_directories, ProjectIndex};
use crate::io::tool::{calc_ortho_boundary_command, ToolRunner};
use crate::types::{
    BoundaryExtent, ImageEntry, OrthoError, OrthoResult, Project, RunSummary, TerrainModel,
};
use chrono::Local;
use std::path::{Path, PathBuf};

/// Directory under the project data path receiving settings and batch files
pub const BATCH_DIR: &str = "batch_dir";

/// Images accumulated over the selection loop
#[derive(Debug, Clone, Default)]
pub struct WorkingSet {
    entries: Vec<ImageEntry>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ImageEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn support_files(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.support_file.as_str()).collect()
    }

    /// Fold one operator selection into the set.
    ///
    /// An image without a support file leaves the set unchanged. A support
    /// file already in the set is not added twice.
    pub fn with_selection(
        mut self,
        selection: &Path,
        matcher: &SupportMatcher<'_>,
        scope: MatchScope,
    ) -> OrthoResult<Self> {
        let identifier = image_identifier(selection)?;
        let supports = matcher.find_scoped(&identifier, scope);

        if supports.is_empty() {
            log::warn!(
                "No support file found for {} ({}); image skipped",
                identifier,
                selection.display()
            );
            return Ok(self);
        }

        for support in supports {
            if self.entries.iter().any(|e| e.support_file == support) {
                log::warn!("{} is already selected", support);
                continue;
            }
            log::info!("Matched {} -> {}", identifier, support);
            self.entries.push(ImageEntry::new(
                selection.to_path_buf(),
                identifier.clone(),
                support,
            ));
        }
        Ok(self)
    }

    /// Assign each entry its bin class from the support file in `data_path`
    pub fn classify(mut self, data_path: &Path) -> OrthoResult<Self> {
        for entry in &mut self.entries {
            let samples = ParameterExtractor::read_total_samples(data_path.join(&entry.support_file))?;
            let class = bin_class(samples);
            log::info!(
                "{}: TOTAL_SAMPLES {} -> bin {}",
                entry.support_file,
                samples,
                class
            );
            entry.bin_class = Some(class);
        }
        Ok(self)
    }

    /// Derive both GSD tiers from the terrain spacing
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        for entry in &mut self.entries {
            entry.gsd = entry.bin_class.map(|class| gsd_pair(spacing, class));
        }
        self
    }

    pub fn into_entries(self) -> Vec<ImageEntry> {
        self.entries
    }
}

/// Write the settings pair and batch lines for every entry.
///
/// Returns the batch script path and the settings files written. The batch
/// script is flushed and closed before returning, on success or error.
pub fn render_all(
    config: &OrthoConfig,
    project: &str,
    terrain: &TerrainModel,
    boundary: &BoundaryExtent,
    entries: &[ImageEntry],
    batch_dir: &Path,
    batch_name: &str,
) -> OrthoResult<(PathBuf, Vec<PathBuf>)> {
    let renderer = ConfigRenderer::new(
        RenderContext {
            config,
            project,
            terrain,
            boundary,
        },
        batch_dir,
    );

    let mut batch = BatchWriter::open(batch_dir.join(batch_name))?;
    let mut settings_files = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        match renderer.render_entry(entry, &mut batch) {
            Ok(files) => settings_files.extend(files),
            Err(e) => {
                // Lines for earlier images stay on disk
                batch.finish()?;
                return Err(e);
            }
        }
    }
    let batch_path = batch.finish()?;

    Ok((batch_path, settings_files))
}

/// Interactive run over the host capabilities
pub struct Orchestrator<'a> {
    config: &'a OrthoConfig,
    chooser: &'a mut dyn Chooser,
    lister: &'a dyn DirectoryLister,
    runner: &'a mut dyn ToolRunner,
    projects: &'a dyn ProjectIndex,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        config: &'a OrthoConfig,
        chooser: &'a mut dyn Chooser,
        lister: &'a dyn DirectoryLister,
        runner: &'a mut dyn ToolRunner,
        projects: &'a dyn ProjectIndex,
    ) -> Self {
        Self {
            config,
            chooser,
            lister,
            runner,
            projects,
        }
    }

    /// Run the full generation sequence. `project_name` skips the name prompt.
    pub fn run(&mut self, project_name: Option<&str>) -> OrthoResult<RunSummary> {
        let started_at = Local::now();

        let name = match project_name {
            Some(name) => name.to_string(),
            None => self.chooser.prompt_text("enter name of project")?,
        };
        let project = self.projects.resolve(&name)?;

        let image_files = self.list_images(&project)?;
        let data_files = self.lister.list_directory(&project.data_path)?;
        log::info!(
            "{} image files, {} data files available",
            image_files.len(),
            data_files.len()
        );

        let count = self.prompt_image_count()?;
        let matcher = SupportMatcher::new(&image_files, &data_files, self.config.match_strategy);
        let working_set = self.select_images(count, &matcher)?;
        if working_set.is_empty() {
            return Err(OrthoError::InvalidInput(
                "none of the selected images has a support file".to_string(),
            ));
        }
        let working_set = working_set.classify(&project.data_path)?;

        let terrain = self.choose_terrain(&project)?;
        let boundary = self.choose_boundary()?;
        let entries = working_set.with_spacing(terrain.spacing).into_entries();

        let batch_dir = project.data_path.join(BATCH_DIR);
        std::fs::create_dir_all(&batch_dir)?;
        let batch_name = next_batch_name(&self.lister.list_directory(&batch_dir)?);

        let (batch_file, settings_files) = render_all(
            self.config,
            &project.name,
            &terrain,
            &boundary,
            &entries,
            &batch_dir,
            &batch_name,
        )?;

        self.chooser.notify(&format!(
            "{} settings files and {} were written to {}; please check them before running the batch",
            settings_files.len(),
            batch_name,
            batch_dir.display()
        ));

        let finished_at = Local::now();
        log::info!(
            "Run for {} finished at {} ({} images)",
            project.name,
            finished_at.format("%Y-%m-%d %H:%M:%S"),
            entries.len()
        );

        Ok(RunSummary {
            project: project.name,
            batch_file,
            settings_files,
            images: entries,
            started_at,
            finished_at,
        })
    }

    fn list_images(&self, project: &Project) -> OrthoResult<Vec<String>> {
        let mut files = Vec::new();
        for dir in image_directories(&project.imagery_path) {
            files.extend(self.lister.list_directory(&dir)?);
        }
        Ok(files)
    }

    fn prompt_image_count(&mut self) -> OrthoResult<usize> {
        let answer = self.chooser.prompt_text(
            "input number of images for orthos generation, color images that match the image ID are picked up when enabled",
        )?;
        match answer.parse::<usize>() {
            Ok(count) if count > 0 => Ok(count),
            _ => Err(OrthoError::InvalidInput(format!(
                "'{}' is not a positive image count",
                answer
            ))),
        }
    }

    fn select_images(&mut self, count: usize, matcher: &SupportMatcher<'_>) -> OrthoResult<WorkingSet> {
        let scope = if self.config.collect_all_matches {
            MatchScope::AllMatches
        } else {
            MatchScope::FirstMatch
        };

        let mut working_set = WorkingSet::new();
        for i in 0..count {
            let selection = self.chooser.select_file(
                &format!("select image {} of {} for orthos generation", i + 1, count),
                &FileFilter::RAW,
            )?;
            let before = working_set.len();
            working_set = working_set.with_selection(&selection, matcher, scope)?;
            if working_set.len() == before {
                self.chooser.notify(&format!(
                    "warning: nothing added for {}",
                    selection.display()
                ));
            }
            self.chooser
                .notify(&format!("selected: {:?}", working_set.support_files()));
        }
        Ok(working_set)
    }

    fn choose_terrain(&mut self, project: &Project) -> OrthoResult<TerrainModel> {
        let path = self
            .chooser
            .select_file("select the DTM to use for ortho generation", &FileFilter::DTH)?;

        let (program, args) = calc_ortho_boundary_command(self.config, &project.name, &path);
        if let Err(e) = self.runner.run(&program, &args) {
            log::warn!("calcOrthoBdry could not be started: {}", e);
            self.chooser.notify(&format!(
                "warning: calcOrthoBdry could not be started ({}); select an existing boundary log",
                e
            ));
        }

        let terrain = ParameterExtractor::read_terrain_model(&path)?;
        log::info!("Terrain {} spacing {}", terrain.stem, terrain.spacing);
        Ok(terrain)
    }

    fn choose_boundary(&mut self) -> OrthoResult<BoundaryExtent> {
        let path = self
            .chooser
            .select_file("select the calcOrthoBdry log for ortho generation", &FileFilter::LOG)?;
        let boundary = ParameterExtractor::read_boundary(&path)?;
        log::info!(
            "Boundary ({}): LL {} {} UR {} {}",
            boundary.family,
            boundary.ll_x,
            boundary.ll_y,
            boundary.ur_x,
            boundary.ur_y
        );
        Ok(boundary)
    }
}
