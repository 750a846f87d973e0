//! Settings document and batch script rendering
//!
//! Each image gets two SOCET SET `orthophoto` settings files, one per GSD
//! tier, and two `call` lines in the shared `master_orthos_<n>.bat`.

use crate::config::OrthoConfig;
use crate::types::{BoundaryExtent, GsdPair, ImageEntry, OrthoError, OrthoResult, TerrainModel};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Marker shared by every batch script name
pub const BATCH_PREFIX: &str = "master_orthos";

/// Column the settings values are tab-aligned to
const VALUE_COLUMN: usize = 40;
const TAB_WIDTH: usize = 8;

/// GSD tier of a settings document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Meter-scale, equal to the terrain spacing
    Coarse,
    /// Centimeter-scale, `25 * bin class`
    Fine,
}

impl Tier {
    pub const ALL: [Tier; 2] = [Tier::Coarse, Tier::Fine];

    fn unit(self) -> &'static str {
        match self {
            Tier::Coarse => "m",
            Tier::Fine => "cm",
        }
    }

    /// GSD value of this tier
    pub fn value(self, gsd: GsdPair) -> u32 {
        match self {
            Tier::Coarse => gsd.coarse,
            Tier::Fine => gsd.fine,
        }
    }

    /// `ortho.gsd` literal; centimeter values are written as a decimal fraction
    fn gsd_literal(self, value: u32) -> String {
        match self {
            Tier::Coarse => value.to_string(),
            Tier::Fine => format!(".{}", value),
        }
    }
}

/// Resolved values shared by every settings document of a run
pub struct RenderContext<'a> {
    pub config: &'a OrthoConfig,
    pub project: &'a str,
    pub terrain: &'a TerrainModel,
    pub boundary: &'a BoundaryExtent,
}

/// Ordered key/value settings file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsDocument {
    entries: Vec<(String, String)>,
}

impl SettingsDocument {
    /// Build the settings for one image at one tier
    pub fn for_image(ctx: &RenderContext<'_>, entry: &ImageEntry, tier: Tier) -> OrthoResult<Self> {
        let value = tier.value(require_gsd(entry)?);
        let b = ctx.boundary;

        let fields: [(&str, String); 37] = [
            ("setting_file", "1.1".into()),
            ("ortho.project", ctx.config.project_file(ctx.project)),
            ("ortho.task", "SIMPLE_ORTHO".into()),
            ("ortho.image", entry.support_file.clone()),
            ("ortho.use_dtm", "YES".into()),
            ("ortho.dtm", format!("{}.dth", ctx.terrain.stem)),
            ("ortho.elevation", "0.0".into()),
            ("ortho.foot_entry", "TWO".into()),
            // The external schema wants all four corners; the footprint only has two.
            ("ortho.ul_x", b.ll_x.clone()),
            ("ortho.ul_y", b.ur_y.clone()),
            ("ortho.ur_x", b.ur_x.clone()),
            ("ortho.ur_y", b.ur_y.clone()),
            ("ortho.ll_x", b.ll_x.clone()),
            ("ortho.ll_y", b.ll_y.clone()),
            ("ortho.lr_x", b.ur_x.clone()),
            ("ortho.lr_y", b.ll_y.clone()),
            (
                "ortho.output_file",
                format!("{}_{}{}_o", entry.stem(), value, tier.unit()),
            ),
            ("ortho.output_location", ctx.project.to_string()),
            ("ortho.file_format", "img_type_tiff_tiled".into()),
            ("ortho.jpeg_quality", "90".into()),
            ("ortho.gsd", tier.gsd_literal(value)),
            ("ortho.doq_overedge", "300.0".into()),
            ("ortho.doq_size", "QUARTER".into()),
            ("ortho.grid_btn", "NO".into()),
            ("ortho.grid_int", "20".into()),
            ("ortho.arc_world", "YES".into()),
            ("ortho.ortho_info", "YES".into()),
            ("ortho.auto_min", "YES".into()),
            ("ortho.auto_load", "NO".into()),
            ("ortho.construct_geotiff", "YES".into()),
            ("ortho.use_tin_map", "YES".into()),
            ("ortho.allow_dense_dtm", "NO".into()),
            ("ortho.background_color", "BLACK".into()),
            ("ortho.interp", "BILINEAR".into()),
            ("ortho.ortho_mate", "NO".into()),
            ("ortho.base_to_height", "1.0".into()),
            ("ortho.left_or_right", "LEFT".into()),
        ];

        Ok(Self {
            entries: fields
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        })
    }

    /// `<support file>_<gsd>.set`
    pub fn file_name(entry: &ImageEntry, value: u32) -> String {
        format!("{}_{}.set", entry.support_file, value)
    }

    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Text form, one tab-aligned `key value` pair per line
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            let tabs = (VALUE_COLUMN.saturating_sub(key.len() / TAB_WIDTH * TAB_WIDTH) / TAB_WIDTH).max(1);
            out.push_str(key);
            out.push_str(&"\t".repeat(tabs));
            out.push_str(value);
            out.push('\n');
        }
        out
    }

    /// Parse a settings file back into its ordered pairs
    pub fn parse(text: &str) -> OrthoResult<Self> {
        let mut entries = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = line
                .split_once(char::is_whitespace)
                .ok_or_else(|| OrthoError::malformed("settings line", line))?;
            entries.push((key.to_string(), value.trim().to_string()));
        }
        Ok(Self { entries })
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> OrthoResult<()> {
        let path = path.as_ref();
        log::debug!("Writing settings file: {}", path.display());
        std::fs::write(path, self.render())?;
        Ok(())
    }
}

fn require_gsd(entry: &ImageEntry) -> OrthoResult<GsdPair> {
    entry.gsd.ok_or_else(|| {
        OrthoError::InvalidInput(format!(
            "{} has not been classified yet",
            entry.support_file
        ))
    })
}

/// `call` line running one settings file through `orthophoto`
pub fn invocation_line(config: &OrthoConfig, project: &str, settings_file: &str) -> String {
    format!(
        "call \"{}\" -log \"{}\" -single orthophoto -batch -a conventional -s {}\n",
        config.start_socet(),
        config.batch_log(project),
        settings_file
    )
}

/// First unused `master_orthos_<n>.bat` given the batch directory listing.
///
/// Numbering starts at the count of existing batch scripts and skips any
/// name already taken.
pub fn next_batch_name(existing: &[String]) -> String {
    let mut n = existing.iter().filter(|name| name.contains(BATCH_PREFIX)).count();
    loop {
        let candidate = format!("{}_{}.bat", BATCH_PREFIX, n);
        if !existing.iter().any(|name| *name == candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Append-only batch script held open for the render phase
pub struct BatchWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    lines: usize,
}

impl BatchWriter {
    pub fn open<P: AsRef<Path>>(path: P) -> OrthoResult<Self> {
        let path = path.as_ref().to_path_buf();
        log::info!("Opening batch script: {}", path.display());
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            lines: 0,
        })
    }

    pub fn append_invocation(
        &mut self,
        config: &OrthoConfig,
        project: &str,
        settings_file: &str,
    ) -> OrthoResult<()> {
        self.writer
            .write_all(invocation_line(config, project, settings_file).as_bytes())?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines_written(&self) -> usize {
        self.lines
    }

    /// Flush and close, returning the script path
    pub fn finish(mut self) -> OrthoResult<PathBuf> {
        self.writer.flush()?;
        log::info!("Batch script {} has {} new lines", self.path.display(), self.lines);
        Ok(self.path)
    }
}

/// Writes the settings pair and batch lines for each image
pub struct ConfigRenderer<'a> {
    ctx: RenderContext<'a>,
    out_dir: PathBuf,
}

impl<'a> ConfigRenderer<'a> {
    pub fn new(ctx: RenderContext<'a>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            ctx,
            out_dir: out_dir.into(),
        }
    }

    /// Render both tiers of `entry`, returning the settings files written
    pub fn render_entry(
        &self,
        entry: &ImageEntry,
        batch: &mut BatchWriter,
    ) -> OrthoResult<Vec<PathBuf>> {
        let gsd = require_gsd(entry)?;
        let mut written = Vec::with_capacity(Tier::ALL.len());
        let mut names = Vec::with_capacity(Tier::ALL.len());

        for tier in Tier::ALL {
            let document = SettingsDocument::for_image(&self.ctx, entry, tier)?;
            let name = SettingsDocument::file_name(entry, tier.value(gsd));
            let path = self.out_dir.join(&name);
            document.write_to(&path)?;
            written.push(path);
            names.push(name);
        }

        for name in &names {
            batch.append_invocation(self.ctx.config, self.ctx.project, name)?;
        }

        log::info!("Rendered settings for {}", entry.support_file);
        Ok(written)
    }
}
