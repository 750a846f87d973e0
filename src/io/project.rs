use crate::config::OrthoConfig;
use crate::types::{OrthoError, OrthoResult, Project};
use std::path::{Path, PathBuf};

/// Label of the data directory line in a `.prj` descriptor
const DATA_PATH_LABEL: &str = "DATA_PATH";

/// Subdirectory of the imagery location holding raw images
const ISIS_DIR: &str = "isis";

/// Optional color products under the ISIS directory
const COLOR_DIR: &str = "COLOR";

/// Project lookup capability
pub trait ProjectIndex {
    fn resolve(&self, name: &str) -> OrthoResult<Project>;
}

/// Resolves projects from SOCET SET's `location.list` and `<name>.prj` files
#[derive(Debug, Clone)]
pub struct SocetProjectIndex {
    data_root: PathBuf,
    location_list: PathBuf,
}

impl SocetProjectIndex {
    pub fn new(data_root: impl Into<PathBuf>, location_list: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
            location_list: location_list.into(),
        }
    }

    pub fn from_config(config: &OrthoConfig) -> Self {
        Self::new(&config.data_root, config.location_list_path())
    }

    /// Data directory from the second line of a `.prj` descriptor
    pub fn parse_data_path(prj: &str, source_name: &str) -> OrthoResult<PathBuf> {
        let line = prj
            .lines()
            .nth(1)
            .filter(|line| line.contains(DATA_PATH_LABEL))
            .ok_or_else(|| OrthoError::missing(DATA_PATH_LABEL, source_name))?;

        let path = line.replacen(DATA_PATH_LABEL, "", 1);
        let path = path.trim();
        if path.is_empty() {
            return Err(OrthoError::malformed(DATA_PATH_LABEL, line));
        }
        Ok(PathBuf::from(path))
    }

    /// Imagery location of `project` from `location.list`; the last entry wins
    pub fn parse_imagery_location(
        list: &str,
        project: &str,
        source_name: &str,
    ) -> OrthoResult<PathBuf> {
        list.lines()
            .filter(|line| line.contains(project))
            .last()
            .and_then(|line| line.split_whitespace().last())
            .map(PathBuf::from)
            .ok_or_else(|| OrthoError::missing(project, source_name))
    }
}

impl ProjectIndex for SocetProjectIndex {
    fn resolve(&self, name: &str) -> OrthoResult<Project> {
        let prj_path = self.data_root.join(format!("{}.prj", name));
        log::info!("Reading project descriptor: {}", prj_path.display());
        let prj = std::fs::read_to_string(&prj_path)?;
        let data_path = Self::parse_data_path(&prj, &prj_path.display().to_string())?;

        let list = std::fs::read_to_string(&self.location_list)?;
        let imagery_path = Self::parse_imagery_location(
            &list,
            name,
            &self.location_list.display().to_string(),
        )?;

        log::info!("Project {} data path: {}", name, data_path.display());
        log::info!("Project {} imagery: {}", name, imagery_path.display());

        Ok(Project {
            name: name.to_string(),
            data_path,
            imagery_path,
        })
    }
}

/// Directories holding the project's raw images: `isis`, plus `isis/COLOR` when present
pub fn image_directories(imagery_path: &Path) -> Vec<PathBuf> {
    let isis = imagery_path.join(ISIS_DIR);
    let color = isis.join(COLOR_DIR);
    if color.is_dir() {
        vec![isis, color]
    } else {
        vec![isis]
    }
}
