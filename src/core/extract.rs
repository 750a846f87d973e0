//! Labelled-field extraction from SOCET SET text artifacts
//!
//! Support files, terrain headers and calcOrthoBdry logs are free text with
//! one `LABEL ... value` record per line. Each artifact type has a small
//! table describing the fields it carries; a field's value is the last
//! whitespace token of the *last* line carrying its label.

use crate::types::{
    BoundaryExtent, CoordinateFamily, OrthoError, OrthoResult, TerrainModel, TERRAIN_EXTENSION,
};
use regex::Regex;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::OnceLock;

/// Largest terrain grid spacing accepted for orthophoto generation
pub const MAX_GRID_SPACING: i64 = 2;

/// Value type of a labelled field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Whole number
    Integer,
    /// Grid spacing with a zero-only fraction, e.g. `1.000000`
    Spacing,
}

/// One labelled field of a text artifact
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub label: &'static str,
    pub kind: FieldKind,
}

/// Support file fields
pub const TOTAL_SAMPLES: FieldSpec = FieldSpec {
    label: "TOTAL_SAMPLES",
    kind: FieldKind::Integer,
};

/// Terrain header fields
pub const SPACING_XY: FieldSpec = FieldSpec {
    label: "SPACING_XY",
    kind: FieldKind::Spacing,
};

/// Corner of the orthophoto footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    LowerLeft,
    UpperRight,
}

/// Axis of a corner coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Longitude or X
    Horizontal,
    /// Latitude or Y
    Vertical,
}

/// Boundary log fields: (corner, axis, geographic label, projected label)
pub const BOUNDARY_FIELDS: [(Corner, Axis, &str, &str); 4] = [
    (Corner::LowerLeft, Axis::Horizontal, "LL: Lon", "LL: X"),
    (Corner::LowerLeft, Axis::Vertical, "LL: Lat", "LL: Y"),
    (Corner::UpperRight, Axis::Horizontal, "UR: Lon", "UR: X"),
    (Corner::UpperRight, Axis::Vertical, "UR: Lat", "UR: Y"),
];

/// A corner record found in a boundary log
#[derive(Debug, Clone)]
struct CornerLine<'a> {
    corner: Corner,
    axis: Axis,
    family: CoordinateFamily,
    line: &'a str,
    value: Option<&'a str>,
}

fn corner_regex() -> &'static Regex {
    static CORNER_LINE: OnceLock<Regex> = OnceLock::new();
    CORNER_LINE.get_or_init(|| {
        Regex::new(r"^(LL|UR):\s*(Lon|Lat|X|Y)").expect("corner line pattern is valid")
    })
}

/// Field extraction from SOCET SET text artifacts
pub struct ParameterExtractor;

impl ParameterExtractor {
    /// Last line of `content` containing `label`
    pub fn last_line_with<'a>(content: &'a str, label: &str) -> Option<&'a str> {
        content.lines().filter(|line| line.contains(label)).last()
    }

    /// Final whitespace token of the last line carrying `label`
    pub fn scan<'a>(content: &'a str, label: &str, source_name: &str) -> OrthoResult<&'a str> {
        let line = Self::last_line_with(content, label)
            .ok_or_else(|| OrthoError::missing(label, source_name))?;
        line.split_whitespace()
            .last()
            .ok_or_else(|| OrthoError::malformed(label, line))
    }

    /// Integer field value
    pub fn scan_integer(content: &str, field: FieldSpec, source_name: &str) -> OrthoResult<i64> {
        debug_assert_eq!(field.kind, FieldKind::Integer);
        let token = Self::scan(content, field.label, source_name)?;
        token
            .parse::<i64>()
            .map_err(|_| OrthoError::malformed(field.label, token))
    }

    /// Sample count of a support file
    pub fn total_samples(content: &str, source_name: &str) -> OrthoResult<i64> {
        Self::scan_integer(content, TOTAL_SAMPLES, source_name)
    }

    /// Normalized grid spacing of a terrain header, not yet range-checked.
    ///
    /// Duplicate spacing tokens are collapsed and the largest value is taken
    /// as representative, so an out-of-range axis still fails validation.
    pub fn grid_spacing(content: &str, source_name: &str) -> OrthoResult<i64> {
        let label = SPACING_XY.label;
        let line = Self::last_line_with(content, label)
            .ok_or_else(|| OrthoError::missing(label, source_name))?;

        let unique: BTreeSet<&str> = line
            .split_whitespace()
            .filter(|token| !token.contains(label))
            .collect();

        let mut spacing: Option<i64> = None;
        for token in unique {
            let value = normalize_spacing(token)?;
            spacing = Some(spacing.map_or(value, |current| current.max(value)));
        }

        let spacing = spacing.ok_or_else(|| OrthoError::malformed(label, line))?;
        log::debug!("{} in {}: {}", label, source_name, spacing);
        Ok(spacing)
    }

    /// Corner coordinates of a calcOrthoBdry log.
    ///
    /// The coordinate family is decided by the last corner record in the
    /// log; every field is then taken from the last record of that family.
    pub fn boundary(content: &str, source_name: &str) -> OrthoResult<BoundaryExtent> {
        let records: Vec<CornerLine> = content.lines().filter_map(parse_corner_line).collect();

        let family = match records.last() {
            Some(record) => record.family,
            None => {
                let (_, _, geographic, projected) = BOUNDARY_FIELDS[0];
                return Err(OrthoError::missing(
                    format!("{} / {}", geographic, projected),
                    source_name,
                ));
            }
        };
        log::debug!("Boundary log {} uses {} coordinates", source_name, family);

        let field = |index: usize| -> OrthoResult<String> {
            let (corner, axis, geographic, projected) = BOUNDARY_FIELDS[index];
            let label = match family {
                CoordinateFamily::Geographic => geographic,
                CoordinateFamily::Projected => projected,
            };
            let record = records
                .iter()
                .filter(|r| r.corner == corner && r.axis == axis && r.family == family)
                .last()
                .ok_or_else(|| OrthoError::missing(label, source_name))?;
            record
                .value
                .map(str::to_string)
                .ok_or_else(|| OrthoError::malformed(label, record.line))
        };

        Ok(BoundaryExtent {
            family,
            ll_x: field(0)?,
            ll_y: field(1)?,
            ur_x: field(2)?,
            ur_y: field(3)?,
        })
    }

    /// Read a support file and return its sample count
    pub fn read_total_samples<P: AsRef<Path>>(path: P) -> OrthoResult<i64> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        Self::total_samples(&content, &path.display().to_string())
    }

    /// Read a terrain header and validate its grid spacing
    pub fn read_terrain_model<P: AsRef<Path>>(path: P) -> OrthoResult<TerrainModel> {
        let path = path.as_ref();
        log::info!("Reading terrain header: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let spacing = validate_spacing(Self::grid_spacing(&content, &path.display().to_string())?)?;

        let file_name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = file_name
            .strip_suffix(TERRAIN_EXTENSION)
            .unwrap_or(&file_name)
            .to_string();

        Ok(TerrainModel { stem, spacing })
    }

    /// Read a calcOrthoBdry log
    pub fn read_boundary<P: AsRef<Path>>(path: P) -> OrthoResult<BoundaryExtent> {
        let path = path.as_ref();
        log::info!("Reading boundary log: {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::boundary(&content, &path.display().to_string())
    }
}

fn parse_corner_line(line: &str) -> Option<CornerLine<'_>> {
    let captures = corner_regex().captures(line)?;
    let corner = match &captures[1] {
        "LL" => Corner::LowerLeft,
        _ => Corner::UpperRight,
    };
    let (axis, family) = match &captures[2] {
        "Lon" => (Axis::Horizontal, CoordinateFamily::Geographic),
        "Lat" => (Axis::Vertical, CoordinateFamily::Geographic),
        "X" => (Axis::Horizontal, CoordinateFamily::Projected),
        _ => (Axis::Vertical, CoordinateFamily::Projected),
    };
    let label_end = captures.get(0).map_or(0, |m| m.end());
    let value = line[label_end..].split_whitespace().last();

    Some(CornerLine {
        corner,
        axis,
        family,
        line,
        value,
    })
}

/// Strip a zero-only fraction and convert to an integer.
///
/// `"1.000000"` and `"1"` both give 1. A non-zero fraction is rejected.
pub fn normalize_spacing(token: &str) -> OrthoResult<i64> {
    let malformed = || OrthoError::malformed(SPACING_XY.label, token);
    let whole = match token.split_once('.') {
        Some((whole, fraction)) => {
            if !fraction.chars().all(|c| c == '0') {
                return Err(malformed());
            }
            whole
        }
        None => token,
    };
    whole.parse::<i64>().map_err(|_| malformed())
}

/// Reject spacings that point to a badly built terrain model
pub fn validate_spacing(spacing: i64) -> OrthoResult<u32> {
    if spacing < 1 || spacing > MAX_GRID_SPACING {
        return Err(OrthoError::ValidationFailure(format!(
            "terrain grid spacing {} is outside 1..={}; the SPACING_XY value was \
             either read incorrectly or the DTM was built incorrectly, please check it",
            spacing, MAX_GRID_SPACING
        )));
    }
    Ok(spacing as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_samples_last_line_wins() {
        let sup = "OBJECT IMAGE\nTOTAL_SAMPLES 10000\nLINES 40000\nTOTAL_SAMPLES 20000\n";
        assert_eq!(ParameterExtractor::total_samples(sup, "a.sup").unwrap(), 20000);
    }

    #[test]
    fn test_total_samples_missing() {
        let err = ParameterExtractor::total_samples("LINES 40000\n", "a.sup").unwrap_err();
        match err {
            OrthoError::MissingField { field, .. } => assert_eq!(field, "TOTAL_SAMPLES"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_total_samples_malformed() {
        let err = ParameterExtractor::total_samples("TOTAL_SAMPLES lots\n", "a.sup").unwrap_err();
        assert!(matches!(err, OrthoError::MalformedField { .. }));
    }

    #[test]
    fn test_grid_spacing() {
        let dth = "FORMAT DTM\nSPACING_XY 1.000000 1.000000\nMIN_Z -4000.0\n";
        assert_eq!(ParameterExtractor::grid_spacing(dth, "a.dth").unwrap(), 1);

        let dth = "SPACING_XY 3.000000 3.000000\r\n";
        assert_eq!(ParameterExtractor::grid_spacing(dth, "a.dth").unwrap(), 3);
        assert!(matches!(
            validate_spacing(3),
            Err(OrthoError::ValidationFailure(_))
        ));
    }

    #[test]
    fn test_grid_spacing_mixed_values_takes_largest() {
        let dth = "SPACING_XY 2.000000 1.000000\n";
        assert_eq!(ParameterExtractor::grid_spacing(dth, "a.dth").unwrap(), 2);

        // One axis out of range is enough to reject the terrain model
        let dth = "SPACING_XY 1.000000 3.000000\n";
        let spacing = ParameterExtractor::grid_spacing(dth, "a.dth").unwrap();
        assert_eq!(spacing, 3);
        assert!(matches!(
            validate_spacing(spacing),
            Err(OrthoError::ValidationFailure(_))
        ));
    }

    #[test]
    fn test_grid_spacing_fractional_is_malformed() {
        let err = ParameterExtractor::grid_spacing("SPACING_XY 0.500000 0.500000\n", "a.dth")
            .unwrap_err();
        assert!(matches!(err, OrthoError::MalformedField { .. }));

        let err = ParameterExtractor::grid_spacing("SPACING_XY\n", "a.dth").unwrap_err();
        assert!(matches!(err, OrthoError::MalformedField { .. }));
    }

    #[test]
    fn test_normalize_spacing_idempotent() {
        let once = normalize_spacing("2.000000").unwrap();
        let twice = normalize_spacing(&once.to_string()).unwrap();
        assert_eq!(once, 2);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_validate_spacing_bounds() {
        assert_eq!(validate_spacing(1).unwrap(), 1);
        assert_eq!(validate_spacing(2).unwrap(), 2);
        assert!(validate_spacing(0).is_err());
        assert!(validate_spacing(-1).is_err());
    }

    #[test]
    fn test_boundary_geographic() {
        let log = "\
calcOrthoBdry started
LL: Lon 137.10
LL: Lat -4.80
UR: Lon 137.20
UR: Lat -4.70
recomputed
LL: Lon 137.11
LL: Lat -4.81
UR: Lon 137.21
UR: Lat -4.71
";
        let extent = ParameterExtractor::boundary(log, "calc.log").unwrap();
        assert_eq!(extent.family, CoordinateFamily::Geographic);
        assert_eq!(extent.ll_x, "137.11");
        assert_eq!(extent.ll_y, "-4.81");
        assert_eq!(extent.ur_x, "137.21");
        assert_eq!(extent.ur_y, "-4.71");
    }

    #[test]
    fn test_boundary_projected_does_not_mix_families() {
        let log = "\
LL: Lon 137.10
LL: Lat -4.80
UR: Lon 137.20
UR: Lat -4.70
LL: X 8120.5
LL: Y -284000.0
UR: X 9120.5
UR: Y -283000.0
";
        let extent = ParameterExtractor::boundary(log, "calc.log").unwrap();
        assert_eq!(extent.family, CoordinateFamily::Projected);
        assert_eq!(extent.ll_x, "8120.5");
        assert_eq!(extent.ur_y, "-283000.0");
    }

    #[test]
    fn test_boundary_missing_field() {
        let log = "LL: Lon -5.2\nLL: Lon -5.3\n";
        match ParameterExtractor::boundary(log, "calc.log").unwrap_err() {
            OrthoError::MissingField { field, .. } => assert_eq!(field, "LL: Lat"),
            other => panic!("unexpected error: {}", other),
        }

        match ParameterExtractor::boundary("nothing here\n", "calc.log").unwrap_err() {
            OrthoError::MissingField { field, .. } => assert!(field.contains("LL: Lon")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_boundary_label_without_value() {
        let log = "LL: Lon\nLL: Lat 1\nUR: Lon 2\nUR: Lat 3\n";
        let err = ParameterExtractor::boundary(log, "calc.log").unwrap_err();
        assert!(matches!(err, OrthoError::MalformedField { .. }));
    }

    #[test]
    fn test_read_terrain_model_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gale_dtm_1m.dth");
        std::fs::write(&path, "SPACING_XY 1.000000 1.000000\n").unwrap();

        let terrain = ParameterExtractor::read_terrain_model(&path).unwrap();
        assert_eq!(terrain.stem, "gale_dtm_1m");
        assert_eq!(terrain.spacing, 1);
    }
}
