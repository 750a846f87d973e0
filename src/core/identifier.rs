use crate::types::{OrthoError, OrthoResult};
use std::path::Path;

/// Number of `_`-separated tokens forming an image identifier
const IDENTIFIER_TOKENS: usize = 3;

/// Derive the canonical image identifier from a raw image path.
///
/// `ESP_012345_1780_RED5_0.raw` becomes `ESP_012345_1780`.
pub fn image_identifier<P: AsRef<Path>>(path: P) -> OrthoResult<String> {
    let path = path.as_ref();
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let tokens: Vec<&str> = stem.split('_').take(IDENTIFIER_TOKENS).collect();
    if tokens.len() < IDENTIFIER_TOKENS {
        return Err(OrthoError::MissingIdentifierTokens(
            path.display().to_string(),
        ));
    }

    let identifier = tokens.join("_");
    log::debug!("Image identifier for {}: {}", path.display(), identifier);
    Ok(identifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_from_full_path() {
        let id = image_identifier("/data/gale/isis/ESP_012345_1780_RED5_0.raw").unwrap();
        assert_eq!(id, "ESP_012345_1780");
    }

    #[test]
    fn test_identifier_drops_extension() {
        assert_eq!(image_identifier("PSP_001_002.raw").unwrap(), "PSP_001_002");
    }

    #[test]
    fn test_identifier_windows_style_name() {
        assert_eq!(
            image_identifier("ESP_011111_2222_COLOR.raw").unwrap(),
            "ESP_011111_2222"
        );
    }

    #[test]
    fn test_too_few_tokens() {
        let err = image_identifier("ESP_012345.raw").unwrap_err();
        assert!(matches!(err, OrthoError::MissingIdentifierTokens(_)));

        assert!(image_identifier("").is_err());
    }
}
