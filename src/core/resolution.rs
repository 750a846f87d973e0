use crate::types::{GsdPair, REFERENCE_SAMPLES};

/// Centimeters of fine-tier GSD per bin class
pub const FINE_GSD_STEP_CM: u32 = 25;

/// Bin class of an image from its sample count.
///
/// Only full-width products (exactly 20000 samples) are unbinned; every
/// other width is treated as bin 2.
pub fn bin_class(total_samples: i64) -> u8 {
    if total_samples == REFERENCE_SAMPLES {
        1
    } else {
        2
    }
}

/// Coarse (meter) and fine (centimeter) GSD for an image
pub fn gsd_pair(spacing: u32, bin_class: u8) -> GsdPair {
    GsdPair {
        coarse: spacing,
        fine: FINE_GSD_STEP_CM * u32::from(bin_class),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_class() {
        assert_eq!(bin_class(20000), 1);
        assert_eq!(bin_class(9900), 2);
        assert_eq!(bin_class(20001), 2);
        assert_eq!(bin_class(0), 2);
        assert_eq!(bin_class(-20000), 2);
    }

    #[test]
    fn test_gsd_pair() {
        assert_eq!(gsd_pair(1, 1), GsdPair { coarse: 1, fine: 25 });
        assert_eq!(gsd_pair(2, 2), GsdPair { coarse: 2, fine: 50 });
    }
}
