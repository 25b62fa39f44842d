//! Unit conversion utilities.
//!
//! Manifest coordinates are authored in inches and font sizes in points, the
//! same units presentation tools expose. The package itself stores EMUs for
//! geometry and hundredths of a point for font sizes.

pub const EMUS_PER_INCH: i64 = 914_400;
pub const EMUS_PER_PT: i64 = 12_700;

#[inline]
pub fn inch_to_emu(inches: f64) -> i64 {
    (inches * EMUS_PER_INCH as f64).round() as i64
}

#[inline]
pub fn emu_to_inch(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_INCH as f64
}

#[inline]
pub fn pt_to_emu_f64(pt: f64) -> i64 {
    (pt * EMUS_PER_PT as f64) as i64
}

/// Font size in points to the `sz` attribute of `a:rPr` (hundredths of a point).
#[inline]
pub fn pt_to_centipoints(pt: f64) -> u32 {
    (pt * 100.0).round().max(0.0) as u32
}

/// Scale an EMU length onto a raster of `target_px` pixels spanning `extent_emu`.
#[inline]
pub fn emu_to_px_scaled(emu: i64, extent_emu: i64, target_px: u32) -> i64 {
    if extent_emu <= 0 {
        return 0;
    }
    ((emu as f64) * target_px as f64 / extent_emu as f64).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inch_conversions() {
        assert_eq!(inch_to_emu(1.0), 914_400);
        assert_eq!(inch_to_emu(10.0), 9_144_000);
        assert_eq!(inch_to_emu(5.625), 5_143_500);
        assert_eq!(inch_to_emu(0.05), 45_720);
        assert!((emu_to_inch(4_572_000) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_point_conversions() {
        assert_eq!(pt_to_centipoints(18.0), 1800);
        assert_eq!(pt_to_centipoints(13.5), 1350);
        assert_eq!(pt_to_emu_f64(1.0), 12_700);
    }

    #[test]
    fn test_scaled_pixels() {
        assert_eq!(emu_to_px_scaled(4_572_000, 9_144_000, 960), 480);
        assert_eq!(emu_to_px_scaled(100, 0, 960), 0);
    }
}
