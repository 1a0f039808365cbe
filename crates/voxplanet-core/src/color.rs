//! HSL palette quantizer. Mirrors `shaders/common/quantize.wgsl`.
//!
//! Rounding uses ties-to-even because that is what WGSL `round` does; the CPU and GPU paths
//! must land on the same grid level for the same input.

use glam::{Vec3, Vec4};

use crate::constants::QUANT_STEPS;

/// Convert RGB in [0,1] to (hue, saturation, lightness), hue in [0,1) of a full turn.
///
/// Grays (max == min) have hue 0 and saturation 0.
pub fn rgb_to_hsl(rgb: Vec3) -> Vec3 {
    let maxc = rgb.max_element();
    let minc = rgb.min_element();
    let lightness = (maxc + minc) * 0.5;
    if maxc == minc {
        return Vec3::new(0.0, 0.0, lightness);
    }

    let delta = maxc - minc;
    let saturation = if lightness > 0.5 {
        delta / (2.0 - maxc - minc)
    } else {
        delta / (maxc + minc)
    };

    let hue = if maxc == rgb.x {
        let h = (rgb.y - rgb.z) / delta;
        if rgb.y < rgb.z {
            h + 6.0
        } else {
            h
        }
    } else if maxc == rgb.y {
        (rgb.z - rgb.x) / delta + 2.0
    } else {
        (rgb.x - rgb.y) / delta + 4.0
    };

    Vec3::new(hue / 6.0, saturation, lightness)
}

fn hue_to_rgb(p: f32, q: f32, hue: f32) -> f32 {
    let mut t = hue;
    if t < 0.0 {
        t += 1.0;
    }
    if t > 1.0 {
        t -= 1.0;
    }
    if t < 1.0 / 6.0 {
        return p + (q - p) * 6.0 * t;
    }
    if t < 0.5 {
        return q;
    }
    if t < 2.0 / 3.0 {
        return p + (q - p) * (2.0 / 3.0 - t) * 6.0;
    }
    p
}

/// Convert (hue, saturation, lightness) back to RGB.
pub fn hsl_to_rgb(hsl: Vec3) -> Vec3 {
    let (h, s, l) = (hsl.x, hsl.y, hsl.z);
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_rgb(p, q, h + 1.0 / 3.0),
        hue_to_rgb(p, q, h),
        hue_to_rgb(p, q, h - 1.0 / 3.0),
    )
}

/// Snap a channel to the nearest of the 33 levels k / 32.
pub fn quantize_step(value: f32) -> f32 {
    (value * QUANT_STEPS).round_ties_even() / QUANT_STEPS
}

/// Snap a lit color onto the stylized palette.
///
/// Hue and lightness are rounded to the 1/32 grid, saturation is forced to 1.0 and alpha
/// passes through untouched. A hue that rounds up to a full turn wraps back to 0.
pub fn quantize_color(color: Vec4) -> Vec4 {
    let hsl = rgb_to_hsl(color.truncate());
    let hue = quantize_step(hsl.x);
    let hue = hue - hue.floor();
    let lightness = quantize_step(hsl.z);
    hsl_to_rgb(Vec3::new(hue, 1.0, lightness)).extend(color.w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f32 = 1e-5;

    fn assert_close(a: Vec3, b: Vec3) {
        assert!(a.abs_diff_eq(b, EPS), "{a} != {b}");
    }

    #[test]
    fn test_primary_hues() {
        assert_close(rgb_to_hsl(Vec3::new(1.0, 0.0, 0.0)), Vec3::new(0.0, 1.0, 0.5));
        assert_close(rgb_to_hsl(Vec3::new(0.0, 1.0, 0.0)), Vec3::new(1.0 / 3.0, 1.0, 0.5));
        assert_close(rgb_to_hsl(Vec3::new(0.0, 0.0, 1.0)), Vec3::new(2.0 / 3.0, 1.0, 0.5));
        // Magenta: max is red with g < b, so the hue wraps through +6
        assert_close(rgb_to_hsl(Vec3::new(1.0, 0.0, 1.0)), Vec3::new(5.0 / 6.0, 1.0, 0.5));
    }

    #[test]
    fn test_gray_has_zero_hue_and_saturation() {
        assert_eq!(rgb_to_hsl(Vec3::splat(0.25)), Vec3::new(0.0, 0.0, 0.25));
        assert_eq!(hsl_to_rgb(Vec3::new(0.7, 0.0, 0.25)), Vec3::splat(0.25));
    }

    #[test]
    fn test_hsl_roundtrip_table() {
        let table = [
            Vec3::new(0.2, 0.4, 0.6),
            Vec3::new(0.9, 0.1, 0.3),
            Vec3::new(0.5, 0.5, 0.1),
            Vec3::new(0.05, 0.8, 0.75),
            Vec3::new(1.0, 0.6, 0.0),
        ];
        for rgb in table {
            assert_close(hsl_to_rgb(rgb_to_hsl(rgb)), rgb);
        }
    }

    #[test]
    fn test_quantize_step_grid() {
        assert_eq!(quantize_step(0.0), 0.0);
        assert_eq!(quantize_step(1.0), 1.0);
        assert_eq!(quantize_step(0.5), 0.5);
        assert_eq!(quantize_step(0.51), 16.0 / 32.0);
        assert_eq!(quantize_step(0.52), 17.0 / 32.0);
        // 0.5 / 32 sits exactly between level 0 and 1: ties go to even
        assert_eq!(quantize_step(0.5 / 32.0), 0.0);
        assert_eq!(quantize_step(1.5 / 32.0), 2.0 / 32.0);
    }

    #[test]
    fn test_quantize_saturates_and_keeps_alpha() {
        let out = quantize_color(Vec4::new(0.6, 0.5, 0.45, 0.25));
        assert_eq!(out.w, 0.25);
        let hsl = rgb_to_hsl(out.truncate());
        assert!((hsl.y - 1.0).abs() < EPS, "saturation {}", hsl.y);
    }

    #[test]
    fn test_quantize_pure_red_is_fixed_point() {
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        // The blue channel lands a few ulps above zero through the 1/3 hue offsets
        assert!(quantize_color(red).abs_diff_eq(red, EPS));
    }

    #[test]
    fn test_quantize_black_and_white() {
        assert_eq!(quantize_color(Vec4::new(0.0, 0.0, 0.0, 1.0)), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(quantize_color(Vec4::ONE), Vec4::ONE);
    }

    #[test]
    fn test_quantize_gray_maps_to_hue_zero() {
        // Gray has hue 0; forcing saturation to 1 turns it into a red of the same lightness.
        let out = quantize_color(Vec4::new(0.5, 0.5, 0.5, 1.0));
        assert!(out.truncate().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS), "{out}");
    }

    #[test]
    fn test_hue_near_full_turn_wraps() {
        // Hue just below 1.0 rounds to 32/32 and must wrap to 0 (red), not overflow
        let almost_red = Vec3::new(1.0, 0.0, 0.005);
        let out = quantize_color(almost_red.extend(1.0));
        assert!(out.truncate().abs_diff_eq(Vec3::new(1.0, 0.0, 0.0), EPS), "{out}");
    }

    #[test]
    fn test_quantize_is_deterministic() {
        let c = Vec4::new(0.31, 0.72, 0.18, 1.0);
        assert_eq!(quantize_color(c).to_array(), quantize_color(c).to_array());
    }

    proptest! {
        #[test]
        fn prop_quantize_idempotent(r in 0.0f32..=1.0, g in 0.0f32..=1.0, b in 0.0f32..=1.0, a in 0.0f32..=1.0) {
            let once = quantize_color(Vec4::new(r, g, b, a));
            let twice = quantize_color(once);
            prop_assert!(once.abs_diff_eq(twice, 1e-4), "{} vs {}", once, twice);
        }

        #[test]
        fn prop_quantize_saturation_is_one(r in 0.0f32..=1.0, g in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let rgb = Vec3::new(r, g, b);
            let out = quantize_color(rgb.extend(1.0)).truncate();
            let lightness = quantize_step(rgb_to_hsl(rgb).z);
            // Black and white have no hue to saturate
            prop_assume!(lightness > 0.0 && lightness < 1.0);
            let hsl = rgb_to_hsl(out);
            prop_assert!((hsl.y - 1.0).abs() < 1e-4, "saturation {} for {}", hsl.y, rgb);
        }

        #[test]
        fn prop_quantize_output_in_unit_cube(r in 0.0f32..=1.0, g in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let out = quantize_color(Vec4::new(r, g, b, 1.0));
            for c in out.to_array() {
                prop_assert!((-1e-6..=1.0 + 1e-6).contains(&c));
            }
        }
    }
}
