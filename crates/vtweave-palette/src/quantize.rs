//! Perceptual nearest-color search over the reference palette.
//!
//! Colors are converted sRGB → linear RGB → CIE XYZ (D65) → CIE L\*a\*b\*
//! and scored by squared Euclidean distance (CIE76 ΔE without the square
//! root — only relative order matters). The candidate scan is ascending and
//! keeps the first minimal index, so exact ties resolve to the lowest
//! palette entry.

use crate::palette::{PALETTE_SIZE, REFERENCE_PALETTE, Rgb, palette_rgb};

/// CIE L\*a\*b\* coordinates.
#[derive(Debug, Clone, Copy)]
struct Lab {
    l: f64,
    a: f64,
    b: f64,
}

/// sRGB gamma-decode threshold.
const SRGB_LINEAR_THRESHOLD: f64 = 0.04045;

/// CIE ε = 216/24389 and κ = 24389/27 (Lab pivot constants).
const EPSILON: f64 = 216.0 / 24389.0;
const KAPPA: f64 = 24389.0 / 27.0;

/// D65 reference white.
const WHITE_X: f64 = 0.95047;
const WHITE_Y: f64 = 1.0;
const WHITE_Z: f64 = 1.08883;

fn gamma_decode(channel: u8) -> f64 {
    let c = f64::from(channel) / 255.0;
    if c > SRGB_LINEAR_THRESHOLD {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

fn lab_pivot(t: f64) -> f64 {
    if t > EPSILON {
        t.cbrt()
    } else {
        (KAPPA * t + 16.0) / 116.0
    }
}

fn srgb_to_lab(rgb: Rgb) -> Lab {
    let r = gamma_decode(rgb.r);
    let g = gamma_decode(rgb.g);
    let b = gamma_decode(rgb.b);

    // sRGB D65 matrix.
    let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
    let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
    let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;

    let fx = lab_pivot(x / WHITE_X);
    let fy = lab_pivot(y / WHITE_Y);
    let fz = lab_pivot(z / WHITE_Z);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

fn distance_sq(a: Lab, b: Lab) -> f64 {
    let dl = a.l - b.l;
    let da = a.a - b.a;
    let db = a.b - b.b;
    dl * dl + da * da + db * db
}

/// Find the nearest palette entry to `rgb` among the first `max_candidates`
/// reference colors.
///
/// `max_candidates` is clamped to `1..=256`; in practice it is 16 or 256,
/// driven by the target color depth. On an exact distance tie the lowest
/// index wins.
#[must_use]
pub fn quantize_rgb(rgb: Rgb, max_candidates: usize) -> u8 {
    let max = max_candidates.clamp(1, PALETTE_SIZE);
    let target = srgb_to_lab(rgb);

    let mut best = 0u8;
    let mut best_dist = f64::INFINITY;
    for (idx, candidate) in REFERENCE_PALETTE[..max].iter().enumerate() {
        let dist = distance_sq(target, srgb_to_lab(*candidate));
        if dist < best_dist {
            best = idx as u8;
            best_dist = dist;
        }
    }
    best
}

/// Re-quantize an already-indexed color to a smaller candidate set.
///
/// Indices below `max_candidates` are already renderable and return
/// unchanged (cheap path); anything else resolves through the reference
/// palette and runs the full nearest-color search.
#[must_use]
pub fn quantize_index(index: u8, max_candidates: usize) -> u8 {
    if (index as usize) < max_candidates.clamp(1, PALETTE_SIZE) {
        return index;
    }
    quantize_rgb(palette_rgb(index), max_candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Conversion sanity ──────────────────────────────────────────

    #[test]
    fn lab_of_white_is_l100() {
        let lab = srgb_to_lab(Rgb::new(255, 255, 255));
        assert!((lab.l - 100.0).abs() < 0.01, "L = {}", lab.l);
        assert!(lab.a.abs() < 0.01);
        assert!(lab.b.abs() < 0.01);
    }

    #[test]
    fn lab_of_black_is_l0() {
        let lab = srgb_to_lab(Rgb::new(0, 0, 0));
        assert!(lab.l.abs() < 0.01, "L = {}", lab.l);
    }

    // ── Nearest-match search ───────────────────────────────────────

    #[test]
    fn pure_red_resolves_to_bright_red_at_16() {
        // Exact match: bright red is (255,0,0) in the base palette.
        assert_eq!(quantize_rgb(Rgb::new(255, 0, 0), 16), 9);
        // Half-intensity red is closer to the dim entry.
        assert_eq!(quantize_rgb(Rgb::new(130, 10, 10), 16), 1);
    }

    #[test]
    fn exact_palette_entries_are_fixed_points() {
        for idx in 0..16u8 {
            assert_eq!(quantize_rgb(palette_rgb(idx), 16), idx);
        }
    }

    #[test]
    fn tie_prefers_lower_index() {
        // Bright white (15) and the cube's white (231) are the same RGB
        // value, so the search over all 256 candidates must keep index 15.
        assert_eq!(quantize_rgb(Rgb::new(255, 255, 255), 256), 15);
        // Same for black: index 0 vs cube index 16.
        assert_eq!(quantize_rgb(Rgb::new(0, 0, 0), 256), 0);
    }

    #[test]
    fn near_gray_maps_into_gray_ramp() {
        let idx = quantize_rgb(Rgb::new(120, 120, 120), 256);
        assert!(
            (232..=255).contains(&idx) || idx == 8,
            "gray mapped to {idx}"
        );
    }

    // ── Cheap path / re-quantization ───────────────────────────────

    #[test]
    fn index_below_candidate_count_is_unchanged() {
        for idx in 0..=255u8 {
            assert_eq!(quantize_index(idx, 256), idx);
        }
        for idx in 0..16u8 {
            assert_eq!(quantize_index(idx, 16), idx);
        }
    }

    #[test]
    fn cube_red_requantizes_to_bright_red() {
        // 196 = (255,0,0) in the cube; at a 16-color target it resolves
        // through the palette to the bright-red base entry.
        assert_eq!(quantize_index(196, 16), 9);
    }

    #[test]
    fn max_candidates_is_clamped() {
        // Degenerate candidate counts never panic and never index out of
        // bounds.
        assert_eq!(quantize_rgb(Rgb::new(10, 10, 10), 0), 0);
        assert_eq!(quantize_index(200, 10_000), 200);
    }
}
