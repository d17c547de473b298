//! Hilbert curve keys for the space-filling-curve bulk-load strategy.
//!
//! The Hilbert curve maps 2D coordinates to a 1D index while preserving
//! spatial locality: entries close in space stay relatively close along the
//! curve, which keeps leaf bounding boxes tight when a sorted batch is
//! packed into tree nodes.

use crate::interval::Interval;

/// Maximum order for Hilbert curve encoding (determines precision).
const MAX_HILBERT_ORDER: u32 = 32;

/// Curve order used for bulk-load keys; 16 bits per dimension is plenty for
/// ordering a single batch.
pub(crate) const BULK_LOAD_ORDER: u32 = 16;

/// Encodes 2D coordinates in the unit square to a Hilbert curve index.
///
/// # Arguments
/// * `x` - X coordinate (normalized to [0, 1])
/// * `y` - Y coordinate (normalized to [0, 1])
/// * `order` - curve order (1-32, higher = more precision)
pub fn hilbert_index(x: f64, y: f64, order: u32) -> u64 {
    debug_assert!((0.0..=1.0).contains(&x), "x must be in [0,1]");
    debug_assert!((0.0..=1.0).contains(&y), "y must be in [0,1]");
    debug_assert!(order > 0 && order <= MAX_HILBERT_ORDER, "order must be 1-32");

    // Convert normalized coordinates to discrete grid coordinates
    let n = 1u64 << order;
    let xi = ((x * (n as f64 - 0.5)) as u64).min(n - 1);
    let yi = ((y * (n as f64 - 0.5)) as u64).min(n - 1);

    xy2d(n, xi, yi)
}

/// Encodes absolute 2D coordinates to a Hilbert index, normalizing each
/// axis against its data bounds first.
///
/// A zero-width axis maps every coordinate to the axis midpoint, so
/// degenerate batches (all entries sharing a coordinate) still sort
/// deterministically.
pub fn hilbert_index_bounded(
    x: f64,
    y: f64,
    x_bounds: &Interval,
    y_bounds: &Interval,
    order: u32,
) -> u64 {
    hilbert_index(normalize(x, x_bounds), normalize(y, y_bounds), order)
}

fn normalize(value: f64, bounds: &Interval) -> f64 {
    let range = bounds.high() - bounds.low();
    if range > 0.0 {
        ((value - bounds.low()) / range).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Converts (x, y) grid coordinates to a distance along the Hilbert curve.
///
/// Standard xy2d conversion using rotation and reflection.
fn xy2d(n: u64, x: u64, y: u64) -> u64 {
    let mut d = 0u64;
    let mut x = x;
    let mut y = y;
    let mut s = n / 2;

    while s > 0 {
        let rx = ((x & s) > 0) as u64;
        let ry = ((y & s) > 0) as u64;
        d += s * s * ((3 * rx) ^ ry);
        rotate(s, &mut x, &mut y, rx, ry);
        s /= 2;
    }

    d
}

/// Rotates and reflects the coordinate system for the next curve level.
fn rotate(n: u64, x: &mut u64, y: &mut u64, rx: u64, ry: u64) {
    if ry == 0 {
        if rx == 1 {
            *x = n.wrapping_sub(1).wrapping_sub(*x);
            *y = n.wrapping_sub(1).wrapping_sub(*y);
        }
        std::mem::swap(x, y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corners_are_distinct() {
        let mut corners = vec![
            hilbert_index(0.0, 0.0, 8),
            hilbert_index(0.0, 1.0, 8),
            hilbert_index(1.0, 0.0, 8),
            hilbert_index(1.0, 1.0, 8),
        ];
        corners.sort_unstable();
        corners.dedup();
        assert_eq!(corners.len(), 4, "corner indices should be unique");
    }

    #[test]
    fn test_origin_is_zero() {
        assert_eq!(hilbert_index(0.0, 0.0, 8), 0);
    }

    #[test]
    fn test_spatial_locality() {
        let center = hilbert_index(0.5, 0.5, 8);
        let nearby = hilbert_index(0.50001, 0.50001, 8);
        assert!(center.abs_diff(nearby) < 1000, "nearby points should map near each other");
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(hilbert_index(0.3, 0.7, 16), hilbert_index(0.3, 0.7, 16));
    }

    #[test]
    fn test_bounded_normalization() {
        let x_bounds = Interval::new(-100.0, 100.0).unwrap();
        let y_bounds = Interval::new(0.0, 50.0).unwrap();
        let idx = hilbert_index_bounded(0.0, 25.0, &x_bounds, &y_bounds, 8);
        assert_eq!(idx, hilbert_index(0.5, 0.5, 8), "midpoints should map to the unit center");
    }

    #[test]
    fn test_bounded_zero_range_axis() {
        let point = Interval::point(42.0);
        let y_bounds = Interval::new(0.0, 10.0).unwrap();
        let idx = hilbert_index_bounded(42.0, 5.0, &point, &y_bounds, 8);
        assert_eq!(idx, hilbert_index(0.5, 0.5, 8), "zero-range axis should map to the midpoint");
    }

    #[test]
    fn test_bounded_clamps_outliers() {
        let bounds = Interval::new(0.0, 100.0).unwrap();
        let outside = hilbert_index_bounded(150.0, 150.0, &bounds, &bounds, 8);
        let max = hilbert_index_bounded(100.0, 100.0, &bounds, &bounds, 8);
        assert_eq!(outside, max, "coordinates beyond bounds should clamp");
    }

    #[test]
    fn test_grid_coverage() {
        // all cells of a small grid should map to mostly distinct indices
        let order = 3; // 8x8
        let n = 1u64 << order;
        let mut indices = Vec::new();
        for xi in 0..n {
            for yi in 0..n {
                let x = (xi as f64 + 0.5) / n as f64;
                let y = (yi as f64 + 0.5) / n as f64;
                indices.push(hilbert_index(x, y, order));
            }
        }
        indices.sort_unstable();
        indices.dedup();
        assert!(indices.len() >= (n * n / 2) as usize);
    }
}
