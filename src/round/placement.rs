//! Target geometry: surface provider, random placement and the shrink curve.

use rand::Rng;
use serde::Deserialize;

/// Source of the playable area's current size in CSS pixels.
pub trait Surface {
    fn size(&self) -> (f64, f64);
}

/// A surface with a fixed size (tests, headless hosts).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixedSurface {
    pub width: f64,
    pub height: f64,
}

impl FixedSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Surface for FixedSurface {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Top-left corner of the target, relative to the surface.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Where new targets may appear.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpawnPattern {
    /// Anywhere inside the margin-inset surface.
    #[default]
    Uniform,
    /// Pinned `margin` px from a randomly chosen edge, free along that edge.
    /// The margin applies only on the pinned axis; along the edge the target
    /// may sit flush with the surface border.
    Edge,
}

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Uniform sample in `[lo, hi]`; an empty or inverted range collapses to the origin.
fn sample_axis<R: Rng + ?Sized>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if !(hi >= lo) || lo < 0.0 {
        return 0.0;
    }
    if hi == lo {
        return lo;
    }
    rng.gen_range(lo..=hi)
}

/// Pick a position for a `size`x`size` target on a `width`x`height` surface.
///
/// Each call is independent. When the surface is too small to fit the target
/// plus margins along an axis, that coordinate is clamped to 0.
pub fn place_target<R: Rng + ?Sized>(
    rng: &mut R,
    (width, height): (f64, f64),
    size: f64,
    margin: f64,
    pattern: SpawnPattern,
) -> Point {
    match pattern {
        SpawnPattern::Uniform => Point {
            x: sample_axis(rng, margin, width - size - margin),
            y: sample_axis(rng, margin, height - size - margin),
        },
        SpawnPattern::Edge => {
            let pinned = |extent: f64, near: bool| {
                let far = extent - size - margin;
                if far < margin {
                    0.0
                } else if near {
                    margin
                } else {
                    far
                }
            };
            match rng.gen_range(0..4u8) {
                // top
                0 => Point { x: sample_axis(rng, 0.0, width - size), y: pinned(height, true) },
                // right
                1 => Point { x: pinned(width, false), y: sample_axis(rng, 0.0, height - size) },
                // bottom
                2 => Point { x: sample_axis(rng, 0.0, width - size), y: pinned(height, false) },
                // left
                _ => Point { x: pinned(width, true), y: sample_axis(rng, 0.0, height - size) },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn inside(p: Point, size: f64, (w, h): (f64, f64)) -> bool {
        p.x >= 0.0 && p.y >= 0.0 && p.x + size <= w && p.y + size <= h
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(80.0, 42.0, 0.0), 80.0);
        assert_eq!(lerp(80.0, 42.0, 1.0), 42.0);
        assert_eq!(lerp(80.0, 42.0, 0.5), 61.0);
    }

    #[test]
    fn uniform_respects_margin() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let p = place_target(&mut rng, (400.0, 300.0), 80.0, 20.0, SpawnPattern::Uniform);
            assert!(p.x >= 20.0 && p.x <= 300.0, "x out of range: {}", p.x);
            assert!(p.y >= 20.0 && p.y <= 200.0, "y out of range: {}", p.y);
        }
    }

    #[test]
    fn edge_pattern_stays_on_surface() {
        let mut rng = StdRng::seed_from_u64(11);
        let surface = (640.0, 480.0);
        for _ in 0..500 {
            let p = place_target(&mut rng, surface, 60.0, 20.0, SpawnPattern::Edge);
            assert!(inside(p, 60.0, surface), "{p:?}");
            let on_edge = p.x == 20.0 || p.y == 20.0 || p.x == 560.0 || p.y == 400.0;
            assert!(on_edge, "{p:?} not pinned to an edge");
        }
    }

    #[test]
    fn edge_pattern_ignores_margin_along_the_edge() {
        let mut rng = StdRng::seed_from_u64(13);
        let flush = (0..2000)
            .map(|_| place_target(&mut rng, (640.0, 480.0), 60.0, 20.0, SpawnPattern::Edge))
            .any(|p| (p.y == 20.0 || p.y == 400.0) && p.x < 20.0);
        assert!(flush, "free coordinate never entered the margin band");
    }

    #[test]
    fn tiny_surface_clamps_to_origin() {
        let mut rng = StdRng::seed_from_u64(3);
        let p = place_target(&mut rng, (50.0, 500.0), 80.0, 20.0, SpawnPattern::Uniform);
        assert_eq!(p.x, 0.0);
        assert!(p.y >= 20.0);
        let p = place_target(&mut rng, (0.0, -10.0), 80.0, 20.0, SpawnPattern::Uniform);
        assert_eq!(p, Point { x: 0.0, y: 0.0 });
    }

    #[test]
    fn exact_fit_lands_on_margin() {
        let mut rng = StdRng::seed_from_u64(5);
        let p = place_target(&mut rng, (120.0, 120.0), 80.0, 20.0, SpawnPattern::Uniform);
        assert_eq!(p, Point { x: 20.0, y: 20.0 });
    }
}
