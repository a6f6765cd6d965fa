//! Edge curve geometry.
//!
//! Connections are drawn as quadratic Bézier curves bowed slightly to one
//! side, so that two edges between neighbouring nodes stay distinguishable.

use egui::Pos2;

/// Perpendicular bow as a fraction of edge length
const CURVE_OFFSET: f32 = 0.12;

/// Edges shorter than this are not drawn (overlapping nodes)
const MIN_CURVE_LENGTH: f32 = 1.0;

/// A quadratic Bézier between two node centers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCurve {
    pub start: Pos2,
    pub control: Pos2,
    pub end: Pos2,
}

impl EdgeCurve {
    /// Curve between two points, or `None` when they (nearly) overlap
    pub fn between(start: Pos2, end: Pos2) -> Option<Self> {
        let delta = end - start;
        let length = delta.length();
        if length < MIN_CURVE_LENGTH {
            return None;
        }

        let mid = start + delta * 0.5;
        let perp = egui::Vec2::new(-delta.y, delta.x) / length;
        let control = mid + perp * (length * CURVE_OFFSET);

        Some(Self { start, control, end })
    }

    /// Point at parameter `t` in [0, 1]
    pub fn point_at(&self, t: f32) -> Pos2 {
        let u = 1.0 - t;
        let x = u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x;
        let y = u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y;
        Pos2::new(x, y)
    }

    /// Polyline approximation with `segments` pieces (at least one)
    pub fn sample(&self, segments: usize) -> Vec<Pos2> {
        let segments = segments.max(1);
        (0..=segments)
            .map(|i| self.point_at(i as f32 / segments as f32))
            .collect()
    }

    /// Shortest distance from `point` to the sampled curve
    pub fn distance_to(&self, point: Pos2, segments: usize) -> f32 {
        self.sample(segments)
            .windows(2)
            .map(|w| segment_distance(point, w[0], w[1]))
            .fold(f32::INFINITY, f32::min)
    }

    /// Apply a transform to every control point (e.g. graph → screen space)
    pub fn map(&self, f: impl Fn(Pos2) -> Pos2) -> Self {
        Self {
            start: f(self.start),
            control: f(self.control),
            end: f(self.end),
        }
    }
}

fn segment_distance(p: Pos2, a: Pos2, b: Pos2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_sq();
    if len_sq <= f32::EPSILON {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

/// Stroke width for an edge of the given strength
pub fn stroke_width(strength: f32) -> f32 {
    1.5 + strength * 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn overlapping_points_have_no_curve() {
        let p = Pos2::new(10.0, 10.0);
        assert!(EdgeCurve::between(p, p + egui::vec2(0.5, 0.0)).is_none());
    }

    #[test]
    fn control_point_bows_perpendicular() {
        let curve = EdgeCurve::between(Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0)).unwrap();
        assert!(approx_eq!(f32, curve.control.x, 50.0, epsilon = 1e-4));
        assert!(approx_eq!(f32, curve.control.y, 12.0, epsilon = 1e-4));
    }

    #[test]
    fn sample_hits_endpoints() {
        let a = Pos2::new(10.0, 20.0);
        let b = Pos2::new(200.0, 80.0);
        let points = EdgeCurve::between(a, b).unwrap().sample(16);
        assert_eq!(points.len(), 17);
        assert_eq!(points[0], a);
        assert!(approx_eq!(f32, points[16].x, b.x, epsilon = 1e-3));
        assert!(approx_eq!(f32, points[16].y, b.y, epsilon = 1e-3));
    }

    #[test]
    fn distance_measures_from_the_bowed_curve() {
        let curve = EdgeCurve::between(Pos2::new(0.0, 0.0), Pos2::new(100.0, 0.0)).unwrap();
        // Apex of the curve sits at half the control offset
        assert!(curve.distance_to(Pos2::new(50.0, 6.0), 32) < 0.5);
        assert!(curve.distance_to(Pos2::new(50.0, -20.0), 32) > 20.0);
    }

    #[test]
    fn stroke_grows_with_strength() {
        assert_eq!(stroke_width(0.0), 1.5);
        assert_eq!(stroke_width(1.0), 3.5);
    }
}
