//! # Geometry Utilities
//!
//! Axis-aligned rectangles for culling, and the line clipping routines that
//! make an edge stop at the boundary of the nodes it connects.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::model::Shape;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self {
            min: pos,
            max: pos + size,
        }
    }

    /// Smallest rect containing both points, in any order.
    pub fn from_points(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Square of half-extent `radius` around `center`.
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self {
            min: center - Vec2::splat(radius),
            max: center + Vec2::splat(radius),
        }
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn expand(&self, amount: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(amount),
            max: self.max + Vec2::splat(amount),
        }
    }
}

/// Intersection point of segments `p1→p2` and `p3→p4`.
///
/// Returns `None` when either segment has zero length, when they are parallel,
/// or when the crossing lies outside either segment.
pub fn intersect_segments(p1: Vec2, p2: Vec2, p3: Vec2, p4: Vec2) -> Option<Vec2> {
    if p1 == p2 || p3 == p4 {
        return None;
    }

    let denominator = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
    if denominator == 0.0 {
        return None;
    }

    let ua = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denominator;
    let ub = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denominator;

    if !(0.0..=1.0).contains(&ua) || !(0.0..=1.0).contains(&ub) {
        return None;
    }

    Some(p1 + (p2 - p1) * ua)
}

/// Point where the segment `source→target` enters a circle of `radius`
/// centered on `target`.
///
/// Returns `None` when `source` already lies inside the circle.
pub fn clip_to_circle(source: Vec2, target: Vec2, radius: f32) -> Option<Vec2> {
    let d = target - source;
    if d.length_squared() <= radius * radius {
        return None;
    }

    let angle = d.y.atan2(d.x);
    Some(Vec2::new(
        target.x - angle.cos() * radius,
        target.y - angle.sin() * radius,
    ))
}

/// Point where the segment `source→target` crosses the border of a
/// `width`×`height` rectangle centered on `target`.
///
/// Edges are tried top, right, bottom, left; the first hit wins.
pub fn clip_to_rect_center(source: Vec2, target: Vec2, width: f32, height: f32) -> Option<Vec2> {
    let half = Vec2::new(width, height) * 0.5;
    let top_left = target - half;
    let top_right = Vec2::new(target.x + half.x, target.y - half.y);
    let bottom_right = target + half;
    let bottom_left = Vec2::new(target.x - half.x, target.y + half.y);

    [
        (top_left, top_right),
        (top_right, bottom_right),
        (bottom_right, bottom_left),
        (bottom_left, top_left),
    ]
    .into_iter()
    .find_map(|(a, b)| intersect_segments(source, target, a, b))
}

/// Clips the segment `source→target` against `shape` centered on `target`.
///
/// Falls back to `target` itself when the segment never leaves the shape.
pub fn clip_to_shape(source: Vec2, target: Vec2, shape: &Shape) -> Vec2 {
    let hit = match *shape {
        Shape::Circle { radius } => clip_to_circle(source, target, radius),
        Shape::Rect { width, height } => clip_to_rect_center(source, target, width, height),
    };
    hit.unwrap_or(target)
}

/// The three corners of an arrow head whose tip sits at `tip` and which points
/// along `direction` (need not be normalized).
///
/// Order: tip, left base corner, right base corner.
pub fn arrow_head(tip: Vec2, direction: Vec2, length: f32, width: f32) -> [Vec2; 3] {
    let dir = direction.normalize_or_zero();
    let base = tip - dir * length;
    let side = dir.perp() * (width * 0.5);
    [tip, base + side, base - side]
}

/// Shortest distance from `p` to the segment `a→b`.
pub fn distance_to_segment(p: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let len_sq = ab.length_squared();
    if len_sq < 1e-12 {
        return p.distance(a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance(a + ab * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crossing_segments_meet_in_the_middle() {
        let hit = intersect_segments(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 10.0),
            Vec2::new(0.0, 10.0),
            Vec2::new(10.0, 0.0),
        );
        assert_eq!(hit, Some(Vec2::new(5.0, 5.0)));
    }

    #[test]
    fn parallel_and_degenerate_segments_do_not_intersect() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(
            intersect_segments(a, b, Vec2::new(0.0, 1.0), Vec2::new(10.0, 1.0)),
            None
        );
        assert_eq!(intersect_segments(a, a, Vec2::new(0.0, -1.0), Vec2::new(0.0, 1.0)), None);
    }

    #[test]
    fn crossing_outside_either_segment_is_rejected() {
        // The infinite lines cross at (15, 0), past the end of the first segment.
        let hit = intersect_segments(
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, 0.0),
            Vec2::new(15.0, -5.0),
            Vec2::new(15.0, 5.0),
        );
        assert_eq!(hit, None);
    }

    #[test]
    fn circle_clip_stops_at_the_rim() {
        let p = clip_to_circle(Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0), 10.0).unwrap();
        assert!(p.abs_diff_eq(Vec2::new(90.0, 0.0), 1e-4));
    }

    #[test]
    fn circle_clip_is_none_inside_radius() {
        assert_eq!(clip_to_circle(Vec2::new(95.0, 0.0), Vec2::new(100.0, 0.0), 10.0), None);
        // Exactly on the rim counts as inside.
        assert_eq!(clip_to_circle(Vec2::new(90.0, 0.0), Vec2::new(100.0, 0.0), 10.0), None);
    }

    #[test]
    fn rect_clip_hits_facing_edge() {
        let p = clip_to_rect_center(Vec2::new(0.0, 50.0), Vec2::new(100.0, 50.0), 40.0, 20.0)
            .unwrap();
        assert!(p.abs_diff_eq(Vec2::new(80.0, 50.0), 1e-4));
    }

    #[test]
    fn shape_clip_falls_back_to_target() {
        let target = Vec2::new(10.0, 10.0);
        let p = clip_to_shape(Vec2::new(11.0, 10.0), target, &Shape::Circle { radius: 5.0 });
        assert_eq!(p, target);
    }

    #[test]
    fn arrow_head_is_symmetric_about_the_shaft() {
        let [tip, left, right] = arrow_head(Vec2::new(10.0, 0.0), Vec2::X, 4.0, 6.0);
        assert_eq!(tip, Vec2::new(10.0, 0.0));
        assert!(left.abs_diff_eq(Vec2::new(6.0, 3.0), 1e-5));
        assert!(right.abs_diff_eq(Vec2::new(6.0, -3.0), 1e-5));
    }

    #[test]
    fn segment_distance_clamps_to_endpoints() {
        let a = Vec2::ZERO;
        let b = Vec2::new(10.0, 0.0);
        assert_eq!(distance_to_segment(Vec2::new(5.0, 3.0), a, b), 3.0);
        assert_eq!(distance_to_segment(Vec2::new(13.0, 4.0), a, b), 5.0);
    }
}
