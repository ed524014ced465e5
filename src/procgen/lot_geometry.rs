//! Planar geometry helpers shared by stitching and building placement.

use bevy::prelude::*;

/// Geometric tolerance in world units, matching the node registry precision.
const EPS: f32 = 1e-3;

/// Compute axis-aligned bounding box of a polygon.
pub fn polygon_bounds(vertices: &[Vec2]) -> Rect {
    let mut min = Vec2::splat(f32::MAX);
    let mut max = Vec2::splat(f32::MIN);

    for &v in vertices {
        min = min.min(v);
        max = max.max(v);
    }

    Rect::from_corners(min, max)
}

/// Unsigned area by the shoelace formula.
pub fn polygon_area(vertices: &[Vec2]) -> f32 {
    let n = vertices.len();
    if n < 3 {
        return 0.0;
    }

    let mut area = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        area += vertices[i].x * vertices[j].y;
        area -= vertices[j].x * vertices[i].y;
    }

    area.abs() / 2.0
}

/// Even-odd ray casting test.
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (vertices[i], vertices[j]);
        if (a.y > point.y) != (b.y > point.y) {
            let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if point.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Signed distance of `p` from the line through `a` and `b`.
fn side(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    let dir = b - a;
    let len = dir.length();
    if len < EPS {
        return 0.0;
    }
    dir.perp_dot(p - a) / len
}

fn strictly_opposite(d1: f32, d2: f32) -> bool {
    (d1 > EPS && d2 < -EPS) || (d1 < -EPS && d2 > EPS)
}

/// True when two segments cross at a point interior to both.
///
/// Segments that merely touch at an endpoint, or run collinear, do not count.
pub fn segments_cross(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    strictly_opposite(side(q1, q2, p1), side(q1, q2, p2))
        && strictly_opposite(side(p1, p2, q1), side(p1, p2, q2))
}

/// True when `p` lies on segment `a`-`b` away from both endpoints.
pub fn point_inside_segment(p: Vec2, a: Vec2, b: Vec2) -> bool {
    let len = a.distance(b);
    if len < EPS || side(a, b, p).abs() > EPS {
        return false;
    }
    let t = (b - a).dot(p - a) / len;
    t > EPS && t < len - EPS
}

/// True when two collinear segments share more than a single point.
pub fn segments_overlap(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let len = p1.distance(p2);
    if len < EPS || side(p1, p2, q1).abs() > EPS || side(p1, p2, q2).abs() > EPS {
        return false;
    }
    let unit = (p2 - p1) / len;
    let t1 = unit.dot(q1 - p1);
    let t2 = unit.dot(q2 - p1);
    t1.max(t2).min(len) - t1.min(t2).max(0.0) > EPS
}

/// True when two segments share any point, endpoints and overlaps included.
pub fn segments_touch(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let near_segment = |a: Vec2, b: Vec2, p: Vec2| {
        p.distance(a) <= EPS || p.distance(b) <= EPS || point_inside_segment(p, a, b)
    };

    segments_cross(p1, p2, q1, q2)
        || near_segment(q1, q2, p1)
        || near_segment(q1, q2, p2)
        || near_segment(p1, p2, q1)
        || near_segment(p1, p2, q2)
}

/// True when a segment enters, crosses or lies inside a rectangle.
pub fn segment_intersects_rect(a: Vec2, b: Vec2, rect: Rect) -> bool {
    if rect.contains(a) || rect.contains(b) {
        return true;
    }

    let corners = [
        rect.min,
        Vec2::new(rect.max.x, rect.min.y),
        rect.max,
        Vec2::new(rect.min.x, rect.max.y),
    ];

    (0..4).any(|i| segments_touch(a, b, corners[i], corners[(i + 1) % 4]))
}

/// Two rectangles share interior area.
pub fn rects_overlap(a: Rect, b: Rect) -> bool {
    let overlap = a.intersect(b);
    overlap.width() > EPS && overlap.height() > EPS
}
