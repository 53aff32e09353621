//! Exact orientation and in-circle tests. Everything here is evaluated with
//! the adaptive-precision predicates from `robust`, so the sign of each result
//! is reliable even for nearly degenerate input.
use crate::point::*;

#[derive(Copy, Clone, Debug, Ord, PartialOrd, Eq, PartialEq)]
pub enum Direction {
    Left,
    Straight,
    Right,
}

/// Does pc lie to the left or the right (or is collinear) of the line formed by
/// pa and pb.
pub fn left_or_right(pa: Point, pb: Point, pc: Point) -> Direction {
    let r = robust::orient2d(pa.into(), pb.into(), pc.into());
    if !r.is_finite() {
        log::warn!("non-finite orientation determinant for {} {} {}", pa, pb, pc);
        Direction::Straight
    } else if r > 0.0 {
        Direction::Left
    } else if r == 0.0 {
        Direction::Straight
    } else {
        Direction::Right
    }
}

/// Positive when `d` lies strictly inside the circle through the
/// counter-clockwise triangle `a`, `b`, `c`.
pub fn in_circle(a: Point, b: Point, c: Point, d: Point) -> f64 {
    robust::incircle(a.into(), b.into(), c.into(), d.into())
}

/// The edge flip test. `from` and `to` are the endpoints of the edge under
/// test, `prev_to` is the destination of its origin-previous edge, i.e. the
/// apex of the triangle on its right. A flip is needed only when that apex is
/// strictly right of the edge (the right face is a proper triangle) and `p` is
/// strictly inside the circle through `from`, `prev_to`, `to`.
pub fn flip_required(from: Point, to: Point, prev_to: Point, p: Point) -> bool {
    left_or_right(from, to, prev_to) == Direction::Right && in_circle(from, prev_to, to, p) > 0.0
}

/// Perpendicular distance from `p` to the infinite line through `a` and `b`.
pub fn distance_to_line(a: Point, b: Point, p: Point) -> f64 {
    let length = a.distance(b);
    if length == 0.0 {
        return a.distance(p);
    }
    ((b.x - a.x) * (a.y - p.y) - (a.x - p.x) * (b.y - a.y)).abs() / length
}
