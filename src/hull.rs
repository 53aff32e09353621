//! Convex hull by Andrew's monotone chain.
use crate::point::*;
use crate::predicates::{left_or_right, Direction};

/// The convex hull of `points` in counter-clockwise order, starting from the
/// lexicographically smallest point and not repeating it at the end.
/// Collinear points on the hull are dropped. Fewer than three distinct points
/// are returned as they are (deduplicated and sorted).
pub fn convex_hull<I: IntoIterator<Item = Point>>(points: I) -> Vec<Point> {
    let mut points: Vec<Point> = points.into_iter().filter(Point::is_finite).collect();
    points.sort_by(|a, b| a.lex_cmp(b));
    points.dedup();
    if points.len() < 3 {
        return points;
    }

    let mut hull: Vec<Point> = Vec::with_capacity(points.len() + 1);
    // Lower chain, then upper.
    for pass in 0..2 {
        let start = hull.len();
        let ordered: Box<dyn Iterator<Item = &Point>> = if pass == 0 {
            Box::new(points.iter())
        } else {
            Box::new(points.iter().rev())
        };
        for &p in ordered {
            while hull.len() >= start + 2
                && left_or_right(hull[hull.len() - 2], hull[hull.len() - 1], p) != Direction::Left
            {
                hull.pop();
            }
            hull.push(p);
        }
        // The last point of each chain starts the next one.
        hull.pop();
    }
    hull
}
