#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use crate::point::*;

/// A straight segment between two sites. Lengths and projections are planar,
/// `z` is interpolated linearly along the segment.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct LineSegment {
    pub p0: Point3,
    pub p1: Point3,
}

impl LineSegment {
    pub fn new(p0: Point3, p1: Point3) -> Self {
        Self { p0, p1 }
    }

    pub fn length(&self) -> f64 {
        self.p0.distance_2d(self.p1)
    }

    pub fn is_degenerate(&self) -> bool {
        self.p0.equals_2d(&self.p1)
    }

    pub fn midpoint(&self) -> Point3 {
        self.p0.midpoint(self.p1)
    }

    /// The point at `fraction` of the way from `p0` to `p1`.
    pub fn point_along(&self, fraction: f64) -> Point3 {
        Point3::new(
            self.p0.x + fraction * (self.p1.x - self.p0.x),
            self.p0.y + fraction * (self.p1.y - self.p0.y),
            self.p0.z + fraction * (self.p1.z - self.p0.z),
        )
    }

    /// The point at `fraction` of the way from `p1` back to `p0`.
    pub fn point_along_reverse(&self, fraction: f64) -> Point3 {
        Point3::new(
            self.p1.x - fraction * (self.p1.x - self.p0.x),
            self.p1.y - fraction * (self.p1.y - self.p0.y),
            self.p1.z - fraction * (self.p1.z - self.p0.z),
        )
    }

    /// Position of the orthogonal projection of `p` on the line, as a
    /// fraction of the segment (0 at `p0`, 1 at `p1`, unclamped).
    pub fn projection_factor(&self, p: Point) -> f64 {
        let d = self.p1.xy() - self.p0.xy();
        let len2 = d.dot(d);
        if len2 == 0.0 {
            return 0.0;
        }
        (p - self.p0.xy()).dot(d) / len2
    }

    /// Orthogonal projection of `p` on the infinite line through the segment.
    pub fn project(&self, p: Point) -> Point3 {
        self.point_along(self.projection_factor(p))
    }

    /// The circle with this segment as diameter, as centre and radius.
    pub fn diametral_circle(&self) -> (Point, f64) {
        let centre = self.p0.xy().midpoint(self.p1.xy());
        (centre, self.length() / 2.0)
    }
}

/// A segment which must appear as a chain of triangulation edges, along with
/// whatever the caller wants to know about it.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ConstraintSegment<S> {
    pub line: LineSegment,
    pub data: S,
}

impl<S> ConstraintSegment<S> {
    pub fn new(p0: Point3, p1: Point3, data: S) -> Self {
        Self {
            line: LineSegment::new(p0, p1),
            data,
        }
    }

    pub fn start(&self) -> Point3 {
        self.line.p0
    }

    pub fn end(&self) -> Point3 {
        self.line.p1
    }
}

impl<S: Clone> ConstraintSegment<S> {
    /// The two halves either side of `split`, each carrying this segment's
    /// payload.
    pub fn split(&self, split: Point3) -> (Self, Self) {
        (
            Self::new(self.line.p0, split, self.data.clone()),
            Self::new(split, self.line.p1, self.data.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn projection() {
        let seg = LineSegment::new(Point3::new(0.0, 0.0, 0.0), Point3::new(10.0, 0.0, 100.0));
        let p = seg.project(Point::new(2.5, 7.0));
        assert_abs_diff_eq!(p.x, 2.5);
        assert_abs_diff_eq!(p.y, 0.0);
        assert_abs_diff_eq!(p.z, 25.0);
        // Projections beyond the ends are not clamped.
        assert_abs_diff_eq!(seg.projection_factor(Point::new(-5.0, 1.0)), -0.5);
    }

    #[test]
    fn along_and_reverse() {
        let seg = LineSegment::new(Point3::new_2d(0.0, 0.0), Point3::new_2d(0.0, 8.0));
        assert_abs_diff_eq!(seg.point_along(0.25).y, 2.0);
        assert_abs_diff_eq!(seg.point_along_reverse(0.25).y, 6.0);
        assert_abs_diff_eq!(seg.length(), 8.0);
        let (centre, radius) = seg.diametral_circle();
        assert_eq!(centre, Point::new(0.0, 4.0));
        assert_abs_diff_eq!(radius, 4.0);
    }

    #[test]
    fn halves_inherit_payload() {
        let seg = ConstraintSegment::new(
            Point3::new(0.0, 0.0, 1.0),
            Point3::new(4.0, 0.0, 1.0),
            "fence",
        );
        let (a, b) = seg.split(Point3::new(1.0, 0.0, 1.0));
        assert_eq!(a.start(), seg.start());
        assert_eq!(a.end(), b.start());
        assert_eq!(b.end(), seg.end());
        assert_eq!(a.data, "fence");
        assert_eq!(b.data, "fence");
    }
}
