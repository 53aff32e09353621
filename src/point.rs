#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Sub;

/// A point in the plane. All topology and predicates work on these.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn midpoint(self, other: Self) -> Self {
        Point::new(0.5 * (self.x + other.x), 0.5 * (self.y + other.y))
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn dot(&self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Lexicographic order on (x, y). NaN coordinates compare as equal.
    pub fn lex_cmp(&self, other: &Self) -> Ordering {
        let by_x = self.x.partial_cmp(&other.x).unwrap_or(Ordering::Equal);
        by_x.then_with(|| self.y.partial_cmp(&other.y).unwrap_or(Ordering::Equal))
    }
}

/// A site coordinate. `z` is carried along but ignored by every predicate, it
/// may be NaN when only a 2D triangulation is wanted.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// A point with no elevation.
    pub fn new_2d(x: f64, y: f64) -> Self {
        Self::new(x, y, f64::NAN)
    }

    pub fn xy(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn midpoint(self, other: Self) -> Self {
        let m = self.xy().midpoint(other.xy());
        Self::new(m.x, m.y, 0.5 * (self.z + other.z))
    }

    pub fn has_z(&self) -> bool {
        self.z.is_finite()
    }

    pub fn is_finite(&self) -> bool {
        self.xy().is_finite() && self.has_z()
    }

    pub fn distance(&self, other: Self) -> f64 {
        self.distance_2d(other).hypot(self.z - other.z)
    }

    /// Distance in the plane, ignoring `z`.
    pub fn distance_2d(&self, other: Self) -> f64 {
        self.xy().distance(other.xy())
    }

    /// Equality in the plane, ignoring `z`.
    pub fn equals_2d(&self, other: &Self) -> bool {
        self.xy() == other.xy()
    }
}

impl From<Point> for Point3 {
    fn from(p: Point) -> Self {
        Point3::new_2d(p.x, p.y)
    }
}

impl From<(f64, f64)> for Point3 {
    fn from((x, y): (f64, f64)) -> Self {
        Point3::new_2d(x, y)
    }
}

impl From<(f64, f64, f64)> for Point3 {
    fn from((x, y, z): (f64, f64, f64)) -> Self {
        Point3::new(x, y, z)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl fmt::Display for Point3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.has_z() {
            write!(f, "({}, {}, {})", self.x, self.y, self.z)
        } else {
            write!(f, "({}, {})", self.x, self.y)
        }
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Point) -> Self {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<Point> for robust::Coord<f64> {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Point3> for robust::Coord<f64> {
    fn from(p: Point3) -> Self {
        p.xy().into()
    }
}

/// An axis-aligned envelope in the plane. An empty box has `min > max`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub min: Point,
    pub max: Point,
}

impl BoundingBox {
    pub fn empty() -> Self {
        Self {
            min: Point::new(f64::INFINITY, f64::INFINITY),
            max: Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// The square envelope of a circle.
    pub fn around(centre: Point, radius: f64) -> Self {
        Self {
            min: Point::new(centre.x - radius, centre.y - radius),
            max: Point::new(centre.x + radius, centre.y + radius),
        }
    }

    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Self {
        let mut bbox = Self::empty();
        for p in points {
            bbox.expand_to_include(p);
        }
        bbox
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn expand_to_include(&mut self, p: Point) {
        if !p.is_finite() {
            return;
        }
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Grow by `distance` on every side.
    pub fn expand_by(&mut self, distance: f64) {
        self.min.x -= distance;
        self.min.y -= distance;
        self.max.x += distance;
        self.max.y += distance;
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

/// Test coordinates on a coarse grid within +/-4000, so that duplicates and
/// collinear runs turn up often.
#[cfg(test)]
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct GridFloat(pub f64);

#[cfg(test)]
impl GridFloat {
    pub const LIMIT: f64 = 4000.0;
}

#[cfg(test)]
impl quickcheck::Arbitrary for GridFloat {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let whole = i16::arbitrary(g) % 4000;
        let eighths = f64::from(u8::arbitrary(g) % 8) / 8.0;
        GridFloat(f64::from(whole) + eighths.copysign(f64::from(whole)))
    }
}

#[cfg(test)]
impl quickcheck::Arbitrary for Point {
    fn arbitrary(g: &mut quickcheck::Gen) -> Point {
        Point::new(GridFloat::arbitrary(g).0, GridFloat::arbitrary(g).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn lexicographic_order() {
        let a = Point::new(0.0, 5.0);
        let b = Point::new(1.0, 0.0);
        let c = Point::new(1.0, 2.0);
        assert_eq!(a.lex_cmp(&b), Ordering::Less);
        assert_eq!(c.lex_cmp(&b), Ordering::Greater);
        assert_eq!(c.lex_cmp(&c), Ordering::Equal);
    }

    #[test]
    fn bbox_expansion() {
        let mut bbox = BoundingBox::from_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(f64::NAN, 100.0),
        ]);
        assert_eq!(bbox.width(), 10.0);
        assert_eq!(bbox.height(), 4.0);
        bbox.expand_by(1.0);
        assert!(bbox.contains(Point::new(-1.0, 5.0)));
        assert!(!bbox.contains(Point::new(-1.1, 5.0)));
        assert!(BoundingBox::empty().is_empty());
    }

    #[test]
    fn planar_equality_ignores_elevation() {
        let a = Point3::new(1.0, 2.0, 3.0);
        let b = Point3::new_2d(1.0, 2.0);
        assert!(a.equals_2d(&b));
        assert_ne!(a, b);
        assert_eq!(a.distance_2d(b), 0.0);
    }

    #[quickcheck]
    fn grid_floats_in_range(f: GridFloat) -> bool {
        f.0.abs() <= GridFloat::LIMIT
    }

    #[test]
    fn display_skips_missing_elevation() {
        assert_eq!(Point3::new_2d(1.0, 2.5).to_string(), "(1, 2.5)");
        assert_eq!(Point3::new(1.0, 2.0, 3.0).to_string(), "(1, 2, 3)");
        assert_eq!(Point::new(0.5, -1.0).to_string(), "(0.5, -1)");
    }
}
