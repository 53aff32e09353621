//! Strategies for choosing where an encroached constraint segment is cut.
use crate::point::*;
use crate::segment::LineSegment;

/// Chooses the Steiner point at which to split `segment`, given the vertex
/// `encroaching` on it. Any `Fn(&LineSegment, Point3) -> Point3` closure is a
/// finder too.
pub trait SplitPointFinder {
    fn find_split_point(&self, segment: &LineSegment, encroaching: Point3) -> Point3;
}

impl<F> SplitPointFinder for F
where
    F: Fn(&LineSegment, Point3) -> Point3,
{
    fn find_split_point(&self, segment: &LineSegment, encroaching: Point3) -> Point3 {
        self(segment, encroaching)
    }
}

/// Always splits at the midpoint. Acute constraint angles can make this split
/// many times before converging.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct MidpointSplitFinder;

impl SplitPointFinder for MidpointSplitFinder {
    fn find_split_point(&self, segment: &LineSegment, _encroaching: Point3) -> Point3 {
        segment.midpoint()
    }
}

/// Splits at the projection of the encroaching vertex, kept far enough from
/// both endpoints that neither half is encroached by that vertex again.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NonEncroachingSplitFinder {
    /// Applied to twice the encroaching vertex's distance from the segment.
    pub shrink_factor: f64,
}

impl NonEncroachingSplitFinder {
    pub const DEFAULT_SHRINK_FACTOR: f64 = 0.8;
}

impl Default for NonEncroachingSplitFinder {
    fn default() -> Self {
        Self {
            shrink_factor: Self::DEFAULT_SHRINK_FACTOR,
        }
    }
}

impl SplitPointFinder for NonEncroachingSplitFinder {
    fn find_split_point(&self, segment: &LineSegment, encroaching: Point3) -> Point3 {
        let projected = segment.project(encroaching.xy());
        let non_encroaching_diameter =
            projected.distance_2d(encroaching) * 2.0 * self.shrink_factor;
        let max_split_length = non_encroaching_diameter.min(segment.length() / 2.0);
        SplitSegment::new(*segment)
            .with_minimum_length(max_split_length)
            .split_at(projected)
    }
}

/// A split point candidate constrained to keep a minimum distance from both
/// ends of its segment.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SplitSegment {
    segment: LineSegment,
    length: f64,
    minimum_length: f64,
}

impl SplitSegment {
    pub fn new(segment: LineSegment) -> Self {
        Self {
            segment,
            length: segment.length(),
            minimum_length: 0.0,
        }
    }

    pub fn with_minimum_length(mut self, minimum_length: f64) -> Self {
        self.minimum_length = minimum_length;
        self
    }

    pub fn minimum_length(&self) -> f64 {
        self.minimum_length
    }

    /// `candidate`, or the point exactly `minimum_length` in from whichever
    /// endpoint it is too close to.
    pub fn split_at(&self, candidate: Point3) -> Point3 {
        if self.length == 0.0 {
            return self.segment.p0;
        }
        let fraction = self.minimum_length / self.length;
        if candidate.distance_2d(self.segment.p0) < self.minimum_length {
            self.segment.point_along(fraction)
        } else if candidate.distance_2d(self.segment.p1) < self.minimum_length {
            self.segment.point_along_reverse(fraction)
        } else {
            candidate
        }
    }
}
