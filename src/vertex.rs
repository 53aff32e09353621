#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use crate::point::*;
use std::cmp::Ordering;

/// An offset into the vertices of a subdivision.
pub type VertexIndex = usize;

/// A site in the triangulation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Vertex<D> {
    pub point: Point3,
    /// Whether this vertex lies on (is an endpoint of, or splits) a constraint
    /// segment.
    pub on_constraint: bool,
    /// Caller-defined payload.
    pub data: Option<D>,
}

impl<D> Vertex<D> {
    pub fn new(point: Point3) -> Self {
        Self {
            point,
            on_constraint: false,
            data: None,
        }
    }

    pub fn with_data(point: Point3, data: D) -> Self {
        Self {
            point,
            on_constraint: false,
            data: Some(data),
        }
    }

    /// A vertex which is an endpoint of a constraint segment.
    pub fn constraint(point: Point3, data: Option<D>) -> Self {
        Self {
            point,
            on_constraint: true,
            data,
        }
    }

    pub fn xy(&self) -> Point {
        self.point.xy()
    }

    /// Absorb a vertex found to coincide with this one. The constraint flag
    /// is sticky, and the payload is replaced only if `other` carries one.
    pub fn merge(&mut self, other: Vertex<D>) {
        if other.on_constraint {
            self.on_constraint = true;
        }
        if other.data.is_some() {
            self.data = other.data;
        }
    }

    /// Order by x, then y.
    pub fn cmp_xy(&self, other: &Self) -> Ordering {
        self.point.xy().lex_cmp(&other.point.xy())
    }
}

impl<D> From<Point3> for Vertex<D> {
    fn from(point: Point3) -> Self {
        Vertex::new(point)
    }
}
