//! Conforming Delaunay triangulation on a quad-edge mesh.
//!
//! Sites are inserted one at a time into a [`Subdivision`], which keeps the
//! mesh Delaunay by flipping edges. A [`ConformingTriangulator`] then adds
//! Steiner points on constraint segments until each of them is Gabriel, which
//! makes every segment a chain of mesh edges.
//!
//! ```
//! use conforming_delaunay::*;
//!
//! let triangulator = ConformingBuilder::<()>::new(TriangulationConfig::default())
//!     .with_sites(vec![Vertex::new(Point3::new_2d(0.1, 5.0))])
//!     .with_polyline(vec![Point3::new_2d(0.0, 0.0), Point3::new_2d(0.0, 10.0)])
//!     .build()
//!     .unwrap();
//! assert!(triangulator.constraint_segments().len() >= 2);
//! let subdivision = triangulator.subdivision().unwrap();
//! subdivision.for_each_triangle(|t| assert_eq!(t.coordinates().len(), 9));
//! ```
pub mod builder;
pub mod config;
pub mod conforming;
pub mod error;
pub mod hull;
pub mod kdtree;
pub mod point;
pub mod predicates;
pub mod qeds;
pub mod segment;
pub mod split;
pub mod subdivision;
pub mod vertex;

pub use builder::{ConformingBuilder, DelaunayBuilder};
pub use config::{InsertionOrder, TriangulationConfig, DEFAULT_MAX_ENFORCEMENT_PASSES};
pub use conforming::{ConformingTriangulator, DefaultVertexFactory, VertexFactory};
pub use error::{ConformingError, LocateError};
pub use point::{BoundingBox, Point, Point3};
pub use qeds::EdgeTarget;
pub use segment::{ConstraintSegment, LineSegment};
pub use split::{MidpointSplitFinder, NonEncroachingSplitFinder, SplitPointFinder};
pub use subdivision::{Insertion, Location, Subdivision, Triangle};
pub use vertex::{Vertex, VertexIndex};
