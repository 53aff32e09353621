//! Conforming Delaunay triangulation: a Delaunay triangulation of the sites in
//! which every constraint segment is covered by a chain of edges. Segments are
//! made Gabriel (no vertex strictly inside the circle on the segment as
//! diameter) by inserting Steiner points until a whole pass splits nothing.
use crate::config::TriangulationConfig;
use crate::error::{ConformingError, LocateError};
use crate::hull::convex_hull;
use crate::kdtree::KdTree;
use crate::point::*;
use crate::segment::{ConstraintSegment, LineSegment};
use crate::split::{NonEncroachingSplitFinder, SplitPointFinder};
use crate::subdivision::Subdivision;
use crate::vertex::{Vertex, VertexIndex};

/// Creates the vertices the triangulator inserts itself: split points, which
/// come with the segment being split, and sites added by
/// [`ConformingTriangulator::insert_site`], which come without one.
pub trait VertexFactory<D, S> {
    fn create_vertex(&self, point: Point3, segment: Option<&ConstraintSegment<S>>) -> Vertex<D>;
}

/// Plain vertices without a payload.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DefaultVertexFactory;

impl<D, S> VertexFactory<D, S> for DefaultVertexFactory {
    fn create_vertex(&self, point: Point3, segment: Option<&ConstraintSegment<S>>) -> Vertex<D> {
        match segment {
            Some(_) => Vertex::constraint(point, None),
            None => Vertex::new(point),
        }
    }
}

impl<D, S, F> VertexFactory<D, S> for F
where
    F: Fn(Point3, Option<&ConstraintSegment<S>>) -> Vertex<D>,
{
    fn create_vertex(&self, point: Point3, segment: Option<&ConstraintSegment<S>>) -> Vertex<D> {
        self(point, segment)
    }
}

pub struct ConformingTriangulator<D, S> {
    config: TriangulationConfig,
    /// Sites waiting for [`ConformingTriangulator::build`].
    pending: Vec<Vertex<D>>,
    segments: Vec<ConstraintSegment<S>>,
    hull: Vec<Point>,
    subdivision: Option<Subdivision<D>>,
    /// Maps inserted locations to subdivision vertices.
    point_index: KdTree<VertexIndex>,
    split_finder: Box<dyn SplitPointFinder>,
    vertex_factory: Box<dyn VertexFactory<D, S>>,
    last_split_point: Option<Point3>,
    steiner_count: usize,
    passes: usize,
}

impl<D, S: Clone> ConformingTriangulator<D, S> {
    pub fn new(sites: Vec<Vertex<D>>, config: TriangulationConfig) -> Self {
        let tolerance = config.tolerance;
        Self {
            config,
            pending: sites,
            segments: Vec::new(),
            hull: Vec::new(),
            subdivision: None,
            point_index: KdTree::new(tolerance),
            split_finder: Box::new(NonEncroachingSplitFinder::default()),
            vertex_factory: Box::new(DefaultVertexFactory),
            last_split_point: None,
            steiner_count: 0,
            passes: 0,
        }
    }

    /// Set the constraint segments together with their unique endpoints.
    /// The endpoints are inserted as sites by [`Self::build`].
    pub fn set_constraints(
        &mut self,
        segments: Vec<ConstraintSegment<S>>,
        segment_vertices: Vec<Vertex<D>>,
    ) {
        self.segments = segments;
        self.pending.extend(segment_vertices);
    }

    pub fn set_split_point_finder<F: SplitPointFinder + 'static>(&mut self, finder: F) {
        self.split_finder = Box::new(finder);
    }

    pub fn set_vertex_factory<F: VertexFactory<D, S> + 'static>(&mut self, factory: F) {
        self.vertex_factory = Box::new(factory);
    }

    pub fn config(&self) -> &TriangulationConfig {
        &self.config
    }

    /// The segments as they stand, split ones replaced by their halves.
    pub fn constraint_segments(&self) -> &[ConstraintSegment<S>] {
        &self.segments
    }

    /// Convex hull of the sites and segment endpoints given before the build.
    pub fn convex_hull(&self) -> &[Point] {
        &self.hull
    }

    pub fn point_index(&self) -> &KdTree<VertexIndex> {
        &self.point_index
    }

    pub fn last_split_point(&self) -> Option<Point3> {
        self.last_split_point
    }

    /// Number of new vertices created by splitting.
    pub fn steiner_count(&self) -> usize {
        self.steiner_count
    }

    /// Passes run by the last call to [`Self::enforce_constraints`].
    pub fn passes(&self) -> usize {
        self.passes
    }

    /// `None` until [`Self::build`] has run.
    pub fn subdivision(&self) -> Option<&Subdivision<D>> {
        self.subdivision.as_ref()
    }

    pub fn into_subdivision(self) -> Option<Subdivision<D>> {
        self.subdivision
    }

    /// Triangulate every pending site, constraint endpoints included. Does
    /// nothing if already built.
    pub fn build(&mut self) -> Result<(), ConformingError> {
        if self.subdivision.is_some() {
            return Ok(());
        }
        let mut sites = std::mem::take(&mut self.pending);
        self.hull = convex_hull(sites.iter().map(Vertex::xy));

        let mut bounds = BoundingBox::from_points(sites.iter().map(Vertex::xy));
        for segment in &self.segments {
            bounds.expand_to_include(segment.start().xy());
            bounds.expand_to_include(segment.end().xy());
        }
        if !bounds.is_empty() {
            bounds.expand_by(bounds.width().max(bounds.height()) * self.config.bounds_padding);
        }

        self.config.insertion_order.arrange(&mut sites);
        let mut subdivision = Subdivision::new(bounds, self.config.tolerance);
        for site in sites {
            insert_indexed(&mut subdivision, &mut self.point_index, site)?;
        }
        log::info!(
            "triangulated {} sites into {} edges and {} triangles",
            subdivision.site_count(),
            subdivision.edge_count(),
            subdivision.triangle_count()
        );
        self.subdivision = Some(subdivision);
        Ok(())
    }

    /// Add a site through the vertex factory, building first if needed.
    /// Constraints are not re-enforced, call
    /// [`Self::enforce_constraints`] again afterwards if that matters.
    pub fn insert_site(&mut self, point: Point3) -> Result<VertexIndex, ConformingError> {
        let vertex = self.vertex_factory.create_vertex(point, None);
        self.insert_vertex(vertex)
    }

    /// Add a ready-made vertex, merging it into an existing one within
    /// tolerance.
    pub fn insert_vertex(&mut self, vertex: Vertex<D>) -> Result<VertexIndex, ConformingError> {
        self.build()?;
        let Some(subdivision) = self.subdivision.as_mut() else {
            return Err(LocateError::OutsideFrame {
                x: vertex.point.x,
                y: vertex.point.y,
            }
            .into());
        };
        let (index, _) = insert_indexed(subdivision, &mut self.point_index, vertex)?;
        Ok(index)
    }

    /// Split encroached segments until a pass splits nothing. Returns the
    /// number of splits performed. Fails if the last permitted pass still
    /// had to split.
    pub fn enforce_constraints(&mut self) -> Result<usize, ConformingError> {
        self.build()?;
        let max_passes = self.config.max_enforcement_passes.max(1);
        let mut total = 0;
        for pass in 1..=max_passes {
            self.passes = pass;
            let splits = self.enforce_pass()?;
            log::debug!("enforcement pass {} split {} segments", pass, splits);
            if splits == 0 {
                log::info!(
                    "constraints enforced after {} passes, {} splits, {} Steiner points",
                    pass,
                    total,
                    self.steiner_count
                );
                return Ok(total);
            }
            total += splits;
        }
        let split_point = self
            .last_split_point
            .unwrap_or_else(|| Point3::new_2d(f64::NAN, f64::NAN));
        log::warn!(
            "constraints did not converge after {} passes, last split at {}",
            max_passes,
            split_point
        );
        Err(ConformingError::NonConvergence {
            passes: max_passes,
            split_point,
        })
    }

    /// One sweep over the live segments. Returns how many were split.
    fn enforce_pass(&mut self) -> Result<usize, ConformingError> {
        let Some(subdivision) = self.subdivision.as_mut() else {
            return Ok(0);
        };
        let tolerance = self.point_index.tolerance();
        let segments = std::mem::take(&mut self.segments);
        let mut next = Vec::with_capacity(segments.len() + 8);
        let mut splits = 0;
        for segment in segments {
            let encroaching =
                match find_encroaching(subdivision, &self.point_index, &segment.line, tolerance)? {
                    Some(p) => p,
                    None => {
                        next.push(segment);
                        continue;
                    }
                };
            let split = self.split_finder.find_split_point(&segment.line, encroaching);
            self.last_split_point = Some(split);
            let mut vertex = self.vertex_factory.create_vertex(split, Some(&segment));
            vertex.on_constraint = true;
            let (index, created) = insert_indexed(subdivision, &mut self.point_index, vertex)?;
            if created {
                self.steiner_count += 1;
            }
            // The halves meet at whatever vertex survived, which may be an
            // older one within tolerance.
            let survivor = subdivision.vertex(index).point;
            log::debug!(
                "split {} -> {} at {}, encroached by {}",
                segment.start(),
                segment.end(),
                survivor,
                encroaching
            );
            let (first, second) = segment.split(survivor);
            next.extend(
                [first, second]
                    .into_iter()
                    .filter(|half| !half.line.is_degenerate()),
            );
            splits += 1;
        }
        self.segments = next;
        Ok(splits)
    }

    /// The vertex closest to the middle of `segment` among those strictly
    /// inside its diametral circle, endpoints excluded. If there is none but
    /// the segment is still not an edge, the closest vertex on the circle.
    pub fn encroaching_vertex(&self, segment: &LineSegment) -> Result<Option<Point3>, LocateError> {
        let Some(subdivision) = self.subdivision.as_ref() else {
            return Ok(None);
        };
        find_encroaching(
            subdivision,
            &self.point_index,
            segment,
            self.point_index.tolerance(),
        )
    }
}

/// Insert through the point index so that anything within tolerance of an
/// earlier vertex merges into it. Returns the surviving vertex and whether it
/// was created.
fn insert_indexed<D>(
    subdivision: &mut Subdivision<D>,
    point_index: &mut KdTree<VertexIndex>,
    vertex: Vertex<D>,
) -> Result<(VertexIndex, bool), LocateError> {
    let p = vertex.xy();
    if let Some(node) = point_index.find(p) {
        let existing = point_index.node(node).value;
        point_index.insert(p, existing);
        log::trace!("{} merged into vertex {}", vertex.point, existing);
        subdivision.vertex_mut(existing).merge(vertex);
        return Ok((existing, false));
    }
    // Index only what the mesh accepted.
    let insertion = subdivision.insert_vertex(vertex)?;
    point_index.insert(p, insertion.index());
    Ok((insertion.index(), insertion.is_new()))
}

/// Relative slack for treating a vertex as lying on a diametral circle.
const COCIRCULAR_EPSILON: f64 = 1e-9;

/// Cocircular vertices satisfy the Gabriel test, but when they surround a
/// segment the flips may have settled on a different diagonal. A segment
/// that is not an edge of the mesh is therefore also encroached by the
/// closest vertex on its circle.
fn find_encroaching<D>(
    subdivision: &Subdivision<D>,
    point_index: &KdTree<VertexIndex>,
    segment: &LineSegment,
    tolerance: f64,
) -> Result<Option<Point3>, LocateError> {
    let (centre, radius) = segment.diametral_circle();
    let outer = radius * (1.0 + COCIRCULAR_EPSILON);
    let mut inside: Option<(Point3, f64)> = None;
    let mut on_circle: Option<(Point3, f64)> = None;
    for id in point_index.query(&BoundingBox::around(centre, outer)) {
        let candidate = subdivision.vertex(point_index.node(id).value).point;
        if candidate.distance_2d(segment.p0) <= tolerance
            || candidate.distance_2d(segment.p1) <= tolerance
        {
            continue;
        }
        let d = candidate.xy().distance(centre);
        let slot = if d < radius {
            &mut inside
        } else if d <= outer {
            &mut on_circle
        } else {
            continue;
        };
        if slot.map_or(true, |(_, closest_d)| d < closest_d) {
            *slot = Some((candidate, d));
        }
    }
    if let Some((p, _)) = inside {
        return Ok(Some(p));
    }
    let Some((p, _)) = on_circle else {
        return Ok(None);
    };
    if is_mesh_edge(subdivision, point_index, segment)? {
        return Ok(None);
    }
    log::trace!(
        "{} -> {} is not an edge, {} lies on its circle",
        segment.p0,
        segment.p1,
        p
    );
    Ok(Some(p))
}

/// Whether the vertices at both ends of `segment` are joined by an edge.
/// Ends that were never inserted count as joined.
fn is_mesh_edge<D>(
    subdivision: &Subdivision<D>,
    point_index: &KdTree<VertexIndex>,
    segment: &LineSegment,
) -> Result<bool, LocateError> {
    let vertex_at = |p: Point3| point_index.find(p.xy()).map(|id| point_index.node(id).value);
    match (vertex_at(segment.p0), vertex_at(segment.p1)) {
        (Some(a), Some(b)) if a != b => Ok(subdivision.edge_between(a, b)?.is_some()),
        _ => Ok(true),
    }
}
