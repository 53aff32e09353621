//! Convenience front ends. [`DelaunayBuilder`] triangulates points only.
//! [`ConformingBuilder`] takes constraint polylines and derives the segments
//! and their unique vertices itself.
use crate::config::TriangulationConfig;
use crate::conforming::ConformingTriangulator;
use crate::error::{ConformingError, LocateError};
use crate::kdtree::KdTree;
use crate::point::*;
use crate::segment::ConstraintSegment;
use crate::subdivision::Subdivision;
use crate::vertex::Vertex;

/// Pad `bounds` by a fraction of its larger side.
fn padded(mut bounds: BoundingBox, padding: f64) -> BoundingBox {
    if !bounds.is_empty() {
        bounds.expand_by(bounds.width().max(bounds.height()) * padding);
    }
    bounds
}

#[derive(Clone, Debug)]
pub struct DelaunayBuilder<D> {
    sites: Vec<Vertex<D>>,
    config: TriangulationConfig,
}

impl<D> DelaunayBuilder<D> {
    pub fn new(config: TriangulationConfig) -> Self {
        Self {
            sites: Vec::new(),
            config,
        }
    }

    pub fn with_sites<I: IntoIterator<Item = Vertex<D>>>(mut self, sites: I) -> Self {
        self.sites.extend(sites);
        self
    }

    pub fn add_site(&mut self, site: Vertex<D>) {
        self.sites.push(site);
    }

    /// Sites at the same location are merged, and with a non-zero tolerance
    /// sites that close to an edge split it.
    pub fn build(self) -> Result<Subdivision<D>, LocateError> {
        let Self { mut sites, config } = self;
        let bounds = padded(
            BoundingBox::from_points(sites.iter().map(Vertex::xy)),
            config.bounds_padding,
        );
        config.insertion_order.arrange(&mut sites);
        let mut subdivision = Subdivision::new(bounds, config.tolerance);
        subdivision.insert_vertices(sites)?;
        log::info!(
            "triangulated {} sites into {} triangles with {} flips",
            subdivision.site_count(),
            subdivision.triangle_count(),
            subdivision.flip_count()
        );
        Ok(subdivision)
    }
}

/// Sites plus constraint polylines. Each segment's payload is the index of
/// the polyline it came from.
#[derive(Clone, Debug)]
pub struct ConformingBuilder<D> {
    sites: Vec<Vertex<D>>,
    polylines: Vec<Vec<Point3>>,
    config: TriangulationConfig,
}

impl<D> ConformingBuilder<D> {
    pub fn new(config: TriangulationConfig) -> Self {
        Self {
            sites: Vec::new(),
            polylines: Vec::new(),
            config,
        }
    }

    pub fn with_sites<I: IntoIterator<Item = Vertex<D>>>(mut self, sites: I) -> Self {
        self.sites.extend(sites);
        self
    }

    pub fn with_polyline<I: IntoIterator<Item = Point3>>(mut self, polyline: I) -> Self {
        self.polylines.push(polyline.into_iter().collect());
        self
    }

    pub fn polylines(&self) -> &[Vec<Point3>] {
        &self.polylines
    }

    /// The unique polyline vertices, first occurrence wins within tolerance.
    fn constraint_vertices(&self) -> (Vec<Vertex<D>>, KdTree<()>) {
        let mut index = KdTree::new(self.config.tolerance);
        let mut vertices = Vec::new();
        for &p in self.polylines.iter().flatten() {
            if !index.insert(p.xy(), ()).repeated {
                vertices.push(Vertex::constraint(p, None));
            }
        }
        (vertices, index)
    }

    fn constraint_segments(&self) -> Vec<ConstraintSegment<usize>> {
        self.polylines
            .iter()
            .enumerate()
            .flat_map(|(i, line)| {
                line.windows(2)
                    .map(move |pair| ConstraintSegment::new(pair[0], pair[1], i))
            })
            .filter(|segment| !segment.line.is_degenerate())
            .collect()
    }

    /// Triangulate and enforce the constraints. The triangulator is handed
    /// back so that the split segments stay available.
    pub fn build(self) -> Result<ConformingTriangulator<D, usize>, ConformingError> {
        let (constraint_vertices, index) = self.constraint_vertices();
        let segments = self.constraint_segments();
        let tolerance = index.tolerance();
        let Self { sites, config, .. } = self;
        let site_count = sites.len();
        let sites: Vec<Vertex<D>> = sites
            .into_iter()
            .filter(|site| {
                let p = site.xy();
                !index
                    .query(&BoundingBox::around(p, tolerance))
                    .into_iter()
                    .any(|id| index.node(id).point.distance(p) <= tolerance)
            })
            .collect();
        log::debug!(
            "{} of {} sites coincide with constraint vertices",
            site_count - sites.len(),
            site_count
        );

        let mut triangulator = ConformingTriangulator::new(sites, config);
        triangulator.set_constraints(segments, constraint_vertices);
        triangulator.build()?;
        triangulator.enforce_constraints()?;
        Ok(triangulator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InsertionOrder;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn delaunay_square_with_duplicates() {
        init();
        let corners = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (10.0, 10.0)];
        for order in [
            InsertionOrder::AsGiven,
            InsertionOrder::Sorted,
            InsertionOrder::Shuffled { seed: 42 },
        ] {
            let subdivision: Subdivision<()> =
                DelaunayBuilder::new(TriangulationConfig::default().with_insertion_order(order))
                    .with_sites(corners.iter().map(|&(x, y)| Vertex::new(Point3::new_2d(x, y))))
                    .build()
                    .unwrap();
            assert_eq!(subdivision.site_count(), 4);
            assert_eq!(subdivision.triangles().count(), 2);
            assert_eq!(subdivision.edges().count(), 5);
        }
    }

    #[test]
    fn empty_input() {
        let subdivision: Subdivision<()> = DelaunayBuilder::new(TriangulationConfig::default())
            .build()
            .unwrap();
        assert_eq!(subdivision.site_count(), 0);
        assert_eq!(subdivision.triangles().count(), 0);
    }

    #[test]
    fn polylines_become_segments() {
        init();
        let builder: ConformingBuilder<()> = ConformingBuilder::new(TriangulationConfig::default())
            .with_sites(vec![
                Vertex::new(Point3::new_2d(5.0, 1.0)),
                // Same as a polyline vertex.
                Vertex::new(Point3::new_2d(10.0, 0.0)),
                Vertex::new(Point3::new_2d(3.0, 8.0)),
            ])
            .with_polyline(vec![
                Point3::new_2d(0.0, 0.0),
                Point3::new_2d(10.0, 0.0),
                Point3::new_2d(10.0, 0.0),
                Point3::new_2d(10.0, 10.0),
            ])
            .with_polyline(vec![Point3::new_2d(0.0, 10.0), Point3::new_2d(0.0, 0.0)]);
        assert_eq!(builder.polylines().len(), 2);
        let (vertices, _) = builder.constraint_vertices();
        assert_eq!(vertices.len(), 4);
        assert!(vertices.iter().all(|v| v.on_constraint));
        let segments = builder.constraint_segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(
            segments.iter().map(|s| s.data).collect::<Vec<_>>(),
            vec![0, 0, 1]
        );

        let triangulator = builder.build().unwrap();
        let subdivision = triangulator.subdivision().unwrap();
        let corner = subdivision
            .vertices()
            .find(|(_, v)| v.xy() == Point::new(10.0, 0.0))
            .map(|(_, v)| v.clone())
            .unwrap();
        assert!(corner.on_constraint);
        // (5, 1) encroaches the bottom edge.
        assert!(triangulator.steiner_count() >= 1);
        assert!(triangulator.constraint_segments().len() > 3);
        assert!(triangulator
            .constraint_segments()
            .iter()
            .all(|s| s.data == 0 || s.data == 1));
    }
}
