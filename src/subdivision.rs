//! An incrementally built Delaunay triangulation on top of [`Qeds`].
//!
//! Everything lives inside a synthetic frame triangle which is far larger than
//! the data, so every inserted site falls inside an existing triangle. Frame
//! vertices take part in the Delaunay flips but never appear in the edges,
//! triangles or boundary handed back to callers.
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use crate::error::LocateError;
use crate::point::*;
use crate::predicates::*;
use crate::qeds::*;
use crate::vertex::*;
use std::cmp::Ordering;

/// How far the frame vertices are placed from the data, in multiples of the
/// larger side of the data bounds.
const FRAME_SIZE_FACTOR: f64 = 10.0;

/// The number of synthetic frame vertices, which always occupy the first
/// vertex indices.
pub const FRAME_VERTEX_COUNT: usize = 3;

/// Where a point was found, relative to the returned edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    /// The point is the origin of the edge.
    OnVertex(EdgeTarget),
    /// The point lies on the edge, strictly between its endpoints.
    OnEdge(EdgeTarget),
    /// The point lies strictly inside the triangle left of the edge.
    InFace(EdgeTarget),
}

impl Location {
    pub fn edge(&self) -> EdgeTarget {
        match *self {
            Location::OnVertex(edge) => edge,
            Location::OnEdge(edge) => edge,
            Location::InFace(edge) => edge,
        }
    }
}

/// The outcome of [`Subdivision::insert_vertex`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// A new vertex was added to the mesh.
    Inserted(VertexIndex),
    /// The point was already present, the new vertex was merged into it.
    Existing(VertexIndex),
}

impl Insertion {
    pub fn index(&self) -> VertexIndex {
        match *self {
            Insertion::Inserted(i) => i,
            Insertion::Existing(i) => i,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Insertion::Inserted(_))
    }
}

/// A triangle of real (non-frame) vertices, counter-clockwise.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub vertices: [VertexIndex; 3],
    pub points: [Point3; 3],
}

impl Triangle {
    /// x, y, z of each corner in turn.
    pub fn coordinates(&self) -> [f64; 9] {
        let [a, b, c] = self.points;
        [a.x, a.y, a.z, b.x, b.y, b.z, c.x, c.y, c.z]
    }

    /// Linear interpolation of `z` at `p` over the plane of the triangle.
    pub fn interpolate_z(&self, p: Point) -> Option<f64> {
        let [a, b, c] = self.points;
        let det = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
        if det == 0.0 {
            return None;
        }
        let wa = ((b.x - p.x) * (c.y - p.y) - (c.x - p.x) * (b.y - p.y)) / det;
        let wb = ((c.x - p.x) * (a.y - p.y) - (a.x - p.x) * (c.y - p.y)) / det;
        let wc = 1.0 - wa - wb;
        let z = wa * a.z + wb * b.z + wc * c.z;
        if z.is_finite() {
            Some(z)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Subdivision<D> {
    /// The quad-edge data structure we use as the basis for the triangulation.
    qeds: Qeds<VertexIndex>,
    vertices: Vec<Vertex<D>>,
    /// v0->v1, v1->v2 and v2->v0, with the frame interior on their left.
    frame: [EdgeTarget; 3],
    /// Where the next point location walk starts.
    last_edge: EdgeTarget,
    triangle_count: usize,
    flip_count: usize,
    resolution: f64,
}

impl<D> Subdivision<D> {
    /// Create an empty subdivision whose frame encloses `bounds`. Points
    /// closer than `resolution` to an edge are inserted onto that edge.
    pub fn new(bounds: BoundingBox, resolution: f64) -> Self {
        let (min, width, height) = if bounds.is_empty() {
            (Point::new(0.0, 0.0), 0.0, 0.0)
        } else {
            (bounds.min, bounds.width(), bounds.height())
        };
        let mut offset = width.max(height) * FRAME_SIZE_FACTOR;
        if !(offset > 0.0 && offset.is_finite()) {
            offset = FRAME_SIZE_FACTOR;
        }
        let max = Point::new(min.x + width, min.y + height);
        let frame_points = [
            Point3::new_2d(min.x + width / 2.0, max.y + offset),
            Point3::new_2d(min.x - offset, min.y - offset),
            Point3::new_2d(max.x + offset, min.y - offset),
        ];

        let mut qeds = Qeds::new();
        let e0 = qeds.make_edge(0, 1);
        let e1 = qeds.make_edge(1, 2);
        qeds.splice(e0.sym(), e1);
        let e2 = qeds.make_edge(2, 0);
        qeds.splice(e1.sym(), e2);
        qeds.splice(e2.sym(), e0);

        Self {
            qeds,
            vertices: frame_points.iter().map(|p| Vertex::new(*p)).collect(),
            frame: [e0, e1, e2],
            last_edge: e0,
            triangle_count: 1,
            flip_count: 0,
            resolution: resolution.max(0.0),
        }
    }

    pub fn qeds(&self) -> &Qeds<VertexIndex> {
        &self.qeds
    }

    pub fn resolution(&self) -> f64 {
        self.resolution
    }

    pub fn vertex(&self, i: VertexIndex) -> &Vertex<D> {
        &self.vertices[i]
    }

    pub fn vertex_mut(&mut self, i: VertexIndex) -> &mut Vertex<D> {
        &mut self.vertices[i]
    }

    /// The real vertices, frame excluded, with their indices.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexIndex, &Vertex<D>)> + '_ {
        self.vertices
            .iter()
            .enumerate()
            .skip(FRAME_VERTEX_COUNT)
    }

    /// The frame's three edges.
    pub fn frame_edges(&self) -> [EdgeTarget; 3] {
        self.frame
    }

    /// All vertices including the frame.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Real vertices only.
    pub fn site_count(&self) -> usize {
        self.vertices.len() - FRAME_VERTEX_COUNT
    }

    /// Live undirected edges, frame included.
    pub fn edge_count(&self) -> usize {
        self.qeds.len()
    }

    /// Bounded triangular faces, those touching the frame included. With the
    /// outer face this satisfies `V - E + (T + 1) = 2`.
    pub fn triangle_count(&self) -> usize {
        self.triangle_count
    }

    /// Number of Delaunay edge flips performed so far.
    pub fn flip_count(&self) -> usize {
        self.flip_count
    }

    pub fn is_frame_vertex(&self, i: VertexIndex) -> bool {
        i < FRAME_VERTEX_COUNT
    }

    pub fn is_frame_edge(&self, e: EdgeTarget) -> bool {
        self.is_frame_vertex(*self.qeds.origin(e))
            || self.is_frame_vertex(*self.qeds.origin(e.sym()))
    }

    fn org(&self, e: EdgeTarget) -> Point {
        self.vertices[*self.qeds.origin(e)].xy()
    }

    fn dest(&self, e: EdgeTarget) -> Point {
        self.vertices[*self.qeds.origin(e.sym())].xy()
    }

    fn oprev(&self, e: EdgeTarget) -> EdgeTarget {
        self.qeds.edge_ref(e).oprev().target()
    }

    fn l_next(&self, e: EdgeTarget) -> EdgeTarget {
        self.qeds.edge_ref(e).l_next().target()
    }

    /// The segment of a primal edge.
    pub fn segment(&self, e: EdgeTarget) -> (Point3, Point3) {
        (
            self.vertices[*self.qeds.origin(e)].point,
            self.vertices[*self.qeds.origin(e.sym())].point,
        )
    }

    /// The edge running from vertex `a` to vertex `b`, if there is one.
    pub fn edge_between(
        &self,
        a: VertexIndex,
        b: VertexIndex,
    ) -> Result<Option<EdgeTarget>, LocateError> {
        let Some(origin) = self.vertices.get(a) else {
            return Ok(None);
        };
        let start = match self.find(origin.xy())? {
            Location::OnVertex(e) => e,
            _ => return Ok(None),
        };
        let mut e = start;
        loop {
            if *self.qeds.origin(e.sym()) == b {
                return Ok(Some(e));
            }
            e = self.qeds.next(e);
            if e == start {
                return Ok(None);
            }
        }
    }

    /// Whether `p` is inside (or on) the frame triangle.
    pub fn frame_contains(&self, p: Point) -> bool {
        self.frame
            .iter()
            .all(|&e| left_or_right(self.org(e), self.dest(e), p) != Direction::Right)
    }

    /// Would a vertex at `p`, just inserted left of `e`, make `e` non-Delaunay.
    pub fn is_flip_required(&self, e: EdgeTarget, p: Point) -> bool {
        let prev_to = self.dest(self.oprev(e));
        flip_required(self.org(e), self.dest(e), prev_to, p)
    }

    /// Locate `p`, starting from the last located edge, and remember the
    /// result for the next call.
    pub fn locate(&mut self, p: Point) -> Result<Location, LocateError> {
        let location = self.locate_from(self.last_edge, p)?;
        self.last_edge = location.edge();
        Ok(location)
    }

    /// Locate `p` without touching the cached start edge.
    pub fn find(&self, p: Point) -> Result<Location, LocateError> {
        self.locate_from(self.last_edge, p)
    }

    /// The walk of Guibas & Stolfi with Lischinski's stepping rule. When the
    /// point lies on an edge of the final triangle it is always the returned
    /// edge.
    pub fn locate_from(&self, start: EdgeTarget, p: Point) -> Result<Location, LocateError> {
        if !p.is_finite() || !self.frame_contains(p) {
            log::warn!("cannot locate {}, it is outside the frame", p);
            return Err(LocateError::OutsideFrame { x: p.x, y: p.y });
        }
        let max_steps = self.edge_count();
        let mut e = start;
        for _ in 0..max_steps {
            let org = self.org(e);
            let dest = self.dest(e);
            if p == org {
                return Ok(Location::OnVertex(e));
            }
            if p == dest {
                return Ok(Location::OnVertex(e.sym()));
            }
            let side = left_or_right(org, dest, p);
            if side == Direction::Right {
                e = e.sym();
                continue;
            }
            let onext = self.qeds.next(e);
            if left_or_right(org, self.dest(onext), p) != Direction::Right {
                e = onext;
                continue;
            }
            let d_prev = self.qeds.edge_ref(e).d_prev().target();
            if left_or_right(self.org(d_prev), dest, p) != Direction::Right {
                e = d_prev;
                continue;
            }
            return Ok(if side == Direction::Straight {
                Location::OnEdge(e)
            } else {
                Location::InFace(e)
            });
        }
        log::warn!("point location for {} gave up at edge {:?}", p, e);
        Err(LocateError::NoConvergence {
            x: p.x,
            y: p.y,
            steps: max_steps,
            last_edge: e,
        })
    }

    /// Insert a site. A site already present is merged into the existing
    /// vertex and nothing else changes.
    pub fn insert_vertex(&mut self, vertex: Vertex<D>) -> Result<Insertion, LocateError> {
        let p = vertex.xy();
        let location = self.locate(p)?;
        let mut e = match location {
            Location::OnVertex(e) => {
                let existing = *self.qeds.origin(e);
                log::trace!("{} already present as vertex {}", p, existing);
                self.vertices[existing].merge(vertex);
                return Ok(Insertion::Existing(existing));
            }
            Location::OnEdge(e) | Location::InFace(e) => e,
        };

        // A point on (or within the resolution of) the edge splits it, so the
        // edge goes and the fan below covers the quadrilateral instead.
        let on_edge = matches!(location, Location::OnEdge(_))
            || distance_to_line(self.org(e), self.dest(e), p) < self.resolution;
        if on_edge {
            let oprev = self.oprev(e);
            self.delete_edge(e);
            e = oprev;
        }

        let index = self.vertices.len();
        self.vertices.push(vertex);

        // Connect the new vertex to every vertex of the surrounding polygon.
        let first = *self.qeds.origin(e);
        let mut base = self.qeds.make_edge(first, index);
        self.qeds.splice(base, e);
        let start = base;
        loop {
            base = self.qeds.connect(e, base.sym());
            self.triangle_count += 1;
            e = self.oprev(base);
            if self.l_next(e) == start {
                break;
            }
        }

        // Flip until every edge opposite the new vertex is Delaunay.
        loop {
            if self.is_flip_required(e, p) {
                self.qeds.swap(e);
                self.flip_count += 1;
                log::trace!("flipped edge {:?} for {}", e, p);
                e = self.oprev(e);
            } else {
                let onext = self.qeds.next(e);
                if onext == start {
                    break;
                }
                e = self.qeds.edge_ref(onext).l_prev().target();
            }
        }
        Ok(Insertion::Inserted(index))
    }

    /// Insert many sites. Runs of identical points are merged without
    /// walking the mesh again. Returns how many new vertices were created.
    pub fn insert_vertices<I>(&mut self, vertices: I) -> Result<usize, LocateError>
    where
        I: IntoIterator<Item = Vertex<D>>,
    {
        let mut previous: Option<(Point, VertexIndex)> = None;
        let mut inserted = 0;
        for vertex in vertices {
            let p = vertex.xy();
            if let Some((prev_point, prev_index)) = previous {
                if prev_point == p {
                    self.vertices[prev_index].merge(vertex);
                    continue;
                }
            }
            let insertion = self.insert_vertex(vertex)?;
            if insertion.is_new() {
                inserted += 1;
            }
            previous = Some((p, insertion.index()));
        }
        Ok(inserted)
    }

    fn delete_edge(&mut self, e: EdgeTarget) {
        if self.last_edge.e == e.e {
            let oprev = self.oprev(e);
            self.last_edge = if oprev.e == e.e { self.frame[0] } else { oprev };
        }
        self.qeds.delete(e);
        // Two faces become one.
        self.triangle_count = self.triangle_count.saturating_sub(1);
    }

    /// One edge per undirected edge, directed so that its origin is not
    /// greater than its destination in (x, y) order.
    pub fn primary_edges(&self, include_frame: bool) -> Vec<EdgeTarget> {
        self.qeds
            .base_edges()
            .map(|edge| {
                let e = edge.target();
                if self.org(e).lex_cmp(&self.dest(e)) == Ordering::Greater {
                    e.sym()
                } else {
                    e
                }
            })
            .filter(|&e| include_frame || !self.is_frame_edge(e))
            .collect()
    }

    /// The non-frame edges as segments.
    pub fn edges(&self) -> impl Iterator<Item = (Point3, Point3)> + '_ {
        self.primary_edges(false)
            .into_iter()
            .map(move |e| self.segment(e))
    }

    /// The non-frame triangles. Each traversal keeps its own visited set, so
    /// several may run at once on a finished mesh.
    pub fn triangles(&self) -> TriangleIter<'_, D> {
        TriangleIter::new(self)
    }

    pub fn for_each_triangle<F: FnMut(&Triangle)>(&self, mut f: F) {
        for triangle in self.triangles() {
            f(&triangle);
        }
    }

    /// The real triangle whose left face is `e`, if it is one.
    fn face_triangle(&self, e: EdgeTarget) -> Option<Triangle> {
        let e1 = self.l_next(e);
        let e2 = self.l_next(e1);
        if self.l_next(e2) != e {
            return None;
        }
        let vertices = [
            *self.qeds.origin(e),
            *self.qeds.origin(e1),
            *self.qeds.origin(e2),
        ];
        if vertices.iter().any(|&i| self.is_frame_vertex(i)) {
            return None;
        }
        Some(Triangle {
            vertices,
            points: [
                self.vertices[vertices[0]].point,
                self.vertices[vertices[1]].point,
                self.vertices[vertices[2]].point,
            ],
        })
    }

    /// The real triangle containing `(x, y)`, or `None` outside the data.
    pub fn triangle_at(&self, x: f64, y: f64) -> Result<Option<Triangle>, LocateError> {
        let p = Point::new(x, y);
        if !p.is_finite() || !self.frame_contains(p) {
            return Ok(None);
        }
        let candidates = match self.find(p)? {
            Location::InFace(e) => vec![e],
            Location::OnEdge(e) => vec![e, e.sym()],
            Location::OnVertex(e) => {
                let mut ring = vec![e];
                let mut current = self.qeds.next(e);
                while current != e {
                    ring.push(current);
                    current = self.qeds.next(current);
                }
                ring
            }
        };
        Ok(candidates.into_iter().find_map(|e| self.face_triangle(e)))
    }

    /// The edges of the real triangle containing `(x, y)`.
    pub fn triangle_edges_at(
        &self,
        x: f64,
        y: f64,
    ) -> Result<Option<[(Point3, Point3); 3]>, LocateError> {
        Ok(self.triangle_at(x, y)?.map(|t| {
            let [a, b, c] = t.points;
            [(a, b), (b, c), (c, a)]
        }))
    }

    /// Elevation at `(x, y)`, interpolated over the containing triangle.
    pub fn elevation_at(&self, x: f64, y: f64) -> Result<Option<f64>, LocateError> {
        let p = Point::new(x, y);
        if !p.is_finite() || !self.frame_contains(p) {
            return Ok(None);
        }
        if let Location::OnVertex(e) = self.find(p)? {
            let i = *self.qeds.origin(e);
            if !self.is_frame_vertex(i) && self.vertices[i].point.z.is_finite() {
                return Ok(Some(self.vertices[i].point.z));
            }
        }
        Ok(self.triangle_at(x, y)?.and_then(|t| t.interpolate_z(p)))
    }

    /// Vertices on the outer boundary of the real triangles, counter-clockwise
    /// and not closed.
    pub fn boundary_vertices(&self) -> Vec<VertexIndex> {
        let mut ring: Vec<VertexIndex> = Vec::new();
        for &start in &[self.frame[0], self.frame[2], self.frame[1]] {
            let mut e = start;
            loop {
                let dest = *self.qeds.origin(e.sym());
                if !self.is_frame_vertex(dest) && ring.last() != Some(&dest) {
                    ring.push(dest);
                }
                e = self.qeds.next(e);
                if e == start {
                    break;
                }
            }
        }
        if ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        let doubled_area: f64 = (0..ring.len())
            .map(|i| {
                let a = self.vertices[ring[i]].xy();
                let b = self.vertices[ring[(i + 1) % ring.len()]].xy();
                a.x * b.y - b.x * a.y
            })
            .sum();
        if doubled_area < 0.0 {
            ring.reverse();
        }
        ring
    }

    /// The outer boundary as a closed ring of points.
    pub fn boundary(&self) -> Vec<Point3> {
        let mut ring: Vec<Point3> = self
            .boundary_vertices()
            .into_iter()
            .map(|i| self.vertices[i].point)
            .collect();
        if let Some(&first) = ring.first() {
            ring.push(first);
        }
        ring
    }
}

#[cfg(feature = "serialize")]
fn edge_name(target: EdgeTarget) -> String {
    match target.r {
        0 => format!("e{}", target.e),
        1 => format!("e{}Rot", target.e),
        2 => format!("e{}Sym", target.e),
        _ => format!("e{}SymRot", target.e),
    }
}

#[cfg(feature = "serialize")]
impl<D> Subdivision<D> {
    /// The quad links and vertices as text tables.
    pub fn debug_table(&self) -> String {
        use prettytable::{Cell, Row, Table};
        let mut table = Table::new();

        let mut headers = Row::empty();
        headers.add_cell(Cell::new("-"));
        let mut next = Row::empty();
        next.add_cell(Cell::new("next"));
        let mut rot_next = Row::empty();
        rot_next.add_cell(Cell::new("Rot.next"));
        let mut sym_next = Row::empty();
        sym_next.add_cell(Cell::new("Sym.next"));
        let mut sym_rot_next = Row::empty();
        sym_rot_next.add_cell(Cell::new("SymRot.next"));
        let mut org = Row::empty();
        org.add_cell(Cell::new("org"));
        let mut dest = Row::empty();
        dest.add_cell(Cell::new("dest"));
        for (i, quad) in self.qeds.quads.iter() {
            headers.add_cell(Cell::new(&format!("e{}", i)));
            next.add_cell(Cell::new(&edge_name(quad.primal[0].next)));
            rot_next.add_cell(Cell::new(&edge_name(quad.dual[0].next)));
            sym_next.add_cell(Cell::new(&edge_name(quad.primal[1].next)));
            sym_rot_next.add_cell(Cell::new(&edge_name(quad.dual[1].next)));
            org.add_cell(Cell::new(&format!("P{}", quad.primal[0].origin)));
            dest.add_cell(Cell::new(&format!("P{}", quad.primal[1].origin)));
        }
        table.add_row(headers);
        table.add_row(next);
        table.add_row(rot_next);
        table.add_row(sym_next);
        table.add_row(sym_rot_next);
        table.add_row(org);
        table.add_row(dest);

        let mut points = Table::new();
        let mut point_headers = Row::empty();
        point_headers.add_cell(Cell::new("Name"));
        point_headers.add_cell(Cell::new("Point"));
        points.add_row(point_headers);
        for (i, vertex) in self.vertices.iter().enumerate() {
            let mut row = Row::empty();
            row.add_cell(Cell::new(&format!("P{}", i)));
            row.add_cell(Cell::new(&format!("{}", vertex.point)));
            points.add_row(row);
        }

        let mut out = table.to_string();
        out.push('\n');
        out.push_str(&points.to_string());
        out
    }
}

/// Depth-first walk over the faces, see [`Subdivision::triangles`].
pub struct TriangleIter<'a, D> {
    subdivision: &'a Subdivision<D>,
    stack: Vec<EdgeTarget>,
    visited: Vec<bool>,
}

impl<'a, D> TriangleIter<'a, D> {
    fn new(subdivision: &'a Subdivision<D>) -> Self {
        let slots = subdivision
            .qeds
            .quads
            .iter()
            .map(|(i, _)| i + 1)
            .max()
            .unwrap_or(0);
        Self {
            subdivision,
            stack: vec![subdivision.frame[0]],
            visited: vec![false; slots * 2],
        }
    }

    fn slot(e: EdgeTarget) -> usize {
        e.e * 2 + (e.r / 2) as usize
    }
}

impl<'a, D> Iterator for TriangleIter<'a, D> {
    type Item = Triangle;
    fn next(&mut self) -> Option<Self::Item> {
        while let Some(e) = self.stack.pop() {
            if self.visited[Self::slot(e)] {
                continue;
            }
            let mut current = e;
            loop {
                self.visited[Self::slot(current)] = true;
                let sym = current.sym();
                if !self.visited[Self::slot(sym)] {
                    self.stack.push(sym);
                }
                current = self.subdivision.l_next(current);
                if current == e {
                    break;
                }
            }
            if let Some(triangle) = self.subdivision.face_triangle(e) {
                return Some(triangle);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use quickcheck_macros::quickcheck;

    fn build(points: &[(f64, f64)], resolution: f64) -> Subdivision<()> {
        let bounds = BoundingBox::from_points(points.iter().map(|&(x, y)| Point::new(x, y)));
        let mut subdivision = Subdivision::new(bounds, resolution);
        for &(x, y) in points {
            subdivision
                .insert_vertex(Vertex::new(Point3::new_2d(x, y)))
                .unwrap();
            assert_euler(&subdivision);
        }
        subdivision
    }

    fn assert_euler<D>(subdivision: &Subdivision<D>) {
        let v = subdivision.vertex_count() as i64;
        let e = subdivision.edge_count() as i64;
        let f = subdivision.triangle_count() as i64 + 1;
        assert_eq!(v - e + f, 2, "V={} E={} F={}", v, e, f);
    }

    /// Every face is a triangle and every bounded one is counter-clockwise.
    fn assert_topology<D>(subdivision: &Subdivision<D>) {
        let outer = subdivision.frame[0].sym();
        let mut faces = 0;
        for edge in subdivision.qeds.base_edges() {
            for e in [edge, edge.sym()] {
                assert_eq!(e.l_face().len(), 3);
                assert_eq!(*e.onext().origin(), *e.origin());
                if e.l_face().iter().all(|f| f.target() != outer) {
                    let [a, b, c] = [e, e.l_next(), e.l_next().l_next()]
                        .map(|f| subdivision.vertices[*f.origin()].xy());
                    assert_eq!(left_or_right(a, b, c), Direction::Left);
                }
                faces += 1;
            }
        }
        // Each face has three directed edges.
        assert_eq!(faces, 3 * (subdivision.triangle_count() + 1));
    }

    fn edge_set(subdivision: &Subdivision<()>) -> Vec<((f64, f64), (f64, f64))> {
        let mut edges: Vec<_> = subdivision
            .edges()
            .map(|(a, b)| ((a.x, a.y), (b.x, b.y)))
            .collect();
        edges.sort_by(|a, b| a.partial_cmp(b).unwrap());
        edges
    }

    #[test]
    fn frame_only() {
        let subdivision: Subdivision<()> =
            Subdivision::new(BoundingBox::new(Point::new(0.0, 0.0), Point::new(1.0, 1.0)), 0.0);
        assert_eq!(subdivision.vertex_count(), 3);
        assert_eq!(subdivision.site_count(), 0);
        assert_eq!(subdivision.edge_count(), 3);
        assert_eq!(subdivision.triangle_count(), 1);
        assert_eq!(subdivision.triangles().count(), 0);
        assert_eq!(subdivision.edges().count(), 0);
        assert!(subdivision.boundary().is_empty());
        assert!(subdivision.frame_contains(Point::new(0.5, 0.5)));
        assert_euler(&subdivision);
        assert_topology(&subdivision);
    }

    #[test]
    fn single_site_frame_is_not_degenerate() {
        let subdivision = build(&[(3.0, 3.0)], 0.0);
        assert_eq!(subdivision.triangle_count(), 3);
        assert_eq!(subdivision.triangles().count(), 0);
        assert_topology(&subdivision);
    }

    #[test]
    fn square_two_triangles() {
        let subdivision = build(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)], 0.0);
        assert_eq!(subdivision.triangles().count(), 2);
        let edges = edge_set(&subdivision);
        assert_eq!(edges.len(), 5);
        // Both diagonals are Delaunay for a square; which one appears depends
        // on insertion order.
        let diagonal_a = ((0.0, 0.0), (10.0, 10.0));
        let diagonal_b = ((0.0, 10.0), (10.0, 0.0));
        assert!(edges.contains(&diagonal_a) ^ edges.contains(&diagonal_b));
        for side in [
            ((0.0, 0.0), (10.0, 0.0)),
            ((10.0, 0.0), (10.0, 10.0)),
            ((0.0, 10.0), (10.0, 10.0)),
            ((0.0, 0.0), (0.0, 10.0)),
        ] {
            assert!(edges.contains(&side), "missing {:?}", side);
        }
        assert_topology(&subdivision);

        let index = |x: f64, y: f64| {
            subdivision
                .vertices()
                .find(|(_, v)| v.xy() == Point::new(x, y))
                .map(|(i, _)| i)
                .unwrap()
        };
        let (a, b, c, d) = (index(0.0, 0.0), index(10.0, 0.0), index(10.0, 10.0), index(0.0, 10.0));
        let side = subdivision.edge_between(a, b).unwrap().unwrap();
        assert_eq!(*subdivision.qeds().origin(side), a);
        assert_eq!(*subdivision.qeds().origin(side.sym()), b);
        assert!(subdivision.edge_between(b, a).unwrap().is_some());
        assert_eq!(
            subdivision.edge_between(a, c).unwrap().is_some(),
            edges.contains(&diagonal_a)
        );
        assert_eq!(
            subdivision.edge_between(b, d).unwrap().is_some(),
            edges.contains(&diagonal_b)
        );
        assert_eq!(subdivision.edge_between(a, 1000).unwrap(), None);
    }

    #[test]
    fn existing_vertex_is_reused() {
        let mut subdivision = build(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)], 0.0);
        let triangles = subdivision.triangle_count();
        let vertices = subdivision.vertex_count();
        let location = subdivision.locate(Point::new(10.0, 0.0)).unwrap();
        match location {
            Location::OnVertex(e) => {
                assert_eq!(subdivision.org(e), Point::new(10.0, 0.0));
            }
            other => panic!("expected a vertex, got {:?}", other),
        }
        let insertion = subdivision
            .insert_vertex(Vertex::new(Point3::new_2d(10.0, 0.0)))
            .unwrap();
        assert!(!insertion.is_new());
        assert_eq!(subdivision.vertex(insertion.index()).xy(), Point::new(10.0, 0.0));
        assert_eq!(subdivision.triangle_count(), triangles);
        assert_eq!(subdivision.vertex_count(), vertices);
    }

    #[test]
    fn point_on_edge_splits_it() {
        let subdivision = build(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0), (5.0, 0.0)], 0.0);
        let edges = edge_set(&subdivision);
        assert!(!edges.contains(&((0.0, 0.0), (10.0, 0.0))));
        assert!(edges.contains(&((0.0, 0.0), (5.0, 0.0))));
        assert!(edges.contains(&((5.0, 0.0), (10.0, 0.0))));
        assert_eq!(subdivision.triangles().count(), 2);
        assert_topology(&subdivision);
    }

    #[test]
    fn point_near_edge_snaps_within_resolution() {
        let subdivision = build(&[(0.0, 0.0), (10.0, 0.0), (5.0, 10.0), (5.0, 0.001)], 0.01);
        let edges = edge_set(&subdivision);
        assert!(!edges.contains(&((0.0, 0.0), (10.0, 0.0))));
        assert_eq!(subdivision.triangles().count(), 2);
        assert_topology(&subdivision);
    }

    #[test]
    fn collinear_sites() {
        let mut points: Vec<(f64, f64)> = (0..6).map(|i| (f64::from(i), f64::from(i))).collect();
        points.push((3.0, 0.0));
        // Duplicates are absorbed.
        points.push((2.0, 2.0));
        let subdivision = build(&points, 0.0);
        assert_eq!(subdivision.site_count(), 7);
        for triangle in subdivision.triangles() {
            let [a, b, c] = triangle.points;
            assert_eq!(left_or_right(a.xy(), b.xy(), c.xy()), Direction::Left);
        }
        assert_topology(&subdivision);
    }

    #[test]
    fn insert_vertices_merges_runs() {
        let mut subdivision: Subdivision<&str> =
            Subdivision::new(BoundingBox::new(Point::new(0.0, 0.0), Point::new(4.0, 4.0)), 0.0);
        let inserted = subdivision
            .insert_vertices(vec![
                Vertex::new(Point3::new_2d(0.0, 0.0)),
                Vertex::with_data(Point3::new_2d(0.0, 0.0), "again"),
                Vertex::new(Point3::new_2d(4.0, 0.0)),
                Vertex::new(Point3::new_2d(2.0, 4.0)),
            ])
            .unwrap();
        assert_eq!(inserted, 3);
        assert_eq!(subdivision.site_count(), 3);
        assert_eq!(subdivision.vertex(FRAME_VERTEX_COUNT).data, Some("again"));
    }

    #[test]
    fn boundary_is_closed_ccw_hull() {
        let subdivision = build(
            &[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (5.0, 5.0)],
            0.0,
        );
        let ring = subdivision.boundary();
        assert_eq!(ring.len(), 5);
        assert!(ring[0].equals_2d(&ring[4]));
        let mut corners: Vec<(f64, f64)> = ring[..4].iter().map(|p| (p.x, p.y)).collect();
        corners.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(
            corners,
            vec![(0.0, 0.0), (0.0, 10.0), (10.0, 0.0), (10.0, 10.0)]
        );
        let doubled_area: f64 = ring
            .windows(2)
            .map(|w| w[0].x * w[1].y - w[1].x * w[0].y)
            .sum();
        assert_abs_diff_eq!(doubled_area, 200.0);
    }

    #[test]
    fn elevation_interpolation() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 10.0),
            Point3::new(0.0, 10.0, 20.0),
        ];
        let mut subdivision: Subdivision<()> =
            Subdivision::new(BoundingBox::from_points(points.iter().map(Point3::xy)), 0.0);
        for p in points {
            subdivision.insert_vertex(Vertex::new(p)).unwrap();
        }
        // z = x + 2y
        let z = subdivision.elevation_at(2.0, 3.0).unwrap().unwrap();
        assert_abs_diff_eq!(z, 8.0, epsilon = 1e-9);
        assert_eq!(subdivision.elevation_at(10.0, 0.0).unwrap(), Some(10.0));
        let z = subdivision.elevation_at(5.0, 0.0).unwrap().unwrap();
        assert_abs_diff_eq!(z, 5.0, epsilon = 1e-9);
        assert_eq!(subdivision.elevation_at(50.0, 50.0).unwrap(), None);
        assert_eq!(subdivision.elevation_at(1.0e9, 1.0e9).unwrap(), None);
        let edges = subdivision.triangle_edges_at(1.0, 1.0).unwrap().unwrap();
        assert_eq!(edges.len(), 3);
    }

    #[test]
    fn outside_frame_is_an_error() {
        let mut subdivision = build(&[(0.0, 0.0), (1.0, 1.0)], 0.0);
        let result = subdivision.insert_vertex(Vertex::new(Point3::new_2d(1.0e9, 0.0)));
        assert!(matches!(result, Err(LocateError::OutsideFrame { .. })));
    }

    #[test]
    fn primary_edges_are_canonical() {
        let subdivision = build(&[(3.0, 1.0), (0.0, 0.0), (2.0, 5.0), (-1.0, 4.0)], 0.0);
        let all = subdivision.primary_edges(true);
        assert_eq!(all.len(), subdivision.edge_count());
        for e in all {
            assert_ne!(subdivision.org(e).lex_cmp(&subdivision.dest(e)), Ordering::Greater);
        }
        assert!(subdivision
            .primary_edges(false)
            .into_iter()
            .all(|e| !subdivision.is_frame_edge(e)));
    }

    #[test]
    fn concurrent_triangle_traversals() {
        let points: Vec<(f64, f64)> = (0..20)
            .map(|i| (f64::from(i * 7 % 13), f64::from(i * 5 % 11)))
            .collect();
        let subdivision = build(&points, 0.0);
        let expected = subdivision.triangles().count();
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| subdivision.triangles().count()))
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[quickcheck]
    fn delaunay_and_euler(points: Vec<Point>) -> bool {
        let bounds = BoundingBox::from_points(points.iter().copied());
        let mut subdivision: Subdivision<()> = Subdivision::new(bounds, 0.0);
        for p in &points {
            subdivision
                .insert_vertex(Vertex::new(Point3::from(*p)))
                .unwrap();
            let v = subdivision.vertex_count() as i64;
            let e = subdivision.edge_count() as i64;
            let f = subdivision.triangle_count() as i64 + 1;
            if v - e + f != 2 {
                return false;
            }
        }
        let sites: Vec<Point> = subdivision.vertices().map(|(_, v)| v.xy()).collect();
        subdivision.triangles().all(|t| {
            let [a, b, c] = t.points.map(|p| p.xy());
            left_or_right(a, b, c) == Direction::Left
                && sites.iter().all(|&d| in_circle(a, b, c, d) <= 0.0)
        })
    }
}
