//! The quad-edge data structure of Guibas & Stolfi. Every undirected edge is a
//! [`Quad`] of four directed edges: the primal edge `e`, its dual `e.rot`, the
//! reversed primal `e.sym` and the reversed dual `e.sym.rot`. Quads live in a
//! [`Slab`] and refer to each other by [`EdgeTarget`] index.
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use slab::Slab;

/// A quad-edge mesh. Primal edges carry an origin of type `V`, dual edges
/// carry nothing.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Qeds<V> {
    /// Freed slots are reused by later edges.
    pub quads: Slab<Quad<V>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Quad<V> {
    /// `e` and `e.sym`.
    pub primal: [Edge<V>; 2],
    /// `e.rot` and `e.sym.rot`.
    pub dual: [DualEdge; 2],
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Edge<V> {
    pub next: EdgeTarget,
    pub origin: V,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct DualEdge {
    pub next: EdgeTarget,
}

// r can fit in two bits. If we limit the size of qeds we could fit it in the
// edge index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct EdgeTarget {
    // Slab key of the quad.
    pub e: usize,
    // Can only be 0, 1, 2, or 3. Even values are primal.
    pub r: u8,
}

impl EdgeTarget {
    pub fn new(e: usize, r: u8) -> Self {
        Self { e, r: r % 4 }
    }

    #[inline(always)]
    fn offset_r(&self, offset: u8) -> Self {
        let mut q = *self;
        q.r = (q.r + offset) % 4;
        q
    }

    /// Rot
    #[inline(always)]
    pub fn rot(&self) -> Self {
        self.offset_r(1)
    }

    #[inline(always)]
    pub fn sym(&self) -> Self {
        self.offset_r(2)
    }

    #[inline(always)]
    pub fn inv_rot(&self) -> Self {
        self.offset_r(3)
    }

    pub fn is_primal(&self) -> bool {
        self.r % 2 == 0
    }

    /// The same undirected edge in its `r == 0` orientation.
    pub fn base(&self) -> Self {
        Self::new(self.e, self.r % 2)
    }
}

impl<V> Qeds<V> {
    pub fn new() -> Self {
        Self { quads: Slab::new() }
    }

    /// Create an isolated edge from `org` to `dest`.
    pub fn make_edge(&mut self, org: V, dest: V) -> EdgeTarget {
        let entry = self.quads.vacant_entry();
        let this_index = entry.key();
        let quad = Quad {
            primal: [
                // The base edge e.
                Edge {
                    next: EdgeTarget::new(this_index, 0),
                    origin: org,
                },
                // eSym
                Edge {
                    next: EdgeTarget::new(this_index, 2),
                    origin: dest,
                },
            ],
            dual: [
                // eRot
                DualEdge {
                    next: EdgeTarget::new(this_index, 3),
                },
                // eSymRot
                DualEdge {
                    next: EdgeTarget::new(this_index, 1),
                },
            ],
        };
        entry.insert(quad);
        EdgeTarget::new(this_index, 0)
    }

    /// Whether the quad behind `target` still exists.
    pub fn is_live(&self, target: EdgeTarget) -> bool {
        self.quads.contains(target.e)
    }

    /// Number of live undirected edges.
    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    #[inline(always)]
    pub fn next(&self, target: EdgeTarget) -> EdgeTarget {
        let quad = &self.quads[target.e];
        if target.is_primal() {
            quad.primal[(target.r / 2) as usize].next
        } else {
            quad.dual[(target.r / 2) as usize].next
        }
    }

    fn set_next(&mut self, target: EdgeTarget, next: EdgeTarget) {
        let quad = &mut self.quads[target.e];
        if target.is_primal() {
            quad.primal[(target.r / 2) as usize].next = next;
        } else {
            quad.dual[(target.r / 2) as usize].next = next;
        }
    }

    /// The origin of a primal edge. For a dual edge this is the origin of the
    /// primal edge it was rotated from.
    pub fn origin(&self, target: EdgeTarget) -> &V {
        &self.quads[target.e].primal[((target.r / 2) % 2) as usize].origin
    }

    pub fn set_origin(&mut self, target: EdgeTarget, origin: V) {
        self.quads[target.e].primal[((target.r / 2) % 2) as usize].origin = origin;
    }

    pub fn edge_ref(&self, target: EdgeTarget) -> EdgeRef<'_, V> {
        EdgeRef { qeds: self, target }
    }

    pub fn dual_ref(&self, target: EdgeTarget) -> DualEdgeRef<'_, V> {
        DualEdgeRef { qeds: self, target }
    }

    /// Exchange the origin rings of `a` and `b` and, independently, the left
    /// face rings. Applying the same splice twice restores the mesh.
    pub fn splice(&mut self, edge_a: EdgeTarget, edge_b: EdgeTarget) {
        let alpha = self.next(edge_a).rot();
        let beta = self.next(edge_b).rot();

        // Exchange a.onext with b.onext, then alpha.onext with beta.onext.
        let ta = self.next(edge_a);
        let tb = self.next(edge_b);
        self.set_next(edge_a, tb);
        self.set_next(edge_b, ta);

        let ta = self.next(alpha);
        let tb = self.next(beta);
        self.set_next(alpha, tb);
        self.set_next(beta, ta);
    }

    /// Detach `e` from the mesh and free its slot. Any target still pointing
    /// at this quad must not be used afterwards.
    pub fn delete(&mut self, e: EdgeTarget) {
        let oprev = self.edge_ref(e).oprev().target();
        self.splice(e, oprev);
        let sym_oprev = self.edge_ref(e.sym()).oprev().target();
        self.splice(e.sym(), sym_oprev);
        self.quads.remove(e.e);
    }

    pub fn base_edges(&self) -> BaseEdgeIter<'_, V> {
        BaseEdgeIter::new(self)
    }
}

impl<V: Clone> Qeds<V> {
    /// Connect the Dest of a with the Org of b by creating a new edge, so
    /// that a, the new edge and b share a left face.
    pub fn connect(&mut self, edge_a: EdgeTarget, edge_b: EdgeTarget) -> EdgeTarget {
        let p1 = self.origin(edge_a.sym()).clone();
        let p2 = self.origin(edge_b).clone();
        let q_target = self.make_edge(p1, p2);
        let a_lnext = self.edge_ref(edge_a).l_next().target();
        self.splice(q_target, a_lnext);
        self.splice(q_target.sym(), edge_b);
        q_target
    }

    /// Turn `e` counter-clockwise within the quadrilateral formed by its two
    /// adjacent triangles. Both triangles must be non-degenerate.
    pub fn swap(&mut self, e: EdgeTarget) {
        let a = self.edge_ref(e).oprev().target();
        let b = self.edge_ref(e.sym()).oprev().target();

        self.splice(e, a);
        self.splice(e.sym(), b);

        let a_lnext = self.edge_ref(a).l_next().target();
        self.splice(e, a_lnext);

        let b_lnext = self.edge_ref(b).l_next().target();
        self.splice(e.sym(), b_lnext);

        let a_dest = self.origin(a.sym()).clone();
        let b_dest = self.origin(b.sym()).clone();
        self.set_origin(e, a_dest);
        self.set_origin(e.sym(), b_dest);
    }
}

impl<V> Default for Qeds<V> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BaseEdgeIter<'a, V> {
    qeds: &'a Qeds<V>,
    quad_iter: slab::Iter<'a, Quad<V>>,
}

impl<'a, V> BaseEdgeIter<'a, V> {
    fn new(qeds: &'a Qeds<V>) -> Self {
        Self {
            qeds,
            quad_iter: qeds.quads.iter(),
        }
    }
}

impl<'a, V> Iterator for BaseEdgeIter<'a, V> {
    type Item = EdgeRef<'a, V>;
    fn next(&mut self) -> Option<Self::Item> {
        let (i, _) = self.quad_iter.next()?;
        Some(self.qeds.edge_ref(EdgeTarget::new(i, 0)))
    }
}

/// A borrowed primal edge.
#[derive(Debug)]
pub struct EdgeRef<'a, V> {
    qeds: &'a Qeds<V>,
    target: EdgeTarget,
}

impl<'a, V> Clone for EdgeRef<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, V> Copy for EdgeRef<'a, V> {}

impl<'a, V> EdgeRef<'a, V> {
    pub fn qeds(&self) -> &'a Qeds<V> {
        self.qeds
    }

    pub fn target(&self) -> EdgeTarget {
        self.target
    }

    pub fn origin(&self) -> &'a V {
        self.qeds.origin(self.target)
    }

    pub fn destination(&self) -> &'a V {
        self.qeds.origin(self.target.sym())
    }

    #[inline(always)]
    fn with_target(&self, target: EdgeTarget) -> Self {
        Self {
            qeds: self.qeds,
            target,
        }
    }

    #[inline(always)]
    pub fn onext(&self) -> Self {
        self.with_target(self.qeds.next(self.target))
    }

    /// Rot
    #[inline(always)]
    pub fn rot(&self) -> DualEdgeRef<'a, V> {
        DualEdgeRef {
            qeds: self.qeds,
            target: self.target.rot(),
        }
    }

    #[inline(always)]
    pub fn inv_rot(&self) -> DualEdgeRef<'a, V> {
        DualEdgeRef {
            qeds: self.qeds,
            target: self.target.inv_rot(),
        }
    }

    #[inline(always)]
    pub fn sym(&self) -> Self {
        self.with_target(self.target.sym())
    }

    #[inline(always)]
    pub fn oprev(&self) -> Self {
        self.rot().onext().rot()
    }

    #[inline(always)]
    pub fn d_next(&self) -> Self {
        self.sym().onext().sym()
    }

    #[inline(always)]
    pub fn d_prev(&self) -> Self {
        self.inv_rot().onext().inv_rot()
    }

    #[inline(always)]
    pub fn l_next(&self) -> Self {
        self.inv_rot().onext().rot()
    }

    #[inline(always)]
    pub fn l_prev(&self) -> Self {
        self.onext().sym()
    }

    #[inline(always)]
    pub fn r_next(&self) -> Self {
        self.rot().onext().inv_rot()
    }

    #[inline(always)]
    pub fn r_prev(&self) -> Self {
        self.sym().onext()
    }

    /// The edges around the left face, starting with this one.
    pub fn l_face(&self) -> Vec<Self> {
        let mut edges = vec![*self];
        let mut current = self.l_next();
        while current.target != self.target {
            edges.push(current);
            current = current.l_next();
        }
        edges
    }
}

/// A borrowed dual edge. Only used as a stepping stone in navigation.
#[derive(Debug)]
pub struct DualEdgeRef<'a, V> {
    qeds: &'a Qeds<V>,
    target: EdgeTarget,
}

impl<'a, V> Clone for DualEdgeRef<'a, V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<'a, V> Copy for DualEdgeRef<'a, V> {}

impl<'a, V> DualEdgeRef<'a, V> {
    pub fn target(&self) -> EdgeTarget {
        self.target
    }

    #[inline(always)]
    pub fn onext(&self) -> Self {
        Self {
            qeds: self.qeds,
            target: self.qeds.next(self.target),
        }
    }

    /// Rot
    #[inline(always)]
    pub fn rot(&self) -> EdgeRef<'a, V> {
        EdgeRef {
            qeds: self.qeds,
            target: self.target.rot(),
        }
    }

    #[inline(always)]
    pub fn inv_rot(&self) -> EdgeRef<'a, V> {
        EdgeRef {
            qeds: self.qeds,
            target: self.target.inv_rot(),
        }
    }

    #[inline(always)]
    pub fn sym(&self) -> Self {
        Self {
            qeds: self.qeds,
            target: self.target.sym(),
        }
    }
}

impl<V> PartialEq for EdgeRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.qeds, other.qeds) && self.target == other.target
    }
}

impl<V> Eq for EdgeRef<'_, V> {}

impl<V> PartialEq for DualEdgeRef<'_, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.qeds, other.qeds) && self.target == other.target
    }
}

impl<V> Eq for DualEdgeRef<'_, V> {}
