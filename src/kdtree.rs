//! A 2D kd-tree over inserted vertices. Points closer than the tolerance to an
//! existing node are not inserted again; the existing node is reported instead
//! so the caller can merge into it.
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use crate::point::*;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct KdNode<T> {
    pub point: Point,
    pub value: T,
    /// How many inserts landed on this node.
    pub count: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// The outcome of [`KdTree::insert`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KdInsert {
    /// The node holding the point, new or existing.
    pub node: usize,
    /// True when the point matched an existing node within tolerance.
    pub repeated: bool,
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct KdTree<T> {
    nodes: Vec<KdNode<T>>,
    root: Option<usize>,
    tolerance: f64,
}

impl<T> KdTree<T> {
    pub fn new(tolerance: f64) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            tolerance: tolerance.max(0.0),
        }
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: usize) -> &KdNode<T> {
        &self.nodes[id]
    }

    /// Insert `point` unless an existing node is within tolerance of it, in
    /// which case that node's count is bumped and `value` is dropped.
    pub fn insert(&mut self, point: Point, value: T) -> KdInsert {
        if self.tolerance > 0.0 {
            if let Some(existing) = self.find(point) {
                self.nodes[existing].count += 1;
                return KdInsert {
                    node: existing,
                    repeated: true,
                };
            }
        }
        self.insert_exact(point, value)
    }

    fn insert_exact(&mut self, point: Point, value: T) -> KdInsert {
        let new_id = self.nodes.len();
        let mut current = match self.root {
            Some(root) => root,
            None => {
                self.root = Some(new_id);
                self.nodes.push(KdNode::leaf(point, value));
                return KdInsert {
                    node: new_id,
                    repeated: false,
                };
            }
        };
        let mut depth = 0;
        loop {
            let node = &mut self.nodes[current];
            if node.point.distance(point) <= self.tolerance {
                node.count += 1;
                return KdInsert {
                    node: current,
                    repeated: true,
                };
            }
            let go_left = axis_value(point, depth) < axis_value(node.point, depth);
            let child = if go_left { node.left } else { node.right };
            match child {
                Some(child) => current = child,
                None => {
                    if go_left {
                        node.left = Some(new_id);
                    } else {
                        node.right = Some(new_id);
                    }
                    self.nodes.push(KdNode::leaf(point, value));
                    return KdInsert {
                        node: new_id,
                        repeated: false,
                    };
                }
            }
            depth += 1;
        }
    }

    /// The node nearest to `point` among those within tolerance.
    pub fn find(&self, point: Point) -> Option<usize> {
        let envelope = BoundingBox::around(point, self.tolerance);
        let mut best: Option<(usize, f64)> = None;
        self.visit(&envelope, |id, node| {
            let d = node.point.distance(point);
            if d <= self.tolerance && best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((id, d));
            }
        });
        best.map(|(id, _)| id)
    }

    /// Ids of all nodes inside `envelope` (boundary included).
    pub fn query(&self, envelope: &BoundingBox) -> Vec<usize> {
        let mut found = Vec::new();
        self.visit(envelope, |id, _| found.push(id));
        found
    }

    fn visit<F: FnMut(usize, &KdNode<T>)>(&self, envelope: &BoundingBox, mut f: F) {
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push((root, 0_usize));
        }
        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            if envelope.contains(node.point) {
                f(id, node);
            }
            let split = axis_value(node.point, depth);
            if let Some(left) = node.left {
                if axis_value(envelope.min, depth) < split {
                    stack.push((left, depth + 1));
                }
            }
            if let Some(right) = node.right {
                if axis_value(envelope.max, depth) >= split {
                    stack.push((right, depth + 1));
                }
            }
        }
    }
}

impl<T> KdNode<T> {
    fn leaf(point: Point, value: T) -> Self {
        Self {
            point,
            value,
            count: 1,
            left: None,
            right: None,
        }
    }
}

fn axis_value(p: Point, depth: usize) -> f64 {
    if depth % 2 == 0 {
        p.x
    } else {
        p.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn exact_duplicates_repeat() {
        let mut tree = KdTree::new(0.0);
        let a = tree.insert(Point::new(1.0, 1.0), 'a');
        let b = tree.insert(Point::new(2.0, 1.0), 'b');
        let again = tree.insert(Point::new(1.0, 1.0), 'c');
        assert!(!a.repeated);
        assert!(!b.repeated);
        assert!(again.repeated);
        assert_eq!(again.node, a.node);
        assert_eq!(tree.node(a.node).value, 'a');
        assert_eq!(tree.node(a.node).count, 2);
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn tolerance_picks_nearest() {
        let mut tree = KdTree::new(0.5);
        let far = tree.insert(Point::new(0.0, 0.0), 0);
        let near = tree.insert(Point::new(0.8, 0.0), 1);
        assert!(!near.repeated);
        let hit = tree.insert(Point::new(0.45, 0.0), 2);
        assert!(hit.repeated);
        assert_eq!(hit.node, near.node);
        let miss = tree.insert(Point::new(0.0, 0.6), 3);
        assert!(!miss.repeated);
        assert_ne!(miss.node, far.node);
        assert_eq!(tree.node(miss.node).value, 3);
    }

    #[test]
    fn find_does_not_insert() {
        let mut tree = KdTree::new(0.25);
        assert_eq!(tree.find(Point::new(1.0, 1.0)), None);
        let a = tree.insert(Point::new(1.0, 1.0), 'a');
        assert_eq!(tree.find(Point::new(1.2, 1.0)), Some(a.node));
        assert_eq!(tree.find(Point::new(1.3, 1.0)), None);
        assert_eq!(tree.node(a.node).count, 1);
        assert_eq!(tree.len(), 1);

        let mut exact = KdTree::new(0.0);
        let b = exact.insert(Point::new(2.0, 3.0), 'b');
        assert_eq!(exact.find(Point::new(2.0, 3.0)), Some(b.node));
        assert_eq!(exact.find(Point::new(2.0, 3.0000001)), None);
    }

    #[test]
    fn query_includes_boundary() {
        let mut tree = KdTree::new(0.0);
        for i in 0..10 {
            tree.insert(Point::new(f64::from(i), f64::from(i % 3)), i);
        }
        let mut found: Vec<i32> = tree
            .query(&BoundingBox::new(Point::new(2.0, 0.0), Point::new(5.0, 1.0)))
            .into_iter()
            .map(|id| tree.node(id).value)
            .collect();
        found.sort_unstable();
        assert_eq!(found, vec![3, 4]);
    }

    #[quickcheck]
    fn query_matches_brute_force(points: Vec<Point>, a: Point, b: Point) -> bool {
        let mut tree = KdTree::new(0.0);
        for (i, p) in points.iter().enumerate() {
            tree.insert(*p, i);
        }
        let envelope = BoundingBox::new(a, b);
        let mut found: Vec<Point> = tree
            .query(&envelope)
            .into_iter()
            .map(|id| tree.node(id).point)
            .collect();
        let mut expected: Vec<Point> = points
            .iter()
            .copied()
            .filter(|p| envelope.contains(*p))
            .collect();
        expected.sort_by(|p, q| p.lex_cmp(q));
        expected.dedup();
        found.sort_by(|p, q| p.lex_cmp(q));
        found == expected
    }
}
