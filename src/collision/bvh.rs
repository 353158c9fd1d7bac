//! Bounding volume hierarchy over the swept boxes of a mesh's triangles.
//!
//! Hierarchies are rebuilt from scratch every cycle. Each leaf holds exactly
//! one triangle; internal boxes are the union of their children. Overlap
//! queries walk two hierarchies at once and hand out candidate triangle
//! pairs lazily.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{
    collision::contact::TrianglePair,
    core::{Aabb, CollisionMesh, TriangleId},
    utils::allocator::BodyId,
};

/// Flat BVH node. Leaves have no children and `count == 1`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BvhNode {
    pub bounds: Aabb,
    pub left: Option<usize>,
    pub right: Option<usize>,
    /// First leaf covered by this node.
    pub start: usize,
    /// Number of leaves covered by this node.
    pub count: usize,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }
}

/// One triangle's entry in the hierarchy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BvhLeaf {
    pub triangle: u32,
    pub face: [u32; 3],
    pub bounds: Aabb,
}

impl BvhLeaf {
    fn shares_vertex(&self, other: &BvhLeaf) -> bool {
        self.face.iter().any(|v| other.face.contains(v))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bvh {
    body: BodyId,
    nodes: Vec<BvhNode>,
    leaves: Vec<BvhLeaf>,
}

impl Bvh {
    /// Builds the hierarchy for `mesh`, inflating every swept box by `margin`.
    ///
    /// Nodes split at the median centroid along the longest axis of their
    /// box. The result depends only on the mesh contents.
    pub fn build(body: BodyId, mesh: &CollisionMesh, margin: f32) -> Self {
        let mut leaves: Vec<BvhLeaf> = mesh
            .triangles(body)
            .map(|tri| BvhLeaf {
                triangle: tri.id.index,
                face: tri.indices,
                bounds: tri.swept_bounds(margin),
            })
            .collect();

        let mut nodes = Vec::with_capacity(leaves.len().saturating_mul(2).saturating_sub(1));
        if !leaves.is_empty() {
            Self::build_recursive(&mut nodes, &mut leaves, 0);
        }

        Self { body, nodes, leaves }
    }

    fn build_recursive(nodes: &mut Vec<BvhNode>, leaves: &mut [BvhLeaf], offset: usize) -> usize {
        let bounds = leaves
            .iter()
            .fold(Aabb::empty(), |acc, leaf| acc.union(&leaf.bounds));
        let index = nodes.len();
        nodes.push(BvhNode {
            bounds,
            left: None,
            right: None,
            start: offset,
            count: leaves.len(),
        });

        if leaves.len() == 1 {
            return index;
        }

        let axis = bounds.longest_axis();
        let mid = leaves.len() / 2;
        leaves.select_nth_unstable_by(mid, |a, b| {
            a.bounds.center()[axis]
                .total_cmp(&b.bounds.center()[axis])
                .then(a.triangle.cmp(&b.triangle))
        });

        let (lower, upper) = leaves.split_at_mut(mid);
        let left = Self::build_recursive(nodes, lower, offset);
        let right = Self::build_recursive(nodes, upper, offset + mid);
        nodes[index].left = Some(left);
        nodes[index].right = Some(right);
        index
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn leaves(&self) -> &[BvhLeaf] {
        &self.leaves
    }

    pub fn root_bounds(&self) -> Option<Aabb> {
        self.nodes.first().map(|node| node.bounds)
    }

    /// Candidate triangle pairs whose boxes overlap.
    ///
    /// Querying a hierarchy against one of the same body is a self query: each
    /// unordered pair is reported once and pairs sharing a vertex are skipped.
    pub fn query_overlap<'a>(a: &'a Bvh, b: &'a Bvh) -> BvhOverlap<'a> {
        let mut stack = SmallVec::new();
        if !a.is_empty() && !b.is_empty() {
            stack.push((0, 0));
        }
        BvhOverlap {
            a,
            b,
            self_query: a.body == b.body,
            stack,
        }
    }
}

/// Lazy dual-tree traversal produced by [`Bvh::query_overlap`].
pub struct BvhOverlap<'a> {
    a: &'a Bvh,
    b: &'a Bvh,
    self_query: bool,
    stack: SmallVec<[(usize, usize); 64]>,
}

impl<'a> BvhOverlap<'a> {
    fn leaf_pair(&self, i: usize, j: usize) -> Option<TrianglePair> {
        let leaf_a = &self.a.leaves[self.a.nodes[i].start];
        let leaf_b = &self.b.leaves[self.b.nodes[j].start];

        if self.self_query && (leaf_a.triangle == leaf_b.triangle || leaf_a.shares_vertex(leaf_b)) {
            return None;
        }

        Some(TrianglePair::new(
            TriangleId::new(self.a.body, leaf_a.triangle),
            TriangleId::new(self.b.body, leaf_b.triangle),
        ))
    }
}

impl<'a> Iterator for BvhOverlap<'a> {
    type Item = TrianglePair;

    fn next(&mut self) -> Option<TrianglePair> {
        while let Some((i, j)) = self.stack.pop() {
            let node_a = &self.a.nodes[i];
            let node_b = &self.b.nodes[j];

            if self.self_query && i == j {
                // Pairs inside one subtree: both halves on their own, then across.
                if let (Some(left), Some(right)) = (node_a.left, node_a.right) {
                    self.stack.push((left, right));
                    self.stack.push((right, right));
                    self.stack.push((left, left));
                }
                continue;
            }

            if !node_a.bounds.overlaps(&node_b.bounds) {
                continue;
            }

            match (node_a.left.zip(node_a.right), node_b.left.zip(node_b.right)) {
                (None, None) => {
                    if let Some(pair) = self.leaf_pair(i, j) {
                        return Some(pair);
                    }
                }
                (None, Some((left, right))) => {
                    self.stack.push((i, right));
                    self.stack.push((i, left));
                }
                (Some((left, right)), None) => {
                    self.stack.push((right, j));
                    self.stack.push((left, j));
                }
                (Some((a_left, a_right)), Some((b_left, b_right))) => {
                    self.stack.push((a_right, b_right));
                    self.stack.push((a_right, b_left));
                    self.stack.push((a_left, b_right));
                    self.stack.push((a_left, b_left));
                }
            }
        }
        None
    }
}
