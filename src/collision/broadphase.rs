use crate::{
    collision::{bvh::Bvh, contact::MeshPair, contact::TrianglePair, registry::BodyRegistry},
    utils::allocator::{BodyArena, BodyId},
};

/// Per-body hierarchies and the candidate pairs they produce.
#[derive(Debug, Default, Clone)]
pub struct BroadPhase {
    hierarchies: BodyArena<Bvh>,
}

impl BroadPhase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the hierarchy of every body that appears in `pairs`.
    ///
    /// Boxes are swept over the step and inflated by `margin`, so every pair
    /// of triangles that could come within `margin` of each other overlaps.
    pub fn rebuild(&mut self, registry: &BodyRegistry, pairs: &[MeshPair], margin: f32, parallel: bool) {
        self.hierarchies.clear();

        let mut involved: Vec<BodyId> = pairs.iter().flat_map(|pair| [pair.a, pair.b]).collect();
        involved.sort_unstable();
        involved.dedup();

        let built = if parallel {
            Self::build_parallel(registry, &involved, margin)
        } else {
            involved
                .iter()
                .filter_map(|&id| Self::build_one(registry, id, margin))
                .collect()
        };

        for bvh in built {
            log::trace!("built bvh for {}: {} nodes", bvh.body(), bvh.node_count());
            self.hierarchies.insert(bvh.body(), bvh);
        }
    }

    fn build_one(registry: &BodyRegistry, id: BodyId, margin: f32) -> Option<Bvh> {
        registry.mesh(id).map(|mesh| Bvh::build(id, mesh, margin))
    }

    #[cfg(feature = "parallel")]
    fn build_parallel(registry: &BodyRegistry, ids: &[BodyId], margin: f32) -> Vec<Bvh> {
        use rayon::prelude::*;

        ids.par_iter()
            .filter_map(|&id| Self::build_one(registry, id, margin))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn build_parallel(registry: &BodyRegistry, ids: &[BodyId], margin: f32) -> Vec<Bvh> {
        ids.iter()
            .filter_map(|&id| Self::build_one(registry, id, margin))
            .collect()
    }

    pub fn hierarchy(&self, id: BodyId) -> Option<&Bvh> {
        self.hierarchies.get(id)
    }

    /// Candidate triangle pairs for one mesh pair, sorted ascending.
    ///
    /// Empty when either body has no hierarchy from the last rebuild.
    pub fn candidates(&self, pair: &MeshPair) -> Vec<TrianglePair> {
        let (Some(a), Some(b)) = (self.hierarchy(pair.a), self.hierarchy(pair.b)) else {
            return Vec::new();
        };
        let mut candidates: Vec<TrianglePair> = Bvh::query_overlap(a, b).collect();
        candidates.sort_unstable();
        candidates
    }

    pub fn len(&self) -> usize {
        self.hierarchies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hierarchies.is_empty()
    }

    pub fn clear(&mut self) {
        self.hierarchies.clear();
    }
}
