use smallvec::SmallVec;

use crate::{
    collision::{
        ccd::CcdParams,
        contact::{ContactManifold, ImpactInfo, TrianglePair},
        registry::BodyRegistry,
    },
    core::Triangle,
};

/// Exact swept tests between two triangles: six vertex-face and nine
/// edge-edge configurations.
pub struct NarrowPhase;

/// Narrow-phase output for the candidates of one mesh pair.
#[derive(Debug, Default, Clone)]
pub struct NarrowPhaseReport {
    pub manifolds: Vec<ContactManifold>,
    pub degenerate_pairs: usize,
}

impl NarrowPhase {
    /// Every contact configuration found between `a` and `b`.
    ///
    /// Degenerate triangles produce nothing. Impacts are listed VF (vertices
    /// of `a` first) then EE, each in corner / edge order.
    pub fn test_pair(a: &Triangle, b: &Triangle, params: &CcdParams) -> SmallVec<[ImpactInfo; 4]> {
        if Self::is_degenerate_pair(a, b, params) {
            return SmallVec::new();
        }
        Self::test_valid_pair(a, b, params)
    }

    pub fn is_degenerate_pair(a: &Triangle, b: &Triangle, params: &CcdParams) -> bool {
        a.is_degenerate(params.degenerate_epsilon) || b.is_degenerate(params.degenerate_epsilon)
    }

    fn test_valid_pair(a: &Triangle, b: &Triangle, params: &CcdParams) -> SmallVec<[ImpactInfo; 4]> {
        let mut impacts = SmallVec::new();

        for corner in 0..3 {
            if let Some(hit) = a.vertex_face(corner, b, params) {
                impacts.push(ImpactInfo::vertex_face(a, corner, b, &hit));
            }
        }
        for corner in 0..3 {
            if let Some(hit) = b.vertex_face(corner, a, params) {
                impacts.push(ImpactInfo::vertex_face(b, corner, a, &hit));
            }
        }

        for edge_a in 0..3 {
            for edge_b in 0..3 {
                if let Some(hit) = a.edge_edge(edge_a, b, edge_b, params) {
                    impacts.push(ImpactInfo::edge_edge(a, edge_a, b, edge_b, &hit));
                }
            }
        }

        impacts
    }

    /// Tests each candidate against the registered geometry.
    ///
    /// Output order follows `candidates` whether or not the work is spread
    /// over the rayon pool.
    pub fn run(
        candidates: &[TrianglePair],
        registry: &BodyRegistry,
        params: &CcdParams,
        parallel: bool,
    ) -> NarrowPhaseReport {
        let outcomes: Vec<PairOutcome> = if parallel {
            Self::run_parallel(candidates, registry, params)
        } else {
            candidates
                .iter()
                .map(|pair| Self::test_candidate(pair, registry, params))
                .collect()
        };

        let mut report = NarrowPhaseReport::default();
        for outcome in outcomes {
            match outcome {
                PairOutcome::Contact(manifold) => report.manifolds.push(manifold),
                PairOutcome::Degenerate => report.degenerate_pairs += 1,
                PairOutcome::Separated => {}
            }
        }
        report
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(
        candidates: &[TrianglePair],
        registry: &BodyRegistry,
        params: &CcdParams,
    ) -> Vec<PairOutcome> {
        use rayon::prelude::*;

        candidates
            .par_iter()
            .map(|pair| Self::test_candidate(pair, registry, params))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_parallel(
        candidates: &[TrianglePair],
        registry: &BodyRegistry,
        params: &CcdParams,
    ) -> Vec<PairOutcome> {
        candidates
            .iter()
            .map(|pair| Self::test_candidate(pair, registry, params))
            .collect()
    }

    fn test_candidate(pair: &TrianglePair, registry: &BodyRegistry, params: &CcdParams) -> PairOutcome {
        let (Some(a), Some(b)) = (registry.triangle(pair.a), registry.triangle(pair.b)) else {
            return PairOutcome::Separated;
        };

        if Self::is_degenerate_pair(&a, &b, params) {
            log::debug!("skipping degenerate triangle pair {} / {}", pair.a, pair.b);
            return PairOutcome::Degenerate;
        }

        let impacts = Self::test_valid_pair(&a, &b, params);
        if impacts.is_empty() {
            PairOutcome::Separated
        } else {
            PairOutcome::Contact(ContactManifold {
                pair: *pair,
                impacts,
            })
        }
    }
}

enum PairOutcome {
    Contact(ContactManifold),
    Degenerate,
    Separated,
}
