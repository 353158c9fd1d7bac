use std::time::{Duration, Instant};

use crate::{
    collision::{
        broadphase::BroadPhase,
        ccd::CcdParams,
        contact::{ContactPairs, ImpactInfo, MeshPair},
        narrowphase::NarrowPhase,
        registry::BodyRegistry,
    },
    config::CollisionConfig,
    core::MeshSubmission,
    error::Result,
    utils::{allocator::BodyId, logging::ScopedTimer, profiling::CollisionStats},
};

/// Owns the registered meshes and the results of the last detection cycle.
///
/// Several worlds can coexist; nothing is shared between them.
#[derive(Debug, Default, Clone)]
pub struct CollisionWorld {
    config: CollisionConfig,
    registry: BodyRegistry,
    broadphase: BroadPhase,
    contact_pairs: Vec<ContactPairs>,
    impacts: Vec<ImpactInfo>,
    ccd_resolution: bool,
    stats: CollisionStats,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CollisionConfig) -> Self {
        let mut world = Self {
            config,
            ..Self::default()
        };
        world.set_thickness(config.thickness);
        world
    }

    pub fn config(&self) -> &CollisionConfig {
        &self.config
    }

    /// Thickness used by [`collide_default`](Self::collide_default).
    pub fn set_thickness(&mut self, thickness: f32) {
        self.config.thickness = Self::sanitize_thickness(thickness);
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.config.parallel = enabled;
    }

    /// Whether cycles actually fan out over the rayon pool.
    pub fn parallel_enabled(&self) -> bool {
        self.config.parallel && cfg!(feature = "parallel")
    }

    pub fn register_or_update(&mut self, id: BodyId, submission: MeshSubmission) -> Result<()> {
        self.registry.register_or_update(id, submission)
    }

    pub fn remove_body(&mut self, id: BodyId) -> bool {
        self.registry.remove(id)
    }

    /// Drops every body together with the last cycle's results.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.broadphase.clear();
        self.reset_results();
        self.stats.reset();
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn broadphase(&self) -> &BroadPhase {
        &self.broadphase
    }

    /// Runs a cycle with the thickness stored in the config.
    pub fn collide_default(&mut self) {
        self.collide(self.config.thickness);
    }

    /// Runs one full detection cycle over the registered bodies.
    ///
    /// Previous results are replaced wholesale. Output order depends only on
    /// body ids and mesh contents, never on scheduling.
    pub fn collide(&mut self, thickness: f32) {
        let cycle_start = Instant::now();
        let thickness = Self::sanitize_thickness(thickness);
        let params = CcdParams::new(
            thickness,
            self.config.root_tolerance,
            self.config.degenerate_epsilon,
        );
        let parallel = self.parallel_enabled();

        self.reset_results();
        let mut stats = CollisionStats {
            body_count: self.registry.len(),
            ..CollisionStats::default()
        };

        let pairs = self.registry.derive_pairs();
        stats.mesh_pair_count = pairs.len();

        {
            let _timer = ScopedTimer::accumulate("collide::bvh", &mut stats.bvh_time);
            self.broadphase
                .rebuild(&self.registry, &pairs, thickness, parallel);
        }

        let results = {
            let _timer = ScopedTimer::new("collide::pairs");
            let job = PairJob {
                registry: &self.registry,
                broadphase: &self.broadphase,
                params: &params,
                parallel,
            };
            if parallel {
                job.run_parallel(&pairs)
            } else {
                pairs.iter().map(|pair| job.run(pair)).collect()
            }
        };

        for result in results {
            stats.broad_phase_time += result.broad_time;
            stats.narrow_phase_time += result.narrow_time;
            stats.candidate_count += result.candidates;
            stats.degenerate_pairs += result.degenerate_pairs;
            stats.contact_pair_count += result.contacts.triangle_pairs.len();
            stats.impact_count += result.impacts.len();

            self.impacts.extend(result.impacts);
            self.contact_pairs.push(result.contacts);
        }

        self.ccd_resolution = self.impacts.iter().any(|impact| impact.ccd_resolved);
        stats.total_time = cycle_start.elapsed();
        self.stats = stats;

        log::debug!(
            "collide(thickness = {thickness}): {} candidates, {} contact pairs, {} impacts, ccd resolved {}",
            self.stats.candidate_count,
            self.stats.contact_pair_count,
            self.stats.impact_count,
            self.ccd_resolution
        );
    }

    /// Contact pairs of the last cycle, one entry per mesh pair in derived order.
    pub fn contact_pairs(&self) -> &[ContactPairs] {
        &self.contact_pairs
    }

    pub fn impact_info(&self) -> &[ImpactInfo] {
        &self.impacts
    }

    pub fn ccd_resolution(&self) -> bool {
        self.ccd_resolution
    }

    /// [`CollisionWorld::ccd_resolution`] as the `0 / 1` integer signal.
    pub fn ccd_resolution_flag(&self) -> i32 {
        i32::from(self.ccd_resolution)
    }

    /// Triangle pairs in contact across every mesh pair.
    pub fn num_contacts(&self) -> usize {
        self.contact_pairs
            .iter()
            .map(|pairs| pairs.triangle_pairs.len())
            .sum()
    }

    pub fn stats(&self) -> &CollisionStats {
        &self.stats
    }

    fn reset_results(&mut self) {
        self.contact_pairs.clear();
        self.impacts.clear();
        self.ccd_resolution = false;
    }

    fn sanitize_thickness(thickness: f32) -> f32 {
        if thickness.is_finite() && thickness >= 0.0 {
            return thickness;
        }
        log::warn!("thickness {thickness} is not a non-negative number, using 0");
        0.0
    }
}

/// Shared read-only view used by every mesh pair of a cycle.
struct PairJob<'a> {
    registry: &'a BodyRegistry,
    broadphase: &'a BroadPhase,
    params: &'a CcdParams,
    parallel: bool,
}

struct PairResult {
    contacts: ContactPairs,
    impacts: Vec<ImpactInfo>,
    candidates: usize,
    degenerate_pairs: usize,
    broad_time: Duration,
    narrow_time: Duration,
}

impl<'a> PairJob<'a> {
    fn run(&self, pair: &MeshPair) -> PairResult {
        let mut broad_time = Duration::ZERO;
        let mut narrow_time = Duration::ZERO;

        let candidates = {
            let _timer = ScopedTimer::accumulate("collide::broad", &mut broad_time);
            self.broadphase.candidates(pair)
        };
        let report = {
            let _timer = ScopedTimer::accumulate("collide::narrow", &mut narrow_time);
            NarrowPhase::run(&candidates, self.registry, self.params, self.parallel)
        };

        let triangle_pairs = report.manifolds.iter().map(|m| m.pair).collect();
        let impacts = report
            .manifolds
            .into_iter()
            .flat_map(|m| m.impacts)
            .collect();

        PairResult {
            contacts: ContactPairs {
                mesh_pair: *pair,
                triangle_pairs,
            },
            impacts,
            candidates: candidates.len(),
            degenerate_pairs: report.degenerate_pairs,
            broad_time,
            narrow_time,
        }
    }

    #[cfg(feature = "parallel")]
    fn run_parallel(&self, pairs: &[MeshPair]) -> Vec<PairResult> {
        use rayon::prelude::*;

        pairs.par_iter().map(|pair| self.run(pair)).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_parallel(&self, pairs: &[MeshPair]) -> Vec<PairResult> {
        pairs.iter().map(|pair| self.run(pair)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn unit_triangle(offset: Vec3) -> MeshSubmission {
        MeshSubmission::new(vec![offset, offset + Vec3::X, offset + Vec3::Y]).with_indices(vec![[0, 1, 2]])
    }

    #[test]
    fn queries_are_empty_before_collide() {
        let mut world = CollisionWorld::new();
        world
            .register_or_update(BodyId(0), unit_triangle(Vec3::ZERO))
            .unwrap();
        assert!(world.contact_pairs().is_empty());
        assert!(world.impact_info().is_empty());
        assert!(!world.ccd_resolution());
        assert_eq!(world.ccd_resolution_flag(), 0);
        assert_eq!(world.num_contacts(), 0);
    }

    #[test]
    fn negative_thickness_is_clamped() {
        let mut world = CollisionWorld::new();
        world.set_thickness(-1.0);
        assert_eq!(world.config().thickness, 0.0);

        world
            .register_or_update(BodyId(0), unit_triangle(Vec3::ZERO))
            .unwrap();
        world
            .register_or_update(BodyId(1), unit_triangle(Vec3::new(0.0, 0.0, 0.5)))
            .unwrap();
        world.collide(-0.5);
        assert!(world.impact_info().is_empty());
        assert_eq!(world.contact_pairs().len(), 1);
    }

    #[test]
    fn collide_default_uses_configured_thickness() {
        let mut world = CollisionWorld::new();
        world
            .register_or_update(BodyId(0), unit_triangle(Vec3::ZERO))
            .unwrap();
        world
            .register_or_update(BodyId(1), unit_triangle(Vec3::new(0.0, 0.0, 0.05)))
            .unwrap();

        world.collide_default();
        assert_eq!(world.num_contacts(), 0);

        world.set_thickness(0.1);
        world.collide_default();
        assert_eq!(world.num_contacts(), 1);
        assert!(world.impact_info().iter().all(|impact| impact.distance <= 0.1));
    }

    #[test]
    fn hovering_triangles_give_unresolved_contacts() {
        let mut world = CollisionWorld::new();
        world
            .register_or_update(BodyId(0), unit_triangle(Vec3::ZERO))
            .unwrap();
        world
            .register_or_update(BodyId(1), unit_triangle(Vec3::new(0.0, 0.0, 0.005)))
            .unwrap();
        world.collide(0.01);

        assert_eq!(world.num_contacts(), 1);
        assert!(!world.impact_info().is_empty());
        assert!(!world.ccd_resolution());
        assert_eq!(world.stats().mesh_pair_count, 1);
        assert_eq!(world.stats().candidate_count, 1);
    }

    #[test]
    fn clear_discards_results() {
        let mut world = CollisionWorld::new();
        world
            .register_or_update(BodyId(0), unit_triangle(Vec3::ZERO))
            .unwrap();
        world
            .register_or_update(BodyId(1), unit_triangle(Vec3::new(0.0, 0.0, 0.005)))
            .unwrap();
        world.collide(0.01);
        assert!(world.num_contacts() > 0);

        world.clear();
        assert!(world.registry().is_empty());
        assert!(world.contact_pairs().is_empty());
        assert!(world.impact_info().is_empty());

        world.collide(0.01);
        assert!(world.contact_pairs().is_empty());
    }
}
