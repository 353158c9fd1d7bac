use std::time::Duration;

use serde::Serialize;

/// Timing and counters gathered during one detection cycle.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct CollisionStats {
    pub bvh_time: Duration,
    pub broad_phase_time: Duration,
    pub narrow_phase_time: Duration,
    pub total_time: Duration,

    pub body_count: usize,
    pub mesh_pair_count: usize,
    pub candidate_count: usize,
    pub contact_pair_count: usize,
    pub impact_count: usize,
    /// Triangle pairs skipped because one side had (near) zero area.
    pub degenerate_pairs: usize,
}

impl CollisionStats {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn report(&self) {
        let total_us = self.total_time.as_micros() as f32;
        if total_us < 1.0 {
            return;
        }

        log::info!(
            "collide: {} bodies, {} mesh pairs, {} candidates, {} contact pairs, {} impacts, {} degenerate",
            self.body_count,
            self.mesh_pair_count,
            self.candidate_count,
            self.contact_pair_count,
            self.impact_count,
            self.degenerate_pairs
        );
        log::info!(
            "  total {:.2} ms | bvh {:.1}% | broad {:.1}% | narrow {:.1}%",
            self.total_time.as_secs_f32() * 1000.0,
            (self.bvh_time.as_micros() as f32 / total_us) * 100.0,
            (self.broad_phase_time.as_micros() as f32 / total_us) * 100.0,
            (self.narrow_phase_time.as_micros() as f32 / total_us) * 100.0
        );
    }
}
