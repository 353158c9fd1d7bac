use glam::{DVec3, Vec3};

use super::{mesh::Aabb, types::TriangleId};
use crate::{
    collision::ccd::{self, CcdHit, CcdParams},
    utils::math::{double_area, lerp_position},
};

/// Triangle snapshot taken from a [`super::CollisionMesh`] for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub id: TriangleId,
    /// Vertex indices into the owning mesh.
    pub indices: [u32; 3],
    pub current: [Vec3; 3],
    pub previous: [Vec3; 3],
}

impl Triangle {
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.current)
    }

    pub fn previous_bounds(&self) -> Aabb {
        Aabb::from_points(&self.previous)
    }

    /// Box covering the triangle over the whole step, grown by `margin`.
    pub fn swept_bounds(&self, margin: f32) -> Aabb {
        self.bounds().union(&self.previous_bounds()).inflated(margin)
    }

    pub fn area(&self) -> f32 {
        0.5 * double_area(self.current[0], self.current[1], self.current[2])
    }

    pub fn previous_area(&self) -> f32 {
        0.5 * double_area(self.previous[0], self.previous[1], self.previous[2])
    }

    /// Zero area at either end of the step.
    pub fn is_degenerate(&self, epsilon: f32) -> bool {
        double_area(self.current[0], self.current[1], self.current[2]) <= epsilon
            || double_area(self.previous[0], self.previous[1], self.previous[2]) <= epsilon
    }

    /// True when both triangles belong to the same body and share a mesh vertex.
    pub fn shares_vertex(&self, other: &Triangle) -> bool {
        self.id.body == other.id.body && self.indices.iter().any(|i| other.indices.contains(i))
    }

    pub fn centroid(&self) -> Vec3 {
        (self.current[0] + self.current[1] + self.current[2]) / 3.0
    }

    /// Position of corner `corner` at normalised step time `t`.
    pub fn vertex_at(&self, corner: usize, t: f64) -> DVec3 {
        lerp_position(self.previous[corner], self.current[corner], t)
    }

    /// Swept test of corner `corner` of `self` against the face of `face`.
    pub fn vertex_face(&self, corner: usize, face: &Triangle, params: &CcdParams) -> Option<CcdHit> {
        ccd::vertex_face(
            [self.previous[corner], self.current[corner]],
            face.previous,
            face.current,
            params,
        )
    }

    /// Swept test of edge `edge` of `self` against edge `other_edge` of `other`.
    /// Edge `k` runs from corner `k` to corner `(k + 1) % 3`.
    pub fn edge_edge(
        &self,
        edge: usize,
        other: &Triangle,
        other_edge: usize,
        params: &CcdParams,
    ) -> Option<CcdHit> {
        let (a0, a1) = (edge, (edge + 1) % 3);
        let (b0, b1) = (other_edge, (other_edge + 1) % 3);
        ccd::edge_edge(
            [self.previous[a0], self.previous[a1]],
            [self.current[a0], self.current[a1]],
            [other.previous[b0], other.previous[b1]],
            [other.current[b0], other.current[b1]],
            params,
        )
    }
}
