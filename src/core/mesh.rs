use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::{triangle::Triangle, types::TriangleId};
use crate::{
    error::{CollisionError, Result},
    utils::allocator::BodyId,
};

/// Axis-aligned bounding box used for triangle bounds and BVH nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Inverted box; `extend`/`union` with anything yields that thing.
    pub fn empty() -> Self {
        Self {
            min: Vec3::splat(f32::INFINITY),
            max: Vec3::splat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    pub fn extend(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn from_points(points: &[Vec3]) -> Self {
        let mut bounds = Self::empty();
        for &p in points {
            bounds.extend(p);
        }
        bounds
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Grows the box by `margin` on every side.
    pub fn inflated(&self, margin: f32) -> Aabb {
        Aabb {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Closed-interval overlap test; touching boxes overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Index of the longest side (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let size = self.max - self.min;
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }
}

/// Indexed triangle mesh with paired current / previous positions.
///
/// Invariants: both position buffers have the same length and every index
/// is below that length. They are checked on construction and on every
/// update, so a live mesh always satisfies them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionMesh {
    vertices: Vec<Vec3>,
    previous_vertices: Vec<Vec3>,
    indices: Vec<[u32; 3]>,
    self_collision: bool,
}

impl CollisionMesh {
    /// Builds a mesh for a first submission. Without `previous_vertices`
    /// the mesh starts at rest (previous == current).
    pub fn new(
        body: BodyId,
        indices: Vec<[u32; 3]>,
        vertices: Vec<Vec3>,
        previous_vertices: Option<Vec<Vec3>>,
        self_collision: bool,
    ) -> Result<Self> {
        let previous_vertices = previous_vertices.unwrap_or_else(|| vertices.clone());
        validate(body, &indices, &vertices, &previous_vertices)?;
        Ok(Self {
            vertices,
            previous_vertices,
            indices,
            self_collision,
        })
    }

    /// Refreshes positions in place.
    ///
    /// Without explicit `previous_vertices` the old current positions become
    /// the previous ones. `indices` replaces the topology only when given.
    /// Nothing changes if validation fails.
    pub fn update(
        &mut self,
        body: BodyId,
        indices: Option<Vec<[u32; 3]>>,
        vertices: Vec<Vec3>,
        previous_vertices: Option<Vec<Vec3>>,
    ) -> Result<()> {
        let previous_vertices = match previous_vertices {
            Some(previous) => previous,
            None if vertices.len() == self.vertices.len() => self.vertices.clone(),
            // New vertex count without previous positions: start at rest.
            None => vertices.clone(),
        };
        validate(
            body,
            indices.as_deref().unwrap_or(&self.indices),
            &vertices,
            &previous_vertices,
        )?;

        if let Some(indices) = indices {
            self.indices = indices;
        }
        self.vertices = vertices;
        self.previous_vertices = previous_vertices;
        Ok(())
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn previous_vertices(&self) -> &[Vec3] {
        &self.previous_vertices
    }

    pub fn indices(&self) -> &[[u32; 3]] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len()
    }

    pub fn self_collision(&self) -> bool {
        self.self_collision
    }

    pub fn set_self_collision(&mut self, enabled: bool) {
        self.self_collision = enabled;
    }

    /// Geometry primitive for triangle `index`, tagged with `body`.
    pub fn triangle(&self, body: BodyId, index: usize) -> Option<Triangle> {
        let face = *self.indices.get(index)?;
        let [a, b, c] = face.map(|i| i as usize);
        Some(Triangle {
            id: TriangleId::new(body, index as u32),
            indices: face,
            current: [self.vertices[a], self.vertices[b], self.vertices[c]],
            previous: [
                self.previous_vertices[a],
                self.previous_vertices[b],
                self.previous_vertices[c],
            ],
        })
    }

    pub fn triangles(&self, body: BodyId) -> impl Iterator<Item = Triangle> + '_ {
        (0..self.indices.len()).filter_map(move |index| self.triangle(body, index))
    }

    /// Swept bounds of the whole mesh over the step.
    pub fn swept_bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices).union(&Aabb::from_points(&self.previous_vertices))
    }
}

fn validate(body: BodyId, indices: &[[u32; 3]], vertices: &[Vec3], previous: &[Vec3]) -> Result<()> {
    if vertices.len() != previous.len() {
        return Err(CollisionError::topology(
            body,
            format!(
                "{} current vertices but {} previous vertices",
                vertices.len(),
                previous.len()
            ),
        ));
    }

    let vertex_count = vertices.len();
    if let Some((tri, face)) = indices
        .iter()
        .enumerate()
        .find(|(_, face)| face.iter().any(|&i| i as usize >= vertex_count))
    {
        return Err(CollisionError::topology(
            body,
            format!("triangle {tri} references {face:?} but only {vertex_count} vertices exist"),
        ));
    }

    Ok(())
}

/// Geometry submitted for a body in one cycle.
///
/// Positions are canonically `Vec3`; [`MeshSubmission::from_flat`] converts
/// packed `f32`/`u32` arrays at the boundary.
#[derive(Debug, Clone, Default)]
pub struct MeshSubmission {
    pub indices: Option<Vec<[u32; 3]>>,
    pub vertices: Vec<Vec3>,
    pub previous_vertices: Option<Vec<Vec3>>,
    pub self_collision: bool,
}

impl MeshSubmission {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self {
            vertices,
            ..Self::default()
        }
    }

    pub fn with_indices(mut self, indices: Vec<[u32; 3]>) -> Self {
        self.indices = Some(indices);
        self
    }

    pub fn with_previous(mut self, previous: Vec<Vec3>) -> Self {
        self.previous_vertices = Some(previous);
        self
    }

    pub fn self_collision(mut self, enabled: bool) -> Self {
        self.self_collision = enabled;
        self
    }

    /// Converts packed `[x0, y0, z0, x1, ...]` positions and
    /// `[a0, b0, c0, a1, ...]` indices. An empty index slice keeps the
    /// body's registered topology.
    pub fn from_flat(
        body: BodyId,
        vertices: &[f32],
        previous_vertices: Option<&[f32]>,
        indices: &[u32],
    ) -> Result<Self> {
        let vertices = unpack_positions(body, vertices)?;
        let previous_vertices = previous_vertices
            .map(|previous| unpack_positions(body, previous))
            .transpose()?;

        if indices.len() % 3 != 0 {
            return Err(CollisionError::topology(
                body,
                format!("index array length {} is not a multiple of 3", indices.len()),
            ));
        }
        let indices = (!indices.is_empty()).then(|| {
            indices
                .chunks_exact(3)
                .map(|tri| [tri[0], tri[1], tri[2]])
                .collect()
        });

        Ok(Self {
            indices,
            vertices,
            previous_vertices,
            self_collision: false,
        })
    }
}

fn unpack_positions(body: BodyId, packed: &[f32]) -> Result<Vec<Vec3>> {
    if packed.len() % 3 != 0 {
        return Err(CollisionError::topology(
            body,
            format!("position array length {} is not a multiple of 3", packed.len()),
        ));
    }
    Ok(packed.chunks_exact(3).map(Vec3::from_slice).collect())
}
