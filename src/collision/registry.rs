//! Registered bodies and the mesh pairs derived from them.

use crate::{
    collision::contact::MeshPair,
    config::MAX_BODY_ID,
    core::{CollisionMesh, MeshSubmission, Triangle, TriangleId},
    error::{CollisionError, Result},
    utils::allocator::{BodyArena, BodyId},
};

/// A registered body: its id and the mesh it exclusively owns.
#[derive(Debug, Clone)]
pub struct BodyRecord {
    pub id: BodyId,
    pub mesh: CollisionMesh,
}

impl BodyRecord {
    pub fn self_collision(&self) -> bool {
        self.mesh.self_collision()
    }
}

/// Owns every registered body, keyed by [`BodyId`].
#[derive(Debug, Default, Clone)]
pub struct BodyRegistry {
    bodies: BodyArena<BodyRecord>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the body on first sight, otherwise refreshes it in place.
    ///
    /// A rejected submission leaves any existing record untouched.
    pub fn register_or_update(&mut self, id: BodyId, submission: MeshSubmission) -> Result<()> {
        let MeshSubmission {
            indices,
            vertices,
            previous_vertices,
            self_collision,
        } = submission;

        if id.0 > MAX_BODY_ID {
            return Err(CollisionError::BodyIdOutOfRange {
                body: id,
                max: MAX_BODY_ID,
            });
        }

        if let Some(record) = self.bodies.get_mut(id) {
            record.mesh.update(id, indices, vertices, previous_vertices)?;
            record.mesh.set_self_collision(self_collision);
            log::trace!(
                "updated {id}: {} vertices, {} triangles",
                record.mesh.vertex_count(),
                record.mesh.triangle_count()
            );
            return Ok(());
        }

        let indices = indices
            .ok_or_else(|| CollisionError::topology(id, "first submission must include triangle indices"))?;
        let mesh = CollisionMesh::new(id, indices, vertices, previous_vertices, self_collision)?;
        log::debug!(
            "registered {id}: {} vertices, {} triangles, self collision {}",
            mesh.vertex_count(),
            mesh.triangle_count(),
            self_collision
        );
        self.bodies.insert(id, BodyRecord { id, mesh });
        Ok(())
    }

    /// Deregisters a body. Returns whether it existed.
    pub fn remove(&mut self, id: BodyId) -> bool {
        let removed = self.bodies.remove(id).is_some();
        if removed {
            log::debug!("removed {id}");
        }
        removed
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Mesh pairs to test this cycle.
    ///
    /// Every unordered pair of distinct bodies in ascending `(a, b)` order,
    /// followed by one self pair per self-collision body in ascending order.
    pub fn derive_pairs(&self) -> Vec<MeshPair> {
        let ids: Vec<BodyId> = self.bodies.ids().collect();
        let self_pairs = self
            .bodies
            .iter()
            .filter(|(_, record)| record.self_collision())
            .map(|(id, _)| MeshPair::self_pair(id));

        let mut pairs = Vec::with_capacity(ids.len() * ids.len().saturating_sub(1) / 2 + ids.len());
        for (i, &a) in ids.iter().enumerate() {
            for &b in &ids[i + 1..] {
                pairs.push(MeshPair::new(a, b));
            }
        }
        pairs.extend(self_pairs);
        pairs
    }

    pub fn get(&self, id: BodyId) -> Option<&BodyRecord> {
        self.bodies.get(id)
    }

    pub fn mesh(&self, id: BodyId) -> Option<&CollisionMesh> {
        self.bodies.get(id).map(|record| &record.mesh)
    }

    /// Snapshot of a single triangle for the narrow phase.
    pub fn triangle(&self, id: TriangleId) -> Option<Triangle> {
        self.mesh(id.body)?.triangle(id.body, id.index as usize)
    }

    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.ids()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyRecord> + '_ {
        self.bodies.iter().map(|(_, record)| record)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
