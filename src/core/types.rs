use std::fmt;

use serde::{Deserialize, Serialize};

use crate::utils::allocator::BodyId;

/// Identity of a triangle: owning body plus index into its index buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TriangleId {
    pub body: BodyId,
    pub index: u32,
}

impl TriangleId {
    pub fn new(body: BodyId, index: u32) -> Self {
        Self { body, index }
    }
}

impl fmt::Display for TriangleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/tri#{}", self.body, self.index)
    }
}

/// Which primitive pairing produced an impact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContactKind {
    VertexFace,
    EdgeEdge,
}

impl ContactKind {
    /// Integer tag used by solvers that expect `0 = VF, 1 = EE`.
    pub fn as_tag(self) -> i32 {
        match self {
            ContactKind::VertexFace => 0,
            ContactKind::EdgeEdge => 1,
        }
    }
}
