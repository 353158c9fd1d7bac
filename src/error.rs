//! Error types for body registration.

use thiserror::Error;

use crate::utils::allocator::BodyId;

/// Errors surfaced to the caller of a registration call.
///
/// Geometry problems found during detection (zero-area triangles) are not
/// errors; they are skipped and counted in [`crate::CollisionStats`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollisionError {
    /// Index buffer or vertex buffers do not describe a valid mesh.
    #[error("invalid topology for {body}: {details}")]
    InvalidTopology {
        /// Body whose submission was rejected.
        body: BodyId,
        /// What was wrong with the submission.
        details: String,
    },
    /// Body id above [`crate::config::MAX_BODY_ID`].
    #[error("{body} exceeds the largest accepted id {max}")]
    BodyIdOutOfRange { body: BodyId, max: u32 },
}

impl CollisionError {
    pub(crate) fn topology(body: BodyId, details: impl Into<String>) -> Self {
        Self::InvalidTopology {
            body,
            details: details.into(),
        }
    }
}

/// Result type for registration calls.
pub type Result<T> = std::result::Result<T, CollisionError>;
