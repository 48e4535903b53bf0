//! Optional filters for line queries
//!
//! Queries take `Option<&dyn TriangleFilter>` / `Option<&dyn CollisionPartsFilter>`;
//! passing `None` means "accept everything". Plain closures work as filters.

use super::parts::CollisionParts;
use super::triangle::{ActorId, Triangle};

/// Rejects individual triangles from query results
pub trait TriangleFilter {
    /// Return true to drop `triangle`
    fn is_invalid_triangle(&self, triangle: &Triangle) -> bool;
}

impl<F> TriangleFilter for F
where
    F: Fn(&Triangle) -> bool,
{
    fn is_invalid_triangle(&self, triangle: &Triangle) -> bool {
        self(triangle)
    }
}

/// Rejects whole collision parts before they are tested
pub trait CollisionPartsFilter {
    /// Return true to skip `parts`
    fn is_invalid_parts(&self, parts: &CollisionParts) -> bool;
}

impl<F> CollisionPartsFilter for F
where
    F: Fn(&CollisionParts) -> bool,
{
    fn is_invalid_parts(&self, parts: &CollisionParts) -> bool {
        self(parts)
    }
}

/// Skips every part whose sensor belongs to one actor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionPartsFilterActor {
    /// The excluded actor
    pub actor: ActorId,
}

impl CollisionPartsFilterActor {
    /// Exclude the parts of `actor`
    pub fn new(actor: ActorId) -> Self {
        Self { actor }
    }
}

impl CollisionPartsFilter for CollisionPartsFilterActor {
    fn is_invalid_parts(&self, parts: &CollisionParts) -> bool {
        parts.hit_sensor().actor == self.actor
    }
}
