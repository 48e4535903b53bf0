//! Mesh-local acceleration structure interface
//!
//! Every collision part owns one [`CollisionServer`]: the structure that
//! stores the part's triangles ("prisms") in the mesh's local space and can
//! cast a segment against them. The collision core only talks to it through
//! this trait; how the triangles are stored and traversed is up to the
//! implementation (see [`TriangleMeshServer`](super::mesh::TriangleMeshServer)
//! for the reference one).

use std::collections::BTreeMap;

use crate::foundation::math::Vec3;

/// Opaque reference to a prism as returned by [`CollisionServer::check_arrow`]
///
/// Turn it into a stable triangle index with [`CollisionServer::to_index`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrismRef(pub u32);

/// One candidate from an arrow cast
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHit {
    /// The prism that was hit
    pub prism: PrismRef,
    /// Local-space segment parameter of the hit, in units of the cast direction
    pub distance: f32,
}

/// Reusable result buffer for [`CollisionServer::check_arrow`]
#[derive(Debug, Clone, Default)]
pub struct CheckArrowResult {
    hits: Vec<ArrowHit>,
}

impl CheckArrowResult {
    /// Create an empty result buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop all candidates, keeping the allocation
    pub fn reset(&mut self) {
        self.hits.clear();
    }

    /// Append a candidate
    pub fn push(&mut self, prism: PrismRef, distance: f32) {
        self.hits.push(ArrowHit { prism, distance });
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// True when the cast found nothing
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Candidate by position
    pub fn get(&self, index: usize) -> Option<ArrowHit> {
        self.hits.get(index).copied()
    }

    /// All candidates in the order the server produced them
    pub fn hits(&self) -> &[ArrowHit] {
        &self.hits
    }
}

/// Per-triangle attribute record (floor code, wall code, sound code, ...)
///
/// Decoded from the optional attribute companion data of a mesh. Field names
/// are whatever the decoder produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRecord {
    fields: BTreeMap<String, i32>,
}

impl AttributeRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: i32) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<i32> {
        self.fields.get(name).copied()
    }
}

/// Mesh-local acceleration structure owned by a collision part
pub trait CollisionServer {
    /// Distance from the local origin to the farthest vertex.
    ///
    /// Called once when a part is created; the part caches the result.
    fn calc_farthest_vertex_distance(&self) -> f32;

    /// Number of prisms (triangles) in the mesh
    fn prism_count(&self) -> usize;

    /// Local-space position of `vertex` (0, 1 or 2) of prism `prism_idx`
    fn pos(&self, prism_idx: usize, vertex: usize) -> Vec3;

    /// Local-space face normal of prism `prism_idx`
    fn face_normal(&self, prism_idx: usize) -> Vec3;

    /// Cast the local-space segment `[origin, origin + dir]` against the mesh.
    ///
    /// Writes at most `max_hits` candidates into `result` (which the caller
    /// has reset) in the order they should be consumed, and returns whether
    /// anything was found.
    fn check_arrow(&self, result: &mut CheckArrowResult, max_hits: usize, origin: &Vec3, dir: &Vec3) -> bool;

    /// Stable triangle index for a prism reference produced by `check_arrow`
    fn to_index(&self, prism: PrismRef) -> usize;

    /// Attribute record of prism `prism_idx`, if the mesh carries attributes
    fn attributes(&self, _prism_idx: usize) -> Option<&AttributeRecord> {
        None
    }
}
