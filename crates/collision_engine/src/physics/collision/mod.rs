//! Zoned triangle-mesh collision queries
//!
//! Collision parts (mesh instances) are grouped into zones; zones belong to
//! one keeper per [`Category`]; the [`CollisionDirector`] owns the keepers
//! and every part. A line query walks zones and parts with cheap sphere tests
//! before casting against the mesh-local [`CollisionServer`].
//!
//! # Architecture
//!
//! - **Model space storage**: meshes stay in local coordinates; queries are
//!   brought into each part's space through its cached inverse world matrix
//! - **Staged transforms**: callers stage a matrix any number of times per
//!   frame; the movement pass commits it once
//! - **Handles, not references**: zones, triangles and hits name parts by
//!   [`PartHandle`](crate::foundation::collections::PartHandle)
//!
//! # Module Organization
//!
//! - [`primitives`] - bounding spheres, segment/sphere and segment/triangle tests
//! - [`server`], [`mesh`] - the mesh-local acceleration structure and a reference one
//! - [`parts`], [`zone`], [`keeper`], [`director`] - the two-level spatial index
//! - [`scene`], [`resource`] - director lifecycle and resource-based creation
//! - [`query`] - first-hit queries

pub mod primitives;
pub mod server;
pub mod mesh;
pub mod triangle;
pub mod filter;
pub mod parts;
pub mod zone;
pub mod keeper;
pub mod director;
pub mod scene;
pub mod resource;
pub mod query;
pub mod error;

#[cfg(test)]
pub(crate) mod tests;

// Re-export commonly used types
pub use primitives::{BoundingSphere, MeshTriangle, check_hit_segment_sphere, segment_sphere_push_direction};
pub use server::{AttributeRecord, CheckArrowResult, CollisionServer, PrismRef};
pub use mesh::TriangleMeshServer;
pub use triangle::{ActorId, HitInfo, HitSensor, Triangle};
pub use filter::{CollisionPartsFilter, CollisionPartsFilterActor, TriangleFilter};
pub use parts::{CollisionParts, CollisionScaleType, HostMtx};
pub use zone::{CollisionZone, ZoneBounds, ZoneId};
pub use keeper::{Category, CollisionCategorizedKeeper};
pub use director::CollisionDirector;
pub use scene::CollisionScene;
pub use resource::{
    CollisionActor, MemoryArchive, MeshDecoder, ResourceArchive,
    create_collision_parts, create_collision_parts_from_live_actor,
    invalidate_collision_parts, validate_collision_parts,
    try_create_collision_move_limit, try_create_collision_water_surface,
};
pub use query::{
    calc_map_ground, calc_map_ground_default,
    get_first_poly_on_line_category, get_first_poly_on_line_to_map,
    get_first_poly_on_line_to_map_except_actor,
};
pub use error::CollisionError;
