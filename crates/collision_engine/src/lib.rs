//! # Collision Engine
//!
//! Spatial collision queries over movable triangle-mesh "collision parts".
//!
//! ## Features
//!
//! - **Two-level spatial index**: zones of parts, parts owning a mesh-local
//!   acceleration structure
//! - **Incremental bounding volumes**: zone volumes are only rebuilt when a
//!   moving part leaves them
//! - **Segment queries**: all hits in collection order, or the first hit
//! - **Pluggable meshes**: any [`CollisionServer`](physics::collision::CollisionServer)
//!   decoded by a host-supplied [`MeshDecoder`](physics::collision::MeshDecoder)
//!
//! ## Quick Start
//!
//! ```rust
//! use collision_engine::prelude::*;
//!
//! let mut director = CollisionDirector::default();
//! let floor = TriangleMeshServer::from_vertices(
//!     &[Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)],
//!     &[0, 1, 2],
//! );
//! let handle = director.create_parts(
//!     ZoneId::GLOBAL,
//!     &Mat4::identity(),
//!     HitSensor::new(ActorId(1)),
//!     Box::new(floor),
//!     Category::Map,
//!     CollisionScaleType::AutoEqualScale,
//! );
//! director.validate_parts(handle)?;
//! director.movement();
//!
//! let hits = director.check_strike_line(
//!     Category::Map,
//!     &Vec3::new(0.2, 5.0, 0.2),
//!     &Vec3::new(0.0, -10.0, 0.0),
//!     None,
//!     None,
//!     None,
//! );
//! assert_eq!(hits, 1);
//! # Ok::<(), CollisionError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod spatial;
pub mod physics;

/// Common imports for collision users
pub mod prelude {
    pub use crate::{
        config::{CollisionConfig, Config},
        foundation::{
            collections::PartHandle,
            math::{Mat4, Mat4Ext, Transform, Vec3},
        },
        physics::collision::{
            ActorId, Category, CollisionActor, CollisionDirector, CollisionError, CollisionParts,
            CollisionPartsFilter, CollisionScaleType, CollisionScene, CollisionServer, HitInfo,
            HitSensor, HostMtx, MemoryArchive, MeshDecoder, ResourceArchive, Triangle, TriangleFilter,
            TriangleMeshServer, ZoneId,
            calc_map_ground, calc_map_ground_default, get_first_poly_on_line_category,
            get_first_poly_on_line_to_map, get_first_poly_on_line_to_map_except_actor,
        },
    };
}
