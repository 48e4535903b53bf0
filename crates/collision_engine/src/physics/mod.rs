//! Physics module: collision queries against zoned triangle meshes

pub mod collision;

pub use collision::{
    CollisionDirector,
    CollisionError,
    CollisionParts,
    CollisionScene,
    HitInfo,
    Triangle,
};
