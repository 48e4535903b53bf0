//! Spatial data structures
//!
//! Provides the bounding-box type shared by zone bounding volumes and the
//! broad-phase culling of line queries.

mod aabb;

pub use aabb::AABB;
