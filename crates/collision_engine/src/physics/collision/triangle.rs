//! Resolved world-space triangles and line-query hits

use serde::{Deserialize, Serialize};

use crate::foundation::collections::PartHandle;
use crate::foundation::math::{Mat4Ext, Vec3};
use super::director::CollisionDirector;
use super::parts::CollisionParts;
use super::server::AttributeRecord;

/// Identity of the actor that owns a hit sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(pub u32);

/// The sensor a collision part reports hits through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HitSensor {
    /// Actor owning the sensor
    pub actor: ActorId,
}

impl HitSensor {
    /// Create a sensor owned by `actor`
    pub fn new(actor: ActorId) -> Self {
        Self { actor }
    }
}

/// One triangle of a collision part, resolved to world space.
///
/// Triangles only *name* their part and sensor; they never keep either alive.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Part the triangle belongs to
    pub collision_parts: Option<PartHandle>,
    /// Mesh-local triangle index
    pub prism_idx: Option<usize>,
    /// Sensor of the owning part
    pub hit_sensor: Option<HitSensor>,
    /// First vertex in world space
    pub pos0: Vec3,
    /// Second vertex in world space
    pub pos1: Vec3,
    /// Third vertex in world space
    pub pos2: Vec3,
    /// Face normal in world space (the world matrix applied as a direction)
    pub face_normal: Vec3,
}

impl Default for Triangle {
    fn default() -> Self {
        Self {
            collision_parts: None,
            prism_idx: None,
            hit_sensor: None,
            pos0: Vec3::zeros(),
            pos1: Vec3::zeros(),
            pos2: Vec3::zeros(),
            face_normal: Vec3::zeros(),
        }
    }
}

impl Triangle {
    /// Resolve prism `prism_idx` of `parts` into world space.
    ///
    /// The index must be valid for the part's server.
    pub fn fill_data(&mut self, parts: &CollisionParts, prism_idx: usize) {
        let server = parts.collision_server();
        let world = parts.world_mtx();

        self.collision_parts = Some(parts.handle());
        self.prism_idx = Some(prism_idx);
        self.hit_sensor = Some(parts.hit_sensor());

        self.pos0 = world.transform_point_w1(&server.pos(prism_idx, 0));
        self.pos1 = world.transform_point_w1(&server.pos(prism_idx, 1));
        self.pos2 = world.transform_point_w1(&server.pos(prism_idx, 2));
        self.face_normal = world.transform_vector_w0(&server.face_normal(prism_idx));
    }

    /// Full value copy of another triangle
    pub fn copy_from(&mut self, other: &Triangle) {
        self.clone_from(other);
    }

    /// Attribute record of this triangle, looked up through its part
    pub fn attributes<'a>(&self, director: &'a CollisionDirector) -> Option<&'a AttributeRecord> {
        let prism_idx = self.prism_idx?;
        director
            .parts(self.collision_parts?)?
            .collision_server()
            .attributes(prism_idx)
    }
}

/// A triangle hit by a line query
#[derive(Debug, Clone, PartialEq)]
pub struct HitInfo {
    /// The triangle that was hit
    pub triangle: Triangle,
    /// World-space point where the segment struck the triangle
    pub strike_loc: Vec3,
    /// Hit parameter along the query direction (`0..=1` spans the segment).
    /// Negative while unfilled.
    pub distance: f32,
}

impl Default for HitInfo {
    fn default() -> Self {
        Self {
            triangle: Triangle::default(),
            strike_loc: Vec3::zeros(),
            distance: -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Mat4;
    use crate::physics::collision::keeper::Category;
    use crate::physics::collision::parts::CollisionScaleType;
    use crate::physics::collision::tests::support::{floor_triangle_server, sensor};
    use crate::physics::collision::zone::ZoneId;
    use approx::assert_relative_eq;

    fn parts_at(position: Vec3, actor: u32) -> CollisionParts {
        CollisionParts::new(
            PartHandle::default(),
            ZoneId::GLOBAL,
            &Mat4::new_translation(&position),
            sensor(actor),
            Box::new(floor_triangle_server()),
            Category::Map,
            CollisionScaleType::AutoScale,
        )
    }

    #[test]
    fn test_fill_data_resolves_world_vertices() {
        let parts = parts_at(Vec3::new(0.0, 2.0, 0.0), 1);
        let mut triangle = Triangle::default();
        triangle.fill_data(&parts, 0);

        assert_eq!(triangle.prism_idx, Some(0));
        assert_eq!(triangle.hit_sensor, Some(sensor(1)));
        assert_relative_eq!(triangle.pos1, Vec3::new(1.0, 2.0, 0.0));
        assert_relative_eq!(triangle.face_normal.y.abs(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_copy_from_overwrites_every_field() {
        let mut source = Triangle::default();
        source.fill_data(&parts_at(Vec3::new(5.0, 0.0, 0.0), 2), 0);

        let mut target = Triangle::default();
        target.fill_data(&parts_at(Vec3::new(-3.0, 1.0, 0.0), 7), 0);
        target.copy_from(&source);

        assert_eq!(target, source);
        assert_eq!(target.hit_sensor, Some(sensor(2)));
        assert_relative_eq!(target.pos0, Vec3::new(5.0, 0.0, 0.0));

        // Copies are independent
        source.pos0 = Vec3::zeros();
        assert_relative_eq!(target.pos0, Vec3::new(5.0, 0.0, 0.0));
    }
}
