//! Primitive collision shapes and intersection algorithms
//!
//! Provides bounding spheres, the segment-vs-sphere culling test used by the
//! keepers, and the local-space triangle with a segment intersection test.
//!
//! Segments are given as a start point `p0` and an *unnormalized* direction
//! `dir`; the segment covers `p0 + dir * t` for `t` in `[0, 1]` and every
//! distance reported here is that parameter `t`.

use crate::foundation::math::Vec3;

/// A bounding sphere for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingSphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl BoundingSphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if the closed segment `[p0, p0 + dir]` touches this sphere
    pub fn intersects_segment(&self, p0: &Vec3, dir: &Vec3) -> bool {
        check_hit_segment_sphere(p0, dir, &self.center, self.radius)
    }
}

/// Returns true iff the closed segment `[p0, p0 + dir]` intersects the closed
/// ball of `radius` around `center`. A zero `dir` is a point-in-sphere test.
pub fn check_hit_segment_sphere(p0: &Vec3, dir: &Vec3, center: &Vec3, radius: f32) -> bool {
    segment_sphere_contact(p0, dir, center, radius).is_some()
}

/// Same test as [`check_hit_segment_sphere`], additionally returning the unit
/// push direction for the branch that produced the hit:
///
/// - closest point inside the segment: from the closest point back toward `p0`
/// - closest point past the far end: from the far end toward the center
/// - center behind `p0` (or zero-length segment): from `p0` toward the center
///
/// The direction is the zero vector when the two points coincide.
pub fn segment_sphere_push_direction(p0: &Vec3, dir: &Vec3, center: &Vec3, radius: f32) -> Option<Vec3> {
    segment_sphere_contact(p0, dir, center, radius)
        .map(|raw| raw.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros))
}

fn segment_sphere_contact(p0: &Vec3, dir: &Vec3, center: &Vec3, radius: f32) -> Option<Vec3> {
    // Work relative to p0
    let c = center - p0;
    let sq_radius = radius * radius;
    let sq_seg_length = dir.magnitude_squared();
    let dot = c.dot(dir);

    if sq_seg_length > 0.0 && dot >= 0.0 {
        if dot <= sq_seg_length {
            // Center projects onto the segment
            let projected = dir * (dot / sq_seg_length);
            if (projected - c).magnitude_squared() <= sq_radius {
                return Some(-projected);
            }
        } else {
            // Projection lies past the far endpoint; only p0 + dir can be inside
            if (dir - c).magnitude_squared() <= sq_radius {
                return Some(c - dir);
            }
        }
        None
    } else if c.magnitude_squared() <= sq_radius {
        // Center is behind the start (or the segment is a point)
        Some(c)
    } else {
        None
    }
}

/// A mesh triangle in the mesh's local space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTriangle {
    /// First vertex
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl MeshTriangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// Vertex by index (0, 1 or 2)
    pub fn vertex(&self, index: usize) -> Vec3 {
        match index {
            0 => self.v0,
            1 => self.v1,
            _ => self.v2,
        }
    }

    /// Calculates the normal of the triangle (right-hand rule)
    pub fn normal(&self) -> Vec3 {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2).normalize()
    }

    /// Möller-Trumbore segment-triangle intersection, two-sided.
    ///
    /// Returns the segment parameter `t` in `[0, 1]` of the hit.
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore
    pub fn intersect_segment(&self, origin: &Vec3, dir: &Vec3) -> Option<f32> {
        const EPSILON: f32 = 0.000001;

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;

        let h = dir.cross(&edge2);
        let a = edge1.dot(&h);

        // Segment parallel to triangle?
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = origin - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * dir.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        (0.0..=1.0).contains(&t).then_some(t)
    }
}
