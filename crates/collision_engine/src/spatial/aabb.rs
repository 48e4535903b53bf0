//! Axis-aligned bounding box used by zone volumes and query culling

use crate::foundation::math::Vec3;

/// Axis-Aligned Bounding Box for spatial queries
///
/// A freshly [`reset`](AABB::reset) box is *empty* (`min > max` on every
/// axis) and grows through [`union_point`](AABB::union_point).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AABB {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Default for AABB {
    fn default() -> Self {
        Self::empty()
    }
}

impl AABB {
    /// Create a new AABB from min and max points
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Create an empty AABB that contains nothing
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Create the box covering the segment `[p0, p0 + dir]`
    pub fn from_segment(p0: &Vec3, dir: &Vec3) -> Self {
        let mut aabb = Self::empty();
        aabb.union_point(p0);
        aabb.union_point(&(p0 + dir));
        aabb
    }

    /// Make the box empty again
    pub fn reset(&mut self) {
        *self = Self::empty();
    }

    /// True when no point has been added since the last reset
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    /// Grow the box to contain `point`. Returns whether the box changed.
    pub fn union_point(&mut self, point: &Vec3) -> bool {
        let mut changed = false;
        for axis in 0..3 {
            if point[axis] < self.min[axis] {
                self.min[axis] = point[axis];
                changed = true;
            }
            if point[axis] > self.max[axis] {
                self.max[axis] = point[axis];
                changed = true;
            }
        }
        changed
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Squared length of the min-to-max diagonal
    pub fn diagonal_length_squared(&self) -> f32 {
        (self.max - self.min).magnitude_squared()
    }

    /// Check if this AABB contains a point
    pub fn contains_point(&self, point: &Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB overlaps the box around a sphere (`center ± radius`)
    pub fn intersects_sphere(&self, center: &Vec3, radius: f32) -> bool {
        center.x + radius >= self.min.x && center.x - radius <= self.max.x &&
        center.y + radius >= self.min.y && center.y - radius <= self.max.y &&
        center.z + radius >= self.min.z && center.z - radius <= self.max.z
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_union_reports_growth_only() {
        let mut aabb = AABB::empty();
        assert!(aabb.is_empty());

        assert!(aabb.union_point(&Vec3::new(1.0, 1.0, 1.0)));
        assert!(aabb.union_point(&Vec3::new(-1.0, 2.0, 0.0)));
        assert!(!aabb.union_point(&Vec3::new(0.0, 1.5, 0.5)));

        assert_eq!(aabb.min, Vec3::new(-1.0, 1.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(1.0, 2.0, 1.0));
        assert!(!aabb.is_empty());
    }

    #[test]
    fn test_segment_box_handles_negative_direction() {
        let aabb = AABB::from_segment(&Vec3::new(0.0, 5.0, 0.0), &Vec3::new(0.0, -10.0, 2.0));

        assert_eq!(aabb.min, Vec3::new(0.0, -5.0, 0.0));
        assert_eq!(aabb.max, Vec3::new(0.0, 5.0, 2.0));
        assert_relative_eq!(aabb.center(), Vec3::new(0.0, 0.0, 1.0));
        assert_relative_eq!(aabb.diagonal_length_squared(), 104.0);
    }

    #[test]
    fn test_sphere_overlap() {
        let aabb = AABB::new(Vec3::zeros(), Vec3::new(1.0, 1.0, 1.0));

        assert!(aabb.intersects_sphere(&Vec3::new(2.0, 0.5, 0.5), 1.0));
        assert!(!aabb.intersects_sphere(&Vec3::new(2.5, 0.5, 0.5), 1.0));
        assert!(!AABB::empty().intersects_sphere(&Vec3::zeros(), 100.0));
    }
}
