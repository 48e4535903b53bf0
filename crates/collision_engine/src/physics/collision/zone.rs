//! Spatial zones grouping collision parts
//!
//! A zone lists the parts registered in it (by handle) and, unless it is the
//! global zone, keeps a conservative bounding volume around them so a line
//! query can reject the whole zone at once.

use serde::{Deserialize, Serialize};

use crate::foundation::collections::{HandleMap, PartHandle};
use crate::foundation::math::Vec3;
use crate::spatial::AABB;
use super::parts::CollisionParts;
use super::primitives::BoundingSphere;

/// Identifier of a zone within a keeper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ZoneId(pub u32);

impl ZoneId {
    /// The unbounded zone every query descends into
    pub const GLOBAL: ZoneId = ZoneId(0);

    /// Whether this is [`ZoneId::GLOBAL`]
    pub fn is_global(self) -> bool {
        self == Self::GLOBAL
    }
}

/// Aggregate volume of a zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneBounds {
    /// No volume is tracked; the zone is never culled
    Global,
    /// Box around every member's bounding sphere, plus the sphere enclosing
    /// that box (`None` while the box is empty)
    Bounded {
        /// Union of every member's `center ± radius` corners
        aabb: AABB,
        /// Box centroid and half the box diagonal
        sphere: Option<BoundingSphere>,
    },
}

/// A group of collision parts sharing one bounding volume
#[derive(Debug, Clone)]
pub struct CollisionZone {
    zone_id: ZoneId,
    bounds: ZoneBounds,
    parts: Vec<PartHandle>,
}

impl CollisionZone {
    /// Create an empty zone
    pub fn new(zone_id: ZoneId) -> Self {
        let bounds = if zone_id.is_global() {
            ZoneBounds::Global
        } else {
            ZoneBounds::Bounded {
                aabb: AABB::empty(),
                sphere: None,
            }
        };

        Self {
            zone_id,
            bounds,
            parts: Vec::new(),
        }
    }

    /// Id of this zone
    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    /// Current aggregate volume
    pub fn bounds(&self) -> &ZoneBounds {
        &self.bounds
    }

    /// Enclosing sphere, if the zone tracks one and has members
    pub fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        match &self.bounds {
            ZoneBounds::Bounded { sphere, .. } => sphere.as_ref(),
            ZoneBounds::Global => None,
        }
    }

    /// Member parts in registration order
    pub fn parts(&self) -> &[PartHandle] {
        &self.parts
    }

    /// Whether `handle` is a member
    pub fn contains(&self, handle: PartHandle) -> bool {
        self.parts.contains(&handle)
    }

    /// Append `parts` and grow the volume to cover it
    pub fn add_parts(&mut self, parts: &CollisionParts) {
        self.parts.push(parts.handle());

        if let ZoneBounds::Bounded { aabb, sphere } = &mut self.bounds {
            if union_parts(aabb, parts) {
                *sphere = enclosing_sphere(aabb);
            }
        }
    }

    /// Remove a member. The volume is left as is until the next recompute.
    ///
    /// Returns whether the handle was a member.
    pub fn erase_parts(&mut self, handle: PartHandle) -> bool {
        match self.parts.iter().position(|&member| member == handle) {
            Some(index) => {
                self.parts.remove(index);
                true
            }
            None => false,
        }
    }

    /// Recompute the volume only if `parts` now pokes out of the current box
    pub fn calc_min_max_and_radius_if_move_outer(&mut self, parts: &CollisionParts, table: &HandleMap<PartHandle, CollisionParts>) {
        let ZoneBounds::Bounded { aabb, .. } = &self.bounds else {
            return;
        };

        let center = parts.trans();
        let radius = parts.bounding_sphere_radius();
        let outside = (0..3).any(|axis| center[axis] - radius < aabb.min[axis] || center[axis] + radius > aabb.max[axis]);

        if outside {
            self.calc_min_max_and_radius(table);
        }
    }

    /// Rebuild the volume from every member
    pub fn calc_min_max_and_radius(&mut self, table: &HandleMap<PartHandle, CollisionParts>) {
        let ZoneBounds::Bounded { aabb, sphere } = &mut self.bounds else {
            return;
        };

        aabb.reset();
        for parts in self.parts.iter().filter_map(|&handle| table.get(handle)) {
            union_parts(aabb, parts);
        }
        *sphere = enclosing_sphere(aabb);

        log::trace!("Zone {:?} volume recomputed over {} parts", self.zone_id, self.parts.len());
    }
}

fn union_parts(aabb: &mut AABB, parts: &CollisionParts) -> bool {
    let center = parts.trans();
    let inflate = Vec3::repeat(parts.bounding_sphere_radius());

    let grew_max = aabb.union_point(&(center + inflate));
    let grew_min = aabb.union_point(&(center - inflate));
    grew_max || grew_min
}

// Half the box diagonal: covers every corner, not a tight fit.
fn enclosing_sphere(aabb: &AABB) -> Option<BoundingSphere> {
    if aabb.is_empty() {
        return None;
    }
    Some(BoundingSphere::new(aabb.center(), aabb.diagonal_length_squared().sqrt() * 0.5))
}
