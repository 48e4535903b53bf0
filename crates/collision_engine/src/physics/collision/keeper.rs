//! Per-category zone registry and line queries
//!
//! Each [`Category`] has one [`CollisionCategorizedKeeper`]. The keeper owns
//! its zones and a fixed-capacity hit buffer shared by every query issued
//! through it; results stay valid until the next query on the same keeper.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_STRIKE_INFO_CAPACITY;
use crate::foundation::collections::{HandleMap, PartHandle};
use crate::foundation::math::Vec3;
use crate::spatial::AABB;
use super::filter::{CollisionPartsFilter, TriangleFilter};
use super::parts::CollisionParts;
use super::primitives::check_hit_segment_sphere;
use super::triangle::HitInfo;
use super::zone::{CollisionZone, ZoneId};

/// Which keeper a collision part is registered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Level geometry actors stand and walk on
    Map = 0,
    /// Volumes that block sunlight
    Sunshade = 1,
    /// Water surfaces
    WaterSurface = 2,
    /// Invisible walls limiting where the player can go
    MoveLimit = 3,
}

impl Category {
    /// Every category in keeper order
    pub const ALL: [Category; 4] = [Category::Map, Category::Sunshade, Category::WaterSurface, Category::MoveLimit];

    /// Keeper index of this category
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Zones and query buffer for one category
#[derive(Debug)]
pub struct CollisionCategorizedKeeper {
    category: Category,
    zones: BTreeMap<ZoneId, CollisionZone>,
    strike_info: Vec<HitInfo>,
    strike_info_count: usize,
    force_calc_min_max_and_radius: bool,
}

impl CollisionCategorizedKeeper {
    /// Create a keeper with the default hit buffer capacity
    pub fn new(category: Category) -> Self {
        Self::with_capacity(category, DEFAULT_STRIKE_INFO_CAPACITY)
    }

    /// Create a keeper whose hit buffer holds `capacity` entries
    pub fn with_capacity(category: Category, capacity: usize) -> Self {
        Self {
            category,
            zones: BTreeMap::new(),
            strike_info: vec![HitInfo::default(); capacity],
            strike_info_count: 0,
            force_calc_min_max_and_radius: false,
        }
    }

    /// Category served by this keeper
    pub fn category(&self) -> Category {
        self.category
    }

    /// Per-frame pass: commit every valid part's transform and keep the zone
    /// volumes current.
    pub fn movement(&mut self, table: &mut HandleMap<PartHandle, CollisionParts>) {
        let force = self.force_calc_min_max_and_radius;

        for zone in self.zones.values_mut() {
            for i in 0..zone.parts().len() {
                let handle = zone.parts()[i];
                let Some(parts) = table.get_mut(handle) else {
                    continue;
                };
                if !parts.is_validated() || parts.category() != self.category {
                    continue;
                }

                let was_reset = parts.is_update_mtx_one_time();
                parts.update_mtx();

                if !force && (was_reset || parts.not_moved_counter() == 0) {
                    let parts = &table[handle];
                    zone.calc_min_max_and_radius_if_move_outer(parts, table);
                }
            }

            if force {
                zone.calc_min_max_and_radius(table);
            }
        }

        self.force_calc_min_max_and_radius = false;
    }

    /// Make the next [`movement`](Self::movement) rebuild every zone volume
    pub fn request_full_recompute(&mut self) {
        self.force_calc_min_max_and_radius = true;
    }

    /// Zone `zone_id`, created on first use
    pub fn get_zone(&mut self, zone_id: ZoneId) -> &mut CollisionZone {
        self.zones.entry(zone_id).or_insert_with(|| {
            log::debug!("Creating {:?} zone {:?}", self.category, zone_id);
            CollisionZone::new(zone_id)
        })
    }

    /// Zone `zone_id` if it exists
    pub fn zone(&self, zone_id: ZoneId) -> Option<&CollisionZone> {
        self.zones.get(&zone_id)
    }

    /// Existing zones in id order
    pub fn zones(&self) -> impl Iterator<Item = &CollisionZone> {
        self.zones.values()
    }

    /// Register `parts` in zone `zone_id`
    pub fn add_to_zone(&mut self, parts: &CollisionParts, zone_id: ZoneId) {
        self.get_zone(zone_id).add_parts(parts);
    }

    /// Deregister `handle` from zone `zone_id`. Unknown zones are ignored.
    pub fn remove_from_zone(&mut self, handle: PartHandle, zone_id: ZoneId) {
        if let Some(zone) = self.zones.get_mut(&zone_id) {
            zone.erase_parts(handle);
        }
    }

    /// Register `parts` in the global zone
    pub fn add_to_global(&mut self, parts: &CollisionParts) {
        self.add_to_zone(parts, ZoneId::GLOBAL);
    }

    /// Deregister `handle` from the global zone
    pub fn remove_from_global(&mut self, handle: PartHandle) {
        self.remove_from_zone(handle, ZoneId::GLOBAL);
    }

    /// Hit `index` of the last query
    pub fn strike_info(&self, index: usize) -> Option<&HitInfo> {
        self.strike_infos().get(index)
    }

    /// The hits written by the last query, in write order
    pub fn strike_infos(&self) -> &[HitInfo] {
        &self.strike_info[..self.strike_info_count]
    }

    /// Number of hits written by the last query
    pub fn strike_info_count(&self) -> usize {
        self.strike_info_count
    }

    /// Capacity of the hit buffer
    pub fn strike_info_capacity(&self) -> usize {
        self.strike_info.len()
    }

    /// Collect the hits of segment `[p0, p0 + dir]` into the shared buffer.
    ///
    /// Zones are visited in id order and parts in registration order; hits are
    /// stored in that order, not sorted by distance. Collection stops as soon
    /// as `max_results` (capped at the buffer capacity) hits were written, so
    /// a closer hit in a later zone can be missed. Returns the hit count.
    pub fn check_strike_line(
        &mut self,
        table: &mut HandleMap<PartHandle, CollisionParts>,
        p0: &Vec3,
        dir: &Vec3,
        parts_filter: Option<&dyn CollisionPartsFilter>,
        tri_filter: Option<&dyn TriangleFilter>,
        max_results: Option<usize>,
    ) -> usize {
        let limit = max_results.map_or(self.strike_info.len(), |max| max.min(self.strike_info.len()));
        let segment_box = AABB::from_segment(p0, dir);
        let mut idx = 0;

        if limit > 0 {
            'zones: for zone in self.zones.values() {
                if !zone.zone_id().is_global() {
                    let Some(sphere) = zone.bounding_sphere() else {
                        continue;
                    };
                    if !segment_box.intersects_sphere(&sphere.center, sphere.radius) {
                        continue;
                    }
                    if !check_hit_segment_sphere(p0, dir, &sphere.center, sphere.radius) {
                        continue;
                    }
                }

                for &handle in zone.parts() {
                    let Some(parts) = table.get_mut(handle) else {
                        continue;
                    };
                    if !parts.is_validated() {
                        continue;
                    }
                    if parts_filter.is_some_and(|filter| filter.is_invalid_parts(parts)) {
                        continue;
                    }

                    let center = parts.trans();
                    let radius = parts.bounding_sphere_radius();
                    if !segment_box.intersects_sphere(&center, radius) {
                        continue;
                    }
                    if !check_hit_segment_sphere(p0, dir, &center, radius) {
                        continue;
                    }

                    idx += parts.check_strike_line(&mut self.strike_info[..limit], idx, p0, dir, tri_filter);
                    if idx >= limit {
                        break 'zones;
                    }
                }
            }
        }

        self.strike_info_count = idx;
        idx
    }
}
