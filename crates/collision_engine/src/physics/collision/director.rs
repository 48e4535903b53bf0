//! Collision director: the four keepers and the part table

use crate::config::CollisionConfig;
use crate::foundation::collections::{HandleMap, PartHandle};
use crate::foundation::math::{Mat4, Vec3};
use super::error::CollisionError;
use super::filter::{CollisionPartsFilter, TriangleFilter};
use super::keeper::{Category, CollisionCategorizedKeeper};
use super::parts::{CollisionParts, CollisionScaleType};
use super::server::CollisionServer;
use super::triangle::HitSensor;
use super::zone::ZoneId;

/// Owns every collision part and routes them to their category's keeper.
///
/// Zones and query results only refer to parts by [`PartHandle`]; the part
/// table here is the single owner.
#[derive(Debug)]
pub struct CollisionDirector {
    keepers: [CollisionCategorizedKeeper; 4],
    parts: HandleMap<PartHandle, CollisionParts>,
    equal_scale_tolerance: f32,
}

impl Default for CollisionDirector {
    fn default() -> Self {
        Self::new(&CollisionConfig::default())
    }
}

impl CollisionDirector {
    /// Create a director with empty keepers
    pub fn new(config: &CollisionConfig) -> Self {
        let capacity = config.strike_info_capacity;
        Self {
            keepers: Category::ALL.map(|category| CollisionCategorizedKeeper::with_capacity(category, capacity)),
            parts: HandleMap::with_key(),
            equal_scale_tolerance: config.equal_scale_tolerance,
        }
    }

    /// Per-frame movement pass over every keeper
    pub fn movement(&mut self) {
        for keeper in &mut self.keepers {
            keeper.movement(&mut self.parts);
        }
    }

    /// Create a part in `zone_id` of the `category` keeper.
    ///
    /// The part is invisible to queries until validated.
    pub fn create_parts(
        &mut self,
        zone_id: ZoneId,
        initial_host_mtx: &Mat4,
        hit_sensor: HitSensor,
        collision_server: Box<dyn CollisionServer>,
        category: Category,
        scale_type: CollisionScaleType,
    ) -> PartHandle {
        self.keepers[category.index()].get_zone(zone_id);

        let tolerance = self.equal_scale_tolerance;
        let handle = self.parts.insert_with_key(|handle| {
            CollisionParts::new(handle, zone_id, initial_host_mtx, hit_sensor, collision_server, category, scale_type)
                .with_equal_scale_tolerance(tolerance)
        });

        log::debug!("Created collision parts {:?} ({:?}, zone {:?})", handle, category, zone_id);
        handle
    }

    /// Register a part in its zone and make it visible to queries.
    /// Validating a valid part does nothing.
    pub fn validate_parts(&mut self, handle: PartHandle) -> Result<(), CollisionError> {
        let parts = self.parts.get_mut(handle).ok_or(CollisionError::UnknownParts)?;
        if parts.is_validated() {
            return Ok(());
        }

        parts.set_validated(true);
        self.keepers[parts.category().index()].add_to_zone(parts, parts.zone_id());
        log::debug!("Validated collision parts {:?}", handle);
        Ok(())
    }

    /// Deregister a part from its zone. Invalidating an invalid part does nothing.
    pub fn invalidate_parts(&mut self, handle: PartHandle) -> Result<(), CollisionError> {
        let parts = self.parts.get_mut(handle).ok_or(CollisionError::UnknownParts)?;
        if !parts.is_validated() {
            return Ok(());
        }

        parts.set_validated(false);
        self.keepers[parts.category().index()].remove_from_zone(handle, parts.zone_id());
        log::debug!("Invalidated collision parts {:?}", handle);
        Ok(())
    }

    /// Remove a part from its zone and drop it
    pub fn destroy_parts(&mut self, handle: PartHandle) -> Result<(), CollisionError> {
        let parts = self.parts.remove(handle).ok_or(CollisionError::UnknownParts)?;
        self.keepers[parts.category().index()].remove_from_zone(handle, parts.zone_id());
        log::debug!("Destroyed collision parts {:?}", handle);
        Ok(())
    }

    /// Look up a part
    pub fn parts(&self, handle: PartHandle) -> Option<&CollisionParts> {
        self.parts.get(handle)
    }

    /// Look up a part for transform staging
    pub fn parts_mut(&mut self, handle: PartHandle) -> Option<&mut CollisionParts> {
        self.parts.get_mut(handle)
    }

    /// Number of live parts
    pub fn parts_count(&self) -> usize {
        self.parts.len()
    }

    /// Keeper of `category`
    pub fn keeper(&self, category: Category) -> &CollisionCategorizedKeeper {
        &self.keepers[category.index()]
    }

    /// Keeper of `category`, mutably
    pub fn keeper_mut(&mut self, category: Category) -> &mut CollisionCategorizedKeeper {
        &mut self.keepers[category.index()]
    }

    /// Line query against one category; see
    /// [`CollisionCategorizedKeeper::check_strike_line`]. Results are read
    /// back through [`keeper`](Self::keeper).
    pub fn check_strike_line(
        &mut self,
        category: Category,
        p0: &Vec3,
        dir: &Vec3,
        parts_filter: Option<&dyn CollisionPartsFilter>,
        tri_filter: Option<&dyn TriangleFilter>,
        max_results: Option<usize>,
    ) -> usize {
        self.keepers[category.index()].check_strike_line(&mut self.parts, p0, dir, parts_filter, tri_filter, max_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::tests::support::{floor_triangle_server, sensor};

    fn create_floor(director: &mut CollisionDirector, zone_id: ZoneId, category: Category) -> PartHandle {
        director.create_parts(
            zone_id,
            &Mat4::identity(),
            sensor(1),
            Box::new(floor_triangle_server()),
            category,
            CollisionScaleType::AutoEqualScale,
        )
    }

    #[test]
    fn test_created_parts_wait_for_validation() {
        let mut director = CollisionDirector::default();
        let handle = create_floor(&mut director, ZoneId(4), Category::Map);

        let zone = director.keeper(Category::Map).zone(ZoneId(4)).unwrap();
        assert!(zone.parts().is_empty());
        assert!(!director.parts(handle).unwrap().is_validated());

        director.validate_parts(handle).unwrap();
        director.validate_parts(handle).unwrap();
        let zone = director.keeper(Category::Map).zone(ZoneId(4)).unwrap();
        assert_eq!(zone.parts(), &[handle]);
    }

    #[test]
    fn test_invalidate_is_idempotent() {
        let mut director = CollisionDirector::default();
        let handle = create_floor(&mut director, ZoneId::GLOBAL, Category::Sunshade);
        director.validate_parts(handle).unwrap();

        director.invalidate_parts(handle).unwrap();
        director.invalidate_parts(handle).unwrap();
        assert!(director.keeper(Category::Sunshade).zone(ZoneId::GLOBAL).unwrap().parts().is_empty());
        assert!(director.keeper(Category::Map).zone(ZoneId::GLOBAL).is_none());
    }

    #[test]
    fn test_destroyed_handles_are_unknown() {
        let mut director = CollisionDirector::default();
        let handle = create_floor(&mut director, ZoneId(1), Category::Map);
        director.validate_parts(handle).unwrap();

        director.destroy_parts(handle).unwrap();
        assert_eq!(director.parts_count(), 0);
        assert!(director.keeper(Category::Map).zone(ZoneId(1)).unwrap().parts().is_empty());
        assert!(matches!(director.validate_parts(handle), Err(CollisionError::UnknownParts)));
        assert!(matches!(director.destroy_parts(handle), Err(CollisionError::UnknownParts)));
    }

    #[test]
    fn test_movement_only_commits_own_category() {
        let mut director = CollisionDirector::default();
        let map = create_floor(&mut director, ZoneId::GLOBAL, Category::Map);
        let water = create_floor(&mut director, ZoneId::GLOBAL, Category::WaterSurface);
        director.validate_parts(map).unwrap();
        director.validate_parts(water).unwrap();

        director.movement();
        director.movement();

        assert_eq!(director.parts(map).unwrap().not_moved_counter(), 2);
        assert_eq!(director.parts(water).unwrap().not_moved_counter(), 2);
    }

    #[test]
    fn test_keeper_capacity_comes_from_config() {
        let config = CollisionConfig {
            strike_info_capacity: 4,
            ..Default::default()
        };
        let director = CollisionDirector::new(&config);
        for category in Category::ALL {
            assert_eq!(director.keeper(category).strike_info_capacity(), 4);
        }
    }
}
