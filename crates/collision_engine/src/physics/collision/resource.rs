//! Creating collision parts from actor resources
//!
//! Collision meshes are looked up by name in the actor's archive: `<name>.kcl`
//! holds the mesh and the optional `<name>.pa` its per-triangle attributes.
//! Turning those bytes into a [`CollisionServer`] is the job of the
//! [`MeshDecoder`] installed in the [`CollisionScene`].

use std::collections::HashMap;

use crate::foundation::collections::PartHandle;
use crate::foundation::math::{Mat4, Transform};
use super::error::CollisionError;
use super::keeper::Category;
use super::parts::{CollisionScaleType, HostMtx};
use super::scene::CollisionScene;
use super::server::CollisionServer;
use super::triangle::{ActorId, HitSensor};
use super::zone::ZoneId;

/// Named binary resources of one actor
pub trait ResourceArchive {
    /// Contents of file `name`, if present
    fn find_file_data(&self, name: &str) -> Option<&[u8]>;
}

/// Archive kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    files: HashMap<String, Vec<u8>>,
}

impl MemoryArchive {
    /// Create an empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file
    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.files.insert(name.into(), data);
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with_file(mut self, name: impl Into<String>, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }
}

impl ResourceArchive for MemoryArchive {
    fn find_file_data(&self, name: &str) -> Option<&[u8]> {
        self.files.get(name).map(Vec::as_slice)
    }
}

/// Decodes collision mesh data into a mesh-local collision server
pub trait MeshDecoder {
    /// Decode mesh bytes `kcl`, with optional attribute bytes `pa`
    fn decode(&self, kcl: &[u8], pa: Option<&[u8]>) -> Result<Box<dyn CollisionServer>, CollisionError>;
}

/// What part creation needs to know about the actor owning the part
pub trait CollisionActor {
    /// Identity of the actor
    fn actor_id(&self) -> ActorId;

    /// Zone the actor was placed in
    fn zone_id(&self) -> ZoneId;

    /// Translation, rotation and scale of the actor
    fn transform(&self) -> Transform;

    /// The actor's resources
    fn archive(&self) -> &dyn ResourceArchive;
}

/// World matrix built from the actor's translation, rotation and scale
pub fn make_mtx_trs_from_actor(actor: &dyn CollisionActor) -> Mat4 {
    actor.transform().to_matrix()
}

/// Create a part from resource `name` of `actor`.
///
/// `<name>.kcl` must exist; `<name>.pa` is used when present. The part is
/// created in the actor's zone but not validated.
pub fn create_collision_parts(
    scene: &mut CollisionScene,
    actor: &dyn CollisionActor,
    name: &str,
    hit_sensor: HitSensor,
    initial_host_mtx: &Mat4,
    scale_type: CollisionScaleType,
    category: Category,
) -> Result<PartHandle, CollisionError> {
    let kcl_name = format!("{name}.kcl");
    let pa_name = format!("{name}.pa");

    let archive = actor.archive();
    let kcl = archive
        .find_file_data(&kcl_name)
        .ok_or_else(|| CollisionError::MissingResource(kcl_name.clone()))?;
    let pa = archive.find_file_data(&pa_name);

    let server = scene.decoder().decode(kcl, pa).map_err(|err| match err {
        CollisionError::Decode { reason, .. } => CollisionError::Decode { name: kcl_name, reason },
        other => other,
    })?;

    Ok(scene
        .get_or_create_director()
        .create_parts(actor.zone_id(), initial_host_mtx, hit_sensor, server, category, scale_type))
}

/// Create a map part for `actor`.
///
/// With `host_mtx` the part starts at the host matrix and stays attached to
/// it; otherwise it starts at the actor's TRS matrix.
pub fn create_collision_parts_from_live_actor(
    scene: &mut CollisionScene,
    actor: &dyn CollisionActor,
    name: &str,
    hit_sensor: HitSensor,
    host_mtx: Option<HostMtx>,
    scale_type: CollisionScaleType,
) -> Result<PartHandle, CollisionError> {
    let initial_host_mtx = match &host_mtx {
        Some(host) => host.get(),
        None => make_mtx_trs_from_actor(actor),
    };

    let handle = create_collision_parts(scene, actor, name, hit_sensor, &initial_host_mtx, scale_type, Category::Map)?;

    if host_mtx.is_some() {
        let parts = scene
            .director_mut()
            .and_then(|director| director.parts_mut(handle))
            .ok_or(CollisionError::UnknownParts)?;
        parts.set_host_mtx(host_mtx);
    }

    Ok(handle)
}

fn try_create_collision_parts(
    scene: &mut CollisionScene,
    actor: &dyn CollisionActor,
    hit_sensor: HitSensor,
    category: Category,
    filename_base: &str,
) -> Result<Option<PartHandle>, CollisionError> {
    if actor.archive().find_file_data(&format!("{filename_base}.kcl")).is_none() {
        log::trace!("Actor {:?} has no {} collision", actor.actor_id(), filename_base);
        return Ok(None);
    }

    let initial_host_mtx = make_mtx_trs_from_actor(actor);
    let handle = create_collision_parts(
        scene,
        actor,
        filename_base,
        hit_sensor,
        &initial_host_mtx,
        CollisionScaleType::AutoScale,
        category,
    )?;
    validate_collision_parts(scene, handle)?;
    Ok(Some(handle))
}

/// Create and validate the actor's `MoveLimit` part, if it has one
pub fn try_create_collision_move_limit(
    scene: &mut CollisionScene,
    actor: &dyn CollisionActor,
    hit_sensor: HitSensor,
) -> Result<Option<PartHandle>, CollisionError> {
    try_create_collision_parts(scene, actor, hit_sensor, Category::MoveLimit, "MoveLimit")
}

/// Create and validate the actor's `WaterSurface` part, if it has one
pub fn try_create_collision_water_surface(
    scene: &mut CollisionScene,
    actor: &dyn CollisionActor,
    hit_sensor: HitSensor,
) -> Result<Option<PartHandle>, CollisionError> {
    try_create_collision_parts(scene, actor, hit_sensor, Category::WaterSurface, "WaterSurface")
}

/// Register a part in its zone and make it visible to queries
pub fn validate_collision_parts(scene: &mut CollisionScene, handle: PartHandle) -> Result<(), CollisionError> {
    scene
        .director_mut()
        .ok_or(CollisionError::UnknownParts)?
        .validate_parts(handle)
}

/// Deregister a part from its zone
pub fn invalidate_collision_parts(scene: &mut CollisionScene, handle: PartHandle) -> Result<(), CollisionError> {
    scene
        .director_mut()
        .ok_or(CollisionError::UnknownParts)?
        .invalidate_parts(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use crate::config::CollisionConfig;
    use crate::foundation::math::{Mat4Ext, Vec3};
    use crate::physics::collision::tests::support::{sensor, soup_bytes, SoupDecoder, TestActor};
    use approx::assert_relative_eq;

    fn floor_soup() -> Vec<u8> {
        soup_bytes(&[[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]])
    }

    fn scene() -> CollisionScene {
        CollisionScene::new(CollisionConfig::default(), Box::new(SoupDecoder))
    }

    #[test]
    fn test_missing_kcl_is_an_error() {
        let mut scene = scene();
        let actor = TestActor::new(1, MemoryArchive::new());

        let result = create_collision_parts(
            &mut scene,
            &actor,
            "Floor",
            sensor(1),
            &Mat4::identity(),
            CollisionScaleType::AutoEqualScale,
            Category::Map,
        );
        assert!(matches!(result, Err(CollisionError::MissingResource(name)) if name == "Floor.kcl"));
        assert!(scene.director().is_none());
    }

    #[test]
    fn test_decode_errors_name_the_resource() {
        let mut scene = scene();
        let actor = TestActor::new(1, MemoryArchive::new().with_file("Floor.kcl", vec![1, 2, 3]));

        let result = create_collision_parts_from_live_actor(&mut scene, &actor, "Floor", sensor(1), None, CollisionScaleType::AutoScale);
        assert!(matches!(result, Err(CollisionError::Decode { name, .. }) if name == "Floor.kcl"));
    }

    #[test]
    fn test_live_actor_parts_start_at_actor_trs() {
        let mut scene = scene();
        let mut actor = TestActor::new(1, MemoryArchive::new().with_file("Floor.kcl", floor_soup()));
        actor.zone_id = ZoneId(3);
        actor.transform = Transform::from_position(Vec3::new(4.0, 5.0, 6.0));

        let handle = create_collision_parts_from_live_actor(&mut scene, &actor, "Floor", sensor(1), None, CollisionScaleType::AutoEqualScale).unwrap();

        let parts = scene.director().unwrap().parts(handle).unwrap();
        assert_eq!(parts.category(), Category::Map);
        assert_eq!(parts.zone_id(), ZoneId(3));
        assert!(!parts.is_validated());
        assert!(parts.host_mtx().is_none());
        assert_relative_eq!(parts.trans(), Vec3::new(4.0, 5.0, 6.0));
    }

    #[test]
    fn test_live_actor_parts_follow_host_mtx() {
        let mut scene = scene();
        let actor = TestActor::new(1, MemoryArchive::new().with_file("Floor.kcl", floor_soup()));
        let host: HostMtx = Rc::new(Cell::new(Mat4::new_translation(&Vec3::new(0.0, 2.0, 0.0))));

        let handle = create_collision_parts_from_live_actor(&mut scene, &actor, "Floor", sensor(1), Some(host.clone()), CollisionScaleType::AutoEqualScale).unwrap();
        validate_collision_parts(&mut scene, handle).unwrap();
        assert_relative_eq!(scene.director().unwrap().parts(handle).unwrap().trans(), Vec3::new(0.0, 2.0, 0.0));

        host.set(Mat4::new_translation(&Vec3::new(0.0, 7.0, 0.0)));
        scene.director_mut().unwrap().parts_mut(handle).unwrap().set_mtx_from_host().unwrap();
        scene.movement();
        assert_relative_eq!(scene.director().unwrap().parts(handle).unwrap().world_mtx().translation_vector(), Vec3::new(0.0, 7.0, 0.0));
    }

    #[test]
    fn test_pa_data_reaches_the_decoder() {
        let mut scene = scene();
        let archive = MemoryArchive::new()
            .with_file("Floor.kcl", floor_soup())
            .with_file("Floor.pa", 9i32.to_le_bytes().to_vec());
        let actor = TestActor::new(1, archive);

        let handle = create_collision_parts_from_live_actor(&mut scene, &actor, "Floor", sensor(1), None, CollisionScaleType::AutoScale).unwrap();
        let server = scene.director().unwrap().parts(handle).unwrap().collision_server();
        assert_eq!(server.attributes(0).and_then(|a| a.get("Floor_code")), Some(9));
    }

    #[test]
    fn test_try_create_returns_none_without_resource() {
        let mut scene = scene();
        let actor = TestActor::new(1, MemoryArchive::new());

        assert!(try_create_collision_move_limit(&mut scene, &actor, sensor(1)).unwrap().is_none());
        assert!(try_create_collision_water_surface(&mut scene, &actor, sensor(1)).unwrap().is_none());
        assert!(scene.director().is_none());
    }

    #[test]
    fn test_try_create_validates_auto_scale_parts() {
        let mut scene = scene();
        let actor = TestActor::new(1, MemoryArchive::new().with_file("WaterSurface.kcl", floor_soup()));

        let handle = try_create_collision_water_surface(&mut scene, &actor, sensor(1)).unwrap().unwrap();
        let parts = scene.director().unwrap().parts(handle).unwrap();
        assert!(parts.is_validated());
        assert_eq!(parts.category(), Category::WaterSurface);
        assert_eq!(parts.scale_type(), CollisionScaleType::AutoScale);

        invalidate_collision_parts(&mut scene, handle).unwrap();
        invalidate_collision_parts(&mut scene, handle).unwrap();
        assert!(!scene.director().unwrap().parts(handle).unwrap().is_validated());
    }

    #[test]
    fn test_validate_without_director_is_unknown() {
        let mut scene = scene();
        assert!(matches!(validate_collision_parts(&mut scene, PartHandle::default()), Err(CollisionError::UnknownParts)));
    }
}
