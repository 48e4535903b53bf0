//! Zone demo application
//!
//! Scatters moving platforms over a few collision zones above a static
//! ground plane, runs the per-frame movement pass and probes the map for
//! ground below a handful of points.

use std::cell::Cell;
use std::rc::Rc;

use collision_engine::config::{CollisionConfig, Config};
use collision_engine::foundation::collections::PartHandle;
use collision_engine::foundation::logging;
use collision_engine::foundation::math::{Mat4Ext, Quat, Transform, Vec3};
use collision_engine::physics::collision::{
    calc_map_ground_default, create_collision_parts_from_live_actor, get_first_poly_on_line_to_map_except_actor,
    try_create_collision_water_surface, validate_collision_parts, ActorId, CollisionActor, CollisionError,
    CollisionScaleType, CollisionScene, CollisionServer, HitSensor, HostMtx, MemoryArchive, MeshDecoder,
    ResourceArchive, TriangleMeshServer, ZoneId,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const FRAMES: usize = 120;
const PLATFORM_COUNT: usize = 12;

/// Decodes the demo's quad resources: one little-endian `f32` half extent
struct QuadDecoder;

impl MeshDecoder for QuadDecoder {
    fn decode(&self, kcl: &[u8], _pa: Option<&[u8]>) -> Result<Box<dyn CollisionServer>, CollisionError> {
        let bytes: [u8; 4] = kcl.try_into().map_err(|_| CollisionError::Decode {
            name: String::new(),
            reason: format!("expected 4 bytes, got {}", kcl.len()),
        })?;
        let half = f32::from_le_bytes(bytes);

        let vertices = [
            Vec3::new(-half, 0.0, -half),
            Vec3::new(half, 0.0, -half),
            Vec3::new(half, 0.0, half),
            Vec3::new(-half, 0.0, half),
        ];
        Ok(Box::new(TriangleMeshServer::from_vertices(&vertices, &[0, 2, 1, 0, 3, 2])))
    }
}

struct DemoActor {
    id: ActorId,
    zone_id: ZoneId,
    transform: Transform,
    archive: MemoryArchive,
}

impl CollisionActor for DemoActor {
    fn actor_id(&self) -> ActorId {
        self.id
    }

    fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    fn transform(&self) -> Transform {
        self.transform.clone()
    }

    fn archive(&self) -> &dyn ResourceArchive {
        &self.archive
    }
}

struct Platform {
    actor: ActorId,
    handle: PartHandle,
    host: HostMtx,
    base: Vec3,
    rotation: Quat,
    phase: f32,
}

fn quad(half: f32) -> Vec<u8> {
    half.to_le_bytes().to_vec()
}

fn load_config() -> Result<CollisionConfig, Box<dyn std::error::Error>> {
    match std::env::args().nth(1) {
        Some(path) => {
            log::info!("Loading collision config from {}", path);
            Ok(CollisionConfig::load_from_file(&path)?)
        }
        None => Ok(CollisionConfig::default()),
    }
}

fn spawn_platforms(scene: &mut CollisionScene, rng: &mut StdRng) -> Result<Vec<Platform>, CollisionError> {
    let mut platforms = Vec::with_capacity(PLATFORM_COUNT);

    for i in 0..PLATFORM_COUNT {
        let zone = rng.gen_range(1..=3u32);
        let base = Vec3::new(
            zone as f32 * 30.0 + rng.gen_range(-10.0..10.0),
            rng.gen_range(2.0..8.0),
            rng.gen_range(-10.0..10.0),
        );
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), rng.gen_range(0.0..std::f32::consts::TAU));
        let host: HostMtx = Rc::new(Cell::new(Transform::from_position_rotation(base, rotation).to_matrix()));

        let actor = DemoActor {
            id: ActorId(100 + i as u32),
            zone_id: ZoneId(zone),
            transform: Transform::from_position(base),
            archive: MemoryArchive::new().with_file("Platform.kcl", quad(rng.gen_range(1.0..3.0))),
        };

        let handle = create_collision_parts_from_live_actor(
            scene,
            &actor,
            "Platform",
            HitSensor::new(actor.id),
            Some(host.clone()),
            CollisionScaleType::AutoEqualScale,
        )?;
        validate_collision_parts(scene, handle)?;

        platforms.push(Platform {
            actor: actor.id,
            handle,
            host,
            base,
            rotation,
            phase: rng.gen_range(0.0..std::f32::consts::TAU),
        });
    }

    Ok(platforms)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    log::info!("Starting zone demo");

    let config = load_config()?;
    let mut scene = CollisionScene::new(config, Box::new(QuadDecoder));
    let mut rng = StdRng::seed_from_u64(7);

    let ground = DemoActor {
        id: ActorId(1),
        zone_id: ZoneId::GLOBAL,
        transform: Transform::identity(),
        archive: MemoryArchive::new().with_file("Ground.kcl", quad(200.0)),
    };
    let ground_parts = create_collision_parts_from_live_actor(
        &mut scene,
        &ground,
        "Ground",
        HitSensor::new(ground.id),
        None,
        CollisionScaleType::NotUsingScale,
    )?;
    validate_collision_parts(&mut scene, ground_parts)?;

    let pond = DemoActor {
        id: ActorId(2),
        zone_id: ZoneId(4),
        transform: Transform::from_position(Vec3::new(-40.0, 0.5, 0.0)).with_scale(Vec3::new(2.0, 1.0, 2.0)),
        archive: MemoryArchive::new().with_file("WaterSurface.kcl", quad(10.0)),
    };
    match try_create_collision_water_surface(&mut scene, &pond, HitSensor::new(pond.id))? {
        Some(handle) => log::info!("Pond water surface created: {:?}", handle),
        None => log::info!("Pond has no water surface"),
    }

    let platforms = spawn_platforms(&mut scene, &mut rng)?;
    log::info!("Spawned {} platforms", platforms.len());

    let probes: Vec<Vec3> = (0..8)
        .map(|_| Vec3::new(rng.gen_range(10.0..110.0), 50.0, rng.gen_range(-10.0..10.0)))
        .collect();

    let mut platform_landings = 0usize;
    for frame in 0..FRAMES {
        let t = frame as f32 / 30.0;

        for platform in &platforms {
            let lift = (t + platform.phase).sin() * 1.5;
            let position = platform.base + Vec3::new(0.0, lift, 0.0);
            platform
                .host
                .set(Transform::from_position_rotation(position, platform.rotation).to_matrix());

            if let Some(parts) = scene.director_mut().and_then(|director| director.parts_mut(platform.handle)) {
                parts.set_mtx_from_host()?;
            }
        }

        scene.movement();

        for probe in &probes {
            let Some(ground_point) = calc_map_ground_default(&mut scene, probe) else {
                continue;
            };
            if ground_point.y > 0.5 {
                platform_landings += 1;
            }
            if frame % 30 == 0 {
                log::info!("frame {:3}: ground below ({:6.2}, {:6.2}) at height {:.2}", frame, probe.x, probe.z, ground_point.y);
            }
        }
    }

    if let Some(platform) = platforms.first() {
        let above = platform.host.get().translation_vector() + Vec3::new(0.0, 20.0, 0.0);
        let down = Vec3::new(0.0, -40.0, 0.0);
        if let Some(hit) = get_first_poly_on_line_to_map_except_actor(&mut scene, &above, &down, platform.actor) {
            log::info!(
                "Looking through platform {:?}: hit {:?} at {:?}",
                platform.actor,
                hit.triangle.hit_sensor.map(|sensor| sensor.actor),
                hit.strike_loc
            );
        }
    }

    log::info!("{} of {} probes landed on a platform", platform_landings, FRAMES * probes.len());
    scene.teardown();
    Ok(())
}
