//! Shared fixtures: sensors, meshes, a counting server, a test decoder and actor

use std::cell::Cell;
use std::rc::Rc;

use crate::foundation::math::{Transform, Vec3};
use crate::physics::collision::error::CollisionError;
use crate::physics::collision::mesh::TriangleMeshServer;
use crate::physics::collision::primitives::MeshTriangle;
use crate::physics::collision::resource::{CollisionActor, MemoryArchive, MeshDecoder, ResourceArchive};
use crate::physics::collision::server::{AttributeRecord, CheckArrowResult, CollisionServer, PrismRef};
use crate::physics::collision::triangle::{ActorId, HitSensor};
use crate::physics::collision::zone::ZoneId;

pub fn sensor(actor: u32) -> HitSensor {
    HitSensor::new(ActorId(actor))
}

/// The horizontal triangle `(0,0,0)-(1,0,0)-(0,0,1)`
pub fn floor_triangle_server() -> TriangleMeshServer {
    TriangleMeshServer::from_triangles(vec![MeshTriangle::new(
        Vec3::zeros(),
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    )])
}

/// Wraps a server and counts mesh-level casts
pub struct CountingServer {
    inner: TriangleMeshServer,
    calls: Rc<Cell<usize>>,
}

impl CountingServer {
    pub fn new(inner: TriangleMeshServer) -> (Self, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        (Self { inner, calls: calls.clone() }, calls)
    }
}

impl CollisionServer for CountingServer {
    fn calc_farthest_vertex_distance(&self) -> f32 {
        self.inner.calc_farthest_vertex_distance()
    }

    fn prism_count(&self) -> usize {
        self.inner.prism_count()
    }

    fn pos(&self, prism_idx: usize, vertex: usize) -> Vec3 {
        self.inner.pos(prism_idx, vertex)
    }

    fn face_normal(&self, prism_idx: usize) -> Vec3 {
        self.inner.face_normal(prism_idx)
    }

    fn check_arrow(&self, result: &mut CheckArrowResult, max_hits: usize, origin: &Vec3, dir: &Vec3) -> bool {
        self.calls.set(self.calls.get() + 1);
        self.inner.check_arrow(result, max_hits, origin, dir)
    }

    fn to_index(&self, prism: PrismRef) -> usize {
        self.inner.to_index(prism)
    }
}

/// Little-endian `f32` triangle soup, nine floats per triangle
pub fn soup_bytes(vertices: &[[f32; 3]]) -> Vec<u8> {
    vertices
        .iter()
        .flatten()
        .flat_map(|value| value.to_le_bytes())
        .collect()
}

/// Decodes [`soup_bytes`] meshes; `.pa` data is one little-endian `i32`
/// floor code per triangle
pub struct SoupDecoder;

impl MeshDecoder for SoupDecoder {
    fn decode(&self, kcl: &[u8], pa: Option<&[u8]>) -> Result<Box<dyn CollisionServer>, CollisionError> {
        const TRIANGLE_BYTES: usize = 9 * 4;

        if kcl.is_empty() || kcl.len() % TRIANGLE_BYTES != 0 {
            return Err(CollisionError::Decode {
                name: String::new(),
                reason: format!("{} bytes is not a whole number of triangles", kcl.len()),
            });
        }

        let floats: Vec<f32> = kcl
            .chunks_exact(4)
            .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect();
        let triangles = floats
            .chunks_exact(9)
            .map(|f| {
                MeshTriangle::new(
                    Vec3::new(f[0], f[1], f[2]),
                    Vec3::new(f[3], f[4], f[5]),
                    Vec3::new(f[6], f[7], f[8]),
                )
            })
            .collect();

        let mut server = TriangleMeshServer::from_triangles(triangles);
        if let Some(pa) = pa {
            let records = pa
                .chunks_exact(4)
                .map(|bytes| {
                    let code = i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
                    AttributeRecord::new().with_field("Floor_code", code)
                })
                .collect();
            server = server.with_attributes(records);
        }

        Ok(Box::new(server))
    }
}

pub struct TestActor {
    pub actor_id: ActorId,
    pub zone_id: ZoneId,
    pub transform: Transform,
    pub archive: MemoryArchive,
}

impl TestActor {
    pub fn new(actor: u32, archive: MemoryArchive) -> Self {
        Self {
            actor_id: ActorId(actor),
            zone_id: ZoneId::GLOBAL,
            transform: Transform::identity(),
            archive,
        }
    }
}

impl CollisionActor for TestActor {
    fn actor_id(&self) -> ActorId {
        self.actor_id
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
