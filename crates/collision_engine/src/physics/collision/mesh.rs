//! Reference collision server over a plain triangle list
//!
//! [`TriangleMeshServer`] keeps its triangles in MODEL SPACE and answers arrow
//! casts by testing every triangle. It is the server used for procedurally
//! built meshes and in tests; decoded level meshes bring their own
//! [`CollisionServer`] implementation.

use crate::foundation::math::Vec3;
use super::primitives::MeshTriangle;
use super::server::{AttributeRecord, CheckArrowResult, CollisionServer, PrismRef};

/// Brute-force collision server stored in model space
#[derive(Debug, Clone, Default)]
pub struct TriangleMeshServer {
    /// Triangles in model space (never modified after construction)
    triangles: Vec<MeshTriangle>,
    /// Face normal per triangle
    normals: Vec<Vec3>,
    /// Optional attribute record per triangle
    attributes: Vec<Option<AttributeRecord>>,
}

impl TriangleMeshServer {
    /// Creates a server from model-space triangles
    pub fn from_triangles(triangles: Vec<MeshTriangle>) -> Self {
        let normals = triangles
            .iter()
            .map(|tri| {
                let edge1 = tri.v1 - tri.v0;
                let edge2 = tri.v2 - tri.v0;
                edge1.cross(&edge2).try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
            })
            .collect();
        let attributes = vec![None; triangles.len()];

        Self {
            triangles,
            normals,
            attributes,
        }
    }

    /// Creates a server from model-space vertices and a triangle index list.
    ///
    /// Triangles referencing a vertex that does not exist are skipped.
    pub fn from_vertices(vertices: &[Vec3], indices: &[u32]) -> Self {
        let mut triangles = Vec::with_capacity(indices.len() / 3);

        for chunk in indices.chunks_exact(3) {
            let corners = (
                vertices.get(chunk[0] as usize),
                vertices.get(chunk[1] as usize),
                vertices.get(chunk[2] as usize),
            );
            match corners {
                (Some(v0), Some(v1), Some(v2)) => triangles.push(MeshTriangle::new(*v0, *v1, *v2)),
                _ => log::warn!("Skipping triangle with out-of-range indices {:?}", chunk),
            }
        }

        Self::from_triangles(triangles)
    }

    /// Attach one attribute record per triangle (index-aligned, extra records ignored)
    #[must_use]
    pub fn with_attributes(mut self, attributes: Vec<AttributeRecord>) -> Self {
        for (slot, record) in self.attributes.iter_mut().zip(attributes) {
            *slot = Some(record);
        }
        self
    }
}

impl CollisionServer for TriangleMeshServer {
    fn calc_farthest_vertex_distance(&self) -> f32 {
        self.triangles
            .iter()
            .flat_map(|tri| [tri.v0, tri.v1, tri.v2])
            .map(|vertex| vertex.magnitude_squared())
            .fold(0.0f32, f32::max)
            .sqrt()
    }

    fn prism_count(&self) -> usize {
        self.triangles.len()
    }

    fn pos(&self, prism_idx: usize, vertex: usize) -> Vec3 {
        self.triangles[prism_idx].vertex(vertex)
    }

    fn face_normal(&self, prism_idx: usize) -> Vec3 {
        self.normals[prism_idx]
    }

    fn check_arrow(&self, result: &mut CheckArrowResult, max_hits: usize, origin: &Vec3, dir: &Vec3) -> bool {
        let mut hits: Vec<(usize, f32)> = self.triangles
            .iter()
            .enumerate()
            .filter_map(|(idx, tri)| tri.intersect_segment(origin, dir).map(|t| (idx, t)))
            .collect();

        // Closest first; equal distances keep mesh order
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));

        for (idx, distance) in hits.into_iter().take(max_hits) {
            result.push(PrismRef(idx as u32), distance);
        }

        !result.is_empty()
    }

    fn to_index(&self, prism: PrismRef) -> usize {
        prism.0 as usize
    }

    fn attributes(&self, prism_idx: usize) -> Option<&AttributeRecord> {
        self.attributes.get(prism_idx)?.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stacked_quads() -> TriangleMeshServer {
        // Two unit quads at y = 0 and y = 2, upper one listed first
        let vertices = [
            Vec3::new(0.0, 2.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(1.0, 2.0, 1.0),
            Vec3::new(0.0, 2.0, 1.0),
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(0.0, 0.0, 1.0),
        ];
        let indices = [0, 2, 1, 0, 3, 2, 4, 6, 5, 4, 7, 6];
        TriangleMeshServer::from_vertices(&vertices, &indices)
    }

    #[test]
    fn test_farthest_vertex_distance() {
        let server = stacked_quads();
        assert_relative_eq!(server.calc_farthest_vertex_distance(), 6.0f32.sqrt());
        assert_eq!(server.prism_count(), 4);
    }

    #[test]
    fn test_check_arrow_orders_by_distance_and_caps() {
        let server = stacked_quads();
        let mut result = CheckArrowResult::new();
        let origin = Vec3::new(0.25, -1.0, 0.75);
        let dir = Vec3::new(0.0, 4.0, 0.0);

        assert!(server.check_arrow(&mut result, 8, &origin, &dir));
        assert_eq!(result.len(), 2);
        assert_relative_eq!(result.hits()[0].distance, 0.25);
        assert_relative_eq!(result.hits()[1].distance, 0.75);
        assert!(server.to_index(result.hits()[0].prism) >= 2);

        result.reset();
        assert!(server.check_arrow(&mut result, 1, &origin, &dir));
        assert_eq!(result.len(), 1);
        assert_relative_eq!(result.hits()[0].distance, 0.25);
    }

    #[test]
    fn test_out_of_range_indices_are_skipped() {
        let vertices = [Vec3::zeros(), Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, 0.0, 1.0)];
        let server = TriangleMeshServer::from_vertices(&vertices, &[0, 1, 2, 0, 1, 9]);
        assert_eq!(server.prism_count(), 1);
    }

    #[test]
    fn test_attributes_are_index_aligned() {
        let server = stacked_quads().with_attributes(vec![
            AttributeRecord::new().with_field("Floor_code", 1),
            AttributeRecord::new().with_field("Floor_code", 2),
        ]);

        assert_eq!(server.attributes(1).and_then(|a| a.get("Floor_code")), Some(2));
        assert!(server.attributes(3).is_none());
        assert!(server.attributes(42).is_none());
    }
}
