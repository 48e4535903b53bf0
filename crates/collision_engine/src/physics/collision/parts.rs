//! Collision parts: one mesh instance placed in the world
//!
//! A [`CollisionParts`] owns its mesh-local [`CollisionServer`] and the
//! transform state used to move it. Transforms are staged into
//! `new_world_mtx` (possibly several times per frame) and committed once by
//! [`CollisionParts::update_mtx`] during the movement pass.
//!
//! Queries run in the part's local space: the segment is brought in with the
//! cached inverse world matrix, cast against the server, and the hits are
//! pushed back out to world space.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_EQUAL_SCALE_TOLERANCE;
use crate::foundation::collections::PartHandle;
use crate::foundation::math::{is_near_zero, Mat4, Mat4Ext, Vec3};
use super::error::CollisionError;
use super::filter::TriangleFilter;
use super::keeper::Category;
use super::server::{CheckArrowResult, CollisionServer};
use super::triangle::{HitInfo, HitSensor};
use super::zone::ZoneId;

/// Host transform shared with the actor that drives a part
pub type HostMtx = Rc<Cell<Mat4>>;

/// How a part neutralizes anisotropic scale in its host transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollisionScaleType {
    /// Equalize all axes to the mean axis scale
    AutoEqualScale,
    /// Strip scale entirely unless it is already uniform
    NotUsingScale,
    /// Leave the transform untouched
    AutoScale,
}

/// Normalize the scale of `mtx` in place according to `scale_type`.
///
/// Returns the uniform scale factor the collision mesh ends up with. Axis
/// scales count as equal when their pairwise differences are within
/// `tolerance`.
pub fn make_equal_scale(scale_type: CollisionScaleType, mtx: &mut Mat4, tolerance: f32) -> f32 {
    if scale_type == CollisionScaleType::AutoScale {
        return 1.0;
    }

    let scales = mtx.axis_scales();
    let scale_xy = scales.x - scales.y;
    let scale_zx = scales.z - scales.x;
    let scale_yz = scales.y - scales.z;

    if is_near_zero(scale_xy, tolerance) && is_near_zero(scale_zx, tolerance) && is_near_zero(scale_yz, tolerance) {
        return scales.x;
    }

    let scale = match scale_type {
        CollisionScaleType::NotUsingScale => 1.0,
        _ => avg_scale(&scales),
    };

    let factors = scales.map(|axis| if axis > 0.0 { scale / axis } else { 1.0 });
    mtx.scale_axes(&factors);
    scale
}

fn avg_scale(scales: &Vec3) -> f32 {
    (scales.x + scales.y + scales.z) / 3.0
}

/// One collidable mesh instance
pub struct CollisionParts {
    handle: PartHandle,
    validated: bool,
    host_mtx: Option<HostMtx>,

    collision_server: Box<dyn CollisionServer>,
    check_arrow_result: CheckArrowResult,

    new_world_mtx: Mat4,
    inv_world_mtx: Mat4,
    world_mtx: Mat4,
    old_world_mtx: Mat4,
    not_moved_counter: u32,

    zone_id: ZoneId,
    category: Category,
    hit_sensor: HitSensor,
    scale_type: CollisionScaleType,
    equal_scale_tolerance: f32,

    scale: f32,
    farthest_vertex_distance: f32,
    bounding_sphere_radius: f32,

    set_update_mtx: bool,
    set_update_mtx_one_time: bool,
}

impl CollisionParts {
    /// Create a part placed at `initial_host_mtx`.
    ///
    /// The part is not registered anywhere yet; the director does that and
    /// validation makes it visible to queries.
    pub fn new(
        handle: PartHandle,
        zone_id: ZoneId,
        initial_host_mtx: &Mat4,
        hit_sensor: HitSensor,
        collision_server: Box<dyn CollisionServer>,
        category: Category,
        scale_type: CollisionScaleType,
    ) -> Self {
        let farthest_vertex_distance = collision_server.calc_farthest_vertex_distance();

        let mut parts = Self {
            handle,
            validated: false,
            host_mtx: None,
            collision_server,
            check_arrow_result: CheckArrowResult::new(),
            new_world_mtx: Mat4::identity(),
            inv_world_mtx: Mat4::identity(),
            world_mtx: Mat4::identity(),
            old_world_mtx: Mat4::identity(),
            not_moved_counter: 0,
            zone_id,
            category,
            hit_sensor,
            scale_type,
            equal_scale_tolerance: DEFAULT_EQUAL_SCALE_TOLERANCE,
            scale: 0.0,
            farthest_vertex_distance,
            bounding_sphere_radius: 0.0,
            set_update_mtx: true,
            set_update_mtx_one_time: false,
        };

        parts.reset_all_mtx(initial_host_mtx);
        parts.update_bounding_sphere_range_from_scale_vector(&initial_host_mtx.axis_scales());
        parts
    }

    /// Override the axis-scale equality tolerance
    #[must_use]
    pub fn with_equal_scale_tolerance(mut self, tolerance: f32) -> Self {
        self.equal_scale_tolerance = tolerance;
        self
    }

    /// Handle of this part in the director's part table
    pub fn handle(&self) -> PartHandle {
        self.handle
    }

    /// Whether the part is registered in its zone and visible to queries
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub(crate) fn set_validated(&mut self, validated: bool) {
        self.validated = validated;
    }

    /// The mesh-local acceleration structure
    pub fn collision_server(&self) -> &dyn CollisionServer {
        self.collision_server.as_ref()
    }

    /// Attached host transform, if any
    pub fn host_mtx(&self) -> Option<&HostMtx> {
        self.host_mtx.as_ref()
    }

    /// Attach or detach the host transform
    pub fn set_host_mtx(&mut self, host_mtx: Option<HostMtx>) {
        self.host_mtx = host_mtx;
    }

    /// Current (committed) world matrix
    pub fn world_mtx(&self) -> &Mat4 {
        &self.world_mtx
    }

    /// World matrix before the last commit
    pub fn old_world_mtx(&self) -> &Mat4 {
        &self.old_world_mtx
    }

    /// Staged world matrix, committed by the next [`update_mtx`](Self::update_mtx)
    pub fn new_world_mtx(&self) -> &Mat4 {
        &self.new_world_mtx
    }

    /// Cached inverse of the world matrix
    pub fn inv_world_mtx(&self) -> &Mat4 {
        &self.inv_world_mtx
    }

    /// Consecutive movement passes without a transform change (saturates at 2)
    pub fn not_moved_counter(&self) -> u32 {
        self.not_moved_counter
    }

    /// Zone this part belongs to
    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    /// Category (keeper) this part belongs to
    pub fn category(&self) -> Category {
        self.category
    }

    /// Sensor hits are reported through
    pub fn hit_sensor(&self) -> HitSensor {
        self.hit_sensor
    }

    /// Scale normalization policy
    pub fn scale_type(&self) -> CollisionScaleType {
        self.scale_type
    }

    /// Uniform scale the bounding sphere was last sized with
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Farthest vertex distance of the mesh in local units
    pub fn farthest_vertex_distance(&self) -> f32 {
        self.farthest_vertex_distance
    }

    /// World-space bounding sphere radius around [`trans`](Self::trans)
    pub fn bounding_sphere_radius(&self) -> f32 {
        self.bounding_sphere_radius
    }

    /// World translation of the part
    pub fn trans(&self) -> Vec3 {
        self.world_mtx.translation_vector()
    }

    /// Enable or disable transform commits.
    ///
    /// A disabled part keeps its world matrix and only tracks the not-moved counter.
    pub fn set_update_mtx_enabled(&mut self, enabled: bool) {
        self.set_update_mtx = enabled;
    }

    /// Whether transform commits are enabled
    pub fn is_update_mtx_enabled(&self) -> bool {
        self.set_update_mtx
    }

    /// Whether the next [`update_mtx`](Self::update_mtx) follows a forced reset
    pub fn is_update_mtx_one_time(&self) -> bool {
        self.set_update_mtx_one_time
    }

    /// Stage a new world matrix
    pub fn set_mtx(&mut self, mtx: &Mat4) {
        self.new_world_mtx = *mtx;
    }

    /// Stage the current host matrix
    pub fn set_mtx_from_host(&mut self) -> Result<(), CollisionError> {
        self.new_world_mtx = self.host_matrix()?;
        Ok(())
    }

    /// Commit the staged matrix. Called once per movement pass.
    pub fn update_mtx(&mut self) {
        let not_moved = self.new_world_mtx.approx_eq(&self.world_mtx);

        if !(self.set_update_mtx || self.set_update_mtx_one_time) {
            self.not_moved_counter = if not_moved { (self.not_moved_counter + 1).min(2) } else { 0 };
            return;
        }

        if not_moved {
            self.not_moved_counter = (self.not_moved_counter + 1).min(2);
        } else {
            self.not_moved_counter = u32::from(self.set_update_mtx_one_time);

            let equal_scale = make_equal_scale(self.scale_type, &mut self.new_world_mtx, self.equal_scale_tolerance);
            let scale = self.radius_scale(&self.new_world_mtx, equal_scale);
            if !is_near_zero(scale - self.scale, self.equal_scale_tolerance) {
                self.update_bounding_sphere_range_private(scale);
            }
        }

        self.set_update_mtx_one_time = false;

        if self.not_moved_counter < 2 {
            self.old_world_mtx = self.world_mtx;
            self.world_mtx = self.new_world_mtx;
            self.refresh_inverse();
        }
    }

    /// Reset every matrix to the (scale-normalized) host matrix and make the
    /// next movement pass commit even if transform updates are disabled.
    ///
    /// The reset itself does not count as a move. The owning keeper still
    /// checks the zone volume against the new place on its next pass.
    pub fn force_reset_all_mtx_and_set_update_mtx_one_time(&mut self) -> Result<(), CollisionError> {
        self.reset_all_mtx_from_host()?;
        self.set_update_mtx_one_time = true;
        Ok(())
    }

    /// Reset every matrix to `host_mtx` as-is
    pub fn reset_all_mtx(&mut self, host_mtx: &Mat4) {
        self.new_world_mtx = *host_mtx;
        self.old_world_mtx = *host_mtx;
        self.world_mtx = *host_mtx;
        self.refresh_inverse();
    }

    /// Reset every matrix to the scale-normalized host matrix
    pub fn reset_all_mtx_from_host(&mut self) -> Result<(), CollisionError> {
        let mut mtx = self.host_matrix()?;
        make_equal_scale(self.scale_type, &mut mtx, self.equal_scale_tolerance);
        self.reset_all_mtx(&mtx);
        Ok(())
    }

    /// Size the bounding sphere from a per-axis scale vector
    pub fn update_bounding_sphere_range_from_scale_vector(&mut self, scales: &Vec3) {
        let scale = match self.scale_type {
            CollisionScaleType::AutoScale => scales.max(),
            _ => avg_scale(scales),
        };
        self.update_bounding_sphere_range_private(scale);
    }

    /// Size the bounding sphere from the host matrix
    pub fn update_bounding_sphere_range_from_host_mtx(&mut self) -> Result<(), CollisionError> {
        let mut mtx = self.host_matrix()?;
        let equal_scale = make_equal_scale(self.scale_type, &mut mtx, self.equal_scale_tolerance);
        let scale = self.radius_scale(&mtx, equal_scale);
        self.update_bounding_sphere_range_private(scale);
        Ok(())
    }

    /// Cast the world-space segment `[p0, p0 + dir]` against this part.
    ///
    /// Hits are written to `hit_info` starting at `dst_idx`, never past its
    /// end, in the order the server reports them. Triangles rejected by
    /// `tri_filter` do not use up a slot. Returns the number written.
    pub fn check_strike_line(
        &mut self,
        hit_info: &mut [HitInfo],
        dst_idx: usize,
        p0: &Vec3,
        dir: &Vec3,
        tri_filter: Option<&dyn TriangleFilter>,
    ) -> usize {
        let capacity = hit_info.len().saturating_sub(dst_idx);
        if capacity == 0 {
            return 0;
        }

        let local_p0 = self.inv_world_mtx.transform_point_w1(p0);
        let local_dir = self.inv_world_mtx.transform_vector_w0(dir);

        self.check_arrow_result.reset();
        self.collision_server.check_arrow(&mut self.check_arrow_result, capacity, &local_p0, &local_dir);

        let mut dst = dst_idx;
        for i in 0..self.check_arrow_result.len() {
            if dst >= hit_info.len() {
                break;
            }
            let Some(hit) = self.check_arrow_result.get(i) else {
                break;
            };

            let prism_idx = self.collision_server.to_index(hit.prism);
            let info = &mut hit_info[dst];
            info.triangle.fill_data(self, prism_idx);
            if tri_filter.is_some_and(|filter| filter.is_invalid_triangle(&info.triangle)) {
                continue;
            }

            let local_strike = local_p0 + local_dir * hit.distance;
            info.strike_loc = self.world_mtx.transform_point_w1(&local_strike);
            info.distance = hit.distance;
            dst += 1;
        }

        dst - dst_idx
    }

    fn host_matrix(&self) -> Result<Mat4, CollisionError> {
        self.host_mtx
            .as_ref()
            .map(|host| host.get())
            .ok_or(CollisionError::NoHostMtx)
    }

    // AutoScale leaves the transform anisotropic, so its mesh is as large as
    // its largest axis.
    fn radius_scale(&self, mtx: &Mat4, equal_scale: f32) -> f32 {
        match self.scale_type {
            CollisionScaleType::AutoScale => mtx.axis_scales().max(),
            _ => equal_scale,
        }
    }

    fn update_bounding_sphere_range_private(&mut self, scale: f32) {
        self.scale = scale;
        self.bounding_sphere_radius = self.farthest_vertex_distance * scale;
    }

    fn refresh_inverse(&mut self) {
        match self.world_mtx.try_inverse() {
            Some(inv) => self.inv_world_mtx = inv,
            None => log::warn!("Collision parts {:?} has a singular world matrix; keeping previous inverse", self.handle),
        }
    }
}

impl fmt::Debug for CollisionParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionParts")
            .field("handle", &self.handle)
            .field("validated", &self.validated)
            .field("zone_id", &self.zone_id)
            .field("category", &self.category)
            .field("hit_sensor", &self.hit_sensor)
            .field("scale_type", &self.scale_type)
            .field("trans", &self.trans())
            .field("bounding_sphere_radius", &self.bounding_sphere_radius)
            .field("not_moved_counter", &self.not_moved_counter)
            .finish_non_exhaustive()
    }
}
