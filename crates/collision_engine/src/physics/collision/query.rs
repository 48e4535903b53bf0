//! First-hit line queries
//!
//! The keeper returns hits in zone/part order; these functions pick the
//! closest one. A `None` result means nothing was hit, including when the
//! scene has no collision director yet.

use crate::foundation::math::Vec3;
use super::filter::{CollisionPartsFilter, CollisionPartsFilterActor, TriangleFilter};
use super::keeper::Category;
use super::scene::CollisionScene;
use super::triangle::{ActorId, HitInfo};

/// Closest hit of segment `[p0, p0 + dir]` against `category`.
///
/// Equal distances resolve to the hit collected first.
///
/// # Panics
///
/// Panics when hits were collected but `tri_filter` rejects all of them on
/// the final scan. The filter is applied while collecting too, so this only
/// happens with a filter that changes its answer between calls.
pub fn get_first_poly_on_line_category(
    scene: &mut CollisionScene,
    p0: &Vec3,
    dir: &Vec3,
    tri_filter: Option<&dyn TriangleFilter>,
    parts_filter: Option<&dyn CollisionPartsFilter>,
    category: Category,
) -> Option<HitInfo> {
    let director = scene.director_mut()?;

    let count = director.check_strike_line(category, p0, dir, parts_filter, tri_filter, None);
    if count == 0 {
        return None;
    }

    let mut best_dist = f32::INFINITY;
    let mut best = None;
    for strike_info in director.keeper(category).strike_infos() {
        if tri_filter.is_some_and(|filter| filter.is_invalid_triangle(&strike_info.triangle)) {
            continue;
        }
        if strike_info.distance < best_dist {
            best_dist = strike_info.distance;
            best = Some(strike_info);
        }
    }

    let Some(best) = best else {
        panic!("{count} line hits collected but none passed the triangle filter");
    };
    Some(best.clone())
}

/// Closest map hit of segment `[p0, p0 + dir]`
pub fn get_first_poly_on_line_to_map(scene: &mut CollisionScene, p0: &Vec3, dir: &Vec3) -> Option<HitInfo> {
    get_first_poly_on_line_category(scene, p0, dir, None, None, Category::Map)
}

/// Closest map hit of segment `[p0, p0 + dir]`, ignoring parts owned by `actor`
pub fn get_first_poly_on_line_to_map_except_actor(
    scene: &mut CollisionScene,
    p0: &Vec3,
    dir: &Vec3,
    actor: ActorId,
) -> Option<HitInfo> {
    let parts_filter = CollisionPartsFilterActor::new(actor);
    get_first_poly_on_line_category(scene, p0, dir, None, Some(&parts_filter), Category::Map)
}

/// Map ground point below `p0`, probing `height` units straight down
pub fn calc_map_ground(scene: &mut CollisionScene, p0: &Vec3, height: f32) -> Option<Vec3> {
    let dir = Vec3::new(0.0, -height, 0.0);
    get_first_poly_on_line_category(scene, p0, &dir, None, None, Category::Map).map(|hit| hit.strike_loc)
}

/// [`calc_map_ground`] with the configured probe height
pub fn calc_map_ground_default(scene: &mut CollisionScene, p0: &Vec3) -> Option<Vec3> {
    let height = scene.config().ground_probe_height;
    calc_map_ground(scene, p0, height)
}
