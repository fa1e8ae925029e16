//! Geometry helpers shared by the camera operations.

use foundation::GeoPoint;
use foundation::math::{GeometryModel, Vec2};
use scene::SceneModel;

/// Plane tangent to the surface at `focus`, in the scene's projected
/// coordinate space. The normal is the local up, derived by projecting the
/// focus at two altitudes and normalizing the difference in nominal meters.
pub fn tangent_plane_at(sm: &SceneModel, focus: &GeoPoint) -> Option<GeometryModel> {
    let mut anchor = *focus;
    if anchor.altitude.is_none() {
        anchor.altitude = Some(0.0);
    }

    let base = sm.projection.forward(&anchor).ok()?;
    let mut lifted_geo = anchor;
    lifted_geo.altitude = Some(anchor.altitude_or(0.0) + 100.0);
    let lifted = sm.projection.forward(&lifted_geo).ok()?;

    let normal = sm.display_model.to_nominal_meters(lifted - base).normalized()?;
    Some(GeometryModel::Plane { normal, point: base })
}

/// Earth geometry displaced to the focus altitude: the intersection target
/// for motions that must preserve the focus point's height. Planar scenes
/// use the tangent plane instead.
pub fn focus_altitude_model(sm: &SceneModel, focus: &GeoPoint) -> Option<GeometryModel> {
    match sm.earth {
        GeometryModel::Plane { .. } => tangent_plane_at(sm, focus),
        earth => Some(earth.inflated(focus.altitude_or(0.0))),
    }
}

/// Ratio of the camera range at the focus to the camera range at the given
/// screen position, measured in nominal meters. Zero when the position does
/// not intersect the earth.
pub fn compute_relative_density_ratio(sm: &SceneModel, x: f64, y: f64) -> f64 {
    let Some(end) = sm.inverse_raycast_model(Vec2::new(x, y), &sm.earth, false) else {
        return 0.0;
    };
    let Ok(end_wcs) = sm.projection.forward(&end) else {
        return 0.0;
    };

    let cam_m = sm.display_model.to_nominal_meters(sm.camera.location);
    let end_len = (sm.display_model.to_nominal_meters(end_wcs) - cam_m).length();
    if end_len == 0.0 {
        return 0.0;
    }
    let focus_len = (sm.display_model.to_nominal_meters(sm.camera.target) - cam_m).length();
    focus_len / end_len
}
