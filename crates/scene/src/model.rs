use foundation::GeoPoint;
use foundation::math::{
    GeometryModel, Hemisphere, Mat4, Ray, Vec2, Vec3, WGS84_A, distance_to_horizon,
    normalize_azimuth, stable_total_cmp_f64, wrap_longitude,
};
use projection::{DisplayModel, Projection, SRID_GEODETIC, display_model_for};

use crate::camera::{Camera, CameraMode};
use crate::error::SceneError;
use crate::services::{
    InverseContext, InverseHints, InverseMode, InverseResult, InverseSource,
};

/// Full vertical field of view of the scene camera, degrees.
pub const VFOV_DEG: f64 = 45.0;

const HALF_VFOV_DEG: f64 = VFOV_DEG / 2.0;
const MIN_ZOOM_RANGE_M: f64 = 10.0;
const MAX_ZOOM_RANGE_M: f64 = 16_000_000.0;

/// Standoff floor for synthetic orthographic ray origins, meters.
const ORTHO_STANDOFF_FLOOR_M: f64 = 2_000.0;

/// Ground sample distance at the focus for a camera `range` meters away.
pub fn gsd_from_range(range: f64, vfov_deg: f64, height_px: f64) -> f64 {
    range * (vfov_deg / 2.0).to_radians().tan() / (height_px / 2.0)
}

/// Camera range producing the given ground sample distance at the focus.
pub fn range_from_gsd(gsd: f64, vfov_deg: f64, height_px: f64) -> f64 {
    gsd * (height_px / 2.0) / (vfov_deg / 2.0).to_radians().tan()
}

/// Screen-space vertical origin convention.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisplayOrigin {
    /// Pixel (0,0) at the top-left, y increasing downward.
    UpperLeft,
    /// Pixel (0,0) at the bottom-left, y increasing upward.
    LowerLeft,
}

/// Antimeridian bookkeeping derived at construction.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct IdlInfo {
    /// Visible viewport spans the +/-180 discontinuity.
    pub crosses: bool,
    /// Hemisphere of the focus point, for fast unwrap decisions.
    pub hemisphere: Hemisphere,
    /// Westmost visible longitude, wrapped to [-180, 180).
    pub west_bound: f64,
    /// Eastmost visible longitude, wrapped to [-180, 180).
    pub east_bound: f64,
}

impl IdlInfo {
    fn whole_world(focus_lon: f64) -> Self {
        Self {
            crosses: false,
            hemisphere: Hemisphere::of(focus_lon),
            west_bound: -180.0,
            east_bound: 180.0,
        }
    }
}

/// The construction tuple for a [`SceneModel`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SceneParams {
    pub display_dpi: f64,
    pub width: f64,
    pub height: f64,
    pub projection: Projection,
    pub focus: GeoPoint,
    pub focus_x: f64,
    pub focus_y: f64,
    /// Degrees clockwise from north; normalized to [0, 360).
    pub rotation: f64,
    /// Degrees from nadir; clamped to [0, 85] (perspective) or [0, 89]
    /// (orthographic).
    pub tilt: f64,
    /// Ground sample distance at the focus, meters per pixel.
    pub resolution: f64,
    pub mode: CameraMode,
    pub continuous_scroll: bool,
}

/// Immutable mapping between geodetic coordinates and screen pixels for one
/// rendered frame.
///
/// Constructed fresh for every parameter change, never mutated. Once
/// published a scene model may be shared freely across threads; `forward`
/// and `inverse` have no side effects.
///
/// Invariant: `forward_transform` and `inverse_transform` are mutual
/// inverses up to floating-point tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneModel {
    pub display_dpi: f64,
    pub width: f64,
    pub height: f64,
    pub focus_x: f64,
    pub focus_y: f64,
    /// Focus geodetic point after normalization and domain clamping.
    pub focus_geo: GeoPoint,
    /// Ground sample distance at the focus, meters per pixel.
    pub gsd: f64,
    pub camera: Camera,
    pub projection: Projection,
    pub display_model: &'static DisplayModel,
    /// Idealized earth geometry in projected space; the ray-cast fallback.
    pub earth: GeometryModel,
    pub continuous_scroll: bool,
    pub origin: DisplayOrigin,
    pub idl: IdlInfo,
    forward_transform: Mat4,
    inverse_transform: Mat4,
}

impl SceneModel {
    /// Builds the scene from the construction tuple. Fails rather than
    /// producing a partially valid model.
    pub fn new(params: &SceneParams) -> Result<Self, SceneError> {
        if !params.resolution.is_finite() || params.resolution <= 0.0 {
            return Err(SceneError::InvalidResolution);
        }
        let mut focus = params.focus.normalized();
        if !focus.is_valid() {
            return Err(SceneError::InvalidFocus);
        }
        let proj = params.projection;
        focus.latitude = focus
            .latitude
            .clamp(proj.min_latitude(), proj.max_latitude());

        let rotation = normalize_azimuth(params.rotation);
        let max_tilt = match params.mode {
            CameraMode::Perspective => 85.0,
            CameraMode::Orthographic => 89.0,
        };
        let tilt = params.tilt.clamp(0.0, max_tilt);

        let display_model = display_model_for(proj);
        let width = params.width.max(1.0);
        let height = params.height.max(1.0);
        let aspect = width / height;

        // Range implied by the requested GSD, adjusted for focus altitude so
        // non-zoom motions keep a constant camera offset, then clamped to
        // the supported zoom range. The stored GSD tracks the clamp.
        let gsd_range = range_from_gsd(params.resolution, VFOV_DEG, height);
        let offset_range0 = gsd_range - focus.altitude_or(0.0);
        let offset_range = offset_range0.clamp(MIN_ZOOM_RANGE_M, MAX_ZOOM_RANGE_M);
        let gsd = gsd_from_range(gsd_range + (offset_range - offset_range0), VFOV_DEG, height);

        let target = proj.forward(&focus).map_err(|_| SceneError::InvalidFocus)?;
        let (eye, up) = match display_model.earth {
            GeometryModel::Plane { .. } => {
                compute_camera_planar(proj, display_model, &focus, offset_range, rotation, tilt)?
            }
            _ => compute_camera_ellipsoidal(&focus, offset_range, rotation, tilt)?,
        };

        let eye_m = display_model.to_nominal_meters(eye);
        let target_m = display_model.to_nominal_meters(target);

        let mut model_view = Mat4::look_at(eye_m, target_m, up);
        model_view.scale(
            display_model.projection_x_to_nominal_meters,
            display_model.projection_y_to_nominal_meters,
            display_model.projection_z_to_nominal_meters,
        );

        // Clip planes: near defaults to ~32px worth of resolution, far to
        // the display horizon.
        let cam_geo = proj.inverse(eye);
        let height_msl = cam_geo.altitude_or(0.0).max(2.0);
        let horizon = distance_to_display_horizon(height_msl, height, proj.srid());
        let far_meters = horizon.max(WGS84_A);

        let eye_range = (eye_m - target_m).length().max(0.1);
        let mut near_meters = gsd * 32.0;
        if eye_range < near_meters {
            near_meters = eye_range * 0.2;
        }

        let mut camera_projection = match params.mode {
            CameraMode::Orthographic => {
                let scale = HALF_VFOV_DEG.to_radians().tan() * offset_range;
                let depth_len = match display_model.earth {
                    GeometryModel::Plane { .. } => (eye_m - target_m).length() + WGS84_A,
                    _ => eye.length(),
                };
                Mat4::from_scale(1.0 / (aspect * scale), 1.0 / scale, -1.0 / depth_len)
            }
            CameraMode::Perspective => Mat4::perspective(VFOV_DEG, aspect, near_meters, far_meters),
        };
        let center_x = width / 2.0;
        let center_y = height / 2.0;
        if params.focus_x != center_x || params.focus_y != center_y {
            let mut shift = Mat4::identity();
            shift.translate(
                (params.focus_x - center_x) / (width / 2.0),
                (center_y - params.focus_y) / (height / 2.0),
                0.0,
            );
            camera_projection.pre_concatenate(&shift);
        }

        // Clip-space near/far sampled by pushing the world-space plane
        // locations through the camera transforms.
        let dir_m = (target_m - eye_m).normalized().unwrap_or_default();
        let clip_of = |dist_m: f64| -> f64 {
            let world = display_model.from_nominal_meters(eye_m + dir_m * dist_m);
            let viewed = model_view.transform(world);
            let clipped = camera_projection.transform(viewed);
            -clipped.z
        };
        let far_clip = {
            let v = clip_of(far_meters);
            if v.is_finite() { v } else { -1.0 }
        };
        let near_clip = match params.mode {
            CameraMode::Perspective => clip_of(near_meters).max(0.0),
            CameraMode::Orthographic => 0.075,
        };

        let camera = Camera {
            location: eye,
            target,
            azimuth: rotation,
            elevation: tilt - 90.0,
            roll: 0.0,
            fov: VFOV_DEG,
            aspect_ratio: aspect,
            near: near_clip,
            far: far_clip,
            near_meters,
            far_meters,
            mode: params.mode,
            model_view,
            projection: camera_projection,
        };

        // Screen mapping: NDC to pixels with the vertical flip from
        // mathematical up to screen-down rows.
        let mut forward_transform = Mat4::identity();
        forward_transform.scale(width / 2.0, -height / 2.0, 1.0);
        forward_transform.translate(1.0, -1.0, 0.0);
        forward_transform.concatenate(&camera.projection);
        forward_transform.concatenate(&camera.model_view);

        let inverse_transform = forward_transform
            .inverse()
            .ok_or(SceneError::NonInvertibleTransform)?;

        let mut scene = Self {
            display_dpi: params.display_dpi,
            width,
            height,
            focus_x: params.focus_x,
            focus_y: params.focus_y,
            focus_geo: focus,
            gsd,
            camera,
            projection: proj,
            display_model,
            earth: display_model.earth,
            continuous_scroll: params.continuous_scroll,
            origin: DisplayOrigin::UpperLeft,
            idl: IdlInfo::whole_world(focus.longitude),
            forward_transform,
            inverse_transform,
        };
        scene.idl = scene.compute_idl();
        Ok(scene)
    }

    /// The construction tuple reproducing this scene.
    pub fn params(&self) -> SceneParams {
        SceneParams {
            display_dpi: self.display_dpi,
            width: self.width,
            height: self.height,
            projection: self.projection,
            focus: self.focus_geo,
            focus_x: self.focus_x,
            focus_y: self.focus_y,
            rotation: self.camera.azimuth,
            tilt: self.camera.tilt(),
            resolution: self.gsd,
            mode: self.camera.mode,
            continuous_scroll: self.continuous_scroll,
        }
    }

    pub fn forward_transform(&self) -> &Mat4 {
        &self.forward_transform
    }

    pub fn inverse_transform(&self) -> &Mat4 {
        &self.inverse_transform
    }

    /// Geodetic point to screen pixels. The returned `z` is the clip-space
    /// depth, useful for round-tripping through [`Self::inverse_transform_point`].
    ///
    /// When continuous scroll is enabled and the scene crosses the
    /// antimeridian, longitudes on the far side of the date line are
    /// unwrapped so nearby geometry renders continuously instead of jumping
    /// to the opposite screen edge.
    pub fn forward(&self, geo: &GeoPoint) -> Option<Vec3> {
        if !geo.is_valid() {
            return None;
        }
        let mut shifted = *geo;
        shifted.longitude = self.unwrap_longitude(geo.longitude);
        let projected = self.projection.forward(&shifted).ok()?;
        let screen = self.forward_transform.transform(projected);
        screen.is_finite().then_some(screen)
    }

    /// Longitude adjusted onto the focus hemisphere's continuous domain.
    pub fn unwrap_longitude(&self, lon: f64) -> f64 {
        if !self.continuous_scroll || !self.idl.crosses {
            return lon;
        }
        let delta = lon - self.focus_geo.longitude;
        if delta > 180.0 {
            lon - 360.0
        } else if delta < -180.0 {
            lon + 360.0
        } else {
            lon
        }
    }

    /// Pure affine inverse of the composed transform. Pass the `z` produced
    /// by [`Self::forward`] to recover the exact source point; `z = 0`
    /// solves on the clip midplane.
    pub fn inverse_transform_point(&self, screen: Vec3) -> Option<GeoPoint> {
        let projected = self.inverse_transform.transform(screen);
        if !projected.is_finite() {
            return None;
        }
        let geo = self.projection.inverse(projected);
        geo.latitude.is_finite().then(|| self.wrap_result(geo))
    }

    /// Ray from the camera through the given screen pixel, in projected
    /// space. Orthographic cameras have no true location at finite
    /// distance; a synthetic standoff well behind the view plane avoids
    /// near-parallel degenerate rays.
    pub fn screen_ray(&self, screen: Vec2) -> Option<Ray> {
        let origin = if self.camera.is_perspective() {
            self.camera.location
        } else {
            let loc_m = self.display_model.to_nominal_meters(self.camera.location);
            let tgt_m = self.display_model.to_nominal_meters(self.camera.target);
            let los = loc_m - tgt_m;
            let standoff = los.length().max(ORTHO_STANDOFF_FLOOR_M) * 2.0;
            let back = los.normalized()? * standoff;
            self.display_model.from_nominal_meters(tgt_m + back)
        };
        let through = self
            .inverse_transform
            .transform(Vec3::new(screen.x, screen.y, 1.0));
        let dir = (through - origin).normalized()?;
        Some(Ray::new(origin, dir))
    }

    /// Ray-cast inverse against an explicit geometry model.
    pub fn inverse_raycast_model(
        &self,
        screen: Vec2,
        model: &GeometryModel,
        nearest_if_off_world: bool,
    ) -> Option<GeoPoint> {
        let ray = self.screen_ray(screen)?;
        let mut hit = model.intersect(&ray);
        if hit.is_none() && nearest_if_off_world {
            // Off-world: cast from the far point back toward the world
            // origin to land on the silhouette.
            let through = self
                .inverse_transform
                .transform(Vec3::new(screen.x, screen.y, 1.0));
            let inward = (-through).normalized()?;
            hit = model.intersect(&Ray::new(through, inward));
        }
        let point = hit?;
        let geo = self.projection.inverse(point);
        geo.latitude.is_finite().then(|| self.wrap_result(geo))
    }

    /// Screen to geodetic, by mode.
    ///
    /// `screen.z` is the clip depth as produced by [`Self::forward`]; pass
    /// 0 when only a pixel is known. `RayCast` ignores the depth and
    /// resolves in priority order: registered surface providers (closest to
    /// the camera wins), then terrain, then the idealized earth. `None` is
    /// the expected off-world result, not an error.
    pub fn inverse(
        &self,
        screen: Vec3,
        mode: InverseMode,
        hints: InverseHints,
        ctx: InverseContext<'_>,
    ) -> Option<InverseResult> {
        match mode {
            InverseMode::Transform => {
                let point = self.inverse_transform_point(screen)?;
                Some(InverseResult { source: InverseSource::Transform, point })
            }
            InverseMode::RayCast => {
                self.inverse_raycast(Vec2::new(screen.x, screen.y), hints, ctx)
            }
        }
    }

    fn inverse_raycast(
        &self,
        screen: Vec2,
        hints: InverseHints,
        ctx: InverseContext<'_>,
    ) -> Option<InverseResult> {
        if !hints.ignore_surface_mesh {
            if let Some(point) = self.closest_surface_hit(screen, ctx.surfaces) {
                return Some(InverseResult { source: InverseSource::SurfaceMesh, point });
            }
        }

        let base = self.inverse_raycast_model(screen, &self.earth, hints.nearest_if_off_world)?;

        if !hints.ignore_terrain_mesh {
            if let Some(elevation) = ctx.elevation {
                if let Some(alt) = elevation.elevation(base.latitude, base.longitude) {
                    if alt.is_finite() && alt.abs() > 1.0 {
                        let lifted = self.earth.inflated(alt);
                        let point = self
                            .inverse_raycast_model(screen, &lifted, hints.nearest_if_off_world)
                            .unwrap_or(base);
                        return Some(InverseResult {
                            source: InverseSource::TerrainMesh,
                            point,
                        });
                    }
                }
            }
        }

        Some(InverseResult { source: InverseSource::GeometryModel, point: base })
    }

    fn closest_surface_hit(
        &self,
        screen: Vec2,
        surfaces: &[&dyn crate::services::HitTestProvider],
    ) -> Option<GeoPoint> {
        let cam_m = self.display_model.to_nominal_meters(self.camera.location);
        let mut best: Option<(f64, GeoPoint)> = None;
        for provider in surfaces {
            let Some(geo) = provider.hit_test(screen.x, screen.y) else {
                continue;
            };
            let Ok(projected) = self.projection.forward(&geo) else {
                continue;
            };
            let d2 = (self.display_model.to_nominal_meters(projected) - cam_m).length_sq();
            let better = match &best {
                None => true,
                Some((best_d2, _)) => stable_total_cmp_f64(d2, *best_d2).is_lt(),
            };
            if better {
                best = Some((d2, geo));
            }
        }
        best.map(|(_, geo)| geo)
    }

    /// Snapshot converted to the requested vertical origin convention.
    pub fn with_origin(&self, origin: DisplayOrigin) -> SceneModel {
        if origin == self.origin {
            return self.clone();
        }
        // The flip is an involution; the same matrix converts either way.
        let mut flip = Mat4::identity();
        flip.translate(0.0, self.height, 0.0);
        flip.scale(1.0, -1.0, 1.0);

        let mut out = self.clone();
        out.origin = origin;
        out.focus_y = self.height - self.focus_y;
        out.forward_transform.pre_concatenate(&flip);
        out.inverse_transform.concatenate(&flip);
        out
    }

    fn wrap_result(&self, mut geo: GeoPoint) -> GeoPoint {
        if geo.longitude < -180.0 || geo.longitude >= 180.0 {
            geo.longitude = wrap_longitude(geo.longitude);
        }
        geo
    }

    /// Inverse-projects the viewport corners and edge midpoints to derive
    /// the visible longitude span and whether it crosses the antimeridian.
    fn compute_idl(&self) -> IdlInfo {
        let focus_lon = self.focus_geo.longitude;
        let mut info = IdlInfo::whole_world(focus_lon);

        let samples = [
            Vec2::new(0.0, 0.0),
            Vec2::new(self.width, 0.0),
            Vec2::new(0.0, self.height),
            Vec2::new(self.width, self.height),
            Vec2::new(0.0, self.height / 2.0),
            Vec2::new(self.width, self.height / 2.0),
        ];

        let mut west = focus_lon;
        let mut east = focus_lon;
        let mut resolved = 0usize;
        for s in samples {
            let Some(geo) = self.inverse_raycast_model(s, &self.earth, true) else {
                continue;
            };
            resolved += 1;
            // Unwrap each sample onto the focus-continuous domain.
            let mut lon = geo.longitude;
            let delta = lon - focus_lon;
            if delta > 180.0 {
                lon -= 360.0;
            } else if delta < -180.0 {
                lon += 360.0;
            }
            west = west.min(lon);
            east = east.max(lon);
        }

        if resolved == 0 {
            return info;
        }

        info.west_bound = wrap_longitude(west);
        info.east_bound = wrap_longitude(east);
        info.crosses = self.continuous_scroll && (west < -180.0 || east >= 180.0);
        info
    }
}

/// Display-horizon distance used for the far clip plane. For the geodetic
/// projection the raw horizon is widened at low zoom so whole-earth views
/// keep distant geometry; the ladder is tuned, not exact.
fn distance_to_display_horizon(height_msl: f64, height_px: f64, srid: i32) -> f64 {
    let horizon = distance_to_horizon(height_msl);
    if srid != SRID_GEODETIC {
        return horizon;
    }

    let gsd = gsd_from_range(height_msl, VFOV_DEG, height_px);
    // Web-mercator style level of detail at the equator.
    let lod = (156_543.034 / gsd.max(1e-9)).log2();

    let adj = if lod <= 9.0 {
        7.0
    } else if lod <= 14.0 {
        (14.0 - lod) + 2.0
    } else if lod <= 16.0 {
        (16.0 - lod) / 2.0 + 1.0
    } else if lod <= 19.0 {
        ((19.0 - lod) / 3.0) * 0.5 + 0.5
    } else {
        0.5
    };

    horizon * adj
}

/// Camera eye and up vector for flat (plane-earth) projections, derived
/// from a frame at the projected focus rotated by azimuth and tilt.
fn compute_camera_planar(
    proj: Projection,
    dm: &DisplayModel,
    focus: &GeoPoint,
    range: f64,
    rotation: f64,
    tilt: f64,
) -> Result<(Vec3, Vec3), SceneError> {
    let target = proj.forward(focus).map_err(|_| SceneError::InvalidFocus)?;

    let mut xform = Mat4::identity();
    xform.translate(
        target.x * dm.projection_x_to_nominal_meters,
        target.y * dm.projection_y_to_nominal_meters,
        target.z * dm.projection_z_to_nominal_meters,
    );
    xform.rotate((-rotation).to_radians(), 0.0, 0.0, 1.0);
    xform.rotate(tilt.to_radians(), 1.0, 0.0, 0.0);
    xform.scale(
        dm.projection_x_to_nominal_meters,
        dm.projection_y_to_nominal_meters,
        dm.projection_z_to_nominal_meters,
    );

    let eye_m = xform.basis(2) * range + xform.basis(3);
    let eye = dm.from_nominal_meters(eye_m);
    let up = xform.basis(1);
    Ok((eye, up))
}

/// Camera eye and up vector for globe projections: an ECEF frame at the
/// focus oriented by longitude/latitude, then azimuth and tilt.
fn compute_camera_ellipsoidal(
    focus: &GeoPoint,
    range: f64,
    rotation: f64,
    tilt: f64,
) -> Result<(Vec3, Vec3), SceneError> {
    let target = Projection::Ecef
        .forward(focus)
        .map_err(|_| SceneError::InvalidFocus)?;

    let mut xform = Mat4::identity();
    xform.translate(target.x, target.y, target.z);
    xform.rotate((focus.longitude + 90.0).to_radians(), 0.0, 0.0, 1.0);
    xform.rotate((90.0 - focus.latitude).to_radians(), 1.0, 0.0, 0.0);
    xform.rotate((-rotation).to_radians(), 0.0, 0.0, 1.0);
    xform.rotate(tilt.to_radians(), 1.0, 0.0, 0.0);

    let eye = xform.basis(2) * range + xform.basis(3);
    let up = xform.basis(1);
    Ok((eye, up))
}

#[cfg(test)]
mod tests {
    use super::{DisplayOrigin, SceneModel, SceneParams, gsd_from_range, range_from_gsd};
    use crate::camera::CameraMode;
    use crate::error::SceneError;
    use crate::services::{InverseContext, InverseHints, InverseMode, InverseSource};
    use foundation::GeoPoint;
    use foundation::math::{Vec2, Vec3};
    use projection::Projection;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn params(focus: GeoPoint) -> SceneParams {
        SceneParams {
            display_dpi: 96.0,
            width: 1000.0,
            height: 600.0,
            projection: Projection::Equirectangular,
            focus,
            focus_x: 500.0,
            focus_y: 300.0,
            rotation: 0.0,
            tilt: 0.0,
            resolution: 10.0,
            mode: CameraMode::Perspective,
            continuous_scroll: false,
        }
    }

    #[test]
    fn gsd_range_duality() {
        let range = range_from_gsd(10.0, 45.0, 600.0);
        assert_close(gsd_from_range(range, 45.0, 600.0), 10.0, 1e-12);
    }

    #[test]
    fn invalid_focus_fails_construction() {
        let err = SceneModel::new(&params(GeoPoint::new(f64::NAN, 0.0))).unwrap_err();
        assert_eq!(err, SceneError::InvalidFocus);
        let err = SceneModel::new(&params(GeoPoint::new(95.0, 0.0))).unwrap_err();
        assert_eq!(err, SceneError::InvalidFocus);
    }

    #[test]
    fn invalid_resolution_fails_construction() {
        let mut p = params(GeoPoint::new(0.0, 0.0));
        p.resolution = f64::NAN;
        assert_eq!(SceneModel::new(&p).unwrap_err(), SceneError::InvalidResolution);
        p.resolution = -5.0;
        assert_eq!(SceneModel::new(&p).unwrap_err(), SceneError::InvalidResolution);
    }

    #[test]
    fn nominal_resolution_is_preserved() {
        let scene = SceneModel::new(&params(GeoPoint::new(34.0, -117.0))).expect("scene");
        assert_close(scene.gsd, 10.0, 1e-12);
    }

    #[test]
    fn focus_renders_at_focus_pixel() {
        let scene = SceneModel::new(&params(GeoPoint::new(34.0, -117.0))).expect("scene");
        let screen = scene.forward(&GeoPoint::new(34.0, -117.0)).expect("forward");
        assert_close(screen.x, 500.0, 1e-6);
        assert_close(screen.y, 300.0, 1e-6);
    }

    #[test]
    fn off_center_focus_anchors_the_pixel() {
        let mut p = params(GeoPoint::new(34.0, -117.0));
        p.focus_x = 250.0;
        p.focus_y = 450.0;
        let scene = SceneModel::new(&p).expect("scene");
        let screen = scene.forward(&GeoPoint::new(34.0, -117.0)).expect("forward");
        assert_close(screen.x, 250.0, 1e-6);
        assert_close(screen.y, 450.0, 1e-6);
    }

    #[test]
    fn transform_inverse_round_trips_within_frustum() {
        let scene = SceneModel::new(&params(GeoPoint::new(34.0, -117.0))).expect("scene");
        for (dlat, dlon) in [(0.0, 0.0), (0.01, 0.02), (-0.015, 0.005), (0.02, -0.02)] {
            let src = GeoPoint::new(34.0 + dlat, -117.0 + dlon);
            let screen = scene.forward(&src).expect("forward");
            let geo = scene.inverse_transform_point(screen).expect("inverse");
            assert_close(geo.latitude, src.latitude, 1e-6);
            assert_close(geo.longitude, src.longitude, 1e-6);
        }
    }

    #[test]
    fn raycast_center_recovers_focus() {
        let scene = SceneModel::new(&params(GeoPoint::new(34.0, -117.0))).expect("scene");
        let hit = scene
            .inverse(
                Vec3::new(500.0, 300.0, 0.0),
                InverseMode::RayCast,
                InverseHints::default(),
                InverseContext::default(),
            )
            .expect("hit");
        assert_eq!(hit.source, InverseSource::GeometryModel);
        assert_close(hit.point.latitude, 34.0, 1e-6);
        assert_close(hit.point.longitude, -117.0, 1e-6);
    }

    #[test]
    fn orthographic_raycast_center_recovers_focus() {
        let mut p = params(GeoPoint::new(34.0, -117.0));
        p.mode = CameraMode::Orthographic;
        let scene = SceneModel::new(&p).expect("scene");
        let hit = scene
            .inverse_raycast_model(Vec2::new(500.0, 300.0), &scene.earth, false)
            .expect("hit");
        assert_close(hit.latitude, 34.0, 1e-6);
        assert_close(hit.longitude, -117.0, 1e-6);
    }

    #[test]
    fn tilted_scene_round_trips_at_focus() {
        let mut p = params(GeoPoint::new(34.0, -117.0));
        p.tilt = 45.0;
        p.rotation = 30.0;
        let scene = SceneModel::new(&p).expect("scene");
        let screen = scene.forward(&GeoPoint::new(34.0, -117.0)).expect("forward");
        assert_close(screen.x, 500.0, 1e-6);
        assert_close(screen.y, 300.0, 1e-6);
        let hit = scene
            .inverse_raycast_model(Vec2::new(500.0, 300.0), &scene.earth, false)
            .expect("hit");
        assert_close(hit.latitude, 34.0, 1e-6);
        assert_close(hit.longitude, -117.0, 1e-6);
    }

    #[test]
    fn tilt_is_clamped_per_mode() {
        let mut p = params(GeoPoint::new(0.0, 0.0));
        p.tilt = 120.0;
        let scene = SceneModel::new(&p).expect("scene");
        assert_close(scene.camera.tilt(), 85.0, 1e-9);

        p.mode = CameraMode::Orthographic;
        let scene = SceneModel::new(&p).expect("scene");
        assert_close(scene.camera.tilt(), 89.0, 1e-9);

        p.tilt = -10.0;
        let scene = SceneModel::new(&p).expect("scene");
        assert_close(scene.camera.tilt(), 0.0, 1e-9);
    }

    #[test]
    fn rotation_normalizes_to_circle() {
        let mut p = params(GeoPoint::new(0.0, 0.0));
        p.rotation = -90.0;
        let scene = SceneModel::new(&p).expect("scene");
        assert_close(scene.camera.azimuth, 270.0, 1e-9);
    }

    #[test]
    fn idl_crossing_scene_unwraps_far_side() {
        let mut p = params(GeoPoint::new(0.0, 179.9));
        p.continuous_scroll = true;
        // Wide enough span to cross the date line at this resolution.
        p.resolution = 100.0;
        let scene = SceneModel::new(&p).expect("scene");
        assert!(scene.idl.crosses);

        // A point just across the date line renders right of the focus,
        // not on the opposite edge.
        let west_side = scene.forward(&GeoPoint::new(0.0, -179.9)).expect("forward");
        assert!(
            west_side.x > 500.0 && west_side.x < 1000.0,
            "unwrapped x = {}",
            west_side.x
        );
    }

    #[test]
    fn non_crossing_scene_reports_plain_bounds() {
        let scene = SceneModel::new(&params(GeoPoint::new(34.0, -117.0))).expect("scene");
        assert!(!scene.idl.crosses);
        assert!(scene.idl.west_bound < -117.0);
        assert!(scene.idl.east_bound > -117.0);
    }

    #[test]
    fn ecef_scene_round_trips_at_focus() {
        let mut p = params(GeoPoint::new(34.0, -117.0));
        p.projection = Projection::Ecef;
        let scene = SceneModel::new(&p).expect("scene");
        let screen = scene.forward(&GeoPoint::new(34.0, -117.0)).expect("forward");
        assert_close(screen.x, 500.0, 1e-6);
        assert_close(screen.y, 300.0, 1e-6);
        let hit = scene
            .inverse_raycast_model(Vec2::new(500.0, 300.0), &scene.earth, false)
            .expect("hit");
        assert_close(hit.latitude, 34.0, 1e-6);
        assert_close(hit.longitude, -117.0, 1e-6);
    }

    #[test]
    fn off_world_nearest_clamps_to_globe() {
        let mut p = params(GeoPoint::new(0.0, 0.0));
        p.projection = Projection::Ecef;
        p.resolution = 50_000.0; // whole-earth view; corners fall off-world
        let scene = SceneModel::new(&p).expect("scene");

        let corner = Vec2::new(0.0, 0.0);
        assert!(scene.inverse_raycast_model(corner, &scene.earth, false).is_none());
        let clamped = scene.inverse_raycast_model(corner, &scene.earth, true);
        assert!(clamped.is_some());
    }

    #[test]
    fn lower_left_origin_flips_vertically() {
        let scene = SceneModel::new(&params(GeoPoint::new(34.0, -117.0))).expect("scene");
        let flipped = scene.with_origin(DisplayOrigin::LowerLeft);
        assert_close(flipped.focus_y, 300.0, 1e-12); // height 600, symmetric focus

        let mut p = params(GeoPoint::new(34.0, -117.0));
        p.focus_y = 100.0;
        let scene = SceneModel::new(&p).expect("scene");
        let flipped = scene.with_origin(DisplayOrigin::LowerLeft);
        assert_close(flipped.focus_y, 500.0, 1e-12);
        let screen = flipped.forward(&GeoPoint::new(34.0, -117.0)).expect("forward");
        assert_close(screen.y, 500.0, 1e-6);
    }

    #[test]
    fn invalid_point_short_circuits_forward() {
        let scene = SceneModel::new(&params(GeoPoint::new(0.0, 0.0))).expect("scene");
        assert!(scene.forward(&GeoPoint::new(f64::NAN, 0.0)).is_none());
        assert!(scene.forward(&GeoPoint::new(0.0, 200.0)).is_none());
    }

    #[test]
    fn forward_transform_depth_recovers_exactly() {
        let scene = SceneModel::new(&params(GeoPoint::new(34.0, -117.0))).expect("scene");
        let src = GeoPoint::with_altitude(34.005, -117.01, 0.0);
        let screen = scene.forward(&src).expect("forward");
        let geo = scene.inverse_transform_point(Vec3::new(screen.x, screen.y, screen.z)).expect("inverse");
        assert_close(geo.latitude, src.latitude, 1e-9);
        assert_close(geo.longitude, src.longitude, 1e-9);
    }
}
