//! Camera motion operations.
//!
//! Split by intent, mirroring the public control surface: `interactive`
//! operations support gesture-driven motion and preserve the apparent
//! ground scale about an arbitrary focus pixel; `programmatic` operations
//! are convenience wrappers over [`MapRenderer::look_at`].
//!
//! Failure semantics: any non-finite input makes the whole operation a
//! no-op. Partial camera updates are never observable.

use foundation::GeoPoint;
use foundation::math::{Vec2, wrap_longitude};
use scene::{DisplayOrigin, SceneModel, SceneParams, VFOV_DEG};
use tracing::debug;

use crate::renderer::{CollisionPolicy, MapRenderer};
use crate::util::focus_altitude_model;

/// Where an aggregated camera motion lands while it is being composed.
///
/// The renderer-backed sink dispatches immediately; the builder sink folds
/// successive motions into a candidate scene so a compound operation
/// (zoom + orient + re-anchor) dispatches exactly once.
trait CameraSink {
    fn look_at(
        &mut self,
        focus: &GeoPoint,
        resolution: f64,
        azimuth: f64,
        tilt: f64,
        animate: bool,
    );
}

struct RendererCamera<'a, R: MapRenderer + ?Sized> {
    renderer: &'a R,
    collision: CollisionPolicy,
}

impl<R: MapRenderer + ?Sized> CameraSink for RendererCamera<'_, R> {
    fn look_at(
        &mut self,
        focus: &GeoPoint,
        resolution: f64,
        azimuth: f64,
        tilt: f64,
        animate: bool,
    ) {
        self.renderer
            .look_at(*focus, resolution, azimuth, tilt, self.collision, animate);
    }
}

struct SceneBuilder {
    sm: SceneModel,
}

impl SceneBuilder {
    fn new(sm: SceneModel) -> Self {
        Self { sm }
    }

    fn dispatch<R: MapRenderer + ?Sized>(
        &self,
        renderer: &R,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        let focus = self.sm.projection.inverse(self.sm.camera.target);
        renderer.look_at(
            focus,
            self.sm.gsd,
            self.sm.camera.azimuth,
            self.sm.camera.tilt(),
            collision,
            animate,
        );
    }
}

impl CameraSink for SceneBuilder {
    fn look_at(
        &mut self,
        focus: &GeoPoint,
        resolution: f64,
        azimuth: f64,
        tilt: f64,
        _animate: bool,
    ) {
        let params = SceneParams {
            focus: *focus,
            resolution,
            rotation: azimuth,
            tilt,
            ..self.sm.params()
        };
        match SceneModel::new(&params) {
            Ok(sm) => self.sm = sm,
            Err(err) => debug!(%err, "candidate scene rejected"),
        }
    }
}

pub mod interactive {
    use super::*;

    /// Pan the map by a screen-pixel delta.
    pub fn pan_by<R: MapRenderer + ?Sized>(
        renderer: &R,
        tx: f64,
        ty: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let mut camera = RendererCamera { renderer, collision };
        pan_by_impl(&sm, tx, ty, animate, &mut camera);
    }

    /// Pan the given location to the given viewport position (upper-left
    /// origin).
    pub fn pan_to<R: MapRenderer + ?Sized>(
        renderer: &R,
        focus: &GeoPoint,
        x: f64,
        y: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let mut camera = RendererCamera { renderer, collision };
        if sm.camera.is_perspective() {
            pan_to_impl_perspective(&sm, focus, x, y, animate, &mut camera);
        } else {
            pan_to_impl_ortho(&sm, focus, x, y, animate, &mut camera);
        }
    }

    /// Scale the resolution by `scale_factor` about the current focus.
    pub fn zoom_by<R: MapRenderer + ?Sized>(
        renderer: &R,
        scale_factor: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let Some(resolution) = scaled_resolution(&sm, scale_factor) else {
            return;
        };
        let focus = sm.projection.inverse(sm.camera.target);
        renderer.look_at(
            focus,
            resolution,
            sm.camera.azimuth,
            sm.camera.tilt(),
            collision,
            animate,
        );
    }

    /// Scale the resolution by `scale_factor`, keeping the geodetic point
    /// under `(focus_x, focus_y)` visually fixed.
    pub fn zoom_by_at<R: MapRenderer + ?Sized>(
        renderer: &R,
        scale_factor: f64,
        focus: &GeoPoint,
        focus_x: f64,
        focus_y: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let Some(resolution) = scaled_resolution(&sm, scale_factor) else {
            return;
        };
        look_at_impl(
            renderer,
            &sm,
            resolution,
            sm.camera.azimuth,
            sm.camera.tilt(),
            focus,
            focus_x,
            focus_y,
            collision,
            animate,
        );
    }

    /// Zoom to an absolute resolution, anchoring `focus` at the given
    /// screen position on completion.
    pub fn zoom_to<R: MapRenderer + ?Sized>(
        renderer: &R,
        gsd: f64,
        focus: &GeoPoint,
        focus_x: f64,
        focus_y: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        if !gsd.is_finite() {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        look_at_impl(
            renderer,
            &sm,
            gsd,
            sm.camera.azimuth,
            sm.camera.tilt(),
            focus,
            focus_x,
            focus_y,
            collision,
            animate,
        );
    }

    /// Rotate by a delta about the given focus location.
    pub fn rotate_by<R: MapRenderer + ?Sized>(
        renderer: &R,
        theta: f64,
        focus: &GeoPoint,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        if !theta.is_finite() {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        renderer.look_at(
            *focus,
            sm.gsd,
            sm.camera.azimuth + theta,
            sm.camera.tilt(),
            collision,
            animate,
        );
    }

    /// Rotate to an absolute azimuth about the focus location anchored at
    /// `(focus_x, focus_y)`.
    pub fn rotate_to<R: MapRenderer + ?Sized>(
        renderer: &R,
        theta: f64,
        focus: &GeoPoint,
        focus_x: f64,
        focus_y: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        if !theta.is_finite() {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        look_at_impl(
            renderer,
            &sm,
            sm.gsd,
            theta,
            sm.camera.tilt(),
            focus,
            focus_x,
            focus_y,
            collision,
            animate,
        );
    }

    /// Tilt by a delta about the given focus location, anchored at the
    /// scene focus pixel.
    pub fn tilt_by<R: MapRenderer + ?Sized>(
        renderer: &R,
        theta: f64,
        focus: &GeoPoint,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let (focus_x, focus_y) = (sm.focus_x, sm.focus_y);
        look_at_impl(
            renderer,
            &sm,
            sm.gsd,
            sm.camera.azimuth,
            theta + sm.camera.tilt(),
            focus,
            focus_x,
            focus_y,
            collision,
            animate,
        );
    }

    /// Tilt to an absolute angle (degrees from nadir) about the focus
    /// location anchored at `(focus_x, focus_y)`.
    pub fn tilt_to<R: MapRenderer + ?Sized>(
        renderer: &R,
        theta: f64,
        focus: &GeoPoint,
        focus_x: f64,
        focus_y: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) {
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        look_at_impl(
            renderer,
            &sm,
            sm.gsd,
            sm.camera.azimuth,
            theta,
            focus,
            focus_x,
            focus_y,
            collision,
            animate,
        );
    }
}

pub mod programmatic {
    use super::*;

    /// Pan to the given location as the new focus; rotation, tilt and zoom
    /// are preserved.
    pub fn pan_to<R: MapRenderer + ?Sized>(renderer: &R, focus: &GeoPoint, animate: bool) {
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        renderer.look_at(
            *focus,
            sm.gsd,
            sm.camera.azimuth,
            sm.camera.tilt(),
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Rotate the map to an absolute azimuth about the current focus.
    pub fn rotate_to<R: MapRenderer + ?Sized>(renderer: &R, rotation: f64, animate: bool) {
        if !rotation.is_finite() {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let focus = sm.projection.inverse(sm.camera.target);
        renderer.look_at(
            focus,
            sm.gsd,
            rotation,
            sm.camera.tilt(),
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Tilt the map to an absolute angle about the current focus.
    pub fn tilt_to<R: MapRenderer + ?Sized>(renderer: &R, tilt: f64, animate: bool) {
        if !tilt.is_finite() {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let focus = sm.projection.inverse(sm.camera.target);
        renderer.look_at(
            focus,
            sm.gsd,
            sm.camera.azimuth,
            tilt,
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Tilt the map to an absolute angle about the given location.
    pub fn tilt_to_at<R: MapRenderer + ?Sized>(
        renderer: &R,
        tilt: f64,
        focus: &GeoPoint,
        animate: bool,
    ) {
        if !tilt.is_finite() {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        renderer.look_at(
            *focus,
            sm.gsd,
            sm.camera.azimuth,
            tilt,
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Zoom to an absolute resolution about the current focus.
    pub fn zoom_to<R: MapRenderer + ?Sized>(renderer: &R, gsd: f64, animate: bool) {
        if !gsd.is_finite() {
            return;
        }
        let Some(sm) = renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let focus = sm.projection.inverse(sm.camera.target);
        renderer.look_at(
            focus,
            gsd,
            sm.camera.azimuth,
            sm.camera.tilt(),
            CollisionPolicy::default(),
            animate,
        );
    }
}

/// Resolution after scaling the camera offset range by `1/scale_factor`,
/// holding the GSD/range relationship.
fn scaled_resolution(sm: &SceneModel, scale_factor: f64) -> Option<f64> {
    let gsd_range = scene::range_from_gsd(sm.gsd, VFOV_DEG, sm.height);

    let offset = sm
        .display_model
        .to_nominal_meters(sm.camera.target - sm.camera.location);
    let offset_range0 = offset.length();
    let offset_range = offset_range0 / scale_factor;

    let resolution =
        scene::gsd_from_range(gsd_range + (offset_range - offset_range0), VFOV_DEG, sm.height);
    resolution.is_finite().then_some(resolution)
}

fn pan_by_impl(sm: &SceneModel, tx: f64, ty: f64, animate: bool, camera: &mut dyn CameraSink) {
    if !tx.is_finite() || !ty.is_finite() {
        return;
    }

    let focus_lla = sm.projection.inverse(sm.camera.target);

    // Resolution at the focus from the camera offset range.
    let offset = sm
        .display_model
        .to_nominal_meters(sm.camera.target - sm.camera.location);
    let offset_range = offset.length();
    let gsd_focus =
        (sm.camera.fov / 2.0).to_radians().tan() * offset_range / (sm.height / 2.0);

    // Translation length in nominal display meters at the focus; floored so
    // panning keeps responding at extreme zoom-in.
    let cos_el = sm.camera.elevation.to_radians().cos();
    let translation =
        (tx * tx + ty * ty).sqrt() * gsd_focus.max(0.025 * cos_el * cos_el);

    // Local frame at the focus.
    let target_m = sm.display_model.to_nominal_meters(sm.camera.target);
    let Some(up) = local_direction(sm, &focus_lla, 0.0, 1.0) else {
        return;
    };
    let Some(north) = local_direction(sm, &focus_lla, 0.00001, 0.0) else {
        return;
    };

    let translate_dir = ty.atan2(-tx).to_degrees() + 90.0;

    // Swing the northward translation onto the drag direction by rotating
    // about the focus up axis.
    let mut mx = foundation::math::Mat4::identity();
    mx.rotate_about(
        (-sm.camera.azimuth + translate_dir).to_radians(),
        target_m.x,
        target_m.y,
        target_m.z,
        up.x,
        up.y,
        up.z,
    );

    let translated_m = mx.transform(target_m + north * translation);
    let translated = sm.display_model.from_nominal_meters(translated_m);

    let mut translated_lla = sm.projection.inverse(translated);
    if translated_lla.longitude.abs() > 180.0 {
        if sm.continuous_scroll {
            translated_lla.longitude = wrap_longitude(translated_lla.longitude);
        } else {
            return;
        }
    }
    if !translated_lla.latitude.is_finite() || !translated_lla.longitude.is_finite() {
        return;
    }
    translated_lla.altitude = focus_lla.altitude;

    camera.look_at(
        &translated_lla,
        sm.gsd,
        sm.camera.azimuth,
        sm.camera.tilt(),
        animate,
    );
}

/// Unit direction in nominal meters from the focus toward a nearby point
/// displaced by latitude and altitude deltas.
fn local_direction(
    sm: &SceneModel,
    focus: &GeoPoint,
    dlat: f64,
    dalt: f64,
) -> Option<foundation::math::Vec3> {
    let mut displaced = *focus;
    displaced.latitude += dlat;
    displaced.altitude = Some(focus.altitude_or(0.0) + dalt);
    let projected = sm.projection.forward(&displaced).ok()?;
    sm.display_model
        .to_nominal_meters(projected - sm.camera.target)
        .normalized()
}

/// Orthographic pan-to decomposes into two pans, which keeps the motion
/// exact without a trigonometric solve: center the location, then shift it
/// to the requested viewport position.
fn pan_to_impl_ortho(
    sm: &SceneModel,
    focus: &GeoPoint,
    x: f64,
    y: f64,
    animate: bool,
    camera: &mut dyn CameraSink,
) {
    let Some(xy) = sm.forward(focus) else {
        return;
    };
    pan_by_impl(sm, xy.x - sm.focus_x, xy.y - sm.focus_y, false, camera);
    pan_by_impl(sm, sm.focus_x - x, sm.focus_y - y, animate, camera);
}

/// Perspective pan-to solves against the plane at the focus altitude so
/// off-center panning accounts for foreshortening.
fn pan_to_impl_perspective(
    sm: &SceneModel,
    focus: &GeoPoint,
    x: f64,
    y: f64,
    animate: bool,
    camera: &mut dyn CameraSink,
) {
    let mut focus = *focus;
    if focus.altitude.is_none() {
        focus.altitude = Some(0.0);
    }

    let Some(pan_model) = focus_altitude_model(sm, &focus) else {
        return;
    };
    let Some(end_geo) = sm.inverse_raycast_model(Vec2::new(x, y), &pan_model, false) else {
        return;
    };
    let Ok(end_wcs) = sm.projection.forward(&end_geo) else {
        return;
    };

    // Translation of the focus point on the model surface to the end point.
    let t = end_wcs - sm.camera.target;

    let Ok(focus_proj) = sm.projection.forward(&focus) else {
        return;
    };
    let mut new_focus = sm.projection.inverse(focus_proj - t);
    if !new_focus.latitude.is_finite() || !new_focus.longitude.is_finite() {
        return;
    }
    new_focus.altitude = focus.altitude;
    if new_focus.longitude.abs() > 180.0 {
        new_focus.longitude = wrap_longitude(new_focus.longitude);
    }

    camera.look_at(&new_focus, sm.gsd, sm.camera.azimuth, sm.camera.tilt(), animate);
}

/// Aggregated orient-and-anchor motion: optionally re-derive the GSD so the
/// apparent scale at the focus survives the new orientation, orient the
/// camera about the focus, then pan the focus to the requested pixel. The
/// composed motion dispatches as a single `look_at`.
#[allow(clippy::too_many_arguments)]
fn look_at_impl<R: MapRenderer + ?Sized>(
    renderer: &R,
    current: &SceneModel,
    gsd: f64,
    rotation: f64,
    tilt: f64,
    focus: &GeoPoint,
    focus_x: f64,
    focus_y: f64,
    collision: CollisionPolicy,
    animate: bool,
) {
    if !gsd.is_finite() || !rotation.is_finite() || !tilt.is_finite() {
        return;
    }

    let mut builder = SceneBuilder::new(current.clone());

    // GSD is specified relative to the current focus: rebuild at the new
    // scale, then measure the camera range to the point along the line of
    // sight at the new focus altitude.
    let sm = if gsd != current.gsd {
        let focus_now = current.projection.inverse(current.camera.target);
        let params = SceneParams {
            focus: focus_now,
            resolution: gsd,
            ..current.params()
        };
        match SceneModel::new(&params) {
            Ok(sm) => sm,
            Err(err) => {
                debug!(%err, "look_at rejected");
                return;
            }
        }
    } else {
        current.clone()
    };

    let adjusted_gsd = {
        let Some(focus_model) = focus_altitude_model(&sm, focus) else {
            return;
        };
        let Some(focus_at_gsd) =
            sm.inverse_raycast_model(Vec2::new(sm.focus_x, sm.focus_y), &focus_model, false)
        else {
            return;
        };
        let Ok(focus_at_gsd_proj) = sm.projection.forward(&focus_at_gsd) else {
            return;
        };

        let cam_range = (sm.display_model.to_nominal_meters(sm.camera.location)
            - sm.display_model.to_nominal_meters(focus_at_gsd_proj))
        .length();

        scene::gsd_from_range(cam_range + focus.altitude_or(0.0), VFOV_DEG, sm.height)
    };

    builder.look_at(focus, adjusted_gsd, rotation, tilt, false);

    // Pan focus geo to the requested pixel.
    if focus_x != builder.sm.focus_x || focus_y != builder.sm.focus_y {
        let anchor = builder.sm.clone();
        if anchor.camera.is_perspective() {
            pan_to_impl_perspective(&anchor, focus, focus_x, focus_y, false, &mut builder);
        } else {
            pan_to_impl_ortho(&anchor, focus, focus_x, focus_y, false, &mut builder);
        }
    }

    builder.dispatch(renderer, collision, animate);
}

#[cfg(test)]
mod tests {
    use super::{interactive, programmatic};
    use crate::renderer::{CollisionPolicy, MapRenderer};
    use foundation::GeoPoint;
    use foundation::math::Vec2;
    use parking_lot::Mutex;
    use scene::{CameraMode, DisplayOrigin, SceneModel, SceneParams};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    /// Renderer that applies every accepted look-at synchronously.
    struct TestRenderer {
        scene: Mutex<SceneModel>,
    }

    impl TestRenderer {
        fn new(params: &SceneParams) -> Self {
            Self {
                scene: Mutex::new(SceneModel::new(params).expect("scene")),
            }
        }

        fn focus(&self) -> GeoPoint {
            let sm = self.scene.lock();
            sm.projection.inverse(sm.camera.target)
        }

        fn scene(&self) -> SceneModel {
            self.scene.lock().clone()
        }
    }

    impl MapRenderer for TestRenderer {
        fn scene_model(&self, _instant: bool, origin: DisplayOrigin) -> Option<SceneModel> {
            Some(self.scene.lock().with_origin(origin))
        }

        fn look_at(
            &self,
            at: GeoPoint,
            resolution: f64,
            azimuth: f64,
            tilt: f64,
            _collision: CollisionPolicy,
            _animate: bool,
        ) -> bool {
            let params = {
                let sm = self.scene.lock();
                SceneParams {
                    focus: at,
                    resolution,
                    rotation: azimuth,
                    tilt,
                    ..sm.params()
                }
            };
            match SceneModel::new(&params) {
                Ok(sm) => {
                    *self.scene.lock() = sm;
                    true
                }
                Err(_) => false,
            }
        }

        fn look_from(
            &self,
            _from: GeoPoint,
            _azimuth: f64,
            _elevation: f64,
            _collision: CollisionPolicy,
            _animate: bool,
        ) -> bool {
            false
        }

        fn set_focus_point(&self, x: f64, y: f64) {
            let params = {
                let sm = self.scene.lock();
                SceneParams { focus_x: x, focus_y: y, ..sm.params() }
            };
            if let Ok(sm) = SceneModel::new(&params) {
                *self.scene.lock() = sm;
            }
        }
    }

    fn base_params(focus: GeoPoint, mode: CameraMode) -> SceneParams {
        SceneParams {
            display_dpi: 96.0,
            width: 1000.0,
            height: 600.0,
            projection: projection::Projection::Equirectangular,
            focus,
            focus_x: 500.0,
            focus_y: 300.0,
            rotation: 0.0,
            tilt: 0.0,
            resolution: 10.0,
            mode,
            continuous_scroll: false,
        }
    }

    #[test]
    fn pan_by_round_trips() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Orthographic,
        ));
        interactive::pan_by(&renderer, 50.0, 30.0, CollisionPolicy::Ignore, false);
        let moved = renderer.focus();
        assert!((moved.latitude - 34.0).abs() > 1e-7 || (moved.longitude + 117.0).abs() > 1e-7);

        interactive::pan_by(&renderer, -50.0, -30.0, CollisionPolicy::Ignore, false);
        let back = renderer.focus();
        assert_close(back.latitude, 34.0, 1e-6);
        assert_close(back.longitude, -117.0, 1e-6);
    }

    #[test]
    fn pan_across_idl_wraps_with_continuous_scroll() {
        let mut params = base_params(GeoPoint::new(0.0, 179.9), CameraMode::Orthographic);
        params.continuous_scroll = true;
        params.resolution = 500.0;
        let renderer = TestRenderer::new(&params);

        // Pan east past the date line; > 0.2 degrees at this resolution.
        interactive::pan_by(&renderer, 50.0, 0.0, CollisionPolicy::Ignore, false);
        let focus = renderer.focus();
        assert!(
            focus.longitude < -179.5 && focus.longitude >= -180.0,
            "wrapped longitude = {}",
            focus.longitude
        );
    }

    #[test]
    fn pan_rejects_non_finite_delta() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Orthographic,
        ));
        let before = renderer.scene();
        interactive::pan_by(&renderer, f64::NAN, 0.0, CollisionPolicy::Ignore, false);
        assert_eq!(renderer.scene(), before);
    }

    #[test]
    fn zoom_by_halves_resolution() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Perspective,
        ));
        interactive::zoom_by(&renderer, 2.0, CollisionPolicy::Ignore, false);
        assert_close(renderer.scene().gsd, 5.0, 1e-9);
    }

    #[test]
    fn zoom_by_at_keeps_anchor_fixed() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Perspective,
        ));
        let sm = renderer.scene();
        let anchor = sm
            .inverse_raycast_model(Vec2::new(500.0, 300.0), &sm.earth, false)
            .expect("anchor");

        interactive::zoom_by_at(
            &renderer,
            2.0,
            &anchor,
            500.0,
            300.0,
            CollisionPolicy::Ignore,
            false,
        );

        let sm = renderer.scene();
        assert_close(sm.gsd, 5.0, 1e-9);
        let after = sm
            .inverse_raycast_model(Vec2::new(500.0, 300.0), &sm.earth, false)
            .expect("anchor after");
        assert_close(after.latitude, anchor.latitude, 1e-6);
        assert_close(after.longitude, anchor.longitude, 1e-6);
    }

    #[test]
    fn zoom_rejects_nan_scale() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Perspective,
        ));
        let before = renderer.scene();
        interactive::zoom_by(&renderer, f64::NAN, CollisionPolicy::Ignore, false);
        interactive::zoom_by(&renderer, -1.0, CollisionPolicy::Ignore, false);
        assert_eq!(renderer.scene(), before);
    }

    #[test]
    fn rotate_to_preserves_focus_anchor() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Perspective,
        ));
        let sm = renderer.scene();
        let anchor = sm
            .inverse_raycast_model(Vec2::new(500.0, 300.0), &sm.earth, false)
            .expect("anchor");

        interactive::rotate_to(
            &renderer,
            90.0,
            &anchor,
            500.0,
            300.0,
            CollisionPolicy::Ignore,
            false,
        );

        let sm = renderer.scene();
        assert_close(sm.camera.azimuth, 90.0, 1e-9);
        let after = sm
            .inverse_raycast_model(Vec2::new(500.0, 300.0), &sm.earth, false)
            .expect("anchor after");
        assert_close(after.latitude, anchor.latitude, 1e-6);
        assert_close(after.longitude, anchor.longitude, 1e-6);
    }

    #[test]
    fn tilt_to_clamps_and_preserves_scale() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Perspective,
        ));
        let anchor = renderer.focus();
        interactive::tilt_to(
            &renderer,
            120.0,
            &anchor,
            500.0,
            300.0,
            CollisionPolicy::Ignore,
            false,
        );
        let sm = renderer.scene();
        assert_close(sm.camera.tilt(), 85.0, 1e-9);
    }

    #[test]
    fn programmatic_pan_to_preserves_orientation() {
        let mut params = base_params(GeoPoint::new(34.0, -117.0), CameraMode::Perspective);
        params.rotation = 30.0;
        params.tilt = 40.0;
        let renderer = TestRenderer::new(&params);

        programmatic::pan_to(&renderer, &GeoPoint::new(35.0, -118.0), false);
        let sm = renderer.scene();
        assert_close(sm.camera.azimuth, 30.0, 1e-9);
        assert_close(sm.camera.tilt(), 40.0, 1e-9);
        let focus = renderer.focus();
        assert_close(focus.latitude, 35.0, 1e-6);
        assert_close(focus.longitude, -118.0, 1e-6);
    }

    #[test]
    fn programmatic_rejects_nan() {
        let renderer = TestRenderer::new(&base_params(
            GeoPoint::new(34.0, -117.0),
            CameraMode::Perspective,
        ));
        let before = renderer.scene();
        programmatic::rotate_to(&renderer, f64::NAN, false);
        programmatic::tilt_to(&renderer, f64::NAN, false);
        programmatic::zoom_to(&renderer, f64::NAN, false);
        assert_eq!(renderer.scene(), before);
    }
}
