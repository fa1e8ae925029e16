//! The renderer-side camera owner.
//!
//! A single render thread drives [`SceneRenderer::pump`]; arbitrary caller
//! threads enqueue camera mutations through the [`MapRenderer`] surface and
//! return immediately. Queued mutations from one thread apply in FIFO order,
//! each atomically, strictly before the animation step of the pump that
//! drains them. Read-only queries snapshot the published scene under a
//! readers-writer lock; a disposed renderer is a sentinel (`None`) that
//! makes every query return not-available rather than crash.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use controller::{CollisionPolicy, MapRenderer};
use foundation::math::{wrap_longitude, Mat4, Ray, Vec3};
use foundation::{AltitudeReference, GeoPoint};
use parking_lot::{Mutex, RwLock};
use projection::Projection;
use scene::{
    gsd_from_range, range_from_gsd, CameraMode, DisplayOrigin, ElevationSource, HitTestProvider,
    InverseContext, InverseHints, InverseMode, InverseResult, SceneError, SceneModel, SceneParams,
    VFOV_DEG,
};
use tracing::{debug, warn};

use crate::animation::{AnimationFields, Animator};
use crate::config::DisplayConfig;
use crate::surface::RenderSurface;

/// Notified from the render thread after each scene rebuild that changed
/// the camera. Implementations must not block or synchronously re-enter
/// camera mutation; mutations they issue are enqueued for the next pump.
pub trait OnCameraChangedListener: Send + Sync {
    fn on_camera_changed(&self, scene: &SceneModel);
}

/// Notified from the render thread on each animating -> settled transition.
pub trait OnAnimationSettledListener: Send + Sync {
    fn on_animation_settled(&self);
}

enum Command {
    LookAt {
        at: GeoPoint,
        resolution: f64,
        azimuth: f64,
        tilt: f64,
        animate: bool,
    },
    Focus {
        x: f64,
        y: f64,
    },
}

struct Snapshots {
    /// Scene rendered this pass.
    current: SceneModel,
    /// Scene at the pending animation target.
    target: SceneModel,
}

pub struct SceneRenderer {
    config: DisplayConfig,
    surface: Arc<dyn RenderSurface>,
    projection: Projection,
    mode: CameraMode,
    elevation: Option<Arc<dyn ElevationSource>>,
    hit_providers: Mutex<Vec<Arc<dyn HitTestProvider>>>,
    commands: Mutex<VecDeque<Command>>,
    animator: Mutex<Animator>,
    /// Non-animated focus altitude carried alongside the animator fields.
    focus_altitude: Mutex<Option<f64>>,
    snapshots: RwLock<Option<Snapshots>>,
    camera_listeners: Mutex<Vec<Arc<dyn OnCameraChangedListener>>>,
    settle_listeners: Mutex<Vec<Arc<dyn OnAnimationSettledListener>>>,
    continuous_render: AtomicBool,
}

impl SceneRenderer {
    /// Creates the renderer with a whole-world initial view.
    pub fn new(
        config: DisplayConfig,
        surface: Arc<dyn RenderSurface>,
        projection: Projection,
        mode: CameraMode,
        elevation: Option<Arc<dyn ElevationSource>>,
    ) -> Result<Self, SceneError> {
        let width = surface.width().max(1.0);
        let height = surface.height().max(1.0);
        let resolution = foundation::math::WGS84_EQUATORIAL_CIRCUMFERENCE / width;

        let initial = SceneParams {
            display_dpi: surface.dpi(),
            width,
            height,
            projection,
            focus: GeoPoint::new(0.0, 0.0),
            focus_x: width / 2.0,
            focus_y: height / 2.0,
            rotation: 0.0,
            tilt: 0.0,
            resolution,
            mode,
            continuous_scroll: config.continuous_scroll,
        };
        let scene = SceneModel::new(&initial)?;

        let animator = Animator::new(AnimationFields {
            latitude: initial.focus.latitude,
            longitude: initial.focus.longitude,
            resolution,
            rotation: 0.0,
            tilt: 0.0,
            focus_x: initial.focus_x,
            focus_y: initial.focus_y,
        });

        Ok(Self {
            config,
            surface,
            projection,
            mode,
            elevation,
            hit_providers: Mutex::new(Vec::new()),
            commands: Mutex::new(VecDeque::new()),
            animator: Mutex::new(animator),
            focus_altitude: Mutex::new(None),
            snapshots: RwLock::new(Some(Snapshots {
                current: scene.clone(),
                target: scene,
            })),
            camera_listeners: Mutex::new(Vec::new()),
            settle_listeners: Mutex::new(Vec::new()),
            continuous_render: AtomicBool::new(true),
        })
    }

    /* registration */

    pub fn add_hit_test_provider(&self, provider: Arc<dyn HitTestProvider>) {
        self.hit_providers.lock().push(provider);
    }

    pub fn remove_hit_test_provider(&self, provider: &Arc<dyn HitTestProvider>) {
        self.hit_providers.lock().retain(|e| !Arc::ptr_eq(e, provider));
    }

    pub fn add_camera_changed_listener(&self, l: Arc<dyn OnCameraChangedListener>) {
        self.camera_listeners.lock().push(l);
    }

    pub fn remove_camera_changed_listener(&self, l: &Arc<dyn OnCameraChangedListener>) {
        self.camera_listeners.lock().retain(|e| !Arc::ptr_eq(e, l));
    }

    pub fn add_animation_settled_listener(&self, l: Arc<dyn OnAnimationSettledListener>) {
        self.settle_listeners.lock().push(l);
    }

    pub fn remove_animation_settled_listener(&self, l: &Arc<dyn OnAnimationSettledListener>) {
        self.settle_listeners.lock().retain(|e| !Arc::ptr_eq(e, l));
    }

    /// Whether an external loop re-invokes the pump every frame. When
    /// disabled, the renderer requests refreshes itself until settled.
    pub fn set_continuous_render(&self, enabled: bool) {
        self.continuous_render.store(enabled, Ordering::SeqCst);
    }

    /* queries */

    /// Resolution currently drawn, meters per pixel at the focus.
    pub fn map_resolution(&self) -> f64 {
        self.animator.lock().current().resolution
    }

    /// Geodetic to screen against the published scene.
    pub fn forward(&self, geo: &GeoPoint, origin: DisplayOrigin) -> Option<Vec3> {
        let guard = self.snapshots.read();
        let snaps = guard.as_ref()?;
        snaps.current.with_origin(origin).forward(geo)
    }

    /// Screen to geodetic against the published scene, consulting the
    /// registered hit-test providers and the elevation service.
    pub fn inverse(
        &self,
        screen: Vec3,
        mode: InverseMode,
        hints: InverseHints,
        origin: DisplayOrigin,
    ) -> Option<InverseResult> {
        let guard = self.snapshots.read();
        let snaps = guard.as_ref()?;
        let scene = snaps.current.with_origin(origin);

        let providers = self.hit_providers.lock();
        let refs: Vec<&dyn HitTestProvider> = providers.iter().map(|p| p.as_ref()).collect();
        let ctx = InverseContext {
            surfaces: &refs,
            elevation: self.elevation.as_deref(),
        };
        scene.inverse(screen, mode, hints, ctx)
    }

    /// Tears down the renderer. Concurrent and subsequent queries observe
    /// the sentinel and report not-available.
    pub fn dispose(&self) {
        *self.snapshots.write() = None;
        self.commands.lock().clear();
    }

    /* render thread */

    /// One render pump: apply queued camera mutations, advance the
    /// animation, rebuild and publish the scene, dispatch notifications.
    pub fn pump(&self) {
        let width = self.surface.width().max(1.0);
        let height = self.surface.height().max(1.0);
        let dpi = self.surface.dpi();

        let (fields, target_fields, tick) = {
            let mut animator = self.animator.lock();
            let queued: Vec<Command> = self.commands.lock().drain(..).collect();
            for cmd in queued {
                match cmd {
                    Command::LookAt { at, resolution, azimuth, tilt, animate } => {
                        *self.focus_altitude.lock() = at.altitude;
                        let factor = if animate { self.config.animation_factor } else { 1.0 };
                        animator.start_animating(
                            at.latitude,
                            at.longitude,
                            resolution,
                            azimuth,
                            tilt,
                            factor,
                        );
                    }
                    Command::Focus { x, y } => {
                        animator.start_animating_focus(x, y, self.config.animation_factor);
                    }
                }
            }
            let tick = animator.animate(self.config.continuous_scroll);
            (*animator.current(), *animator.target(), tick)
        };

        let focus_altitude = *self.focus_altitude.lock();
        let params_of = |f: &AnimationFields| SceneParams {
            display_dpi: dpi,
            width,
            height,
            projection: self.projection,
            focus: GeoPoint {
                latitude: f.latitude,
                longitude: wrap_longitude(f.longitude),
                altitude: focus_altitude,
                altitude_reference: AltitudeReference::Ellipsoid,
                ce90: None,
                le90: None,
            },
            focus_x: f.focus_x,
            focus_y: f.focus_y,
            rotation: f.rotation,
            tilt: f.tilt,
            resolution: f.resolution,
            mode: self.mode,
            continuous_scroll: self.config.continuous_scroll,
        };

        let mut changed_scene: Option<SceneModel> = None;
        match SceneModel::new(&params_of(&fields)) {
            Ok(scene) => {
                let target = match SceneModel::new(&params_of(&target_fields)) {
                    Ok(t) => t,
                    Err(_) => scene.clone(),
                };
                let mut guard = self.snapshots.write();
                if let Some(snaps) = guard.as_mut() {
                    if snaps.current != scene {
                        changed_scene = Some(scene.clone());
                    }
                    snaps.current = scene;
                    snaps.target = target;
                }
                // Disposed mid-pump: drop the rebuilt scene on the floor.
            }
            Err(err) => {
                // Never publish a half-constructed scene; keep rendering
                // the previous one.
                warn!(%err, "scene rebuild failed; retaining previous scene");
            }
        }

        if let Some(scene) = changed_scene {
            let listeners = self.camera_listeners.lock().clone();
            for l in listeners {
                l.on_camera_changed(&scene);
            }
        }

        if tick.settled_now {
            let listeners = self.settle_listeners.lock().clone();
            for l in listeners {
                l.on_animation_settled();
            }
        }

        if !tick.settled && !self.continuous_render.load(Ordering::SeqCst) {
            self.surface.request_refresh();
        }
    }

    /* camera requests */

    fn enqueue(&self, cmd: Command) {
        self.commands.lock().push_back(cmd);
    }

    fn is_disposed(&self) -> bool {
        self.snapshots.read().is_none()
    }

    /// Converts an above-ground altitude to height above ellipsoid using
    /// the elevation service.
    fn resolve_altitude(&self, mut point: GeoPoint) -> GeoPoint {
        if point.altitude_reference == AltitudeReference::AboveGround {
            let ground = self
                .elevation
                .as_ref()
                .and_then(|e| e.elevation(point.latitude, point.longitude))
                .unwrap_or(0.0);
            point.altitude = Some(ground + point.altitude_or(0.0));
            point.altitude_reference = AltitudeReference::Ellipsoid;
        }
        point
    }

    /// Applies the collision policy to a candidate look-at placement.
    /// Returns the possibly adjusted focus and resolution, or `None` to
    /// abort the motion.
    fn resolve_collision(
        &self,
        at: GeoPoint,
        resolution: f64,
        azimuth: f64,
        tilt: f64,
        policy: CollisionPolicy,
    ) -> Option<(GeoPoint, f64)> {
        let elevation = match (&self.elevation, policy) {
            (_, CollisionPolicy::Ignore) | (None, _) => return Some((at, resolution)),
            (Some(e), _) => e.clone(),
        };

        let base = {
            let guard = self.snapshots.read();
            guard.as_ref()?.target.params()
        };
        let candidate = SceneModel::new(&SceneParams {
            focus: at,
            resolution,
            rotation: azimuth,
            tilt,
            ..base
        })
        .ok()?;

        let cam_geo = candidate.projection.inverse(candidate.camera.location);
        let terrain = elevation
            .elevation(cam_geo.latitude, cam_geo.longitude)
            .unwrap_or(0.0);
        let clearance = cam_geo.altitude_or(0.0) - terrain;
        if clearance >= self.config.collision_radius {
            return Some((at, resolution));
        }

        match policy {
            CollisionPolicy::Ignore => Some((at, resolution)),
            CollisionPolicy::Abort => {
                debug!("look_at aborted: camera within collision radius");
                None
            }
            CollisionPolicy::AdjustCamera => {
                // Pull the camera back along the line of sight until it
                // clears the surface.
                let deficit = self.config.collision_radius - clearance;
                let height = self.surface.height().max(1.0);
                let range = range_from_gsd(resolution, VFOV_DEG, height) + deficit;
                Some((at, gsd_from_range(range, VFOV_DEG, height)))
            }
            CollisionPolicy::AdjustFocus => {
                // Re-anchor the focus onto the terrain surface beneath it.
                let mut adjusted = at;
                adjusted.altitude =
                    Some(elevation.elevation(at.latitude, at.longitude).unwrap_or(0.0));
                Some((adjusted, resolution))
            }
        }
    }

    /// Look direction for a camera at `geo` with the given azimuth and
    /// tilt, as a unit vector in nominal meters.
    fn look_direction(&self, geo: &GeoPoint, azimuth: f64, tilt: f64) -> Vec3 {
        let mut frame = Mat4::identity();
        if self.projection.is_3d() {
            frame.rotate((geo.longitude + 90.0).to_radians(), 0.0, 0.0, 1.0);
            frame.rotate((90.0 - geo.latitude).to_radians(), 1.0, 0.0, 0.0);
        }
        frame.rotate((-azimuth).to_radians(), 0.0, 0.0, 1.0);
        frame.rotate(tilt.to_radians(), 1.0, 0.0, 0.0);
        -frame.basis(2)
    }
}

impl MapRenderer for SceneRenderer {
    fn scene_model(&self, instant: bool, origin: DisplayOrigin) -> Option<SceneModel> {
        let guard = self.snapshots.read();
        let snaps = guard.as_ref()?;
        let scene = if instant { &snaps.current } else { &snaps.target };
        Some(scene.with_origin(origin))
    }

    fn look_at(
        &self,
        at: GeoPoint,
        resolution: f64,
        azimuth: f64,
        tilt: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) -> bool {
        let at = at.normalized();
        if !at.is_valid() {
            warn!("invalid look_at focus rejected");
            return false;
        }
        if !resolution.is_finite() || resolution <= 0.0 || !azimuth.is_finite() || !tilt.is_finite()
        {
            warn!("invalid look_at parameters rejected");
            return false;
        }
        if self.is_disposed() {
            return false;
        }

        let at = self.resolve_altitude(at);
        let Some((at, resolution)) =
            self.resolve_collision(at, resolution, azimuth, tilt, collision)
        else {
            return false;
        };

        self.enqueue(Command::LookAt { at, resolution, azimuth, tilt, animate });
        true
    }

    fn look_from(
        &self,
        from: GeoPoint,
        azimuth: f64,
        elevation: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) -> bool {
        let from = from.normalized();
        if !from.is_valid() || !azimuth.is_finite() || !elevation.is_finite() {
            warn!("invalid look_from rejected");
            return false;
        }
        if self.is_disposed() {
            return false;
        }

        let mut from = self.resolve_altitude(from);

        // Clear the camera position itself against the terrain.
        if let Some(elev_src) = &self.elevation {
            if collision != CollisionPolicy::Ignore {
                let terrain = elev_src
                    .elevation(from.latitude, from.longitude)
                    .unwrap_or(0.0);
                let clearance = from.altitude_or(0.0) - terrain;
                if clearance < self.config.collision_radius {
                    match collision {
                        CollisionPolicy::Abort => return false,
                        CollisionPolicy::AdjustCamera | CollisionPolicy::AdjustFocus => {
                            from.altitude = Some(terrain + self.config.collision_radius);
                        }
                        CollisionPolicy::Ignore => {}
                    }
                }
            }
        }

        // Tilt duality: look_from speaks elevation above the horizontal;
        // the animation target speaks degrees from nadir.
        let tilt = 90.0 + elevation;

        let scene = {
            let guard = self.snapshots.read();
            match guard.as_ref() {
                Some(snaps) => snaps.target.clone(),
                None => return false,
            }
        };

        let from_proj = match scene.projection.forward(&from) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let origin_m = scene.display_model.to_nominal_meters(from_proj);
        let dir_m = self.look_direction(&from, azimuth, tilt);

        // The earth models are axis-aligned, so the intersection can run in
        // nominal-meter space directly.
        let Some(hit_m) = scene.earth.intersect(&Ray::new(origin_m, dir_m)) else {
            debug!("look_from does not intersect the earth");
            return false;
        };

        let target_geo = scene
            .projection
            .inverse(scene.display_model.from_nominal_meters(hit_m));
        if !target_geo.latitude.is_finite() || !target_geo.longitude.is_finite() {
            return false;
        }

        let range = (hit_m - origin_m).length();
        let gsd = gsd_from_range(range, VFOV_DEG, self.surface.height().max(1.0));

        self.enqueue(Command::LookAt {
            at: target_geo,
            resolution: gsd,
            azimuth,
            tilt,
            animate,
        });
        true
    }

    fn set_focus_point(&self, x: f64, y: f64) {
        if !x.is_finite() || !y.is_finite() || self.is_disposed() {
            return;
        }
        self.enqueue(Command::Focus { x, y });
    }
}
