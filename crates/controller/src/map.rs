//! High-level map control façade.
//!
//! Translates pan/zoom/rotate/tilt requests into camera operations, tracks
//! the focus (anchor) pixel, and dispatches focus-changed and pan-requested
//! notifications. Listener registries are mutex-guarded vectors; callbacks
//! are invoked outside the lock so listeners may (un)register concurrently,
//! and any camera mutation they issue is enqueued by the renderer rather
//! than executed inline.

use std::sync::Arc;

use foundation::GeoPoint;
use foundation::math::Vec2;
use parking_lot::Mutex;
use scene::DisplayOrigin;

use crate::camera_ops::{interactive, programmatic};
use crate::renderer::{CollisionPolicy, MapRenderer};

pub trait OnFocusPointChangedListener: Send + Sync {
    fn on_focus_point_changed(&self, x: f64, y: f64);
}

pub trait OnPanRequestedListener: Send + Sync {
    fn on_pan_requested(&self);
}

pub struct MapController<R: MapRenderer> {
    renderer: Arc<R>,
    focus_listeners: Mutex<Vec<Arc<dyn OnFocusPointChangedListener>>>,
    pan_listeners: Mutex<Vec<Arc<dyn OnPanRequestedListener>>>,
    focus_stack: Mutex<Vec<Vec2>>,
    default_focus_offset: Mutex<Vec2>,
}

impl<R: MapRenderer> MapController<R> {
    pub fn new(renderer: Arc<R>) -> Self {
        Self {
            renderer,
            focus_listeners: Mutex::new(Vec::new()),
            pan_listeners: Mutex::new(Vec::new()),
            focus_stack: Mutex::new(Vec::new()),
            default_focus_offset: Mutex::new(Vec2::default()),
        }
    }

    pub fn renderer(&self) -> &Arc<R> {
        &self.renderer
    }

    /* focus point */

    /// Current focus pixel: the top of the focus stack, else the viewport
    /// center shifted by the default focus offset.
    pub fn focus_point(&self) -> Vec2 {
        if let Some(p) = self.focus_stack.lock().last().copied() {
            return p;
        }
        let offset = *self.default_focus_offset.lock();
        match self.renderer.scene_model(false, DisplayOrigin::UpperLeft) {
            Some(sm) => Vec2::new(sm.width / 2.0 + offset.x, sm.height / 2.0 + offset.y),
            None => offset,
        }
    }

    /// Anchor subsequent camera motion at an explicit pixel. Balanced by
    /// [`Self::pop_focus_point`].
    pub fn push_focus_point(&self, focus: Vec2) {
        self.focus_stack.lock().push(focus);
        self.apply_focus();
    }

    pub fn pop_focus_point(&self) {
        self.focus_stack.lock().pop();
        self.apply_focus();
    }

    /// Offset of the default focus from the viewport center.
    pub fn set_default_focus_offset(&self, offset: Vec2) {
        *self.default_focus_offset.lock() = offset;
        if self.focus_stack.lock().is_empty() {
            self.apply_focus();
        } else {
            // Stack entries win; still announce the new default.
            self.dispatch_focus_changed();
        }
    }

    fn apply_focus(&self) {
        let focus = self.focus_point();
        self.renderer.set_focus_point(focus.x, focus.y);
        self.dispatch_focus_changed();
    }

    /* listeners */

    /// Registers a focus listener and immediately announces the current
    /// focus to it.
    pub fn add_focus_point_changed_listener(&self, l: Arc<dyn OnFocusPointChangedListener>) {
        self.focus_listeners.lock().push(l.clone());
        let focus = self.focus_point();
        l.on_focus_point_changed(focus.x, focus.y);
    }

    pub fn remove_focus_point_changed_listener(&self, l: &Arc<dyn OnFocusPointChangedListener>) {
        self.focus_listeners.lock().retain(|e| !Arc::ptr_eq(e, l));
    }

    pub fn add_pan_requested_listener(&self, l: Arc<dyn OnPanRequestedListener>) {
        self.pan_listeners.lock().push(l);
    }

    pub fn remove_pan_requested_listener(&self, l: &Arc<dyn OnPanRequestedListener>) {
        self.pan_listeners.lock().retain(|e| !Arc::ptr_eq(e, l));
    }

    fn dispatch_focus_changed(&self) {
        let focus = self.focus_point();
        let listeners = self.focus_listeners.lock().clone();
        for l in listeners {
            l.on_focus_point_changed(focus.x, focus.y);
        }
    }

    fn dispatch_pan_requested(&self) {
        let listeners = self.pan_listeners.lock().clone();
        for l in listeners {
            l.on_pan_requested();
        }
    }

    /* motion */

    /// Pan the map to center the given point at the focus pixel.
    pub fn pan_to(&self, point: &GeoPoint, animate: bool) {
        self.pan_to_opts(point, animate, true);
    }

    pub fn pan_to_opts(&self, point: &GeoPoint, animate: bool, notify: bool) {
        if !point.is_valid() {
            return;
        }
        if notify {
            self.dispatch_pan_requested();
        }
        programmatic::pan_to(self.renderer.as_ref(), point, animate);
    }

    /// Pan and zoom in one motion.
    pub fn pan_zoom_to(&self, point: &GeoPoint, resolution: f64, animate: bool) {
        self.pan_zoom_rotate_to(point, resolution, f64::NAN, animate);
    }

    /// Pan, zoom, and rotate in one motion. A non-finite resolution or
    /// rotation preserves the current value.
    pub fn pan_zoom_rotate_to(
        &self,
        point: &GeoPoint,
        resolution: f64,
        rotation: f64,
        animate: bool,
    ) {
        if !point.is_valid() {
            return;
        }
        let Some(sm) = self.renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let resolution = if resolution.is_finite() { resolution } else { sm.gsd };
        let rotation = if rotation.is_finite() { rotation } else { sm.camera.azimuth };
        self.dispatch_pan_requested();
        self.renderer.look_at(
            *point,
            resolution,
            rotation,
            sm.camera.tilt(),
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Pan by a screen-pixel delta.
    pub fn pan_by(&self, tx: f64, ty: f64, animate: bool) {
        self.pan_by_opts(tx, ty, animate, true);
    }

    pub fn pan_by_opts(&self, tx: f64, ty: f64, animate: bool, notify: bool) {
        if notify {
            self.dispatch_pan_requested();
        }
        interactive::pan_by(
            self.renderer.as_ref(),
            tx,
            ty,
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Zoom to an absolute resolution about the focus point.
    pub fn zoom_to(&self, resolution: f64, animate: bool) {
        programmatic::zoom_to(self.renderer.as_ref(), resolution, animate);
    }

    /// Zoom by a scale factor, holding the geodetic point under the focus
    /// pixel fixed.
    pub fn zoom_by(&self, scale_factor: f64, animate: bool) {
        let focus = self.focus_point();
        let Some(anchor) = self.anchor_at(focus) else {
            return;
        };
        interactive::zoom_by_at(
            self.renderer.as_ref(),
            scale_factor,
            &anchor,
            focus.x,
            focus.y,
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Rotate the map to an absolute azimuth.
    pub fn rotate_to(&self, rotation: f64, animate: bool) {
        programmatic::rotate_to(self.renderer.as_ref(), rotation, animate);
    }

    /// Rotate by a delta about the focus point.
    pub fn rotate_by(&self, theta: f64, animate: bool) {
        if !theta.is_finite() {
            return;
        }
        let Some(sm) = self.renderer.scene_model(false, DisplayOrigin::UpperLeft) else {
            return;
        };
        let focus = self.focus_point();
        let Some(anchor) = self.anchor_at(focus) else {
            return;
        };
        interactive::rotate_to(
            self.renderer.as_ref(),
            sm.camera.azimuth + theta,
            &anchor,
            focus.x,
            focus.y,
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Tilt the map to an absolute angle (degrees from nadir).
    pub fn tilt_to(&self, tilt: f64, animate: bool) {
        programmatic::tilt_to(self.renderer.as_ref(), tilt, animate);
    }

    /// Tilt by a delta about the focus point.
    pub fn tilt_by(&self, delta: f64, animate: bool) {
        if !delta.is_finite() {
            return;
        }
        let focus = self.focus_point();
        let Some(anchor) = self.anchor_at(focus) else {
            return;
        };
        interactive::tilt_by(
            self.renderer.as_ref(),
            delta,
            &anchor,
            CollisionPolicy::default(),
            animate,
        );
    }

    /// Geodetic point under a pixel, for anchoring interactive motion.
    fn anchor_at(&self, focus: Vec2) -> Option<GeoPoint> {
        let sm = self.renderer.scene_model(false, DisplayOrigin::UpperLeft)?;
        sm.inverse_raycast_model(focus, &sm.earth, true)
    }
}
