use foundation::math::{Mat4, Vec3};

/// Projection style of the scene camera.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CameraMode {
    Perspective,
    Orthographic,
}

/// Viewer description for one scene.
///
/// Pure value: rebuilt whenever the owning [`crate::SceneModel`] is rebuilt
/// and never mutated in place. `location` and `target` are expressed in the
/// scene projection's coordinate space.
///
/// `elevation` is degrees above the horizontal tangent plane at the target
/// (-90 = nadir). Camera-control entry points instead speak "tilt", which is
/// `90 + elevation`; both conventions are kept at their respective
/// boundaries.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub location: Vec3,
    pub target: Vec3,
    /// Degrees clockwise from north.
    pub azimuth: f64,
    pub elevation: f64,
    pub roll: f64,
    /// Full vertical field of view, degrees.
    pub fov: f64,
    pub aspect_ratio: f64,
    /// Clip-space near/far plane values.
    pub near: f64,
    pub far: f64,
    /// World-space clip plane distances, nominal meters.
    pub near_meters: f64,
    pub far_meters: f64,
    pub mode: CameraMode,
    /// Projected space -> eye space (nominal meters).
    pub model_view: Mat4,
    /// Eye space -> clip space.
    pub projection: Mat4,
}

impl Camera {
    pub fn is_perspective(&self) -> bool {
        self.mode == CameraMode::Perspective
    }

    /// Tilt convention used by the camera-control surface.
    pub fn tilt(&self) -> f64 {
        90.0 + self.elevation
    }
}
