use foundation::GeoPoint;
use scene::{DisplayOrigin, SceneModel};

/// Resolution strategy when a requested camera placement would put the
/// camera inside the terrain collision radius.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum CollisionPolicy {
    /// Accept the placement as requested.
    Ignore,
    /// Pull the camera back until it clears the surface.
    AdjustCamera,
    /// Re-anchor the focus onto the surface under it.
    #[default]
    AdjustFocus,
    /// Reject the motion entirely.
    Abort,
}

/// Capability contract of the rendering side consumed by camera-control
/// operations. Implementations marshal mutations onto their render thread;
/// callers never block waiting for the camera update to apply.
pub trait MapRenderer {
    /// Scene snapshot: the currently rendered scene when `instant`, the
    /// pending animation-target scene otherwise. `None` when the renderer
    /// has been disposed concurrently; callers treat that as a no-op.
    fn scene_model(&self, instant: bool, origin: DisplayOrigin) -> Option<SceneModel>;

    /// Orient the camera to look at `at` with the given ground sample
    /// distance, azimuth, and tilt (degrees from nadir). Returns `false`
    /// when the request is rejected (invalid input or collision abort); the
    /// current scene is then unchanged.
    fn look_at(
        &self,
        at: GeoPoint,
        resolution: f64,
        azimuth: f64,
        tilt: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) -> bool;

    /// Place the camera at `from` looking along `azimuth` with `elevation`
    /// degrees above the horizontal (-90 = straight down).
    fn look_from(
        &self,
        from: GeoPoint,
        azimuth: f64,
        elevation: f64,
        collision: CollisionPolicy,
        animate: bool,
    ) -> bool;

    /// Move the focus (anchor) pixel.
    fn set_focus_point(&self, x: f64, y: f64);
}
