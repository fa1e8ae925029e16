//! Scene modeling: the camera value type and the immutable scene model
//! relating geodetic coordinates to screen pixels.

pub mod camera;
pub mod error;
pub mod model;
pub mod services;

pub use camera::{Camera, CameraMode};
pub use error::SceneError;
pub use model::{
    DisplayOrigin, IdlInfo, SceneModel, SceneParams, VFOV_DEG, gsd_from_range, range_from_gsd,
};
pub use services::{
    ElevationSource, HitTestProvider, InverseContext, InverseHints, InverseMode, InverseResult,
    InverseSource,
};
