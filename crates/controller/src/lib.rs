//! Stateless camera-control operations and the map controller façade.
//!
//! Operations read a renderer's current scene model, compute target camera
//! parameters, and delegate back through [`MapRenderer::look_at`]; they
//! never mutate the scene they read.

pub mod camera_ops;
pub mod map;
pub mod renderer;
pub mod util;

pub use map::{MapController, OnFocusPointChangedListener, OnPanRequestedListener};
pub use renderer::{CollisionPolicy, MapRenderer};
