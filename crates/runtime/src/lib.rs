//! Render-thread runtime: the animation state machine, the scene renderer
//! that owns the live camera state, and the render-surface collaborator
//! contract.

pub mod animation;
pub mod config;
pub mod renderer;
pub mod surface;

pub use animation::{AnimationTick, Animator};
pub use config::DisplayConfig;
pub use renderer::{OnAnimationSettledListener, OnCameraChangedListener, SceneRenderer};
pub use surface::{OnSizeChangedListener, RenderSurface, SizeChangedListeners};
