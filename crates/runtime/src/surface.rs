use std::sync::Arc;

use parking_lot::Mutex;

/// Render-target collaborator: viewport size, pixel density, and the
/// ability to request an extra frame when continuous rendering is off.
pub trait RenderSurface: Send + Sync {
    fn width(&self) -> f64;
    fn height(&self) -> f64;
    fn dpi(&self) -> f64;
    /// Ask the host to schedule another render pump.
    fn request_refresh(&self);
    fn add_size_changed_listener(&self, listener: Arc<dyn OnSizeChangedListener>);
    fn remove_size_changed_listener(&self, listener: &Arc<dyn OnSizeChangedListener>);
}

pub trait OnSizeChangedListener: Send + Sync {
    fn on_size_changed(&self, width: f64, height: f64);
}

/// Reusable listener registry for [`RenderSurface`] implementations.
/// Callbacks are invoked outside the registry lock.
#[derive(Default)]
pub struct SizeChangedListeners {
    listeners: Mutex<Vec<Arc<dyn OnSizeChangedListener>>>,
}

impl SizeChangedListeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Arc<dyn OnSizeChangedListener>) {
        self.listeners.lock().push(listener);
    }

    pub fn remove(&self, listener: &Arc<dyn OnSizeChangedListener>) {
        self.listeners.lock().retain(|e| !Arc::ptr_eq(e, listener));
    }

    pub fn notify(&self, width: f64, height: f64) {
        let listeners = self.listeners.lock().clone();
        for l in listeners {
            l.on_size_changed(width, height);
        }
    }
}
