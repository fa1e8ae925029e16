//! Per-frame camera interpolation with settle detection.
//!
//! Two states: settled and animating. Setting a target clears the settled
//! flag; each render pump advances every field toward its target by
//! `delta * factor` and, once every delta is within its epsilon, snaps
//! exactly to the targets and reports the transition. Issuing a new target
//! supersedes any in-flight animation; last writer wins.

/// Distance-field settle epsilon (degrees, meters per pixel).
const EPSILON: f64 = 1.0e-4;
/// Pixel-field settle epsilon.
const EPSILON_PX: f64 = 1.0e-2;

/// Interpolated camera parameters.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AnimationFields {
    pub latitude: f64,
    pub longitude: f64,
    /// Meters per pixel at the focus.
    pub resolution: f64,
    /// Degrees clockwise from north.
    pub rotation: f64,
    /// Degrees from nadir.
    pub tilt: f64,
    pub focus_x: f64,
    pub focus_y: f64,
}

/// Result of one [`Animator::animate`] step.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AnimationTick {
    /// The animator is settled after this step.
    pub settled: bool,
    /// This step performed the animating -> settled transition.
    pub settled_now: bool,
}

#[derive(Debug, Clone)]
pub struct Animator {
    current: AnimationFields,
    target: AnimationFields,
    factor: f64,
    settled: bool,
}

impl Animator {
    pub fn new(initial: AnimationFields) -> Self {
        Self {
            current: initial,
            target: initial,
            factor: 0.3,
            settled: true,
        }
    }

    pub fn current(&self) -> &AnimationFields {
        &self.current
    }

    pub fn target(&self) -> &AnimationFields {
        &self.target
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    /// Begin animating toward a new camera target. `factor` in (0, 1];
    /// 1.0 applies the full delta on the next step.
    pub fn start_animating(
        &mut self,
        latitude: f64,
        longitude: f64,
        resolution: f64,
        rotation: f64,
        tilt: f64,
        factor: f64,
    ) {
        self.target.latitude = latitude;
        self.target.longitude = longitude;
        self.target.resolution = resolution;
        self.target.rotation = rotation;
        self.target.tilt = tilt;
        self.factor = factor;
        self.settled = false;
    }

    /// Begin animating the focus pixel.
    pub fn start_animating_focus(&mut self, x: f64, y: f64, factor: f64) {
        self.target.focus_x = x;
        self.target.focus_y = y;
        self.factor = factor;
        self.settled = false;
    }

    /// Advance one frame. With continuous scroll the longitude delta takes
    /// the shorter path across the antimeridian; rotation always takes the
    /// shorter path around the circle.
    pub fn animate(&mut self, continuous_scroll: bool) -> AnimationTick {
        if self.settled {
            return AnimationTick { settled: true, settled_now: false };
        }

        let resolution_delta = self.target.resolution - self.current.resolution;
        let lat_delta = self.target.latitude - self.current.latitude;
        let mut lng_delta = self.target.longitude - self.current.longitude;
        let focus_x_delta = self.target.focus_x - self.current.focus_x;
        let focus_y_delta = self.target.focus_y - self.current.focus_y;

        if continuous_scroll && lng_delta.abs() > 180.0 {
            if lng_delta < 0.0 {
                lng_delta += 360.0;
            } else {
                lng_delta -= 360.0;
            }
        }

        self.current.resolution += resolution_delta * self.factor;
        self.current.latitude += lat_delta * self.factor;
        self.current.longitude += lng_delta * self.factor;
        self.current.focus_x += focus_x_delta * self.factor;
        self.current.focus_y += focus_y_delta * self.factor;

        let mut rot_delta = self.target.rotation - self.current.rotation;
        if rot_delta.abs() > 180.0 {
            if rot_delta < 0.0 {
                self.current.rotation -= 360.0;
            } else {
                self.current.rotation += 360.0;
            }
            rot_delta = self.target.rotation - self.current.rotation;
        }
        self.current.rotation += rot_delta * self.factor;

        let tilt_delta = self.target.tilt - self.current.tilt;
        self.current.tilt += tilt_delta * self.factor;

        let settled_now = is_tiny(lat_delta)
            && is_tiny(lng_delta)
            && is_tiny(resolution_delta)
            && is_tiny(rot_delta)
            && is_tiny(tilt_delta)
            && is_tiny_px(focus_x_delta)
            && is_tiny_px(focus_y_delta);

        if settled_now {
            // Snap exactly; no residual epsilon drift.
            self.current = self.target;
            self.settled = true;
        }

        AnimationTick { settled: self.settled, settled_now }
    }
}

fn is_tiny(v: f64) -> bool {
    v.abs() <= EPSILON
}

fn is_tiny_px(v: f64) -> bool {
    v.abs() <= EPSILON_PX
}
