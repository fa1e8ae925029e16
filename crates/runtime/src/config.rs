use foundation::math::WGS84_EQUATORIAL_CIRCUMFERENCE;

pub const INCHES_PER_METER: f64 = 39.37;

/// Process-wide display scaling and camera configuration, threaded through
/// renderer construction. Immutable once built; no mutable statics.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplayConfig {
    pub default_dpi: f64,
    /// Minimum camera standoff from the terrain surface, meters.
    pub collision_radius: f64,
    /// Antimeridian-continuous panning.
    pub continuous_scroll: bool,
    /// Default smoothing factor for animated camera motion, in (0, 1].
    pub animation_factor: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_dpi: 96.0,
            collision_radius: 10.0,
            continuous_scroll: true,
            animation_factor: 0.3,
        }
    }
}

/// Meters per pixel of the physical display itself.
pub fn display_resolution(dpi: f64) -> f64 {
    (1.0 / dpi) * (1.0 / INCHES_PER_METER)
}

/// Map resolution (meters per pixel) for a map scale at the given DPI.
pub fn map_resolution(dpi: f64, scale: f64) -> f64 {
    display_resolution(dpi) / scale
}

/// Map scale for a map resolution at the given DPI.
pub fn map_scale(dpi: f64, resolution: f64) -> f64 {
    display_resolution(dpi) / resolution
}

/// Width of the full equator rendered at 1:1 scale, pixels.
pub fn full_equitorial_extent_pixels(dpi: f64) -> f64 {
    WGS84_EQUATORIAL_CIRCUMFERENCE * INCHES_PER_METER * dpi
}

#[cfg(test)]
mod tests {
    use super::{display_resolution, map_resolution, map_scale};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn scale_resolution_duality() {
        let dpi = 240.0;
        let scale = 1.0 / 250_000.0;
        let res = map_resolution(dpi, scale);
        assert_close(map_scale(dpi, res), scale, 1e-18);
    }

    #[test]
    fn higher_dpi_shrinks_display_resolution() {
        assert!(display_resolution(240.0) < display_resolution(96.0));
    }
}
