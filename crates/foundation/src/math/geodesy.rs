use super::vec::Vec3;

/// WGS84 semi-major axis (meters).
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening.
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis (meters).
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);
/// WGS84 first eccentricity squared.
pub const WGS84_E2: f64 = WGS84_F * (2.0 - WGS84_F);
/// WGS84 second eccentricity squared.
pub const WGS84_EP2: f64 = (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);

/// Equatorial circumference (meters).
pub const WGS84_EQUATORIAL_CIRCUMFERENCE: f64 = 2.0 * WGS84_A * std::f64::consts::PI;

/// Wraps a longitude into [-180, 180). Idempotent.
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    if (-180.0..180.0).contains(&lon_deg) {
        return lon_deg;
    }
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

/// Normalizes a heading into [0, 360).
pub fn normalize_azimuth(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

/// East/west side of the prime meridian; used for antimeridian unwrapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Hemisphere {
    East,
    West,
}

impl Hemisphere {
    pub fn of(lon_deg: f64) -> Self {
        if lon_deg < 0.0 { Self::West } else { Self::East }
    }
}

/// Line-of-sight distance to the horizon for an observer `height_m` above
/// the surface, over the idealized sphere.
pub fn distance_to_horizon(height_m: f64) -> f64 {
    let h = height_m.max(0.0);
    (h * (2.0 * WGS84_A + h)).sqrt()
}

/// Geodetic (degrees, meters HAE) to earth-centered, earth-fixed meters.
pub fn geodetic_to_ecef(lat_deg: f64, lon_deg: f64, alt_m: f64) -> Vec3 {
    let lat = lat_deg.to_radians();
    let lon = lon_deg.to_radians();
    let sin_lat = lat.sin();
    let cos_lat = lat.cos();
    let sin_lon = lon.sin();
    let cos_lon = lon.cos();

    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    Vec3::new(
        (n + alt_m) * cos_lat * cos_lon,
        (n + alt_m) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_E2) + alt_m) * sin_lat,
    )
}

/// ECEF meters to geodetic `(lat_deg, lon_deg, alt_m)`.
pub fn ecef_to_geodetic(ecef: Vec3) -> (f64, f64, f64) {
    let p = (ecef.x * ecef.x + ecef.y * ecef.y).sqrt();
    let lon = ecef.y.atan2(ecef.x);

    let theta = (ecef.z * WGS84_A).atan2(p * WGS84_B);
    let sin_theta = theta.sin();
    let cos_theta = theta.cos();

    let lat = (ecef.z + WGS84_EP2 * WGS84_B * sin_theta * sin_theta * sin_theta)
        .atan2(p - WGS84_E2 * WGS84_A * cos_theta * cos_theta * cos_theta);

    let sin_lat = lat.sin();
    let n = WGS84_A / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
    // At the poles p/cos(lat) degenerates; fall back to the polar radius.
    let alt = if p > 1.0 {
        p / lat.cos() - n
    } else {
        ecef.z.abs() - WGS84_B
    };

    (lat.to_degrees(), lon.to_degrees(), alt)
}

#[cfg(test)]
mod tests {
    use super::{
        Hemisphere, WGS84_A, distance_to_horizon, ecef_to_geodetic, geodetic_to_ecef,
        normalize_azimuth, wrap_longitude,
    };
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn wrap_longitude_range_and_idempotence() {
        for lon in [-720.5, -180.0, -179.9, 0.0, 179.9, 180.0, 360.0, 539.5] {
            let w = wrap_longitude(lon);
            assert!((-180.0..180.0).contains(&w), "wrap({lon}) = {w}");
            assert_eq!(wrap_longitude(w), w);
        }
        assert_eq!(wrap_longitude(190.0), -170.0);
        assert_eq!(wrap_longitude(-190.0), 170.0);
        assert_eq!(wrap_longitude(180.0), -180.0);
    }

    #[test]
    fn azimuth_normalization() {
        assert_eq!(normalize_azimuth(-90.0), 270.0);
        assert_eq!(normalize_azimuth(720.0), 0.0);
        assert_eq!(normalize_azimuth(45.0), 45.0);
    }

    #[test]
    fn hemisphere_split() {
        assert_eq!(Hemisphere::of(-0.1), Hemisphere::West);
        assert_eq!(Hemisphere::of(0.0), Hemisphere::East);
        assert_eq!(Hemisphere::of(179.0), Hemisphere::East);
    }

    #[test]
    fn horizon_distance_grows_with_height() {
        assert_eq!(distance_to_horizon(0.0), 0.0);
        // ~5 km at 2 m eye height.
        assert_close(distance_to_horizon(2.0), 5_051.0, 10.0);
        assert!(distance_to_horizon(10_000.0) > distance_to_horizon(100.0));
    }

    #[test]
    fn geodetic_to_ecef_equator_prime_meridian() {
        let ecef = geodetic_to_ecef(0.0, 0.0, 0.0);
        assert_close(ecef.x, WGS84_A, 1e-6);
        assert_close(ecef.y, 0.0, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn geodetic_to_ecef_equator_90e() {
        let ecef = geodetic_to_ecef(0.0, 90.0, 0.0);
        assert_close(ecef.x, 0.0, 1e-6);
        assert_close(ecef.y, WGS84_A, 1e-6);
        assert_close(ecef.z, 0.0, 1e-6);
    }

    #[test]
    fn round_trip_geodetic_ecef() {
        let ecef = geodetic_to_ecef(30.0, -60.0, 120.0);
        let (lat, lon, alt) = ecef_to_geodetic(ecef);
        assert_close(lat, 30.0, 1e-7);
        assert_close(lon, -60.0, 1e-7);
        assert_close(alt, 120.0, 1e-4);
    }

    #[test]
    fn pole_altitude_uses_polar_radius() {
        let ecef = geodetic_to_ecef(90.0, 0.0, 50.0);
        let (lat, _lon, alt) = ecef_to_geodetic(Vec3::new(0.0, 0.0, ecef.z));
        assert_close(lat, 90.0, 1e-6);
        assert_close(alt, 50.0, 1e-4);
    }
}
