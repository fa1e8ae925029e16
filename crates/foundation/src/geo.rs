use crate::math::wrap_longitude;

/// Reference surface for an altitude value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum AltitudeReference {
    /// Height above the WGS84 ellipsoid.
    #[default]
    Ellipsoid,
    /// Height above the local terrain surface.
    AboveGround,
}

/// Geodetic coordinate in degrees and meters.
///
/// Latitude is valid in [-90, 90]; longitude in [-180, 180]. Callers may
/// hold unwrapped longitudes transiently; [`GeoPoint::normalized`] wraps
/// back into range. An invalid point (non-finite or out of range) must
/// short-circuit every projection and camera operation that receives it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: Option<f64>,
    pub altitude_reference: AltitudeReference,
    /// 90% circular (horizontal) error estimate, meters.
    pub ce90: Option<f64>,
    /// 90% linear (vertical) error estimate, meters.
    pub le90: Option<f64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            altitude_reference: AltitudeReference::Ellipsoid,
            ce90: None,
            le90: None,
        }
    }

    pub fn with_altitude(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            altitude: Some(altitude),
            ..Self::new(latitude, longitude)
        }
    }

    pub fn with_altitude_reference(
        latitude: f64,
        longitude: f64,
        altitude: f64,
        reference: AltitudeReference,
    ) -> Self {
        Self {
            altitude: Some(altitude),
            altitude_reference: reference,
            ..Self::new(latitude, longitude)
        }
    }

    /// Altitude, or `fallback` when unset.
    pub fn altitude_or(&self, fallback: f64) -> f64 {
        self.altitude.unwrap_or(fallback)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
            && self.altitude.map(f64::is_finite).unwrap_or(true)
    }

    /// Same point with longitude wrapped into [-180, 180).
    pub fn normalized(&self) -> Self {
        Self {
            longitude: wrap_longitude(self.longitude),
            ..*self
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AltitudeReference, GeoPoint};

    #[test]
    fn validity_bounds() {
        assert!(GeoPoint::new(45.0, -122.0).is_valid());
        assert!(GeoPoint::new(90.0, 180.0).is_valid());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
        assert!(!GeoPoint::with_altitude(0.0, 0.0, f64::NAN).is_valid());
    }

    #[test]
    fn normalized_wraps_longitude() {
        let p = GeoPoint::new(10.0, 190.0).normalized();
        assert_eq!(p.longitude, -170.0);
        assert_eq!(p.latitude, 10.0);
        assert!(p.is_valid());
    }

    #[test]
    fn altitude_reference_defaults_to_ellipsoid() {
        let p = GeoPoint::with_altitude(0.0, 0.0, 100.0);
        assert_eq!(p.altitude_reference, AltitudeReference::Ellipsoid);
        assert_eq!(p.altitude_or(0.0), 100.0);
        assert_eq!(GeoPoint::new(0.0, 0.0).altitude_or(5.0), 5.0);
    }
}
