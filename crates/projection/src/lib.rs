//! Map projections keyed by spatial reference id, plus the per-projection
//! display models used to relate projected units to nominal meters.

pub mod display;

pub use display::{DisplayModel, display_model_for};

use foundation::GeoPoint;
use foundation::math::{Vec3, ecef_to_geodetic, geodetic_to_ecef};

/// EPSG:4326, geodetic plate carrée (projected units are degrees).
pub const SRID_GEODETIC: i32 = 4326;
/// EPSG:3857, spherical web mercator (projected units are meters).
pub const SRID_WEB_MERCATOR: i32 = 3857;
/// EPSG:4978, earth-centered earth-fixed Cartesian (meters).
pub const SRID_ECEF: i32 = 4978;

const WEB_MERCATOR_R: f64 = 6_378_137.0;
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_6;

/// A point rejected by [`Projection::forward`]: non-finite, or outside the
/// projection's addressable geodetic domain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct InvalidCoordinate;

impl std::fmt::Display for InvalidCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "coordinate is invalid or outside the projection domain")
    }
}

impl std::error::Error for InvalidCoordinate {}

/// Stateless geodetic <-> projected-space mapping.
///
/// `forward` rejects invalid input; `inverse` always succeeds numerically
/// but may yield out-of-range latitude/longitude for points outside the
/// valid region. Callers validate the result rather than rely on an error.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Projection {
    Equirectangular,
    WebMercator,
    Ecef,
}

impl Projection {
    pub fn from_srid(srid: i32) -> Option<Self> {
        match srid {
            SRID_GEODETIC => Some(Self::Equirectangular),
            SRID_WEB_MERCATOR => Some(Self::WebMercator),
            SRID_ECEF => Some(Self::Ecef),
            _ => None,
        }
    }

    pub fn srid(self) -> i32 {
        match self {
            Self::Equirectangular => SRID_GEODETIC,
            Self::WebMercator => SRID_WEB_MERCATOR,
            Self::Ecef => SRID_ECEF,
        }
    }

    /// Globe projections require full 3-D ray intersection for inverse;
    /// flat projections admit a 2-D affine solve.
    pub fn is_3d(self) -> bool {
        matches!(self, Self::Ecef)
    }

    pub fn min_latitude(self) -> f64 {
        match self {
            Self::WebMercator => -WEB_MERCATOR_MAX_LAT,
            _ => -90.0,
        }
    }

    pub fn max_latitude(self) -> f64 {
        match self {
            Self::WebMercator => WEB_MERCATOR_MAX_LAT,
            _ => 90.0,
        }
    }

    pub fn min_longitude(self) -> f64 {
        -180.0
    }

    pub fn max_longitude(self) -> f64 {
        180.0
    }

    /// Geodetic to projected space.
    ///
    /// Longitudes beyond +/-180 are accepted when finite so that
    /// antimeridian-unwrapped points project continuously.
    pub fn forward(self, geo: &GeoPoint) -> Result<Vec3, InvalidCoordinate> {
        if !geo.latitude.is_finite()
            || !geo.longitude.is_finite()
            || geo.latitude < self.min_latitude()
            || geo.latitude > self.max_latitude()
        {
            return Err(InvalidCoordinate);
        }
        let alt = geo.altitude_or(0.0);
        if !alt.is_finite() {
            return Err(InvalidCoordinate);
        }

        Ok(match self {
            Self::Equirectangular => Vec3::new(geo.longitude, geo.latitude, alt),
            Self::WebMercator => {
                let lat = geo.latitude.to_radians();
                Vec3::new(
                    WEB_MERCATOR_R * geo.longitude.to_radians(),
                    WEB_MERCATOR_R * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
                    alt,
                )
            }
            Self::Ecef => geodetic_to_ecef(geo.latitude, geo.longitude, alt),
        })
    }

    /// Projected space to geodetic.
    pub fn inverse(self, p: Vec3) -> GeoPoint {
        match self {
            Self::Equirectangular => GeoPoint::with_altitude(p.y, p.x, p.z),
            Self::WebMercator => {
                let lat = 2.0 * (p.y / WEB_MERCATOR_R).exp().atan() - std::f64::consts::FRAC_PI_2;
                GeoPoint::with_altitude(
                    lat.to_degrees(),
                    (p.x / WEB_MERCATOR_R).to_degrees(),
                    p.z,
                )
            }
            Self::Ecef => {
                let (lat, lon, alt) = ecef_to_geodetic(p);
                GeoPoint::with_altitude(lat, lon, alt)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Projection, SRID_ECEF, SRID_GEODETIC, SRID_WEB_MERCATOR};
    use foundation::GeoPoint;
    use foundation::math::WGS84_A;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn srid_lookup_round_trips() {
        for srid in [SRID_GEODETIC, SRID_WEB_MERCATOR, SRID_ECEF] {
            let proj = Projection::from_srid(srid).expect("known srid");
            assert_eq!(proj.srid(), srid);
        }
        assert_eq!(Projection::from_srid(27700), None);
    }

    #[test]
    fn only_ecef_is_3d() {
        assert!(Projection::Ecef.is_3d());
        assert!(!Projection::Equirectangular.is_3d());
        assert!(!Projection::WebMercator.is_3d());
    }

    #[test]
    fn equirectangular_passes_degrees_through() {
        let p = Projection::Equirectangular
            .forward(&GeoPoint::with_altitude(35.0, -117.0, 250.0))
            .expect("in domain");
        assert_eq!((p.x, p.y, p.z), (-117.0, 35.0, 250.0));
        let geo = Projection::Equirectangular.inverse(p);
        assert_eq!(geo.latitude, 35.0);
        assert_eq!(geo.longitude, -117.0);
    }

    #[test]
    fn web_mercator_round_trip() {
        let proj = Projection::WebMercator;
        let src = GeoPoint::new(48.8566, 2.3522);
        let fwd = proj.forward(&src).expect("in domain");
        let geo = proj.inverse(fwd);
        assert_close(geo.latitude, src.latitude, 1e-9);
        assert_close(geo.longitude, src.longitude, 1e-9);
    }

    #[test]
    fn web_mercator_rejects_polar_latitudes() {
        assert!(Projection::WebMercator.forward(&GeoPoint::new(89.0, 0.0)).is_err());
        assert!(Projection::WebMercator.forward(&GeoPoint::new(85.0, 0.0)).is_ok());
    }

    #[test]
    fn ecef_round_trip() {
        let proj = Projection::Ecef;
        let src = GeoPoint::with_altitude(-33.9, 151.2, 30.0);
        let fwd = proj.forward(&src).expect("in domain");
        let geo = proj.inverse(fwd);
        assert_close(geo.latitude, src.latitude, 1e-7);
        assert_close(geo.longitude, src.longitude, 1e-7);
        assert_close(geo.altitude_or(0.0), 30.0, 1e-4);
    }

    #[test]
    fn ecef_equator_is_on_semi_major_axis() {
        let fwd = Projection::Ecef.forward(&GeoPoint::new(0.0, 0.0)).expect("in domain");
        assert_close(fwd.x, WGS84_A, 1e-6);
    }

    #[test]
    fn forward_rejects_nan() {
        for proj in [Projection::Equirectangular, Projection::WebMercator, Projection::Ecef] {
            assert!(proj.forward(&GeoPoint::new(f64::NAN, 0.0)).is_err());
            assert!(proj.forward(&GeoPoint::new(0.0, f64::NAN)).is_err());
            assert!(proj.forward(&GeoPoint::with_altitude(0.0, 0.0, f64::NAN)).is_err());
        }
    }

    #[test]
    fn forward_accepts_unwrapped_longitude() {
        // Continuous-scroll rendering projects points unwrapped past the
        // antimeridian.
        let p = Projection::Equirectangular
            .forward(&GeoPoint::new(0.0, 185.0))
            .expect("unwrapped accepted");
        assert_eq!(p.x, 185.0);
    }
}
