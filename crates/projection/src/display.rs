use foundation::math::{GeometryModel, Vec3, WGS84_A, WGS84_B};

use crate::Projection;

const PI: f64 = std::f64::consts::PI;

/// Per-projection scale constants relating projected-space units to nominal
/// meters on each axis, plus the reference earth geometry used for inverse
/// ray casts when no surface or terrain hit is available.
///
/// Looked up by projection; the registry is a fixed set of statics, safe to
/// share across threads.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DisplayModel {
    pub srid: i32,
    pub projection_x_to_nominal_meters: f64,
    pub projection_y_to_nominal_meters: f64,
    pub projection_z_to_nominal_meters: f64,
    pub earth: GeometryModel,
}

impl DisplayModel {
    /// Projected-space point scaled to nominal meters.
    pub fn to_nominal_meters(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x * self.projection_x_to_nominal_meters,
            p.y * self.projection_y_to_nominal_meters,
            p.z * self.projection_z_to_nominal_meters,
        )
    }

    /// Nominal-meter point scaled back to projected units.
    pub fn from_nominal_meters(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x / self.projection_x_to_nominal_meters,
            p.y / self.projection_y_to_nominal_meters,
            p.z / self.projection_z_to_nominal_meters,
        )
    }
}

// Degrees of longitude/latitude to meters along the equator/meridian.
const GEODETIC_X_TO_METERS: f64 = 2.0 * WGS84_A * PI / 360.0;
const GEODETIC_Y_TO_METERS: f64 = WGS84_B * PI / 180.0;

static GEODETIC: DisplayModel = DisplayModel {
    srid: crate::SRID_GEODETIC,
    projection_x_to_nominal_meters: GEODETIC_X_TO_METERS,
    projection_y_to_nominal_meters: GEODETIC_Y_TO_METERS,
    projection_z_to_nominal_meters: 1.0,
    earth: GeometryModel::Plane {
        normal: Vec3 { x: 0.0, y: 0.0, z: 1.0 },
        point: Vec3 { x: 0.0, y: 0.0, z: 0.0 },
    },
};

static WEB_MERCATOR: DisplayModel = DisplayModel {
    srid: crate::SRID_WEB_MERCATOR,
    projection_x_to_nominal_meters: 1.0,
    projection_y_to_nominal_meters: 1.0,
    projection_z_to_nominal_meters: 1.0,
    earth: GeometryModel::Plane {
        normal: Vec3 { x: 0.0, y: 0.0, z: 1.0 },
        point: Vec3 { x: 0.0, y: 0.0, z: 0.0 },
    },
};

static ECEF: DisplayModel = DisplayModel {
    srid: crate::SRID_ECEF,
    projection_x_to_nominal_meters: 1.0,
    projection_y_to_nominal_meters: 1.0,
    projection_z_to_nominal_meters: 1.0,
    // +Z extends through the north pole.
    earth: GeometryModel::Ellipsoid {
        center: Vec3 { x: 0.0, y: 0.0, z: 0.0 },
        radius_x: WGS84_A,
        radius_y: WGS84_A,
        radius_z: WGS84_B,
    },
};

/// Display model for a projection.
pub fn display_model_for(projection: Projection) -> &'static DisplayModel {
    match projection {
        Projection::Equirectangular => &GEODETIC,
        Projection::WebMercator => &WEB_MERCATOR,
        Projection::Ecef => &ECEF,
    }
}
