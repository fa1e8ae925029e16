use foundation::GeoPoint;

/// Terrain elevation collaborator.
///
/// Returns meters above the WGS84 ellipsoid, or `None` where no data is
/// loaded. Implementations are queried synchronously from the render pump
/// and must not block on I/O.
pub trait ElevationSource: Send + Sync {
    fn elevation(&self, latitude: f64, longitude: f64) -> Option<f64>;
}

/// Screen-space hit testing against loaded surface or model meshes.
///
/// Providers are consulted before terrain and the idealized earth during
/// ray-cast inverse; the hit closest to the camera wins.
pub trait HitTestProvider: Send + Sync {
    fn hit_test(&self, x: f64, y: f64) -> Option<GeoPoint>;
}

/// Inverse (screen -> geodetic) strategy.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InverseMode {
    /// Pure affine solve through the inverse scene transform.
    Transform,
    /// Ray intersection against surface meshes, terrain, then the earth
    /// geometry model.
    RayCast,
}

/// Which layer resolved a ray-cast inverse, in decreasing fidelity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InverseSource {
    Transform,
    SurfaceMesh,
    TerrainMesh,
    GeometryModel,
}

/// Tuning flags for [`crate::SceneModel::inverse`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct InverseHints {
    pub ignore_surface_mesh: bool,
    pub ignore_terrain_mesh: bool,
    /// Clamp off-world results to the nearest point on the geometry model
    /// instead of failing.
    pub nearest_if_off_world: bool,
}

/// Collaborators available to a ray-cast inverse. All fields optional; an
/// empty context resolves against the earth geometry model only.
#[derive(Copy, Clone, Default)]
pub struct InverseContext<'a> {
    pub surfaces: &'a [&'a dyn HitTestProvider],
    pub elevation: Option<&'a dyn ElevationSource>,
}

/// Successful inverse resolution.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InverseResult {
    pub source: InverseSource,
    pub point: GeoPoint,
}
