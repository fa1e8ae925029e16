use super::vec::Vec3;

/// Half-line from `origin` along `dir`. `dir` need not be normalized.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }
}

/// Idealized intersection geometry, defined in the projected coordinate
/// space of the owning display model.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum GeometryModel {
    Plane { normal: Vec3, point: Vec3 },
    Sphere { center: Vec3, radius: f64 },
    Ellipsoid { center: Vec3, radius_x: f64, radius_y: f64, radius_z: f64 },
}

impl GeometryModel {
    /// WGS84 ellipsoid centered at the origin (ECEF meters; +Z through the
    /// north pole).
    pub fn wgs84() -> Self {
        Self::Ellipsoid {
            center: Vec3::default(),
            radius_x: super::geodesy::WGS84_A,
            radius_y: super::geodesy::WGS84_A,
            radius_z: super::geodesy::WGS84_B,
        }
    }

    /// Nearest forward intersection of `ray` with this geometry.
    pub fn intersect(&self, ray: &Ray) -> Option<Vec3> {
        let dir = ray.dir.normalized()?;
        match *self {
            Self::Plane { normal, point } => {
                let denom = normal.dot(dir);
                if denom.abs() < 1e-12 {
                    return None;
                }
                let t = normal.dot(point - ray.origin) / denom;
                if t < 0.0 {
                    return None;
                }
                Some(ray.origin + dir * t)
            }
            Self::Sphere { center, radius } => {
                quadratic_hit(ray.origin - center, dir, radius, radius, radius)
                    .map(|t| ray.origin + dir * t)
            }
            Self::Ellipsoid { center, radius_x, radius_y, radius_z } => {
                quadratic_hit(ray.origin - center, dir, radius_x, radius_y, radius_z)
                    .map(|t| ray.origin + dir * t)
            }
        }
    }

    /// The same geometry displaced outward by `alt` meters; for planes the
    /// surface shifts along the normal.
    pub fn inflated(&self, alt: f64) -> Self {
        match *self {
            Self::Plane { normal, point } => {
                let n = normal.normalized().unwrap_or(Vec3::new(0.0, 0.0, 1.0));
                Self::Plane { normal, point: point + n * alt }
            }
            Self::Sphere { center, radius } => Self::Sphere { center, radius: radius + alt },
            Self::Ellipsoid { center, radius_x, radius_y, radius_z } => Self::Ellipsoid {
                center,
                radius_x: radius_x + alt,
                radius_y: radius_y + alt,
                radius_z: radius_z + alt,
            },
        }
    }
}

/// Nearest non-negative root of the scaled unit-sphere intersection.
fn quadratic_hit(rel: Vec3, dir: Vec3, rx: f64, ry: f64, rz: f64) -> Option<f64> {
    if rx <= 0.0 || ry <= 0.0 || rz <= 0.0 {
        return None;
    }
    let o = Vec3::new(rel.x / rx, rel.y / ry, rel.z / rz);
    let d = Vec3::new(dir.x / rx, dir.y / ry, dir.z / rz);

    let a = d.dot(d);
    let b = 2.0 * o.dot(d);
    let c = o.dot(o) - 1.0;

    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || a == 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t0 = (-b - sq) / (2.0 * a);
    let t1 = (-b + sq) / (2.0 * a);
    if t0 >= 0.0 {
        Some(t0)
    } else if t1 >= 0.0 {
        Some(t1)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::{GeometryModel, Ray};
    use crate::math::Vec3;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn ray_hits_plane() {
        let plane = GeometryModel::Plane {
            normal: Vec3::new(0.0, 0.0, 1.0),
            point: Vec3::default(),
        };
        let ray = Ray::new(Vec3::new(2.0, 3.0, 10.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = plane.intersect(&ray).expect("hit");
        assert_eq!(hit, Vec3::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn parallel_ray_misses_plane() {
        let plane = GeometryModel::Plane {
            normal: Vec3::new(0.0, 0.0, 1.0),
            point: Vec3::default(),
        };
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(plane.intersect(&ray).is_none());
    }

    #[test]
    fn ray_hits_near_side_of_sphere() {
        let sphere = GeometryModel::Sphere {
            center: Vec3::default(),
            radius: 2.0,
        };
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let hit = sphere.intersect(&ray).expect("hit");
        assert_close(hit.x, 2.0, 1e-12);
    }

    #[test]
    fn ray_pointing_away_misses_sphere() {
        let sphere = GeometryModel::Sphere {
            center: Vec3::default(),
            radius: 2.0,
        };
        let ray = Ray::new(Vec3::new(10.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(sphere.intersect(&ray).is_none());
    }

    #[test]
    fn wgs84_nadir_intersection_from_orbit() {
        let earth = GeometryModel::wgs84();
        let ray = Ray::new(Vec3::new(10_000_000.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let hit = earth.intersect(&ray).expect("hit");
        assert_close(hit.x, crate::math::WGS84_A, 1e-6);
    }

    #[test]
    fn inflated_sphere_hits_at_altitude() {
        let sphere = GeometryModel::Sphere {
            center: Vec3::default(),
            radius: 100.0,
        };
        let ray = Ray::new(Vec3::new(200.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let hit = sphere.inflated(50.0).intersect(&ray).expect("hit");
        assert_close(hit.x, 150.0, 1e-12);
    }

    #[test]
    fn origin_inside_sphere_hits_far_side() {
        let sphere = GeometryModel::Sphere {
            center: Vec3::default(),
            radius: 5.0,
        };
        let ray = Ray::new(Vec3::default(), Vec3::new(0.0, 1.0, 0.0));
        let hit = sphere.intersect(&ray).expect("hit");
        assert_close(hit.y, 5.0, 1e-12);
    }
}
