use cgmath::InnerSpace;

use crate::{Aabb, EPSILON, Plane, Vector3, rotate_around_axis, try_normalize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    /// Builds a ray; the direction is normalised (a zero direction becomes `-Z`).
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self {
            origin,
            direction: try_normalize(direction).unwrap_or(-Vector3::unit_z()),
        }
    }

    pub fn at(&self, t: f64) -> Vector3 {
        self.origin + self.direction * t
    }

    /// Ray parameter of the plane hit, `None` when parallel or behind the origin.
    pub fn distance_to_plane(&self, plane: &Plane) -> Option<f64> {
        let denom = plane.normal.dot(self.direction);
        if denom.abs() <= EPSILON {
            if plane.distance_to_point(self.origin).abs() <= EPSILON {
                return Some(0.0);
            }
            return None;
        }
        let t = -(self.origin.dot(plane.normal) + plane.constant) / denom;
        if t >= 0.0 && t.is_finite() {
            Some(t)
        } else {
            None
        }
    }

    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vector3> {
        self.distance_to_plane(plane).map(|t| self.at(t))
    }

    /// Signed angle (radians) between the ray and the plane; positive when the
    /// ray points along the plane normal.
    pub fn angle_to_plane(&self, plane: &Plane) -> f64 {
        self.direction.dot(plane.normal).clamp(-1.0, 1.0).asin()
    }

    pub fn rotated_about(&self, pivot: Vector3, axis: Vector3, angle: f64) -> Self {
        Self {
            origin: rotate_around_axis(self.origin, pivot, axis, angle),
            direction: rotate_around_axis(self.direction, Vector3::new(0.0, 0.0, 0.0), axis, angle),
        }
    }

    pub fn intersect_aabb(&self, aabb: &Aabb) -> Option<f64> {
        if aabb.is_empty() {
            return None;
        }
        let mut t_min = 0.0_f64;
        let mut t_max = f64::INFINITY;
        let origin = [self.origin.x, self.origin.y, self.origin.z];
        let dir = [self.direction.x, self.direction.y, self.direction.z];
        let min = [aabb.min.x, aabb.min.y, aabb.min.z];
        let max = [aabb.max.x, aabb.max.y, aabb.max.z];
        for axis in 0..3 {
            if dir[axis].abs() <= EPSILON {
                if origin[axis] < min[axis] || origin[axis] > max[axis] {
                    return None;
                }
                continue;
            }
            let inv = 1.0 / dir[axis];
            let mut t0 = (min[axis] - origin[axis]) * inv;
            let mut t1 = (max[axis] - origin[axis]) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }
        Some(t_min)
    }

    pub fn intersect_triangle(&self, a: Vector3, b: Vector3, c: Vector3) -> Option<f64> {
        let eps = 1.0e-9;
        let edge1 = b - a;
        let edge2 = c - a;
        let pvec = self.direction.cross(edge2);
        let det = edge1.dot(pvec);
        if det.abs() < eps {
            return None;
        }
        let inv_det = 1.0 / det;
        let tvec = self.origin - a;
        let u = tvec.dot(pvec) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let qvec = tvec.cross(edge1);
        let v = self.direction.dot(qvec) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = edge2.dot(qvec) * inv_det;
        if t > eps { Some(t) } else { None }
    }

    /// `(distance, ray_t)` of the closest approach to the segment `a..b`.
    pub fn closest_to_segment(&self, a: Vector3, b: Vector3) -> (f64, f64) {
        let d1 = self.direction;
        let d2 = b - a;
        let r = self.origin - a;
        let len2 = d2.dot(d2);
        if len2 <= EPSILON {
            let t = (a - self.origin).dot(d1).max(0.0);
            return ((self.at(t) - a).magnitude(), t);
        }

        let c = d1.dot(r);
        let f = d2.dot(r);
        let bd = d1.dot(d2);
        let denom = len2 - bd * bd;
        let mut s = if denom.abs() > EPSILON {
            ((bd * f - c * len2) / denom).max(0.0)
        } else {
            0.0
        };
        let mut u = (bd * s + f) / len2;
        if u < 0.0 {
            u = 0.0;
            s = (-c).max(0.0);
        } else if u > 1.0 {
            u = 1.0;
            s = (bd - c).max(0.0);
        }
        let on_ray = self.at(s);
        let on_segment = a + d2 * u;
        ((on_ray - on_segment).magnitude(), s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_hit_in_front() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -2.0));
        let plane = Plane::from_normal_and_coplanar_point(Vector3::unit_z(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(ray.intersect_plane(&plane), Some(Vector3::new(0.0, 0.0, 0.0)));
        let away = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::unit_z());
        assert_eq!(away.intersect_plane(&plane), None);
    }

    #[test]
    fn parallel_ray_misses_plane() {
        let ray = Ray::new(Vector3::new(0.0, 0.0, 1.0), Vector3::unit_x());
        let plane = Plane::from_normal_and_coplanar_point(Vector3::unit_z(), Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(ray.intersect_plane(&plane), None);
        assert!(ray.angle_to_plane(&plane).abs() < 1.0e-12);
    }

    #[test]
    fn aabb_slab_test() {
        let aabb = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let hit = Ray::new(Vector3::new(0.0, 0.0, 10.0), -Vector3::unit_z());
        assert_eq!(hit.intersect_aabb(&aabb), Some(9.0));
        let miss = Ray::new(Vector3::new(3.0, 0.0, 10.0), -Vector3::unit_z());
        assert_eq!(miss.intersect_aabb(&aabb), None);
    }

    #[test]
    fn segment_distance() {
        let ray = Ray::new(Vector3::new(0.0, 1.0, 5.0), -Vector3::unit_z());
        let (dist, t) = ray.closest_to_segment(Vector3::new(-1.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!((dist - 1.0).abs() < 1.0e-12);
        assert!((t - 5.0).abs() < 1.0e-12);
    }

    #[test]
    fn triangle_hit() {
        let ray = Ray::new(Vector3::new(0.2, 0.2, 1.0), -Vector3::unit_z());
        let t = ray.intersect_triangle(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert_eq!(t, Some(1.0));
    }
}
