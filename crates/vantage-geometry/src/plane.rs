use cgmath::InnerSpace;

use crate::{Vector3, try_normalize};

/// Plane `normal . p + constant = 0` with a unit normal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub constant: f64,
}

impl Plane {
    pub fn new(normal: Vector3, constant: f64) -> Self {
        Self { normal, constant }
    }

    pub fn from_normal_and_coplanar_point(normal: Vector3, point: Vector3) -> Self {
        let normal = try_normalize(normal).unwrap_or_else(Vector3::unit_z);
        Self {
            normal,
            constant: -point.dot(normal),
        }
    }

    pub fn distance_to_point(&self, point: Vector3) -> f64 {
        self.normal.dot(point) + self.constant
    }

    pub fn project_point(&self, point: Vector3) -> Vector3 {
        point - self.normal * self.distance_to_point(point)
    }

    pub fn coplanar_point(&self) -> Vector3 {
        self.normal * -self.constant
    }
}
