mod aabb;
mod canvas;
mod plane;
mod ray;
mod transform;

pub use aabb::Aabb;
pub use canvas::Rect;
pub use cgmath::{
    Deg, ElementWise, InnerSpace, One, Rad, Rotation3, SquareMatrix, VectorSpace, Zero, frustum,
    ortho,
};
pub use plane::Plane;
pub use ray::Ray;
pub use transform::{
    Trs, compose, damp_to, damp_vector, look_rotation, rotate_around_axis, transform_point,
};

pub type Vector2 = cgmath::Vector2<f64>;
pub type Vector3 = cgmath::Vector3<f64>;
pub type Quaternion = cgmath::Quaternion<f64>;
pub type Matrix3 = cgmath::Matrix3<f64>;
pub type Matrix4 = cgmath::Matrix4<f64>;

pub const EPSILON: f64 = vantage_base::Tolerance::DEFAULT.linear;

pub fn try_normalize(v: Vector3) -> Option<Vector3> {
    let len = v.magnitude();
    if len <= EPSILON || !len.is_finite() {
        None
    } else {
        Some(v / len)
    }
}
