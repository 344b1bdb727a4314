use cgmath::{InnerSpace, One, SquareMatrix, VectorSpace};

use crate::{EPSILON, Matrix3, Matrix4, Quaternion, Vector3, try_normalize};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trs {
    pub position: Vector3,
    pub quaternion: Quaternion,
    pub scale: Vector3,
}

impl Default for Trs {
    fn default() -> Self {
        Self::identity()
    }
}

impl Trs {
    pub fn identity() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            quaternion: Quaternion::one(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn new(position: Vector3, quaternion: Quaternion, scale: Vector3) -> Self {
        Self {
            position,
            quaternion,
            scale,
        }
    }

    pub fn to_matrix(&self) -> Matrix4 {
        compose(self.position, self.quaternion, self.scale)
    }

    pub fn from_matrix(matrix: &Matrix4) -> Self {
        let position = matrix.w.truncate();
        let col_x = matrix.x.truncate();
        let col_y = matrix.y.truncate();
        let col_z = matrix.z.truncate();

        let mut sx = col_x.magnitude();
        let sy = col_y.magnitude();
        let sz = col_z.magnitude();
        if matrix.determinant() < 0.0 {
            sx = -sx;
        }

        let inv = |s: f64| if s.abs() <= EPSILON { 1.0 } else { 1.0 / s };
        let rotation = Matrix3::from_cols(col_x * inv(sx), col_y * inv(sy), col_z * inv(sz));
        let quaternion = Quaternion::from(rotation).normalize();

        Self {
            position,
            quaternion,
            scale: Vector3::new(sx, sy, sz),
        }
    }
}

pub fn compose(position: Vector3, quaternion: Quaternion, scale: Vector3) -> Matrix4 {
    Matrix4::from_translation(position)
        * Matrix4::from(quaternion)
        * Matrix4::from_nonuniform_scale(scale.x, scale.y, scale.z)
}

pub fn transform_point(matrix: &Matrix4, point: Vector3) -> Vector3 {
    let out = *matrix * point.extend(1.0);
    if out.w.abs() > EPSILON && (out.w - 1.0).abs() > EPSILON {
        out.truncate() / out.w
    } else {
        out.truncate()
    }
}

pub fn rotate_around_axis(point: Vector3, origin: Vector3, axis: Vector3, angle: f64) -> Vector3 {
    let Some(axis) = try_normalize(axis) else {
        return point;
    };
    let v = point - origin;
    let cos = angle.cos();
    let sin = angle.sin();
    let rotated = v * cos + axis.cross(v) * sin + axis * (axis.dot(v)) * (1.0 - cos);
    origin + rotated
}

pub fn look_rotation(eye: Vector3, target: Vector3, up: Vector3) -> Quaternion {
    let mut z = eye - target;
    if z.magnitude2() <= EPSILON {
        z.z = 1.0;
    }
    z = z.normalize();

    let mut x = up.cross(z);
    if x.magnitude2() <= EPSILON {
        if (up.z.abs() - 1.0).abs() <= EPSILON {
            z.x += 1.0e-4;
        } else {
            z.z += 1.0e-4;
        }
        z = z.normalize();
        x = up.cross(z);
    }
    let x = try_normalize(x).unwrap_or_else(Vector3::unit_x);
    let y = z.cross(x);
    Quaternion::from(Matrix3::from_cols(x, y, z)).normalize()
}

/// Framerate-independent exponential approach of `source` towards `target`.
///
/// `smoothing` is the fraction left after one second; `dt` is in seconds.
pub fn damp_to(source: f64, target: f64, smoothing: f64, dt: f64) -> f64 {
    let t = 1.0 - smoothing.powf(dt);
    source * (1.0 - t) + target * t
}

pub fn damp_vector<V>(source: V, target: V, smoothing: f64, dt: f64) -> V
where
    V: VectorSpace<Scalar = f64>,
{
    let t = 1.0 - smoothing.powf(dt);
    source.lerp(target, t)
}
