use serde::{Deserialize, Serialize};
use vantage_base::Guid;
use vantage_geometry::{
    InnerSpace, Matrix4, One, Quaternion, Ray, SquareMatrix, Vector2, Vector3, compose, frustum,
    look_rotation, ortho, transform_point,
};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in degrees.
        fov: f64,
        aspect: f64,
        near: f64,
        far: f64,
    },
    Orthographic {
        left: f64,
        right: f64,
        top: f64,
        bottom: f64,
        near: f64,
        far: f64,
    },
}

#[derive(Clone, Debug)]
pub struct Camera {
    id: Guid,
    pub position: Vector3,
    pub quaternion: Quaternion,
    pub up: Vector3,
    pub zoom: f64,
    pub projection: Projection,
    projection_matrix: Matrix4,
    projection_matrix_inverse: Matrix4,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            id: Guid::new(),
            position: Vector3::new(0.0, 0.0, 0.0),
            quaternion: Quaternion::one(),
            up: Vector3::unit_y(),
            zoom: 1.0,
            projection,
            projection_matrix: Matrix4::identity(),
            projection_matrix_inverse: Matrix4::identity(),
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn perspective(fov: f64, aspect: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Perspective {
            fov,
            aspect,
            near,
            far,
        })
    }

    pub fn orthographic(left: f64, right: f64, top: f64, bottom: f64, near: f64, far: f64) -> Self {
        Self::new(Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
        })
    }

    pub fn id(&self) -> Guid {
        self.id
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self.projection, Projection::Perspective { .. })
    }

    pub fn is_orthographic(&self) -> bool {
        matches!(self.projection, Projection::Orthographic { .. })
    }

    pub fn look_at(&mut self, target: Vector3) {
        self.quaternion = look_rotation(self.position, target, self.up);
    }

    pub fn matrix_world(&self) -> Matrix4 {
        compose(self.position, self.quaternion, Vector3::new(1.0, 1.0, 1.0))
    }

    pub fn view_direction(&self) -> Vector3 {
        (self.quaternion * -Vector3::unit_z()).normalize()
    }

    pub fn projection_matrix(&self) -> Matrix4 {
        self.projection_matrix
    }

    pub fn update_projection_matrix(&mut self) {
        let zoom = if self.zoom.abs() > 0.0 { self.zoom } else { 1.0 };
        self.projection_matrix = match self.projection {
            Projection::Perspective {
                fov,
                aspect,
                near,
                far,
            } => {
                let top = near * (fov.to_radians() * 0.5).tan() / zoom;
                let height = 2.0 * top;
                let width = aspect * height;
                let left = -0.5 * width;
                frustum(left, left + width, top - height, top, near, far)
            }
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => {
                let dx = (right - left) / (2.0 * zoom);
                let dy = (top - bottom) / (2.0 * zoom);
                let cx = (right + left) * 0.5;
                let cy = (top + bottom) * 0.5;
                ortho(cx - dx, cx + dx, cy - dy, cy + dy, near, far)
            }
        };
        self.projection_matrix_inverse = self
            .projection_matrix
            .invert()
            .unwrap_or_else(Matrix4::identity);
    }

    pub fn unproject(&self, ndc: Vector3) -> Vector3 {
        let view = transform_point(&self.projection_matrix_inverse, ndc);
        transform_point(&self.matrix_world(), view)
    }

    pub fn project(&self, world: Vector3) -> Vector3 {
        let view_matrix = self.matrix_world().invert().unwrap_or_else(Matrix4::identity);
        let view = transform_point(&view_matrix, world);
        transform_point(&self.projection_matrix, view)
    }

    pub fn ray_from_view(&self, view: Vector2) -> Ray {
        if self.is_orthographic() {
            let origin = self.unproject(Vector3::new(view.x, view.y, -1.0));
            Ray::new(origin, self.view_direction())
        } else {
            let through = self.unproject(Vector3::new(view.x, view.y, 0.5));
            Ray::new(self.position, through - self.position)
        }
    }

    pub fn view_height_at(&self, distance: f64) -> f64 {
        let zoom = if self.zoom.abs() > 0.0 { self.zoom } else { 1.0 };
        match self.projection {
            Projection::Perspective { fov, .. } => {
                2.0 * distance.abs() * (fov.to_radians() * 0.5).tan() / zoom
            }
            Projection::Orthographic { top, bottom, .. } => (top - bottom).abs() / zoom,
        }
    }
}
