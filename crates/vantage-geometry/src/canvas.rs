use serde::{Deserialize, Serialize};

use crate::Vector2;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub const fn from_size(width: f64, height: f64) -> Self {
        Self::new(0.0, 0.0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn to_canvas(&self, client_x: f64, client_y: f64) -> Vector2 {
        Vector2::new(client_x - self.left, client_y - self.top)
    }

    pub fn canvas_to_view(&self, canvas: Vector2) -> Vector2 {
        if self.is_empty() {
            return Vector2::new(0.0, 0.0);
        }
        Vector2::new(
            canvas.x / self.width * 2.0 - 1.0,
            -(canvas.y / self.height) * 2.0 + 1.0,
        )
    }

    pub fn aspect(&self) -> f64 {
        if self.height <= 0.0 {
            1.0
        } else {
            self.width / self.height
        }
    }
}
