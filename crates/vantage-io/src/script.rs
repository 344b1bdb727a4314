use serde::{Deserialize, Serialize};
use vantage_controls::{
    Axis, Modifiers, MouseButton, PointerEvent, PointerEventKind, Space, TransformMode,
};
use vantage_geometry::{Deg, Quaternion, Rect, Rotation3, Vector3};
use vantage_scene::{Camera, Node};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlsKind {
    #[default]
    Camera,
    Transform,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub controls: ControlsKind,
    pub viewport: Rect,
    #[serde(default)]
    pub camera: CameraSetup,
    #[serde(default)]
    pub object: Option<ObjectSetup>,
    #[serde(default)]
    pub transform: TransformSetup,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProjectionSetup {
    Perspective {
        /// Vertical field of view in degrees.
        fov: f64,
        near: f64,
        far: f64,
    },
    Orthographic {
        /// Visible world height at zoom 1.
        height: f64,
        near: f64,
        far: f64,
    },
}

impl Default for ProjectionSetup {
    fn default() -> Self {
        Self::Perspective {
            fov: 50.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSetup {
    pub projection: ProjectionSetup,
    pub position: [f64; 3],
    pub target: [f64; 3],
    pub zoom: f64,
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            projection: ProjectionSetup::default(),
            position: [0.0, 0.0, 10.0],
            target: [0.0, 0.0, 0.0],
            zoom: 1.0,
        }
    }
}

impl CameraSetup {
    pub fn build(&self, aspect: f64) -> Camera {
        let mut camera = match self.projection {
            ProjectionSetup::Perspective { fov, near, far } => {
                Camera::perspective(fov, aspect, near, far)
            }
            ProjectionSetup::Orthographic { height, near, far } => {
                let half_h = height * 0.5;
                let half_w = half_h * aspect;
                Camera::orthographic(-half_w, half_w, half_h, -half_h, near, far)
            }
        };
        camera.zoom = self.zoom;
        camera.update_projection_matrix();
        camera.position = vector(self.position);
        camera.look_at(self.target());
        camera
    }

    pub fn target(&self) -> Vector3 {
        vector(self.target)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectSetup {
    pub name: String,
    pub position: [f64; 3],
    /// Euler angles in degrees, applied in X, Y, Z order.
    pub rotation: [f64; 3],
    pub scale: [f64; 3],
}

impl Default for ObjectSetup {
    fn default() -> Self {
        Self {
            name: "object".to_string(),
            position: [0.0; 3],
            rotation: [0.0; 3],
            scale: [1.0; 3],
        }
    }
}

impl ObjectSetup {
    pub fn to_node(&self) -> Node {
        let [x, y, z] = self.rotation;
        let quaternion: Quaternion = Quaternion::from_angle_x(Deg(x))
            * Quaternion::from_angle_y(Deg(y))
            * Quaternion::from_angle_z(Deg(z));
        Node::new(self.name.clone())
            .with_position(vector(self.position))
            .with_quaternion(quaternion)
            .with_scale(vector(self.scale))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformSetup {
    pub mode: TransformMode,
    pub space: Space,
    pub axis: Option<Axis>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Pointer {
        #[serde(default = "primary_pointer")]
        pointer_id: i32,
        kind: PointerEventKind,
        x: f64,
        y: f64,
        #[serde(default)]
        button: Option<MouseButton>,
        /// Pressed-buttons mask; a down step defaults it to its button.
        #[serde(default)]
        buttons: u32,
        #[serde(default)]
        modifiers: Modifiers,
    },
    KeyDown {
        code: String,
        #[serde(default)]
        repeat: bool,
    },
    KeyUp {
        code: String,
    },
    Wheel {
        delta_y: f64,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        y: f64,
    },
    Frame {
        #[serde(default = "frame_ms")]
        delta_ms: f64,
        #[serde(default = "one")]
        count: u32,
    },
}

impl Step {
    pub fn pointer_event(&self, viewport: Rect) -> Option<PointerEvent> {
        let Self::Pointer {
            pointer_id,
            kind,
            x,
            y,
            button,
            buttons,
            modifiers,
        } = self
        else {
            return None;
        };
        let buttons = match (kind, button) {
            (PointerEventKind::Down, Some(button)) if *buttons == 0 => button.mask(),
            _ => *buttons,
        };
        let mut event = PointerEvent::new(
            *pointer_id,
            *kind,
            viewport.left + x,
            viewport.top + y,
            viewport,
        )
        .with_modifiers(*modifiers);
        event.button = *button;
        event.buttons = buttons;
        Some(event)
    }
}

fn vector([x, y, z]: [f64; 3]) -> Vector3 {
    Vector3::new(x, y, z)
}

fn primary_pointer() -> i32 {
    1
}

fn frame_ms() -> f64 {
    1000.0 / 60.0
}

fn one() -> u32 {
    1
}
