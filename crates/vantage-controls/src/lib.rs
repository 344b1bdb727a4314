pub mod animation;
pub mod axis;
pub mod camera;
pub mod config;
pub mod events;
pub mod gesture;
pub mod input;
pub mod picker;
pub mod pointer;
pub mod selection;
pub mod transform;

pub use animation::{AnimationKey, AnimationScheduler, FrameTime, SharedScheduler};
pub use axis::{Axis, Component, Space, TransformMode};
pub use camera::{CameraAction, CameraControls, CameraVelocity};
pub use config::{CameraConfig, ControlsConfig, GestureConfig, TransformConfig};
pub use events::{ControlsEvent, EventQueue};
pub use gesture::{GestureCore, Stage, Tracked, TrackedControls};
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent, PointerEventKind, WheelEvent};
pub use picker::GizmoFrame;
pub use pointer::{CenterPointerTracker, PointerTracker, PointerType, Track, TrackedPointer};
pub use selection::{Pivot, SelectionControls, SelectionMode};
pub use transform::{DragSession, TransformControls};
