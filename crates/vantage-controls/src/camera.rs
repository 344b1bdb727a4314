use tracing::{debug, warn};
use vantage_base::Guid;
use vantage_geometry::{
    EPSILON, InnerSpace, Quaternion, Rad, Rotation3, Vector2, Vector3, damp_to, damp_vector,
    try_normalize,
};
use vantage_scene::Camera;

use crate::animation::{AnimationKey, FrameTime, SharedScheduler};
use crate::config::{CameraConfig, ControlsConfig};
use crate::events::{ControlsEvent, EventQueue};
use crate::gesture::{GestureCore, Stage, TrackedControls};
use crate::input::{MouseButton, WheelEvent};
use crate::pointer::{CenterPointerTracker, PointerTracker};

const DAMPING: &str = "camera-damping";
const MIN_DOLLY_FACTOR: f64 = 1.0e-3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraAction {
    Rotate,
    Dolly,
    Pan,
    DollyPan,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraVelocity {
    pub rotate: Vector2,
    pub dolly: f64,
    pub pan: Vector2,
}

impl CameraVelocity {
    pub fn zero() -> Self {
        Self {
            rotate: Vector2::new(0.0, 0.0),
            dolly: 0.0,
            pan: Vector2::new(0.0, 0.0),
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.rotate
            .magnitude()
            .max(self.dolly.abs())
            .max(self.pan.magnitude())
    }
}

struct CameraBasis {
    right: Vector3,
    up: Vector3,
}

impl CameraBasis {
    fn of(camera: &Camera) -> Self {
        Self {
            right: camera.quaternion * Vector3::unit_x(),
            up: camera.quaternion * Vector3::unit_y(),
        }
    }
}

pub struct CameraControls {
    gesture: GestureCore,
    config: CameraConfig,
    events: EventQueue,
    camera_id: Guid,
    target: Vector3,
    key_action: Option<CameraAction>,
    action: Option<CameraAction>,
    velocity: CameraVelocity,
    dragging: bool,
    coasting: bool,
}

impl CameraControls {
    pub fn new(camera: &Camera, scheduler: SharedScheduler, config: &ControlsConfig) -> Self {
        Self {
            gesture: GestureCore::new(scheduler, config.gesture),
            config: config.camera.clone(),
            events: EventQueue::new(),
            camera_id: camera.id(),
            target: Vector3::new(0.0, 0.0, 0.0),
            key_action: None,
            action: None,
            velocity: CameraVelocity::zero(),
            dragging: false,
            coasting: false,
        }
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn target(&self) -> Vector3 {
        self.target
    }

    pub fn set_target(&mut self, target: Vector3, camera: &mut Camera) {
        self.target = target;
        camera.look_at(target);
        self.events.property_changed("target");
    }

    pub fn camera_id(&self) -> Guid {
        self.camera_id
    }

    pub fn attach(&mut self, camera: &Camera) {
        if camera.id() == self.camera_id {
            return;
        }
        self.cancel_gesture();
        self.camera_id = camera.id();
        self.events.property_changed("camera");
    }

    pub fn enabled(&self) -> bool {
        self.gesture.enabled()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.cancel_gesture();
        }
        if self.gesture.set_enabled(enabled) {
            self.key_action = None;
            self.events.property_changed("enabled");
        }
    }

    pub fn dispose(&mut self) {
        self.set_enabled(false);
        self.events.emit(ControlsEvent::Dispose);
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn is_coasting(&self) -> bool {
        self.coasting
    }

    pub fn action(&self) -> Option<CameraAction> {
        self.action
    }

    pub fn key_action(&self) -> Option<CameraAction> {
        self.key_action
    }

    pub fn velocity(&self) -> CameraVelocity {
        self.velocity
    }

    pub fn needs_animation(&self) -> bool {
        self.coasting || self.gesture.is_animating()
    }

    pub fn take_events(&mut self) -> Vec<ControlsEvent> {
        self.events.take()
    }

    fn damping_key(&self) -> AnimationKey {
        AnimationKey::new(self.gesture.owner(), DAMPING)
    }

    fn action_for_key(&self, code: &str) -> Option<CameraAction> {
        if code == self.config.rotate_key {
            Some(CameraAction::Rotate)
        } else if code == self.config.zoom_key {
            Some(CameraAction::Dolly)
        } else if code == self.config.pan_key {
            Some(CameraAction::Pan)
        } else {
            None
        }
    }

    fn stop_coasting(&mut self) {
        self.coasting = false;
        self.velocity = CameraVelocity::zero();
        let key = self.damping_key();
        self.gesture.scheduler().borrow_mut().cancel(key);
    }

    fn cancel_gesture(&mut self) {
        if !(self.dragging || self.coasting) {
            return;
        }
        self.dragging = false;
        self.action = None;
        self.stop_coasting();
        self.events.emit(ControlsEvent::End);
    }

    pub fn rotate(&mut self, camera: &mut Camera, delta: Vector2) -> bool {
        let angle = delta.magnitude() * self.config.rotate_speed;
        if angle <= EPSILON {
            return false;
        }
        let eye = camera.position - self.target;
        let Some(eye_dir) = try_normalize(eye) else {
            return false;
        };
        let Some(up) = try_normalize(camera.up) else {
            return false;
        };
        let Some(side) = try_normalize(up.cross(eye_dir)) else {
            return false;
        };
        let move_dir = up * delta.y + side * delta.x;
        let Some(axis) = try_normalize(move_dir.cross(eye)) else {
            return false;
        };

        let rotation = Quaternion::from_axis_angle(axis, Rad(angle));
        camera.position = self.target + rotation * eye;
        camera.up = rotation * camera.up;
        camera.look_at(self.target);
        true
    }

    /// Dolly by `amount` (scaled by `zoom_speed`); positive moves closer.
    pub fn dolly(&mut self, camera: &mut Camera, amount: f64) -> bool {
        self.dolly_by(camera, amount * self.config.zoom_speed)
    }

    fn dolly_by(&mut self, camera: &mut Camera, magnitude: f64) -> bool {
        let factor = (1.0 - magnitude).max(MIN_DOLLY_FACTOR);
        if (factor - 1.0).abs() <= EPSILON {
            return false;
        }
        if camera.is_orthographic() {
            camera.zoom /= factor;
            camera.update_projection_matrix();
            return true;
        }
        let eye = camera.position - self.target;
        let Some(eye_dir) = try_normalize(eye) else {
            return false;
        };
        let distance =
            (eye.magnitude() * factor).clamp(self.config.min_distance, self.config.max_distance);
        camera.position = self.target + eye_dir * distance;
        true
    }

    pub fn pan(&mut self, camera: &mut Camera, delta: Vector2) -> bool {
        if delta.magnitude() <= EPSILON {
            return false;
        }
        let basis = CameraBasis::of(camera);
        let scale = if camera.is_orthographic() {
            camera.view_height_at(0.0) * 0.5
        } else {
            (camera.position - self.target).magnitude()
        } * self.config.pan_speed;
        let offset = (basis.right * delta.x + basis.up * delta.y) * scale;
        camera.position -= offset;
        self.target -= offset;
        true
    }

    pub fn wheel(&mut self, event: &WheelEvent, camera: &mut Camera) {
        if !self.enabled() || event.delta_y == 0.0 {
            return;
        }
        if camera.id() != self.camera_id {
            self.attach(camera);
        }
        self.events.emit(ControlsEvent::Start);
        if self.dolly_by(camera, -event.delta_y * self.config.wheel_speed) {
            self.events.request_change();
        }
        self.events.emit(ControlsEvent::End);
    }

    pub fn animate(&mut self, frame: FrameTime, stage: &mut Stage<'_>) {
        let tracked = self.gesture.animate(frame);
        self.dispatch(tracked, stage);
        if !self.coasting {
            return;
        }
        if stage.camera.id() != self.camera_id {
            warn!("camera replaced while coasting, stopping");
            self.cancel_gesture();
            return;
        }

        let dt = frame.delta_seconds();
        let smoothing = self.config.damping_factor;
        let zero = Vector2::new(0.0, 0.0);
        self.velocity.rotate = damp_vector(self.velocity.rotate, zero, smoothing, dt);
        self.velocity.dolly = damp_to(self.velocity.dolly, 0.0, smoothing, dt);
        self.velocity.pan = damp_vector(self.velocity.pan, zero, smoothing, dt);

        let frames = frame.delta_ms * 60.0 / 1000.0;
        let velocity = self.velocity;
        let mut changed = self.rotate(stage.camera, velocity.rotate * frames);
        changed |= self.dolly(stage.camera, velocity.dolly * frames);
        changed |= self.pan(stage.camera, velocity.pan * frames);
        if changed {
            self.events.request_change();
        }

        if self.velocity.magnitude() <= self.config.rest_epsilon {
            debug!("camera came to rest");
            self.stop_coasting();
            self.events.emit(ControlsEvent::End);
        }
    }

    fn action_for(&self, pointer: &PointerTracker, pointers: &[PointerTracker]) -> CameraAction {
        if pointers.len() >= 2 {
            return CameraAction::DollyPan;
        }
        if let Some(action) = self.key_action {
            return action;
        }
        match pointer.button() {
            Some(MouseButton::Middle) => CameraAction::Dolly,
            Some(MouseButton::Secondary) => CameraAction::Pan,
            Some(MouseButton::Primary) | None => CameraAction::Rotate,
        }
    }
}

fn pinch(pointers: &[PointerTracker], center: &CenterPointerTracker) -> f64 {
    if pointers.len() < 2 {
        return 0.0;
    }
    let center = center.view();
    let spread = |current: bool| {
        pointers
            .iter()
            .map(|pointer| {
                let view = pointer.view();
                if current {
                    (view.current - center.current).magnitude()
                } else {
                    (view.previous - center.previous).magnitude()
                }
            })
            .sum::<f64>()
            / pointers.len() as f64
    };
    spread(true) - spread(false)
}

impl TrackedControls for CameraControls {
    fn gesture(&self) -> &GestureCore {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut GestureCore {
        &mut self.gesture
    }

    fn on_tracked_pointer_down(
        &mut self,
        _pointer: &PointerTracker,
        pointers: &[PointerTracker],
        stage: &mut Stage<'_>,
    ) {
        if self.coasting {
            self.stop_coasting();
            self.events.emit(ControlsEvent::End);
        }
        self.velocity = CameraVelocity::zero();
        if stage.camera.id() != self.camera_id {
            self.attach(stage.camera);
        }
        if pointers.len() == 1 && !self.dragging {
            self.dragging = true;
            self.events.emit(ControlsEvent::Start);
        }
    }

    fn on_tracked_pointer_move(
        &mut self,
        pointer: &PointerTracker,
        pointers: &[PointerTracker],
        center: &CenterPointerTracker,
        stage: &mut Stage<'_>,
    ) {
        if !self.dragging {
            return;
        }
        if stage.camera.id() != self.camera_id {
            warn!("camera replaced during a gesture, cancelling");
            self.attach(stage.camera);
            return;
        }

        let action = self.action_for(pointer, pointers);
        let movement = pointer.view().movement();
        let mut velocity = CameraVelocity::zero();
        let changed = match action {
            CameraAction::Rotate => {
                velocity.rotate = movement;
                self.rotate(stage.camera, movement)
            }
            CameraAction::Dolly => {
                velocity.dolly = movement.y;
                self.dolly(stage.camera, movement.y)
            }
            CameraAction::Pan => {
                velocity.pan = movement;
                self.pan(stage.camera, movement)
            }
            CameraAction::DollyPan => {
                velocity.dolly = pinch(pointers, center);
                velocity.pan = center.view().movement();
                let dollied = self.dolly(stage.camera, velocity.dolly);
                self.pan(stage.camera, velocity.pan) | dollied
            }
        };
        self.action = Some(action);
        self.velocity = velocity;
        if changed {
            self.events.request_change();
        }
    }

    fn on_tracked_pointer_up(
        &mut self,
        pointer: &PointerTracker,
        pointers: &[PointerTracker],
        _stage: &mut Stage<'_>,
    ) {
        if !pointers.is_empty() || !self.dragging {
            return;
        }
        self.dragging = false;
        self.action = None;
        // A simulated pointer has already coasted.
        let coast = self.config.enable_damping && !pointer.is_simulated();
        if coast && self.velocity.magnitude() > self.config.rest_epsilon {
            self.coasting = true;
            let key = self.damping_key();
            self.gesture.scheduler().borrow_mut().schedule(key);
        } else {
            self.velocity = CameraVelocity::zero();
            self.events.emit(ControlsEvent::End);
        }
    }

    fn on_tracked_key_change(&mut self, _code: &str, keys: &[String]) {
        self.key_action = keys.iter().find_map(|code| self.action_for_key(code));
    }
}
