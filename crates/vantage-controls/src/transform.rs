use tracing::{debug, warn};
use vantage_base::Guid;
use vantage_geometry::{
    EPSILON, ElementWise, InnerSpace, Plane, Quaternion, Rad, Ray, Rotation3, SquareMatrix, Trs,
    Vector3, transform_point, try_normalize,
};
use vantage_scene::{Camera, NodeId, Scene};

use crate::animation::{FrameTime, SharedScheduler};
use crate::axis::{Axis, Component, Space, TransformMode};
use crate::config::{ControlsConfig, GestureConfig, TransformConfig};
use crate::events::{ControlsEvent, EventQueue};
use crate::gesture::{GestureCore, Stage, TrackedControls};
use crate::input::MouseButton;
use crate::picker::{GizmoFrame, pick};
use crate::pointer::{CenterPointerTracker, PointerTracker, Track};

#[derive(Clone, Debug)]
pub struct DragSession {
    pub object: NodeId,
    pub pointer_id: i32,
    pub camera_id: Guid,
    pub axis: Axis,
    pub mode: TransformMode,
    pub space: Space,
    pub plane: Plane,
    /// Unit vector from the object towards the camera.
    pub eye: Vector3,
    pub start: Trs,
    pub world_start: Trs,
    pub parent: Trs,
    pub rotation_speed: f64,
}

impl DragSession {
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        object: NodeId,
        axis: Axis,
        mode: TransformMode,
        space: Space,
        scene: &Scene,
        camera: &Camera,
        pointer: &PointerTracker,
        config: &TransformConfig,
    ) -> Option<Self> {
        let start = scene.node(object)?.trs();
        let world_start = scene.world_trs(object).ok()?;
        let parent = scene.parent_world_trs(object).ok()?;
        let space = if mode == TransformMode::Scale {
            Space::Local
        } else {
            space
        };

        let facing = -camera.view_direction();
        let eye = if camera.is_perspective() {
            try_normalize(camera.position - world_start.position).unwrap_or(facing)
        } else {
            facing
        };
        let normal = plane_normal(mode, axis, space, world_start.quaternion, eye, facing);
        let plane = Plane::from_normal_and_coplanar_point(normal, world_start.position);

        let distance = (camera.position - world_start.position)
            .magnitude()
            .max(EPSILON);
        let view_factor = if config.xr {
            config.xr_rotation_speed
        } else {
            pointer.rect().height / 720.0
        };

        Some(Self {
            object,
            pointer_id: pointer.pointer_id(),
            camera_id: camera.id(),
            axis,
            mode,
            space,
            plane,
            eye,
            start,
            world_start,
            parent,
            rotation_speed: config.rotation_gain / distance * view_factor,
        })
    }

    fn basis(&self, component: Component) -> Vector3 {
        match self.space {
            Space::Local => self.world_start.quaternion * component.unit(),
            Space::World => component.unit(),
        }
    }

    pub fn apply(&self, points: &Track<Vector3>, config: &TransformConfig) -> Option<Trs> {
        match self.mode {
            TransformMode::Translate => Some(self.translate(points.offset(), config)),
            TransformMode::Scale => self.scale(points, config),
            TransformMode::Rotate => self.rotate(points, config),
        }
    }

    fn translate(&self, offset: Vector3, config: &TransformConfig) -> Trs {
        let local = self.space == Space::Local && self.axis != Axis::XYZ;
        let mut offset = offset;
        if local {
            offset = self.world_start.quaternion.conjugate() * offset;
        }
        offset = self.axis.mask(offset);
        offset = if local {
            self.start.quaternion * offset
        } else {
            self.parent.quaternion.conjugate() * offset
        };
        offset = offset.div_element_wise(safe_scale(self.parent.scale));

        let mut position = self.start.position + offset;
        if let Some(snap) = config.translation_snap.filter(|snap| *snap > 0.0) {
            position = self.snap_position(position, snap);
        }
        Trs {
            position,
            ..self.start
        }
    }

    fn snap_position(&self, position: Vector3, snap: f64) -> Vector3 {
        let round = |v: Vector3| {
            let mut out = v;
            for component in Component::ALL {
                if self.axis.includes(component) {
                    component.set(&mut out, round_to(component.get(v), snap));
                }
            }
            out
        };
        match self.space {
            Space::Local => {
                let unrotated = self.start.quaternion.conjugate() * position;
                self.start.quaternion * round(unrotated)
            }
            Space::World => {
                let parent = self.parent.to_matrix();
                let Some(inverse) = parent.invert() else {
                    return position;
                };
                let world = round(transform_point(&parent, position));
                transform_point(&inverse, world)
            }
        }
    }

    fn scale(&self, points: &Track<Vector3>, config: &TransformConfig) -> Option<Trs> {
        let start = points.start - self.world_start.position;
        let end = points.current - self.world_start.position;

        let factor = if self.axis.is_uniform() {
            let start_len = start.magnitude();
            if start_len <= EPSILON {
                return None;
            }
            let mut d = end.magnitude() / start_len;
            if end.dot(start) < 0.0 {
                d = -d;
            }
            Vector3::new(d, d, d)
        } else {
            let inverse = self.world_start.quaternion.conjugate();
            let (start, end) = (inverse * start, inverse * end);
            let mut factor = Vector3::new(1.0, 1.0, 1.0);
            for component in Component::ALL {
                let s = component.get(start);
                if self.axis.includes(component) && s.abs() > EPSILON {
                    component.set(&mut factor, component.get(end) / s);
                }
            }
            factor
        };

        let mut scale = self.start.scale.mul_element_wise(factor);
        if let Some(snap) = config.scale_snap.filter(|snap| *snap > 0.0) {
            for component in Component::ALL {
                if self.axis.includes(component) {
                    let snapped = round_to(component.get(scale), snap);
                    component.set(&mut scale, if snapped == 0.0 { snap } else { snapped });
                }
            }
        }
        Some(Trs {
            scale,
            ..self.start
        })
    }

    pub fn rotation(&self, points: &Track<Vector3>) -> Option<(Vector3, f64)> {
        let start = points.start - self.world_start.position;
        let end = points.current - self.world_start.position;
        let offset = points.offset();
        let eye = self.eye;

        match self.axis {
            Axis::E => Some((eye, signed_angle(start, end, eye))),
            Axis::XYZE => {
                if offset.magnitude() <= EPSILON {
                    return Some((eye, 0.0));
                }
                let axis = try_normalize(offset.cross(eye))?;
                Some((axis, offset.dot(axis.cross(eye)) * self.rotation_speed))
            }
            axis => {
                let component = axis.single()?;
                let world_axis = self.basis(component);
                match try_normalize(world_axis.cross(eye)) {
                    Some(tangent) => Some((world_axis, offset.dot(tangent) * self.rotation_speed)),
                    None => Some((world_axis, signed_angle(start, end, world_axis))),
                }
            }
        }
    }

    fn rotate(&self, points: &Track<Vector3>, config: &TransformConfig) -> Option<Trs> {
        let (world_axis, mut angle) = self.rotation(points)?;
        if let Some(snap) = config.rotation_snap.filter(|snap| *snap > 0.0) {
            angle = round_to(angle, snap);
        }

        let quaternion = match (self.space, self.axis.single()) {
            (Space::Local, Some(component)) => {
                self.start.quaternion * Quaternion::from_axis_angle(component.unit(), Rad(angle))
            }
            _ => {
                let axis = try_normalize(self.parent.quaternion.conjugate() * world_axis)?;
                Quaternion::from_axis_angle(axis, Rad(angle)) * self.start.quaternion
            }
        };
        Some(Trs {
            quaternion: quaternion.normalize(),
            ..self.start
        })
    }
}

pub fn plane_normal(
    mode: TransformMode,
    axis: Axis,
    space: Space,
    world_quaternion: Quaternion,
    eye: Vector3,
    facing: Vector3,
) -> Vector3 {
    let basis = |component: Component| match space {
        Space::Local => world_quaternion * component.unit(),
        Space::World => component.unit(),
    };
    if mode == TransformMode::Rotate {
        return facing;
    }
    if let Some(component) = axis.single() {
        let along = basis(component);
        return try_normalize(eye - along * along.dot(eye)).unwrap_or(facing);
    }
    if let Some(component) = axis.plane_normal() {
        return basis(component);
    }
    facing
}

fn safe_scale(scale: Vector3) -> Vector3 {
    let fix = |v: f64| if v.abs() <= EPSILON { 1.0 } else { v };
    Vector3::new(fix(scale.x), fix(scale.y), fix(scale.z))
}

fn round_to(value: f64, step: f64) -> f64 {
    (value / step).round() * step
}

/// Angle from `a` to `b`, positive counter-clockwise about `axis`.
fn signed_angle(a: Vector3, b: Vector3, axis: Vector3) -> f64 {
    if a.magnitude() <= EPSILON || b.magnitude() <= EPSILON {
        return 0.0;
    }
    let Rad(angle) = a.angle(b);
    if a.cross(b).dot(axis) < 0.0 {
        -angle
    } else {
        angle
    }
}

pub struct TransformControls {
    gesture: GestureCore,
    config: TransformConfig,
    events: EventQueue,
    object: Option<NodeId>,
    mode: TransformMode,
    space: Space,
    axis: Option<Axis>,
    session: Option<DragSession>,
}

impl TransformControls {
    pub fn new(scheduler: SharedScheduler, config: &ControlsConfig) -> Self {
        let gesture = GestureConfig {
            enable_damping: false,
            ..config.gesture
        };
        Self {
            gesture: GestureCore::new(scheduler, gesture),
            config: config.transform,
            events: EventQueue::new(),
            object: None,
            mode: TransformMode::default(),
            space: Space::default(),
            axis: None,
            session: None,
        }
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn set_translation_snap(&mut self, snap: Option<f64>) {
        if self.config.translation_snap != snap {
            self.config.translation_snap = snap;
            self.events.property_changed("translation_snap");
        }
    }

    pub fn set_rotation_snap(&mut self, snap: Option<f64>) {
        if self.config.rotation_snap != snap {
            self.config.rotation_snap = snap;
            self.events.property_changed("rotation_snap");
        }
    }

    pub fn set_scale_snap(&mut self, snap: Option<f64>) {
        if self.config.scale_snap != snap {
            self.config.scale_snap = snap;
            self.events.property_changed("scale_snap");
        }
    }

    pub fn object(&self) -> Option<NodeId> {
        self.object
    }

    pub fn attach(&mut self, object: NodeId) {
        self.cancel_drag();
        if self.object != Some(object) {
            self.object = Some(object);
            self.events.property_changed("object");
        }
    }

    pub fn detach(&mut self) {
        self.cancel_drag();
        if self.object.take().is_some() {
            self.events.property_changed("object");
        }
        self.set_axis(None);
    }

    pub fn mode(&self) -> TransformMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TransformMode) {
        if self.mode != mode {
            self.cancel_drag();
            self.mode = mode;
            self.events.property_changed("mode");
        }
    }

    pub fn space(&self) -> Space {
        self.space
    }

    pub fn set_space(&mut self, space: Space) {
        if self.space != space {
            self.cancel_drag();
            self.space = space;
            self.events.property_changed("space");
        }
    }

    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    pub fn set_axis(&mut self, axis: Option<Axis>) {
        if self.axis == axis {
            return;
        }
        if axis.is_none() {
            self.cancel_drag();
        }
        self.axis = axis;
        self.events.property_changed("axis");
    }

    pub fn enabled(&self) -> bool {
        self.gesture.enabled()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.cancel_drag();
            self.set_axis(None);
        }
        if self.gesture.set_enabled(enabled) {
            self.events.property_changed("enabled");
        }
    }

    pub fn dispose(&mut self) {
        self.set_enabled(false);
        self.events.emit(ControlsEvent::Dispose);
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn take_events(&mut self) -> Vec<ControlsEvent> {
        self.events.take()
    }

    pub fn gizmo_frame(&self, scene: &Scene, camera: &Camera) -> Option<GizmoFrame> {
        let world = scene.world_trs(self.object?).ok()?;
        let space = if self.mode == TransformMode::Scale {
            Space::Local
        } else {
            self.space
        };
        let rotation = match space {
            Space::Local => world.quaternion,
            Space::World => Quaternion::new(1.0, 0.0, 0.0, 0.0),
        };
        let distance = if camera.is_perspective() {
            (world.position - camera.position).dot(camera.view_direction())
        } else {
            0.0
        };
        Some(GizmoFrame {
            position: world.position,
            rotation,
            size: camera.view_height_at(distance) * self.config.size,
        })
    }

    pub fn pick(&self, ray: &Ray, scene: &Scene, camera: &Camera) -> Option<Axis> {
        let frame = self.gizmo_frame(scene, camera)?;
        pick(ray, self.mode, &frame)
    }

    pub fn animate(&mut self, frame: FrameTime, stage: &mut Stage<'_>) {
        let tracked = self.gesture.animate(frame);
        self.dispatch(tracked, stage);
    }

    fn start_drag(&mut self, pointer: &PointerTracker, stage: &mut Stage<'_>) {
        let (Some(object), Some(axis)) = (self.object, self.axis) else {
            return;
        };
        let Some(session) = DragSession::begin(
            object,
            axis,
            self.mode,
            self.space,
            stage.scene,
            stage.camera,
            pointer,
            &self.config,
        ) else {
            warn!(object = %object, "attached object is not in the scene");
            return;
        };
        if pointer
            .project_on_plane(&session.plane, self.config.min_grazing_angle)
            .is_none()
        {
            debug!(axis = %axis, "drag plane out of reach, not starting");
            return;
        }
        debug!(axis = %axis, mode = ?self.mode, "drag start");
        self.session = Some(session);
        self.events.emit(ControlsEvent::Start);
    }

    fn drag(&mut self, pointer: &PointerTracker, stage: &mut Stage<'_>) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if pointer.pointer_id() != session.pointer_id {
            return;
        }
        if stage.camera.id() != session.camera_id {
            warn!("camera replaced during a drag, cancelling");
            self.cancel_drag();
            return;
        }
        let Some(points) = pointer.project_on_plane(&session.plane, self.config.min_grazing_angle)
        else {
            return;
        };
        let Some(trs) = session.apply(&points, &self.config) else {
            return;
        };
        let object = session.object;
        let Some(node) = stage.scene.node_mut(object) else {
            warn!(object = %object, "dragged object left the scene");
            self.cancel_drag();
            return;
        };
        node.set_trs(trs);
        self.events.request_change();
    }

    fn end_drag(&mut self) {
        if self.session.take().is_some() {
            debug!("drag end");
            self.events.emit(ControlsEvent::End);
        }
    }

    fn cancel_drag(&mut self) {
        if self.session.take().is_some() {
            debug!("drag cancelled");
            self.events.emit(ControlsEvent::End);
        }
    }
}

impl TrackedControls for TransformControls {
    fn gesture(&self) -> &GestureCore {
        &self.gesture
    }

    fn gesture_mut(&mut self) -> &mut GestureCore {
        &mut self.gesture
    }

    fn on_tracked_pointer_hover(
        &mut self,
        pointer: &PointerTracker,
        _pointers: &[PointerTracker],
        stage: &mut Stage<'_>,
    ) {
        if self.session.is_some() {
            return;
        }
        let axis = self.pick(&pointer.ray().current, stage.scene, stage.camera);
        self.set_axis(axis);
    }

    fn on_tracked_pointer_down(
        &mut self,
        pointer: &PointerTracker,
        pointers: &[PointerTracker],
        stage: &mut Stage<'_>,
    ) {
        if self.session.is_some() || pointers.len() > 1 {
            return;
        }
        if !matches!(pointer.button(), Some(MouseButton::Primary) | None) {
            return;
        }
        if self.axis.is_none() {
            let axis = self.pick(&pointer.ray().current, stage.scene, stage.camera);
            self.set_axis(axis);
        }
        self.start_drag(pointer, stage);
    }

    fn on_tracked_pointer_move(
        &mut self,
        pointer: &PointerTracker,
        _pointers: &[PointerTracker],
        _center: &CenterPointerTracker,
        stage: &mut Stage<'_>,
    ) {
        self.drag(pointer, stage);
    }

    fn on_tracked_pointer_up(
        &mut self,
        pointer: &PointerTracker,
        _pointers: &[PointerTracker],
        _stage: &mut Stage<'_>,
    ) {
        let owner = self
            .session
            .as_ref()
            .map(|session| session.pointer_id == pointer.pointer_id());
        match owner {
            Some(true) => self.end_drag(),
            Some(false) => {}
            None => self.set_axis(None),
        }
    }
}
