use tracing::{error, warn};
use vantage_geometry::{EPSILON, InnerSpace, Plane, Ray, Rect, Vector2, Vector3, try_normalize};
use vantage_scene::{Camera, NodeId, Scene};

use super::{Track, TrackedPointer};
use crate::input::{Modifiers, MouseButton, PointerEvent, PointerEventKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerType {
    Down,
    Move,
    Up,
    Hover,
    Virtual,
}

impl From<PointerEventKind> for PointerType {
    fn from(kind: PointerEventKind) -> Self {
        match kind {
            PointerEventKind::Down => Self::Down,
            PointerEventKind::Move => Self::Move,
            PointerEventKind::Over | PointerEventKind::Enter => Self::Hover,
            PointerEventKind::Up
            | PointerEventKind::Cancel
            | PointerEventKind::Leave
            | PointerEventKind::Out => Self::Up,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub node: NodeId,
    pub distance: f64,
    pub point: Vector3,
}

#[derive(Clone, Debug)]
pub struct PointerTracker {
    pointer_id: i32,
    pointer_type: PointerType,
    button: Option<MouseButton>,
    buttons: u32,
    modifiers: Modifiers,
    rect: Rect,
    canvas: Track<Vector2>,
    camera: Camera,
    simulated: bool,
}

impl PointerTracker {
    pub fn new(event: &PointerEvent, camera: &Camera) -> Self {
        Self {
            pointer_id: event.pointer_id,
            pointer_type: event.kind.into(),
            button: event.button.or_else(|| MouseButton::from_buttons(event.buttons)),
            buttons: event.buttons,
            modifiers: event.modifiers,
            rect: event.rect,
            canvas: Track::splat(event.canvas()),
            camera: camera.clone(),
            simulated: false,
        }
    }

    pub fn update(&mut self, event: &PointerEvent, camera: &Camera) {
        if event.pointer_id != self.pointer_id {
            error!(
                tracked = self.pointer_id,
                received = event.pointer_id,
                "pointer id mismatch, update ignored"
            );
            return;
        }
        self.pointer_type = event.kind.into();
        self.buttons = event.buttons;
        if self.button.is_none() {
            self.button = MouseButton::from_buttons(event.buttons);
        }
        self.modifiers = event.modifiers;
        self.rect = event.rect;
        self.camera = camera.clone();
        self.canvas.previous = self.canvas.current;
        self.canvas.current = event.canvas();
    }

    pub fn pointer_id(&self) -> i32 {
        self.pointer_id
    }

    pub fn pointer_type(&self) -> PointerType {
        self.pointer_type
    }

    pub(crate) fn set_pointer_type(&mut self, pointer_type: PointerType) {
        self.pointer_type = pointer_type;
    }

    pub fn button(&self) -> Option<MouseButton> {
        self.button
    }

    pub fn buttons(&self) -> u32 {
        self.buttons
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn set_camera(&mut self, camera: &Camera) {
        self.camera = camera.clone();
    }

    pub fn is_simulated(&self) -> bool {
        self.simulated
    }

    pub fn canvas(&self) -> Track<Vector2> {
        self.canvas
    }

    pub fn view(&self) -> Track<Vector2> {
        self.canvas.map(|canvas| self.rect.canvas_to_view(canvas))
    }

    pub fn ray(&self) -> Track<Ray> {
        self.view().map(|view| self.camera.ray_from_view(view))
    }

    pub fn grazing_correction(&self, plane: &Plane, min_grazing_angle: f64) -> Track<Ray> {
        grazing_correction(&self.ray(), plane, min_grazing_angle)
    }

    pub fn project_on_plane(&self, plane: &Plane, min_grazing_angle: f64) -> Option<Track<Vector3>> {
        self.grazing_correction(plane, min_grazing_angle)
            .try_map(|ray| ray.intersect_plane(plane))
    }

    pub fn intersect_plane(&self, plane: &Plane) -> Option<Vector3> {
        self.ray().current.intersect_plane(plane)
    }

    pub fn intersect_objects(&self, scene: &Scene, objects: &[NodeId]) -> Vec<Intersection> {
        let ray = self.ray().current;
        let mut hits: Vec<Intersection> = objects
            .iter()
            .filter_map(|&node| {
                let bounds = scene.world_bounds(node)?;
                let distance = ray.intersect_aabb(&bounds)?;
                Some(Intersection {
                    node,
                    distance,
                    point: ray.at(distance),
                })
            })
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Coasts a released pointer: the last movement is replayed, shrunk by
    /// `(1 - damping_factor)` per 60 fps frame worth of `delta_ms`.
    pub fn simulate_damping(&mut self, damping_factor: f64, delta_ms: f64) {
        if !self.simulated {
            error!(
                pointer_id = self.pointer_id,
                "damping can only be simulated on a simulated pointer"
            );
            return;
        }
        let movement = self.canvas.movement();
        let decay = (1.0 - damping_factor).powf(delta_ms * 60.0 / 1000.0);
        self.canvas.previous = self.canvas.current;
        self.canvas.current += movement * decay;
    }

    #[deprecated(note = "use `simulate_damping`")]
    pub fn simmulate_damping(&mut self, damping_factor: f64, delta_ms: f64) {
        warn!("`simmulate_damping` is deprecated, use `simulate_damping`");
        self.simulate_damping(damping_factor, delta_ms);
    }

    pub fn clear_movement(&mut self) {
        self.canvas.previous = self.canvas.current;
    }

    pub fn to_simulated(&self) -> Self {
        Self {
            pointer_type: PointerType::Move,
            simulated: true,
            ..self.clone()
        }
    }
}

impl TrackedPointer for PointerTracker {
    fn pointer_id(&self) -> i32 {
        self.pointer_id
    }

    fn canvas(&self) -> Track<Vector2> {
        self.canvas
    }

    fn view(&self) -> Track<Vector2> {
        PointerTracker::view(self)
    }

    fn project_on_plane(&self, plane: &Plane, min_grazing_angle: f64) -> Option<Track<Vector3>> {
        PointerTracker::project_on_plane(self, plane, min_grazing_angle)
    }
}

pub fn grazing_correction(rays: &Track<Ray>, plane: &Plane, min_grazing_angle: f64) -> Track<Ray> {
    let start = rays.start;
    let side = plane.distance_to_point(start.origin);
    // +1 when the ray has to travel along the normal to reach the plane.
    let facing = if side > EPSILON {
        -1.0
    } else if side < -EPSILON {
        1.0
    } else if start.direction.dot(plane.normal) < 0.0 {
        -1.0
    } else {
        1.0
    };

    let min = min_grazing_angle.to_radians();
    let angle = start.angle_to_plane(plane);
    if facing * angle >= min {
        return *rays;
    }
    let Some(axis) = try_normalize(start.direction.cross(plane.normal)) else {
        return *rays;
    };
    let correction = facing * min - angle;
    let pivot = start
        .intersect_plane(plane)
        .unwrap_or_else(|| plane.project_point(start.origin));
    rays.map(|ray| ray.rotated_about(pivot, axis, correction))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vantage_geometry::Aabb;

    fn camera() -> Camera {
        let mut camera = Camera::perspective(50.0, 1.0, 0.1, 100.0);
        camera.position = Vector3::new(0.0, 0.0, 10.0);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        camera
    }

    #[test]
    fn update_rejects_foreign_pointer() {
        let rect = Rect::from_size(100.0, 100.0);
        let camera = camera();
        let mut tracker = PointerTracker::new(&PointerEvent::down(1, MouseButton::Primary, 10.0, 10.0, rect), &camera);
        tracker.update(&PointerEvent::moved(2, 1, 50.0, 50.0, rect), &camera);
        assert_eq!(tracker.canvas().current, Vector2::new(10.0, 10.0));
        tracker.update(&PointerEvent::moved(1, 1, 15.0, 12.0, rect), &camera);
        assert_eq!(tracker.canvas().movement(), Vector2::new(5.0, 2.0));
        assert_eq!(tracker.canvas().offset(), Vector2::new(5.0, 2.0));
    }

    #[test]
    fn view_is_flipped_and_normalised() {
        let rect = Rect::from_size(200.0, 100.0);
        let tracker = PointerTracker::new(&PointerEvent::down(1, MouseButton::Primary, 0.0, 0.0, rect), &camera());
        assert_eq!(tracker.view().current, Vector2::new(-1.0, 1.0));
    }

    #[test]
    fn damping_is_refused_on_real_pointers() {
        let rect = Rect::from_size(100.0, 100.0);
        let camera = camera();
        let mut tracker = PointerTracker::new(&PointerEvent::down(1, MouseButton::Primary, 10.0, 10.0, rect), &camera);
        tracker.update(&PointerEvent::moved(1, 1, 20.0, 10.0, rect), &camera);
        tracker.simulate_damping(0.05, 16.0);
        assert_eq!(tracker.canvas().current, Vector2::new(20.0, 10.0));

        let mut simulated = tracker.to_simulated();
        assert!(simulated.is_simulated());
        simulated.simulate_damping(0.05, 1000.0 / 60.0);
        assert!((simulated.canvas().movement().x - 9.5).abs() < 1.0e-9);

        #[allow(deprecated)]
        simulated.simmulate_damping(0.05, 1000.0 / 60.0);
        assert!((simulated.canvas().movement().x - 9.025).abs() < 1.0e-9);
    }

    #[test]
    fn object_hits_are_sorted_by_distance() {
        let mut scene = Scene::new();
        let cube = Aabb::new(Vector3::new(-1.0, -1.0, -1.0), Vector3::new(1.0, 1.0, 1.0));
        let far = scene.add(vantage_scene::Node::new("far").with_bounds(cube));
        let near = scene.add(
            vantage_scene::Node::new("near")
                .with_position(Vector3::new(0.0, 0.0, 5.0))
                .with_bounds(cube),
        );
        let aside = scene.add(
            vantage_scene::Node::new("aside")
                .with_position(Vector3::new(8.0, 0.0, 0.0))
                .with_bounds(cube),
        );
        let rect = Rect::from_size(100.0, 100.0);
        let tracker = PointerTracker::new(&PointerEvent::down(1, MouseButton::Primary, 50.0, 50.0, rect), &camera());

        let hits = tracker.intersect_objects(&scene, &[far, aside, near]);
        let order: Vec<NodeId> = hits.iter().map(|hit| hit.node).collect();
        assert_eq!(order, vec![near, far]);
        assert!((hits[0].distance - 4.0).abs() < 1.0e-9);
        assert!((hits[0].point.z - 6.0).abs() < 1.0e-9);
    }

    #[test]
    fn centre_ray_hits_ground_through_target() {
        let rect = Rect::from_size(100.0, 100.0);
        let tracker = PointerTracker::new(&PointerEvent::down(1, MouseButton::Primary, 50.0, 50.0, rect), &camera());
        let plane = Plane::from_normal_and_coplanar_point(Vector3::unit_z(), Vector3::new(0.0, 0.0, 0.0));
        let hit = tracker.intersect_plane(&plane);
        assert!(hit.is_some_and(|point| point.magnitude() < 1.0e-9));
    }
}
