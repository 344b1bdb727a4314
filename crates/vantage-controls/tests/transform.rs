use std::f64::consts::FRAC_PI_4;

use vantage_controls::{
    AnimationScheduler, Axis, ControlsConfig, ControlsEvent, MouseButton, PointerEvent,
    PointerEventKind, Space, Stage, TrackedControls, TransformConfig, TransformControls,
    TransformMode,
};
use vantage_geometry::{InnerSpace, Quaternion, Rad, Rect, Rotation3, Vector2, Vector3};
use vantage_scene::{Camera, Node, NodeId, Scene};

const RECT: Rect = Rect::from_size(800.0, 600.0);

struct Rig {
    camera: Camera,
    scene: Scene,
    object: NodeId,
    controls: TransformControls,
}

impl Rig {
    fn new(node: Node, transform: TransformConfig) -> Self {
        let mut camera = Camera::perspective(50.0, RECT.aspect(), 0.1, 1000.0);
        camera.position = Vector3::new(0.0, 0.0, 10.0);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        let mut scene = Scene::new();
        let object = scene.add(node);
        let config = ControlsConfig {
            transform,
            ..ControlsConfig::default()
        };
        let mut controls = TransformControls::new(AnimationScheduler::shared(), &config);
        controls.attach(object);
        controls.take_events();
        Self {
            camera,
            scene,
            object,
            controls,
        }
    }

    fn at_origin() -> Self {
        Self::new(Node::new("object"), TransformConfig::default())
    }

    fn canvas_of(&self, world: Vector3) -> Vector2 {
        let ndc = self.camera.project(world);
        Vector2::new((ndc.x + 1.0) * 0.5 * RECT.width, (1.0 - ndc.y) * 0.5 * RECT.height)
    }

    fn event(&mut self, event: PointerEvent) {
        let mut stage = Stage::new(&mut self.camera, &mut self.scene);
        self.controls.pointer_event(&event, &mut stage);
    }

    fn drag(&mut self, path: &[(f64, f64)]) {
        let Some((&(x, y), rest)) = path.split_first() else {
            return;
        };
        self.event(PointerEvent::down(1, MouseButton::Primary, x, y, RECT));
        for &(x, y) in rest {
            self.event(PointerEvent::moved(1, 1, x, y, RECT));
        }
    }

    fn release(&mut self) {
        self.event(PointerEvent::up(1, 0.0, 0.0, RECT));
    }

    fn node(&self) -> &Node {
        match self.scene.node(self.object) {
            Some(node) => node,
            None => panic!("object left the scene"),
        }
    }
}

#[test]
fn hovering_highlights_the_handle_under_the_pointer() {
    let mut rig = Rig::at_origin();
    let size = rig
        .controls
        .gizmo_frame(&rig.scene, &rig.camera)
        .map(|frame| frame.size)
        .unwrap_or_default();
    assert!(size > 0.0);

    let on_x = rig.canvas_of(Vector3::new(size * 0.7, 0.0, 0.0));
    rig.event(PointerEvent::moved(7, 0, on_x.x, on_x.y, RECT));
    assert_eq!(rig.controls.axis(), Some(Axis::X));
    assert!(rig.controls.take_events().contains(&ControlsEvent::PropertyChanged("axis")));

    rig.event(PointerEvent::new(7, PointerEventKind::Leave, on_x.x, on_x.y, RECT));
    assert_eq!(rig.controls.axis(), None);
}

#[test]
fn drag_emits_start_and_end() {
    let mut rig = Rig::at_origin();
    rig.controls.set_axis(Some(Axis::XY));
    rig.drag(&[(400.0, 300.0), (430.0, 280.0)]);
    assert!(rig.controls.is_dragging());
    rig.release();
    assert!(!rig.controls.is_dragging());
    let events = rig.controls.take_events();
    assert_eq!(events.iter().filter(|e| **e == ControlsEvent::Start).count(), 1);
    assert_eq!(events.iter().filter(|e| **e == ControlsEvent::End).count(), 1);
    assert!(rig.node().position.x > 0.1);
    assert!(rig.node().position.y > 0.1);
}

#[test]
fn local_axis_follows_the_object_orientation() {
    let node = Node::new("turned").with_quaternion(Quaternion::from_angle_z(Rad(std::f64::consts::FRAC_PI_2)));
    let mut rig = Rig::new(node, TransformConfig::default());
    rig.controls.set_space(Space::Local);
    rig.controls.set_axis(Some(Axis::X));
    rig.drag(&[(400.0, 300.0), (430.0, 200.0)]);

    let position = rig.node().position;
    assert!(position.x.abs() < 1.0e-9);
    assert!(position.y > 0.5);
    assert!(position.z.abs() < 1.0e-9);
}

#[test]
fn translation_snaps_to_the_grid() {
    let config = TransformConfig {
        translation_snap: Some(0.5),
        ..TransformConfig::default()
    };
    let mut rig = Rig::new(Node::new("snapped"), config);
    rig.controls.set_axis(Some(Axis::XY));
    rig.drag(&[(400.0, 300.0), (437.0, 251.0)]);

    let position = rig.node().position;
    for value in [position.x, position.y] {
        let steps = value / 0.5;
        assert!((steps - steps.round()).abs() < 1.0e-9, "{value} is off grid");
    }
    assert!(position.x > 0.0);
}

#[test]
fn uniform_scale_follows_distance_ratio() {
    let mut rig = Rig::at_origin();
    rig.controls.set_mode(TransformMode::Scale);
    rig.controls.set_axis(Some(Axis::XYZ));
    rig.drag(&[(500.0, 300.0), (600.0, 300.0)]);

    let scale = rig.node().scale;
    assert!((scale.x - 2.0).abs() < 1.0e-9);
    assert_eq!(scale.x, scale.y);
    assert_eq!(scale.y, scale.z);
}

#[test]
fn axis_scale_leaves_other_axes_alone() {
    let mut rig = Rig::at_origin();
    rig.controls.set_mode(TransformMode::Scale);
    rig.controls.set_axis(Some(Axis::X));
    rig.drag(&[(500.0, 310.0), (550.0, 330.0)]);

    let scale = rig.node().scale;
    assert!(scale.x > 1.2);
    assert_eq!(scale.y, 1.0);
    assert_eq!(scale.z, 1.0);
}

#[test]
fn view_ring_rotates_counter_clockwise() {
    let mut rig = Rig::at_origin();
    rig.controls.set_mode(TransformMode::Rotate);
    rig.controls.set_axis(Some(Axis::E));
    rig.drag(&[(500.0, 300.0), (400.0, 200.0)]);

    let q = rig.node().quaternion;
    // A quarter turn about the view axis, which points at the camera (+Z).
    let expected = Quaternion::from_angle_z(Rad(std::f64::consts::FRAC_PI_2));
    assert!(q.dot(expected).abs() > 1.0 - 1.0e-9);
}

#[test]
fn free_rotation_turns_about_the_axis_across_the_drag() {
    let mut rig = Rig::at_origin();
    rig.controls.set_mode(TransformMode::Rotate);
    rig.controls.set_axis(Some(Axis::XYZE));
    rig.drag(&[(500.0, 300.0), (500.0, 280.0)]);

    let q = rig.node().quaternion;
    assert!(q.v.x.abs() > 1.0e-3);
    assert!(q.v.x.abs() > 10.0 * q.v.y.abs());
    assert!(q.v.z.abs() < 1.0e-9);
}

#[test]
fn free_rotation_angle_grows_linearly_with_the_drag() {
    let angle_for = |dy: f64| {
        let mut rig = Rig::at_origin();
        rig.controls.set_mode(TransformMode::Rotate);
        rig.controls.set_axis(Some(Axis::XYZE));
        rig.drag(&[(520.0, 300.0), (520.0, 300.0 - dy)]);
        let q = rig.node().quaternion;
        2.0 * q.v.magnitude().atan2(q.s)
    };
    let short = angle_for(5.0);
    let long = angle_for(10.0);
    assert!(short > 0.0);
    assert!((long / short - 2.0).abs() < 0.05, "{short} vs {long}");
}

#[test]
fn rotation_snaps_angle() {
    let config = TransformConfig {
        rotation_snap: Some(FRAC_PI_4),
        ..TransformConfig::default()
    };
    let mut rig = Rig::new(Node::new("dial"), config);
    rig.controls.set_mode(TransformMode::Rotate);
    rig.controls.set_axis(Some(Axis::Y));
    rig.drag(&[(400.0, 300.0), (433.0, 300.0)]);

    let q = rig.node().quaternion;
    let angle = 2.0 * q.v.y.atan2(q.s);
    let steps = angle / FRAC_PI_4;
    assert!(angle.abs() > 1.0e-6);
    assert!((steps - steps.round()).abs() < 1.0e-9);
}

#[test]
fn clearing_the_axis_interrupts_the_drag() {
    let mut rig = Rig::at_origin();
    rig.controls.set_axis(Some(Axis::XY));
    rig.drag(&[(400.0, 300.0), (420.0, 300.0)]);
    let held = rig.node().position;

    rig.controls.set_axis(None);
    assert!(!rig.controls.is_dragging());
    rig.event(PointerEvent::moved(1, 1, 500.0, 200.0, RECT));
    assert_eq!(rig.node().position, held);
    assert!(rig.controls.take_events().contains(&ControlsEvent::End));
}

#[test]
fn reattaching_mid_drag_cancels() {
    let mut rig = Rig::at_origin();
    let other = rig.scene.add(Node::new("other"));
    rig.controls.set_axis(Some(Axis::XY));
    rig.drag(&[(400.0, 300.0), (420.0, 300.0)]);

    rig.controls.attach(other);
    assert!(!rig.controls.is_dragging());
    rig.event(PointerEvent::moved(1, 1, 480.0, 240.0, RECT));
    let untouched = rig.scene.node(other).map(|node| node.position);
    assert_eq!(untouched, Some(Vector3::new(0.0, 0.0, 0.0)));
    assert!(rig.node().position.magnitude() > 0.0);
}

#[test]
fn disabled_controls_ignore_input() {
    let mut rig = Rig::at_origin();
    rig.controls.set_axis(Some(Axis::XY));
    rig.controls.set_enabled(false);
    rig.drag(&[(400.0, 300.0), (480.0, 250.0)]);
    assert_eq!(rig.node().position, Vector3::new(0.0, 0.0, 0.0));
    assert!(rig.controls.gesture().pointers().is_empty());
}

#[test]
fn disabling_clears_the_axis_and_reports_it() {
    let mut rig = Rig::at_origin();
    rig.controls.set_axis(Some(Axis::Y));
    rig.controls.take_events();

    rig.controls.set_enabled(false);
    assert_eq!(rig.controls.axis(), None);
    let events = rig.controls.take_events();
    assert!(events.contains(&ControlsEvent::PropertyChanged("axis")));
    assert!(events.contains(&ControlsEvent::PropertyChanged("enabled")));
}

#[test]
fn setters_report_only_real_changes() {
    let mut rig = Rig::at_origin();
    rig.controls.set_translation_snap(Some(1.0));
    rig.controls.set_translation_snap(Some(1.0));
    rig.controls.set_rotation_snap(Some(FRAC_PI_4));
    rig.controls.set_scale_snap(None);
    assert_eq!(rig.controls.config().translation_snap, Some(1.0));
    assert_eq!(
        rig.controls.take_events(),
        vec![
            ControlsEvent::PropertyChanged("translation_snap"),
            ControlsEvent::PropertyChanged("rotation_snap"),
            ControlsEvent::Change,
        ]
    );
}

#[test]
fn detach_and_dispose_end_the_drag() {
    let mut rig = Rig::at_origin();
    rig.controls.set_axis(Some(Axis::XY));
    rig.drag(&[(400.0, 300.0), (420.0, 300.0)]);
    rig.controls.take_events();

    rig.controls.detach();
    assert_eq!(rig.controls.object(), None);
    assert_eq!(rig.controls.axis(), None);
    let events = rig.controls.take_events();
    assert_eq!(events.first(), Some(&ControlsEvent::End));
    assert!(events.contains(&ControlsEvent::PropertyChanged("object")));

    rig.controls.dispose();
    assert!(!rig.controls.enabled());
    assert!(rig.controls.take_events().contains(&ControlsEvent::Dispose));
}
