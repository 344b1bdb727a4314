use vantage_geometry::{InnerSpace, Plane, Quaternion, Ray, Vector3};

use crate::axis::{Axis, Component, TransformMode};

const HANDLE_RADIUS: f64 = 0.1;
const CENTER_RADIUS: f64 = 0.12;
const PLANE_OFFSET: f64 = 0.3;
const PLANE_HALF: f64 = 0.15;
const SCALE_KNOB_AT: f64 = 1.1;
const SCALE_KNOB_RADIUS: f64 = 0.08;
const VIEW_RING: f64 = 1.25;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GizmoFrame {
    pub position: Vector3,
    pub rotation: Quaternion,
    pub size: f64,
}

impl GizmoFrame {
    pub fn axis(&self, component: Component) -> Vector3 {
        self.rotation * component.unit()
    }
}

pub fn pick(ray: &Ray, mode: TransformMode, frame: &GizmoFrame) -> Option<Axis> {
    if frame.size <= 0.0 {
        return None;
    }
    match mode {
        TransformMode::Translate => pick_linear(ray, frame, false),
        TransformMode::Scale => pick_linear(ray, frame, true),
        TransformMode::Rotate => pick_rotate(ray, frame),
    }
}

fn nearest(hits: impl Iterator<Item = (Axis, f64)>) -> Option<Axis> {
    hits.min_by(|a, b| a.1.total_cmp(&b.1)).map(|(axis, _)| axis)
}

fn pick_linear(ray: &Ray, frame: &GizmoFrame, scale: bool) -> Option<Axis> {
    let size = frame.size;
    let pos = frame.position;

    let (center_distance, _) = ray.closest_to_segment(pos, pos);
    if center_distance < size * CENTER_RADIUS {
        return Some(Axis::XYZ);
    }

    let mut hits = Vec::new();
    let axes = [(Axis::X, Component::X), (Axis::Y, Component::Y), (Axis::Z, Component::Z)];
    for (axis, component) in axes {
        let dir = frame.axis(component);
        let (distance, t) = ray.closest_to_segment(pos, pos + dir * size);
        if distance < size * HANDLE_RADIUS {
            hits.push((axis, t));
        }
        if scale {
            let knob = pos + dir * size * SCALE_KNOB_AT;
            let (distance, t) = ray.closest_to_segment(knob, knob);
            if distance < size * SCALE_KNOB_RADIUS {
                let uniform = match component {
                    Component::X => Axis::XYZX,
                    Component::Y => Axis::XYZY,
                    Component::Z => Axis::XYZZ,
                };
                hits.push((uniform, t));
            }
        }
    }

    for axis in [Axis::XY, Axis::YZ, Axis::XZ] {
        let Some(normal_component) = axis.plane_normal() else {
            continue;
        };
        let in_plane: Vec<Vector3> = Component::ALL
            .into_iter()
            .filter(|c| *c != normal_component)
            .map(|c| frame.axis(c))
            .collect();
        let (u, v) = (in_plane[0], in_plane[1]);
        let center = pos + (u + v) * size * PLANE_OFFSET;
        let plane = Plane::from_normal_and_coplanar_point(frame.axis(normal_component), center);
        let Some(t) = ray.distance_to_plane(&plane) else {
            continue;
        };
        let local = ray.at(t) - center;
        let half = size * PLANE_HALF;
        if local.dot(u).abs() <= half && local.dot(v).abs() <= half {
            hits.push((axis, t));
        }
    }

    nearest(hits.into_iter())
}

fn pick_rotate(ray: &Ray, frame: &GizmoFrame) -> Option<Axis> {
    let size = frame.size;
    let pos = frame.position;
    let thickness = size * HANDLE_RADIUS;

    let ring_hit = |normal: Vector3, radius: f64| -> Option<f64> {
        let plane = Plane::from_normal_and_coplanar_point(normal, pos);
        let t = ray.distance_to_plane(&plane)?;
        let from_center = (ray.at(t) - pos).magnitude();
        ((from_center - radius).abs() < thickness).then_some(t)
    };

    let rings = [(Axis::X, Component::X), (Axis::Y, Component::Y), (Axis::Z, Component::Z)];
    let hits = rings
        .into_iter()
        .filter_map(|(axis, component)| ring_hit(frame.axis(component), size).map(|t| (axis, t)));
    if let Some(axis) = nearest(hits) {
        return Some(axis);
    }
    if ring_hit(-ray.direction, size * VIEW_RING).is_some() {
        return Some(Axis::E);
    }
    hits_sphere(ray, pos, size).then_some(Axis::XYZE)
}

fn hits_sphere(ray: &Ray, center: Vector3, radius: f64) -> bool {
    let to_center = center - ray.origin;
    let along = to_center.dot(ray.direction);
    let closest2 = to_center.magnitude2() - along * along;
    closest2 <= radius * radius && (along >= 0.0 || to_center.magnitude2() <= radius * radius)
}
