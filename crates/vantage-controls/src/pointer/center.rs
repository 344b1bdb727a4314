use vantage_geometry::{Plane, Ray, Vector2, Vector3, Zero};

use super::{PointerTracker, Track, TrackedPointer};
use crate::input::MouseButton;

#[derive(Clone, Debug, Default)]
pub struct CenterPointerTracker {
    pointers: Vec<PointerTracker>,
}

impl CenterPointerTracker {
    pub const POINTER_ID: i32 = -1;

    pub fn new(pointers: &[PointerTracker]) -> Self {
        Self {
            pointers: pointers.to_vec(),
        }
    }

    pub fn update_center(&mut self, pointers: &[PointerTracker]) {
        self.pointers.clear();
        self.pointers.extend_from_slice(pointers);
    }

    pub fn len(&self) -> usize {
        self.pointers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pointers.is_empty()
    }

    pub fn pointers(&self) -> &[PointerTracker] {
        &self.pointers
    }

    pub fn button(&self) -> Option<MouseButton> {
        self.pointers.first().and_then(PointerTracker::button)
    }

    pub fn canvas(&self) -> Track<Vector2> {
        mean(self.pointers.iter().map(PointerTracker::canvas))
    }

    pub fn view(&self) -> Track<Vector2> {
        mean(self.pointers.iter().map(PointerTracker::view))
    }

    pub fn ray(&self) -> Option<Track<Ray>> {
        let camera = self.pointers.first()?.camera();
        Some(self.view().map(|view| camera.ray_from_view(view)))
    }

    pub fn project_on_plane(&self, plane: &Plane, min_grazing_angle: f64) -> Option<Track<Vector3>> {
        if self.pointers.is_empty() {
            return None;
        }
        let projected = self
            .pointers
            .iter()
            .map(|pointer| pointer.project_on_plane(plane, min_grazing_angle))
            .collect::<Option<Vec<_>>>()?;
        Some(mean(projected.into_iter()))
    }
}

impl TrackedPointer for CenterPointerTracker {
    fn pointer_id(&self) -> i32 {
        Self::POINTER_ID
    }

    fn canvas(&self) -> Track<Vector2> {
        CenterPointerTracker::canvas(self)
    }

    fn view(&self) -> Track<Vector2> {
        CenterPointerTracker::view(self)
    }

    fn project_on_plane(&self, plane: &Plane, min_grazing_angle: f64) -> Option<Track<Vector3>> {
        CenterPointerTracker::project_on_plane(self, plane, min_grazing_angle)
    }
}

fn mean<V>(tracks: impl Iterator<Item = Track<V>>) -> Track<V>
where
    V: Copy + Zero + std::ops::Add<Output = V> + std::ops::Div<f64, Output = V>,
{
    let mut sum = Track::splat(V::zero());
    let mut count = 0usize;
    for track in tracks {
        sum.start = sum.start + track.start;
        sum.current = sum.current + track.current;
        sum.previous = sum.previous + track.previous;
        count += 1;
    }
    if count <= 1 {
        return sum;
    }
    let count = count as f64;
    sum.map(|v| v / count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerEvent;
    use crate::pointer::grazing_correction;
    use vantage_geometry::{InnerSpace, Rect};
    use vantage_scene::Camera;

    #[test]
    fn empty_center_stays_at_origin() {
        let center = CenterPointerTracker::default();
        assert_eq!(center.canvas().current, Vector2::new(0.0, 0.0));
        assert!(center.ray().is_none());
    }

    #[test]
    fn centroid_of_two() {
        let rect = Rect::from_size(100.0, 100.0);
        let camera = Camera::perspective(50.0, 1.0, 0.1, 100.0);
        let a = PointerTracker::new(&PointerEvent::down(1, MouseButton::Primary, 10.0, 20.0, rect), &camera);
        let b = PointerTracker::new(&PointerEvent::down(2, MouseButton::Primary, 30.0, 60.0, rect), &camera);
        let center = CenterPointerTracker::new(&[a, b]);
        assert_eq!(center.canvas().current, Vector2::new(20.0, 40.0));
        assert_eq!(center.button(), Some(MouseButton::Primary));
    }

    #[test]
    fn plane_projection_averages_each_pointer() {
        let rect = Rect::from_size(100.0, 100.0);
        let mut camera = Camera::perspective(50.0, 1.0, 0.1, 100.0);
        camera.position = Vector3::new(0.0, 1.0, 10.0);
        camera.look_at(Vector3::new(0.0, 0.0, 0.0));
        let ground = Plane::new(Vector3::new(0.0, 1.0, 0.0), 0.0);
        let min: f64 = 10.0;

        let above = PointerTracker::new(&PointerEvent::down(1, MouseButton::Primary, 50.0, 10.0, rect), &camera);
        let below = PointerTracker::new(&PointerEvent::down(2, MouseButton::Primary, 50.0, 95.0, rect), &camera);
        assert!(above.ray().start.angle_to_plane(&ground) > 0.0);
        assert!(below.ray().start.angle_to_plane(&ground) < -min.to_radians());

        let center = CenterPointerTracker::new(&[above.clone(), below.clone()]);
        let projected = center.project_on_plane(&ground, min).map(|track| track.current);
        let a = above.project_on_plane(&ground, min).map(|track| track.current);
        let b = below.project_on_plane(&ground, min).map(|track| track.current);
        let (Some(projected), Some(a), Some(b)) = (projected, a, b) else {
            panic!("projection missed the ground");
        };
        assert!((projected - (a + b) / 2.0).magnitude() < 1.0e-9);

        let through_centroid = center
            .ray()
            .and_then(|rays| grazing_correction(&rays, &ground, min).try_map(|ray| ray.intersect_plane(&ground)))
            .map(|track| track.current);
        let Some(through_centroid) = through_centroid else {
            panic!("centroid ray missed the ground");
        };
        assert!((projected - through_centroid).magnitude() > 1.0e-3);
    }
}
