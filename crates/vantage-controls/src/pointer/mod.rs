mod center;
mod tracker;

use std::ops::Sub;

pub use center::CenterPointerTracker;
pub use tracker::{Intersection, PointerTracker, PointerType, grazing_correction};

use vantage_geometry::{Plane, Vector2, Vector3};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Track<V> {
    pub start: V,
    pub current: V,
    pub previous: V,
}

impl<V: Copy> Track<V> {
    pub fn splat(value: V) -> Self {
        Self {
            start: value,
            current: value,
            previous: value,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(V) -> U) -> Track<U> {
        Track {
            start: f(self.start),
            current: f(self.current),
            previous: f(self.previous),
        }
    }

    pub fn try_map<U>(&self, mut f: impl FnMut(V) -> Option<U>) -> Option<Track<U>> {
        Some(Track {
            start: f(self.start)?,
            current: f(self.current)?,
            previous: f(self.previous)?,
        })
    }
}

impl<V: Copy + Sub<Output = V>> Track<V> {
    pub fn movement(&self) -> V {
        self.current - self.previous
    }

    pub fn offset(&self) -> V {
        self.current - self.start
    }
}

pub trait TrackedPointer {
    fn pointer_id(&self) -> i32;

    fn canvas(&self) -> Track<Vector2>;

    fn view(&self) -> Track<Vector2>;

    fn project_on_plane(&self, plane: &Plane, min_grazing_angle: f64) -> Option<Track<Vector3>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_and_offset_follow_positions() {
        let mut track = Track::splat(Vector2::new(1.0, 1.0));
        track.previous = Vector2::new(2.0, 2.0);
        track.current = Vector2::new(3.0, 5.0);
        assert_eq!(track.movement(), Vector2::new(1.0, 3.0));
        assert_eq!(track.offset(), Vector2::new(2.0, 4.0));
        assert_eq!(track.try_map(|v| (v.x > 1.5).then_some(v)), None);
    }
}
