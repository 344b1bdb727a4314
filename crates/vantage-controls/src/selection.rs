use tracing::debug;
use vantage_geometry::{Aabb, ElementWise, One, Quaternion, Vector3};
use vantage_scene::{NodeId, Scene};

use crate::axis::Space;
use crate::events::{ControlsEvent, EventQueue};
use crate::input::Modifiers;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SelectionMode {
    #[default]
    Replace,
    Add,
    Remove,
    Toggle,
}

impl SelectionMode {
    pub fn from_modifiers(modifiers: Modifiers) -> Self {
        let ctrl = modifiers.ctrl || modifiers.meta;
        match (modifiers.shift, ctrl) {
            (true, true) => Self::Toggle,
            (true, false) => Self::Add,
            (false, true) => Self::Remove,
            (false, false) => Self::Replace,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pivot {
    pub position: Vector3,
    pub quaternion: Quaternion,
    pub bounds: Option<Aabb>,
}

impl Default for Pivot {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            quaternion: Quaternion::one(),
            bounds: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SelectionControls {
    selected: Vec<NodeId>,
    space: Space,
    pivot: Pivot,
    events: EventQueue,
}

impl SelectionControls {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[NodeId] {
        &self.selected
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn pivot(&self) -> &Pivot {
        &self.pivot
    }

    pub fn transform_space(&self) -> Space {
        self.space
    }

    pub fn set_transform_space(&mut self, space: Space, scene: &Scene) {
        if self.space != space {
            self.space = space;
            self.update(scene);
            self.events.property_changed("transform_space");
        }
    }

    pub fn take_events(&mut self) -> Vec<ControlsEvent> {
        self.events.take()
    }

    pub fn apply(&mut self, mode: SelectionMode, ids: &[NodeId], scene: &Scene) {
        match mode {
            SelectionMode::Replace => self.replace(ids, scene),
            SelectionMode::Add => self.add(ids, scene),
            SelectionMode::Remove => self.remove(ids, scene),
            SelectionMode::Toggle => self.toggle(ids, scene),
        }
    }

    pub fn toggle(&mut self, ids: &[NodeId], scene: &Scene) {
        self.mutate(scene, |selected| {
            for &id in ids {
                if let Some(index) = selected.iter().position(|&s| s == id) {
                    selected.remove(index);
                } else {
                    selected.push(id);
                }
            }
        });
    }

    pub fn add(&mut self, ids: &[NodeId], scene: &Scene) {
        self.mutate(scene, |selected| {
            for &id in ids {
                if !selected.contains(&id) {
                    selected.push(id);
                }
            }
        });
    }

    pub fn remove(&mut self, ids: &[NodeId], scene: &Scene) {
        self.mutate(scene, |selected| selected.retain(|id| !ids.contains(id)));
    }

    pub fn replace(&mut self, ids: &[NodeId], scene: &Scene) {
        self.mutate(scene, |selected| {
            selected.clear();
            for &id in ids {
                if !selected.contains(&id) {
                    selected.push(id);
                }
            }
        });
    }

    pub fn clear(&mut self, scene: &Scene) {
        self.mutate(scene, Vec::clear);
    }

    fn mutate(&mut self, scene: &Scene, edit: impl FnOnce(&mut Vec<NodeId>)) {
        let before = self.selected.clone();
        edit(&mut self.selected);
        self.update(scene);

        let added: Vec<NodeId> = self
            .selected
            .iter()
            .filter(|id| !before.contains(id))
            .copied()
            .collect();
        let removed: Vec<NodeId> = before
            .iter()
            .filter(|id| !self.selected.contains(id))
            .copied()
            .collect();
        if added.is_empty() && removed.is_empty() {
            return;
        }
        debug!(added = added.len(), removed = removed.len(), "selection changed");
        self.events
            .emit(ControlsEvent::SelectionChanged { added, removed });
        self.events.request_change();
    }

    pub fn update(&mut self, scene: &Scene) {
        self.pivot = match self.space {
            Space::Local => self.local_pivot(scene),
            Space::World => self.world_pivot(scene),
        }
        .unwrap_or_default();
    }

    pub fn pivot_source(&self, scene: &Scene) -> Option<NodeId> {
        self.selected.iter().rev().copied().find(|&id| {
            scene.contains(id)
                && !self
                    .selected
                    .iter()
                    .any(|&other| other != id && scene.is_ancestor(id, other))
        })
    }

    fn local_pivot(&self, scene: &Scene) -> Option<Pivot> {
        let source = self.pivot_source(scene)?;
        let world = scene.world_trs(source).ok()?;
        let bounds = scene.node(source)?.bounds.map(|bounds| {
            let mut scaled = Aabb::empty();
            for corner in bounds.corners() {
                scaled.expand_by_point(corner.mul_element_wise(world.scale));
            }
            scaled
        });
        Some(Pivot {
            position: world.position,
            quaternion: world.quaternion,
            bounds,
        })
    }

    fn world_pivot(&self, scene: &Scene) -> Option<Pivot> {
        let positions: Vec<Vector3> = self
            .selected
            .iter()
            .filter_map(|&id| scene.world_trs(id).ok())
            .map(|trs| trs.position)
            .collect();
        if positions.is_empty() {
            return None;
        }
        let sum = positions
            .iter()
            .fold(Vector3::new(0.0, 0.0, 0.0), |acc, p| acc + *p);
        let mean = sum / positions.len() as f64;

        let bounds = self
            .selected
            .iter()
            .filter_map(|&id| scene.world_bounds(id))
            .map(|bounds| bounds.translated(-mean))
            .reduce(|a, b| a.union(&b));
        Some(Pivot {
            position: mean,
            quaternion: Quaternion::one(),
            bounds,
        })
    }
}
