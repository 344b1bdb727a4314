use tracing::{debug, warn};
use vantage_base::Guid;
use vantage_geometry::InnerSpace;
use vantage_scene::{Camera, Scene};

use crate::animation::{AnimationKey, FrameTime, SharedScheduler};
use crate::config::GestureConfig;
use crate::input::{KeyEvent, PointerEvent, PointerEventKind};
use crate::pointer::{CenterPointerTracker, PointerTracker, PointerType};

const INERTIA: &str = "inertia";

#[derive(Clone, Debug)]
pub enum Tracked {
    PointerDown {
        pointer: PointerTracker,
        pointers: Vec<PointerTracker>,
    },
    PointerMove {
        pointer: PointerTracker,
        pointers: Vec<PointerTracker>,
        center: CenterPointerTracker,
    },
    PointerHover {
        pointer: PointerTracker,
        pointers: Vec<PointerTracker>,
    },
    PointerUp {
        pointer: PointerTracker,
        pointers: Vec<PointerTracker>,
    },
    KeyDown {
        code: String,
        keys: Vec<String>,
    },
    KeyUp {
        code: String,
        keys: Vec<String>,
    },
    KeyChange {
        code: String,
        keys: Vec<String>,
    },
}

#[derive(Debug)]
pub struct GestureCore {
    owner: Guid,
    config: GestureConfig,
    scheduler: SharedScheduler,
    enabled: bool,
    pointers: Vec<PointerTracker>,
    center: CenterPointerTracker,
    hover: Option<PointerTracker>,
    simulated: Option<PointerTracker>,
    captured: Vec<i32>,
    keys: Vec<String>,
}

impl GestureCore {
    pub fn new(scheduler: SharedScheduler, config: GestureConfig) -> Self {
        Self {
            owner: Guid::new(),
            config,
            scheduler,
            enabled: true,
            pointers: Vec::new(),
            center: CenterPointerTracker::default(),
            hover: None,
            simulated: None,
            captured: Vec::new(),
            keys: Vec::new(),
        }
    }

    pub fn owner(&self) -> Guid {
        self.owner
    }

    pub fn scheduler(&self) -> &SharedScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn pointers(&self) -> &[PointerTracker] {
        &self.pointers
    }

    pub fn center(&self) -> &CenterPointerTracker {
        &self.center
    }

    pub fn hover(&self) -> Option<&PointerTracker> {
        self.hover.as_ref()
    }

    pub fn simulated(&self) -> Option<&PointerTracker> {
        self.simulated.as_ref()
    }

    pub fn captured(&self) -> &[i32] {
        &self.captured
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_animating(&self) -> bool {
        self.simulated.is_some()
    }

    fn inertia_key(&self) -> AnimationKey {
        AnimationKey::new(self.owner, INERTIA)
    }

    fn release(&mut self, pointer_id: i32) {
        self.captured.retain(|&id| id != pointer_id);
    }

    fn cancel_simulated(&mut self, tracked: &mut Vec<Tracked>) {
        if let Some(mut simulated) = self.simulated.take() {
            self.scheduler.borrow_mut().cancel(self.inertia_key());
            simulated.set_pointer_type(PointerType::Up);
            tracked.push(Tracked::PointerUp {
                pointer: simulated,
                pointers: self.pointers.clone(),
            });
        }
    }

    pub fn pointer_down(&mut self, event: &PointerEvent, camera: &Camera) -> Vec<Tracked> {
        let mut tracked = Vec::new();
        if !self.enabled {
            return tracked;
        }
        if self.pointers.iter().any(|p| p.pointer_id() == event.pointer_id) {
            warn!(pointer_id = event.pointer_id, "pointer is already down");
            return tracked;
        }
        self.cancel_simulated(&mut tracked);
        if self
            .hover
            .as_ref()
            .is_some_and(|hover| hover.pointer_id() == event.pointer_id)
        {
            self.hover = None;
        }

        self.captured.push(event.pointer_id);
        let mut pointer = PointerTracker::new(event, camera);
        pointer.clear_movement();
        self.pointers.push(pointer.clone());
        self.center.update_center(&self.pointers);
        debug!(pointer_id = event.pointer_id, count = self.pointers.len(), "pointer down");
        tracked.push(Tracked::PointerDown {
            pointer,
            pointers: self.pointers.clone(),
        });
        tracked
    }

    pub fn pointer_move(&mut self, event: &PointerEvent, camera: &Camera) -> Vec<Tracked> {
        if !self.enabled {
            return Vec::new();
        }
        let Some(index) = self
            .pointers
            .iter()
            .position(|p| p.pointer_id() == event.pointer_id)
        else {
            return self.hover_move(event, camera);
        };

        for (i, pointer) in self.pointers.iter_mut().enumerate() {
            if i == index {
                pointer.update(event, camera);
            } else {
                pointer.clear_movement();
            }
        }
        self.center.update_center(&self.pointers);
        vec![Tracked::PointerMove {
            pointer: self.pointers[index].clone(),
            pointers: self.pointers.clone(),
            center: self.center.clone(),
        }]
    }

    fn hover_move(&mut self, event: &PointerEvent, camera: &Camera) -> Vec<Tracked> {
        let pointer = match self.hover.as_mut() {
            Some(hover) if hover.pointer_id() == event.pointer_id => {
                hover.update(event, camera);
                hover.set_pointer_type(PointerType::Hover);
                hover.clone()
            }
            _ => {
                let mut hover = PointerTracker::new(event, camera);
                hover.set_pointer_type(PointerType::Hover);
                self.hover = Some(hover.clone());
                hover
            }
        };
        vec![Tracked::PointerHover {
            pointer,
            pointers: self.pointers.clone(),
        }]
    }

    pub fn pointer_up(&mut self, event: &PointerEvent, camera: &Camera) -> Vec<Tracked> {
        if !self.enabled {
            return Vec::new();
        }
        let Some(index) = self
            .pointers
            .iter()
            .position(|p| p.pointer_id() == event.pointer_id)
        else {
            return self.hover_leave(event);
        };

        let mut pointer = self.pointers.remove(index);
        self.release(event.pointer_id);
        pointer.set_camera(camera);
        pointer.set_pointer_type(PointerType::Up);
        self.center.update_center(&self.pointers);
        debug!(pointer_id = event.pointer_id, count = self.pointers.len(), "pointer up");

        let coast = self.config.enable_damping
            && self.pointers.is_empty()
            && event.kind != PointerEventKind::Cancel;
        if coast {
            self.simulated = Some(pointer.to_simulated());
            self.scheduler.borrow_mut().schedule(self.inertia_key());
            return Vec::new();
        }
        vec![Tracked::PointerUp {
            pointer,
            pointers: self.pointers.clone(),
        }]
    }

    fn hover_leave(&mut self, event: &PointerEvent) -> Vec<Tracked> {
        let leaves = matches!(
            event.kind,
            PointerEventKind::Leave | PointerEventKind::Out | PointerEventKind::Cancel
        );
        let matches = self
            .hover
            .as_ref()
            .is_some_and(|hover| hover.pointer_id() == event.pointer_id);
        if !(leaves && matches) {
            return Vec::new();
        }
        let Some(mut pointer) = self.hover.take() else {
            return Vec::new();
        };
        pointer.set_pointer_type(PointerType::Up);
        vec![Tracked::PointerUp {
            pointer,
            pointers: self.pointers.clone(),
        }]
    }

    pub fn animate(&mut self, frame: FrameTime) -> Vec<Tracked> {
        let Some(simulated) = self.simulated.as_mut() else {
            return Vec::new();
        };
        simulated.simulate_damping(self.config.damping_factor, frame.delta_ms);
        if simulated.canvas().movement().magnitude() > self.config.inertia_epsilon {
            let pointers = vec![simulated.clone()];
            return vec![Tracked::PointerMove {
                pointer: simulated.clone(),
                center: CenterPointerTracker::new(&pointers),
                pointers,
            }];
        }

        self.scheduler.borrow_mut().cancel(self.inertia_key());
        let Some(mut pointer) = self.simulated.take() else {
            return Vec::new();
        };
        pointer.set_pointer_type(PointerType::Up);
        vec![Tracked::PointerUp {
            pointer,
            pointers: Vec::new(),
        }]
    }

    pub fn key_down(&mut self, event: &KeyEvent) -> Vec<Tracked> {
        if !self.enabled || event.repeat || self.keys.contains(&event.code) {
            return Vec::new();
        }
        self.keys.push(event.code.clone());
        vec![
            Tracked::KeyDown {
                code: event.code.clone(),
                keys: self.keys.clone(),
            },
            Tracked::KeyChange {
                code: event.code.clone(),
                keys: self.keys.clone(),
            },
        ]
    }

    pub fn key_up(&mut self, event: &KeyEvent) -> Vec<Tracked> {
        if !self.enabled || !self.keys.contains(&event.code) {
            return Vec::new();
        }
        self.keys.retain(|code| *code != event.code);
        vec![
            Tracked::KeyUp {
                code: event.code.clone(),
                keys: self.keys.clone(),
            },
            Tracked::KeyChange {
                code: event.code.clone(),
                keys: self.keys.clone(),
            },
        ]
    }

    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        if self.enabled == enabled {
            return false;
        }
        self.enabled = enabled;
        if !enabled {
            self.captured.clear();
            self.pointers.clear();
            self.center.update_center(&[]);
            self.hover = None;
            self.simulated = None;
            self.keys.clear();
            self.scheduler.borrow_mut().cancel_owner(self.owner);
        }
        true
    }
}

impl Drop for GestureCore {
    fn drop(&mut self) {
        if let Ok(mut scheduler) = self.scheduler.try_borrow_mut() {
            scheduler.cancel_owner(self.owner);
        }
    }
}

pub struct Stage<'a> {
    pub camera: &'a mut Camera,
    pub scene: &'a mut Scene,
}

impl<'a> Stage<'a> {
    pub fn new(camera: &'a mut Camera, scene: &'a mut Scene) -> Self {
        Self { camera, scene }
    }
}

pub trait TrackedControls {
    fn gesture(&self) -> &GestureCore;

    fn gesture_mut(&mut self) -> &mut GestureCore;

    fn on_tracked_pointer_down(
        &mut self,
        _pointer: &PointerTracker,
        _pointers: &[PointerTracker],
        _stage: &mut Stage<'_>,
    ) {
    }

    fn on_tracked_pointer_move(
        &mut self,
        _pointer: &PointerTracker,
        _pointers: &[PointerTracker],
        _center: &CenterPointerTracker,
        _stage: &mut Stage<'_>,
    ) {
    }

    fn on_tracked_pointer_hover(
        &mut self,
        _pointer: &PointerTracker,
        _pointers: &[PointerTracker],
        _stage: &mut Stage<'_>,
    ) {
    }

    fn on_tracked_pointer_up(
        &mut self,
        _pointer: &PointerTracker,
        _pointers: &[PointerTracker],
        _stage: &mut Stage<'_>,
    ) {
    }

    fn on_tracked_key_down(&mut self, _code: &str, _keys: &[String]) {}

    fn on_tracked_key_up(&mut self, _code: &str, _keys: &[String]) {}

    fn on_tracked_key_change(&mut self, _code: &str, _keys: &[String]) {}

    fn dispatch(&mut self, tracked: Vec<Tracked>, stage: &mut Stage<'_>) {
        for callback in tracked {
            match callback {
                Tracked::PointerDown { pointer, pointers } => {
                    self.on_tracked_pointer_down(&pointer, &pointers, stage)
                }
                Tracked::PointerMove {
                    pointer,
                    pointers,
                    center,
                } => self.on_tracked_pointer_move(&pointer, &pointers, &center, stage),
                Tracked::PointerHover { pointer, pointers } => {
                    self.on_tracked_pointer_hover(&pointer, &pointers, stage)
                }
                Tracked::PointerUp { pointer, pointers } => {
                    self.on_tracked_pointer_up(&pointer, &pointers, stage)
                }
                Tracked::KeyDown { code, keys } => self.on_tracked_key_down(&code, &keys),
                Tracked::KeyUp { code, keys } => self.on_tracked_key_up(&code, &keys),
                Tracked::KeyChange { code, keys } => self.on_tracked_key_change(&code, &keys),
            }
        }
    }

    fn pointer_down(&mut self, event: &PointerEvent, stage: &mut Stage<'_>) {
        let tracked = self.gesture_mut().pointer_down(event, stage.camera);
        self.dispatch(tracked, stage);
    }

    fn pointer_move(&mut self, event: &PointerEvent, stage: &mut Stage<'_>) {
        let tracked = self.gesture_mut().pointer_move(event, stage.camera);
        self.dispatch(tracked, stage);
    }

    fn pointer_up(&mut self, event: &PointerEvent, stage: &mut Stage<'_>) {
        let tracked = self.gesture_mut().pointer_up(event, stage.camera);
        self.dispatch(tracked, stage);
    }

    fn pointer_event(&mut self, event: &PointerEvent, stage: &mut Stage<'_>) {
        match event.kind {
            PointerEventKind::Down => self.pointer_down(event, stage),
            PointerEventKind::Move | PointerEventKind::Over | PointerEventKind::Enter => {
                self.pointer_move(event, stage)
            }
            PointerEventKind::Up
            | PointerEventKind::Cancel
            | PointerEventKind::Leave
            | PointerEventKind::Out => self.pointer_up(event, stage),
        }
    }

    fn key_down(&mut self, event: &KeyEvent, stage: &mut Stage<'_>) {
        let tracked = self.gesture_mut().key_down(event);
        self.dispatch(tracked, stage);
    }

    fn key_up(&mut self, event: &KeyEvent, stage: &mut Stage<'_>) {
        let tracked = self.gesture_mut().key_up(event);
        self.dispatch(tracked, stage);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::AnimationScheduler;
    use crate::input::MouseButton;
    use vantage_geometry::{Rect, Vector2};

    fn setup(enable_damping: bool) -> (GestureCore, Camera, Rect) {
        let config = GestureConfig {
            enable_damping,
            ..GestureConfig::default()
        };
        let core = GestureCore::new(AnimationScheduler::shared(), config);
        (core, Camera::perspective(50.0, 1.0, 0.1, 100.0), Rect::from_size(100.0, 100.0))
    }

    #[test]
    fn first_frame_has_no_movement() {
        let (mut core, camera, rect) = setup(false);
        let tracked = core.pointer_down(&PointerEvent::down(1, MouseButton::Primary, 10.0, 10.0, rect), &camera);
        assert_eq!(tracked.len(), 1);
        assert_eq!(core.captured(), &[1]);
        assert_eq!(core.pointers()[0].canvas().movement(), Vector2::new(0.0, 0.0));
    }

    #[test]
    fn moves_without_press_hover() {
        let (mut core, camera, rect) = setup(false);
        let tracked = core.pointer_move(&PointerEvent::moved(4, 0, 10.0, 10.0, rect), &camera);
        assert!(matches!(tracked.as_slice(), [Tracked::PointerHover { .. }]));
        core.pointer_move(&PointerEvent::moved(5, 0, 20.0, 10.0, rect), &camera);
        assert_eq!(core.hover().map(PointerTracker::pointer_id), Some(5));

        let leave = PointerEvent::new(5, PointerEventKind::Leave, 20.0, 10.0, rect);
        let tracked = core.pointer_up(&leave, &camera);
        assert!(matches!(tracked.as_slice(), [Tracked::PointerUp { .. }]));
        assert!(core.hover().is_none());
    }

    #[test]
    fn release_coasts_only_for_last_pointer() {
        let (mut core, camera, rect) = setup(true);
        core.pointer_down(&PointerEvent::down(1, MouseButton::Primary, 10.0, 10.0, rect), &camera);
        core.pointer_down(&PointerEvent::down(2, MouseButton::Primary, 50.0, 50.0, rect), &camera);
        let tracked = core.pointer_up(&PointerEvent::up(2, 50.0, 50.0, rect), &camera);
        assert!(matches!(tracked.as_slice(), [Tracked::PointerUp { .. }]));

        core.pointer_move(&PointerEvent::moved(1, 1, 20.0, 10.0, rect), &camera);
        let tracked = core.pointer_up(&PointerEvent::up(1, 20.0, 10.0, rect), &camera);
        assert!(tracked.is_empty());
        assert!(core.simulated().is_some());
        assert_eq!(core.scheduler().borrow().scheduled_count(), 1);
    }

    #[test]
    fn new_press_cancels_inertia_with_up() {
        let (mut core, camera, rect) = setup(true);
        core.pointer_down(&PointerEvent::down(1, MouseButton::Primary, 10.0, 10.0, rect), &camera);
        core.pointer_move(&PointerEvent::moved(1, 1, 20.0, 10.0, rect), &camera);
        core.pointer_up(&PointerEvent::up(1, 20.0, 10.0, rect), &camera);

        let tracked = core.pointer_down(&PointerEvent::down(3, MouseButton::Primary, 40.0, 40.0, rect), &camera);
        assert!(matches!(
            tracked.as_slice(),
            [Tracked::PointerUp { .. }, Tracked::PointerDown { .. }]
        ));
        assert!(core.scheduler().borrow().is_idle());
    }

    #[test]
    fn inertia_decays_to_rest() {
        let (mut core, camera, rect) = setup(true);
        core.pointer_down(&PointerEvent::down(1, MouseButton::Primary, 10.0, 10.0, rect), &camera);
        core.pointer_move(&PointerEvent::moved(1, 1, 20.0, 10.0, rect), &camera);
        core.pointer_up(&PointerEvent::up(1, 20.0, 10.0, rect), &camera);

        let mut moves = 0;
        loop {
            let tracked = core.animate(FrameTime::from_delta(16.0));
            match tracked.as_slice() {
                [Tracked::PointerMove { .. }] => moves += 1,
                [Tracked::PointerUp { .. }] => break,
                other => panic!("unexpected callbacks {other:?}"),
            }
            assert!(moves < 1000);
        }
        assert!(moves > 10);
        assert!(core.simulated().is_none());
        assert!(core.scheduler().borrow().is_idle());
    }

    #[test]
    fn key_repeat_and_duplicates_are_ignored() {
        let (mut core, _, _) = setup(false);
        assert_eq!(core.key_down(&KeyEvent::new("KeyA")).len(), 2);
        let repeat = KeyEvent {
            repeat: true,
            ..KeyEvent::new("KeyA")
        };
        assert!(core.key_down(&repeat).is_empty());
        assert!(core.key_down(&KeyEvent::new("KeyA")).is_empty());
        assert_eq!(core.keys(), &["KeyA".to_string()]);
        assert_eq!(core.key_up(&KeyEvent::new("KeyA")).len(), 2);
        assert!(core.keys().is_empty());
    }
}
