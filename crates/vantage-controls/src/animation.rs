use std::cell::RefCell;
use std::rc::Rc;

use vantage_base::Guid;

pub type SharedScheduler = Rc<RefCell<AnimationScheduler>>;

const DEFAULT_FRAME_MS: f64 = 1000.0 / 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnimationKey {
    pub owner: Guid,
    pub channel: &'static str,
}

impl AnimationKey {
    pub const fn new(owner: Guid, channel: &'static str) -> Self {
        Self { owner, channel }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameTime {
    pub now_ms: f64,
    pub delta_ms: f64,
}

impl FrameTime {
    pub fn from_delta(delta_ms: f64) -> Self {
        Self {
            now_ms: delta_ms,
            delta_ms,
        }
    }

    pub fn delta_seconds(&self) -> f64 {
        self.delta_ms / 1000.0
    }
}

#[derive(Debug, Default)]
pub struct AnimationScheduler {
    scheduled: Vec<AnimationKey>,
    last_frame_ms: Option<f64>,
}

impl AnimationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedScheduler {
        Rc::new(RefCell::new(Self::new()))
    }

    pub fn schedule(&mut self, key: AnimationKey) {
        if !self.scheduled.contains(&key) {
            self.scheduled.push(key);
        }
    }

    pub fn cancel(&mut self, key: AnimationKey) {
        self.scheduled.retain(|scheduled| *scheduled != key);
    }

    pub fn cancel_owner(&mut self, owner: Guid) {
        self.scheduled.retain(|scheduled| scheduled.owner != owner);
    }

    pub fn is_scheduled(&self, key: AnimationKey) -> bool {
        self.scheduled.contains(&key)
    }

    pub fn has_owner(&self, owner: Guid) -> bool {
        self.scheduled.iter().any(|key| key.owner == owner)
    }

    pub fn scheduled_count(&self) -> usize {
        self.scheduled.len()
    }

    pub fn is_idle(&self) -> bool {
        self.scheduled.is_empty()
    }

    /// Starts a display frame at `now_ms`. The first frame, and any frame
    /// after the queue ran dry, reports a nominal 60 fps delta.
    pub fn advance(&mut self, now_ms: f64) -> FrameTime {
        let delta_ms = match self.last_frame_ms {
            Some(last) if now_ms >= last => now_ms - last,
            _ => DEFAULT_FRAME_MS,
        };
        self.last_frame_ms = if self.scheduled.is_empty() {
            None
        } else {
            Some(now_ms)
        };
        FrameTime { now_ms, delta_ms }
    }
}
