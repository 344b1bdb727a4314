use std::collections::BTreeMap;

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use vantage_controls::{
    AnimationScheduler, CameraControls, ControlsConfig, ControlsEvent, KeyEvent, SharedScheduler,
    Stage, TrackedControls, TransformControls, WheelEvent,
};
use vantage_geometry::Vector3;
use vantage_scene::{Camera, NodeId, Scene};

use crate::script::{ControlsKind, Script, Step};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: [f64; 3],
    pub target: Option<[f64; 3]>,
    pub zoom: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ObjectState {
    pub position: [f64; 3],
    /// `[x, y, z, w]`.
    pub quaternion: [f64; 4],
    pub scale: [f64; 3],
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub camera: CameraState,
    pub object: Option<ObjectState>,
    pub events: BTreeMap<String, usize>,
    pub frames: u32,
}

enum Driver {
    Camera(CameraControls),
    Transform(TransformControls),
}

impl Driver {
    fn controls(&mut self) -> &mut dyn TrackedControls {
        match self {
            Self::Camera(controls) => controls,
            Self::Transform(controls) => controls,
        }
    }

    fn take_events(&mut self) -> Vec<ControlsEvent> {
        match self {
            Self::Camera(controls) => controls.take_events(),
            Self::Transform(controls) => controls.take_events(),
        }
    }
}

struct Session {
    camera: Camera,
    scene: Scene,
    object: Option<NodeId>,
    scheduler: SharedScheduler,
    driver: Driver,
    now_ms: f64,
    frames: u32,
    events: BTreeMap<String, usize>,
}

impl Session {
    fn new(script: &Script, config: &ControlsConfig) -> Result<Self> {
        if script.viewport.is_empty() {
            bail!("script viewport has no area");
        }
        let mut camera = script.camera.build(script.viewport.aspect());
        let mut scene = Scene::new();
        let object = script.object.as_ref().map(|setup| scene.add(setup.to_node()));
        let scheduler = AnimationScheduler::shared();

        let driver = match script.controls {
            ControlsKind::Camera => {
                let mut controls = CameraControls::new(&camera, scheduler.clone(), config);
                controls.set_target(script.camera.target(), &mut camera);
                Driver::Camera(controls)
            }
            ControlsKind::Transform => {
                let Some(object) = object else {
                    bail!("transform script needs an object");
                };
                let mut controls = TransformControls::new(scheduler.clone(), config);
                controls.attach(object);
                controls.set_mode(script.transform.mode);
                controls.set_space(script.transform.space);
                controls.set_axis(script.transform.axis);
                Driver::Transform(controls)
            }
        };

        let mut session = Self {
            camera,
            scene,
            object,
            scheduler,
            driver,
            now_ms: 0.0,
            frames: 0,
            events: BTreeMap::new(),
        };
        // Setup noise is not part of the replay.
        session.driver.take_events();
        Ok(session)
    }

    fn step(&mut self, step: &Step, script: &Script) {
        let mut stage = Stage::new(&mut self.camera, &mut self.scene);
        match step {
            Step::Pointer { .. } => {
                if let Some(event) = step.pointer_event(script.viewport) {
                    self.driver.controls().pointer_event(&event, &mut stage);
                }
            }
            Step::KeyDown { code, repeat } => {
                let event = KeyEvent {
                    code: code.clone(),
                    repeat: *repeat,
                };
                self.driver.controls().key_down(&event, &mut stage);
            }
            Step::KeyUp { code } => {
                self.driver.controls().key_up(&KeyEvent::new(code.clone()), &mut stage);
            }
            Step::Wheel { delta_y, x, y } => match &mut self.driver {
                Driver::Camera(controls) => {
                    let event = WheelEvent {
                        delta_y: *delta_y,
                        client_x: script.viewport.left + x,
                        client_y: script.viewport.top + y,
                        rect: script.viewport,
                    };
                    controls.wheel(&event, stage.camera);
                }
                Driver::Transform(_) => warn!("wheel step ignored by transform controls"),
            },
            Step::Frame { delta_ms, count } => {
                for _ in 0..*count {
                    self.now_ms += delta_ms.max(0.0);
                    let frame = self.scheduler.borrow_mut().advance(self.now_ms);
                    match &mut self.driver {
                        Driver::Camera(controls) => controls.animate(frame, &mut stage),
                        Driver::Transform(controls) => controls.animate(frame, &mut stage),
                    }
                    self.frames += 1;
                }
            }
        }
        for event in self.driver.take_events() {
            *self.events.entry(event.name().to_string()).or_default() += 1;
        }
    }

    fn report(&self) -> Report {
        let target = match &self.driver {
            Driver::Camera(controls) => Some(array(controls.target())),
            Driver::Transform(_) => None,
        };
        let object = self
            .object
            .and_then(|id| self.scene.node(id))
            .map(|node| ObjectState {
                position: array(node.position),
                quaternion: [
                    node.quaternion.v.x,
                    node.quaternion.v.y,
                    node.quaternion.v.z,
                    node.quaternion.s,
                ],
                scale: array(node.scale),
            });
        Report {
            camera: CameraState {
                position: array(self.camera.position),
                target,
                zoom: self.camera.zoom,
            },
            object,
            events: self.events.clone(),
            frames: self.frames,
        }
    }
}

pub fn replay(script: &Script, config: &ControlsConfig) -> Result<Report> {
    let mut session = Session::new(script, config)?;
    for (index, step) in script.steps.iter().enumerate() {
        debug!(index, ?step, "replay step");
        session.step(step, script);
    }
    let idle = session.scheduler.borrow().is_idle();
    if !idle {
        warn!("script ended while animations were still scheduled");
    }
    info!(steps = script.steps.len(), frames = session.frames, "replay complete");
    Ok(session.report())
}

fn array(v: Vector3) -> [f64; 3] {
    [v.x, v.y, v.z]
}
