// Demo scenes
//
// Each scene wires bodies, lights and panel controls onto a fresh
// `Stage`. The window loop only knows about `Scene`.

mod ball_drop;
mod boxes;
mod common;
mod dice_roll;
mod lights;

use crate::engine::panel::{ParamValue, ParameterPanel, PanelError, TunableParameter};
use crate::engine::simulation::{FrameReport, SceneConfig, SceneContext, Simulation};
use anyhow::Result;
use std::collections::BTreeMap;

/// State every panel control and scene hook operates on
pub struct Stage {
    pub ctx: SceneContext,
    pub sim: Simulation,
    /// Scene-level knobs, keyed by name
    pub tunables: BTreeMap<&'static str, TunableParameter<f32>>,
}

impl Stage {
    pub fn new(config: SceneConfig) -> Self {
        let mut ctx = SceneContext::new();
        let sim = Simulation::new(config, &mut ctx);
        Self {
            ctx,
            sim,
            tunables: BTreeMap::new(),
        }
    }

    /// Current value of a knob, zero if it was never declared
    pub fn tunable(&self, name: &str) -> f32 {
        self.tunables.get(name).map_or(0.0, |t| t.get())
    }
}

/// Available scenes, selected by name on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneKind {
    BallDrop,
    DiceRoll,
    Boxes,
    Lights,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] = [
        SceneKind::BallDrop,
        SceneKind::DiceRoll,
        SceneKind::Boxes,
        SceneKind::Lights,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SceneKind::BallDrop => "ball-drop",
            SceneKind::DiceRoll => "dice-roll",
            SceneKind::Boxes => "boxes",
            SceneKind::Lights => "lights",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Build the scene with its own config
    pub fn build(self) -> Result<Scene> {
        self.build_with(SceneConfig::default())
    }

    pub fn build_with(self, config: SceneConfig) -> Result<Scene> {
        let mut stage = Stage::new(config);
        let mut panel = ParameterPanel::new();

        match self {
            SceneKind::BallDrop => ball_drop::setup(&mut stage, &mut panel)?,
            SceneKind::DiceRoll => dice_roll::setup(&mut stage, &mut panel)?,
            SceneKind::Boxes => boxes::setup(&mut stage, &mut panel)?,
            SceneKind::Lights => lights::setup(&mut stage, &mut panel)?,
        }

        log::info!(
            "Scene '{}' ready: {} bindings, {} nodes, {} lights, {} controls",
            self.name(),
            stage.sim.registry().len(),
            stage.ctx.graph.len(),
            stage.ctx.lights.len(),
            panel.len()
        );

        Ok(Scene {
            kind: self,
            stage,
            panel,
        })
    }
}

/// A running scene: its state and the controls bound to it
pub struct Scene {
    kind: SceneKind,
    stage: Stage,
    panel: ParameterPanel<Stage>,
}

impl Scene {
    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    /// Advance one rendered frame
    pub fn frame(&mut self, frame_delta: f64) -> FrameReport {
        self.stage.sim.frame(&mut self.stage.ctx, frame_delta)
    }

    /// Change a control; the new value is live for the next frame
    pub fn set(&mut self, name: &str, value: ParamValue) -> Result<ParamValue, PanelError> {
        self.panel.set(&mut self.stage, name, value)
    }

    pub fn get(&self, name: &str) -> Result<ParamValue, PanelError> {
        self.panel.get(&self.stage, name)
    }

    /// Press a button
    pub fn trigger(&mut self, name: &str) -> Result<(), PanelError> {
        self.panel.trigger(&mut self.stage, name)
    }

    /// Flip a toggle control
    pub fn toggle(&mut self, name: &str) -> Result<bool, PanelError> {
        match self.get(name)? {
            ParamValue::Bool(v) => {
                self.set(name, ParamValue::Bool(!v))?;
                Ok(!v)
            }
            other => Err(PanelError::TypeMismatch {
                name: name.to_string(),
                expected: "bool",
                actual: other.kind(),
            }),
        }
    }

    pub fn has_control(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    pub fn panel(&self) -> &ParameterPanel<Stage> {
        &self.panel
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn stage_mut(&mut self) -> &mut Stage {
        &mut self.stage
    }

    /// Drop every body and ignore loads still in flight
    pub fn teardown(&mut self) {
        self.stage.sim.teardown(&mut self.stage.ctx);
    }
}
