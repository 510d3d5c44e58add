// A die loaded from disk in the background and dropped once it arrives

use super::common::{
    add_helpers, add_outdoor_lights, bind_overlay_toggle, spawn_floor, DROP_POSITION,
};
use super::Stage;
use crate::engine::assets::SpawnSpec;
use crate::engine::panel::ParameterPanel;
use crate::engine::physics::body::presets;
use crate::engine::physics::ContactRule;
use crate::engine::registry::BindingId;
use crate::engine::simulation::SceneCommand;
use anyhow::Result;

pub const DICE_MODEL: &str = "dice.glb";

pub fn setup(stage: &mut Stage, panel: &mut ParameterPanel<Stage>) -> Result<()> {
    stage
        .sim
        .register_contact_rule(ContactRule::new("floor", "dice", 0.1, 0.7))?;

    spawn_floor(stage, 20.0)?;
    add_outdoor_lights(stage);
    add_helpers(stage, 100.0, 400.0);

    // Body and node appear at the fixed point of whichever frame sees the load
    let spec = SpawnSpec::new("dice", DICE_MODEL, presets::dice(0.0, 30.0, 0.0));
    stage.sim.request_asset(&stage.ctx, spec)?;

    bind_overlay_toggle(panel)?;

    // The die does not exist yet when the panel is built, so look it up on press
    panel.bind_action("physics", "drop", |s: &mut Stage| match dynamic_binding(s) {
        Some(binding) => s.ctx.commands.push(SceneCommand::Teleport {
            binding,
            position: DROP_POSITION,
        }),
        None => log::info!("Nothing to drop yet, the die is still loading"),
    })?;

    Ok(())
}

/// First binding whose body moves
fn dynamic_binding(stage: &Stage) -> Option<BindingId> {
    let registry = stage.sim.registry();
    let world = stage.sim.world();
    registry.ids().into_iter().find(|id| {
        registry
            .get(*id)
            .and_then(|binding| world.is_static(binding.body))
            == Some(false)
    })
}
