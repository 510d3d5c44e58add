// Pieces shared by the physics scenes

use super::Stage;
use crate::engine::panel::{PanelError, ParameterPanel};
use crate::engine::physics::body::presets;
use crate::engine::registry::BindingId;
use crate::engine::renderer::{Geometry, Layer, Light, LightKind, NodeId, SceneNode};
use crate::engine::simulation::SceneCommand;
use anyhow::Result;
use glam::Vec3;

pub const FLOOR_COLOR: [f32; 3] = [0.5, 0.5, 0.5];

/// Where the "drop" button puts a body back
pub const DROP_POSITION: Vec3 = Vec3::new(0.0, 20.0, 0.0);

/// Static floor body with a plane of the given size drawn on it
pub fn spawn_floor(stage: &mut Stage, size: f32) -> Result<BindingId> {
    let node = SceneNode::new(
        "floor",
        Geometry::Plane {
            width: size,
            height: size,
        },
    )
    .with_color(FLOOR_COLOR)
    .receiving_shadow();

    Ok(stage.sim.spawn(&mut stage.ctx, &presets::floor(), node)?)
}

/// Sky/ground fill plus one shadow-casting sun
pub fn add_outdoor_lights(stage: &mut Stage) {
    let lights = &mut stage.ctx.lights;
    lights.add(Light::new(
        "hemisphere",
        LightKind::Hemisphere {
            ground_color: [0.53, 0.53, 0.53],
        },
        0.3,
    ));
    lights.add(
        Light::new("sun", LightKind::Directional, 1.0)
            .at(5.0, 5.0, -5.0)
            .casting_shadow(),
    );
}

/// Axes and grid on the helper layer
pub fn add_helpers(stage: &mut Stage, axes: f32, grid: f32) -> (NodeId, NodeId) {
    let graph = &mut stage.ctx.graph;
    let axes = graph.add(SceneNode::new("axes", Geometry::Axes { size: axes }).on_layer(Layer::Helpers));
    let grid = graph.add(
        SceneNode::new(
            "grid",
            Geometry::Grid {
                size: grid,
                divisions: 20,
            },
        )
        .on_layer(Layer::Helpers),
    );
    (axes, grid)
}

/// Collision-shape toggle in the "physics" folder
pub fn bind_overlay_toggle(panel: &mut ParameterPanel<Stage>) -> Result<(), PanelError> {
    panel.bind_toggle(
        "physics",
        "collision shapes",
        |s: &Stage| s.sim.overlay_visible(&s.ctx),
        |s: &mut Stage, visible| s.sim.set_overlay_visible(&mut s.ctx, visible),
    )
}

/// "physics" folder: collision-shape toggle and a drop button for `target`
pub fn bind_physics_folder(panel: &mut ParameterPanel<Stage>, target: BindingId) -> Result<(), PanelError> {
    bind_overlay_toggle(panel)?;

    panel.bind_action("physics", "drop", move |s: &mut Stage| {
        s.ctx.commands.push(SceneCommand::Teleport {
            binding: target,
            position: DROP_POSITION,
        })
    })
}
