// Ten small crates scattered above the floor

use super::common::{add_helpers, add_outdoor_lights, bind_overlay_toggle, spawn_floor};
use super::Stage;
use crate::engine::panel::ParameterPanel;
use crate::engine::physics::body::presets;
use crate::engine::physics::ShapeDesc;
use crate::engine::renderer::{Geometry, SceneNode};
use anyhow::Result;
use glam::Vec3;

pub const BOX_COUNT: usize = 10;

/// Low-discrepancy scatter in [-0.5, 0.5) x [0, 2) x [-0.5, 0.5)
fn scatter(i: usize) -> Vec3 {
    let fract = |v: f32| v - v.floor();
    let n = i as f32 + 1.0;
    Vec3::new(
        fract(n * 0.618_034) - 0.5,
        fract(n * 0.754_878) * 2.0,
        fract(n * 0.569_840) - 0.5,
    )
}

/// Distinct hue per box
fn tint(i: usize) -> [f32; 3] {
    let h = i as f32 / BOX_COUNT as f32;
    let channel = |offset: f32| 0.5 + 0.5 * (std::f32::consts::TAU * (h + offset)).cos();
    [channel(0.0), channel(1.0 / 3.0), channel(2.0 / 3.0)]
}

pub fn setup(stage: &mut Stage, panel: &mut ParameterPanel<Stage>) -> Result<()> {
    spawn_floor(stage, 400.0)?;

    for i in 0..BOX_COUNT {
        // Lifted by one half extent so the lowest box starts clear of the floor
        let p = scatter(i) + Vec3::Y * 0.05;
        let desc = presets::small_box(p.x, p.y, p.z);
        let half_extents = match desc.shape {
            ShapeDesc::Cuboid { half_extents } => half_extents,
            _ => Vec3::splat(0.05),
        };
        let node = SceneNode::new(format!("box {}", i), Geometry::Box { half_extents })
            .with_color(tint(i))
            .casting_shadow();
        stage.sim.spawn(&mut stage.ctx, &desc, node)?;
    }

    add_outdoor_lights(stage);
    add_helpers(stage, 100.0, 400.0);
    bind_overlay_toggle(panel)?;

    Ok(())
}
