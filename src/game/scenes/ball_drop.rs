// Two balls dropped onto a bouncy floor, one of them pushed sideways

use super::common::{add_helpers, add_outdoor_lights, bind_physics_folder, spawn_floor};
use super::Stage;
use crate::engine::panel::{Bounds, ParameterPanel, TunableParameter};
use crate::engine::physics::body::presets;
use crate::engine::physics::ContactRule;
use crate::engine::registry::BindingId;
use crate::engine::renderer::{Geometry, SceneNode};
use crate::engine::simulation::SceneCommand;
use anyhow::Result;
use glam::Vec3;

const BALL_RADIUS: f32 = 2.0;
const BALL_MASS: f32 = 5.0;

/// Sideways force on the first ball, newtons
const PUSH: f32 = 20.0;
const PUSH_BOUNDS: Bounds = Bounds::new(0.0, 100.0);

/// Upward force applied for a single step by the "kick" button
const KICK: f32 = 3000.0;

const FLOOR_FRICTION: f32 = 0.1;
const FLOOR_BOUNCE: f32 = 0.7;

pub fn setup(stage: &mut Stage, panel: &mut ParameterPanel<Stage>) -> Result<()> {
    stage
        .sim
        .register_contact_rule(ContactRule::new("floor", "ball", FLOOR_FRICTION, FLOOR_BOUNCE))?;

    spawn_floor(stage, 20.0)?;

    let pushed = spawn_ball(stage, "ball", 10.0, [0.9, 0.4, 0.2])?;
    spawn_ball(stage, "ball 2", 20.0, [0.2, 0.5, 0.9])?;

    stage.tunables.insert(
        "push",
        TunableParameter::bounded("push", PUSH, PUSH_BOUNDS.min, PUSH_BOUNDS.max),
    );
    stage.ctx.commands.push(SceneCommand::SetConstantForce {
        binding: pushed,
        force: Vec3::X * PUSH,
    });

    add_outdoor_lights(stage);
    add_helpers(stage, 100.0, 400.0);

    bind_physics_folder(panel, pushed)?;
    panel.bind(
        "physics",
        "push",
        |s: &Stage| s.tunable("push"),
        move |s: &mut Stage, force| {
            if let Some(push) = s.tunables.get_mut("push") {
                let force = push.set(force);
                s.ctx.commands.push(SceneCommand::SetConstantForce {
                    binding: pushed,
                    force: Vec3::X * force,
                });
            }
        },
        Some(PUSH_BOUNDS),
    )?;
    panel.bind_action("physics", "kick", move |s: &mut Stage| {
        s.ctx.commands.push(SceneCommand::ApplyForce {
            binding: pushed,
            force: Vec3::Y * KICK,
        })
    })?;
    panel.bind(
        "physics",
        "bounce",
        |s: &Stage| {
            s.sim
                .contact_rule("floor", "ball")
                .map_or(FLOOR_BOUNCE, |rule| rule.restitution)
        },
        |s: &mut Stage, bounce| {
            let friction = s
                .sim
                .contact_rule("floor", "ball")
                .map_or(FLOOR_FRICTION, |rule| rule.friction);
            s.sim
                .set_contact_rule(ContactRule::new("floor", "ball", friction, bounce));
        },
        Some(Bounds::new(0.0, 1.0)),
    )?;
    panel.bind(
        "physics",
        "gravity",
        |s: &Stage| -s.sim.gravity().y,
        |s: &mut Stage, g| s.sim.set_gravity(Vec3::new(0.0, -g, 0.0)),
        Some(Bounds::new(0.0, 30.0)),
    )?;

    Ok(())
}

fn spawn_ball(stage: &mut Stage, name: &str, x: f32, color: [f32; 3]) -> Result<BindingId> {
    let node = SceneNode::new(
        name,
        Geometry::Sphere {
            radius: BALL_RADIUS,
        },
    )
    .with_color(color)
    .casting_shadow();

    let desc = presets::ball(BALL_RADIUS, BALL_MASS, x, 20.0, 0.0);
    Ok(stage.sim.spawn(&mut stage.ctx, &desc, node)?)
}

#[cfg(test)]
mod tests {
    use super::super::{Scene, SceneKind};
    use super::BindingId;
    use crate::engine::panel::ParamValue;
    use approx::assert_relative_eq;

    fn ball_position(scene: &Scene, id: BindingId) -> glam::Vec3 {
        let stage = scene.stage();
        let body = stage.sim.body_of(id).unwrap();
        stage.sim.world().body_transform(body).unwrap().translation
    }

    #[test]
    fn test_layout() {
        let scene = SceneKind::BallDrop.build().unwrap();
        let stage = scene.stage();

        assert_eq!(stage.sim.registry().len(), 3);
        let rule = stage.sim.contact_rule("ball", "floor").unwrap();
        assert_relative_eq!(rule.friction, 0.1);
        assert_relative_eq!(rule.restitution, 0.7);
        assert!(!stage.sim.overlay_visible(&stage.ctx));
    }

    #[test]
    fn test_balls_land_and_first_is_pushed() {
        let mut scene = SceneKind::BallDrop.build().unwrap();
        let ids = scene.stage().sim.registry().ids();
        let (pushed, still) = (ids[1], ids[2]);

        for _ in 0..240 {
            scene.frame(1.0 / 60.0);
        }

        let a = ball_position(&scene, pushed);
        let b = ball_position(&scene, still);
        assert!(a.y > 1.0 && a.y < 20.0, "ball under the floor or never fell: {:?}", a);
        assert!(b.y > 1.0 && b.y < 20.0);
        assert!(a.x > 10.0);
        // The pushed ball rolls into the other one and shoves it along
        assert!(b.x > 20.0, "second ball was never hit: {:?}", b);
        assert!(a.x < b.x);
    }

    #[test]
    fn test_second_ball_rests_before_contact() {
        let mut scene = SceneKind::BallDrop.build().unwrap();
        let still = scene.stage().sim.registry().ids()[2];

        for _ in 0..60 {
            scene.frame(1.0 / 60.0);
        }

        assert_relative_eq!(ball_position(&scene, still).x, 20.0, epsilon = 0.1);
    }

    #[test]
    fn test_kick_launches_ball_for_one_step() {
        let mut scene = SceneKind::BallDrop.build().unwrap();
        let pushed = scene.stage().sim.registry().ids()[1];
        scene.frame(1.0 / 60.0);

        scene.trigger("kick").unwrap();
        scene.frame(1.0 / 60.0);

        let stage = scene.stage();
        let body = stage.sim.body_of(pushed).unwrap();
        let vy = stage.sim.world().linvel(body).unwrap().y;
        assert!(vy > 5.0, "kick too weak: {}", vy);
    }

    #[test]
    fn test_bounce_and_gravity_are_live() {
        let mut scene = SceneKind::BallDrop.build().unwrap();

        assert_eq!(scene.set("bounce", ParamValue::Float(1.5)), Ok(ParamValue::Float(1.0)));
        let rule = scene.stage().sim.contact_rule("floor", "ball").unwrap();
        assert_relative_eq!(rule.restitution, 1.0);
        assert_relative_eq!(rule.friction, 0.1);

        scene.set("gravity", ParamValue::Float(1.62)).unwrap();
        assert_relative_eq!(scene.stage().sim.gravity().y, -1.62);
        assert_eq!(scene.get("gravity"), Ok(ParamValue::Float(1.62)));
    }

    #[test]
    fn test_drop_button_resets_height() {
        let mut scene = SceneKind::BallDrop.build().unwrap();
        let pushed = scene.stage().sim.registry().ids()[1];
        for _ in 0..120 {
            scene.frame(1.0 / 60.0);
        }

        scene.trigger("drop").unwrap();
        scene.frame(0.0);

        let p = ball_position(&scene, pushed);
        assert_relative_eq!(p.y, 20.0);
        assert_relative_eq!(p.x, 0.0);
    }

    #[test]
    fn test_overlay_toggle_and_push_clamp() {
        let mut scene = SceneKind::BallDrop.build().unwrap();

        assert_eq!(scene.toggle("collision shapes"), Ok(true));
        assert!(scene.stage().sim.overlay_visible(&scene.stage().ctx));

        let applied = scene.set("push", ParamValue::Float(500.0)).unwrap();
        assert_eq!(applied, ParamValue::Float(100.0));
        assert_relative_eq!(scene.stage().tunable("push"), 100.0);
    }
}
