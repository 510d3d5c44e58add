// Lighting playground: a spot light, fill lights and helpers, all on the panel
//
// No physics bodies; every change goes through panel setters straight into
// the light list and the scene graph.

use super::common::{add_helpers, FLOOR_COLOR};
use super::Stage;
use crate::core::Transform;
use crate::engine::panel::{Bounds, ParameterPanel};
use crate::engine::renderer::{
    Geometry, Layer, Light, LightId, LightKind, NodeId, SceneGraph, SceneNode, WireMesh,
};
use anyhow::Result;
use glam::Vec3;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_6, TAU};

const SPOT_POSITION: Vec3 = Vec3::new(-50.0, 80.0, 0.0);
const SPOT_TARGET: Vec3 = Vec3::ZERO;
const HELPER_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

/// Rim points of the helper cone
const CONE_SEGMENTS: usize = 8;

/// Wire cone from the light toward its target, relative to the light
fn spot_cone(angle: f32) -> WireMesh {
    let axis = SPOT_TARGET - SPOT_POSITION;
    let length = axis.length();
    let dir = axis / length;
    let (u, v) = dir.any_orthonormal_pair();
    let radius = length * angle.tan();

    let mut mesh = WireMesh {
        vertices: vec![Vec3::ZERO],
        indices: Vec::new(),
        color: HELPER_COLOR,
    };
    for i in 0..CONE_SEGMENTS {
        let (s, c) = (i as f32 / CONE_SEGMENTS as f32 * TAU).sin_cos();
        mesh.vertices.push(axis + (u * c + v * s) * radius);

        let rim = 1 + i as u16;
        let next = 1 + ((i + 1) % CONE_SEGMENTS) as u16;
        mesh.indices.extend_from_slice(&[0, rim, rim, next]);
    }
    mesh
}

fn set_cone(graph: &mut SceneGraph, helper: NodeId, angle: f32) {
    if let Some(node) = graph.get_mut(helper) {
        node.geometry = Geometry::Wire(spot_cone(angle));
    }
}

fn light_field<T>(stage: &Stage, id: LightId, read: impl Fn(&Light) -> T, fallback: T) -> T {
    stage.ctx.lights.get(id).map_or(fallback, read)
}

fn with_light(stage: &mut Stage, id: LightId, write: impl FnOnce(&mut Light)) {
    if let Some(light) = stage.ctx.lights.get_mut(id) {
        write(light);
    }
}

pub fn setup(stage: &mut Stage, panel: &mut ParameterPanel<Stage>) -> Result<()> {
    let lights = &mut stage.ctx.lights;
    let spot = lights.add(
        Light::new(
            "spot",
            LightKind::Spot {
                angle: FRAC_PI_6,
                penumbra: 0.0,
            },
            1.0,
        )
        .at(SPOT_POSITION.x, SPOT_POSITION.y, SPOT_POSITION.z)
        .casting_shadow(),
    );
    let ambient = lights.add(Light::new("ambient", LightKind::Ambient, 0.3));
    let point = lights.add(
        Light::new("point", LightKind::Point, 1.0)
            .at(SPOT_POSITION.x, SPOT_POSITION.y, SPOT_POSITION.z)
            .casting_shadow()
            .with_visible(false),
    );

    let graph = &mut stage.ctx.graph;
    graph.add(
        SceneNode::new(
            "cylinder",
            Geometry::Cylinder {
                radius: 5.0,
                height: 3.0,
            },
        )
        .with_transform(Transform::from_translation(Vec3::new(0.0, 5.0, 0.0)))
        .with_color([0.25, 0.5, 1.0])
        .casting_shadow(),
    );
    graph.add(
        SceneNode::new(
            "floor",
            Geometry::Plane {
                width: 400.0,
                height: 400.0,
            },
        )
        .with_color(FLOOR_COLOR)
        .receiving_shadow(),
    );
    let spot_helper = graph.add(
        SceneNode::new("spot helper", Geometry::Wire(spot_cone(FRAC_PI_6)))
            .on_layer(Layer::Helpers)
            .with_transform(Transform::from_translation(SPOT_POSITION)),
    );
    let (axes, grid) = add_helpers(stage, 50.0, 400.0);

    // Spot Light
    panel.bind_color(
        "Spot Light",
        "spot color",
        move |s: &Stage| light_field(s, spot, |l| l.color, [1.0; 3]),
        move |s: &mut Stage, c| with_light(s, spot, |l| l.color = c),
    )?;
    panel.bind(
        "Spot Light",
        "angle",
        move |s: &Stage| light_field(s, spot, |l| l.spot_angle().unwrap_or(0.0), 0.0),
        move |s: &mut Stage, angle| {
            with_light(s, spot, |l| l.set_spot_angle(angle));
            set_cone(&mut s.ctx.graph, spot_helper, angle);
        },
        Some(Bounds::new(0.0, FRAC_PI_2)),
    )?;
    panel.bind(
        "Spot Light",
        "penumbra",
        move |s: &Stage| light_field(s, spot, |l| l.spot_penumbra().unwrap_or(0.0), 0.0),
        move |s: &mut Stage, p| with_light(s, spot, |l| l.set_spot_penumbra(p)),
        Some(Bounds::new(0.0, 1.0)),
    )?;
    panel.bind(
        "Spot Light",
        "intensity",
        move |s: &Stage| light_field(s, spot, |l| l.intensity, 0.0),
        move |s: &mut Stage, i| with_light(s, spot, |l| l.intensity = i),
        Some(Bounds::new(0.0, 2.0)),
    )?;
    panel.bind_toggle(
        "Spot Light",
        "spot visible",
        move |s: &Stage| light_field(s, spot, |l| l.visible, false),
        move |s: &mut Stage, v| {
            with_light(s, spot, |l| l.visible = v);
            s.ctx.graph.set_visible(spot_helper, v);
        },
    )?;

    // Helpers
    for (name, node) in [("axes", axes), ("grid", grid), ("spot helper", spot_helper)] {
        panel.bind_toggle(
            "Helpers",
            name,
            move |s: &Stage| s.ctx.graph.get(node).map_or(false, |n| n.visible()),
            move |s: &mut Stage, v| {
                s.ctx.graph.set_visible(node, v);
            },
        )?;
    }

    // AmbientLight
    panel.bind_toggle(
        "AmbientLight",
        "ambient visible",
        move |s: &Stage| light_field(s, ambient, |l| l.visible, false),
        move |s: &mut Stage, v| with_light(s, ambient, |l| l.visible = v),
    )?;
    panel.bind_color(
        "AmbientLight",
        "ambient color",
        move |s: &Stage| light_field(s, ambient, |l| l.color, [1.0; 3]),
        move |s: &mut Stage, c| with_light(s, ambient, |l| l.color = c),
    )?;

    // PointLight
    panel.bind_toggle(
        "PointLight",
        "point visible",
        move |s: &Stage| light_field(s, point, |l| l.visible, false),
        move |s: &mut Stage, v| with_light(s, point, |l| l.visible = v),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::SceneKind;
    use super::*;
    use crate::engine::panel::ParamValue;
    use approx::assert_relative_eq;

    #[test]
    fn test_cone_rim_matches_angle() {
        let mesh = spot_cone(FRAC_PI_6);
        let axis = SPOT_TARGET - SPOT_POSITION;
        let expected = axis.length() * FRAC_PI_6.tan();

        assert_eq!(mesh.vertices.len(), CONE_SEGMENTS + 1);
        assert_eq!(mesh.segment_count(), 2 * CONE_SEGMENTS);
        for rim in &mesh.vertices[1..] {
            assert_relative_eq!((*rim - axis).length(), expected, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_angle_is_clamped_and_live() {
        let mut scene = SceneKind::Lights.build().unwrap();

        let applied = scene.set("angle", ParamValue::Float(3.0)).unwrap();
        assert_eq!(applied, ParamValue::Float(FRAC_PI_2));

        let lights = &scene.stage().ctx.lights;
        let spot = lights.get(lights.find("spot").unwrap()).unwrap();
        assert_relative_eq!(spot.spot_angle().unwrap(), FRAC_PI_2);
    }

    #[test]
    fn test_spot_visibility_hides_helper() {
        let mut scene = SceneKind::Lights.build().unwrap();

        scene.set("spot visible", ParamValue::Bool(false)).unwrap();

        assert_eq!(scene.get("spot helper"), Ok(ParamValue::Bool(false)));
        assert_eq!(scene.stage().ctx.lights.active().count(), 1);
    }

    #[test]
    fn test_point_light_starts_hidden() {
        let mut scene = SceneKind::Lights.build().unwrap();
        assert_eq!(scene.get("point visible"), Ok(ParamValue::Bool(false)));

        scene.toggle("point visible").unwrap();
        assert_eq!(scene.stage().ctx.lights.active().count(), 3);
    }

    #[test]
    fn test_folders() {
        let scene = SceneKind::Lights.build().unwrap();
        assert_eq!(
            scene.panel().folders(),
            vec!["Spot Light", "Helpers", "AmbientLight", "PointLight"]
        );
        assert_eq!(scene.stage().sim.registry().len(), 0);
    }
}
