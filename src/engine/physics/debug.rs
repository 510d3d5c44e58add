use crate::engine::error::ConfigurationError;
use crate::engine::renderer::{Geometry, Layer, NodeId, SceneGraph, SceneNode, WireMesh};
use glam::Vec3;
use std::f32::consts::TAU;

use super::body::ShapeDesc;
use super::world::{BodyHandle, PhysicsWorld};

/// Segments per circle
const SEGMENTS: usize = 16;

/// Half size of the patch drawn for an infinite plane
const PLANE_EXTENT: f32 = 10.0;

/// Grid lines per side of the plane patch
const PLANE_LINES: usize = 10;

const DYNAMIC_COLOR: [f32; 4] = [0.0, 1.0, 0.0, 0.8];
const FIXED_COLOR: [f32; 4] = [0.5, 0.5, 0.5, 0.8];

/// Scene node mirroring a body's collision shape
pub type DebugProxy = NodeId;

/// Builds and toggles collision-shape wireframes
///
/// All proxies live on the debug layer of the scene graph, so revealing or
/// hiding them is a single flag flip on that layer.
#[derive(Debug, Default)]
pub struct DebugOverlay {
    attached: usize,
}

impl DebugOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a wireframe proxy for `body` at its current transform
    pub fn attach(
        &mut self,
        world: &PhysicsWorld,
        graph: &mut SceneGraph,
        body: BodyHandle,
    ) -> Result<DebugProxy, ConfigurationError> {
        let shape = world
            .collider_shape(body)
            .ok_or(ConfigurationError::UnknownBody(body))?;
        let transform = world
            .body_transform(body)
            .ok_or(ConfigurationError::UnknownBody(body))?;

        let color = if world.is_static(body).unwrap_or(false) {
            FIXED_COLOR
        } else {
            DYNAMIC_COLOR
        };

        let mesh = wireframe(shape, color);
        log::debug!("Proxy for {:?}: {} segments", body, mesh.segment_count());

        let proxy = graph.add(
            SceneNode::new("collision shape", Geometry::Wire(mesh))
                .on_layer(Layer::Debug)
                .with_transform(transform),
        );
        self.attached += 1;

        Ok(proxy)
    }

    /// Remove a proxy from the scene
    pub fn detach(&mut self, graph: &mut SceneGraph, proxy: DebugProxy) {
        if graph.remove(proxy).is_some() {
            self.attached = self.attached.saturating_sub(1);
        }
    }

    /// Reveal or hide every proxy at once
    pub fn set_overlay_visible(&self, graph: &mut SceneGraph, visible: bool) {
        graph.set_layer_visible(Layer::Debug, visible);
        log::debug!(
            "Debug overlay {} ({} proxies)",
            if visible { "shown" } else { "hidden" },
            self.attached
        );
    }

    /// Whether proxies are currently revealed
    pub fn is_visible(&self, graph: &SceneGraph) -> bool {
        graph.layer_visible(Layer::Debug)
    }
}

/// Line-list wireframe of a collision shape, in body-local space
pub fn wireframe(shape: ShapeDesc, color: [f32; 4]) -> WireMesh {
    let mut mesh = WireMesh {
        vertices: Vec::new(),
        indices: Vec::new(),
        color,
    };

    match shape {
        ShapeDesc::Ball { radius } => {
            draw_circle(&mut mesh, Vec3::ZERO, radius, Axis::X);
            draw_circle(&mut mesh, Vec3::ZERO, radius, Axis::Y);
            draw_circle(&mut mesh, Vec3::ZERO, radius, Axis::Z);
        }
        ShapeDesc::Cuboid { half_extents } => draw_box(&mut mesh, half_extents),
        ShapeDesc::Cylinder {
            half_height,
            radius,
        } => {
            draw_circle(&mut mesh, Vec3::Y * half_height, radius, Axis::Y);
            draw_circle(&mut mesh, Vec3::NEG_Y * half_height, radius, Axis::Y);
            draw_struts(&mut mesh, half_height, radius);
        }
        ShapeDesc::Capsule {
            half_height,
            radius,
        } => {
            // Equator rings of both caps plus a meridian ring per cap
            for center in [Vec3::Y * half_height, Vec3::NEG_Y * half_height] {
                draw_circle(&mut mesh, center, radius, Axis::Y);
                draw_circle(&mut mesh, center, radius, Axis::X);
                draw_circle(&mut mesh, center, radius, Axis::Z);
            }
            draw_struts(&mut mesh, half_height, radius);
        }
        ShapeDesc::HalfSpace => draw_plane(&mut mesh),
    }

    mesh
}

/// Normal axis of a drawn circle
#[derive(Clone, Copy)]
enum Axis {
    X,
    Y,
    Z,
}

fn push_line(mesh: &mut WireMesh, a: Vec3, b: Vec3) {
    let start = mesh.vertices.len() as u16;
    mesh.vertices.push(a);
    mesh.vertices.push(b);
    mesh.indices.push(start);
    mesh.indices.push(start + 1);
}

fn draw_circle(mesh: &mut WireMesh, center: Vec3, radius: f32, normal: Axis) {
    let start_idx = mesh.vertices.len() as u16;

    for i in 0..SEGMENTS {
        let angle = (i as f32 / SEGMENTS as f32) * TAU;
        let (s, c) = angle.sin_cos();
        let offset = match normal {
            Axis::X => Vec3::new(0.0, c, s),
            Axis::Y => Vec3::new(c, 0.0, s),
            Axis::Z => Vec3::new(c, s, 0.0),
        };
        mesh.vertices.push(center + offset * radius);

        let next = (i + 1) % SEGMENTS;
        mesh.indices.push(start_idx + i as u16);
        mesh.indices.push(start_idx + next as u16);
    }
}

fn draw_box(mesh: &mut WireMesh, half: Vec3) {
    let start_idx = mesh.vertices.len() as u16;

    // Corner bit i set means +half on axis i
    for corner in 0..8u16 {
        let sign = |bit: u16| if corner & bit != 0 { 1.0 } else { -1.0 };
        mesh.vertices
            .push(Vec3::new(sign(1) * half.x, sign(2) * half.y, sign(4) * half.z));
    }

    // Edges join corners differing in exactly one bit
    for corner in 0..8u16 {
        for bit in [1u16, 2, 4] {
            if corner & bit == 0 {
                mesh.indices.push(start_idx + corner);
                mesh.indices.push(start_idx + (corner | bit));
            }
        }
    }
}

fn draw_struts(mesh: &mut WireMesh, half_height: f32, radius: f32) {
    for offset in [Vec3::X, Vec3::NEG_X, Vec3::Z, Vec3::NEG_Z] {
        let side = offset * radius;
        push_line(
            mesh,
            side + Vec3::Y * half_height,
            side + Vec3::NEG_Y * half_height,
        );
    }
}

fn draw_plane(mesh: &mut WireMesh) {
    let step = 2.0 * PLANE_EXTENT / PLANE_LINES as f32;
    for i in 0..=PLANE_LINES {
        let t = -PLANE_EXTENT + i as f32 * step;
        push_line(
            mesh,
            Vec3::new(t, 0.0, -PLANE_EXTENT),
            Vec3::new(t, 0.0, PLANE_EXTENT),
        );
        push_line(
            mesh,
            Vec3::new(-PLANE_EXTENT, 0.0, t),
            Vec3::new(PLANE_EXTENT, 0.0, t),
        );
    }
}
