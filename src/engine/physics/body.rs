use crate::core::Transform;
use glam::{EulerRot, Quat, Vec3};
use rapier3d::na::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use rapier3d::prelude::*;

/// Friction used when no contact rule covers a material pair
pub const DEFAULT_FRICTION: Real = 0.3;

/// Restitution used when no contact rule covers a material pair
pub const DEFAULT_RESTITUTION: Real = 0.0;

/// Collision shape of a simulated body
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ShapeDesc {
    /// Sphere centered on the body origin
    Ball { radius: f32 },

    /// Box with the given half extents
    Cuboid { half_extents: Vec3 },

    /// Cylinder along the local Y axis
    Cylinder { half_height: f32, radius: f32 },

    /// Capsule along the local Y axis
    Capsule { half_height: f32, radius: f32 },

    /// Infinite plane through the body origin, solid below local +Y
    HalfSpace,
}

impl ShapeDesc {
    /// Convert to a rapier shape
    pub fn to_shared_shape(self) -> SharedShape {
        match self {
            ShapeDesc::Ball { radius } => SharedShape::ball(radius),
            ShapeDesc::Cuboid { half_extents } => {
                SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
            }
            ShapeDesc::Cylinder {
                half_height,
                radius,
            } => SharedShape::cylinder(half_height, radius),
            ShapeDesc::Capsule {
                half_height,
                radius,
            } => SharedShape::capsule_y(half_height, radius),
            ShapeDesc::HalfSpace => SharedShape::halfspace(Vector::y_axis()),
        }
    }

    /// Read back the description of a rapier shape, if it is one we build
    pub fn from_shape(shape: &dyn Shape) -> Option<Self> {
        match shape.shape_type() {
            ShapeType::Ball => shape
                .as_ball()
                .map(|ball| ShapeDesc::Ball { radius: ball.radius }),
            ShapeType::Cuboid => shape.as_cuboid().map(|cuboid| ShapeDesc::Cuboid {
                half_extents: Vec3::new(
                    cuboid.half_extents.x,
                    cuboid.half_extents.y,
                    cuboid.half_extents.z,
                ),
            }),
            ShapeType::Cylinder => shape.as_cylinder().map(|cylinder| ShapeDesc::Cylinder {
                half_height: cylinder.half_height,
                radius: cylinder.radius,
            }),
            ShapeType::Capsule => shape.as_capsule().map(|capsule| ShapeDesc::Capsule {
                half_height: capsule.half_height(),
                radius: capsule.radius,
            }),
            ShapeType::HalfSpace => Some(ShapeDesc::HalfSpace),
            _ => None,
        }
    }
}

/// Everything needed to create a body in the physics world
///
/// A mass of zero (or anything non-positive) creates a fixed, immovable body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyDesc {
    pub mass: f32,
    pub shape: ShapeDesc,
    pub material: String,
    pub position: Vec3,
    pub rotation: Quat,
}

impl BodyDesc {
    /// Create a description at the origin, at rest
    pub fn new(mass: f32, shape: ShapeDesc, material: impl Into<String>) -> Self {
        Self {
            mass,
            shape,
            material: material.into(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }

    /// Set the initial position
    pub fn position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Set the initial orientation
    pub fn rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Whether this description produces a fixed body
    pub fn is_static(&self) -> bool {
        !(self.mass > 0.0)
    }

    /// Build the rigid body
    pub fn build_body(&self) -> RigidBody {
        let builder = if self.is_static() {
            RigidBodyBuilder::fixed()
        } else {
            RigidBodyBuilder::dynamic()
                // Light air drag, keeps resting bodies from creeping
                .linear_damping(0.01)
                .angular_damping(0.01)
        };

        builder
            .position(to_isometry(self.position, self.rotation))
            .build()
    }

    /// Build the collider, tagged with the interned material id
    pub fn build_collider(&self, material_id: u32) -> Collider {
        let mut builder = ColliderBuilder::new(self.shape.to_shared_shape())
            .friction(DEFAULT_FRICTION)
            .restitution(DEFAULT_RESTITUTION)
            .active_hooks(ActiveHooks::MODIFY_SOLVER_CONTACTS)
            .user_data(material_id as u128);

        if !self.is_static() {
            builder = builder.mass(self.mass);
        }

        builder.build()
    }
}

/// Convert a glam vector into a rapier vector
pub fn to_vector(v: Vec3) -> Vector<Real> {
    vector![v.x, v.y, v.z]
}

/// Convert a rapier vector into a glam vector
pub fn from_vector(v: &Vector<Real>) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

/// Build a rapier isometry from a glam position and rotation
pub fn to_isometry(position: Vec3, rotation: Quat) -> Isometry<Real> {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(
        rotation.w, rotation.x, rotation.y, rotation.z,
    ));
    Isometry3::from_parts(
        Translation3::new(position.x, position.y, position.z),
        rotation,
    )
}

/// Convert a rapier isometry into a renderer transform
pub fn transform_from_isometry(iso: &Isometry<Real>) -> Transform {
    let q = iso.rotation.coords;
    Transform::new(
        Vec3::new(iso.translation.x, iso.translation.y, iso.translation.z),
        Quat::from_xyzw(q.x, q.y, q.z, q.w),
    )
}

/// Body descriptions used by the bundled scenes
pub mod presets {
    use super::*;

    /// Static floor plane at the origin
    pub fn floor() -> BodyDesc {
        BodyDesc::new(0.0, ShapeDesc::HalfSpace, "floor")
    }

    /// Dynamic ball
    pub fn ball(radius: f32, mass: f32, x: f32, y: f32, z: f32) -> BodyDesc {
        BodyDesc::new(mass, ShapeDesc::Ball { radius }, "ball").position(x, y, z)
    }

    /// Die with 1m half extents, tilted so it lands on an edge and tumbles
    pub fn dice(x: f32, y: f32, z: f32) -> BodyDesc {
        BodyDesc::new(
            1.0,
            ShapeDesc::Cuboid {
                half_extents: Vec3::ONE,
            },
            "dice",
        )
        .position(x, y, z)
        .rotation(Quat::from_euler(EulerRot::XYZ, 0.4, 0.0, 0.3))
    }

    /// Small crate used by the instanced box scene
    pub fn small_box(x: f32, y: f32, z: f32) -> BodyDesc {
        BodyDesc::new(
            0.1,
            ShapeDesc::Cuboid {
                half_extents: Vec3::splat(0.05),
            },
            "box",
        )
        .position(x, y, z)
    }
}
