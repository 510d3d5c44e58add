use crate::core::Transform;
use crate::engine::error::ConfigurationError;
use crate::engine::game_loop::Steppable;
use glam::Vec3;
use rapier3d::prelude::*;
use std::collections::HashMap;

use super::body::{from_vector, to_vector, transform_from_isometry, BodyDesc, ShapeDesc};
use super::contact::{ContactRule, ContactRules};

/// Handle to identify simulated bodies
pub type BodyHandle = rapier3d::prelude::RigidBodyHandle;

/// Standard gravity used by every scene (m/s²)
pub const GRAVITY: Vec3 = Vec3::new(0.0, -9.82, 0.0);

/// Physics world that owns every simulated body
pub struct PhysicsWorld {
    /// Gravity vector
    gravity: Vector<Real>,

    /// Integration parameters for the physics simulation
    integration_parameters: IntegrationParameters,

    /// Physics pipeline handles collision detection and solving
    physics_pipeline: PhysicsPipeline,

    /// Island manager for sleeping bodies
    island_manager: IslandManager,

    /// Broad phase collision detection
    broad_phase: DefaultBroadPhase,

    /// Narrow phase collision detection
    narrow_phase: NarrowPhase,

    /// Impulse joint set
    impulse_joint_set: ImpulseJointSet,

    /// Multibody joint set
    multibody_joint_set: MultibodyJointSet,

    /// CCD solver for fast-moving objects
    ccd_solver: CCDSolver,

    /// Query pipeline for raycasts and shape casts
    query_pipeline: QueryPipeline,

    /// Rigid body set
    rigid_body_set: RigidBodySet,

    /// Collider set
    collider_set: ColliderSet,

    /// Material table and pairwise contact rules, doubles as physics hooks
    contact_rules: ContactRules,

    /// Collider attached to each body created through `create_body`
    colliders: HashMap<BodyHandle, ColliderHandle>,

    /// Forces re-applied before every step until cleared
    constant_forces: HashMap<BodyHandle, Vector<Real>>,

}

impl PhysicsWorld {
    /// Create a new physics world with standard gravity
    pub fn new() -> Self {
        Self::with_gravity(GRAVITY)
    }

    /// Create a new physics world with custom gravity
    pub fn with_gravity(gravity: Vec3) -> Self {
        let mut integration_parameters = IntegrationParameters::default();
        integration_parameters.dt = 1.0 / 60.0;

        Self {
            gravity: to_vector(gravity),
            integration_parameters,
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            contact_rules: ContactRules::new(),
            colliders: HashMap::new(),
            constant_forces: HashMap::new(),
        }
    }

    /// Step the physics simulation forward by `dt` seconds
    pub fn step(&mut self, dt: Real) {
        self.integration_parameters.dt = dt;

        for (handle, force) in &self.constant_forces {
            if let Some(body) = self.rigid_body_set.get_mut(*handle) {
                body.add_force(*force, true);
            }
        }

        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            Some(&mut self.query_pipeline),
            &self.contact_rules,
            &(),
        );

        // Forces accumulate for exactly one step
        for (_, body) in self.rigid_body_set.iter_mut() {
            body.reset_forces(false);
        }
    }

    /// Create a body and its collider from a description
    pub fn create_body(&mut self, desc: &BodyDesc) -> BodyHandle {
        let material = self.contact_rules.material(&desc.material);
        let handle = self.rigid_body_set.insert(desc.build_body());
        let collider = self.collider_set.insert_with_parent(
            desc.build_collider(material.as_u32()),
            handle,
            &mut self.rigid_body_set,
        );
        self.colliders.insert(handle, collider);

        log::debug!(
            "Created {} body {:?} (mass {}, material {})",
            if desc.is_static() { "fixed" } else { "dynamic" },
            handle,
            desc.mass,
            desc.material
        );

        handle
    }

    /// Remove a body and its collider
    pub fn remove_body(&mut self, handle: BodyHandle) -> Result<(), ConfigurationError> {
        let removed = self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true, // remove attached colliders
        );
        self.colliders.remove(&handle);
        self.constant_forces.remove(&handle);

        match removed {
            Some(_) => Ok(()),
            None => Err(ConfigurationError::UnknownBody(handle)),
        }
    }

    /// Remove every body, keeping gravity and contact rules
    pub fn clear(&mut self) {
        let handles: Vec<BodyHandle> = self.rigid_body_set.iter().map(|(h, _)| h).collect();
        for handle in handles {
            let _ = self.remove_body(handle);
        }
    }

    /// Whether the body is still alive in this world
    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.rigid_body_set.contains(handle)
    }

    /// Number of live bodies
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }

    /// Committed transform of a body
    pub fn body_transform(&self, handle: BodyHandle) -> Option<Transform> {
        self.rigid_body_set
            .get(handle)
            .map(|body| transform_from_isometry(body.position()))
    }

    /// Linear velocity of a body
    pub fn linvel(&self, handle: BodyHandle) -> Option<Vec3> {
        self.rigid_body_set
            .get(handle)
            .map(|body| from_vector(body.linvel()))
    }

    /// Add a force consumed by the next step
    pub fn apply_force(&mut self, handle: BodyHandle, force: Vec3) -> Result<(), ConfigurationError> {
        let body = self
            .rigid_body_set
            .get_mut(handle)
            .ok_or(ConfigurationError::UnknownBody(handle))?;
        body.add_force(to_vector(force), true);
        Ok(())
    }

    /// Apply `force` before every step until replaced; a zero force clears it
    pub fn set_constant_force(
        &mut self,
        handle: BodyHandle,
        force: Vec3,
    ) -> Result<(), ConfigurationError> {
        if !self.contains(handle) {
            return Err(ConfigurationError::UnknownBody(handle));
        }
        if force == Vec3::ZERO {
            self.constant_forces.remove(&handle);
        } else {
            self.constant_forces.insert(handle, to_vector(force));
        }
        Ok(())
    }

    /// Move a body, resetting its velocity so it starts from rest
    pub fn set_translation(
        &mut self,
        handle: BodyHandle,
        position: Vec3,
    ) -> Result<(), ConfigurationError> {
        let body = self
            .rigid_body_set
            .get_mut(handle)
            .ok_or(ConfigurationError::UnknownBody(handle))?;
        body.set_translation(to_vector(position), true);
        body.set_linvel(Vector::zeros(), true);
        body.set_angvel(Vector::zeros(), true);
        Ok(())
    }

    /// Collision shape of a body's collider
    pub fn collider_shape(&self, handle: BodyHandle) -> Option<ShapeDesc> {
        let collider = self.collider_set.get(*self.colliders.get(&handle)?)?;
        ShapeDesc::from_shape(collider.shape())
    }

    /// Whether the body is fixed
    pub fn is_static(&self, handle: BodyHandle) -> Option<bool> {
        self.rigid_body_set.get(handle).map(|body| body.is_fixed())
    }

    /// Register a pairwise contact rule
    pub fn register_contact_rule(&mut self, rule: ContactRule) -> Result<(), ConfigurationError> {
        self.contact_rules.register(rule)
    }

    /// Insert or replace a rule without treating replacement as an error
    pub fn set_contact_rule(&mut self, rule: ContactRule) {
        self.contact_rules.set(&rule);
    }

    /// Get the contact rule table
    pub fn contact_rules(&self) -> &ContactRules {
        &self.contact_rules
    }

    /// Set gravity for the physics world
    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = to_vector(gravity);
    }

    /// Get current gravity
    pub fn gravity(&self) -> Vec3 {
        from_vector(&self.gravity)
    }
}

impl Steppable for PhysicsWorld {
    fn step(&mut self, dt: f32) {
        PhysicsWorld::step(self, dt);
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new()
    }
}
