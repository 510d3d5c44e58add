// Frame pipeline
//
// Owns the physics world and everything that reads or writes it, and runs the
// per-frame sequence: fixed point (injections, commands, pruning), physics
// steps, render sync. All mutation of the world and the registry happens on
// the thread that calls `frame`.

use crate::engine::assets::{
    AssetError, AssetInfo, AssetLoader, AssetType, Completion, InjectionGateway, Liveness, SpawnSpec,
};
use crate::engine::error::{ConfigurationError, TimingAnomaly};
use crate::engine::game_loop::{DriverConfig, FixedStepDriver, DEFAULT_DRIVER_CONFIG};
use crate::engine::physics::{
    BodyDesc, BodyHandle, ContactProperties, ContactRule, DebugOverlay, PhysicsWorld, GRAVITY,
};
use crate::engine::registry::{BindingId, BodyBinding, BodyRegistry};
use crate::engine::renderer::{Geometry, Lighting, SceneGraph, SceneNode};
use crate::engine::sync::{RenderSync, SyncStats};
use glam::Vec3;

/// Per-scene settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub gravity: Vec3,
    pub driver: DriverConfig,
    /// Whether collision wireframes start revealed
    pub debug_overlay_visible: bool,
    /// Whether every spawned body gets a wireframe proxy
    pub auto_attach_debug: bool,
    /// Directory holding `models/` and `textures/`
    pub asset_root: &'static str,
}

pub const DEFAULT_SCENE_CONFIG: SceneConfig = SceneConfig {
    gravity: GRAVITY,
    driver: DEFAULT_DRIVER_CONFIG,
    debug_overlay_visible: false,
    auto_attach_debug: true,
    asset_root: "assets",
};

impl Default for SceneConfig {
    fn default() -> Self {
        DEFAULT_SCENE_CONFIG
    }
}

/// Mutation requested by panel controls or scene hooks
///
/// Queued and applied at the next frame's fixed point, before stepping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SceneCommand {
    Despawn(BindingId),
    /// Move a body and bring it to rest
    Teleport { binding: BindingId, position: Vec3 },
    /// One-step force
    ApplyForce { binding: BindingId, force: Vec3 },
    /// Force re-applied every step; zero clears it
    SetConstantForce { binding: BindingId, force: Vec3 },
}

/// FIFO of pending scene commands
#[derive(Debug, Default)]
pub struct CommandQueue {
    commands: Vec<SceneCommand>,
}

impl CommandQueue {
    pub fn push(&mut self, command: SceneCommand) {
        self.commands.push(command);
    }

    pub fn drain(&mut self) -> Vec<SceneCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

/// Shared scene state handed to every component by reference
#[derive(Debug, Default)]
pub struct SceneContext {
    pub graph: SceneGraph,
    pub lights: Lighting,
    pub commands: CommandQueue,
    liveness: Liveness,
}

impl SceneContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn liveness(&self) -> &Liveness {
        &self.liveness
    }

    pub fn is_alive(&self) -> bool {
        self.liveness.is_alive()
    }
}

/// Why an injected asset did not become a binding
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Outcome of one completed load, applied at the fixed point
#[derive(Debug)]
pub enum InjectionReport {
    Spawned { request: u64, binding: BindingId },
    Failed { request: u64, error: InjectionError },
    /// The owning scene was torn down before the load finished
    Discarded { request: u64 },
}

/// Everything that happened in one `frame` call
#[derive(Debug, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub steps: u32,
    pub anomaly: Option<TimingAnomaly>,
    pub injections: Vec<InjectionReport>,
    pub commands_applied: usize,
    pub commands_failed: usize,
    pub pruned: usize,
    pub sync: SyncStats,
}

/// The simulation core of one scene
pub struct Simulation {
    world: PhysicsWorld,
    registry: BodyRegistry,
    overlay: DebugOverlay,
    driver: FixedStepDriver,
    gateway: InjectionGateway,
    sync: RenderSync,
    config: SceneConfig,
}

impl Simulation {
    /// Create a simulation and apply the config to the scene context
    pub fn new(config: SceneConfig, ctx: &mut SceneContext) -> Self {
        let overlay = DebugOverlay::new();
        overlay.set_overlay_visible(&mut ctx.graph, config.debug_overlay_visible);

        log::info!(
            "Simulation ready: step {:.4}s, max delta {:.2}s, gravity {:?}",
            config.driver.fixed_step,
            config.driver.max_frame_delta,
            config.gravity
        );

        Self {
            world: PhysicsWorld::with_gravity(config.gravity),
            registry: BodyRegistry::new(config.auto_attach_debug),
            overlay,
            driver: FixedStepDriver::with_config(config.driver),
            gateway: InjectionGateway::new(AssetLoader::new(config.asset_root)),
            sync: RenderSync::new(),
            config,
        }
    }

    /// Create a body, its visual node and the binding between them
    ///
    /// Either all three exist afterwards or none does.
    pub fn spawn(
        &mut self,
        ctx: &mut SceneContext,
        desc: &BodyDesc,
        node: SceneNode,
    ) -> Result<BindingId, ConfigurationError> {
        let body = self.world.create_body(desc);
        self.bind(ctx, body, node).map_err(|e| {
            if let Err(rollback) = self.world.remove_body(body) {
                log::warn!("Rollback of {:?} failed: {}", body, rollback);
            }
            e
        })
    }

    /// Bind an existing body to a new visual node
    pub fn bind(
        &mut self,
        ctx: &mut SceneContext,
        body: BodyHandle,
        node: SceneNode,
    ) -> Result<BindingId, ConfigurationError> {
        if self.registry.binding_for_body(body).is_some() {
            return Err(ConfigurationError::DuplicateBinding(body));
        }
        let transform = self
            .world
            .body_transform(body)
            .ok_or(ConfigurationError::UnknownBody(body))?;
        let visual = ctx.graph.add(node.with_transform(transform));

        let debug = if self.registry.auto_attach_debug() {
            match self.overlay.attach(&self.world, &mut ctx.graph, body) {
                Ok(proxy) => Some(proxy),
                Err(e) => {
                    ctx.graph.remove(visual);
                    return Err(e);
                }
            }
        } else {
            None
        };

        self.registry.register(body, visual, debug).map_err(|e| {
            ctx.graph.remove(visual);
            if let Some(proxy) = debug {
                self.overlay.detach(&mut ctx.graph, proxy);
            }
            e
        })
    }

    /// Remove a binding together with its body and nodes
    pub fn despawn(&mut self, ctx: &mut SceneContext, id: BindingId) -> Result<(), ConfigurationError> {
        let binding = self.registry.unregister(id)?;
        self.release(ctx, &binding);
        self.world.remove_body(binding.body)
    }

    fn release(&mut self, ctx: &mut SceneContext, binding: &BodyBinding) {
        ctx.graph.remove(binding.visual);
        if let Some(proxy) = binding.debug {
            self.overlay.detach(&mut ctx.graph, proxy);
        }
    }

    /// Start loading an asset; the body appears at a later frame's fixed point
    pub fn request_asset(&mut self, ctx: &SceneContext, spec: SpawnSpec) -> Result<u64, AssetError> {
        self.gateway.request(spec, ctx.liveness())
    }

    /// Register a pairwise contact rule
    pub fn register_contact_rule(&mut self, rule: ContactRule) -> Result<(), ConfigurationError> {
        self.world.register_contact_rule(rule)
    }

    /// Retune a contact rule at runtime
    pub fn set_contact_rule(&mut self, rule: ContactRule) {
        self.world.set_contact_rule(rule);
    }

    /// Current friction and restitution between two materials
    pub fn contact_rule(&self, a: &str, b: &str) -> Option<ContactProperties> {
        self.world.contact_rules().get_by_name(a, b)
    }

    pub fn set_gravity(&mut self, gravity: Vec3) {
        self.world.set_gravity(gravity);
    }

    pub fn gravity(&self) -> Vec3 {
        self.world.gravity()
    }

    /// Reveal or hide all collision wireframes
    pub fn set_overlay_visible(&self, ctx: &mut SceneContext, visible: bool) {
        self.overlay.set_overlay_visible(&mut ctx.graph, visible);
    }

    pub fn overlay_visible(&self, ctx: &SceneContext) -> bool {
        self.overlay.is_visible(&ctx.graph)
    }

    /// Run one rendered frame
    pub fn frame(&mut self, ctx: &mut SceneContext, frame_delta: f64) -> FrameReport {
        let mut report = FrameReport {
            frame: ctx.graph.begin_frame(),
            ..FrameReport::default()
        };

        // Fixed point: the binding set is frozen from here until sync ends
        for completion in self.gateway.drain() {
            let injection = self.inject(ctx, completion);
            report.injections.push(injection);
        }

        for command in ctx.commands.drain() {
            match self.apply(ctx, command) {
                Ok(()) => report.commands_applied += 1,
                Err(e) => {
                    log::warn!("Dropped {:?}: {}", command, e);
                    report.commands_failed += 1;
                }
            }
        }

        let pruned = self.registry.prune_dead(&self.world);
        for (_, binding) in &pruned {
            self.release(ctx, binding);
        }
        report.pruned = pruned.len();

        let outcome = self.driver.advance(frame_delta, &mut self.world);
        report.steps = outcome.steps;
        report.anomaly = outcome.anomaly;

        report.sync = self.sync.sync_all(&self.world, &self.registry, &mut ctx.graph);
        report
    }

    fn inject(&mut self, ctx: &mut SceneContext, completion: Completion) -> InjectionReport {
        let request = completion.request;

        if !completion.is_live() || !ctx.is_alive() {
            log::debug!("Load #{} discarded, scene is gone", request);
            return InjectionReport::Discarded { request };
        }

        // Only models can stand in for a body
        let result = completion.result.and_then(|asset| match asset.asset_type {
            AssetType::Model => Ok(asset),
            AssetType::Texture => Err(AssetError::UnsupportedType(asset.name)),
        });

        let asset = match result {
            Ok(asset) => asset,
            Err(e) => {
                log::warn!("Load #{} ({}) failed: {}", request, completion.spec.asset, e);
                return InjectionReport::Failed {
                    request,
                    error: e.into(),
                };
            }
        };

        let node = SceneNode::new(completion.spec.name.as_str(), Geometry::Asset(asset.id))
            .casting_shadow()
            .receiving_shadow();

        match self.spawn(ctx, &completion.spec.body, node) {
            Ok(binding) => {
                let detail = match asset.info {
                    AssetInfo::Model {
                        meshes,
                        nodes,
                        has_blob,
                    } => format!(
                        "{} meshes, {} nodes{}",
                        meshes,
                        nodes,
                        if has_blob { ", embedded buffer" } else { "" }
                    ),
                    AssetInfo::Texture { width, height } => format!("{}x{}", width, height),
                };
                log::info!(
                    "Injected '{}' from {} ({} bytes, {}) as {}",
                    completion.spec.name,
                    asset.name,
                    asset.byte_len,
                    detail,
                    binding
                );
                InjectionReport::Spawned { request, binding }
            }
            Err(e) => {
                log::warn!("Load #{} could not be bound: {}", request, e);
                InjectionReport::Failed {
                    request,
                    error: e.into(),
                }
            }
        }
    }

    fn apply(&mut self, ctx: &mut SceneContext, command: SceneCommand) -> Result<(), ConfigurationError> {
        let body_of = |registry: &BodyRegistry, id: BindingId| {
            registry
                .get(id)
                .map(|binding| binding.body)
                .ok_or(ConfigurationError::UnknownBinding(id))
        };

        match command {
            SceneCommand::Despawn(id) => self.despawn(ctx, id),
            SceneCommand::Teleport { binding, position } => {
                let body = body_of(&self.registry, binding)?;
                self.world.set_translation(body, position)
            }
            SceneCommand::ApplyForce { binding, force } => {
                let body = body_of(&self.registry, binding)?;
                self.world.apply_force(body, force)
            }
            SceneCommand::SetConstantForce { binding, force } => {
                let body = body_of(&self.registry, binding)?;
                self.world.set_constant_force(body, force)
            }
        }
    }

    /// Revoke the scene's liveness and drop every body and node
    pub fn teardown(&mut self, ctx: &mut SceneContext) {
        ctx.liveness.revoke();
        for (_, binding) in self.registry.drain() {
            self.release(ctx, &binding);
        }
        self.world.clear();
        log::info!("Scene torn down, {} loads still in flight", self.gateway.pending());
    }

    /// Pause or resume physics stepping
    pub fn toggle_pause(&mut self) {
        self.driver.toggle_pause();
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    #[cfg(test)]
    pub fn world_mut(&mut self) -> &mut PhysicsWorld {
        &mut self.world
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn driver(&self) -> &FixedStepDriver {
        &self.driver
    }

    pub fn gateway(&self) -> &InjectionGateway {
        &self.gateway
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Body behind a binding
    pub fn body_of(&self, id: BindingId) -> Option<BodyHandle> {
        self.registry.get(id).map(|binding| binding.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::assets::{Asset, AssetId};
    use crate::engine::physics::body::presets;
    use crate::engine::renderer::Layer;
    use approx::assert_relative_eq;

    fn setup(config: SceneConfig) -> (SceneContext, Simulation) {
        let mut ctx = SceneContext::new();
        let sim = Simulation::new(config, &mut ctx);
        (ctx, sim)
    }

    fn ball_node() -> SceneNode {
        SceneNode::new("ball", Geometry::Sphere { radius: 2.0 })
    }

    fn dice_asset() -> Asset {
        Asset {
            id: AssetId::from_path("models/dice.glb"),
            name: "dice.glb".to_string(),
            asset_type: AssetType::Model,
            info: AssetInfo::Model {
                meshes: 0,
                nodes: 1,
                has_blob: false,
            },
            byte_len: 136,
        }
    }

    fn deliver(sim: &mut Simulation, ctx: &SceneContext, result: Result<Asset, AssetError>) -> u64 {
        let request = sim.gateway.reserve();
        sim.gateway.ready().on_asset_ready(
            request,
            SpawnSpec::new("dice", "dice.glb", presets::dice(0.0, 30.0, 0.0)),
            result,
            ctx.liveness(),
        );
        request
    }

    #[test]
    fn test_spawn_creates_body_node_and_proxy() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);

        let id = sim
            .spawn(&mut ctx, &presets::ball(2.0, 5.0, 10.0, 20.0, 0.0), ball_node())
            .unwrap();

        let binding = *sim.registry().get(id).unwrap();
        assert!(sim.world().contains(binding.body));
        let visual = ctx.graph.get(binding.visual).unwrap();
        assert_eq!(visual.transform().translation, Vec3::new(10.0, 20.0, 0.0));
        let proxy = binding.debug.unwrap();
        assert_eq!(ctx.graph.get(proxy).unwrap().layer, Layer::Debug);
        assert!(!ctx.graph.is_visible(proxy));
    }

    #[test]
    fn test_no_proxy_without_auto_attach() {
        let config = SceneConfig {
            auto_attach_debug: false,
            ..DEFAULT_SCENE_CONFIG
        };
        let (mut ctx, mut sim) = setup(config);

        let id = sim.spawn(&mut ctx, &presets::floor(), ball_node()).unwrap();

        assert!(sim.registry().get(id).unwrap().debug.is_none());
        assert_eq!(ctx.graph.count_on_layer(Layer::Debug), 0);
    }

    #[test]
    fn test_overlay_visibility_from_config() {
        let config = SceneConfig {
            debug_overlay_visible: true,
            ..DEFAULT_SCENE_CONFIG
        };
        let (mut ctx, sim) = setup(config);
        assert!(sim.overlay_visible(&ctx));

        sim.set_overlay_visible(&mut ctx, false);
        assert!(!sim.overlay_visible(&ctx));
    }

    #[test]
    fn test_bind_twice_rolls_back_node() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let id = sim
            .spawn(&mut ctx, &presets::ball(1.0, 1.0, 0.0, 5.0, 0.0), ball_node())
            .unwrap();
        let body = sim.body_of(id).unwrap();
        let nodes_before = ctx.graph.len();

        let result = sim.bind(&mut ctx, body, ball_node());

        assert_eq!(result, Err(ConfigurationError::DuplicateBinding(body)));
        assert_eq!(ctx.graph.len(), nodes_before);
        assert!(sim.world().contains(body));
    }

    #[test]
    fn test_despawn_removes_everything() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let id = sim
            .spawn(&mut ctx, &presets::ball(1.0, 1.0, 0.0, 5.0, 0.0), ball_node())
            .unwrap();

        sim.despawn(&mut ctx, id).unwrap();

        assert!(sim.registry().is_empty());
        assert!(ctx.graph.is_empty());
        assert_eq!(sim.world().body_count(), 0);
        assert_eq!(
            sim.despawn(&mut ctx, id),
            Err(ConfigurationError::UnknownBinding(id))
        );
    }

    #[test]
    fn test_frame_steps_and_syncs() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let id = sim
            .spawn(&mut ctx, &presets::ball(1.0, 1.0, 0.0, 20.0, 0.0), ball_node())
            .unwrap();
        let visual = sim.registry().get(id).unwrap().visual;

        let report = sim.frame(&mut ctx, 0.1);

        assert_eq!(report.steps, 6);
        assert_eq!(report.sync.synced, 1);
        assert_eq!(report.sync.debug_synced, 1);
        let y = ctx.graph.get(visual).unwrap().transform().translation.y;
        assert!(y < 20.0);
        assert_relative_eq!(sim.driver().accumulator(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_bad_delta_reports_anomaly() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);

        let report = sim.frame(&mut ctx, f64::NAN);

        assert_eq!(report.steps, 0);
        assert_eq!(report.anomaly, Some(TimingAnomaly::NotANumber));
    }

    #[test]
    fn test_commands_apply_before_stepping() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let id = sim
            .spawn(&mut ctx, &presets::ball(1.0, 1.0, 0.0, 1.0, 0.0), ball_node())
            .unwrap();
        let visual = sim.registry().get(id).unwrap().visual;

        ctx.commands.push(SceneCommand::Teleport {
            binding: id,
            position: Vec3::new(0.0, 50.0, 0.0),
        });
        ctx.commands.push(SceneCommand::Despawn(BindingId::from_raw(999)));
        let report = sim.frame(&mut ctx, 0.0);

        assert_eq!(report.commands_applied, 1);
        assert_eq!(report.commands_failed, 1);
        assert!(ctx.commands.is_empty());
        let t = ctx.graph.get(visual).unwrap().transform();
        assert_relative_eq!(t.translation.y, 50.0);
    }

    #[test]
    fn test_constant_force_pushes_body() {
        let config = SceneConfig {
            gravity: Vec3::ZERO,
            ..DEFAULT_SCENE_CONFIG
        };
        let (mut ctx, mut sim) = setup(config);
        let id = sim
            .spawn(&mut ctx, &presets::ball(1.0, 5.0, 0.0, 5.0, 0.0), ball_node())
            .unwrap();

        ctx.commands.push(SceneCommand::SetConstantForce {
            binding: id,
            force: Vec3::new(20.0, 0.0, 0.0),
        });
        for _ in 0..30 {
            sim.frame(&mut ctx, 1.0 / 60.0);
        }

        let body = sim.body_of(id).unwrap();
        assert!(sim.world().linvel(body).unwrap().x > 0.0);
    }

    #[test]
    fn test_external_removal_is_pruned() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let id = sim
            .spawn(&mut ctx, &presets::ball(1.0, 1.0, 0.0, 5.0, 0.0), ball_node())
            .unwrap();
        let body = sim.body_of(id).unwrap();
        sim.world_mut().remove_body(body).unwrap();

        let report = sim.frame(&mut ctx, 1.0 / 60.0);

        assert_eq!(report.pruned, 1);
        assert_eq!(report.sync.skipped, 0);
        assert!(sim.registry().is_empty());
        assert!(ctx.graph.is_empty());
    }

    #[test]
    fn test_injected_body_synced_by_second_frame() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let request = deliver(&mut sim, &ctx, Ok(dice_asset()));

        let first = sim.frame(&mut ctx, 1.0 / 60.0);
        let binding = match first.injections.as_slice() {
            [InjectionReport::Spawned { request: r, binding }] => {
                assert_eq!(*r, request);
                *binding
            }
            other => panic!("unexpected injections: {:?}", other),
        };
        sim.frame(&mut ctx, 1.0 / 60.0);

        let visual = sim.registry().get(binding).unwrap().visual;
        let node = ctx.graph.get(visual).unwrap();
        assert!(matches!(node.geometry, Geometry::Asset(_)));
        assert_eq!(node.last_write_frame(), Some(ctx.graph.frame()));
        let body = sim.body_of(binding).unwrap();
        assert_eq!(node.transform(), sim.world().body_transform(body).unwrap());
        assert!(node.transform().translation.y > 29.0);
        assert_eq!(sim.gateway().pending(), 0);
    }

    #[test]
    fn test_failed_load_leaves_world_untouched() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        deliver(
            &mut sim,
            &ctx,
            Err(AssetError::NotFound("models/dice.glb".to_string())),
        );

        let report = sim.frame(&mut ctx, 1.0 / 60.0);

        assert!(matches!(
            report.injections.as_slice(),
            [InjectionReport::Failed {
                error: InjectionError::Asset(AssetError::NotFound(_)),
                ..
            }]
        ));
        assert_eq!(sim.world().body_count(), 0);
        assert!(sim.registry().is_empty());
        assert!(ctx.graph.is_empty());
    }

    #[test]
    fn test_corrupt_model_spawns_nothing() {
        let root = std::env::temp_dir().join(format!("physics-stage-sim-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(root.join("models")).unwrap();
        let mut bytes = Vec::new();
        let json = b"{ not json  ";
        bytes.extend_from_slice(b"glTF");
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&(20 + json.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(json.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b"JSON");
        bytes.extend_from_slice(json);
        std::fs::write(root.join("models/dice.glb"), bytes).unwrap();

        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        sim.gateway = InjectionGateway::new(AssetLoader::new(&root));
        sim.request_asset(
            &ctx,
            SpawnSpec::new("dice", "dice.glb", presets::dice(0.0, 30.0, 0.0)),
        )
        .unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        let mut injections = Vec::new();
        while injections.is_empty() && std::time::Instant::now() < deadline {
            injections = sim.frame(&mut ctx, 1.0 / 60.0).injections;
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        assert!(matches!(
            injections.as_slice(),
            [InjectionReport::Failed {
                error: InjectionError::Asset(AssetError::LoadError(_)),
                ..
            }]
        ));
        assert_eq!(sim.world().body_count(), 0);
        assert!(sim.registry().is_empty());
        assert!(ctx.graph.is_empty());
    }

    #[test]
    fn test_texture_cannot_become_a_body() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let texture = Asset {
            id: AssetId::from_path("textures/floor.png"),
            name: "floor.png".to_string(),
            asset_type: AssetType::Texture,
            info: AssetInfo::Texture {
                width: 4,
                height: 4,
            },
            byte_len: 64,
        };
        deliver(&mut sim, &ctx, Ok(texture));

        let report = sim.frame(&mut ctx, 1.0 / 60.0);

        assert!(matches!(
            report.injections.as_slice(),
            [InjectionReport::Failed {
                error: InjectionError::Asset(AssetError::UnsupportedType(_)),
                ..
            }]
        ));
        assert_eq!(sim.world().body_count(), 0);
    }

    #[test]
    fn test_load_after_teardown_is_ignored() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        sim.spawn(&mut ctx, &presets::floor(), ball_node()).unwrap();
        let request = sim.gateway.reserve();

        sim.teardown(&mut ctx);
        sim.gateway.ready().on_asset_ready(
            request,
            SpawnSpec::new("dice", "dice.glb", presets::dice(0.0, 30.0, 0.0)),
            Ok(dice_asset()),
            ctx.liveness(),
        );
        let report = sim.frame(&mut ctx, 1.0 / 60.0);

        assert!(report.injections.is_empty());
        assert_eq!(sim.world().body_count(), 0);
        assert!(ctx.graph.is_empty());
    }

    #[test]
    fn test_queued_completion_discarded_after_teardown() {
        let (mut ctx, mut sim) = setup(DEFAULT_SCENE_CONFIG);
        let request = deliver(&mut sim, &ctx, Ok(dice_asset()));

        sim.teardown(&mut ctx);
        let report = sim.frame(&mut ctx, 1.0 / 60.0);

        assert!(matches!(
            report.injections.as_slice(),
            [InjectionReport::Discarded { request: r }] if *r == request
        ));
        assert_eq!(sim.world().body_count(), 0);
    }

    #[test]
    fn test_step_count_independent_of_frame_split() {
        let (mut ctx_a, mut sim_a) = setup(DEFAULT_SCENE_CONFIG);
        let (mut ctx_b, mut sim_b) = setup(DEFAULT_SCENE_CONFIG);

        for _ in 0..60 {
            sim_a.frame(&mut ctx_a, 1.0 / 30.0);
        }
        for _ in 0..240 {
            sim_b.frame(&mut ctx_b, 1.0 / 120.0);
        }

        let a = sim_a.driver().step_count() as i64;
        let b = sim_b.driver().step_count() as i64;
        assert!((a - b).abs() <= 1);
        assert!((a - 120).abs() <= 1);
    }
}
