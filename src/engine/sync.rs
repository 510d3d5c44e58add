// Render-sync bridge: copies committed physics transforms onto scene nodes

use crate::engine::physics::PhysicsWorld;
use crate::engine::registry::BodyRegistry;
use crate::engine::renderer::SceneGraph;

/// Counters from one `sync_all` pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Visual nodes written
    pub synced: usize,
    /// Debug proxies written
    pub debug_synced: usize,
    /// Bindings whose body or node was missing
    pub skipped: usize,
}

/// Writes body transforms into their visual targets once per frame
///
/// No interpolation: a frame that ran zero physics steps shows the transform
/// of the previous step.
#[derive(Debug, Default)]
pub struct RenderSync {
    passes: u64,
}

impl RenderSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sync every binding. Must run after the frame's last physics step.
    pub fn sync_all(
        &mut self,
        world: &PhysicsWorld,
        registry: &BodyRegistry,
        graph: &mut SceneGraph,
    ) -> SyncStats {
        let mut stats = SyncStats::default();

        registry.for_each_binding(|id, binding| {
            // One read feeds both nodes so the proxy never lags the visual
            let Some(transform) = world.body_transform(binding.body) else {
                log::warn!("{}: body {:?} missing during sync", id, binding.body);
                stats.skipped += 1;
                return;
            };

            if graph.set_transform(binding.visual, transform) {
                stats.synced += 1;
            } else {
                log::warn!("{}: visual {} missing during sync", id, binding.visual);
                stats.skipped += 1;
            }

            if let Some(proxy) = binding.debug {
                if graph.set_transform(proxy, transform) {
                    stats.debug_synced += 1;
                }
            }
        });

        self.passes += 1;
        stats
    }

    /// Number of completed passes
    pub fn passes(&self) -> u64 {
        self.passes
    }
}
