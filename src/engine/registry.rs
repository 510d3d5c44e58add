// Body registry: which scene node shows which simulated body

use crate::engine::error::ConfigurationError;
use crate::engine::physics::{BodyHandle, DebugProxy, PhysicsWorld};
use crate::engine::renderer::NodeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identifier of a body binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(u64);

impl BindingId {
    /// Create a binding id from a raw value
    #[cfg(test)]
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding#{}", self.0)
    }
}

/// One simulated body and the nodes that display it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyBinding {
    pub body: BodyHandle,
    pub visual: NodeId,
    pub debug: Option<DebugProxy>,
}

/// Authoritative mapping from bodies to their visual targets
///
/// Iteration is in ascending id order, i.e. registration order.
#[derive(Debug, Default)]
pub struct BodyRegistry {
    bindings: BTreeMap<BindingId, BodyBinding>,
    by_body: HashMap<BodyHandle, BindingId>,
    next_id: u64,

    /// Attach a debug proxy to every new binding
    auto_attach_debug: bool,
}

impl BodyRegistry {
    /// Create an empty registry
    pub fn new(auto_attach_debug: bool) -> Self {
        Self {
            bindings: BTreeMap::new(),
            by_body: HashMap::new(),
            next_id: 1,
            auto_attach_debug,
        }
    }

    /// Whether new bindings get a debug proxy
    pub fn auto_attach_debug(&self) -> bool {
        self.auto_attach_debug
    }

    /// Bind a body to its visual node
    pub fn register(
        &mut self,
        body: BodyHandle,
        visual: NodeId,
        debug: Option<DebugProxy>,
    ) -> Result<BindingId, ConfigurationError> {
        if self.by_body.contains_key(&body) {
            return Err(ConfigurationError::DuplicateBinding(body));
        }

        let id = BindingId(self.next_id);
        self.next_id += 1;
        self.bindings.insert(
            id,
            BodyBinding {
                body,
                visual,
                debug,
            },
        );
        self.by_body.insert(body, id);

        log::debug!("Registered {} for body {:?} -> {}", id, body, visual);
        Ok(id)
    }

    /// Remove a binding, returning it so the caller can release its nodes
    pub fn unregister(&mut self, id: BindingId) -> Result<BodyBinding, ConfigurationError> {
        let binding = self
            .bindings
            .remove(&id)
            .ok_or(ConfigurationError::UnknownBinding(id))?;
        self.by_body.remove(&binding.body);
        log::debug!("Unregistered {}", id);
        Ok(binding)
    }

    /// Visit every binding in registration order
    pub fn for_each_binding<F: FnMut(BindingId, &BodyBinding)>(&self, mut f: F) {
        for (id, binding) in &self.bindings {
            f(*id, binding);
        }
    }

    /// Drop bindings whose body no longer exists in `world`
    ///
    /// Returns the removed bindings so their nodes can be released.
    pub fn prune_dead(&mut self, world: &PhysicsWorld) -> Vec<(BindingId, BodyBinding)> {
        let dead: Vec<BindingId> = self
            .bindings
            .iter()
            .filter(|(_, binding)| !world.contains(binding.body))
            .map(|(id, _)| *id)
            .collect();

        dead.into_iter()
            .filter_map(|id| {
                let binding = self.bindings.remove(&id)?;
                self.by_body.remove(&binding.body);
                log::warn!("{} dropped: body {:?} no longer exists", id, binding.body);
                Some((id, binding))
            })
            .collect()
    }

    /// Get a binding
    pub fn get(&self, id: BindingId) -> Option<&BodyBinding> {
        self.bindings.get(&id)
    }

    /// Binding of a body, if any
    pub fn binding_for_body(&self, body: BodyHandle) -> Option<BindingId> {
        self.by_body.get(&body).copied()
    }

    /// All binding ids in registration order
    pub fn ids(&self) -> Vec<BindingId> {
        self.bindings.keys().copied().collect()
    }

    /// Remove every binding, returning them
    pub fn drain(&mut self) -> Vec<(BindingId, BodyBinding)> {
        self.by_body.clear();
        std::mem::take(&mut self.bindings).into_iter().collect()
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether there are no bindings
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
