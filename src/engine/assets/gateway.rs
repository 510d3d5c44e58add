// Async injection gateway
//
// Loads run on short-lived background threads. A finished load is only a
// message; the frame pipeline drains the channel at its fixed point and does
// all world and registry mutation itself.

use super::loader::{Asset, AssetLoader};
use super::AssetError;
use crate::engine::physics::BodyDesc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

/// Liveness flag of a scene context
///
/// Cleared when the scene is torn down; completions that arrive afterwards
/// are dropped.
#[derive(Debug, Clone)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Mark the owner as gone
    pub fn revoke(&self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// What to build once an asset arrives
#[derive(Debug, Clone)]
pub struct SpawnSpec {
    /// Display name of the scene node
    pub name: String,
    /// Asset file name, resolved by the loader
    pub asset: String,
    /// Body to create for it
    pub body: BodyDesc,
}

impl SpawnSpec {
    pub fn new(name: impl Into<String>, asset: impl Into<String>, body: BodyDesc) -> Self {
        Self {
            name: name.into(),
            asset: asset.into(),
            body,
        }
    }
}

/// A finished load waiting for the frame pipeline
#[derive(Debug)]
pub struct Completion {
    pub request: u64,
    pub spec: SpawnSpec,
    pub result: Result<Asset, AssetError>,
    liveness: Liveness,
}

impl Completion {
    /// Whether the scene that asked for this load still exists
    pub fn is_live(&self) -> bool {
        self.liveness.is_alive()
    }
}

/// Sending half handed to loader threads
#[derive(Debug, Clone)]
pub struct AssetReady {
    sender: Sender<Completion>,
    in_flight: Arc<AtomicUsize>,
}

impl AssetReady {
    /// Count one load as finished. Saturates at zero for unreserved ids.
    fn release(&self) {
        let released = self
            .in_flight
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
        if released.is_err() {
            log::warn!("Completion reported with no load in flight");
        }
    }

    /// Report a finished load. Only enqueues; never touches the world.
    pub fn on_asset_ready(
        &self,
        request: u64,
        spec: SpawnSpec,
        result: Result<Asset, AssetError>,
        liveness: &Liveness,
    ) {
        self.release();

        if !liveness.is_alive() {
            log::debug!("Load #{} ({}) finished after teardown", request, spec.asset);
            return;
        }

        let completion = Completion {
            request,
            spec,
            result,
            liveness: liveness.clone(),
        };

        // The receiver is gone only when the gateway itself was dropped
        if self.sender.send(completion).is_err() {
            log::debug!("Load #{} finished with no gateway to receive it", request);
        }
    }
}

/// Accepts load requests and queues their completions
pub struct InjectionGateway {
    loader: AssetLoader,
    ready: AssetReady,
    receiver: Receiver<Completion>,
    next_request: u64,
}

impl InjectionGateway {
    pub fn new(loader: AssetLoader) -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            loader,
            ready: AssetReady {
                sender,
                in_flight: Arc::new(AtomicUsize::new(0)),
            },
            receiver,
            next_request: 1,
        }
    }

    /// Start loading `spec.asset` in the background. Returns the request id.
    pub fn request(&mut self, spec: SpawnSpec, liveness: &Liveness) -> Result<u64, AssetError> {
        let request = self.reserve();
        let loader = self.loader.clone();
        let ready = self.ready.clone();
        let liveness = liveness.clone();

        log::info!("Requesting {} for '{}' (load #{})", spec.asset, spec.name, request);

        let spawned = std::thread::Builder::new()
            .name(format!("asset-load-{}", request))
            .spawn(move || {
                let result = loader.load(&spec.asset);
                ready.on_asset_ready(request, spec, result, &liveness);
            });

        if let Err(e) = spawned {
            self.ready.release();
            return Err(AssetError::Io(e));
        }

        Ok(request)
    }

    /// Reserve a request id and count the load as in flight
    pub fn reserve(&mut self) -> u64 {
        let request = self.next_request;
        self.next_request += 1;
        self.ready.in_flight.fetch_add(1, Ordering::AcqRel);
        request
    }

    /// Handle for delivering completions without a loader thread
    #[cfg(test)]
    pub(crate) fn ready(&self) -> AssetReady {
        self.ready.clone()
    }

    /// Take every queued completion without blocking
    pub fn drain(&mut self) -> Vec<Completion> {
        self.receiver.try_iter().collect()
    }

    /// Loads started but not yet reported
    pub fn pending(&self) -> usize {
        self.ready.in_flight.load(Ordering::Acquire)
    }
}
