// Asset management system
//
// Identifies assets on disk and feeds them asynchronously into a running scene.

mod gateway;
mod handle;
mod loader;

pub use gateway::{Completion, InjectionGateway, Liveness, SpawnSpec};
pub use handle::AssetId;
pub use loader::{Asset, AssetInfo, AssetLoader, AssetType};

/// Asset loading errors
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Unsupported asset type: {0}")]
    UnsupportedType(String),

    #[error("Failed to load asset: {0}")]
    LoadError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
