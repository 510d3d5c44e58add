// Asset loading: read bytes from disk and identify what they contain
//
// Decoding stops at identification; meshes and pixels belong to the renderer.

use super::{AssetError, AssetId};
use gltf::Gltf;
use image::GenericImageView;
use std::path::{Path, PathBuf};

/// Supported asset types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetType {
    Texture,
    Model,
}

impl AssetType {
    /// Get the default directory for this asset type
    pub fn default_directory(&self) -> &'static str {
        match self {
            AssetType::Texture => "textures",
            AssetType::Model => "models",
        }
    }

    /// Get supported file extensions for this asset type
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            AssetType::Texture => &["png", "jpg", "jpeg"],
            AssetType::Model => &["glb"],
        }
    }

    /// Guess the type from a file name
    pub fn from_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
        [AssetType::Texture, AssetType::Model]
            .into_iter()
            .find(|t| t.extensions().contains(&ext.as_str()))
    }
}

/// What identification found out about an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetInfo {
    Texture { width: u32, height: u32 },
    Model { meshes: usize, nodes: usize, has_blob: bool },
}

/// An identified asset, ready to be turned into a scene node
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub id: AssetId,
    pub name: String,
    pub asset_type: AssetType,
    pub info: AssetInfo,
    pub byte_len: usize,
}

/// Asset loader responsible for finding and loading asset files
#[derive(Debug, Clone)]
pub struct AssetLoader {
    base_path: PathBuf,
}

impl AssetLoader {
    /// Create a new asset loader with the given base path
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for an asset
    pub fn resolve_path(&self, asset_type: AssetType, name: &str) -> PathBuf {
        self.base_path
            .join(asset_type.default_directory())
            .join(name)
    }

    /// Load asset bytes from disk
    pub fn load_bytes(&self, asset_type: AssetType, name: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.resolve_path(asset_type, name);

        if !path.exists() {
            return Err(AssetError::NotFound(path.to_string_lossy().to_string()));
        }

        Ok(std::fs::read(&path)?)
    }

    /// Load and identify an asset. Blocking; run it off the frame thread.
    pub fn load(&self, name: &str) -> Result<Asset, AssetError> {
        let asset_type =
            AssetType::from_name(name).ok_or_else(|| AssetError::UnsupportedType(name.to_string()))?;
        let bytes = self.load_bytes(asset_type, name)?;

        let info = match asset_type {
            AssetType::Texture => identify_texture(&bytes)
                .map_err(|e| AssetError::LoadError(format!("{}: {}", name, e)))?,
            AssetType::Model => {
                identify_glb(&bytes).map_err(|e| AssetError::LoadError(format!("{}: {}", name, e)))?
            }
        };

        log::debug!("Loaded {} ({} bytes): {:?}", name, bytes.len(), info);

        Ok(Asset {
            id: AssetId::from_path(&format!("{}/{}", asset_type.default_directory(), name)),
            name: name.to_string(),
            asset_type,
            info,
            byte_len: bytes.len(),
        })
    }
}

fn identify_texture(bytes: &[u8]) -> Result<AssetInfo, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let (width, height) = img.dimensions();
    Ok(AssetInfo::Texture { width, height })
}

/// Parse the container and the JSON document; buffers stay unread
fn identify_glb(bytes: &[u8]) -> Result<AssetInfo, gltf::Error> {
    let glb = Gltf::from_slice(bytes)?;
    Ok(AssetInfo::Model {
        meshes: glb.document.meshes().len(),
        nodes: glb.document.nodes().len(),
        has_blob: glb.blob.is_some(),
    })
}
