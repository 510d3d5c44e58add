// Render targets: scene graph nodes and lights
//
// Nothing here touches a GPU; a frontend reads the graph after each frame.

mod light;
mod scene;

pub use light::{Light, LightId, LightKind, Lighting};
pub use scene::{Geometry, Layer, NodeId, SceneGraph, SceneNode, WireMesh};
