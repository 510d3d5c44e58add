// Headless scene graph: the transform and visibility targets the core writes to
//
// Geometry here is only a description for whatever draws the frame; the
// simulation never looks inside it.

use crate::core::Transform;
use crate::engine::assets::AssetId;
use glam::Vec3;
use std::collections::BTreeMap;
use std::fmt;

/// Identifier of a node in the scene graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Visibility layer of a node
///
/// Each layer has one visibility flag; a node is drawn only when both its own
/// flag and its layer's flag are set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// Regular scene content
    Main,
    /// Collision-shape wireframes
    Debug,
    /// Axes, grids and light helpers
    Helpers,
}

impl Layer {
    const COUNT: usize = 3;

    fn index(self) -> usize {
        match self {
            Layer::Main => 0,
            Layer::Debug => 1,
            Layer::Helpers => 2,
        }
    }
}

/// Line-list geometry in local space
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WireMesh {
    pub vertices: Vec<Vec3>,
    pub indices: Vec<u16>,
    pub color: [f32; 4],
}

impl WireMesh {
    /// Number of line segments
    pub fn segment_count(&self) -> usize {
        self.indices.len() / 2
    }
}

/// What a node draws
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    Plane { width: f32, height: f32 },
    Cylinder { radius: f32, height: f32 },
    /// Geometry supplied by a loaded asset
    Asset(AssetId),
    Wire(WireMesh),
    Axes { size: f32 },
    Grid { size: f32, divisions: u32 },
}

/// A renderable transform target
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub geometry: Geometry,
    pub layer: Layer,
    pub color: [f32; 3],
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    transform: Transform,
    visible: bool,
    transform_writes: u64,
    last_write_frame: Option<u64>,
}

impl SceneNode {
    /// Create a visible node on the main layer
    pub fn new(name: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            name: name.into(),
            geometry,
            layer: Layer::Main,
            color: [1.0, 1.0, 1.0],
            cast_shadow: false,
            receive_shadow: false,
            transform: Transform::IDENTITY,
            visible: true,
            transform_writes: 0,
            last_write_frame: None,
        }
    }

    /// Place the node on a layer
    pub fn on_layer(mut self, layer: Layer) -> Self {
        self.layer = layer;
        self
    }

    /// Set the initial transform
    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the base color
    pub fn with_color(mut self, color: [f32; 3]) -> Self {
        self.color = color;
        self
    }

    /// Enable shadow casting
    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    /// Enable shadow receiving
    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    /// Set the node's own visibility flag
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Current transform
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Node's own visibility flag (ignores the layer)
    pub fn visible(&self) -> bool {
        self.visible
    }

    /// Total number of transform writes through the graph
    pub fn transform_writes(&self) -> u64 {
        self.transform_writes
    }

    /// Frame of the most recent transform write
    pub fn last_write_frame(&self) -> Option<u64> {
        self.last_write_frame
    }
}

/// Scene graph holding every renderable node
#[derive(Debug)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    layer_visible: [bool; Layer::COUNT],
    frame: u64,
}

impl SceneGraph {
    /// Create an empty graph with every layer visible
    pub fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
            next_id: 1,
            layer_visible: [true; Layer::COUNT],
            frame: 0,
        }
    }

    /// Start a new frame, returns its number
    pub fn begin_frame(&mut self) -> u64 {
        self.frame += 1;
        self.frame
    }

    /// Current frame number
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Add a node
    pub fn add(&mut self, node: SceneNode) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node
    pub fn remove(&mut self, id: NodeId) -> Option<SceneNode> {
        self.nodes.remove(&id)
    }

    /// Whether a node exists
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Get a node
    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Get a mutable node
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Overwrite a node's transform, recording the frame of the write
    pub fn set_transform(&mut self, id: NodeId, transform: Transform) -> bool {
        let frame = self.frame;
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.transform = transform;
                node.transform_writes += 1;
                node.last_write_frame = Some(frame);
                true
            }
            None => false,
        }
    }

    /// Set a node's own visibility flag
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    /// Whether a node would be drawn (own flag and layer flag)
    pub fn is_visible(&self, id: NodeId) -> bool {
        self.nodes
            .get(&id)
            .map(|node| node.visible && self.layer_visible(node.layer))
            .unwrap_or(false)
    }

    /// Flip the visibility of a whole layer
    pub fn set_layer_visible(&mut self, layer: Layer, visible: bool) {
        self.layer_visible[layer.index()] = visible;
    }

    /// Visibility flag of a layer
    pub fn layer_visible(&self, layer: Layer) -> bool {
        self.layer_visible[layer.index()]
    }

    /// Iterate over all nodes
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Nodes that would be drawn this frame
    pub fn visible_nodes(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.iter()
            .filter(move |(_, node)| node.visible && self.layer_visible(node.layer))
    }

    /// Number of nodes on a layer
    pub fn count_on_layer(&self, layer: Layer) -> usize {
        self.nodes.values().filter(|node| node.layer == layer).count()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_remove() {
        let mut graph = SceneGraph::new();
        let id = graph.add(SceneNode::new("ball", Geometry::Sphere { radius: 2.0 }));

        assert!(graph.contains(id));
        assert_eq!(graph.len(), 1);

        let node = graph.remove(id).unwrap();
        assert_eq!(node.name, "ball");
        assert!(graph.is_empty());
        assert!(graph.remove(id).is_none());
    }

    #[test]
    fn test_ids_are_not_reused() {
        let mut graph = SceneGraph::new();
        let a = graph.add(SceneNode::new("a", Geometry::Axes { size: 1.0 }));
        graph.remove(a);
        let b = graph.add(SceneNode::new("b", Geometry::Axes { size: 1.0 }));
        assert_ne!(a, b);
    }

    #[test]
    fn test_transform_write_records_frame() {
        let mut graph = SceneGraph::new();
        let id = graph.add(SceneNode::new("box", Geometry::Box {
            half_extents: Vec3::ONE,
        }));
        let frame = graph.begin_frame();

        let t = Transform::from_translation(Vec3::new(0.0, 3.0, 0.0));
        assert!(graph.set_transform(id, t));

        let node = graph.get(id).unwrap();
        assert_eq!(node.transform(), t);
        assert_eq!(node.transform_writes(), 1);
        assert_eq!(node.last_write_frame(), Some(frame));
    }

    #[test]
    fn test_write_to_missing_node() {
        let mut graph = SceneGraph::new();
        let id = graph.add(SceneNode::new("gone", Geometry::Axes { size: 1.0 }));
        graph.remove(id);
        assert!(!graph.set_transform(id, Transform::IDENTITY));
        assert!(!graph.set_visible(id, false));
    }

    #[test]
    fn test_layer_flag_hides_all_nodes_on_layer() {
        let mut graph = SceneGraph::new();
        let main = graph.add(SceneNode::new("ball", Geometry::Sphere { radius: 1.0 }));
        let wire_a = graph.add(
            SceneNode::new("wire a", Geometry::Wire(WireMesh::default())).on_layer(Layer::Debug),
        );
        let wire_b = graph.add(
            SceneNode::new("wire b", Geometry::Wire(WireMesh::default())).on_layer(Layer::Debug),
        );

        graph.set_layer_visible(Layer::Debug, false);

        assert!(graph.is_visible(main));
        assert!(!graph.is_visible(wire_a));
        assert!(!graph.is_visible(wire_b));
        assert_eq!(graph.visible_nodes().count(), 1);

        graph.set_layer_visible(Layer::Debug, true);
        assert!(graph.is_visible(wire_a));
        assert_eq!(graph.count_on_layer(Layer::Debug), 2);
    }

    #[test]
    fn test_node_flag_and_layer_flag_combine() {
        let mut graph = SceneGraph::new();
        let id = graph.add(SceneNode::new("ball", Geometry::Sphere { radius: 1.0 }).with_visible(false));

        assert!(!graph.is_visible(id));
        graph.set_visible(id, true);
        assert!(graph.is_visible(id));
    }
}
