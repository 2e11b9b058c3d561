//! Scene contents: an ordered node list and a separate light list.

use crate::light::Light;
use crate::mesh::Mesh;
use crate::transform::Object3D;

/// An entry in the scene's node list. Only meshes are drawn.
pub enum SceneNode {
    Mesh(Mesh),
    Object(Object3D),
}

/// Anything that can be passed to [`Scene::add`].
pub enum SceneItem {
    Node(SceneNode),
    Light(Light),
}

impl From<SceneNode> for SceneItem {
    fn from(node: SceneNode) -> Self {
        SceneItem::Node(node)
    }
}

impl From<Mesh> for SceneItem {
    fn from(mesh: Mesh) -> Self {
        SceneItem::Node(SceneNode::Mesh(mesh))
    }
}

impl From<Object3D> for SceneItem {
    fn from(object: Object3D) -> Self {
        SceneItem::Node(SceneNode::Object(object))
    }
}

impl From<Light> for SceneItem {
    fn from(light: Light) -> Self {
        SceneItem::Light(light)
    }
}

/// Objects are drawn in insertion order. Lights are kept apart from the
/// nodes, and only the first light is used for shading.
#[derive(Default)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a mesh, object or light.
    pub fn add(&mut self, item: impl Into<SceneItem>) {
        match item.into() {
            SceneItem::Light(light) => self.lights.push(light),
            SceneItem::Node(node) => self.nodes.push(node),
        }
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SceneNode] {
        &mut self.nodes
    }

    pub fn meshes(&self) -> impl Iterator<Item = &Mesh> {
        self.nodes.iter().filter_map(|node| match node {
            SceneNode::Mesh(mesh) => Some(mesh),
            SceneNode::Object(_) => None,
        })
    }

    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        self.nodes.iter_mut().filter_map(|node| match node {
            SceneNode::Mesh(mesh) => Some(mesh),
            SceneNode::Object(_) => None,
        })
    }

    /// Mesh at position `index` among the scene's meshes.
    pub fn mesh_mut(&mut self, index: usize) -> Option<&mut Mesh> {
        self.meshes_mut().nth(index)
    }

    /// The light used for shading.
    pub fn light(&self) -> Option<&Light> {
        self.lights.first()
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn lights_mut(&mut self) -> &mut [Light] {
        &mut self.lights
    }

    /// Refreshes the cached model matrix of every non-drawn object.
    pub fn update_objects(&mut self) {
        for node in &mut self.nodes {
            if let SceneNode::Object(object) = node {
                object.update_model_matrix();
            }
        }
    }
}
