use bevy::math::Vec3;

use super::{Geometry, PerspectiveCamera};

/// Handle to a node in a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GeometryId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl GeometryId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl MaterialId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl TextureId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Phong-style surface description.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// `0xRRGGBB`
    pub color: u32,
    /// Specular exponent
    pub shininess: f32,
    pub flat_shading: bool,
    pub double_sided: bool,
    /// Textures owned by this material, released with it
    pub textures: Vec<TextureId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    /// `0xRRGGBB`
    pub color: u32,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        geometry: GeometryId,
        material: MaterialId,
    },
    AmbientLight(Light),
    PointLight(Light),
    Camera(PerspectiveCamera),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub kind: NodeKind,
    pub position: Vec3,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed scene tree. Node 0 is the root group and is never removed.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Option<SceneNode>>,
    geometries: Vec<Option<Geometry>>,
    materials: Vec<Option<Material>>,
    textures: Vec<Option<Texture>>,
    active_camera: Option<NodeId>,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    pub fn new() -> Self {
        let root = SceneNode {
            kind: NodeKind::Group,
            position: Vec3::ZERO,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![Some(root)],
            geometries: Vec::new(),
            materials: Vec::new(),
            textures: Vec::new(),
            active_camera: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Adds a node directly under the root.
    pub fn add(&mut self, kind: NodeKind, position: Vec3) -> NodeId {
        let root = self.root();
        self.insert_node(root, kind, position)
    }

    /// Adds a node under `parent`. Returns `None` if `parent` is gone.
    pub fn add_child(&mut self, parent: NodeId, kind: NodeKind, position: Vec3) -> Option<NodeId> {
        self.node(parent)?;
        Some(self.insert_node(parent, kind, position))
    }

    fn insert_node(&mut self, parent: NodeId, kind: NodeKind, position: Vec3) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(SceneNode {
            kind,
            position,
            parent: Some(parent),
            children: Vec::new(),
        }));
        if let Some(parent) = self.nodes[parent.0].as_mut() {
            parent.children.push(id);
        }
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)?.as_ref()
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)?.as_mut()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|node| node.children()).unwrap_or(&[])
    }

    /// Live nodes in depth-first pre-order, root first.
    pub fn depth_first(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.node_count());
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.children(id).iter().rev());
        }
        order
    }

    /// Removes `id` from its parent and the arena, returning it.
    /// The root cannot be detached.
    pub fn detach(&mut self, id: NodeId) -> Option<SceneNode> {
        if id == self.root() {
            return None;
        }
        let node = self.nodes.get_mut(id.0)?.take()?;
        if let Some(parent) = node.parent.and_then(|p| self.node_mut(p)) {
            parent.children.retain(|child| *child != id);
        }
        if self.active_camera == Some(id) {
            self.active_camera = None;
        }
        Some(node)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(Some(geometry));
        GeometryId(self.geometries.len() - 1)
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&Geometry> {
        self.geometries.get(id.0)?.as_ref()
    }

    pub fn geometry_mut(&mut self, id: GeometryId) -> Option<&mut Geometry> {
        self.geometries.get_mut(id.0)?.as_mut()
    }

    pub fn geometries_mut(&mut self) -> impl Iterator<Item = (GeometryId, &mut Geometry)> {
        self.geometries
            .iter_mut()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_mut().map(|g| (GeometryId(i), g)))
    }

    pub fn take_geometry(&mut self, id: GeometryId) -> Option<Geometry> {
        self.geometries.get_mut(id.0)?.take()
    }

    pub fn geometry_count(&self) -> usize {
        self.geometries.iter().flatten().count()
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(Some(material));
        MaterialId(self.materials.len() - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)?.as_ref()
    }

    pub fn take_material(&mut self, id: MaterialId) -> Option<Material> {
        self.materials.get_mut(id.0)?.take()
    }

    pub fn material_count(&self) -> usize {
        self.materials.iter().flatten().count()
    }

    pub fn add_texture(&mut self, texture: Texture) -> TextureId {
        self.textures.push(Some(texture));
        TextureId(self.textures.len() - 1)
    }

    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.textures.get(id.0)?.as_ref()
    }

    pub fn take_texture(&mut self, id: TextureId) -> Option<Texture> {
        self.textures.get_mut(id.0)?.take()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.iter().flatten().count()
    }

    pub fn camera(&self, id: NodeId) -> Option<&PerspectiveCamera> {
        match &self.node(id)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self, id: NodeId) -> Option<&mut PerspectiveCamera> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Camera(camera) => Some(camera),
            _ => None,
        }
    }

    /// Designates the camera the scene is rendered through. Ignored if `id`
    /// is not a camera node.
    pub fn set_active_camera(&mut self, id: NodeId) {
        if self.camera(id).is_some() {
            self.active_camera = Some(id);
        }
    }

    pub fn active_camera(&self) -> Option<NodeId> {
        self.active_camera
    }

    pub fn active_camera_mut(&mut self) -> Option<&mut PerspectiveCamera> {
        let id = self.active_camera?;
        self.camera_mut(id)
    }

    /// True when nothing but the root remains.
    pub fn is_empty(&self) -> bool {
        self.children(self.root()).is_empty()
    }
}
