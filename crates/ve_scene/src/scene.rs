use crate::error::{Result, SceneError};
use crate::mesh::Mesh;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A node of the scene graph. Owns its children and references meshes of the scene by index.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    /// Indices into [`Scene::meshes`]; may contain duplicates
    pub meshes: Vec<u32>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_meshes(mut self, meshes: Vec<u32>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Visits this node and all of its descendants depth first, parents before children
    pub fn visit<'a, F: FnMut(&'a Node)>(&'a self, f: &mut F) {
        f(self);
        for child in &self.children {
            child.visit(f);
        }
    }

    /// Finds the first node with the given name in this subtree
    pub fn find(&self, name: &str) -> Option<&Node> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub root: Node,
}

impl Scene {
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Ok(bincode::deserialize::<Scene>(&bytes)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        Scene::from_bytes(data)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(&self)?)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?)?;
        Ok(())
    }

    /// Checks every mesh and every mesh reference of the node tree
    pub fn validate(&self) -> std::result::Result<(), SceneError> {
        for (idx, mesh) in self.meshes.iter().enumerate() {
            mesh.validate(idx)?;
        }

        let mut result = Ok(());
        self.root.visit(&mut |node| {
            if result.is_err() {
                return;
            }
            if let Some(&index) = node
                .meshes
                .iter()
                .find(|&&i| i as usize >= self.meshes.len())
            {
                result = Err(SceneError::InvalidMeshReference {
                    node: node.name.clone(),
                    index,
                    num_meshes: self.meshes.len(),
                });
            }
        });
        result
    }
}
