use ve_scene::{mesh::PrimitiveKind, scene::Node};

/// Where the primitives of one original mesh ended up in the new mesh list.
///
/// A split mesh stores one new index per primitive kind in the slot of that kind.
/// A mesh that was kept as it is stores its new index in the first slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeshRemap {
    slots: [Option<u32>; 4],
}

impl MeshRemap {
    pub fn single(index: u32) -> Self {
        Self {
            slots: [Some(index), None, None, None],
        }
    }

    pub fn set(&mut self, kind: PrimitiveKind, index: u32) {
        self.slots[kind.slot()] = Some(index);
    }

    pub fn get(&self, kind: PrimitiveKind) -> Option<u32> {
        self.slots[kind.slot()]
    }

    /// New mesh indices in slot order
    pub fn indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One [`MeshRemap`] per mesh of the original mesh list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexRemapTable {
    entries: Vec<MeshRemap>,
}

impl IndexRemapTable {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Appends the record of the next original mesh
    pub fn push(&mut self, remap: MeshRemap) {
        self.entries.push(remap);
    }

    pub fn get(&self, original: u32) -> &MeshRemap {
        self.entries.get(original as usize).unwrap_or_else(|| {
            panic!(
                "Mesh index {} out of range, only {} meshes were processed",
                original,
                self.entries.len()
            )
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrites the mesh references of `node` and all its descendants.
    ///
    /// Each reference is replaced by the new meshes of its record, in slot order.
    ///
    /// # Panics
    /// If a node with mesh references would end up without any.
    pub fn update_nodes(&self, node: &mut Node) {
        if !node.meshes.is_empty() {
            let new_len: usize = node.meshes.iter().map(|&m| self.get(m).len()).sum();
            assert_ne!(new_len, 0, "Node \"{}\" lost all its meshes", node.name);

            let mut meshes = Vec::with_capacity(new_len);
            for &m in &node.meshes {
                meshes.extend(self.get(m).indices());
            }
            node.meshes = meshes;
        }

        for child in &mut node.children {
            self.update_nodes(child);
        }
    }
}
