use crate::mesh::Mesh;

/// Per-vertex view of the bone weights of a mesh: for each vertex the `(bone_id, weight)`
/// pairs that influence it, in bone order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexWeightTable {
    entries: Vec<Vec<(u32, f32)>>,
}

impl VertexWeightTable {
    /// Builds the table for `mesh`. Returns `None` if the mesh has no bones.
    pub fn compute(mesh: &Mesh) -> Option<Self> {
        if !mesh.has_bones() {
            return None;
        }

        let mut entries = vec![Vec::new(); mesh.num_vertices];
        for (bone_id, bone) in mesh.bones.iter().enumerate() {
            for w in &bone.weights {
                entries[w.vertex_id as usize].push((bone_id as u32, w.weight));
            }
        }

        Some(Self { entries })
    }

    pub fn weights_of(&self, vertex: usize) -> &[(u32, f32)] {
        &self.entries[vertex]
    }

    pub fn num_vertices(&self) -> usize {
        self.entries.len()
    }
}
