use bitflags::bitflags;
use gfx_maths::*;
use serde::{Deserialize, Serialize};

use crate::error::SceneError;

/// Number of texture coordinate channels a mesh can carry
pub const MAX_TEXTURE_COORDS: usize = 4;
/// Number of vertex color channels a mesh can carry
pub const MAX_COLOR_SETS: usize = 4;

bitflags! {
    /// Set of primitive kinds found in a mesh. Empty means the mesh was not classified yet.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PrimitiveTypes: u32 {
        const POINT = 1 << 0;
        const LINE = 1 << 1;
        const TRIANGLE = 1 << 2;
        const POLYGON = 1 << 3;
    }
}

impl Default for PrimitiveTypes {
    fn default() -> Self {
        Self::empty()
    }
}

impl PrimitiveTypes {
    /// Number of distinct primitive kinds in the set
    pub fn kind_count(self) -> usize {
        self.bits().count_ones() as usize
    }

    /// Iterates the kinds in the set in slot order
    pub fn kinds(self) -> impl Iterator<Item = PrimitiveKind> {
        PrimitiveKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(kind.flag()))
    }
}

/// A single primitive kind, ordered by its number of indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveKind {
    Point,
    Line,
    Triangle,
    Polygon,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::Point,
        PrimitiveKind::Line,
        PrimitiveKind::Triangle,
        PrimitiveKind::Polygon,
    ];

    /// Kind of a face with `count` indices; anything that is not 1, 2 or 3 is a polygon
    pub fn from_index_count(count: usize) -> Self {
        match count {
            1 => PrimitiveKind::Point,
            2 => PrimitiveKind::Line,
            3 => PrimitiveKind::Triangle,
            _ => PrimitiveKind::Polygon,
        }
    }

    /// Slot of this kind: point = 0, line = 1, triangle = 2, polygon = 3
    pub fn slot(self) -> usize {
        self as usize
    }

    pub fn flag(self) -> PrimitiveTypes {
        PrimitiveTypes::from_bits_truncate(1 << self.slot())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Face {
    pub indices: Vec<u32>,
}

impl Face {
    pub fn new(indices: Vec<u32>) -> Self {
        Self { indices }
    }

    pub fn kind(&self) -> PrimitiveKind {
        PrimitiveKind::from_index_count(self.indices.len())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VertexWeight {
    pub vertex_id: u32,
    pub weight: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bone {
    pub name: String,
    /// Transforms from mesh space to bone space in bind pose
    pub offset: Mat4,
    pub weights: Vec<VertexWeight>,
}

/// Tangents and bitangents always come in pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TangentFrames {
    pub tangents: Vec<Vec3>,
    pub bitangents: Vec<Vec3>,
}

impl TangentFrames {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            tangents: Vec::with_capacity(capacity),
            bitangents: Vec::with_capacity(capacity),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub primitive_types: PrimitiveTypes,
    /// Index into the material table of the importer; opaque to the processing steps
    pub material_index: u32,
    pub num_vertices: usize,
    pub positions: Option<Vec<Vec3>>,
    pub normals: Option<Vec<Vec3>>,
    pub tangents: Option<TangentFrames>,
    pub texture_coords: [Option<Vec<Vec3>>; MAX_TEXTURE_COORDS],
    /// Number of meaningful components (1 to 3) per texture coordinate channel
    pub num_uv_components: [u32; MAX_TEXTURE_COORDS],
    pub colors: [Option<Vec<Vec4>>; MAX_COLOR_SETS],
    pub faces: Vec<Face>,
    pub bones: Vec<Bone>,
}

impl Mesh {
    /// Creates a mesh from positions and faces; all other streams are absent
    pub fn from_positions(positions: Vec<Vec3>, faces: Vec<Face>) -> Self {
        Self {
            num_vertices: positions.len(),
            positions: Some(positions),
            faces,
            ..Default::default()
        }
    }

    pub fn has_bones(&self) -> bool {
        !self.bones.is_empty()
    }

    /// Checks that the mesh has faces, every face has indices and all streams, faces and
    /// bone weights agree with `num_vertices`.
    /// `mesh` is the index of this mesh in its scene and only used for reporting.
    pub fn validate(&self, mesh: usize) -> Result<(), SceneError> {
        let num_vertices = self.num_vertices;
        let check = |stream: &'static str, len: usize| {
            if len == num_vertices {
                Ok(())
            } else {
                Err(SceneError::StreamLengthMismatch {
                    mesh,
                    stream,
                    len,
                    num_vertices,
                })
            }
        };

        if let Some(positions) = &self.positions {
            check("positions", positions.len())?;
        }
        if let Some(normals) = &self.normals {
            check("normals", normals.len())?;
        }
        if let Some(frames) = &self.tangents {
            check("tangents", frames.tangents.len())?;
            check("bitangents", frames.bitangents.len())?;
        }
        for channel in self.texture_coords.iter().flatten() {
            check("texture_coords", channel.len())?;
        }
        for channel in self.colors.iter().flatten() {
            check("colors", channel.len())?;
        }

        if self.faces.is_empty() {
            return Err(SceneError::NoFaces { mesh });
        }
        for (face_idx, face) in self.faces.iter().enumerate() {
            if face.indices.is_empty() {
                return Err(SceneError::EmptyFace {
                    mesh,
                    face: face_idx,
                });
            }
            if let Some(&index) = face.indices.iter().find(|&&i| i as usize >= num_vertices) {
                return Err(SceneError::VertexIndexOutOfRange {
                    mesh,
                    face: face_idx,
                    index,
                    num_vertices,
                });
            }
        }

        for bone in &self.bones {
            if let Some(w) = bone
                .weights
                .iter()
                .find(|w| w.vertex_id as usize >= num_vertices)
            {
                return Err(SceneError::BoneWeightOutOfRange {
                    mesh,
                    bone: bone.name.clone(),
                    vertex_id: w.vertex_id,
                    num_vertices,
                });
            }
        }

        Ok(())
    }
}
