use thiserror::Error;

pub type Result<T> = ::std::result::Result<T, FormatError>;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("Serialization Error: {0}")]
    SerializationError(#[from] Box<bincode::ErrorKind>),
    #[error("IO Error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Structural problems found by [`crate::scene::Scene::validate`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Node \"{node}\" references mesh {index}, but the scene only has {num_meshes} meshes")]
    InvalidMeshReference {
        node: String,
        index: u32,
        num_meshes: usize,
    },
    #[error("Mesh {mesh} has no faces")]
    NoFaces { mesh: usize },
    #[error("Face {face} of mesh {mesh} has no indices")]
    EmptyFace { mesh: usize, face: usize },
    #[error("Face {face} of mesh {mesh} references vertex {index}, but the mesh only has {num_vertices} vertices")]
    VertexIndexOutOfRange {
        mesh: usize,
        face: usize,
        index: u32,
        num_vertices: usize,
    },
    #[error("Stream `{stream}` of mesh {mesh} has {len} elements, expected {num_vertices}")]
    StreamLengthMismatch {
        mesh: usize,
        stream: &'static str,
        len: usize,
        num_vertices: usize,
    },
    #[error("Bone \"{bone}\" of mesh {mesh} weights vertex {vertex_id}, but the mesh only has {num_vertices} vertices")]
    BoneWeightOutOfRange {
        mesh: usize,
        bone: String,
        vertex_id: u32,
        num_vertices: usize,
    },
}
