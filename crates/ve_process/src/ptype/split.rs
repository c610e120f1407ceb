use log::debug;
use ve_scene::{
    mesh::{
        Bone, Face, Mesh, PrimitiveKind, TangentFrames, VertexWeight, MAX_COLOR_SETS,
        MAX_TEXTURE_COORDS,
    },
    weights::VertexWeightTable,
};

/// Result of splitting a single mesh
#[derive(Debug)]
pub(crate) enum SplitOutcome {
    /// The mesh holds a single primitive type and is kept as it is
    Unchanged(Mesh),
    /// One new mesh per primitive kind, in slot order
    Split(Vec<(PrimitiveKind, Mesh)>),
}

/// Splits a classified mesh into one mesh per primitive kind.
///
/// The source mesh is consumed: index lists move to the new faces, attribute values are
/// copied into tightly sized streams and bone weights are partitioned between the outputs.
///
/// # Panics
/// If the mesh was not classified or a kind in its primitive types has no faces.
pub(crate) fn split_mesh(mut mesh: Mesh) -> SplitOutcome {
    let types = mesh.primitive_types;
    assert!(
        !types.is_empty(),
        "Mesh \"{}\" has no primitive types, run the classification first",
        mesh.name
    );

    let num_types = types.kind_count();
    if num_types == 1 {
        return SplitOutcome::Unchanged(mesh);
    }

    // move every face into the bucket of its kind, keeping the original order
    let mut buckets: [Vec<Face>; 4] = Default::default();
    let mut num_polygon_vertices = 0;
    for face in std::mem::take(&mut mesh.faces) {
        let kind = face.kind();
        if kind == PrimitiveKind::Polygon {
            num_polygon_vertices += face.indices.len();
        }
        buckets[kind.slot()].push(face);
    }

    for kind in types.kinds() {
        assert!(
            !buckets[kind.slot()].is_empty(),
            "Mesh \"{}\" claims {:?} primitives but has none",
            mesh.name,
            kind
        );
    }

    let weights = VertexWeightTable::compute(&mesh);
    let mut outputs = Vec::with_capacity(num_types);

    for (kind, faces) in PrimitiveKind::ALL.into_iter().zip(buckets) {
        if faces.is_empty() {
            continue;
        }

        let num_vertices = match kind {
            PrimitiveKind::Polygon => num_polygon_vertices,
            _ => faces.len() * (kind.slot() + 1),
        };

        let mut copier = StreamCopier::new(&mesh, kind, faces.len(), num_vertices, num_types);
        for face in faces {
            copier.push_face(face, weights.as_ref());
        }

        debug!(
            "Split {} {:?} primitives with {} vertices off mesh \"{}\"",
            copier.out.faces.len(),
            kind,
            num_vertices,
            mesh.name
        );
        outputs.push((kind, copier.finish()));
    }

    SplitOutcome::Split(outputs)
}

fn stream<T>(present: bool, capacity: usize) -> Option<Vec<T>> {
    present.then(|| Vec::with_capacity(capacity))
}

/// Builds one output mesh by streaming vertices out of the source mesh
struct StreamCopier<'a> {
    src: &'a Mesh,
    out: Mesh,
    /// weights collected per source bone, indexed by source bone id
    bone_weights: Vec<Vec<VertexWeight>>,
    next_vertex: u32,
}

impl<'a> StreamCopier<'a> {
    fn new(
        src: &'a Mesh,
        kind: PrimitiveKind,
        num_faces: usize,
        num_vertices: usize,
        num_types: usize,
    ) -> Self {
        let mut texture_coords: [Option<Vec<_>>; MAX_TEXTURE_COORDS] = Default::default();
        for (dst, channel) in texture_coords.iter_mut().zip(&src.texture_coords) {
            *dst = stream(channel.is_some(), num_vertices);
        }
        let mut colors: [Option<Vec<_>>; MAX_COLOR_SETS] = Default::default();
        for (dst, channel) in colors.iter_mut().zip(&src.colors) {
            *dst = stream(channel.is_some(), num_vertices);
        }

        let out = Mesh {
            name: src.name.clone(),
            primitive_types: kind.flag(),
            material_index: src.material_index,
            num_vertices,
            positions: stream(src.positions.is_some(), num_vertices),
            normals: stream(src.normals.is_some(), num_vertices),
            tangents: src
                .tangents
                .as_ref()
                .map(|_| TangentFrames::with_capacity(num_vertices)),
            texture_coords,
            num_uv_components: src.num_uv_components,
            colors,
            faces: Vec::with_capacity(num_faces),
            bones: Vec::new(),
        };

        // rough guess, the weights are shared between `num_types` outputs
        let bone_weights = src
            .bones
            .iter()
            .map(|bone| Vec::with_capacity(bone.weights.len() / (num_types - 1)))
            .collect();

        Self {
            src,
            out,
            bone_weights,
            next_vertex: 0,
        }
    }

    /// Takes over the index list of `face`, rewriting it to the new sequential vertices
    fn push_face(&mut self, mut face: Face, weights: Option<&VertexWeightTable>) {
        for index in face.indices.iter_mut() {
            let src_idx = *index as usize;
            let dst_idx = self.next_vertex;

            if let Some(table) = weights {
                for &(bone_id, weight) in table.weights_of(src_idx) {
                    self.bone_weights[bone_id as usize].push(VertexWeight {
                        vertex_id: dst_idx,
                        weight,
                    });
                }
            }

            self.copy_vertex(src_idx);
            *index = dst_idx;
            self.next_vertex += 1;
        }
        self.out.faces.push(face);
    }

    fn copy_vertex(&mut self, idx: usize) {
        let (src, out) = (self.src, &mut self.out);

        if let (Some(src), Some(dst)) = (&src.positions, &mut out.positions) {
            dst.push(src[idx]);
        }
        if let (Some(src), Some(dst)) = (&src.normals, &mut out.normals) {
            dst.push(src[idx]);
        }
        if let (Some(src), Some(dst)) = (&src.tangents, &mut out.tangents) {
            dst.tangents.push(src.tangents[idx]);
            dst.bitangents.push(src.bitangents[idx]);
        }
        for (src, dst) in src.texture_coords.iter().zip(out.texture_coords.iter_mut()) {
            if let (Some(src), Some(dst)) = (src, dst) {
                dst.push(src[idx]);
            }
        }
        for (src, dst) in src.colors.iter().zip(out.colors.iter_mut()) {
            if let (Some(src), Some(dst)) = (src, dst) {
                dst.push(src[idx]);
            }
        }
    }

    fn finish(self) -> Mesh {
        let Self {
            src,
            mut out,
            bone_weights,
            next_vertex,
        } = self;

        assert_eq!(
            next_vertex as usize, out.num_vertices,
            "Vertex count of split mesh \"{}\" does not match its faces",
            out.name
        );

        // bones without weights in this part are left out
        out.bones = src
            .bones
            .iter()
            .zip(bone_weights)
            .filter(|(_, weights)| !weights.is_empty())
            .map(|(bone, weights)| Bone {
                name: bone.name.clone(),
                offset: bone.offset.clone(),
                weights,
            })
            .collect();

        out
    }
}
