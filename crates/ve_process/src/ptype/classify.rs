use gfx_maths::Vec3;
use log::warn;
use ve_scene::mesh::{Face, Mesh, PrimitiveTypes};

/// Determines the primitive types of `mesh` if they are not known yet.
///
/// Degenerate triangles and lines (two or more corners at the exact same position) are
/// collapsed to lines and points in place. Faces are never dropped. Returns `true` if any
/// face was collapsed.
pub(crate) fn classify_mesh(mesh: &mut Mesh) -> bool {
    if !mesh.primitive_types.is_empty() {
        return false;
    }

    let positions = mesh.positions.as_deref();
    let mut types = PrimitiveTypes::empty();
    let mut degenerated = false;

    for face in &mut mesh.faces {
        let (kind, collapsed) = classify_face(face, positions);
        types |= kind;
        degenerated |= collapsed;
    }

    mesh.primitive_types = types;

    if degenerated {
        warn!("Found degenerated primitives in mesh \"{}\"", mesh.name);
    }

    degenerated
}

// Re-evaluates the face after every collapse: triangle -> line -> point.
// Each step shrinks the index list, so this runs at most three times.
fn classify_face(face: &mut Face, positions: Option<&[Vec3]>) -> (PrimitiveTypes, bool) {
    // without positions nothing can be degenerated
    let same = |a: u32, b: u32| positions.map_or(false, |p| p[a as usize] == p[b as usize]);
    let mut collapsed = false;

    loop {
        match face.indices[..] {
            [a, b, c] => {
                face.indices = if same(a, b) || same(b, c) {
                    vec![a, c]
                } else if same(c, a) {
                    vec![a, b]
                } else {
                    return (PrimitiveTypes::TRIANGLE, collapsed);
                };
                collapsed = true;
            }
            [a, b] => {
                if !same(a, b) {
                    return (PrimitiveTypes::LINE, collapsed);
                }
                face.indices = vec![a];
                collapsed = true;
            }
            [_] => return (PrimitiveTypes::POINT, collapsed),
            _ => return (PrimitiveTypes::POLYGON, collapsed),
        }
    }
}
