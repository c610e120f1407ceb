mod classify;
mod remap;
mod split;

pub use remap::{IndexRemapTable, MeshRemap};

use log::{debug, info};
use rayon::prelude::*;
use ve_scene::{
    mesh::{Mesh, PrimitiveKind},
    scene::Scene,
};

use crate::step::{ProcessFlags, ProcessStep};

use self::split::{split_mesh, SplitOutcome};

/// Determines the primitive types of every mesh and collapses degenerated primitives.
/// Always active.
#[derive(Debug, Clone, Copy)]
pub struct DeterminePrimitiveTypes {
    pub parallel: bool,
}

impl Default for DeterminePrimitiveTypes {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl DeterminePrimitiveTypes {
    /// Classifies all meshes of `scene`, returns the number of meshes that had degenerated primitives
    pub fn determine(&self, scene: &mut Scene) -> usize {
        if self.parallel {
            scene
                .meshes
                .par_iter_mut()
                .map(classify::classify_mesh)
                .filter(|&degenerated| degenerated)
                .count()
        } else {
            scene
                .meshes
                .iter_mut()
                .map(classify::classify_mesh)
                .filter(|&degenerated| degenerated)
                .count()
        }
    }
}

impl ProcessStep for DeterminePrimitiveTypes {
    fn name(&self) -> &'static str {
        "DeterminePrimitiveTypes"
    }

    fn is_active(&self, _flags: ProcessFlags) -> bool {
        true
    }

    fn execute(&self, scene: &mut Scene) {
        let degenerated = self.determine(scene);
        debug!(
            "Classified {} meshes, {} with degenerated primitives",
            scene.meshes.len(),
            degenerated
        );
    }
}

/// Number of output meshes holding each primitive kind after sorting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SortReport {
    pub split_meshes: usize,
    pub points: usize,
    pub lines: usize,
    pub triangles: usize,
    pub polygons: usize,
}

impl SortReport {
    fn count(&mut self, mesh: &Mesh) {
        for kind in mesh.primitive_types.kinds() {
            match kind {
                PrimitiveKind::Point => self.points += 1,
                PrimitiveKind::Line => self.lines += 1,
                PrimitiveKind::Triangle => self.triangles += 1,
                PrimitiveKind::Polygon => self.polygons += 1,
            }
        }
    }
}

/// Splits meshes with mixed primitive types into one mesh per type and updates the
/// node tree to reference the new meshes. Requires classified meshes.
#[derive(Debug, Clone, Copy)]
pub struct SortByPrimitiveType {
    pub parallel: bool,
}

impl Default for SortByPrimitiveType {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl SortByPrimitiveType {
    pub fn sort(&self, scene: &mut Scene) -> SortReport {
        let mut report = SortReport::default();
        if scene.meshes.is_empty() {
            return report;
        }

        let meshes = std::mem::take(&mut scene.meshes);
        let num_meshes = meshes.len();

        let outcomes: Vec<SplitOutcome> = if self.parallel {
            meshes.into_par_iter().map(split_mesh).collect()
        } else {
            meshes.into_iter().map(split_mesh).collect()
        };

        // new indices are handed out in the original mesh order
        let mut out_meshes = Vec::with_capacity(num_meshes * 2);
        let mut table = IndexRemapTable::with_capacity(num_meshes);
        for outcome in outcomes {
            match outcome {
                SplitOutcome::Unchanged(mesh) => {
                    table.push(MeshRemap::single(out_meshes.len() as u32));
                    report.count(&mesh);
                    out_meshes.push(mesh);
                }
                SplitOutcome::Split(parts) => {
                    assert!(!parts.is_empty(), "Splitting produced no meshes");
                    report.split_meshes += 1;

                    let mut remap = MeshRemap::default();
                    for (kind, mesh) in parts {
                        remap.set(kind, out_meshes.len() as u32);
                        report.count(&mesh);
                        out_meshes.push(mesh);
                    }
                    table.push(remap);
                }
            }
        }

        table.update_nodes(&mut scene.root);
        rebuild_mesh_list(scene, out_meshes, num_meshes);

        report
    }
}

/// Installs the meshes in the order they were emitted, which is the order the remap table refers to
fn rebuild_mesh_list(scene: &mut Scene, meshes: Vec<Mesh>, num_original: usize) {
    if meshes.len() != num_original {
        debug!(
            "Mesh list grew from {} to {} meshes",
            num_original,
            meshes.len()
        );
    }
    scene.meshes = meshes;
}

impl ProcessStep for SortByPrimitiveType {
    fn name(&self) -> &'static str {
        "SortByPrimitiveType"
    }

    fn is_active(&self, flags: ProcessFlags) -> bool {
        flags.contains(ProcessFlags::SORT_BY_PTYPE)
    }

    fn execute(&self, scene: &mut Scene) {
        let report = self.sort(scene);
        info!(
            "Sorted {} meshes by primitive type. Points: {}, Lines: {}, Triangles: {}, Polygons: {}",
            report.split_meshes, report.points, report.lines, report.triangles, report.polygons
        );
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use gfx_maths::Vec3;
    use ve_scene::{
        mesh::{Face, PrimitiveTypes},
        scene::Node,
    };

    fn positions(n: usize) -> Vec<Vec3> {
        (0..n).map(|i| Vec3::new(i as f32, 1.0, 0.0)).collect()
    }

    fn mixed_scene() -> Scene {
        let mixed = Mesh::from_positions(
            positions(6),
            vec![
                Face::new(vec![0, 1, 2]),
                Face::new(vec![3, 4]),
                Face::new(vec![3, 4]),
                Face::new(vec![5]),
            ],
        );
        let triangles = Mesh::from_positions(positions(3), vec![Face::new(vec![0, 1, 2])]);

        Scene {
            meshes: vec![triangles, mixed],
            root: Node::new("root")
                .with_meshes(vec![0])
                .with_child(Node::new("mixed").with_meshes(vec![1])),
        }
    }

    #[test]
    fn test_end_to_end() {
        for parallel in [false, true] {
            let mut scene = mixed_scene();
            assert_eq!(DeterminePrimitiveTypes { parallel }.determine(&mut scene), 0);
            assert_eq!(
                scene.meshes[1].primitive_types,
                PrimitiveTypes::POINT | PrimitiveTypes::LINE | PrimitiveTypes::TRIANGLE
            );

            let report = SortByPrimitiveType { parallel }.sort(&mut scene);
            assert_eq!(
                report,
                SortReport {
                    split_meshes: 1,
                    points: 1,
                    lines: 1,
                    triangles: 2,
                    polygons: 0,
                }
            );

            assert_eq!(scene.meshes.len(), 4);
            assert_eq!(scene.root.meshes, vec![0]);
            assert_eq!(scene.root.children[0].meshes, vec![1, 2, 3]);

            let face_counts: Vec<_> = scene.meshes.iter().map(|m| m.faces.len()).collect();
            assert_eq!(face_counts, vec![1, 1, 2, 1]);
            assert_eq!(scene.meshes[1].primitive_types, PrimitiveTypes::POINT);
            assert_eq!(scene.meshes[2].primitive_types, PrimitiveTypes::LINE);
            assert_eq!(scene.meshes[3].primitive_types, PrimitiveTypes::TRIANGLE);
            assert_eq!(scene.validate(), Ok(()));
        }
    }

    #[test]
    fn test_single_type_meshes_keep_indices() {
        let mut scene = Scene {
            meshes: vec![
                Mesh::from_positions(positions(2), vec![Face::new(vec![0, 1])]),
                Mesh::from_positions(positions(1), vec![Face::new(vec![0])]),
            ],
            root: Node::new("root").with_meshes(vec![1, 0, 1]),
        };
        DeterminePrimitiveTypes::default().determine(&mut scene);
        let expected = scene.meshes.clone();

        let report = SortByPrimitiveType::default().sort(&mut scene);

        assert_eq!(report.split_meshes, 0);
        assert_eq!(scene.meshes, expected);
        assert_eq!(scene.root.meshes, vec![1, 0, 1]);
    }

    #[test]
    fn test_empty_scene() {
        let mut scene = Scene::default();
        let report = SortByPrimitiveType::default().sort(&mut scene);
        assert_eq!(report, SortReport::default());
        assert!(scene.meshes.is_empty());
    }

    #[test]
    fn test_activation() {
        assert!(DeterminePrimitiveTypes::default().is_active(ProcessFlags::empty()));
        assert!(!SortByPrimitiveType::default().is_active(ProcessFlags::empty()));
        assert!(SortByPrimitiveType::default().is_active(ProcessFlags::SORT_BY_PTYPE));
    }
}
