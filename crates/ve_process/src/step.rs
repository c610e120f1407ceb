use bitflags::bitflags;
use log::{debug, info};
use ve_scene::{error::SceneError, scene::Scene};

use crate::ptype::{DeterminePrimitiveTypes, SortByPrimitiveType};

bitflags! {
    /// Requested post-processing
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProcessFlags: u32 {
        /// Validate the scene before and after processing
        const VALIDATE_STRUCTURE = 1 << 10;
        /// Split meshes with mixed primitive types into one mesh per type
        const SORT_BY_PTYPE = 1 << 15;
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ProcessError {
    #[error("Scene is invalid before processing: {0}")]
    InvalidInput(#[source] SceneError),
    #[error("Processing produced an invalid scene: {0}")]
    InvalidOutput(#[source] SceneError),
}

/// A single post-processing step working on a whole scene
pub trait ProcessStep {
    fn name(&self) -> &'static str;

    /// Whether the step runs for the given flags
    fn is_active(&self, flags: ProcessFlags) -> bool;

    fn execute(&self, scene: &mut Scene);
}

/// Runs a list of steps in order
pub struct PostProcessor {
    steps: Vec<Box<dyn ProcessStep>>,
}

impl PostProcessor {
    /// The default steps: primitive type classification followed by sorting by primitive type
    pub fn new(parallel: bool) -> Self {
        Self::with_steps(vec![
            Box::new(DeterminePrimitiveTypes { parallel }),
            Box::new(SortByPrimitiveType { parallel }),
        ])
    }

    pub fn with_steps(steps: Vec<Box<dyn ProcessStep>>) -> Self {
        Self { steps }
    }

    pub fn run(&self, scene: &mut Scene, flags: ProcessFlags) -> Result<(), ProcessError> {
        let validate = flags.contains(ProcessFlags::VALIDATE_STRUCTURE);
        if validate {
            scene.validate().map_err(ProcessError::InvalidInput)?;
        }

        for step in &self.steps {
            if !step.is_active(flags) {
                debug!("Skipping step {}", step.name());
                continue;
            }
            info!("Running step {}", step.name());
            step.execute(scene);
        }

        if validate {
            scene.validate().map_err(ProcessError::InvalidOutput)?;
        }

        Ok(())
    }
}

impl Default for PostProcessor {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use gfx_maths::Vec3;
    use std::{cell::RefCell, rc::Rc};
    use ve_scene::{
        mesh::{Face, Mesh, PrimitiveTypes},
        scene::Node,
    };

    struct Recorder {
        name: &'static str,
        flag: ProcessFlags,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ProcessStep for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_active(&self, flags: ProcessFlags) -> bool {
            flags.contains(self.flag)
        }

        fn execute(&self, _scene: &mut Scene) {
            self.log.borrow_mut().push(self.name);
        }
    }

    fn mixed_scene() -> Scene {
        let positions = (0..3).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        Scene {
            meshes: vec![Mesh::from_positions(
                positions,
                vec![Face::new(vec![0, 1, 2]), Face::new(vec![1, 2])],
            )],
            root: Node::new("root").with_meshes(vec![0]),
        }
    }

    #[test]
    fn test_steps_run_in_order() -> Result<(), ProcessError> {
        let log = Rc::new(RefCell::new(Vec::new()));
        let recorder = |name, flag| -> Box<dyn ProcessStep> {
            Box::new(Recorder {
                name,
                flag,
                log: log.clone(),
            })
        };
        let processor = PostProcessor::with_steps(vec![
            recorder("first", ProcessFlags::empty()),
            recorder("sort", ProcessFlags::SORT_BY_PTYPE),
            recorder("last", ProcessFlags::empty()),
        ]);

        processor.run(&mut Scene::default(), ProcessFlags::empty())?;
        assert_eq!(*log.borrow(), vec!["first", "last"]);

        log.borrow_mut().clear();
        processor.run(&mut Scene::default(), ProcessFlags::SORT_BY_PTYPE)?;
        assert_eq!(*log.borrow(), vec!["first", "sort", "last"]);
        Ok(())
    }

    #[test]
    fn test_sort_needs_flag() -> Result<(), ProcessError> {
        let mut scene = mixed_scene();
        PostProcessor::new(false).run(&mut scene, ProcessFlags::empty())?;
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(
            scene.meshes[0].primitive_types,
            PrimitiveTypes::TRIANGLE | PrimitiveTypes::LINE
        );

        let mut scene = mixed_scene();
        PostProcessor::new(false).run(&mut scene, ProcessFlags::all())?;
        assert_eq!(scene.meshes.len(), 2);
        assert_eq!(scene.root.meshes, vec![0, 1]);
        Ok(())
    }

    #[test]
    fn test_invalid_input() {
        let mut scene = mixed_scene();
        scene.root.meshes.push(4);

        let result = PostProcessor::default().run(&mut scene, ProcessFlags::all());
        assert!(matches!(
            result,
            Err(ProcessError::InvalidInput(SceneError::InvalidMeshReference { index: 4, .. }))
        ));
    }

    #[test]
    fn test_mesh_without_faces_rejected() {
        let mut scene = Scene {
            meshes: vec![Mesh::from_positions(vec![Vec3::new(0.0, 0.0, 0.0)], vec![])],
            root: Node::new("root").with_meshes(vec![0]),
        };

        let result = PostProcessor::new(false).run(&mut scene, ProcessFlags::all());
        assert!(matches!(
            result,
            Err(ProcessError::InvalidInput(SceneError::NoFaces { mesh: 0 }))
        ));
        assert_eq!(scene.meshes.len(), 1);
    }

    #[test]
    fn test_empty_face_rejected() {
        let mut scene = mixed_scene();
        scene.meshes[0].faces.insert(0, Face::new(vec![]));

        let result = PostProcessor::new(false).run(&mut scene, ProcessFlags::all());
        assert!(matches!(
            result,
            Err(ProcessError::InvalidInput(SceneError::EmptyFace { mesh: 0, face: 0 }))
        ));
        assert_eq!(scene.meshes.len(), 1);
    }
}
