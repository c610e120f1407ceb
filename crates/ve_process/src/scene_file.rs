use anyhow::{Context, Result};
use log::info;
use std::path::Path;
use ve_scene::scene::Scene;

use crate::{meta::ProcessMeta, step::PostProcessor, utils};

/// Extension of binary scene files
pub const SCENE_EXTENSION: &str = "ves";

fn load(path: &Path) -> Result<Scene> {
    Scene::from_file(path).with_context(|| format!("Could not load scene: {}", path.display()))
}

fn save(path: &Path, output_dir: &Path, scene: &Scene) -> Result<()> {
    let file_name = utils::file_name(path)?;
    let target = utils::combine_path(output_dir, file_name, SCENE_EXTENSION)?;
    let data = scene.to_bytes().context("Could not serialize scene")?;
    utils::write_file(&target, &data)
}

/// Parse meta from file called `file.toml` or alternativley from folder scoped meta file named `scene.toml` or else use default meta
fn parse_meta(path: &Path) -> Result<ProcessMeta> {
    let dir = path
        .parent()
        .with_context(|| format!("Path terminates in root or prefix: {}", path.display()))?;
    let meta_file = utils::file_name(path)?;
    let path = utils::combine_path(dir, meta_file, "toml")?;

    if path.is_file() {
        return ProcessMeta::parse(&path);
    }

    let path = utils::combine_path(dir, "scene", "toml")?;
    if path.is_file() {
        return ProcessMeta::parse(&path);
    }

    Ok(ProcessMeta::default())
}

/// Runs the post-processing steps configured by `meta` on `scene`
pub fn process_scene(scene: &mut Scene, meta: &ProcessMeta) -> Result<()> {
    PostProcessor::new(meta.parallel).run(scene, meta.flags())?;
    Ok(())
}

pub fn process(path: &Path, output_dir: &Path) -> Result<()> {
    info!("Processing scene file: `{}`", path.display());
    let meta = parse_meta(path)?;
    let mut scene = load(path)?;
    process_scene(&mut scene, &meta)
        .with_context(|| format!("Could not process scene: {}", path.display()))?;
    save(path, output_dir, &scene)
}

#[cfg(test)]
mod test {
    use super::*;
    use gfx_maths::Vec3;
    use std::fs;
    use ve_scene::{
        mesh::{Face, Mesh},
        scene::Node,
    };

    fn scratch_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("ve_process_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn scene() -> Scene {
        let positions = (0..4).map(|i| Vec3::new(i as f32, 0.0, 0.0)).collect();
        Scene {
            meshes: vec![Mesh::from_positions(
                positions,
                vec![Face::new(vec![0, 1, 2]), Face::new(vec![3])],
            )],
            root: Node::new("root").with_meshes(vec![0]),
        }
    }

    #[test]
    fn test_process_file() -> Result<()> {
        let input = scratch_dir("input");
        let output = scratch_dir("output");
        let path = input.join("mixed.ves");
        scene().to_file(&path)?;

        process(&path, &output)?;

        let processed = Scene::from_file(&output.join("mixed.ves"))?;
        assert_eq!(processed.meshes.len(), 2);
        assert_eq!(processed.root.meshes, vec![0, 1]);
        Ok(())
    }

    #[test]
    fn test_meta_lookup() -> Result<()> {
        let dir = scratch_dir("meta");
        let path = dir.join("mixed.ves");
        assert_eq!(parse_meta(&path)?, ProcessMeta::default());

        fs::write(dir.join("scene.toml"), "parallel = false")?;
        assert!(!parse_meta(&path)?.parallel);

        fs::write(dir.join("mixed.toml"), "sort_by_primitive_type = false")?;
        let meta = parse_meta(&path)?;
        assert!(meta.parallel);
        assert!(!meta.sort_by_primitive_type);
        Ok(())
    }

    #[test]
    fn test_unsorted_file() -> Result<()> {
        let mut scene = scene();
        let meta = ProcessMeta {
            sort_by_primitive_type: false,
            ..ProcessMeta::default()
        };
        process_scene(&mut scene, &meta)?;
        assert_eq!(scene.meshes.len(), 1);
        Ok(())
    }
}
