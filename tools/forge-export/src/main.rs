//! forge-export - Forge scene export tool
//!
//! Scans for resolved scene files (*.scene.json) and exports each mesh and
//! camera to the compressed Forge binary formats (.mesh, .anim, .camera).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use forge_common::{ANIM_EXT, CAMERA_EXT, MESH_EXT};
use forge_export::config::{
    AnimationEncoding, ExportConfig, DEFAULT_MAX_BONES_MATRIX, DEFAULT_MAX_BONES_QUAT,
    DEFAULT_MAX_VERTICES,
};
use forge_export::{export, scene};

#[derive(Parser)]
#[command(name = "forge-export")]
#[command(about = "Forge scene export tool")]
#[command(version)]
struct Cli {
    /// Scene file or directory to scan for *.scene.json files
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Output directory (defaults to each scene file's directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Export the primary UV channel
    #[arg(long)]
    uv0: bool,

    /// Export the secondary UV channel
    #[arg(long)]
    uv1: bool,

    /// Export per-corner normals
    #[arg(long)]
    normals: bool,

    /// Export animation clips (and skin data for skeletal meshes)
    #[arg(long)]
    anim: bool,

    /// Treat vertices as world-baked: mesh headers carry local node
    /// transforms instead of global ones
    #[arg(long)]
    world: bool,

    /// Encode skeletal animation as translation + quaternion instead of
    /// 3x4 matrices
    #[arg(long)]
    quat: bool,

    /// Vertex budget per sub-mesh (must be a multiple of 3)
    #[arg(long, default_value_t = DEFAULT_MAX_VERTICES)]
    max_vertices: usize,

    /// Bone budget per sub-mesh under matrix encoding
    #[arg(long, default_value_t = DEFAULT_MAX_BONES_MATRIX)]
    max_matrix_bones: usize,

    /// Bone budget per sub-mesh under quaternion encoding
    #[arg(long, default_value_t = DEFAULT_MAX_BONES_QUAT)]
    max_quat_bones: usize,
}

impl Cli {
    fn to_config(&self) -> ExportConfig {
        ExportConfig {
            parse_uv0: self.uv0,
            parse_uv1: self.uv1,
            parse_normals: self.normals,
            parse_animation: self.anim,
            world_space_bind: self.world,
            encoding: if self.quat {
                AnimationEncoding::Quaternion
            } else {
                AnimationEncoding::Matrix
            },
            max_vertices: self.max_vertices,
            max_bones_matrix: self.max_matrix_bones,
            max_bones_quat: self.max_quat_bones,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.to_config();
    config.validate()?;

    let scenes = find_scene_files(&cli.path)?;
    if scenes.is_empty() {
        warn!(path = %cli.path.display(), "no *.scene.json files found");
        return Ok(());
    }

    let mut failures = 0usize;
    for scene_path in &scenes {
        let out_dir = cli
            .output
            .clone()
            .or_else(|| scene_path.parent().map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        if let Err(err) = process_scene(scene_path, &out_dir, &config) {
            error!(
                scene = %scene_path.display(),
                "scene failed: {err:#}"
            );
            failures += 1;
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} of {} scenes failed", scenes.len());
    }
    Ok(())
}

/// Collect scene files: the path itself, or a recursive directory scan.
fn find_scene_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    if path.is_file() {
        found.push(path.to_path_buf());
        return Ok(found);
    }
    let entries = fs::read_dir(path)
        .with_context(|| format!("failed to read directory: {}", path.display()))?;
    for entry in entries {
        let entry = entry?;
        let entry_path = entry.path();
        if entry_path.is_dir() {
            found.extend(find_scene_files(&entry_path)?);
        } else if entry_path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(".scene.json"))
        {
            found.push(entry_path);
        }
    }
    found.sort();
    Ok(found)
}

/// Export every object in one scene. A failed mesh is logged and skipped;
/// the rest of the scene still exports. Assets are written as
/// `<scene stem>_<object name>.<ext>`.
fn process_scene(scene_path: &Path, out_dir: &Path, config: &ExportConfig) -> Result<()> {
    info!(scene = %scene_path.display(), "processing scene");
    let scene = scene::load_scene(scene_path)?;
    let stem = scene_stem(scene_path);
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory: {}", out_dir.display()))?;

    for mesh in &scene.meshes {
        match export::export_mesh(mesh, config) {
            Ok(exported) => {
                write_asset(out_dir, &stem, &exported.name, MESH_EXT, &exported.mesh)?;
                if let Some(animation) = &exported.animation {
                    write_asset(out_dir, &stem, &exported.name, ANIM_EXT, animation)?;
                }
            }
            Err(err) => {
                error!(mesh = %mesh.name, "mesh export failed: {err:#}");
            }
        }
    }

    for camera in &scene.cameras {
        match export::export_camera(camera, config) {
            Ok(exported) => {
                write_asset(out_dir, &stem, &exported.name, CAMERA_EXT, &exported.camera)?;
            }
            Err(err) => {
                error!(camera = %camera.name, "camera export failed: {err:#}");
            }
        }
    }

    Ok(())
}

/// Scene file name without the `.scene.json` suffix.
fn scene_stem(path: &Path) -> String {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("scene");
    name.strip_suffix(".scene.json").unwrap_or(name).to_string()
}

fn write_asset(out_dir: &Path, stem: &str, name: &str, ext: &str, bytes: &[u8]) -> Result<()> {
    let path = out_dir.join(format!("{stem}_{name}.{ext}"));
    fs::write(&path, bytes)
        .with_context(|| format!("failed to write asset: {}", path.display()))?;
    info!(file = %path.display(), size = bytes.len(), "wrote asset");
    Ok(())
}
