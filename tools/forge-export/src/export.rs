//! Per-object export drivers
//!
//! Runs the pipeline for one mesh or camera and assembles the compressed
//! asset payloads. Failures are scoped to the object; the caller decides
//! whether to continue with the rest of the scene.

use anyhow::{Context, Result};
use tracing::{debug, info};

use forge_common::{
    compress, AnimationFile, CameraFile, MatrixTrack, MeshFile, QuatSample, QuatTrack,
    SubMeshRecord,
};

use crate::config::{AnimationEncoding, ExportConfig};
use crate::mesh::{Bounds, MeshAsset, SubMesh};
use crate::partition::{split_bones, split_vertices};
use crate::scene::{mat4, SourceCamera, SourceMesh};
use crate::skin::{sample_node_frames, sample_skeletal};
use crate::soup::build_soup;
use crate::transform::{trim_matrix, CoordinateTransform};

/// Compressed payloads for one exported mesh.
pub struct ExportedMesh {
    pub name: String,
    /// Compressed .mesh payload.
    pub mesh: Vec<u8>,
    /// Compressed .anim payload, present when animation export is enabled.
    pub animation: Option<Vec<u8>>,
}

/// Compressed payload for one exported camera.
pub struct ExportedCamera {
    pub name: String,
    pub camera: Vec<u8>,
}

/// Run the full pipeline for one mesh.
pub fn export_mesh(source: &SourceMesh, config: &ExportConfig) -> Result<ExportedMesh> {
    let asset = build_mesh_asset(source, config)?;

    info!(
        mesh = %asset.name,
        skeletal = asset.skeletal,
        sub_meshes = asset.sub_meshes.len(),
        vertices = asset.sub_meshes.iter().map(|s| s.soup.vertex_count()).sum::<usize>(),
        "exported mesh"
    );

    let mesh = compress(&encode_mesh(&asset, config).encode())
        .with_context(|| format!("failed to compress mesh payload for '{}'", asset.name))?;
    let animation = if config.parse_animation {
        let clip = encode_animation(&asset, config);
        Some(
            compress(&clip.encode()).with_context(|| {
                format!("failed to compress animation payload for '{}'", asset.name)
            })?,
        )
    } else {
        None
    };

    Ok(ExportedMesh {
        name: asset.name,
        mesh,
        animation,
    })
}

/// Partition one mesh into its budget-compliant in-memory form.
pub fn build_mesh_asset(source: &SourceMesh, config: &ExportConfig) -> Result<MeshAsset> {
    let transform = CoordinateTransform::for_mesh(mat4(&source.geometric_transform));
    let soup = build_soup(source, &transform, config)?;
    let bounds = Bounds::from_positions(&soup.positions)?;

    let skeletal = config.parse_animation && source.is_skeletal();
    let bone_frames = if skeletal {
        sample_skeletal(source, &transform)
    } else {
        Vec::new()
    };
    let node_frames = if config.parse_animation && !skeletal {
        sample_node_frames(source, &transform)
    } else {
        Vec::new()
    };

    let chunks = split_vertices(soup, config.max_vertices);
    debug!(mesh = %source.name, chunks = chunks.len(), "vertex split");

    let mut sub_meshes = Vec::with_capacity(chunks.len());
    if skeletal {
        let skeleton: Vec<String> = source
            .clusters
            .iter()
            .map(|cluster| cluster.bone_name.clone())
            .collect();
        for chunk in chunks {
            sub_meshes.extend(split_bones(
                chunk,
                config.bone_budget(),
                &skeleton,
                &bone_frames,
            )?);
        }
    } else {
        sub_meshes.extend(chunks.into_iter().map(SubMesh::unskinned));
    }

    let node = if config.world_space_bind {
        mat4(&source.local_transform)
    } else {
        mat4(&source.global_transform)
    };

    Ok(MeshAsset {
        name: source.name.clone(),
        skeletal,
        header_transform: transform.corrected_node_transform(node),
        bounds,
        sub_meshes,
        node_frames,
    })
}

/// Lay a partitioned mesh out in wire form. Bone indices are pre-scaled by
/// the encoding's register stride so the runtime can address the animation
/// buffer without a multiply.
fn encode_mesh(asset: &MeshAsset, config: &ExportConfig) -> MeshFile {
    let stride = config.encoding.register_stride() as f32;
    MeshFile {
        name: asset.name.clone(),
        transform: trim_matrix(asset.header_transform),
        sub_meshes: asset
            .sub_meshes
            .iter()
            .map(|sub| SubMeshRecord {
                positions: sub.soup.positions.clone(),
                uv0: sub.soup.uv0.clone(),
                uv1: sub.soup.uv1.clone(),
                normals: sub.soup.normals.clone(),
                weights: sub.soup.influences.iter().map(|i| i.weights).collect(),
                scaled_bone_indices: sub
                    .soup
                    .influences
                    .iter()
                    .map(|i| i.bones.map(|bone| bone as f32 * stride))
                    .collect(),
            })
            .collect(),
        bounds: asset.bounds.to_array(),
    }
}

fn encode_animation(asset: &MeshAsset, config: &ExportConfig) -> AnimationFile {
    if !asset.skeletal {
        return AnimationFile::Node {
            frames: asset.node_frames.iter().copied().map(trim_matrix).collect(),
        };
    }
    match config.encoding {
        AnimationEncoding::Matrix => AnimationFile::BoneMatrix {
            tracks: asset
                .sub_meshes
                .iter()
                .map(|sub| MatrixTrack {
                    frame_count: sub.frames.len() as u32,
                    bone_count: sub.bones.len() as u32,
                    samples: sub
                        .frames
                        .iter()
                        .flat_map(|frame| frame.iter().copied().map(trim_matrix))
                        .collect(),
                })
                .collect(),
        },
        AnimationEncoding::Quaternion => AnimationFile::BoneQuat {
            tracks: asset
                .sub_meshes
                .iter()
                .map(|sub| QuatTrack {
                    frame_count: sub.frames.len() as u32,
                    bone_count: sub.bones.len() as u32,
                    samples: sub
                        .frames
                        .iter()
                        .flat_map(|frame| frame.iter().map(|&m| quat_sample(m)))
                        .collect(),
                })
                .collect(),
        },
    }
}

/// Decompose a skinning matrix into the quaternion wire sample.
fn quat_sample(m: glam::Mat4) -> QuatSample {
    let (_, rotation, translation) = m.to_scale_rotation_translation();
    QuatSample {
        translation: [translation.x, translation.y, translation.z, 0.0],
        rotation: rotation.to_array(),
    }
}

/// Export one camera, including its per-frame motion when animation export
/// is enabled.
pub fn export_camera(source: &SourceCamera, config: &ExportConfig) -> Result<ExportedCamera> {
    let transform = CoordinateTransform::for_camera();
    let frames = if config.parse_animation {
        source
            .frame_global_transforms
            .iter()
            .map(|raw| trim_matrix(transform.corrected_node_transform(mat4(raw))))
            .collect()
    } else {
        Vec::new()
    };

    let file = CameraFile {
        name: source.name.clone(),
        width: source.width,
        height: source.height,
        near: source.near,
        far: source.far,
        field_of_view: source.field_of_view,
        transform: trim_matrix(transform.corrected_node_transform(mat4(&source.global_transform))),
        frames,
    };

    info!(camera = %source.name, frames = file.frames.len(), "exported camera");

    let camera = compress(&file.encode())
        .with_context(|| format!("failed to compress camera payload for '{}'", source.name))?;
    Ok(ExportedCamera {
        name: source.name.clone(),
        camera,
    })
}
