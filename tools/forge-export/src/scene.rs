//! Source scene model (*.scene.json)
//!
//! The export pipeline consumes fully-resolved scenes: geometry, skin
//! clusters and per-frame global transforms are already evaluated by the
//! upstream extractor. Matrices are stored row-major in the source's
//! row-vector convention; [`mat4`] maps them onto [`glam::Mat4`] so that
//! composition order is preserved.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use glam::{Mat4, Vec4};
use serde::{Deserialize, Serialize};

/// Row-major 4x4 matrix as stored in scene files.
pub type RawMatrix = [[f32; 4]; 4];

/// The row-major identity, used wherever a scene omits a transform.
pub fn identity_matrix() -> RawMatrix {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Map a row-major source matrix onto glam. Source rows become glam column
/// axes, which keeps `a * b` meaning "apply `b` first" on both sides.
pub fn mat4(raw: &RawMatrix) -> Mat4 {
    Mat4::from_cols(
        Vec4::from_array(raw[0]),
        Vec4::from_array(raw[1]),
        Vec4::from_array(raw[2]),
        Vec4::from_array(raw[3]),
    )
}

/// A fully-resolved scene as produced by the upstream extractor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceScene {
    #[serde(default)]
    pub meshes: Vec<SourceMesh>,
    #[serde(default)]
    pub cameras: Vec<SourceCamera>,
}

/// One mesh node with triangulated, indexed geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMesh {
    pub name: String,
    /// Unique positions referenced by triangle corners.
    pub control_points: Vec<[f32; 3]>,
    /// Per-corner control point index, three per triangle.
    pub polygon_vertices: Vec<u32>,
    /// Per-corner index into the UV arrays, parallel to `polygon_vertices`.
    #[serde(default)]
    pub uv_indices: Vec<u32>,
    /// Primary UV channel, already in texture space.
    #[serde(default)]
    pub uv0: Vec<[f32; 2]>,
    /// Secondary UV channel, sharing `uv_indices` with the primary.
    #[serde(default)]
    pub uv1: Vec<[f32; 2]>,
    /// Per-corner normals in source space, parallel to `polygon_vertices`.
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    /// Geometric-pivot transform of the mesh node.
    #[serde(default = "identity_matrix")]
    pub geometric_transform: RawMatrix,
    /// Node local transform at export time.
    #[serde(default = "identity_matrix")]
    pub local_transform: RawMatrix,
    /// Node global transform at export time.
    #[serde(default = "identity_matrix")]
    pub global_transform: RawMatrix,
    /// Node global transform per animation frame (non-skeletal clips).
    #[serde(default)]
    pub frame_global_transforms: Vec<RawMatrix>,
    /// Skin clusters; a non-empty list marks the mesh as skeletal. Cluster
    /// order defines the global bone indexing for this mesh.
    #[serde(default)]
    pub clusters: Vec<SourceCluster>,
}

impl Default for SourceMesh {
    fn default() -> Self {
        Self {
            name: String::new(),
            control_points: Vec::new(),
            polygon_vertices: Vec::new(),
            uv_indices: Vec::new(),
            uv0: Vec::new(),
            uv1: Vec::new(),
            normals: Vec::new(),
            geometric_transform: identity_matrix(),
            local_transform: identity_matrix(),
            global_transform: identity_matrix(),
            frame_global_transforms: Vec::new(),
            clusters: Vec::new(),
        }
    }
}

impl SourceMesh {
    pub fn is_skeletal(&self) -> bool {
        !self.clusters.is_empty()
    }
}

/// One bone's influence over a mesh, plus its sampled motion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCluster {
    pub bone_name: String,
    /// Control points influenced by this bone, parallel to `weights`.
    pub control_point_indices: Vec<u32>,
    pub weights: Vec<f32>,
    /// Mesh transform recorded at skin binding.
    #[serde(default = "identity_matrix")]
    pub bind_transform: RawMatrix,
    /// Bone global transform at bind time.
    #[serde(default = "identity_matrix")]
    pub bind_link_transform: RawMatrix,
    /// Bone global transform per animation frame.
    #[serde(default)]
    pub frame_global_transforms: Vec<RawMatrix>,
}

impl Default for SourceCluster {
    fn default() -> Self {
        Self {
            bone_name: String::new(),
            control_point_indices: Vec::new(),
            weights: Vec::new(),
            bind_transform: identity_matrix(),
            bind_link_transform: identity_matrix(),
            frame_global_transforms: Vec::new(),
        }
    }
}

/// One camera node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCamera {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
    pub field_of_view: f32,
    #[serde(default = "identity_matrix")]
    pub global_transform: RawMatrix,
    /// Global transform per animation frame.
    #[serde(default)]
    pub frame_global_transforms: Vec<RawMatrix>,
}

/// Load and parse a scene file.
pub fn load_scene(path: &Path) -> Result<SourceScene> {
    let file =
        File::open(path).with_context(|| format!("failed to open scene file: {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse scene file: {}", path.display()))
}
