//! Skinning transform sampling
//!
//! Evaluates, per animation frame, the matrix that carries a corrected
//! mesh-space vertex to its skinned position. The chain conjugates the
//! source-space skinning transform with the mesh's coordinate correction:
//!
//! ```text
//! flip_local * mesh_global^-1 * bone_global(frame)
//!     * bone_bind_global^-1 * (mesh_bind * pivot) * axis^-1
//! ```
//!
//! Everything to the right of `bone_global(frame)` is frame-invariant and
//! folded per bone up front.

use glam::Mat4;

use crate::scene::{mat4, SourceMesh};
use crate::transform::{axis_flip_local, CoordinateTransform};

/// Sample skinning transforms for every bone of the mesh's skeleton.
/// Frame-major: `result[f][b]` is the transform of bone `b` at frame `f`.
pub fn sample_skeletal(mesh: &SourceMesh, transform: &CoordinateTransform) -> Vec<Vec<Mat4>> {
    let prefix = axis_flip_local() * mat4(&mesh.global_transform).inverse();
    let pivot = mat4(&mesh.geometric_transform);

    let suffixes: Vec<Mat4> = mesh
        .clusters
        .iter()
        .map(|cluster| {
            let bind = mat4(&cluster.bind_transform) * pivot;
            mat4(&cluster.bind_link_transform).inverse() * bind * transform.inverse_axis()
        })
        .collect();

    let frame_count = mesh
        .clusters
        .iter()
        .map(|cluster| cluster.frame_global_transforms.len())
        .min()
        .unwrap_or(0);
    if mesh
        .clusters
        .iter()
        .any(|cluster| cluster.frame_global_transforms.len() != frame_count)
    {
        tracing::warn!(
            mesh = %mesh.name,
            frames = frame_count,
            "clusters disagree on frame count, clamping to the shortest"
        );
    }

    (0..frame_count)
        .map(|frame| {
            mesh.clusters
                .iter()
                .zip(&suffixes)
                .map(|(cluster, suffix)| {
                    prefix * mat4(&cluster.frame_global_transforms[frame]) * *suffix
                })
                .collect()
        })
        .collect()
}

/// Non-skeletal clips: the node's corrected global transform per frame.
pub fn sample_node_frames(mesh: &SourceMesh, transform: &CoordinateTransform) -> Vec<Mat4> {
    mesh.frame_global_transforms
        .iter()
        .map(|raw| transform.corrected_node_transform(mat4(raw)))
        .collect()
}
