//! Triangle soup assembly
//!
//! Expands indexed source geometry into flat, non-indexed attribute streams
//! in the corrected coordinate convention. Every optional stream is either
//! empty or in lockstep with `positions`, and winding is swapped per
//! triangle for the runtime's front-face convention.

use glam::Vec3;

use crate::config::ExportConfig;
use crate::error::PipelineError;
use crate::scene::SourceMesh;
use crate::transform::CoordinateTransform;

/// Maximum (weight, bone) pairs carried per vertex.
pub const MAX_INFLUENCES: usize = 4;

/// Skin influence of one vertex: four (weight, bone) pairs, zero-padded.
/// Padded slots reference bone 0 with weight 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SkinInfluence {
    pub weights: [f32; MAX_INFLUENCES],
    pub bones: [u16; MAX_INFLUENCES],
}

/// Flat per-corner attribute streams, three entries per triangle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleSoup {
    pub positions: Vec<[f32; 3]>,
    pub uv0: Vec<[f32; 2]>,
    pub uv1: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    pub influences: Vec<SkinInfluence>,
}

impl TriangleSoup {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.positions.len() / 3
    }
}

/// Build the triangle soup for one source mesh. Skin influences are only
/// assembled when animation export is enabled and the mesh is skeletal.
pub fn build_soup(
    mesh: &SourceMesh,
    transform: &CoordinateTransform,
    config: &ExportConfig,
) -> Result<TriangleSoup, PipelineError> {
    let corner_count = mesh.polygon_vertices.len();
    if corner_count % 3 != 0 {
        return Err(PipelineError::SourceDataInconsistency {
            stream: "polygon_vertices",
            detail: format!("{corner_count} corners is not a whole number of triangles"),
        });
    }

    let mut soup = TriangleSoup::default();

    soup.positions.reserve(corner_count);
    for &index in &mesh.polygon_vertices {
        let point = mesh.control_points.get(index as usize).ok_or_else(|| {
            PipelineError::SourceDataInconsistency {
                stream: "polygon_vertices",
                detail: format!(
                    "control point index {index} out of range ({} control points)",
                    mesh.control_points.len()
                ),
            }
        })?;
        let corrected = transform.transform_point(Vec3::from_array(*point));
        soup.positions.push(corrected.to_array());
    }
    swap_winding(&mut soup.positions);

    if config.parse_uv0 && !mesh.uv0.is_empty() {
        soup.uv0 = resolve_uvs(mesh, &mesh.uv0, "uv0")?;
    }
    if config.parse_uv1 && !mesh.uv1.is_empty() {
        soup.uv1 = resolve_uvs(mesh, &mesh.uv1, "uv1")?;
    }

    if config.parse_normals && !mesh.normals.is_empty() {
        if mesh.normals.len() != corner_count {
            return Err(PipelineError::SourceDataInconsistency {
                stream: "normals",
                detail: format!(
                    "{} entries for {corner_count} corners",
                    mesh.normals.len()
                ),
            });
        }
        soup.normals.reserve(corner_count);
        for normal in &mesh.normals {
            let corrected = transform
                .transform_direction(Vec3::from_array(*normal))
                .normalize_or_zero();
            soup.normals.push(corrected.to_array());
        }
        swap_winding(&mut soup.normals);
    }

    if config.parse_animation && mesh.is_skeletal() {
        let per_point = accumulate_influences(mesh)?;
        soup.influences.reserve(corner_count);
        for &index in &mesh.polygon_vertices {
            soup.influences.push(per_point[index as usize]);
        }
        swap_winding(&mut soup.influences);
    }

    Ok(soup)
}

/// Swap corners 1 and 2 of every triangle, reversing winding.
fn swap_winding<T>(stream: &mut [T]) {
    for triangle in stream.chunks_exact_mut(3) {
        triangle.swap(1, 2);
    }
}

fn resolve_uvs(
    mesh: &SourceMesh,
    channel: &[[f32; 2]],
    stream: &'static str,
) -> Result<Vec<[f32; 2]>, PipelineError> {
    let corner_count = mesh.polygon_vertices.len();
    if mesh.uv_indices.len() != corner_count {
        return Err(PipelineError::SourceDataInconsistency {
            stream: "uv_indices",
            detail: format!(
                "{} entries for {corner_count} corners",
                mesh.uv_indices.len()
            ),
        });
    }
    let mut out = Vec::with_capacity(corner_count);
    for &index in &mesh.uv_indices {
        let uv = channel.get(index as usize).ok_or_else(|| {
            PipelineError::SourceDataInconsistency {
                stream,
                detail: format!("UV index {index} out of range ({} entries)", channel.len()),
            }
        })?;
        out.push(*uv);
    }
    swap_winding(&mut out);
    Ok(out)
}

/// Gather (weight, bone) pairs per control point across all clusters.
/// Pairs arrive in cluster order; a vertex with more than four influences
/// keeps the four largest weights, in descending order.
fn accumulate_influences(mesh: &SourceMesh) -> Result<Vec<SkinInfluence>, PipelineError> {
    let mut per_point: Vec<Vec<(u16, f32)>> = vec![Vec::new(); mesh.control_points.len()];

    for (bone_index, cluster) in mesh.clusters.iter().enumerate() {
        if cluster.control_point_indices.len() != cluster.weights.len() {
            return Err(PipelineError::SourceDataInconsistency {
                stream: "clusters",
                detail: format!(
                    "cluster '{}' has {} control points but {} weights",
                    cluster.bone_name,
                    cluster.control_point_indices.len(),
                    cluster.weights.len()
                ),
            });
        }
        for (&point, &weight) in cluster.control_point_indices.iter().zip(&cluster.weights) {
            let entry = per_point.get_mut(point as usize).ok_or_else(|| {
                PipelineError::SourceDataInconsistency {
                    stream: "clusters",
                    detail: format!(
                        "cluster '{}' references control point {point} out of range ({})",
                        cluster.bone_name,
                        mesh.control_points.len()
                    ),
                }
            })?;
            entry.push((bone_index as u16, weight));
        }
    }

    Ok(per_point
        .into_iter()
        .map(|mut pairs| {
            if pairs.len() > MAX_INFLUENCES {
                pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
                pairs.truncate(MAX_INFLUENCES);
            }
            let mut influence = SkinInfluence::default();
            for (slot, (bone, weight)) in pairs.into_iter().enumerate() {
                influence.bones[slot] = bone;
                influence.weights[slot] = weight;
            }
            influence
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SourceCluster;
    use glam::Mat4;

    fn identity_transform() -> CoordinateTransform {
        // Bypass the axis flip so coordinate assertions stay exact.
        CoordinateTransform::from_axis(Mat4::IDENTITY)
    }

    fn quad_mesh() -> SourceMesh {
        SourceMesh {
            name: "quad".to_string(),
            control_points: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            polygon_vertices: vec![0, 1, 2, 0, 2, 3],
            ..Default::default()
        }
    }

    #[test]
    fn test_winding_swap() {
        let soup = build_soup(&quad_mesh(), &identity_transform(), &ExportConfig::default())
            .unwrap();
        assert_eq!(soup.vertex_count(), 6);
        assert_eq!(soup.triangle_count(), 2);
        // First triangle (0, 1, 2) is emitted as (0, 2, 1).
        assert_eq!(soup.positions[0], [0.0, 0.0, 0.0]);
        assert_eq!(soup.positions[1], [1.0, 1.0, 0.0]);
        assert_eq!(soup.positions[2], [1.0, 0.0, 0.0]);
        assert!(soup.uv0.is_empty());
        assert!(soup.influences.is_empty());
    }

    #[test]
    fn test_uv_resolution_follows_uv_indices() {
        let mut mesh = quad_mesh();
        mesh.uv0 = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        mesh.uv_indices = vec![0, 1, 2, 0, 2, 3];
        let config = ExportConfig {
            parse_uv0: true,
            ..Default::default()
        };
        let soup = build_soup(&mesh, &identity_transform(), &config).unwrap();
        assert_eq!(soup.uv0.len(), 6);
        // UVs swap winding alongside positions.
        assert_eq!(soup.uv0[1], [1.0, 1.0]);
        assert_eq!(soup.uv0[2], [1.0, 0.0]);
    }

    #[test]
    fn test_uv_index_length_mismatch() {
        let mut mesh = quad_mesh();
        mesh.uv0 = vec![[0.0, 0.0]];
        mesh.uv_indices = vec![0, 0, 0];
        let config = ExportConfig {
            parse_uv0: true,
            ..Default::default()
        };
        let result = build_soup(&mesh, &identity_transform(), &config);
        assert!(matches!(
            result,
            Err(PipelineError::SourceDataInconsistency { stream: "uv_indices", .. })
        ));
    }

    #[test]
    fn test_disabled_channels_stay_empty() {
        let mut mesh = quad_mesh();
        mesh.uv0 = vec![[0.0, 0.0]; 4];
        mesh.uv_indices = vec![0; 6];
        mesh.normals = vec![[0.0, 0.0, 1.0]; 6];
        let soup = build_soup(&mesh, &identity_transform(), &ExportConfig::default())
            .unwrap();
        assert!(soup.uv0.is_empty());
        assert!(soup.normals.is_empty());
    }

    #[test]
    fn test_normals_renormalized_and_swapped() {
        let mut mesh = quad_mesh();
        mesh.normals = vec![
            [0.0, 0.0, 2.0],
            [0.0, 4.0, 0.0],
            [6.0, 0.0, 0.0],
            [0.0, 0.0, 2.0],
            [0.0, 0.0, 2.0],
            [0.0, 0.0, 2.0],
        ];
        let config = ExportConfig {
            parse_normals: true,
            ..Default::default()
        };
        let soup = build_soup(&mesh, &identity_transform(), &config).unwrap();
        assert_eq!(soup.normals[0], [0.0, 0.0, 1.0]);
        // Corners 1 and 2 swap.
        assert_eq!(soup.normals[1], [1.0, 0.0, 0.0]);
        assert_eq!(soup.normals[2], [0.0, 1.0, 0.0]);
    }

    fn single_bone_cluster(bone: &str, points: Vec<u32>, weights: Vec<f32>) -> SourceCluster {
        SourceCluster {
            bone_name: bone.to_string(),
            control_point_indices: points,
            weights,
            ..Default::default()
        }
    }

    #[test]
    fn test_influences_padded_in_cluster_order() {
        let mut mesh = quad_mesh();
        mesh.polygon_vertices = vec![0, 1, 2];
        mesh.clusters = vec![
            single_bone_cluster("a", vec![0, 1, 2], vec![0.3, 1.0, 1.0]),
            single_bone_cluster("b", vec![0], vec![0.7]),
        ];
        let config = ExportConfig {
            parse_animation: true,
            ..Default::default()
        };
        let soup = build_soup(&mesh, &identity_transform(), &config).unwrap();
        // Corner 0 references control point 0: two influences in cluster
        // order, zero-padded to four.
        assert_eq!(
            soup.influences[0],
            SkinInfluence {
                weights: [0.3, 0.7, 0.0, 0.0],
                bones: [0, 1, 0, 0],
            }
        );
    }

    #[test]
    fn test_influences_truncated_to_largest_four() {
        let mut mesh = quad_mesh();
        mesh.polygon_vertices = vec![0, 1, 2];
        // Six bones influence control point 0 with distinct weights.
        mesh.clusters = (0..6)
            .map(|i| {
                let weight = [0.05, 0.30, 0.10, 0.25, 0.20, 0.10][i];
                single_bone_cluster(&format!("bone{i}"), vec![0, 1, 2], vec![weight, 1.0, 1.0])
            })
            .collect();
        let config = ExportConfig {
            parse_animation: true,
            ..Default::default()
        };
        let soup = build_soup(&mesh, &identity_transform(), &config).unwrap();
        let influence = soup.influences[0];
        // Four largest weights survive, in descending order.
        assert_eq!(influence.weights, [0.30, 0.25, 0.20, 0.10]);
        assert_eq!(influence.bones, [1, 3, 4, 2]);
    }

    #[test]
    fn test_out_of_range_control_point_index() {
        let mut mesh = quad_mesh();
        mesh.polygon_vertices = vec![0, 1, 9];
        let result = build_soup(&mesh, &identity_transform(), &ExportConfig::default());
        assert!(matches!(
            result,
            Err(PipelineError::SourceDataInconsistency { stream: "polygon_vertices", .. })
        ));
    }

    #[test]
    fn test_partial_triangle_rejected() {
        let mut mesh = quad_mesh();
        mesh.polygon_vertices = vec![0, 1];
        let result = build_soup(&mesh, &identity_transform(), &ExportConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_pivot_applies_before_flip() {
        let mut mesh = quad_mesh();
        mesh.polygon_vertices = vec![0, 0, 0];
        let pivot = Mat4::from_translation(glam::Vec3::new(1.0, 0.0, 0.0));
        let transform = CoordinateTransform::for_mesh(pivot);
        let soup = build_soup(&mesh, &transform, &ExportConfig::default()).unwrap();
        // Origin moves to (1, 0, 0) by the pivot, then the local flip
        // mirrors X and rotates: (1, 0, 0) -> (1, 0, 0).
        let expected = crate::transform::axis_flip_local()
            .transform_point3(glam::Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(soup.positions[0], expected.to_array());
    }
}
