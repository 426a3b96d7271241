//! Mesh partitioning
//!
//! Two passes bring a triangle soup under hardware budgets without ever
//! reordering or splitting a triangle: a vertex split into fixed-size
//! chunks, then a greedy bone split of each chunk. Both passes are
//! pass-throughs for meshes already within budget.

use glam::Mat4;

use crate::error::PipelineError;
use crate::mesh::{BoneRef, SubMesh};
use crate::soup::{SkinInfluence, TriangleSoup};

/// Split an over-budget soup into chunks of at most `max_vertices`
/// corners, on triangle boundaries. `max_vertices` must be a positive
/// multiple of 3 (enforced by `ExportConfig::validate`).
pub fn split_vertices(soup: TriangleSoup, max_vertices: usize) -> Vec<TriangleSoup> {
    debug_assert!(max_vertices > 0 && max_vertices % 3 == 0);
    let count = soup.vertex_count();
    if count <= max_vertices {
        return vec![soup];
    }

    let mut chunks = Vec::with_capacity(count.div_ceil(max_vertices));
    let mut start = 0;
    while start < count {
        let end = (start + max_vertices).min(count);
        chunks.push(TriangleSoup {
            positions: soup.positions[start..end].to_vec(),
            uv0: slice_stream(&soup.uv0, start, end),
            uv1: slice_stream(&soup.uv1, start, end),
            normals: slice_stream(&soup.normals, start, end),
            influences: slice_stream(&soup.influences, start, end),
        });
        start = end;
    }
    chunks
}

/// Slice an optional stream, preserving emptiness.
fn slice_stream<T: Clone>(stream: &[T], start: usize, end: usize) -> Vec<T> {
    if stream.is_empty() {
        Vec::new()
    } else {
        stream[start..end].to_vec()
    }
}

/// Split one vertex-compliant chunk so that no sub-mesh references more
/// than `budget` bones. A skeleton that fits the budget passes the chunk
/// through untouched: cluster-order bone list, unfiltered frames, bone
/// indices left global. Otherwise triangles are consumed in order, a
/// triangle whose bones do not fit the open sub-mesh closes it and starts
/// the next one, and each sub-mesh's bone indices are rewritten to its
/// local first-seen list.
///
/// `skeleton` is the mesh's cluster-order bone list and `frames` holds the
/// full-skeleton skinning transforms per frame.
pub fn split_bones(
    chunk: TriangleSoup,
    budget: usize,
    skeleton: &[String],
    frames: &[Vec<Mat4>],
) -> Result<Vec<SubMesh>, PipelineError> {
    if skeleton.len() <= budget {
        let bones = skeleton
            .iter()
            .enumerate()
            .map(|(global_index, name)| BoneRef {
                name: name.clone(),
                global_index,
            })
            .collect();
        return Ok(vec![SubMesh {
            soup: chunk,
            bones,
            frames: frames.to_vec(),
        }]);
    }

    let mut parts: Vec<(TriangleSoup, Vec<u16>)> = Vec::new();
    let mut current = TriangleSoup::default();
    let mut current_bones: Vec<u16> = Vec::new();

    for triangle in 0..chunk.triangle_count() {
        let corners = triangle * 3..triangle * 3 + 3;
        let triangle_bones = bones_used(&chunk.influences[corners.clone()]);
        if triangle_bones.len() > budget {
            return Err(PipelineError::BoneBudgetUnsatisfiable {
                found: triangle_bones.len(),
                budget,
            });
        }

        let added = triangle_bones
            .iter()
            .filter(|bone| !current_bones.contains(bone))
            .count();
        if current_bones.len() + added > budget {
            parts.push((
                std::mem::take(&mut current),
                std::mem::take(&mut current_bones),
            ));
        }

        for bone in triangle_bones {
            if !current_bones.contains(&bone) {
                current_bones.push(bone);
            }
        }
        current
            .positions
            .extend_from_slice(&chunk.positions[corners.clone()]);
        extend_stream(&mut current.uv0, &chunk.uv0, corners.clone());
        extend_stream(&mut current.uv1, &chunk.uv1, corners.clone());
        extend_stream(&mut current.normals, &chunk.normals, corners.clone());
        current
            .influences
            .extend_from_slice(&chunk.influences[corners]);
    }
    parts.push((current, current_bones));

    Ok(parts
        .into_iter()
        .map(|(soup, bones)| localize(soup, bones, skeleton, frames))
        .collect())
}

fn extend_stream<T: Clone>(out: &mut Vec<T>, source: &[T], range: std::ops::Range<usize>) {
    if !source.is_empty() {
        out.extend_from_slice(&source[range]);
    }
}

/// Distinct bones referenced by a run of influences, in first-seen order.
/// Zero-padded slots reference bone 0 and join the set like any other.
fn bones_used(influences: &[SkinInfluence]) -> Vec<u16> {
    let mut bones = Vec::new();
    for influence in influences {
        for &bone in &influence.bones {
            if !bones.contains(&bone) {
                bones.push(bone);
            }
        }
    }
    bones
}

/// Rewrite a sub-mesh's bone indices onto its local bone list and select
/// the matching animation columns.
fn localize(
    mut soup: TriangleSoup,
    local_bones: Vec<u16>,
    skeleton: &[String],
    frames: &[Vec<Mat4>],
) -> SubMesh {
    let table_len = skeleton
        .len()
        .max(local_bones.iter().map(|&b| b as usize + 1).max().unwrap_or(0));
    let mut remap = vec![u16::MAX; table_len];
    for (local, &global) in local_bones.iter().enumerate() {
        remap[global as usize] = local as u16;
    }
    for influence in &mut soup.influences {
        for bone in &mut influence.bones {
            let local = remap[*bone as usize];
            debug_assert_ne!(local, u16::MAX);
            *bone = local;
        }
    }

    let bones = local_bones
        .iter()
        .map(|&global| BoneRef {
            name: skeleton.get(global as usize).cloned().unwrap_or_default(),
            global_index: global as usize,
        })
        .collect();
    let frames = frames
        .iter()
        .map(|frame| {
            local_bones
                .iter()
                .map(|&global| frame[global as usize])
                .collect()
        })
        .collect();

    SubMesh { soup, bones, frames }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A soup of `triangles` triangles where triangle `i` is influenced
    /// entirely by `bone_of(i)`.
    fn boned_soup(triangles: usize, bone_of: impl Fn(usize) -> u16) -> TriangleSoup {
        let mut soup = TriangleSoup::default();
        for triangle in 0..triangles {
            let bone = bone_of(triangle);
            for corner in 0..3 {
                soup.positions.push([triangle as f32, corner as f32, 0.0]);
                soup.influences.push(SkinInfluence {
                    weights: [1.0, 0.0, 0.0, 0.0],
                    bones: [bone; 4],
                });
            }
        }
        soup
    }

    fn skeleton(bones: usize) -> Vec<String> {
        (0..bones).map(|i| format!("bone{i}")).collect()
    }

    #[test]
    fn test_vertex_split_within_budget_is_identity() {
        let soup = boned_soup(10, |_| 0);
        let before = soup.clone();
        let chunks = split_vertices(soup, 30);
        assert_eq!(chunks, vec![before]);
    }

    #[test]
    fn test_vertex_split_chunk_sizes() {
        // 23334 triangles = 70002 corners against a budget of 65535.
        let soup = boned_soup(23334, |t| (t % 5) as u16);
        let chunks = split_vertices(soup, 65535);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].vertex_count(), 65535);
        assert_eq!(chunks[1].vertex_count(), 4467);
        for chunk in &chunks {
            assert_eq!(chunk.vertex_count() % 3, 0);
            assert_eq!(chunk.influences.len(), chunk.vertex_count());
        }
        // The second chunk starts where the first ended.
        assert_eq!(chunks[1].positions[0], [21845.0, 0.0, 0.0]);
    }

    #[test]
    fn test_vertex_split_keeps_optional_streams_empty() {
        let soup = boned_soup(4, |_| 0);
        let chunks = split_vertices(soup, 6);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.uv0.is_empty() && c.normals.is_empty()));
    }

    #[test]
    fn test_bone_split_within_budget_passes_through() {
        let soup = boned_soup(6, |t| (t % 5) as u16);
        let before = soup.clone();
        let subs = split_bones(soup, 36, &skeleton(5), &[]).unwrap();
        assert_eq!(subs.len(), 1);
        // The whole skeleton is carried in cluster order and bone indices
        // stay global.
        assert_eq!(subs[0].bones.len(), 5);
        assert_eq!(subs[0].soup, before);
        assert_eq!(subs[0].bones[3].name, "bone3");
        assert_eq!(subs[0].bones[3].global_index, 3);
    }

    #[test]
    fn test_passthrough_keeps_indices_when_first_seen_differs() {
        // First triangle skinned to bone 1, second to bone 0: first-seen
        // order disagrees with cluster order, but an in-budget chunk must
        // come back untouched.
        let soup = boned_soup(2, |t| if t == 0 { 1 } else { 0 });
        let before = soup.clone();
        let frames: Vec<Vec<Mat4>> = (0..2)
            .map(|f| {
                (0..2)
                    .map(|b| Mat4::from_translation(glam::Vec3::new(f as f32, b as f32, 0.0)))
                    .collect()
            })
            .collect();
        let subs = split_bones(soup, 36, &skeleton(2), &frames).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].soup, before, "pass-through rewrote the chunk");
        // Bone list is the full skeleton in cluster order, not first-seen.
        assert_eq!(subs[0].bones[0].name, "bone0");
        assert_eq!(subs[0].bones[0].global_index, 0);
        assert_eq!(subs[0].bones[1].global_index, 1);
        // Frames are carried unfiltered.
        assert_eq!(subs[0].frames, frames);
    }

    #[test]
    fn test_unused_bones_do_not_trigger_split() {
        // Only bone 0 is referenced, but the skeleton itself exceeds the
        // budget, so the greedy path runs and localizes.
        let soup = boned_soup(2, |_| 0);
        let subs = split_bones(soup, 3, &skeleton(5), &[]).unwrap();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].bones.len(), 1);
        assert_eq!(subs[0].bones[0].global_index, 0);
    }

    #[test]
    fn test_bone_split_over_budget() {
        // 667 triangles over 80 bones with a cap of 36: the greedy walk
        // closes a sub-mesh every 36 fresh bones.
        let soup = boned_soup(667, |t| (t * 80 / 667) as u16);
        let subs = split_bones(soup, 36, &skeleton(80), &[]).unwrap();
        assert_eq!(subs.len(), 3);
        for sub in &subs {
            assert!(sub.bones.len() <= 36);
            assert_eq!(sub.soup.vertex_count() % 3, 0);
            // Every local index stays within the sub-mesh's bone list.
            for influence in &sub.soup.influences {
                for &bone in &influence.bones {
                    assert!((bone as usize) < sub.bones.len());
                }
            }
        }
        // Bone lists are disjoint here and cover all 80 source bones.
        let mut seen: Vec<usize> = subs
            .iter()
            .flat_map(|s| s.bones.iter().map(|b| b.global_index))
            .collect();
        assert_eq!(seen.len(), 80);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 80);
        // Triangle order is preserved across the split.
        assert_eq!(subs[0].soup.positions[0], [0.0, 0.0, 0.0]);
        let first_of_second = subs[1].soup.positions[0][0] as usize;
        assert_eq!(
            subs[0].soup.triangle_count(),
            first_of_second,
            "second sub-mesh resumes at the next triangle"
        );
    }

    #[test]
    fn test_bone_split_rewrites_local_indices() {
        // Two triangles on bones 7 and 2 with a budget of 1 each.
        let soup = boned_soup(2, |t| if t == 0 { 7 } else { 2 });
        let subs = split_bones(soup, 1, &skeleton(8), &[]).unwrap();
        assert_eq!(subs.len(), 2);
        assert_eq!(subs[0].bones[0].global_index, 7);
        assert_eq!(subs[1].bones[0].global_index, 2);
        // Both sub-meshes address their single bone as local index 0.
        assert!(subs[0].soup.influences.iter().all(|i| i.bones == [0; 4]));
        assert!(subs[1].soup.influences.iter().all(|i| i.bones == [0; 4]));
    }

    #[test]
    fn test_bone_split_filters_animation_frames() {
        let soup = boned_soup(2, |t| t as u16);
        let frames: Vec<Vec<Mat4>> = (0..3)
            .map(|f| {
                (0..2)
                    .map(|b| Mat4::from_translation(glam::Vec3::new(f as f32, b as f32, 0.0)))
                    .collect()
            })
            .collect();
        let subs = split_bones(soup, 1, &skeleton(2), &frames).unwrap();
        assert_eq!(subs.len(), 2);
        // Each sub-mesh keeps all frames but only its own bone's column.
        assert_eq!(subs[0].frames.len(), 3);
        assert_eq!(subs[1].frames.len(), 3);
        assert_eq!(subs[0].frames[2].len(), 1);
        assert_eq!(
            subs[1].frames[1][0],
            Mat4::from_translation(glam::Vec3::new(1.0, 1.0, 0.0))
        );
    }

    #[test]
    fn test_unsplittable_triangle() {
        let mut soup = TriangleSoup::default();
        for corner in 0..3u16 {
            soup.positions.push([corner as f32, 0.0, 0.0]);
            // Twelve distinct bones across one triangle.
            let base = corner * 4;
            soup.influences.push(SkinInfluence {
                weights: [0.25; 4],
                bones: [base, base + 1, base + 2, base + 3],
            });
        }
        let result = split_bones(soup, 8, &skeleton(12), &[]);
        assert!(matches!(
            result,
            Err(PipelineError::BoneBudgetUnsatisfiable { found: 12, budget: 8 })
        ));
    }
}
