//! In-memory mesh model between partitioning and encoding

use glam::Mat4;

use crate::error::PipelineError;
use crate::soup::TriangleSoup;

/// Axis-aligned bounds of a position stream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    /// Fold over a position stream, seeded from its first vertex. Computed
    /// on the pre-split stream so the bounds cover the whole mesh.
    pub fn from_positions(positions: &[[f32; 3]]) -> Result<Self, PipelineError> {
        let first = positions.first().ok_or(PipelineError::EmptyGeometry)?;
        let mut bounds = Bounds {
            min: *first,
            max: *first,
        };
        for position in &positions[1..] {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(position[axis]);
                bounds.max[axis] = bounds.max[axis].max(position[axis]);
            }
        }
        Ok(bounds)
    }

    /// Wire order: min.xyz then max.xyz.
    pub fn to_array(&self) -> [f32; 6] {
        [
            self.min[0], self.min[1], self.min[2], self.max[0], self.max[1], self.max[2],
        ]
    }
}

/// A bone as referenced by one sub-mesh. Position in the sub-mesh's bone
/// list is the local index the vertex stream uses.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneRef {
    pub name: String,
    /// Index into the mesh's cluster list.
    pub global_index: usize,
}

/// One budget-compliant partition of a mesh.
#[derive(Debug, Clone, Default)]
pub struct SubMesh {
    pub soup: TriangleSoup,
    /// Bones this sub-mesh references, in first-seen order. Empty for
    /// non-skeletal meshes.
    pub bones: Vec<BoneRef>,
    /// Per-frame skinning transforms, one per local bone, frame-major.
    pub frames: Vec<Vec<Mat4>>,
}

impl SubMesh {
    pub fn unskinned(soup: TriangleSoup) -> Self {
        Self {
            soup,
            bones: Vec::new(),
            frames: Vec::new(),
        }
    }
}

/// A fully-partitioned mesh, ready for encoding.
#[derive(Debug, Clone)]
pub struct MeshAsset {
    pub name: String,
    pub skeletal: bool,
    /// Corrected node transform for the file header.
    pub header_transform: Mat4,
    /// Bounds of the unsplit vertex stream.
    pub bounds: Bounds,
    pub sub_meshes: Vec<SubMesh>,
    /// Non-skeletal clip: corrected node transform per frame.
    pub node_frames: Vec<Mat4>,
}
