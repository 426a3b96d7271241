//! Export configuration
//!
//! Built once from the CLI (or by hand in tests) and passed by reference
//! through the pipeline. Nothing downstream mutates it.

use crate::error::PipelineError;

/// How skeletal animation samples are laid out in the animation buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationEncoding {
    /// One 3x4 matrix per (frame, bone): three register slots.
    #[default]
    Matrix,
    /// Translation plus rotation quaternion per (frame, bone): two slots.
    Quaternion,
}

impl AnimationEncoding {
    /// Register slots (4 floats each) one bone occupies per frame. Bone
    /// indices in the mesh file are pre-scaled by this stride.
    pub fn register_stride(self) -> u32 {
        match self {
            AnimationEncoding::Matrix => forge_common::REGISTERS_PER_BONE_MATRIX,
            AnimationEncoding::Quaternion => forge_common::REGISTERS_PER_BONE_QUAT,
        }
    }
}

/// Default vertex budget per sub-mesh (a multiple of 3).
pub const DEFAULT_MAX_VERTICES: usize = 65535;
/// Default bone cap per sub-mesh under quaternion encoding.
pub const DEFAULT_MAX_BONES_QUAT: usize = 56;
/// Default bone cap per sub-mesh under matrix encoding.
pub const DEFAULT_MAX_BONES_MATRIX: usize = 36;

/// Export settings for one run.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    /// Export the primary UV channel.
    pub parse_uv0: bool,
    /// Export the secondary UV channel.
    pub parse_uv1: bool,
    /// Export per-corner normals.
    pub parse_normals: bool,
    /// Export animation clips (and skin data for skeletal meshes).
    pub parse_animation: bool,
    /// Vertices are understood as world-baked: write the corrected local
    /// node transform into the mesh header instead of the global one.
    pub world_space_bind: bool,
    pub encoding: AnimationEncoding,
    pub max_vertices: usize,
    pub max_bones_matrix: usize,
    pub max_bones_quat: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            parse_uv0: false,
            parse_uv1: false,
            parse_normals: false,
            parse_animation: false,
            world_space_bind: false,
            encoding: AnimationEncoding::default(),
            max_vertices: DEFAULT_MAX_VERTICES,
            max_bones_matrix: DEFAULT_MAX_BONES_MATRIX,
            max_bones_quat: DEFAULT_MAX_BONES_QUAT,
        }
    }
}

impl ExportConfig {
    /// The bone cap that applies under the configured encoding.
    pub fn bone_budget(&self) -> usize {
        match self.encoding {
            AnimationEncoding::Matrix => self.max_bones_matrix,
            AnimationEncoding::Quaternion => self.max_bones_quat,
        }
    }

    /// Reject budgets that would force a split inside a triangle. Checked
    /// once, before any mesh is processed.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.max_vertices == 0 || self.max_vertices % 3 != 0 {
            return Err(PipelineError::InvalidPartitionBudget(self.max_vertices));
        }
        Ok(())
    }
}
