//! Forge binary asset formats
//!
//! Little-endian layouts, compressed as a whole with zlib after assembly.
//! Counts are `i32`, numeric payload is `f32` throughout (bone indices
//! included — the runtime consumes them as shader constants).

mod animation;
mod camera;
mod mesh;

pub use animation::{
    AnimationFile, MatrixTrack, QuatSample, QuatTrack, ANIM_TYPE_BONE_MATRIX, ANIM_TYPE_BONE_QUAT,
    ANIM_TYPE_NODE,
};
pub use camera::CameraFile;
pub use mesh::{MeshFile, SubMeshRecord};

use thiserror::Error;

/// File extension for mesh assets
pub const MESH_EXT: &str = "mesh";
/// File extension for animation assets
pub const ANIM_EXT: &str = "anim";
/// File extension for camera assets
pub const CAMERA_EXT: &str = "camera";

/// Register slots (4 floats each) one bone occupies in the animation buffer
/// under quaternion encoding: translation + quaternion.
pub const REGISTERS_PER_BONE_QUAT: u32 = 2;
/// Register slots one bone occupies under matrix encoding: three 4-float rows.
pub const REGISTERS_PER_BONE_MATRIX: u32 = 3;

/// Errors produced while parsing a Forge asset payload.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("payload truncated: needed {needed} more bytes")]
    Truncated { needed: usize },
    #[error("negative count in payload: {0}")]
    NegativeCount(i32),
    #[error("asset name is not valid UTF-8")]
    InvalidName(#[from] std::string::FromUtf8Error),
    #[error("unknown animation type tag: {0}")]
    UnknownAnimationType(i32),
}

// ============================================================================
// Payload assembly helpers
// ============================================================================

pub(crate) fn put_i32(buf: &mut Vec<u8>, value: i32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

pub(crate) fn put_f32s(buf: &mut Vec<u8>, values: &[f32]) {
    for &value in values {
        put_f32(buf, value);
    }
}

/// Cursor over a decompressed payload.
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8], FormatError> {
        if self.bytes.len() < len {
            return Err(FormatError::Truncated {
                needed: len - self.bytes.len(),
            });
        }
        let (head, tail) = self.bytes.split_at(len);
        self.bytes = tail;
        Ok(head)
    }

    pub(crate) fn i32(&mut self) -> Result<i32, FormatError> {
        let bytes = self.take(4)?;
        Ok(i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Read an `i32` count and reject negative values.
    pub(crate) fn count(&mut self) -> Result<usize, FormatError> {
        let value = self.i32()?;
        if value < 0 {
            return Err(FormatError::NegativeCount(value));
        }
        Ok(value as usize)
    }

    pub(crate) fn f32(&mut self) -> Result<f32, FormatError> {
        let bytes = self.take(4)?;
        Ok(f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub(crate) fn f32_array<const N: usize>(&mut self) -> Result<[f32; N], FormatError> {
        let mut out = [0.0f32; N];
        for value in &mut out {
            *value = self.f32()?;
        }
        Ok(out)
    }
}
