//! Forge animation format (.anim)
//!
//! # Layout (before compression)
//! ```text
//! i32 type
//! type 0 (node frames):
//!     i32 frame count | 12 x f32 per frame (3 columns x 4 rows)
//! type 1 (per-bone matrices):
//!     i32 sub-mesh count
//!     per sub-mesh: i32 frame count | i32 bone count
//!                   | 12 x f32 per (frame, bone), frame-major
//! type 2 (per-bone quaternions):
//!     same shape as type 1, but each sample is
//!     4 x f32 translation (xyz, 0) | 4 x f32 quaternion (xyzw)
//! ```

use super::{put_f32s, put_i32, FormatError, Reader};

/// Animation type tag: per-frame whole-mesh matrix
pub const ANIM_TYPE_NODE: i32 = 0;
/// Animation type tag: per-frame-per-bone 3x4 matrix
pub const ANIM_TYPE_BONE_MATRIX: i32 = 1;
/// Animation type tag: per-frame-per-bone quaternion + translation
pub const ANIM_TYPE_BONE_QUAT: i32 = 2;

/// One decomposed bone sample: translation padded to 4 floats, then the
/// rotation quaternion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QuatSample {
    /// Translation (x, y, z, 0)
    pub translation: [f32; 4],
    /// Rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
}

/// Matrix-encoded bone track for one sub-mesh, frame-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatrixTrack {
    pub frame_count: u32,
    pub bone_count: u32,
    /// `frame_count * bone_count` samples: all bones of frame 0, then frame 1...
    pub samples: Vec<[f32; 12]>,
}

/// Quaternion-encoded bone track for one sub-mesh, frame-major.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuatTrack {
    pub frame_count: u32,
    pub bone_count: u32,
    pub samples: Vec<QuatSample>,
}

/// A complete animation asset.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationFile {
    /// Non-skeletal: one corrected node transform per frame.
    Node { frames: Vec<[f32; 12]> },
    /// Skeletal, matrix encoding: one track per sub-mesh.
    BoneMatrix { tracks: Vec<MatrixTrack> },
    /// Skeletal, quaternion encoding: one track per sub-mesh.
    BoneQuat { tracks: Vec<QuatTrack> },
}

impl AnimationFile {
    /// The wire type tag for this clip.
    pub fn type_tag(&self) -> i32 {
        match self {
            AnimationFile::Node { .. } => ANIM_TYPE_NODE,
            AnimationFile::BoneMatrix { .. } => ANIM_TYPE_BONE_MATRIX,
            AnimationFile::BoneQuat { .. } => ANIM_TYPE_BONE_QUAT,
        }
    }

    /// Assemble the uncompressed payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_i32(&mut buf, self.type_tag());
        match self {
            AnimationFile::Node { frames } => {
                put_i32(&mut buf, frames.len() as i32);
                for frame in frames {
                    put_f32s(&mut buf, frame);
                }
            }
            AnimationFile::BoneMatrix { tracks } => {
                put_i32(&mut buf, tracks.len() as i32);
                for track in tracks {
                    put_i32(&mut buf, track.frame_count as i32);
                    put_i32(&mut buf, track.bone_count as i32);
                    for sample in &track.samples {
                        put_f32s(&mut buf, sample);
                    }
                }
            }
            AnimationFile::BoneQuat { tracks } => {
                put_i32(&mut buf, tracks.len() as i32);
                for track in tracks {
                    put_i32(&mut buf, track.frame_count as i32);
                    put_i32(&mut buf, track.bone_count as i32);
                    for sample in &track.samples {
                        put_f32s(&mut buf, &sample.translation);
                        put_f32s(&mut buf, &sample.rotation);
                    }
                }
            }
        }
        buf
    }

    /// Parse an uncompressed payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut reader = Reader::new(bytes);
        let tag = reader.i32()?;
        match tag {
            ANIM_TYPE_NODE => {
                let frame_count = reader.count()?;
                let mut frames = Vec::with_capacity(frame_count);
                for _ in 0..frame_count {
                    frames.push(reader.f32_array::<12>()?);
                }
                Ok(AnimationFile::Node { frames })
            }
            ANIM_TYPE_BONE_MATRIX => {
                let track_count = reader.count()?;
                let mut tracks = Vec::with_capacity(track_count);
                for _ in 0..track_count {
                    let frame_count = reader.count()? as u32;
                    let bone_count = reader.count()? as u32;
                    let sample_count = frame_count as usize * bone_count as usize;
                    let mut samples = Vec::with_capacity(sample_count);
                    for _ in 0..sample_count {
                        samples.push(reader.f32_array::<12>()?);
                    }
                    tracks.push(MatrixTrack {
                        frame_count,
                        bone_count,
                        samples,
                    });
                }
                Ok(AnimationFile::BoneMatrix { tracks })
            }
            ANIM_TYPE_BONE_QUAT => {
                let track_count = reader.count()?;
                let mut tracks = Vec::with_capacity(track_count);
                for _ in 0..track_count {
                    let frame_count = reader.count()? as u32;
                    let bone_count = reader.count()? as u32;
                    let sample_count = frame_count as usize * bone_count as usize;
                    let mut samples = Vec::with_capacity(sample_count);
                    for _ in 0..sample_count {
                        samples.push(QuatSample {
                            translation: reader.f32_array::<4>()?,
                            rotation: reader.f32_array::<4>()?,
                        });
                    }
                    tracks.push(QuatTrack {
                        frame_count,
                        bone_count,
                        samples,
                    });
                }
                Ok(AnimationFile::BoneQuat { tracks })
            }
            other => Err(FormatError::UnknownAnimationType(other)),
        }
    }
}
