//! Shared binary asset formats for the Forge runtime
//!
//! This crate defines the wire layouts written by `forge-export` and read
//! back by the runtime:
//! - `.mesh` — partitioned geometry (sub-meshes with per-corner attributes)
//! - `.anim` — node-frame or per-bone animation clips
//! - `.camera` — camera properties plus per-frame transforms
//!
//! All payloads are little-endian and zlib-compressed as a whole after
//! assembly.
//!
//! # Modules
//!
//! - [`formats`] - record types with `encode`/`decode` for each asset file
//! - [`compress`] - zlib wrap/unwrap of assembled asset buffers

pub mod compress;
pub mod formats;

pub use compress::{compress, decompress};

pub use formats::{
    AnimationFile,
    CameraFile,
    FormatError,
    MatrixTrack,
    MeshFile,
    QuatSample,
    QuatTrack,
    SubMeshRecord,
    // Animation type tags
    ANIM_TYPE_BONE_MATRIX,
    ANIM_TYPE_BONE_QUAT,
    ANIM_TYPE_NODE,
    // File extensions
    ANIM_EXT,
    CAMERA_EXT,
    MESH_EXT,
    // Animation-buffer register strides
    REGISTERS_PER_BONE_MATRIX,
    REGISTERS_PER_BONE_QUAT,
};
