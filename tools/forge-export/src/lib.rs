//! forge-export - Forge scene export pipeline
//!
//! Takes fully-resolved source scenes (*.scene.json), partitions each mesh
//! into sub-meshes that fit the runtime's vertex and bone budgets, samples
//! skinning transforms per frame, and serializes everything into the
//! compressed Forge binary formats (.mesh, .anim, .camera).

pub mod config;
pub mod error;
pub mod export;
pub mod mesh;
pub mod partition;
pub mod scene;
pub mod skin;
pub mod soup;
pub mod transform;

pub use config::{AnimationEncoding, ExportConfig};
pub use error::PipelineError;
pub use export::{export_camera, export_mesh, ExportedCamera, ExportedMesh};
pub use mesh::{Bounds, BoneRef, MeshAsset, SubMesh};
pub use scene::{load_scene, SourceCamera, SourceCluster, SourceMesh, SourceScene};
pub use soup::{SkinInfluence, TriangleSoup};
