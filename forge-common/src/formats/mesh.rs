//! Forge mesh format (.mesh)
//!
//! # Layout (before compression)
//! ```text
//! i32          name length
//! bytes        name (UTF-8)
//! 12 x f32     node transform, 3 columns x 4 rows
//! i32          sub-mesh count
//! sub-mesh*    see below
//! 6 x f32      bounds (min.xyz, max.xyz)
//! ```
//!
//! Each sub-mesh:
//! ```text
//! i32 vertex count   | 3 x f32 per vertex  positions
//! i32 uv0 count      | 2 x f32 per entry
//! i32 uv1 count      | 2 x f32 per entry
//! i32 normal count   | 3 x f32 per entry
//! i32 weight count   | 4 x f32 per entry   skin weights
//! i32 index count    | 4 x f32 per entry   bone indices, pre-scaled by the
//!                                          animation-buffer register stride
//! ```

use super::{put_f32s, put_i32, FormatError, Reader};

/// One budget-compliant drawable unit inside a mesh file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubMeshRecord {
    pub positions: Vec<[f32; 3]>,
    pub uv0: Vec<[f32; 2]>,
    pub uv1: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
    /// Four skin weights per vertex, zero-padded.
    pub weights: Vec<[f32; 4]>,
    /// Four bone indices per vertex, already multiplied by the register
    /// stride of the chosen animation encoding.
    pub scaled_bone_indices: Vec<[f32; 4]>,
}

/// A complete mesh asset: one or more sub-meshes plus shared metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshFile {
    pub name: String,
    /// Corrected node transform, 3 columns x 4 rows.
    pub transform: [f32; 12],
    pub sub_meshes: Vec<SubMeshRecord>,
    /// Axis-aligned bounds of the unsplit vertex stream: min.xyz, max.xyz.
    pub bounds: [f32; 6],
}

impl MeshFile {
    /// Assemble the uncompressed payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_i32(&mut buf, self.name.len() as i32);
        buf.extend_from_slice(self.name.as_bytes());
        put_f32s(&mut buf, &self.transform);
        put_i32(&mut buf, self.sub_meshes.len() as i32);
        for sub in &self.sub_meshes {
            sub.encode(&mut buf);
        }
        put_f32s(&mut buf, &self.bounds);
        buf
    }

    /// Parse an uncompressed payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut reader = Reader::new(bytes);
        let name_len = reader.count()?;
        let name = String::from_utf8(reader.take(name_len)?.to_vec())?;
        let transform = reader.f32_array::<12>()?;
        let sub_count = reader.count()?;
        let mut sub_meshes = Vec::with_capacity(sub_count);
        for _ in 0..sub_count {
            sub_meshes.push(SubMeshRecord::decode(&mut reader)?);
        }
        let bounds = reader.f32_array::<6>()?;
        Ok(Self {
            name,
            transform,
            sub_meshes,
            bounds,
        })
    }
}

impl SubMeshRecord {
    fn encode(&self, buf: &mut Vec<u8>) {
        encode_stream(buf, &self.positions);
        encode_stream(buf, &self.uv0);
        encode_stream(buf, &self.uv1);
        encode_stream(buf, &self.normals);
        encode_stream(buf, &self.weights);
        encode_stream(buf, &self.scaled_bone_indices);
    }

    fn decode(reader: &mut Reader) -> Result<Self, FormatError> {
        Ok(Self {
            positions: decode_stream(reader)?,
            uv0: decode_stream(reader)?,
            uv1: decode_stream(reader)?,
            normals: decode_stream(reader)?,
            weights: decode_stream(reader)?,
            scaled_bone_indices: decode_stream(reader)?,
        })
    }
}

fn encode_stream<const N: usize>(buf: &mut Vec<u8>, stream: &[[f32; N]]) {
    put_i32(buf, stream.len() as i32);
    for entry in stream {
        put_f32s(buf, entry);
    }
}

fn decode_stream<const N: usize>(reader: &mut Reader) -> Result<Vec<[f32; N]>, FormatError> {
    let count = reader.count()?;
    let mut stream = Vec::with_capacity(count);
    for _ in 0..count {
        stream.push(reader.f32_array::<N>()?);
    }
    Ok(stream)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sub_mesh() -> SubMeshRecord {
        SubMeshRecord {
            positions: vec![[0.0, 1.0, 2.0], [3.0, 4.0, 5.0], [6.0, 7.0, 8.0]],
            uv0: vec![[0.0, 0.5], [0.25, 0.75], [1.0, 1.0]],
            uv1: Vec::new(),
            normals: vec![[0.0, 1.0, 0.0], [0.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
            weights: vec![[1.0, 0.0, 0.0, 0.0]; 3],
            scaled_bone_indices: vec![[0.0, 2.0, 4.0, 6.0]; 3],
        }
    }

    #[test]
    fn test_mesh_file_roundtrip() {
        let file = MeshFile {
            name: "hero_body".to_string(),
            transform: [
                1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0,
            ],
            sub_meshes: vec![sample_sub_mesh()],
            bounds: [-1.0, -2.0, -3.0, 1.0, 2.0, 3.0],
        };

        let payload = file.encode();
        let parsed = MeshFile::decode(&payload).unwrap();
        assert_eq!(parsed, file);
    }

    #[test]
    fn test_mesh_file_payload_layout() {
        let file = MeshFile {
            name: "tri".to_string(),
            transform: [0.0; 12],
            sub_meshes: vec![SubMeshRecord {
                positions: vec![[0.0; 3]; 3],
                ..Default::default()
            }],
            bounds: [0.0; 6],
        };

        let payload = file.encode();
        // name(4+3) + transform(48) + count(4)
        //   + sub: 6 counts (24) + 3 positions (36)
        //   + bounds(24)
        assert_eq!(payload.len(), 4 + 3 + 48 + 4 + 24 + 36 + 24);
        // First i32 is the name length.
        assert_eq!(payload[0..4], 3i32.to_le_bytes());
    }

    #[test]
    fn test_mesh_file_truncated() {
        let file = MeshFile {
            name: "x".to_string(),
            transform: [0.0; 12],
            sub_meshes: vec![sample_sub_mesh()],
            bounds: [0.0; 6],
        };
        let payload = file.encode();
        let result = MeshFile::decode(&payload[..payload.len() - 8]);
        assert!(matches!(result, Err(FormatError::Truncated { .. })));
    }

    #[test]
    fn test_mesh_file_negative_count() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&(-1i32).to_le_bytes());
        assert!(matches!(
            MeshFile::decode(&payload),
            Err(FormatError::NegativeCount(-1))
        ));
    }
}
