//! Forge camera format (.camera)
//!
//! Cameras are simple, non-partitioned records.
//!
//! # Layout (before compression)
//! ```text
//! i32          name length
//! bytes        name (UTF-8)
//! f32          viewport width
//! f32          viewport height
//! f32          near plane
//! f32          far plane
//! f32          field of view
//! 12 x f32     corrected transform (3 columns x 4 rows)
//! i32          animation frame count
//! 12 x f32     per frame
//! ```

use super::{put_f32, put_f32s, put_i32, FormatError, Reader};

/// A complete camera asset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CameraFile {
    pub name: String,
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
    pub field_of_view: f32,
    /// Corrected global transform at export time.
    pub transform: [f32; 12],
    /// Corrected global transform per animation frame (empty when animation
    /// export is disabled).
    pub frames: Vec<[f32; 12]>,
}

impl CameraFile {
    /// Assemble the uncompressed payload.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        put_i32(&mut buf, self.name.len() as i32);
        buf.extend_from_slice(self.name.as_bytes());
        put_f32(&mut buf, self.width);
        put_f32(&mut buf, self.height);
        put_f32(&mut buf, self.near);
        put_f32(&mut buf, self.far);
        put_f32(&mut buf, self.field_of_view);
        put_f32s(&mut buf, &self.transform);
        put_i32(&mut buf, self.frames.len() as i32);
        for frame in &self.frames {
            put_f32s(&mut buf, frame);
        }
        buf
    }

    /// Parse an uncompressed payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        let mut reader = Reader::new(bytes);
        let name_len = reader.count()?;
        let name = String::from_utf8(reader.take(name_len)?.to_vec())?;
        let width = reader.f32()?;
        let height = reader.f32()?;
        let near = reader.f32()?;
        let far = reader.f32()?;
        let field_of_view = reader.f32()?;
        let transform = reader.f32_array::<12>()?;
        let frame_count = reader.count()?;
        let mut frames = Vec::with_capacity(frame_count);
        for _ in 0..frame_count {
            frames.push(reader.f32_array::<12>()?);
        }
        Ok(Self {
            name,
            width,
            height,
            near,
            far,
            field_of_view,
            transform,
            frames,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_roundtrip() {
        let camera = CameraFile {
            name: "main_cam".to_string(),
            width: 1280.0,
            height: 720.0,
            near: 0.1,
            far: 3000.0,
            field_of_view: 45.0,
            transform: [0.5; 12],
            frames: vec![[1.0; 12], [2.0; 12]],
        };
        let payload = camera.encode();
        assert_eq!(CameraFile::decode(&payload).unwrap(), camera);
    }

    #[test]
    fn test_camera_static_payload_size() {
        let camera = CameraFile {
            name: "cam".to_string(),
            ..Default::default()
        };
        let payload = camera.encode();
        // name(4+3) + 5 properties (20) + transform(48) + frame count(4)
        assert_eq!(payload.len(), 4 + 3 + 20 + 48 + 4);
    }
}
