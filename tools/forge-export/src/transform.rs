//! Coordinate correction between source and runtime conventions
//!
//! The source convention differs from the runtime's in handedness and up
//! axis. Two fixed corrections bridge the gap: a local flip applied to
//! mesh-space data and a global flip applied to node and camera transforms.
//! Relative transforms are conjugated (`flip * m * flip_inverse`) so they
//! keep composing correctly after correction.

use glam::{Mat4, Quat, Vec3};

/// Correction for mesh-local data: rotate (-90, 180, 0) degrees, mirror X.
pub fn axis_flip_local() -> Mat4 {
    axis_flip(-90.0, 180.0)
}

/// Correction for node and camera transforms: rotate (0, 180, 0) degrees,
/// mirror X.
pub fn axis_flip_global() -> Mat4 {
    axis_flip(0.0, 180.0)
}

fn axis_flip(x_deg: f32, y_deg: f32) -> Mat4 {
    // Mirror first, then rotate about X, then about Y.
    let rotation =
        Quat::from_rotation_y(y_deg.to_radians()) * Quat::from_rotation_x(x_deg.to_radians());
    Mat4::from_scale_rotation_translation(Vec3::new(-1.0, 1.0, 1.0), rotation, Vec3::ZERO)
}

/// The composed correction for one object, applied to every vertex,
/// normal and transform that object exports.
pub struct CoordinateTransform {
    axis: Mat4,
    inv_axis: Mat4,
}

impl CoordinateTransform {
    /// Mesh correction: the local flip composed with the node's
    /// geometric-pivot transform.
    pub fn for_mesh(geometric_transform: Mat4) -> Self {
        Self::from_axis(axis_flip_local() * geometric_transform)
    }

    /// Cameras carry no pivot; only the global flip applies.
    pub fn for_camera() -> Self {
        Self::from_axis(axis_flip_global())
    }

    pub(crate) fn from_axis(axis: Mat4) -> Self {
        let inv_axis = axis.inverse();
        Self { axis, inv_axis }
    }

    /// Full correction including translation; used for positions.
    pub fn transform_point(&self, v: Vec3) -> Vec3 {
        self.axis.transform_point3(v)
    }

    /// Rotation and scale only; used for normals (renormalize after).
    pub fn transform_direction(&self, v: Vec3) -> Vec3 {
        self.axis.transform_vector3(v)
    }

    /// Inverse of the composed correction, the right-hand side of every
    /// conjugated transform chain.
    pub fn inverse_axis(&self) -> Mat4 {
        self.inv_axis
    }

    /// A node transform re-expressed in the corrected convention.
    pub fn corrected_node_transform(&self, node: Mat4) -> Mat4 {
        axis_flip_global() * node * self.inv_axis
    }
}

/// Drop the redundant fourth column of an affine matrix: twelve floats,
/// grouped per output column, translation in each group's final slot.
pub fn trim_matrix(m: Mat4) -> [f32; 12] {
    let t = m.transpose();
    let mut out = [0.0f32; 12];
    out[0..4].copy_from_slice(&t.x_axis.to_array());
    out[4..8].copy_from_slice(&t.y_axis.to_array());
    out[8..12].copy_from_slice(&t.z_axis.to_array());
    out
}
