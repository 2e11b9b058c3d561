//! Vector and matrix routines used by the camera, transforms and uniform packing.
//!
//! The functions are grouped the same way they are used in shader code:
//! [`vec3`], [`mat3`] and [`mat4`]. Storage is glam's column-major layout, so
//! `Mat4::to_cols_array()` yields the flat 16-float array the GPU expects.
//!
//! All functions are pure. Transform builders (`translate`, `rotate_*`,
//! `scale`) post-multiply: `translate(m, v)` returns `m * T(v)`, which means
//! the last operation in a chain is the first one applied to a vertex.

pub mod vec3 {
    use glam::{Mat3, Mat4, Vec3};

    pub fn create() -> Vec3 {
        Vec3::ZERO
    }

    pub fn from_values(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3::new(x, y, z)
    }

    pub fn set(out: &mut Vec3, x: f32, y: f32, z: f32) {
        *out = Vec3::new(x, y, z);
    }

    pub fn copy(out: &mut Vec3, a: Vec3) {
        *out = a;
    }

    pub fn length(a: Vec3) -> f32 {
        a.length()
    }

    /// Multiplies `a` by the 3×3 matrix `m`.
    pub fn transform_mat3(a: Vec3, m: &Mat3) -> Vec3 {
        *m * a
    }

    /// Transforms `a` as a point (w = 1). No perspective divide is performed.
    pub fn transform_mat4(a: Vec3, m: &Mat4) -> Vec3 {
        m.transform_point3(a)
    }
}

pub mod mat3 {
    use glam::{Mat3, Mat4};

    pub fn create() -> Mat3 {
        Mat3::IDENTITY
    }

    /// Upper-left 3×3 block of `m`.
    pub fn from_mat4(m: &Mat4) -> Mat3 {
        Mat3::from_mat4(*m)
    }

    /// Returns `None` when the determinant is exactly zero.
    pub fn invert(m: &Mat3) -> Option<Mat3> {
        if m.determinant() == 0.0 {
            return None;
        }
        Some(m.inverse())
    }

    pub fn transpose(m: &Mat3) -> Mat3 {
        m.transpose()
    }
}

pub mod mat4 {
    use glam::{Mat4, Vec3, Vec4};

    /// Per-axis tolerance under which `look_at` treats eye and center as equal.
    pub const LOOK_AT_EPSILON: f32 = 0.000001;

    pub fn create() -> Mat4 {
        Mat4::IDENTITY
    }

    pub fn identity() -> Mat4 {
        Mat4::IDENTITY
    }

    /// Right-handed symmetric perspective projection with a `[0, 1]` depth range.
    ///
    /// `fovy` is the vertical field of view in radians.
    pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fovy / 2.0).tan();
        let nf = 1.0 / (near - far);

        Mat4::from_cols(
            Vec4::new(f / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, far * nf, -1.0),
            Vec4::new(0.0, 0.0, far * near * nf, 0.0),
        )
    }

    /// Right-handed view matrix looking from `eye` towards `center`.
    ///
    /// Returns the identity when `eye` and `center` coincide within
    /// [`LOOK_AT_EPSILON`] on every axis. When `up` is parallel to the view
    /// direction the side axis collapses to zero.
    pub fn look_at(eye: Vec3, center: Vec3, up: Vec3) -> Mat4 {
        let d = eye - center;
        if d.x.abs() < LOOK_AT_EPSILON
            && d.y.abs() < LOOK_AT_EPSILON
            && d.z.abs() < LOOK_AT_EPSILON
        {
            return Mat4::IDENTITY;
        }

        let z = d / d.length();
        let x = up.cross(z).normalize_or_zero();
        let y = z.cross(x);

        Mat4::from_cols(
            Vec4::new(x.x, y.x, z.x, 0.0),
            Vec4::new(x.y, y.y, z.y, 0.0),
            Vec4::new(x.z, y.z, z.z, 0.0),
            Vec4::new(-x.dot(eye), -y.dot(eye), -z.dot(eye), 1.0),
        )
    }

    pub fn translate(m: &Mat4, v: Vec3) -> Mat4 {
        *m * Mat4::from_translation(v)
    }

    pub fn rotate_x(m: &Mat4, rad: f32) -> Mat4 {
        *m * Mat4::from_rotation_x(rad)
    }

    pub fn rotate_y(m: &Mat4, rad: f32) -> Mat4 {
        *m * Mat4::from_rotation_y(rad)
    }

    pub fn rotate_z(m: &Mat4, rad: f32) -> Mat4 {
        *m * Mat4::from_rotation_z(rad)
    }

    pub fn scale(m: &Mat4, v: Vec3) -> Mat4 {
        *m * Mat4::from_scale(v)
    }

    /// `a * b`: applies `b` first, then `a`.
    pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
        *a * *b
    }

    /// Returns `None` when the determinant is exactly zero.
    pub fn invert(m: &Mat4) -> Option<Mat4> {
        if m.determinant() == 0.0 {
            return None;
        }
        Some(m.inverse())
    }

    pub fn transpose(m: &Mat4) -> Mat4 {
        m.transpose()
    }
}

use glam::{Mat3, Mat4};

/// Inverse-transpose of the upper 3×3 of `model_view`.
///
/// A singular input is not an error: the un-inverted block is transposed and
/// returned as is.
pub fn normal_matrix(model_view: &Mat4) -> Mat3 {
    let upper = mat3::from_mat4(model_view);
    let inverted = mat3::invert(&upper).unwrap_or(upper);
    mat3::transpose(&inverted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::{Vec3, Vec4};

    fn assert_mat4_eq(a: Mat4, b: Mat4) {
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-5);
        }
    }

    #[test]
    fn look_at_degenerate_returns_identity() {
        let eye = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(mat4::look_at(eye, eye, Vec3::Y), Mat4::IDENTITY);

        let nearly = eye + Vec3::splat(0.0000001);
        assert_eq!(mat4::look_at(eye, nearly, Vec3::Y), Mat4::IDENTITY);
    }

    #[test]
    fn look_at_matches_right_handed_view() {
        let eye = Vec3::new(3.0, 4.0, 5.0);
        let center = Vec3::new(0.0, 1.0, 0.0);
        assert_mat4_eq(
            mat4::look_at(eye, center, Vec3::Y),
            Mat4::look_at_rh(eye, center, Vec3::Y),
        );
    }

    #[test]
    fn look_at_maps_eye_to_origin() {
        let eye = Vec3::new(0.0, 0.0, 5.0);
        let view = mat4::look_at(eye, Vec3::ZERO, Vec3::Y);
        let p = vec3::transform_mat4(eye, &view);
        assert_relative_eq!(p.length(), 0.0, epsilon = 1e-6);

        // target lands on the negative Z axis
        let t = vec3::transform_mat4(Vec3::ZERO, &view);
        assert_relative_eq!(t.z, -5.0, epsilon = 1e-6);
    }

    #[test]
    fn look_at_up_parallel_collapses_side_axis() {
        let view = mat4::look_at(Vec3::new(0.0, 5.0, 0.0), Vec3::ZERO, Vec3::Y);
        assert_eq!(view.row(0).truncate(), Vec3::ZERO);
    }

    #[test]
    fn perspective_matches_zero_to_one_rh() {
        let fov = std::f32::consts::FRAC_PI_4;
        assert_mat4_eq(
            mat4::perspective(fov, 1.5, 0.1, 2000.0),
            Mat4::perspective_rh(fov, 1.5, 0.1, 2000.0),
        );
    }

    #[test]
    fn perspective_maps_near_and_far_planes() {
        let proj = mat4::perspective(1.0, 1.0, 1.0, 10.0);
        let near = proj * Vec4::new(0.0, 0.0, -1.0, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-6);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn transform_chain_post_multiplies() {
        let m = mat4::translate(&Mat4::IDENTITY, Vec3::new(1.0, 0.0, 0.0));
        let m = mat4::scale(&m, Vec3::splat(2.0));
        // scale first, then translate
        let p = vec3::transform_mat4(Vec3::new(1.0, 1.0, 1.0), &m);
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 2.0);
    }

    #[test]
    fn rotate_z_quarter_turn() {
        let m = mat4::rotate_z(&Mat4::IDENTITY, std::f32::consts::FRAC_PI_2);
        let p = vec3::transform_mat4(Vec3::X, &m);
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(p.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn invert_reports_singular_matrices() {
        assert!(mat4::invert(&Mat4::ZERO).is_none());
        assert!(mat3::invert(&Mat3::from_diagonal(Vec3::new(1.0, 0.0, 1.0))).is_none());

        let m = mat4::translate(&Mat4::IDENTITY, Vec3::new(1.0, 2.0, 3.0));
        let inv = mat4::invert(&m).unwrap();
        assert_mat4_eq(mat4::multiply(&m, &inv), Mat4::IDENTITY);
    }

    #[test]
    fn normal_matrix_undoes_non_uniform_scale() {
        let mv = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&mv);
        assert_relative_eq!(n.x_axis.x, 0.5);
        assert_relative_eq!(n.y_axis.y, 1.0);
    }

    #[test]
    fn normal_matrix_singular_falls_back_to_transpose() {
        let mv = Mat4::from_cols(
            Vec4::new(1.0, 2.0, 0.0, 0.0),
            Vec4::new(0.0, 0.0, 0.0, 0.0),
            Vec4::new(3.0, 0.0, 1.0, 0.0),
            Vec4::W,
        );
        let n = normal_matrix(&mv);
        assert_eq!(n, mat3::from_mat4(&mv).transpose());
    }

    #[test]
    fn vec3_helpers() {
        let mut v = vec3::create();
        vec3::set(&mut v, 3.0, 4.0, 0.0);
        assert_eq!(vec3::length(v), 5.0);

        let mut w = vec3::create();
        vec3::copy(&mut w, v);
        assert_eq!(w, vec3::from_values(3.0, 4.0, 0.0));

        let m = Mat3::from_diagonal(Vec3::new(2.0, 3.0, 4.0));
        assert_eq!(vec3::transform_mat3(Vec3::ONE, &m), Vec3::new(2.0, 3.0, 4.0));
    }
}
