//! Euler-angle transforms and the non-drawable [`Object3D`] scene entity.
//!
//! Two composition orders are in use and they are not interchangeable:
//!
//! | Entity      | Order                                         |
//! |-------------|-----------------------------------------------|
//! | [`Mesh`]    | translate → rotateX → rotateY → rotateZ → scale |
//! | [`Object3D`] | translate → rotateZ → rotateY → rotateX → scale |
//!
//! [`Mesh`]: crate::Mesh

use glam::{Mat4, Vec3};

use crate::math::mat4;

/// Order in which Euler rotations are chained onto the translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EulerOrder {
    /// `T · Rx · Ry · Rz · S`, used by meshes.
    Xyz,
    /// `T · Rz · Ry · Rx · S`, used by generic objects.
    Zyx,
}

/// Position, Euler rotation (radians) and scale.
///
/// ```
/// use meshlite::{EulerOrder, Transform, Vec3};
///
/// let transform = Transform::new()
///     .position(Vec3::new(0.0, 1.0, -3.0))
///     .rotation(Vec3::new(0.0, std::f32::consts::FRAC_PI_4, 0.0))
///     .uniform_scale(2.0);
///
/// let model = transform.matrix(EulerOrder::Xyz);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    /// Euler angles in radians, one per axis.
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Builds the model matrix, starting from identity and chaining
    /// translation, the three rotations in `order`, then scale.
    pub fn matrix(&self, order: EulerOrder) -> Mat4 {
        let m = mat4::translate(&mat4::identity(), self.position);
        let m = match order {
            EulerOrder::Xyz => {
                let m = mat4::rotate_x(&m, self.rotation.x);
                let m = mat4::rotate_y(&m, self.rotation.y);
                mat4::rotate_z(&m, self.rotation.z)
            }
            EulerOrder::Zyx => {
                let m = mat4::rotate_z(&m, self.rotation.z);
                let m = mat4::rotate_y(&m, self.rotation.y);
                mat4::rotate_x(&m, self.rotation.x)
            }
        };
        mat4::scale(&m, self.scale)
    }
}

/// A positioned scene entity that is not drawn.
///
/// Useful as a placeholder or anchor in the scene's node list. Its model matrix
/// uses [`EulerOrder::Zyx`].
#[derive(Clone, Debug)]
pub struct Object3D {
    pub transform: Transform,
    model_matrix: Mat4,
}

impl Default for Object3D {
    fn default() -> Self {
        Self::new(Transform::default())
    }
}

impl Object3D {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            model_matrix: transform.matrix(EulerOrder::Zyx),
        }
    }

    /// Recomputes the cached model matrix from the current transform.
    pub fn update_model_matrix(&mut self) {
        self.model_matrix = self.transform.matrix(EulerOrder::Zyx);
    }

    /// Model matrix as of the last [`update_model_matrix`](Self::update_model_matrix).
    pub fn model_matrix(&self) -> Mat4 {
        self.model_matrix
    }
}
