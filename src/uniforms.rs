//! Per-mesh uniforms and their byte layout in the GPU uniform buffer.
//!
//! The layout mirrors the `Uniforms` struct in the default shaders and must
//! change together with it:
//!
//! | Field                     | Offset | Size | Notes                         |
//! |---------------------------|--------|------|-------------------------------|
//! | modelViewProjectionMatrix | 0      | 64   | `mat4x4<f32>`                 |
//! | modelViewMatrix           | 64     | 64   | `mat4x4<f32>`                 |
//! | normalMatrix              | 128    | 48   | `mat3x3<f32>`: 3 × (vec3 + 4 pad) |
//! | padding                   | 176    | 16   | `vec4<f32>`                   |
//! | lightPosition             | 192    | 16   | vec3 + 4 pad                  |
//! | lightColor                | 208    | 16   | vec3 + 4 pad                  |
//! | lightIntensity            | 224    | 4    | `f32`                         |
//!
//! Total size is rounded up to 16 bytes: 240.

use glam::{Mat3, Mat4, Vec3};

use crate::camera::Camera;
use crate::gpu::GpuContext;
use crate::light::Light;
use crate::math::{self, vec3};

/// Values uploaded for one mesh each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Uniforms {
    pub model_view_projection: Mat4,
    pub model_view: Mat4,
    pub normal_matrix: Mat3,
    /// Eye-space light position.
    pub light_position: Vec3,
    pub light_color: Vec3,
    pub light_intensity: f32,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            model_view_projection: Mat4::IDENTITY,
            model_view: Mat4::IDENTITY,
            normal_matrix: Mat3::IDENTITY,
            light_position: Vec3::ZERO,
            light_color: Vec3::ZERO,
            light_intensity: 1.0,
        }
    }
}

/// Computes a mesh's uniforms from its model matrix and the current camera.
///
/// The camera must already be updated for this frame. Without a light the
/// light fields keep their defaults (black light, intensity 1).
pub fn compute_uniforms(model: &Mat4, camera: &Camera, light: Option<&Light>) -> Uniforms {
    let view = camera.view_matrix();
    let model_view = math::mat4::multiply(&view, model);
    let model_view_projection = math::mat4::multiply(&camera.projection_matrix(), &model_view);

    let mut uniforms = Uniforms {
        model_view_projection,
        model_view,
        normal_matrix: math::normal_matrix(&model_view),
        ..Default::default()
    };

    if let Some(light) = light {
        uniforms.light_position = vec3::transform_mat4(light.position, &view);
        uniforms.light_color = light.color;
        uniforms.light_intensity = light.intensity;
    }

    uniforms
}

/// Byte range of one field inside the uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSlot {
    pub offset: u64,
    pub size: u64,
}

impl FieldSlot {
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    fn float_index(&self) -> usize {
        (self.offset / 4) as usize
    }
}

/// Offset table for [`Uniforms`]. Depends only on the field schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformLayout {
    pub model_view_projection: FieldSlot,
    pub model_view: FieldSlot,
    pub normal_matrix: FieldSlot,
    pub padding: FieldSlot,
    pub light_position: FieldSlot,
    pub light_color: FieldSlot,
    pub light_intensity: FieldSlot,
    /// Total buffer size in bytes, a multiple of 16.
    pub size: u64,
}

/// Stride between normal-matrix columns: a vec3 padded to 16 bytes.
const MAT3_COLUMN_STRIDE: usize = 4;

fn align_to(offset: u64, alignment: u64) -> u64 {
    offset.div_ceil(alignment) * alignment
}

impl Default for UniformLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl UniformLayout {
    pub fn new() -> Self {
        let mut offset = 0;
        let mut slot = |size: u64, align: u64| {
            let s = FieldSlot {
                offset: align_to(offset, align),
                size,
            };
            offset = s.end();
            s
        };

        let model_view_projection = slot(64, 16);
        let model_view = slot(64, 16);
        let normal_matrix = slot(48, 16);
        let padding = slot(16, 16);
        let light_position = slot(16, 16);
        let light_color = slot(16, 16);
        let light_intensity = slot(4, 4);
        let size = align_to(offset, 16);

        Self {
            model_view_projection,
            model_view,
            normal_matrix,
            padding,
            light_position,
            light_color,
            light_intensity,
            size,
        }
    }

    /// All slots in buffer order.
    pub fn slots(&self) -> [FieldSlot; 7] {
        [
            self.model_view_projection,
            self.model_view,
            self.normal_matrix,
            self.padding,
            self.light_position,
            self.light_color,
            self.light_intensity,
        ]
    }

    pub fn float_count(&self) -> usize {
        (self.size / 4) as usize
    }

    /// Serializes `uniforms` into `out`, which must hold
    /// [`float_count`](Self::float_count) floats. Padding is zeroed.
    pub fn write(&self, uniforms: &Uniforms, out: &mut [f32]) {
        out.fill(0.0);

        let i = self.model_view_projection.float_index();
        out[i..i + 16].copy_from_slice(&uniforms.model_view_projection.to_cols_array());

        let i = self.model_view.float_index();
        out[i..i + 16].copy_from_slice(&uniforms.model_view.to_cols_array());

        let i = self.normal_matrix.float_index();
        let columns = [
            uniforms.normal_matrix.x_axis,
            uniforms.normal_matrix.y_axis,
            uniforms.normal_matrix.z_axis,
        ];
        for (n, column) in columns.iter().enumerate() {
            let at = i + n * MAT3_COLUMN_STRIDE;
            out[at..at + 3].copy_from_slice(&column.to_array());
        }

        let i = self.light_position.float_index();
        out[i..i + 3].copy_from_slice(&uniforms.light_position.to_array());

        let i = self.light_color.float_index();
        out[i..i + 3].copy_from_slice(&uniforms.light_color.to_array());

        out[self.light_intensity.float_index()] = uniforms.light_intensity;
    }

    /// Serializes `uniforms` into a fresh float array.
    pub fn pack(&self, uniforms: &Uniforms) -> Vec<f32> {
        let mut data = vec![0.0; self.float_count()];
        self.write(uniforms, &mut data);
        data
    }
}

/// GPU uniform buffer holding one [`Uniforms`] block.
pub struct UniformBuffer {
    pub(crate) buffer: wgpu::Buffer,
    layout: UniformLayout,
    staging: Vec<f32>,
}

impl UniformBuffer {
    pub fn new(gpu: &GpuContext, label: &str) -> Self {
        let layout = UniformLayout::new();
        let buffer = gpu.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(label),
            size: layout.size,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        Self {
            buffer,
            staging: vec![0.0; layout.float_count()],
            layout,
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Packs `uniforms` and writes the whole buffer.
    pub fn update(&mut self, queue: &wgpu::Queue, uniforms: &Uniforms) {
        self.layout.write(uniforms, &mut self.staging);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&self.staging));
    }

    pub fn binding(&self) -> wgpu::BindingResource<'_> {
        self.buffer.as_entire_binding()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::CameraConfig;
    use crate::transform::{EulerOrder, Transform};
    use approx::assert_relative_eq;

    #[test]
    fn layout_offsets_match_shader_struct() {
        let layout = UniformLayout::new();
        assert_eq!(layout.model_view_projection.offset, 0);
        assert_eq!(layout.model_view.offset, 64);
        assert_eq!(layout.normal_matrix, FieldSlot { offset: 128, size: 48 });
        assert_eq!(layout.padding.offset, 176);
        assert_eq!(layout.light_position.offset, 192);
        assert_eq!(layout.light_color.offset, 208);
        assert_eq!(layout.light_intensity, FieldSlot { offset: 224, size: 4 });
        assert_eq!(layout.size, 240);
    }

    #[test]
    fn layout_size_is_16_byte_multiple_and_slots_do_not_overlap() {
        let layout = UniformLayout::new();
        assert_eq!(layout.size % 16, 0);

        let slots = layout.slots();
        for pair in slots.windows(2) {
            assert!(pair[0].end() <= pair[1].offset);
        }
        assert!(slots.last().unwrap().end() <= layout.size);
    }

    #[test]
    fn pack_places_values_at_their_offsets() {
        let uniforms = Uniforms {
            model_view_projection: Mat4::from_cols_array(&std::array::from_fn(|i| i as f32)),
            model_view: Mat4::from_cols_array(&std::array::from_fn(|i| 100.0 + i as f32)),
            normal_matrix: Mat3::from_cols_array(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0]),
            light_position: Vec3::new(-1.0, -2.0, -3.0),
            light_color: Vec3::new(0.25, 0.5, 0.75),
            light_intensity: 2.5,
        };

        let layout = UniformLayout::new();
        let data = layout.pack(&uniforms);
        let bytes: &[u8] = bytemuck::cast_slice(&data);
        assert_eq!(bytes.len(), 240);

        let at = |byte: usize| data[byte / 4];
        assert_eq!(at(0), 0.0);
        assert_eq!(at(60), 15.0);
        assert_eq!(at(64), 100.0);
        assert_eq!(at(124), 115.0);

        // normal-matrix columns, each followed by a zero pad word
        assert_eq!(&data[32..44], &[1.0, 2.0, 3.0, 0.0, 4.0, 5.0, 6.0, 0.0, 7.0, 8.0, 9.0, 0.0]);
        assert_eq!(&data[44..48], &[0.0; 4]);

        assert_eq!(&data[48..52], &[-1.0, -2.0, -3.0, 0.0]);
        assert_eq!(&data[52..56], &[0.25, 0.5, 0.75, 0.0]);
        assert_eq!(at(224), 2.5);
        assert_eq!(&data[57..60], &[0.0; 3]);
    }

    #[test]
    fn write_clears_stale_padding() {
        let layout = UniformLayout::new();
        let mut data = vec![9.0; layout.float_count()];
        layout.write(&Uniforms::default(), &mut data);
        assert_eq!(data[35], 0.0);
        assert_eq!(data[44], 0.0);
        assert_eq!(data[56], 1.0);
    }

    #[test]
    fn compute_uniforms_chains_camera_matrices() {
        let mut camera = Camera::new(CameraConfig::default());
        camera.set_aspect(1.5);
        camera.set_orbit(0.4, 0.2, 6.0);
        camera.update_view_projection_matrix();

        let model = Transform::new()
            .position(Vec3::new(1.0, 0.0, -1.0))
            .scale(Vec3::new(2.0, 1.0, 1.0))
            .matrix(EulerOrder::Xyz);
        let light = Light::point(Vec3::new(3.0, 4.0, 5.0)).intensity(0.8);

        let u = compute_uniforms(&model, &camera, Some(&light));
        assert_eq!(u.model_view, camera.view_matrix() * model);
        assert_eq!(u.model_view_projection, camera.projection_matrix() * u.model_view);
        assert_eq!(u.light_color, Vec3::ONE);
        assert_eq!(u.light_intensity, 0.8);

        let eye_light = camera.view_matrix().transform_point3(light.position);
        assert_relative_eq!(u.light_position.x, eye_light.x);
        assert_relative_eq!(u.light_position.z, eye_light.z);

        // normal matrix undoes the non-uniform scale: n·t stays zero for tangents
        let tangent = u.model_view.transform_vector3(Vec3::Y);
        let normal = u.normal_matrix * Vec3::X;
        assert_relative_eq!(tangent.dot(normal), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn compute_uniforms_without_light_uses_defaults() {
        let mut camera = Camera::default();
        camera.update_view_projection_matrix();
        let u = compute_uniforms(&Mat4::IDENTITY, &camera, None);
        assert_eq!(u.light_position, Vec3::ZERO);
        assert_eq!(u.light_color, Vec3::ZERO);
        assert_eq!(u.light_intensity, 1.0);
    }
}
