//! GPU-resident geometry and the drawable [`Mesh`].
//!
//! A mesh composes three things it owns exclusively: uploaded [`Geometry`],
//! a [`Material`] and a [`Transform`]. Primitive shapes are not separate mesh
//! types; they are [`GeometryDescriptor`] variants resolved at construction.
//!
//! [`GeometryDescriptor`]: crate::GeometryDescriptor
//!
//! ```no_run
//! use meshlite::*;
//!
//! # fn demo(gpu: &GpuContext, renderer: &Renderer, scene: &mut Scene) {
//! let mut cube = renderer.create_mesh(gpu, &GeometryDescriptor::cube(), Material::default_lit());
//! cube.set_position(Vec3::new(-1.5, 0.0, 0.0));
//! cube.set_rotation(Vec3::new(0.0, 0.6, 0.0));
//! scene.add(cube);
//! # }
//! ```

use glam::{Mat4, Vec3};
use wgpu::util::DeviceExt;

use crate::camera::Camera;
use crate::geometry::GeometryData;
use crate::gpu::GpuContext;
use crate::light::Light;
use crate::material::Material;
use crate::transform::{EulerOrder, Transform};
use crate::uniforms::{UniformBuffer, Uniforms, compute_uniforms};

/// Vertex and index buffers for one [`GeometryData`].
#[derive(Debug)]
pub struct Geometry {
    pub(crate) vertex_buffer: wgpu::Buffer,
    pub(crate) index_buffer: wgpu::Buffer,
    index_format: wgpu::IndexFormat,
    index_count: u32,
    vertex_count: u32,
}

impl Geometry {
    /// Uploads `data`. The index buffer keeps the data's 16- or 32-bit width.
    pub fn new(gpu: &GpuContext, data: &GeometryData) -> Self {
        let vertex_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Vertex Buffer"),
                contents: bytemuck::cast_slice(&data.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });

        let index_buffer = gpu
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Mesh Index Buffer"),
                contents: data.indices.as_bytes(),
                usage: wgpu::BufferUsages::INDEX,
            });

        if !data.is_drawable() {
            log::warn!(
                "geometry with {} vertices and {} indices will not be drawn",
                data.vertex_count(),
                data.index_count()
            );
        }

        Self {
            vertex_buffer,
            index_buffer,
            index_format: data.indices.format(),
            index_count: data.index_count() as u32,
            vertex_count: data.vertex_count() as u32,
        }
    }

    pub fn index_format(&self) -> wgpu::IndexFormat {
        self.index_format
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn is_drawable(&self) -> bool {
        self.vertex_count > 0 && self.index_count > 0
    }
}

/// Meshes compose rotations X, then Y, then Z onto the translation.
const MESH_EULER_ORDER: EulerOrder = EulerOrder::Xyz;

fn mesh_model_matrix(transform: &Transform) -> Mat4 {
    transform.matrix(MESH_EULER_ORDER)
}

/// A drawable object: geometry, material, transform and its own uniform
/// buffer.
///
/// Meshes are created through [`Renderer::create_mesh`](crate::Renderer::create_mesh),
/// which supplies the bind group layout shared by all pipelines.
pub struct Mesh {
    geometry: Geometry,
    material: Material,
    pub transform: Transform,
    uniforms: Uniforms,
    uniform_buffer: UniformBuffer,
    bind_group: wgpu::BindGroup,
}

impl Mesh {
    pub fn new(
        gpu: &GpuContext,
        data: &GeometryData,
        material: Material,
        bind_group_layout: &wgpu::BindGroupLayout,
    ) -> Self {
        let geometry = Geometry::new(gpu, data);
        let uniform_buffer = UniformBuffer::new(gpu, "Mesh Uniforms");

        let bind_group = gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Bind Group"),
            layout: bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.binding(),
            }],
        });

        Self {
            geometry,
            material,
            transform: Transform::default(),
            uniforms: Uniforms::default(),
            uniform_buffer,
            bind_group,
        }
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
    }

    /// Euler angles in radians.
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.transform.rotation = rotation;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.transform.scale = scale;
    }

    /// `T · Rx · Ry · Rz · S` from the current transform.
    pub fn model_matrix(&self) -> Mat4 {
        mesh_model_matrix(&self.transform)
    }

    /// Recomputes this frame's uniforms and writes them to the GPU.
    ///
    /// `camera` must already be updated for the frame.
    pub fn update_uniforms(&mut self, queue: &wgpu::Queue, camera: &Camera, light: Option<&Light>) {
        self.uniforms = compute_uniforms(&self.model_matrix(), camera, light);
        self.uniform_buffer.update(queue, &self.uniforms);
    }

    /// Uniforms as of the last [`update_uniforms`](Self::update_uniforms).
    pub fn uniforms(&self) -> &Uniforms {
        &self.uniforms
    }

    pub fn material(&self) -> &Material {
        &self.material
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Binds this mesh's uniforms and buffers and issues one indexed draw.
    /// The pipeline must already be set on `pass`. Empty geometry is skipped.
    pub(crate) fn draw(&self, pass: &mut wgpu::RenderPass<'_>) {
        if !self.geometry.is_drawable() {
            return;
        }
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.geometry.vertex_buffer.slice(..));
        pass.set_index_buffer(
            self.geometry.index_buffer.slice(..),
            self.geometry.index_format,
        );
        pass.draw_indexed(0..self.geometry.index_count, 0, 0..1);
    }
}
