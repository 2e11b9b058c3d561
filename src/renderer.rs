//! Per-frame render driver.
//!
//! Each [`Renderer::render`] call walks the scene in insertion order. For every
//! mesh it recomputes the uniforms from the camera and the scene's first
//! light, uploads them, makes sure the mesh's material has a pipeline, then
//! records one indexed draw into a single render pass. The pass clears color
//! and depth, so nothing carries over between frames.

use crate::camera::Camera;
use crate::error::RenderError;
use crate::geometry::GeometryDescriptor;
use crate::gpu::GpuContext;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::pipeline::{DEPTH_FORMAT, PipelineCache, build_pipeline};
use crate::scene::Scene;

/// Renderer options.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RendererConfig {
    pub clear_color: wgpu::Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            clear_color: wgpu::Color {
                r: 0.1,
                g: 0.1,
                b: 0.1,
                a: 1.0,
            },
        }
    }
}

impl RendererConfig {
    pub fn clear_color(mut self, r: f64, g: f64, b: f64, a: f64) -> Self {
        self.clear_color = wgpu::Color { r, g, b, a };
        self
    }
}

/// Owns the depth target, the uniform bind group layout shared by every mesh,
/// and the per-material pipeline cache.
pub struct Renderer {
    config: RendererConfig,
    bind_group_layout: wgpu::BindGroupLayout,
    depth_view: wgpu::TextureView,
    depth_size: (u32, u32),
    pipelines: PipelineCache<wgpu::RenderPipeline>,
}

impl Renderer {
    pub fn new(gpu: &GpuContext, config: RendererConfig) -> Self {
        let bind_group_layout = gpu
            .device
            .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Mesh Uniforms Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        Self {
            config,
            bind_group_layout,
            depth_view: Self::create_depth_view(gpu),
            depth_size: (gpu.width(), gpu.height()),
            pipelines: PipelineCache::new(),
        }
    }

    fn create_depth_view(gpu: &GpuContext) -> wgpu::TextureView {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: gpu.width(),
                height: gpu.height(),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Recreates the depth target if the surface size changed.
    pub fn resize(&mut self, gpu: &GpuContext) {
        let size = (gpu.width(), gpu.height());
        if self.depth_size != size {
            self.depth_view = Self::create_depth_view(gpu);
            self.depth_size = size;
            log::debug!("depth target recreated at {}x{}", size.0, size.1);
        }
    }

    /// Builds a mesh bound to this renderer's uniform layout.
    pub fn create_mesh(
        &self,
        gpu: &GpuContext,
        descriptor: &GeometryDescriptor,
        material: Material,
    ) -> Mesh {
        Mesh::new(gpu, &descriptor.build(), material, &self.bind_group_layout)
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn set_clear_color(&mut self, color: wgpu::Color) {
        self.config.clear_color = color;
    }

    /// Number of distinct materials with a built pipeline.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    /// Draws `scene` as seen by `camera` and presents the frame.
    ///
    /// `camera` must have been updated for this frame. On error nothing is
    /// submitted; surface errors are returned as [`RenderError::Surface`] for
    /// the caller to recover from.
    pub fn render(
        &mut self,
        gpu: &GpuContext,
        scene: &mut Scene,
        camera: &Camera,
    ) -> Result<(), RenderError> {
        self.resize(gpu);
        scene.update_objects();

        let light = scene.light().copied();
        let format = gpu.format();
        for mesh in scene.meshes_mut() {
            mesh.update_uniforms(&gpu.queue, camera, light.as_ref());
            self.pipelines
                .get_or_try_insert_with(mesh.material().id(), || {
                    build_pipeline(gpu, mesh.material(), &self.bind_group_layout, format)
                })?;
        }

        let frame = gpu.surface.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.config.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            for mesh in scene.meshes() {
                if let Some(pipeline) = self.pipelines.get(mesh.material().id()) {
                    pass.set_pipeline(pipeline);
                    mesh.draw(&mut pass);
                }
            }
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}
