//! Render pipeline construction and the per-material pipeline cache.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::error::RenderError;
use crate::geometry::Vertex;
use crate::gpu::GpuContext;
use crate::material::{Material, MaterialId};

/// Depth buffer format shared by every mesh pipeline and the renderer's
/// depth target.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Pipelines keyed by the material they were built from.
///
/// A pipeline is built the first time its material is drawn and reused on
/// every later frame. Failed builds are not cached, so the next lookup
/// retries.
#[derive(Debug)]
pub struct PipelineCache<P> {
    entries: HashMap<MaterialId, P>,
}

impl<P> Default for PipelineCache<P> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<P> PipelineCache<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached pipeline for `id`, running `build` only on a miss.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        id: MaterialId,
        build: impl FnOnce() -> Result<P, E>,
    ) -> Result<&P, E> {
        match self.entries.entry(id) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let pipeline = build()?;
                Ok(entry.insert(pipeline))
            }
        }
    }

    pub fn get(&self, id: MaterialId) -> Option<&P> {
        self.entries.get(&id)
    }

    pub fn contains(&self, id: MaterialId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compiles `material`'s shaders and builds its render pipeline.
///
/// The pipeline draws [`Vertex`] triangle lists into a `format` color target
/// with a [`DEPTH_FORMAT`] depth buffer: counter-clockwise front faces,
/// back-face culling, depth test `Less` with writes enabled. Shader or
/// pipeline validation failures are returned instead of reaching the device's
/// uncaptured-error handler.
pub fn build_pipeline(
    gpu: &GpuContext,
    material: &Material,
    bind_group_layout: &wgpu::BindGroupLayout,
    format: wgpu::TextureFormat,
) -> Result<wgpu::RenderPipeline, RenderError> {
    let device = &gpu.device;
    let label = material.label.as_str();
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let vertex_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} vertex")),
        source: wgpu::ShaderSource::Wgsl(material.vertex_source.clone()),
    });
    let fragment_module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(&format!("{label} fragment")),
        source: wgpu::ShaderSource::Wgsl(material.fragment_source.clone()),
    });

    let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some(&format!("{label} pipeline layout")),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(&layout),
        vertex: wgpu::VertexState {
            module: &vertex_module,
            entry_point: Some(material.vertex_entry.as_str()),
            buffers: &[Vertex::LAYOUT],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &fragment_module,
            entry_point: Some(material.fragment_entry.as_str()),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            cull_mode: Some(wgpu::Face::Back),
            front_face: wgpu::FrontFace::Ccw,
            ..Default::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    });

    match pollster::block_on(device.pop_error_scope()) {
        Some(source) => Err(RenderError::Pipeline {
            label: label.to_string(),
            source,
        }),
        None => {
            log::debug!("built pipeline '{}' ({:?})", label, material.id());
            Ok(pipeline)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn builds_once_per_material() {
        let material = Material::default_lit();
        let builds = Cell::new(0);
        let mut cache = PipelineCache::new();

        for _ in 0..3 {
            let value = cache
                .get_or_try_insert_with(material.id(), || {
                    builds.set(builds.get() + 1);
                    Ok::<_, ()>("pipeline")
                })
                .unwrap();
            assert_eq!(*value, "pipeline");
        }

        assert_eq!(builds.get(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_build_is_not_cached() {
        let material = Material::default_lit();
        let mut cache: PipelineCache<u32> = PipelineCache::new();

        let err = cache.get_or_try_insert_with(material.id(), || Err("bad shader"));
        assert_eq!(err, Err("bad shader"));
        assert!(!cache.contains(material.id()));

        let ok = cache.get_or_try_insert_with(material.id(), || Ok::<_, &str>(7));
        assert_eq!(ok, Ok(&7));
        assert_eq!(cache.get(material.id()), Some(&7));
    }

    #[test]
    fn distinct_materials_get_distinct_entries() {
        let a = Material::default_lit();
        let b = Material::default_lit();
        let mut cache = PipelineCache::new();
        cache.get_or_try_insert_with(a.id(), || Ok::<_, ()>(1)).unwrap();
        cache.get_or_try_insert_with(b.id(), || Ok::<_, ()>(2)).unwrap();
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(a.id()), Some(&1));
        assert_eq!(cache.get(b.id()), Some(&2));
        assert!(!cache.is_empty());
    }
}
