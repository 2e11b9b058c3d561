//! Shader programs attached to meshes.

use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

const DEFAULT_VERTEX_SHADER: &str = include_str!("shaders/default.vert.wgsl");
const DEFAULT_FRAGMENT_SHADER: &str = include_str!("shaders/default.frag.wgsl");

static NEXT_MATERIAL_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a [`Material`], used as the pipeline cache key.
///
/// Every constructed material gets a fresh id. Clones share it, so they
/// share a pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(u64);

impl MaterialId {
    fn next() -> Self {
        Self(NEXT_MATERIAL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// WGSL vertex and fragment sources plus their entry points.
///
/// Shader text is opaque here; it is only compiled when the renderer first
/// builds a pipeline for the material.
#[derive(Clone, Debug)]
pub struct Material {
    id: MaterialId,
    pub label: String,
    pub vertex_source: Cow<'static, str>,
    pub fragment_source: Cow<'static, str>,
    pub vertex_entry: String,
    pub fragment_entry: String,
}

impl Default for Material {
    fn default() -> Self {
        Self::default_lit()
    }
}

impl Material {
    /// A material from custom shader sources, using `vs_main` and `fs_main`
    /// as entry points.
    pub fn new(
        label: impl Into<String>,
        vertex_source: impl Into<Cow<'static, str>>,
        fragment_source: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            id: MaterialId::next(),
            label: label.into(),
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
            vertex_entry: "vs_main".to_string(),
            fragment_entry: "fs_main".to_string(),
        }
    }

    /// The bundled single-light Lambert material.
    pub fn default_lit() -> Self {
        Self::new("default lit", DEFAULT_VERTEX_SHADER, DEFAULT_FRAGMENT_SHADER)
    }

    pub fn entry_points(mut self, vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        self.vertex_entry = vertex.into();
        self.fragment_entry = fragment.into();
        self
    }

    pub fn id(&self) -> MaterialId {
        self.id
    }
}
