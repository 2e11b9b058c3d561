//! A minimal forward renderer on wgpu.
//!
//! meshlite draws an ordered list of meshes lit by a single point light, seen
//! through an orbit camera. Each mesh carries its own uniform buffer
//! (model-view, model-view-projection and normal matrices plus the light)
//! which is recomputed and uploaded every frame; pipelines are built lazily
//! per material and cached.
//!
//! ```no_run
//! use meshlite::*;
//!
//! fn main() -> Result<(), AppError> {
//!     run(|ctx| {
//!         let mut sphere = ctx.mesh(&GeometryDescriptor::sphere());
//!         sphere.set_position(Vec3::new(1.5, 0.0, 0.0));
//!         let cube = ctx.mesh(&GeometryDescriptor::cube());
//!         ctx.scene.add(sphere);
//!         ctx.scene.add(cube);
//!         ctx.scene.add(Light::point(Vec3::new(3.0, 3.0, 3.0)));
//!
//!         |_frame| {}
//!     })
//! }
//! ```
//!
//! The pieces can also be driven without [`run`]: build a [`GpuContext`] from
//! any surface, a [`Renderer`], a [`Scene`] and a [`Camera`], then call
//! [`Camera::update_view_projection_matrix`] and [`Renderer::render`] once per
//! frame.

mod app;
mod camera;
mod error;
mod geometry;
mod gpu;
mod input;
mod light;
mod logging;
mod material;
pub mod math;
mod mesh;
mod pipeline;
mod renderer;
mod scene;
mod transform;
mod uniforms;

pub use app::{AppConfig, Frame, SetupContext, run, run_with_config};
pub use camera::{
    Camera, CameraConfig, MAX_DISTANCE, MIN_DISTANCE, Orbit, PITCH_MARGIN, ROTATE_SENSITIVITY,
    ZOOM_SENSITIVITY,
};
pub use error::{AppError, RenderError};
pub use geometry::{
    GeometryData, GeometryDescriptor, Indices, MAX_U16_INDEX_COUNT, Vertex, create_cube_data,
    create_sphere_data,
};
pub use gpu::{GpuContext, SurfaceOptions};
pub use input::{OrbitEvent, OrbitInput, PIXELS_PER_LINE};
pub use light::{Light, LightKind};
pub use logging::{LoggingConfig, init_logging};
pub use material::{Material, MaterialId};
pub use mesh::{Geometry, Mesh};
pub use pipeline::{DEPTH_FORMAT, PipelineCache, build_pipeline};
pub use renderer::{Renderer, RendererConfig};
pub use scene::{Scene, SceneItem, SceneNode};
pub use transform::{EulerOrder, Object3D, Transform};
pub use uniforms::{FieldSlot, UniformBuffer, UniformLayout, Uniforms, compute_uniforms};

pub use glam::{Mat3, Mat4, Vec2, Vec3};
