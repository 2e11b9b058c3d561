//! Windowed application runner.
//!
//! [`run_with_config`] opens a window, sets up the GPU, renderer, scene and
//! orbit camera, then calls a user `setup` closure once. The closure returns
//! the per-frame closure, which runs before every render.
//!
//! ```no_run
//! use meshlite::*;
//!
//! fn main() -> Result<(), AppError> {
//!     run_with_config(AppConfig::new().title("spin"), |ctx| {
//!         let cube = ctx.mesh(&GeometryDescriptor::cube());
//!         ctx.scene.add(cube);
//!         ctx.scene.add(Light::point(Vec3::new(2.0, 2.0, 2.0)));
//!
//!         move |frame| {
//!             let t = frame.time;
//!             if let Some(cube) = frame.scene.mesh_mut(0) {
//!                 cube.set_rotation(Vec3::new(t * 0.5, t, 0.0));
//!             }
//!         }
//!     })
//! }
//! ```

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::camera::{Camera, CameraConfig};
use crate::error::{AppError, RenderError};
use crate::geometry::GeometryDescriptor;
use crate::gpu::{GpuContext, SurfaceOptions};
use crate::input::OrbitInput;
use crate::logging::{LoggingConfig, init_logging};
use crate::material::Material;
use crate::mesh::Mesh;
use crate::renderer::{Renderer, RendererConfig};
use crate::scene::Scene;

/// Context handed to the setup closure.
pub struct SetupContext<'a> {
    pub gpu: &'a GpuContext,
    pub renderer: &'a mut Renderer,
    pub scene: &'a mut Scene,
    pub camera: &'a mut Camera,
}

impl SetupContext<'_> {
    /// A mesh with the default lit material.
    pub fn mesh(&mut self, descriptor: &GeometryDescriptor) -> Mesh {
        self.mesh_with_material(descriptor, Material::default_lit())
    }

    pub fn mesh_with_material(
        &mut self,
        descriptor: &GeometryDescriptor,
        material: Material,
    ) -> Mesh {
        self.renderer.create_mesh(self.gpu, descriptor, material)
    }
}

/// Per-frame state handed to the frame closure.
///
/// Camera changes made here take effect in the same frame.
pub struct Frame<'a> {
    pub gpu: &'a GpuContext,
    pub scene: &'a mut Scene,
    pub camera: &'a mut Camera,
    /// Seconds since the first frame.
    pub time: f32,
    /// Seconds since the previous frame.
    pub dt: f32,
}

impl Frame<'_> {
    pub fn fps(&self) -> f32 {
        if self.dt > 0.0 { 1.0 / self.dt } else { 0.0 }
    }

    pub fn width(&self) -> u32 {
        self.gpu.width()
    }

    pub fn height(&self) -> u32 {
        self.gpu.height()
    }
}

/// Window, surface and subsystem options.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub camera: CameraConfig,
    pub renderer: RendererConfig,
    pub surface: SurfaceOptions,
    /// `None` leaves logger installation to the host application.
    pub logging: Option<LoggingConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "meshlite".to_string(),
            width: 800,
            height: 600,
            camera: CameraConfig::default(),
            renderer: RendererConfig::default(),
            surface: SurfaceOptions::default(),
            logging: Some(LoggingConfig::default()),
        }
    }
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }

    pub fn renderer(mut self, renderer: RendererConfig) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn surface(mut self, surface: SurfaceOptions) -> Self {
        self.surface = surface;
        self
    }

    pub fn logging(mut self, logging: Option<LoggingConfig>) -> Self {
        self.logging = logging;
        self
    }
}

/// Runs with [`AppConfig::default`].
pub fn run<S, F>(setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    run_with_config(AppConfig::default(), setup)
}

/// Opens a window and drives the render loop until the window closes.
///
/// Returns an error if initialization fails or a frame fails for a reason
/// other than a lost or outdated surface.
pub fn run_with_config<S, F>(config: AppConfig, setup: S) -> Result<(), AppError>
where
    S: FnOnce(&mut SetupContext) -> F + 'static,
    F: FnMut(&mut Frame) + 'static,
{
    if let Some(logging) = config.logging.clone() {
        init_logging(logging);
    }

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = MeshliteApp {
        state: AppState::Pending {
            config,
            setup: Some(Box::new(move |ctx| {
                Box::new(setup(ctx)) as Box<dyn FnMut(&mut Frame)>
            })),
        },
        error: None,
    };

    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

type SetupFn = Box<dyn FnOnce(&mut SetupContext) -> Box<dyn FnMut(&mut Frame)>>;

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    scene: Scene,
    camera: Camera,
    input: OrbitInput,
    frame_fn: Box<dyn FnMut(&mut Frame)>,
    start_time: Instant,
    last_frame: Instant,
}

enum AppState {
    Pending {
        config: AppConfig,
        setup: Option<SetupFn>,
    },
    Running(Box<Running>),
    Stopped,
}

struct MeshliteApp {
    state: AppState,
    error: Option<AppError>,
}

impl MeshliteApp {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        log::error!("{}", err);
        self.error = Some(err);
        self.state = AppState::Stopped;
        event_loop.exit();
    }
}

fn start(
    event_loop: &ActiveEventLoop,
    config: &AppConfig,
    setup: SetupFn,
) -> Result<Running, AppError> {
    let window_attrs = WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
    let window = Arc::new(event_loop.create_window(window_attrs)?);

    let gpu = GpuContext::from_window(window.clone(), &config.surface)?;
    let mut renderer = Renderer::new(&gpu, config.renderer);
    let mut scene = Scene::new();
    let mut camera = Camera::new(config.camera);
    camera.set_aspect(gpu.aspect());

    let frame_fn = setup(&mut SetupContext {
        gpu: &gpu,
        renderer: &mut renderer,
        scene: &mut scene,
        camera: &mut camera,
    });

    let now = Instant::now();
    Ok(Running {
        window,
        gpu,
        renderer,
        scene,
        camera,
        input: OrbitInput::new(),
        frame_fn,
        start_time: now,
        last_frame: now,
    })
}

impl ApplicationHandler for MeshliteApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Pending { config, setup } = &mut self.state else {
            return;
        };
        let Some(setup) = setup.take() else {
            return;
        };

        match start(event_loop, config, setup) {
            Ok(running) => {
                running.window.request_redraw();
                self.state = AppState::Running(Box::new(running));
            }
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let AppState::Running(app) = &mut self.state else {
            return;
        };

        app.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                app.gpu.resize(size.width, size.height);
                app.renderer.resize(&app.gpu);
                app.camera.set_aspect(app.gpu.aspect());
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let time = app.start_time.elapsed().as_secs_f32();
                let dt = now.duration_since(app.last_frame).as_secs_f32();
                app.last_frame = now;

                app.camera.apply_all(app.input.drain());

                (app.frame_fn)(&mut Frame {
                    gpu: &app.gpu,
                    scene: &mut app.scene,
                    camera: &mut app.camera,
                    time,
                    dt,
                });

                app.camera.update_view_projection_matrix();

                match app.renderer.render(&app.gpu, &mut app.scene, &app.camera) {
                    Ok(()) => {}
                    Err(RenderError::Surface(
                        wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated,
                    )) => {
                        log::warn!("surface lost or outdated, reconfiguring");
                        app.gpu.reconfigure();
                    }
                    Err(RenderError::Surface(wgpu::SurfaceError::Timeout)) => {
                        log::warn!("surface acquire timed out, skipping frame");
                    }
                    Err(err) => {
                        self.fail(event_loop, err.into());
                        return;
                    }
                }

                app.window.request_redraw();
            }
            _ => {}
        }
    }
}
