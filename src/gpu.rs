//! Core GPU context and device management.
//!
//! [`GpuContext`] holds the wgpu device, queue and configured surface. The
//! surface is acquired by the caller and handed in, so the same context works
//! for any window or canvas wgpu can present to.
//!
//! ```no_run
//! use std::sync::Arc;
//! use meshlite::{GpuContext, SurfaceOptions};
//!
//! # fn demo(window: Arc<winit::window::Window>) -> Result<(), meshlite::RenderError> {
//! let gpu = GpuContext::from_window(window, &SurfaceOptions::default())?;
//! log::info!("{}x{} (aspect {})", gpu.width(), gpu.height(), gpu.aspect());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use winit::window::Window;

use crate::error::RenderError;

/// How the output surface is configured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceOptions {
    /// Composite the surface with premultiplied alpha when the platform
    /// supports it. Otherwise the surface is opaque.
    pub alpha: bool,
    /// Preferred present mode; falls back to `Fifo` when unsupported.
    pub present_mode: wgpu::PresentMode,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            alpha: false,
            present_mode: wgpu::PresentMode::Fifo,
        }
    }
}

/// Core GPU context holding wgpu resources.
///
/// All fields are public to allow direct access to wgpu APIs when needed.
pub struct GpuContext {
    /// The surface for presenting rendered frames.
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Current surface configuration (format, size, present mode).
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Creates a context presenting to an already-acquired `surface`.
    ///
    /// Requests an adapter compatible with the surface, creates the device and
    /// queue, and configures the surface with an sRGB format when available.
    /// Fails before any rendering if no adapter or device can be obtained.
    pub fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        options: &SurfaceOptions,
    ) -> Result<Self, RenderError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("meshlite device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first())
            .copied()
            .ok_or(RenderError::UnsupportedSurface)?;

        let alpha_mode = if options.alpha
            && caps
                .alpha_modes
                .contains(&wgpu::CompositeAlphaMode::PreMultiplied)
        {
            wgpu::CompositeAlphaMode::PreMultiplied
        } else {
            if options.alpha {
                log::warn!("premultiplied alpha unsupported by this surface, using opaque");
            }
            caps.alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto)
        };

        let present_mode = if caps.present_modes.contains(&options.present_mode) {
            options.present_mode
        } else {
            wgpu::PresentMode::Fifo
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "surface configured: {}x{} {:?} {:?}",
            config.width,
            config.height,
            config.format,
            config.present_mode
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Creates an instance and surface for a winit window, then calls
    /// [`new`](Self::new) with the window's inner size.
    pub fn from_window(window: Arc<Window>, options: &SurfaceOptions) -> Result<Self, RenderError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        Self::new(&instance, surface, size.width, size.height, options)
    }

    /// Resize the surface to new dimensions.
    ///
    /// Zero-sized dimensions (a minimized window) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.config.width = width;
            self.config.height = height;
            self.reconfigure();
        }
    }

    /// Re-applies the current configuration, e.g. after the surface is lost.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn width(&self) -> u32 {
        self.config.width
    }

    pub fn height(&self) -> u32 {
        self.config.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height as f32
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        self.config.format
    }
}
