//! Error type shared by GPU initialization and frame rendering.

use std::fmt;

/// Errors surfaced by [`GpuContext`](crate::GpuContext) and
/// [`Renderer`](crate::Renderer).
///
/// Initialization variants are fatal and are returned before any frame is
/// rendered. A frame-time error aborts that frame: nothing recorded so far
/// is submitted.
#[derive(Debug)]
pub enum RenderError {
    /// The window or canvas could not be turned into a surface.
    CreateSurface(wgpu::CreateSurfaceError),
    /// No adapter compatible with the surface was found.
    RequestAdapter(wgpu::RequestAdapterError),
    /// The adapter refused to create a logical device.
    RequestDevice(wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    UnsupportedSurface,
    /// Acquiring the next surface texture failed.
    Surface(wgpu::SurfaceError),
    /// Shader module or render pipeline creation failed validation.
    Pipeline { label: String, source: wgpu::Error },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::CreateSurface(e) => write!(f, "failed to create surface: {}", e),
            RenderError::RequestAdapter(e) => write!(f, "no compatible GPU adapter: {}", e),
            RenderError::RequestDevice(e) => write!(f, "failed to create GPU device: {}", e),
            RenderError::UnsupportedSurface => write!(f, "surface has no supported formats"),
            RenderError::Surface(e) => write!(f, "surface error: {}", e),
            RenderError::Pipeline { label, source } => {
                write!(f, "failed to build pipeline '{}': {}", label, source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::CreateSurface(e) => Some(e),
            RenderError::RequestAdapter(e) => Some(e),
            RenderError::RequestDevice(e) => Some(e),
            RenderError::Surface(e) => Some(e),
            RenderError::Pipeline { source, .. } => Some(source),
            RenderError::UnsupportedSurface => None,
        }
    }
}

impl From<wgpu::CreateSurfaceError> for RenderError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        RenderError::CreateSurface(e)
    }
}

impl From<wgpu::RequestAdapterError> for RenderError {
    fn from(e: wgpu::RequestAdapterError) -> Self {
        RenderError::RequestAdapter(e)
    }
}

impl From<wgpu::RequestDeviceError> for RenderError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        RenderError::RequestDevice(e)
    }
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(e: wgpu::SurfaceError) -> Self {
        RenderError::Surface(e)
    }
}

/// Errors that end [`run_with_config`](crate::run_with_config).
#[derive(Debug)]
pub enum AppError {
    /// The event loop could not be created or exited abnormally.
    EventLoop(winit::error::EventLoopError),
    /// The window could not be created.
    Window(winit::error::OsError),
    Render(RenderError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::EventLoop(e) => write!(f, "event loop error: {}", e),
            AppError::Window(e) => write!(f, "failed to create window: {}", e),
            AppError::Render(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::EventLoop(e) => Some(e),
            AppError::Window(e) => Some(e),
            AppError::Render(e) => Some(e),
        }
    }
}

impl From<winit::error::EventLoopError> for AppError {
    fn from(e: winit::error::EventLoopError) -> Self {
        AppError::EventLoop(e)
    }
}

impl From<winit::error::OsError> for AppError {
    fn from(e: winit::error::OsError) -> Self {
        AppError::Window(e)
    }
}

impl From<RenderError> for AppError {
    fn from(e: RenderError) -> Self {
        AppError::Render(e)
    }
}
