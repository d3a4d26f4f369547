//! Device, queue and the window surface.
//!
//! [`GpuContext`] owns the wgpu objects that every pass borrows: the surface that
//! presents into the window, the logical device, its queue and the surface
//! configuration. The app creates one per window inside `resumed` and passes it by
//! reference to the renderer, the mesh pass and the overlay.
//!
//! # Bring-up
//!
//! Creation is fallible. A missing adapter, a refused device or a surface that
//! cannot be created all surface as [`AppError`] instead of panicking, so the
//! binary can log the reason and exit cleanly.
//!
//! # Example
//!
//! ```no_run
//! # use std::sync::Arc;
//! # fn demo(window: Arc<winit::window::Window>) -> Result<(), tableau::AppError> {
//! use tableau::GpuContext;
//!
//! let mut gpu = GpuContext::new(window, true)?;
//!
//! let uniforms = gpu.device.create_buffer(&wgpu::BufferDescriptor {
//!     label: Some("Scratch Uniforms"),
//!     size: 256,
//!     usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
//!     mapped_at_creation: false,
//! });
//! gpu.queue.write_buffer(&uniforms, 0, &[0u8; 256]);
//!
//! // Forward window resizes; zero sizes from a minimized window are ignored.
//! gpu.resize(1600, 900);
//! assert_eq!((gpu.width(), gpu.height()), (1600, 900));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use winit::window::Window;

use crate::error::AppError;

/// The wgpu objects every pass needs, created once per window.
///
/// Fields are public so passes can call wgpu directly.
pub struct GpuContext {
    /// Presents finished frames into the window.
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    /// Surface format, size and present mode in effect.
    pub config: wgpu::SurfaceConfiguration,
}

impl GpuContext {
    /// Brings up wgpu for `window`.
    ///
    /// The surface takes the first sRGB format the adapter offers. With `vsync`
    /// it presents with Fifo; without it prefers Mailbox, then Immediate.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the surface, adapter or device cannot be created.
    pub fn new(window: Arc<Window>, vsync: bool) -> Result<Self, AppError> {
        let size = window.inner_size();
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))?;
        let info = adapter.get_info();
        log::info!("using {} ({:?}, {:?})", info.name, info.backend, info.device_type);

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("Tableau Device"),
            required_features: wgpu::Features::empty(),
            required_limits: wgpu::Limits::default(),
            memory_hints: Default::default(),
            trace: Default::default(),
            experimental_features: Default::default(),
        }))?;

        let caps = surface.get_capabilities(&adapter);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: choose_format(&caps.formats),
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: choose_present_mode(&caps.present_modes, vsync),
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: Vec::new(),
            desired_maximum_frame_latency: 2,
        };
        log::debug!("surface {:?} {:?}", config.format, config.present_mode);
        surface.configure(&device, &config);

        Ok(Self {
            surface,
            device,
            queue,
            config,
        })
    }

    /// Zero sizes (a minimized window) keep the previous configuration.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.reconfigure();
    }

    /// Reapplies the configuration after the surface was lost or went stale.
    pub fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Surface width in pixels.
    pub fn width(&self) -> u32 {
        self.config.width
    }

    /// Surface height in pixels.
    pub fn height(&self) -> u32 {
        self.config.height
    }
}

/// First sRGB format offered, else the first format at all.
fn choose_format(offered: &[wgpu::TextureFormat]) -> wgpu::TextureFormat {
    offered
        .iter()
        .find(|f| f.is_srgb())
        .or(offered.first())
        .copied()
        .unwrap_or(wgpu::TextureFormat::Bgra8UnormSrgb)
}

/// Fifo under vsync. Otherwise Mailbox, then Immediate, then Fifo.
fn choose_present_mode(offered: &[wgpu::PresentMode], vsync: bool) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }
    [wgpu::PresentMode::Mailbox, wgpu::PresentMode::Immediate]
        .into_iter()
        .find(|mode| offered.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::{PresentMode, TextureFormat};

    #[test]
    fn srgb_format_preferred() {
        let offered = [TextureFormat::Bgra8Unorm, TextureFormat::Rgba8UnormSrgb];
        assert_eq!(choose_format(&offered), TextureFormat::Rgba8UnormSrgb);
        assert_eq!(choose_format(&[TextureFormat::Bgra8Unorm]), TextureFormat::Bgra8Unorm);
    }

    #[test]
    fn uncapped_present_mode_falls_back_to_fifo() {
        let offered = [PresentMode::Fifo, PresentMode::Immediate];
        assert_eq!(choose_present_mode(&offered, true), PresentMode::Fifo);
        assert_eq!(choose_present_mode(&offered, false), PresentMode::Immediate);
        assert_eq!(choose_present_mode(&[PresentMode::Fifo], false), PresentMode::Fifo);
    }
}
