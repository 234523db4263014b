//! GPU renderer using wgpu.
//!
//! Owns the surface, the persistent trail accumulation texture, and the
//! backdrop pipelines. Each frame fades the accumulation texture, strokes
//! the streak field on top, then blits the result to the swapchain.

#![allow(unsafe_code)]
#![allow(dead_code)]

use anyhow::Result;
use tracing::{info, warn};
use winit::{dpi::PhysicalSize, window::Window};

use lightfall_common::error::GpuError;
use lightfall_kernel::field::StreakField;
use lightfall_kernel::instance::build_instances;
use lightfall_kernel::pipeline::BackdropPipelines;

use crate::config::BackdropConfig;

/// Main renderer that manages GPU resources and rendering.
pub struct Renderer {
    /// wgpu surface for presenting to the window
    surface: wgpu::Surface<'static>,
    /// wgpu device for GPU operations
    device: wgpu::Device,
    /// wgpu queue for submitting commands
    queue: wgpu::Queue,
    /// Surface configuration
    config: wgpu::SurfaceConfiguration,
    /// Current surface size
    size: PhysicalSize<u32>,
    /// Backdrop render pipelines
    pipelines: BackdropPipelines,
    /// Trail accumulation texture view
    trail_view: wgpu::TextureView,
    /// Blit bind group for the accumulation texture
    blit_bind_group: wgpu::BindGroup,
    /// Whether the accumulation texture still needs its initial clear
    trail_needs_clear: bool,
    /// Frame counter
    frame_count: u64,
}

impl Renderer {
    /// Creates a new renderer for the given window.
    pub async fn new(window: &Window, backdrop_config: &BackdropConfig) -> Result<Self> {
        let size = window.inner_size();

        // Create wgpu instance
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            dx12_shader_compiler: wgpu::Dx12Compiler::Fxc,
            flags: wgpu::InstanceFlags::default(),
            gles_minor_version: wgpu::Gles3MinorVersion::Automatic,
        });

        // Create surface
        // SAFETY: The window handle is valid for the lifetime of the surface
        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::from_window(window)?)
        }
        .map_err(|e| GpuError::Surface(e.to_string()))?;

        // Request adapter
        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| GpuError::AdapterUnavailable("no compatible adapter".into()))?;

        info!("Using GPU adapter: {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Lightfall Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::Performance,
                },
                None,
            )
            .await
            .map_err(|e| GpuError::DeviceRequest(e.to_string()))?;

        // Configure surface
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let present_mode = if backdrop_config.vsync {
            wgpu::PresentMode::AutoVsync
        } else {
            wgpu::PresentMode::AutoNoVsync
        };

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        info!("Initializing backdrop pipelines...");
        let mut pipelines = BackdropPipelines::new(&device, surface_format, surface_format);
        pipelines.set_surface_size(&queue, config.width, config.height);
        pipelines.set_fade_alpha(&queue, backdrop_config.fade_alpha);
        pipelines.set_streak_opacity(&queue, backdrop_config.streak_opacity);

        let trail_view = create_trail_texture(&device, config.width, config.height, surface_format);
        let blit_bind_group = pipelines.create_blit_bind_group(&device, &trail_view);

        info!("Renderer initialized successfully");

        Ok(Self {
            surface,
            device,
            queue,
            config,
            size,
            pipelines,
            trail_view,
            blit_bind_group,
            trail_needs_clear: true,
            frame_count: 0,
        })
    }

    /// Resizes the renderer to match the new window size.
    ///
    /// The accumulation texture is recreated, which also discards any
    /// in-flight trails.
    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            self.pipelines
                .set_surface_size(&self.queue, new_size.width, new_size.height);

            self.trail_view = create_trail_texture(
                &self.device,
                new_size.width,
                new_size.height,
                self.config.format,
            );
            self.blit_bind_group = self
                .pipelines
                .create_blit_bind_group(&self.device, &self.trail_view);
            self.trail_needs_clear = true;
        }
    }

    /// Renders one frame of the streak field.
    ///
    /// Returns `Ok(false)` when the frame was skipped because the surface
    /// was lost or timed out; those conditions recover on a later frame.
    pub fn render(&mut self, field: &StreakField) -> Result<bool> {
        let instances = build_instances(field);
        self.pipelines.upload_instances(&self.queue, &instances);

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                warn!("Surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Ok(false);
            },
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
                return Ok(false);
            },
            Err(e @ wgpu::SurfaceError::OutOfMemory) => {
                return Err(anyhow::Error::new(e).context("GPU out of memory"));
            },
            Err(e) => {
                warn!("Surface error: {e}, skipping frame");
                return Ok(false);
            },
        };

        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Backdrop Encoder"),
            });

        // Fade + streak pass into the accumulation texture
        {
            let load = if self.trail_needs_clear {
                wgpu::LoadOp::Clear(wgpu::Color::BLACK)
            } else {
                wgpu::LoadOp::Load
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Trail Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.trail_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pipelines.fade(&mut render_pass);
            self.pipelines.streaks(&mut render_pass);
        }

        // Blit the accumulated trails to the surface
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Blit Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.pipelines.blit(&mut render_pass, &self.blit_bind_group);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.trail_needs_clear = false;
        self.frame_count += 1;

        Ok(true)
    }

    /// Returns the number of frames presented so far.
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Returns the current surface size.
    #[must_use]
    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }
}

/// Creates the trail accumulation texture and returns its view.
fn create_trail_texture(
    device: &wgpu::Device,
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Trail Accumulation Texture"),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}
