//! Application lifecycle management.
//!
//! Winit event loop driving the streak field simulation and renderer.
//! If the GPU is unavailable the window still opens and the simulation
//! keeps ticking; only drawing is skipped.

use anyhow::Result;
use tracing::{debug, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

use lightfall_common::viewport::Viewport;
use lightfall_kernel::field::StreakField;
use lightfall_kernel::ticker::{FrameTicker, TickerHandle};

use crate::config::BackdropConfig;
use crate::renderer::Renderer;
use crate::timing::{FpsCounter, FrameTiming};

/// Application state machine.
struct LightfallApp {
    /// Application configuration
    config: BackdropConfig,
    /// Window handle (created after resume)
    window: Option<Window>,
    /// Renderer (None when the GPU is unavailable)
    renderer: Option<Renderer>,
    /// Streak field simulation (created with the window's viewport)
    field: Option<StreakField>,
    /// Frame ticker
    ticker: FrameTicker,
    /// Cancellation handle for the ticker
    ticker_handle: TickerHandle,
    /// Frame timing
    timing: FrameTiming,
    /// FPS counter for log output
    fps_counter: FpsCounter,
}

impl LightfallApp {
    /// Creates a new application instance.
    fn new(config: BackdropConfig) -> Self {
        let timing = FrameTiming::new(config.target_fps).with_vsync(config.vsync);
        let (ticker, ticker_handle) = FrameTicker::start();

        Self {
            config,
            window: None,
            renderer: None,
            field: None,
            ticker,
            ticker_handle,
            timing,
            fps_counter: FpsCounter::new(),
        }
    }

    /// Reads the current viewport from the window.
    fn current_viewport(&self) -> Option<Viewport> {
        self.window.as_ref().map(|window| {
            let size = window.inner_size();
            Viewport::from_physical(size.width, size.height, window.scale_factor())
        })
    }

    /// Main update and render loop body, run once per frame tick.
    fn update_and_render(&mut self, event_loop: &ActiveEventLoop) {
        let _dt = self.timing.delta_time();

        let (fps, frame_time) = self.fps_counter.tick();
        if self.config.show_fps && fps > 0.0 {
            debug!("FPS: {fps:.0} ({frame_time:.1}ms)");
        }

        // Advance the simulation one frame
        if let Some(field) = &mut self.field {
            field.tick();
        }

        // Render (skipped entirely in degraded mode). Recoverable surface
        // errors are handled inside render(); an Err here is out of memory
        if let (Some(renderer), Some(field)) = (&mut self.renderer, &self.field) {
            if let Err(e) = renderer.render(field) {
                warn!("Unrecoverable render error, shutting down: {e}");
                self.ticker_handle.stop();
                event_loop.exit();
            }
        }

        // Frame rate limiting (if not using VSync)
        self.timing.sleep_remainder();
    }

    /// Rebuilds the streak field for a new viewport.
    fn resize_field(&mut self, viewport: Viewport) {
        if let Some(field) = &mut self.field {
            field.resize(viewport);
        }
    }
}

impl ApplicationHandler for LightfallApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        info!("Application resumed, creating window...");

        let mut window_attrs = Window::default_attributes()
            .with_title("Lightfall")
            .with_inner_size(PhysicalSize::new(
                self.config.window_width,
                self.config.window_height,
            ));
        if self.config.fullscreen {
            window_attrs = window_attrs.with_fullscreen(Some(Fullscreen::Borderless(None)));
        }

        match event_loop.create_window(window_attrs) {
            Ok(window) => {
                info!("Window created successfully");

                let size = window.inner_size();
                let viewport = Viewport::from_physical(size.width, size.height, window.scale_factor());

                let seed = self.config.seed.unwrap_or_else(|| fastrand::u64(..));
                info!("Streak field seed: {seed}");
                self.field = Some(StreakField::with_column_width(
                    viewport,
                    seed,
                    self.config.column_width,
                ));

                // GPU failure is not fatal; the backdrop degrades to a
                // blank window with the simulation still running
                match pollster::block_on(Renderer::new(&window, &self.config)) {
                    Ok(renderer) => {
                        info!("Renderer initialized");
                        self.renderer = Some(renderer);
                    },
                    Err(e) => {
                        warn!("Failed to initialize renderer, running without GPU: {e}");
                    },
                }

                window.request_redraw();
                self.window = Some(window);

                // Reset timing after window creation
                self.timing.reset();

                info!(
                    "Lightfall ready - {}x{} @ {} FPS target",
                    self.config.window_width, self.config.window_height, self.config.target_fps
                );
            },
            Err(e) => {
                warn!("Failed to create window: {e}");
                event_loop.exit();
            },
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down...");
                self.ticker_handle.stop();
                // Save config on exit
                if let Err(e) = self.config.save() {
                    warn!("Failed to save config: {e}");
                }
                event_loop.exit();
            },
            WindowEvent::Resized(new_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(new_size);
                }
                if let Some(viewport) = self.current_viewport() {
                    self.resize_field(viewport);
                }
                self.config.window_width = new_size.width;
                self.config.window_height = new_size.height;
            },
            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(viewport) = self.current_viewport() {
                    self.resize_field(viewport);
                }
            },
            WindowEvent::RedrawRequested => {
                // A stopped ticker means shutdown is in progress; no
                // further frame may run
                if self.ticker.tick() {
                    self.update_and_render(event_loop);

                    if let Some(window) = &self.window {
                        window.request_redraw();
                    }
                }
            },
            _ => {},
        }
    }
}

/// Runs the main application loop.
pub fn run() -> Result<()> {
    // Load configuration
    let mut config = BackdropConfig::load();
    config.validate();

    info!("Configuration loaded:");
    info!("  Window: {}x{}", config.window_width, config.window_height);
    info!("  VSync: {}", config.vsync);
    info!("  Column width: {} px/streak", config.column_width);

    info!("Creating event loop...");
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = LightfallApp::new(config);

    info!("Starting event loop...");
    event_loop.run_app(&mut app)?;

    Ok(())
}
