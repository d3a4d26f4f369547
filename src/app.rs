use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use glam::Vec2;
use winit::application::ApplicationHandler;
use winit::event::{DeviceEvent, DeviceId, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::camera::Camera;
use crate::demos::{Demo, DemoContext};
use crate::error::AppError;
use crate::gpu::GpuContext;
use crate::input::Input;
use crate::loader::AssetLoader;
use crate::overlay::OverlayState;
use crate::renderer::Renderer;
use crate::rng::SeededRandom;
use crate::scene::SceneWorld;

/// Configuration for the app window and its assets.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Relative asset paths resolve against this directory.
    pub assets: PathBuf,
    /// Overlay font. Common system fonts are tried when unset.
    pub font: Option<PathBuf>,
    pub vsync: bool,
    /// Seed for everything randomized at scene build time.
    pub seed: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Tableau".to_string(),
            width: 1280,
            height: 720,
            assets: PathBuf::from("assets"),
            font: None,
            vsync: true,
            seed: 1,
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

    pub fn assets(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets = root.into();
        self
    }

    pub fn font(mut self, path: Option<PathBuf>) -> Self {
        self.font = path;
        self
    }

    pub fn vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }
}

/// Opens a window and runs `demo` until the window is closed.
///
/// Window or GPU bring-up failures end the event loop and are returned here.
pub fn run(config: AppConfig, demo: Box<dyn Demo>) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = TableauApp {
        config,
        state: AppState::Pending { demo: Some(demo) },
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

struct TableauApp {
    config: AppConfig,
    state: AppState,
    error: Option<AppError>,
}

enum AppState {
    Pending { demo: Option<Box<dyn Demo>> },
    Running(Box<Running>),
}

struct Running {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    world: SceneWorld,
    camera: Camera,
    input: Input,
    loader: AssetLoader,
    overlay: OverlayState,
    demo: Box<dyn Demo>,
    pointer_locked: bool,
    start_time: Instant,
    last_frame: Instant,
}

impl Running {
    fn start(
        event_loop: &ActiveEventLoop,
        config: &AppConfig,
        demo: Box<dyn Demo>,
    ) -> Result<Self, AppError> {
        let window_attrs = WindowAttributes::default()
            .with_title(&config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height));
        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let gpu = GpuContext::new(window.clone(), config.vsync)?;
        let renderer = Renderer::new(&gpu, config.font.as_deref());

        let desc = demo.scene();
        let mut camera = desc.camera;
        camera.set_viewport(gpu.width(), gpu.height());
        let (world, requests) = SceneWorld::build(desc, SeededRandom::new(config.seed));

        let mut loader = AssetLoader::new(config.assets.clone());
        loader.request_all(requests);
        log::info!(
            "starting {} ({} assets queued from {})",
            demo.title(),
            loader.pending(),
            loader.root().display()
        );

        Ok(Self {
            window,
            gpu,
            renderer,
            world,
            camera,
            input: Input::new(),
            loader,
            overlay: OverlayState::with_hud(demo.hud_lines()),
            demo,
            pointer_locked: false,
            start_time: Instant::now(),
            last_frame: Instant::now(),
        })
    }

    fn frame(&mut self) {
        let now = Instant::now();
        let time = self.start_time.elapsed().as_secs_f32();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        for result in self.loader.poll() {
            result.report();
            if let Ok(asset) = result.outcome {
                self.world.attach(asset);
            }
        }

        let viewport = Vec2::new(self.gpu.width() as f32, self.gpu.height() as f32);
        let lock_request = {
            let mut ctx = DemoContext::new(&mut self.world, &self.input, &mut self.camera, &mut self.overlay);
            ctx.dt = dt;
            ctx.time = time;
            ctx.viewport = viewport;
            ctx.pointer_locked = self.pointer_locked;
            self.demo.update(&mut ctx);
            ctx.lock_request
        };
        if let Some(locked) = lock_request {
            self.set_pointer_lock(locked);
        }

        self.renderer
            .render(&self.gpu, &self.world, &self.camera, &self.overlay, time);

        self.input.begin_frame();
        self.window.request_redraw();
    }

    fn set_pointer_lock(&mut self, locked: bool) {
        if locked == self.pointer_locked || (locked && !self.demo.wants_pointer_lock()) {
            return;
        }
        if locked {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(err) = grabbed {
                log::warn!("pointer lock unavailable: {err}");
                return;
            }
        } else if let Err(err) = self.window.set_cursor_grab(CursorGrabMode::None) {
            log::warn!("could not release pointer: {err}");
        }
        self.window.set_cursor_visible(!locked);
        self.pointer_locked = locked;
        log::debug!("pointer {}", if locked { "locked" } else { "released" });
        self.demo.on_pointer_lock_changed(locked, &mut self.overlay);
    }
}

impl ApplicationHandler for TableauApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let AppState::Pending { demo } = &mut self.state else {
            return;
        };
        let Some(demo) = demo.take() else {
            return;
        };

        match Running::start(event_loop, &self.config, demo) {
            Ok(running) => {
                running.window.request_redraw();
                self.state = AppState::Running(Box::new(running));
            }
            Err(err) => {
                self.error = Some(err);
                event_loop.exit();
            }
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
                app.camera.set_viewport(size.width, size.height);
            }
            WindowEvent::Focused(false) => {
                app.set_pointer_lock(false);
            }
            WindowEvent::RedrawRequested => {
                app.frame();
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        if let AppState::Running(app) = &mut self.state {
            app.input.handle_device_event(&event);
        }
    }
}
