//! Minimal windowed host for the engine
//!
//! Opens a window, initializes the [`Engine`] on it and renders the host's
//! [`TiledScene`] every frame until the window closes or Escape is pressed.

use std::sync::Arc;

use anyhow::Context;
use wgpu::SurfaceError;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowAttributes, WindowId},
};

use crate::{
    engine::Engine,
    error::{EngineError, EngineResult},
    gfx::{device::GraphicSettings, rendering::PipelineSettings, scene::TiledScene},
};

/// Registers assets and fills the scene once the engine is up
pub type SetupCallback = Box<dyn FnOnce(&mut Engine, &mut TiledScene) -> EngineResult<()>>;

pub struct ViewerApp {
    settings: GraphicSettings,
    pipeline_settings: PipelineSettings,
    scene: TiledScene,
    setup: Option<SetupCallback>,
}

struct ViewerState {
    settings: GraphicSettings,
    pipeline_settings: PipelineSettings,
    window: Option<Arc<Window>>,
    engine: Engine,
    scene: TiledScene,
    setup: Option<SetupCallback>,
}

impl ViewerApp {
    pub fn new(settings: GraphicSettings) -> Self {
        Self {
            settings,
            pipeline_settings: PipelineSettings::default(),
            scene: TiledScene::new(),
            setup: None,
        }
    }

    pub fn with_pipeline_settings(mut self, settings: PipelineSettings) -> Self {
        self.pipeline_settings = settings;
        self
    }

    /// Runs `setup` after the engine initializes, before the first frame
    pub fn with_setup<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut Engine, &mut TiledScene) -> EngineResult<()> + 'static,
    {
        self.setup = Some(Box::new(setup));
        self
    }

    pub fn scene_mut(&mut self) -> &mut TiledScene {
        &mut self.scene
    }

    /// Runs the event loop until the window closes
    pub fn run(self) -> anyhow::Result<()> {
        let event_loop = EventLoop::new().context("failed to create event loop")?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut state = ViewerState {
            settings: self.settings,
            pipeline_settings: self.pipeline_settings,
            window: None,
            engine: Engine::new(),
            scene: self.scene,
            setup: self.setup,
        };

        event_loop
            .run_app(&mut state)
            .context("event loop terminated abnormally")?;
        state.engine.shutdown();
        Ok(())
    }
}

impl ViewerState {
    fn start(&mut self, window: Arc<Window>) -> EngineResult<()> {
        self.engine
            .init(window, &self.settings, self.pipeline_settings.clone())?;
        if let Some(setup) = self.setup.take() {
            setup(&mut self.engine, &mut self.scene)?;
        }
        Ok(())
    }
}

impl ApplicationHandler for ViewerState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attributes = WindowAttributes::default()
            .with_title("ubrot")
            .with_inner_size(PhysicalSize::new(
                self.settings.window_width,
                self.settings.window_height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                log::error!("failed to create window: {err}");
                event_loop.exit();
                return;
            }
        };
        self.window = Some(window.clone());

        if let Err(err) = self.start(window) {
            log::error!("engine failed to start: {err}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if !self.engine.is_initialized() {
            return;
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            }
            | WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                self.settings = self.settings.clone().with_size(width, height);
                if let Err(err) = self.engine.refresh(&self.settings) {
                    log::error!("refresh failed: {err}");
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => match self.engine.render_frame(&self.scene) {
                Ok(_) => {}
                Err(EngineError::SurfaceAcquire(
                    err @ (SurfaceError::Lost | SurfaceError::Outdated | SurfaceError::Timeout),
                )) => {
                    log::warn!("skipped frame: {err}");
                }
                Err(err) => {
                    log::error!("render failed: {err}");
                    event_loop.exit();
                }
            },
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}
