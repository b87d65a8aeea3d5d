//! The engine: one explicit owner for the device, assets and pipelines
//!
//! ```no_run
//! # fn run(window: std::sync::Arc<winit::window::Window>) -> ubrot::EngineResult<()> {
//! use ubrot::{Engine, gfx::{device::GraphicSettings, geometry::ProceduralKind, scene::TiledScene}};
//!
//! let mut engine = Engine::new();
//! engine.init(window, &GraphicSettings::default().with_fullscreen(false), Default::default())?;
//! let plane = engine.register_procedural_model(ProceduralKind::Plane)?;
//!
//! let mut scene = TiledScene::new();
//! scene.add_user(cgmath::Vector3::new(0.0, 0.0, -5.0), cgmath::Vector3::unit_z());
//! scene.add_object((0, 0), cgmath::Vector3::new(0.0, 0.0, 0.0), plane);
//! engine.render_frame(&scene)?;
//! engine.shutdown();
//! # Ok(())
//! # }
//! ```

use std::{path::Path, sync::Arc};

use winit::window::Window;

use crate::{
    error::EngineResult,
    gfx::{
        assets::AssetCache,
        camera::ViewMatrices,
        device::{DeviceContext, GraphicSettings, Resolution},
        geometry::ProceduralKind,
        rendering::{FrameOrchestrator, PipelineManager, PipelineSettings, RenderTargets},
        scene::SceneView,
    },
};

// Field order is drop order: programs, then assets, then the device.
struct EngineState {
    pipelines: PipelineManager,
    assets: AssetCache,
    camera: ViewMatrices,
    orchestrator: FrameOrchestrator,
    context: DeviceContext,
}

/// Rendering engine bound to one window
///
/// Every method except [`init`](Self::init), [`shutdown`](Self::shutdown) and
/// [`is_initialized`](Self::is_initialized) panics when the engine is not
/// initialized.
#[derive(Default)]
pub struct Engine {
    state: Option<EngineState>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the device context and compiles the built-in programs
    ///
    /// An engine that was already running is shut down first. On failure
    /// the engine stays uninitialized.
    pub fn init(
        &mut self,
        window: Arc<Window>,
        settings: &GraphicSettings,
        pipeline_settings: PipelineSettings,
    ) -> EngineResult<()> {
        self.shutdown();

        let context = pollster::block_on(DeviceContext::new(window, settings))?;
        let targets = RenderTargets {
            color_format: context.surface_format(),
            depth_format: context.depth_format(),
            line_mode_supported: context.line_mode_supported(),
        };
        let pipelines = PipelineManager::new(context.shared_device(), targets, pipeline_settings)?;
        let assets = AssetCache::new(context.shared_device(), context.shared_queue());

        let mut camera = ViewMatrices::new();
        camera.update_base_view(
            cgmath::Vector3::new(0.0, 0.0, -1.0),
            cgmath::Vector3::unit_z(),
        );

        log::info!("engine initialized on '{}'", context.video_card_name());
        self.state = Some(EngineState {
            pipelines,
            assets,
            camera,
            orchestrator: FrameOrchestrator::new(),
            context,
        });
        Ok(())
    }

    /// Releases every GPU resource; a no-op when not initialized
    pub fn shutdown(&mut self) {
        let Some(state) = self.state.take() else {
            return;
        };

        let EngineState {
            pipelines,
            assets,
            context,
            ..
        } = state;
        drop(pipelines);
        drop(assets);
        drop(context);
        log::info!("engine shut down");
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Applies new graphic settings to the surface and projections
    pub fn refresh(&mut self, settings: &GraphicSettings) -> EngineResult<()> {
        self.state_mut().context.refresh(settings)
    }

    /// See [`AssetCache::register_model`]
    pub fn register_model(&mut self, path: impl AsRef<Path>) -> EngineResult<usize> {
        self.state_mut().assets.register_model(path)
    }

    /// See [`AssetCache::register_procedural_model`]
    pub fn register_procedural_model(&mut self, kind: ProceduralKind) -> EngineResult<usize> {
        self.state_mut().assets.register_procedural_model(kind)
    }

    /// See [`AssetCache::register_texture`]
    pub fn register_texture(&mut self, path: impl AsRef<Path>, components: u8) -> usize {
        self.state_mut().assets.register_texture(path, components)
    }

    /// Resolutions the monitor offered at initialization
    pub fn supported_resolutions(&self) -> &[Resolution] {
        self.state().context.supported_resolutions()
    }

    /// Draws every object in `scene` from user 0's camera and presents
    ///
    /// # Returns
    /// Number of objects drawn
    pub fn render_frame<S: SceneView>(&mut self, scene: &S) -> EngineResult<usize> {
        let EngineState {
            pipelines,
            assets,
            camera,
            orchestrator,
            context,
        } = self.state_mut();
        orchestrator.render_scene(scene, context, assets, pipelines, camera)
    }

    pub fn context(&self) -> &DeviceContext {
        &self.state().context
    }

    pub fn assets(&self) -> &AssetCache {
        &self.state().assets
    }

    pub fn pipelines(&self) -> &PipelineManager {
        &self.state().pipelines
    }

    pub fn pipelines_mut(&mut self) -> &mut PipelineManager {
        &mut self.state_mut().pipelines
    }

    pub fn camera(&self) -> &ViewMatrices {
        &self.state().camera
    }

    fn state(&self) -> &EngineState {
        match self.state.as_ref() {
            Some(state) => state,
            None => panic!("engine used before init or after shutdown"),
        }
    }

    fn state_mut(&mut self) -> &mut EngineState {
        match self.state.as_mut() {
            Some(state) => state,
            None => panic!("engine used before init or after shutdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shutdown_without_init_is_harmless() {
        let mut engine = Engine::new();
        engine.shutdown();
        assert!(!engine.is_initialized());
    }

    #[test]
    #[should_panic(expected = "before init")]
    fn registering_before_init_panics() {
        let mut engine = Engine::new();
        let _ = engine.register_procedural_model(ProceduralKind::Plane);
    }
}
