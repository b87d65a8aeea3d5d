//! Device context: graphics device, presentation surface and fixed state
//!
//! Owns the wgpu device and queue, the window surface, the depth buffer and
//! the currently selected [`RenderState`]. A frame is opened with
//! [`DeviceContext::begin_scene`] and closed with [`DeviceContext::end_scene`].

use std::{cell::Cell, sync::Arc};

use cgmath::Matrix4;
use winit::window::{Fullscreen, Window};

use crate::{
    error::{EngineError, EngineResult},
    gfx::{
        assets::mesh::Mesh,
        resources::texture_resource::TextureResource,
    },
    wgpu_utils::scoped,
};

use super::{
    display::{DisplayModes, Presentation, Resolution},
    render_state::{BlendMode, DepthTest, RasterMode, RenderState},
    settings::GraphicSettings,
};

/// Picks the present mode for the vsync setting from what the surface offers
///
/// Vsync maps to `Fifo`, which every surface supports. Without vsync the
/// tearing `Immediate` mode is preferred, then `Mailbox`.
pub fn choose_present_mode(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if vsync {
        return wgpu::PresentMode::Fifo;
    }

    [wgpu::PresentMode::Immediate, wgpu::PresentMode::Mailbox]
        .into_iter()
        .find(|mode| supported.contains(mode))
        .unwrap_or(wgpu::PresentMode::Fifo)
}

fn apply_window_mode(window: &Window, settings: &GraphicSettings) {
    if settings.fullscreen {
        window.set_fullscreen(Some(Fullscreen::Borderless(None)));
    } else {
        window.set_fullscreen(None);
        let _ = window.request_inner_size(winit::dpi::PhysicalSize::new(
            settings.window_width,
            settings.window_height,
        ));
    }
}

/// Owner of the graphics device and everything bound to the window surface
///
/// Created once at engine start, refreshed whenever the window size or the
/// fullscreen state changes, and dropped at shutdown. State toggles take
/// `&self` and apply to every later draw; `refresh` takes `&mut self`, so it
/// cannot run while a [`Frame`] borrowed from this context is alive.
pub struct DeviceContext {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    adapter_info: wgpu::AdapterInfo,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    present_modes: Vec<wgpu::PresentMode>,
    depth_texture: TextureResource,
    presentation: Presentation,
    render_state: Cell<RenderState>,
    line_mode_supported: bool,
}

impl DeviceContext {
    /// Creates the device, the surface and the depth buffer for `window`
    ///
    /// # Arguments
    /// * `window` - Window to present into
    /// * `settings` - Initial size, clip planes, vsync and fullscreen state
    ///
    /// # Returns
    /// A configured context, or the first creation step that failed
    pub async fn new(window: Arc<Window>, settings: &GraphicSettings) -> EngineResult<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        let adapter_info = adapter.get_info();
        log::info!(
            "using adapter '{}' ({:?}, {:?})",
            adapter_info.name,
            adapter_info.backend,
            adapter_info.device_type
        );

        let line_mode_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            log::warn!("adapter lacks line rasterization; wireframe will draw solid");
            wgpu::Features::empty()
        };

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Engine Device"),
                required_features,
                required_limits: wgpu::Limits::downlevel_defaults()
                    .using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        let capabilities = surface.get_capabilities(&adapter);
        let format = capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| capabilities.formats.first().copied())
            .ok_or(EngineError::UnsupportedSurface)?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let requested = Resolution::new(settings.window_width, settings.window_height);
        let display_modes = DisplayModes::from_window(&window, requested);
        log::debug!(
            "{} display modes, closest to {}x{} is {}x{}",
            display_modes.resolutions().len(),
            requested.width,
            requested.height,
            display_modes.selected().width,
            display_modes.selected().height
        );

        apply_window_mode(&window, settings);

        let presentation = Presentation::new(display_modes, settings);
        let size = presentation.size();
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width,
            height: size.height,
            present_mode: choose_present_mode(settings.vsync, &capabilities.present_modes),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        log::info!(
            "surface {:?} {}x{} presenting {:?}",
            config.format,
            config.width,
            config.height,
            config.present_mode
        );

        let depth_texture = scoped(&device, "surface and depth buffer", || {
            surface.configure(&device, &config);
            TextureResource::create_depth_texture(&device, &config, "depth_texture")
        })?;

        Ok(Self {
            window,
            surface,
            adapter_info,
            device: Arc::new(device),
            queue: Arc::new(queue),
            config,
            present_modes: capabilities.present_modes,
            depth_texture,
            presentation,
            render_state: Cell::new(RenderState::default()),
            line_mode_supported,
        })
    }

    /// Rebuilds the surface-bound resources for new settings
    ///
    /// Reconfigures the surface to the new size and present mode, recreates
    /// the depth buffer and recomputes the projection matrices. The recorded
    /// display modes are left untouched.
    pub fn refresh(&mut self, settings: &GraphicSettings) -> EngineResult<()> {
        apply_window_mode(&self.window, settings);
        self.presentation.refresh(settings);

        let size = self.presentation.size();
        self.config.width = size.width;
        self.config.height = size.height;
        self.config.present_mode = choose_present_mode(settings.vsync, &self.present_modes);

        let device = &self.device;
        let surface = &self.surface;
        let config = &self.config;
        self.depth_texture = scoped(device, "surface and depth buffer", || {
            surface.configure(device, config);
            TextureResource::create_depth_texture(device, config, "depth_texture")
        })?;

        log::info!(
            "refreshed surface to {}x{} ({:?})",
            size.width,
            size.height,
            self.config.present_mode
        );
        Ok(())
    }

    /// Acquires the next surface image and clears colour and depth
    ///
    /// # Arguments
    /// * `color` - Clear colour for the render target; depth clears to 1.0
    pub fn begin_scene(&self, color: wgpu::Color) -> EngineResult<Frame<'_>> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(err @ (wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated)) => {
                log::warn!("surface {err}; reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Clear Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.depth_texture.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            occlusion_query_set: None,
            timestamp_writes: None,
        });

        Ok(Frame {
            recording: FrameEncoder::new(encoder),
            context: self,
            surface_texture,
            view,
        })
    }

    /// Submits the frame's commands and presents it
    ///
    /// With vsync the presentation waits for the next vertical blank.
    pub fn end_scene(&self, frame: Frame<'_>) {
        let Frame {
            surface_texture,
            recording,
            ..
        } = frame;

        self.queue.submit(std::iter::once(recording.finish()));
        surface_texture.present();
    }

    pub fn turn_z_buffer_on(&self) {
        self.update_state(|state| state.with_depth(DepthTest::Enabled));
    }

    pub fn turn_z_buffer_off(&self) {
        self.update_state(|state| state.with_depth(DepthTest::Disabled));
    }

    pub fn turn_culling_on(&self) {
        self.update_state(|state| state.with_raster(RasterMode::Solid));
    }

    pub fn turn_culling_off(&self) {
        self.update_state(|state| state.with_raster(RasterMode::SolidNoCull));
    }

    pub fn turn_wireframe_on(&self) {
        self.update_state(|state| state.with_raster(RasterMode::Wireframe));
    }

    pub fn turn_wireframe_off(&self) {
        self.update_state(|state| state.with_raster(RasterMode::Solid));
    }

    pub fn turn_alpha_blending_on(&self) {
        self.update_state(|state| state.with_blend(BlendMode::Enabled));
    }

    pub fn turn_alpha_blending_coverage_on(&self) {
        self.update_state(|state| state.with_blend(BlendMode::AlphaToCoverage));
    }

    pub fn turn_alpha_blending_off(&self) {
        self.update_state(|state| state.with_blend(BlendMode::Disabled));
    }

    fn update_state(&self, f: impl FnOnce(RenderState) -> RenderState) {
        self.render_state.set(f(self.render_state.get()));
    }

    /// Fixed-function state applied to the next draw
    pub fn render_state(&self) -> RenderState {
        self.render_state.get()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn shared_device(&self) -> Arc<wgpu::Device> {
        self.device.clone()
    }

    pub fn shared_queue(&self) -> Arc<wgpu::Queue> {
        self.queue.clone()
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        TextureResource::DEPTH_FORMAT
    }

    pub fn line_mode_supported(&self) -> bool {
        self.line_mode_supported
    }

    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.presentation.projections().world
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        self.presentation.projections().perspective
    }

    pub fn ortho_matrix(&self) -> Matrix4<f32> {
        self.presentation.projections().ortho
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.presentation.projections().aspect_ratio()
    }

    /// Resolutions offered by the monitor when the context was created
    pub fn supported_resolutions(&self) -> &[Resolution] {
        self.presentation.display_modes().resolutions()
    }

    /// Offered resolution closest to the size requested at creation
    pub fn display_mode(&self) -> Resolution {
        self.presentation.display_modes().selected()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn video_card_name(&self) -> &str {
        &self.adapter_info.name
    }

    pub fn video_card_info(&self) -> &wgpu::AdapterInfo {
        &self.adapter_info
    }
}

/// Command encoder plus the render pass recording into it
///
/// `pass` is declared first so it drops first: an abandoned pass ends
/// before its encoder goes away.
pub struct FrameEncoder {
    pass: Option<wgpu::RenderPass<'static>>,
    encoder: wgpu::CommandEncoder,
}

impl FrameEncoder {
    pub fn new(encoder: wgpu::CommandEncoder) -> Self {
        Self {
            pass: None,
            encoder,
        }
    }

    /// The open pass, or the one `begin` opens on the encoder
    pub fn pass_or_begin(
        &mut self,
        begin: impl FnOnce(&mut wgpu::CommandEncoder) -> wgpu::RenderPass<'static>,
    ) -> &mut wgpu::RenderPass<'static> {
        let Self { pass, encoder } = self;
        pass.get_or_insert_with(|| begin(encoder))
    }

    pub fn has_pass(&self) -> bool {
        self.pass.is_some()
    }

    /// Ends the open pass, if any, and finishes the encoder
    pub fn finish(self) -> wgpu::CommandBuffer {
        let Self { pass, encoder } = self;
        drop(pass);
        encoder.finish()
    }
}

/// One frame in flight: surface image, command encoder and the draw pass
///
/// Borrowed from the [`DeviceContext`] by `begin_scene` and handed back to
/// `end_scene`.
pub struct Frame<'a> {
    recording: FrameEncoder,
    context: &'a DeviceContext,
    surface_texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

impl<'a> Frame<'a> {
    pub fn context(&self) -> &'a DeviceContext {
        self.context
    }

    /// Render pass for draw calls, opened on first use
    ///
    /// The pass keeps the cleared contents and covers the full surface.
    pub fn pass(&mut self) -> &mut wgpu::RenderPass<'static> {
        let context = self.context;
        let view = &self.view;

        self.recording.pass_or_begin(|encoder| {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Scene Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &context.depth_texture.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();
            reset_viewport(&mut pass, context.surface_size());
            pass
        })
    }

    /// Binds the mesh's vertex and index buffers for the next draw
    pub fn bind_mesh(&mut self, mesh: &Mesh) {
        let pass = self.pass();
        pass.set_vertex_buffer(0, mesh.vertex_buffer().slice(..));
        pass.set_index_buffer(mesh.index_buffer().slice(..), wgpu::IndexFormat::Uint32);
    }
}

fn reset_viewport(pass: &mut wgpu::RenderPass<'_>, (width, height): (u32, u32)) {
    pass.set_viewport(0.0, 0.0, width as f32, height as f32, 0.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgpu::PresentMode;

    #[test]
    fn vsync_always_uses_fifo() {
        assert_eq!(
            choose_present_mode(true, &[PresentMode::Immediate, PresentMode::Fifo]),
            PresentMode::Fifo
        );
    }

    #[test]
    fn tearing_modes_preferred_without_vsync() {
        let all = [PresentMode::Fifo, PresentMode::Mailbox, PresentMode::Immediate];
        assert_eq!(choose_present_mode(false, &all), PresentMode::Immediate);
        assert_eq!(
            choose_present_mode(false, &[PresentMode::Fifo, PresentMode::Mailbox]),
            PresentMode::Mailbox
        );
        assert_eq!(choose_present_mode(false, &[PresentMode::Fifo]), PresentMode::Fifo);
    }
}

#[cfg(all(test, feature = "gpu-tests"))]
mod gpu_tests {
    use super::*;
    use crate::test_support::headless_device;

    fn target(device: &wgpu::Device) -> wgpu::TextureView {
        device
            .create_texture(&wgpu::TextureDescriptor {
                label: Some("Offscreen Target"),
                size: wgpu::Extent3d {
                    width: 4,
                    height: 4,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8Unorm,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn open_pass(
        encoder: &mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
    ) -> wgpu::RenderPass<'static> {
        encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Offscreen Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations::default(),
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            })
            .forget_lifetime()
    }

    fn encoder(device: &wgpu::Device) -> wgpu::CommandEncoder {
        device.create_command_encoder(&wgpu::CommandEncoderDescriptor { label: None })
    }

    #[test]
    fn pass_opens_once_and_finishes_cleanly() {
        let Some((device, queue)) = headless_device() else {
            return;
        };
        let view = target(&device);
        let mut recording = FrameEncoder::new(encoder(&device));

        let mut opened = 0;
        for _ in 0..2 {
            recording.pass_or_begin(|encoder| {
                opened += 1;
                open_pass(encoder, &view)
            });
        }
        assert_eq!(opened, 1);
        assert!(recording.has_pass());

        let commands = scoped(&device, "finish", || recording.finish()).unwrap();
        scoped(&device, "submit", || queue.submit(std::iter::once(commands))).unwrap();
    }

    #[test]
    fn abandoned_recording_drops_without_errors() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };
        let view = target(&device);

        scoped(&device, "abandon", || {
            let mut recording = FrameEncoder::new(encoder(&device));
            recording.pass_or_begin(|encoder| open_pass(encoder, &view));
            drop(recording);
        })
        .unwrap();
    }
}
