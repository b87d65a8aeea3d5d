//! Shader program management
//!
//! Owns the built-in programs and any custom ones the host adds, all in one
//! index space: built-ins sit at `0..BUILTIN_COUNT`, custom programs are
//! appended after them. Every slot is reference counted and its program is
//! torn down when the count drops from one to zero. Indices are never reused.

use std::{path::PathBuf, sync::Arc};

use cgmath::Matrix4;

use crate::{
    error::EngineResult,
    gfx::device::Frame,
};

use super::{
    shader_program::{RenderTargets, ShaderProgram},
    shader_stage::StageKind,
};

/// Where shader sources live and how programs are sized
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub shader_dir: PathBuf,
    /// Receives compiler output when a shader fails to compile
    pub diagnostic_file: PathBuf,
    pub initial_uniform_slots: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("shaders"),
            diagnostic_file: PathBuf::from("shader-error.txt"),
            initial_uniform_slots: 256,
        }
    }
}

impl PipelineSettings {
    pub fn with_shader_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.shader_dir = dir.into();
        self
    }

    pub fn with_diagnostic_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.diagnostic_file = path.into();
        self
    }

    pub fn with_initial_uniform_slots(mut self, slots: usize) -> Self {
        self.initial_uniform_slots = slots.max(1);
        self
    }

    pub fn shader_path(&self, file: &str) -> PathBuf {
        self.shader_dir.join(file)
    }
}

/// Programs created with the manager, at fixed indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinProgram {
    Simple = 0,
    Color = 1,
}

pub const BUILTIN_COUNT: usize = 2;

impl BuiltinProgram {
    pub const ALL: [BuiltinProgram; BUILTIN_COUNT] = [BuiltinProgram::Simple, BuiltinProgram::Color];

    pub fn index(self) -> usize {
        self as usize
    }

    fn label(self) -> &'static str {
        match self {
            BuiltinProgram::Simple => "Simple",
            BuiltinProgram::Color => "Color",
        }
    }
}

/// Reference-counted slot; the value is dropped on the 1 -> 0 transition
#[derive(Debug)]
pub struct CountedSlot<T> {
    value: Option<T>,
    count: usize,
}

impl<T> CountedSlot<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Some(value),
            count: 1,
        }
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_vacant(&self) -> bool {
        self.value.is_none()
    }

    /// Returns false when the slot was already torn down
    pub fn retain(&mut self) -> bool {
        if self.value.is_none() {
            return false;
        }
        self.count += 1;
        true
    }

    /// Drops one reference
    ///
    /// # Returns
    /// The value when this release took the count to zero, otherwise `None`
    ///
    /// # Panics
    /// Panics if the slot is already vacant
    pub fn release(&mut self) -> Option<T> {
        assert!(self.value.is_some(), "released a slot that was already torn down");
        self.count -= 1;
        if self.count == 0 {
            self.value.take()
        } else {
            None
        }
    }
}

/// Counts reported by [`PipelineManager::stats`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineStats {
    pub builtin_programs: usize,
    pub custom_programs: usize,
    pub live_programs: usize,
    pub cached_pipelines: usize,
}

pub struct PipelineManager {
    device: Arc<wgpu::Device>,
    targets: RenderTargets,
    settings: PipelineSettings,
    slots: Vec<CountedSlot<ShaderProgram>>,
}

impl PipelineManager {
    /// Creates the manager and compiles every built-in program
    ///
    /// # Arguments
    /// * `device` - Shared device all programs are created on
    /// * `targets` - Surface colour and depth formats
    /// * `settings` - Shader directory, diagnostic file and uniform sizing
    ///
    /// # Returns
    /// The manager, or the first compile or creation failure
    pub fn new(
        device: Arc<wgpu::Device>,
        targets: RenderTargets,
        settings: PipelineSettings,
    ) -> EngineResult<Self> {
        let mut manager = Self {
            device,
            targets,
            settings,
            slots: Vec::with_capacity(BUILTIN_COUNT),
        };

        for builtin in BuiltinProgram::ALL {
            let program = manager.build_color_program(builtin.label())?;
            manager.slots.push(CountedSlot::new(program));
            log::debug!("built-in program {builtin:?} ready at {}", builtin.index());
        }

        Ok(manager)
    }

    fn build_color_program(&self, label: &str) -> EngineResult<ShaderProgram> {
        let device = &self.device;
        let diagnostic = &self.settings.diagnostic_file;

        let mut program = ShaderProgram::new(label, self.targets);
        program.add_shader(
            device,
            StageKind::Vertex,
            &self.settings.shader_path("color.vert.wgsl"),
            diagnostic,
        )?;
        program.add_shader(
            device,
            StageKind::Fragment,
            &self.settings.shader_path("color.frag.wgsl"),
            diagnostic,
        )?;
        program.add_layout(device, &self.settings.shader_path("layout.vert.wgsl"), diagnostic)?;
        program.add_buffer(device, self.settings.initial_uniform_slots)?;
        Ok(program)
    }

    /// Appends an empty program for the caller to fill in
    ///
    /// # Returns
    /// The program's index and the program itself, with one reference held
    pub fn add_custom_program(&mut self) -> (usize, &mut ShaderProgram) {
        let index = self.slots.len();
        let label = format!("Custom {}", index - BUILTIN_COUNT);
        self.slots
            .push(CountedSlot::new(ShaderProgram::new(label, self.targets)));
        log::debug!("added custom program at {index}");

        let program = self.program_mut(index);
        (index, program)
    }

    /// Takes another reference to the program at `index`
    pub fn retain_program(&mut self, index: usize) {
        let slot = self.slot_mut(index);
        if !slot.retain() {
            panic!("program {index} was already torn down");
        }
    }

    /// Drops one reference; the program is torn down when none remain
    ///
    /// # Returns
    /// True when this call tore the program down
    pub fn remove_program(&mut self, index: usize) -> bool {
        let slot = self.slot_mut(index);
        if slot.is_vacant() {
            panic!("program {index} was already torn down");
        }

        match slot.release() {
            Some(program) => {
                log::debug!("tore down program {index} ('{}')", program.label());
                true
            }
            None => false,
        }
    }

    /// Program at `index`
    ///
    /// # Panics
    /// Panics if `index` is out of range or the program was torn down
    pub fn program(&self, index: usize) -> &ShaderProgram {
        let Some(slot) = self.slots.get(index) else {
            panic!("program index {index} out of range ({} slots)", self.slots.len());
        };
        match slot.get() {
            Some(program) => program,
            None => panic!("program {index} was already torn down"),
        }
    }

    /// Mutable program at `index`; panics like [`program`](Self::program)
    pub fn program_mut(&mut self, index: usize) -> &mut ShaderProgram {
        match self.slot_mut(index).get_mut() {
            Some(program) => program,
            None => panic!("program {index} was already torn down"),
        }
    }

    fn slot_mut(&mut self, index: usize) -> &mut CountedSlot<ShaderProgram> {
        let len = self.slots.len();
        match self.slots.get_mut(index) {
            Some(slot) => slot,
            None => panic!("program index {index} out of range ({len} slots)"),
        }
    }

    /// Makes room in every live program for `draws` renders this frame
    pub fn begin_frame(&mut self, draws: usize) {
        let device = &self.device;
        for program in self.slots.iter_mut().filter_map(CountedSlot::get_mut) {
            program.begin_frame(device, draws);
        }
    }

    /// Draws with the program at `index`; see [`ShaderProgram::render`]
    pub fn render(
        &mut self,
        index: usize,
        frame: &mut Frame<'_>,
        world: Matrix4<f32>,
        view: Matrix4<f32>,
        projection: Matrix4<f32>,
        index_count: u32,
    ) -> EngineResult<()> {
        self.program_mut(index)
            .render(frame, world, view, projection, index_count)
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn stats(&self) -> PipelineStats {
        let live = self.slots.iter().filter_map(CountedSlot::get);
        PipelineStats {
            builtin_programs: BUILTIN_COUNT.min(self.slots.len()),
            custom_programs: self.slots.len().saturating_sub(BUILTIN_COUNT),
            live_programs: live.clone().count(),
            cached_pipelines: live.map(ShaderProgram::cached_pipelines).sum(),
        }
    }
}


#[cfg(all(test, feature = "gpu-tests"))]
mod gpu_tests {
    use super::*;
    use crate::{error::EngineError, gfx::resources::TextureResource, test_support::headless_device};

    fn targets() -> RenderTargets {
        RenderTargets {
            color_format: wgpu::TextureFormat::Bgra8Unorm,
            depth_format: TextureResource::DEPTH_FORMAT,
            line_mode_supported: false,
        }
    }

    #[test]
    fn builtins_compile_from_bundled_shaders() -> anyhow::Result<()> {
        let Some((device, _queue)) = headless_device() else {
            return Ok(());
        };
        let manager = PipelineManager::new(device, targets(), PipelineSettings::default())?;

        let stats = manager.stats();
        assert_eq!(stats.builtin_programs, BUILTIN_COUNT);
        assert_eq!(stats.live_programs, BUILTIN_COUNT);
        assert_eq!(stats.custom_programs, 0);
        assert!(manager.program(BuiltinProgram::Color.index()).layout_checked());
        Ok(())
    }

    #[test]
    fn custom_programs_share_the_index_space() -> anyhow::Result<()> {
        let Some((device, _queue)) = headless_device() else {
            return Ok(());
        };
        let mut manager = PipelineManager::new(device.clone(), targets(), PipelineSettings::default())?;

        let (first, program) = manager.add_custom_program();
        program.add_shader(
            &device,
            StageKind::Vertex,
            std::path::Path::new("shaders/color.vert.wgsl"),
            std::path::Path::new("shader-error.txt"),
        )?;
        let (second, _) = manager.add_custom_program();
        assert_eq!(first, BUILTIN_COUNT);
        assert_eq!(second, BUILTIN_COUNT + 1);
        assert_eq!(manager.program(first).stages().len(), 1);

        manager.retain_program(first);
        assert!(!manager.remove_program(first));
        assert!(manager.remove_program(first));
        assert_eq!(manager.stats().live_programs, BUILTIN_COUNT + 1);

        let (third, _) = manager.add_custom_program();
        assert_eq!(third, BUILTIN_COUNT + 2);
        Ok(())
    }

    #[test]
    #[should_panic(expected = "already torn down")]
    fn torn_down_program_cannot_be_resolved() {
        let Some((device, _queue)) = headless_device() else {
            panic!("already torn down (no adapter)");
        };
        let Ok(mut manager) = PipelineManager::new(device, targets(), PipelineSettings::default())
        else {
            panic!("already torn down (built-ins failed)");
        };
        let (index, _) = manager.add_custom_program();
        manager.remove_program(index);
        manager.program(index);
    }

    #[test]
    fn missing_shader_dir_fails_initialization() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };
        let settings = PipelineSettings::default().with_shader_dir("no/such/dir");
        assert!(matches!(
            PipelineManager::new(device, targets(), settings),
            Err(EngineError::ShaderSourceMissing { .. })
        ));
    }
}
