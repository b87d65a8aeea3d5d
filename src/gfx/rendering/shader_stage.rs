//! Compiled shader stages
//!
//! A stage is one WGSL module compiled from one file. Vertex and fragment
//! stages differ only in their entry point and in which half of the pipeline
//! descriptor they fill, so both live behind [`ShaderStage`].

use std::path::{Path, PathBuf};

use crate::{
    error::{EngineError, EngineResult},
    wgpu_utils::validation_message,
};

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";
pub const LAYOUT_ENTRY: &str = "vs_layout";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

#[derive(Debug)]
pub struct VertexStage {
    module: wgpu::ShaderModule,
    path: PathBuf,
}

#[derive(Debug)]
pub struct FragmentStage {
    module: wgpu::ShaderModule,
    path: PathBuf,
}

#[derive(Debug)]
pub enum ShaderStage {
    Vertex(VertexStage),
    Fragment(FragmentStage),
}

/// Descriptor halves filled in by [`ShaderStage::bind`]
#[derive(Default)]
pub struct BoundStages<'a> {
    pub vertex: Option<wgpu::VertexState<'a>>,
    pub fragment: Option<wgpu::FragmentState<'a>>,
}

/// Compiles the WGSL file at `path` into a module
///
/// Compiler diagnostics are written to `diagnostic_file`, replacing what an
/// earlier failure left there.
pub fn compile_module(
    device: &wgpu::Device,
    path: &Path,
    diagnostic_file: &Path,
) -> EngineResult<wgpu::ShaderModule> {
    let source = std::fs::read_to_string(path).map_err(|source| EngineError::ShaderSourceMissing {
        path: path.to_path_buf(),
        source,
    })?;

    let label = path.display().to_string();
    let (module, diagnostic) = validation_message(device, || {
        device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        })
    });

    let Some(diagnostic) = diagnostic else {
        log::debug!("compiled shader '{label}'");
        return Ok(module);
    };

    if let Err(err) = std::fs::write(diagnostic_file, &diagnostic) {
        log::warn!(
            "could not write shader diagnostic to '{}': {err}",
            diagnostic_file.display()
        );
    }
    log::error!(
        "shader '{label}' failed to compile, diagnostic written to '{}'",
        diagnostic_file.display()
    );

    Err(EngineError::ShaderCompile {
        path: path.to_path_buf(),
        diagnostic_file: diagnostic_file.to_path_buf(),
    })
}

impl ShaderStage {
    /// Compiles `path` as a stage of the given kind
    ///
    /// # Arguments
    /// * `device` - Device the module is created on
    /// * `kind` - Which pipeline stage the module feeds
    /// * `path` - WGSL source file
    /// * `diagnostic_file` - Where compiler output goes on failure
    pub fn compile(
        device: &wgpu::Device,
        kind: StageKind,
        path: &Path,
        diagnostic_file: &Path,
    ) -> EngineResult<Self> {
        let module = compile_module(device, path, diagnostic_file)?;
        let path = path.to_path_buf();

        Ok(match kind {
            StageKind::Vertex => ShaderStage::Vertex(VertexStage { module, path }),
            StageKind::Fragment => ShaderStage::Fragment(FragmentStage { module, path }),
        })
    }

    pub fn kind(&self) -> StageKind {
        match self {
            ShaderStage::Vertex(_) => StageKind::Vertex,
            ShaderStage::Fragment(_) => StageKind::Fragment,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            ShaderStage::Vertex(stage) => &stage.path,
            ShaderStage::Fragment(stage) => &stage.path,
        }
    }

    /// Fills this stage's half of a pipeline descriptor
    ///
    /// A later stage of the same kind replaces an earlier one.
    pub fn bind<'a>(
        &'a self,
        stages: &mut BoundStages<'a>,
        buffers: &'a [wgpu::VertexBufferLayout<'a>],
        targets: &'a [Option<wgpu::ColorTargetState>],
    ) {
        match self {
            ShaderStage::Vertex(stage) => {
                stages.vertex = Some(wgpu::VertexState {
                    module: &stage.module,
                    entry_point: Some(VERTEX_ENTRY),
                    buffers,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                });
            }
            ShaderStage::Fragment(stage) => {
                stages.fragment = Some(wgpu::FragmentState {
                    module: &stage.module,
                    entry_point: Some(FRAGMENT_ENTRY),
                    targets,
                    compilation_options: wgpu::PipelineCompilationOptions::default(),
                });
            }
        }
    }
}

#[cfg(all(test, feature = "gpu-tests"))]
mod gpu_tests {
    use super::*;
    use crate::test_support::headless_device;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("ubrot-stage-{}-{name}", std::process::id()))
    }

    #[test]
    fn bundled_stages_compile() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };
        let diagnostic = temp_path("ok-diagnostic.txt");

        let vertex = ShaderStage::compile(
            &device,
            StageKind::Vertex,
            Path::new("shaders/color.vert.wgsl"),
            &diagnostic,
        )
        .unwrap();
        let fragment = ShaderStage::compile(
            &device,
            StageKind::Fragment,
            Path::new("shaders/color.frag.wgsl"),
            &diagnostic,
        )
        .unwrap();

        assert_eq!(vertex.kind(), StageKind::Vertex);
        assert_eq!(fragment.kind(), StageKind::Fragment);
        assert_eq!(fragment.path(), Path::new("shaders/color.frag.wgsl"));
        assert!(!diagnostic.exists());
    }

    #[test]
    fn broken_source_writes_diagnostic() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };
        let source = temp_path("broken.wgsl");
        let diagnostic = temp_path("broken-diagnostic.txt");
        std::fs::write(&source, "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return 1; }").unwrap();

        let result = ShaderStage::compile(&device, StageKind::Vertex, &source, &diagnostic);

        assert!(matches!(result, Err(EngineError::ShaderCompile { .. })));
        let text = std::fs::read_to_string(&diagnostic).unwrap();
        assert!(!text.is_empty());

        std::fs::remove_file(source).ok();
        std::fs::remove_file(diagnostic).ok();
    }

    #[test]
    fn missing_source_is_reported_without_diagnostic() {
        let Some((device, _queue)) = headless_device() else {
            return;
        };
        let diagnostic = temp_path("missing-diagnostic.txt");

        let result = ShaderStage::compile(
            &device,
            StageKind::Fragment,
            Path::new("shaders/does-not-exist.wgsl"),
            &diagnostic,
        );

        assert!(matches!(result, Err(EngineError::ShaderSourceMissing { .. })));
        assert!(!diagnostic.exists());
    }
}
