//! Core rendering functionality
//!
//! Shader stages and programs, the pipeline manager that indexes them, and
//! the frame orchestrator that walks a scene into draw calls.

pub mod frame_orchestrator;
pub mod pipeline_manager;
pub mod shader_program;
pub mod shader_stage;

// Re-export main types
pub use frame_orchestrator::{collect_draws, DrawCall, FrameOrchestrator};
pub use pipeline_manager::{
    BuiltinProgram, PipelineManager, PipelineSettings, PipelineStats, BUILTIN_COUNT,
};
pub use shader_program::{RenderTargets, ShaderProgram};
pub use shader_stage::{ShaderStage, StageKind};
