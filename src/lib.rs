//! Ubrot rendering engine core
//!
//! A small real-time 3D renderer on wgpu and winit. The [`Engine`] owns a
//! [`DeviceContext`](gfx::device::DeviceContext), an
//! [`AssetCache`](gfx::assets::AssetCache) and a
//! [`PipelineManager`](gfx::rendering::PipelineManager), and turns a host
//! scene into one presented frame per [`Engine::render_frame`] call.

pub mod app;
pub mod engine;
pub mod error;
pub mod gfx;
pub mod logging;
pub mod wgpu_utils;

#[cfg(all(test, feature = "gpu-tests"))]
mod test_support;

// Re-export main types for convenience
pub use app::ViewerApp;
pub use engine::Engine;
pub use error::{EngineError, EngineResult};
