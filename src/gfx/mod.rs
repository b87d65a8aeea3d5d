//! # Graphics Module
//!
//! Everything between the host's scene and the GPU.
//!
//! ## Architecture Overview
//!
//! - **Device** ([`device`]) - wgpu device, surface, depth buffer and fixed state
//! - **Assets** ([`assets`]) - OBJ import and the mesh/texture cache
//! - **Rendering** ([`rendering`]) - Shader programs, the pipeline manager and the frame orchestrator
//! - **Camera** ([`camera`]) - Left-handed view matrices and the per-draw uniform
//! - **Scene** ([`scene`]) - The query trait the engine renders from
//! - **Geometry** ([`geometry`]) - CPU-side mesh data and procedural shapes
//! - **Resources** ([`resources`]) - Textures
//!
//! Data flows one way per frame: scene query, asset lookup, program lookup,
//! device commands.

pub mod assets;
pub mod camera;
pub mod device;
pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use assets::AssetCache;
pub use device::{DeviceContext, GraphicSettings};
pub use rendering::{FrameOrchestrator, PipelineManager, PipelineSettings};
