// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Textures for the depth buffer and for shader-readable images.

pub mod texture_resource;

// Re-export main types
pub use texture_resource::{TextureComponents, TextureResource};
