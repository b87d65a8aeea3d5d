// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Provides convenient wrappers for common wgpu operations.

pub mod binding_types;
pub mod error_scope;
pub mod uniform_buffer;

// Re-export main types
pub use binding_types::*;
pub use error_scope::{scoped, validation_message};
pub use uniform_buffer::DynamicUniformBuffer;
