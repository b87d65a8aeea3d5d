// src/wgpu_utils/error_scope.rs
//! Turns wgpu's deferred validation errors into results
//!
//! wgpu reports most creation failures through the device's error handler
//! rather than return values. Wrapping a call in an error scope lets the
//! engine propagate them like any other failure.

use crate::error::{EngineError, EngineResult};

/// Runs `f` inside validation and out-of-memory error scopes
///
/// # Arguments
/// * `device` - Device the resources are created on
/// * `label` - Name used in the returned error
/// * `f` - Closure creating the resource(s)
pub fn scoped<T>(device: &wgpu::Device, label: &str, f: impl FnOnce() -> T) -> EngineResult<T> {
    device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
    device.push_error_scope(wgpu::ErrorFilter::Validation);

    let value = f();

    let validation = pollster::block_on(device.pop_error_scope());
    let out_of_memory = pollster::block_on(device.pop_error_scope());

    match validation.or(out_of_memory) {
        Some(error) => Err(EngineError::ResourceCreation {
            label: label.to_owned(),
            message: error.to_string(),
        }),
        None => Ok(value),
    }
}

/// Like [`scoped`], but hands the raw wgpu error message back to the caller
pub fn validation_message<T>(device: &wgpu::Device, f: impl FnOnce() -> T) -> (T, Option<String>) {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let value = f();
    let error = pollster::block_on(device.pop_error_scope());
    (value, error.map(|error| error.to_string()))
}
