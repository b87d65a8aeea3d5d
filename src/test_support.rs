//! Headless GPU setup for tests built with the `gpu-tests` feature

use std::sync::Arc;

/// Device and queue on any available adapter, without a surface
///
/// Returns `None` (and logs the skip) when the machine has no adapter.
pub fn headless_device() -> Option<(Arc<wgpu::Device>, Arc<wgpu::Queue>)> {
    crate::logging::init_logging(crate::logging::LoggingConfig::default());

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
    let adapter = match pollster::block_on(
        instance.request_adapter(&wgpu::RequestAdapterOptions::default()),
    ) {
        Ok(adapter) => adapter,
        Err(err) => {
            log::warn!("skipping gpu test: {err}");
            return None;
        }
    };

    let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
        label: Some("Test Device"),
        required_features: wgpu::Features::empty(),
        required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
        memory_hints: wgpu::MemoryHints::default(),
        trace: wgpu::Trace::Off,
    }))
    .ok()?;

    Some((Arc::new(device), Arc::new(queue)))
}
