//! Engine error type
//!
//! Every fallible engine operation returns [`EngineResult`]. Errors raised by
//! wgpu are carried through unchanged so the host sees the device's own reason.

use std::path::PathBuf;

use thiserror::Error;

use crate::gfx::geometry::ProceduralKind;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    // Device and resource creation
    #[error(transparent)]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),

    #[error(transparent)]
    AdapterRequest(#[from] wgpu::RequestAdapterError),

    #[error(transparent)]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error(transparent)]
    SurfaceAcquire(#[from] wgpu::SurfaceError),

    #[error("surface reports no supported texture formats for this adapter")]
    UnsupportedSurface,

    #[error("failed to create {label}: {message}")]
    ResourceCreation { label: String, message: String },

    // Assets
    #[error("asset '{path}' could not be opened")]
    AssetNotFound {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mesh '{path}' is empty ({positions} positions, {faces} faces)")]
    EmptyMesh {
        path: PathBuf,
        positions: usize,
        faces: usize,
    },

    #[error("mesh '{path}' line {line}: {reason}")]
    MalformedMesh {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("mesh '{path}' line {line}: index {index} is outside 1..={len}")]
    FaceIndexOutOfRange {
        path: PathBuf,
        line: usize,
        index: i64,
        len: usize,
    },

    #[error("procedural mesh '{0:?}' is not implemented")]
    ProceduralNotImplemented(ProceduralKind),

    #[error("unknown procedural mesh kind {0}")]
    UnknownProceduralKind(u8),

    // Shaders
    #[error("shader '{path}' failed to compile, see '{diagnostic_file}'")]
    ShaderCompile {
        path: PathBuf,
        diagnostic_file: PathBuf,
    },

    #[error("shader source '{path}' could not be read")]
    ShaderSourceMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("vertex layout of '{path}' was rejected: {message}")]
    ShaderLayout { path: PathBuf, message: String },

    // Frame
    #[error("per-draw uniform slots exhausted (capacity {capacity})")]
    UniformSlotsExhausted { capacity: usize },

    #[error("scene has no user at index {0}")]
    NoActiveUser(usize),
}
