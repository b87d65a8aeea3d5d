//! # Mesh Geometry
//!
//! CPU-side mesh data produced by the importer and the procedural
//! generators, before it is uploaded to GPU buffers.
//!
//! ## Supported Primitives
//!
//! - **Plane**: Unit quad in the XY plane
//! - **Triangle**: Single triangle spanning -1..1
//!
//! ## Usage
//!
//! ```rust
//! use ubrot::gfx::geometry::{generate_procedural, ProceduralKind};
//!
//! let plane = generate_procedural(ProceduralKind::Plane).unwrap();
//! assert_eq!(plane.triangle_count(), 2);
//! ```

pub mod primitives;

pub use primitives::*;

use crate::gfx::scene::vertex::ColorVertex;

/// Geometry ready for GPU upload
///
/// `tex_coords` and `normals` are either empty or hold one entry per vertex.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<ColorVertex>,
    /// Triangle list indices into `vertices`
    pub indices: Vec<u32>,
    pub tex_coords: Vec<[f32; 2]>,
    pub normals: Vec<[f32; 3]>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh with room for exactly `vertices` vertices and indices
    pub fn with_capacity(vertices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(vertices),
            tex_coords: Vec::with_capacity(vertices),
            normals: Vec::with_capacity(vertices),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.is_empty()
    }
}
