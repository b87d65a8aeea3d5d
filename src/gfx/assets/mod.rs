//! Asset importing and caching
//!
//! - [`obj_importer`] parses OBJ files into [`MeshData`](crate::gfx::geometry::MeshData)
//! - [`Mesh`] is the uploaded, immutable GPU form
//! - [`AssetCache`] deduplicates meshes and textures by source identity

pub mod arena;
pub mod cache;
pub mod mesh;
pub mod obj_importer;

pub use arena::AssetArena;
pub use cache::{AssetCache, AssetKey};
pub use mesh::Mesh;
pub use obj_importer::{import_obj, ObjCounts};
