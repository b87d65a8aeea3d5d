//! # Scene Module
//!
//! The narrow interface between the engine and the host's scene storage.
//!
//! ## Key Components
//!
//! - [`SceneView`] - Query trait the frame orchestrator renders from
//! - [`TiledScene`] - A small tile-partitioned implementation of it
//! - [`ColorVertex`] - Position plus colour vertex consumed by the pipelines
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Vector3;
//! use ubrot::gfx::scene::{SceneView, TiledScene};
//!
//! let mut scene = TiledScene::new();
//! scene.add_user(Vector3::new(0.0, 2.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
//! scene.add_object((0, 0), Vector3::new(0.0, 0.0, 0.0), 0);
//! assert_eq!(scene.tiles().count(), 1);
//! ```

pub mod scene;
pub mod vertex;
pub mod view;

// Re-export main types
pub use scene::{TileKey, TiledScene};
pub use vertex::ColorVertex;
pub use view::{SceneObject, SceneView, User};
