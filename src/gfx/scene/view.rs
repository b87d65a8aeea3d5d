//! Read-only view of the host's scene
//!
//! The engine never owns entities or tiles; each frame it asks the host for
//! the active user's camera and walks tiles and their objects through this
//! trait.

use cgmath::Vector3;

/// Camera of a user taking part in the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct User {
    pub camera_position: Vector3<f32>,
    pub camera_look_direction: Vector3<f32>,
}

/// A drawable object placed in a tile
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneObject {
    pub position: Vector3<f32>,
    /// Index returned by model registration
    pub mesh_index: usize,
}

/// Query interface the frame orchestrator renders from
///
/// `tiles` and `objects` should yield a stable order. The orchestrator walks
/// them once per frame, collecting the draws before it records any.
pub trait SceneView {
    type Tile;

    fn user(&self, index: usize) -> Option<User>;

    fn tiles(&self) -> impl Iterator<Item = Self::Tile> + '_;

    fn objects(&self, tile: &Self::Tile) -> impl Iterator<Item = SceneObject> + '_;
}
