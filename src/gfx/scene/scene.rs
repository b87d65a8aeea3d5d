use std::collections::BTreeMap;

use cgmath::Vector3;

use super::view::{SceneObject, SceneView, User};

/// Tile coordinate on the ground grid
pub type TileKey = (i32, i32);

/// Minimal tiled scene for hosts without their own entity storage
///
/// Tiles are kept in a `BTreeMap`, which gives the stable traversal order the
/// renderer relies on.
#[derive(Debug, Default, Clone)]
pub struct TiledScene {
    users: Vec<User>,
    tiles: BTreeMap<TileKey, Vec<SceneObject>>,
}

impl TiledScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user and returns its index
    pub fn add_user(&mut self, position: Vector3<f32>, look_direction: Vector3<f32>) -> usize {
        self.users.push(User {
            camera_position: position,
            camera_look_direction: look_direction,
        });
        self.users.len() - 1
    }

    pub fn user_mut(&mut self, index: usize) -> Option<&mut User> {
        self.users.get_mut(index)
    }

    /// Places a registered mesh at `position` inside `tile`
    pub fn add_object(&mut self, tile: TileKey, position: Vector3<f32>, mesh_index: usize) {
        self.tiles.entry(tile).or_default().push(SceneObject {
            position,
            mesh_index,
        });
    }

    pub fn object_count(&self) -> usize {
        self.tiles.values().map(Vec::len).sum()
    }
}

impl SceneView for TiledScene {
    type Tile = TileKey;

    fn user(&self, index: usize) -> Option<User> {
        self.users.get(index).copied()
    }

    fn tiles(&self) -> impl Iterator<Item = TileKey> + '_ {
        self.tiles.keys().copied()
    }

    fn objects(&self, tile: &TileKey) -> impl Iterator<Item = SceneObject> + '_ {
        self.tiles.get(tile).into_iter().flatten().copied()
    }
}
