//! Asset cache for meshes and textures
//!
//! First load wins: registering a key that is already cached returns the
//! existing index without touching the source again. Nothing is evicted;
//! every asset lives until the cache is dropped.

use std::{
    fmt,
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    error::EngineResult,
    gfx::{
        geometry::{generate_procedural, ProceduralKind},
        resources::texture_resource::{TextureComponents, TextureResource},
    },
};

use super::{arena::AssetArena, mesh::Mesh, obj_importer::import_obj};

/// Identity of a cached mesh
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Path(PathBuf),
    Procedural(ProceduralKind),
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetKey::Path(path) => write!(f, "{}", path.display()),
            AssetKey::Procedural(kind) => write!(f, "procedural {kind:?}"),
        }
    }
}

/// Owner of every GPU mesh and texture, addressed by stable index
pub struct AssetCache {
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    models: AssetArena<AssetKey, Mesh>,
    textures: AssetArena<PathBuf, Option<TextureResource>>,
}

impl AssetCache {
    pub fn new(device: Arc<wgpu::Device>, queue: Arc<wgpu::Queue>) -> Self {
        Self {
            device,
            queue,
            models: AssetArena::new(),
            textures: AssetArena::new(),
        }
    }

    /// Imports and uploads an OBJ file, or returns its cached index
    ///
    /// # Returns
    /// Stable model index; on failure nothing is cached
    pub fn register_model(&mut self, path: impl AsRef<Path>) -> EngineResult<usize> {
        let key = AssetKey::Path(path.as_ref().to_path_buf());
        self.register_mesh(key, |key| match key {
            AssetKey::Path(path) => import_obj(path),
            AssetKey::Procedural(kind) => generate_procedural(*kind),
        })
    }

    /// Generates and uploads a procedural mesh, or returns its cached index
    pub fn register_procedural_model(&mut self, kind: ProceduralKind) -> EngineResult<usize> {
        self.register_mesh(AssetKey::Procedural(kind), |_| generate_procedural(kind))
    }

    fn register_mesh(
        &mut self,
        key: AssetKey,
        load: impl FnOnce(&AssetKey) -> EngineResult<crate::gfx::geometry::MeshData>,
    ) -> EngineResult<usize> {
        if let Some(index) = self.models.lookup(&key) {
            log::trace!("model cache hit for {key} -> {index}");
            return Ok(index);
        }

        let device = &self.device;
        let index = self.models.get_or_try_insert_with(key, |key| {
            let data = load(key)?;
            log::debug!(
                "loaded {key}: {} vertices, {} indices",
                data.vertex_count(),
                data.index_count()
            );
            Mesh::upload(device, &data, &key.to_string())
        })?;

        Ok(index)
    }

    /// Loads an image file as a texture, or returns its cached index
    ///
    /// A file that cannot be read or decoded still gets an index, backed by
    /// an empty slot; check [`texture`](Self::texture) before sampling it.
    /// So does an image the device refuses, such as one past its size limit.
    ///
    /// # Arguments
    /// * `path` - Image file
    /// * `components` - Channel count to store (1, 2, or 4; 3 is stored as 4)
    pub fn register_texture(&mut self, path: impl AsRef<Path>, components: u8) -> usize {
        let path = path.as_ref().to_path_buf();
        if let Some(index) = self.textures.lookup(&path) {
            log::trace!("texture cache hit for '{}' -> {index}", path.display());
            return index;
        }

        let device = &self.device;
        let queue = &self.queue;

        let loaded = self.textures.get_or_try_insert_with(path, |path| {
            let texture = TextureResource::from_image_file(
                device,
                queue,
                path,
                TextureComponents::from_count(components),
            );
            match texture {
                Ok(texture) => {
                    log::debug!("loaded texture '{}'", path.display());
                    Ok::<_, std::convert::Infallible>(Some(texture))
                }
                Err(err) => {
                    log::warn!("texture '{}' left empty: {err}", path.display());
                    Ok(None)
                }
            }
        });

        match loaded {
            Ok(index) => index,
            Err(never) => match never {},
        }
    }

    /// Cached mesh at `index`
    ///
    /// # Panics
    /// Panics if `index` was never returned by a registration call
    pub fn model(&self, index: usize) -> &Mesh {
        match self.models.get(index) {
            Some(mesh) => mesh,
            None => panic!(
                "model index {index} out of range ({} models registered)",
                self.models.len()
            ),
        }
    }

    /// Cached texture at `index`, `None` when its file failed to load
    ///
    /// # Panics
    /// Panics if `index` was never returned by [`register_texture`](Self::register_texture)
    pub fn texture(&self, index: usize) -> Option<&TextureResource> {
        match self.textures.get(index) {
            Some(texture) => texture.as_ref(),
            None => panic!(
                "texture index {index} out of range ({} textures registered)",
                self.textures.len()
            ),
        }
    }

    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_of_different_sources_never_collide() {
        use std::collections::HashSet;

        let keys: HashSet<AssetKey> = [
            AssetKey::Path(PathBuf::from("0")),
            AssetKey::Procedural(ProceduralKind::Plane),
            AssetKey::Path(PathBuf::from("models/plane.obj")),
        ]
        .into_iter()
        .collect();
        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn key_display_names_the_source() {
        assert_eq!(
            AssetKey::Path(PathBuf::from("models/cube.obj")).to_string(),
            "models/cube.obj"
        );
        assert_eq!(
            AssetKey::Procedural(ProceduralKind::Triangle).to_string(),
            "procedural Triangle"
        );
    }
}
