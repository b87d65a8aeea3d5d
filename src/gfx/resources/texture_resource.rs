//! Texture resources
//!
//! GPU textures with their view and sampler: the depth buffer owned by the
//! device context, and shader-readable images loaded by the asset cache.

use std::path::Path;

use crate::{
    error::{EngineError, EngineResult},
    wgpu_utils::scoped,
};

/// GPU texture resource containing texture, view, and sampler
#[derive(Debug, Clone)]
pub struct TextureResource {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

/// Channel layout requested for an image texture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureComponents {
    R,
    Rg,
    Rgba,
}

impl TextureComponents {
    /// Maps a channel count to a layout; 3 and unknown counts use RGBA
    pub fn from_count(components: u8) -> Self {
        match components {
            1 => Self::R,
            2 => Self::Rg,
            _ => Self::Rgba,
        }
    }

    pub fn format(&self) -> wgpu::TextureFormat {
        match self {
            Self::R => wgpu::TextureFormat::R8Unorm,
            Self::Rg => wgpu::TextureFormat::Rg8Unorm,
            Self::Rgba => wgpu::TextureFormat::Rgba8UnormSrgb,
        }
    }

    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            Self::R => 1,
            Self::Rg => 2,
            Self::Rgba => 4,
        }
    }

    /// Converts a decoded image into tightly packed texels of this layout
    pub fn texels(&self, image: image::DynamicImage) -> Vec<u8> {
        match self {
            Self::R => image.into_luma8().into_raw(),
            Self::Rg => image.into_luma_alpha8().into_raw(),
            Self::Rgba => image.into_rgba8().into_raw(),
        }
    }
}

impl TextureResource {
    /// Depth buffer format used throughout the engine
    pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface configuration
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `config` - Surface configuration to match dimensions
    /// * `label` - Debug label for the texture
    pub fn create_depth_texture(
        device: &wgpu::Device,
        config: &wgpu::SurfaceConfiguration,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }

    /// Decodes an image file and uploads it as a shader-readable texture
    ///
    /// # Arguments
    /// * `device` - WGPU device for creating resources
    /// * `queue` - WGPU queue for uploading texels
    /// * `path` - Image file to decode
    /// * `components` - Channel layout to store on the GPU
    pub fn from_image_file(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: &Path,
        components: TextureComponents,
    ) -> EngineResult<Self> {
        let image = image::open(path).map_err(|err| match err {
            image::ImageError::IoError(source) => EngineError::AssetNotFound {
                path: path.to_path_buf(),
                source,
            },
            other => EngineError::ResourceCreation {
                label: path.display().to_string(),
                message: other.to_string(),
            },
        })?;

        let (width, height) = (image.width(), image.height());
        let texels = components.texels(image);
        let label = path.display().to_string();

        Self::from_texels(device, queue, &texels, width, height, components, &label)
    }

    /// Uploads tightly packed texels into a new 2D texture
    ///
    /// Creation and upload run inside an error scope, so a size the device
    /// rejects comes back as `ResourceCreation` instead of a device panic.
    pub fn from_texels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texels: &[u8],
        width: u32,
        height: u32,
        components: TextureComponents,
        label: &str,
    ) -> EngineResult<Self> {
        scoped(device, label, || {
            Self::upload_texels(device, queue, texels, width, height, components, label)
        })
    }

    fn upload_texels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texels: &[u8],
        width: u32,
        height: u32,
        components: TextureComponents,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: components.format(),
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            texels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(components.bytes_per_pixel() * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{} Sampler", label)),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_counts_select_formats() {
        assert_eq!(TextureComponents::from_count(1).format(), wgpu::TextureFormat::R8Unorm);
        assert_eq!(TextureComponents::from_count(2).format(), wgpu::TextureFormat::Rg8Unorm);
        assert_eq!(TextureComponents::from_count(3), TextureComponents::Rgba);
        assert_eq!(TextureComponents::from_count(0), TextureComponents::Rgba);
    }

    #[test]
    fn rgb_images_expand_to_rgba() {
        let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            2,
            1,
            image::Rgb([10, 20, 30]),
        ));
        let texels = TextureComponents::Rgba.texels(image);
        assert_eq!(texels, vec![10, 20, 30, 255, 10, 20, 30, 255]);
    }
}
