//! Decoded images and GPU textures.
//!
//! Images are decoded on the loader thread into [`ImageData`] (plain RGBA8 bytes) and
//! only become a [`Texture`] when the renderer first needs them.

use std::path::Path;

use crate::error::AssetError;
use crate::gpu::GpuContext;

/// CPU-side RGBA8 image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl std::fmt::Debug for ImageData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

impl ImageData {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            pixels,
        }
    }

    /// A single opaque pixel.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self::new(1, 1, rgba.to_vec())
    }

    pub fn from_file(path: &Path) -> Result<Self, AssetError> {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes, path)
    }

    /// Decodes any format the `image` crate understands. `path` is only used for
    /// error reporting.
    pub fn from_bytes(bytes: &[u8], path: &Path) -> Result<Self, AssetError> {
        let img = image::load_from_memory(bytes)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::new(width, height, img.into_raw()))
    }
}

/// A sampled GPU texture with a repeating, linearly filtered sampler.
#[derive(Debug)]
pub struct Texture {
    #[allow(dead_code)]
    pub(crate) texture: wgpu::Texture,
    pub(crate) view: wgpu::TextureView,
    pub(crate) sampler: wgpu::Sampler,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    pub fn from_rgba(gpu: &GpuContext, data: &[u8], width: u32, height: u32, label: &str) -> Self {
        use wgpu::util::DeviceExt;

        let texture = gpu.device.create_texture_with_data(
            &gpu.queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            data,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(&format!("{label} Sampler")),
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
            width,
            height,
        }
    }

    pub fn from_image(gpu: &GpuContext, image: &ImageData, label: &str) -> Self {
        Self::from_rgba(gpu, &image.pixels, image.width, image.height, label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_png_bytes() {
        let mut png = Vec::new();
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let data = ImageData::from_bytes(&png, Path::new("mem.png")).unwrap();
        assert_eq!((data.width, data.height), (3, 2));
        assert_eq!(&data.pixels[..4], &[10, 20, 30, 255]);
    }

    #[test]
    fn garbage_bytes_report_path() {
        let err = ImageData::from_bytes(b"not an image", Path::new("art/7.jpg")).unwrap_err();
        assert!(matches!(err, AssetError::Image { .. }));
        assert_eq!(err.path(), Path::new("art/7.jpg"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ImageData::from_file(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, AssetError::Io { .. }));
    }
}
