use std::collections::HashMap;
use std::path::{Path, PathBuf};

use fontdue::{Font, FontSettings};

use crate::error::AppError;
use crate::gpu::GpuContext;

/// Opaque identifier for a loaded font.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FontId(pub(crate) usize);

/// Fonts tried, in order, when no font path is configured.
pub const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// The configured font if given, else the first candidate that exists on disk.
pub fn find_font(configured: Option<&Path>, candidates: &[&str]) -> Option<PathBuf> {
    if let Some(path) = configured {
        return Some(path.to_path_buf());
    }
    candidates
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Information about a single glyph in the font atlas.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlyphInfo {
    /// UV coordinates in the atlas (x, y, width, height) normalized to [0, 1].
    pub uv: [f32; 4],
    /// Size of the glyph in pixels.
    pub width: u32,
    pub height: u32,
    /// Offset from the cursor position to where the glyph should be drawn.
    pub offset_x: f32,
    pub offset_y: f32,
    /// How far to advance the cursor after this glyph.
    pub advance: f32,
}

/// Row-packs rectangles into the smallest power-of-two atlas (starting at 512²)
/// that holds them all. Returns the atlas size and each rectangle's origin.
pub fn pack_glyphs(sizes: &[(u32, u32)], padding: u32) -> ((u32, u32), Vec<(u32, u32)>) {
    let mut atlas = (512u32, 512u32);
    loop {
        if let Some(origins) = try_pack(sizes, padding, atlas) {
            return (atlas, origins);
        }
        // Double the smaller dimension
        if atlas.0 <= atlas.1 {
            atlas.0 *= 2;
        } else {
            atlas.1 *= 2;
        }
    }
}

fn try_pack(sizes: &[(u32, u32)], padding: u32, (width, height): (u32, u32)) -> Option<Vec<(u32, u32)>> {
    let mut origins = Vec::with_capacity(sizes.len());
    let mut x = padding;
    let mut y = padding;
    let mut row_height = 0u32;

    for &(w, h) in sizes {
        if w + 2 * padding > width {
            return None;
        }
        if x + w + padding > width {
            x = padding;
            y += row_height + padding;
            row_height = 0;
        }
        if y + h + padding > height {
            return None;
        }
        origins.push((x, y));
        x += w + padding;
        row_height = row_height.max(h);
    }
    Some(origins)
}

/// Printable ASCII glyphs rasterized into a single-channel bitmap.
pub struct GlyphAtlas {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl GlyphAtlas {
    /// Rasterize TTF/OTF data at `size` pixels.
    pub fn rasterize(font_data: &[u8], size: f32) -> Result<Self, String> {
        let font = Font::from_bytes(font_data, FontSettings::default()).map_err(|e| e.to_string())?;

        let rasterized: Vec<(char, fontdue::Metrics, Vec<u8>)> = (32u8..=126u8)
            .map(|c| {
                let (metrics, bitmap) = font.rasterize(c as char, size);
                (c as char, metrics, bitmap)
            })
            .collect();

        let sizes: Vec<(u32, u32)> = rasterized
            .iter()
            .map(|(_, m, _)| (m.width as u32, m.height as u32))
            .collect();
        let ((width, height), origins) = pack_glyphs(&sizes, 1);

        let mut pixels = vec![0u8; (width * height) as usize];
        let mut glyphs = HashMap::new();

        for ((c, metrics, bitmap), (x, y)) in rasterized.iter().zip(origins) {
            let glyph_w = metrics.width as u32;
            let glyph_h = metrics.height as u32;

            for gy in 0..glyph_h {
                let src = (gy * glyph_w) as usize;
                let dst = ((y + gy) * width + x) as usize;
                pixels[dst..dst + glyph_w as usize]
                    .copy_from_slice(&bitmap[src..src + glyph_w as usize]);
            }

            glyphs.insert(
                *c,
                GlyphInfo {
                    uv: [
                        x as f32 / width as f32,
                        y as f32 / height as f32,
                        glyph_w as f32 / width as f32,
                        glyph_h as f32 / height as f32,
                    ],
                    width: glyph_w,
                    height: glyph_h,
                    offset_x: metrics.xmin as f32,
                    offset_y: metrics.ymin as f32,
                    advance: metrics.advance_width,
                },
            );
        }

        let line_height = font
            .horizontal_line_metrics(size)
            .map(|m| m.new_line_size)
            .unwrap_or(size * 1.2);

        Ok(Self {
            width,
            height,
            pixels,
            glyphs,
            size,
            line_height,
        })
    }
}

/// A font atlas uploaded to the GPU.
pub struct FontAtlas {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    glyphs: HashMap<char, GlyphInfo>,
    size: f32,
    line_height: f32,
}

impl FontAtlas {
    pub fn new(gpu: &GpuContext, atlas: GlyphAtlas) -> Self {
        let texture = gpu.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Font Atlas"),
            size: wgpu::Extent3d {
                width: atlas.width,
                height: atlas.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        gpu.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas.width),
                rows_per_image: Some(atlas.height),
            },
            wgpu::Extent3d {
                width: atlas.width,
                height: atlas.height,
                depth_or_array_layers: 1,
            },
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = gpu.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Font Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            glyphs: atlas.glyphs,
            size: atlas.size,
            line_height: atlas.line_height,
        }
    }

    /// Get glyph info for a character.
    pub fn glyph(&self, c: char) -> Option<&GlyphInfo> {
        self.glyphs.get(&c)
    }

    /// Get the font size this atlas was created with.
    pub fn size(&self) -> f32 {
        self.size
    }

    /// Get the line height for this font.
    pub fn line_height(&self) -> f32 {
        self.line_height
    }

    /// Measure the width of a string.
    pub fn measure(&self, text: &str) -> f32 {
        text.chars()
            .map(|c| self.glyphs.get(&c).map_or(self.size * 0.5, |g| g.advance))
            .sum()
    }
}

/// Loaded fonts.
#[derive(Default)]
pub struct Assets {
    pub(crate) fonts: Vec<FontAtlas>,
}

impl Assets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a font from a file path.
    pub fn load_font(&mut self, gpu: &GpuContext, path: &Path, size: f32) -> Result<FontId, AppError> {
        let font_error = |message: String| AppError::Font {
            path: path.to_path_buf(),
            message,
        };
        let data = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let atlas = GlyphAtlas::rasterize(&data, size).map_err(font_error)?;
        let id = FontId(self.fonts.len());
        self.fonts.push(FontAtlas::new(gpu, atlas));
        log::debug!("loaded font {} at {size}px", path.display());
        Ok(id)
    }

    /// Get a font atlas by ID.
    pub fn font(&self, id: FontId) -> Option<&FontAtlas> {
        self.fonts.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packing_wraps_rows_without_overlap() {
        let sizes = vec![(100, 20); 12];
        let ((w, h), origins) = pack_glyphs(&sizes, 1);
        assert_eq!((w, h), (512, 512));
        // Five 100px glyphs fit per 512px row with padding.
        assert_eq!(origins[4], (405, 1));
        assert_eq!(origins[5], (1, 22));
        for (&(x, y), &(gw, gh)) in origins.iter().zip(&sizes) {
            assert!(x + gw < w && y + gh < h);
        }
    }

    #[test]
    fn packing_grows_atlas_when_full() {
        let sizes = vec![(200, 200); 9];
        let ((w, h), origins) = pack_glyphs(&sizes, 1);
        assert!(w * h > 512 * 512);
        assert_eq!(origins.len(), 9);
    }

    #[test]
    fn configured_font_wins() {
        let configured = Path::new("fonts/custom.ttf");
        assert_eq!(
            find_font(Some(configured), SYSTEM_FONT_CANDIDATES),
            Some(PathBuf::from("fonts/custom.ttf"))
        );
        assert_eq!(find_font(None, &["/definitely/not/here.ttf"]), None);
    }

    #[test]
    fn invalid_font_data_is_rejected() {
        assert!(GlyphAtlas::rasterize(b"not a font", 16.0).is_err());
    }
}
