/// RGBA color in linear space.
///
/// Scene colors are usually authored as sRGB hex values; [`Color::hex`] converts
/// them so lighting math in the shaders stays linear.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    /// Semi-transparent dark background for overlay panels.
    pub const PANEL_BG: Color = Color::rgba(0.02, 0.02, 0.025, 0.78);
    /// Accent color for panel borders.
    pub const PANEL_BORDER: Color = Color::rgba(0.35, 0.3, 0.25, 1.0);

    /// Build an opaque color from a `0xRRGGBB` sRGB value.
    pub fn hex(value: u32) -> Self {
        let r = ((value >> 16) & 0xff) as f32 / 255.0;
        let g = ((value >> 8) & 0xff) as f32 / 255.0;
        let b = (value & 0xff) as f32 / 255.0;
        Self::rgb(srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b))
    }

    /// Build an opaque color from sRGB hue (degrees), saturation and lightness.
    pub fn hsl(hue: f32, saturation: f32, lightness: f32) -> Self {
        let h = hue.rem_euclid(360.0) / 60.0;
        let s = saturation.clamp(0.0, 1.0);
        let l = lightness.clamp(0.0, 1.0);
        let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = chroma * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (chroma, x, 0.0),
            1 => (x, chroma, 0.0),
            2 => (0.0, chroma, x),
            3 => (0.0, x, chroma),
            4 => (x, 0.0, chroma),
            _ => (chroma, 0.0, x),
        };
        let m = l - chroma * 0.5;
        Self::rgb(srgb_to_linear(r + m), srgb_to_linear(g + m), srgb_to_linear(b + m))
    }

    /// Multiply the RGB channels, leaving alpha untouched.
    pub fn scaled(self, factor: f32) -> Self {
        Self::rgba(self.r * factor, self.g * factor, self.b * factor, self.a)
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn rgb_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// Convert to a wgpu clear color.
    pub fn to_wgpu(self) -> wgpu::Color {
        wgpu::Color {
            r: self.r as f64,
            g: self.g as f64,
            b: self.b as f64,
            a: self.a as f64,
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}
