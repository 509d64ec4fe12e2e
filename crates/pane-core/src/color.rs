use palette::{FromColor, LinSrgba, Srgba};

use crate::scene::ColorLinPremul;

// sRGB <-> linear premultiplied conversions and hex parsing.
impl ColorLinPremul {
    pub const TRANSPARENT: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 0.0 };
    pub const BLACK: Self = Self { r: 0.0, g: 0.0, b: 0.0, a: 1.0 };
    pub const WHITE: Self = Self { r: 1.0, g: 1.0, b: 1.0, a: 1.0 };

    /// Shorthand for [`from_srgba_u8`](Self::from_srgba_u8).
    #[inline]
    pub fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self::from_srgba_u8([r, g, b, a])
    }

    /// Create from sRGB u8 RGBA array (premultiplied in linear space).
    #[inline]
    pub fn from_srgba_u8(c: [u8; 4]) -> Self {
        let s = Srgba::new(
            c[0] as f32 / 255.0,
            c[1] as f32 / 255.0,
            c[2] as f32 / 255.0,
            c[3] as f32 / 255.0,
        );
        let lin: LinSrgba = LinSrgba::from_color(s);
        Self {
            r: lin.red * lin.alpha,
            g: lin.green * lin.alpha,
            b: lin.blue * lin.alpha,
            a: lin.alpha,
        }
    }

    /// Parse `rrggbb` or `rrggbbaa` hex (an optional leading `#` is accepted).
    ///
    /// Six digits mean fully opaque. Anything else yields `None`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.trim().trim_start_matches('#');
        if digits.len() != 6 && digits.len() != 8 {
            return None;
        }
        let bytes = hex::decode(digits).ok()?;
        match bytes.as_slice() {
            [r, g, b] => Some(Self::rgba(*r, *g, *b, 255)),
            [r, g, b, a] => Some(Self::rgba(*r, *g, *b, *a)),
            _ => None,
        }
    }

    /// Like [`from_hex`](Self::from_hex) but falls back to `default` on malformed input.
    pub fn from_hex_or(s: &str, default: Self) -> Self {
        Self::from_hex(s).unwrap_or(default)
    }

    /// Multiply every channel, alpha included. Premultiplied, so this fades uniformly.
    #[inline]
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            r: self.r * factor,
            g: self.g * factor,
            b: self.b * factor,
            a: self.a * factor,
        }
    }

    /// Convert back to sRGB u8 RGBA array (unpremultiplied).
    #[inline]
    pub fn to_srgba_u8(&self) -> [u8; 4] {
        // Unpremultiply
        let (r, g, b) = if self.a > 0.0001 {
            (self.r / self.a, self.g / self.a, self.b / self.a)
        } else {
            (0.0, 0.0, 0.0)
        };

        // Convert linear to sRGB
        let lin = LinSrgba::new(r, g, b, self.a);
        let srgb: Srgba = Srgba::from_color(lin);

        [
            (srgb.red * 255.0).round().clamp(0.0, 255.0) as u8,
            (srgb.green * 255.0).round().clamp(0.0, 255.0) as u8,
            (srgb.blue * 255.0).round().clamp(0.0, 255.0) as u8,
            (srgb.alpha * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }
}
