//! Glyph palettes and the pixel → glyph mapper.
//!
//! A palette is an ordered ramp of printable glyphs from visually densest
//! (index 0, shown for dark pixels) to sparsest (shown for bright pixels).
//! The mapper quantizes perceptual luminance into a palette index.

use image::Rgb;

use crate::error::ValidationError;

/// Classic dense→sparse ASCII ramp, the default for motion sources.
pub const CLASSIC_RAMP: &str = "@%#*+=-:. ";

/// 70-glyph ramp with finer luminance steps.
pub const DENSE_RAMP: &str =
    "$@B%8&WM#*oahkbdpqwmZO0QLCJUYXzcvunxrjft/\\|()1{}[]?-_+~<>i!lI;:,\"^`'. ";

/// Unicode block-shading ramp for a solid, pixel-like look.
pub const BLOCK_RAMP: &str = "█▇▆▅▄▃▂▁ ";

/// Whether mapped cells carry the source pixel color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    /// Each cell keeps the original (r, g, b) of its source sample.
    Color,
    /// Glyphs only; rows concatenate with plain line breaks.
    Monochrome,
}

/// One cell of a rendered frame: a glyph plus its color when the
/// conversion ran in [`ColorMode::Color`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub glyph: char,
    pub color: Option<[u8; 3]>,
}

/// Ordered, non-empty glyph ramp indexed by quantized luminance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphPalette {
    glyphs: Vec<char>,
}

impl GlyphPalette {
    /// Builds a palette from a dense→sparse ramp string.
    ///
    /// An empty ramp is a [`ValidationError::EmptyPalette`]; a palette with
    /// fewer than one glyph is never constructed.
    pub fn new(ramp: &str) -> Result<Self, ValidationError> {
        let glyphs: Vec<char> = ramp.chars().collect();
        if glyphs.is_empty() {
            return Err(ValidationError::EmptyPalette);
        }
        Ok(Self { glyphs })
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Glyph for a luminance value in `[0, 255]`.
    ///
    /// `index = floor(L / 255 * (len - 1))`, clamped into range to guard
    /// the floating-point edge at L = 255.
    pub fn glyph_for(&self, luminance: f64) -> char {
        let last = self.glyphs.len() - 1;
        let index = (luminance / 255.0 * last as f64).floor() as usize;
        self.glyphs[index.min(last)]
    }
}

/// Perceptually weighted brightness of an RGB pixel, in `[0, 255]`.
pub fn luminance(pixel: Rgb<u8>) -> f64 {
    0.299 * f64::from(pixel[0]) + 0.587 * f64::from(pixel[1]) + 0.114 * f64::from(pixel[2])
}

/// Maps one source pixel to its glyph cell. Pure and deterministic.
pub fn map_pixel(pixel: Rgb<u8>, palette: &GlyphPalette, mode: ColorMode) -> Cell {
    let glyph = palette.glyph_for(luminance(pixel));
    let color = match mode {
        ColorMode::Color => Some([pixel[0], pixel[1], pixel[2]]),
        ColorMode::Monochrome => None,
    };
    Cell { glyph, color }
}
