//! Frame renderer: one resized source frame → an immutable glyph grid.

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};

use crate::error::ValidationError;
use crate::palette::{map_pixel, Cell, ColorMode, GlyphPalette};

/// Height compensation for glyph cells being taller than wide in typical
/// monospaced rendering. Fixed calibration constant, not configurable.
pub const CELL_ASPECT: f64 = 0.55;

/// Fully materialized glyph grid for one source frame.
///
/// Immutable once produced; exactly `width()` cells per row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFrame {
    rows: Vec<Vec<Cell>>,
}

impl RenderedFrame {
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }
}

/// Ordered, read-only output of preprocessing one source: every rendered
/// frame plus the source frame rate.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<RenderedFrame>,
    frame_rate: f64,
}

impl FrameSequence {
    pub fn new(frames: Vec<RenderedFrame>, frame_rate: f64) -> Self {
        Self { frames, frame_rate }
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames per second of the source, `> 0` once the worker has applied
    /// its fallback.
    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }

    pub fn get(&self, index: usize) -> Option<&RenderedFrame> {
        self.frames.get(index)
    }

    pub fn frames(&self) -> &[RenderedFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<RenderedFrame> {
        self.frames
    }
}

/// Target grid height for a source aspect ratio at a given character width.
pub fn target_height(target_width: u32, source_width: u32, source_height: u32) -> u32 {
    let aspect = f64::from(source_height) / f64::from(source_width);
    let rows = (f64::from(target_width) * aspect * CELL_ASPECT).round() as u32;
    rows.max(1)
}

/// Renders one source frame into a glyph grid of exactly
/// `target_width × target_height` cells.
///
/// The source is resized to the aspect-corrected cell grid, then every
/// sample is mapped in row-major order. Pure: identical inputs yield
/// identical frames.
pub fn render_frame(
    source: RgbImage,
    target_width: u32,
    palette: &GlyphPalette,
    mode: ColorMode,
) -> Result<RenderedFrame, ValidationError> {
    if target_width == 0 {
        return Err(ValidationError::ZeroWidth);
    }
    let (source_width, source_height) = source.dimensions();
    if source_width == 0 || source_height == 0 {
        return Err(ValidationError::EmptyFrame);
    }

    let rows_target = target_height(target_width, source_width, source_height);
    let resized = if (target_width, rows_target) == (source_width, source_height) {
        source
    } else {
        DynamicImage::ImageRgb8(source)
            .resize_exact(target_width, rows_target, FilterType::Lanczos3)
            .to_rgb8()
    };

    let mut rows = Vec::with_capacity(rows_target as usize);
    for y in 0..rows_target {
        let mut row = Vec::with_capacity(target_width as usize);
        for x in 0..target_width {
            row.push(map_pixel(*resized.get_pixel(x, y), palette, mode));
        }
        rows.push(row);
    }
    Ok(RenderedFrame { rows })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb(rgb))
    }

    #[test]
    fn grid_is_exactly_width_by_aspect_height() {
        let palette = GlyphPalette::new(crate::palette::CLASSIC_RAMP).unwrap();
        for (sw, sh, tw) in [(320u32, 240u32, 80u32), (1920, 1080, 78), (64, 512, 10), (100, 1, 40)] {
            let frame =
                render_frame(solid(sw, sh, [128, 128, 128]), tw, &palette, ColorMode::Monochrome)
                    .unwrap();
            let expected_rows =
                ((f64::from(tw) * f64::from(sh) / f64::from(sw) * CELL_ASPECT).round() as u32).max(1);
            assert_eq!(frame.width(), tw as usize);
            assert_eq!(frame.height(), expected_rows as usize);
            for row in frame.rows() {
                assert_eq!(row.len(), tw as usize);
            }
        }
    }

    #[test]
    fn pure_black_and_white_hit_the_ramp_ends() {
        let palette = GlyphPalette::new("# ").unwrap();
        let black =
            render_frame(solid(1, 1, [0, 0, 0]), 1, &palette, ColorMode::Monochrome).unwrap();
        assert_eq!(black.rows()[0][0].glyph, '#');
        let white =
            render_frame(solid(1, 1, [255, 255, 255]), 1, &palette, ColorMode::Monochrome).unwrap();
        assert_eq!(white.rows()[0][0].glyph, ' ');
    }

    #[test]
    fn rendering_is_idempotent() {
        let palette = GlyphPalette::new(crate::palette::DENSE_RAMP).unwrap();
        let mut source = RgbImage::new(32, 24);
        for (x, y, px) in source.enumerate_pixels_mut() {
            *px = image::Rgb([(x * 8) as u8, (y * 10) as u8, ((x + y) * 4) as u8]);
        }
        let first = render_frame(source.clone(), 16, &palette, ColorMode::Color).unwrap();
        let second = render_frame(source, 16, &palette, ColorMode::Color).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn color_mode_attaches_resampled_pixel_colors() {
        let palette = GlyphPalette::new(crate::palette::CLASSIC_RAMP).unwrap();
        let frame = render_frame(solid(10, 10, [200, 50, 25]), 4, &palette, ColorMode::Color).unwrap();
        for row in frame.rows() {
            for cell in row {
                assert_eq!(cell.color, Some([200, 50, 25]));
            }
        }
    }

    #[test]
    fn monochrome_cells_carry_no_color() {
        let palette = GlyphPalette::new(crate::palette::CLASSIC_RAMP).unwrap();
        let frame =
            render_frame(solid(10, 10, [200, 50, 25]), 4, &palette, ColorMode::Monochrome).unwrap();
        assert!(frame.rows().iter().flatten().all(|cell| cell.color.is_none()));
    }

    #[test]
    fn degenerate_inputs_are_validation_errors() {
        let palette = GlyphPalette::new(crate::palette::CLASSIC_RAMP).unwrap();
        assert_eq!(
            render_frame(solid(10, 10, [0, 0, 0]), 0, &palette, ColorMode::Monochrome).unwrap_err(),
            ValidationError::ZeroWidth
        );
        assert_eq!(
            render_frame(RgbImage::new(0, 0), 10, &palette, ColorMode::Monochrome).unwrap_err(),
            ValidationError::EmptyFrame
        );
    }

    #[test]
    fn wide_frame_never_collapses_below_one_row() {
        let palette = GlyphPalette::new(crate::palette::CLASSIC_RAMP).unwrap();
        let frame =
            render_frame(solid(4000, 10, [9, 9, 9]), 20, &palette, ColorMode::Monochrome).unwrap();
        assert_eq!(frame.height(), 1);
    }
}
