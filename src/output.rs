//! Textual realizations of a rendered frame.
//!
//! The core hands a [`RenderedFrame`] to one of three consumers: a plain
//! monochrome text block, a 24-bit ANSI block for terminals, or an HTML
//! fragment for embedding in a styled document.

use crate::render::RenderedFrame;

/// Glyphs only, rows joined with plain line breaks. Colors are ignored.
pub fn plain_text(frame: &RenderedFrame) -> String {
    let mut out = String::with_capacity((frame.width() + 1) * frame.height());
    for row in frame.rows() {
        for cell in row {
            out.push(cell.glyph);
        }
        out.push('\n');
    }
    out
}

/// Terminal realization: `ESC[38;2;<r>;<g>;<b>m<glyph>` per colored cell,
/// with an `ESC[0m` reset at the end of each line that used color.
pub fn ansi(frame: &RenderedFrame) -> String {
    let mut out = String::with_capacity((frame.width() * 20 + 5) * frame.height());
    for row in frame.rows() {
        let mut colored = false;
        for cell in row {
            match cell.color {
                Some([r, g, b]) => {
                    colored = true;
                    out.push_str(&format!("\x1b[38;2;{r};{g};{b}m"));
                    out.push(cell.glyph);
                }
                None => out.push(cell.glyph),
            }
        }
        if colored {
            out.push_str("\x1b[0m");
        }
        out.push('\n');
    }
    out
}

/// Markup realization: colored cells as inline-styled spans, rows joined
/// with `<br>`. Glyphs are escaped so ramps containing `<`, `>` or `&`
/// stay valid markup.
pub fn html(frame: &RenderedFrame) -> String {
    let mut out = String::with_capacity((frame.width() * 40 + 4) * frame.height());
    for (index, row) in frame.rows().iter().enumerate() {
        if index > 0 {
            out.push_str("<br>");
        }
        for cell in row {
            match cell.color {
                Some([r, g, b]) => {
                    out.push_str(&format!("<span style=\"color: rgb({r},{g},{b})\">"));
                    push_escaped(&mut out, cell.glyph);
                    out.push_str("</span>");
                }
                None => push_escaped(&mut out, cell.glyph),
            }
        }
    }
    out
}

/// Standalone HTML document wrapping [`html`], black background and a
/// monospaced face, viewable as saved.
pub fn html_document(frame: &RenderedFrame) -> String {
    format!(
        "<!DOCTYPE html>\n<html><body style=\"background-color: black; color: white;\">\
<pre style=\"font-family: monospace; line-height: 1;\">{}</pre></body></html>\n",
        html(frame)
    )
}

fn push_escaped(out: &mut String, glyph: char) {
    match glyph {
        '&' => out.push_str("&amp;"),
        '<' => out.push_str("&lt;"),
        '>' => out.push_str("&gt;"),
        other => out.push(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{ColorMode, GlyphPalette};
    use crate::render::render_frame;
    use image::RgbImage;

    fn frame(rgb: [u8; 3], mode: ColorMode) -> RenderedFrame {
        let palette = GlyphPalette::new("# ").unwrap();
        render_frame(RgbImage::from_pixel(2, 2, image::Rgb(rgb)), 2, &palette, mode).unwrap()
    }

    #[test]
    fn plain_text_joins_rows_with_newlines() {
        let text = plain_text(&frame([0, 0, 0], ColorMode::Monochrome));
        assert_eq!(text, "##\n");
    }

    #[test]
    fn ansi_emits_one_sequence_per_colored_cell() {
        let text = ansi(&frame([255, 0, 0], ColorMode::Color));
        assert_eq!(text, "\x1b[38;2;255;0;0m#\x1b[38;2;255;0;0m#\x1b[0m\n");
    }

    #[test]
    fn ansi_of_monochrome_frame_is_plain() {
        let mono = frame([0, 0, 0], ColorMode::Monochrome);
        assert_eq!(ansi(&mono), plain_text(&mono));
    }

    #[test]
    fn html_wraps_cells_in_spans_and_joins_with_br() {
        let palette = GlyphPalette::new("#").unwrap();
        let source = RgbImage::from_pixel(1, 4, image::Rgb([0, 128, 64]));
        let rendered = render_frame(source, 1, &palette, ColorMode::Color).unwrap();
        assert_eq!(rendered.height(), 2);
        assert_eq!(
            html(&rendered),
            "<span style=\"color: rgb(0,128,64)\">#</span><br>\
<span style=\"color: rgb(0,128,64)\">#</span>"
        );
    }

    #[test]
    fn html_escapes_markup_glyphs() {
        let palette = GlyphPalette::new("<").unwrap();
        let source = RgbImage::from_pixel(1, 1, image::Rgb([1, 2, 3]));
        let rendered = render_frame(source, 1, &palette, ColorMode::Monochrome).unwrap();
        assert_eq!(html(&rendered), "&lt;");
    }
}
