use crate::ir::{Anchor, DrawCommand, Orientation, Page, SceneGraph};
use crate::palette::mix;
use crate::{OutputFormat, RenderOptions};
use anyhow::{anyhow, Context, Result};
use image::ImageEncoder;
use plotters::coord::Shift;
use plotters::element::{Drawable, PointCollection};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use tracing::info;

const FONT: &str = "sans-serif";
const OUTLINE: RGBColor = RGBColor(0x33, 0x33, 0x33);
const CALLOUT_COLOR: RGBColor = RGBColor(0xe0, 0x60, 0x20);

/// Average glyph width used to wrap callout notes
const GLYPH_WIDTH: f64 = 7.0;

fn px(v: f64) -> i32 {
    v.round() as i32
}

fn point((x, y): (f64, f64)) -> (i32, i32) {
    (px(x), px(y))
}

/// Encode a page of scenes in the requested format
pub fn render_page(page: &Page, options: &RenderOptions) -> Result<Vec<u8>> {
    let bytes = match options.format {
        OutputFormat::Png => render_png(page, options.labels)?,
        OutputFormat::Svg => render_svg(page, options.labels)?,
    };
    info!(format = ?options.format, bytes = bytes.len(), panels = page.panels.len(), "page rendered");
    Ok(bytes)
}

fn render_png(page: &Page, labels: bool) -> Result<Vec<u8>> {
    let (width, height) = page.size();
    let mut buffer = vec![0u8; buffer_len(width, height)];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_page(&root, page, labels)?;
        root.present().context("Failed to present drawing")?;
    }

    let mut png_bytes = Vec::new();
    {
        let encoder = image::codecs::png::PngEncoder::new(&mut png_bytes);
        encoder
            .write_image(&buffer, width, height, image::ColorType::Rgb8)
            .context("Failed to encode PNG")?;
    }
    Ok(png_bytes)
}

/// RGB byte count, computed in `usize`
fn buffer_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 3
}

fn render_svg(page: &Page, labels: bool) -> Result<Vec<u8>> {
    let (width, height) = page.size();
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        draw_page(&root, page, labels)?;
        root.present().context("Failed to present drawing")?;
    }
    Ok(svg.into_bytes())
}

fn draw_page<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, page: &Page, labels: bool) -> Result<()> {
    root.fill(&WHITE).map_err(|e| anyhow!("Failed to fill background: {:?}", e))?;

    let cells = root.split_evenly((page.nrow.max(1), page.ncol.max(1)));
    for panel in &page.panels {
        let idx = panel.row * page.ncol + panel.col;
        let area = cells
            .get(idx)
            .ok_or_else(|| anyhow!("Panel ({}, {}) is outside the {}x{} page", panel.row, panel.col, page.nrow, page.ncol))?;
        draw_scene(area, &panel.scene, labels)?;
    }
    Ok(())
}

/// Execute a scene's commands in order on one drawing area
pub fn draw_scene<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, scene: &SceneGraph, labels: bool) -> Result<()> {
    for cmd in &scene.commands {
        match cmd {
            DrawCommand::Rect { tl, br, fill, active, .. } => {
                draw(area, Rectangle::new([point(*tl), point(*br)], fill.filled()), "bar")?;
                if *active {
                    draw(area, Rectangle::new([point(*tl), point(*br)], OUTLINE.stroke_width(2)), "bar outline")?;
                }
            }
            DrawCommand::Symbol { center, radius, fill, stroke, .. } => {
                let r = px(*radius).max(1);
                draw(area, Circle::new(point(*center), r, fill.filled()), "symbol")?;
                draw(area, Circle::new(point(*center), r, stroke.stroke_width(1)), "symbol outline")?;
            }
            DrawCommand::Line { points, color, width } => {
                let path: Vec<(i32, i32)> = points.iter().copied().map(point).collect();
                draw(area, PathElement::new(path, color.stroke_width(*width)), "line")?;
            }
            DrawCommand::Text { pos, text, size, color, anchor, orientation } => {
                if labels {
                    draw_text(area, text, *pos, *size, *color, *anchor, *orientation)?;
                }
            }
            DrawCommand::Gradient { tl, br, bottom, top } => {
                let (x0, y0) = point(*tl);
                let (x1, y1) = point(*br);
                let rows = (y1 - y0).max(1);
                for row in 0..rows {
                    // row 0 is the top edge
                    let t = 1.0 - row as f64 / (rows - 1).max(1) as f64;
                    let color = mix(*bottom, *top, t);
                    draw(area, Rectangle::new([(x0, y0 + row), (x1, y0 + row + 1)], color.filled()), "legend")?;
                }
            }
            DrawCommand::Callout { subject_tl, subject_br, note_pos, title, label, wrap } => {
                draw(
                    area,
                    Rectangle::new([point(*subject_tl), point(*subject_br)], CALLOUT_COLOR.stroke_width(1)),
                    "callout subject",
                )?;
                let anchor = (subject_tl.0, subject_tl.1);
                draw(area, PathElement::new(vec![point(anchor), point(*note_pos)], CALLOUT_COLOR.stroke_width(1)), "callout connector")?;

                if labels {
                    let (nx, ny) = *note_pos;
                    draw_text(area, title, (nx, ny - 4.0), 14.0, CALLOUT_COLOR, Anchor::Start, Orientation::Horizontal)?;
                    for (i, line) in wrap_text(label, *wrap).iter().enumerate() {
                        let y = ny + 12.0 + i as f64 * 14.0;
                        draw_text(area, line, (nx, y), 12.0, CALLOUT_COLOR, Anchor::Start, Orientation::Horizontal)?;
                    }
                }
            }
        }
    }
    Ok(())
}

fn draw<DB, E>(area: &DrawingArea<DB, Shift>, element: E, what: &str) -> Result<()>
where
    DB: DrawingBackend,
    for<'a> &'a E: PointCollection<'a, (i32, i32)>,
    E: Drawable<DB>,
{
    area.draw(&element).map_err(|e| anyhow!("Failed to draw {}: {:?}", what, e))
}

fn draw_text<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    text: &str,
    pos: (f64, f64),
    size: f64,
    color: RGBColor,
    anchor: Anchor,
    orientation: Orientation,
) -> Result<()> {
    let h = match anchor {
        Anchor::Start => HPos::Left,
        Anchor::Middle => HPos::Center,
        Anchor::End => HPos::Right,
    };
    let mut style = (FONT, size).into_font().color(&color).pos(Pos::new(h, VPos::Center));
    if orientation == Orientation::Vertical {
        style = style.transform(FontTransform::Rotate270);
    }
    draw(area, Text::new(text.to_string(), point(pos), style), "text")
}

/// Greedy word wrap to roughly `width` pixels
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let max_chars = ((width as f64 / GLYPH_WIDTH) as usize).max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.len() + 1 + word.len() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_bar() -> SceneGraph {
        let mut scene = SceneGraph::new(40, 30);
        scene.commands.push(DrawCommand::Rect {
            tl: (10.0, 10.0),
            br: (30.0, 30.0),
            fill: RGBColor(0x08, 0x30, 0x6b),
            key: Some("A".into()),
            active: false,
        });
        scene.commands.push(DrawCommand::Text {
            pos: (5.0, 5.0),
            text: "A".into(),
            size: 12.0,
            color: RGBColor(0, 0, 0),
            anchor: Anchor::Start,
            orientation: Orientation::Horizontal,
        });
        scene
    }

    fn no_labels(format: OutputFormat) -> RenderOptions {
        RenderOptions { format, labels: false }
    }

    #[test]
    fn test_render_png_pixels() {
        let page = Page::row(vec![scene_with_bar(), SceneGraph::new(40, 30)]);
        let bytes = render_page(&page, &no_labels(OutputFormat::Png)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");

        let img = image::load_from_memory(&bytes).unwrap().to_rgb8();
        assert_eq!(img.dimensions(), (80, 30));
        assert_eq!(img.get_pixel(20, 20).0, [0x08, 0x30, 0x6b]);
        assert_eq!(img.get_pixel(5, 20).0, [0xff, 0xff, 0xff]);
        // second cell is blank
        assert_eq!(img.get_pixel(60, 20).0, [0xff, 0xff, 0xff]);
    }

    #[test]
    fn test_render_svg() {
        let page = Page::row(vec![scene_with_bar()]);
        let bytes = render_page(&page, &no_labels(OutputFormat::Svg)).unwrap();
        let svg = String::from_utf8(bytes).unwrap();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("#08306B") || svg.contains("#08306b"));
    }

    #[test]
    fn test_buffer_len_wide_page() {
        assert_eq!(buffer_len(40, 30), 3600);
        // 40000 * 40000 * 3 overflows u32
        assert_eq!(buffer_len(40_000, 40_000), 4_800_000_000);
    }

    #[test]
    fn test_wrap_text() {
        let lines = wrap_text("one two three four", 70);
        assert_eq!(lines, vec!["one two", "three four"]);
        assert!(wrap_text("", 70).is_empty());
    }
}
