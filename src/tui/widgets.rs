use image::RgbaImage;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Clear, Paragraph, Widget, Wrap};

use crate::color::Color as AppColor;
use crate::geometry::Rect as DocRect;
use crate::pipeline::extract::Palette;

/// Width of one swatch in cells, gap excluded.
pub const SWATCH_WIDTH: u16 = 9;
const SWATCH_GAP: u16 = 1;
const LEFT_PAD: u16 = 1;

/// Background shown through transparent pixels.
const CHECKER: [(u8, u8, u8); 2] = [(48, 48, 48), (72, 72, 72)];

fn to_color(c: &AppColor) -> Color {
    Color::Rgb(c.r, c.g, c.b)
}

/// Choose black or white foreground for readable text on the given background.
fn contrast_fg(c: &AppColor) -> Color {
    if c.relative_luminance() > 0.4 {
        Color::Black
    } else {
        Color::White
    }
}

/// Swatches that fit on one row of a palette panel `width` cells wide.
pub fn columns_for(width: u16) -> usize {
    let inner = width.saturating_sub(2 + LEFT_PAD);
    usize::from(inner / (SWATCH_WIDTH + SWATCH_GAP)).max(1)
}

/// Swatch index under the terminal cell (`x`, `y`) of a palette panel drawn
/// in `area`.
pub fn swatch_at(area: Rect, columns: usize, count: usize, x: u16, y: u16) -> Option<usize> {
    let inner = Block::bordered().inner(area);
    if !inner.contains(Position::new(x, y)) {
        return None;
    }
    let dx = x - inner.x;
    if dx < LEFT_PAD {
        return None;
    }
    let col = usize::from((dx - LEFT_PAD) / (SWATCH_WIDTH + SWATCH_GAP));
    if col >= columns {
        return None;
    }
    let index = usize::from(y - inner.y) * columns + col;
    (index < count).then_some(index)
}

/// The document palette as a grid of swatches labelled with their hex code,
/// followed by details of the selected entry and the recent colors.
pub struct PaletteWidget<'a> {
    palette: &'a Palette,
    selected: Option<usize>,
    columns: usize,
    recent: &'a [AppColor],
}

impl<'a> PaletteWidget<'a> {
    pub fn new(
        palette: &'a Palette,
        selected: Option<usize>,
        columns: usize,
        recent: &'a [AppColor],
    ) -> Self {
        Self {
            palette,
            selected,
            columns: columns.max(1),
            recent,
        }
    }
}

fn swatch_span(c: &AppColor, selected: bool) -> Span<'static> {
    let mut style = Style::default().bg(to_color(c)).fg(contrast_fg(c));
    if selected {
        style = style.add_modifier(Modifier::BOLD | Modifier::UNDERLINED | Modifier::REVERSED);
    }
    Span::styled(format!("{:^9}", c.to_hex()), style)
}

impl Widget for PaletteWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title(format!("Palette ({})", self.palette.len()));
        let inner = block.inner(area);
        block.render(area, buf);

        if self.palette.is_empty() {
            Paragraph::new(" no colors").render(inner, buf);
            return;
        }

        let entries = self.palette.entries();
        let mut lines: Vec<Line> = entries
            .chunks(self.columns)
            .enumerate()
            .map(|(row, chunk)| {
                let mut spans = vec![Span::raw(" ")];
                for (offset, entry) in chunk.iter().enumerate() {
                    let i = row * self.columns + offset;
                    spans.push(swatch_span(&entry.color, self.selected == Some(i)));
                    spans.push(Span::raw(" "));
                }
                Line::from(spans)
            })
            .collect();

        if let Some(entry) = self.selected.and_then(|i| entries.get(i)) {
            let forms: Vec<&str> = entry.original_forms.iter().map(String::as_str).collect();
            lines.push(Line::from(""));
            lines.push(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "  ",
                    Style::default().bg(to_color(&entry.color)),
                ),
                Span::styled(
                    format!(" {}", entry.color.to_hex()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!("  ×{}  {}", entry.count, entry.role)),
            ]));
            lines.push(Line::from(Span::styled(
                format!(" as {}", forms.join(", ")),
                Style::default().fg(Color::DarkGray),
            )));
        }

        if !self.recent.is_empty() {
            lines.push(Line::from(""));
            let mut spans = vec![Span::styled(" recent ", Style::default().fg(Color::DarkGray))];
            for c in self.recent {
                spans.push(Span::styled("  ", Style::default().bg(to_color(c))));
                spans.push(Span::raw(" "));
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}

/// Color of a bitmap pixel composited over the checkerboard.
fn composite(image: &RgbaImage, x: u32, y: u32) -> Color {
    let (br, bg, bb) = CHECKER[((x / 4 + y / 4) % 2) as usize];
    let Some(px) = image.get_pixel_checked(x, y) else {
        return Color::Rgb(br, bg, bb);
    };
    let [r, g, b, a] = px.0;
    let mix = |fg: u8, bg: u8| -> u8 {
        ((u16::from(fg) * u16::from(a) + u16::from(bg) * (255 - u16::from(a))) / 255) as u8
    };
    Color::Rgb(mix(r, br), mix(g, bg), mix(b, bb))
}

/// Draws a bitmap with two pixels per cell using upper half blocks.
fn render_half_blocks(image: &RgbaImage, area: Rect, buf: &mut Buffer) {
    for row in 0..area.height {
        for col in 0..area.width {
            let (x, y) = (u32::from(col), u32::from(row) * 2);
            let top = composite(image, x, y);
            let bottom = composite(image, x, y + 1);
            if let Some(cell) = buf.cell_mut(Position::new(area.x + col, area.y + row)) {
                cell.set_symbol("▀").set_fg(top).set_bg(bottom);
            }
        }
    }
}

/// The rendered document at the current zoom.
pub struct CanvasWidget<'a> {
    image: Option<&'a RgbaImage>,
    message: Option<&'a str>,
}

impl<'a> CanvasWidget<'a> {
    pub fn new(image: Option<&'a RgbaImage>, message: Option<&'a str>) -> Self {
        Self { image, message }
    }
}

impl Widget for CanvasWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.image {
            Some(image) => render_half_blocks(image, area, buf),
            None => {
                let text = self.message.unwrap_or("nothing to show");
                Paragraph::new(text)
                    .wrap(Wrap { trim: true })
                    .alignment(Alignment::Center)
                    .render(area, buf);
            }
        }
    }
}

/// Thumbnail of the whole document with the visible area outlined.
pub struct MinimapWidget<'a> {
    image: Option<&'a RgbaImage>,
    /// Visible area in minimap pixels.
    overlay: Option<DocRect>,
}

impl<'a> MinimapWidget<'a> {
    pub fn new(image: Option<&'a RgbaImage>, overlay: Option<DocRect>) -> Self {
        Self { image, overlay }
    }
}

impl Widget for MinimapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::bordered().title("Map");
        let inner = block.inner(area);
        block.render(area, buf);
        let Some(image) = self.image else {
            return;
        };
        render_half_blocks(image, inner, buf);

        let Some(ov) = self.overlay else {
            return;
        };
        let max_x = f32::from(inner.width.saturating_sub(1));
        let max_y = f32::from(inner.height.saturating_sub(1));
        let x0 = ov.x.floor().clamp(0.0, max_x) as u16;
        let x1 = (ov.right().ceil() - 1.0).clamp(0.0, max_x) as u16;
        let y0 = (ov.y / 2.0).floor().clamp(0.0, max_y) as u16;
        let y1 = ((ov.bottom() / 2.0).ceil() - 1.0).clamp(0.0, max_y) as u16;
        let outline = Style::default().fg(Color::Yellow);
        for row in y0..=y1 {
            for col in x0..=x1 {
                let edge_x = col == x0 || col == x1;
                let edge_y = row == y0 || row == y1;
                if !(edge_x || edge_y) {
                    continue;
                }
                let symbol = match (edge_x, edge_y) {
                    (true, true) => "+",
                    (true, false) => "│",
                    _ => "─",
                };
                if let Some(cell) = buf.cell_mut(Position::new(inner.x + col, inner.y + row)) {
                    cell.set_symbol(symbol).set_style(outline);
                }
            }
        }
    }
}

/// Key reference, shown on first launch and on `?`.
pub struct HelpOverlay;

pub const HELP: &[(&str, &str)] = &[
    ("arrows / hjkl", "move in the palette"),
    ("click swatch", "select a color"),
    ("click canvas", "pick the color under the pointer"),
    ("enter / r", "replace the selected color"),
    ("e", "erase (make transparent)"),
    ("p", "remap the palette by rank"),
    ("n", "reduce to N colors"),
    ("u / U", "undo / redo"),
    ("R", "reset to original"),
    ("+ / - / wheel", "zoom"),
    ("shift+arrows / HJKL", "pan"),
    ("0", "fit to view"),
    ("click map", "recenter the view"),
    ("s", "save"),
    ("? / q", "help / quit"),
];

impl Widget for HelpOverlay {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = 52.min(area.width);
        let height = (HELP.len() as u16 + 4).min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );
        Clear.render(popup, buf);
        let lines: Vec<Line> = HELP
            .iter()
            .map(|(keys, what)| {
                Line::from(vec![
                    Span::styled(format!(" {keys:<20}"), Style::default().fg(Color::Yellow)),
                    Span::raw(*what),
                ])
            })
            .chain([Line::from(""), Line::from(" any key to close").dark_gray()])
            .collect();
        Paragraph::new(lines)
            .block(Block::bordered().title("Keys"))
            .render(popup, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::pipeline::extract::extract;

    fn palette() -> Palette {
        let doc = Document::parse(
            r##"<svg><rect fill="#ff0000"/><rect fill="#00ff00"/><rect fill="#0000ff"/></svg>"##,
        )
        .unwrap();
        extract(&doc)
    }

    fn text(buf: &Buffer) -> String {
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn columns_fit_width() {
        assert_eq!(columns_for(33), 3);
        assert_eq!(columns_for(5), 1);
    }

    #[test]
    fn swatch_hit_testing() {
        let area = Rect::new(0, 0, 33, 10);
        // inner starts at (1, 1), first swatch after one cell of padding
        assert_eq!(swatch_at(area, 3, 3, 2, 1), Some(0));
        assert_eq!(swatch_at(area, 3, 3, 12, 1), Some(1));
        assert_eq!(swatch_at(area, 3, 3, 2, 2), None);
        assert_eq!(swatch_at(area, 3, 5, 12, 2), Some(4));
        assert_eq!(swatch_at(area, 3, 3, 0, 0), None);
    }

    #[test]
    fn palette_shows_hex_and_selection_details() {
        let palette = palette();
        let recent = [AppColor::BLACK];
        let area = Rect::new(0, 0, 40, 10);
        let mut buf = Buffer::empty(area);
        PaletteWidget::new(&palette, Some(1), 3, &recent).render(area, &mut buf);
        let text = text(&buf);
        assert!(text.contains("Palette (3)"));
        assert!(text.contains("#ff0000"));
        assert!(text.contains("#0000ff"));
        assert!(text.contains("×1  fill"));
        assert!(text.contains("recent"));
    }

    #[test]
    fn canvas_draws_half_blocks() {
        let image = RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        CanvasWidget::new(Some(&image), None).render(area, &mut buf);
        let cell = &buf[(1, 1)];
        assert_eq!(cell.symbol(), "▀");
        assert_eq!(cell.fg, Color::Rgb(255, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(255, 0, 0));
    }

    #[test]
    fn transparent_pixels_show_checker() {
        let image = RgbaImage::new(2, 2);
        assert_eq!(composite(&image, 0, 0), Color::Rgb(48, 48, 48));
    }

    #[test]
    fn minimap_outlines_overlay() {
        let image = RgbaImage::from_pixel(10, 10, image::Rgba([0, 0, 255, 255]));
        let area = Rect::new(0, 0, 12, 7);
        let mut buf = Buffer::empty(area);
        MinimapWidget::new(Some(&image), Some(DocRect::new(2.0, 2.0, 4.0, 4.0))).render(area, &mut buf);
        // overlay cells x 2..=5, rows 1..=2, offset by the border
        assert_eq!(buf[(3, 2)].symbol(), "+");
        assert_eq!(buf[(4, 2)].symbol(), "─");
        assert_eq!(buf[(6, 3)].symbol(), "+");
    }
}
