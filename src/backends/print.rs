//! Page-fitted bitmap for printing.

use resvg::tiny_skia::{Color, Transform};

use crate::config::PageSize;
use crate::document::Document;
use crate::error::Result;

use super::raster::{encode_png, parse_tree, pixel_size, render_pixmap, to_rgba};
use super::ExportBackend;

const MM_PER_INCH: f32 = 25.4;

/// The drawing scaled to fit inside the page margins and centered on a white
/// page. Wide drawings get a landscape page.
#[derive(Debug, Clone, Copy)]
pub struct PrintBackend {
    pub page: PageSize,
    pub dpi: u32,
    pub margin_mm: f32,
}

impl Default for PrintBackend {
    fn default() -> Self {
        Self {
            page: PageSize::A4,
            dpi: 150,
            margin_mm: 10.0,
        }
    }
}

impl PrintBackend {
    fn mm_to_px(&self, mm: f32) -> f32 {
        (mm / MM_PER_INCH * self.dpi as f32).round()
    }

    /// Page size in pixels for a drawing of the given aspect.
    pub fn page_pixels(&self, landscape: bool) -> (f32, f32) {
        let (w, h) = self.page.size_mm();
        let (w, h) = (self.mm_to_px(w), self.mm_to_px(h));
        if landscape {
            (h, w)
        } else {
            (w, h)
        }
    }
}

impl ExportBackend for PrintBackend {
    fn name(&self) -> &str {
        "Print"
    }

    fn extension(&self) -> &str {
        "png"
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        let tree = parse_tree(doc)?;
        let size = tree.size();
        let (dw, dh) = (size.width(), size.height());

        let (pw, ph) = self.page_pixels(dw > dh);
        let margin = self.mm_to_px(self.margin_mm);
        let (aw, ah) = ((pw - 2.0 * margin).max(1.0), (ph - 2.0 * margin).max(1.0));
        let k = (aw / dw).min(ah / dh);
        let tx = (pw - dw * k) / 2.0;
        let ty = (ph - dh * k) / 2.0;

        let pixels = pixel_size(pw, ph)?;
        let pixmap = render_pixmap(
            &tree,
            pixels,
            Transform::from_row(k, 0.0, 0.0, k, tx, ty),
            Some(Color::WHITE),
        )?;
        tracing::debug!(page = ?self.page, dpi = self.dpi, scale = k, "laid out print page");
        encode_png(&to_rgba(&pixmap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(backend: PrintBackend, svg: &str) -> image::RgbaImage {
        let doc = Document::parse(svg).unwrap();
        let bytes = backend.render(&doc).unwrap();
        image::load_from_memory(&bytes).unwrap().to_rgba8()
    }

    #[test]
    fn a4_portrait_at_dpi() {
        let image = render(
            PrintBackend::default(),
            r#"<svg width="10" height="20"><rect width="10" height="20" fill="blue"/></svg>"#,
        );
        assert_eq!(image.dimensions(), (1240, 1754));
        // margin stays white, center is the drawing
        assert_eq!(image.get_pixel(5, 5).0, [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(620, 877).0, [0, 0, 255, 255]);
    }

    #[test]
    fn wide_drawing_uses_landscape_letter() {
        let backend = PrintBackend {
            page: PageSize::Letter,
            dpi: 100,
            margin_mm: 0.0,
        };
        let image = render(
            backend,
            r#"<svg width="40" height="10"><rect width="40" height="10" fill="red"/></svg>"#,
        );
        let (w, h) = image.dimensions();
        assert!(w > h);
        assert_eq!(backend.page_pixels(true), (w as f32, h as f32));
    }
}
