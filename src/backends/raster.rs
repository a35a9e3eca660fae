//! Bitmap exports rendered with resvg and encoded with `image`.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};
use resvg::tiny_skia::{self, Pixmap, Transform};
use resvg::usvg;

use crate::document::Document;
use crate::error::{Error, Result};
use crate::geometry::Affine;

use super::ExportBackend;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Largest bitmap side we agree to allocate.
const MAX_SIDE: f32 = 16384.0;

/// Rasterized at `scale` times the canvas size, alpha preserved.
#[derive(Debug, Clone, Copy)]
pub struct PngBackend {
    pub scale: f32,
}

impl Default for PngBackend {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

impl ExportBackend for PngBackend {
    fn name(&self) -> &str {
        "PNG"
    }

    fn extension(&self) -> &str {
        "png"
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        let image = rasterize(doc, self.scale)?;
        encode_png(&image)
    }
}

/// Rasterized and flattened onto white; JPEG has no alpha.
#[derive(Debug, Clone, Copy)]
pub struct JpegBackend {
    pub scale: f32,
    /// 1..=100
    pub quality: u8,
}

impl Default for JpegBackend {
    fn default() -> Self {
        Self {
            scale: 1.0,
            quality: 90,
        }
    }
}

impl ExportBackend for JpegBackend {
    fn name(&self) -> &str {
        "JPEG"
    }

    fn extension(&self) -> &str {
        "jpg"
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        let tree = parse_tree(doc)?;
        let size = tree.size();
        let (w, h) = pixel_size(size.width() * self.scale, size.height() * self.scale)?;
        let pixmap = render_pixmap(
            &tree,
            (w, h),
            Transform::from_scale(self.scale, self.scale),
            None,
        )?;

        // premultiplied over white: c + (255 - a)
        let mut rgb = Vec::with_capacity((w * h * 3) as usize);
        for p in pixmap.pixels() {
            let under = 255 - p.alpha();
            rgb.extend([
                p.red().saturating_add(under),
                p.green().saturating_add(under),
                p.blue().saturating_add(under),
            ]);
        }

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality.clamp(1, 100))
            .write_image(&rgb, w, h, ExtendedColorType::Rgb8)
            .map_err(|e| Error::Export(format!("jpeg encoding failed: {e}")))?;
        Ok(out)
    }
}

/// Render the document at `scale` times its canvas size.
pub fn rasterize(doc: &Document, scale: f32) -> Result<RgbaImage> {
    rasterize_tree(&parse_tree(doc)?, scale)
}

/// Render the document so that its longest side is `max_side` pixels.
pub fn thumbnail(doc: &Document, max_side: u32) -> Result<RgbaImage> {
    let tree = parse_tree(doc)?;
    let size = tree.size();
    let longest = size.width().max(size.height());
    rasterize_tree(&tree, max_side as f32 / longest)
}

fn rasterize_tree(tree: &usvg::Tree, scale: f32) -> Result<RgbaImage> {
    let size = tree.size();
    let (w, h) = pixel_size(size.width() * scale, size.height() * scale)?;
    let pixmap = render_pixmap(tree, (w, h), Transform::from_scale(scale, scale), None)?;
    Ok(to_rgba(&pixmap))
}

/// Render an already parsed tree onto a `size` bitmap through `view`, the
/// canvas-to-bitmap transform of an interactive viewport.
pub fn render_view(tree: &usvg::Tree, size: (u32, u32), view: Affine) -> Result<RgbaImage> {
    let transform = Transform::from_row(view.a, view.b, view.c, view.d, view.e, view.f);
    let pixmap = render_pixmap(tree, size, transform, None)?;
    Ok(to_rgba(&pixmap))
}

pub(crate) fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| Error::Export(format!("png encoding failed: {e}")))?;
    Ok(out)
}

/// Parse the serialized document with usvg. The SVG namespace is added when
/// missing since usvg only recognizes namespaced elements.
pub fn parse_tree(doc: &Document) -> Result<usvg::Tree> {
    parse_owned(doc.clone())
}

/// [`parse_tree`] for a document the caller has already copied and
/// possibly annotated.
pub(crate) fn parse_owned(mut copy: Document) -> Result<usvg::Tree> {
    if let Some(root) = copy.root_mut() {
        if root.attr("xmlns").is_none() {
            root.set_attr("xmlns", SVG_NS);
        }
    }
    usvg::Tree::from_str(&copy.serialize(), &usvg::Options::default())
        .map_err(|e| Error::Export(format!("cannot render document: {e}")))
}

pub(crate) fn pixel_size(width: f32, height: f32) -> Result<(u32, u32)> {
    let (w, h) = (width.ceil(), height.ceil());
    if w.is_nan() || h.is_nan() || w < 1.0 || h < 1.0 || w > MAX_SIDE || h > MAX_SIDE {
        return Err(Error::Export(format!("output size {w}x{h} out of range")));
    }
    Ok((w as u32, h as u32))
}

pub(crate) fn render_pixmap(
    tree: &usvg::Tree,
    (w, h): (u32, u32),
    transform: Transform,
    background: Option<tiny_skia::Color>,
) -> Result<Pixmap> {
    let mut pixmap = Pixmap::new(w, h)
        .ok_or_else(|| Error::Export(format!("cannot allocate {w}x{h} bitmap")))?;
    if let Some(bg) = background {
        pixmap.fill(bg);
    }
    resvg::render(tree, transform, &mut pixmap.as_mut());
    tracing::debug!(width = w, height = h, "rendered bitmap");
    Ok(pixmap)
}

pub(crate) fn to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let mut image = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in image.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    image
}
