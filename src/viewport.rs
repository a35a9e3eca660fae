//! Zoom/pan state and the minimap projection.
//!
//! Purely presentational: nothing here reads or writes document content
//! beyond its canvas size.

use crate::geometry::{Affine, Point, Rect};

/// Allowed zoom range relative to fit-to-view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

/// Maps document canvas coordinates onto a screen area.
///
/// `scale` is relative to the fit-to-view scale and clamped to the limits;
/// `offset_x`/`offset_y` are the screen position of the document origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    limits: ZoomLimits,
    screen: (f32, f32),
    content: Rect,
}

impl Viewport {
    /// A viewport fitted to `content` on a `screen` of the given size.
    pub fn new(screen: (f32, f32), content: Rect, limits: ZoomLimits) -> Self {
        let mut vp = Self {
            scale: 1.0,
            offset_x: 0.0,
            offset_y: 0.0,
            limits,
            screen,
            content,
        };
        vp.reset();
        vp
    }

    /// Scale at which the whole content fits the screen.
    pub fn fit_scale(&self) -> f32 {
        if self.content.width <= 0.0 || self.content.height <= 0.0 {
            return 1.0;
        }
        (self.screen.0 / self.content.width).min(self.screen.1 / self.content.height)
    }

    /// Effective document-to-screen pixels factor.
    pub fn zoom_factor(&self) -> f32 {
        self.fit_scale() * self.scale
    }

    pub fn transform(&self) -> Affine {
        let k = self.zoom_factor();
        Affine::new(k, 0.0, 0.0, k, self.offset_x, self.offset_y)
    }

    pub fn to_screen(&self, p: Point) -> Point {
        self.transform().apply(p)
    }

    pub fn to_document(&self, p: Point) -> Point {
        let k = self.zoom_factor();
        Point::new((p.x - self.offset_x) / k, (p.y - self.offset_y) / k)
    }

    /// Back to scale 1 with the content centered.
    pub fn reset(&mut self) {
        self.scale = self.limits.min.max(1.0).min(self.limits.max);
        self.center_on(self.content.center());
    }

    /// Adopt new content bounds (e.g. after a load) and fit to them.
    pub fn fit_to_content(&mut self, content: Rect) {
        self.content = content;
        self.reset();
    }

    /// Screen size changed; keeps the document point at the screen center.
    pub fn resize(&mut self, screen: (f32, f32)) {
        let center = self.to_document(self.screen_center());
        self.screen = screen;
        self.center_on(center);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Multiply the scale by `factor`, keeping the document point under the
    /// screen `anchor` fixed. Returns `false` when already at the limit.
    pub fn zoom_at(&mut self, factor: f32, anchor: Point) -> bool {
        let next = (self.scale * factor).clamp(self.limits.min, self.limits.max);
        if (next - self.scale).abs() < f32::EPSILON {
            return false;
        }
        let doc_point = self.to_document(anchor);
        self.scale = next;
        let k = self.zoom_factor();
        self.offset_x = anchor.x - doc_point.x * k;
        self.offset_y = anchor.y - doc_point.y * k;
        true
    }

    pub fn zoom_in(&mut self, step: f32) -> bool {
        self.zoom_at(step, self.screen_center())
    }

    pub fn zoom_out(&mut self, step: f32) -> bool {
        self.zoom_at(1.0 / step, self.screen_center())
    }

    /// Move so that `doc_point` sits at the screen center; scale unchanged.
    pub fn center_on(&mut self, doc_point: Point) {
        let k = self.zoom_factor();
        let c = self.screen_center();
        self.offset_x = c.x - doc_point.x * k;
        self.offset_y = c.y - doc_point.y * k;
    }

    /// Visible screen area in document coordinates.
    pub fn visible_rect(&self) -> Rect {
        let tl = self.to_document(Point::new(0.0, 0.0));
        let br = self.to_document(Point::new(self.screen.0, self.screen.1));
        Rect::new(tl.x, tl.y, br.x - tl.x, br.y - tl.y)
    }

    pub fn content(&self) -> Rect {
        self.content
    }

    pub fn screen(&self) -> (f32, f32) {
        self.screen
    }

    fn screen_center(&self) -> Point {
        Point::new(self.screen.0 / 2.0, self.screen.1 / 2.0)
    }
}

/// Downsampled projection of the whole document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimap {
    /// Minimap pixel size.
    pub size: (f32, f32),
    content: Rect,
}

impl Minimap {
    /// Minimap whose longest side is `max_side`, keeping the content aspect.
    pub fn new(content: Rect, max_side: f32) -> Self {
        let longest = content.width.max(content.height).max(f32::EPSILON);
        let k = max_side / longest;
        Self {
            size: (content.width * k, content.height * k),
            content,
        }
    }

    fn factor(&self) -> f32 {
        if self.content.width <= 0.0 {
            return 1.0;
        }
        self.size.0 / self.content.width
    }

    pub fn to_minimap(&self, p: Point) -> Point {
        let k = self.factor();
        Point::new((p.x - self.content.x) * k, (p.y - self.content.y) * k)
    }

    pub fn to_document(&self, p: Point) -> Point {
        let k = self.factor();
        Point::new(p.x / k + self.content.x, p.y / k + self.content.y)
    }

    /// The viewport's visible area in minimap pixels.
    pub fn overlay(&self, viewport: &Viewport) -> Rect {
        let visible = viewport.visible_rect();
        let tl = self.to_minimap(Point::new(visible.x, visible.y));
        let k = self.factor();
        Rect::new(tl.x, tl.y, visible.width * k, visible.height * k)
    }

    /// Recenter the viewport on a clicked minimap point without zooming.
    pub fn recenter(&self, viewport: &mut Viewport, click: Point) {
        viewport.center_on(self.to_document(click));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    fn viewport() -> Viewport {
        Viewport::new((200.0, 100.0), Rect::new(0.0, 0.0, 100.0, 100.0), ZoomLimits::default())
    }

    #[test]
    fn fit_centers_content() {
        let vp = viewport();
        assert!(approx(vp.zoom_factor(), 1.0));
        let p = vp.to_screen(Point::new(50.0, 50.0));
        assert!(approx(p.x, 100.0) && approx(p.y, 50.0));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = viewport();
        assert!(!vp.zoom_out(2.0), "already at minimum");
        for _ in 0..10 {
            vp.zoom_in(2.0);
        }
        assert!(approx(vp.scale, 5.0));
        assert!(!vp.zoom_in(2.0));
    }

    #[test]
    fn zoom_keeps_anchor_fixed() {
        let mut vp = viewport();
        let anchor = Point::new(120.0, 30.0);
        let before = vp.to_document(anchor);
        assert!(vp.zoom_at(2.0, anchor));
        let after = vp.to_document(anchor);
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
    }

    #[test]
    fn pan_and_reset() {
        let mut vp = viewport();
        let original = vp.clone();
        vp.zoom_in(2.0);
        vp.pan(15.0, -5.0);
        assert_ne!(vp, original);
        vp.reset();
        assert_eq!(vp, original);
    }

    #[test]
    fn visible_rect_shrinks_when_zoomed() {
        let mut vp = viewport();
        let full = vp.visible_rect();
        vp.zoom_in(2.0);
        let zoomed = vp.visible_rect();
        assert!(approx(zoomed.width, full.width / 2.0));
        assert!(approx(zoomed.center().x, 50.0));
    }

    #[test]
    fn minimap_overlay_and_recenter() {
        let mut vp = viewport();
        vp.zoom_in(2.0);
        let map = Minimap::new(vp.content(), 50.0);
        assert_eq!(map.size, (50.0, 50.0));

        let overlay = map.overlay(&vp);
        assert!(approx(overlay.center().x, 25.0));

        let scale = vp.scale;
        map.recenter(&mut vp, Point::new(10.0, 40.0));
        assert!(approx(vp.scale, scale), "recenter must not zoom");
        let center = vp.visible_rect().center();
        assert!(approx(center.x, 20.0) && approx(center.y, 80.0));
    }

    #[test]
    fn resize_keeps_center() {
        let mut vp = viewport();
        vp.zoom_at(2.0, Point::new(150.0, 50.0));
        let before = vp.visible_rect().center();
        vp.resize((400.0, 300.0));
        let after = vp.visible_rect().center();
        assert!(approx(before.x, after.x) && approx(before.y, after.y));
    }
}
