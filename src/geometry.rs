//! Canvas coordinates and the affine maps between canvas and screen.

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges are inclusive.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// 2D affine matrix `[a c e; b d f]`, laid out like tiny-skia's `Transform`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
}

impl Affine {
    pub const fn new(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self { a, b, c, d, e, f }
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::new(sx, 0.0, 0.0, sy, 0.0, 0.0)
    }

    pub fn apply(self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.e,
            self.b * p.x + self.d * p.y + self.f,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_scales_then_translates() {
        let t = Affine::new(2.0, 0.0, 0.0, 3.0, 10.0, -5.0);
        assert_eq!(t.apply(Point::new(1.0, 2.0)), Point::new(12.0, 1.0));
        assert_eq!(Affine::scale(0.5, 0.5).apply(Point::new(4.0, 8.0)), Point::new(2.0, 4.0));
    }

    #[test]
    fn rect_edges_are_inclusive() {
        let r = Rect::new(1.0, 2.0, 10.0, 5.0);
        assert!(r.contains(Point::new(11.0, 7.0)));
        assert!(r.contains(Point::new(1.0, 2.0)));
        assert!(!r.contains(Point::new(11.5, 7.0)));
        assert_eq!(r.center(), Point::new(6.0, 4.5));
    }
}
