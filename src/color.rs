use std::fmt;

use palette::{FromColor, Hsl, IntoColor, Lab, Srgb};
use serde::{Serialize, Serializer};

/// Core color type used throughout the engine.
/// Wraps sRGB u8 components plus alpha and provides conversions to perceptual color spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Paint keywords that never resolve to a color.
const NON_COLORS: [&str; 2] = ["none", "transparent"];

/// Normalize any supported color notation to its canonical hex form.
///
/// Returns `None` for `none`, `transparent`, empty input and anything that
/// fails to parse. The result is lowercase `#rrggbb`, or `#rrggbbaa` when the
/// alpha channel is not fully opaque.
pub fn normalize(input: &str) -> Option<String> {
    Color::parse(input).map(Color::to_hex)
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse hex, named, `rgb()`/`rgba()` and `hsl()`/`hsla()` notations.
    /// Case-insensitive; surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let s = input.trim().to_ascii_lowercase();
        if s.is_empty() || NON_COLORS.contains(&s.as_str()) {
            return None;
        }
        if let Some(hex) = s.strip_prefix('#') {
            return Self::from_hex_digits(hex);
        }
        if let Some((func, args)) = split_function(&s) {
            return match func {
                "rgb" | "rgba" => parse_rgb_args(args),
                "hsl" | "hsla" => parse_hsl_args(args),
                _ => None,
            };
        }
        palette::named::from_str(&s).map(Self::from_srgb_u8)
    }

    /// Parse a 3, 4, 6 or 8 digit hex body (without the leading `#`).
    fn from_hex_digits(hex: &str) -> Option<Self> {
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        match hex.len() {
            3 => Some(Self::new(nibble(0)?, nibble(1)?, nibble(2)?)),
            4 => Some(Self::with_alpha(nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)?)),
            6 => Some(Self::new(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::with_alpha(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }

    /// Serialize to lowercase hex; the alpha pair is only emitted when not opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    pub fn is_opaque(self) -> bool {
        self.a == 255
    }

    /// Convert to `palette::Srgb<u8>`, dropping alpha.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Create an opaque color from `palette::Srgb<u8>`.
    pub fn from_srgb_u8(srgb: Srgb<u8>) -> Self {
        Self::new(srgb.red, srgb.green, srgb.blue)
    }

    /// Convert to CIELAB (for nearest-anchor quantization).
    pub fn to_lab(self) -> Lab {
        let srgb_f32: Srgb<f32> = self.to_srgb_u8().into_format();
        srgb_f32.into_color()
    }

    /// Squared CIE76 distance in LAB space. `ΔE² < 25` means `ΔE < 5`.
    pub fn delta_e_sq(self, other: Color) -> f32 {
        let a = self.to_lab();
        let b = other.to_lab();
        (a.l - b.l).powi(2) + (a.a - b.a).powi(2) + (a.b - b.b).powi(2)
    }

    /// WCAG 2.0 relative luminance.
    ///
    /// Linearizes each sRGB channel, then computes the weighted sum.
    pub fn relative_luminance(self) -> f32 {
        fn linearize(c: u8) -> f32 {
            let c = c as f32 / 255.0;
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        let r = linearize(self.r);
        let g = linearize(self.g);
        let b = linearize(self.b);
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Split `name(args)` into its parts. The closing paren must end the input.
fn split_function(s: &str) -> Option<(&str, &str)> {
    let open = s.find('(')?;
    let body = s[open + 1..].strip_suffix(')')?;
    Some((s[..open].trim(), body))
}

/// Split functional arguments on commas, whitespace and the `/` alpha separator.
/// Returns the color channels and an optional alpha component.
fn split_args(args: &str) -> Option<(Vec<&str>, Option<&str>)> {
    let (channels, slash_alpha) = match args.split_once('/') {
        Some((c, a)) => (c, Some(a.trim())),
        None => (args, None),
    };
    let mut parts: Vec<&str> = channels
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();
    let alpha = match (slash_alpha, parts.len()) {
        (Some(a), 3) => Some(a),
        (None, 4) => parts.pop(),
        (None, 3) => None,
        _ => return None,
    };
    Some((parts, alpha))
}

fn parse_number(s: &str) -> Option<f32> {
    let v: f32 = s.parse().ok()?;
    v.is_finite().then_some(v)
}

/// Parse an alpha component: `0.5` or `50%`.
fn parse_alpha(s: &str) -> Option<u8> {
    let v = match s.strip_suffix('%') {
        Some(p) => parse_number(p)? / 100.0,
        None => parse_number(s)?,
    };
    Some((v.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn parse_rgb_args(args: &str) -> Option<Color> {
    let (parts, alpha) = split_args(args)?;
    let channel = |s: &str| -> Option<u8> {
        let v = match s.strip_suffix('%') {
            Some(p) => parse_number(p)? * 2.55,
            None => parse_number(s)?,
        };
        Some(v.clamp(0.0, 255.0).round() as u8)
    };
    let a = match alpha {
        Some(a) => parse_alpha(a)?,
        None => 255,
    };
    Some(Color::with_alpha(
        channel(parts[0])?,
        channel(parts[1])?,
        channel(parts[2])?,
        a,
    ))
}

/// Hue in degrees; accepts `deg`, `rad`, `grad` and `turn` units.
fn parse_hue(s: &str) -> Option<f32> {
    if let Some(v) = s.strip_suffix("deg") {
        parse_number(v)
    } else if let Some(v) = s.strip_suffix("grad") {
        parse_number(v).map(|g| g * 0.9)
    } else if let Some(v) = s.strip_suffix("rad") {
        parse_number(v).map(f32::to_degrees)
    } else if let Some(v) = s.strip_suffix("turn") {
        parse_number(v).map(|t| t * 360.0)
    } else {
        parse_number(s)
    }
}

fn parse_hsl_args(args: &str) -> Option<Color> {
    let (parts, alpha) = split_args(args)?;
    let percent = |s: &str| -> Option<f32> {
        let v = parse_number(s.strip_suffix('%').unwrap_or(s))?;
        Some((v / 100.0).clamp(0.0, 1.0))
    };
    let hue = parse_hue(parts[0])?.rem_euclid(360.0);
    let hsl: Hsl = Hsl::new(hue, percent(parts[1])?, percent(parts[2])?);
    let srgb: Srgb<u8> = Srgb::<f32>::from_color(hsl).into_format();
    let a = match alpha {
        Some(a) => parse_alpha(a)?,
        None => 255,
    };
    Some(Color::with_alpha(srgb.red, srgb.green, srgb.blue, a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_six_digits() {
        assert_eq!(normalize("#ff8800").as_deref(), Some("#ff8800"));
    }

    #[test]
    fn hex_uppercase_input() {
        assert_eq!(normalize("#FF8800").as_deref(), Some("#ff8800"));
    }

    #[test]
    fn hex_short_forms_expand() {
        assert_eq!(normalize("#f80").as_deref(), Some("#ff8800"));
        assert_eq!(normalize("#f808").as_deref(), Some("#ff880088"));
    }

    #[test]
    fn hex_opaque_alpha_collapses() {
        assert_eq!(normalize("#112233ff").as_deref(), Some("#112233"));
        assert_eq!(normalize("#11223380").as_deref(), Some("#11223380"));
    }

    #[test]
    fn hex_invalid_length() {
        assert!(normalize("#ff88").is_some(), "4 digits carry alpha");
        assert!(normalize("#ff88000").is_none());
        assert!(normalize("#").is_none());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(normalize("#gggggg").is_none());
    }

    #[test]
    fn non_colors_rejected() {
        for s in ["none", "NONE", "transparent", "", "   ", "currentColor", "url(#grad)"] {
            assert!(normalize(s).is_none(), "{s:?} should not normalize");
        }
    }

    #[test]
    fn named_colors() {
        assert_eq!(normalize("red").as_deref(), Some("#ff0000"));
        assert_eq!(normalize("RebeccaPurple").as_deref(), Some("#663399"));
        assert_eq!(normalize(" navy ").as_deref(), Some("#000080"));
    }

    #[test]
    fn rgb_functional() {
        assert_eq!(normalize("rgb(255, 0, 0)").as_deref(), Some("#ff0000"));
        assert_eq!(normalize("RGB(0 128 255)").as_deref(), Some("#0080ff"));
        assert_eq!(normalize("rgb(100%, 50%, 0%)").as_deref(), Some("#ff8000"));
    }

    #[test]
    fn rgba_functional_alpha() {
        assert_eq!(normalize("rgba(255, 0, 0, 0.5)").as_deref(), Some("#ff000080"));
        assert_eq!(normalize("rgb(255 0 0 / 50%)").as_deref(), Some("#ff000080"));
        assert_eq!(normalize("rgba(255, 0, 0, 1)").as_deref(), Some("#ff0000"));
    }

    #[test]
    fn rgb_wrong_arity_rejected() {
        assert!(normalize("rgb(1, 2)").is_none());
        assert!(normalize("rgb(1, 2, 3, 4, 5)").is_none());
        assert!(normalize("rgb(a, b, c)").is_none());
    }

    #[test]
    fn hsl_functional() {
        assert_eq!(normalize("hsl(0, 100%, 50%)").as_deref(), Some("#ff0000"));
        assert_eq!(normalize("hsl(120deg 100% 50%)").as_deref(), Some("#00ff00"));
        assert_eq!(normalize("hsl(0.5turn, 100%, 50%)").as_deref(), Some("#00ffff"));
        assert_eq!(normalize("hsla(240, 100%, 50%, 0)").as_deref(), Some("#0000ff00"));
    }

    #[test]
    fn normalization_is_idempotent() {
        for s in ["#ABC", "red", "rgb(1,2,3)", "hsla(10, 20%, 30%, .4)", "#12345678"] {
            let once = normalize(s).unwrap();
            assert_eq!(normalize(&once).as_deref(), Some(once.as_str()), "input {s}");
        }
    }

    #[test]
    fn delta_e_zero_for_same_color() {
        let c = Color::new(12, 200, 90);
        assert!(c.delta_e_sq(c) < 1e-6);
        assert!(c.delta_e_sq(Color::BLACK) > 25.0);
    }

    #[test]
    fn relative_luminance_extremes() {
        assert!(Color::BLACK.relative_luminance() < 0.001);
        assert!((Color::WHITE.relative_luminance() - 1.0).abs() < 0.001);
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
