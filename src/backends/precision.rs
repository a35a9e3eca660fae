//! Numeric precision rounding for smaller SVG exports.

use std::sync::LazyLock;

use regex::Regex;

use crate::document::Document;

/// Attributes whose values are purely geometric or numeric.
const GEOMETRIC: [&str; 24] = [
    "d",
    "points",
    "x",
    "y",
    "width",
    "height",
    "cx",
    "cy",
    "r",
    "rx",
    "ry",
    "x1",
    "y1",
    "x2",
    "y2",
    "dx",
    "dy",
    "transform",
    "viewBox",
    "stroke-width",
    "opacity",
    "fill-opacity",
    "stroke-opacity",
    "offset",
];

static NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?").expect("number pattern is valid")
});

/// Round one number to `places` decimals, without trailing zeros or `-0`.
pub fn format_number(value: f64, places: u8) -> String {
    let mut s = format!("{:.*}", usize::from(places), value);
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s = "0".to_string();
    }
    s
}

/// Append a rounded token, inserting a separator where it would otherwise
/// glue onto the previous number (`1.0.5` becomes `1 0.5`, not `10.5`).
fn push_token(out: &mut String, token: &str) {
    let glued = out.ends_with(|c: char| c.is_ascii_digit() || c == '.')
        && token.starts_with(|c: char| c.is_ascii_digit() || c == '.');
    if glued {
        out.push(' ');
    }
    out.push_str(token);
}

fn round_token(raw: &str, places: u8) -> String {
    match raw.parse::<f64>() {
        Ok(value) => format_number(value, places),
        Err(_) => raw.to_string(),
    }
}

/// Round every number inside `text`, leaving everything else in place.
pub fn round_numbers(text: &str, places: u8) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in NUMBER.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        last = m.end();
        push_token(&mut out, &round_token(m.as_str(), places));
    }
    out.push_str(&text[last..]);
    out
}

/// Round path data. The large-arc and sweep flags of `A`/`a` segments are
/// single digits that may be written without separators (`a5 5 0 011 1`),
/// so they are split off before numbers are matched.
pub fn round_path(d: &str, places: u8) -> String {
    let mut out = String::with_capacity(d.len());
    let mut command = b'M';
    let mut arg = 0usize;
    let mut i = 0;
    while let Some(c) = d[i..].chars().next() {
        if c.is_ascii_alphabetic() {
            command = c as u8;
            arg = 0;
            out.push(c);
            i += 1;
            continue;
        }
        let flag = command.eq_ignore_ascii_case(&b'A') && matches!(arg % 7, 3 | 4);
        if flag && matches!(c, '0' | '1') {
            push_token(&mut out, if c == '0' { "0" } else { "1" });
            arg += 1;
            i += 1;
        } else if let Some(m) = NUMBER.find_at(d, i).filter(|m| m.start() == i) {
            push_token(&mut out, &round_token(m.as_str(), places));
            arg += 1;
            i = m.end();
        } else {
            out.push(c);
            i += c.len_utf8();
        }
    }
    out
}

/// Round geometric attributes of every element in place. Returns the number
/// of attribute values that changed.
pub fn round_document(doc: &mut Document, places: u8) -> usize {
    let mut changed = 0;
    doc.walk_mut(|_, el| {
        for (key, value) in el.attributes.iter_mut() {
            if !GEOMETRIC.contains(&key.as_str()) {
                continue;
            }
            let rounded = if key == "d" {
                round_path(value, places)
            } else {
                round_numbers(value, places)
            };
            if rounded != *value {
                *value = rounded;
                changed += 1;
            }
        }
    });
    changed
}
