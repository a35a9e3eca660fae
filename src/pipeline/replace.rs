use std::collections::HashMap;

use crate::color::Color;
use crate::document::{Document, Element};
use crate::pipeline::extract::Channel;
use crate::style::StyleDecls;

/// The literal paint written by the eraser.
pub const TRANSPARENT: &str = "transparent";

/// A replacement paint: a real color or the transparency sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Color(Color),
    Transparent,
}

impl Target {
    /// `transparent` is taken verbatim; anything else must normalize.
    pub fn parse(input: &str) -> Option<Self> {
        if input.trim() == TRANSPARENT {
            return Some(Target::Transparent);
        }
        Color::parse(input).map(Target::Color)
    }

    /// Value written into attributes and style declarations.
    pub fn paint_value(self) -> String {
        match self {
            Target::Color(c) => c.to_hex(),
            Target::Transparent => TRANSPARENT.to_string(),
        }
    }
}

impl From<Color> for Target {
    fn from(color: Color) -> Self {
        Target::Color(color)
    }
}

/// Replace every paint normalizing to `from` with `to`.
///
/// Mutates `doc` in place; callers hand in a working copy. Returns the number
/// of paint occurrences rewritten. Unparseable input or an identical target
/// is a no-op returning 0.
pub fn replace_color(doc: &mut Document, from: &str, to: &str) -> usize {
    let (Some(from), Some(to)) = (Color::parse(from), Target::parse(to)) else {
        tracing::debug!(from, to, "replace skipped: color did not normalize");
        return 0;
    };
    if to == Target::Color(from) {
        return 0;
    }
    apply_mapping(doc, &HashMap::from([(from, to)]))
}

/// Rewrite paints through `mapping` in a single pass.
///
/// Each paint is looked up by its original value only, so permutations
/// (A→B together with B→A) never chain.
pub fn apply_mapping(doc: &mut Document, mapping: &HashMap<Color, Target>) -> usize {
    if mapping.is_empty() {
        return 0;
    }
    let mut rewritten = 0;
    doc.walk_mut(|_, el| rewritten += rewrite_element(el, mapping));
    tracing::debug!(entries = mapping.len(), rewritten, "applied color mapping");
    rewritten
}

fn lookup(mapping: &HashMap<Color, Target>, raw: &str) -> Option<String> {
    let color = Color::parse(raw)?;
    mapping.get(&color).map(|t| t.paint_value())
}

fn rewrite_element(el: &mut Element, mapping: &HashMap<Color, Target>) -> usize {
    let mut changed = 0;
    for channel in Channel::ALL {
        let key = channel.property();
        if let Some(new_value) = el.attr(key).and_then(|v| lookup(mapping, v)) {
            el.set_attr(key, &new_value);
            changed += 1;
        }
    }

    if let Some(style_text) = el.attr("style") {
        let mut style = StyleDecls::parse(style_text);
        let mut style_changed = 0;
        for channel in Channel::ALL {
            style_changed += style.rewrite(channel.property(), |v| lookup(mapping, v));
        }
        if style_changed > 0 {
            el.set_attr("style", &style.to_string());
            changed += style_changed;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::extract::{extract, Role};

    fn doc(body: &str) -> Document {
        Document::parse(&format!("<svg>{body}</svg>")).unwrap()
    }

    fn attrs(doc: &Document, key: &str) -> Vec<Option<String>> {
        let mut out = Vec::new();
        doc.walk(|id, el| {
            if id.0 > 0 {
                out.push(el.attr(key).map(str::to_string));
            }
        });
        out
    }

    #[test]
    fn single_replace_scenario() {
        let mut d =
            doc(r##"<rect fill="#FF0000"/><rect fill="#FF0000"/><rect fill="#00FF00"/>"##);
        assert_eq!(replace_color(&mut d, "#FF0000", "#0000FF"), 2);
        let palette: Vec<_> = extract(&d)
            .iter()
            .map(|e| (e.color.to_hex(), e.count, e.role))
            .collect();
        assert_eq!(
            palette,
            [
                ("#0000ff".to_string(), 2, Role::Fill),
                ("#00ff00".to_string(), 1, Role::Fill)
            ]
        );
    }

    #[test]
    fn matches_across_notations() {
        let mut d = doc(r#"<rect fill="red"/><rect stroke="rgb(255,0,0)"/><rect fill="hsl(0,100%,50%)"/>"#);
        assert_eq!(replace_color(&mut d, "#f00", "navy"), 3);
        assert_eq!(
            attrs(&d, "fill"),
            [Some("#000080".into()), None, Some("#000080".into())]
        );
        assert_eq!(attrs(&d, "stroke")[1].as_deref(), Some("#000080"));
    }

    #[test]
    fn eraser_writes_sentinel_verbatim() {
        let mut d = doc(r#"<rect fill="red" style="stroke:red"/><rect fill="blue"/>"#);
        assert_eq!(replace_color(&mut d, "#FF0000", "transparent"), 2);
        assert_eq!(attrs(&d, "fill")[0].as_deref(), Some("transparent"));
        assert_eq!(attrs(&d, "style")[0].as_deref(), Some("stroke:transparent"));
        assert_eq!(attrs(&d, "fill")[1].as_deref(), Some("blue"));
        assert_eq!(extract(&d).len(), 1, "erased paints drop out of the palette");
    }

    #[test]
    fn style_rewrite_preserves_other_declarations() {
        let mut d = doc(r#"<path style="opacity:.5; fill : red ;stroke-width:2"/>"#);
        replace_color(&mut d, "red", "#00ff00");
        assert_eq!(
            attrs(&d, "style")[0].as_deref(),
            Some("opacity:.5; fill : #00ff00 ;stroke-width:2")
        );
    }

    #[test]
    fn only_effective_style_declaration_is_replaced() {
        let mut d = doc(r#"<rect style="fill:red;fill:blue"/>"#);
        assert_eq!(extract(&d).len(), 1);
        assert_eq!(replace_color(&mut d, "red", "lime"), 0);
        assert_eq!(attrs(&d, "style")[0].as_deref(), Some("fill:red;fill:blue"));

        assert_eq!(replace_color(&mut d, "blue", "lime"), 1);
        assert_eq!(attrs(&d, "style")[0].as_deref(), Some("fill:red;fill:#00ff00"));
        assert_eq!(extract(&d).entries()[0].color, Color::new(0, 255, 0));
    }

    #[test]
    fn non_matching_paints_untouched() {
        let mut d = doc(r#"<rect fill="Blue" stroke="none"/>"#);
        assert_eq!(replace_color(&mut d, "red", "green"), 0);
        assert_eq!(attrs(&d, "fill")[0].as_deref(), Some("Blue"));
        assert_eq!(attrs(&d, "stroke")[0].as_deref(), Some("none"));
    }

    #[test]
    fn invalid_colors_are_noops() {
        let mut d = doc(r#"<rect fill="red"/>"#);
        let before = d.clone();
        assert_eq!(replace_color(&mut d, "not-a-color", "blue"), 0);
        assert_eq!(replace_color(&mut d, "red", "bogus"), 0);
        assert_eq!(replace_color(&mut d, "red", "#f00"), 0);
        assert_eq!(d, before);
    }

    #[test]
    fn mapping_permutation_does_not_chain() {
        let mut d = doc(r#"<rect fill="red"/><rect fill="blue"/>"#);
        let red = Color::new(255, 0, 0);
        let blue = Color::new(0, 0, 255);
        let mapping = HashMap::from([(red, Target::Color(blue)), (blue, Target::Color(red))]);
        assert_eq!(apply_mapping(&mut d, &mapping), 2);
        assert_eq!(
            attrs(&d, "fill"),
            [Some("#0000ff".into()), Some("#ff0000".into())]
        );
    }
}
