use std::collections::HashMap;

use crate::color::Color;
use crate::pipeline::extract::Palette;
use crate::pipeline::replace::Target;

/// Requested size for a reduction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReduceTarget {
    /// Keep every color.
    Original,
    Count(usize),
}

/// Map the i-th most frequent palette color to the i-th target.
///
/// Only the first `min(current, targets)` ranks are paired; entries where the
/// target equals the source are left out.
pub fn map_to_palette(current: &Palette, targets: &[Target]) -> HashMap<Color, Target> {
    current
        .iter()
        .zip(targets)
        .filter(|(entry, target)| **target != Target::Color(entry.color))
        .map(|(entry, target)| (entry.color, *target))
        .collect()
}

/// Whether reducing `current` to `n` colors would change anything.
pub fn can_reduce(current: &Palette, n: usize) -> bool {
    n > 0 && n < current.len()
}

/// Mapping that folds every color outside the `n` most frequent onto its
/// nearest anchor in LAB space.
///
/// Returns `None` when the reduction is disabled: `n` is zero or not smaller
/// than the palette.
pub fn reduce_mapping(current: &Palette, n: usize) -> Option<HashMap<Color, Target>> {
    if !can_reduce(current, n) {
        return None;
    }
    let anchors: Vec<Color> = current.iter().take(n).map(|e| e.color).collect();
    let mapping = current
        .iter()
        .skip(n)
        .filter_map(|entry| {
            nearest(entry.color, &anchors).map(|anchor| (entry.color, Target::Color(anchor)))
        })
        .collect();
    Some(mapping)
}

/// Closest anchor by ΔE²; earlier (more frequent) anchors win ties.
fn nearest(color: Color, anchors: &[Color]) -> Option<Color> {
    let mut best: Option<(Color, f32)> = None;
    for &anchor in anchors {
        let d = color.delta_e_sq(anchor);
        match best {
            Some((_, bd)) if d >= bd => {}
            _ => best = Some((anchor, d)),
        }
    }
    best.map(|(c, _)| c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::pipeline::extract::extract;

    fn palette(body: &str) -> Palette {
        extract(&Document::parse(&format!("<svg>{body}</svg>")).unwrap())
    }

    fn three_colors() -> Palette {
        // red x3, blue x2, dark red x1
        palette(
            r#"<rect fill="red"/><rect fill="red"/><rect fill="red"/>
               <rect fill="blue"/><rect fill="blue"/><rect fill="darkred"/>"#,
        )
    }

    #[test]
    fn explicit_palette_maps_by_rank() {
        let p = three_colors();
        let targets = [
            Target::Color(Color::new(0, 255, 0)),
            Target::Color(Color::new(255, 255, 0)),
        ];
        let mapping = map_to_palette(&p, &targets);
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping[&Color::new(255, 0, 0)], targets[0]);
        assert_eq!(mapping[&Color::new(0, 0, 255)], targets[1]);
        assert!(!mapping.contains_key(&Color::new(139, 0, 0)));
    }

    #[test]
    fn explicit_palette_longer_than_current_is_truncated() {
        let p = palette(r#"<rect fill="red"/>"#);
        let targets = [Target::Transparent, Target::Color(Color::BLACK)];
        let mapping = map_to_palette(&p, &targets);
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping[&Color::new(255, 0, 0)], Target::Transparent);
    }

    #[test]
    fn identical_targets_are_skipped() {
        let p = three_colors();
        let mapping = map_to_palette(&p, &[Target::Color(Color::new(255, 0, 0))]);
        assert!(mapping.is_empty());
    }

    #[test]
    fn reduce_folds_onto_nearest_anchor() {
        let p = three_colors();
        let mapping = reduce_mapping(&p, 2).unwrap();
        assert_eq!(mapping.len(), 1);
        assert_eq!(
            mapping[&Color::new(139, 0, 0)],
            Target::Color(Color::new(255, 0, 0)),
            "dark red is closer to red than to blue"
        );
    }

    #[test]
    fn reduce_to_one_maps_everything_to_top_color() {
        let p = three_colors();
        let mapping = reduce_mapping(&p, 1).unwrap();
        assert_eq!(mapping.len(), 2);
        assert!(mapping
            .values()
            .all(|t| *t == Target::Color(Color::new(255, 0, 0))));
    }

    #[test]
    fn reduce_not_smaller_than_palette_is_disabled() {
        let p = three_colors();
        assert!(reduce_mapping(&p, 3).is_none());
        assert!(reduce_mapping(&p, 4).is_none());
        assert!(reduce_mapping(&p, 0).is_none());
        assert!(!can_reduce(&p, 4));
        assert!(can_reduce(&p, 2));
    }
}
