use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::color::Color;
use crate::document::{Document, Element};
use crate::style::StyleDecls;

/// Which paint channel a color was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Fill,
    Stroke,
}

impl Channel {
    pub const ALL: [Channel; 2] = [Channel::Fill, Channel::Stroke];

    /// Attribute and style property name.
    pub fn property(self) -> &'static str {
        match self {
            Channel::Fill => "fill",
            Channel::Stroke => "stroke",
        }
    }
}

/// How a palette color is used across the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Fill,
    Stroke,
    Both,
}

impl Role {
    fn merge(self, channel: Channel) -> Role {
        match (self, channel) {
            (Role::Fill, Channel::Fill) => Role::Fill,
            (Role::Stroke, Channel::Stroke) => Role::Stroke,
            _ => Role::Both,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Role::Fill => "fill",
            Role::Stroke => "stroke",
            Role::Both => "both",
        })
    }
}

impl From<Channel> for Role {
    fn from(channel: Channel) -> Self {
        match channel {
            Channel::Fill => Role::Fill,
            Channel::Stroke => Role::Stroke,
        }
    }
}

/// A deduplicated palette color with its usage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorEntry {
    pub color: Color,
    /// Paint occurrences; fill and stroke, attribute and style each count once.
    pub count: usize,
    pub role: Role,
    /// Source spellings that normalized to `color`, e.g. `red`, `#F00`.
    pub original_forms: BTreeSet<String>,
}

/// Colors sorted by descending count, ties in first-encountered order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Palette(Vec<ColorEntry>);

impl Palette {
    pub const EMPTY: Palette = Palette(Vec::new());

    pub fn entries(&self) -> &[ColorEntry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ColorEntry> {
        self.0.iter()
    }

    pub fn get(&self, color: Color) -> Option<&ColorEntry> {
        self.0.iter().find(|e| e.color == color)
    }

    pub fn colors(&self) -> Vec<Color> {
        self.0.iter().map(|e| e.color).collect()
    }

    /// Sum of all entry counts.
    pub fn total_count(&self) -> usize {
        self.0.iter().map(|e| e.count).sum()
    }
}

impl<'a> IntoIterator for &'a Palette {
    type Item = &'a ColorEntry;
    type IntoIter = std::slice::Iter<'a, ColorEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Raw paint values an element exposes, in counting order: fill attribute,
/// fill style, stroke attribute, stroke style.
pub fn paint_values(el: &Element) -> Vec<(Channel, String)> {
    let style = el.attr("style").map(StyleDecls::parse);
    let mut out = Vec::with_capacity(4);
    for channel in Channel::ALL {
        if let Some(v) = el.attr(channel.property()) {
            out.push((channel, v.to_string()));
        }
        if let Some(v) = style.as_ref().and_then(|s| s.get(channel.property())) {
            out.push((channel, v.to_string()));
        }
    }
    out
}

/// Build the palette of a document.
///
/// Walks every element depth-first; every paint that normalizes to a color
/// is one occurrence. An element with the same color in fill and stroke
/// contributes two occurrences to a single `Both` entry.
pub fn extract(doc: &Document) -> Palette {
    let mut index: HashMap<Color, usize> = HashMap::new();
    let mut entries: Vec<ColorEntry> = Vec::new();

    doc.walk(|_, el| {
        for (channel, raw) in paint_values(el) {
            let Some(color) = Color::parse(&raw) else {
                continue;
            };
            let slot = *index.entry(color).or_insert_with(|| {
                entries.push(ColorEntry {
                    color,
                    count: 0,
                    role: channel.into(),
                    original_forms: BTreeSet::new(),
                });
                entries.len() - 1
            });
            let entry = &mut entries[slot];
            entry.count += 1;
            entry.role = entry.role.merge(channel);
            entry.original_forms.insert(raw.trim().to_string());
        }
    });

    // stable: equal counts keep traversal order
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    tracing::debug!(colors = entries.len(), "extracted palette");
    Palette(entries)
}
