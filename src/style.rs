//! Inline `style` attribute as a small declaration list.
//!
//! Declarations keep their surrounding whitespace, separator and `!important`
//! priority so that rewriting one value leaves every other byte untouched.

/// One `name: value` declaration with the formatting around it.
#[derive(Debug, Clone, PartialEq)]
struct Declaration {
    /// Everything before the value: leading space, name, colon and padding.
    head: String,
    name: String,
    value: String,
    /// Whitespace plus optional `!important` and trailing whitespace.
    tail: String,
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Decl(Declaration),
    /// Anything that is not a well-formed declaration, kept verbatim.
    Raw(String),
}

/// Parsed inline style. `to_string()` reproduces the input exactly when
/// nothing was changed.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleDecls {
    segments: Vec<Segment>,
    trailing_semicolon: bool,
}

impl StyleDecls {
    pub fn parse(text: &str) -> Self {
        let mut pieces = split_top_level(text);
        let trailing_semicolon = pieces.len() > 1 && pieces.last().is_some_and(|p| p.is_empty());
        if trailing_semicolon {
            pieces.pop();
        }
        let segments = pieces.into_iter().map(parse_segment).collect();
        Self {
            segments,
            trailing_semicolon,
        }
    }

    /// Value of the last declaration with this (case-insensitive) name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.decls()
            .filter(|d| d.name.eq_ignore_ascii_case(name))
            .last()
            .map(|d| d.value.as_str())
    }

    /// Iterate `(name, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.decls().map(|d| (d.name.as_str(), d.value.as_str()))
    }

    /// Rewrite the effective (last) declaration named `name` when `f`
    /// returns a replacement. Shadowed declarations are left as they are,
    /// matching [`StyleDecls::get`]. Returns how many declarations changed.
    pub fn rewrite(&mut self, name: &str, f: impl FnOnce(&str) -> Option<String>) -> usize {
        let effective = self.segments.iter_mut().rev().find_map(|seg| match seg {
            Segment::Decl(d) if d.name.eq_ignore_ascii_case(name) => Some(d),
            _ => None,
        });
        let Some(d) = effective else {
            return 0;
        };
        match f(&d.value) {
            Some(new_value) => {
                d.value = new_value;
                1
            }
            None => 0,
        }
    }

    fn decls(&self) -> impl Iterator<Item = &Declaration> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Decl(d) => Some(d),
            Segment::Raw(_) => None,
        })
    }
}

impl std::fmt::Display for StyleDecls {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            match seg {
                Segment::Decl(d) => write!(f, "{}{}{}", d.head, d.value, d.tail)?,
                Segment::Raw(raw) => f.write_str(raw)?,
            }
        }
        if self.trailing_semicolon {
            f.write_str(";")?;
        }
        Ok(())
    }
}

/// Split on `;` outside of quotes and parentheses.
fn split_top_level(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = (depth - 1).max(0),
            (None, ';') if depth == 0 => {
                out.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&text[start..]);
    out
}

fn parse_segment(piece: &str) -> Segment {
    let Some(colon) = piece.find(':') else {
        return Segment::Raw(piece.to_string());
    };
    let name = piece[..colon].trim();
    if name.is_empty() {
        return Segment::Raw(piece.to_string());
    }
    let after = &piece[colon + 1..];
    let value_start = colon + 1 + (after.len() - after.trim_start().len());
    let rest = &piece[value_start..];

    // split off `!important` and trailing whitespace
    let trimmed = rest.trim_end();
    let (value, priority) = match trimmed.rfind('!') {
        Some(bang) if trimmed[bang + 1..].trim().eq_ignore_ascii_case("important") => {
            (trimmed[..bang].trim_end(), &rest[trimmed[..bang].trim_end().len()..])
        }
        _ => (trimmed, &rest[trimmed.len()..]),
    };

    Segment::Decl(Declaration {
        head: piece[..value_start].to_string(),
        name: name.to_string(),
        value: value.to_string(),
        tail: priority.to_string(),
    })
}
