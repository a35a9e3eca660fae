use crate::document::Document;
use crate::error::Result;

use super::precision;
use super::ExportBackend;

/// Serialized document text, optionally with geometry rounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SvgBackend {
    /// Decimal places for geometric attributes; `None` keeps them verbatim.
    pub precision: Option<u8>,
}

impl ExportBackend for SvgBackend {
    fn name(&self) -> &str {
        "SVG"
    }

    fn extension(&self) -> &str {
        "svg"
    }

    fn render(&self, doc: &Document) -> Result<Vec<u8>> {
        let text = match self.precision {
            Some(places) => {
                let mut copy = doc.clone();
                let rounded = precision::round_document(&mut copy, places);
                tracing::debug!(places, rounded, "rounded geometric attributes");
                copy.serialize()
            }
            None => doc.serialize(),
        };
        Ok(text.into_bytes())
    }
}
