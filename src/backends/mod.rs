//! Export targets for the current document.
//!
//! Every backend renders from a borrowed document and works on its own copy,
//! so exporting never alters the live document or the history.

pub mod precision;
pub mod print;
pub mod raster;
pub mod svg;

use std::path::Path;

use crate::config::ExportConfig;
use crate::document::Document;
use crate::error::{Error, Result};

pub use print::PrintBackend;
pub use raster::{JpegBackend, PngBackend};
pub use svg::SvgBackend;

/// A way of turning a document into bytes on disk.
pub trait ExportBackend {
    /// Human-readable name for messages.
    fn name(&self) -> &str;

    /// File extension without the dot.
    fn extension(&self) -> &str;

    fn render(&self, doc: &Document) -> Result<Vec<u8>>;

    fn write_to(&self, doc: &Document, path: &Path) -> Result<()> {
        let bytes = self.render(doc)?;
        std::fs::write(path, bytes).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(backend = self.name(), path = %path.display(), "wrote export");
        Ok(())
    }
}

/// Export formats selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportFormat {
    Svg,
    Png,
    Jpeg,
    /// PNG page (A4/Letter) with the drawing centered inside the margins.
    Print,
}

impl ExportFormat {
    /// Guess the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "svg" => Some(ExportFormat::Svg),
            "png" => Some(ExportFormat::Png),
            "jpg" | "jpeg" => Some(ExportFormat::Jpeg),
            _ => None,
        }
    }

    pub fn backend(self, config: &ExportConfig, round: bool) -> Box<dyn ExportBackend> {
        match self {
            ExportFormat::Svg => Box::new(SvgBackend {
                precision: round.then_some(config.precision),
            }),
            ExportFormat::Png => Box::new(PngBackend {
                scale: config.scale,
            }),
            ExportFormat::Jpeg => Box::new(JpegBackend {
                scale: config.scale,
                quality: config.quality,
            }),
            ExportFormat::Print => Box::new(PrintBackend {
                page: config.page,
                dpi: config.dpi,
                margin_mm: config.margin_mm,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_from_extension() {
        assert_eq!(ExportFormat::from_path(Path::new("a/b.SVG")), Some(ExportFormat::Svg));
        assert_eq!(ExportFormat::from_path(Path::new("x.jpg")), Some(ExportFormat::Jpeg));
        assert_eq!(ExportFormat::from_path(Path::new("x.png")), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::from_path(Path::new("x.pdf")), None);
        assert_eq!(ExportFormat::from_path(Path::new("noext")), None);
    }

    #[test]
    fn backend_names_and_extensions() {
        let config = ExportConfig::default();
        let cases = [
            (ExportFormat::Svg, "svg"),
            (ExportFormat::Png, "png"),
            (ExportFormat::Jpeg, "jpg"),
            (ExportFormat::Print, "png"),
        ];
        for (format, ext) in cases {
            assert_eq!(format.backend(&config, false).extension(), ext);
        }
    }

    #[test]
    fn write_to_creates_file() {
        let doc = Document::parse(r#"<svg width="4" height="4"><rect width="4" height="4" fill="red"/></svg>"#)
            .unwrap();
        let path = std::env::temp_dir().join(format!("svgtint-write-{}.svg", std::process::id()));
        SvgBackend::default().write_to(&doc, &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(written, doc.serialize());
    }
}
