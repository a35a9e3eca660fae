//! Editor configuration loaded from an optional TOML file.
//!
//! ```toml
//! history_limit = 50
//! recent_colors = 12
//!
//! [zoom]
//! min = 1.0
//! max = 5.0
//! step = 1.25
//!
//! [export]
//! precision = 2
//! scale = 1.0
//! quality = 90        # jpeg, 1..=100
//! dpi = 150           # print
//! page = "a4"         # "a4" | "letter"
//! margin_mm = 10.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::history::DEFAULT_LIMIT;
use crate::session::DEFAULT_RECENT;
use crate::viewport::ZoomLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorConfig {
    /// Maximum number of snapshots on the undo stack.
    pub history_limit: usize,
    /// Capacity of the recent-colors list.
    pub recent_colors: usize,
    pub zoom: ZoomConfig,
    pub export: ExportConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_LIMIT,
            recent_colors: DEFAULT_RECENT,
            zoom: ZoomConfig::default(),
            export: ExportConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    /// Factor applied per zoom in/out step.
    pub step: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 5.0,
            step: 1.25,
        }
    }
}

impl ZoomConfig {
    pub fn limits(&self) -> ZoomLimits {
        ZoomLimits {
            min: self.min,
            max: self.max,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Decimal places kept by precision rounding.
    pub precision: u8,
    /// Raster scale relative to the canvas size.
    pub scale: f32,
    pub quality: u8,
    pub dpi: u32,
    pub page: PageSize,
    pub margin_mm: f32,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            precision: 2,
            scale: 1.0,
            quality: 90,
            dpi: 150,
            page: PageSize::A4,
            margin_mm: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    A4,
    Letter,
}

impl PageSize {
    /// Page dimensions in millimetres, portrait.
    pub fn size_mm(self) -> (f32, f32) {
        match self {
            PageSize::A4 => (210.0, 297.0),
            PageSize::Letter => (215.9, 279.4),
        }
    }
}

impl EditorConfig {
    /// Read and validate a TOML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        fn invalid(field: &str, why: &str) -> Result<()> {
            Err(Error::Config(format!("{field}: {why}")))
        }

        if self.history_limit < 2 {
            return invalid("history_limit", "must be at least 2");
        }
        let zoom = &self.zoom;
        if zoom.min.is_nan() || zoom.min <= 0.0 {
            return invalid("zoom.min", "must be positive");
        }
        if zoom.max.is_nan() || zoom.max < zoom.min {
            return invalid("zoom.max", "must not be below zoom.min");
        }
        if zoom.step.is_nan() || zoom.step <= 1.0 {
            return invalid("zoom.step", "must be greater than 1");
        }
        let export = &self.export;
        if export.precision > 8 {
            return invalid("export.precision", "must be at most 8");
        }
        if export.scale.is_nan() || export.scale <= 0.0 {
            return invalid("export.scale", "must be positive");
        }
        if !(1..=100).contains(&export.quality) {
            return invalid("export.quality", "must be within 1..=100");
        }
        if export.dpi == 0 {
            return invalid("export.dpi", "must be positive");
        }
        let (w, h) = export.page.size_mm();
        if export.margin_mm.is_nan() || export.margin_mm < 0.0 || export.margin_mm * 2.0 >= w.min(h) {
            return invalid("export.margin_mm", "must leave room on the page");
        }
        Ok(())
    }
}
