//! Color engine and edit history for SVG documents.
//!
//! Load a document into an [`Editor`], inspect its [`Palette`], rewrite
//! colors through replace, erase, palette remap or reduction, and move
//! through the snapshot history. Exports go through [`backends`].

pub mod backends;
pub mod cli;
pub mod color;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod history;
pub mod pipeline;
pub mod selection;
pub mod session;
pub mod style;
pub mod tui;
pub mod viewport;

pub use color::{normalize, Color};
pub use config::EditorConfig;
pub use document::{Document, NodeId};
pub use editor::{Editor, LoadState, Outcome};
pub use error::{Error, Result};
pub use pipeline::extract::{extract, ColorEntry, Palette, Role};
pub use pipeline::remap::ReduceTarget;
pub use pipeline::replace::{replace_color, Target, TRANSPARENT};
