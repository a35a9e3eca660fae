//! The editing session: one document, its history and the current selection.
//!
//! Every mutation follows the same path: clone the live document, rewrite
//! the clone, re-extract the palette from it and push the pair onto the
//! history. The live document is only ever replaced, never edited in place.

use std::cell::OnceCell;
use std::path::Path;

use crate::backends::ExportBackend;
use crate::color::Color;
use crate::config::EditorConfig;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::geometry::{Point, Rect};
use crate::history::{History, Snapshot};
use crate::pipeline::extract::{extract, Palette};
use crate::pipeline::remap::{self, ReduceTarget};
use crate::pipeline::replace::{self, Target, TRANSPARENT};
use crate::selection::{self, Scene};
use crate::session::Session;

static EMPTY_PALETTE: Palette = Palette::EMPTY;

/// Result of an editing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new snapshot was pushed (or the cursor moved).
    Applied,
    /// Valid request with nothing to do: identical colors, no match, no
    /// history left in that direction.
    Unchanged,
    /// Not allowed right now: nothing loaded, a load in flight, or the
    /// control is disabled (e.g. reducing to more colors than exist).
    Rejected,
}

impl Outcome {
    pub fn applied(self) -> bool {
        self == Outcome::Applied
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Empty,
    Loading,
    Ready,
    /// The last load failed; holds the reason for display.
    Failed(String),
}

#[derive(Debug)]
pub struct Editor {
    config: EditorConfig,
    history: History,
    /// Parsed form of the snapshot under the history cursor.
    document: Option<Document>,
    /// Layout of `document`, built on first use.
    scene: OnceCell<Option<Scene>>,
    state: LoadState,
    session: Session,
    selected: Option<Color>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: History::new(config.history_limit),
            session: Session::new(config.recent_colors),
            config,
            document: None,
            scene: OnceCell::new(),
            state: LoadState::Empty,
            selected: None,
        }
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Mark a load as in flight. Mutations are rejected until
    /// [`Editor::finish_load`].
    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
        tracing::debug!("load started");
    }

    /// Parse `text` as the new document and seed the history with it.
    ///
    /// On failure the editor drops any previous document and degrades to
    /// "no document": empty palette, every operation a no-op.
    pub fn finish_load(&mut self, text: &str) -> Result<()> {
        self.selected = None;
        match Document::parse(text) {
            Ok(doc) => {
                let palette = extract(&doc);
                tracing::info!(
                    elements = doc.element_count(),
                    colors = palette.len(),
                    "document loaded"
                );
                self.history = History::new(self.config.history_limit);
                self.history.reset(Snapshot::new(doc.serialize(), palette));
                self.install(Some(doc));
                self.state = LoadState::Ready;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "document failed to load");
                self.history = History::new(self.config.history_limit);
                self.install(None);
                self.state = LoadState::Failed(e.to_string());
                Err(e)
            }
        }
    }

    pub fn load_str(&mut self, text: &str) -> Result<()> {
        self.begin_load();
        self.finish_load(text)
    }

    pub fn load_file(&mut self, path: &Path) -> Result<()> {
        self.begin_load();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                let err = Error::Io {
                    path: path.to_path_buf(),
                    source,
                };
                self.install(None);
                self.history = History::new(self.config.history_limit);
                self.state = LoadState::Failed(err.to_string());
                return Err(err);
            }
        };
        self.finish_load(&text)
    }

    // ------------------------------------------------------------------
    // Current state
    // ------------------------------------------------------------------

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    /// Palette of the current snapshot; empty when nothing is loaded.
    pub fn palette(&self) -> &Palette {
        self.history
            .current()
            .map(|s| &s.palette)
            .unwrap_or(&EMPTY_PALETTE)
    }

    /// Serialized text of the current snapshot.
    pub fn serialized(&self) -> Option<&str> {
        self.history.current().map(|s| s.document.as_str())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Canvas area of the current document in pixels, as rendered.
    pub fn canvas(&self) -> Option<Rect> {
        self.scene().map(Scene::canvas)
    }

    fn scene(&self) -> Option<&Scene> {
        self.scene
            .get_or_init(|| {
                let doc = self.document.as_ref()?;
                Scene::build(doc)
                    .inspect_err(|e| tracing::warn!(error = %e, "document has no usable layout"))
                    .ok()
            })
            .as_ref()
    }

    fn install(&mut self, document: Option<Document>) {
        self.document = document;
        self.scene = OnceCell::new();
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selected(&self) -> Option<Color> {
        self.selected
    }

    pub fn select(&mut self, color: Option<Color>) {
        self.selected = color;
    }

    /// Select the color painted at `point` (canvas pixels). Returns the new
    /// selection; clicking empty canvas keeps the previous one.
    pub fn pick(&mut self, point: Point) -> Option<Color> {
        let doc = self.document.as_ref()?;
        let picked = self
            .scene()?
            .pick(doc, point)
            .and_then(|id| selection::resolve_color_at(doc, id));
        if let Some(color) = picked {
            tracing::debug!(color = %color, x = point.x, y = point.y, "picked color");
            self.selected = Some(color);
        }
        picked
    }

    // ------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------

    /// Replace every paint of `from` with `to` (a color or `transparent`).
    pub fn replace_color(&mut self, from: &str, to: &str) -> Outcome {
        let (Some(source), Some(target)) = (Color::parse(from), Target::parse(to)) else {
            tracing::debug!(from, to, "replace ignored: not a color");
            return self.gate().unwrap_or(Outcome::Unchanged);
        };
        let outcome = self.mutate("replace", |doc| replace::replace_color(doc, from, to));
        if outcome.applied() {
            if let Target::Color(c) = target {
                self.session.remember(c);
            }
            if self.selected == Some(source) {
                self.selected = match target {
                    Target::Color(c) => Some(c),
                    Target::Transparent => None,
                };
            }
        }
        outcome
    }

    /// Make every paint of `color` transparent.
    pub fn erase(&mut self, color: &str) -> Outcome {
        self.replace_color(color, TRANSPARENT)
    }

    /// Map the current palette onto `targets` by frequency rank.
    pub fn apply_palette(&mut self, targets: &[Target]) -> Outcome {
        let mapping = remap::map_to_palette(self.palette(), targets);
        self.mutate("apply palette", |doc| replace::apply_mapping(doc, &mapping))
    }

    /// Whether a reduction to `n` colors is currently available.
    pub fn can_reduce(&self, n: usize) -> bool {
        self.document.is_some() && remap::can_reduce(self.palette(), n)
    }

    /// Fold the palette down to its `n` most frequent colors.
    ///
    /// Starts from the current document, so repeated reductions compound.
    pub fn reduce(&mut self, target: ReduceTarget) -> Outcome {
        let n = match target {
            ReduceTarget::Original => return self.gate().unwrap_or(Outcome::Unchanged),
            ReduceTarget::Count(n) => n,
        };
        let Some(mapping) = remap::reduce_mapping(self.palette(), n) else {
            tracing::debug!(n, colors = self.palette().len(), "reduction disabled");
            return Outcome::Rejected;
        };
        self.mutate("reduce", |doc| replace::apply_mapping(doc, &mapping))
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> Outcome {
        if let Some(rejected) = self.gate() {
            return rejected;
        }
        if !self.history.undo() {
            return Outcome::Unchanged;
        }
        tracing::debug!(cursor = self.history.cursor(), "undo");
        self.sync_document()
    }

    pub fn redo(&mut self) -> Outcome {
        if let Some(rejected) = self.gate() {
            return rejected;
        }
        if !self.history.redo() {
            return Outcome::Unchanged;
        }
        tracing::debug!(cursor = self.history.cursor(), "redo");
        self.sync_document()
    }

    /// Drop all edits and return to the document as first loaded.
    pub fn reset_to_original(&mut self) -> Outcome {
        if let Some(rejected) = self.gate() {
            return rejected;
        }
        if self.history.len() == 1
            && self.history.current().map(|s| &s.document)
                == self.history.original().map(|s| &s.document)
        {
            return Outcome::Unchanged;
        }
        if !self.history.reset_to_original() {
            return Outcome::Rejected;
        }
        tracing::info!("reset to original");
        self.selected = None;
        self.sync_document()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Render the current document through `backend`. Never touches history.
    pub fn export(&self, backend: &dyn ExportBackend) -> Result<Vec<u8>> {
        if self.state == LoadState::Loading {
            return Err(Error::Loading);
        }
        let doc = self.document.as_ref().ok_or(Error::NoDocument)?;
        let bytes = backend.render(doc)?;
        tracing::info!(backend = backend.name(), bytes = bytes.len(), "exported");
        Ok(bytes)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    /// `Some(Rejected)` while a load is in flight or nothing is loaded.
    fn gate(&self) -> Option<Outcome> {
        if self.state == LoadState::Loading {
            tracing::warn!("edit rejected: load in flight");
            return Some(Outcome::Rejected);
        }
        if self.document.is_none() {
            return Some(Outcome::Rejected);
        }
        None
    }

    fn mutate(&mut self, action: &str, f: impl FnOnce(&mut Document) -> usize) -> Outcome {
        if let Some(rejected) = self.gate() {
            return rejected;
        }
        let Some(live) = self.document.as_ref() else {
            return Outcome::Rejected;
        };
        let mut working = live.clone();
        let rewritten = f(&mut working);
        if rewritten == 0 {
            tracing::debug!(action, "nothing to rewrite");
            return Outcome::Unchanged;
        }
        let palette = extract(&working);
        tracing::info!(action, rewritten, colors = palette.len(), "edit applied");
        self.history
            .push_state(Snapshot::new(working.serialize(), palette));
        self.install(Some(working));
        Outcome::Applied
    }

    /// Re-parse the snapshot under the cursor into the live document.
    fn sync_document(&mut self) -> Outcome {
        let Some(snapshot) = self.history.current() else {
            self.install(None);
            return Outcome::Rejected;
        };
        match Document::parse(&snapshot.document) {
            Ok(doc) => {
                self.install(Some(doc));
                Outcome::Applied
            }
            Err(e) => {
                tracing::error!(error = %e, "snapshot failed to re-parse");
                self.install(None);
                self.state = LoadState::Failed(e.to_string());
                Outcome::Rejected
            }
        }
    }
}
