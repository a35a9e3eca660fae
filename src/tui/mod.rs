pub mod widgets;

use std::path::PathBuf;

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use image::RgbaImage;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::Line;
use ratatui::{DefaultTerminal, Frame};
use resvg::usvg;

use crate::backends::raster::{parse_tree, render_view};
use crate::color::Color;
use crate::editor::{Editor, LoadState, Outcome};
use crate::geometry::{Affine, Point};
use crate::grid::{next_index, wrap_rows, GridKey};
use crate::pipeline::remap::ReduceTarget;
use crate::pipeline::replace::Target;
use crate::viewport::{Minimap, Viewport};

use widgets::{columns_for, swatch_at, CanvasWidget, HelpOverlay, MinimapWidget, PaletteWidget};

/// Fraction of the visible area moved per pan key press.
const PAN_FRACTION: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptAction {
    Replace(Color),
    Remap,
    Reduce,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Normal,
    Prompt { action: PromptAction, input: String },
    Help,
}

#[derive(Debug, Default, Clone, Copy)]
struct Areas {
    canvas: Rect,
    minimap: Rect,
    palette: Rect,
}

/// State for the interactive editor.
pub struct App {
    editor: Editor,
    save_path: PathBuf,
    /// Index of the selected swatch.
    cursor: usize,
    columns: usize,
    viewport: Option<Viewport>,
    tree: Option<usvg::Tree>,
    canvas: Option<RgbaImage>,
    minimap: Option<(Minimap, RgbaImage)>,
    canvas_stale: bool,
    minimap_stale: bool,
    areas: Areas,
    mode: Mode,
    status: String,
    unsaved: bool,
    quit_armed: bool,
    quit: bool,
}

impl App {
    pub fn new(editor: Editor, save_path: PathBuf) -> Self {
        let mut app = Self {
            editor,
            save_path,
            cursor: 0,
            columns: 1,
            viewport: None,
            tree: None,
            canvas: None,
            minimap: None,
            canvas_stale: true,
            minimap_stale: true,
            areas: Areas::default(),
            mode: Mode::Normal,
            status: String::new(),
            unsaved: false,
            quit_armed: false,
            quit: false,
        };
        if !app.editor.session().onboarding_seen {
            app.editor.session_mut().onboarding_seen = true;
            app.mode = Mode::Help;
        }
        app.reload_tree();
        app.sync_selection();
        app
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    // ------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------

    pub fn draw(&mut self, frame: &mut Frame) {
        let [main, bottom] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());
        let [canvas, side] =
            Layout::horizontal([Constraint::Percentage(65), Constraint::Percentage(35)])
                .areas(main);
        let [minimap, palette] =
            Layout::vertical([Constraint::Length(12), Constraint::Min(4)]).areas(side);
        self.layout(Areas {
            canvas,
            minimap,
            palette,
        });

        let message = match self.editor.state() {
            LoadState::Failed(why) => Some(why.as_str()),
            LoadState::Loading => Some("loading…"),
            _ => None,
        };
        frame.render_widget(CanvasWidget::new(self.canvas.as_ref(), message), canvas);

        let overlay = match (&self.minimap, &self.viewport) {
            (Some((map, _)), Some(vp)) => Some(map.overlay(vp)),
            _ => None,
        };
        frame.render_widget(
            MinimapWidget::new(self.minimap.as_ref().map(|(_, img)| img), overlay),
            minimap,
        );

        let selected = (!self.editor.palette().is_empty()).then_some(self.cursor);
        frame.render_widget(
            PaletteWidget::new(
                self.editor.palette(),
                selected,
                self.columns,
                self.editor.session().recent_colors(),
            ),
            palette,
        );

        frame.render_widget(Line::from(self.status_line()), bottom);

        if self.mode == Mode::Help {
            frame.render_widget(HelpOverlay, frame.area());
        }
    }

    fn status_line(&self) -> String {
        if let Mode::Prompt { action, input } = &self.mode {
            let label = match action {
                PromptAction::Replace(c) => format!("replace {} with", c.to_hex()),
                PromptAction::Remap => "new palette (most frequent first)".to_string(),
                PromptAction::Reduce => "reduce to how many colors".to_string(),
            };
            return format!(" {label}: {input}▏");
        }
        let history = self.editor.history();
        let zoom = self.viewport.as_ref().map_or(1.0, |vp| vp.scale);
        format!(
            " {}{}  │ step {}/{}  │ zoom {:.0}%  │ {}",
            self.save_path.display(),
            if self.unsaved { " *" } else { "" },
            history.cursor() + 1,
            history.len(),
            zoom * 100.0,
            self.status,
        )
    }

    /// Adopt new panel sizes and refresh whatever bitmaps went stale.
    fn layout(&mut self, areas: Areas) {
        let canvas_resized = areas.canvas != self.areas.canvas;
        let minimap_resized = areas.minimap != self.areas.minimap;
        self.areas = areas;
        self.columns = columns_for(areas.palette.width);

        if canvas_resized {
            let screen = (
                f32::from(areas.canvas.width),
                f32::from(areas.canvas.height) * 2.0,
            );
            if let Some(vp) = &mut self.viewport {
                vp.resize(screen);
            } else if let Some(content) = self.editor.canvas() {
                let limits = self.editor.config().zoom.limits();
                self.viewport = Some(Viewport::new(screen, content, limits));
            }
            self.canvas_stale = true;
        }
        if minimap_resized {
            self.minimap_stale = true;
        }
        if self.canvas_stale {
            self.render_canvas();
        }
        if self.minimap_stale {
            self.render_minimap();
        }
    }

    fn render_canvas(&mut self) {
        self.canvas_stale = false;
        self.canvas = None;
        let (Some(tree), Some(vp)) = (&self.tree, &self.viewport) else {
            return;
        };
        let size = (
            u32::from(self.areas.canvas.width),
            u32::from(self.areas.canvas.height) * 2,
        );
        if size.0 == 0 || size.1 == 0 {
            return;
        }
        match render_view(tree, size, vp.transform()) {
            Ok(image) => self.canvas = Some(image),
            Err(e) => self.status = e.to_string(),
        }
    }

    fn render_minimap(&mut self) {
        self.minimap_stale = false;
        self.minimap = None;
        let (Some(tree), Some(content)) = (&self.tree, self.editor.canvas()) else {
            return;
        };
        let inner = ratatui::widgets::Block::bordered().inner(self.areas.minimap);
        let max_side = f32::from(inner.width.min(inner.height * 2));
        if max_side < 1.0 || content.width <= 0.0 {
            return;
        }
        let map = Minimap::new(content, max_side);
        let k = map.size.0 / content.width;
        let size = (map.size.0.ceil() as u32, map.size.1.ceil() as u32);
        if let Ok(image) = render_view(tree, size, Affine::scale(k, k)) {
            self.minimap = Some((map, image));
        }
    }

    /// Re-parse the render tree after the document changed.
    fn reload_tree(&mut self) {
        self.tree = self.editor.document().and_then(|doc| match parse_tree(doc) {
            Ok(tree) => Some(tree),
            Err(e) => {
                tracing::warn!(error = %e, "document cannot be rendered");
                None
            }
        });
        self.canvas_stale = true;
        self.minimap_stale = true;
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match self.mode {
            Mode::Help => self.mode = Mode::Normal,
            Mode::Prompt { .. } => self.handle_prompt_key(key.code),
            Mode::Normal => self.handle_normal_key(key),
        }
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status = "cancelled".into();
            }
            KeyCode::Enter => self.submit_prompt(),
            KeyCode::Backspace | KeyCode::Char(_) => {
                if let Mode::Prompt { input, .. } = &mut self.mode {
                    match code {
                        KeyCode::Char(c) => input.push(c),
                        _ => {
                            input.pop();
                        }
                    }
                }
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if !matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            self.quit_armed = false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.request_quit(),
            KeyCode::Char('?') => self.mode = Mode::Help,

            KeyCode::Left if shift => self.pan(-1.0, 0.0),
            KeyCode::Right if shift => self.pan(1.0, 0.0),
            KeyCode::Up if shift => self.pan(0.0, -1.0),
            KeyCode::Down if shift => self.pan(0.0, 1.0),
            KeyCode::Char('H') => self.pan(-1.0, 0.0),
            KeyCode::Char('L') => self.pan(1.0, 0.0),
            KeyCode::Char('K') => self.pan(0.0, -1.0),
            KeyCode::Char('J') => self.pan(0.0, 1.0),

            KeyCode::Left | KeyCode::Char('h') => self.move_cursor(GridKey::Left),
            KeyCode::Right | KeyCode::Char('l') => self.move_cursor(GridKey::Right),
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(GridKey::Up),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(GridKey::Down),
            KeyCode::Home => self.move_cursor(GridKey::Home),
            KeyCode::End => self.move_cursor(GridKey::End),

            KeyCode::Char('r') if ctrl => self.redo(),
            KeyCode::Enter | KeyCode::Char('r') => {
                if let Some(color) = self.selected_color() {
                    self.open_prompt(PromptAction::Replace(color));
                }
            }
            KeyCode::Char('e') => {
                if let Some(color) = self.selected_color() {
                    let outcome = self.editor.erase(&color.to_hex());
                    self.after_edit(outcome, &format!("erased {}", color.to_hex()));
                }
            }
            KeyCode::Char('p') => self.open_prompt(PromptAction::Remap),
            KeyCode::Char('n') => self.open_prompt(PromptAction::Reduce),

            KeyCode::Char('U') => self.redo(),
            KeyCode::Char('u') => {
                let outcome = self.editor.undo();
                self.after_history(outcome, "undone", "nothing to undo");
            }
            KeyCode::Char('R') => {
                let outcome = self.editor.reset_to_original();
                self.after_history(outcome, "back to the original", "already original");
            }

            KeyCode::Char('+') | KeyCode::Char('=') => self.zoom(true),
            KeyCode::Char('-') => self.zoom(false),
            KeyCode::Char('0') => {
                if let Some(vp) = &mut self.viewport {
                    vp.reset();
                    self.canvas_stale = true;
                }
            }

            KeyCode::Char('s') => self.save(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Normal {
            return;
        }
        let at = ratatui::layout::Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.areas.canvas.contains(at) {
                    self.pick(mouse.column, mouse.row);
                } else if self.areas.minimap.contains(at) {
                    self.recenter(mouse.column, mouse.row);
                } else if let Some(i) = swatch_at(
                    self.areas.palette,
                    self.columns,
                    self.editor.palette().len(),
                    mouse.column,
                    mouse.row,
                ) {
                    self.set_cursor(i);
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown
                if self.areas.canvas.contains(at) =>
            {
                let anchor = self.screen_point(mouse.column, mouse.row);
                let step = self.editor.config().zoom.step;
                let factor = if mouse.kind == MouseEventKind::ScrollUp {
                    step
                } else {
                    1.0 / step
                };
                if let Some(vp) = &mut self.viewport {
                    if vp.zoom_at(factor, anchor) {
                        self.canvas_stale = true;
                    }
                }
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Actions
    // ------------------------------------------------------------------

    fn selected_color(&self) -> Option<Color> {
        self.editor.palette().entries().get(self.cursor).map(|e| e.color)
    }

    fn move_cursor(&mut self, key: GridKey) {
        let rows = wrap_rows(self.editor.palette().len(), self.columns);
        let next = next_index(self.cursor, &rows, key);
        self.set_cursor(next);
    }

    fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
        let color = self.selected_color();
        self.editor.select(color);
    }

    /// Point the cursor at the editor's selected color, or keep it in range.
    fn sync_selection(&mut self) {
        let palette = self.editor.palette();
        let found = self
            .editor
            .selected()
            .and_then(|c| palette.iter().position(|e| e.color == c));
        let index = found.unwrap_or(self.cursor.min(palette.len().saturating_sub(1)));
        self.set_cursor(index);
    }

    fn open_prompt(&mut self, action: PromptAction) {
        self.mode = Mode::Prompt {
            action,
            input: String::new(),
        };
    }

    fn submit_prompt(&mut self) {
        let Mode::Prompt { action, input } = std::mem::replace(&mut self.mode, Mode::Normal) else {
            return;
        };
        let input = input.trim();
        match action {
            PromptAction::Replace(from) => {
                if Target::parse(input).is_none() {
                    self.status = format!("not a color: {input}");
                    return;
                }
                let outcome = self.editor.replace_color(&from.to_hex(), input);
                self.after_edit(outcome, &format!("{} → {input}", from.to_hex()));
            }
            PromptAction::Remap => {
                let parts: Vec<&str> = input
                    .split(|c: char| c == ',' || c.is_whitespace())
                    .filter(|s| !s.is_empty())
                    .collect();
                let targets: Option<Vec<Target>> = parts.iter().map(|p| Target::parse(p)).collect();
                match targets {
                    Some(targets) if !targets.is_empty() => {
                        let outcome = self.editor.apply_palette(&targets);
                        self.after_edit(outcome, &format!("remapped {} colors", targets.len()));
                    }
                    _ => self.status = format!("not a palette: {input}"),
                }
            }
            PromptAction::Reduce => {
                let target = match input {
                    "" | "original" => ReduceTarget::Original,
                    n => match n.parse() {
                        Ok(n) => ReduceTarget::Count(n),
                        Err(_) => {
                            self.status = format!("not a number: {n}");
                            return;
                        }
                    },
                };
                let outcome = self.editor.reduce(target);
                if outcome == Outcome::Rejected {
                    self.status = format!(
                        "reduction needs fewer than {} colors",
                        self.editor.palette().len()
                    );
                    return;
                }
                self.after_edit(outcome, "reduced");
            }
        }
    }

    fn after_edit(&mut self, outcome: Outcome, applied: &str) {
        self.status = match outcome {
            Outcome::Applied => {
                self.unsaved = true;
                self.reload_tree();
                self.sync_selection();
                applied.to_string()
            }
            Outcome::Unchanged => "nothing to change".to_string(),
            Outcome::Rejected => "not available right now".to_string(),
        };
    }

    fn after_history(&mut self, outcome: Outcome, applied: &str, unchanged: &str) {
        match outcome {
            Outcome::Applied => self.after_edit(outcome, applied),
            Outcome::Unchanged => self.status = unchanged.to_string(),
            Outcome::Rejected => self.status = "not available right now".to_string(),
        }
    }

    fn redo(&mut self) {
        let outcome = self.editor.redo();
        self.after_history(outcome, "redone", "nothing to redo");
    }

    fn zoom(&mut self, zoom_in: bool) {
        let step = self.editor.config().zoom.step;
        let Some(vp) = &mut self.viewport else {
            return;
        };
        let changed = if zoom_in {
            vp.zoom_in(step)
        } else {
            vp.zoom_out(step)
        };
        if changed {
            self.canvas_stale = true;
        } else {
            self.status = "zoom limit".into();
        }
    }

    fn pan(&mut self, dx: f32, dy: f32) {
        let Some(vp) = &mut self.viewport else {
            return;
        };
        let (w, h) = vp.screen();
        // moving the view right shifts the drawing left
        vp.pan(-dx * w * PAN_FRACTION, -dy * h * PAN_FRACTION);
        self.canvas_stale = true;
    }

    /// Canvas cell to viewport screen pixels (two pixel rows per cell).
    fn screen_point(&self, column: u16, row: u16) -> Point {
        let area = self.areas.canvas;
        Point::new(
            f32::from(column - area.x) + 0.5,
            f32::from(row - area.y) * 2.0 + 1.0,
        )
    }

    fn pick(&mut self, column: u16, row: u16) {
        let Some(vp) = &self.viewport else {
            return;
        };
        let point = vp.to_document(self.screen_point(column, row));
        match self.editor.pick(point) {
            Some(color) => {
                self.status = format!("picked {}", color.to_hex());
                self.sync_selection();
            }
            None => self.status = "no color there".into(),
        }
    }

    fn recenter(&mut self, column: u16, row: u16) {
        let inner = ratatui::widgets::Block::bordered().inner(self.areas.minimap);
        let (Some((map, _)), Some(vp)) = (&self.minimap, &mut self.viewport) else {
            return;
        };
        if column < inner.x || row < inner.y {
            return;
        }
        let click = Point::new(
            f32::from(column - inner.x) + 0.5,
            f32::from(row - inner.y) * 2.0 + 1.0,
        );
        map.recenter(vp, click);
        self.canvas_stale = true;
    }

    fn save(&mut self) {
        let Some(text) = self.editor.serialized() else {
            self.status = "nothing to save".into();
            return;
        };
        match std::fs::write(&self.save_path, text) {
            Ok(()) => {
                self.unsaved = false;
                self.status = format!("saved {}", self.save_path.display());
                tracing::info!(path = %self.save_path.display(), "saved document");
            }
            Err(e) => self.status = format!("save failed: {e}"),
        }
    }

    fn request_quit(&mut self) {
        if self.unsaved && !self.quit_armed {
            self.quit_armed = true;
            self.status = "unsaved changes; press q again to quit".into();
            return;
        }
        self.quit = true;
    }

    fn event_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while !self.quit {
            terminal.draw(|frame| self.draw(frame))?;
            match event::read()? {
                Event::Key(key) => self.handle_key(key),
                Event::Mouse(mouse) => self.handle_mouse(mouse),
                _ => {}
            }
        }
        Ok(())
    }
}

/// Launch the interactive editor on a loaded document. `save_path` is where
/// `s` writes the current snapshot.
pub fn run(editor: Editor, save_path: PathBuf) -> Result<()> {
    let mut app = App::new(editor, save_path);
    let mut terminal = ratatui::init();
    let result = crossterm::execute!(std::io::stdout(), EnableMouseCapture)
        .context("failed to enable mouse capture")
        .and_then(|()| app.event_loop(&mut terminal));
    let _ = crossterm::execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    const DOC: &str = r##"<svg width="100" height="100"><rect width="50" height="100" fill="#ff0000"/><rect x="50" width="50" height="100" fill="#0000ff" stroke="#0000ff"/><circle cx="75" cy="50" r="5" fill="#00ff00"/></svg>"##;

    fn app() -> App {
        let mut editor = Editor::default();
        editor.load_str(DOC).unwrap();
        editor.session_mut().onboarding_seen = true;
        let mut app = App::new(editor, std::env::temp_dir().join("svgtint-tui-test.svg"));
        draw(&mut app);
        app
    }

    fn draw(app: &mut App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(90, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_str(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn click(app: &mut App, column: u16, row: u16) {
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        });
    }

    fn hexes(app: &App) -> Vec<String> {
        app.editor().palette().iter().map(|e| e.color.to_hex()).collect()
    }

    #[test]
    fn first_launch_shows_help_once() {
        let mut editor = Editor::default();
        editor.load_str(DOC).unwrap();
        let mut app = App::new(editor, PathBuf::from("x.svg"));
        assert_eq!(app.mode, Mode::Help);
        assert!(draw(&mut app).contains("Keys"));
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode, Mode::Normal);
        assert!(app.editor().session().onboarding_seen);
    }

    #[test]
    fn grid_navigation_selects_colors() {
        let mut app = app();
        assert_eq!(hexes(&app), ["#0000ff", "#ff0000", "#00ff00"]);
        assert_eq!(app.editor().selected().map(Color::to_hex).as_deref(), Some("#0000ff"));
        press(&mut app, KeyCode::Right);
        assert_eq!(app.editor().selected().map(Color::to_hex).as_deref(), Some("#ff0000"));
        press(&mut app, KeyCode::End);
        assert_eq!(app.cursor, 2);
    }

    #[test]
    fn replace_via_prompt_then_undo() {
        let mut app = app();
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "black");
        press(&mut app, KeyCode::Enter);
        assert_eq!(hexes(&app), ["#000000", "#ff0000", "#00ff00"]);
        assert_eq!(app.editor().selected(), Some(Color::BLACK));
        assert!(draw(&mut app).contains("step 2/2"));

        press(&mut app, KeyCode::Char('u'));
        assert_eq!(hexes(&app), ["#0000ff", "#ff0000", "#00ff00"]);
        press(&mut app, KeyCode::Char('U'));
        assert_eq!(hexes(&app)[0], "#000000");
    }

    #[test]
    fn escape_cancels_prompt_without_editing() {
        let mut app = app();
        press(&mut app, KeyCode::Char('r'));
        type_str(&mut app, "white");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.status(), "cancelled");
        assert_eq!(app.editor().history().len(), 1);
    }

    #[test]
    fn reduce_prompt_reports_disabled() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "3");
        press(&mut app, KeyCode::Enter);
        assert!(app.status().contains("fewer than 3"));
        press(&mut app, KeyCode::Char('n'));
        type_str(&mut app, "1");
        press(&mut app, KeyCode::Enter);
        assert_eq!(hexes(&app), ["#0000ff"]);
    }

    #[test]
    fn erase_and_remap() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(hexes(&app), ["#ff0000", "#00ff00"]);
        press(&mut app, KeyCode::Char('p'));
        type_str(&mut app, "#111111, #222222");
        press(&mut app, KeyCode::Enter);
        assert_eq!(hexes(&app), ["#111111", "#222222"]);
    }

    #[test]
    fn clicking_canvas_picks_color() {
        let mut app = app();
        let canvas = app.areas.canvas;
        // left quarter of the canvas shows the red rect
        let vp = app.viewport.clone().unwrap();
        let p = vp.to_screen(Point::new(10.0, 50.0));
        click(&mut app, canvas.x + p.x as u16, canvas.y + (p.y / 2.0) as u16);
        assert_eq!(app.editor().selected(), Some(Color::new(255, 0, 0)));
        assert_eq!(app.cursor, 1);
    }

    #[test]
    fn zoom_and_minimap_recenter() {
        let mut app = app();
        press(&mut app, KeyCode::Char('+'));
        press(&mut app, KeyCode::Char('+'));
        let scale = app.viewport.as_ref().unwrap().scale;
        assert!(scale > 1.0);
        draw(&mut app);

        let inner = ratatui::widgets::Block::bordered().inner(app.areas.minimap);
        click(&mut app, inner.x, inner.y);
        let vp = app.viewport.as_ref().unwrap();
        assert_eq!(vp.scale, scale);
        let center = vp.visible_rect().center();
        assert!(center.x < 20.0 && center.y < 20.0, "{center:?}");

        press(&mut app, KeyCode::Char('0'));
        assert_eq!(app.viewport.as_ref().unwrap().scale, 1.0);
    }

    #[test]
    fn quit_asks_again_with_unsaved_changes() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }

    #[test]
    fn save_writes_current_snapshot() {
        let mut editor = Editor::default();
        editor.load_str(DOC).unwrap();
        editor.session_mut().onboarding_seen = true;
        let path = std::env::temp_dir().join(format!("svgtint-save-{}.svg", std::process::id()));
        let mut app = App::new(editor, path.clone());
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('s'));
        let saved = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(Some(saved.as_str()), app.editor().serialized());
        assert!(saved.contains("transparent"));
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit());
    }
}
