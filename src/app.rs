use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::backend::Backend;
use ratatui::layout::Rect;
use ratatui::Terminal;

use crate::edit::{EditField, EditSession};
use crate::render::{self, Row};
use crate::scrollbar::ScrollDrag;
use crate::store::TaskStore;

/// How long a deleted row stays visible in its leaving state before the
/// actual removal runs.
pub const DELETE_DELAY: Duration = Duration::from_millis(350);

const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Input,
    List,
}

/// A deletion inside its leave transition. The row is still in the list and
/// still rendered (flagged leaving); the removal runs at `deadline`, or
/// earlier if any other mutation needs the indices settled first.
#[derive(Debug, Clone, Copy)]
struct PendingDelete {
    index: usize,
    deadline: Instant,
}

/// Interactive region the view registers while drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Input,
    Toggle(usize),
    EditRow(usize),
    DeleteRow(usize),
    DeleteAll,
    Thumb,
    ListBody,
}

/// Screen geometry reported by the last draw; consumed by mouse handling.
#[derive(Debug, Clone, Default)]
pub struct Surface {
    zones: Vec<(Rect, Zone)>,
    pub list_area: Rect,
    pub track_area: Rect,
    pub thumb_height: u16,
}

impl Surface {
    pub fn clear(&mut self) {
        self.zones.clear();
        self.thumb_height = 0;
    }

    pub fn register(&mut self, rect: Rect, zone: Zone) {
        self.zones.push((rect, zone));
    }

    /// Top-most zone under the given terminal cell.
    pub fn hit(&self, column: u16, row: u16) -> Option<Zone> {
        self.zones
            .iter()
            .rev()
            .find(|(rect, _)| rect.contains(ratatui::layout::Position { x: column, y: row }))
            .map(|(_, zone)| *zone)
    }
}

/// All mutable state of the editor, owned in one place and handed to the
/// view by reference. No ambient globals.
pub struct App {
    pub store: TaskStore,
    pub focus: Focus,
    pub input: EditField,
    pub edit: Option<EditSession>,
    pub selected: usize,
    pub scroll: usize,
    pub surface: Surface,
    pub should_quit: bool,
    pending_delete: Option<PendingDelete>,
    drag: Option<ScrollDrag>,
}

impl App {
    pub fn new(store: TaskStore) -> Self {
        Self {
            store,
            focus: Focus::Input,
            input: EditField::new(),
            edit: None,
            selected: 0,
            scroll: 0,
            surface: Surface::default(),
            should_quit: false,
            pending_delete: None,
            drag: None,
        }
    }

    /// The display rows for the current state, rebuilt from scratch.
    pub fn rows(&self) -> Vec<Row> {
        render::rows(
            self.store.tasks(),
            self.edit.as_ref(),
            self.pending_delete.map(|pending| pending.index),
        )
    }

    pub fn summary(&self) -> String {
        render::summarize(self.store.tasks())
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_delete.map(|pending| pending.deadline)
    }

    /// Runs the pending removal once its delay has elapsed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(pending) = self.pending_delete {
            if now >= pending.deadline {
                self.apply_pending_delete();
            }
        }
    }

    // --- mutations -------------------------------------------------------

    /// Creates a task from the input field. The field is cleared only when
    /// a task was actually added; whitespace-only input is left in place.
    pub fn submit_input(&mut self) {
        self.apply_pending_delete();
        let before = self.store.len();
        self.store.create(self.input.content());
        if self.store.len() > before {
            self.input.clear();
            self.selected = self.store.len() - 1;
            self.ensure_selected_visible();
        }
    }

    pub fn toggle(&mut self, index: usize) {
        self.commit_edit();
        if let Some(index) = self.resolve_index(index) {
            self.store.toggle_complete(index);
        }
    }

    /// Enters edit mode on a row. Any active session commits first, and a
    /// pending deletion resolves first, so the session can never reference
    /// an index about to shift.
    pub fn request_edit(&mut self, index: usize) {
        self.commit_edit();
        let Some(index) = self.resolve_index(index) else {
            return;
        };
        if let Some(task) = self.store.tasks().get(index) {
            self.edit = Some(EditSession::begin(index, &task.text));
            self.selected = index;
            self.focus = Focus::List;
            self.ensure_selected_visible();
        }
    }

    /// Commits the active edit session, if any. An empty field discards the
    /// change (the rename no-ops). There is no cancel path: every way out
    /// of edit mode lands here.
    pub fn commit_edit(&mut self) {
        if let Some(session) = self.edit.take() {
            self.store.rename(session.index(), session.text());
        }
    }

    /// Starts the two-phase deletion of a row: mark it leaving now, remove
    /// it after [`DELETE_DELAY`]. An earlier pending deletion resolves
    /// immediately.
    pub fn request_delete(&mut self, index: usize) {
        self.commit_edit();
        let Some(index) = self.resolve_index(index) else {
            return;
        };
        if index < self.store.len() {
            self.pending_delete = Some(PendingDelete {
                index,
                deadline: Instant::now() + DELETE_DELAY,
            });
        }
    }

    pub fn clear_all(&mut self) {
        // The pending row is part of the wholesale clear; no need to
        // resolve it separately.
        self.pending_delete = None;
        self.edit = None;
        self.store.delete_all();
        self.selected = 0;
        self.scroll = 0;
        self.focus = Focus::Input;
    }

    /// Performs the outstanding removal now and reports the removed index.
    fn apply_pending_delete(&mut self) -> Option<usize> {
        let pending = self.pending_delete.take()?;
        self.remove_row(pending.index);
        Some(pending.index)
    }

    /// Translates an index taken from the current render into the list as
    /// it stands after resolving the pending deletion. `None` means the
    /// index referred to the removed row itself.
    fn resolve_index(&mut self, index: usize) -> Option<usize> {
        match self.apply_pending_delete() {
            Some(removed) if index == removed => None,
            Some(removed) if index > removed => Some(index - 1),
            _ => Some(index),
        }
    }

    fn remove_row(&mut self, index: usize) {
        self.store.delete_at(index);
        if let Some(mut session) = self.edit.take() {
            if session.shift_after_removal(index) {
                self.edit = Some(session);
            }
        }
        if self.selected > index {
            self.selected -= 1;
        }
        if self.selected >= self.store.len() {
            self.selected = self.store.len().saturating_sub(1);
        }
        if self.store.is_empty() {
            self.focus = Focus::Input;
        }
        self.clamp_scroll();
    }

    // --- viewport --------------------------------------------------------

    fn viewport_height(&self) -> usize {
        self.surface.list_area.height as usize
    }

    pub(crate) fn clamp_scroll(&mut self) {
        let max = self.store.len().saturating_sub(self.viewport_height());
        if self.scroll > max {
            self.scroll = max;
        }
    }

    fn ensure_selected_visible(&mut self) {
        let height = self.viewport_height();
        if height == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + height {
            self.scroll = self.selected - height + 1;
        }
    }

    // --- input wiring ----------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.edit.is_some() {
            self.handle_edit_key(key);
            return;
        }
        match self.focus {
            Focus::Input => self.handle_input_key(key),
            Focus::List => self.handle_list_key(key),
        }
    }

    fn handle_input_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.submit_input(),
            KeyCode::Char(c) => self.input.insert_char(c),
            KeyCode::Backspace => self.input.backspace(),
            KeyCode::Delete => self.input.delete_forward(),
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            KeyCode::Home => self.input.move_start(),
            KeyCode::End => self.input.move_end(),
            KeyCode::Tab | KeyCode::Down => {
                if !self.store.is_empty() {
                    self.focus = Focus::List;
                    self.ensure_selected_visible();
                }
            }
            KeyCode::Esc => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => self.focus = Focus::Input,
            KeyCode::Up | KeyCode::Char('k') => {
                if self.selected == 0 {
                    self.focus = Focus::Input;
                } else {
                    self.selected -= 1;
                    self.ensure_selected_visible();
                }
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.store.len() {
                    self.selected += 1;
                    self.ensure_selected_visible();
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('x') => self.toggle(self.selected),
            KeyCode::Enter | KeyCode::Char('e') => self.request_edit(self.selected),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(self.selected),
            KeyCode::Char('D') => self.clear_all(),
            _ => {}
        }
    }

    /// Keys while an edit session is active. Enter, Esc, and Tab all leave
    /// edit mode through a commit; losing focus never discards.
    fn handle_edit_key(&mut self, key: KeyEvent) {
        let Some(session) = self.edit.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.commit_edit(),
            KeyCode::Tab => {
                self.commit_edit();
                self.focus = Focus::Input;
            }
            KeyCode::Char(c) => session.field.insert_char(c),
            KeyCode::Backspace => session.field.backspace(),
            KeyCode::Delete => session.field.delete_forward(),
            KeyCode::Left => session.field.move_left(),
            KeyCode::Right => session.field.move_right(),
            KeyCode::Home => session.field.move_start(),
            KeyCode::End => session.field.move_end(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_press(mouse.column, mouse.row),
            MouseEventKind::Drag(MouseButton::Left) => self.handle_drag(mouse.row),
            // Drag state clears wherever the release lands.
            MouseEventKind::Up(_) => self.drag = None,
            MouseEventKind::ScrollDown => {
                self.scroll += 1;
                self.clamp_scroll();
            }
            MouseEventKind::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn handle_press(&mut self, column: u16, row: u16) {
        let Some(zone) = self.surface.hit(column, row) else {
            // Clicking dead space is a focus loss for an active edit.
            self.commit_edit();
            return;
        };
        match zone {
            Zone::Input => {
                self.commit_edit();
                self.focus = Focus::Input;
            }
            Zone::Toggle(index) => self.toggle(index),
            Zone::EditRow(index) => self.request_edit(index),
            Zone::DeleteRow(index) => self.request_delete(index),
            Zone::DeleteAll => self.clear_all(),
            Zone::Thumb => {
                self.drag = Some(ScrollDrag::begin(f64::from(row), self.scroll as f64));
            }
            Zone::ListBody => {
                self.commit_edit();
                let offset = row.saturating_sub(self.surface.list_area.y) as usize;
                let index = self.scroll + offset;
                if index < self.store.len() {
                    self.selected = index;
                    self.focus = Focus::List;
                }
            }
        }
    }

    fn handle_drag(&mut self, row: u16) {
        let Some(drag) = self.drag else {
            return;
        };
        let scroll = drag.update(
            f64::from(row),
            self.store.len() as f64,
            self.viewport_height() as f64,
            f64::from(self.surface.track_area.height),
            f64::from(self.surface.thumb_height),
        );
        self.scroll = scroll.round() as usize;
        self.clamp_scroll();
    }
}

/// Draw-then-wait loop. The poll timeout shrinks to the pending-deletion
/// deadline so the removal fires on time without a timer thread.
pub fn run(terminal: &mut Terminal<impl Backend>, app: &mut App) -> std::io::Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| crate::ui::draw(frame, app))?;
        let timeout = app
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
            .unwrap_or(TICK)
            .min(TICK);
        if crossterm::event::poll(timeout)? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => app.handle_key(key),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
        app.tick(Instant::now());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn make_app(texts: &[&str]) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let storage = Storage::new(dir.path().to_path_buf());
        storage.ensure_dirs().expect("ensure dirs");
        let mut store = TaskStore::open(storage);
        for text in texts {
            store.create(text);
        }
        (dir, App::new(store))
    }

    fn texts(app: &App) -> Vec<String> {
        app.store.tasks().iter().map(|t| t.text.clone()).collect()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn delete_keeps_row_until_deadline() {
        let (_dir, mut app) = make_app(&["A", "B"]);
        app.request_delete(0);
        assert_eq!(app.store.len(), 2);
        let rows = app.rows();
        assert!(rows[0].leaving);
        assert!(!rows[1].leaving);

        // Before the deadline nothing is removed.
        app.tick(Instant::now());
        assert_eq!(app.store.len(), 2);

        // After the deadline the row is gone.
        app.tick(Instant::now() + DELETE_DELAY);
        assert_eq!(texts(&app), ["B"]);
        assert!(app.next_deadline().is_none());
    }

    #[test]
    fn second_delete_resolves_the_first_without_stale_indices() {
        let (_dir, mut app) = make_app(&["A", "B", "C"]);
        app.request_delete(0);
        // Index 2 still refers to C in the rendered list that includes A.
        app.request_delete(2);
        assert_eq!(texts(&app), ["B", "C"]);
        app.tick(Instant::now() + DELETE_DELAY);
        assert_eq!(texts(&app), ["B"]);
    }

    #[test]
    fn mutation_resolves_pending_delete_first() {
        let (_dir, mut app) = make_app(&["A", "B"]);
        app.request_delete(0);
        // Toggling what the user saw as row 1 (B) must hit B, not A's slot.
        app.toggle(1);
        assert_eq!(texts(&app), ["B"]);
        assert!(app.store.tasks()[0].completed);
        assert!(app.next_deadline().is_none());
    }

    #[test]
    fn editing_a_row_pending_deletion_is_refused() {
        let (_dir, mut app) = make_app(&["A", "B"]);
        app.request_delete(0);
        app.request_edit(0);
        assert!(app.edit.is_none());
        assert_eq!(texts(&app), ["B"]);
    }

    #[test]
    fn editing_another_row_shifts_past_the_resolved_deletion() {
        let (_dir, mut app) = make_app(&["A", "B"]);
        app.request_delete(0);
        app.request_edit(1);
        let session = app.edit.as_ref().expect("edit session");
        assert_eq!(session.index(), 0);
        assert_eq!(session.text(), "B");
    }

    #[test]
    fn commit_applies_the_revised_text() {
        let (_dir, mut app) = make_app(&["draft"]);
        app.request_edit(0);
        let field = &mut app.edit.as_mut().expect("session").field;
        field.insert_char('!');
        app.commit_edit();
        assert!(app.edit.is_none());
        assert_eq!(texts(&app), ["draft!"]);
    }

    #[test]
    fn emptied_field_discards_the_edit_on_commit() {
        let (_dir, mut app) = make_app(&["keep"]);
        app.request_edit(0);
        app.edit.as_mut().expect("session").field.clear();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.edit.is_none());
        assert_eq!(texts(&app), ["keep"]);
    }

    #[test]
    fn focus_loss_commits_the_edit() {
        let (_dir, mut app) = make_app(&["task"]);
        app.request_edit(0);
        app.handle_key(key(KeyCode::Char('s')));
        app.handle_key(key(KeyCode::Tab));
        assert!(app.edit.is_none());
        assert_eq!(app.focus, Focus::Input);
        assert_eq!(texts(&app), ["tasks"]);
    }

    #[test]
    fn starting_a_second_edit_commits_the_first() {
        let (_dir, mut app) = make_app(&["one", "two"]);
        app.request_edit(0);
        app.edit.as_mut().expect("session").field.insert_char('!');
        app.request_edit(1);
        assert_eq!(texts(&app), ["one!", "two"]);
        assert_eq!(app.edit.as_ref().expect("session").index(), 1);
    }

    #[test]
    fn submit_clears_input_only_on_success() {
        let (_dir, mut app) = make_app(&[]);
        for c in "  ".chars() {
            app.input.insert_char(c);
        }
        app.submit_input();
        assert_eq!(app.store.len(), 0);
        assert_eq!(app.input.content(), "  ");

        for c in "real task".chars() {
            app.input.insert_char(c);
        }
        app.submit_input();
        assert_eq!(texts(&app), ["real task"]);
        assert_eq!(app.input.content(), "");
    }

    #[test]
    fn typed_input_flows_through_key_events() {
        let (_dir, mut app) = make_app(&[]);
        for c in "hi".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(texts(&app), ["hi"]);
    }

    #[test]
    fn clear_all_drops_everything_including_pending_state() {
        let (_dir, mut app) = make_app(&["a", "b", "c"]);
        app.request_delete(1);
        app.clear_all();
        assert!(app.store.is_empty());
        assert!(app.next_deadline().is_none());
        assert_eq!(app.summary(), "Your list is empty!");
    }

    #[test]
    fn toggle_pairs_restore_the_original_flag() {
        let (_dir, mut app) = make_app(&["t"]);
        app.toggle(0);
        app.toggle(0);
        assert!(!app.store.tasks()[0].completed);
    }

    #[test]
    fn ctrl_c_quits_even_mid_edit() {
        let (_dir, mut app) = make_app(&["t"]);
        app.request_edit(0);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn mouse_release_always_clears_the_drag() {
        let (_dir, mut app) = make_app(&["a", "b"]);
        app.drag = Some(ScrollDrag::begin(3.0, 0.0));
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Up(MouseButton::Left),
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert!(app.drag.is_none());
    }

    #[test]
    fn wheel_scroll_clamps_to_content() {
        let (_dir, mut app) = make_app(&["a", "b"]);
        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.scroll, 0);
    }
}
