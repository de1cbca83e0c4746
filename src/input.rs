//! Key input: events, repeat prefixes and the key map.
//!
//! Reads are blocking. A terminal resize that arrives while a key is awaited
//! is applied (layout, redraw) and the wait continues, so multi-key commands
//! survive a resize in the middle.

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::layout::Rect;

use crate::{
    app::App,
    error::AppError,
    files::FileKind,
    render::Surface,
    util::{
        KEY_CLOSE_PANE, KEY_CREATE_ENTRY, KEY_CREATE_PANE, KEY_DELETE_ENTRY, KEY_FIND, KEY_FIND_DIR,
        KEY_FIND_FILE, KEY_FIND_HOME, KEY_GOTO, KEY_GOTO_LAST, KEY_NAV_DOWN, KEY_NAV_PARENT,
        KEY_NAV_PARENT_ALT, KEY_NAV_UP, KEY_OPEN_DETACHED, KEY_QUIT, KEY_RENAME_ENTRY, KEY_SELECT,
        KEY_SWITCH_NUMBERS, digit_value, is_chord,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    Resize { cols: u16, rows: u16 },
}

pub trait EventSource {
    /// Block until the next key press or resize.
    fn next_event(&mut self) -> Result<InputEvent, AppError>;
}

/// Terminal events from crossterm. Key releases and repeats, mouse and focus
/// events are skipped.
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn next_event(&mut self) -> Result<InputEvent, AppError> {
        loop {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(InputEvent::Key(key));
                }
                Event::Resize(cols, rows) => return Ok(InputEvent::Resize { cols, rows }),
                _ => {}
            }
        }
    }
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FindRoot {
    Pane,
    Home,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    MoveDown,
    MoveUp,
    /// Absolute jump to the repeat count (0 = first entry)
    Goto,
    GotoLast,
    ParentDir,
    Open,
    OpenDetached,
    CreatePane,
    ClosePane,
    ToggleActive,
    ToggleNumbering,
    CreateEntry,
    RenameEntry,
    DeleteEntry,
    Find { kind: FileKind, root: FindRoot },
    Quit,
}

enum Binding {
    Command(Command),
    FindPrefix,
}

fn binding_for(key: KeyEvent) -> Option<Binding> {
    if is_chord(&key) {
        return None;
    }
    let command = match key.code {
        KeyCode::Down => Command::MoveDown,
        KeyCode::Up => Command::MoveUp,
        KeyCode::Left => Command::ParentDir,
        KeyCode::Right | KeyCode::Enter => Command::Open,
        KeyCode::Tab => Command::ToggleActive,
        KeyCode::Char(c) => match c {
            KEY_NAV_DOWN => Command::MoveDown,
            KEY_NAV_UP => Command::MoveUp,
            KEY_GOTO => Command::Goto,
            KEY_GOTO_LAST => Command::GotoLast,
            KEY_NAV_PARENT | KEY_NAV_PARENT_ALT => Command::ParentDir,
            KEY_SELECT => Command::Open,
            KEY_OPEN_DETACHED => Command::OpenDetached,
            KEY_CREATE_PANE => Command::CreatePane,
            KEY_CLOSE_PANE => Command::ClosePane,
            KEY_SWITCH_NUMBERS => Command::ToggleNumbering,
            KEY_CREATE_ENTRY => Command::CreateEntry,
            KEY_RENAME_ENTRY => Command::RenameEntry,
            KEY_DELETE_ENTRY => Command::DeleteEntry,
            KEY_QUIT => Command::Quit,
            KEY_FIND => return Some(Binding::FindPrefix),
            _ => return None,
        },
        _ => return None,
    };
    Some(Binding::Command(command))
}

fn find_kind(key: KeyEvent) -> Option<FileKind> {
    if is_chord(&key) {
        return None;
    }
    match key.code {
        KeyCode::Char(KEY_FIND_FILE) => Some(FileKind::Regular),
        KeyCode::Char(KEY_FIND_DIR) => Some(FileKind::Directory),
        _ => None,
    }
}

// ============================================================================
// Dispatcher
// ============================================================================

pub struct InputDispatcher<'a> {
    events: &'a mut dyn EventSource,
    surface: &'a mut dyn Surface,
}

impl<'a> InputDispatcher<'a> {
    pub fn new(events: &'a mut dyn EventSource, surface: &'a mut dyn Surface) -> Self {
        Self { events, surface }
    }

    /// Read one complete command (or one overlay key) and apply it.
    pub fn dispatch(&mut self, app: &mut App) -> Result<(), AppError> {
        let key = self.read_key(app)?;

        // Overlays take raw keys; digits are text there, not counts.
        if app.modal.is_active() {
            return app.handle_modal_key(key);
        }

        let (count, key) = self.read_count(app, key)?;
        match self.resolve(app, key)? {
            Some(command) => {
                log::trace!("command {:?} x{}", command, count);
                app.execute(command, count, &mut *self.surface)
            }
            None => {
                log::trace!("unbound key {:?}", key);
                Ok(())
            }
        }
    }

    /// Next key, applying any resizes that arrive first.
    fn read_key(&mut self, app: &mut App) -> Result<KeyEvent, AppError> {
        loop {
            match self.events.next_event()? {
                InputEvent::Key(key) => return Ok(key),
                InputEvent::Resize { cols, rows } => {
                    log::debug!("resize to {}x{}", cols, rows);
                    app.on_resize(Rect::new(0, 0, cols, rows));
                    self.surface.draw(app)?;
                }
            }
        }
    }

    /// Accumulate a decimal repeat prefix. Returns the count (0 when absent)
    /// and the first non-digit key.
    fn read_count(&mut self, app: &mut App, first: KeyEvent) -> Result<(usize, KeyEvent), AppError> {
        let mut count = 0usize;
        let mut key = first;
        while let Some(digit) = digit_value(key.code).filter(|_| !is_chord(&key)) {
            count = count.saturating_mul(10).saturating_add(digit);
            key = self.read_key(app)?;
        }
        Ok((count, key))
    }

    fn resolve(&mut self, app: &mut App, key: KeyEvent) -> Result<Option<Command>, AppError> {
        match binding_for(key) {
            None => Ok(None),
            Some(Binding::Command(command)) => Ok(Some(command)),
            Some(Binding::FindPrefix) => {
                let mut root = FindRoot::Pane;
                let mut next = self.read_key(app)?;
                if next.code == KeyCode::Char(KEY_FIND_HOME) && !is_chord(&next) {
                    root = FindRoot::Home;
                    next = self.read_key(app)?;
                }
                Ok(find_kind(next).map(|kind| Command::Find { kind, root }))
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crossterm::event::KeyModifiers;

    use super::{testing::ScriptedEvents, *};
    use crate::{
        app::testing::{NullSurface, test_app},
        files::testing::MemoryFs,
        modal::Modal,
    };

    fn many_files() -> MemoryFs {
        let names: Vec<String> = (0..40).map(|i| format!("f{:02}", i)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        MemoryFs::new().with_dir("/d", &refs)
    }

    fn feed(app: &mut App, events: &mut ScriptedEvents, surface: &mut NullSurface) {
        while events.remaining() > 0 {
            InputDispatcher::new(events, surface).dispatch(app).unwrap();
        }
    }

    fn highlight(app: &App) -> usize {
        app.panes.active().unwrap().highlight()
    }

    #[test]
    fn test_repeat_prefix_moves_down() {
        let (mut app, _) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        feed(&mut app, &mut ScriptedEvents::keys("12j"), &mut surface);
        assert_eq!(highlight(&app), 12);

        feed(&mut app, &mut ScriptedEvents::keys("3k"), &mut surface);
        assert_eq!(highlight(&app), 9);
    }

    fn position(app: &App) -> (usize, usize) {
        let pane = app.panes.active().unwrap();
        (pane.highlight(), pane.scroll())
    }

    /// Highlight and scroll after moving down by `count` directly
    fn direct_move(start: usize, count: usize, screen: Rect) -> (usize, usize) {
        let (mut app, _) = test_app(many_files(), "/d");
        app.on_resize(screen);
        let pane = app.panes.active_mut().unwrap();
        pane.goto_index(start);
        pane.move_highlight(true, count);
        position(&app)
    }

    #[test]
    fn test_typed_prefix_matches_direct_move() {
        let small = Rect::new(0, 0, 80, 10);
        for start in [0, 3, 27] {
            let (mut app, _) = test_app(many_files(), "/d");
            app.on_resize(small);
            app.panes.active_mut().unwrap().goto_index(start);
            let mut surface = NullSurface::new(80, 10);
            feed(&mut app, &mut ScriptedEvents::keys("12j"), &mut surface);
            assert_eq!(position(&app), direct_move(start, 12, small), "from row {}", start);
        }
    }

    #[test]
    fn test_resize_inside_prefix_keeps_count() {
        let small = Rect::new(0, 0, 80, 10);
        for start in [0, 3, 27] {
            let (mut app, _) = test_app(many_files(), "/d");
            app.on_resize(small);
            app.panes.active_mut().unwrap().goto_index(start);
            let mut surface = NullSurface::new(80, 10);

            let mut events = ScriptedEvents::keys("1");
            events.push(InputEvent::Resize { cols: 80, rows: 10 });
            events.push(InputEvent::Key(KeyCode::Char('2').into()));
            events.push(InputEvent::Key(KeyCode::Char('j').into()));
            feed(&mut app, &mut events, &mut surface);

            assert_eq!(surface.draws, 1);
            assert_eq!(position(&app), direct_move(start, 12, small), "from row {}", start);
        }
        // The scroll actually moved on the short screen
        assert_ne!(direct_move(27, 12, small).1, 0);
    }

    #[test]
    fn test_chords_are_unbound() {
        let (mut app, launcher) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        let mut events = ScriptedEvents::default();
        for c in ['d', 'c', 'a', 'j', 'q'] {
            events.push(InputEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)));
        }
        events.push(InputEvent::Key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::ALT)));
        events.push(InputEvent::Key(KeyCode::Char('f').into()));
        events.push(InputEvent::Key(KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL)));
        feed(&mut app, &mut events, &mut surface);

        assert!(!app.modal.is_active());
        assert_eq!(app.panes.len(), 1);
        assert_eq!(highlight(&app), 0);
        assert!(!app.should_quit);
        assert!(launcher.captures().is_empty());
    }

    #[test]
    fn test_shifted_letter_is_bound() {
        let (mut app, _) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        let mut events = ScriptedEvents::default();
        events.push(InputEvent::Key(KeyEvent::new(KeyCode::Char('G'), KeyModifiers::SHIFT)));
        feed(&mut app, &mut events, &mut surface);
        assert_eq!(highlight(&app), 39);
    }

    #[test]
    fn test_zero_goto_is_first_entry() {
        let (mut app, _) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        feed(&mut app, &mut ScriptedEvents::keys("G"), &mut surface);
        assert_eq!(highlight(&app), 39);

        feed(&mut app, &mut ScriptedEvents::keys("0g"), &mut surface);
        assert_eq!(highlight(&app), 0);

        feed(&mut app, &mut ScriptedEvents::keys("25g"), &mut surface);
        assert_eq!(highlight(&app), 25);
    }

    #[test]
    fn test_huge_prefix_saturates() {
        let (mut app, _) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        let keys = format!("{}j", "9".repeat(40));
        feed(&mut app, &mut ScriptedEvents::keys(&keys), &mut surface);
        assert_eq!(highlight(&app), 39);
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let (mut app, _) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        feed(&mut app, &mut ScriptedEvents::keys("zX"), &mut surface);
        assert_eq!(highlight(&app), 0);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_resize_during_find_sequence() {
        let fs = MemoryFs::new()
            .with_dir("/d", &["src/"])
            .with_dir("/d/src", &["main.rs", "lib.rs"]);
        let (mut app, launcher) = test_app(fs, "/d");
        launcher.queue_pick("src/main.rs");
        let mut surface = NullSurface::new(100, 30);

        let mut events = ScriptedEvents::keys("f");
        events.push(InputEvent::Resize { cols: 100, rows: 30 });
        events.push(InputEvent::Key(KeyCode::Char('f').into()));
        feed(&mut app, &mut events, &mut surface);

        assert_eq!(surface.draws, 1);
        assert_eq!(app.panes.screen(), Rect::new(0, 0, 100, 30));
        let pane = app.panes.active().unwrap();
        assert_eq!(pane.path(), Path::new("/d/src"));
        assert_eq!(pane.selected_entry().unwrap().name, "main.rs");
        assert_eq!(launcher.captures(), [PathBuf::from("/d")]);
    }

    #[test]
    fn test_find_directory_prefix() {
        let fs = MemoryFs::new()
            .with_dir("/d", &["a/"])
            .with_dir("/d/a", &["deep/"])
            .with_dir("/d/a/deep", &["x"]);
        let (mut app, launcher) = test_app(fs, "/d");
        launcher.queue_pick("a/deep");
        let mut surface = NullSurface::new(80, 24);
        feed(&mut app, &mut ScriptedEvents::keys("fd"), &mut surface);
        assert_eq!(app.panes.active().unwrap().path(), Path::new("/d/a/deep"));
    }

    #[test]
    fn test_find_with_bad_suffix_does_nothing() {
        let (mut app, launcher) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        feed(&mut app, &mut ScriptedEvents::keys("fz"), &mut surface);
        assert!(launcher.captures().is_empty());
    }

    #[test]
    fn test_digits_go_to_open_overlay() {
        let (mut app, _) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        feed(&mut app, &mut ScriptedEvents::keys("a12j"), &mut surface);
        let Modal::TextEdit(dialog) = &app.modal else {
            panic!("expected text edit overlay");
        };
        assert_eq!(dialog.buffer().text(), "12j");
        assert_eq!(highlight(&app), 0);
    }

    #[test]
    fn test_quit() {
        let (mut app, _) = test_app(many_files(), "/d");
        let mut surface = NullSurface::new(80, 24);
        feed(&mut app, &mut ScriptedEvents::keys("q"), &mut surface);
        assert!(app.should_quit);
    }
}
