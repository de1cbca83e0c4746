// Key bindings, layout constants and text helpers

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

// ============================================================================
// Constants
// ============================================================================

pub const APP_NAME: &str = "tfiles";

/// Rows below the entry list: separator, path line, bottom border
pub const STATUSLINE_HEIGHT: u16 = 3;

/// Top border plus the status line
pub const PANE_CHROME_ROWS: u16 = STATUSLINE_HEIGHT + 1;

/// Longest name the text editor accepts
pub const MAX_NAME_LEN: usize = 255;

pub const DEFAULT_EDITOR: &str = "vim";
pub const FILE_OPENER: &str = "xdg-open";
pub const FUZZY_PICKER: &str = "fzf";

/// How deep the fuzzy picker candidate walk descends
pub const PICKER_MAX_DEPTH: usize = 8;

// ============================================================================
// Key Bindings
// ============================================================================

pub const KEY_NAV_DOWN: char = 'j';
pub const KEY_NAV_UP: char = 'k';
pub const KEY_NAV_PARENT: char = 'h';
pub const KEY_NAV_PARENT_ALT: char = 'b';
pub const KEY_SELECT: char = 'l';
pub const KEY_GOTO: char = 'g';
pub const KEY_GOTO_LAST: char = 'G';
pub const KEY_OPEN_DETACHED: char = 'o';
pub const KEY_CREATE_PANE: char = 'c';
pub const KEY_CLOSE_PANE: char = 'x';
pub const KEY_SWITCH_NUMBERS: char = 'n';
pub const KEY_CREATE_ENTRY: char = 'a';
pub const KEY_RENAME_ENTRY: char = 'r';
pub const KEY_DELETE_ENTRY: char = 'd';
pub const KEY_QUIT: char = 'q';

/// Find prefix and its sub-keys
pub const KEY_FIND: char = 'f';
pub const KEY_FIND_FILE: char = 'f';
pub const KEY_FIND_DIR: char = 'd';
pub const KEY_FIND_HOME: char = 'h';

/// Control and Alt combinations have no binding anywhere. Shift is part of
/// the character itself.
pub fn is_chord(key: &KeyEvent) -> bool {
    key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// Decimal value of a digit key, if it is one.
pub fn digit_value(key: KeyCode) -> Option<usize> {
    match key {
        KeyCode::Char(c) => c.to_digit(10).map(|d| d as usize),
        _ => None,
    }
}

// ============================================================================
// Text Trimming
// ============================================================================

/// Fit a path into `width` cells, chopping from the start: `~/folder1/folder2`
pub fn trim_path(path: &str, width: usize) -> String {
    let len = path.chars().count();
    if len <= width {
        return path.to_owned();
    }
    if width == 0 {
        return String::new();
    }
    let skip = len - (width - 1);
    std::iter::once('~').chain(path.chars().skip(skip)).collect()
}

/// Fit a name into `width` cells, replacing its middle with `~`: `plank~oaded`
pub fn trim_name(name: &str, width: usize) -> String {
    let len = name.chars().count();
    if len <= width {
        return name.to_owned();
    }
    if width == 0 {
        return String::new();
    }
    let head = width / 2;
    let tail = width - head - 1;
    let mut out: String = name.chars().take(head).collect();
    out.push('~');
    out.extend(name.chars().skip(len - tail));
    out
}

/// Number of decimal digits needed to print `n`
pub fn digit_count(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}
