//! One directory pane: listing, highlight and scroll state.
//!
//! Invariants kept by every operation when the listing is non-empty:
//! `highlight < len` and `scroll <= highlight < scroll + visible_rows`.

use std::{
    ops::Range,
    path::{Path, PathBuf},
    time::SystemTime,
};

use ratatui::layout::Rect;

use crate::{
    error::AppError,
    files::{DirectorySource, Entry, FileList, load_file_list},
    util::PANE_CHROME_ROWS,
};

#[derive(Clone, Debug)]
pub struct Viewport {
    path: PathBuf,
    files: FileList,
    highlight: usize,
    scroll: usize,
    area: Rect,
    pub relative_numbering: bool,
    /// Directory mtime seen at the last reload
    modified: Option<SystemTime>,
}

impl Viewport {
    pub fn open<S>(source: &S, path: PathBuf) -> Result<Self, AppError>
    where
        S: DirectorySource + ?Sized,
    {
        let files = load_file_list(source, &path)?;
        let modified = source.modified(&path);
        Ok(Self {
            path,
            files,
            highlight: 0,
            scroll: 0,
            area: Rect::default(),
            relative_numbering: false,
            modified,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn files(&self) -> &FileList {
        &self.files
    }

    pub fn highlight(&self) -> usize {
        self.highlight
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    /// Entry rows inside the pane chrome, never less than one
    pub fn visible_rows(&self) -> usize {
        (self.area.height.saturating_sub(PANE_CHROME_ROWS) as usize).max(1)
    }

    /// Indices of the entries currently on screen
    pub fn visible_range(&self) -> Range<usize> {
        let end = self
            .scroll
            .saturating_add(self.visible_rows())
            .min(self.files.len());
        self.scroll.min(end)..end
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.files.get(self.highlight)
    }

    pub fn selected_path(&self) -> Option<PathBuf> {
        self.selected_entry().map(|e| self.path.join(&e.name))
    }

    // ========================================================================
    // Movement
    // ========================================================================

    /// Move the highlight by `count` entries (0 means 1). Counts past either
    /// end stop at the boundary entry.
    pub fn move_highlight(&mut self, down: bool, count: usize) {
        let len = self.files.len();
        if len == 0 {
            return;
        }
        let step = count.max(1);
        let rows = self.visible_rows();

        if down {
            if self.highlight + 1 >= len {
                return;
            }
            let target = self.highlight.saturating_add(step);
            self.highlight = if count >= len || target >= len {
                len - 1
            } else {
                target
            };

            if self.highlight + 1 >= self.scroll + rows {
                // highlight > len - rows
                if self.highlight + rows > len {
                    self.scroll = (len + 1).saturating_sub(rows);
                } else {
                    self.scroll = self.scroll.saturating_add(step);
                }
            }
        } else {
            if self.highlight == 0 {
                return;
            }
            self.highlight = if count >= len || self.highlight < step {
                0
            } else {
                self.highlight - step
            };

            if self.highlight < self.scroll {
                self.scroll = self.scroll.saturating_sub(step);
            }
        }

        self.keep_visible();
    }

    /// Jump to entry `index`, clamped to the last entry. Index 0 is the first entry.
    pub fn goto_index(&mut self, index: usize) {
        let len = self.files.len();
        if len == 0 {
            return;
        }
        let index = index.min(len - 1);
        self.highlight = 0;
        self.scroll = 0;
        if index > 0 {
            self.move_highlight(true, index);
        }
    }

    pub fn goto_last(&mut self) {
        self.goto_index(usize::MAX);
    }

    fn keep_visible(&mut self) {
        let rows = self.visible_rows();
        if self.highlight < self.scroll {
            self.scroll = self.highlight;
        } else if self.highlight >= self.scroll + rows {
            self.scroll = self.highlight + 1 - rows;
        }
    }

    /// Adopt a new pane rectangle. Scroll only advances, and only as far as
    /// needed to keep the highlight on screen.
    pub fn set_geometry(&mut self, area: Rect) {
        self.area = area;
        let rows = self.visible_rows();
        if self.highlight >= self.scroll + rows {
            self.scroll = self.highlight + 1 - rows;
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Replace the listing with the one at `path`. The highlight lands on
    /// `remember` when it is present, otherwise on the first entry. On error
    /// the pane is left untouched.
    pub fn reload<S>(&mut self, source: &S, path: PathBuf, remember: Option<&str>) -> Result<(), AppError>
    where
        S: DirectorySource + ?Sized,
    {
        let files = load_file_list(source, &path)?;
        self.modified = source.modified(&path);
        self.path = path;
        self.files = files;
        self.highlight = 0;
        self.scroll = 0;

        if let Some(index) = remember.and_then(|name| self.files.position(name)) {
            self.goto_index(index);
        }
        Ok(())
    }

    /// Reload the current directory, keeping the highlighted name if it survives.
    pub fn refresh<S>(&mut self, source: &S) -> Result<(), AppError>
    where
        S: DirectorySource + ?Sized,
    {
        let keep = self.selected_entry().map(|e| e.name.clone());
        let path = self.path.clone();
        self.reload(source, path, keep.as_deref())
    }

    /// Go to the parent directory and highlight the directory we came from.
    /// Returns false when already at the root.
    pub fn enter_parent<S>(&mut self, source: &S) -> Result<bool, AppError>
    where
        S: DirectorySource + ?Sized,
    {
        let Some(parent) = self.path.parent().map(Path::to_path_buf) else {
            return Ok(false);
        };
        let child = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.reload(source, parent, child.as_deref())?;
        Ok(true)
    }

    /// Move up to the nearest ancestor that can still be listed. Returns
    /// false, leaving the pane untouched, when none can.
    pub fn retreat<S>(&mut self, source: &S) -> bool
    where
        S: DirectorySource + ?Sized,
    {
        let mut candidate = self.path.parent().map(Path::to_path_buf);
        while let Some(dir) = candidate {
            candidate = dir.parent().map(Path::to_path_buf);
            if self.reload(source, dir, None).is_ok() {
                return true;
            }
        }
        false
    }

    /// Take the directory's current mtime as seen, without reloading.
    pub fn mark_seen<S>(&mut self, source: &S)
    where
        S: DirectorySource + ?Sized,
    {
        self.modified = source.modified(&self.path);
    }

    /// Whether the directory changed on disk since the last reload
    pub fn is_stale<S>(&self, source: &S) -> bool
    where
        S: DirectorySource + ?Sized,
    {
        source.modified(&self.path) != self.modified
    }
}
