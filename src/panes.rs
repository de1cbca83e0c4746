use std::path::PathBuf;

use ratatui::layout::Rect;

use crate::{error::AppError, files::DirectorySource, viewport::Viewport};

pub const MAX_PANES: usize = 2;

/// Up to two panes side by side. The active index always points at a held
/// pane when there is one; after a close the survivor is the first pane.
#[derive(Default)]
pub struct PaneManager {
    panes: Vec<Viewport>,
    active: usize,
    screen: Rect,
}

impl PaneManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn panes(&self) -> &[Viewport] {
        &self.panes
    }

    pub fn panes_mut(&mut self) -> &mut [Viewport] {
        &mut self.panes
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active(&self) -> Option<&Viewport> {
        self.panes.get(self.active)
    }

    pub fn active_mut(&mut self) -> Option<&mut Viewport> {
        self.panes.get_mut(self.active)
    }

    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Open a pane. The first pane reads `path` (or the current directory);
    /// the second copies the first pane's contents without reading the
    /// directory again. Returns false when both slots are taken.
    pub fn create_pane<S>(&mut self, source: &S, path: Option<PathBuf>) -> Result<bool, AppError>
    where
        S: DirectorySource + ?Sized,
    {
        match self.panes.len() {
            0 => {
                let path = match path {
                    Some(path) => path,
                    None => std::env::current_dir().map_err(|source| AppError::Access {
                        path: PathBuf::from("."),
                        source,
                    })?,
                };
                let pane = Viewport::open(source, path)?;
                self.panes.push(pane);
                self.active = 0;
            }
            1 => {
                let copy = self.panes[0].clone();
                self.panes.push(copy);
                self.active = 1;
            }
            _ => {
                log::debug!("pane limit reached, not splitting");
                return Ok(false);
            }
        }
        self.relayout(self.screen);
        Ok(true)
    }

    /// Close the active pane. Only valid with two panes.
    pub fn close_pane(&mut self) -> bool {
        if self.panes.len() < MAX_PANES {
            log::debug!("refusing to close the last pane");
            return false;
        }
        self.panes.remove(self.active);
        self.active = 0;
        self.relayout(self.screen);
        true
    }

    pub fn toggle_active(&mut self) -> bool {
        if self.panes.len() < MAX_PANES {
            return false;
        }
        self.active = (self.active + 1) % self.panes.len();
        true
    }

    /// Recompute every pane rectangle for a terminal of `screen` size.
    pub fn relayout(&mut self, screen: Rect) {
        self.screen = screen;
        let areas = split_areas(screen, self.panes.len());
        for (pane, area) in self.panes.iter_mut().zip(areas) {
            pane.set_geometry(area);
        }
    }
}

/// Pane rectangles: the whole screen for one pane, two halves separated by
/// a one-column gap for two.
pub fn split_areas(screen: Rect, count: usize) -> Vec<Rect> {
    match count {
        0 => Vec::new(),
        1 => vec![screen],
        _ => {
            let first_width = screen.width.saturating_sub(1) / 2;
            let second_x = screen.x + first_width + 1;
            let second_width = screen.width.saturating_sub(first_width + 1);
            vec![
                Rect::new(screen.x, screen.y, first_width, screen.height),
                Rect::new(second_x, screen.y, second_width, screen.height),
            ]
        }
    }
}
