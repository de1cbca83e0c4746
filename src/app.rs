//! Application context: panes, the open overlay and the collaborators, plus
//! the command handlers the input dispatcher drives.

use std::{
    env,
    path::{Path, PathBuf},
};

use crossterm::event::KeyEvent;
use ratatui::layout::Rect;

use crate::{
    config::Config,
    error::AppError,
    files::{FileKind, Filesystem, parse_new_entry, split_picked},
    input::{Command, EventSource, FindRoot, InputDispatcher},
    launcher::{Launcher, picker_candidates},
    modal::{ConfirmDialog, DialogResult, EditOutcome, EditPurpose, MessageBox, Modal, TextEditDialog},
    panes::PaneManager,
    render::Surface,
    util::{FILE_OPENER, FUZZY_PICKER, is_chord},
};

pub struct App {
    pub config: Config,
    pub panes: PaneManager,
    pub modal: Modal,
    pub should_quit: bool,
    fs: Box<dyn Filesystem>,
    launcher: Box<dyn Launcher>,
}

impl App {
    /// Open the first pane on the configured start directory (or the current
    /// one). Failing to open it ends the program.
    pub fn new(
        config: Config,
        fs: Box<dyn Filesystem>,
        launcher: Box<dyn Launcher>,
    ) -> Result<Self, AppError> {
        let start = match &config.start_path {
            Some(path) => path.clone(),
            None => env::current_dir().map_err(|source| AppError::StartDir {
                path: PathBuf::from("."),
                source,
            })?,
        };
        let start = fs.resolve(&start);
        if fs.classify(&start) != FileKind::Directory {
            return Err(AppError::StartDir {
                path: start,
                source: std::io::Error::from(std::io::ErrorKind::NotADirectory),
            });
        }

        let mut panes = PaneManager::new();
        panes
            .create_pane(&*fs, Some(start.clone()))
            .map_err(|err| match err {
                AppError::Access { path, source } => AppError::StartDir { path, source },
                other => other,
            })?;
        log::info!("started in {}", start.display());

        Ok(Self {
            config,
            panes,
            modal: Modal::None,
            should_quit: false,
            fs,
            launcher,
        })
    }

    /// Main loop: poll for changes and finished children, draw, then block on
    /// one command.
    pub fn run(&mut self, surface: &mut dyn Surface, events: &mut dyn EventSource) -> Result<(), AppError> {
        let (cols, rows) = surface.size()?;
        self.on_resize(Rect::new(0, 0, cols, rows));

        while !self.should_quit {
            self.refresh_if_stale();
            self.launcher.reap_finished();
            surface.draw(self)?;
            InputDispatcher::new(events, surface).dispatch(self)?;
        }
        log::info!("quit");
        Ok(())
    }

    pub fn on_resize(&mut self, screen: Rect) {
        self.panes.relayout(screen);
        self.modal.on_resize(screen);
    }

    /// Reload the active pane when its directory changed on disk. A pane whose
    /// directory was removed moves up to the nearest ancestor that still lists.
    pub fn refresh_if_stale(&mut self) {
        let Some(pane) = self.panes.active_mut() else {
            return;
        };
        if !pane.is_stale(&*self.fs) {
            return;
        }
        log::debug!("{} changed on disk, reloading", pane.path().display());
        if let Err(err) = pane.refresh(&*self.fs) {
            log::warn!("refresh failed: {}", err);
            let gone = self.fs.classify(pane.path()) != FileKind::Directory;
            if gone && pane.retreat(&*self.fs) {
                log::info!("directory gone, moved up to {}", pane.path().display());
            } else {
                // Not retried until the directory changes again
                pane.mark_seen(&*self.fs);
            }
        }
    }

    fn show_error(&mut self, err: &AppError) {
        log::warn!("{}", err);
        self.modal = Modal::Message(MessageBox::error(err.user_message()));
    }

    /// Recoverable errors become an error overlay; fatal ones propagate.
    fn recover(&mut self, result: Result<(), AppError>) -> Result<(), AppError> {
        match result {
            Err(err) if !err.is_fatal() => {
                self.show_error(&err);
                Ok(())
            }
            other => other,
        }
    }

    // ========================================================================
    // Commands
    // ========================================================================

    pub fn execute(&mut self, command: Command, count: usize, surface: &mut dyn Surface) -> Result<(), AppError> {
        let result = self.run_command(command, count, surface);
        self.recover(result)
    }

    fn run_command(&mut self, command: Command, count: usize, surface: &mut dyn Surface) -> Result<(), AppError> {
        match command {
            Command::Quit => self.should_quit = true,
            Command::CreatePane => {
                self.panes.create_pane(&*self.fs, None)?;
            }
            Command::ClosePane => {
                self.panes.close_pane();
            }
            Command::ToggleActive => {
                self.panes.toggle_active();
            }
            Command::OpenDetached => self.open_detached(surface)?,
            Command::Open => self.open_selected(surface)?,
            Command::CreateEntry => self.begin_create()?,
            Command::RenameEntry => self.begin_rename()?,
            Command::DeleteEntry => self.begin_delete(),
            Command::Find { kind, root } => self.find(kind, root, surface)?,
            _ => self.navigate(command, count)?,
        }
        Ok(())
    }

    fn navigate(&mut self, command: Command, count: usize) -> Result<(), AppError> {
        let Some(pane) = self.panes.active_mut() else {
            return Ok(());
        };
        match command {
            Command::MoveDown => pane.move_highlight(true, count),
            Command::MoveUp => pane.move_highlight(false, count),
            Command::Goto => pane.goto_index(count),
            Command::GotoLast => pane.goto_last(),
            Command::ToggleNumbering => pane.relative_numbering = !pane.relative_numbering,
            Command::ParentDir => {
                if !pane.enter_parent(&*self.fs)? {
                    log::debug!("already at the root");
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Directories are entered; files go to the editor in the foreground.
    fn open_selected(&mut self, surface: &mut dyn Surface) -> Result<(), AppError> {
        let Some(pane) = self.panes.active_mut() else {
            return Ok(());
        };
        let (Some(entry), Some(path)) = (pane.selected_entry(), pane.selected_path()) else {
            return Ok(());
        };

        if entry.is_dir() {
            return pane.reload(&*self.fs, path, None);
        }

        let (program, mut args) = self.config.editor_command();
        args.push(path.to_string_lossy().into_owned());
        log::info!("editing {}", path.display());
        let success = self.with_terminal_released(surface, |launcher| launcher.run_foreground(&program, &args))?;
        if !success {
            self.modal = Modal::Message(MessageBox::error(format!("{} exited with an error", program)));
        }
        Ok(())
    }

    fn open_detached(&mut self, surface: &mut dyn Surface) -> Result<(), AppError> {
        let Some(path) = self.panes.active().and_then(|p| p.selected_path()) else {
            return Ok(());
        };
        let args = [path.to_string_lossy().into_owned()];
        log::info!("opening {} with {}", path.display(), FILE_OPENER);
        self.with_terminal_released(surface, |launcher| launcher.run_detached(FILE_OPENER, &args))
    }

    fn find(&mut self, kind: FileKind, root: FindRoot, surface: &mut dyn Surface) -> Result<(), AppError> {
        let root = match root {
            FindRoot::Pane => match self.panes.active() {
                Some(pane) => pane.path().to_path_buf(),
                None => return Ok(()),
            },
            FindRoot::Home => match env::var_os("HOME") {
                Some(home) => PathBuf::from(home),
                None => {
                    log::warn!("HOME is not set, cannot search it");
                    return Ok(());
                }
            },
        };

        let candidates = picker_candidates(&root, kind);
        let picked = self.with_terminal_released(surface, |launcher| {
            launcher.run_capture(FUZZY_PICKER, &[], &root, &candidates)
        })?;
        let Some(picked) = picked else {
            log::debug!("picker returned nothing");
            return Ok(());
        };

        let (dir, name) = split_picked(&root, &picked, kind);
        if let Some(pane) = self.panes.active_mut() {
            pane.reload(&*self.fs, dir, name.as_deref())?;
        }
        Ok(())
    }

    /// Hand the terminal to a child process and take it back afterwards.
    /// The layout is recomputed from the reclaimed size since resizes that
    /// happened meanwhile were never delivered to us.
    fn with_terminal_released<T>(
        &mut self,
        surface: &mut dyn Surface,
        run: impl FnOnce(&mut dyn Launcher) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        surface.release()?;
        let result = run(self.launcher.as_mut());
        surface.reclaim()?;
        let (cols, rows) = surface.size()?;
        self.on_resize(Rect::new(0, 0, cols, rows));
        result
    }

    // ========================================================================
    // Overlays
    // ========================================================================

    fn begin_create(&mut self) -> Result<(), AppError> {
        let Some(pane) = self.panes.active() else {
            return Ok(());
        };
        let purpose = EditPurpose::Create {
            dir: pane.path().to_path_buf(),
        };
        self.modal = Modal::TextEdit(TextEditDialog::new(purpose, self.panes.screen())?);
        Ok(())
    }

    fn begin_rename(&mut self) -> Result<(), AppError> {
        let Some(pane) = self.panes.active() else {
            return Ok(());
        };
        let Some(entry) = pane.selected_entry() else {
            return Ok(());
        };
        let purpose = EditPurpose::Rename {
            dir: pane.path().to_path_buf(),
            original: entry.name.clone(),
        };
        self.modal = Modal::TextEdit(TextEditDialog::new(purpose, self.panes.screen())?);
        Ok(())
    }

    fn begin_delete(&mut self) {
        let Some(pane) = self.panes.active() else {
            return;
        };
        let (Some(entry), Some(target)) = (pane.selected_entry(), pane.selected_path()) else {
            return;
        };
        let prompt = if entry.is_dir() {
            format!("Delete directory \"{}\" and all its contents?", entry.name)
        } else {
            format!("Delete file \"{}\"?", entry.name)
        };
        self.modal = Modal::Confirm(ConfirmDialog::new(prompt, target));
    }

    /// Route a key to the open overlay. Closing overlays apply their effect.
    /// Control and Alt chords only dismiss a message.
    pub fn handle_modal_key(&mut self, key: KeyEvent) -> Result<(), AppError> {
        if is_chord(&key) && matches!(self.modal, Modal::Confirm(_) | Modal::TextEdit(_)) {
            log::trace!("chord {:?} ignored by overlay", key);
            return Ok(());
        }
        let key = key.code;
        let result = match std::mem::take(&mut self.modal) {
            Modal::None => Ok(()),
            Modal::Message(_) => Ok(()),
            Modal::Confirm(mut dialog) => match dialog.handle_key(key) {
                DialogResult::Pending => {
                    self.modal = Modal::Confirm(dialog);
                    Ok(())
                }
                DialogResult::Accept => self.delete(&dialog.target),
                DialogResult::Reject => {
                    log::debug!("delete of {} cancelled", dialog.target.display());
                    Ok(())
                }
            },
            Modal::TextEdit(mut dialog) => match dialog.handle_key(key)? {
                EditOutcome::Pending => {
                    self.modal = Modal::TextEdit(dialog);
                    Ok(())
                }
                EditOutcome::Confirmed(text) => self.apply_edit(dialog.purpose, &text),
                EditOutcome::Cancelled => Ok(()),
            },
        };
        self.recover(result)
    }

    fn delete(&mut self, target: &Path) -> Result<(), AppError> {
        self.fs.delete(target)?;
        log::info!("deleted {}", target.display());
        match target.parent() {
            Some(dir) => self.reload_dir(dir, None),
            None => Ok(()),
        }
    }

    fn apply_edit(&mut self, purpose: EditPurpose, text: &str) -> Result<(), AppError> {
        if text.trim().is_empty() {
            return Ok(());
        }
        match purpose {
            EditPurpose::Create { dir } => {
                self.fs.create(&dir, text)?;
                log::info!("created {} in {}", text, dir.display());
                let (name, _) = parse_new_entry(text);
                let first = name.split('/').next().unwrap_or(name);
                self.reload_dir(&dir, Some(first))
            }
            EditPurpose::Rename { dir, original } => {
                if text == original {
                    return Ok(());
                }
                self.fs.rename(&dir.join(&original), &dir.join(text))?;
                log::info!("renamed {} to {} in {}", original, text, dir.display());
                self.reload_dir(&dir, Some(text))
            }
        }
    }

    /// Reload every pane showing `dir`. The active pane highlights `focus`,
    /// or stays at its old index when there is none.
    fn reload_dir(&mut self, dir: &Path, focus: Option<&str>) -> Result<(), AppError> {
        let active = self.panes.active_index();
        for (index, pane) in self.panes.panes_mut().iter_mut().enumerate() {
            if pane.path() != dir {
                continue;
            }
            if index == active {
                let previous = pane.highlight();
                pane.reload(&*self.fs, dir.to_path_buf(), focus)?;
                if focus.is_none() {
                    pane.goto_index(previous);
                }
            } else {
                pane.refresh(&*self.fs)?;
            }
        }
        Ok(())
    }
}
