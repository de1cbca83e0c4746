//! External processes: the editor, the generic opener and the fuzzy picker.

use std::{
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    process::{Child, Command, Stdio},
};

use walkdir::{DirEntry, WalkDir};

use crate::{error::AppError, files::FileKind, util::PICKER_MAX_DEPTH};

pub trait Launcher {
    /// Run to completion with the terminal handed over. Returns whether the
    /// child exited successfully.
    fn run_foreground(&mut self, program: &str, args: &[String]) -> Result<bool, AppError>;

    /// Start without waiting. The child is collected later by `reap_finished`.
    fn run_detached(&mut self, program: &str, args: &[String]) -> Result<(), AppError>;

    /// Collect detached children that have exited. Never blocks.
    fn reap_finished(&mut self);

    /// Run inside `dir`, feed `input` on stdin and capture the first line of
    /// stdout. `None` when the child fails or prints nothing.
    fn run_capture(
        &mut self,
        program: &str,
        args: &[String],
        dir: &Path,
        input: &str,
    ) -> Result<Option<String>, AppError>;
}

fn launch_error(program: &str, source: std::io::Error) -> AppError {
    AppError::Io {
        op: "Launch",
        path: PathBuf::from(program),
        source,
    }
}

#[derive(Default)]
pub struct SystemLauncher {
    /// Detached children not yet seen to exit
    children: Vec<Child>,
}

impl Launcher for SystemLauncher {
    fn run_foreground(&mut self, program: &str, args: &[String]) -> Result<bool, AppError> {
        let status = Command::new(program)
            .args(args)
            .status()
            .map_err(|e| launch_error(program, e))?;
        log::debug!("{} exited with {}", program, status);
        Ok(status.success())
    }

    fn run_detached(&mut self, program: &str, args: &[String]) -> Result<(), AppError> {
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| launch_error(program, e))?;
        self.children.push(child);
        Ok(())
    }

    fn reap_finished(&mut self) {
        self.children.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("detached child {} exited with {}", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(err) => {
                log::warn!("cannot wait on detached child {}: {}", child.id(), err);
                false
            }
        });
    }

    fn run_capture(
        &mut self,
        program: &str,
        args: &[String],
        dir: &Path,
        input: &str,
    ) -> Result<Option<String>, AppError> {
        let mut child = Command::new(program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| launch_error(program, e))?;

        // The picker reads stdin while it runs and may quit before the end of
        // it. Stdin is closed when the handle drops at the end of this block.
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(err) = stdin.write_all(input.as_bytes()) {
                if err.kind() != ErrorKind::BrokenPipe {
                    log::warn!("writing candidates to {}: {}", program, err);
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| launch_error(program, e))?;

        if !output.status.success() {
            log::debug!("{} exited with {}", program, output.status);
            return Ok(None);
        }
        Ok(first_line(&String::from_utf8_lossy(&output.stdout)))
    }
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .next()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(str::to_owned)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Newline-separated paths below `root`, relative to it, of the wanted kind.
pub fn picker_candidates(root: &Path, kind: FileKind) -> String {
    let mut out = String::new();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .max_depth(PICKER_MAX_DEPTH)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_hidden(e));

    for entry in walker.filter_map(|e| e.ok()) {
        let matches = match kind {
            FileKind::Directory => entry.file_type().is_dir(),
            FileKind::Regular => !entry.file_type().is_dir(),
        };
        if !matches {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            out.push_str(&relative.to_string_lossy());
            out.push('\n');
        }
    }
    out
}
