//! Directory listings and the filesystem seam.
//!
//! `FileList` is a sorted, deduplicated snapshot of one directory. It is
//! rebuilt wholesale on every reload and never patched in place.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::SystemTime,
};

use crate::error::AppError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Directory,
    Regular,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: FileKind,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.kind == FileKind::Directory
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FileList {
    entries: Vec<Entry>,
}

impl FileList {
    /// Sort by name (byte order) and drop duplicate names, keeping the first.
    pub fn from_entries(mut entries: Vec<Entry>) -> Self {
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
        entries.dedup_by(|a, b| a.name == b.name);
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    /// Index of the first entry named exactly `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Read side: listing, classification and modification times.
pub trait DirectorySource {
    /// Entry names excluding `.` and `..`, in any order.
    fn list(&self, path: &Path) -> Result<Vec<String>, AppError>;

    fn classify(&self, path: &Path) -> FileKind;

    fn modified(&self, path: &Path) -> Option<SystemTime>;

    /// Absolute form of `path` with `.`/`..` and links resolved where possible.
    fn resolve(&self, path: &Path) -> PathBuf {
        path.to_path_buf()
    }
}

/// Write side: create, delete, rename inside a directory.
pub trait FsMutator {
    /// A trailing `/` in `name` creates a directory.
    fn create(&self, dir: &Path, name: &str) -> Result<(), AppError>;

    /// Directories are removed recursively.
    fn delete(&self, path: &Path) -> Result<(), AppError>;

    fn rename(&self, from: &Path, to: &Path) -> Result<(), AppError>;
}

pub trait Filesystem: DirectorySource + FsMutator {}

impl<T: DirectorySource + FsMutator> Filesystem for T {}

/// Build a sorted listing for `path` using `source`.
pub fn load_file_list<S>(source: &S, path: &Path) -> Result<FileList, AppError>
where
    S: DirectorySource + ?Sized,
{
    let names = source.list(path)?;
    let mut entries = Vec::new();
    entries.try_reserve_exact(names.len())?;
    entries.extend(names.into_iter().map(|name| {
        let kind = source.classify(&path.join(&name));
        Entry { name, kind }
    }));
    Ok(FileList::from_entries(entries))
}

/// Split a typed name into the entry name and whether it names a directory.
pub fn parse_new_entry(name: &str) -> (&str, bool) {
    match name.strip_suffix('/') {
        Some(stripped) => (stripped.trim_end_matches('/'), true),
        None => (name, false),
    }
}

// ============================================================================
// Local Filesystem
// ============================================================================

pub struct LocalFs;

impl DirectorySource for LocalFs {
    fn list(&self, path: &Path) -> Result<Vec<String>, AppError> {
        let access = |source: io::Error| AppError::Access {
            path: path.to_path_buf(),
            source,
        };
        let names = fs::read_dir(path)
            .map_err(access)?
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name != "." && name != "..")
            .collect();
        Ok(names)
    }

    fn classify(&self, path: &Path) -> FileKind {
        match fs::metadata(path) {
            Ok(meta) if meta.is_dir() => FileKind::Directory,
            _ => FileKind::Regular,
        }
    }

    fn modified(&self, path: &Path) -> Option<SystemTime> {
        fs::metadata(path).and_then(|m| m.modified()).ok()
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}

impl FsMutator for LocalFs {
    fn create(&self, dir: &Path, name: &str) -> Result<(), AppError> {
        let (name, as_dir) = parse_new_entry(name);
        let target = dir.join(name);
        let result = if as_dir {
            fs::create_dir_all(&target)
        } else {
            fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&target)
                .map(|_| ())
        };
        result.map_err(|source| AppError::Io {
            op: "Create",
            path: target,
            source,
        })
    }

    fn delete(&self, path: &Path) -> Result<(), AppError> {
        // Do not follow symlinks: a link to a directory is removed as a file.
        let result = match fs::symlink_metadata(path) {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
            Ok(_) => fs::remove_file(path),
            Err(e) => Err(e),
        };
        result.map_err(|source| AppError::Io {
            op: "Delete",
            path: path.to_path_buf(),
            source,
        })
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), AppError> {
        if to.exists() {
            return Err(AppError::Io {
                op: "Rename",
                path: to.to_path_buf(),
                source: io::Error::from(io::ErrorKind::AlreadyExists),
            });
        }
        fs::rename(from, to).map_err(|source| AppError::Io {
            op: "Rename",
            path: from.to_path_buf(),
            source,
        })
    }
}

/// Directory a file picker result should land in: `(dir, name to highlight)`
pub fn split_picked(root: &Path, picked: &str, kind: FileKind) -> (PathBuf, Option<String>) {
    let full = root.join(picked.trim_end_matches('/'));
    match kind {
        FileKind::Directory => (full, None),
        FileKind::Regular => {
            let name = full.file_name().map(|n| n.to_string_lossy().into_owned());
            let parent = full.parent().map(Path::to_path_buf).unwrap_or_else(|| full.clone());
            (parent, name)
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory directory tree for tests.

    use std::{
        cell::{Cell, RefCell},
        collections::BTreeMap,
        io,
        path::{Path, PathBuf},
        rc::Rc,
        time::{Duration, SystemTime},
    };

    use super::{DirectorySource, FileKind, FsMutator};
    use crate::error::AppError;

    #[derive(Default)]
    pub struct MemoryFs {
        dirs: RefCell<BTreeMap<PathBuf, Vec<String>>>,
        stamps: RefCell<BTreeMap<PathBuf, u64>>,
        pub list_calls: Cell<usize>,
        pub fail_mutations: Cell<bool>,
        pub fail_listing: Cell<bool>,
    }

    impl MemoryFs {
        pub fn new() -> Self {
            Self::default()
        }

        /// Register a directory and its children; child names ending in `/` are directories.
        pub fn with_dir(self, path: &str, children: &[&str]) -> Self {
            let path = PathBuf::from(path);
            let mut names = Vec::new();
            for child in children {
                if let Some(dir) = child.strip_suffix('/') {
                    self.dirs
                        .borrow_mut()
                        .entry(path.join(dir))
                        .or_default();
                    names.push(dir.to_owned());
                } else {
                    names.push((*child).to_owned());
                }
            }
            self.dirs.borrow_mut().insert(path, names);
            self
        }

        pub fn touch(&self, path: &str) {
            *self.stamps.borrow_mut().entry(PathBuf::from(path)).or_default() += 1;
        }

        pub fn add_child(&self, dir: &str, name: &str) {
            if let Some(children) = self.dirs.borrow_mut().get_mut(Path::new(dir)) {
                children.push(name.to_owned());
            }
            self.touch(dir);
        }

        /// Drop a directory as if it were removed by another program.
        pub fn remove_dir(&self, path: &str) {
            let path = Path::new(path);
            self.dirs.borrow_mut().remove(path);
            if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
                if let Some(children) = self.dirs.borrow_mut().get_mut(parent) {
                    children.retain(|child| child.as_str() != name);
                }
                self.touch(&parent.to_string_lossy());
            }
        }
    }

    fn failure(op: &'static str, path: &Path) -> AppError {
        AppError::Io {
            op,
            path: path.to_path_buf(),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        }
    }

    impl DirectorySource for MemoryFs {
        fn list(&self, path: &Path) -> Result<Vec<String>, AppError> {
            self.list_calls.set(self.list_calls.get() + 1);
            if self.fail_listing.get() {
                return Err(AppError::Access {
                    path: path.to_path_buf(),
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                });
            }
            self.dirs
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| AppError::Access {
                    path: path.to_path_buf(),
                    source: io::Error::from(io::ErrorKind::NotFound),
                })
        }

        fn classify(&self, path: &Path) -> FileKind {
            if self.dirs.borrow().contains_key(path) {
                FileKind::Directory
            } else {
                FileKind::Regular
            }
        }

        fn modified(&self, path: &Path) -> Option<SystemTime> {
            if !self.dirs.borrow().contains_key(path) {
                return None;
            }
            let stamp = self.stamps.borrow().get(path).copied().unwrap_or(0);
            Some(SystemTime::UNIX_EPOCH + Duration::from_secs(stamp))
        }
    }

    impl FsMutator for MemoryFs {
        fn create(&self, dir: &Path, name: &str) -> Result<(), AppError> {
            if self.fail_mutations.get() {
                return Err(failure("Create", &dir.join(name)));
            }
            let (name, as_dir) = super::parse_new_entry(name);
            if as_dir {
                self.dirs.borrow_mut().entry(dir.join(name)).or_default();
            }
            if let Some(children) = self.dirs.borrow_mut().get_mut(dir) {
                children.push(name.to_owned());
            }
            Ok(())
        }

        fn delete(&self, path: &Path) -> Result<(), AppError> {
            if self.fail_mutations.get() {
                return Err(failure("Delete", path));
            }
            let mut dirs = self.dirs.borrow_mut();
            dirs.retain(|p, _| !p.starts_with(path));
            if let (Some(parent), Some(name)) = (path.parent(), path.file_name()) {
                if let Some(children) = dirs.get_mut(parent) {
                    children.retain(|c| c.as_str() != name.to_string_lossy());
                }
            }
            Ok(())
        }

        fn rename(&self, from: &Path, to: &Path) -> Result<(), AppError> {
            if self.fail_mutations.get() {
                return Err(failure("Rename", from));
            }
            let mut dirs = self.dirs.borrow_mut();
            if let (Some(parent), Some(old), Some(new)) =
                (from.parent(), from.file_name(), to.file_name())
            {
                if let Some(children) = dirs.get_mut(parent) {
                    for child in children.iter_mut() {
                        if child.as_str() == old.to_string_lossy() {
                            *child = new.to_string_lossy().into_owned();
                        }
                    }
                }
            }
            if let Some(children) = dirs.remove(from) {
                dirs.insert(to.to_path_buf(), children);
            }
            Ok(())
        }
    }

    // Shared handle so a test can keep poking the tree after handing it over.
    impl DirectorySource for Rc<MemoryFs> {
        fn list(&self, path: &Path) -> Result<Vec<String>, AppError> {
            (**self).list(path)
        }

        fn classify(&self, path: &Path) -> FileKind {
            (**self).classify(path)
        }

        fn modified(&self, path: &Path) -> Option<SystemTime> {
            (**self).modified(path)
        }
    }

    impl FsMutator for Rc<MemoryFs> {
        fn create(&self, dir: &Path, name: &str) -> Result<(), AppError> {
            (**self).create(dir, name)
        }

        fn delete(&self, path: &Path) -> Result<(), AppError> {
            (**self).delete(path)
        }

        fn rename(&self, from: &Path, to: &Path) -> Result<(), AppError> {
            (**self).rename(from, to)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> Entry {
        Entry {
            name: name.to_owned(),
            kind: FileKind::Regular,
        }
    }

    #[test]
    fn test_file_list_sorted_by_bytes_and_deduped() {
        let list = FileList::from_entries(vec![
            entry("b"),
            entry("B"),
            entry("a"),
            entry("b"),
            entry("_x"),
        ]);
        let names: Vec<&str> = list.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["B", "_x", "a", "b"]);
        assert_eq!(list.position("b"), Some(3));
        assert_eq!(list.position("c"), None);
    }

    #[test]
    fn test_parse_new_entry() {
        assert_eq!(parse_new_entry("notes.txt"), ("notes.txt", false));
        assert_eq!(parse_new_entry("src/"), ("src", true));
        assert_eq!(parse_new_entry("a/b//"), ("a/b", true));
    }

    #[test]
    fn test_local_fs_list_and_classify() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join("dir")).unwrap();
        fs::write(tmp.path().join("file.txt"), b"hi").unwrap();

        let list = load_file_list(&LocalFs, tmp.path()).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.get(0).unwrap().name, "dir");
        assert!(list.get(0).unwrap().is_dir());
        assert_eq!(list.get(1).unwrap().kind, FileKind::Regular);
    }

    #[test]
    fn test_local_fs_list_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let err = LocalFs.list(&tmp.path().join("nope")).err().unwrap();
        assert!(matches!(err, AppError::Access { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_local_fs_create_delete_rename() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();

        LocalFs.create(dir, "new.txt").unwrap();
        assert!(dir.join("new.txt").is_file());
        assert!(LocalFs.create(dir, "new.txt").is_err());

        LocalFs.create(dir, "sub/").unwrap();
        assert!(dir.join("sub").is_dir());
        fs::write(dir.join("sub").join("inner"), b"x").unwrap();

        LocalFs.rename(&dir.join("new.txt"), &dir.join("old.txt")).unwrap();
        assert!(dir.join("old.txt").is_file());
        assert!(
            LocalFs
                .rename(&dir.join("old.txt"), &dir.join("sub"))
                .is_err()
        );

        LocalFs.delete(&dir.join("sub")).unwrap();
        assert!(!dir.join("sub").exists());
        LocalFs.delete(&dir.join("old.txt")).unwrap();
        assert!(LocalFs.delete(&dir.join("old.txt")).is_err());
    }

    #[test]
    fn test_split_picked() {
        let root = Path::new("/home/user");
        assert_eq!(
            split_picked(root, "src/main.rs", FileKind::Regular),
            (PathBuf::from("/home/user/src"), Some("main.rs".to_owned()))
        );
        assert_eq!(
            split_picked(root, "src/", FileKind::Directory),
            (PathBuf::from("/home/user/src"), None)
        );
    }
}
