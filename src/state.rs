use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{error::AppError, util::APP_NAME};

/// Data directory following the XDG Base Directory specification
pub fn data_dir_path() -> PathBuf {
    let data_home = env::var("XDG_DATA_HOME")
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = env::var("HOME").unwrap_or_else(|_| ".".to_owned());
            PathBuf::from(home).join(".local/share")
        });

    data_home.join(APP_NAME)
}

pub struct DataPaths {
    pub data: PathBuf,
}

impl DataPaths {
    /// Create the data folder (mode 0700) if it does not exist yet.
    pub fn init() -> Result<Self, AppError> {
        Self::init_at(data_dir_path())
    }

    pub fn init_at(data: PathBuf) -> Result<Self, AppError> {
        create_private_dir(&data).map_err(|source| AppError::DataDir {
            path: data.clone(),
            source,
        })?;
        Ok(Self { data })
    }

    pub fn log_file(&self) -> PathBuf {
        self.data.join(format!("{}.log", APP_NAME))
    }
}

fn create_private_dir(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}
