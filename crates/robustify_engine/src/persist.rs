use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{path:?} exists but is not a directory")]
    NotADirectory { path: PathBuf },
    #[error("failed to write {path:?}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

/// Writes `content` to `target` through a temp file in the same directory,
/// so readers never see a half-written page. Missing parent directories are
/// created.
pub fn write_atomic(target: &Path, content: &str) -> Result<PathBuf, PersistError> {
    let dir = prepare_parent(target)?;
    let write_err = |source| PersistError::Write {
        path: target.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(&dir).map_err(write_err)?;
    tmp.write_all(content.as_bytes()).map_err(write_err)?;
    tmp.as_file_mut().sync_all().map_err(write_err)?;
    tmp.persist(target).map_err(|err| write_err(err.error))?;
    Ok(target.to_path_buf())
}

fn prepare_parent(target: &Path) -> Result<PathBuf, PersistError> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    if dir.exists() {
        if !dir.is_dir() {
            return Err(PersistError::NotADirectory { path: dir });
        }
    } else {
        fs::create_dir_all(&dir).map_err(|source| PersistError::Write {
            path: dir.clone(),
            source,
        })?;
    }
    Ok(dir)
}
