//! File system utilities for syskit.
//!
//! Every helper reports the offending path in its error so a failed batch run
//! points straight at the document that stopped it.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub mod path;

/// Largest markdown document the tools will load.
pub const MAX_DOCUMENT_SIZE: usize = 4 * 1024 * 1024;

/// File system errors.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("file not found: {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file too large: {} is {size} bytes (max: {max})", path.display())]
    TooLarge { path: PathBuf, size: u64, max: usize },

    #[error("invalid glob pattern {pattern}: {message}")]
    Pattern { pattern: String, message: String },
}

impl FsError {
    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path, .. }
            | Self::Read { path, .. }
            | Self::Write { path, .. }
            | Self::TooLarge { path, .. } => Some(path),
            Self::Pattern { .. } => None,
        }
    }
}

/// Result alias for file system operations.
pub type Result<T> = std::result::Result<T, FsError>;

fn read_error(path: &Path, e: io::Error) -> FsError {
    match e.kind() {
        io::ErrorKind::NotFound => FsError::NotFound {
            path: path.to_path_buf(),
            source: e,
        },
        _ => FsError::Read {
            path: path.to_path_buf(),
            source: e,
        },
    }
}

fn write_error(path: &Path, e: io::Error) -> FsError {
    FsError::Write {
        path: path.to_path_buf(),
        source: e,
    }
}

/// Read a file to string with size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: usize) -> Result<String> {
    let path = path.as_ref();

    let metadata = fs::metadata(path).map_err(|e| read_error(path, e))?;
    if metadata.len() as usize > max_size {
        return Err(FsError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            max: max_size,
        });
    }

    fs::read_to_string(path).map_err(|e| read_error(path, e))
}

/// Read a markdown document using the default size cap.
pub fn read_document(path: impl AsRef<Path>) -> Result<String> {
    read_to_string(path, MAX_DOCUMENT_SIZE)
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));
    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path).map_err(|e| write_error(&temp_path, e))?;
        file.write_all(contents)
            .map_err(|e| write_error(&temp_path, e))?;
        file.sync_all().map_err(|e| write_error(&temp_path, e))?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        write_error(path, e)
    })
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Ensure a directory exists.
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| write_error(path, e))?;
    }
    Ok(())
}

/// List `<prefix>_*.md` files directly inside `dir`, sorted by file name.
///
/// A missing directory yields an empty list.
pub fn list_markdown(dir: impl AsRef<Path>, prefix: &str) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Ok(Vec::new());
    }

    list_under(dir, &format!("{prefix}_*.md"))
}

/// Expand `pattern` relative to `dir`. Glob metacharacters in `dir` match literally.
pub fn list_under(dir: impl AsRef<Path>, pattern: &str) -> Result<Vec<PathBuf>> {
    let escaped = glob::Pattern::escape(&dir.as_ref().to_string_lossy());
    list_glob(&format!("{escaped}/{pattern}"))
}

/// Expand a glob pattern into a sorted list of existing files.
pub fn list_glob(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| FsError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => {
                let path = e.path().to_path_buf();
                return Err(read_error(&path, e.into()));
            }
        }
    }

    files.sort();
    Ok(files)
}

/// File stem as an owned string (`req_001_title` for `req_001_title.md`).
pub fn stem(path: impl AsRef<Path>) -> Option<String> {
    path.as_ref()
        .file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}
