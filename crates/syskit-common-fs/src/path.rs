//! Path manipulation utilities.

use std::path::{Component, Path, PathBuf};

/// Directory holding syskit configuration inside a project.
pub const CONFIG_DIR: &str = ".syskit";

/// Normalize a path by resolving `.` and `..` without hitting the filesystem.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => {
                components.clear();
                components.push(Component::RootDir);
            }
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::ParentDir) | None => components.push(Component::ParentDir),
                _ => {}
            },
            Component::Normal(c) => components.push(Component::Normal(c)),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

/// Make a path relative to a base path.
pub fn relative_to(path: impl AsRef<Path>, base: impl AsRef<Path>) -> Option<PathBuf> {
    let path = normalize(path);
    let base = normalize(base);

    if path.is_absolute() != base.is_absolute() {
        return None;
    }

    let mut path_components = path.components().peekable();
    let mut base_components = base.components().peekable();

    while let (Some(p), Some(b)) = (path_components.peek(), base_components.peek()) {
        if p != b {
            break;
        }
        path_components.next();
        base_components.next();
    }

    let mut result = PathBuf::new();
    for _ in base_components {
        result.push("..");
    }
    for component in path_components {
        result.push(component);
    }

    if result.as_os_str().is_empty() {
        Some(PathBuf::from("."))
    } else {
        Some(result)
    }
}

/// Convert a path to a Unix-style string (forward slashes).
pub fn to_unix_string(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Find the project root by walking up to the first directory holding a
/// `.syskit` directory or a `.git` entry.
pub fn find_project_root(start: impl AsRef<Path>) -> Option<PathBuf> {
    let markers = [CONFIG_DIR, ".git"];
    let mut current = start.as_ref().to_path_buf();

    loop {
        if markers.iter().any(|m| current.join(m).exists()) {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
