//! File system access for program loading.
//!
//! The program only touches the file system through a [`SourceHost`], so the
//! same pipeline runs against a real package on disk ([`DiskHost`]) or an
//! in-memory fixture ([`MemoryHost`]).

use rustc_hash::FxHashMap;
use std::path::{Component, Path, PathBuf};

pub trait SourceHost {
    fn read_file(&self, path: &Path) -> Option<String>;

    fn file_exists(&self, path: &Path) -> bool;

    fn directory_exists(&self, path: &Path) -> bool;

    /// Absolute path with `.`/`..` removed and, where the host supports it,
    /// symlinks resolved.
    fn canonicalize(&self, path: &Path) -> PathBuf {
        normalize_path(path)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DiskHost;

impl SourceHost for DiskHost {
    fn read_file(&self, path: &Path) -> Option<String> {
        std::fs::read_to_string(path).ok()
    }

    fn file_exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| normalize_path(path))
    }
}

/// In-memory file system. Directories exist implicitly for every file added.
#[derive(Clone, Debug, Default)]
pub struct MemoryHost {
    files: FxHashMap<PathBuf, String>,
}

impl MemoryHost {
    pub fn new() -> Self {
        MemoryHost::default()
    }

    pub fn add_file(&mut self, path: impl AsRef<Path>, text: impl Into<String>) -> &mut Self {
        self.files.insert(normalize_path(path.as_ref()), text.into());
        self
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.add_file(path, text);
        self
    }
}

impl SourceHost for MemoryHost {
    fn read_file(&self, path: &Path) -> Option<String> {
        self.files.get(&normalize_path(path)).cloned()
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(&normalize_path(path))
    }

    fn directory_exists(&self, path: &Path) -> bool {
        let dir = normalize_path(path);
        self.files
            .keys()
            .any(|file| file.starts_with(&dir) && file != &dir)
    }
}

/// Lexically removes `.` and `..` segments.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            Component::RootDir | Component::Normal(_) | Component::Prefix(_) => {
                normalized.push(component.as_os_str());
            }
        }
    }

    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_removes_dot_segments() {
        assert_eq!(
            normalize_path(Path::new("/pkg/src/./a/../b.ts")),
            PathBuf::from("/pkg/src/b.ts")
        );
    }

    #[test]
    fn memory_host_directories_follow_files() {
        let host = MemoryHost::new().with_file("/pkg/src/index.ts", "export {};");
        assert!(host.file_exists(Path::new("/pkg/src/../src/index.ts")));
        assert!(host.directory_exists(Path::new("/pkg/src")));
        assert!(host.directory_exists(Path::new("/pkg")));
        assert!(!host.directory_exists(Path::new("/pkg/src/index.ts")));
        assert!(!host.directory_exists(Path::new("/other")));
        assert_eq!(host.read_file(Path::new("/pkg/src/index.ts")).as_deref(), Some("export {};"));
    }
}
