//! Where file contents come from
//!
//! The tokenizer never touches the filesystem directly. It asks a
//! [`FileSource`] for text and for a file identity, so the same analysis runs
//! against real files ([`DiskSource`]) or an in-memory map ([`MemorySource`]).

use rustc_hash::FxHashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

pub trait FileSource {
    /// Full text of `path`, or `None` if it cannot be read.
    fn read(&self, path: &Path) -> Option<String>;

    /// Key under which `path` is de-duplicated: two paths with the same
    /// identity are the same file.
    fn identity(&self, path: &Path) -> PathBuf {
        normalize(path)
    }
}

/// Reads from the local filesystem. Bytes that are not valid UTF-8 are
/// replaced, which the lexer then ignores as non-ASCII.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiskSource;

impl FileSource for DiskSource {
    fn read(&self, path: &Path) -> Option<String> {
        if !path.is_file() {
            return None;
        }
        match fs::read(path) {
            Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
            Err(err) => {
                warn!("cannot read {}: {}", path.display(), err);
                None
            }
        }
    }

    fn identity(&self, path: &Path) -> PathBuf {
        fs::canonicalize(path).unwrap_or_else(|_| normalize(path))
    }
}

/// Fixed set of files keyed by lexically normalized path.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: FxHashMap<PathBuf, String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl AsRef<Path>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    pub fn insert(&mut self, path: impl AsRef<Path>, text: impl Into<String>) {
        self.files.insert(normalize(path.as_ref()), text.into());
    }
}

impl FileSource for MemorySource {
    fn read(&self, path: &Path) -> Option<String> {
        self.files.get(&normalize(path)).cloned()
    }
}

/// Lexically resolve `.` and `..` components without touching the disk.
///
/// A `..` that would climb above the start of a relative path is kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            _ => out.push(component),
        }
    }
    out.iter().collect()
}
