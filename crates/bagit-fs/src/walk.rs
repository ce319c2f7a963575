use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Error, Result};

pub type IgnoreFn = Arc<dyn Fn(&Path) -> bool + Send + Sync>;

/// What the walk should do after visiting an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visit {
    Continue,
    /// Do not descend into this directory. Same as `Continue` for files.
    SkipSubtree,
    Stop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Dir,
}

#[derive(Clone, Debug)]
pub struct WalkEntry {
    pub path: PathBuf,
    /// Depth below the walk root; direct children are at depth 1.
    pub depth: usize,
    pub kind: EntryKind,
    /// File length in bytes, zero for directories.
    pub len: u64,
}

impl WalkEntry {
    pub fn is_file(&self) -> bool { self.kind == EntryKind::File }

    pub fn is_dir(&self) -> bool { self.kind == EntryKind::Dir }
}

#[derive(Clone, Default)]
pub struct WalkOptions {
    pub skip_hidden: bool,
    pub ignore: Vec<IgnoreFn>,
}

impl fmt::Debug for WalkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkOptions")
            .field("skip_hidden", &self.skip_hidden)
            .field("ignore", &self.ignore.len())
            .finish()
    }
}

impl WalkOptions {
    pub fn new() -> Self { Self::default() }

    pub fn skip_hidden(mut self, skip: bool) -> Self {
        self.skip_hidden = skip;
        self
    }

    /// Entries for which `predicate` returns true are neither visited nor descended into.
    pub fn ignore<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.ignore.push(Arc::new(predicate));
        self
    }

    fn excludes(&self, path: &Path) -> bool {
        (self.skip_hidden && is_hidden(path)) || self.ignore.iter().any(|ignore| ignore(path))
    }
}

/// Dot-prefixed file names count as hidden.
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

enum Flow {
    Continue,
    Stop,
}

/// Walk `root` depth-first in sorted order, calling `visit` for every file and
/// directory below it. The root itself is not visited.
///
/// Symlinks to files are visited as files. Symlinks to directories are not
/// followed.
pub fn walk<F, E>(root: impl AsRef<Path>, options: &WalkOptions, mut visit: F) -> std::result::Result<(), E>
where
    F: FnMut(&WalkEntry) -> std::result::Result<Visit, E>,
    E: From<Error>,
{
    walk_dir(root.as_ref(), 1, options, &mut visit).map(|_| ())
}

fn walk_dir<F, E>(
    dir: &Path,
    depth: usize,
    options: &WalkOptions,
    visit: &mut F,
) -> std::result::Result<Flow, E>
where
    F: FnMut(&WalkEntry) -> std::result::Result<Visit, E>,
    E: From<Error>,
{
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(Error::read(dir))? {
        let entry = entry.map_err(Error::read(dir))?;
        children.push(entry.path());
    }
    children.sort();

    for path in children {
        if options.excludes(&path) {
            tracing::trace!(path = %path.display(), "excluded from walk");
            continue;
        }

        let link = fs::symlink_metadata(&path).map_err(Error::read(&path))?;
        let metadata = if link.file_type().is_symlink() {
            let Ok(target) = fs::metadata(&path) else {
                tracing::warn!(path = %path.display(), "skipping broken symlink");
                continue;
            };
            if target.is_dir() {
                tracing::warn!(path = %path.display(), "not following symlinked directory");
                continue;
            }
            target
        } else {
            link
        };

        let entry = WalkEntry {
            kind: if metadata.is_dir() { EntryKind::Dir } else { EntryKind::File },
            len: if metadata.is_dir() { 0 } else { metadata.len() },
            path,
            depth,
        };

        match visit(&entry)? {
            Visit::Stop => return Ok(Flow::Stop),
            Visit::SkipSubtree => continue,
            Visit::Continue => {}
        }

        if entry.is_dir() {
            if let Flow::Stop = walk_dir(&entry.path, depth + 1, options, visit)? {
                return Ok(Flow::Stop);
            }
        }
    }

    Ok(Flow::Continue)
}

/// Every file below `root`, sorted.
pub fn list_files(root: impl AsRef<Path>, options: &WalkOptions) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    walk(root, options, |entry| {
        if entry.is_file() {
            files.push(entry.path.clone());
        }
        Ok::<_, Error>(Visit::Continue)
    })?;
    Ok(files)
}
