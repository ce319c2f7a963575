use std::fmt;
use std::path::{Path, PathBuf};

use url::Url;

use super::manifest::display_relative;

/// A file that must be fetched from `url` to `path` before the bag is complete.
/// Only recorded here; nothing is downloaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchItem {
    pub url: Url,
    /// `None` when `fetch.txt` gives `-`.
    pub length: Option<u64>,
    pub path: PathBuf,
    pub relative: PathBuf,
}

impl FetchItem {
    pub fn new(url: Url, length: Option<u64>, path: impl Into<PathBuf>, relative: impl Into<PathBuf>) -> Self {
        Self {
            url,
            length,
            path: path.into(),
            relative: relative.into(),
        }
    }

    pub fn rebased(&self, root: &Path) -> Self {
        Self {
            path: root.join(&self.relative),
            ..self.clone()
        }
    }
}

impl fmt::Display for FetchItem {
    /// The `fetch.txt` line, without a line terminator.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.length {
            Some(length) => write!(f, "{} {} {}", self.url, length, display_relative(&self.relative)),
            None => write!(f, "{} - {}", self.url, display_relative(&self.relative)),
        }
    }
}
