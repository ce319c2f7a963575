use std::fs;
use std::path::Path;

use crate::{Error, Result};

#[derive(Clone, Copy, Debug)]
pub struct AtomicWriteOptions {
    sync: bool,
}

impl Default for AtomicWriteOptions {
    fn default() -> Self { Self::new() }
}

impl AtomicWriteOptions {
    pub fn new() -> Self { Self { sync: false } }

    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }
}

/// Write `content` to a sibling temp file and rename it over `path`.
///
/// Only the single file is replaced atomically; a bag made of several tag
/// files can still be left half-written.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8], options: AtomicWriteOptions) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new(""));
    if !parent.as_os_str().is_empty() {
        create_dir_all(parent)?;
    }

    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    let tmp_path = parent.join(format!(".{file_name}.tmp"));

    fs::write(&tmp_path, content).map_err(Error::write(&tmp_path))?;

    if options.sync {
        let file = fs::File::open(&tmp_path).map_err(Error::write(&tmp_path))?;
        file.sync_all().map_err(Error::write(&tmp_path))?;
    }

    fs::rename(&tmp_path, path).map_err(|source| {
        let _ = fs::remove_file(&tmp_path);
        Error::Write {
            path: path.to_path_buf(),
            source,
        }
    })?;

    tracing::trace!(path = %path.display(), bytes = content.len(), "wrote file");
    Ok(())
}

pub fn create_dir_all(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::create_dir_all(path).map_err(|source| Error::Write {
        path: path.to_path_buf(),
        source,
    })
}
