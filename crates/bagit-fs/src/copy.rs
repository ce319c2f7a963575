use std::fs;
use std::path::{Path, PathBuf};

use crate::{Error, Result, create_dir_all};

/// Copy one file, creating missing parent directories. Returns bytes copied.
pub fn copy_file(src: impl AsRef<Path>, dest: impl AsRef<Path>) -> Result<u64> {
    let src = src.as_ref();
    let dest = dest.as_ref();

    if let Some(parent) = dest.parent() {
        create_dir_all(parent)?;
    }

    fs::copy(src, dest).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound if !src.exists() => Error::NotFound(src.to_path_buf()),
        _ => Error::Write {
            path: dest.to_path_buf(),
            source,
        },
    })
}

/// Move every direct child of `src_dir` for which `keep` returns true into
/// `dest_dir`, which must not exist yet and must not be one of the moved
/// entries. Returns the moved destinations.
pub fn move_entries<F>(src_dir: impl AsRef<Path>, dest_dir: impl AsRef<Path>, keep: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&Path) -> bool,
{
    let src_dir = src_dir.as_ref();
    let dest_dir = dest_dir.as_ref();

    if dest_dir.exists() {
        return Err(Error::AlreadyExists(dest_dir.to_path_buf()));
    }

    let mut children = Vec::new();
    for entry in fs::read_dir(src_dir).map_err(Error::read(src_dir))? {
        let entry = entry.map_err(Error::read(src_dir))?;
        let path = entry.path();
        if keep(&path) {
            children.push(path);
        }
    }
    children.sort();

    create_dir_all(dest_dir)?;

    let mut moved = Vec::with_capacity(children.len());
    for child in children {
        let target = dest_dir.join(child.file_name().unwrap_or_default());
        fs::rename(&child, &target).map_err(|source| Error::Write {
            path: target.clone(),
            source,
        })?;
        tracing::debug!(from = %child.display(), to = %target.display(), "moved entry");
        moved.push(target);
    }

    Ok(moved)
}
