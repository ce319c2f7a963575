use std::path::{Component, Path, PathBuf};

use url::Url;

use crate::error::PathError;

/// Resolve a path declared in a manifest or `fetch.txt` against the bag root.
///
/// The declared text is taken verbatim from the tag file. A single leading `*`
/// (binary-mode marker from md5sum-style tools) is dropped, `\` and `~/` are
/// rejected, `%0A` and `%0D` are decoded, and the result is normalized. The
/// normalized path must stay under `bag_root`.
pub fn resolve_declared_path(bag_root: impl AsRef<Path>, declared: &str) -> Result<PathBuf, PathError> {
    let root = absolute_root(bag_root.as_ref());
    let path = declared.strip_prefix('*').unwrap_or(declared);

    if path.contains('\\') {
        return Err(PathError::Backslash(declared.to_string()));
    }

    if path.starts_with("~/") || path.contains("/~/") {
        return Err(PathError::HomeDirectory(declared.to_string()));
    }

    let decoded = decode_filename(path);

    let resolved = if decoded.starts_with("file://") {
        let url = Url::parse(&decoded).map_err(|_| PathError::FileUri(declared.to_string()))?;
        let file = url
            .to_file_path()
            .map_err(|_| PathError::FileUri(declared.to_string()))?;
        normalize_path(&file)
    } else {
        normalize_path(&root.join(&decoded))
    };

    if !resolved.starts_with(&root) {
        return Err(PathError::Traversal {
            declared: declared.to_string(),
            resolved,
        });
    }

    if resolved == root {
        return Err(PathError::Empty(declared.to_string()));
    }

    Ok(resolved)
}

/// Decode the two escapes BagIt allows in file names: `%0A` and `%0D`.
pub fn decode_filename(name: &str) -> String { name.replace("%0A", "\n").replace("%0D", "\r") }

/// Inverse of [`decode_filename`].
pub fn encode_filename(name: &str) -> String { name.replace('\n', "%0A").replace('\r', "%0D") }

/// Absolute, normalized form of a bag root.
pub(crate) fn absolute_root(root: &Path) -> PathBuf {
    let absolute = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    normalize_path(&absolute)
}

/// `root`-relative form of a path produced by [`resolve_declared_path`].
pub(crate) fn relative_to(root: &Path, path: &Path) -> PathBuf {
    path.strip_prefix(absolute_root(root))
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Collapse `.` and `..` without touching the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(part) => result.push(part),
            Component::RootDir => result.push(component.as_os_str()),
            Component::Prefix(prefix) => result.push(prefix.as_os_str()),
            Component::CurDir => {}
        }
    }

    result
}
