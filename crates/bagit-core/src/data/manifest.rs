use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use crate::sanitize::encode_filename;

/// Payload manifests list files under `data/`; tag manifests list tag files.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    Payload,
    Tag,
}

impl ManifestKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Payload => "manifest-",
            Self::Tag => "tagmanifest-",
        }
    }

    /// `manifest-<algorithm>.txt` or `tagmanifest-<algorithm>.txt`.
    pub fn file_name(&self, algorithm: &str) -> String {
        format!("{}{}.txt", self.prefix(), algorithm.to_ascii_lowercase())
    }
}

/// One file's recorded digest under one algorithm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    pub physical: PathBuf,
    pub relative: PathBuf,
    pub checksum: String,
}

impl ManifestEntry {
    pub fn new(physical: impl Into<PathBuf>, relative: impl Into<PathBuf>, checksum: impl Into<String>) -> Self {
        Self {
            physical: physical.into(),
            relative: relative.into(),
            checksum: checksum.into(),
        }
    }

    /// The relative path as written in a manifest line: `/` separated, with
    /// line breaks escaped.
    pub fn relative_display(&self) -> String { display_relative(&self.relative) }
}

pub(crate) fn display_relative(relative: &Path) -> String {
    let parts: Vec<String> = relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(part) => Some(encode_filename(&part.to_string_lossy())),
            _ => None,
        })
        .collect();
    parts.join("/")
}

/// One algorithm's view of either the payload or the tag files, keyed by physical path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Manifest {
    algorithm: String,
    entries: BTreeMap<PathBuf, ManifestEntry>,
}

impl Manifest {
    pub fn new(algorithm: impl AsRef<str>) -> Self {
        Self {
            algorithm: algorithm.as_ref().to_ascii_lowercase(),
            entries: BTreeMap::new(),
        }
    }

    pub fn algorithm(&self) -> &str { &self.algorithm }

    /// Insert or replace the entry for the same physical file.
    pub fn insert(&mut self, entry: ManifestEntry) -> Option<ManifestEntry> {
        self.entries.insert(entry.physical.clone(), entry)
    }

    pub fn get(&self, physical: &Path) -> Option<&ManifestEntry> { self.entries.get(physical) }

    pub fn contains(&self, physical: &Path) -> bool { self.entries.contains_key(physical) }

    pub fn remove(&mut self, physical: &Path) -> Option<ManifestEntry> { self.entries.remove(physical) }

    pub fn entries(&self) -> impl Iterator<Item = &ManifestEntry> { self.entries.values() }

    pub fn relative_paths(&self) -> impl Iterator<Item = &Path> {
        self.entries.values().map(|entry| entry.relative.as_path())
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Same entries with physical paths moved under `root`.
    pub fn rebased(&self, root: &Path) -> Self {
        let mut manifest = Self::new(&self.algorithm);
        for entry in self.entries() {
            manifest.insert(ManifestEntry::new(
                root.join(&entry.relative),
                entry.relative.clone(),
                entry.checksum.clone(),
            ));
        }
        manifest
    }

    /// Manifest file contents, one `<checksum>  <path>` line per entry,
    /// sorted by the written path.
    pub fn to_lines(&self) -> String {
        let mut lines: Vec<(String, &str)> = self
            .entries()
            .map(|entry| (entry.relative_display(), entry.checksum.as_str()))
            .collect();
        lines.sort();

        lines
            .into_iter()
            .map(|(path, checksum)| format!("{checksum}  {path}\n"))
            .collect()
    }
}
