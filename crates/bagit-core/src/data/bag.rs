use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{BAGIT_FILE, DATA_DIR, FETCH_FILE, FetchItem, Manifest, ManifestKind, Metadata, Version};
use crate::encoding::TagEncoding;

/// In-memory view of a bag directory.
///
/// `root_dir` points at the directory the bag was read from or will be
/// written to. Several `Bag` values may point at the same directory.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bag {
    pub version: Version,
    pub file_encoding: TagEncoding,
    /// Keyed by lowercase algorithm name.
    pub payload_manifests: BTreeMap<String, Manifest>,
    pub tag_manifests: BTreeMap<String, Manifest>,
    pub items_to_fetch: Vec<FetchItem>,
    pub metadata: Metadata,
    pub root_dir: PathBuf,
}

impl Bag {
    pub fn new(root_dir: impl Into<PathBuf>, version: Version) -> Self {
        Self {
            version,
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    pub fn data_dir(&self) -> PathBuf { self.root_dir.join(DATA_DIR) }

    pub fn bagit_file(&self) -> PathBuf { self.root_dir.join(BAGIT_FILE) }

    /// `bag-info.txt`, or `package-info.txt` for 0.95 and older.
    pub fn metadata_file(&self) -> PathBuf { self.root_dir.join(self.version.metadata_file_name()) }

    pub fn fetch_file(&self) -> PathBuf { self.root_dir.join(FETCH_FILE) }

    pub fn manifest_file(&self, kind: ManifestKind, algorithm: &str) -> PathBuf {
        self.root_dir.join(kind.file_name(algorithm))
    }

    pub fn add_payload_manifest(&mut self, manifest: Manifest) -> Option<Manifest> {
        self.payload_manifests
            .insert(manifest.algorithm().to_string(), manifest)
    }

    pub fn add_tag_manifest(&mut self, manifest: Manifest) -> Option<Manifest> {
        self.tag_manifests
            .insert(manifest.algorithm().to_string(), manifest)
    }

    pub fn payload_manifest(&self, algorithm: &str) -> Option<&Manifest> {
        self.payload_manifests
            .get(&algorithm.to_ascii_lowercase())
    }

    pub fn tag_manifest(&self, algorithm: &str) -> Option<&Manifest> {
        self.tag_manifests.get(&algorithm.to_ascii_lowercase())
    }

    /// Every algorithm named by a payload or tag manifest.
    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        let mut names: Vec<&str> = self
            .payload_manifests
            .keys()
            .chain(self.tag_manifests.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names.into_iter()
    }

    /// Whether `path` lies under this bag's payload directory.
    pub fn is_payload_path(&self, path: &Path) -> bool { path.starts_with(self.data_dir()) }
}
