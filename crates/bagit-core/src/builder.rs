use std::path::Path;

use bagit_checksum::{HasherRegistry, MultiHasher, hash_file_multi};
use bagit_fs::{Visit, WalkOptions, is_hidden, move_entries, walk};
use url::Url;

use crate::data::{
    BAGIT_FILE, Bag, FETCH_FILE, FetchItem, Manifest, ManifestEntry, ManifestKind, Metadata, Version,
    keys,
};
use crate::encoding::TagEncoding;
use crate::error::{Error, Result};
use crate::sanitize::{absolute_root, relative_to, resolve_declared_path};
use crate::writer::BagWriter;

const DEFAULT_ALGORITHM: &str = "sha512";

/// Incremental construction of a bag.
///
/// ```no_run
/// use bagit_core::BagBuilder;
///
/// # fn main() -> bagit_core::Result<()> {
/// let bag = BagBuilder::new()
///     .algorithms(["md5", "sha256"])
///     .metadata("Source-Organization", "Example Archive")
///     .bag_in_place("/srv/transfers/batch-7")?;
/// assert!(bag.payload_manifest("md5").is_some());
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct BagBuilder {
    version: Version,
    encoding: TagEncoding,
    algorithms: Vec<String>,
    metadata: Metadata,
    fetch: Vec<(Url, Option<u64>, String)>,
    include_hidden: bool,
    registry: HasherRegistry,
}

impl BagBuilder {
    pub fn new() -> Self { Self::default() }

    pub fn version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    pub fn encoding(mut self, encoding: TagEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn algorithm(mut self, algorithm: impl AsRef<str>) -> Self {
        let name = algorithm.as_ref().to_ascii_lowercase();
        if !self.algorithms.contains(&name) {
            self.algorithms.push(name);
        }
        self
    }

    pub fn algorithms<I, S>(self, algorithms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        algorithms.into_iter().fold(self, Self::algorithm)
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.add(key, value);
        self
    }

    /// Record a file to be fetched later. `path` is relative to the bag root.
    pub fn fetch_item(mut self, url: Url, length: Option<u64>, path: impl Into<String>) -> Self {
        self.fetch.push((url, length, path.into()));
        self
    }

    /// Move and checksum dot-prefixed entries too.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    pub fn registry(mut self, registry: HasherRegistry) -> Self {
        self.registry = registry;
        self
    }

    fn configured_algorithms(&self) -> Vec<String> {
        if self.algorithms.is_empty() {
            vec![DEFAULT_ALGORITHM.to_string()]
        } else {
            self.algorithms.clone()
        }
    }

    /// An in-memory bag rooted at `root` with no manifests. Fetch paths are
    /// checked the same way the reader checks them.
    pub fn build(&self, root: impl AsRef<Path>) -> Result<Bag> {
        let root = absolute_root(root.as_ref());
        let mut bag = Bag::new(&root, self.version);
        bag.file_encoding = self.encoding;
        bag.metadata = self.metadata.clone();

        for (url, length, declared) in &self.fetch {
            let physical = resolve_declared_path(&root, declared)?;
            let relative = relative_to(&root, &physical);
            bag.items_to_fetch
                .push(FetchItem::new(url.clone(), *length, physical, relative));
        }

        Ok(bag)
    }

    /// Turn the directory `root` into a bag: move its contents into `data/`,
    /// checksum the payload, add `Payload-Oxum` and `Bagging-Date`, and write
    /// every tag file with tag manifests over them.
    ///
    /// Fails before touching anything if an algorithm is unsupported or
    /// `root/data` already exists.
    pub fn bag_in_place(&self, root: impl AsRef<Path>) -> Result<Bag> {
        let algorithms = self.configured_algorithms();
        let mut hashers = MultiHasher::new(&self.registry, &algorithms)?;

        let mut bag = self.build(root)?;
        let root = bag.root_dir.clone();
        let data_dir = bag.data_dir();

        let include_hidden = self.include_hidden;
        let moved = move_entries(&root, &data_dir, |path| include_hidden || !is_hidden(path))?;
        tracing::debug!(root = %root.display(), entries = moved.len(), "moved entries into payload directory");

        let mut manifests: Vec<Manifest> = algorithms.iter().map(Manifest::new).collect();
        let options = WalkOptions::new().skip_hidden(!self.include_hidden);
        walk(&data_dir, &options, |entry| {
            if !entry.is_file() {
                return Ok::<_, Error>(Visit::Continue);
            }
            hash_file_multi(&entry.path, &mut hashers)?;
            let relative = relative_to(&root, &entry.path);
            let digests = hashers.hex_digests();
            for manifest in &mut manifests {
                if let Some(checksum) = digests.get(manifest.algorithm()) {
                    manifest.insert(ManifestEntry::new(entry.path.clone(), relative.clone(), checksum.clone()));
                }
            }
            tracing::debug!(file = %relative.display(), "hashed payload file");
            Ok(Visit::Continue)
        })?;

        for manifest in manifests {
            bag.add_payload_manifest(manifest);
        }

        if !bag.metadata.contains(keys::BAGGING_DATE) {
            let today = chrono::Local::now().format("%Y-%m-%d").to_string();
            bag.metadata.add(keys::BAGGING_DATE, today);
        }

        for algorithm in &algorithms {
            bag.add_tag_manifest(tag_manifest_skeleton(&bag, algorithm));
        }

        let written = BagWriter::with_registry(self.registry.clone()).write(&bag, &root)?;
        tracing::info!(root = %root.display(), algorithms = ?algorithms, "created bag");
        Ok(written)
    }
}

/// Tag manifest listing the tag files the writer is about to produce.
/// Checksums are filled in by the writer once the files exist.
fn tag_manifest_skeleton(bag: &Bag, algorithm: &str) -> Manifest {
    let mut names: Vec<String> = vec![BAGIT_FILE.to_string()];
    names.extend(
        bag.payload_manifests
            .keys()
            .map(|name| ManifestKind::Payload.file_name(name)),
    );
    // Payload-Oxum is always added by the writer, so the metadata file always exists.
    names.push(bag.version.metadata_file_name().to_string());
    if !bag.items_to_fetch.is_empty() {
        names.push(FETCH_FILE.to_string());
    }

    let mut manifest = Manifest::new(algorithm);
    for name in names {
        manifest.insert(ManifestEntry::new(bag.root_dir.join(&name), name, String::new()));
    }
    manifest
}
