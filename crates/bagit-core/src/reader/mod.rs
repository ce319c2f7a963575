//! Parse a bag directory into a [`Bag`].
//!
//! Only structure is established here. No checksum is computed.

mod bagit_txt;
mod fetch;
mod key_value;
mod manifest;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use bagit_checksum::HasherRegistry;

use crate::data::{BAGIT_FILE, Bag, FETCH_FILE, ManifestKind};
use crate::encoding::TagEncoding;
use crate::error::{CompletenessError, Error, FormatError, Result};
use crate::sanitize::absolute_root;

pub(crate) use bagit_txt::format_declaration;
pub(crate) use key_value::format_key_value;
pub(crate) use manifest::classify as classify_manifest;

/// Reads bags from disk.
///
/// With a registry attached, manifests for algorithms the registry cannot
/// compute are rejected while reading instead of during verification.
#[derive(Clone, Debug, Default)]
pub struct BagReader {
    registry: Option<HasherRegistry>,
}

impl BagReader {
    pub fn new() -> Self { Self::default() }

    pub fn with_registry(registry: HasherRegistry) -> Self { Self { registry: Some(registry) } }

    pub fn read(&self, root: impl AsRef<Path>) -> Result<Bag> {
        let root = absolute_root(root.as_ref());
        tracing::debug!(root = %root.display(), "reading bag");

        let bagit_file = root.join(BAGIT_FILE);
        let bytes = read_bytes(&bagit_file).map_err(|error| match error {
            Error::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
                CompletenessError::MissingBagitFile(bagit_file.clone()).into()
            }
            other => other,
        })?;
        let declaration = bagit_txt::parse_declaration(&bagit_file, &bytes)?;

        let mut bag = Bag::new(root.clone(), declaration.version);
        bag.file_encoding = declaration.encoding;

        for path in manifest_files(&root)? {
            let Some((kind, algorithm)) = path
                .file_name()
                .and_then(|name| name.to_str())
                .and_then(classify_manifest)
            else {
                continue;
            };

            if let Some(registry) = &self.registry {
                if !registry.is_supported(&algorithm) {
                    return Err(bagit_checksum::Error::UnsupportedAlgorithm(algorithm).into());
                }
            }

            let text = read_text(&path, bag.file_encoding)?;
            let manifest = manifest::parse_manifest(&path, &root, &algorithm, &text)?;
            tracing::debug!(manifest = %path.display(), entries = manifest.len(), "read manifest");

            match kind {
                ManifestKind::Payload => bag.add_payload_manifest(manifest),
                ManifestKind::Tag => bag.add_tag_manifest(manifest),
            };
        }

        let metadata_file = bag.metadata_file();
        if metadata_file.is_file() {
            let text = read_text(&metadata_file, bag.file_encoding)?;
            for (key, value) in key_value::parse_key_values(&metadata_file, &text)? {
                bag.metadata.add(key, value);
            }
        }

        let fetch_file = root.join(FETCH_FILE);
        if fetch_file.is_file() {
            let text = read_text(&fetch_file, bag.file_encoding)?;
            bag.items_to_fetch = fetch::parse_fetch(&fetch_file, &root, &text)?;
        }

        tracing::info!(
            root = %root.display(),
            version = %bag.version,
            payload_manifests = bag.payload_manifests.len(),
            tag_manifests = bag.tag_manifests.len(),
            "read bag"
        );
        Ok(bag)
    }
}

/// Read the bag rooted at `root` with the default reader.
pub fn read(root: impl AsRef<Path>) -> Result<Bag> { BagReader::new().read(root) }

/// Manifest candidates directly under the bag root, sorted.
fn manifest_files(root: &Path) -> Result<Vec<PathBuf>> {
    let io_error = |source| Error::Io {
        path: root.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(root).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn read_text(path: &Path, encoding: TagEncoding) -> Result<String> {
    let bytes = read_bytes(path)?;
    encoding.decode(&bytes).ok_or_else(|| {
        FormatError::Encoding {
            path: path.to_path_buf(),
            encoding: encoding.name().to_string(),
        }
        .into()
    })
}
