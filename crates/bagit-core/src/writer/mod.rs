//! Serialize a [`Bag`] to a directory.
//!
//! Order matters: payload, `Payload-Oxum`, `bagit.txt`, payload manifests,
//! metadata, `fetch.txt`, and tag manifests last so their checksums cover the
//! tag files as written. A failure part way leaves a partial directory.

mod payload;

use std::path::Path;

use bagit_checksum::{HasherRegistry, hash_file};
use bagit_fs::{AtomicWriteOptions, atomic_write, create_dir_all};

use crate::data::{Bag, Manifest, ManifestEntry, ManifestKind, PayloadOxum};
use crate::error::{FormatError, Result};
use crate::reader::{classify_manifest, format_declaration, format_key_value};
use crate::sanitize::absolute_root;

/// Writes bags to disk, recomputing tag manifests with its registry.
#[derive(Clone, Debug, Default)]
pub struct BagWriter {
    registry: HasherRegistry,
    sync: bool,
}

impl BagWriter {
    pub fn new() -> Self { Self::default() }

    pub fn with_registry(registry: HasherRegistry) -> Self { Self { registry, sync: false } }

    /// Flush each tag file to disk before renaming it into place.
    pub fn sync(mut self, sync: bool) -> Self {
        self.sync = sync;
        self
    }

    /// Write `bag` under `out` and return the bag as it now exists there.
    pub fn write(&self, bag: &Bag, out: impl AsRef<Path>) -> Result<Bag> {
        let out = absolute_root(out.as_ref());
        tracing::debug!(from = %bag.root_dir.display(), to = %out.display(), "writing bag");

        let mut written = rebase(bag, &out);

        create_dir_all(written.data_dir())?;
        let copied = payload::copy_payload(bag, &out)?;

        let oxum = PayloadOxum::compute(written.data_dir())?;
        written.metadata.upsert_payload_oxum(oxum);

        self.write_declaration(&written)?;
        for manifest in written.payload_manifests.values() {
            self.write_manifest(&written, ManifestKind::Payload, manifest)?;
        }
        self.write_metadata(&written)?;
        self.write_fetch(&written)?;

        self.copy_tag_files(bag, &written)?;
        let recomputed = written
            .tag_manifests
            .values()
            .map(|manifest| self.recompute(manifest))
            .collect::<Result<Vec<_>>>()?;
        for manifest in recomputed {
            self.write_manifest(&written, ManifestKind::Tag, &manifest)?;
            written.add_tag_manifest(manifest);
        }

        tracing::info!(root = %out.display(), payload_files_copied = copied, %oxum, "wrote bag");
        Ok(written)
    }

    fn options(&self) -> AtomicWriteOptions { AtomicWriteOptions::new().sync(self.sync) }

    fn write_tag_file(&self, bag: &Bag, path: &Path, text: &str) -> Result<()> {
        let bytes = bag.file_encoding.encode(text).ok_or_else(|| FormatError::Unencodable {
            path: path.to_path_buf(),
            encoding: bag.file_encoding.name().to_string(),
        })?;
        atomic_write(path, &bytes, self.options())?;
        tracing::debug!(file = %path.display(), "wrote tag file");
        Ok(())
    }

    /// `bagit.txt` is always UTF-8.
    pub(crate) fn write_declaration(&self, bag: &Bag) -> Result<()> {
        let text = format_declaration(bag.version, bag.file_encoding);
        atomic_write(bag.bagit_file(), text.as_bytes(), self.options())?;
        Ok(())
    }

    pub(crate) fn write_manifest(&self, bag: &Bag, kind: ManifestKind, manifest: &Manifest) -> Result<()> {
        let path = bag.manifest_file(kind, manifest.algorithm());
        self.write_tag_file(bag, &path, &manifest.to_lines())
    }

    pub(crate) fn write_metadata(&self, bag: &Bag) -> Result<()> {
        if bag.metadata.is_empty() {
            return Ok(());
        }
        let text: String = bag
            .metadata
            .iter()
            .map(|(key, value)| format_key_value(key, value))
            .collect();
        self.write_tag_file(bag, &bag.metadata_file(), &text)
    }

    pub(crate) fn write_fetch(&self, bag: &Bag) -> Result<()> {
        if bag.items_to_fetch.is_empty() {
            return Ok(());
        }
        let text: String = bag
            .items_to_fetch
            .iter()
            .map(|item| format!("{item}\n"))
            .collect();
        self.write_tag_file(bag, &bag.fetch_file(), &text)
    }

    /// Copy tag files listed by `source`'s tag manifests that the writer
    /// does not produce itself, such as custom tag directories. An existing
    /// file at the destination is overwritten.
    fn copy_tag_files(&self, source: &Bag, target: &Bag) -> Result<()> {
        for manifest in source.tag_manifests.values() {
            for entry in manifest.entries() {
                let destination = target.root_dir.join(&entry.relative);
                if is_generated(target, &destination)
                    || destination == entry.physical
                    || !entry.physical.is_file()
                {
                    continue;
                }
                bagit_fs::copy_file(&entry.physical, &destination)?;
                tracing::debug!(file = %entry.relative.display(), "copied tag file");
            }
        }
        Ok(())
    }

    /// Hash every listed tag file as it now exists on disk. Entries naming
    /// other tag manifests are dropped since those are rewritten after this
    /// manifest is computed.
    pub(crate) fn recompute(&self, manifest: &Manifest) -> Result<Manifest> {
        let mut hasher = self.registry.create(manifest.algorithm())?;
        let mut fresh = Manifest::new(manifest.algorithm());

        for entry in manifest.entries() {
            if is_tag_manifest(&entry.relative) {
                tracing::warn!(file = %entry.relative.display(), "dropping tag manifest entry for a tag manifest");
                continue;
            }
            let checksum = hash_file(&entry.physical, &mut hasher)?;
            fresh.insert(ManifestEntry::new(entry.physical.clone(), entry.relative.clone(), checksum));
        }

        Ok(fresh)
    }
}

/// Write `bag` to `out` with the standard algorithm registry.
pub fn write(bag: &Bag, out: impl AsRef<Path>) -> Result<Bag> { BagWriter::new().write(bag, out) }

/// Tag files the writer renders from the bag model rather than copying.
fn is_generated(bag: &Bag, path: &Path) -> bool {
    if path == bag.bagit_file() || path == bag.metadata_file() || path == bag.fetch_file() {
        return true;
    }
    path.parent() == Some(bag.root_dir.as_path())
        && path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(classify_manifest)
            .is_some()
}

fn is_tag_manifest(relative: &Path) -> bool {
    relative.parent().is_some_and(|parent| parent.as_os_str().is_empty())
        && relative
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(classify_manifest)
            .is_some_and(|(kind, _)| kind == ManifestKind::Tag)
}

/// Same bag, with every physical path moved under `out`.
fn rebase(bag: &Bag, out: &Path) -> Bag {
    let mut rebased = bag.clone();
    rebased.root_dir = out.to_path_buf();

    for manifest in rebased.payload_manifests.values_mut() {
        *manifest = manifest.rebased(out);
    }
    for manifest in rebased.tag_manifests.values_mut() {
        *manifest = manifest.rebased(out);
    }
    rebased.items_to_fetch = bag
        .items_to_fetch
        .iter()
        .map(|item| item.rebased(out))
        .collect();

    rebased
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{FetchItem, Metadata, Version};
    use crate::encoding::TagEncoding;
    use crate::error::Error;
    use std::fs;
    use tempfile::tempdir;
    use url::Url;

    fn source_bag(root: &Path) -> Bag {
        fs::create_dir_all(root.join("data")).unwrap();
        fs::write(root.join("data/foo.txt"), b"hello\n").unwrap();

        let mut bag = Bag::new(root, Version::LATEST);
        let mut manifest = Manifest::new("md5");
        manifest.insert(ManifestEntry::new(
            root.join("data/foo.txt"),
            "data/foo.txt",
            "b1946ac92492d2347c6235b4d2611184",
        ));
        bag.add_payload_manifest(manifest);
        bag
    }

    #[test]
    fn writes_payload_manifest_and_oxum() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let bag = source_bag(src.path());

        let written = write(&bag, out.path()).unwrap();

        assert_eq!(
            fs::read_to_string(out.path().join("manifest-md5.txt")).unwrap(),
            "b1946ac92492d2347c6235b4d2611184  data/foo.txt\n"
        );
        assert_eq!(
            fs::read_to_string(out.path().join("bagit.txt")).unwrap(),
            "BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n"
        );
        assert_eq!(fs::read_to_string(out.path().join("bag-info.txt")).unwrap(), "Payload-Oxum: 6.1\n");
        assert_eq!(fs::read(out.path().join("data/foo.txt")).unwrap(), b"hello\n");
        assert_eq!(written.metadata.get_first("Payload-Oxum"), Some("6.1"));
        assert!(!out.path().join("fetch.txt").exists());
    }

    #[test]
    fn tag_manifests_are_recomputed_over_written_files() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut bag = source_bag(src.path());

        let mut tags = Manifest::new("md5");
        tags.insert(ManifestEntry::new(src.path().join("bagit.txt"), "bagit.txt", "stale"));
        tags.insert(ManifestEntry::new(src.path().join("bag-info.txt"), "bag-info.txt", "stale"));
        bag.add_tag_manifest(tags);

        let written = write(&bag, out.path()).unwrap();
        let manifest = written.tag_manifest("md5").unwrap();
        assert!(manifest.entries().all(|entry| entry.checksum != "stale"));

        let text = fs::read_to_string(out.path().join("tagmanifest-md5.txt")).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("  bag-info.txt"));
    }

    #[test]
    fn custom_tag_files_are_copied() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut bag = source_bag(src.path());
        fs::create_dir_all(src.path().join("meta")).unwrap();
        fs::write(src.path().join("meta/notes.txt"), b"notes").unwrap();

        let mut tags = Manifest::new("sha256");
        tags.insert(ManifestEntry::new(src.path().join("meta/notes.txt"), "meta/notes.txt", "x"));
        bag.add_tag_manifest(tags);

        write(&bag, out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("meta/notes.txt")).unwrap(), b"notes");
    }

    #[test]
    fn stale_tag_files_in_output_are_replaced() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut bag = source_bag(src.path());
        fs::create_dir_all(src.path().join("meta")).unwrap();
        fs::write(src.path().join("meta/notes.txt"), b"fresh").unwrap();
        fs::create_dir_all(out.path().join("meta")).unwrap();
        fs::write(out.path().join("meta/notes.txt"), b"stale").unwrap();

        let mut tags = Manifest::new("md5");
        tags.insert(ManifestEntry::new(src.path().join("meta/notes.txt"), "meta/notes.txt", "x"));
        bag.add_tag_manifest(tags);

        let written = write(&bag, out.path()).unwrap();
        assert_eq!(fs::read(out.path().join("meta/notes.txt")).unwrap(), b"fresh");
        let manifest = written.tag_manifest("md5").unwrap();
        let entry = manifest.entries().find(|entry| entry.relative == Path::new("meta/notes.txt")).unwrap();
        // md5("fresh")
        assert_eq!(entry.checksum, "76010858c8362d7302ef5f9436aa6639");
    }

    #[test]
    fn holey_bag_keeps_fetch_items() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut bag = source_bag(src.path());
        bag.payload_manifests
            .get_mut("md5")
            .unwrap()
            .insert(ManifestEntry::new(src.path().join("data/remote.bin"), "data/remote.bin", "abc"));
        bag.items_to_fetch.push(FetchItem::new(
            Url::parse("https://example.org/remote.bin").unwrap(),
            Some(3),
            src.path().join("data/remote.bin"),
            "data/remote.bin",
        ));
        let mut tags = Manifest::new("md5");
        tags.insert(ManifestEntry::new(src.path().join("bagit.txt"), "bagit.txt", "stale"));
        tags.insert(ManifestEntry::new(src.path().join("fetch.txt"), "fetch.txt", "stale"));
        bag.add_tag_manifest(tags);

        write(&bag, out.path()).unwrap();
        let fetch = fs::read_to_string(out.path().join("fetch.txt")).unwrap();
        assert_eq!(fetch, "https://example.org/remote.bin 3 data/remote.bin\n");
        assert!(!out.path().join("data/remote.bin").exists());

        let reread = crate::reader::read(out.path()).unwrap();
        assert_eq!(reread.items_to_fetch.len(), 1);
        assert_eq!(reread.items_to_fetch[0].relative, Path::new("data/remote.bin"));
        let manifest = reread.tag_manifest("md5").unwrap();
        let entry = manifest.entries().find(|entry| entry.relative == Path::new("fetch.txt")).unwrap();
        let mut hasher = bagit_checksum::Md5Hasher::new();
        assert_eq!(entry.checksum, hash_file(out.path().join("fetch.txt"), &mut hasher).unwrap());
    }

    #[test]
    fn metadata_and_fetch_use_declared_encoding() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut bag = source_bag(src.path());
        bag.file_encoding = TagEncoding::Latin1;
        bag.metadata = Metadata::from_iter([("Source-Organization", "Caf\u{e9}")]);

        write(&bag, out.path()).unwrap();
        let bytes = fs::read(out.path().join("bag-info.txt")).unwrap();
        assert!(bytes.starts_with(b"Source-Organization: Caf\xE9\n"));
    }

    #[test]
    fn unencodable_metadata_fails() {
        let src = tempdir().unwrap();
        let out = tempdir().unwrap();
        let mut bag = source_bag(src.path());
        bag.file_encoding = TagEncoding::Ascii;
        bag.metadata.add("Contact-Name", "Jos\u{e9}");

        assert!(matches!(
            write(&bag, out.path()),
            Err(Error::Format(FormatError::Unencodable { .. }))
        ));
    }

    #[test]
    fn tag_manifest_entries_for_tag_manifests_are_dropped() {
        assert!(is_tag_manifest(Path::new("tagmanifest-md5.txt")));
        assert!(!is_tag_manifest(Path::new("manifest-md5.txt")));
        assert!(!is_tag_manifest(Path::new("meta/tagmanifest-md5.txt")));
    }
}
