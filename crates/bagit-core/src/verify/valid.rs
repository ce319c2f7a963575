use std::collections::BTreeMap;
use std::path::Path;

use bagit_checksum::{HasherRegistry, MultiHasher, hash_file_multi};

use super::complete::{check_complete, locate};
use crate::data::{Bag, ManifestEntry};
use crate::error::{ChecksumMismatch, Error, Result};

/// Completeness, then every listed file hashed once with every algorithm
/// that lists it. All mismatches are collected, sorted by path then
/// algorithm.
pub(crate) fn check_valid(registry: &HasherRegistry, bag: &Bag, ignore_hidden: bool) -> Result<()> {
    check_complete(bag, ignore_hidden)?;

    for algorithm in bag.algorithms() {
        if !registry.is_supported(algorithm) {
            return Err(bagit_checksum::Error::UnsupportedAlgorithm(algorithm.to_string()).into());
        }
    }

    let mut expected: BTreeMap<&Path, Vec<(&str, &ManifestEntry)>> = BTreeMap::new();
    for manifest in bag.payload_manifests.values().chain(bag.tag_manifests.values()) {
        for entry in manifest.entries() {
            expected
                .entry(entry.physical.as_path())
                .or_default()
                .push((manifest.algorithm(), entry));
        }
    }

    let mut mismatches = Vec::new();
    for (physical, listings) in &expected {
        let path = locate(physical).unwrap_or_else(|| physical.to_path_buf());
        let mut hashers = MultiHasher::new(registry, listings.iter().map(|(algorithm, _)| algorithm))?;
        let bytes = hash_file_multi(&path, &mut hashers)?;
        let digests = hashers.hex_digests();
        tracing::debug!(file = %path.display(), bytes, "hashed file");

        for (algorithm, entry) in listings {
            let actual = digests.get(*algorithm).map(String::as_str).unwrap_or_default();
            if actual != entry.checksum {
                mismatches.push(ChecksumMismatch {
                    path: entry.relative.clone(),
                    algorithm: algorithm.to_string(),
                    expected: entry.checksum.clone(),
                    actual: actual.to_string(),
                });
            }
        }
    }

    if mismatches.is_empty() {
        tracing::debug!(root = %bag.root_dir.display(), files = expected.len(), "bag is valid");
        return Ok(());
    }

    mismatches.sort_by(|a, b| (&a.path, &a.algorithm).cmp(&(&b.path, &b.algorithm)));
    for mismatch in &mismatches {
        tracing::warn!(%mismatch, "checksum mismatch");
    }
    Err(Error::CorruptChecksum(mismatches))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Manifest, Version};
    use std::fs;
    use tempfile::tempdir;

    const HELLO_MD5: &str = "b1946ac92492d2347c6235b4d2611184";
    const HELLO_SHA1: &str = "f572d396fae9206628714fb2ce00f72e94f2258f";

    fn bag_on_disk(root: &Path) -> Bag {
        fs::create_dir_all(root.join("data")).unwrap();
        fs::write(root.join("bagit.txt"), b"BagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n").unwrap();
        fs::write(root.join("data/a.txt"), b"hello\n").unwrap();
        fs::write(root.join("data/b.txt"), b"hello\n").unwrap();

        let mut bag = Bag::new(root, Version::V1_0);
        let mut md5 = Manifest::new("md5");
        let mut sha1 = Manifest::new("sha1");
        for name in ["data/a.txt", "data/b.txt"] {
            md5.insert(ManifestEntry::new(root.join(name), name, HELLO_MD5));
            sha1.insert(ManifestEntry::new(root.join(name), name, HELLO_SHA1));
        }
        bag.add_payload_manifest(md5);
        bag.add_payload_manifest(sha1);
        bag
    }

    #[test]
    fn matching_checksums_are_valid() {
        let dir = tempdir().unwrap();
        let bag = bag_on_disk(dir.path());
        check_valid(&HasherRegistry::standard(), &bag, false).unwrap();
    }

    #[test]
    fn every_mismatch_is_reported_in_order() {
        let dir = tempdir().unwrap();
        let bag = bag_on_disk(dir.path());
        fs::write(dir.path().join("data/b.txt"), b"jello\n").unwrap();
        fs::write(dir.path().join("data/a.txt"), b"hellO\n").unwrap();

        let Err(Error::CorruptChecksum(mismatches)) = check_valid(&HasherRegistry::standard(), &bag, false) else {
            panic!("expected corrupt checksum");
        };

        let summary: Vec<(String, &str)> = mismatches
            .iter()
            .map(|m| (m.path.to_string_lossy().into_owned(), m.algorithm.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                ("data/a.txt".to_string(), "md5"),
                ("data/a.txt".to_string(), "sha1"),
                ("data/b.txt".to_string(), "md5"),
                ("data/b.txt".to_string(), "sha1"),
            ]
        );
        assert_eq!(mismatches[0].expected, HELLO_MD5);
        assert_ne!(mismatches[0].actual, HELLO_MD5);
    }

    #[test]
    fn checksum_comparison_is_case_sensitive() {
        let dir = tempdir().unwrap();
        let mut bag = bag_on_disk(dir.path());
        let mut md5 = Manifest::new("md5");
        for name in ["data/a.txt", "data/b.txt"] {
            md5.insert(ManifestEntry::new(dir.path().join(name), name, HELLO_MD5.to_uppercase()));
        }
        bag.add_payload_manifest(md5);

        assert!(matches!(
            check_valid(&HasherRegistry::standard(), &bag, false),
            Err(Error::CorruptChecksum(_))
        ));
    }

    #[test]
    fn unknown_algorithm_fails_closed() {
        let dir = tempdir().unwrap();
        let mut bag = bag_on_disk(dir.path());
        let mut other = Manifest::new("whirlpool");
        other.insert(ManifestEntry::new(dir.path().join("data/a.txt"), "data/a.txt", "00"));
        other.insert(ManifestEntry::new(dir.path().join("data/b.txt"), "data/b.txt", "00"));
        bag.add_payload_manifest(other);

        assert!(matches!(
            check_valid(&HasherRegistry::standard(), &bag, false),
            Err(Error::Checksum(bagit_checksum::Error::UnsupportedAlgorithm(_)))
        ));
    }
}
