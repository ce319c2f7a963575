use std::fs;
use std::path::Path;

use bagit_checksum::{Hasher, Sha256Hasher};
use bagit_core::{
    BagBuilder, BagReader, BagVerifier, CompletenessError, Error, FormatError, HasherRegistry,
    OxumError, PathError, Version, read, write,
};

fn temp_dir(prefix: &str) -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix(prefix)
        .tempdir()
        .expect("Failed to create temp dir")
}

fn populate(root: &Path) {
    fs::create_dir_all(root.join("nested/deeper")).expect("Failed to create payload dirs");
    fs::write(root.join("foo.txt"), b"hello\n").expect("Failed to write foo.txt");
    fs::write(root.join("nested/bar.bin"), [0u8, 1, 2, 3, 255]).expect("Failed to write bar.bin");
    fs::write(root.join("nested/deeper/with space.txt"), b"spaced out").expect("Failed to write spaced file");
}

fn tag_file(root: &Path, name: &str) -> Vec<u8> {
    fs::read(root.join(name)).unwrap_or_else(|e| panic!("Failed to read {name}: {e}"))
}

#[test]
fn concrete_md5_scenario() {
    let dir = temp_dir("bagit-md5-");
    fs::write(dir.path().join("foo.txt"), b"hello\n").unwrap();

    BagBuilder::new()
        .algorithm("md5")
        .bag_in_place(dir.path())
        .expect("Failed to bag directory");

    let manifest = fs::read_to_string(dir.path().join("manifest-md5.txt")).unwrap();
    assert_eq!(manifest, "b1946ac92492d2347c6235b4d2611184  data/foo.txt\n");

    let info = fs::read_to_string(dir.path().join("bag-info.txt")).unwrap();
    assert!(info.lines().any(|line| line == "Payload-Oxum: 6.1"), "bag-info.txt was:\n{info}");

    let bag = read(dir.path()).expect("Failed to read bag");
    BagVerifier::new().verify_valid(&bag, false).expect("Fresh bag should be valid");
}

#[test]
fn round_trip_every_version() {
    for version in Version::SUPPORTED {
        let source = temp_dir("bagit-src-");
        populate(source.path());

        BagBuilder::new()
            .version(version)
            .algorithms(["md5", "sha256"])
            .metadata("Source-Organization", "Example Archive")
            .metadata("External-Description", "first line\n  continued")
            .bag_in_place(source.path())
            .unwrap_or_else(|e| panic!("Failed to bag for {version}: {e}"));

        let bag = read(source.path()).unwrap_or_else(|e| panic!("Failed to read {version}: {e}"));
        assert_eq!(bag.version, version);

        let target = temp_dir("bagit-dst-");
        write(&bag, target.path()).unwrap_or_else(|e| panic!("Failed to write {version}: {e}"));

        let metadata_file = version.metadata_file_name();
        for name in [
            "bagit.txt",
            "manifest-md5.txt",
            "manifest-sha256.txt",
            metadata_file,
            "tagmanifest-md5.txt",
            "tagmanifest-sha256.txt",
        ] {
            assert_eq!(
                tag_file(source.path(), name),
                tag_file(target.path(), name),
                "{name} differs after round trip for {version}"
            );
        }

        let reread = read(target.path()).unwrap();
        assert!(BagVerifier::new().is_valid(&reread, false), "round trip of {version} is not valid");
        assert_eq!(reread.metadata.get_first("External-Description"), Some("first line\n  continued"));
    }
}

#[test]
fn completeness_membership_depends_on_version() {
    for (version, expect_complete) in [(Version::V0_96, true), (Version::V1_0, false)] {
        let dir = temp_dir("bagit-membership-");
        populate(dir.path());
        BagBuilder::new()
            .version(version)
            .algorithms(["md5", "sha1"])
            .bag_in_place(dir.path())
            .unwrap();

        let sha1 = dir.path().join("manifest-sha1.txt");
        let kept: String = fs::read_to_string(&sha1)
            .unwrap()
            .lines()
            .filter(|line| !line.ends_with("data/foo.txt"))
            .map(|line| format!("{line}\n"))
            .collect();
        fs::write(&sha1, kept).unwrap();

        let bag = read(dir.path()).unwrap();
        let result = BagVerifier::new().verify_complete(&bag, false);
        assert_eq!(result.is_ok(), expect_complete, "{version}: {result:?}");

        if !expect_complete {
            match result {
                Err(Error::Incomplete(CompletenessError::FileNotInManifest { path, manifest })) => {
                    assert_eq!(path, Path::new("data/foo.txt"));
                    assert_eq!(manifest.as_deref(), Some("manifest-sha1.txt"));
                }
                other => panic!("unexpected result: {other:?}"),
            }
        }
    }
}

#[test]
fn corruption_fails_validity_but_not_completeness() {
    let dir = temp_dir("bagit-corrupt-");
    populate(dir.path());
    BagBuilder::new().algorithm("sha256").bag_in_place(dir.path()).unwrap();

    let target = dir.path().join("data/foo.txt");
    let mut bytes = fs::read(&target).unwrap();
    bytes[0] ^= 0x01;
    fs::write(&target, bytes).unwrap();

    let bag = read(dir.path()).unwrap();
    let verifier = BagVerifier::new();
    assert!(verifier.is_complete(&bag, false));

    match verifier.verify_valid(&bag, false) {
        Err(Error::CorruptChecksum(mismatches)) => {
            assert_eq!(mismatches.len(), 1);
            assert_eq!(mismatches[0].path, Path::new("data/foo.txt"));
            assert_eq!(mismatches[0].algorithm, "sha256");
            assert_eq!(
                mismatches[0].expected,
                "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
            );
        }
        other => panic!("expected corrupt checksum, got {other:?}"),
    }
}

#[test]
fn quick_verify_byte_count_before_file_count() {
    let dir = temp_dir("bagit-oxum-");
    fs::write(dir.path().join("foo.txt"), b"hello\n").unwrap();
    BagBuilder::new().algorithm("md5").bag_in_place(dir.path()).unwrap();

    let bag = read(dir.path()).unwrap();
    let verifier = BagVerifier::new();
    assert!(verifier.can_quickly_verify(&bag));
    verifier.quickly_verify(&bag).expect("6.1 over one 6-byte file");

    fs::write(dir.path().join("data/foo.txt"), b"hello!\n").unwrap();
    assert!(matches!(
        verifier.quickly_verify(&bag),
        Err(Error::Oxum(OxumError::ByteCount { expected: 6, actual: 7 }))
    ));
}

#[test]
fn malicious_manifest_paths_are_rejected_on_read() {
    let dir = temp_dir("bagit-malicious-");
    fs::write(dir.path().join("foo.txt"), b"hello\n").unwrap();
    BagBuilder::new().algorithm("md5").bag_in_place(dir.path()).unwrap();

    let manifest = dir.path().join("manifest-md5.txt");
    for declared in ["../../etc/passwd", "data/../../outside.txt"] {
        fs::write(&manifest, format!("b1946ac92492d2347c6235b4d2611184  {declared}\n")).unwrap();
        assert!(
            matches!(read(dir.path()), Err(Error::Path(PathError::Traversal { .. }))),
            "{declared} should be rejected"
        );
    }

    fs::write(&manifest, "b1946ac92492d2347c6235b4d2611184  ~/foo.txt\n").unwrap();
    assert!(matches!(read(dir.path()), Err(Error::Path(PathError::HomeDirectory(_)))));
}

#[test]
fn format_errors_are_fatal() {
    let dir = temp_dir("bagit-format-");
    fs::write(dir.path().join("foo.txt"), b"hello\n").unwrap();
    BagBuilder::new().algorithm("md5").bag_in_place(dir.path()).unwrap();

    fs::write(dir.path().join("bag-info.txt"), "  leading continuation\nKey: value\n").unwrap();
    assert!(matches!(
        read(dir.path()),
        Err(Error::Format(FormatError::Indentation { line: 1, .. }))
    ));

    fs::write(dir.path().join("bag-info.txt"), "Payload-Oxum: 6.1\n").unwrap();
    fs::write(
        dir.path().join("bagit.txt"),
        b"\xEF\xBB\xBFBagIt-Version: 1.0\nTag-File-Character-Encoding: UTF-8\n",
    )
    .unwrap();
    assert!(matches!(read(dir.path()), Err(Error::Format(FormatError::ByteOrderMark(_)))));
}

#[test]
fn escaped_file_names_survive_a_bag_round_trip() {
    if cfg!(windows) {
        return;
    }

    let dir = temp_dir("bagit-escape-");
    fs::write(dir.path().join("bar\nham\rbaz.txt"), b"odd name").unwrap();
    BagBuilder::new().algorithm("md5").bag_in_place(dir.path()).unwrap();

    let manifest = fs::read_to_string(dir.path().join("manifest-md5.txt")).unwrap();
    assert!(manifest.ends_with("  data/bar%0Aham%0Dbaz.txt\n"), "manifest was {manifest:?}");

    let bag = read(dir.path()).unwrap();
    assert!(BagVerifier::new().is_valid(&bag, false));
}

#[test]
fn custom_algorithms_plug_into_the_registry() {
    let mut registry = HasherRegistry::standard();
    registry.register("sha256-again", || Box::new(Sha256Hasher::new()));

    let dir = temp_dir("bagit-custom-");
    fs::write(dir.path().join("foo.txt"), b"hello world").unwrap();
    BagBuilder::new()
        .algorithm("sha256-again")
        .registry(registry.clone())
        .bag_in_place(dir.path())
        .unwrap();

    let manifest = fs::read_to_string(dir.path().join("manifest-sha256-again.txt")).unwrap();
    assert!(manifest.starts_with("b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9  "));

    let bag = BagReader::with_registry(registry.clone()).read(dir.path()).unwrap();
    assert!(BagVerifier::with_registry(registry).is_valid(&bag, false));

    assert!(matches!(
        BagVerifier::new().verify_valid(&bag, false),
        Err(Error::Checksum(bagit_checksum::Error::UnsupportedAlgorithm(_)))
    ));
}

#[test]
fn hashing_is_deterministic_and_resettable() {
    let mut hasher = Sha256Hasher::new();
    hasher.update(b"hello world");
    let first = hasher.hex_digest();

    hasher.reset();
    hasher.update(b"hello world");
    assert_eq!(hasher.hex_digest(), first);

    hasher.update(b"hello world");
    assert_ne!(hasher.hex_digest(), first);
}
