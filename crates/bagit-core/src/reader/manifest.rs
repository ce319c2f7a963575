use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::data::{Manifest, ManifestEntry, ManifestKind};
use crate::error::{Error, FormatError};
use crate::sanitize::{relative_to, resolve_declared_path};

static MANIFEST_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?<kind>tagmanifest|manifest)-(?<algorithm>.+)\.txt$").unwrap());

/// Kind and lowercase algorithm of a manifest file name, if it is one.
pub(crate) fn classify(file_name: &str) -> Option<(ManifestKind, String)> {
    let caps = MANIFEST_NAME.captures(file_name)?;
    let kind = match &caps["kind"] {
        "tagmanifest" => ManifestKind::Tag,
        _ => ManifestKind::Payload,
    };
    Some((kind, caps["algorithm"].to_ascii_lowercase()))
}

/// Split a line at its first whitespace run: `(first field, rest)`.
pub(crate) fn split_field(line: &str) -> Option<(&str, &str)> {
    let (first, rest) = line.trim_start().split_once(char::is_whitespace)?;
    let rest = rest.trim_start();
    (!first.is_empty() && !rest.is_empty()).then_some((first, rest))
}

/// Parse manifest text. Every declared path goes through path resolution
/// against `bag_root`, which must already be absolute.
pub(crate) fn parse_manifest(
    path: &Path,
    bag_root: &Path,
    algorithm: &str,
    text: &str,
) -> Result<Manifest, Error> {
    let mut manifest = Manifest::new(algorithm);

    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }

        let (checksum, declared) = split_field(line).ok_or_else(|| FormatError::ManifestLine {
            path: path.to_path_buf(),
            line: index + 1,
        })?;

        let physical = resolve_declared_path(bag_root, declared)?;
        let relative = relative_to(bag_root, &physical);

        tracing::trace!(manifest = %path.display(), file = %relative.display(), "manifest entry");
        manifest.insert(ManifestEntry::new(physical, relative, checksum));
    }

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PathError;

    fn root() -> &'static Path {
        if cfg!(windows) { Path::new("C:/bag") } else { Path::new("/bag") }
    }

    fn parse(text: &str) -> Result<Manifest, Error> {
        parse_manifest(Path::new("manifest-md5.txt"), root(), "md5", text)
    }

    #[test]
    fn classifies_manifest_names() {
        assert_eq!(classify("manifest-md5.txt"), Some((ManifestKind::Payload, "md5".to_string())));
        assert_eq!(classify("tagmanifest-SHA256.txt"), Some((ManifestKind::Tag, "sha256".to_string())));
        assert_eq!(classify("manifest-.txt"), None);
        assert_eq!(classify("bag-info.txt"), None);
        assert_eq!(classify("manifest-md5.txt.bak"), None);
    }

    #[test]
    fn whitespace_runs_separate_fields() {
        let manifest = parse("aa  data/one.txt\nbb\tdata/two.txt\ncc data/with space.txt\n\n").unwrap();
        assert_eq!(manifest.len(), 3);

        let entry = manifest.get(&root().join("data/with space.txt")).unwrap();
        assert_eq!(entry.checksum, "cc");
        assert_eq!(entry.relative, Path::new("data/with space.txt"));
    }

    #[test]
    fn md5sum_binary_marker_is_tolerated() {
        let manifest = parse("b1946ac92492d2347c6235b4d2611184 *data/foo.txt\n").unwrap();
        let entry = manifest.entries().next().unwrap();
        assert_eq!(entry.relative, Path::new("data/foo.txt"));
    }

    #[test]
    fn missing_path_is_a_format_error() {
        assert!(matches!(
            parse("aa  data/ok.txt\nb1946ac92492d2347c6235b4d2611184\n"),
            Err(Error::Format(FormatError::ManifestLine { line: 2, .. }))
        ));
    }

    #[test]
    fn malicious_paths_fail() {
        assert!(matches!(parse("aa  ../../etc/passwd\n"), Err(Error::Path(PathError::Traversal { .. }))));
        assert!(matches!(parse("aa  ~/x\n"), Err(Error::Path(PathError::HomeDirectory(_)))));
        assert!(matches!(parse("aa  data\\x\n"), Err(Error::Path(PathError::Backslash(_)))));
    }

    #[test]
    fn escaped_line_breaks_are_decoded() {
        let manifest = parse("aa  data/bar%0Aham%0Dbaz.txt\n").unwrap();
        let entry = manifest.entries().next().unwrap();
        assert_eq!(entry.relative, Path::new("data/bar\nham\rbaz.txt"));
        assert_eq!(entry.relative_display(), "data/bar%0Aham%0Dbaz.txt");
    }
}
