use std::collections::HashSet;
use std::path::{Path, PathBuf};

use bagit_fs::{Visit, WalkOptions, walk};
use unicode_normalization::UnicodeNormalization;

use crate::data::{Bag, Manifest, ManifestKind};
use crate::error::{CompletenessError, Error, Result};
use crate::sanitize::relative_to;

/// Structural checks, in order: fetch items, `bagit.txt`, payload
/// directory, at least one payload manifest, every listed file present,
/// every payload file listed.
pub(crate) fn check_complete(bag: &Bag, ignore_hidden: bool) -> Result<()> {
    for item in &bag.items_to_fetch {
        if locate(&item.path).is_none() {
            return Err(CompletenessError::MissingFetchItem(item.path.clone()).into());
        }
    }

    let bagit_file = bag.bagit_file();
    if !bagit_file.is_file() {
        return Err(CompletenessError::MissingBagitFile(bagit_file).into());
    }

    let data_dir = bag.data_dir();
    if !data_dir.is_dir() {
        return Err(CompletenessError::MissingPayloadDirectory(data_dir).into());
    }

    if bag.payload_manifests.is_empty() {
        return Err(CompletenessError::MissingPayloadManifest(bag.root_dir.clone()).into());
    }

    check_listed_files_exist(bag, ManifestKind::Payload, bag.payload_manifests.values())?;
    check_listed_files_exist(bag, ManifestKind::Tag, bag.tag_manifests.values())?;
    check_payload_membership(bag, ignore_hidden)?;

    tracing::debug!(root = %bag.root_dir.display(), "bag is complete");
    Ok(())
}

fn check_listed_files_exist<'a>(
    bag: &Bag,
    kind: ManifestKind,
    manifests: impl Iterator<Item = &'a Manifest>,
) -> Result<()> {
    for manifest in manifests {
        for entry in manifest.entries() {
            if locate(&entry.physical).is_none() {
                return Err(CompletenessError::FileNotInPayloadDirectory {
                    manifest: kind.file_name(manifest.algorithm()),
                    path: relative_to(&bag.root_dir, &entry.physical),
                }
                .into());
            }
        }
    }
    Ok(())
}

/// Before 1.0 a payload file must be in at least one payload manifest; from
/// 1.0 it must be in every one.
fn check_payload_membership(bag: &Bag, ignore_hidden: bool) -> Result<()> {
    let listed: Vec<(String, HashSet<String>)> = bag
        .payload_manifests
        .values()
        .map(|manifest| {
            let paths = manifest
                .entries()
                .map(|entry| normalized(&entry.physical))
                .collect();
            (ManifestKind::Payload.file_name(manifest.algorithm()), paths)
        })
        .collect();

    let every = bag.version.requires_every_manifest();
    let options = WalkOptions::new().skip_hidden(ignore_hidden);

    walk(bag.data_dir(), &options, |entry| {
        if !entry.is_file() {
            return Ok::<_, Error>(Visit::Continue);
        }

        let key = normalized(&entry.path);
        let missing_from = listed.iter().find(|(_, paths)| !paths.contains(&key));
        let in_any = listed.iter().any(|(_, paths)| paths.contains(&key));

        let violation = match (every, missing_from) {
            (true, Some((name, _))) => Some(Some(name.clone())),
            (false, _) if !in_any => Some(None),
            _ => None,
        };

        if let Some(manifest) = violation {
            return Err(CompletenessError::FileNotInManifest {
                path: relative_to(&bag.root_dir, &entry.path),
                manifest,
            }
            .into());
        }
        Ok(Visit::Continue)
    })
}

/// The path as it exists on disk, tolerating a file name stored in a
/// different Unicode normalization form than the manifest records.
pub(super) fn locate(path: &Path) -> Option<PathBuf> {
    if path.exists() {
        return Some(path.to_path_buf());
    }

    let text = path.to_str()?;
    [text.nfc().collect::<String>(), text.nfd().collect::<String>()]
        .into_iter()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
        .inspect(|found| {
            tracing::warn!(
                listed = %path.display(),
                found = %found.display(),
                "file found only under a different Unicode normalization"
            );
        })
}

fn normalized(path: &Path) -> String { path.to_string_lossy().nfc().collect() }
