use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use crate::data::Bag;
use crate::error::Result;

/// Copy every file named by a payload manifest into `out`, keeping its
/// bag-relative location. Files already in place are left alone, as are
/// fetch destinations that have not been downloaded yet.
pub(crate) fn copy_payload(bag: &Bag, out: &Path) -> Result<u64> {
    let pending: HashSet<&Path> = bag
        .items_to_fetch
        .iter()
        .map(|item| item.relative.as_path())
        .collect();

    let mut sources: BTreeMap<&Path, &Path> = BTreeMap::new();
    for manifest in bag.payload_manifests.values() {
        for entry in manifest.entries() {
            sources.entry(entry.relative.as_path()).or_insert(entry.physical.as_path());
        }
    }

    let mut copied = 0;
    for (relative, source) in sources {
        let target: PathBuf = out.join(relative);
        if target == source {
            continue;
        }
        if pending.contains(relative) && !source.is_file() {
            tracing::debug!(file = %relative.display(), "left for fetch");
            continue;
        }
        let bytes = bagit_fs::copy_file(source, &target)?;
        tracing::debug!(file = %relative.display(), bytes, "copied payload file");
        copied += 1;
    }

    Ok(copied)
}
