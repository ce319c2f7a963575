use std::path::Path;

use crate::{Error, Visit, WalkOptions, walk};

/// Total size and count of the regular files in a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DirStats {
    pub total_bytes: u64,
    pub file_count: u64,
}

pub fn directory_stats(root: impl AsRef<Path>, options: &WalkOptions) -> crate::Result<DirStats> {
    let mut stats = DirStats::default();
    walk(root, options, |entry| {
        if entry.is_file() {
            stats.total_bytes += entry.len;
            stats.file_count += 1;
        }
        Ok::<_, Error>(Visit::Continue)
    })?;
    Ok(stats)
}
