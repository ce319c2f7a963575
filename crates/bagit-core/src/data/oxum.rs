use std::fmt;
use std::path::Path;
use std::str::FromStr;

use bagit_fs::{DirStats, WalkOptions, directory_stats};

use crate::error::OxumError;

/// `<total bytes>.<file count>` over the payload directory.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PayloadOxum {
    pub total_bytes: u64,
    pub file_count: u64,
}

impl PayloadOxum {
    pub const fn new(total_bytes: u64, file_count: u64) -> Self { Self { total_bytes, file_count } }

    /// Count every regular file under `data_dir`, hidden files included.
    pub fn compute(data_dir: impl AsRef<Path>) -> bagit_fs::Result<Self> {
        directory_stats(data_dir, &WalkOptions::new()).map(Self::from)
    }
}

impl From<DirStats> for PayloadOxum {
    fn from(stats: DirStats) -> Self { Self::new(stats.total_bytes, stats.file_count) }
}

impl FromStr for PayloadOxum {
    type Err = OxumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || OxumError::Malformed(s.to_string());
        let (bytes, count) = s.trim().split_once('.').ok_or_else(malformed)?;
        let number = |part: &str| {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed());
            }
            part.parse::<u64>().map_err(|_| malformed())
        };
        Ok(Self::new(number(bytes)?, number(count)?))
    }
}

impl fmt::Display for PayloadOxum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.total_bytes, self.file_count)
    }
}
