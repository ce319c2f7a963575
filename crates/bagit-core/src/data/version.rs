use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{BAG_INFO_FILE, PACKAGE_INFO_FILE};
use crate::error::FormatError;

static VERSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?<major>[0-9]+)\.(?<minor>[0-9]+)$").unwrap());

/// BagIt specification version, ordered by major then minor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl Version {
    pub const V0_93: Self = Self::new(0, 93);
    pub const V0_94: Self = Self::new(0, 94);
    pub const V0_95: Self = Self::new(0, 95);
    pub const V0_96: Self = Self::new(0, 96);
    pub const V0_97: Self = Self::new(0, 97);
    pub const V1_0: Self = Self::new(1, 0);

    pub const LATEST: Self = Self::V1_0;

    pub const SUPPORTED: [Self; 6] =
        [Self::V0_93, Self::V0_94, Self::V0_95, Self::V0_96, Self::V0_97, Self::V1_0];

    pub const fn new(major: u32, minor: u32) -> Self { Self { major, minor } }

    pub fn parse(s: &str) -> Result<Self, FormatError> {
        let trimmed = s.trim();
        let caps = VERSION_REGEX
            .captures(trimmed)
            .ok_or_else(|| FormatError::UnparsableVersion(s.to_string()))?;

        let number = |name: &str| {
            caps[name]
                .parse::<u32>()
                .map_err(|_| FormatError::UnparsableVersion(s.to_string()))
        };

        Ok(Self::new(number("major")?, number("minor")?))
    }

    pub fn is_older_than(&self, other: Self) -> bool { *self < other }

    pub fn is_same_or_newer(&self, other: Self) -> bool { *self >= other }

    /// `package-info.txt` up to 0.95, `bag-info.txt` afterwards.
    pub fn metadata_file_name(&self) -> &'static str {
        if *self <= Self::V0_95 { PACKAGE_INFO_FILE } else { BAG_INFO_FILE }
    }

    /// From 1.0 every payload file must be listed in every payload manifest.
    pub fn requires_every_manifest(&self) -> bool { self.is_same_or_newer(Self::V1_0) }
}

impl Default for Version {
    fn default() -> Self { Self::LATEST }
}

impl FromStr for Version {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> { Version::parse(s) }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
