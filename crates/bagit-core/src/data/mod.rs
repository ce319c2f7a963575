//! Value types shared by the reader, writer and verifier.

mod bag;
mod fetch;
mod manifest;
mod metadata;
mod oxum;
mod version;

pub use bag::Bag;
pub use fetch::FetchItem;
pub use manifest::{Manifest, ManifestEntry, ManifestKind};
pub use metadata::{Metadata, keys};
pub use oxum::PayloadOxum;
pub use version::Version;

pub const BAGIT_FILE: &str = "bagit.txt";
pub const DATA_DIR: &str = "data";
pub const FETCH_FILE: &str = "fetch.txt";
pub const BAG_INFO_FILE: &str = "bag-info.txt";
pub const PACKAGE_INFO_FILE: &str = "package-info.txt";
