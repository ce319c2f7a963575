//! BagIt bag integrity engine.
//!
//! Reads, writes and verifies bags for BagIt versions 0.93 through 1.0.
//!
//! # Architecture
//!
//! - `data/` - value types: [`Version`], [`Manifest`], [`FetchItem`], [`Metadata`], [`Bag`]
//! - `sanitize.rs` - resolution of declared paths against the bag root
//! - `encoding.rs` - tag file character encodings
//! - `reader/` - parsing of `bagit.txt`, manifests, metadata and `fetch.txt`
//! - `writer/` - serialization of a bag to disk
//! - `builder.rs` - programmatic construction and bagging a directory in place
//! - `verify/` - completeness, validity and Payload-Oxum checks
//!
//! # Example
//!
//! ```no_run
//! use bagit_core::{BagBuilder, BagVerifier, read};
//!
//! # fn main() -> bagit_core::Result<()> {
//! BagBuilder::new().algorithm("sha256").bag_in_place("/tmp/transfer")?;
//!
//! let bag = read("/tmp/transfer")?;
//! BagVerifier::new().verify_valid(&bag, false)?;
//! # Ok(())
//! # }
//! ```

pub use builder::BagBuilder;
pub use data::{
    BAGIT_FILE, Bag, DATA_DIR, FETCH_FILE, FetchItem, Manifest, ManifestEntry, ManifestKind,
    Metadata, PayloadOxum, Version, keys,
};
pub use encoding::TagEncoding;
pub use error::{ChecksumMismatch, CompletenessError, Error, FormatError, OxumError, PathError, Result};
pub use reader::{BagReader, read};
pub use sanitize::{decode_filename, encode_filename, resolve_declared_path};
pub use verify::{BagVerifier, is_complete, is_valid, quickly_verify, verify_complete, verify_valid};
pub use writer::{BagWriter, write};

pub use bagit_checksum::{Hasher, HasherRegistry};

mod builder;
pub mod data;
mod encoding;
mod error;
mod reader;
mod sanitize;
mod verify;
mod writer;
