//! Streaming checksum primitives for BagIt manifests.
//!
//! Hashers are looked up by their lowercase BagIt algorithm name (`md5`,
//! `sha256`, ...) through a [`HasherRegistry`]. The registry is a plain value
//! so callers can inject additional algorithms without touching global state.
//!
//! # Key Features
//!
//! - **Single pass**: [`MultiHasher`] feeds every chunk of one read to several
//!   algorithms, so a payload file is read once no matter how many manifests
//!   list it
//! - **Pluggable**: anything implementing [`Hasher`] can be registered
//! - **Fail closed**: unknown algorithm names are an error, never a skip
//!
//! # Example
//!
//! ```
//! use bagit_checksum::{HasherRegistry, MultiHasher};
//!
//! let registry = HasherRegistry::standard();
//! let mut hashers = MultiHasher::new(&registry, ["md5", "sha256"]).unwrap();
//! hashers.update(b"hello\n");
//!
//! let digests = hashers.hex_digests();
//! assert_eq!(digests["md5"], "b1946ac92492d2347c6235b4d2611184");
//! ```

pub use self::error::{Error, Result};
pub use self::hasher::{
    DigestHasher, Hasher, Md5Hasher, Sha1Hasher, Sha224Hasher, Sha256Hasher, Sha384Hasher,
    Sha512Hasher,
};
pub use self::multi::MultiHasher;
pub use self::reader::{HashingReader, hash_file, hash_file_multi, hash_reader};
pub use self::registry::{HasherFactory, HasherRegistry};

#[cfg(feature = "blake3")]
pub use self::hasher::Blake3Hasher;

mod error;
mod hasher;
mod multi;
mod reader;
mod registry;
