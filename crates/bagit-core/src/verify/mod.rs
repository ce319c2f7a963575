//! Completeness, validity and Payload-Oxum checks.
//!
//! - `complete.rs` - structural checks, including the version-gated
//!   payload membership rule
//! - `valid.rs` - completeness plus checksums, one read per file
//! - `quick.rs` - Payload-Oxum against a walk of `data/`

mod complete;
mod quick;
mod valid;

use bagit_checksum::HasherRegistry;

use crate::data::Bag;
use crate::error::Result;

/// Verifies bags with a given algorithm registry.
///
/// `ignore_hidden` skips dot-prefixed payload files when checking that every
/// payload file is listed.
#[derive(Clone, Debug, Default)]
pub struct BagVerifier {
    registry: HasherRegistry,
}

impl BagVerifier {
    pub fn new() -> Self { Self::default() }

    pub fn with_registry(registry: HasherRegistry) -> Self { Self { registry } }

    pub fn registry(&self) -> &HasherRegistry { &self.registry }

    pub fn verify_complete(&self, bag: &Bag, ignore_hidden: bool) -> Result<()> {
        complete::check_complete(bag, ignore_hidden)
    }

    /// Completeness first, then checksums. Fails closed on any algorithm the
    /// registry cannot compute, before reading a file.
    pub fn verify_valid(&self, bag: &Bag, ignore_hidden: bool) -> Result<()> {
        valid::check_valid(&self.registry, bag, ignore_hidden)
    }

    pub fn is_complete(&self, bag: &Bag, ignore_hidden: bool) -> bool {
        self.verify_complete(bag, ignore_hidden)
            .inspect_err(|error| tracing::debug!(%error, "bag is not complete"))
            .is_ok()
    }

    pub fn is_valid(&self, bag: &Bag, ignore_hidden: bool) -> bool {
        self.verify_valid(bag, ignore_hidden)
            .inspect_err(|error| tracing::debug!(%error, "bag is not valid"))
            .is_ok()
    }

    /// Whether the bag carries a well-formed `Payload-Oxum`.
    pub fn can_quickly_verify(&self, bag: &Bag) -> bool { quick::can_quickly_verify(bag) }

    pub fn quickly_verify(&self, bag: &Bag) -> Result<()> { quick::check_quick(bag) }
}

pub fn verify_complete(bag: &Bag, ignore_hidden: bool) -> Result<()> {
    BagVerifier::new().verify_complete(bag, ignore_hidden)
}

pub fn verify_valid(bag: &Bag, ignore_hidden: bool) -> Result<()> {
    BagVerifier::new().verify_valid(bag, ignore_hidden)
}

pub fn is_complete(bag: &Bag, ignore_hidden: bool) -> bool { BagVerifier::new().is_complete(bag, ignore_hidden) }

pub fn is_valid(bag: &Bag, ignore_hidden: bool) -> bool { BagVerifier::new().is_valid(bag, ignore_hidden) }

pub fn quickly_verify(bag: &Bag) -> Result<()> { quick::check_quick(bag) }
