use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::hasher::{
    Hasher, Md5Hasher, Sha1Hasher, Sha224Hasher, Sha256Hasher, Sha384Hasher, Sha512Hasher,
};
use crate::{Error, Result};

pub type HasherFactory = Arc<dyn Fn() -> Box<dyn Hasher> + Send + Sync>;

/// Maps lowercase BagIt algorithm names to hasher factories.
///
/// Names are normalized to lowercase on registration and on lookup, so
/// `manifest-SHA256.txt` and `manifest-sha256.txt` resolve to the same hasher.
#[derive(Clone)]
pub struct HasherRegistry {
    factories: BTreeMap<String, HasherFactory>,
}

impl Default for HasherRegistry {
    fn default() -> Self { Self::standard() }
}

impl fmt::Debug for HasherRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.factories.keys()).finish()
    }
}

impl HasherRegistry {
    /// A registry with no algorithms.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// md5, sha1, sha224, sha256, sha384 and sha512, plus blake3 when that feature is on.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register("md5", || Box::new(Md5Hasher::new()));
        registry.register("sha1", || Box::new(Sha1Hasher::new()));
        registry.register("sha224", || Box::new(Sha224Hasher::new()));
        registry.register("sha256", || Box::new(Sha256Hasher::new()));
        registry.register("sha384", || Box::new(Sha384Hasher::new()));
        registry.register("sha512", || Box::new(Sha512Hasher::new()));

        #[cfg(feature = "blake3")]
        registry.register("blake3", || Box::new(crate::Blake3Hasher::new()));

        registry
    }

    /// Register or replace the factory for `name`.
    pub fn register<F>(&mut self, name: impl AsRef<str>, factory: F) -> &mut Self
    where
        F: Fn() -> Box<dyn Hasher> + Send + Sync + 'static,
    {
        self.factories
            .insert(name.as_ref().to_ascii_lowercase(), Arc::new(factory));
        self
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_ascii_lowercase())
    }

    /// Create a fresh hasher for `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Hasher>> {
        self.factories
            .get(&name.to_ascii_lowercase())
            .map(|factory| factory())
            .ok_or_else(|| Error::UnsupportedAlgorithm(name.to_string()))
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}
