use std::collections::BTreeMap;

use crate::{Hasher, HasherRegistry, Result};

/// One hasher per algorithm, all fed from the same byte stream.
pub struct MultiHasher {
    hashers: Vec<(String, Box<dyn Hasher>)>,
}

impl MultiHasher {
    /// Create hashers for every algorithm up front, failing on the first
    /// unsupported name before any bytes are read.
    pub fn new<I, S>(registry: &HasherRegistry, algorithms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut hashers: Vec<(String, Box<dyn Hasher>)> = Vec::new();
        for algorithm in algorithms {
            let name = algorithm.as_ref().to_ascii_lowercase();
            if hashers.iter().any(|(existing, _)| *existing == name) {
                continue;
            }
            let hasher = registry.create(&name)?;
            hashers.push((name, hasher));
        }
        Ok(Self { hashers })
    }

    pub fn update(&mut self, data: &[u8]) {
        for (_, hasher) in &mut self.hashers {
            hasher.update(data);
        }
    }

    pub fn reset(&mut self) {
        for (_, hasher) in &mut self.hashers {
            hasher.reset();
        }
    }

    /// Lowercase hex digest per algorithm name.
    pub fn hex_digests(&self) -> BTreeMap<String, String> {
        self.hashers
            .iter()
            .map(|(name, hasher)| (name.clone(), hasher.hex_digest()))
            .collect()
    }

    pub fn algorithms(&self) -> impl Iterator<Item = &str> {
        self.hashers.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize { self.hashers.len() }

    pub fn is_empty(&self) -> bool { self.hashers.is_empty() }
}

impl Hasher for MultiHasher {
    fn update(&mut self, data: &[u8]) { MultiHasher::update(self, data) }

    /// Concatenation of every digest in registration order.
    fn digest(&self) -> Vec<u8> {
        self.hashers
            .iter()
            .flat_map(|(_, hasher)| hasher.digest())
            .collect()
    }

    fn reset(&mut self) { MultiHasher::reset(self) }
}
