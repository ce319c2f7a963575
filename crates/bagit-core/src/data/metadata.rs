use std::collections::HashMap;

use super::PayloadOxum;
use crate::error::OxumError;

/// Well-known `bag-info.txt` keys.
pub mod keys {
    pub const SOURCE_ORGANIZATION: &str = "Source-Organization";
    pub const ORGANIZATION_ADDRESS: &str = "Organization-Address";
    pub const CONTACT_NAME: &str = "Contact-Name";
    pub const CONTACT_PHONE: &str = "Contact-Phone";
    pub const CONTACT_EMAIL: &str = "Contact-Email";
    pub const EXTERNAL_DESCRIPTION: &str = "External-Description";
    pub const BAGGING_DATE: &str = "Bagging-Date";
    pub const EXTERNAL_IDENTIFIER: &str = "External-Identifier";
    pub const BAG_SIZE: &str = "Bag-Size";
    pub const PAYLOAD_OXUM: &str = "Payload-Oxum";
    pub const BAG_GROUP_IDENTIFIER: &str = "Bag-Group-Identifier";
    pub const BAG_COUNT: &str = "Bag-Count";
    pub const INTERNAL_SENDER_IDENTIFIER: &str = "Internal-Sender-Identifier";
    pub const INTERNAL_SENDER_DESCRIPTION: &str = "Internal-Sender-Description";
    pub const BAGIT_PROFILE_IDENTIFIER: &str = "BagIt-Profile-Identifier";
}

/// Ordered `key: value` pairs from the metadata tag file.
///
/// Keys keep their original case and duplicates keep their order. Lookups are
/// case-insensitive. `Payload-Oxum` is the one key that can appear at most once.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: Vec<(String, String)>,
    index: HashMap<String, Vec<usize>>,
}

impl Metadata {
    pub fn new() -> Self { Self::default() }

    /// Append a value. A `Payload-Oxum` replaces any existing one instead.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        if key.eq_ignore_ascii_case(keys::PAYLOAD_OXUM) {
            self.upsert(key, value);
            return;
        }
        self.push(key, value.into());
    }

    /// Replace every value of `key` with a single `value`, keeping the
    /// position of the first occurrence.
    pub fn upsert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.positions(&key).first().copied() {
            Some(first) => {
                self.entries[first].1 = value;
                let extra: Vec<usize> = self.positions(&key)[1..].to_vec();
                if !extra.is_empty() {
                    self.entries = std::mem::take(&mut self.entries)
                        .into_iter()
                        .enumerate()
                        .filter(|(position, _)| !extra.contains(position))
                        .map(|(_, entry)| entry)
                        .collect();
                    self.reindex();
                }
            }
            None => self.push(key, value),
        }
    }

    pub fn upsert_payload_oxum(&mut self, oxum: PayloadOxum) {
        self.upsert(keys::PAYLOAD_OXUM, oxum.to_string());
    }

    /// Every value recorded for `key`, in file order.
    pub fn get(&self, key: &str) -> Vec<&str> {
        self.positions(key)
            .iter()
            .map(|&position| self.entries[position].1.as_str())
            .collect()
    }

    pub fn get_first(&self, key: &str) -> Option<&str> {
        self.positions(key)
            .first()
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn contains(&self, key: &str) -> bool { !self.positions(key).is_empty() }

    /// Remove every value of `key`, returning them in file order.
    pub fn remove(&mut self, key: &str) -> Vec<String> {
        let mut removed = Vec::new();
        self.entries.retain(|(existing, value)| {
            if existing.eq_ignore_ascii_case(key) {
                removed.push(value.clone());
                false
            } else {
                true
            }
        });
        if !removed.is_empty() {
            self.reindex();
        }
        removed
    }

    pub fn payload_oxum(&self) -> Result<PayloadOxum, OxumError> {
        self.get_first(keys::PAYLOAD_OXUM)
            .ok_or(OxumError::Missing)?
            .parse()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    fn push(&mut self, key: String, value: String) {
        self.index
            .entry(key.to_ascii_lowercase())
            .or_default()
            .push(self.entries.len());
        self.entries.push((key, value));
    }

    fn positions(&self, key: &str) -> &[usize] {
        self.index
            .get(&key.to_ascii_lowercase())
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (position, (key, _)) in self.entries.iter().enumerate() {
            self.index
                .entry(key.to_ascii_lowercase())
                .or_default()
                .push(position);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Self::new();
        for (key, value) in iter {
            metadata.add(key, value);
        }
        metadata
    }
}
