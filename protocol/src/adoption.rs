//! One adoption per network address.
//!
//! Raw addresses are never stored; the ledger only sees a hashed key.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::short_id::ShortId;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AdoptionError {
    #[error("address is empty")]
    EmptyAddress,

    #[error("address {key} already adopted {existing}")]
    AlreadyAdopted { key: AddressKey, existing: ShortId },
}

/// Hashed form of a client address, e.g. `ip_3f2a9c0d11e4b7a8`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AddressKey(String);

impl AddressKey {
    pub fn from_address(address: &str) -> Result<Self, AdoptionError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(AdoptionError::EmptyAddress);
        }
        let digest = Sha256::digest(address.as_bytes());
        let hex: String = digest[..8].iter().map(|b| format!("{b:02x}")).collect();
        Ok(Self(format!("ip_{hex}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub adopted_at: DateTime<Utc>,
    pub pet_short_id: ShortId,
}

/// Storage for adoption records keyed by hashed address.
pub trait AdoptionLedger {
    fn lookup(&self, key: &AddressKey) -> Option<&AdoptionRecord>;

    fn insert(&mut self, key: AddressKey, record: AdoptionRecord);

    fn has_adopted(&self, key: &AddressKey) -> bool {
        self.lookup(key).is_some()
    }

    /// Record an adoption, refusing a second one for the same key.
    fn record_adoption(
        &mut self,
        key: AddressKey,
        pet: ShortId,
        at: DateTime<Utc>,
    ) -> Result<(), AdoptionError> {
        if let Some(existing) = self.lookup(&key) {
            let existing = existing.pet_short_id;
            log::info!("rejecting adoption of {pet} from {key}: already adopted {existing}");
            return Err(AdoptionError::AlreadyAdopted { key, existing });
        }
        log::debug!("recording adoption of {pet} for {key}");
        self.insert(
            key,
            AdoptionRecord {
                adopted_at: at,
                pet_short_id: pet,
            },
        );
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryAdoptionLedger {
    records: HashMap<AddressKey, AdoptionRecord>,
}

impl InMemoryAdoptionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AdoptionLedger for InMemoryAdoptionLedger {
    fn lookup(&self, key: &AddressKey) -> Option<&AdoptionRecord> {
        self.records.get(key)
    }

    fn insert(&mut self, key: AddressKey, record: AdoptionRecord) {
        self.records.insert(key, record);
    }
}
