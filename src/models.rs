// src/models.rs
use crate::error::{LedgerError, LedgerResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Caller identity as supplied by the execution environment. Compared
/// byte-for-byte: no case folding, no aliasing.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(pub String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One stored credential slot. `encrypted_data` is an opaque blob the
/// client encrypted before submission; it is never parsed here.
///
/// `Default` is the tombstone triple: empty website, empty data,
/// timestamp 0. A record with an empty website must be read as
/// deleted/absent, never as a valid empty-named record.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    pub website: String,
    pub encrypted_data: String,
    pub timestamp: u64,
}

impl Record {
    pub fn new(website: String, encrypted_data: String, timestamp: u64) -> Self {
        Record {
            website,
            encrypted_data,
            timestamp,
        }
    }

    /// True when this slot has been deleted (or never written).
    pub fn is_tombstone(&self) -> bool {
        self.website.is_empty()
    }
}

/// Snapshot of every slot of an account, parallel sequences ordered by
/// ascending id. Both vectors always have length = `count()`; tombstoned
/// slots surface as an empty website with timestamp 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordListing {
    pub websites: Vec<String>,
    pub timestamps: Vec<u64>,
}

impl RecordListing {
    pub fn len(&self) -> usize {
        self.websites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.websites.is_empty()
    }
}

/// Per-account record table and id counter: the pure state machine behind
/// every ledger operation. Ids are allocated by incrementing
/// `record_count` and are permanent handles: a delete tombstones the slot
/// but never frees the id, so `record_count` is monotonic and every id in
/// `1..=record_count` stays materialized in the map.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AccountTable {
    record_count: u64,
    records: BTreeMap<u64, Record>,
}

impl AccountTable {
    pub fn new() -> Self {
        AccountTable::default()
    }

    /// Inserts a new record and returns its freshly allocated id.
    pub fn store(&mut self, website: &str, encrypted_data: &str, now: u64) -> LedgerResult<u64> {
        Self::validate_fields(website, encrypted_data)?;
        let id = self.record_count + 1;
        self.records.insert(
            id,
            Record::new(website.to_string(), encrypted_data.to_string(), now),
        );
        self.record_count = id;
        Ok(id)
    }

    /// Returns the record at `id`, which may be the tombstone triple if
    /// the slot was deleted.
    pub fn get(&self, id: u64) -> LedgerResult<Record> {
        self.check_bounds(id)?;
        Ok(self.records.get(&id).cloned().unwrap_or_default())
    }

    /// Overwrites the record at `id` in place. Works identically whether
    /// the slot is live or tombstoned; updating a tombstone revives it.
    pub fn update(
        &mut self,
        id: u64,
        website: &str,
        encrypted_data: &str,
        now: u64,
    ) -> LedgerResult<()> {
        self.check_bounds(id)?;
        Self::validate_fields(website, encrypted_data)?;
        self.records.insert(
            id,
            Record::new(website.to_string(), encrypted_data.to_string(), now),
        );
        Ok(())
    }

    /// Clears all fields of the record at `id`. The id stays spent:
    /// `record_count` is unchanged and the slot remains enumerable.
    /// Deleting an already-deleted id succeeds and is a no-op.
    pub fn delete(&mut self, id: u64) -> LedgerResult<()> {
        self.check_bounds(id)?;
        self.records.insert(id, Record::default());
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.record_count
    }

    /// Snapshot of all slots ordered by ascending id, tombstones included.
    pub fn list_all(&self) -> RecordListing {
        let mut listing = RecordListing {
            websites: Vec::with_capacity(self.record_count as usize),
            timestamps: Vec::with_capacity(self.record_count as usize),
        };
        for id in 1..=self.record_count {
            let record = self.records.get(&id).cloned().unwrap_or_default();
            listing.websites.push(record.website);
            listing.timestamps.push(record.timestamp);
        }
        listing
    }

    fn check_bounds(&self, id: u64) -> LedgerResult<()> {
        if id == 0 || id > self.record_count {
            return Err(LedgerError::NotFound {
                id,
                count: self.record_count,
            });
        }
        Ok(())
    }

    /// Field validation shared with the ledger front, which must reject
    /// bad input before it materializes a table for a new account.
    pub(crate) fn validate_fields(website: &str, encrypted_data: &str) -> LedgerResult<()> {
        if website.is_empty() {
            return Err(LedgerError::Validation(
                "website must not be empty".to_string(),
            ));
        }
        if encrypted_data.is_empty() {
            return Err(LedgerError::Validation(
                "encrypted data must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
