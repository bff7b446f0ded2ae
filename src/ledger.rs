// src/ledger.rs
use crate::env::Environment;
use crate::error::{LedgerError, LedgerResult};
use crate::events::{EventLog, EventRecord, LedgerEvent};
use crate::generator::{self, SeedMaterial};
use crate::models::{AccountId, AccountTable, Record, RecordListing};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Everything the ledger persists: the per-account current-state tables
/// and the append-only event history they were derived from.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct LedgerState {
    accounts: HashMap<AccountId, AccountTable>,
    events: EventLog,
}

/// The serialized command processor over all account tables.
///
/// The original hosting platform ran every call to completion before
/// admitting the next one; a single mutex over the whole state
/// reproduces that single-writer total order here, and also keeps the
/// shared event log totally ordered across record operations and
/// password generation. Each operation locks once, validates before
/// mutating, appends its event, and unlocks — there are no partial
/// writes to observe on failure.
///
/// Caller identity is an argument on every operation and is trusted
/// absolutely; resolving it (flag, environment, session) is the job of
/// an [`crate::identity::IdentityProvider`], not of the ledger.
///
/// One quirk is preserved deliberately: `get` is side-effecting. It
/// appends a `Retrieved` event, so accesses are part of the audit
/// history even though the operation is conceptually read-only.
pub struct Ledger {
    env: Arc<dyn Environment>,
    inner: Mutex<LedgerState>,
}

impl Ledger {
    pub fn new(env: Arc<dyn Environment>) -> Self {
        Ledger {
            env,
            inner: Mutex::new(LedgerState::default()),
        }
    }

    /// Rebuilds a ledger from previously persisted state.
    pub fn with_state(state: LedgerState, env: Arc<dyn Environment>) -> Self {
        Ledger {
            env,
            inner: Mutex::new(state),
        }
    }

    /// Clones the full state for persistence.
    pub fn snapshot(&self) -> LedgerState {
        self.locked().clone()
    }

    /// Stores a new record for `account` and returns its id. Ids are
    /// allocated sequentially per account and never reused.
    pub fn store(
        &self,
        account: &AccountId,
        website: &str,
        encrypted_data: &str,
    ) -> LedgerResult<u64> {
        // reject bad input before the entry call can materialize an
        // empty table for a previously unknown account
        AccountTable::validate_fields(website, encrypted_data)?;
        let now = self.env.now();
        let mut state = self.locked();
        let id = state
            .accounts
            .entry(account.clone())
            .or_default()
            .store(website, encrypted_data, now)?;
        state.events.append(
            now,
            LedgerEvent::Stored {
                account: account.clone(),
                id,
                website: website.to_string(),
            },
        );
        log::info!("account={} stored record id={}", account, id);
        Ok(id)
    }

    /// Returns the record at `id`, tombstone triple included. Appends a
    /// `Retrieved` event: reads are logged.
    pub fn get(&self, account: &AccountId, id: u64) -> LedgerResult<Record> {
        let now = self.env.now();
        let mut state = self.locked();
        let record = match state.accounts.get(account) {
            Some(table) => table.get(id)?,
            None => return Err(LedgerError::NotFound { id, count: 0 }),
        };
        state.events.append(
            now,
            LedgerEvent::Retrieved {
                account: account.clone(),
                id,
            },
        );
        Ok(record)
    }

    /// Overwrites the record at `id` with new content and a fresh
    /// timestamp. Reviving a tombstoned slot is allowed.
    pub fn update(
        &self,
        account: &AccountId,
        id: u64,
        website: &str,
        encrypted_data: &str,
    ) -> LedgerResult<()> {
        let now = self.env.now();
        let mut state = self.locked();
        match state.accounts.get_mut(account) {
            Some(table) => table.update(id, website, encrypted_data, now)?,
            None => return Err(LedgerError::NotFound { id, count: 0 }),
        }
        state.events.append(
            now,
            LedgerEvent::Updated {
                account: account.clone(),
                id,
                website: website.to_string(),
            },
        );
        log::info!("account={} updated record id={}", account, id);
        Ok(())
    }

    /// Tombstones the record at `id`. The id stays spent and the count
    /// is unchanged. Idempotent on already-deleted slots.
    pub fn delete(&self, account: &AccountId, id: u64) -> LedgerResult<()> {
        let now = self.env.now();
        let mut state = self.locked();
        match state.accounts.get_mut(account) {
            Some(table) => table.delete(id)?,
            None => return Err(LedgerError::NotFound { id, count: 0 }),
        }
        state.events.append(
            now,
            LedgerEvent::Deleted {
                account: account.clone(),
                id,
            },
        );
        log::info!("account={} deleted record id={}", account, id);
        Ok(())
    }

    /// Number of ids ever allocated for `account`, deleted slots
    /// included. Zero for unknown accounts.
    pub fn count(&self, account: &AccountId) -> u64 {
        self.locked()
            .accounts
            .get(account)
            .map(AccountTable::count)
            .unwrap_or(0)
    }

    /// Snapshot of all slots of `account` ordered by ascending id, one
    /// entry per allocated id including tombstones.
    pub fn list_all(&self, account: &AccountId) -> RecordListing {
        self.locked()
            .accounts
            .get(account)
            .map(AccountTable::list_all)
            .unwrap_or_default()
    }

    /// Derives a pseudo-random password for `account` from the ambient
    /// environment (time, entropy block, caller, sequence counter).
    ///
    /// The password travels through the event log in cleartext — a
    /// documented weakness of this system, kept as-is rather than fixed
    /// silently. Anything consuming the audit history sees it.
    pub fn generate_password(&self, account: &AccountId, length: usize) -> LedgerResult<String> {
        generator::check_length(length)?;
        let now = self.env.now();
        let material = SeedMaterial {
            time: now,
            entropy: self.env.entropy(),
            account: account.as_str(),
            sequence: self.env.next_sequence(),
        };
        let password = generator::derive_password(&material, length)?;
        let mut state = self.locked();
        state.events.append(
            now,
            LedgerEvent::Generated {
                account: account.clone(),
                password: password.clone(),
            },
        );
        log::info!("account={} generated password of length {}", account, length);
        Ok(password)
    }

    /// The audit history, oldest first.
    pub fn events(&self) -> Vec<EventRecord> {
        self.locked().events.entries().to_vec()
    }

    fn locked(&self) -> MutexGuard<'_, LedgerState> {
        // a panicked holder cannot have left a half-applied operation
        // behind: every mutation is a single table/log insert
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
