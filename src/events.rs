// src/events.rs
use crate::models::AccountId;
use serde::{Deserialize, Serialize};

/// Notifications emitted by ledger operations. One event per completed
/// operation (reads included: `get` emits `Retrieved` even though it is
/// conceptually read-only, and `Generated` carries the password in
/// cleartext — both are documented behaviors of this system, preserved
/// as-is).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum LedgerEvent {
    Stored {
        account: AccountId,
        id: u64,
        website: String,
    },
    Retrieved {
        account: AccountId,
        id: u64,
    },
    Updated {
        account: AccountId,
        id: u64,
        website: String,
    },
    Deleted {
        account: AccountId,
        id: u64,
    },
    Generated {
        account: AccountId,
        password: String,
    },
}

impl LedgerEvent {
    pub fn account(&self) -> &AccountId {
        match self {
            LedgerEvent::Stored { account, .. }
            | LedgerEvent::Retrieved { account, .. }
            | LedgerEvent::Updated { account, .. }
            | LedgerEvent::Deleted { account, .. }
            | LedgerEvent::Generated { account, .. } => account,
        }
    }

    /// Short tag for log lines and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerEvent::Stored { .. } => "stored",
            LedgerEvent::Retrieved { .. } => "retrieved",
            LedgerEvent::Updated { .. } => "updated",
            LedgerEvent::Deleted { .. } => "deleted",
            LedgerEvent::Generated { .. } => "generated",
        }
    }
}

/// One entry of the audit history: the event plus its position and the
/// ledger time at which it was recorded.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub seq: u64,
    pub at: u64,
    pub event: LedgerEvent,
}

/// Append-only event history. Every state transition is recorded
/// permanently, so the "current state" tables can always be audited
/// against the sequence of operations that produced them. Entries are
/// never rewritten or removed; `seq` starts at 1 and is strictly
/// increasing.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct EventLog {
    entries: Vec<EventRecord>,
}

impl EventLog {
    pub fn new() -> Self {
        EventLog::default()
    }

    pub fn append(&mut self, at: u64, event: LedgerEvent) -> u64 {
        let seq = self.entries.len() as u64 + 1;
        log::info!("event #{} [{}] account={}", seq, event.kind(), event.account());
        self.entries.push(EventRecord { seq, at, event });
        seq
    }

    pub fn entries(&self) -> &[EventRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
