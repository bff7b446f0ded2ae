// src/store.rs
use crate::error::{StoreError, StoreResult};
use crate::ledger::LedgerState;
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::Path;

// File layout: [MAGIC (4 bytes)] [VERSION (2 bytes LE)] [BINCODE DATA (...)]
const MAGIC: &[u8; 4] = b"PLGR";
const VERSION: u16 = 1;
const HEADER_LEN: usize = MAGIC.len() + 2;

/// Writes the full ledger state (account tables plus event history) to
/// `filepath`, replacing any previous contents. The payload is stored
/// as submitted: record blobs were encrypted by the client before they
/// ever reached the ledger, so no additional encryption happens here.
pub fn save_ledger(state: &LedgerState, filepath: &Path) -> StoreResult<()> {
    log::info!("Saving ledger state to {:?}", filepath);

    let serialized = bincode::serialize(state).map_err(|e| {
        let msg = format!("Bincode serialization failed: {}", e);
        log::error!("save_ledger: {}", msg);
        StoreError::Serialization(msg)
    })?;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(filepath)
        .map_err(|e| {
            log::error!("Failed to open {:?} for writing: {:?}", filepath, e);
            StoreError::Io(e)
        })?;

    file.write_all(MAGIC)?;
    file.write_all(&VERSION.to_le_bytes())?;
    file.write_all(&serialized)?;

    log::info!("Ledger state saved to {:?}", filepath);
    Ok(())
}

/// Loads ledger state previously written by [`save_ledger`].
pub fn load_ledger(filepath: &Path) -> StoreResult<LedgerState> {
    log::info!("Loading ledger state from {:?}", filepath);

    let mut file = File::open(filepath).map_err(|e| {
        log::warn!(
            "Failed to open ledger file {:?}: {:?} (normal before first use)",
            filepath,
            e
        );
        StoreError::Io(e)
    })?;

    let mut contents = Vec::new();
    file.read_to_end(&mut contents).map_err(|e| {
        log::error!("Failed to read ledger file {:?}: {:?}", filepath, e);
        StoreError::Io(e)
    })?;

    if contents.len() < HEADER_LEN {
        let msg = format!(
            "File {:?} is too short to contain a ledger header (len: {})",
            filepath,
            contents.len()
        );
        log::error!("load_ledger: {}", msg);
        return Err(StoreError::FormatError(msg));
    }

    if &contents[..MAGIC.len()] != MAGIC {
        let msg = format!("File {:?} is not a ledger file (bad magic)", filepath);
        log::error!("load_ledger: {}", msg);
        return Err(StoreError::FormatError(msg));
    }

    let version = u16::from_le_bytes([contents[4], contents[5]]);
    if version != VERSION {
        let msg = format!(
            "Unsupported ledger file version {} in {:?} (expected {})",
            version, filepath, VERSION
        );
        log::error!("load_ledger: {}", msg);
        return Err(StoreError::FormatError(msg));
    }

    let state: LedgerState = bincode::deserialize(&contents[HEADER_LEN..]).map_err(|e| {
        let msg = format!("Bincode deserialization failed: {}", e);
        log::error!("load_ledger: {}", msg);
        StoreError::Deserialization(msg)
    })?;

    log::info!("Ledger state loaded from {:?}", filepath);
    Ok(state)
}

/// Loads the ledger file if it exists, or starts fresh when it does not.
/// Any other failure (corrupt file, wrong version) is surfaced rather
/// than silently discarded.
pub fn load_or_default(filepath: &Path) -> StoreResult<LedgerState> {
    if filepath.exists() {
        load_ledger(filepath)
    } else {
        log::info!("No ledger file at {:?}, starting with empty state", filepath);
        Ok(LedgerState::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::FixedEnvironment;
    use crate::ledger::Ledger;
    use crate::models::AccountId;
    use std::fs;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn populated_state() -> LedgerState {
        let env = Arc::new(FixedEnvironment::at(1_000));
        let ledger = Ledger::new(env);
        let alice = AccountId::new("alice");
        ledger.store(&alice, "Gmail", "ENC1").unwrap();
        ledger.store(&alice, "Bank", "ENC2").unwrap();
        ledger.delete(&alice, 1).unwrap();
        ledger.snapshot()
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let filepath = temp_file.path();

        save_ledger(&populated_state(), filepath).unwrap();

        let state = load_ledger(filepath).unwrap();
        let env = Arc::new(FixedEnvironment::at(2_000));
        let ledger = Ledger::with_state(state, env);
        let alice = AccountId::new("alice");
        assert_eq!(ledger.count(&alice), 2);
        assert!(ledger.get(&alice, 1).unwrap().is_tombstone());
        assert_eq!(ledger.get(&alice, 2).unwrap().website, "Bank");
        // three mutations persisted, two gets above appended afterwards
        assert_eq!(ledger.events().len(), 5);
    }

    #[test]
    fn test_save_and_load_empty_state() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        save_ledger(&LedgerState::default(), temp_file.path()).unwrap();
        let state = load_ledger(temp_file.path()).unwrap();
        let ledger = Ledger::with_state(state, Arc::new(FixedEnvironment::at(0)));
        assert!(ledger.events().is_empty());
    }

    #[test]
    fn test_load_non_existent_file() {
        let result = load_ledger(Path::new("does_not_exist.ledger"));
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[test]
    fn test_load_or_default_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let filepath = dir.path().join("fresh.ledger");
        let state = load_or_default(&filepath).unwrap();
        let ledger = Ledger::with_state(state, Arc::new(FixedEnvironment::at(0)));
        assert_eq!(ledger.count(&AccountId::new("anyone")), 0);
    }

    #[test]
    fn test_load_too_short_file() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        fs::write(temp_file.path(), b"PLG").unwrap();
        match load_ledger(temp_file.path()) {
            Err(StoreError::FormatError(msg)) => assert!(msg.contains("too short")),
            other => panic!("Expected FormatError for short file, got {:?}", other),
        }
    }

    #[test]
    fn test_load_bad_magic() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        fs::write(temp_file.path(), b"XXXX\x01\x00somedata").unwrap();
        match load_ledger(temp_file.path()) {
            Err(StoreError::FormatError(msg)) => assert!(msg.contains("bad magic")),
            other => panic!("Expected FormatError for bad magic, got {:?}", other),
        }
    }

    #[test]
    fn test_load_unsupported_version() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let mut contents = Vec::new();
        contents.extend_from_slice(MAGIC);
        contents.extend_from_slice(&9u16.to_le_bytes());
        fs::write(temp_file.path(), &contents).unwrap();
        match load_ledger(temp_file.path()) {
            Err(StoreError::FormatError(msg)) => assert!(msg.contains("version")),
            other => panic!("Expected FormatError for bad version, got {:?}", other),
        }
    }

    #[test]
    fn test_load_truncated_payload() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        save_ledger(&populated_state(), temp_file.path()).unwrap();

        let mut contents = fs::read(temp_file.path()).unwrap();
        contents.truncate(contents.len() / 2);
        fs::write(temp_file.path(), &contents).unwrap();

        match load_ledger(temp_file.path()) {
            Err(StoreError::Deserialization(_)) => {}
            other => panic!("Expected Deserialization error, got {:?}", other),
        }
    }
}
