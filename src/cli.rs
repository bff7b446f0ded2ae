// src/cli.rs
use crate::config::Config;
use crate::env::SystemEnvironment;
use crate::error::{AppError, AppResult};
use crate::identity::{EnvIdentity, IdentityProvider, StaticIdentity};
use crate::ledger::Ledger;
use crate::models::AccountId;
use crate::store;
use chrono::DateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

const DEFAULT_LEDGER_FILE: &str = "vault.ledger";

/// Per-account encrypted-blob record ledger. Payloads must be encrypted
/// by the caller before they are stored; this tool never sees plaintext
/// credentials.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the ledger file
    #[clap(short, long, value_parser, global = true)]
    pub file: Option<PathBuf>,

    /// Account to operate as (falls back to config, then to the
    /// PASSLEDGER_ACCOUNT environment variable)
    #[clap(short, long, global = true)]
    pub account: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Store a new encrypted record and print its id
    Store {
        /// Service label for the record
        website: String,
        /// Client-encrypted payload
        encrypted_data: String,
    },
    /// Retrieve one record by id (the access is recorded in the event log)
    Get { id: u64 },
    /// Overwrite the record at an id (revives a deleted slot)
    Update {
        id: u64,
        website: String,
        encrypted_data: String,
    },
    /// Tombstone the record at an id; the id is never reused
    Delete { id: u64 },
    /// Print how many ids this account has ever allocated
    Count,
    /// List every slot of this account, deleted ones included
    List,
    /// Derive a pseudo-random password (not cryptographically secure)
    Generate {
        /// Password length, 8..=32; defaults to the configured length
        #[clap(short, long)]
        length: Option<usize>,
    },
    /// Dump the append-only event history
    Events,
}

/// Executes one parsed command against the ledger file: load, apply,
/// save back whenever the operation changed state or appended history.
pub fn handle_cli_command(cli: Cli, config: &Config) -> AppResult<()> {
    log::debug!("Handling CLI command: {:?}", cli.command);

    let filepath = cli
        .file
        .or_else(|| config.ledger_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LEDGER_FILE));
    let account = resolve_account(cli.account.as_deref(), config)?;

    let state = store::load_or_default(&filepath)?;
    let ledger = Ledger::with_state(state, Arc::new(SystemEnvironment::new()));

    // count/list/events read without emitting; everything else appends
    // to the history and must be written back
    let mut dirty = true;
    match cli.command {
        Commands::Store {
            website,
            encrypted_data,
        } => {
            let id = ledger.store(&account, &website, &encrypted_data)?;
            println!("Stored record {} for account {}", id, account);
        }
        Commands::Get { id } => {
            let record = ledger.get(&account, id)?;
            if record.is_tombstone() {
                println!("Record {} is deleted", id);
            } else {
                println!("Website:   {}", record.website);
                println!("Encrypted: {}", record.encrypted_data);
                println!("Stored at: {}", format_timestamp(record.timestamp));
            }
        }
        Commands::Update {
            id,
            website,
            encrypted_data,
        } => {
            ledger.update(&account, id, &website, &encrypted_data)?;
            println!("Updated record {}", id);
        }
        Commands::Delete { id } => {
            ledger.delete(&account, id)?;
            println!("Deleted record {}", id);
        }
        Commands::Count => {
            println!("{}", ledger.count(&account));
            dirty = false;
        }
        Commands::List => {
            let listing = ledger.list_all(&account);
            if listing.is_empty() {
                println!("No records for account {}", account);
            } else {
                for (index, (website, timestamp)) in listing
                    .websites
                    .iter()
                    .zip(listing.timestamps.iter())
                    .enumerate()
                {
                    let id = index as u64 + 1;
                    if website.is_empty() {
                        println!("{:>4}  (deleted)", id);
                    } else {
                        println!("{:>4}  {}  {}", id, website, format_timestamp(*timestamp));
                    }
                }
            }
            dirty = false;
        }
        Commands::Generate { length } => {
            let length = length.unwrap_or_else(|| config.effective_password_length());
            let password = ledger.generate_password(&account, length)?;
            println!("{}", password);
        }
        Commands::Events => {
            for entry in ledger.events() {
                println!(
                    "#{:<5} {}  [{}] {:?}",
                    entry.seq,
                    format_timestamp(entry.at),
                    entry.event.kind(),
                    entry.event
                );
            }
            dirty = false;
        }
    }

    if dirty {
        store::save_ledger(&ledger.snapshot(), &filepath)?;
    }
    Ok(())
}

fn resolve_account(flag: Option<&str>, config: &Config) -> AppResult<AccountId> {
    if let Some(account) = flag {
        return StaticIdentity::new(account).resolve();
    }
    if let Some(account) = config.account.as_deref() {
        return StaticIdentity::new(account).resolve();
    }
    EnvIdentity.resolve().map_err(|_| {
        AppError::Identity(
            "no account given: pass --account, set it in the config, \
             or export PASSLEDGER_ACCOUNT"
                .to_string(),
        )
    })
}

fn format_timestamp(timestamp: u64) -> String {
    DateTime::from_timestamp(timestamp as i64, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}
