// src/identity.rs
use crate::error::{AppError, AppResult};
use crate::models::AccountId;

/// Environment variable consulted when no account is given explicitly.
pub const ACCOUNT_ENV_VAR: &str = "PASSLEDGER_ACCOUNT";

/// Resolves the caller identity for a ledger operation.
///
/// Identity is the trust root of the whole system: whatever this
/// returns is believed without further authentication, exactly as the
/// original platform trusted its caller address. Swapping the provider
/// (session token, request signature, mTLS peer) is how a deployment
/// hardens this boundary; the ledger itself never will.
pub trait IdentityProvider {
    fn resolve(&self) -> AppResult<AccountId>;
}

/// Identity fixed up front, e.g. from a `--account` flag or a config
/// file entry.
pub struct StaticIdentity(AccountId);

impl StaticIdentity {
    pub fn new(account: impl Into<String>) -> Self {
        StaticIdentity(AccountId::new(account))
    }
}

impl IdentityProvider for StaticIdentity {
    fn resolve(&self) -> AppResult<AccountId> {
        if self.0.as_str().is_empty() {
            return Err(AppError::Identity(
                "account identifier must not be empty".to_string(),
            ));
        }
        Ok(self.0.clone())
    }
}

/// Identity taken from the process environment (`PASSLEDGER_ACCOUNT`).
pub struct EnvIdentity;

impl IdentityProvider for EnvIdentity {
    fn resolve(&self) -> AppResult<AccountId> {
        match std::env::var(ACCOUNT_ENV_VAR) {
            Ok(value) if !value.is_empty() => Ok(AccountId::new(value)),
            _ => Err(AppError::Identity(format!(
                "no account given and {} is not set",
                ACCOUNT_ENV_VAR
            ))),
        }
    }
}
