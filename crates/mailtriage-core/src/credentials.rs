//! API token storage.
//!
//! The mail store bearer token lives in the platform keyring (Secret
//! Service on Linux); a `MAILTRIAGE_TOKEN` environment variable overrides
//! it, which is what CI and one-off runs use. An absent token is a
//! configuration error: the run never starts without one.

use keyring::Entry;
use tracing::debug;

use crate::error::{Error, Result};

/// Service name used for keyring entries.
const SERVICE_NAME: &str = "mailtriage";

/// Environment variable overriding the keyring.
const TOKEN_ENV: &str = "MAILTRIAGE_TOKEN";

/// Resolves the API token for an account.
///
/// # Errors
///
/// Returns [`Error::Config`] when no token is configured anywhere, or a
/// credential error if the keyring itself fails.
pub fn api_token(account: &str) -> Result<String> {
    if let Ok(token) = std::env::var(TOKEN_ENV)
        && !token.is_empty()
    {
        debug!("using API token from {TOKEN_ENV}");
        return Ok(token);
    }

    let entry = Entry::new(SERVICE_NAME, account)?;
    match entry.get_password() {
        Ok(token) => Ok(token),
        Err(keyring::Error::NoEntry) => Err(Error::Config(format!(
            "no API token for account {account:?}: set {TOKEN_ENV} or store one in the keyring"
        ))),
        Err(e) => Err(e.into()),
    }
}

/// Stores the API token for an account in the keyring.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn store_api_token(account: &str, token: &str) -> Result<()> {
    let entry = Entry::new(SERVICE_NAME, account)?;
    entry.set_password(token)?;
    debug!(account, "stored API token");
    Ok(())
}

/// Removes the stored API token for an account, if any.
///
/// # Errors
///
/// Returns an error if the keyring operation fails.
pub fn delete_api_token(account: &str) -> Result<()> {
    let entry = Entry::new(SERVICE_NAME, account)?;
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}
