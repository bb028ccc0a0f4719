//! Password lookup in the OS keyring.
//!
//! Only consulted when no other source supplied a password. Entries live under
//! the `neo-tracker` service with the account `user@host`.

use crate::config::ConnectionConfig;
use crate::error::{Result, TrackerError};
use keyring::Entry;
use tracing::debug;

const SERVICE_NAME: &str = "neo-tracker";

/// Keyring account name for a connection, if it has both user and host.
pub fn account_for(config: &ConnectionConfig) -> Option<String> {
    let user = config.user.as_deref()?;
    let host = config.host.as_deref()?;
    Some(format!("{user}@{host}"))
}

/// Retrieves a stored password for `account`.
///
/// A missing entry is `Ok(None)`; an unusable keyring is an error.
pub fn retrieve_password(account: &str) -> Result<Option<String>> {
    let entry = Entry::new(SERVICE_NAME, account)
        .map_err(|e| TrackerError::config(format!("Failed to access keyring: {e}")))?;

    match entry.get_password() {
        Ok(secret) => Ok(Some(secret)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(TrackerError::config(format!(
            "Failed to retrieve password from keyring: {e}"
        ))),
    }
}

/// Fills in a missing password from the keyring. Keyring failures are logged
/// and leave the config unchanged.
pub fn apply_keyring_password(config: &mut ConnectionConfig) {
    if config.password.is_some() {
        return;
    }
    let Some(account) = account_for(config) else {
        return;
    };

    match retrieve_password(&account) {
        Ok(Some(password)) => {
            debug!("Using keyring password for {}", account);
            config.password = Some(password);
        }
        Ok(None) => {}
        Err(e) => debug!("Keyring lookup skipped: {}", e),
    }
}
