use anyhow::{Context, Result};
use keyring::Entry;
use tracing::warn;

use super::token_store::TokenStore;

const SERVICE_NAME: &str = "reelshelf";

const ACCESS_KEY: &str = "access_token";
const REFRESH_KEY: &str = "refresh_token";

/// Token store backed by the OS keychain.
///
/// Entries are keyed by `<origin>:access_token` and `<origin>:refresh_token`
/// so each backend gets its own credential. Both entries are opened once and
/// reused for every operation.
pub struct KeyringTokenStore {
    access: Entry,
    refresh: Entry,
}

fn open_entry(origin: &str, key: &str) -> Result<Entry> {
    Entry::new(SERVICE_NAME, &format!("{}:{}", origin, key))
        .context("Failed to create keyring entry")
}

fn read_entry(entry: &Entry, key: &str) -> Option<String> {
    match entry.get_password() {
        Ok(value) if !value.is_empty() => Some(value),
        Ok(_) | Err(keyring::Error::NoEntry) => None,
        Err(e) => {
            warn!(error = %e, key = key, "Failed to read token from keychain");
            None
        }
    }
}

fn delete_entry(entry: &Entry) -> Result<()> {
    match entry.delete_credential() {
        Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(anyhow::Error::new(e).context("Failed to delete token from keychain")),
    }
}

impl KeyringTokenStore {
    pub fn new(origin: &str) -> Result<Self> {
        Ok(Self {
            access: open_entry(origin, ACCESS_KEY)?,
            refresh: open_entry(origin, REFRESH_KEY)?,
        })
    }
}

impl TokenStore for KeyringTokenStore {
    fn save(&self, access: &str, refresh: Option<&str>) {
        if let Err(e) = self.access.set_password(access) {
            warn!(error = %e, "Failed to persist access token");
        }
        let result = match refresh {
            Some(refresh) => self
                .refresh
                .set_password(refresh)
                .context("Failed to store token in keychain"),
            None => delete_entry(&self.refresh),
        };
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist refresh token");
        }
    }

    fn read(&self) -> Option<String> {
        read_entry(&self.access, ACCESS_KEY)
    }

    fn read_refresh(&self) -> Option<String> {
        read_entry(&self.refresh, REFRESH_KEY)
    }

    fn clear(&self) {
        for (entry, key) in [(&self.access, ACCESS_KEY), (&self.refresh, REFRESH_KEY)] {
            if let Err(e) = delete_entry(entry) {
                warn!(error = %e, key = key, "Failed to clear token");
            }
        }
    }
}
