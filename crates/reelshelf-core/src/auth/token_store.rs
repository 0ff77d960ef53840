use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Token file name in the per-origin data directory
const TOKEN_FILE: &str = "tokens.json";

/// Durable storage for the access credential and the optional refresh
/// credential.
///
/// Storage failures never surface to callers: writes log a warning and
/// reads fail open to `None`, which the rest of the client treats as being
/// logged out.
pub trait TokenStore: Send + Sync {
    /// Persist both tokens, replacing anything stored before.
    /// A `None` refresh token removes the previous one.
    fn save(&self, access: &str, refresh: Option<&str>);

    /// The access token, if one is stored
    fn read(&self) -> Option<String>;

    /// The refresh token, if one is stored. Kept for completeness; nothing
    /// exchanges it yet.
    fn read_refresh(&self) -> Option<String>;

    /// Remove both tokens. Idempotent.
    fn clear(&self);
}

/// On-disk layout. Key names match the entries the web client keeps in
/// browser storage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct StoredTokens {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Token store backed by a JSON file in the per-origin data directory.
pub struct FileTokenStore {
    dir: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn load(&self) -> Result<StoredTokens> {
        let path = self.path();
        if !path.exists() {
            return Ok(StoredTokens::default());
        }
        let contents = std::fs::read_to_string(&path).context("Failed to read token file")?;
        serde_json::from_str(&contents).context("Failed to parse token file")
    }

    fn write(&self, tokens: &StoredTokens) -> Result<()> {
        std::fs::create_dir_all(&self.dir).context("Failed to create token directory")?;
        let path = self.path();
        let contents = serde_json::to_string_pretty(tokens)?;
        std::fs::write(&path, contents).context("Failed to write token file")?;
        restrict_permissions(&path)?;
        Ok(())
    }

    fn load_or_default(&self) -> StoredTokens {
        match self.load() {
            Ok(tokens) => tokens,
            Err(e) => {
                warn!(error = %e, "Token file unreadable, treating as logged out");
                StoredTokens::default()
            }
        }
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .context("Failed to restrict token file permissions")
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

impl TokenStore for FileTokenStore {
    fn save(&self, access: &str, refresh: Option<&str>) {
        let tokens = StoredTokens {
            access_token: Some(access.to_string()),
            refresh_token: refresh.map(str::to_string),
        };
        if let Err(e) = self.write(&tokens) {
            warn!(error = %e, "Failed to persist tokens");
        } else {
            debug!(path = %self.path().display(), "Tokens saved");
        }
    }

    fn read(&self) -> Option<String> {
        non_empty(self.load_or_default().access_token)
    }

    fn read_refresh(&self) -> Option<String> {
        non_empty(self.load_or_default().refresh_token)
    }

    fn clear(&self) {
        let path = self.path();
        if path.exists() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!(error = %e, "Failed to remove token file");
            }
        }
    }
}

/// In-process token store. Nothing survives the process; used for tests and
/// throwaway sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    tokens: Mutex<StoredTokens>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that starts out holding an access token
    pub fn with_access(access: &str) -> Self {
        let store = Self::new();
        store.save(access, None);
        store
    }

    fn with_tokens<R>(&self, f: impl FnOnce(&mut StoredTokens) -> R) -> R {
        // A poisoned lock still holds valid strings
        let mut guard = match self.tokens.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }
}

impl TokenStore for MemoryTokenStore {
    fn save(&self, access: &str, refresh: Option<&str>) {
        self.with_tokens(|t| {
            t.access_token = Some(access.to_string());
            t.refresh_token = refresh.map(str::to_string);
        });
    }

    fn read(&self) -> Option<String> {
        non_empty(self.with_tokens(|t| t.access_token.clone()))
    }

    fn read_refresh(&self) -> Option<String> {
        non_empty(self.with_tokens(|t| t.refresh_token.clone()))
    }

    fn clear(&self) {
        self.with_tokens(|t| *t = StoredTokens::default());
    }
}
