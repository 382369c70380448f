// Persistent credential storage
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::TrackerResult;
use crate::models::CredentialSet;

pub struct TokenStore {
    storage_path: PathBuf,
}

impl TokenStore {
    pub fn new(storage_path: impl Into<PathBuf>) -> Self {
        Self {
            storage_path: storage_path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.storage_path
    }

    /// Previously saved credentials. A missing, unreadable or corrupt file all
    /// mean "no prior session".
    pub fn load(&self) -> Option<CredentialSet> {
        if !self.storage_path.exists() {
            debug!("No token store at {}", self.storage_path.display());
            return None;
        }

        let content = match fs::read_to_string(&self.storage_path) {
            Ok(content) => content,
            Err(e) => {
                warn!("⚠️ Failed to read token store {}: {}", self.storage_path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<CredentialSet>(&content) {
            Ok(credentials) => {
                info!("💾 Loaded saved tokens from {}", self.storage_path.display());
                Some(credentials)
            }
            Err(e) => {
                warn!("⚠️ Ignoring corrupt token store {}: {}", self.storage_path.display(), e);
                None
            }
        }
    }

    /// Replace the stored credentials. Writes a sibling temp file and renames
    /// it over the target so a reader never sees a half-written record.
    pub fn save(&self, credentials: &CredentialSet) -> TrackerResult<()> {
        let content = serde_json::to_string_pretty(credentials)
            .map_err(std::io::Error::other)?;

        if let Some(parent) = self.storage_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.temp_path();
        fs::write(&tmp_path, content)?;
        if let Err(e) = fs::rename(&tmp_path, &self.storage_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        info!("💾 Tokens saved to {}", self.storage_path.display());
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .storage_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "tokens.json".into());
        name.push(format!(".{}.tmp", std::process::id()));
        self.storage_path.with_file_name(name)
    }
}
