//! In-memory user directory.
//!
//! Profiles are loaded once at startup from a JSON array:
//!
//! ```json
//! [{ "id": "u-1", "displayName": "alice" }]
//! ```

use std::{collections::HashMap, path::Path};

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{IdentityError, UserDirectory, UserProfile};

/// Startup configuration failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read users file '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse users file '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: HashMap<String, UserProfile>,
}

impl InMemoryUserDirectory {
    pub fn new(profiles: impl IntoIterator<Item = UserProfile>) -> Self {
        let users = profiles
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();
        Self { users }
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let profiles: Vec<UserProfile> =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        tracing::info!("Loaded {} user profile(s) from {}", profiles.len(), path.display());
        Ok(Self::new(profiles))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, IdentityError> {
        Ok(self.users.get(user_id).cloned())
    }
}
