//! Identity of a connection and the services that establish it.

use async_trait::async_trait;
use serde::Deserialize;

use super::error::IdentityError;

/// An identity confirmed by the identity service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Stable user identifier
    pub user_id: String,
    /// Canonical display name. Cannot be changed from inside a room.
    pub display_name: String,
}

/// What the hub knows about a connection. Fixed for the connection's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionIdentity {
    Verified(VerifiedIdentity),
    #[default]
    Anonymous,
}

impl ConnectionIdentity {
    pub fn is_verified(&self) -> bool {
        matches!(self, ConnectionIdentity::Verified(_))
    }

    pub fn verified(&self) -> Option<&VerifiedIdentity> {
        match self {
            ConnectionIdentity::Verified(verified) => Some(verified),
            ConnectionIdentity::Anonymous => None,
        }
    }
}

/// Canonical user profile held by the user directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
}

/// Verifies an opaque credential presented at connection time.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError>;
}

/// Looks up user profiles by stable id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_id(&self, user_id: &str) -> Result<Option<UserProfile>, IdentityError>;
}
