//! Domain error types.

use thiserror::Error;

/// Durable document store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or refused the operation
    #[error("document store unavailable: {0}")]
    Unavailable(String),

    #[error("document store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored record could not be encoded or decoded
    #[error("document store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Identity verification failures. Never surfaced to a connection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// Malformed, expired or badly signed credential
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// The credential is valid but names no known user
    #[error("unknown subject '{0}'")]
    UnknownSubject(String),

    /// The identity provider could not be reached
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// Outbound delivery failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("connection '{0}' is not registered")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Reasons a display name request is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Authenticated users cannot change their username")]
    VerifiedIdentity,

    #[error("Username '{0}' is already taken")]
    Taken(String),

    #[error("Username must not be empty")]
    Blank,

    /// The requester is not a member of the room
    #[error("not a member of the room")]
    MemberNotFound,
}
