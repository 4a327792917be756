//! Identity Resolver and user directory implementations.

pub mod directory;
pub mod jwt;

pub use directory::{ConfigError, InMemoryUserDirectory};
pub use jwt::{JwtClaims, JwtIdentityResolver};
