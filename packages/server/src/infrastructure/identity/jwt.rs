//! JWT Identity Resolver
//!
//! 接続時のトークンを HS256 で検証し、`sub` のユーザーをディレクトリから引いて
//! 正規のプロフィールを得る。

use std::sync::Arc;

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::domain::{IdentityError, IdentityResolver, UserDirectory, VerifiedIdentity};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// User id
    pub sub: String,
    /// Expiry (seconds since the Unix epoch)
    pub exp: u64,
}

pub struct JwtIdentityResolver {
    decoding_key: DecodingKey,
    validation: Validation,
    directory: Arc<dyn UserDirectory>,
}

impl JwtIdentityResolver {
    pub fn new(secret: &str, directory: Arc<dyn UserDirectory>) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            directory,
        }
    }
}

#[async_trait]
impl IdentityResolver for JwtIdentityResolver {
    async fn verify(&self, credential: &str) -> Result<VerifiedIdentity, IdentityError> {
        let claims = decode::<JwtClaims>(credential, &self.decoding_key, &self.validation)
            .map_err(|e| IdentityError::InvalidCredential(e.to_string()))?
            .claims;

        let profile = self
            .directory
            .find_by_id(&claims.sub)
            .await?
            .ok_or(IdentityError::UnknownSubject(claims.sub))?;

        Ok(VerifiedIdentity {
            user_id: profile.id,
            display_name: profile.display_name,
        })
    }
}
