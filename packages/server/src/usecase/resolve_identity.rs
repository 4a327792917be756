//! UseCase: Connection Gate
//!
//! 接続時に提示されたクレデンシャルから `ConnectionIdentity` を決定する。
//! 検証に失敗しても接続は拒否せず、匿名（ゲスト）として扱う。

use std::sync::Arc;

use crate::domain::{ConnectionIdentity, IdentityResolver};

/// Connection Gate のユースケース
pub struct ResolveIdentityUseCase {
    /// `None` のときは認証が無効で、全ての接続が匿名になる
    resolver: Option<Arc<dyn IdentityResolver>>,
}

impl ResolveIdentityUseCase {
    pub fn new(resolver: Option<Arc<dyn IdentityResolver>>) -> Self {
        Self { resolver }
    }

    /// Resolve the identity of a new connection.
    ///
    /// Never fails: any verification problem downgrades to `Anonymous`.
    pub async fn execute(&self, credential: Option<&str>) -> ConnectionIdentity {
        let Some(credential) = credential.map(str::trim).filter(|c| !c.is_empty()) else {
            return ConnectionIdentity::Anonymous;
        };

        let Some(resolver) = &self.resolver else {
            tracing::debug!("Credential presented but authentication is disabled, allowing as guest");
            return ConnectionIdentity::Anonymous;
        };

        match resolver.verify(credential).await {
            Ok(verified) => {
                tracing::info!(
                    "Authenticated connection: {} ({})",
                    verified.display_name,
                    verified.user_id
                );
                ConnectionIdentity::Verified(verified)
            }
            Err(e) => {
                tracing::warn!("Identity verification failed, allowing as guest: {}", e);
                ConnectionIdentity::Anonymous
            }
        }
    }
}
