// fabric-provisioner-core/src/ports/token.rs

use async_trait::async_trait;

use crate::domain::identity::{AccessToken, TokenScope};
use crate::error::ProvisionerError;

/// Issues bearer tokens. Callers ask for a fresh token per call group and
/// never keep it beyond that.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self, scope: TokenScope) -> Result<AccessToken, ProvisionerError>;
}
