use async_trait::async_trait;

use crate::model::UserId;

/// Supplies the acting user for attribution fields. Real deployments back
/// this with the managed auth provider's session; the engine only ever asks
/// "who is acting right now".
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> Option<UserId>;
}

/// Fixed identity — a signed-in user or nobody. Used by tests and by
/// embedders that resolve the session once per request.
#[derive(Debug)]
pub struct FixedIdentity {
    user: Option<UserId>,
}

impl FixedIdentity {
    pub fn signed_in(user: UserId) -> Self {
        Self { user: Some(user) }
    }

    pub fn anonymous() -> Self {
        Self { user: None }
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn current_user(&self) -> Option<UserId> {
        self.user
    }
}
