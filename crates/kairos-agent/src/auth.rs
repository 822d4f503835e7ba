//! Out-of-band authorization seam

use async_trait::async_trait;

use crate::error::Result;

/// Waits for an authorization the user completes elsewhere (usually a browser).
///
/// `Ok` means the authorization completed. Any `Err` (denied, timed out,
/// unreachable) is treated by the resolver as a declined request.
#[async_trait]
pub trait AuthorizationWaiter: Send + Sync {
    async fn wait_for_completion(&self, authorization_id: &str) -> Result<()>;
}
