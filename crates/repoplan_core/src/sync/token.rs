//! Bearer token acquisition contract.

use async_trait::async_trait;
use std::sync::Arc;

/// Supplies the bearer token attached to every remote call.
///
/// The production implementation is [`crate::session::Session`]. `None`
/// means no user is signed in; callers surface that as an
/// authentication error without touching the network.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a currently valid bearer token, acquired fresh per call.
    async fn access_token(&self) -> Option<String>;
}

#[async_trait]
impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    async fn access_token(&self) -> Option<String> {
        (**self).access_token().await
    }
}
