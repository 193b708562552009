//! Signed-in session context shared with the workspace service.
//!
//! # Responsibility
//! - Hold the current user, bearer token and active repository with an
//!   explicit sign-in/sign-out lifecycle.
//! - Act as the production token source for remote node-store calls.
//!
//! # Invariants
//! - Session state is never read from ambient globals; owners hand the
//!   session to collaborators as an `Arc` reference.
//! - Signing out clears user, token and active repository together.
//! - Tokens are never written to logs.

use crate::sync::token::TokenProvider;
use async_trait::async_trait;
use log::{info, warn};
use std::sync::RwLock;

/// Signed-in user identity snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    /// Stable user id from the identity provider.
    pub user_id: String,
    /// Display name, when the provider supplied one.
    pub display_name: Option<String>,
}

#[derive(Debug, Default)]
struct SessionState {
    user: Option<SessionUser>,
    access_token: Option<String>,
    active_repo: Option<String>,
}

/// Process-wide session context with an explicit lifecycle.
#[derive(Debug, Default)]
pub struct Session {
    state: RwLock<SessionState>,
}

impl Session {
    /// Creates a signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the signed-in user and its bearer token, replacing any
    /// previous session.
    pub fn sign_in(&self, user: SessionUser, access_token: impl Into<String>) {
        if let Ok(mut state) = self.state.write() {
            info!(
                "event=session_sign_in module=session status=ok user={}",
                user.user_id
            );
            state.user = Some(user);
            state.access_token = Some(access_token.into());
        }
    }

    /// Replaces the bearer token after a refresh. Ignored while signed
    /// out; a token without a user is meaningless.
    pub fn update_token(&self, access_token: impl Into<String>) {
        if let Ok(mut state) = self.state.write() {
            if state.user.is_none() {
                warn!("event=session_token_update module=session status=ignored reason=signed_out");
                return;
            }
            state.access_token = Some(access_token.into());
        }
    }

    /// Clears user, token and active repository.
    pub fn sign_out(&self) {
        if let Ok(mut state) = self.state.write() {
            if let Some(user) = &state.user {
                info!(
                    "event=session_sign_out module=session status=ok user={}",
                    user.user_id
                );
            }
            *state = SessionState::default();
        }
    }

    /// Selects the repository whose workspace is being viewed.
    pub fn select_repo(&self, repo_name: impl Into<String>) {
        if let Ok(mut state) = self.state.write() {
            let repo_name = repo_name.into();
            info!("event=session_repo_select module=session status=ok repo={repo_name}");
            state.active_repo = Some(repo_name);
        }
    }

    /// Clears the repository selection.
    pub fn clear_repo(&self) {
        if let Ok(mut state) = self.state.write() {
            state.active_repo = None;
        }
    }

    /// Currently signed-in user, if any.
    pub fn current_user(&self) -> Option<SessionUser> {
        self.state.read().ok().and_then(|state| state.user.clone())
    }

    /// Repository selected for viewing, if any.
    pub fn active_repo(&self) -> Option<String> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.active_repo.clone())
    }

    /// Returns whether a user is signed in.
    pub fn is_signed_in(&self) -> bool {
        self.state
            .read()
            .map(|state| state.user.is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl TokenProvider for Session {
    async fn access_token(&self) -> Option<String> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.access_token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn demo_user() -> SessionUser {
        SessionUser {
            user_id: "user-1".to_string(),
            display_name: Some("Demo".to_string()),
        }
    }

    #[test]
    fn starts_signed_out() {
        let session = Session::new();
        assert!(!session.is_signed_in());
        assert_eq!(session.current_user(), None);
        assert_eq!(session.active_repo(), None);
    }

    #[test]
    fn sign_out_clears_everything() {
        let session = Session::new();
        session.sign_in(demo_user(), "token-abc");
        session.select_repo("demo-repo");
        assert!(session.is_signed_in());
        assert_eq!(session.active_repo().as_deref(), Some("demo-repo"));

        session.sign_out();
        assert!(!session.is_signed_in());
        assert_eq!(session.current_user(), None);
        assert_eq!(session.active_repo(), None);
    }

    #[test]
    fn token_update_requires_signed_in_user() {
        let session = Session::new();
        session.update_token("orphan-token");
        assert!(!session.is_signed_in());

        session.sign_in(demo_user(), "token-1");
        session.update_token("token-2");
        assert!(session.is_signed_in());
    }

    #[tokio::test]
    async fn provides_token_only_while_signed_in() {
        let session = Arc::new(Session::new());
        assert_eq!(session.access_token().await, None);

        session.sign_in(demo_user(), "token-abc");
        assert_eq!(session.access_token().await.as_deref(), Some("token-abc"));

        session.update_token("token-def");
        assert_eq!(session.access_token().await.as_deref(), Some("token-def"));

        session.sign_out();
        assert_eq!(session.access_token().await, None);
    }
}
