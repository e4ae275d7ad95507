//! Authentication handshake: `(userId, token)` → admin identity.
//!
//! The identity check is an id lookup restricted to active admins. Token
//! checking sits behind [`TokenVerifier`] so that a real verifier can be
//! plugged in without touching the handshake.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::AdminIdentity;
use crate::persistence::{QueryGateway, with_timeout};

/// Verifies the token presented alongside a user id.
#[async_trait]
pub trait TokenVerifier: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `token` is a valid credential for `user_id`.
    async fn verify(&self, user_id: i64, token: &str) -> bool;
}

/// Accepts every token; identity rests on the admin lookup alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityOnlyVerifier;

#[async_trait]
impl TokenVerifier for IdentityOnlyVerifier {
    async fn verify(&self, _user_id: i64, _token: &str) -> bool {
        true
    }
}

/// Rejects empty or whitespace-only tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct NonEmptyTokenVerifier;

#[async_trait]
impl TokenVerifier for NonEmptyTokenVerifier {
    async fn verify(&self, _user_id: i64, token: &str) -> bool {
        !token.trim().is_empty()
    }
}

/// Result of one handshake attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// An active admin matched and the token was accepted.
    Authenticated(AdminIdentity),
    /// No active admin matched, or the token was rejected.
    InvalidCredentials,
    /// The lookup failed; detail has been logged.
    Failed,
}

/// Runs the identity lookup and token check.
#[derive(Debug, Clone)]
pub struct Authenticator {
    gateway: Arc<dyn QueryGateway>,
    verifier: Arc<dyn TokenVerifier>,
    query_timeout: Duration,
}

impl Authenticator {
    /// Creates an authenticator.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn QueryGateway>,
        verifier: Arc<dyn TokenVerifier>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            gateway,
            verifier,
            query_timeout,
        }
    }

    /// Checks `(user_id, token)`.
    ///
    /// Lookup errors are logged here and reported as [`AuthOutcome::Failed`].
    pub async fn authenticate(&self, user_id: i64, token: &str) -> AuthOutcome {
        let lookup = with_timeout(
            "find_active_admin",
            self.query_timeout,
            self.gateway.find_active_admin(user_id),
        )
        .await;

        let identity = match lookup {
            Ok(Some(identity)) if identity.is_active_admin() => identity,
            Ok(_) => return AuthOutcome::InvalidCredentials,
            Err(e) => {
                tracing::error!(user_id, error = %e, "admin lookup failed during handshake");
                return AuthOutcome::Failed;
            }
        };

        if !self.verifier.verify(user_id, token).await {
            tracing::debug!(user_id, "token rejected");
            return AuthOutcome::InvalidCredentials;
        }

        AuthOutcome::Authenticated(identity)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::persistence::memory::{InMemoryQueryGateway, UserRecord};
    use crate::persistence::test_support::FlakyGateway;

    async fn gateway() -> Arc<FlakyGateway> {
        let store = InMemoryQueryGateway::new();
        store
            .insert_user(UserRecord::new(7, "Ada", "ada@x.com", "admin", "active"))
            .await;
        store
            .insert_user(UserRecord::new(8, "Sam", "sam@x.com", "seller", "active"))
            .await;
        store
            .insert_user(UserRecord::new(9, "Eve", "eve@x.com", "admin", "suspended"))
            .await;
        Arc::new(FlakyGateway::new(store))
    }

    fn authenticator(gateway: Arc<FlakyGateway>, verifier: Arc<dyn TokenVerifier>) -> Authenticator {
        Authenticator::new(gateway, verifier, Duration::from_secs(1))
    }

    #[tokio::test]
    async fn active_admin_is_accepted() {
        let auth = authenticator(gateway().await, Arc::new(IdentityOnlyVerifier));
        let AuthOutcome::Authenticated(identity) = auth.authenticate(7, "t").await else {
            panic!("expected success");
        };
        assert_eq!(identity.full_name, "Ada");
    }

    #[tokio::test]
    async fn non_admin_and_inactive_are_rejected() {
        let auth = authenticator(gateway().await, Arc::new(IdentityOnlyVerifier));
        assert_eq!(auth.authenticate(8, "t").await, AuthOutcome::InvalidCredentials);
        assert_eq!(auth.authenticate(9, "t").await, AuthOutcome::InvalidCredentials);
        assert_eq!(auth.authenticate(404, "t").await, AuthOutcome::InvalidCredentials);
    }

    #[tokio::test]
    async fn lookup_error_is_a_generic_failure() {
        let gateway = gateway().await;
        gateway.fail("find_active_admin");
        let auth = authenticator(gateway, Arc::new(IdentityOnlyVerifier));
        assert_eq!(auth.authenticate(7, "t").await, AuthOutcome::Failed);
    }

    #[tokio::test]
    async fn strict_verifier_rejects_empty_token() {
        let auth = authenticator(gateway().await, Arc::new(NonEmptyTokenVerifier));
        assert_eq!(auth.authenticate(7, "  ").await, AuthOutcome::InvalidCredentials);
        assert!(matches!(
            auth.authenticate(7, "abc").await,
            AuthOutcome::Authenticated(_)
        ));
    }
}
