//! Authentication stub types.
//!
//! These mirror the shape the portal's session context expects from a real
//! auth provider. None of it is a credential system.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::record::Account;

/// An opaque placeholder session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Random token with no meaning to any backend.
    pub access_token: String,
    pub issued_at: DateTime<Utc>,
}

impl Session {
    /// Issue a fresh placeholder session.
    pub fn issue() -> Self {
        Self {
            access_token: uuid::Uuid::new_v4().to_string(),
            issued_at: Utc::now(),
        }
    }
}

/// What a successful sign-in resolves to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthSession {
    pub user: Account,
    pub session: Session,
}

/// Auth state transitions a listener could be told about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
}

/// Listener passed to `on_auth_state_change`.
pub type AuthCallback = Box<dyn Fn(AuthEvent, Option<&AuthSession>) + Send + Sync>;

/// Handle returned by `on_auth_state_change`.
///
/// Calling `unsubscribe` runs the provider's teardown, if it registered one.
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// A subscription with nothing to tear down.
    pub fn noop() -> Self {
        Self { teardown: None }
    }

    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("has_teardown", &self.teardown.is_some())
            .finish()
    }
}
