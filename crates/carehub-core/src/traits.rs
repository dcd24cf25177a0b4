//! The two seams a backend plugs into.
//!
//! - `QueryBackend` — executes one `QuerySpec` against the tables
//! - `AuthBackend`  — the sign-in / sign-out stub and listener registration
//!
//! The in-memory mock store implements both; a client for the real database
//! would implement the same pair, and page code cannot tell them apart.

use futures_util::future::BoxFuture;

use carehub_contracts::{
    auth::{AuthCallback, AuthSession, Subscription},
    error::StoreResult,
    query::{QueryResponse, QuerySpec},
};

/// Executes queries built by the fluent client.
pub trait QueryBackend: Send + Sync {
    /// Run `query` and resolve to the response matching its operation.
    ///
    /// Unknown tables and filters that match nothing must resolve
    /// successfully with empty or unchanged results.
    fn execute(&self, query: QuerySpec) -> BoxFuture<'static, StoreResult<QueryResponse>>;
}

/// The authentication facade.
pub trait AuthBackend: Send + Sync {
    /// Look up the account by email and issue a session.
    fn authenticate(&self, email: &str, password: &str)
        -> BoxFuture<'static, StoreResult<AuthSession>>;

    /// End the current session. Callers clear their own session state.
    fn deauthenticate(&self) -> BoxFuture<'static, StoreResult<()>>;

    /// Register a listener for auth state changes.
    fn on_auth_state_change(&self, callback: AuthCallback) -> Subscription;
}
