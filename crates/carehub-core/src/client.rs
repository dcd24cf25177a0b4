//! The fluent query client.
//!
//! `Client` keeps the call shape page code was written against:
//!
//! ```rust,ignore
//! let visits = client.from("appointments").select("*").eq("patientId", "2").await?;
//! client.from("appointments").insert(json!({ "patientId": "2" })).await?;
//! client.from("appointments").update(json!({ "status": "completed" })).eq("id", id).await?;
//! client.from("appointments").delete().eq("id", id).await?;
//! ```
//!
//! Each chain only assembles a `QuerySpec`. Awaiting it hands the spec to the
//! backend's `execute`; no matching happens here. `update()` and `delete()`
//! are not awaitable until `.eq()` supplies a filter.

use std::{future::IntoFuture, sync::Arc};

use futures_util::future::{BoxFuture, FutureExt};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use carehub_contracts::{
    auth::{AuthCallback, AuthEvent, AuthSession, Subscription},
    error::{StoreError, StoreResult},
    query::{Filter, MutationOutcome, Ordering, QueryResponse, QuerySpec},
    record::Row,
};

use crate::traits::{AuthBackend, QueryBackend};

/// Entry point for page code: tables via `from`, sessions via `auth`.
#[derive(Clone)]
pub struct Client {
    queries: Arc<dyn QueryBackend>,
    auth: Arc<dyn AuthBackend>,
}

impl Client {
    /// Wrap a backend that serves both queries and auth.
    pub fn new<B>(backend: B) -> Self
    where
        B: QueryBackend + AuthBackend + 'static,
    {
        let backend = Arc::new(backend);
        Self {
            queries: backend.clone(),
            auth: backend,
        }
    }

    /// Wrap separate query and auth backends.
    pub fn from_parts(queries: Arc<dyn QueryBackend>, auth: Arc<dyn AuthBackend>) -> Self {
        Self { queries, auth }
    }

    /// Start a query against `name`. Unknown names are accepted.
    pub fn table(&self, name: impl Into<String>) -> TableQuery {
        TableQuery {
            backend: self.queries.clone(),
            table: name.into(),
        }
    }

    /// Alias of [`Client::table`] matching the query-table client's spelling.
    pub fn from(&self, name: impl Into<String>) -> TableQuery {
        self.table(name)
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient {
            backend: self.auth.clone(),
        }
    }
}

// ── Table-scoped builders ─────────────────────────────────────────────────────

/// A query scoped to one table, before the operation is chosen.
pub struct TableQuery {
    backend: Arc<dyn QueryBackend>,
    table: String,
}

impl TableQuery {
    /// Read rows. Awaiting the result without `.eq()` returns the whole table.
    pub fn select(self, columns: &str) -> SelectQuery {
        SelectQuery {
            backend: self.backend,
            spec: QuerySpec::select(self.table, columns),
        }
    }

    /// Append one row. `payload` may be a typed record or a `json!` object;
    /// an `id` is generated unless the payload carries one.
    pub fn insert(self, payload: impl Serialize) -> InsertQuery {
        InsertQuery {
            backend: self.backend,
            table: self.table,
            payload: to_payload(&payload),
        }
    }

    /// Shallow-merge `patch` into rows chosen by the following `.eq()`.
    pub fn update(self, patch: impl Serialize) -> UpdateBuilder {
        UpdateBuilder {
            backend: self.backend,
            table: self.table,
            patch: to_payload(&patch),
        }
    }

    /// Remove rows chosen by the following `.eq()`.
    pub fn delete(self) -> DeleteBuilder {
        DeleteBuilder {
            backend: self.backend,
            table: self.table,
        }
    }
}

/// An awaitable select.
pub struct SelectQuery {
    backend: Arc<dyn QueryBackend>,
    spec: QuerySpec,
}

impl SelectQuery {
    /// Keep only rows where `row[column] === value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.spec.filter = Some(Filter::eq(column, value));
        self
    }

    /// Sort the result on `column`.
    pub fn order(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.spec.order = Some(Ordering {
            column: column.into(),
            ascending,
        });
        self
    }
}

impl IntoFuture for SelectQuery {
    type Output = StoreResult<Vec<Row>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let response = dispatch(&self.backend, self.spec);
        async move {
            match response.await? {
                QueryResponse::Rows(rows) => Ok(rows),
                other => Err(unexpected("select", &other)),
            }
        }
        .boxed()
    }
}

/// An awaitable insert resolving to the stored row.
pub struct InsertQuery {
    backend: Arc<dyn QueryBackend>,
    table: String,
    payload: StoreResult<Value>,
}

impl IntoFuture for InsertQuery {
    /// `None` when the table is unknown.
    type Output = StoreResult<Option<Row>>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let payload = match self.payload {
            Ok(payload) => payload,
            Err(e) => return async move { Err(e) }.boxed(),
        };
        let response = dispatch(&self.backend, QuerySpec::insert(self.table, payload));
        async move {
            match response.await? {
                QueryResponse::Inserted(row) => Ok(row),
                other => Err(unexpected("insert", &other)),
            }
        }
        .boxed()
    }
}

/// An update still waiting for its filter.
pub struct UpdateBuilder {
    backend: Arc<dyn QueryBackend>,
    table: String,
    patch: StoreResult<Value>,
}

impl UpdateBuilder {
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> UpdateQuery {
        UpdateQuery {
            backend: self.backend,
            table: self.table,
            patch: self.patch,
            filter: Filter::eq(column, value),
        }
    }
}

/// An awaitable, filtered update.
pub struct UpdateQuery {
    backend: Arc<dyn QueryBackend>,
    table: String,
    patch: StoreResult<Value>,
    filter: Filter,
}

impl IntoFuture for UpdateQuery {
    type Output = StoreResult<MutationOutcome>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        let patch = match self.patch {
            Ok(patch) => patch,
            Err(e) => return async move { Err(e) }.boxed(),
        };
        let spec = QuerySpec::update(self.table, patch, self.filter);
        mutation(dispatch(&self.backend, spec), "update")
    }
}

/// A delete still waiting for its filter.
pub struct DeleteBuilder {
    backend: Arc<dyn QueryBackend>,
    table: String,
}

impl DeleteBuilder {
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> DeleteQuery {
        DeleteQuery {
            backend: self.backend,
            spec: QuerySpec::delete(self.table, Filter::eq(column, value)),
        }
    }
}

/// An awaitable, filtered delete.
pub struct DeleteQuery {
    backend: Arc<dyn QueryBackend>,
    spec: QuerySpec,
}

impl IntoFuture for DeleteQuery {
    type Output = StoreResult<MutationOutcome>;
    type IntoFuture = BoxFuture<'static, Self::Output>;

    fn into_future(self) -> Self::IntoFuture {
        mutation(dispatch(&self.backend, self.spec), "delete")
    }
}

// ── Auth facade ───────────────────────────────────────────────────────────────

/// Session operations, forwarded to the auth backend.
#[derive(Clone)]
pub struct AuthClient {
    backend: Arc<dyn AuthBackend>,
}

impl AuthClient {
    pub fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, StoreResult<AuthSession>> {
        self.backend.authenticate(email, password)
    }

    pub fn deauthenticate(&self) -> BoxFuture<'static, StoreResult<()>> {
        self.backend.deauthenticate()
    }

    pub fn on_auth_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(AuthEvent, Option<&AuthSession>) + Send + Sync + 'static,
    {
        let callback: AuthCallback = Box::new(callback);
        self.backend.on_auth_state_change(callback)
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn dispatch(
    backend: &Arc<dyn QueryBackend>,
    spec: QuerySpec,
) -> BoxFuture<'static, StoreResult<QueryResponse>> {
    debug!(
        table = %spec.table,
        operation = spec.operation.name(),
        filtered = spec.filter.is_some(),
        "dispatching query"
    );
    backend.execute(spec)
}

fn mutation(
    response: BoxFuture<'static, StoreResult<QueryResponse>>,
    operation: &'static str,
) -> BoxFuture<'static, StoreResult<MutationOutcome>> {
    async move {
        match response.await? {
            QueryResponse::Mutated(outcome) => Ok(outcome),
            other => Err(unexpected(operation, &other)),
        }
    }
    .boxed()
}

fn to_payload(payload: &impl Serialize) -> StoreResult<Value> {
    serde_json::to_value(payload).map_err(|e| StoreError::InvalidPayload {
        reason: format!("payload is not representable as JSON: {}", e),
    })
}

fn unexpected(operation: &str, response: &QueryResponse) -> StoreError {
    StoreError::Backend {
        reason: format!("backend answered {} with {:?}", operation, response),
    }
}
