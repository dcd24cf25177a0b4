//! The in-memory backend.
//!
//! `MockStore` implements both backend traits over three `Vec`s kept behind
//! one `Mutex`. Every query goes through `execute`, which:
//!
//!   spawn → sleep(read or write latency) → lock → match / mutate → unlock
//!
//! The operation is spawned when `execute` is called, so it always runs to
//! completion even if the caller stops awaiting it. The lock is only held in
//! the synchronous tail, never across the sleep.

use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::future::{BoxFuture, FutureExt};
use serde_json::Value;
use tracing::{debug, info, warn};

use carehub_contracts::{
    auth::{AuthCallback, AuthSession, Session, Subscription},
    collection::Collection,
    error::{StoreError, StoreResult},
    query::{Filter, MutationOutcome, Operation, QueryResponse, QuerySpec},
    record::{Record, Row},
};
use carehub_core::traits::{AuthBackend, QueryBackend};

use crate::{
    config::{CredentialCheck, StoreConfig},
    fixtures::Seed,
    ids::IdGenerator,
};

// ── Internal mutable state ────────────────────────────────────────────────────

struct Tables {
    seed: Seed,
    ids: IdGenerator,
}

// ── Public store ──────────────────────────────────────────────────────────────

/// An in-memory stand-in for the portal's database and auth provider.
///
/// Clones share state. Separate `new` calls are fully isolated, which is what
/// tests should use.
///
/// `execute`, `authenticate`, and `deauthenticate` must be called from inside
/// a tokio runtime.
#[derive(Clone)]
pub struct MockStore {
    config: Arc<StoreConfig>,
    state: Arc<Mutex<Tables>>,
}

impl MockStore {
    pub fn new(config: StoreConfig, seed: Seed) -> Self {
        info!(
            users = seed.users.len(),
            appointments = seed.appointments.len(),
            medical_records = seed.medical_records.len(),
            credential_check = ?config.credential_check,
            "mock store seeded"
        );
        Self {
            config: Arc::new(config),
            state: Arc::new(Mutex::new(Tables {
                seed,
                ids: IdGenerator::default(),
            })),
        }
    }

    /// Default configuration over the built-in fixtures.
    pub fn with_fixtures() -> Self {
        Self::new(StoreConfig::default(), Seed::fixtures())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Copy of one collection's current rows, without latency.
    pub fn snapshot(&self, collection: Collection) -> StoreResult<Vec<Row>> {
        let state = self.lock()?;
        let rows = match collection {
            Collection::Users => copy_rows(&state.seed.users),
            Collection::Appointments => copy_rows(&state.seed.appointments),
            Collection::MedicalRecords => copy_rows(&state.seed.medical_records),
        };
        Ok(rows)
    }

    /// Apply `query` immediately. This is the synchronous tail of `execute`.
    pub(crate) fn apply(&self, query: QuerySpec) -> StoreResult<QueryResponse> {
        let Some(collection) = Collection::from_name(&query.table) else {
            warn!(
                table = %query.table,
                operation = query.operation.name(),
                "unknown table; resolving with an empty result"
            );
            return Ok(empty_response(&query.operation));
        };

        let mut guard = self.lock()?;
        let Tables { seed, ids } = &mut *guard;
        let response = match collection {
            Collection::Users => apply_to(&mut seed.users, query, ids),
            Collection::Appointments => apply_to(&mut seed.appointments, query, ids),
            Collection::MedicalRecords => apply_to(&mut seed.medical_records, query, ids),
        }?;

        debug!(table = %collection, response = %summary(&response), "query applied");
        Ok(response)
    }

    fn sign_in(&self, email: &str, password: &str) -> StoreResult<AuthSession> {
        let state = self.lock()?;
        let account = state
            .seed
            .users
            .iter()
            .find(|a| a.email.as_deref() == Some(email))
            .cloned()
            .ok_or(StoreError::AccountNotFound)?;
        drop(state);

        if account.password.as_deref() != Some(password) {
            match self.config.credential_check {
                CredentialCheck::Strict => {
                    warn!(email = %email, "sign-in rejected: password mismatch");
                    return Err(StoreError::InvalidCredentials);
                }
                CredentialCheck::DevPermissive => {
                    warn!(
                        email = %email,
                        "password mismatch accepted because credential checking is dev-permissive"
                    );
                }
            }
        }

        info!(user_id = ?account.id, role = ?account.role, "signed in");
        Ok(AuthSession {
            user: account,
            session: Session::issue(),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.state.lock().map_err(|e| StoreError::Backend {
            reason: format!("store state lock poisoned: {}", e),
        })
    }
}

// ── QueryBackend impl ─────────────────────────────────────────────────────────

impl QueryBackend for MockStore {
    /// Schedule `query` after the read or write delay.
    ///
    /// Resolves to `Err` only for an unrepresentable payload or a backend
    /// fault; unknown tables and empty matches resolve successfully.
    fn execute(&self, query: QuerySpec) -> BoxFuture<'static, StoreResult<QueryResponse>> {
        let delay = if query.operation.is_write() {
            self.config.latency.write()
        } else {
            self.config.latency.read()
        };
        let store = self.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            store.apply(query)
        });

        async move {
            task.await.map_err(|e| StoreError::Backend {
                reason: format!("query task failed: {}", e),
            })?
        }
        .boxed()
    }
}

// ── AuthBackend impl ──────────────────────────────────────────────────────────

impl AuthBackend for MockStore {
    /// Resolve to the account whose email matches exactly.
    ///
    /// Fails with `AccountNotFound` for an unknown email. What happens on a
    /// password mismatch depends on `StoreConfig::credential_check`.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> BoxFuture<'static, StoreResult<AuthSession>> {
        let store = self.clone();
        let email = email.to_string();
        let password = password.to_string();
        async move {
            tokio::time::sleep(store.config.latency.sign_in()).await;
            store.sign_in(&email, &password)
        }
        .boxed()
    }

    /// Always succeeds. Nothing is cleared here.
    fn deauthenticate(&self) -> BoxFuture<'static, StoreResult<()>> {
        let delay = self.config.latency.sign_out();
        async move {
            tokio::time::sleep(delay).await;
            info!("signed out");
            Ok(())
        }
        .boxed()
    }

    /// No listener is registered and `callback` is never invoked.
    fn on_auth_state_change(&self, callback: AuthCallback) -> Subscription {
        debug!("auth state listener ignored by mock store");
        drop(callback);
        Subscription::noop()
    }
}

// ── Query application ─────────────────────────────────────────────────────────

fn apply_to<R: Record>(
    rows: &mut Vec<R>,
    query: QuerySpec,
    ids: &mut IdGenerator,
) -> StoreResult<QueryResponse> {
    let QuerySpec {
        operation,
        filter,
        order,
        ..
    } = query;

    match operation {
        Operation::Select { .. } => {
            let mut selected = Vec::new();
            for record in rows.iter() {
                let row = record.clone().into_row();
                if matches_filter(filter.as_ref(), &row)? {
                    selected.push(row);
                }
            }
            if let Some(order) = order {
                let mut failure = None;
                selected.sort_by(|a, b| {
                    order.compare(a, b).unwrap_or_else(|e| {
                        failure.get_or_insert(e);
                        std::cmp::Ordering::Equal
                    })
                });
                if let Some(e) = failure {
                    return Err(e);
                }
            }
            Ok(QueryResponse::Rows(selected))
        }

        Operation::Insert { payload } => {
            let mut row = Row::from_value(R::COLLECTION, payload)?;
            if row.id().is_none() {
                row.set_id(ids.next_id());
            }
            let record = R::from_row(row.clone()).ok_or_else(|| StoreError::Backend {
                reason: format!("parsed row does not belong to {}", R::COLLECTION),
            })?;
            rows.push(record);
            Ok(QueryResponse::Inserted(Some(row)))
        }

        Operation::Update { patch } => {
            let Value::Object(patch) = patch else {
                return Err(StoreError::InvalidPayload {
                    reason: "update patch must be a JSON object".to_string(),
                });
            };
            let Some(filter) = filter else {
                warn!(table = %R::COLLECTION, "update without a filter affects no rows");
                return Ok(QueryResponse::Mutated(MutationOutcome::default()));
            };

            // Merge every match first so a bad patch leaves the table untouched.
            let mut replacements = Vec::new();
            for (index, record) in rows.iter().enumerate() {
                let row = record.clone().into_row();
                if filter.matches(&row)? {
                    let merged = row.merged(&patch)?;
                    let merged = R::from_row(merged).ok_or_else(|| StoreError::Backend {
                        reason: format!("merged row does not belong to {}", R::COLLECTION),
                    })?;
                    replacements.push((index, merged));
                }
            }

            let affected = replacements.len();
            for (index, merged) in replacements {
                rows[index] = merged;
            }
            Ok(QueryResponse::Mutated(MutationOutcome {
                error: None,
                affected,
            }))
        }

        Operation::Delete => {
            let Some(filter) = filter else {
                warn!(table = %R::COLLECTION, "delete without a filter affects no rows");
                return Ok(QueryResponse::Mutated(MutationOutcome::default()));
            };

            let mut doomed = Vec::with_capacity(rows.len());
            for record in rows.iter() {
                doomed.push(filter.matches(&record.clone().into_row())?);
            }
            let affected = doomed.iter().filter(|d| **d).count();
            let mut verdicts = doomed.into_iter();
            rows.retain(|_| !verdicts.next().unwrap_or(false));

            Ok(QueryResponse::Mutated(MutationOutcome {
                error: None,
                affected,
            }))
        }
    }
}

fn matches_filter(filter: Option<&Filter>, row: &Row) -> StoreResult<bool> {
    match filter {
        Some(filter) => filter.matches(row),
        None => Ok(true),
    }
}

fn copy_rows<R: Record>(rows: &[R]) -> Vec<Row> {
    rows.iter().cloned().map(Record::into_row).collect()
}

fn empty_response(operation: &Operation) -> QueryResponse {
    match operation {
        Operation::Select { .. } => QueryResponse::Rows(Vec::new()),
        Operation::Insert { .. } => QueryResponse::Inserted(None),
        Operation::Update { .. } | Operation::Delete => {
            QueryResponse::Mutated(MutationOutcome::default())
        }
    }
}

fn summary(response: &QueryResponse) -> String {
    match response {
        QueryResponse::Rows(rows) => format!("{} rows", rows.len()),
        QueryResponse::Inserted(row) => format!("inserted id {:?}", row.as_ref().and_then(Row::id)),
        QueryResponse::Mutated(outcome) => format!("{} affected", outcome.affected),
    }
}
