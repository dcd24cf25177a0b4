//! # carehub-mock-store
//!
//! An in-memory, latency-simulating stand-in for the CareHub database and
//! auth provider.
//!
//! ## Overview
//!
//! `MockStore` holds the `users`, `appointments`, and `medical_records`
//! collections in process memory, seeded from [`Seed`]. It implements both
//! backend traits from `carehub-core`, so page code talks to it through the
//! same `Client` it would use against the real database.
//!
//! Every operation waits out an artificial delay before it resolves so
//! loading states can be exercised during development. Nothing persists past
//! the life of the store.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carehub_core::Client;
//! use carehub_mock_store::{MockStore, Seed, StoreConfig};
//!
//! let client = Client::new(MockStore::new(StoreConfig::default(), Seed::fixtures()));
//! let session = client.auth().authenticate("sarah.johnson@carehub.example", "doctor123").await?;
//! ```

pub mod config;
pub mod fixtures;
pub mod ids;
pub mod store;

pub use config::{CredentialCheck, LatencyProfile, StoreConfig};
pub use fixtures::Seed;
pub use store::MockStore;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{
        future::IntoFuture,
        sync::{
            atomic::{AtomicBool, Ordering as AtomicOrdering},
            Arc,
        },
        time::Duration,
    };

    use serde_json::json;
    use tokio::time::Instant;

    use carehub_contracts::{
        collection::Collection,
        error::StoreError,
        query::{Filter, QueryResponse, QuerySpec},
        record::{rows_as, Account, Record, Role, Row, ScheduledVisit},
    };
    use carehub_core::{Client, QueryBackend};

    use super::{ids::IdGenerator, CredentialCheck, MockStore, Seed, StoreConfig};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn fixture_client() -> (Client, MockStore) {
        let store = MockStore::new(StoreConfig::default(), Seed::fixtures());
        (Client::new(store.clone()), store)
    }

    /// A store holding the single account `{id:'1', email:'a@x.com', password:'p', role:'doctor'}`.
    fn single_account_store(check: CredentialCheck) -> MockStore {
        let seed = Seed {
            users: vec![Account {
                id: Some("1".to_string()),
                email: Some("a@x.com".to_string()),
                password: Some("p".to_string()),
                role: Some(Role::Doctor),
                ..Default::default()
            }],
            ..Seed::empty()
        };
        let config = StoreConfig {
            credential_check: check,
            ..StoreConfig::default()
        };
        MockStore::new(config, seed)
    }

    fn fixture_rows(collection: Collection) -> Vec<Row> {
        let seed = Seed::fixtures();
        match collection {
            Collection::Users => seed.users.into_iter().map(Record::into_row).collect(),
            Collection::Appointments => {
                seed.appointments.into_iter().map(Record::into_row).collect()
            }
            Collection::MedicalRecords => {
                seed.medical_records.into_iter().map(Record::into_row).collect()
            }
        }
    }

    // ── Reads ─────────────────────────────────────────────────────────────────

    /// A fresh store's unfiltered select returns exactly the seed fixtures.
    #[tokio::test(start_paused = true)]
    async fn test_unfiltered_select_returns_seed() {
        let (client, _store) = fixture_client();

        for collection in Collection::ALL {
            let rows = client.from(collection.table_name()).select("*").await.unwrap();
            assert_eq!(rows, fixture_rows(collection), "seed mismatch for {}", collection);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_eq_filters_rows() {
        let (client, _store) = fixture_client();

        let doctors = client.from("users").select("*").eq("role", "doctor").await.unwrap();
        let doctors: Vec<Account> = rows_as(doctors);
        assert_eq!(doctors.len(), 2);
        assert!(doctors.iter().all(|d| d.role == Some(Role::Doctor)));

        let none = client.from("users").select("*").eq("role", "nurse").await.unwrap();
        assert!(none.is_empty(), "a filter matching nothing resolves empty");
    }

    /// Rows without the filtered column are silently excluded.
    #[tokio::test(start_paused = true)]
    async fn test_filter_on_missing_field_excludes_row() {
        let (client, _store) = fixture_client();

        // Only doctors carry a specialization.
        let rows = client
            .from("users")
            .select("*")
            .eq("specialization", "Cardiology")
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), Some("1"));

        // Patients and the admin lack it entirely.
        let missing = client
            .from("users")
            .select("*")
            .eq("specialization", serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(missing.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_order() {
        let (client, _store) = fixture_client();

        let rows = client
            .from("appointments")
            .select("*")
            .eq("patientId", "3")
            .order("date", true)
            .await
            .unwrap();
        let ids: Vec<_> = rows.iter().filter_map(Row::id).collect();
        assert_eq!(ids, vec!["3", "1"]);
    }

    /// Mutating a returned row never reaches the store.
    #[tokio::test(start_paused = true)]
    async fn test_reads_return_defensive_copies() {
        let (client, _store) = fixture_client();

        let rows = client.from("appointments").select("*").eq("id", "1").await.unwrap();
        let mut visits: Vec<ScheduledVisit> = rows_as(rows);
        visits[0].status = Some("tampered".to_string());

        let again: Vec<ScheduledVisit> =
            rows_as(client.from("appointments").select("*").eq("id", "1").await.unwrap());
        assert_eq!(again[0].status.as_deref(), Some("scheduled"));
    }

    // ── Inserts ───────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_insert_then_select_finds_new_record() {
        let (client, _store) = fixture_client();

        let inserted = client
            .from("appointments")
            .insert(json!({
                "patientId": "2",
                "doctorId": "1",
                "date": "2024-03-20",
                "status": "scheduled"
            }))
            .await
            .unwrap()
            .expect("known table yields the stored row");

        let id = inserted.id().expect("generated id").to_string();
        assert!(!id.is_empty());
        assert!(id.chars().all(|c| c.is_ascii_digit()), "id is a decimal timestamp: {id}");

        let rows = client
            .from("appointments")
            .select("*")
            .eq("patientId", "2")
            .await
            .unwrap();
        assert_eq!(rows, vec![inserted]);

        let visit: ScheduledVisit = rows[0].clone().into_record().unwrap();
        assert_eq!(visit.doctor_id.as_deref(), Some("1"));
        assert_eq!(visit.date.as_deref(), Some("2024-03-20"));
        assert_eq!(visit.status.as_deref(), Some("scheduled"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_caller_supplied_id_wins() {
        let (client, _store) = fixture_client();

        let inserted = client
            .from("medical_records")
            .insert(json!({ "id": "custom-7", "diagnosis": "Migraine" }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(inserted.id(), Some("custom-7"));

        let rows = client.from("medical_records").select("*").eq("id", "custom-7").await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    /// Every collection, users included, returns an inserted row to a
    /// select filtered on one of its columns.
    #[tokio::test(start_paused = true)]
    async fn test_insert_then_select_in_every_collection() {
        let (client, _store) = fixture_client();

        for collection in Collection::ALL {
            let (payload, column, value) = match collection {
                Collection::Users => (
                    json!({ "email": "new.patient@carehub.example", "role": "patient", "age": 30 }),
                    "email",
                    json!("new.patient@carehub.example"),
                ),
                Collection::Appointments => (
                    json!({ "patientId": "9", "status": "scheduled" }),
                    "patientId",
                    json!("9"),
                ),
                Collection::MedicalRecords => (
                    json!({ "patientId": "9", "diagnosis": "Migraine" }),
                    "diagnosis",
                    json!("Migraine"),
                ),
            };

            let inserted = client
                .from(collection.table_name())
                .insert(payload)
                .await
                .unwrap()
                .expect("known table yields the stored row");
            let rows = client
                .from(collection.table_name())
                .select("*")
                .eq(column, value)
                .await
                .unwrap();
            assert!(rows.contains(&inserted), "inserted row missing from {}", collection);
        }
    }

    /// An integer column matches a float filter of the same value and back.
    #[tokio::test(start_paused = true)]
    async fn test_numeric_filter_ignores_int_float_split() {
        let (client, _store) = fixture_client();

        let rows = client.from("users").select("*").eq("age", 45.0).await.unwrap();
        let ids: Vec<_> = rows.iter().filter_map(Row::id).collect();
        assert_eq!(ids, vec!["3"]);

        client
            .from("appointments")
            .update(json!({ "x": 1.0 }))
            .eq("id", "1")
            .await
            .unwrap();
        let rows = client.from("appointments").select("*").eq("x", 1).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_to_back_inserts_get_distinct_ids() {
        let (client, _store) = fixture_client();

        let first = client.from("appointments").insert(json!({ "notes": "a" })).into_future();
        let second = client.from("appointments").insert(json!({ "notes": "b" })).into_future();
        let (first, second) = tokio::join!(first, second);

        let first = first.unwrap().unwrap();
        let second = second.unwrap().unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_id_generator_is_strictly_monotonic() {
        let mut ids = IdGenerator::default();
        assert_eq!(ids.next_at(1_700_000_000_000), "1700000000000");
        assert_eq!(ids.next_at(1_700_000_000_000), "1700000000001");
        // A clock that steps backwards still yields increasing ids.
        assert_eq!(ids.next_at(1_600_000_000_000), "1700000000002");
        assert_eq!(ids.next_at(1_700_000_000_500), "1700000000500");
    }

    #[tokio::test(start_paused = true)]
    async fn test_insert_rejects_wrongly_typed_payload() {
        let (client, store) = fixture_client();

        let err = client
            .from("users")
            .insert(json!({ "email": "x@y.com", "age": "forty" }))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPayload { .. }));
        assert_eq!(store.snapshot(Collection::Users).unwrap().len(), 5);
    }

    // ── Updates ───────────────────────────────────────────────────────────────

    /// Update merges; fields not in the patch survive.
    #[tokio::test(start_paused = true)]
    async fn test_update_is_partial_merge() {
        let (client, store) = fixture_client();

        let outcome = client
            .from("appointments")
            .update(json!({ "status": "completed" }))
            .eq("id", "1")
            .await
            .unwrap();
        assert_eq!(outcome.error, None);
        assert_eq!(outcome.affected, 1);

        let visits: Vec<ScheduledVisit> = rows_as(store.snapshot(Collection::Appointments).unwrap());
        let updated = visits.iter().find(|v| v.id() == Some("1")).unwrap();
        assert_eq!(updated.status.as_deref(), Some("completed"));
        assert_eq!(updated.notes.as_deref(), Some("Routine blood pressure review"));
        assert_eq!(updated.patient_id.as_deref(), Some("3"));

        // Non-matching rows are untouched.
        let other = visits.iter().find(|v| v.id() == Some("2")).unwrap();
        assert_eq!(other.status.as_deref(), Some("scheduled"));
    }

    /// A patch on a column the record type does not name lands in the row
    /// and leaves every other field as it was.
    #[tokio::test(start_paused = true)]
    async fn test_update_adds_unknown_column() {
        let (client, store) = fixture_client();
        let find = |rows: Vec<Row>| rows.into_iter().find(|r| r.id() == Some("1")).unwrap();
        let before = find(store.snapshot(Collection::Appointments).unwrap());

        let outcome = client
            .from("appointments")
            .update(json!({ "x": 1 }))
            .eq("id", "1")
            .await
            .unwrap();
        assert_eq!(outcome.affected, 1);

        let after = find(store.snapshot(Collection::Appointments).unwrap());
        assert_eq!(after.column("x").unwrap(), Some(json!(1)));

        let mut expected = before.to_object().unwrap();
        expected.insert("x".to_string(), json!(1));
        assert_eq!(after.to_object().unwrap(), expected);
    }

    /// A null in the patch clears a named field; the key disappears and the
    /// row then matches a null filter on that column.
    #[tokio::test(start_paused = true)]
    async fn test_null_patch_clears_named_field() {
        let (client, store) = fixture_client();

        client
            .from("appointments")
            .update(json!({ "notes": null }))
            .eq("id", "1")
            .await
            .unwrap();

        let rows = store.snapshot(Collection::Appointments).unwrap();
        let cleared = rows.iter().find(|r| r.id() == Some("1")).unwrap();
        assert!(!cleared.to_object().unwrap().contains_key("notes"));

        let rows = client
            .from("appointments")
            .select("*")
            .eq("notes", serde_json::Value::Null)
            .await
            .unwrap();
        assert!(rows.iter().any(|r| r.id() == Some("1")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_update_touches_every_match() {
        let (client, store) = fixture_client();

        let outcome = client
            .from("appointments")
            .update(json!({ "doctorId": "2" }))
            .eq("doctorId", "1")
            .await
            .unwrap();
        assert_eq!(outcome.affected, 2);

        let visits: Vec<ScheduledVisit> = rows_as(store.snapshot(Collection::Appointments).unwrap());
        assert!(visits.iter().all(|v| v.doctor_id.as_deref() == Some("2")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_bad_patch_leaves_table_untouched() {
        let (client, store) = fixture_client();
        let before = store.snapshot(Collection::Users).unwrap();

        let err = client
            .from("users")
            .update(json!({ "age": "old" }))
            .eq("role", "patient")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidPayload { .. }));
        assert_eq!(store.snapshot(Collection::Users).unwrap(), before);

        let err = client.from("users").update(json!(["not", "an", "object"])).eq("id", "3").await;
        assert!(matches!(err, Err(StoreError::InvalidPayload { .. })));
    }

    // ── Deletes ───────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_delete_is_idempotent() {
        let (client, store) = fixture_client();

        let first = client.from("appointments").delete().eq("patientId", "3").await.unwrap();
        assert_eq!(first.affected, 2);
        let after_once = store.snapshot(Collection::Appointments).unwrap();

        let second = client.from("appointments").delete().eq("patientId", "3").await.unwrap();
        assert_eq!(second.affected, 0);
        assert_eq!(second.error, None);
        assert_eq!(store.snapshot(Collection::Appointments).unwrap(), after_once);
        assert_eq!(after_once.len(), 1);
    }

    /// Specs built by hand without a filter never wipe a table.
    #[tokio::test(start_paused = true)]
    async fn test_unfiltered_mutation_spec_affects_nothing() {
        let store = MockStore::with_fixtures();
        let mut spec = QuerySpec::delete("appointments", Filter::eq("id", "1"));
        spec.filter = None;

        match store.execute(spec).await.unwrap() {
            QueryResponse::Mutated(outcome) => assert_eq!(outcome.affected, 0),
            other => panic!("expected Mutated, got {:?}", other),
        }
        assert_eq!(store.snapshot(Collection::Appointments).unwrap().len(), 3);
    }

    // ── Unknown tables ────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_unknown_table_is_always_empty() {
        let (client, store) = fixture_client();

        assert!(client.from("prescriptions").select("*").await.unwrap().is_empty());
        assert!(client
            .from("prescriptions")
            .select("*")
            .eq("id", "1")
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            client.from("prescriptions").insert(json!({ "id": "1" })).await.unwrap(),
            None
        );
        let updated = client
            .from("prescriptions")
            .update(json!({ "x": 1 }))
            .eq("id", "1")
            .await
            .unwrap();
        assert_eq!(updated.affected, 0);
        let deleted = client.from("prescriptions").delete().eq("id", "1").await.unwrap();
        assert_eq!(deleted.affected, 0);

        // Still empty after the insert.
        assert!(client.from("prescriptions").select("*").await.unwrap().is_empty());
        for collection in Collection::ALL {
            assert_eq!(store.snapshot(collection).unwrap(), fixture_rows(collection));
        }
    }

    // ── Latency ───────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_write_does_not_resolve_before_its_delay() {
        let (client, _store) = fixture_client();

        let start = Instant::now();
        client.from("appointments").insert(json!({ "notes": "x" })).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));

        let early = tokio::time::timeout(
            Duration::from_millis(499),
            client.from("appointments").delete().eq("id", "1").into_future(),
        )
        .await;
        assert!(early.is_err(), "a delete must not resolve before 500 ms");
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_delay_is_shorter_than_write_delay() {
        let (client, _store) = fixture_client();

        let start = Instant::now();
        client.from("users").select("*").await.unwrap();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(300));
        assert!(elapsed < Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_instant_config_skips_delays() {
        let client = Client::new(MockStore::new(StoreConfig::instant(), Seed::fixtures()));

        let start = Instant::now();
        client.from("users").select("*").await.unwrap();
        client.from("users").delete().eq("id", "5").await.unwrap();
        assert!(start.elapsed() < Duration::from_millis(10));
    }

    /// Dropping the awaiting future does not cancel a scheduled operation.
    #[tokio::test(start_paused = true)]
    async fn test_abandoned_write_still_lands() {
        let (client, store) = fixture_client();

        let abandoned = tokio::time::timeout(
            Duration::from_millis(100),
            client
                .from("appointments")
                .insert(json!({ "id": "late", "notes": "abandoned" }))
                .into_future(),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(450)).await;
        let rows = store.snapshot(Collection::Appointments).unwrap();
        assert!(rows.iter().any(|r| r.id() == Some("late")));
    }

    // ── Authentication ────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_authenticate_with_correct_password() {
        let client = Client::new(single_account_store(CredentialCheck::Strict));

        let start = Instant::now();
        let session = client.auth().authenticate("a@x.com", "p").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
        assert_eq!(session.user.id.as_deref(), Some("1"));
        assert!(!session.session.access_token.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_strict_mode_rejects_wrong_password() {
        let client = Client::new(single_account_store(CredentialCheck::Strict));

        let err = client.auth().authenticate("a@x.com", "wrong").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidCredentials));
    }

    /// The dev-permissive stub only looks at the email.
    #[tokio::test(start_paused = true)]
    async fn test_permissive_mode_accepts_wrong_password() {
        let client = Client::new(single_account_store(CredentialCheck::DevPermissive));

        let session = client.auth().authenticate("a@x.com", "wrong").await.unwrap();
        assert_eq!(session.user.id.as_deref(), Some("1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_email_is_account_not_found() {
        for check in [CredentialCheck::Strict, CredentialCheck::DevPermissive] {
            let client = Client::new(single_account_store(check));
            let err = client.auth().authenticate("nobody@x.com", "p").await.unwrap_err();
            assert!(matches!(err, StoreError::AccountNotFound));
            assert_eq!(err.to_string(), "account not found");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixture_accounts_can_sign_in() {
        let (client, _store) = fixture_client();

        for account in Seed::fixtures().users {
            let email = account.email.clone().unwrap();
            let password = account.password.clone().unwrap();
            let session = client.auth().authenticate(&email, &password).await.unwrap();
            assert_eq!(session.user, account);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_deauthenticate_and_listener_stub() {
        let (client, _store) = fixture_client();

        let start = Instant::now();
        client.auth().deauthenticate().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(300));

        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let subscription = client.auth().on_auth_state_change(move |_, _| {
            flag.store(true, AtomicOrdering::SeqCst);
        });
        client.auth().authenticate("admin@carehub.example", "admin123").await.unwrap();
        client.auth().deauthenticate().await.unwrap();
        subscription.unsubscribe();

        assert!(!called.load(AtomicOrdering::SeqCst), "listener must never be invoked");
    }

    // ── Isolation ─────────────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn test_stores_are_isolated_and_clones_share() {
        let first = MockStore::with_fixtures();
        let second = MockStore::with_fixtures();
        let shared = first.clone();

        Client::new(first.clone())
            .from("users")
            .delete()
            .eq("role", "admin")
            .await
            .unwrap();

        assert_eq!(first.snapshot(Collection::Users).unwrap().len(), 4);
        assert_eq!(shared.snapshot(Collection::Users).unwrap().len(), 4);
        assert_eq!(second.snapshot(Collection::Users).unwrap().len(), 5);
        assert_eq!(Seed::fixtures().users.len(), 5, "fixtures are never mutated");
    }

    // ── Configuration ─────────────────────────────────────────────────────────

    #[test]
    fn test_config_defaults_and_partial_toml() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.latency.read_ms, 300);
        assert_eq!(config.latency.write_ms, 500);
        assert_eq!(config.latency.sign_in_ms, 500);
        assert_eq!(config.latency.sign_out_ms, 300);
        assert_eq!(config.credential_check, CredentialCheck::Strict);

        let config = StoreConfig::from_toml_str(
            r#"
            credential_check = "dev-permissive"

            [latency]
            write_ms = 50
            "#,
        )
        .unwrap();
        assert_eq!(config.credential_check, CredentialCheck::DevPermissive);
        assert_eq!(config.latency.write_ms, 50);
        assert_eq!(config.latency.read_ms, 300);
    }

    #[test]
    fn test_config_parse_errors() {
        for bad in [
            "this is not valid toml ][[[",
            "credential_check = \"lenient\"",
            "[latency]\nread_millis = 1",
        ] {
            match StoreConfig::from_toml_str(bad) {
                Err(StoreError::ConfigError { reason }) => {
                    assert!(reason.contains("failed to parse store config TOML"), "{reason}");
                }
                other => panic!("expected ConfigError for {bad:?}, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_config_missing_file() {
        let err = StoreConfig::from_file(std::path::Path::new("/nonexistent/carehub.toml"))
            .unwrap_err();
        assert!(matches!(err, StoreError::ConfigError { .. }));
    }

    // ── Seeds ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_seed_from_json() {
        let seed = Seed::from_json_str(
            r#"{
                "users": [{ "id": "9", "email": "z@x.com", "role": "admin" }],
                "appointments": [{ "id": "1", "type": "checkup" }]
            }"#,
        )
        .unwrap();
        assert_eq!(seed.users.len(), 1);
        assert_eq!(seed.appointments[0].kind.as_deref(), Some("checkup"));
        assert!(seed.medical_records.is_empty());

        assert!(matches!(
            Seed::from_json_str("{ not json"),
            Err(StoreError::ConfigError { .. })
        ));
    }
}
