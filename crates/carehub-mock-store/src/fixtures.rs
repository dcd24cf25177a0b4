//! Seed data for the mock store.
//!
//! All data in this module is hardcoded and fictional. `Seed::fixtures()`
//! builds a fresh copy on every call and the store takes it by value, so
//! nothing a store does can leak back into another store's starting state.

use std::path::Path;

use serde::{Deserialize, Serialize};

use carehub_contracts::{
    error::{StoreError, StoreResult},
    record::{Account, ClinicalRecord, Role, ScheduledVisit},
};

/// The initial contents of all three collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<Account>,
    pub appointments: Vec<ScheduledVisit>,
    pub medical_records: Vec<ClinicalRecord>,
}

impl Seed {
    /// No rows in any collection.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in development data set: two doctors, two patients, one
    /// admin, their visits, and their clinical records.
    pub fn fixtures() -> Self {
        Self {
            users: vec![
                doctor("1", "Dr. Sarah Johnson", "sarah.johnson@carehub.example", "Cardiology"),
                doctor("2", "Dr. Michael Chen", "michael.chen@carehub.example", "Endocrinology"),
                patient(
                    "3",
                    "John Smith",
                    "john.smith@carehub.example",
                    "1",
                    45,
                    "male",
                    &["Hypertension", "High Cholesterol"],
                ),
                patient(
                    "4",
                    "Emily Davis",
                    "emily.davis@carehub.example",
                    "2",
                    32,
                    "female",
                    &["Type 2 Diabetes"],
                ),
                Account {
                    id: Some("5".to_string()),
                    email: Some("admin@carehub.example".to_string()),
                    password: Some("admin123".to_string()),
                    name: Some("Admin User".to_string()),
                    role: Some(Role::Admin),
                    ..Default::default()
                },
            ],
            appointments: vec![
                visit(
                    "1",
                    "3",
                    "1",
                    "2024-03-15T10:00",
                    "scheduled",
                    "checkup",
                    "Routine blood pressure review",
                ),
                visit(
                    "2",
                    "4",
                    "2",
                    "2024-03-16T14:30",
                    "scheduled",
                    "follow-up",
                    "Review HbA1c results",
                ),
                visit(
                    "3",
                    "3",
                    "1",
                    "2024-02-01T09:00",
                    "completed",
                    "consultation",
                    "Initial cardiology consultation",
                ),
            ],
            medical_records: vec![
                ClinicalRecord {
                    id: Some("1".to_string()),
                    patient_id: Some("3".to_string()),
                    doctor_id: Some("1".to_string()),
                    date: Some("2024-02-01".to_string()),
                    diagnosis: Some("Hypertension, stage 1".to_string()),
                    prescription: Some("Lisinopril 10 mg once daily".to_string()),
                    notes: Some("Reduce sodium intake; recheck in six weeks".to_string()),
                    ..Default::default()
                },
                ClinicalRecord {
                    id: Some("2".to_string()),
                    patient_id: Some("4".to_string()),
                    doctor_id: Some("2".to_string()),
                    date: Some("2024-01-20".to_string()),
                    diagnosis: Some("Type 2 diabetes mellitus".to_string()),
                    prescription: Some("Metformin 500 mg twice daily".to_string()),
                    notes: Some("Diet and exercise counselling provided".to_string()),
                    ..Default::default()
                },
            ],
        }
    }

    /// Parse a seed from JSON with `users`, `appointments`, and
    /// `medical_records` arrays. Missing arrays are empty.
    pub fn from_json_str(s: &str) -> StoreResult<Self> {
        serde_json::from_str(s).map_err(|e| StoreError::ConfigError {
            reason: format!("failed to parse seed JSON: {}", e),
        })
    }

    pub fn from_file(path: &Path) -> StoreResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoreError::ConfigError {
            reason: format!("failed to read seed file '{}': {}", path.display(), e),
        })?;
        Self::from_json_str(&contents)
    }
}

// ── Builders ──────────────────────────────────────────────────────────────────

fn doctor(id: &str, name: &str, email: &str, specialization: &str) -> Account {
    Account {
        id: Some(id.to_string()),
        email: Some(email.to_string()),
        password: Some("doctor123".to_string()),
        name: Some(name.to_string()),
        role: Some(Role::Doctor),
        specialization: Some(specialization.to_string()),
        ..Default::default()
    }
}

fn patient(
    id: &str,
    name: &str,
    email: &str,
    doctor_id: &str,
    age: u32,
    gender: &str,
    conditions: &[&str],
) -> Account {
    Account {
        id: Some(id.to_string()),
        email: Some(email.to_string()),
        password: Some("patient123".to_string()),
        name: Some(name.to_string()),
        role: Some(Role::Patient),
        doctor_id: Some(doctor_id.to_string()),
        age: Some(age),
        gender: Some(gender.to_string()),
        conditions: Some(conditions.iter().map(|c| c.to_string()).collect()),
        ..Default::default()
    }
}

fn visit(
    id: &str,
    patient_id: &str,
    doctor_id: &str,
    date: &str,
    status: &str,
    kind: &str,
    notes: &str,
) -> ScheduledVisit {
    ScheduledVisit {
        id: Some(id.to_string()),
        patient_id: Some(patient_id.to_string()),
        doctor_id: Some(doctor_id.to_string()),
        date: Some(date.to_string()),
        status: Some(status.to_string()),
        kind: Some(kind.to_string()),
        notes: Some(notes.to_string()),
        ..Default::default()
    }
}
