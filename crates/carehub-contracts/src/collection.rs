//! The named tables the store knows about.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three in-memory collections.
///
/// Table names match the real backend so callers can address either one with
/// the same strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    /// Accounts for doctors, patients, and admins.
    Users,
    /// Scheduled visits between a patient and a doctor.
    Appointments,
    /// Clinical records written by a doctor for a patient.
    MedicalRecords,
}

impl Collection {
    /// Every known collection, in a stable order.
    pub const ALL: [Collection; 3] = [
        Collection::Users,
        Collection::Appointments,
        Collection::MedicalRecords,
    ];

    /// The table name callers pass to `from()`.
    pub fn table_name(self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Appointments => "appointments",
            Collection::MedicalRecords => "medical_records",
        }
    }

    /// Resolve a table name. Unknown names return `None`; the store treats
    /// them as permanently empty tables rather than failing.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.table_name() == name)
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}
