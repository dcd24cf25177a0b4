//! Record types for the three collections.
//!
//! Rows travel as camelCase JSON objects on the wire, the same shape the real
//! backend returns. Every named field is optional: a missing field is omitted
//! on serialization, so a filter on it can never match a concrete value.
//! Fields the store does not know about are kept in `extra` rather than
//! dropped, because the store layer does not enforce a field set.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    collection::Collection,
    error::{StoreError, StoreResult},
};

/// The portal role an account signs in as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
    Admin,
}

/// A row in the `users` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Plaintext, as held by the fixtures. Only compared by the sign-in stub.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Doctors only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<String>,
    /// Patients only: the id of the doctor they are linked to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A row in the `appointments` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledVisit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    /// Date or date-time string, e.g. "2024-03-20" or "2024-03-20T10:00".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Free text, e.g. "scheduled", "completed", "cancelled".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Visit category, e.g. "checkup" or "follow-up".
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A row in the `medical_records` collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClinicalRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prescription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// ── Record trait ──────────────────────────────────────────────────────────────

/// Implemented by each typed row so callers can move between `Row` and the
/// concrete struct for the collection they queried.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// The collection rows of this type live in.
    const COLLECTION: Collection;

    fn id(&self) -> Option<&str>;

    fn set_id(&mut self, id: String);

    fn into_row(self) -> Row;

    /// Returns `None` when `row` belongs to a different collection.
    fn from_row(row: Row) -> Option<Self>;
}

impl Record for Account {
    const COLLECTION: Collection = Collection::Users;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn into_row(self) -> Row {
        Row::Account(self)
    }

    fn from_row(row: Row) -> Option<Self> {
        match row {
            Row::Account(account) => Some(account),
            _ => None,
        }
    }
}

impl Record for ScheduledVisit {
    const COLLECTION: Collection = Collection::Appointments;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn into_row(self) -> Row {
        Row::Visit(self)
    }

    fn from_row(row: Row) -> Option<Self> {
        match row {
            Row::Visit(visit) => Some(visit),
            _ => None,
        }
    }
}

impl Record for ClinicalRecord {
    const COLLECTION: Collection = Collection::MedicalRecords;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }

    fn into_row(self) -> Row {
        Row::Clinical(self)
    }

    fn from_row(row: Row) -> Option<Self> {
        match row {
            Row::Clinical(record) => Some(record),
            _ => None,
        }
    }
}

// ── Row ───────────────────────────────────────────────────────────────────────

/// A row from any collection.
///
/// Serializes as the bare record object, so a `Vec<Row>` looks exactly like
/// the JSON array the real backend returns.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Row {
    Account(Account),
    Visit(ScheduledVisit),
    Clinical(ClinicalRecord),
}

impl Row {
    /// Parse a loosely-typed JSON object into a row of `collection`.
    ///
    /// Returns `StoreError::InvalidPayload` when a named field has the wrong
    /// type (e.g. `"age": "forty"`) or `value` is not an object.
    pub fn from_value(collection: Collection, value: Value) -> StoreResult<Self> {
        if !value.is_object() {
            return Err(StoreError::InvalidPayload {
                reason: format!("{} payload must be a JSON object", collection),
            });
        }
        let invalid = |e: serde_json::Error| StoreError::InvalidPayload {
            reason: format!("not a valid {} row: {}", collection, e),
        };
        let row = match collection {
            Collection::Users => Row::Account(serde_json::from_value(value).map_err(invalid)?),
            Collection::Appointments => {
                Row::Visit(serde_json::from_value(value).map_err(invalid)?)
            }
            Collection::MedicalRecords => {
                Row::Clinical(serde_json::from_value(value).map_err(invalid)?)
            }
        };
        Ok(row)
    }

    pub fn collection(&self) -> Collection {
        match self {
            Row::Account(_) => Collection::Users,
            Row::Visit(_) => Collection::Appointments,
            Row::Clinical(_) => Collection::MedicalRecords,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            Row::Account(r) => r.id(),
            Row::Visit(r) => r.id(),
            Row::Clinical(r) => r.id(),
        }
    }

    pub fn set_id(&mut self, id: String) {
        match self {
            Row::Account(r) => r.set_id(id),
            Row::Visit(r) => r.set_id(id),
            Row::Clinical(r) => r.set_id(id),
        }
    }

    /// The row as a JSON object keyed by wire column names.
    pub fn to_object(&self) -> StoreResult<Map<String, Value>> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Backend {
                reason: format!("row serialized to a non-object: {}", other),
            }),
            Err(e) => Err(StoreError::Backend {
                reason: format!("failed to serialize row: {}", e),
            }),
        }
    }

    /// The value of `column`, or `None` when the row does not carry it.
    pub fn column(&self, column: &str) -> StoreResult<Option<Value>> {
        Ok(self.to_object()?.remove(column))
    }

    /// Shallow merge: every key in `patch` overwrites the row's value, every
    /// other field is kept. The result is re-validated as the same record kind.
    pub fn merged(&self, patch: &Map<String, Value>) -> StoreResult<Row> {
        let mut object = self.to_object()?;
        for (key, value) in patch {
            object.insert(key.clone(), value.clone());
        }
        Row::from_value(self.collection(), Value::Object(object))
    }

    /// Convert into the concrete record type, if it matches.
    pub fn into_record<R: Record>(self) -> Option<R> {
        R::from_row(self)
    }
}

/// Keep only the rows of type `R`, converted to that type.
pub fn rows_as<R: Record>(rows: Vec<Row>) -> Vec<R> {
    rows.into_iter().filter_map(R::from_row).collect()
}
