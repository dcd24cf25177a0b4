//! # carehub-contracts
//!
//! Shared record, query, and error types for the CareHub data layer.
//!
//! Every other crate in the workspace imports from here. No business logic
//! lives in this crate, only data definitions and the row-level helpers the
//! backends share (column lookup, equality filters, shallow merge).

pub mod auth;
pub mod collection;
pub mod error;
pub mod query;
pub mod record;
