//! # carehub-core
//!
//! Backend traits and the fluent query client for the CareHub data layer.
//!
//! This crate provides:
//! - The two backend seams (`QueryBackend`, `AuthBackend`)
//! - The `Client` that turns `.from().select().eq()` chains into `QuerySpec`s
//!
//! ## Usage
//!
//! ```rust,ignore
//! use carehub_core::Client;
//! use carehub_mock_store::MockStore;
//!
//! let client = Client::new(MockStore::with_fixtures());
//! let doctors = client.from("users").select("*").eq("role", "doctor").await?;
//! ```

pub mod client;
pub mod traits;

pub use client::{AuthClient, Client};
pub use traits::{AuthBackend, QueryBackend};

// ── Tests ─────────────────────────────────────────────────────────────────────
