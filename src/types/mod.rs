//! Wire types for the account and BYOS endpoints.
//!
//! Layout:
//! - `ids.rs`: opaque identifiers and the creation-response envelope
//! - `accounts.rs`: account-creation request body
//! - `byos.rs`: integration and warehouse request/response bodies

pub mod accounts;
pub mod byos;
pub mod ids;

pub use ids::{Created, ResourceId};
