//! slate-core: record store, slot-table scheduler, and access history.
//!
//! The crate is organized leaf-first:
//!
//! - [`model`] — the record kinds, their drafts, and the group aggregate.
//! - [`alloc`] — the per-store identifier allocator.
//! - [`history`] — the recency-ordered access history.
//! - [`intervals`] — the quantized time-slot ownership table.
//! - [`store`] — the record store tying the above together.
//! - [`persist`] — flat-file save/load for a whole store.
//!
//! # Conventions
//!
//! - **Errors**: per-module `thiserror` enums, unified into
//!   [`error::StoreError`] at the store boundary.
//! - **Logging**: `tracing` macros (`debug!`, `warn!`).

pub mod alloc;
pub mod error;
pub mod history;
pub mod intervals;
pub mod model;
pub mod persist;
pub mod store;

pub use error::StoreError;
pub use store::RecordStore;
