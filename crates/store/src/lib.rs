//! Data store seam: named collections, equality queries, and row-level access
//! policy in front of a pluggable backend.

pub mod backend;
pub mod error;
pub mod guarded;
pub mod policy;
pub mod provisioning;
pub mod query;
pub mod role_lookup;
pub mod table;

pub use backend::{InMemoryBackend, PostgresBackend, RecordBackend};
pub use error::StoreError;
pub use guarded::{Caller, DataStore, GuardedStore};
pub use policy::{Access, Operation};
pub use provisioning::{Registration, assign_role, register_principal};
pub use query::{Filter, Order, Query, Row, maybe_single, row_id};
pub use role_lookup::StoreRoleLookup;
pub use table::Table;
