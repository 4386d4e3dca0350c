//! Storage handle abstractions and the SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow `insert / delete_by_id / find` capability set.
//! - Isolate SQL details from the service layer.
//!
//! # Invariants
//! - Each capability issues exactly one SQL statement.
//! - Query failures and row decode failures stay distinguishable.

pub mod log_store;
