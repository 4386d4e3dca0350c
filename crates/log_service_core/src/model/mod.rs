//! Log record model shared by storage and service layers.
//!
//! # Responsibility
//! - Define the wire and persisted record shapes.
//! - Keep mapping between them free of storage and transport details.

pub mod log;
