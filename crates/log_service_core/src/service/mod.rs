//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate storage calls into RPC-level operations.
//! - Keep the dispatcher decoupled from storage details.

pub mod log_service;
