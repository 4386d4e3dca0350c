//! Core logic for the log record service.
//! Record shapes, storage handle and the four log operations live here;
//! process wiring stays in the CLI crate.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod rpc;
pub mod service;
pub mod store;

pub use config::{CollectionName, ConfigError, ServiceConfig};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::log::{new_identifier, LogDocument, LogRecord, Timestamp};
pub use rpc::{dispatch, dispatch_line, RpcError, RpcRequest, RpcResponse};
pub use service::log_service::{
    CreateLogRequest, CreateLogResponse, DeleteLogRequest, DeleteLogResponse,
    ListLogsByDateRequest, ListLogsResponse, LogService, LogServiceError, ServiceOpenError,
    ServiceResult,
};
pub use store::log_store::{LogFilter, LogStore, SqliteLogStore, StoreError, StoreResult};

/// Minimal liveness check for bootstrap health wiring.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
