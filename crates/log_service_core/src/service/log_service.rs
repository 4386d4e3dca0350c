//! Log record use-case service.
//!
//! # Responsibility
//! - Provide the create/delete/list/list-by-date entry points.
//! - Map request shapes to persisted documents and documents back to wire
//!   records through `model::log`.
//! - Classify storage failures into write, read and decode errors.
//!
//! # Invariants
//! - Every operation issues exactly one storage call.
//! - No retries, fallbacks or cached results.
//! - Record content is never logged.

use crate::config::{ConfigError, ServiceConfig};
use crate::db::{open_db, open_db_in_memory};
use crate::model::log::{self as mapper, LogRecord, Timestamp};
use crate::store::log_store::{LogFilter, LogStore, SqliteLogStore, StoreError};
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type ServiceResult<T> = Result<T, LogServiceError>;

/// Service error for log record operations.
#[derive(Debug)]
pub enum LogServiceError {
    /// Insert or delete failed at the storage layer.
    StorageWrite {
        operation: &'static str,
        source: StoreError,
    },
    /// Find failed at the storage layer.
    StorageRead {
        operation: &'static str,
        source: StoreError,
    },
    /// A stored document could not be mapped back to a wire record.
    Decode {
        operation: &'static str,
        source: StoreError,
    },
}

impl LogServiceError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StorageWrite { .. } => "storage_write",
            Self::StorageRead { .. } => "storage_read",
            Self::Decode { .. } => "decode",
        }
    }

    pub fn operation(&self) -> &'static str {
        match self {
            Self::StorageWrite { operation, .. }
            | Self::StorageRead { operation, .. }
            | Self::Decode { operation, .. } => operation,
        }
    }

    fn write(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::StorageWrite { operation, source }
    }

    fn read(operation: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::Decode { .. } => Self::Decode { operation, source },
            other => Self::StorageRead {
                operation,
                source: other,
            },
        }
    }
}

impl Display for LogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StorageWrite { operation, source } => {
                write!(f, "{operation}: could not write log: {source}")
            }
            Self::StorageRead { operation, source } => {
                write!(f, "{operation}: could not list logs: {source}")
            }
            Self::Decode { operation, source } => {
                write!(f, "{operation}: could not decode log: {source}")
            }
        }
    }
}

impl Error for LogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StorageWrite { source, .. }
            | Self::StorageRead { source, .. }
            | Self::Decode { source, .. } => Some(source),
        }
    }
}

/// Bootstrap error from [`LogService::open`].
#[derive(Debug)]
pub enum ServiceOpenError {
    /// The configuration names an unusable collection.
    Config(ConfigError),
    /// The database could not be opened or prepared.
    Store(StoreError),
}

impl Display for ServiceOpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid service configuration: {err}"),
            Self::Store(err) => write!(f, "failed to open log store: {err}"),
        }
    }
}

impl Error for ServiceOpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<ConfigError> for ServiceOpenError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<StoreError> for ServiceOpenError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Request to create one log record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub name: String,
    pub content: String,
    /// Passed through when set; the server clock is used otherwise.
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl CreateLogRequest {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
            created_at: None,
        }
    }

    pub fn created_at(mut self, created_at: Timestamp) -> Self {
        self.created_at = Some(created_at);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLogResponse {
    pub log: LogRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteLogRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteLogResponse {
    pub id: String,
    pub success: bool,
}

/// Inclusive `created_at` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListLogsByDateRequest {
    pub start_date: Timestamp,
    pub end_date: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListLogsResponse {
    pub logs: Vec<LogRecord>,
}

/// Log record service over a storage handle.
pub struct LogService<S: LogStore> {
    store: S,
}

impl LogService<SqliteLogStore> {
    /// Opens the configured database and collection.
    ///
    /// The collection is resolved here once and fixed for the service lifetime.
    /// Its name is validated before any database is touched.
    pub fn open(config: &ServiceConfig) -> Result<Self, ServiceOpenError> {
        let collection = config.collection_name()?;
        let conn = if config.is_in_memory() {
            open_db_in_memory()
        } else {
            open_db(&config.database_path)
        }
        .map_err(StoreError::from)?;
        info!(
            "event=service_open module=log_service status=ok collection={}",
            collection
        );
        Ok(Self::new(SqliteLogStore::new(conn, collection)?))
    }
}

impl<S: LogStore> LogService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persists a new record.
    ///
    /// # Contract
    /// - `name` and `content` are stored verbatim, empty strings included.
    /// - The returned id is the one the store persisted.
    /// - The returned `created_at` equals the persisted value.
    pub fn create_log(&self, request: &CreateLogRequest) -> ServiceResult<CreateLogResponse> {
        const OPERATION: &str = "create_log";
        let started_at = Instant::now();

        let created_at = request.created_at.unwrap_or_else(Timestamp::now);
        let document =
            mapper::to_persisted(request.name.as_str(), request.content.as_str(), created_at);

        let result = self
            .store
            .insert(&document)
            .map_err(LogServiceError::write(OPERATION))
            .map(|id| {
                let mut record = mapper::to_wire(document);
                record.id = id;
                CreateLogResponse { log: record }
            });

        match &result {
            Ok(response) => info!(
                "event={} module=log_service status=ok duration_ms={} id={}",
                OPERATION,
                started_at.elapsed().as_millis(),
                response.log.id
            ),
            Err(err) => log_failure(err, started_at),
        }
        result
    }

    /// Removes a record by id.
    ///
    /// Reports `success = true` whenever the store call succeeds, whether or
    /// not a record with that id existed.
    pub fn delete_log(&self, request: &DeleteLogRequest) -> ServiceResult<DeleteLogResponse> {
        const OPERATION: &str = "delete_log";
        let started_at = Instant::now();

        let result = self
            .store
            .delete_by_id(request.id.as_str())
            .map_err(LogServiceError::write(OPERATION))
            .map(|()| DeleteLogResponse {
                id: request.id.clone(),
                success: true,
            });

        match &result {
            Ok(_) => info!(
                "event={} module=log_service status=ok duration_ms={} id={}",
                OPERATION,
                started_at.elapsed().as_millis(),
                request.id
            ),
            Err(err) => log_failure(err, started_at),
        }
        result
    }

    /// Returns every record in the collection.
    pub fn list_logs(&self) -> ServiceResult<ListLogsResponse> {
        self.find("list_logs", &LogFilter::all())
    }

    /// Returns records with `start_date <= created_at <= end_date`.
    ///
    /// A reversed window yields an empty list.
    pub fn list_logs_by_date(
        &self,
        request: &ListLogsByDateRequest,
    ) -> ServiceResult<ListLogsResponse> {
        let filter = LogFilter::created_between(request.start_date, request.end_date);
        self.find("list_logs_by_date", &filter)
    }

    fn find(&self, operation: &'static str, filter: &LogFilter) -> ServiceResult<ListLogsResponse> {
        let started_at = Instant::now();

        let result = self
            .store
            .find(filter)
            .map_err(LogServiceError::read(operation))
            .map(|documents| ListLogsResponse {
                logs: documents.into_iter().map(mapper::to_wire).collect(),
            });

        match &result {
            Ok(response) => info!(
                "event={} module=log_service status=ok duration_ms={} count={}",
                operation,
                started_at.elapsed().as_millis(),
                response.logs.len()
            ),
            Err(err) => log_failure(err, started_at),
        }
        result
    }
}

fn log_failure(err: &LogServiceError, started_at: Instant) {
    error!(
        "event={} module=log_service status=error duration_ms={} error_code={} error={}",
        err.operation(),
        started_at.elapsed().as_millis(),
        err.code(),
        err
    );
}
