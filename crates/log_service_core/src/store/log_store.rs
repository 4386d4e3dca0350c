//! Log collection storage contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist, remove and query `LogDocument`s in one collection.
//! - Translate `LogFilter` predicates into bound SQL parameters.
//!
//! # Invariants
//! - The collection is fixed at construction.
//! - `delete_by_id` never reports whether a row existed.
//! - Read paths reject malformed rows instead of masking them.

use crate::config::CollectionName;
use crate::db::{ensure_collection, DbError};
use crate::model::log::{fields, LogDocument, Timestamp};
use rusqlite::types::{FromSql, Value};
use rusqlite::{params, params_from_iter, Connection, InterruptHandle, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

pub type StoreResult<T> = Result<T, StoreError>;

/// Storage error for log collection operations.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A stored row could not be read back as a `LogDocument`.
    Decode {
        column: &'static str,
        source: rusqlite::Error,
    },
    LockPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Decode { column, source } => {
                write!(f, "invalid persisted log data in `{column}`: {source}")
            }
            Self::LockPoisoned => write!(f, "storage connection lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Decode { source, .. } => Some(source),
            Self::LockPoisoned => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Find predicate over a log collection.
///
/// Bounds are inclusive and compared at full `(seconds, nanos)` precision.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFilter {
    pub created_from: Option<Timestamp>,
    pub created_to: Option<Timestamp>,
}

impl LogFilter {
    /// Matches every document.
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches `start <= created_at <= end`.
    pub fn created_between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            created_from: Some(start.normalized()),
            created_to: Some(end.normalized()),
        }
    }
}

/// Storage capability set consumed by the log service.
pub trait LogStore {
    /// Inserts one document and returns the identifier the store persisted.
    fn insert(&self, document: &LogDocument) -> StoreResult<String>;
    /// Removes the document with `id`, if any.
    fn delete_by_id(&self, id: &str) -> StoreResult<()>;
    /// Returns every document matching `filter`.
    fn find(&self, filter: &LogFilter) -> StoreResult<Vec<LogDocument>>;
}

/// SQLite-backed log collection.
///
/// The connection is owned behind a mutex so one store can be shared across
/// threads; SQLite statements are the atomicity unit.
pub struct SqliteLogStore {
    conn: Mutex<Connection>,
    interrupt: InterruptHandle,
    collection: CollectionName,
    insert_sql: String,
    delete_sql: String,
    select_sql: String,
}

impl SqliteLogStore {
    /// Wraps an open connection and creates the collection when missing.
    pub fn new(conn: Connection, collection: CollectionName) -> StoreResult<Self> {
        ensure_collection(&conn, &collection)?;

        let table = collection.as_str();
        let insert_sql = format!(
            "INSERT INTO {table} ({}, {}, {}, {}, {}, {}, {})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {};",
            fields::ID,
            fields::NAME,
            fields::CONTENT,
            fields::CREATED_AT,
            fields::CREATED_AT_NANOS,
            fields::UPDATED_AT,
            fields::UPDATED_AT_NANOS,
            fields::ID,
        );
        let delete_sql = format!("DELETE FROM {table} WHERE {} = ?1;", fields::ID);
        let select_sql = format!(
            "SELECT {}, {}, {}, {}, {}, {}, {} FROM {table}",
            fields::ID,
            fields::NAME,
            fields::CONTENT,
            fields::CREATED_AT,
            fields::CREATED_AT_NANOS,
            fields::UPDATED_AT,
            fields::UPDATED_AT_NANOS,
        );

        Ok(Self {
            interrupt: conn.get_interrupt_handle(),
            conn: Mutex::new(conn),
            collection,
            insert_sql,
            delete_sql,
            select_sql,
        })
    }

    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Handle that aborts the statement currently running on this store.
    ///
    /// Safe to trigger from any thread; the interrupted call returns an error
    /// and later calls proceed normally.
    pub fn interrupt_handle(&self) -> &InterruptHandle {
        &self.interrupt
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl LogStore for SqliteLogStore {
    fn insert(&self, document: &LogDocument) -> StoreResult<String> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&self.insert_sql)?;
        let id = stmt.query_row(
            params![
                document.id.as_str(),
                document.name.as_str(),
                document.content.as_str(),
                document.created_at.seconds,
                document.created_at.nanos,
                document.updated_at.seconds,
                document.updated_at.nanos,
            ],
            |row| row.get::<_, String>(0),
        )?;
        Ok(id)
    }

    fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&self.delete_sql)?;
        stmt.execute([id])?;
        Ok(())
    }

    fn find(&self, filter: &LogFilter) -> StoreResult<Vec<LogDocument>> {
        let mut sql = format!("{} WHERE 1 = 1", self.select_sql);
        let mut bind_values: Vec<Value> = Vec::new();

        // Row-value comparison keeps (seconds, nanos) ordering lexicographic.
        if let Some(start) = filter.created_from {
            sql.push_str(&format!(
                " AND ({}, {}) >= (?, ?)",
                fields::CREATED_AT,
                fields::CREATED_AT_NANOS
            ));
            bind_values.push(Value::Integer(start.seconds));
            bind_values.push(Value::Integer(i64::from(start.nanos)));
        }
        if let Some(end) = filter.created_to {
            sql.push_str(&format!(
                " AND ({}, {}) <= (?, ?)",
                fields::CREATED_AT,
                fields::CREATED_AT_NANOS
            ));
            bind_values.push(Value::Integer(end.seconds));
            bind_values.push(Value::Integer(i64::from(end.nanos)));
        }
        sql.push_str(&format!(
            " ORDER BY {} ASC, {} ASC, {} ASC;",
            fields::CREATED_AT,
            fields::CREATED_AT_NANOS,
            fields::ID
        ));

        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut documents = Vec::new();

        while let Some(row) = rows.next()? {
            documents.push(parse_log_row(row)?);
        }

        Ok(documents)
    }
}

fn parse_log_row(row: &Row<'_>) -> StoreResult<LogDocument> {
    Ok(LogDocument {
        id: column(row, fields::ID)?,
        name: column(row, fields::NAME)?,
        content: column(row, fields::CONTENT)?,
        created_at: Timestamp {
            seconds: column(row, fields::CREATED_AT)?,
            nanos: column(row, fields::CREATED_AT_NANOS)?,
        },
        updated_at: Timestamp {
            seconds: column(row, fields::UPDATED_AT)?,
            nanos: column(row, fields::UPDATED_AT_NANOS)?,
        },
    })
}

fn column<T: FromSql>(row: &Row<'_>, name: &'static str) -> StoreResult<T> {
    row.get(name).map_err(|source| StoreError::Decode {
        column: name,
        source,
    })
}
