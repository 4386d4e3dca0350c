//! Collection layout and version guard.
//!
//! # Invariants
//! - `LAYOUT_VERSION` only grows; there is no migration path between layouts.
//! - Collection DDL is idempotent.

use super::{DbError, DbResult};
use crate::config::CollectionName;
use crate::model::log::fields;
use rusqlite::Connection;

/// Storage layout version written by this binary.
pub const LAYOUT_VERSION: u32 = 1;

/// Stamps fresh databases and rejects ones written by a newer layout.
pub fn check_layout_version(conn: &Connection) -> DbResult<()> {
    let current = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;

    if current > LAYOUT_VERSION {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: current,
            latest_supported: LAYOUT_VERSION,
        });
    }

    if current < LAYOUT_VERSION {
        conn.execute_batch(&format!("PRAGMA user_version = {LAYOUT_VERSION};"))?;
    }

    Ok(())
}

/// Creates the collection table and its `(created_at, created_at_nanos)`
/// index when missing.
pub fn ensure_collection(conn: &Connection, collection: &CollectionName) -> DbResult<()> {
    conn.execute_batch(&format!(
        "CREATE TABLE IF NOT EXISTS {table} (
            {id} TEXT PRIMARY KEY NOT NULL,
            {name} TEXT NOT NULL,
            {content} TEXT NOT NULL,
            {created_at} INTEGER NOT NULL,
            {created_at_nanos} INTEGER NOT NULL,
            {updated_at} INTEGER NOT NULL,
            {updated_at_nanos} INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_{table}_{created_at}
            ON {table} ({created_at}, {created_at_nanos});",
        table = collection.as_str(),
        id = fields::ID,
        name = fields::NAME,
        content = fields::CONTENT,
        created_at = fields::CREATED_AT,
        created_at_nanos = fields::CREATED_AT_NANOS,
        updated_at = fields::UPDATED_AT,
        updated_at_nanos = fields::UPDATED_AT_NANOS,
    ))?;
    Ok(())
}
