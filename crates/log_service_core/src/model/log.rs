//! Log record model and persisted-form mapping.
//!
//! # Responsibility
//! - Define the wire record returned to RPC callers (`LogRecord`).
//! - Define the persisted document stored in a collection (`LogDocument`).
//! - Convert between both shapes and generate record identifiers.
//!
//! # Invariants
//! - `LogDocument::id` is generated once here and never recomputed.
//! - `updated_at` never leaves the persisted shape.
//! - Persisted timestamps keep full nanosecond precision as normalized
//!   `(seconds, nanos)` pairs.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: i64 = 1_000_000;
const MILLIS_PER_SECOND: i64 = 1_000;

/// Wire timestamp, shaped like the protobuf well-known `Timestamp`.
///
/// `nanos` is expected in `0..1_000_000_000`; [`Timestamp::normalized`]
/// carries out-of-range values into `seconds`. Ordering is only meaningful
/// between normalized values.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Timestamp {
    pub seconds: i64,
    #[serde(default)]
    pub nanos: i32,
}

impl Timestamp {
    /// Builds a timestamp from Unix epoch milliseconds.
    pub fn from_millis(millis: i64) -> Self {
        let seconds = millis.div_euclid(MILLIS_PER_SECOND);
        let sub_millis = millis.rem_euclid(MILLIS_PER_SECOND);
        Self {
            seconds,
            // Bounded by 999_000_000, always fits.
            nanos: (sub_millis * NANOS_PER_MILLI) as i32,
        }
    }

    /// Current wall-clock time.
    ///
    /// Clocks set before the Unix epoch collapse to the epoch.
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            seconds: i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX),
            nanos: elapsed.subsec_nanos() as i32,
        }
    }

    /// Same instant with `nanos` in `0..1_000_000_000`.
    ///
    /// Already-normalized values are returned unchanged. Seconds saturate at
    /// the `i64` bounds.
    pub fn normalized(self) -> Self {
        let per_second = i128::from(NANOS_PER_SECOND);
        let total_nanos = i128::from(self.seconds) * per_second + i128::from(self.nanos);
        let seconds = total_nanos.div_euclid(per_second);
        match i64::try_from(seconds) {
            Ok(seconds) => Self {
                seconds,
                // Bounded by NANOS_PER_SECOND, always fits.
                nanos: total_nanos.rem_euclid(per_second) as i32,
            },
            Err(_) if seconds < 0 => Self {
                seconds: i64::MIN,
                nanos: 0,
            },
            Err(_) => Self {
                seconds: i64::MAX,
                nanos: (NANOS_PER_SECOND - 1) as i32,
            },
        }
    }
}

/// Log record as exposed at the RPC boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub id: String,
    pub name: String,
    pub content: String,
    pub created_at: Timestamp,
}

/// Log record as stored in a collection.
///
/// Field names mirror the stored document keys; `content` is stored as `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogDocument {
    pub id: String,
    pub name: String,
    #[serde(rename = "data")]
    pub content: String,
    /// Immutable after insert.
    pub created_at: Timestamp,
    /// Written at insert only.
    pub updated_at: Timestamp,
}

/// Stored document keys, shared with storage implementations.
pub mod fields {
    pub const ID: &str = "id";
    pub const NAME: &str = "name";
    pub const CONTENT: &str = "data";
    /// Unix epoch seconds; sub-second part lives in `CREATED_AT_NANOS`.
    pub const CREATED_AT: &str = "created_at";
    pub const CREATED_AT_NANOS: &str = "created_at_nanos";
    pub const UPDATED_AT: &str = "updated_at";
    pub const UPDATED_AT_NANOS: &str = "updated_at_nanos";
}

/// Returns a new globally unique record identifier.
pub fn new_identifier() -> String {
    Uuid::new_v4().to_string()
}

/// Maps caller-supplied fields to a new persisted document.
///
/// `created_at` also seeds `updated_at`; callers resolve pass-through vs.
/// server time before calling.
pub fn to_persisted(
    name: impl Into<String>,
    content: impl Into<String>,
    created_at: Timestamp,
) -> LogDocument {
    let created_at = created_at.normalized();
    LogDocument {
        id: new_identifier(),
        name: name.into(),
        content: content.into(),
        created_at,
        updated_at: created_at,
    }
}

/// Maps a persisted document to its wire representation.
pub fn to_wire(document: LogDocument) -> LogRecord {
    LogRecord {
        id: document.id,
        name: document.name,
        content: document.content,
        created_at: document.created_at,
    }
}
