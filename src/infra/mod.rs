pub mod file_source;
pub mod rest_source;

pub use file_source::FileSnapshotSource;
pub use rest_source::RestSnapshotSource;

use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::RawRecord;
use crate::error::{FacetError, Result};
use crate::metrics::FacetMetrics;

/// Decode a snapshot payload: either a bare JSON array of rows or the
/// `{ "success": .., "data": [..] }` envelope of the venues API.
///
/// Rows without an identity or without usable coordinates are dropped here;
/// nothing downstream has to cope with them.
pub fn decode_snapshot(bytes: &[u8]) -> Result<Vec<RawRecord>> {
    let rows = match serde_json::from_slice::<Value>(bytes)? {
        Value::Array(rows) => rows,
        Value::Object(mut envelope) => {
            if envelope.get("success") == Some(&Value::Bool(false)) {
                let message = envelope
                    .get("error")
                    .and_then(Value::as_str)
                    .unwrap_or("source reported failure")
                    .to_string();
                return Err(FacetError::Source { message });
            }
            match envelope.remove("data") {
                Some(Value::Array(rows)) => rows,
                _ => {
                    return Err(FacetError::Source {
                        message: "expected an object with a `data` array".to_string(),
                    })
                }
            }
        }
        _ => {
            return Err(FacetError::Source {
                message: "expected a JSON array of records".to_string(),
            })
        }
    };

    let total = rows.len();
    let mut records = Vec::with_capacity(total);
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(row) {
            Ok(record) if record.has_coordinates() => records.push(record),
            Ok(record) => debug!(venue_id = record.venue_id, "Dropping row without coordinates"),
            Err(e) => debug!(index, error = %e, "Dropping malformed row"),
        }
    }

    let dropped = total - records.len();
    if dropped > 0 {
        warn!(
            "Dropped {} of {} snapshot rows missing identity or coordinates",
            dropped, total
        );
        FacetMetrics::record_records_dropped(dropped);
    }
    Ok(records)
}
