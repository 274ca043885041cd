pub mod stock;

pub use stock::*;

use chrono::{SecondsFormat, Utc};

/// Current time as `2026-01-01T12:00:00.000Z`.
pub fn iso_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
