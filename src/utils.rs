use chrono::{TimeZone, Utc};

/// Scores are shown with one decimal.
pub fn format_score(score: f64) -> String {
    format!("{:.1}", score)
}

pub fn format_timestamp(ts: i64) -> String {
    match Utc.timestamp_opt(ts, 0).single() {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M UTC").to_string(),
        None => ts.to_string(),
    }
}

/// Backend timestamps come as integer or fractional seconds.
pub fn floor_timestamp(ts: f64) -> i64 {
    ts.floor() as i64
}
