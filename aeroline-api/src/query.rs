use aeroline_core::ValidationErrors;
use chrono::{DateTime, Utc};

use crate::error::AppError;

/// Timestamp layout used by list and detail views.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format(DATETIME_FORMAT).to_string()
}

/// Parses a comma-separated id list such as `"1,2,3"`. An absent or empty
/// parameter means no filter.
pub fn parse_ids(field: &str, raw: Option<&str>) -> Result<Vec<i64>, AppError> {
    let Some(raw) = raw.filter(|raw| !raw.trim().is_empty()) else {
        return Ok(Vec::new());
    };

    raw.split(',')
        .map(|part| {
            part.trim().parse::<i64>().map_err(|_| {
                AppError::ValidationError(ValidationErrors::single(
                    field,
                    format!("\"{}\" is not a valid id.", part.trim()),
                ))
            })
        })
        .collect()
}
