use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::AppError;

/// Query string for GET /v1/reports/event/master
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl ReportQuery {
    /// Parses both bounds, reporting every bad parameter at once
    pub fn range(&self) -> Result<(DateTime<Utc>, DateTime<Utc>), AppError> {
        let start = parse_bound("startTime", "Start Time", self.start_time.as_deref(), false);
        let end = parse_bound("endTime", "End Time", self.end_time.as_deref(), true);

        match (start, end) {
            (Ok(start), Ok(end)) => Ok((start, end)),
            (Err(AppError::Validation(mut errors)), Err(AppError::Validation(more))) => {
                errors.extend(more);
                Err(AppError::Validation(errors))
            }
            (Err(e), _) | (_, Err(e)) => Err(e),
        }
    }
}

/// Accepts RFC 3339, `YYYY-MM-DD` or `M/D/YYYY`. A bare date used as an end
/// bound covers the whole day.
fn parse_bound(
    field: &str,
    label: &str,
    value: Option<&str>,
    end_of_day: bool,
) -> Result<DateTime<Utc>, AppError> {
    let value = value.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::field(
            field,
            format!("The {} field is required.", label),
        ));
    }

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }

    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(value, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| {
            let start = midnight.and_utc();
            if end_of_day {
                start + Duration::days(1) - Duration::nanoseconds(1)
            } else {
                start
            }
        })
        .ok_or_else(|| {
            AppError::field(
                field,
                format!("The {} field is not a valid date.", label),
            )
        })
}

/// Visit count for one service at an event
#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceVisits {
    pub service_id: Uuid,
    pub name: String,
    pub visits: u64,
}

/// Attendance summary for one event
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub total_visits: u64, // Check-ins only
    pub services: Vec<ServiceVisits>,
}
