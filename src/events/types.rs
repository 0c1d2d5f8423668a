use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::EventModel;
use crate::pagination::{Page, SortOrder};
use crate::shared::AppError;
use crate::validation::Validator;

/// Request payload for creating or replacing an event
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[serde(default)]
    pub name: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub description: Option<String>,
}

impl EventRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut validator = Validator::new();
        validator
            .required("name", "Name", &self.name)
            .present("startDate", "Start Date", &self.start_date)
            .present("endDate", "End Date", &self.end_date);

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            validator.check(
                end > start,
                "endDate",
                "The End Date must be after the Start Date.",
            );
        }

        validator.finish()
    }
}

/// Query string for GET /v1/events
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListQuery {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub order_by: Option<String>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

impl EventListQuery {
    pub fn page(&self) -> Result<Page, AppError> {
        let order = SortOrder::from_param(self.order_by.as_deref())?;
        Page::from_parts(self.offset, self.limit, order)
    }

    pub fn filter(&self) -> EventFilter {
        EventFilter {
            date_start: self.date_start,
            date_end: self.date_end,
        }
    }
}

/// Inclusive bounds on an event's start date
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    pub date_start: Option<DateTime<Utc>>,
    pub date_end: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn matches(&self, event: &EventModel) -> bool {
        self.date_start.map_or(true, |start| event.start_date >= start)
            && self.date_end.map_or(true, |end| event.start_date <= end)
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: Uuid,
    pub name: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub description: Option<String>,
    pub creation_date: DateTime<Utc>,
    pub creation_by: Uuid,
    pub last_update_date: DateTime<Utc>,
    pub last_update_by: Uuid,
}

impl From<EventModel> for EventResponse {
    fn from(value: EventModel) -> Self {
        let EventModel {
            id,
            name,
            start_date,
            end_date,
            description,
            creation_date,
            creation_by,
            last_update_date,
            last_update_by,
        } = value;
        Self {
            id,
            name,
            start_date,
            end_date,
            description,
            creation_date,
            creation_by,
            last_update_date,
            last_update_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_missing_fields() {
        let request: EventRequest = serde_json::from_str("{}").unwrap();
        match request.validate() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors["name"], "The Name field is required.");
                assert_eq!(errors["startDate"], "The Start Date field is required.");
                assert_eq!(errors["endDate"], "The End Date field is required.");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_end_before_start() {
        let now = Utc::now();
        let request = EventRequest {
            name: "Backwards".to_string(),
            start_date: Some(now),
            end_date: Some(now - Duration::hours(1)),
            description: None,
        };

        match request.validate() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors["endDate"], "The End Date must be after the Start Date.");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_filter_bounds_are_inclusive() {
        let now = Utc::now();
        let event = EventModel::new(
            EventRequest {
                name: "e".to_string(),
                start_date: Some(now),
                end_date: Some(now + Duration::hours(1)),
                description: None,
            },
            Uuid::new_v4(),
        );

        let filter = EventFilter {
            date_start: Some(now),
            date_end: Some(now),
        };
        assert!(filter.matches(&event));
        assert!(EventFilter::default().matches(&event));

        let later = EventFilter {
            date_start: Some(now + Duration::seconds(1)),
            date_end: None,
        };
        assert!(!later.matches(&event));
    }
}
