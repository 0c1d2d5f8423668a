use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::EventRequest;

/// Database model for events table
#[derive(Debug, Clone)]
pub struct EventModel {
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

impl EventModel {
    /// Builds a new event from a validated request
    pub fn new(request: EventRequest, created_by: Uuid) -> Self {
        let now = Utc::now();
        let mut event = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            start_date: now,
            end_date: now,
            description: None,
            creation_date: now,
            creation_by: created_by,
            last_update_date: now,
            last_update_by: created_by,
        };
        event.apply(request, created_by);
        event
    }

    pub fn apply(&mut self, request: EventRequest, updated_by: Uuid) {
        self.name = request.name.trim().to_string();
        if let Some(start_date) = request.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = request.end_date {
            self.end_date = end_date;
        }
        self.description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.last_update_date = Utc::now();
        self.last_update_by = updated_by;
    }

    pub fn is_in_progress(&self, at: DateTime<Utc>) -> bool {
        self.start_date <= at && at <= self.end_date
    }
}
