use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::PatronRequest;

/// Database model for patrons table
#[derive(Debug, Clone)]
pub struct PatronModel {
    pub id: Uuid,
    pub member_id: i32, // Printed on the member card and scanned at events
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub primary_phone: String,
    pub secondary_phone: Option<String>,
    pub email: Option<String>,
    pub enrollment_date: DateTime<Utc>,
    pub creation_date: DateTime<Utc>,
    pub creation_by: Uuid,
    pub last_update_date: DateTime<Utc>,
    pub last_update_by: Uuid,
}

impl PatronModel {
    /// Builds a new patron from a validated request
    pub fn new(request: PatronRequest, created_by: Uuid) -> Self {
        let now = Utc::now();
        let mut patron = Self {
            id: Uuid::new_v4(),
            member_id: 0,
            first_name: String::new(),
            last_name: String::new(),
            address: String::new(),
            primary_phone: String::new(),
            secondary_phone: None,
            email: None,
            enrollment_date: now,
            creation_date: now,
            creation_by: created_by,
            last_update_date: now,
            last_update_by: created_by,
        };
        patron.apply(request, created_by);
        patron
    }

    /// Replaces the editable fields from a validated request
    pub fn apply(&mut self, request: PatronRequest, updated_by: Uuid) {
        let PatronRequest {
            member_id,
            first_name,
            last_name,
            address,
            primary_phone,
            secondary_phone,
            email,
            enrollment_date,
        } = request;

        self.member_id = member_id.unwrap_or(self.member_id);
        self.first_name = first_name.trim().to_string();
        self.last_name = last_name.trim().to_string();
        self.address = address.trim().to_string();
        self.primary_phone = primary_phone.trim().to_string();
        self.secondary_phone = non_blank(secondary_phone);
        self.email = non_blank(email);
        if let Some(enrollment_date) = enrollment_date {
            self.enrollment_date = enrollment_date;
        }
        self.last_update_date = Utc::now();
        self.last_update_by = updated_by;
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
