use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::types::ServiceRequest;

/// Database model for services table
#[derive(Debug, Clone)]
pub struct ServiceModel {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub limit: Option<i32>, // Max uses per event; None means unlimited
    pub creation_date: DateTime<Utc>,
    pub creation_by: Uuid,
    pub last_update_date: DateTime<Utc>,
    pub last_update_by: Uuid,
}

impl ServiceModel {
    pub fn new(request: ServiceRequest, created_by: Uuid) -> Self {
        let now = Utc::now();
        let mut service = Self {
            id: Uuid::new_v4(),
            name: String::new(),
            description: None,
            limit: None,
            creation_date: now,
            creation_by: created_by,
            last_update_date: now,
            last_update_by: created_by,
        };
        service.apply(request, created_by);
        service
    }

    pub fn apply(&mut self, request: ServiceRequest, updated_by: Uuid) {
        self.name = request.name.trim().to_string();
        self.description = request
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.limit = request.limit;
        self.last_update_date = Utc::now();
        self.last_update_by = updated_by;
    }

    pub fn is_exhausted(&self, uses: u64) -> bool {
        self.limit.map_or(false, |limit| uses >= limit as u64)
    }
}
