use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Database model for scans table.
///
/// A scan without a service is a plain check-in to the event. Scans are keyed
/// by (event, patron, service).
#[derive(Debug, Clone, PartialEq)]
pub struct ScanModel {
    pub event_id: Uuid,
    pub patron_id: Uuid,
    pub service_id: Option<Uuid>,
    pub scan_date: DateTime<Utc>,
    pub scan_by: Uuid,
}

impl ScanModel {
    pub fn new(event_id: Uuid, patron_id: Uuid, service_id: Option<Uuid>, scan_by: Uuid) -> Self {
        Self {
            event_id,
            patron_id,
            service_id,
            scan_date: Utc::now(),
            scan_by,
        }
    }

    pub fn is_check_in(&self) -> bool {
        self.service_id.is_none()
    }

    pub fn key(&self) -> (Uuid, Uuid, Option<Uuid>) {
        (self.event_id, self.patron_id, self.service_id)
    }
}
