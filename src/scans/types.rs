use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::models::ScanModel;
use crate::shared::AppError;
use crate::validation::Validator;

/// Request payload for POST /v1/scans
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub event_id: Option<Uuid>,
    pub member_id: Option<i32>,
    pub service_id: Option<Uuid>,
}

impl ScanRequest {
    /// Returns the event and member IDs once both are present
    pub fn validate(&self) -> Result<(Uuid, i32), AppError> {
        let mut validator = Validator::new();
        validator
            .present("eventId", "Event Id", &self.event_id)
            .present("memberId", "Member Id", &self.member_id);
        validator.finish()?;

        match (self.event_id, self.member_id) {
            (Some(event_id), Some(member_id)) => Ok((event_id, member_id)),
            _ => Err(AppError::Internal),
        }
    }
}

/// Optional filters for listing scans; unset fields match everything
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanFilter {
    pub event_id: Option<Uuid>,
    pub patron_id: Option<Uuid>,
    pub service_id: Option<Uuid>,
}

impl ScanFilter {
    pub fn for_event(event_id: Uuid) -> Self {
        Self {
            event_id: Some(event_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, scan: &ScanModel) -> bool {
        self.event_id.map_or(true, |id| scan.event_id == id)
            && self.patron_id.map_or(true, |id| scan.patron_id == id)
            && self.service_id.map_or(true, |id| scan.service_id == Some(id))
    }
}

/// Query string for DELETE /v1/scans/:event_id/:patron_id
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDeleteQuery {
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub event_id: Uuid,
    pub patron_id: Uuid,
    pub service_id: Option<Uuid>,
    pub scan_date: DateTime<Utc>,
    pub scan_by: Uuid,
}

impl From<ScanModel> for ScanResponse {
    fn from(value: ScanModel) -> Self {
        Self {
            event_id: value.event_id,
            patron_id: value.patron_id,
            service_id: value.service_id,
            scan_date: value.scan_date,
            scan_by: value.scan_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_ids() {
        let request: ScanRequest = serde_json::from_str("{}").unwrap();
        match request.validate() {
            Err(AppError::Validation(errors)) => {
                assert_eq!(errors["eventId"], "The Event Id field is required.");
                assert_eq!(errors["memberId"], "The Member Id field is required.");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_service_filter_excludes_check_ins() {
        let event_id = Uuid::new_v4();
        let service_id = Uuid::new_v4();
        let check_in = ScanModel::new(event_id, Uuid::new_v4(), None, Uuid::new_v4());
        let haircut = ScanModel::new(event_id, Uuid::new_v4(), Some(service_id), Uuid::new_v4());

        let filter = ScanFilter {
            service_id: Some(service_id),
            ..ScanFilter::for_event(event_id)
        };
        assert!(!filter.matches(&check_in));
        assert!(filter.matches(&haircut));
        assert!(ScanFilter::for_event(event_id).matches(&check_in));
        assert!(!ScanFilter::for_event(Uuid::new_v4()).matches(&haircut));
    }
}
