use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use super::{
    models::ScanModel,
    repository::ScanRepository,
    types::{ScanFilter, ScanRequest, ScanResponse},
};
use crate::events::repository::EventRepository;
use crate::patrons::repository::PatronRepository;
use crate::services::repository::ServiceRepository;
use crate::shared::{AppError, AppState};

/// Records check-ins and service visits for patrons at events
pub struct ScanService {
    repository: Arc<dyn ScanRepository + Send + Sync>,
    events: Arc<dyn EventRepository + Send + Sync>,
    patrons: Arc<dyn PatronRepository + Send + Sync>,
    services: Arc<dyn ServiceRepository + Send + Sync>,
}

impl ScanService {
    pub fn new(
        repository: Arc<dyn ScanRepository + Send + Sync>,
        events: Arc<dyn EventRepository + Send + Sync>,
        patrons: Arc<dyn PatronRepository + Send + Sync>,
        services: Arc<dyn ServiceRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            events,
            patrons,
            services,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.scan_repository),
            Arc::clone(&state.event_repository),
            Arc::clone(&state.patron_repository),
            Arc::clone(&state.service_repository),
        )
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: ScanFilter) -> Result<Vec<ScanResponse>, AppError> {
        let scans = self.repository.list(&filter).await?;
        info!(scan_count = scans.len(), "Scans retrieved successfully");
        Ok(scans.into_iter().map(ScanResponse::from).collect())
    }

    /// Records a check-in, or a service visit when `serviceId` is given.
    ///
    /// The event must be in progress. A service visit requires an existing
    /// check-in and counts against the service's per-event limit.
    #[instrument(skip(self, request))]
    pub async fn record(
        &self,
        request: ScanRequest,
        scan_by: Uuid,
    ) -> Result<ScanResponse, AppError> {
        let (event_id, member_id) = request.validate()?;

        let event = self.events.get(event_id).await?.ok_or_else(|| {
            AppError::field("eventId", "The specified Event does not exist.")
        })?;
        if !event.is_in_progress(Utc::now()) {
            warn!(event_id = %event.id, "Scan attempted outside of event window");
            return Err(AppError::field(
                "eventId",
                "The specified Event is not in progress.",
            ));
        }

        let patron = self
            .patrons
            .get_by_member_id(member_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Patron with Member ID '{}' not found.", member_id))
            })?;

        let scan = match request.service_id {
            None => {
                if self.repository.get(event.id, patron.id, None).await?.is_some() {
                    return Err(AppError::Conflict(format!(
                        "{} has already checked in to this Event.",
                        patron.full_name()
                    )));
                }
                let scan = ScanModel::new(event.id, patron.id, None, scan_by);
                self.repository.create(&scan).await?;
                scan
            }
            Some(service_id) => {
                let service = self.services.get(service_id).await?.ok_or_else(|| {
                    AppError::field("serviceId", "The specified Service does not exist.")
                })?;

                if self.repository.get(event.id, patron.id, None).await?.is_none() {
                    return Err(AppError::field(
                        "memberId",
                        format!("{} has not checked in to this Event.", patron.full_name()),
                    ));
                }
                if self
                    .repository
                    .get(event.id, patron.id, Some(service.id))
                    .await?
                    .is_some()
                {
                    return Err(AppError::Conflict(format!(
                        "{} has already used the {} Service at this Event.",
                        patron.full_name(),
                        service.name
                    )));
                }

                let scan = ScanModel::new(event.id, patron.id, Some(service.id), scan_by);
                if !self.repository.create_within_limit(&scan, &service).await? {
                    warn!(service_id = %service.id, limit = ?service.limit, "Service limit reached");
                    return Err(AppError::Conflict(format!(
                        "The {} Service has reached its limit for this Event.",
                        service.name
                    )));
                }
                scan
            }
        };

        info!(
            event_id = %scan.event_id,
            patron_id = %scan.patron_id,
            service_id = ?scan.service_id,
            check_in = scan.is_check_in(),
            "Scan recorded successfully"
        );
        Ok(scan.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        event_id: Uuid,
        patron_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        self.repository.delete(event_id, patron_id, service_id).await?;

        info!(%event_id, %patron_id, ?service_id, "Scan deleted successfully");
        Ok(())
    }
}
