use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    models::EventModel,
    repository::EventRepository,
    types::{EventFilter, EventRequest, EventResponse},
};
use crate::pagination::Page;
use crate::scans::repository::ScanRepository;
use crate::shared::{AppError, AppState};

/// Service for handling event business logic
pub struct EventService {
    repository: Arc<dyn EventRepository + Send + Sync>,
    scans: Arc<dyn ScanRepository + Send + Sync>,
}

impl EventService {
    pub fn new(
        repository: Arc<dyn EventRepository + Send + Sync>,
        scans: Arc<dyn ScanRepository + Send + Sync>,
    ) -> Self {
        Self { repository, scans }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.event_repository),
            Arc::clone(&state.scan_repository),
        )
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: EventFilter,
        page: Page,
    ) -> Result<Vec<EventResponse>, AppError> {
        let events = self.repository.list(&filter, &page).await?;
        info!(event_count = events.len(), "Events retrieved successfully");
        Ok(events.into_iter().map(EventResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<EventResponse, AppError> {
        self.find(id).await.map(EventResponse::from)
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: EventRequest,
        created_by: Uuid,
    ) -> Result<EventResponse, AppError> {
        request.validate()?;

        let event = EventModel::new(request, created_by);
        self.repository.create(&event).await?;

        info!(event_id = %event.id, name = %event.name, "Event created successfully");
        Ok(event.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: EventRequest,
        updated_by: Uuid,
    ) -> Result<EventResponse, AppError> {
        request.validate()?;

        let mut event = self.find(id).await?;
        event.apply(request, updated_by);
        self.repository.update(&event).await?;

        info!(event_id = %event.id, "Event updated successfully");
        Ok(event.into())
    }

    /// Deletes the event and every scan recorded against it
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.find(id).await?;

        let removed_scans = self.scans.delete_for_event(id).await?;
        self.repository.delete(id).await?;

        info!(event_id = %id, removed_scans, "Event deleted successfully");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<EventModel, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Event with ID '{}' not found.", id)))
    }
}
