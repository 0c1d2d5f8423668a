use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    models::PatronModel,
    repository::PatronRepository,
    types::{PatronRequest, PatronResponse},
};
use crate::pagination::Page;
use crate::scans::repository::ScanRepository;
use crate::shared::{AppError, AppState};

/// Service for handling patron business logic
pub struct PatronService {
    repository: Arc<dyn PatronRepository + Send + Sync>,
    scans: Arc<dyn ScanRepository + Send + Sync>,
}

impl PatronService {
    pub fn new(
        repository: Arc<dyn PatronRepository + Send + Sync>,
        scans: Arc<dyn ScanRepository + Send + Sync>,
    ) -> Self {
        Self { repository, scans }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.patron_repository),
            Arc::clone(&state.scan_repository),
        )
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: Page) -> Result<Vec<PatronResponse>, AppError> {
        let patrons = self.repository.list(&page).await?;
        info!(patron_count = patrons.len(), "Patrons retrieved successfully");
        Ok(patrons.into_iter().map(PatronResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<PatronResponse, AppError> {
        self.find(id).await.map(PatronResponse::from)
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: PatronRequest,
        created_by: Uuid,
    ) -> Result<PatronResponse, AppError> {
        request.validate()?;

        let patron = PatronModel::new(request, created_by);
        self.repository.create(&patron).await?;

        info!(patron_id = %patron.id, member_id = patron.member_id, "Patron created successfully");
        Ok(patron.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: PatronRequest,
        updated_by: Uuid,
    ) -> Result<PatronResponse, AppError> {
        request.validate()?;

        let mut patron = self.find(id).await?;
        patron.apply(request, updated_by);
        self.repository.update(&patron).await?;

        info!(patron_id = %patron.id, "Patron updated successfully");
        Ok(patron.into())
    }

    /// Deletes the patron along with their scan history
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.find(id).await?;

        let removed_scans = self.scans.delete_for_patron(id).await?;
        self.repository.delete(id).await?;

        info!(patron_id = %id, removed_scans, "Patron deleted successfully");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<PatronModel, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Patron with ID '{}' not found.", id)))
    }
}
