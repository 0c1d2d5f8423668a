use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::{
    models::ServiceModel,
    repository::ServiceRepository,
    types::{ServiceRequest, ServiceResponse},
};
use crate::pagination::Page;
use crate::scans::repository::ScanRepository;
use crate::shared::{AppError, AppState};

/// Handles business logic for the services offered at events
pub struct ServiceManager {
    repository: Arc<dyn ServiceRepository + Send + Sync>,
    scans: Arc<dyn ScanRepository + Send + Sync>,
}

impl ServiceManager {
    pub fn new(
        repository: Arc<dyn ServiceRepository + Send + Sync>,
        scans: Arc<dyn ScanRepository + Send + Sync>,
    ) -> Self {
        Self { repository, scans }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.service_repository),
            Arc::clone(&state.scan_repository),
        )
    }

    #[instrument(skip(self))]
    pub async fn list(&self, page: Page) -> Result<Vec<ServiceResponse>, AppError> {
        let services = self.repository.list(&page).await?;
        info!(service_count = services.len(), "Services retrieved successfully");
        Ok(services.into_iter().map(ServiceResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<ServiceResponse, AppError> {
        self.find(id).await.map(ServiceResponse::from)
    }

    #[instrument(skip(self, request))]
    pub async fn create(
        &self,
        request: ServiceRequest,
        created_by: Uuid,
    ) -> Result<ServiceResponse, AppError> {
        request.validate()?;

        let service = ServiceModel::new(request, created_by);
        self.repository.create(&service).await?;

        info!(service_id = %service.id, name = %service.name, "Service created successfully");
        Ok(service.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update(
        &self,
        id: Uuid,
        request: ServiceRequest,
        updated_by: Uuid,
    ) -> Result<ServiceResponse, AppError> {
        request.validate()?;

        let mut service = self.find(id).await?;
        service.apply(request, updated_by);
        self.repository.update(&service).await?;

        info!(service_id = %service.id, "Service updated successfully");
        Ok(service.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        self.find(id).await?;

        let removed_scans = self.scans.delete_for_service(id).await?;
        self.repository.delete(id).await?;

        info!(service_id = %id, removed_scans, "Service deleted successfully");
        Ok(())
    }

    async fn find(&self, id: Uuid) -> Result<ServiceModel, AppError> {
        self.repository
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Service with ID '{}' not found.", id)))
    }
}
