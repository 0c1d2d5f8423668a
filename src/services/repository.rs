use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::ServiceModel;
use crate::pagination::Page;
use crate::shared::{map_sqlx_error, AppError};

/// Trait for service repository operations
#[async_trait]
pub trait ServiceRepository {
    async fn create(&self, service: &ServiceModel) -> Result<(), AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<ServiceModel>, AppError>;
    /// Ordered by name, ignoring case
    async fn list(&self, page: &Page) -> Result<Vec<ServiceModel>, AppError>;
    async fn update(&self, service: &ServiceModel) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

fn duplicate_name(name: &str) -> AppError {
    AppError::Conflict(format!("A Service named '{}' already exists.", name))
}

/// In-memory implementation of ServiceRepository for development and testing
pub struct InMemoryServiceRepository {
    services: RwLock<HashMap<Uuid, ServiceModel>>,
}

impl Default for InMemoryServiceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryServiceRepository {
    pub fn new() -> Self {
        Self {
            services: RwLock::new(HashMap::new()),
        }
    }

    fn name_taken(services: &HashMap<Uuid, ServiceModel>, service: &ServiceModel) -> bool {
        services
            .values()
            .any(|s| s.id != service.id && s.name.eq_ignore_ascii_case(&service.name))
    }
}

#[async_trait]
impl ServiceRepository for InMemoryServiceRepository {
    #[instrument(skip(self, service))]
    async fn create(&self, service: &ServiceModel) -> Result<(), AppError> {
        debug!(service_id = %service.id, name = %service.name, "Creating service in memory");

        let mut services = self.services.write().await;
        if Self::name_taken(&services, service) {
            warn!(name = %service.name, "Service name already in use");
            return Err(duplicate_name(&service.name));
        }
        services.insert(service.id, service.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<ServiceModel>, AppError> {
        Ok(self.services.read().await.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &Page) -> Result<Vec<ServiceModel>, AppError> {
        let mut services: Vec<ServiceModel> =
            self.services.read().await.values().cloned().collect();
        services.sort_by_key(|s| s.name.to_lowercase());
        Ok(page.apply(services))
    }

    #[instrument(skip(self, service))]
    async fn update(&self, service: &ServiceModel) -> Result<(), AppError> {
        let mut services = self.services.write().await;
        if !services.contains_key(&service.id) {
            return Err(AppError::NotFound("Service not found".to_string()));
        }
        if Self::name_taken(&services, service) {
            return Err(duplicate_name(&service.name));
        }
        services.insert(service.id, service.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.services.write().await.remove(&id).is_none() {
            return Err(AppError::NotFound("Service not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of service repository
pub struct PostgresServiceRepository {
    pool: PgPool,
}

impl PostgresServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// `limit` is reserved in SQL, so the column is `service_limit`
const SERVICE_COLUMNS: &str = "id, name, description, service_limit, creation_date, creation_by, last_update_date, last_update_by";

fn service_from_row(row: &PgRow) -> ServiceModel {
    ServiceModel {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        limit: row.get("service_limit"),
        creation_date: row.get("creation_date"),
        creation_by: row.get("creation_by"),
        last_update_date: row.get("last_update_date"),
        last_update_by: row.get("last_update_by"),
    }
}

fn map_service_error(service: &ServiceModel) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        warn!(error = %e, service_id = %service.id, "Failed to write service to database");
        match map_sqlx_error(e) {
            AppError::Conflict(_) => duplicate_name(&service.name),
            other => other,
        }
    }
}

#[async_trait]
impl ServiceRepository for PostgresServiceRepository {
    #[instrument(skip(self, service))]
    async fn create(&self, service: &ServiceModel) -> Result<(), AppError> {
        debug!(service_id = %service.id, name = %service.name, "Creating service in database");

        sqlx::query(&format!(
            "INSERT INTO services ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            SERVICE_COLUMNS
        ))
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.limit)
        .bind(service.creation_date)
        .bind(service.creation_by)
        .bind(service.last_update_date)
        .bind(service.last_update_by)
        .execute(&self.pool)
        .await
        .map_err(map_service_error(service))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<ServiceModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM services WHERE id = $1",
            SERVICE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, service_id = %id, "Failed to fetch service from database");
            map_sqlx_error(e)
        })?;

        Ok(row.as_ref().map(service_from_row))
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &Page) -> Result<Vec<ServiceModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {columns} FROM services ORDER BY LOWER(name) {order} LIMIT $1 OFFSET $2",
            columns = SERVICE_COLUMNS,
            order = page.order,
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list services from database");
            map_sqlx_error(e)
        })?;

        Ok(rows.iter().map(service_from_row).collect())
    }

    #[instrument(skip(self, service))]
    async fn update(&self, service: &ServiceModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE services SET name = $2, description = $3, service_limit = $4, last_update_date = $5, last_update_by = $6 WHERE id = $1",
        )
        .bind(service.id)
        .bind(&service.name)
        .bind(&service.description)
        .bind(service.limit)
        .bind(service.last_update_date)
        .bind(service.last_update_by)
        .execute(&self.pool)
        .await
        .map_err(map_service_error(service))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, service_id = %id, "Failed to delete service from database");
                map_sqlx_error(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Service not found".to_string()));
        }
        Ok(())
    }
}
