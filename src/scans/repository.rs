use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{models::ScanModel, types::ScanFilter};
use crate::services::models::ServiceModel;
use crate::shared::{map_sqlx_error, AppError};

type ScanKey = (Uuid, Uuid, Option<Uuid>);

/// Trait for scan repository operations
#[async_trait]
pub trait ScanRepository {
    /// Fails with Conflict if a scan with the same event, patron and service exists
    async fn create(&self, scan: &ScanModel) -> Result<(), AppError>;
    async fn get(
        &self,
        event_id: Uuid,
        patron_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<Option<ScanModel>, AppError>;
    /// Ordered by scan date
    async fn list(&self, filter: &ScanFilter) -> Result<Vec<ScanModel>, AppError>;
    /// Records a visit to `service` unless the service has reached its limit
    /// for the scan's event. The count and the insert are one atomic step.
    /// Returns false when the limit was reached.
    async fn create_within_limit(
        &self,
        scan: &ScanModel,
        service: &ServiceModel,
    ) -> Result<bool, AppError>;
    async fn delete(
        &self,
        event_id: Uuid,
        patron_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<(), AppError>;
    async fn delete_for_patron(&self, patron_id: Uuid) -> Result<u64, AppError>;
    async fn delete_for_event(&self, event_id: Uuid) -> Result<u64, AppError>;
    async fn delete_for_service(&self, service_id: Uuid) -> Result<u64, AppError>;
}

/// In-memory implementation of ScanRepository for development and testing
pub struct InMemoryScanRepository {
    scans: RwLock<HashMap<ScanKey, ScanModel>>,
}

impl Default for InMemoryScanRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryScanRepository {
    pub fn new() -> Self {
        Self {
            scans: RwLock::new(HashMap::new()),
        }
    }

    async fn delete_where(&self, predicate: impl Fn(&ScanModel) -> bool + Send) -> u64 {
        let mut scans = self.scans.write().await;
        let before = scans.len();
        scans.retain(|_, scan| !predicate(scan));
        (before - scans.len()) as u64
    }
}

#[async_trait]
impl ScanRepository for InMemoryScanRepository {
    #[instrument(skip(self, scan))]
    async fn create(&self, scan: &ScanModel) -> Result<(), AppError> {
        debug!(event_id = %scan.event_id, patron_id = %scan.patron_id, service_id = ?scan.service_id, "Recording scan in memory");

        let mut scans = self.scans.write().await;
        if scans.contains_key(&scan.key()) {
            return Err(AppError::Conflict("Scan already exists".to_string()));
        }
        scans.insert(scan.key(), scan.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(
        &self,
        event_id: Uuid,
        patron_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<Option<ScanModel>, AppError> {
        Ok(self
            .scans
            .read()
            .await
            .get(&(event_id, patron_id, service_id))
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ScanFilter) -> Result<Vec<ScanModel>, AppError> {
        let mut scans: Vec<ScanModel> = self
            .scans
            .read()
            .await
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        scans.sort_by_key(|s| s.scan_date);
        Ok(scans)
    }

    #[instrument(skip(self, scan, service), fields(service_id = %service.id))]
    async fn create_within_limit(
        &self,
        scan: &ScanModel,
        service: &ServiceModel,
    ) -> Result<bool, AppError> {
        let mut scans = self.scans.write().await;
        if scans.contains_key(&scan.key()) {
            return Err(AppError::Conflict("Scan already exists".to_string()));
        }

        let uses = scans
            .values()
            .filter(|s| s.event_id == scan.event_id && s.service_id == Some(service.id))
            .count() as u64;
        if service.is_exhausted(uses) {
            return Ok(false);
        }

        scans.insert(scan.key(), scan.clone());
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        event_id: Uuid,
        patron_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        if self
            .scans
            .write()
            .await
            .remove(&(event_id, patron_id, service_id))
            .is_none()
        {
            return Err(AppError::NotFound("Scan not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_for_patron(&self, patron_id: Uuid) -> Result<u64, AppError> {
        Ok(self.delete_where(|s| s.patron_id == patron_id).await)
    }

    #[instrument(skip(self))]
    async fn delete_for_event(&self, event_id: Uuid) -> Result<u64, AppError> {
        Ok(self.delete_where(|s| s.event_id == event_id).await)
    }

    #[instrument(skip(self))]
    async fn delete_for_service(&self, service_id: Uuid) -> Result<u64, AppError> {
        Ok(self.delete_where(|s| s.service_id == Some(service_id)).await)
    }
}

/// PostgreSQL implementation of scan repository
pub struct PostgresScanRepository {
    pool: PgPool,
}

impl PostgresScanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn delete_by(&self, column: &str, id: Uuid) -> Result<u64, AppError> {
        let result = sqlx::query(&format!("DELETE FROM scans WHERE {} = $1", column))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, column, id = %id, "Failed to delete scans from database");
                map_sqlx_error(e)
            })?;

        Ok(result.rows_affected())
    }
}

const SCAN_COLUMNS: &str = "event_id, patron_id, service_id, scan_date, scan_by";

fn scan_from_row(row: &PgRow) -> ScanModel {
    ScanModel {
        event_id: row.get("event_id"),
        patron_id: row.get("patron_id"),
        service_id: row.get("service_id"),
        scan_date: row.get("scan_date"),
        scan_by: row.get("scan_by"),
    }
}

#[async_trait]
impl ScanRepository for PostgresScanRepository {
    #[instrument(skip(self, scan))]
    async fn create(&self, scan: &ScanModel) -> Result<(), AppError> {
        debug!(event_id = %scan.event_id, patron_id = %scan.patron_id, service_id = ?scan.service_id, "Recording scan in database");

        sqlx::query(&format!(
            "INSERT INTO scans ({}) VALUES ($1, $2, $3, $4, $5)",
            SCAN_COLUMNS
        ))
        .bind(scan.event_id)
        .bind(scan.patron_id)
        .bind(scan.service_id)
        .bind(scan.scan_date)
        .bind(scan.scan_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to record scan in database");
            map_sqlx_error(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(
        &self,
        event_id: Uuid,
        patron_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<Option<ScanModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM scans WHERE event_id = $1 AND patron_id = $2 AND service_id IS NOT DISTINCT FROM $3",
            SCAN_COLUMNS
        ))
        .bind(event_id)
        .bind(patron_id)
        .bind(service_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to fetch scan from database");
            map_sqlx_error(e)
        })?;

        Ok(row.as_ref().map(scan_from_row))
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &ScanFilter) -> Result<Vec<ScanModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM scans \
             WHERE ($1::uuid IS NULL OR event_id = $1) \
               AND ($2::uuid IS NULL OR patron_id = $2) \
               AND ($3::uuid IS NULL OR service_id = $3) \
             ORDER BY scan_date",
            SCAN_COLUMNS
        ))
        .bind(filter.event_id)
        .bind(filter.patron_id)
        .bind(filter.service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list scans from database");
            map_sqlx_error(e)
        })?;

        Ok(rows.iter().map(scan_from_row).collect())
    }

    #[instrument(skip(self, scan, service), fields(service_id = %service.id))]
    async fn create_within_limit(
        &self,
        scan: &ScanModel,
        service: &ServiceModel,
    ) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            warn!(error = %e, "Failed to start scan transaction");
            map_sqlx_error(e)
        })?;

        if service.limit.is_some() {
            // Holds the service row until commit so concurrent visits queue up
            sqlx::query("SELECT id FROM services WHERE id = $1 FOR UPDATE")
                .bind(service.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    warn!(error = %e, "Failed to lock service row");
                    map_sqlx_error(e)
                })?;

            let uses: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM scans WHERE event_id = $1 AND service_id = $2",
            )
            .bind(scan.event_id)
            .bind(service.id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                warn!(error = %e, "Failed to count service scans in database");
                map_sqlx_error(e)
            })?;

            if service.is_exhausted(uses as u64) {
                return Ok(false);
            }
        }

        sqlx::query(&format!(
            "INSERT INTO scans ({}) VALUES ($1, $2, $3, $4, $5)",
            SCAN_COLUMNS
        ))
        .bind(scan.event_id)
        .bind(scan.patron_id)
        .bind(scan.service_id)
        .bind(scan.scan_date)
        .bind(scan.scan_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to record service scan in database");
            map_sqlx_error(e)
        })?;

        tx.commit().await.map_err(|e| {
            warn!(error = %e, "Failed to commit scan transaction");
            map_sqlx_error(e)
        })?;
        Ok(true)
    }

    #[instrument(skip(self))]
    async fn delete(
        &self,
        event_id: Uuid,
        patron_id: Uuid,
        service_id: Option<Uuid>,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            "DELETE FROM scans WHERE event_id = $1 AND patron_id = $2 AND service_id IS NOT DISTINCT FROM $3",
        )
        .bind(event_id)
        .bind(patron_id)
        .bind(service_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to delete scan from database");
            map_sqlx_error(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Scan not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_for_patron(&self, patron_id: Uuid) -> Result<u64, AppError> {
        self.delete_by("patron_id", patron_id).await
    }

    #[instrument(skip(self))]
    async fn delete_for_event(&self, event_id: Uuid) -> Result<u64, AppError> {
        self.delete_by("event_id", event_id).await
    }

    #[instrument(skip(self))]
    async fn delete_for_service(&self, service_id: Uuid) -> Result<u64, AppError> {
        self.delete_by("service_id", service_id).await
    }
}
