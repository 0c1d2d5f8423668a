use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::models::PatronModel;
use crate::pagination::Page;
use crate::shared::{map_sqlx_error, AppError};

/// Trait for patron repository operations
#[async_trait]
pub trait PatronRepository {
    async fn create(&self, patron: &PatronModel) -> Result<(), AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<PatronModel>, AppError>;
    async fn get_by_member_id(&self, member_id: i32) -> Result<Option<PatronModel>, AppError>;
    /// Ordered by last name, then first name
    async fn list(&self, page: &Page) -> Result<Vec<PatronModel>, AppError>;
    async fn update(&self, patron: &PatronModel) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

fn duplicate_member_id(member_id: i32) -> AppError {
    AppError::Conflict(format!(
        "A Patron with Member ID '{}' already exists.",
        member_id
    ))
}

/// In-memory implementation of PatronRepository for development and testing
pub struct InMemoryPatronRepository {
    patrons: RwLock<HashMap<Uuid, PatronModel>>,
}

impl Default for InMemoryPatronRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPatronRepository {
    pub fn new() -> Self {
        Self {
            patrons: RwLock::new(HashMap::new()),
        }
    }

    fn member_id_taken(patrons: &HashMap<Uuid, PatronModel>, patron: &PatronModel) -> bool {
        patrons
            .values()
            .any(|p| p.id != patron.id && p.member_id == patron.member_id)
    }
}

#[async_trait]
impl PatronRepository for InMemoryPatronRepository {
    #[instrument(skip(self, patron))]
    async fn create(&self, patron: &PatronModel) -> Result<(), AppError> {
        debug!(patron_id = %patron.id, member_id = patron.member_id, "Creating patron in memory");

        let mut patrons = self.patrons.write().await;
        if Self::member_id_taken(&patrons, patron) {
            warn!(member_id = patron.member_id, "Member ID already in use");
            return Err(duplicate_member_id(patron.member_id));
        }
        patrons.insert(patron.id, patron.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<PatronModel>, AppError> {
        Ok(self.patrons.read().await.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn get_by_member_id(&self, member_id: i32) -> Result<Option<PatronModel>, AppError> {
        Ok(self
            .patrons
            .read()
            .await
            .values()
            .find(|p| p.member_id == member_id)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &Page) -> Result<Vec<PatronModel>, AppError> {
        let mut patrons: Vec<PatronModel> = self.patrons.read().await.values().cloned().collect();
        patrons.sort_by_key(|p| (p.last_name.to_lowercase(), p.first_name.to_lowercase(), p.id));
        Ok(page.apply(patrons))
    }

    #[instrument(skip(self, patron))]
    async fn update(&self, patron: &PatronModel) -> Result<(), AppError> {
        let mut patrons = self.patrons.write().await;
        if !patrons.contains_key(&patron.id) {
            return Err(AppError::NotFound("Patron not found".to_string()));
        }
        if Self::member_id_taken(&patrons, patron) {
            return Err(duplicate_member_id(patron.member_id));
        }
        patrons.insert(patron.id, patron.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.patrons.write().await.remove(&id).is_none() {
            return Err(AppError::NotFound("Patron not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of patron repository
pub struct PostgresPatronRepository {
    pool: PgPool,
}

impl PostgresPatronRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const PATRON_COLUMNS: &str = "id, member_id, first_name, last_name, address, primary_phone, secondary_phone, email, enrollment_date, creation_date, creation_by, last_update_date, last_update_by";

fn patron_from_row(row: &PgRow) -> PatronModel {
    PatronModel {
        id: row.get("id"),
        member_id: row.get("member_id"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        address: row.get("address"),
        primary_phone: row.get("primary_phone"),
        secondary_phone: row.get("secondary_phone"),
        email: row.get("email"),
        enrollment_date: row.get("enrollment_date"),
        creation_date: row.get("creation_date"),
        creation_by: row.get("creation_by"),
        last_update_date: row.get("last_update_date"),
        last_update_by: row.get("last_update_by"),
    }
}

fn map_patron_error(patron: &PatronModel) -> impl FnOnce(sqlx::Error) -> AppError + '_ {
    move |e| {
        warn!(error = %e, patron_id = %patron.id, "Failed to write patron to database");
        match map_sqlx_error(e) {
            AppError::Conflict(_) => duplicate_member_id(patron.member_id),
            other => other,
        }
    }
}

#[async_trait]
impl PatronRepository for PostgresPatronRepository {
    #[instrument(skip(self, patron))]
    async fn create(&self, patron: &PatronModel) -> Result<(), AppError> {
        debug!(patron_id = %patron.id, member_id = patron.member_id, "Creating patron in database");

        sqlx::query(&format!(
            "INSERT INTO patrons ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            PATRON_COLUMNS
        ))
        .bind(patron.id)
        .bind(patron.member_id)
        .bind(&patron.first_name)
        .bind(&patron.last_name)
        .bind(&patron.address)
        .bind(&patron.primary_phone)
        .bind(&patron.secondary_phone)
        .bind(&patron.email)
        .bind(patron.enrollment_date)
        .bind(patron.creation_date)
        .bind(patron.creation_by)
        .bind(patron.last_update_date)
        .bind(patron.last_update_by)
        .execute(&self.pool)
        .await
        .map_err(map_patron_error(patron))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<PatronModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM patrons WHERE id = $1", PATRON_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, patron_id = %id, "Failed to fetch patron from database");
                map_sqlx_error(e)
            })?;

        Ok(row.as_ref().map(patron_from_row))
    }

    #[instrument(skip(self))]
    async fn get_by_member_id(&self, member_id: i32) -> Result<Option<PatronModel>, AppError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM patrons WHERE member_id = $1",
            PATRON_COLUMNS
        ))
        .bind(member_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, member_id, "Failed to fetch patron by member ID");
            map_sqlx_error(e)
        })?;

        Ok(row.as_ref().map(patron_from_row))
    }

    #[instrument(skip(self))]
    async fn list(&self, page: &Page) -> Result<Vec<PatronModel>, AppError> {
        let rows = sqlx::query(&format!(
            "SELECT {columns} FROM patrons ORDER BY LOWER(last_name) {order}, LOWER(first_name) {order}, id {order} LIMIT $1 OFFSET $2",
            columns = PATRON_COLUMNS,
            order = page.order,
        ))
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list patrons from database");
            map_sqlx_error(e)
        })?;

        Ok(rows.iter().map(patron_from_row).collect())
    }

    #[instrument(skip(self, patron))]
    async fn update(&self, patron: &PatronModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE patrons SET member_id = $2, first_name = $3, last_name = $4, address = $5, primary_phone = $6, secondary_phone = $7, email = $8, enrollment_date = $9, last_update_date = $10, last_update_by = $11 WHERE id = $1",
        )
        .bind(patron.id)
        .bind(patron.member_id)
        .bind(&patron.first_name)
        .bind(&patron.last_name)
        .bind(&patron.address)
        .bind(&patron.primary_phone)
        .bind(&patron.secondary_phone)
        .bind(&patron.email)
        .bind(patron.enrollment_date)
        .bind(patron.last_update_date)
        .bind(patron.last_update_by)
        .execute(&self.pool)
        .await
        .map_err(map_patron_error(patron))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Patron not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM patrons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, patron_id = %id, "Failed to delete patron from database");
                map_sqlx_error(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Patron not found".to_string()));
        }
        Ok(())
    }
}
