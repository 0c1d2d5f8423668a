use async_trait::async_trait;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{models::EventModel, types::EventFilter};
use crate::pagination::Page;
use crate::shared::{map_sqlx_error, AppError};

/// Trait for event repository operations
#[async_trait]
pub trait EventRepository {
    async fn create(&self, event: &EventModel) -> Result<(), AppError>;
    async fn get(&self, id: Uuid) -> Result<Option<EventModel>, AppError>;
    /// Ordered by start date
    async fn list(&self, filter: &EventFilter, page: &Page) -> Result<Vec<EventModel>, AppError>;
    async fn update(&self, event: &EventModel) -> Result<(), AppError>;
    async fn delete(&self, id: Uuid) -> Result<(), AppError>;
}

/// In-memory implementation of EventRepository for development and testing
pub struct InMemoryEventRepository {
    events: RwLock<HashMap<Uuid, EventModel>>,
}

impl Default for InMemoryEventRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    #[instrument(skip(self, event))]
    async fn create(&self, event: &EventModel) -> Result<(), AppError> {
        debug!(event_id = %event.id, name = %event.name, "Creating event in memory");

        let mut events = self.events.write().await;
        if events.contains_key(&event.id) {
            return Err(AppError::Conflict("Event already exists".to_string()));
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<EventModel>, AppError> {
        Ok(self.events.read().await.get(&id).cloned())
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &EventFilter, page: &Page) -> Result<Vec<EventModel>, AppError> {
        let mut events: Vec<EventModel> = self
            .events
            .read()
            .await
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.start_date, e.id));
        Ok(page.apply(events))
    }

    #[instrument(skip(self, event))]
    async fn update(&self, event: &EventModel) -> Result<(), AppError> {
        let mut events = self.events.write().await;
        if !events.contains_key(&event.id) {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        events.insert(event.id, event.clone());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if self.events.write().await.remove(&id).is_none() {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        Ok(())
    }
}

/// PostgreSQL implementation of event repository
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const EVENT_COLUMNS: &str = "id, name, start_date, end_date, description, creation_date, creation_by, last_update_date, last_update_by";

fn event_from_row(row: &PgRow) -> EventModel {
    EventModel {
        id: row.get("id"),
        name: row.get("name"),
        start_date: row.get("start_date"),
        end_date: row.get("end_date"),
        description: row.get("description"),
        creation_date: row.get("creation_date"),
        creation_by: row.get("creation_by"),
        last_update_date: row.get("last_update_date"),
        last_update_by: row.get("last_update_by"),
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    #[instrument(skip(self, event))]
    async fn create(&self, event: &EventModel) -> Result<(), AppError> {
        debug!(event_id = %event.id, name = %event.name, "Creating event in database");

        sqlx::query(&format!(
            "INSERT INTO events ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            EVENT_COLUMNS
        ))
        .bind(event.id)
        .bind(&event.name)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.description)
        .bind(event.creation_date)
        .bind(event.creation_by)
        .bind(event.last_update_date)
        .bind(event.last_update_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to create event in database");
            map_sqlx_error(e)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get(&self, id: Uuid) -> Result<Option<EventModel>, AppError> {
        let row = sqlx::query(&format!("SELECT {} FROM events WHERE id = $1", EVENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, event_id = %id, "Failed to fetch event from database");
                map_sqlx_error(e)
            })?;

        Ok(row.as_ref().map(event_from_row))
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: &EventFilter, page: &Page) -> Result<Vec<EventModel>, AppError> {
        // NULL bounds disable the corresponding filter
        let rows = sqlx::query(&format!(
            "SELECT {columns} FROM events \
             WHERE ($1::timestamptz IS NULL OR start_date >= $1) \
               AND ($2::timestamptz IS NULL OR start_date <= $2) \
             ORDER BY start_date {order}, id {order} LIMIT $3 OFFSET $4",
            columns = EVENT_COLUMNS,
            order = page.order,
        ))
        .bind(filter.date_start)
        .bind(filter.date_end)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, "Failed to list events from database");
            map_sqlx_error(e)
        })?;

        Ok(rows.iter().map(event_from_row).collect())
    }

    #[instrument(skip(self, event))]
    async fn update(&self, event: &EventModel) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE events SET name = $2, start_date = $3, end_date = $4, description = $5, last_update_date = $6, last_update_by = $7 WHERE id = $1",
        )
        .bind(event.id)
        .bind(&event.name)
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(&event.description)
        .bind(event.last_update_date)
        .bind(event.last_update_by)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            warn!(error = %e, event_id = %event.id, "Failed to update event in database");
            map_sqlx_error(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                warn!(error = %e, event_id = %id, "Failed to delete event from database");
                map_sqlx_error(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EventRequest;
    use crate::pagination::SortOrder;
    use chrono::{Duration, TimeZone, Utc};

    fn event_on(day: u32) -> EventModel {
        let start = Utc.with_ymd_and_hms(2019, 3, day, 9, 0, 0).unwrap();
        EventModel::new(
            EventRequest {
                name: format!("March {}", day),
                start_date: Some(start),
                end_date: Some(start + Duration::hours(8)),
                description: None,
            },
            Uuid::new_v4(),
        )
    }

    #[tokio::test]
    async fn test_list_orders_by_start_date() {
        let repo = InMemoryEventRepository::new();
        for day in [15, 1, 8] {
            repo.create(&event_on(day)).await.unwrap();
        }

        let names: Vec<String> = repo
            .list(&EventFilter::default(), &Page::default())
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["March 1", "March 8", "March 15"]);

        let desc = Page::from_parts(None, Some(1), Some(SortOrder::Desc)).unwrap();
        let latest = repo.list(&EventFilter::default(), &desc).await.unwrap();
        assert_eq!(latest[0].name, "March 15");
    }

    #[tokio::test]
    async fn test_list_with_date_filter() {
        let repo = InMemoryEventRepository::new();
        for day in [1, 8, 15] {
            repo.create(&event_on(day)).await.unwrap();
        }

        let filter = EventFilter {
            date_start: Some(Utc.with_ymd_and_hms(2019, 3, 2, 0, 0, 0).unwrap()),
            date_end: Some(Utc.with_ymd_and_hms(2019, 3, 10, 0, 0, 0).unwrap()),
        };
        let events = repo.list(&filter, &Page::default()).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].name, "March 8");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let repo = InMemoryEventRepository::new();
        let event = event_on(1);

        assert!(matches!(repo.update(&event).await, Err(AppError::NotFound(_))));
        assert!(matches!(
            repo.delete(event.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
