use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

use super::types::{EventSummary, ServiceVisits};
use crate::events::{models::EventModel, repository::EventRepository, types::EventFilter};
use crate::pagination::Page;
use crate::scans::{repository::ScanRepository, types::ScanFilter};
use crate::services::repository::ServiceRepository;
use crate::shared::{AppError, AppState};

/// Builds attendance reports from events, scans and services
pub struct ReportService {
    events: Arc<dyn EventRepository + Send + Sync>,
    scans: Arc<dyn ScanRepository + Send + Sync>,
    services: Arc<dyn ServiceRepository + Send + Sync>,
}

impl ReportService {
    pub fn new(
        events: Arc<dyn EventRepository + Send + Sync>,
        scans: Arc<dyn ScanRepository + Send + Sync>,
        services: Arc<dyn ServiceRepository + Send + Sync>,
    ) -> Self {
        Self {
            events,
            scans,
            services,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.event_repository),
            Arc::clone(&state.scan_repository),
            Arc::clone(&state.service_repository),
        )
    }

    /// One summary per event starting within `[start, end]`, ordered by start date
    #[instrument(skip(self))]
    pub async fn event_master(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EventSummary>, AppError> {
        let filter = EventFilter {
            date_start: Some(start),
            date_end: Some(end),
        };
        let events = self.events.list(&filter, &Page::unbounded()).await?;

        let mut summaries = Vec::with_capacity(events.len());
        for event in events {
            summaries.push(self.summarize(event).await?);
        }

        info!(event_count = summaries.len(), "Event master report generated");
        Ok(summaries)
    }

    async fn summarize(&self, event: EventModel) -> Result<EventSummary, AppError> {
        let scans = self.scans.list(&ScanFilter::for_event(event.id)).await?;

        let mut total_visits = 0;
        let mut per_service: BTreeMap<Uuid, u64> = BTreeMap::new();
        for scan in &scans {
            match scan.service_id {
                None => total_visits += 1,
                Some(service_id) => *per_service.entry(service_id).or_default() += 1,
            }
        }

        let mut services = Vec::with_capacity(per_service.len());
        for (service_id, visits) in per_service {
            // Scans are removed with their service, so a miss means a concurrent delete
            if let Some(service) = self.services.get(service_id).await? {
                services.push(ServiceVisits {
                    service_id,
                    name: service.name,
                    visits,
                });
            }
        }
        services.sort_by_key(|s| s.name.to_lowercase());

        Ok(EventSummary {
            id: event.id,
            name: event.name,
            start_date: event.start_date,
            end_date: event.end_date,
            total_visits,
            services,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::types::EventRequest;
    use crate::scans::models::ScanModel;
    use crate::services::{models::ServiceModel, types::ServiceRequest};
    use crate::shared::test_utils::test_state;
    use chrono::{Duration, TimeZone};

    #[tokio::test]
    async fn test_counts_check_ins_and_services() {
        let state = test_state();
        let actor = Uuid::new_v4();
        let start = Utc.with_ymd_and_hms(2019, 3, 1, 9, 0, 0).unwrap();

        let event = EventModel::new(
            EventRequest {
                name: "Stand Down".to_string(),
                start_date: Some(start),
                end_date: Some(start + Duration::hours(8)),
                description: None,
            },
            actor,
        );
        state.event_repository.create(&event).await.unwrap();

        let mut service_ids = Vec::new();
        for name in ["Meal", "Haircut"] {
            let service = ServiceModel::new(
                ServiceRequest {
                    name: name.to_string(),
                    description: None,
                    limit: None,
                },
                actor,
            );
            state.service_repository.create(&service).await.unwrap();
            service_ids.push(service.id);
        }

        let patrons: Vec<Uuid> = (0..3).map(|_| Uuid::new_v4()).collect();
        for patron in &patrons {
            let check_in = ScanModel::new(event.id, *patron, None, actor);
            state.scan_repository.create(&check_in).await.unwrap();
            let meal = ScanModel::new(event.id, *patron, Some(service_ids[0]), actor);
            state.scan_repository.create(&meal).await.unwrap();
        }
        let haircut = ScanModel::new(event.id, patrons[0], Some(service_ids[1]), actor);
        state.scan_repository.create(&haircut).await.unwrap();

        let report = ReportService::from_state(&state)
            .event_master(start - Duration::days(1), start + Duration::days(1))
            .await
            .unwrap();

        assert_eq!(report.len(), 1);
        assert_eq!(report[0].total_visits, 3);
        assert_eq!(
            report[0].services,
            vec![
                ServiceVisits {
                    service_id: service_ids[1],
                    name: "Haircut".to_string(),
                    visits: 1,
                },
                ServiceVisits {
                    service_id: service_ids[0],
                    name: "Meal".to_string(),
                    visits: 3,
                },
            ]
        );

        let outside = ReportService::from_state(&state)
            .event_master(start + Duration::days(1), start + Duration::days(2))
            .await
            .unwrap();
        assert!(outside.is_empty());
    }
}
