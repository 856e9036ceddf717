use std::collections::HashMap;

use tokio::sync::RwLock;

use ewaste_core::domain::activity::ActivityRecord;
use ewaste_core::domain::party::{BusinessId, UserId};
use ewaste_core::domain::pickup::{PickupRequest, PickupRequestId};
use ewaste_core::domain::report::{EwasteReport, EwasteReportId};
use ewaste_core::workflow::PickupTransition;

use super::{
    ActivityRepository, EwasteReportRepository, PickupRequestRepository, RepositoryError,
};

/// Requests and their activity feed behind one lock, so a transition lands
/// both halves or neither.
#[derive(Default)]
pub struct InMemoryPickupStore {
    state: RwLock<PickupState>,
}

#[derive(Default)]
struct PickupState {
    requests: HashMap<String, PickupRequest>,
    activities: Vec<ActivityRecord>,
}

#[async_trait::async_trait]
impl PickupRequestRepository for InMemoryPickupStore {
    async fn find_by_id(
        &self,
        id: &PickupRequestId,
    ) -> Result<Option<PickupRequest>, RepositoryError> {
        let state = self.state.read().await;
        Ok(state.requests.get(&id.0).cloned())
    }

    async fn create(&self, request: PickupRequest) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        if state.requests.contains_key(&request.id.0) {
            return Err(RepositoryError::Conflict(format!(
                "pickup request {} already exists",
                request.id
            )));
        }
        state.requests.insert(request.id.0.clone(), request);
        Ok(())
    }

    async fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<PickupRequest>, RepositoryError> {
        let state = self.state.read().await;
        Ok(newest_first(
            state.requests.values().filter(|request| request.business_id() == business_id),
        ))
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PickupRequest>, RepositoryError> {
        let state = self.state.read().await;
        Ok(newest_first(state.requests.values().filter(|request| request.user_id() == user_id)))
    }

    async fn apply_transition(&self, transition: &PickupTransition) -> Result<(), RepositoryError> {
        let mut state = self.state.write().await;
        let request_id = &transition.request.id;

        if state.activities.iter().any(|activity| activity.id == transition.activity.id) {
            return Err(RepositoryError::Conflict(format!(
                "activity {} already exists",
                transition.activity.id
            )));
        }

        match state.requests.get_mut(&request_id.0) {
            Some(stored) if stored.status == transition.from => {
                stored.status = transition.request.status;
            }
            _ => {
                return Err(RepositoryError::Conflict(format!(
                    "pickup request {request_id} is missing or no longer `{}`",
                    transition.from
                )));
            }
        }

        state.activities.push(transition.activity.clone());
        Ok(())
    }
}

#[async_trait::async_trait]
impl ActivityRepository for InMemoryPickupStore {
    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityRecord>, RepositoryError> {
        let state = self.state.read().await;
        // Reverse first so equal timestamps keep newest-appended first after the stable sort.
        let mut feed: Vec<ActivityRecord> = state
            .activities
            .iter()
            .rev()
            .filter(|activity| &activity.user_id == user_id)
            .cloned()
            .collect();
        feed.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        if let Some(limit) = limit {
            feed.truncate(limit);
        }
        Ok(feed)
    }

    async fn list_for_request(
        &self,
        request_id: &PickupRequestId,
    ) -> Result<Vec<ActivityRecord>, RepositoryError> {
        let state = self.state.read().await;
        let mut feed: Vec<ActivityRecord> = state
            .activities
            .iter()
            .filter(|activity| &activity.request_id == request_id)
            .cloned()
            .collect();
        feed.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
        Ok(feed)
    }
}

#[derive(Default)]
pub struct InMemoryEwasteReportRepository {
    reports: RwLock<HashMap<String, EwasteReport>>,
}

#[async_trait::async_trait]
impl EwasteReportRepository for InMemoryEwasteReportRepository {
    async fn find_by_id(
        &self,
        id: &EwasteReportId,
    ) -> Result<Option<EwasteReport>, RepositoryError> {
        let reports = self.reports.read().await;
        Ok(reports.get(&id.0).cloned())
    }

    async fn save(&self, report: EwasteReport) -> Result<(), RepositoryError> {
        let mut reports = self.reports.write().await;
        reports.insert(report.id.0.clone(), report);
        Ok(())
    }

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<EwasteReport>, RepositoryError> {
        let reports = self.reports.read().await;
        let mut matching: Vec<EwasteReport> =
            reports.values().filter(|report| &report.user_id == user_id).cloned().collect();
        matching.sort_by(newest_report_first);
        Ok(matching)
    }

    async fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<EwasteReport>, RepositoryError> {
        let reports = self.reports.read().await;
        let mut matching: Vec<EwasteReport> = reports
            .values()
            .filter(|report| report.business_id.as_ref() == Some(business_id))
            .cloned()
            .collect();
        matching.sort_by(newest_report_first);
        Ok(matching)
    }
}

fn newest_report_first(a: &EwasteReport, b: &EwasteReport) -> std::cmp::Ordering {
    b.submitted_at.cmp(&a.submitted_at).then_with(|| a.id.0.cmp(&b.id.0))
}

fn newest_first<'a>(requests: impl Iterator<Item = &'a PickupRequest>) -> Vec<PickupRequest> {
    let mut matching: Vec<PickupRequest> = requests.cloned().collect();
    matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.0.cmp(&b.id.0)));
    matching
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};

    use ewaste_core::domain::party::{BusinessId, UserId};
    use ewaste_core::domain::pickup::{
        PickupRequest, PickupRequestId, PickupStatus, RecyclerSnapshot, Requester,
    };
    use ewaste_core::workflow::PickupWorkflow;

    use crate::repositories::{
        ActivityRepository, InMemoryPickupStore, PickupRequestRepository, RepositoryError,
    };

    fn sample_request(id: &str) -> PickupRequest {
        PickupRequest {
            id: PickupRequestId(id.to_string()),
            requester: Requester {
                user_id: UserId("user-1".to_string()),
                display_name: "Anonymous".to_string(),
                email: "user@example.com".to_string(),
                address: "Adajan, Surat".to_string(),
            },
            recycler: RecyclerSnapshot {
                business_id: BusinessId("biz-1".to_string()),
                name: "Recycler".to_string(),
                address: "Surat".to_string(),
                mobile: "000".to_string(),
                website: "https://recycler.example".to_string(),
            },
            category: "TV".to_string(),
            quantity: 1,
            status: PickupStatus::Pending,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn in_memory_pickup_store_round_trip() {
        let store = InMemoryPickupStore::default();
        let request = sample_request("REQ-1");

        store.create(request.clone()).await.expect("create request");
        let found = store.find_by_id(&request.id).await.expect("find request");

        assert_eq!(found, Some(request.clone()));
        assert!(matches!(store.create(request).await, Err(RepositoryError::Conflict(_))));
    }

    #[tokio::test]
    async fn user_feed_is_newest_first_and_limited() {
        let store = InMemoryPickupStore::default();
        let request = sample_request("REQ-1");
        store.create(request.clone()).await.expect("create request");

        let workflow = PickupWorkflow::default();
        let start = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid timestamp");
        let mut current = request;
        let steps = [PickupStatus::Accepted, PickupStatus::AgentComing, PickupStatus::AgentArrived];
        for (minute, next) in (0_i64..).zip(steps) {
            let at = start + Duration::minutes(minute);
            let transition = workflow.transition(&current, next, at).expect("valid step");
            store.apply_transition(&transition).await.expect("apply");
            current = transition.request;
        }

        let user = UserId("user-1".to_string());
        let feed =
            ActivityRepository::list_for_user(&store, &user, Some(2)).await.expect("list feed");
        let messages: Vec<_> = feed.iter().map(|activity| activity.message.as_str()).collect();

        assert_eq!(
            messages,
            vec![
                "Delivery agent has arrived at your location.",
                "Delivery agent is coming to pick the E-waste.",
            ]
        );
    }

    #[tokio::test]
    async fn stale_transition_leaves_store_untouched() {
        let store = InMemoryPickupStore::default();
        let request = sample_request("REQ-1");
        store.create(request.clone()).await.expect("create request");

        let workflow = PickupWorkflow::default();
        let accept =
            workflow.transition(&request, PickupStatus::Accepted, Utc::now()).expect("accept");
        let reject =
            workflow.transition(&request, PickupStatus::Rejected, Utc::now()).expect("reject");

        store.apply_transition(&accept).await.expect("first writer");
        let error = store.apply_transition(&reject).await.expect_err("second writer");

        assert!(matches!(error, RepositoryError::Conflict(_)));
        let feed = store.list_for_request(&request.id).await.expect("feed");
        assert_eq!(feed.len(), 1);
    }
}
