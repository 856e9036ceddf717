//! Read-side summaries behind the business and individual dashboards.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::activity::ActivityRecord;
use crate::domain::party::{BusinessId, UserId};
use crate::domain::pickup::{PickupRequest, PickupStatus};
use crate::domain::report::EwasteReport;

pub const RECENT_ACTIVITY_LIMIT: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessOverview {
    pub business_id: BusinessId,
    pub pending: Vec<PickupRequest>,
    pub in_progress: Vec<PickupRequest>,
    pub completed: Vec<PickupRequest>,
    pub rejected_count: usize,
    pub total_ewaste_quantity: u64,
}

impl BusinessOverview {
    /// Requests and reports belonging to other businesses are ignored.
    pub fn build(
        business_id: &BusinessId,
        requests: &[PickupRequest],
        reports: &[EwasteReport],
    ) -> Self {
        let mut overview = Self {
            business_id: business_id.clone(),
            pending: Vec::new(),
            in_progress: Vec::new(),
            completed: Vec::new(),
            rejected_count: 0,
            total_ewaste_quantity: 0,
        };

        for request in requests.iter().filter(|r| r.business_id() == business_id) {
            match request.status {
                PickupStatus::Pending => overview.pending.push(request.clone()),
                PickupStatus::PaymentReceived => overview.completed.push(request.clone()),
                PickupStatus::Rejected => overview.rejected_count += 1,
                PickupStatus::Accepted
                | PickupStatus::AgentComing
                | PickupStatus::AgentArrived
                | PickupStatus::EwasteChecked => overview.in_progress.push(request.clone()),
            }
        }

        overview.total_ewaste_quantity = reports
            .iter()
            .filter(|report| report.business_id.as_ref() == Some(business_id))
            .map(|report| u64::from(report.quantity))
            .sum();

        overview
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualOverview {
    pub user_id: UserId,
    pub total_reports: usize,
    pub estimated_value: Decimal,
    pub recent_activities: Vec<ActivityRecord>,
}

impl IndividualOverview {
    pub fn build(
        user_id: &UserId,
        reports: &[EwasteReport],
        activities: &[ActivityRecord],
    ) -> Self {
        let own_reports = reports.iter().filter(|report| &report.user_id == user_id);
        let (total_reports, estimated_value) = own_reports
            .fold((0, Decimal::ZERO), |(count, value), report| {
                (count + 1, value.checked_add(report.price).unwrap_or(Decimal::MAX))
            });

        let mut recent: Vec<ActivityRecord> =
            activities.iter().filter(|activity| &activity.user_id == user_id).cloned().collect();
        recent.sort_by(|a, b| b.occurred_at.cmp(&a.occurred_at));
        recent.truncate(RECENT_ACTIVITY_LIMIT);

        Self { user_id: user_id.clone(), total_reports, estimated_value, recent_activities: recent }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{BusinessOverview, IndividualOverview};
    use crate::domain::activity::{ActivityId, ActivityRecord};
    use crate::domain::party::{BusinessId, UserId};
    use crate::domain::pickup::{
        PickupRequest, PickupRequestId, PickupStatus, RecyclerSnapshot, Requester,
    };
    use crate::domain::report::{EwasteReport, EwasteReportId};

    fn request(id: &str, business: &str, status: PickupStatus) -> PickupRequest {
        PickupRequest {
            id: PickupRequestId(id.to_owned()),
            requester: Requester {
                user_id: UserId("user-1".to_owned()),
                display_name: "Anonymous".to_owned(),
                email: "user@example.com".to_owned(),
                address: "Surat".to_owned(),
            },
            recycler: RecyclerSnapshot {
                business_id: BusinessId(business.to_owned()),
                name: "Recycler".to_owned(),
                address: "Surat".to_owned(),
                mobile: "000".to_owned(),
                website: "https://example.com".to_owned(),
            },
            category: "TV".to_owned(),
            quantity: 1,
            status,
            created_at: Utc::now(),
        }
    }

    fn report(user: &str, business: Option<&str>, quantity: u32, price: i64) -> EwasteReport {
        EwasteReport {
            id: EwasteReportId(format!("RPT-{user}-{quantity}")),
            user_id: UserId(user.to_owned()),
            business_id: business.map(|id| BusinessId(id.to_owned())),
            category: "TV".to_owned(),
            quantity,
            weight_kg: Some(Decimal::from(10)),
            brand: None,
            condition: None,
            price: Decimal::from(price),
            submitted_at: Utc::now(),
        }
    }

    #[test]
    fn business_overview_partitions_own_requests() {
        let business = BusinessId("biz-1".to_owned());
        let requests = vec![
            request("R1", "biz-1", PickupStatus::Pending),
            request("R2", "biz-1", PickupStatus::AgentArrived),
            request("R3", "biz-1", PickupStatus::PaymentReceived),
            request("R4", "biz-1", PickupStatus::Rejected),
            request("R5", "biz-2", PickupStatus::Pending),
        ];
        let reports = vec![
            report("user-1", Some("biz-1"), 3, 100),
            report("user-2", Some("biz-1"), 2, 100),
            report("user-3", Some("biz-2"), 7, 100),
            report("user-4", None, 9, 100),
        ];

        let overview = BusinessOverview::build(&business, &requests, &reports);

        assert_eq!(overview.pending.len(), 1);
        assert_eq!(overview.in_progress.len(), 1);
        assert_eq!(overview.completed.len(), 1);
        assert_eq!(overview.rejected_count, 1);
        assert_eq!(overview.total_ewaste_quantity, 5);
    }

    #[test]
    fn individual_overview_keeps_three_newest_activities() {
        let user = UserId("user-1".to_owned());
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid timestamp");
        let activities: Vec<ActivityRecord> = (0..5)
            .map(|minute| ActivityRecord {
                id: ActivityId(format!("A{minute}")),
                user_id: user.clone(),
                request_id: PickupRequestId("R1".to_owned()),
                message: format!("step {minute}"),
                occurred_at: base + Duration::minutes(minute),
            })
            .chain(std::iter::once(ActivityRecord {
                id: ActivityId("other".to_owned()),
                user_id: UserId("user-2".to_owned()),
                request_id: PickupRequestId("R9".to_owned()),
                message: "not mine".to_owned(),
                occurred_at: base + Duration::hours(1),
            }))
            .collect();
        let reports = vec![report("user-1", None, 1, 735), report("user-1", None, 2, 4095)];

        let overview = IndividualOverview::build(&user, &reports, &activities);

        let messages: Vec<_> =
            overview.recent_activities.iter().map(|a| a.message.as_str()).collect();
        assert_eq!(messages, vec!["step 4", "step 3", "step 2"]);
        assert_eq!(overview.total_reports, 2);
        assert_eq!(overview.estimated_value, Decimal::from(4830));
    }

    #[test]
    fn individual_estimated_value_caps_instead_of_overflowing() {
        let user = UserId("user-1".to_owned());
        let mut reports = vec![report("user-1", None, 1, 0), report("user-1", None, 2, 0)];
        for stored in &mut reports {
            stored.price = Decimal::MAX;
        }

        let overview = IndividualOverview::build(&user, &reports, &[]);

        assert_eq!(overview.total_reports, 2);
        assert_eq!(overview.estimated_value, Decimal::MAX);
    }
}
