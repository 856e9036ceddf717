use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::domain::activity::{ActivityId, ActivityRecord};
use crate::domain::pickup::{PickupRequest, PickupStatus};
use crate::workflow::states::{
    activity_message, allowed_successors, PickupTransition, TransitionPolicy,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("invalid pickup transition from {from} to {to}")]
    InvalidTransition { from: PickupStatus, to: PickupStatus },
    #[error("unknown pickup status `{0}`")]
    UnknownStatus(String),
}

pub fn parse_status(value: &str) -> Result<PickupStatus, WorkflowError> {
    PickupStatus::parse(value).ok_or_else(|| WorkflowError::UnknownStatus(value.to_owned()))
}

/// Pure pickup lifecycle: computes the next request state and the activity
/// record that must be stored with it. Nothing here touches storage.
#[derive(Clone, Debug)]
pub struct PickupWorkflow {
    policy: TransitionPolicy,
}

impl PickupWorkflow {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn permissive() -> Self {
        Self::new(TransitionPolicy::Permissive)
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    pub fn initial_status(&self) -> PickupStatus {
        PickupStatus::Pending
    }

    pub fn can_transition(&self, from: PickupStatus, to: PickupStatus) -> bool {
        match self.policy {
            TransitionPolicy::Permissive => true,
            TransitionPolicy::Strict => allowed_successors(from).contains(&to),
        }
    }

    /// The input request is left untouched; callers persist
    /// `PickupTransition::request` and only then treat the change as applied.
    pub fn transition(
        &self,
        request: &PickupRequest,
        next: PickupStatus,
        at: DateTime<Utc>,
    ) -> Result<PickupTransition, WorkflowError> {
        let from = request.status;
        if !self.can_transition(from, next) {
            return Err(WorkflowError::InvalidTransition { from, to: next });
        }

        let mut updated = request.clone();
        updated.status = next;

        let activity = ActivityRecord {
            id: ActivityId(Uuid::new_v4().to_string()),
            user_id: request.user_id().clone(),
            request_id: request.id.clone(),
            message: activity_message(next).to_owned(),
            occurred_at: at,
        };

        Ok(PickupTransition { from, request: updated, activity, transitioned_at: at })
    }

    pub fn transition_with_audit<S>(
        &self,
        request: &PickupRequest,
        next: PickupStatus,
        at: DateTime<Utc>,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<PickupTransition, WorkflowError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.transition(request, next, at);
        match &result {
            Ok(transition) => sink.emit(
                AuditEvent::new(
                    audit,
                    "pickup.transition_computed",
                    AuditCategory::Workflow,
                    AuditOutcome::Success,
                )
                .with_metadata("from", transition.from.as_str())
                .with_metadata("to", transition.to().as_str())
                .with_metadata("policy", self.policy.as_str()),
            ),
            Err(error) => sink.emit(
                AuditEvent::new(
                    audit,
                    "pickup.transition_rejected",
                    AuditCategory::Workflow,
                    AuditOutcome::Rejected,
                )
                .with_metadata("error", error.to_string())
                .with_metadata("policy", self.policy.as_str()),
            ),
        }
        result
    }
}

impl Default for PickupWorkflow {
    fn default() -> Self {
        Self::new(TransitionPolicy::Strict)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::domain::party::{BusinessId, UserId};
    use crate::domain::pickup::{
        PickupRequest, PickupRequestId, PickupStatus, RecyclerSnapshot, Requester,
    };
    use crate::workflow::engine::{parse_status, PickupWorkflow, WorkflowError};
    use crate::workflow::states::TransitionPolicy;

    fn request(status: PickupStatus) -> PickupRequest {
        PickupRequest {
            id: PickupRequestId("REQ-1".to_owned()),
            requester: Requester {
                user_id: UserId("user-1".to_owned()),
                display_name: "Asha".to_owned(),
                email: "asha@example.com".to_owned(),
                address: "12 Ring Road, Surat".to_owned(),
            },
            recycler: RecyclerSnapshot {
                business_id: BusinessId("biz-1".to_owned()),
                name: "Green Moon".to_owned(),
                address: "Muglisara Main Rd".to_owned(),
                mobile: "+91 9316877703".to_owned(),
                website: "https://gmoonwaste.com/".to_owned(),
            },
            category: "Laptop".to_owned(),
            quantity: 2,
            status,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn accepted_to_agent_coming_produces_pickup_message() {
        let workflow = PickupWorkflow::default();
        let at = Utc::now();
        let original = request(PickupStatus::Accepted);

        let transition = workflow
            .transition(&original, PickupStatus::AgentComing, at)
            .expect("accepted -> agent-coming");

        assert_eq!(transition.to(), PickupStatus::AgentComing);
        assert_eq!(transition.from, PickupStatus::Accepted);
        assert_eq!(transition.activity.message, "Delivery agent is coming to pick the E-waste.");
        assert_eq!(transition.activity.user_id, UserId("user-1".to_owned()));
        assert_eq!(transition.activity.request_id, original.id);
        assert_eq!(transition.activity.occurred_at, at);
        assert_eq!(original.status, PickupStatus::Accepted, "input request is not mutated");
    }

    #[test]
    fn permissive_policy_sets_any_status_from_any_status() {
        let workflow = PickupWorkflow::permissive();
        for from in PickupStatus::ALL {
            for to in PickupStatus::ALL {
                let transition =
                    workflow.transition(&request(from), to, Utc::now()).expect("permissive");
                assert_eq!(transition.to(), to);
            }
        }
    }

    #[test]
    fn permissive_policy_lets_pending_skip_to_payment() {
        let workflow = PickupWorkflow::new(TransitionPolicy::Permissive);
        let transition = workflow
            .transition(&request(PickupStatus::Pending), PickupStatus::PaymentReceived, Utc::now())
            .expect("permissive skip");

        assert_eq!(transition.to(), PickupStatus::PaymentReceived);
        assert_eq!(transition.activity.message, "Payment has been received.");
    }

    #[test]
    fn strict_policy_rejects_skipping_stages() {
        let workflow = PickupWorkflow::default();
        let error = workflow
            .transition(&request(PickupStatus::Pending), PickupStatus::PaymentReceived, Utc::now())
            .expect_err("pending cannot jump to payment-received");

        assert_eq!(
            error,
            WorkflowError::InvalidTransition {
                from: PickupStatus::Pending,
                to: PickupStatus::PaymentReceived
            }
        );
    }

    #[test]
    fn strict_policy_walks_the_full_pickup_path() {
        let workflow = PickupWorkflow::default();
        let path = [
            PickupStatus::Accepted,
            PickupStatus::AgentComing,
            PickupStatus::AgentArrived,
            PickupStatus::EwasteChecked,
            PickupStatus::PaymentReceived,
        ];

        let mut current = request(workflow.initial_status());
        let mut messages = Vec::new();
        for next in path {
            let transition = workflow.transition(&current, next, Utc::now()).expect("next step");
            messages.push(transition.activity.message.clone());
            current = transition.request;
        }

        assert_eq!(current.status, PickupStatus::PaymentReceived);
        assert_eq!(messages.first().map(String::as_str), Some("Status updated."));
        assert_eq!(messages.last().map(String::as_str), Some("Payment has been received."));
        assert!(workflow
            .transition(&current, PickupStatus::AgentComing, Utc::now())
            .is_err());
    }

    #[test]
    fn strict_policy_treats_rejected_as_terminal() {
        let workflow = PickupWorkflow::default();
        let rejected = request(PickupStatus::Rejected);
        for next in PickupStatus::ALL {
            assert!(workflow.transition(&rejected, next, Utc::now()).is_err());
        }
    }

    #[test]
    fn unknown_status_strings_are_reported() {
        assert_eq!(parse_status("ewaste-checked"), Ok(PickupStatus::EwasteChecked));
        assert_eq!(parse_status("completed"), Err(WorkflowError::UnknownStatus("completed".to_owned())));
    }

    #[test]
    fn transition_emits_audit_event_for_success_and_rejection() {
        let workflow = PickupWorkflow::default();
        let sink = InMemoryAuditSink::default();
        let audit = AuditContext::new(Some(PickupRequestId("REQ-1".to_owned())), "req-9", "biz-1");

        workflow
            .transition_with_audit(
                &request(PickupStatus::Accepted),
                PickupStatus::AgentComing,
                Utc::now(),
                &sink,
                &audit,
            )
            .expect("valid step");
        let _ = workflow.transition_with_audit(
            &request(PickupStatus::Accepted),
            PickupStatus::PaymentReceived,
            Utc::now(),
            &sink,
            &audit,
        );

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].event_type, "pickup.transition_computed");
        assert_eq!(events[1].event_type, "pickup.transition_rejected");
        assert_eq!(events[1].correlation_id, "req-9");
    }
}
