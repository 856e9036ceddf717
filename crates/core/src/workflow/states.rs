use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::activity::ActivityRecord;
use crate::domain::pickup::{PickupRequest, PickupStatus};

/// How strictly status changes are gated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionPolicy {
    /// Any status may be set from any other, including skipping stages.
    Permissive,
    /// Only one step along the allowed-successors map.
    Strict,
}

impl TransitionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Strict => "strict",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "permissive" => Some(Self::Permissive),
            "strict" => Some(Self::Strict),
            _ => None,
        }
    }
}

pub fn allowed_successors(status: PickupStatus) -> &'static [PickupStatus] {
    use PickupStatus::{
        Accepted, AgentArrived, AgentComing, EwasteChecked, PaymentReceived, Pending, Rejected,
    };

    match status {
        Pending => &[Accepted, Rejected],
        Accepted => &[AgentComing],
        AgentComing => &[AgentArrived],
        AgentArrived => &[EwasteChecked],
        EwasteChecked => &[PaymentReceived],
        Rejected | PaymentReceived => &[],
    }
}

/// Message shown to the requesting user after a status change.
pub fn activity_message(status: PickupStatus) -> &'static str {
    match status {
        PickupStatus::AgentComing => "Delivery agent is coming to pick the E-waste.",
        PickupStatus::AgentArrived => "Delivery agent has arrived at your location.",
        PickupStatus::EwasteChecked => "E-waste has been checked.",
        PickupStatus::PaymentReceived => "Payment has been received.",
        _ => "Status updated.",
    }
}

/// Result of a successful transition: the request as it should be persisted
/// and the activity to append alongside it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupTransition {
    pub from: PickupStatus,
    pub request: PickupRequest,
    pub activity: ActivityRecord,
    pub transitioned_at: DateTime<Utc>,
}

impl PickupTransition {
    pub fn to(&self) -> PickupStatus {
        self.request.status
    }
}

#[cfg(test)]
mod tests {
    use super::{activity_message, allowed_successors, TransitionPolicy};
    use crate::domain::pickup::PickupStatus;

    #[test]
    fn messages_cover_pickup_stages_and_default() {
        assert_eq!(
            activity_message(PickupStatus::AgentComing),
            "Delivery agent is coming to pick the E-waste."
        );
        assert_eq!(
            activity_message(PickupStatus::AgentArrived),
            "Delivery agent has arrived at your location."
        );
        assert_eq!(activity_message(PickupStatus::EwasteChecked), "E-waste has been checked.");
        assert_eq!(activity_message(PickupStatus::PaymentReceived), "Payment has been received.");
        assert_eq!(activity_message(PickupStatus::Accepted), "Status updated.");
        assert_eq!(activity_message(PickupStatus::Rejected), "Status updated.");
    }

    #[test]
    fn successor_map_is_linear_after_acceptance() {
        assert_eq!(
            allowed_successors(PickupStatus::Pending),
            &[PickupStatus::Accepted, PickupStatus::Rejected]
        );
        let mut status = PickupStatus::Accepted;
        let mut path = vec![status];
        while let [next] = allowed_successors(status) {
            status = *next;
            path.push(status);
        }
        assert_eq!(status, PickupStatus::PaymentReceived);
        assert_eq!(path.len(), 5);
        assert!(allowed_successors(PickupStatus::Rejected).is_empty());
    }

    #[test]
    fn policy_parses_config_values() {
        assert_eq!(TransitionPolicy::parse("Strict"), Some(TransitionPolicy::Strict));
        assert_eq!(TransitionPolicy::parse("permissive"), Some(TransitionPolicy::Permissive));
        assert_eq!(TransitionPolicy::parse("lenient"), None);
    }
}
