use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::party::{BusinessId, UserId};
use crate::domain::recycler::Recycler;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PickupRequestId(pub String);

impl fmt::Display for PickupRequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle of a pickup request. The wire form is kebab-case (`agent-coming`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PickupStatus {
    Pending,
    Accepted,
    Rejected,
    AgentComing,
    AgentArrived,
    EwasteChecked,
    PaymentReceived,
}

impl PickupStatus {
    pub const ALL: [PickupStatus; 7] = [
        Self::Pending,
        Self::Accepted,
        Self::Rejected,
        Self::AgentComing,
        Self::AgentArrived,
        Self::EwasteChecked,
        Self::PaymentReceived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::AgentComing => "agent-coming",
            Self::AgentArrived => "agent-arrived",
            Self::EwasteChecked => "ewaste-checked",
            Self::PaymentReceived => "payment-received",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "accepted" => Some(Self::Accepted),
            "rejected" => Some(Self::Rejected),
            "agent-coming" => Some(Self::AgentComing),
            "agent-arrived" => Some(Self::AgentArrived),
            "ewaste-checked" => Some(Self::EwasteChecked),
            "payment-received" => Some(Self::PaymentReceived),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::PaymentReceived)
    }

    /// True for the business-driven states that follow acceptance.
    pub fn is_pickup_stage(&self) -> bool {
        matches!(
            self,
            Self::AgentComing | Self::AgentArrived | Self::EwasteChecked | Self::PaymentReceived
        )
    }
}

impl fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The submitting user as known at request time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requester {
    pub user_id: UserId,
    pub display_name: String,
    pub email: String,
    pub address: String,
}

/// Copy of the recycler's contact details taken when the request is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecyclerSnapshot {
    pub business_id: BusinessId,
    pub name: String,
    pub address: String,
    pub mobile: String,
    pub website: String,
}

impl From<&Recycler> for RecyclerSnapshot {
    fn from(recycler: &Recycler) -> Self {
        Self {
            business_id: recycler.id.clone(),
            name: recycler.name.clone(),
            address: recycler.address.clone(),
            mobile: recycler.mobile.clone(),
            website: recycler.website.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickupRequest {
    pub id: PickupRequestId,
    pub requester: Requester,
    pub recycler: RecyclerSnapshot,
    pub category: String,
    pub quantity: u32,
    pub status: PickupStatus,
    pub created_at: DateTime<Utc>,
}

impl PickupRequest {
    pub fn user_id(&self) -> &UserId {
        &self.requester.user_id
    }

    pub fn business_id(&self) -> &BusinessId {
        &self.recycler.business_id
    }
}

#[cfg(test)]
mod tests {
    use super::PickupStatus;

    #[test]
    fn status_strings_parse_back_to_the_same_variant() {
        for status in PickupStatus::ALL {
            assert_eq!(PickupStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(PickupStatus::parse(" Agent-Coming "), Some(PickupStatus::AgentComing));
        assert_eq!(PickupStatus::parse("completed"), None);
    }

    #[test]
    fn serde_uses_kebab_case_wire_names() {
        let json = serde_json::to_string(&PickupStatus::EwasteChecked).expect("serialize");
        assert_eq!(json, "\"ewaste-checked\"");
    }

    #[test]
    fn only_rejected_and_paid_are_terminal() {
        let terminal: Vec<_> = PickupStatus::ALL.into_iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![PickupStatus::Rejected, PickupStatus::PaymentReceived]);
    }
}
