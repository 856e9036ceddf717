use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::party::{BusinessId, UserId};
use crate::pricing::Condition;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EwasteReportId(pub String);

impl fmt::Display for EwasteReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An item batch an individual declared for recycling, priced at submission time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EwasteReport {
    pub id: EwasteReportId,
    pub user_id: UserId,
    pub business_id: Option<BusinessId>,
    pub category: String,
    pub quantity: u32,
    pub weight_kg: Option<Decimal>,
    pub brand: Option<String>,
    pub condition: Option<Condition>,
    pub price: Decimal,
    pub submitted_at: DateTime<Utc>,
}
