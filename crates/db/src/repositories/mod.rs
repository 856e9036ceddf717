use async_trait::async_trait;
use thiserror::Error;

use ewaste_core::domain::activity::ActivityRecord;
use ewaste_core::domain::party::{BusinessId, UserId};
use ewaste_core::domain::pickup::{PickupRequest, PickupRequestId};
use ewaste_core::domain::report::{EwasteReport, EwasteReportId};
use ewaste_core::workflow::PickupTransition;

pub mod activity;
pub mod memory;
pub mod pickup;
pub mod report;

mod codec;

pub use activity::SqlActivityRepository;
pub use memory::{InMemoryEwasteReportRepository, InMemoryPickupStore};
pub use pickup::SqlPickupRepository;
pub use report::SqlEwasteReportRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("write conflict: {0}")]
    Conflict(String),
}

#[async_trait]
pub trait PickupRequestRepository: Send + Sync {
    async fn find_by_id(
        &self,
        id: &PickupRequestId,
    ) -> Result<Option<PickupRequest>, RepositoryError>;

    /// Inserts a new request; an existing id is a `Conflict`.
    async fn create(&self, request: PickupRequest) -> Result<(), RepositoryError>;

    async fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<PickupRequest>, RepositoryError>;

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<PickupRequest>, RepositoryError>;

    /// Stores the new status and appends the transition's activity as one unit.
    ///
    /// The status write only lands if the stored status still equals
    /// `transition.from`; otherwise nothing is written and `Conflict` is returned.
    async fn apply_transition(&self, transition: &PickupTransition) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Newest first. `limit` of `None` returns the whole feed.
    async fn list_for_user(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityRecord>, RepositoryError>;

    /// Oldest first, i.e. in lifecycle order.
    async fn list_for_request(
        &self,
        request_id: &PickupRequestId,
    ) -> Result<Vec<ActivityRecord>, RepositoryError>;
}

#[async_trait]
pub trait EwasteReportRepository: Send + Sync {
    async fn find_by_id(&self, id: &EwasteReportId)
        -> Result<Option<EwasteReport>, RepositoryError>;

    async fn save(&self, report: EwasteReport) -> Result<(), RepositoryError>;

    async fn list_for_user(&self, user_id: &UserId) -> Result<Vec<EwasteReport>, RepositoryError>;

    async fn list_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<EwasteReport>, RepositoryError>;
}
