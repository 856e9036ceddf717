pub mod audit;
pub mod config;
pub mod dashboard;
pub mod domain;
pub mod errors;
pub mod pricing;
pub mod workflow;

pub use audit::{AuditContext, AuditEvent, AuditSink, InMemoryAuditSink, TracingAuditSink};
pub use dashboard::{BusinessOverview, IndividualOverview};
pub use domain::activity::{ActivityId, ActivityRecord};
pub use domain::party::{BusinessId, UserId};
pub use domain::pickup::{
    PickupRequest, PickupRequestId, PickupStatus, RecyclerSnapshot, Requester,
};
pub use domain::recycler::{Recycler, RecyclerDirectory};
pub use domain::report::{EwasteReport, EwasteReportId};
pub use errors::{ApplicationError, DomainError};
pub use pricing::{Condition, PricingTables, QuoteCalculator, QuoteError, QuoteInput};
pub use workflow::{PickupTransition, PickupWorkflow, TransitionPolicy, WorkflowError};
