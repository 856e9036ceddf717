use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use ewaste_core::audit::{
    AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink, TracingAuditSink,
};
use ewaste_core::dashboard::{BusinessOverview, IndividualOverview};
use ewaste_core::domain::activity::ActivityRecord;
use ewaste_core::domain::party::{BusinessId, UserId};
use ewaste_core::domain::pickup::{
    PickupRequest, PickupRequestId, PickupStatus, RecyclerSnapshot, Requester,
};
use ewaste_core::domain::recycler::RecyclerDirectory;
use ewaste_core::domain::report::{EwasteReport, EwasteReportId};
use ewaste_core::errors::{ApplicationError, DomainError};
use ewaste_core::pricing::{QuoteCalculator, QuoteInput};
use ewaste_core::workflow::{PickupTransition, PickupWorkflow};

use crate::repositories::{
    ActivityRepository, EwasteReportRepository, InMemoryEwasteReportRepository,
    InMemoryPickupStore, PickupRequestRepository, RepositoryError, SqlActivityRepository,
    SqlEwasteReportRepository, SqlPickupRepository,
};
use crate::DbPool;

const ANONYMOUS_DISPLAY_NAME: &str = "Anonymous";

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict(message) => Self::Conflict(message),
            other => Self::Persistence(other.to_string()),
        }
    }
}

/// A user's pickup submission before it is assigned an id and status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPickupRequest {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub email: String,
    pub address: String,
    pub business_id: Option<BusinessId>,
    pub category: String,
    pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewEwasteReport {
    pub user_id: UserId,
    pub business_id: Option<BusinessId>,
    pub quote: QuoteInput,
}

/// Request intake, report pricing and status transitions over a pluggable store.
pub struct PickupService {
    requests: Arc<dyn PickupRequestRepository>,
    activities: Arc<dyn ActivityRepository>,
    reports: Arc<dyn EwasteReportRepository>,
    calculator: QuoteCalculator,
    workflow: PickupWorkflow,
    directory: RecyclerDirectory,
    audit: Arc<dyn AuditSink>,
}

impl PickupService {
    pub fn new(
        requests: Arc<dyn PickupRequestRepository>,
        activities: Arc<dyn ActivityRepository>,
        reports: Arc<dyn EwasteReportRepository>,
        calculator: QuoteCalculator,
        workflow: PickupWorkflow,
    ) -> Self {
        Self {
            requests,
            activities,
            reports,
            calculator,
            workflow,
            directory: RecyclerDirectory::default(),
            audit: Arc::new(TracingAuditSink),
        }
    }

    pub fn sql(pool: DbPool, calculator: QuoteCalculator, workflow: PickupWorkflow) -> Self {
        Self::new(
            Arc::new(SqlPickupRepository::new(pool.clone())),
            Arc::new(SqlActivityRepository::new(pool.clone())),
            Arc::new(SqlEwasteReportRepository::new(pool)),
            calculator,
            workflow,
        )
    }

    pub fn in_memory(calculator: QuoteCalculator, workflow: PickupWorkflow) -> Self {
        let store = Arc::new(InMemoryPickupStore::default());
        Self::new(
            store.clone(),
            store,
            Arc::new(InMemoryEwasteReportRepository::default()),
            calculator,
            workflow,
        )
    }

    pub fn with_directory(mut self, directory: RecyclerDirectory) -> Self {
        self.directory = directory;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn calculator(&self) -> &QuoteCalculator {
        &self.calculator
    }

    pub fn workflow(&self) -> &PickupWorkflow {
        &self.workflow
    }

    pub fn directory(&self) -> &RecyclerDirectory {
        &self.directory
    }

    pub async fn create_request(
        &self,
        draft: NewPickupRequest,
        correlation_id: &str,
    ) -> Result<PickupRequest, ApplicationError> {
        let business_id = draft
            .business_id
            .ok_or_else(|| invalid_input("a recycler must be selected for the pickup"))?;
        let recycler = self
            .directory
            .find(&business_id)
            .ok_or_else(|| invalid_input(format!("unknown recycler `{business_id}`")))?;

        let address = draft.address.trim();
        if address.is_empty() {
            return Err(invalid_input("pickup address must not be empty"));
        }
        if draft.category.trim().is_empty() {
            return Err(invalid_input("e-waste category must not be empty"));
        }
        if draft.quantity == 0 {
            return Err(invalid_input("quantity must be at least 1"));
        }

        let display_name = draft
            .display_name
            .map(|name| name.trim().to_owned())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| ANONYMOUS_DISPLAY_NAME.to_owned());

        let request = PickupRequest {
            id: PickupRequestId(Uuid::new_v4().to_string()),
            requester: Requester {
                user_id: draft.user_id,
                display_name,
                email: draft.email.trim().to_owned(),
                address: address.to_owned(),
            },
            recycler: RecyclerSnapshot::from(recycler),
            category: draft.category.trim().to_owned(),
            quantity: draft.quantity,
            status: self.workflow.initial_status(),
            created_at: Utc::now(),
        };

        self.requests.create(request.clone()).await?;

        let context = AuditContext::new(
            Some(request.id.clone()),
            correlation_id,
            request.user_id().0.as_str(),
        );
        self.audit.emit(
            AuditEvent::new(
                &context,
                "pickup.request_created",
                AuditCategory::Intake,
                AuditOutcome::Success,
            )
            .with_metadata("business_id", request.business_id().0.as_str())
            .with_metadata("category", request.category.as_str()),
        );
        info!(
            event_name = "pickup.request_created",
            request_id = %request.id,
            business_id = %request.business_id(),
            correlation_id,
            "pickup request created"
        );

        Ok(request)
    }

    /// Prices the report with the configured tables and stores it. Incomplete
    /// or invalid quote inputs are rejected rather than priced at zero.
    pub async fn submit_report(
        &self,
        draft: NewEwasteReport,
        correlation_id: &str,
    ) -> Result<EwasteReport, ApplicationError> {
        if let Some(business_id) = &draft.business_id {
            if self.directory.find(business_id).is_none() {
                return Err(invalid_input(format!("unknown recycler `{business_id}`")));
            }
        }

        self.calculator.validate(&draft.quote).map_err(DomainError::from)?;
        let price = self.calculator.estimate(&draft.quote);

        let quote = draft.quote;
        let report = EwasteReport {
            id: EwasteReportId(Uuid::new_v4().to_string()),
            user_id: draft.user_id,
            business_id: draft.business_id,
            category: quote.category.unwrap_or_default(),
            quantity: quote.quantity,
            weight_kg: quote.weight_kg,
            brand: quote.brand,
            condition: quote.condition,
            price,
            submitted_at: Utc::now(),
        };

        self.reports.save(report.clone()).await?;

        let context = AuditContext::new(None, correlation_id, report.user_id.0.as_str());
        self.audit.emit(
            AuditEvent::new(
                &context,
                "report.submitted",
                AuditCategory::Pricing,
                AuditOutcome::Success,
            )
            .with_metadata("report_id", report.id.0.as_str())
            .with_metadata("price", report.price.to_string()),
        );
        info!(
            event_name = "report.submitted",
            report_id = %report.id,
            category = %report.category,
            price = %report.price,
            correlation_id,
            "e-waste report priced and stored"
        );

        Ok(report)
    }

    /// Moves a request to `next` on behalf of `actor`.
    ///
    /// Only the assigned business may drive a request. The new status and its
    /// activity are written together; if the stored status moved on since the
    /// request was read the call fails with `Conflict` and nothing is written.
    pub async fn update_status(
        &self,
        actor: &BusinessId,
        request_id: &PickupRequestId,
        next: PickupStatus,
        correlation_id: &str,
    ) -> Result<PickupTransition, ApplicationError> {
        let context = AuditContext::new(Some(request_id.clone()), correlation_id, actor.0.as_str());
        let request = self.find_request(request_id).await?;

        if request.business_id() != actor {
            self.audit.emit(
                AuditEvent::new(
                    &context,
                    "pickup.transition_rejected",
                    AuditCategory::Workflow,
                    AuditOutcome::Rejected,
                )
                .with_metadata("reason", "not_assigned_business"),
            );
            warn!(
                event_name = "pickup.transition_forbidden",
                request_id = %request_id,
                actor = %actor,
                correlation_id,
                "business is not assigned to this pickup request"
            );
            return Err(DomainError::NotAssignedBusiness {
                request_id: request_id.clone(),
                actor: actor.clone(),
            }
            .into());
        }

        let transition = self
            .workflow
            .transition_with_audit(&request, next, Utc::now(), self.audit.as_ref(), &context)
            .map_err(DomainError::from)?;

        if let Err(error) = self.requests.apply_transition(&transition).await {
            self.audit.emit(
                AuditEvent::new(
                    &context,
                    "pickup.transition_failed",
                    AuditCategory::Persistence,
                    AuditOutcome::Failed,
                )
                .with_metadata("error", error.to_string()),
            );
            warn!(
                event_name = "pickup.transition_failed",
                request_id = %request_id,
                from = %transition.from,
                to = %transition.to(),
                correlation_id,
                error = %error,
                "pickup transition was not persisted"
            );
            return Err(error.into());
        }

        self.audit.emit(
            AuditEvent::new(
                &context,
                "pickup.transition_applied",
                AuditCategory::Workflow,
                AuditOutcome::Success,
            )
            .with_metadata("from", transition.from.as_str())
            .with_metadata("to", transition.to().as_str())
            .with_metadata("activity_id", transition.activity.id.0.as_str()),
        );
        info!(
            event_name = "pickup.transition_applied",
            request_id = %request_id,
            from = %transition.from,
            to = %transition.to(),
            correlation_id,
            "pickup status updated"
        );

        Ok(transition)
    }

    pub async fn find_request(
        &self,
        request_id: &PickupRequestId,
    ) -> Result<PickupRequest, ApplicationError> {
        self.requests
            .find_by_id(request_id)
            .await?
            .ok_or_else(|| DomainError::RequestNotFound(request_id.clone()).into())
    }

    pub async fn requests_for_business(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<PickupRequest>, ApplicationError> {
        Ok(self.requests.list_for_business(business_id).await?)
    }

    pub async fn requests_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<PickupRequest>, ApplicationError> {
        Ok(self.requests.list_for_user(user_id).await?)
    }

    pub async fn recent_activities(
        &self,
        user_id: &UserId,
        limit: Option<usize>,
    ) -> Result<Vec<ActivityRecord>, ApplicationError> {
        Ok(self.activities.list_for_user(user_id, limit).await?)
    }

    pub async fn business_overview(
        &self,
        business_id: &BusinessId,
    ) -> Result<BusinessOverview, ApplicationError> {
        let requests = self.requests.list_for_business(business_id).await?;
        let reports = self.reports.list_for_business(business_id).await?;
        Ok(BusinessOverview::build(business_id, &requests, &reports))
    }

    pub async fn individual_overview(
        &self,
        user_id: &UserId,
    ) -> Result<IndividualOverview, ApplicationError> {
        let reports = self.reports.list_for_user(user_id).await?;
        let activities = self.activities.list_for_user(user_id, None).await?;
        Ok(IndividualOverview::build(user_id, &reports, &activities))
    }
}

fn invalid_input(message: impl Into<String>) -> ApplicationError {
    DomainError::InvalidInput(message.into()).into()
}
