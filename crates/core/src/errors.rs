use thiserror::Error;

use crate::domain::party::BusinessId;
use crate::domain::pickup::PickupRequestId;
use crate::pricing::QuoteError;
use crate::workflow::WorkflowError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Quote(#[from] QuoteError),
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("business {actor} is not assigned to pickup request {request_id}")]
    NotAssignedBusiness { request_id: PickupRequestId, actor: BusinessId },
    #[error("pickup request {0} was not found")]
    RequestNotFound(PickupRequestId),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("persistence failure: {0}")]
    Persistence(String),
    #[error("concurrent update rejected: {0}")]
    Conflict(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl ApplicationError {
    /// Stable machine-readable class used in command output.
    pub fn error_class(&self) -> &'static str {
        match self {
            Self::Domain(DomainError::Quote(_)) | Self::Domain(DomainError::InvalidInput(_)) => {
                "invalid_input"
            }
            Self::Domain(DomainError::Workflow(_)) => "invalid_transition",
            Self::Domain(DomainError::NotAssignedBusiness { .. }) => "forbidden",
            Self::Domain(DomainError::RequestNotFound(_)) => "not_found",
            Self::Persistence(_) => "persistence",
            Self::Conflict(_) => "conflict",
            Self::Configuration(_) => "config_validation",
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Domain(_) => "The request could not be processed. Check inputs and try again.",
            Self::Persistence(_) => "Saving failed. Please retry shortly.",
            Self::Conflict(_) => "The pickup request changed meanwhile. Reload and try again.",
            Self::Configuration(_) => "An unexpected internal error occurred.",
        }
    }
}
