pub mod engine;
pub mod states;

pub use engine::{parse_status, PickupWorkflow, WorkflowError};
pub use states::{activity_message, allowed_successors, PickupTransition, TransitionPolicy};
