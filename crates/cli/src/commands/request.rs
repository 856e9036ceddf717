use clap::{Args, Subcommand};
use ewaste_core::domain::party::{BusinessId, UserId};
use ewaste_core::domain::pickup::{PickupRequestId, PickupStatus};
use ewaste_core::workflow::parse_status;
use ewaste_db::NewPickupRequest;

use crate::commands::{application_failure, correlation_id, with_service, CommandResult};

#[derive(Debug, Clone, Subcommand)]
pub enum RequestCommand {
    #[command(about = "Request a pickup from a recycler")]
    Create(CreateRequestArgs),
    #[command(about = "Move a pickup request to its next status (recycler only)")]
    Transition(TransitionRequestArgs),
    #[command(about = "List pickup requests for a user or a recycler")]
    List(ListRequestArgs),
}

#[derive(Debug, Clone, Args)]
pub struct CreateRequestArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long, help = "Display name; defaults to Anonymous")]
    pub name: Option<String>,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub address: String,
    #[arg(long, help = "Recycler id from `ewaste recyclers`")]
    pub business: String,
    #[arg(long)]
    pub category: String,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
}

#[derive(Debug, Clone, Args)]
pub struct TransitionRequestArgs {
    #[arg(long, help = "Recycler performing the update")]
    pub business: String,
    #[arg(long)]
    pub request: String,
    #[arg(long, value_parser = parse_pickup_status, help = "Target status, e.g. agent-coming")]
    pub status: PickupStatus,
}

#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct ListRequestArgs {
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long)]
    pub business: Option<String>,
}

pub fn run(command: RequestCommand) -> CommandResult {
    match command {
        RequestCommand::Create(args) => create(args),
        RequestCommand::Transition(args) => transition(args),
        RequestCommand::List(args) => list(args),
    }
}

fn create(args: CreateRequestArgs) -> CommandResult {
    let correlation_id = correlation_id("request_create");
    let draft = NewPickupRequest {
        user_id: UserId(args.user),
        display_name: args.name,
        email: args.email,
        address: args.address,
        business_id: Some(BusinessId(args.business)),
        category: args.category,
        quantity: args.quantity,
    };

    with_service("request_create", |service| async move {
        let request =
            service.create_request(draft, &correlation_id).await.map_err(application_failure)?;
        Ok(CommandResult::success_with_data(
            "request_create",
            format!("pickup request {} is {}", request.id, request.status),
            &request,
        ))
    })
}

fn transition(args: TransitionRequestArgs) -> CommandResult {
    let correlation_id = correlation_id("request_transition");
    let actor = BusinessId(args.business);
    let request_id = PickupRequestId(args.request);
    let next = args.status;

    with_service("request_transition", |service| async move {
        let transition = service
            .update_status(&actor, &request_id, next, &correlation_id)
            .await
            .map_err(application_failure)?;
        Ok(CommandResult::success_with_data(
            "request_transition",
            format!("pickup request {request_id} moved from {} to {}", transition.from, next),
            &transition,
        ))
    })
}

fn list(args: ListRequestArgs) -> CommandResult {
    with_service("request_list", |service| async move {
        let requests = match (args.user, args.business) {
            (Some(user), _) => service.requests_for_user(&UserId(user)).await,
            (None, Some(business)) => service.requests_for_business(&BusinessId(business)).await,
            (None, None) => Ok(Vec::new()),
        }
        .map_err(application_failure)?;
        Ok(CommandResult::success_with_data(
            "request_list",
            format!("{} pickup request(s)", requests.len()),
            &requests,
        ))
    })
}

fn parse_pickup_status(value: &str) -> Result<PickupStatus, String> {
    parse_status(value).map_err(|error| error.to_string())
}
