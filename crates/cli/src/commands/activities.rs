use clap::Args;
use ewaste_core::dashboard::RECENT_ACTIVITY_LIMIT;
use ewaste_core::domain::party::UserId;

use crate::commands::{application_failure, with_service, CommandResult};

#[derive(Debug, Clone, Args)]
pub struct ActivitiesArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long, default_value_t = RECENT_ACTIVITY_LIMIT)]
    pub limit: usize,
    #[arg(long, help = "Return the whole feed instead of the most recent entries")]
    pub all: bool,
}

/// Newest-first activity feed for one user.
pub fn run(args: ActivitiesArgs) -> CommandResult {
    let user = UserId(args.user);
    let limit = (!args.all).then_some(args.limit);

    with_service("activities", |service| async move {
        let feed = service.recent_activities(&user, limit).await.map_err(application_failure)?;
        Ok(CommandResult::success_with_data(
            "activities",
            format!("{} activity record(s) for {user}", feed.len()),
            &feed,
        ))
    })
}
