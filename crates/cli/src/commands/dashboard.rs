use clap::Subcommand;
use ewaste_core::domain::party::{BusinessId, UserId};

use crate::commands::{application_failure, with_service, CommandResult};

#[derive(Debug, Clone, Subcommand)]
pub enum DashboardCommand {
    #[command(about = "Pending, in-progress and completed pickups for a recycler")]
    Business {
        #[arg(long)]
        business: String,
    },
    #[command(about = "Report totals and recent activity for an individual")]
    Individual {
        #[arg(long)]
        user: String,
    },
}

pub fn run(command: DashboardCommand) -> CommandResult {
    match command {
        DashboardCommand::Business { business } => {
            let business = BusinessId(business);
            with_service("dashboard_business", |service| async move {
                let overview =
                    service.business_overview(&business).await.map_err(application_failure)?;
                Ok(CommandResult::success_with_data(
                    "dashboard_business",
                    format!(
                        "{} pending, {} in progress, {} completed, {} rejected",
                        overview.pending.len(),
                        overview.in_progress.len(),
                        overview.completed.len(),
                        overview.rejected_count
                    ),
                    &overview,
                ))
            })
        }
        DashboardCommand::Individual { user } => {
            let user = UserId(user);
            with_service("dashboard_individual", |service| async move {
                let overview =
                    service.individual_overview(&user).await.map_err(application_failure)?;
                Ok(CommandResult::success_with_data(
                    "dashboard_individual",
                    format!("{} report(s) submitted", overview.total_reports),
                    &overview,
                ))
            })
        }
    }
}
