use clap::{Args, Subcommand};
use ewaste_core::domain::party::{BusinessId, UserId};
use ewaste_core::pricing::display_price;
use ewaste_db::NewEwasteReport;

use crate::commands::quote::QuoteArgs;
use crate::commands::{application_failure, correlation_id, with_service, CommandResult};

#[derive(Debug, Clone, Subcommand)]
pub enum ReportCommand {
    #[command(about = "Validate, price and store an e-waste report")]
    Submit(SubmitReportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SubmitReportArgs {
    #[arg(long)]
    pub user: String,
    #[arg(long, help = "Recycler the items are intended for")]
    pub business: Option<String>,
    #[command(flatten)]
    pub quote: QuoteArgs,
}

pub fn run(command: ReportCommand) -> CommandResult {
    match command {
        ReportCommand::Submit(args) => submit(args),
    }
}

fn submit(args: SubmitReportArgs) -> CommandResult {
    let correlation_id = correlation_id("report_submit");
    let draft = NewEwasteReport {
        user_id: UserId(args.user),
        business_id: args.business.map(BusinessId),
        quote: args.quote.to_input(),
    };

    with_service("report_submit", |service| async move {
        let report =
            service.submit_report(draft, &correlation_id).await.map_err(application_failure)?;
        Ok(CommandResult::success_with_data(
            "report_submit",
            format!("report {} priced at {}", report.id, display_price(report.price)),
            &report,
        ))
    })
}
