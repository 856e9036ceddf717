pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use commands::activities::ActivitiesArgs;
use commands::dashboard::DashboardCommand;
use commands::quote::QuoteArgs;
use commands::report::ReportCommand;
use commands::request::RequestCommand;

#[derive(Debug, Parser)]
#[command(
    name = "ewaste",
    about = "E-waste pickup operator CLI",
    long_about = "Price e-waste, manage pickup requests through their lifecycle, and inspect \
                  dashboards, configuration and database readiness.",
    after_help = "Examples:\n  ewaste quote --category Laptop --weight 3 --brand HP\n  \
                  ewaste request transition --business <id> --request <id> --status accepted\n  \
                  ewaste doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, pricing tables, and DB connectivity")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Estimate the price of an e-waste item without storing anything")]
    Quote {
        #[command(flatten)]
        quote: QuoteArgs,
        #[arg(long, help = "Fail instead of warning when the inputs are incomplete or invalid")]
        validate: bool,
    },
    #[command(subcommand, about = "Submit priced e-waste reports")]
    Report(ReportCommand),
    #[command(subcommand, about = "Create, list, and advance pickup requests")]
    Request(RequestCommand),
    #[command(about = "Show a user's most recent pickup activity")]
    Activities(ActivitiesArgs),
    #[command(subcommand, about = "Business and individual dashboard summaries")]
    Dashboard(DashboardCommand),
    #[command(about = "List recyclers that accept pickup requests")]
    Recyclers,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Quote { quote, validate } => commands::quote::run(&quote, validate),
        Command::Report(command) => commands::report::run(command),
        Command::Request(command) => commands::request::run(command),
        Command::Activities(args) => commands::activities::run(args),
        Command::Dashboard(command) => commands::dashboard::run(command),
        Command::Recyclers => commands::recyclers::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
