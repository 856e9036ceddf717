pub mod activities;
pub mod config;
pub mod dashboard;
pub mod doctor;
pub mod migrate;
pub mod quote;
pub mod recyclers;
pub mod report;
pub mod request;

use std::future::Future;

use ewaste_core::config::{AppConfig, LoadOptions};
use ewaste_core::errors::ApplicationError;
use ewaste_core::pricing::QuoteCalculator;
use ewaste_core::workflow::PickupWorkflow;
use ewaste_db::{connect_with_config, migrations, DbPool, PickupService};
use serde::Serialize;
use serde_json::Value;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_DB_CONNECTIVITY: u8 = 4;
pub const EXIT_MIGRATION: u8 = 5;
pub const EXIT_DOMAIN: u8 = 6;
pub const EXIT_PERSISTENCE: u8 = 7;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    error_class: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Error class, message and exit code of a failed command step.
pub(crate) type CommandFailure = (&'static str, String, u8);

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: None,
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn success_with_data(
        command: &str,
        message: impl Into<String>,
        data: &impl Serialize,
    ) -> Self {
        let data = match serde_json::to_value(data) {
            Ok(data) => data,
            Err(error) => {
                return Self::failure(command, "serialization", error.to_string(), EXIT_RUNTIME)
            }
        };
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: message.into(),
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: message.into(),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }

    fn from_failure(command: &str, (error_class, message, exit_code): CommandFailure) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config(command: &str) -> Result<AppConfig, CommandResult> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        CommandResult::failure(
            command,
            "config_validation",
            format!("configuration issue: {error}"),
            EXIT_CONFIG,
        )
    })
}

pub(crate) fn build_calculator(config: &AppConfig) -> Result<QuoteCalculator, CommandFailure> {
    config
        .pricing_tables()
        .map(QuoteCalculator::new)
        .map_err(|error| ("config_validation", format!("pricing tables: {error}"), EXIT_CONFIG))
}

pub(crate) fn application_failure(error: ApplicationError) -> CommandFailure {
    let exit_code = match &error {
        ApplicationError::Domain(_) => EXIT_DOMAIN,
        ApplicationError::Persistence(_) | ApplicationError::Conflict(_) => EXIT_PERSISTENCE,
        ApplicationError::Configuration(_) => EXIT_CONFIG,
    };
    (error.error_class(), error.to_string(), exit_code)
}

/// Runs `body` against a migrated store on a fresh current-thread runtime.
pub(crate) fn with_service<F, Fut>(command: &str, body: F) -> CommandResult
where
    F: FnOnce(PickupService) -> Fut,
    Fut: Future<Output = Result<CommandResult, CommandFailure>>,
{
    let config = match load_config(command) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let calculator = match build_calculator(&config) {
        Ok(calculator) => calculator,
        Err(failure) => return CommandResult::from_failure(command, failure),
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                EXIT_RUNTIME,
            );
        }
    };

    let outcome = runtime.block_on(async {
        let pool = open_store(&config).await?;
        let service = PickupService::sql(
            pool.clone(),
            calculator,
            PickupWorkflow::new(config.workflow.transition_policy),
        );
        let outcome = body(service).await;
        pool.close().await;
        outcome
    });

    outcome.unwrap_or_else(|failure| CommandResult::from_failure(command, failure))
}

pub(crate) async fn open_store(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    let pool = connect_with_config(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;
    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;
    tracing::debug!(
        event_name = "cli.store_ready",
        database_url = %config.database.url,
        "database opened and migrated"
    );
    Ok(pool)
}

pub(crate) fn correlation_id(command: &str) -> String {
    format!("cli-{command}-{}", uuid::Uuid::new_v4())
}
