use clap::Args;
use ewaste_core::pricing::{display_price, Condition, QuoteBreakdown, QuoteInput};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{build_calculator, load_config, CommandResult, EXIT_DOMAIN};

#[derive(Debug, Clone, Args)]
pub struct QuoteArgs {
    #[arg(long, help = "E-waste category, e.g. \"Mobile Phone\"")]
    pub category: String,
    #[arg(long, help = "Weight in kg")]
    pub weight: Option<Decimal>,
    #[arg(long)]
    pub brand: Option<String>,
    #[arg(long, value_parser = parse_condition, help = "New | Used - Good | Used - Fair | Damaged")]
    pub condition: Option<Condition>,
    #[arg(long, default_value_t = 1)]
    pub quantity: u32,
}

impl QuoteArgs {
    pub fn to_input(&self) -> QuoteInput {
        QuoteInput {
            category: Some(self.category.clone()),
            weight_kg: self.weight,
            brand: self.brand.clone(),
            condition: self.condition,
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Serialize)]
struct QuotePayload {
    display_price: String,
    currency: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
    breakdown: QuoteBreakdown,
}

/// Prices without touching the store. Validation problems are reported as
/// warnings unless `strict` is set, matching the live form which shows a
/// price while the user is still choosing options.
pub fn run(args: &QuoteArgs, strict: bool) -> CommandResult {
    let config = match load_config("quote") {
        Ok(config) => config,
        Err(result) => return result,
    };
    let calculator = match build_calculator(&config) {
        Ok(calculator) => calculator,
        Err((error_class, message, exit_code)) => {
            return CommandResult::failure("quote", error_class, message, exit_code)
        }
    };

    let input = args.to_input();
    let warnings = match calculator.validate(&input) {
        Ok(()) => Vec::new(),
        Err(error) if strict => {
            return CommandResult::failure("quote", "invalid_input", error.to_string(), EXIT_DOMAIN)
        }
        Err(error) => vec![error.to_string()],
    };

    let breakdown = calculator.estimate_with_trace(&input);
    let payload = QuotePayload {
        display_price: display_price(breakdown.price),
        currency: config.pricing.currency.clone(),
        warnings,
        breakdown,
    };

    CommandResult::success_with_data(
        "quote",
        format!("{} {}", payload.currency, payload.display_price),
        &payload,
    )
}

pub(crate) fn parse_condition(value: &str) -> Result<Condition, String> {
    Condition::parse(value).ok_or_else(|| {
        format!("unknown condition `{value}` (expected New, Used - Good, Used - Fair or Damaged)")
    })
}
