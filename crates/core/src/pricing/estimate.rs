use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::tables::{Condition, PricingTables};

/// Everything the e-waste form knows when it asks for a quote. Any field may
/// still be unset while the user is filling the form in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteInput {
    pub category: Option<String>,
    pub weight_kg: Option<Decimal>,
    pub brand: Option<String>,
    pub condition: Option<Condition>,
    pub quantity: u32,
}

impl Default for QuoteInput {
    fn default() -> Self {
        Self { category: None, weight_kg: None, brand: None, condition: None, quantity: 1 }
    }
}

impl QuoteInput {
    pub fn new(category: impl Into<String>) -> Self {
        Self { category: Some(category.into()), ..Self::default() }
    }

    pub fn weight(mut self, weight_kg: Decimal) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }

    pub fn brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuoteError {
    #[error("unknown e-waste category `{0}`")]
    UnknownCategory(String),
    #[error("invalid quote input: {0}")]
    InvalidInput(String),
    #[error("a weight must be selected for `{category}`")]
    MissingWeight { category: String },
    #[error("weight {weight_kg} kg is not offered for `{category}`")]
    WeightNotOffered { category: String, weight_kg: Decimal },
    #[error("brand `{brand}` is not offered for `{category}`")]
    BrandNotOffered { category: String, brand: String },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteTraceStep {
    pub stage: String,
    pub detail: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    pub category: Option<String>,
    pub recognized: bool,
    pub price: Decimal,
    pub steps: Vec<QuoteTraceStep>,
    /// The product left the `Decimal` range and `price` was capped at `Decimal::MAX`.
    #[serde(default)]
    pub saturated: bool,
}

impl QuoteBreakdown {
    /// Price as shown to users: two decimal places.
    pub fn display_price(&self) -> String {
        display_price(self.price)
    }
}

pub fn display_price(price: Decimal) -> String {
    let mut rounded = price.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(2);
    rounded.to_string()
}

/// Quote calculator over a fixed set of pricing tables.
#[derive(Clone, Debug, Default)]
pub struct QuoteCalculator {
    tables: PricingTables,
}

impl QuoteCalculator {
    pub fn new(tables: PricingTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &PricingTables {
        &self.tables
    }

    /// `weight * base[category] * quantity * brand * condition`.
    ///
    /// Never fails: unknown categories price at zero, a missing weight counts as
    /// 1 kg, and a zero quantity or non-positive weight clamps the price to zero.
    pub fn estimate(&self, input: &QuoteInput) -> Decimal {
        self.estimate_with_trace(input).price
    }

    pub fn estimate_with_trace(&self, input: &QuoteInput) -> QuoteBreakdown {
        let base = input.category.as_deref().and_then(|category| self.tables.base_price(category));
        let Some(base_price) = base else {
            return QuoteBreakdown {
                category: input.category.clone(),
                recognized: false,
                price: Decimal::ZERO,
                steps: vec![QuoteTraceStep {
                    stage: "category".to_owned(),
                    detail: "category unset or not in base price table".to_owned(),
                    amount: Decimal::ZERO,
                }],
                saturated: false,
            };
        };

        let weight = input.weight_kg.unwrap_or(Decimal::ONE);
        let quantity = Decimal::from(input.quantity);
        let brand_multiplier = self.tables.brand_multiplier(input.brand.as_deref());
        let condition_multiplier = self.tables.condition_multiplier(input.condition);

        let base_amount =
            weight.checked_mul(base_price).and_then(|amount| amount.checked_mul(quantity));
        let branded = base_amount.and_then(|amount| amount.checked_mul(brand_multiplier));
        let conditioned = branded.and_then(|amount| amount.checked_mul(condition_multiplier));

        let clamped = weight <= Decimal::ZERO || input.quantity == 0;
        let saturated = !clamped && conditioned.is_none();
        let price = match conditioned {
            _ if clamped => Decimal::ZERO,
            Some(amount) => amount.normalize(),
            None => Decimal::MAX,
        };

        let mut steps = vec![
            QuoteTraceStep {
                stage: "base".to_owned(),
                detail: format!("{weight} kg x {base_price}/kg x {quantity}"),
                amount: base_amount.unwrap_or(Decimal::MAX),
            },
            QuoteTraceStep {
                stage: "brand".to_owned(),
                detail: format!(
                    "{} x {brand_multiplier}",
                    input.brand.as_deref().unwrap_or("unbranded")
                ),
                amount: branded.unwrap_or(Decimal::MAX),
            },
            QuoteTraceStep {
                stage: "condition".to_owned(),
                detail: format!(
                    "{} x {condition_multiplier}",
                    input.condition.map(|c| c.as_str()).unwrap_or("unspecified")
                ),
                amount: conditioned.unwrap_or(Decimal::MAX),
            },
        ];
        if clamped && conditioned.map_or(true, |amount| !amount.is_zero()) {
            steps.push(QuoteTraceStep {
                stage: "clamp".to_owned(),
                detail: "non-positive weight or zero quantity".to_owned(),
                amount: Decimal::ZERO,
            });
        }
        if saturated {
            steps.push(QuoteTraceStep {
                stage: "overflow".to_owned(),
                detail: "amount exceeds the decimal range; capped".to_owned(),
                amount: Decimal::MAX,
            });
        }

        QuoteBreakdown {
            category: input.category.clone(),
            recognized: true,
            price,
            steps,
            saturated,
        }
    }

    /// Checks the input the way the submission form does. `estimate` itself
    /// never calls this.
    pub fn validate(&self, input: &QuoteInput) -> Result<(), QuoteError> {
        let category = input
            .category
            .as_deref()
            .ok_or_else(|| QuoteError::InvalidInput("an e-waste category is required".to_owned()))?;
        if self.tables.base_price(category).is_none() {
            return Err(QuoteError::UnknownCategory(category.to_owned()));
        }

        if input.quantity == 0 {
            return Err(QuoteError::InvalidInput("quantity must be at least 1".to_owned()));
        }
        if let Some(weight_kg) = input.weight_kg {
            if weight_kg <= Decimal::ZERO {
                return Err(QuoteError::InvalidInput("weight must be greater than zero".to_owned()));
            }
        }

        if let Some(brackets) = self.tables.weight_brackets(category) {
            let weight_kg = input
                .weight_kg
                .ok_or_else(|| QuoteError::MissingWeight { category: category.to_owned() })?;
            if !brackets.contains(&weight_kg) {
                return Err(QuoteError::WeightNotOffered { category: category.to_owned(), weight_kg });
            }
        }

        if let (Some(brands), Some(brand)) = (self.tables.brands(category), input.brand.as_deref()) {
            if !brands.iter().any(|offered| offered == brand) {
                return Err(QuoteError::BrandNotOffered {
                    category: category.to_owned(),
                    brand: brand.to_owned(),
                });
            }
        }

        if self.estimate_with_trace(input).saturated {
            return Err(QuoteError::InvalidInput(
                "weight and quantity give an amount too large to price".to_owned(),
            ));
        }

        Ok(())
    }
}
