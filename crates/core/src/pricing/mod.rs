pub mod estimate;
pub mod tables;

pub use estimate::{
    display_price, QuoteBreakdown, QuoteCalculator, QuoteError, QuoteInput, QuoteTraceStep,
};
pub use tables::{Condition, PricingTables, PricingTablesError};
