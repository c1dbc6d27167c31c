pub mod amortization;
pub mod error;
pub mod rules;
pub mod time_value;
pub mod types;

#[cfg(feature = "down_payment")]
pub mod down_payment;

#[cfg(feature = "affordability")]
pub mod affordability;

#[cfg(feature = "rent_vs_buy")]
pub mod rent_vs_buy;

pub use error::MortgageError;
pub use rules::LendingRules;
pub use types::*;

/// Standard result type for all mortgage-calc operations
pub type MortgageResult<T> = Result<T, MortgageError>;
