//! Amortization engine: periodic payments for every Canadian payment
//! frequency, outstanding balances, and full payoff schedules.

pub mod payment;
pub mod schedule;

pub use payment::{
    calculate_payment, compute_periodic_payment, monthly_payment, monthly_rate,
    remaining_balance, LoanInputs, PaymentFrequency, PaymentSummary, MAX_AMORTIZATION_YEARS,
};
pub use schedule::{build_schedule, AmortizationSchedule, ScheduleYear};
