pub mod affordability;
pub mod down_payment;
pub mod payment;
pub mod rent_vs_buy;
pub mod rules;
