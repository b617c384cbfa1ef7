//! Buy-versus-rent decision engine.
//!
//! Amortizes the home loan, builds the annual cash flows of buying and of
//! renting, and discounts both at an inflation-adjusted rate so they can be
//! compared across growth scenarios and holding periods.

pub mod amortization;
pub mod cashflow;
pub mod comparison;
pub mod error;
pub mod tax;
pub mod time_value;
pub mod types;

#[cfg(feature = "scenarios")]
pub mod scenarios;

pub use amortization::{compute_amortization, AmortizationInput, AmortizationRow, LoanTerms};
pub use cashflow::{BuyRentParams, GrowthAssumptions};
pub use comparison::{compute_npv, Decision, NpvPair};
pub use error::RentBuyError;
pub use tax::{compute_tax_saving, TaxParams, TaxSavingInput};
pub use types::*;

/// Standard result type for all rent-vs-buy operations
pub type RentBuyResult<T> = Result<T, RentBuyError>;
