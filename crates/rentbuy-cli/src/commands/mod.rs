pub mod comparison;
pub mod loan;
pub mod params;
pub mod scenarios;
