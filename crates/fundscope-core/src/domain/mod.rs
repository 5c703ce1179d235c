//! # Domain Models
//!
//! Canonical domain types shared by the provider adapters, the metrics
//! engine and the verdict rule.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated, upper-cased ticker |
//! | [`PricePoint`] | One daily close with its timestamp |
//! | [`PriceSeries`] | Ascending closes for a symbol, possibly empty |
//! | [`Fundamentals`] | Optional trailing P/E and dividend yield |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! All constructors validate their invariants and return
//! [`ValidationError`](crate::ValidationError) on bad input.

mod models;
mod symbol;
mod timestamp;

pub use models::{Fundamentals, PricePoint, PriceSeries};
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
