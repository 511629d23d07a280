//! Mux Pricing Library
//!
//! Estimates monthly video spend from usage volumes using a tiered marginal
//! pricing model per SKU.
//!
//! ## Pipeline
//!
//! 1. [`rate_table`] - load and validate the per-SKU tier schedules
//! 2. [`decompose`] - expand aggregate volumes and mix percentages into
//!    per-SKU usage
//! 3. [`pricing`] - price each SKU against its tiers and roll spend up by
//!    category
//! 4. [`billing`] - apply plan credit and minimum charge
//!
//! [`convert`] translates bandwidth and library sizes into minutes for the
//! delivery-only input mode, and [`session`] ties the steps together for one
//! caller's inputs.
//!
//! ## Modules
//!
//! - [`models`] - SKUs, tiers, inputs and spend records
//! - [`error`] - load, pricing and conversion errors
//! - [`config`] - configuration with file and environment support
//! - [`logging`] - structured logging setup
//! - [`display`] - terminal and JSON output
//!
//! ## Example
//!
//! ```rust
//! use mux_pricing::{InputParameters, PricingSession, RateTable};
//!
//! # fn example() -> Result<(), mux_pricing::error::LoadError> {
//! let rates = RateTable::bundled()?;
//! let mut session = PricingSession::new(rates);
//! session.set_params(InputParameters {
//!     baseline_encoding: false,
//!     ..InputParameters::default()
//! });
//!
//! let estimate = session.estimate();
//! println!("{:.2} before plan credit", estimate.summary.total);
//! # Ok(())
//! # }
//! ```

pub mod billing;
pub mod config;
pub mod convert;
pub mod decompose;
pub mod display;
pub mod error;
pub mod logging;
pub mod models;
pub mod pricing;
pub mod rate_table;
pub mod session;

pub use billing::{BillingPlan, PlanBill, StandardPlan};
pub use error::UnknownSku;
pub use models::*;
pub use pricing::PricingEngine;
pub use rate_table::RateTable;
pub use session::{Estimate, PricingSession};
