//! Plan adjustment.
//!
//! Turns a [`SpendSummary`] into what a customer is billed under a plan. Plans
//! sit behind the [`BillingPlan`] trait so alternate rules can be swapped in
//! without touching the pricing engine.

use crate::models::SpendSummary;
use serde::{Deserialize, Serialize};

pub trait BillingPlan {
    fn name(&self) -> &str;

    fn bill(&self, summary: &SpendSummary) -> PlanBill;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanBill {
    pub plan: String,
    /// Usage spend before any plan credit.
    pub usage_total: f64,
    pub plan_credit: f64,
    pub minimum_charge: f64,
    /// Amount billed for the month.
    pub adjusted_total: f64,
    /// Portion of the plan credit consumed by usage, as a non-positive figure.
    pub mux_credits: f64,
}

/// Monthly plan with a fixed usage credit and a minimum charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardPlan {
    pub credit: f64,
    pub minimum_charge: f64,
}

impl Default for StandardPlan {
    fn default() -> Self {
        Self {
            credit: 100.0,
            minimum_charge: 10.0,
        }
    }
}

impl BillingPlan for StandardPlan {
    fn name(&self) -> &str {
        "standard"
    }

    fn bill(&self, summary: &SpendSummary) -> PlanBill {
        let adjusted_total = (summary.total - self.credit).max(self.minimum_charge);
        let mux_credits = (-summary.subtotal()).max(-self.credit);

        PlanBill {
            plan: self.name().to_string(),
            usage_total: summary.total,
            plan_credit: self.credit,
            minimum_charge: self.minimum_charge,
            adjusted_total,
            mux_credits,
        }
    }
}
