//! Pricing sessions.
//!
//! A [`PricingSession`] is the per-caller context: it owns one set of
//! [`InputParameters`] and shares the immutable rate table with every other
//! session. Each call to [`PricingSession::estimate`] runs the whole pipeline
//! from scratch on the current inputs.

use crate::billing::{BillingPlan, PlanBill, StandardPlan};
use crate::decompose::{self, Advisory};
use crate::error::TierNotFoundError;
use crate::models::{InputParameters, SpendRecord, SpendSummary, UsageVector};
use crate::pricing::{aggregate, PricingEngine};
use crate::rate_table::RateTable;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span};
use uuid::Uuid;

/// One complete pricing pass.
#[derive(Debug, Clone, Serialize)]
pub struct Estimate {
    pub session_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub params: InputParameters,
    pub usage: UsageVector,
    pub records: Vec<SpendRecord>,
    pub failures: Vec<TierNotFoundError>,
    pub summary: SpendSummary,
    pub bill: PlanBill,
    pub advisories: Vec<Advisory>,
}

pub struct PricingSession {
    id: Uuid,
    engine: PricingEngine,
    plan: Box<dyn BillingPlan + Send + Sync>,
    params: InputParameters,
}

impl PricingSession {
    pub fn new(rates: Arc<RateTable>) -> Self {
        Self::with_plan(rates, Box::new(StandardPlan::default()))
    }

    pub fn with_plan(rates: Arc<RateTable>, plan: Box<dyn BillingPlan + Send + Sync>) -> Self {
        Self {
            id: Uuid::new_v4(),
            engine: PricingEngine::new(rates),
            plan,
            params: InputParameters::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn params(&self) -> &InputParameters {
        &self.params
    }

    /// Replace the session's inputs wholesale.
    pub fn set_params(&mut self, params: InputParameters) {
        self.params = params;
    }

    pub fn estimate(&self) -> Estimate {
        let span = info_span!("estimate", session_id = %self.id);
        let _enter = span.enter();

        let advisories = decompose::advisories(&self.params);
        let usage = decompose::decompose(&self.params);
        let pass = self.engine.price(&usage);
        let summary = aggregate(&pass.records);
        let bill = self.plan.bill(&summary);

        info!(
            total = summary.total,
            adjusted_total = bill.adjusted_total,
            failures = pass.failures.len(),
            "Estimate computed"
        );

        Estimate {
            session_id: self.id,
            generated_at: Utc::now(),
            params: self.params,
            usage,
            records: pass.records,
            failures: pass.failures,
            summary,
            bill,
            advisories,
        }
    }
}
