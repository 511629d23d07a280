//! Pricing Engine
//!
//! Prices a [`UsageVector`] against a [`RateTable`] using marginal tiers: the
//! tier covering a quantity contributes `(usage - start) × price` on top of the
//! spend already accumulated by the tiers below it.
//!
//! A SKU whose quantity falls outside its schedule is reported as a
//! [`TierNotFoundError`] next to the records that did price; one bad SKU never
//! discards the rest of the pass.

use crate::error::TierNotFoundError;
use crate::models::{Category, Sku, SpendRecord, SpendSummary, UsageVector};
use crate::rate_table::RateTable;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of pricing a full usage vector.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PricingPass {
    pub records: Vec<SpendRecord>,
    pub failures: Vec<TierNotFoundError>,
}

impl PricingPass {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct PricingEngine {
    rates: Arc<RateTable>,
}

impl PricingEngine {
    pub fn new(rates: Arc<RateTable>) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &RateTable {
        &self.rates
    }

    /// Price one SKU quantity.
    pub fn price_sku(&self, sku: Sku, usage: f64) -> Result<SpendRecord, TierNotFoundError> {
        let tier = self
            .rates
            .find_tier(sku, usage)
            .ok_or(TierNotFoundError { sku, usage })?;

        let marginal_spend = (usage - tier.start) * tier.price;
        let total_spend = tier.previous_tier_spend + marginal_spend;
        let effective_rate = if usage > 0.0 {
            total_spend / usage
        } else {
            0.0
        };

        Ok(SpendRecord {
            category: tier.category,
            sku,
            usage,
            effective_rate,
            total_spend,
        })
    }

    /// Price every entry of `usage`, in SKU order.
    pub fn price(&self, usage: &UsageVector) -> PricingPass {
        let mut pass = PricingPass::default();

        for (&sku, &quantity) in usage {
            match self.price_sku(sku, quantity) {
                Ok(record) => {
                    debug!(
                        sku = %sku,
                        usage = quantity,
                        total_spend = record.total_spend,
                        "Priced SKU"
                    );
                    pass.records.push(record);
                }
                Err(e) => {
                    warn!(sku = %sku, usage = quantity, "{}", e);
                    pass.failures.push(e);
                }
            }
        }

        pass
    }
}

/// Sum spend per category and overall.
pub fn aggregate(records: &[SpendRecord]) -> SpendSummary {
    let mut summary = SpendSummary::default();

    for record in records {
        match record.category {
            Category::Encoding => summary.encoding += record.total_spend,
            Category::Storage => summary.storage += record.total_spend,
            Category::Streaming => summary.streaming += record.total_spend,
        }
        summary.total += record.total_spend;
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tier;
    use std::collections::BTreeMap;

    fn flat_table(sku: Sku, price: f64) -> Arc<RateTable> {
        Arc::new(
            RateTable::from_tiers(vec![Tier {
                sku,
                category: sku.category(),
                start: 0.0,
                end: None,
                price,
                previous_tier_spend: 0.0,
            }])
            .unwrap(),
        )
    }

    fn tiered_table() -> Arc<RateTable> {
        let sku = Sku::Streaming1080p;
        let tier = |start: f64, end: Option<f64>, price: f64, previous: f64| Tier {
            sku,
            category: Category::Streaming,
            start,
            end,
            price,
            previous_tier_spend: previous,
        };
        Arc::new(
            RateTable::from_tiers(vec![
                tier(0.0, Some(100_000.0), 0.0, 0.0),
                tier(100_000.0, Some(1_000_000.0), 0.001, 0.0),
                tier(1_000_000.0, None, 0.0008, 900.0),
            ])
            .unwrap(),
        )
    }

    #[test]
    fn test_flat_tier_scenario() {
        let engine = PricingEngine::new(flat_table(Sku::SmartEncoding720p, 0.005));
        let record = engine.price_sku(Sku::SmartEncoding720p, 1000.0).unwrap();

        assert_eq!(record.category, Category::Encoding);
        assert!((record.total_spend - 5.0).abs() < 1e-9);
        assert!((record.effective_rate - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_marginal_spend_carries_lower_tiers() {
        let engine = PricingEngine::new(tiered_table());

        let free = engine.price_sku(Sku::Streaming1080p, 50_000.0).unwrap();
        assert_eq!(free.total_spend, 0.0);

        let second = engine.price_sku(Sku::Streaming1080p, 600_000.0).unwrap();
        assert!((second.total_spend - 500.0).abs() < 1e-9);

        let third = engine.price_sku(Sku::Streaming1080p, 2_000_000.0).unwrap();
        assert!((third.total_spend - 1700.0).abs() < 1e-9);
        assert!((third.effective_rate - 0.00085).abs() < 1e-12);
    }

    #[test]
    fn test_zero_usage_has_zero_rate() {
        let engine = PricingEngine::new(tiered_table());
        let record = engine.price_sku(Sku::Streaming1080p, 0.0).unwrap();
        assert_eq!(record.total_spend, 0.0);
        assert_eq!(record.effective_rate, 0.0);
    }

    #[test]
    fn test_spend_is_monotonic_and_continuous() {
        let engine = PricingEngine::new(tiered_table());
        let mut last = 0.0;
        let mut usage = 0.0;
        while usage < 3_000_000.0 {
            let spend = engine
                .price_sku(Sku::Streaming1080p, usage)
                .unwrap()
                .total_spend;
            assert!(spend >= last);
            last = spend;
            usage += 12_345.0;
        }

        for boundary in [100_000.0, 1_000_000.0] {
            let below = engine
                .price_sku(Sku::Streaming1080p, boundary - 1e-6)
                .unwrap()
                .total_spend;
            let at = engine
                .price_sku(Sku::Streaming1080p, boundary)
                .unwrap()
                .total_spend;
            assert!((at - below).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rate_times_usage_is_spend() {
        let engine = PricingEngine::new(RateTable::bundled().unwrap());
        for sku in Sku::ALL {
            for usage in [1.0, 777.0, 123_456.0, 9_876_543.0] {
                let record = engine.price_sku(*sku, usage).unwrap();
                let tolerance = 1e-9 * record.total_spend.max(1.0);
                assert!((record.effective_rate * usage - record.total_spend).abs() < tolerance);
            }
        }
    }

    #[test]
    fn test_failures_are_reported_per_record() {
        let engine = PricingEngine::new(flat_table(Sku::SmartEncoding720p, 0.005));
        let usage: UsageVector = BTreeMap::from([
            (Sku::SmartEncoding720p, 1000.0),
            (Sku::SmartEncoding1080p, 10.0),
            (Sku::Streaming720p, 10.0),
        ]);
        let negative: UsageVector = BTreeMap::from([(Sku::SmartEncoding720p, -1.0)]);

        let pass = engine.price(&usage);
        assert_eq!(pass.records.len(), 1);
        assert_eq!(pass.failures.len(), 2);
        assert!(!pass.is_complete());
        assert_eq!(pass.failures[0].sku, Sku::SmartEncoding1080p);

        let pass = engine.price(&negative);
        assert!(pass.records.is_empty());
        assert_eq!(
            pass.failures,
            vec![TierNotFoundError {
                sku: Sku::SmartEncoding720p,
                usage: -1.0
            }]
        );
    }

    #[test]
    fn test_aggregate_groups_by_category() {
        let record = |category, sku, total_spend| SpendRecord {
            category,
            sku,
            usage: 1.0,
            effective_rate: total_spend,
            total_spend,
        };
        let summary = aggregate(&[
            record(Category::Encoding, Sku::SmartEncoding720p, 10.0),
            record(Category::Encoding, Sku::LiveEncoding720p, 5.0),
            record(Category::Storage, Sku::SmartStorage720p, 2.5),
            record(Category::Streaming, Sku::Streaming720p, 1.5),
        ]);

        assert_eq!(summary.encoding, 15.0);
        assert_eq!(summary.storage, 2.5);
        assert_eq!(summary.streaming, 1.5);
        assert_eq!(summary.total, 19.0);
        assert_eq!(summary.subtotal(), summary.total);
    }
}
