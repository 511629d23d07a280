//! Rate Table
//!
//! Holds the tiered price schedule of every SKU. A table is built once, either
//! from the schedule compiled into the binary ([`RateTable::bundled`]), from an
//! external TOML/JSON file ([`RateTable::from_path`]) or from in-memory tiers
//! ([`RateTable::from_tiers`]), and is never mutated afterwards.
//!
//! Construction validates each SKU's schedule: tiers must start at zero, be
//! contiguous, end with an unbounded tier, and carry a previous-tier spend that
//! matches the tiers below them. Lookups binary-search a per-SKU index sorted
//! by lower bound.

use crate::error::LoadError;
use crate::models::{Sku, Tier};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info};

const BUNDLED_RATES: &str = include_str!("../data/rates.toml");

/// Relative tolerance for the previous-tier spend consistency check.
const SPEND_TOLERANCE: f64 = 1e-6;

static BUNDLED: OnceLock<Arc<RateTable>> = OnceLock::new();

#[derive(Debug, Deserialize)]
struct RateSource {
    #[serde(default)]
    tier: Vec<Tier>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    index: BTreeMap<Sku, Vec<Tier>>,
}

impl RateTable {
    /// Return the process-wide table parsed from the bundled schedule.
    pub fn bundled() -> Result<Arc<RateTable>, LoadError> {
        if let Some(table) = BUNDLED.get() {
            return Ok(Arc::clone(table));
        }

        let table = Arc::new(Self::from_toml_str(BUNDLED_RATES, "bundled rates.toml")?);
        info!(
            skus = table.index.len(),
            tiers = table.len(),
            "Loaded bundled rate table"
        );
        Ok(Arc::clone(BUNDLED.get_or_init(|| table)))
    }

    /// Load a rate table from disk. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let content = fs::read_to_string(path).map_err(|source| LoadError::Missing {
            path: path.to_path_buf(),
            source,
        })?;
        let origin = path.display().to_string();

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let table = if is_json {
            Self::from_json_str(&content, &origin)?
        } else {
            Self::from_toml_str(&content, &origin)?
        };

        info!(path = %origin, tiers = table.len(), "Loaded rate table from file");
        Ok(table)
    }

    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, LoadError> {
        let source: RateSource = toml::from_str(content).map_err(|e| LoadError::Malformed {
            origin: origin.to_string(),
            reason: e.to_string(),
        })?;
        Self::from_tiers(source.tier)
    }

    pub fn from_json_str(content: &str, origin: &str) -> Result<Self, LoadError> {
        let source: RateSource =
            serde_json::from_str(content).map_err(|e| LoadError::Malformed {
                origin: origin.to_string(),
                reason: e.to_string(),
            })?;
        Self::from_tiers(source.tier)
    }

    /// Build a table from tiers in any order, validating every SKU's schedule.
    pub fn from_tiers(tiers: Vec<Tier>) -> Result<Self, LoadError> {
        if tiers.is_empty() {
            return Err(LoadError::Empty);
        }

        let mut index: BTreeMap<Sku, Vec<Tier>> = BTreeMap::new();
        for tier in tiers {
            index.entry(tier.sku).or_default().push(tier);
        }

        for (sku, schedule) in index.iter_mut() {
            schedule.sort_by(|a, b| a.start.total_cmp(&b.start));
            validate_schedule(*sku, schedule)?;
            debug!(sku = %sku, tiers = schedule.len(), "Validated tier schedule");
        }

        Ok(Self { index })
    }

    /// Find the tier covering `usage`, if any.
    pub fn find_tier(&self, sku: Sku, usage: f64) -> Option<&Tier> {
        let schedule = self.index.get(&sku)?;
        // Tiers are contiguous, so the candidate is the last one starting at or below usage.
        let candidates = schedule.partition_point(|tier| tier.start <= usage);
        let tier = schedule.get(candidates.checked_sub(1)?)?;
        tier.contains(usage).then_some(tier)
    }

    pub fn tiers(&self, sku: Sku) -> &[Tier] {
        self.index.get(&sku).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn skus(&self) -> impl Iterator<Item = Sku> + '_ {
        self.index.keys().copied()
    }

    /// Total number of tiers across all SKUs.
    pub fn len(&self) -> usize {
        self.index.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

fn validate_schedule(sku: Sku, schedule: &[Tier]) -> Result<(), LoadError> {
    let expected_category = sku.category();
    let mut previous: Option<&Tier> = None;

    for tier in schedule {
        if tier.category != expected_category {
            return Err(LoadError::CategoryMismatch {
                sku,
                expected: expected_category,
                found: tier.category,
            });
        }
        if !tier.price.is_finite() || tier.price < 0.0 {
            return Err(LoadError::InvalidPrice {
                sku,
                start: tier.start,
                price: tier.price,
            });
        }
        let end = tier.end.unwrap_or(f64::INFINITY);
        if !tier.start.is_finite() || end.is_nan() || end <= tier.start {
            return Err(LoadError::InvalidBounds {
                sku,
                start: tier.start,
                end,
            });
        }

        match previous {
            None => {
                if tier.start != 0.0 {
                    return Err(LoadError::NonZeroStart {
                        sku,
                        start: tier.start,
                    });
                }
                check_previous_spend(sku, tier, 0.0)?;
            }
            Some(prev) => {
                let Some(prev_end) = prev.end else {
                    return Err(LoadError::UnboundedBeforeEnd {
                        sku,
                        start: prev.start,
                    });
                };
                if tier.start > prev_end {
                    return Err(LoadError::Gap {
                        sku,
                        expected: prev_end,
                        found: tier.start,
                    });
                }
                if tier.start < prev_end {
                    return Err(LoadError::Overlap {
                        sku,
                        expected: prev_end,
                        found: tier.start,
                    });
                }
                let carried = prev.previous_tier_spend + (prev_end - prev.start) * prev.price;
                check_previous_spend(sku, tier, carried)?;
            }
        }

        previous = Some(tier);
    }

    if let Some(end) = previous.and_then(|top| top.end) {
        return Err(LoadError::BoundedTop { sku, end });
    }

    Ok(())
}

fn check_previous_spend(sku: Sku, tier: &Tier, expected: f64) -> Result<(), LoadError> {
    let tolerance = SPEND_TOLERANCE * expected.abs().max(1.0);
    if (tier.previous_tier_spend - expected).abs() > tolerance {
        return Err(LoadError::CumulativeMismatch {
            sku,
            start: tier.start,
            expected,
            found: tier.previous_tier_spend,
        });
    }
    Ok(())
}
