//! Usage Decomposition
//!
//! Expands aggregate [`InputParameters`] into a per-SKU [`UsageVector`]:
//!
//! ```text
//! usage = volume(source) × resolution% / 100 × tier multiplier × storage-class% / 100
//! ```
//!
//! The encoding tier is an exclusive toggle. With `baseline_encoding` set, VOD
//! encoding and storage at 720p and 1080p bill to the baseline SKUs and the
//! matching smart SKUs receive nothing; with it cleared the reverse holds.
//! Baseline is not offered above 1080p, so smart SKUs at 1440p and 2160p are
//! not gated by the toggle. Live encoding and streaming are never gated.
//!
//! Decomposition is total over any percentages. Mixes that do not add up to
//! 100 are reported through [`advisories`] and otherwise used as given.

use crate::models::{EncodingTier, InputParameters, Sku, UsageVector};
use serde::Serialize;
use std::fmt;
use tracing::warn;

const PERCENT_TOLERANCE: f64 = 1e-9;

/// Non-blocking warning about the shape of the inputs.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    ResolutionMixNot100 { sum: f64 },
    StorageMixNot100 { sum: f64 },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Advisory::ResolutionMixNot100 { sum } => {
                write!(f, "Resolutions do not add to 100% (got {}%)", sum)
            }
            Advisory::StorageMixNot100 { sum } => {
                write!(f, "Hot/Cold designations do not add to 100% (got {}%)", sum)
            }
        }
    }
}

/// Split the aggregate volumes across every SKU.
pub fn decompose(params: &InputParameters) -> UsageVector {
    Sku::ALL
        .iter()
        .map(|&sku| (sku, sku_usage(sku, params)))
        .collect()
}

fn sku_usage(sku: Sku, params: &InputParameters) -> f64 {
    let profile = sku.profile();
    let volume = params.volumes.get(profile.source);
    let resolution_share = params.resolution_mix.percent(profile.resolution) / 100.0;
    let class_share = profile
        .storage_class
        .map_or(1.0, |class| params.storage_mix.percent(class) / 100.0);

    volume * resolution_share * tier_multiplier(sku, params.baseline_encoding) * class_share
}

fn tier_multiplier(sku: Sku, baseline_encoding: bool) -> f64 {
    let profile = sku.profile();
    let selected = match profile.tier {
        None => true,
        Some(_) if !profile.resolution.supports_baseline() => true,
        Some(EncodingTier::Baseline) => baseline_encoding,
        Some(EncodingTier::Smart) => !baseline_encoding,
    };
    if selected {
        1.0
    } else {
        0.0
    }
}

/// Check the mix percentages, logging and returning any that are off.
pub fn advisories(params: &InputParameters) -> Vec<Advisory> {
    let mut found = Vec::new();

    let resolution_sum = params.resolution_mix.sum();
    if (resolution_sum - 100.0).abs() > PERCENT_TOLERANCE {
        found.push(Advisory::ResolutionMixNot100 {
            sum: resolution_sum,
        });
    }

    let storage_sum = params.storage_mix.sum();
    if (storage_sum - 100.0).abs() > PERCENT_TOLERANCE {
        found.push(Advisory::StorageMixNot100 { sum: storage_sum });
    }

    for advisory in &found {
        warn!(%advisory, "Input mix advisory");
    }

    found
}
