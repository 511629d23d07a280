//! Core Data Models
//!
//! This module defines the data structures that flow through the pricing
//! pipeline, from caller-supplied inputs to priced spend records.
//!
//! ## Data Flow
//!
//! 1. **Inputs**: [`InputParameters`] - aggregate volumes plus mix percentages
//! 2. **Decomposition**: [`UsageVector`] - per-[`Sku`] usage quantities
//! 3. **Pricing**: [`SpendRecord`] - per-SKU total spend and effective rate
//! 4. **Roll-up**: [`SpendSummary`] - category subtotals and grand total
//!
//! ## SKU Catalogue
//!
//! [`Sku`] is a closed enumeration. Every SKU carries a static [`SkuProfile`]
//! describing which aggregate volume feeds it and which resolution, encoding
//! tier and storage class it bills for. The decomposer reads these profiles
//! instead of matching on identifier strings.

use crate::error::UnknownSku;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Billing category a SKU rolls up into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Encoding,
    Storage,
    Streaming,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Encoding, Category::Storage, Category::Streaming];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Encoding => "Encoding",
            Category::Storage => "Storage",
            Category::Streaming => "Streaming",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "720p")]
    R720p,
    #[serde(rename = "1080p")]
    R1080p,
    #[serde(rename = "1440p")]
    R1440p,
    #[serde(rename = "2160p")]
    R2160p,
}

impl Resolution {
    pub const ALL: [Resolution; 4] = [
        Resolution::R720p,
        Resolution::R1080p,
        Resolution::R1440p,
        Resolution::R2160p,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::R720p => "720p",
            Resolution::R1080p => "1080p",
            Resolution::R1440p => "1440p",
            Resolution::R2160p => "2160p",
        }
    }

    /// Baseline encoding is only offered up to 1080p.
    pub fn supports_baseline(self) -> bool {
        matches!(self, Resolution::R720p | Resolution::R1080p)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingTier {
    Baseline,
    Smart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageClass {
    Hot,
    Cold,
    Infrequent,
}

/// Which aggregate input volume a SKU draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VolumeSource {
    VodEncoding,
    LiveEncoding,
    Storage,
    Streaming,
}

impl VolumeSource {
    pub fn category(self) -> Category {
        match self {
            VolumeSource::VodEncoding | VolumeSource::LiveEncoding => Category::Encoding,
            VolumeSource::Storage => Category::Storage,
            VolumeSource::Streaming => Category::Streaming,
        }
    }
}

/// Static description of what a SKU bills for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkuProfile {
    pub source: VolumeSource,
    pub resolution: Resolution,
    pub tier: Option<EncodingTier>,
    pub storage_class: Option<StorageClass>,
}

macro_rules! define_skus {
    ($($variant:ident = $name:literal => ($source:ident, $res:ident, $tier:expr, $class:expr)),* $(,)?) => {
        /// Billable usage category.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum Sku {
            $($variant),*
        }

        impl Sku {
            /// Every SKU, in catalogue order.
            pub const ALL: &'static [Sku] = &[$(Sku::$variant),*];

            /// Canonical identifier used by rate-table sources and JSON output.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Sku::$variant => $name),*
                }
            }

            pub const fn profile(self) -> SkuProfile {
                match self {
                    $(Sku::$variant => SkuProfile {
                        source: VolumeSource::$source,
                        resolution: Resolution::$res,
                        tier: $tier,
                        storage_class: $class,
                    }),*
                }
            }
        }

        impl FromStr for Sku {
            type Err = UnknownSku;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Sku::$variant),)*
                    other => Err(UnknownSku(other.to_string())),
                }
            }
        }
    };
}

const BASELINE: Option<EncodingTier> = Some(EncodingTier::Baseline);
const SMART: Option<EncodingTier> = Some(EncodingTier::Smart);
const HOT: Option<StorageClass> = Some(StorageClass::Hot);
const COLD: Option<StorageClass> = Some(StorageClass::Cold);
const INFREQUENT: Option<StorageClass> = Some(StorageClass::Infrequent);

define_skus! {
    // VOD encoding
    BaselineEncoding720p = "baseline_encoding_720p" => (VodEncoding, R720p, BASELINE, None),
    BaselineEncoding1080p = "baseline_encoding_1080p" => (VodEncoding, R1080p, BASELINE, None),
    SmartEncoding720p = "smart_encoding_720p" => (VodEncoding, R720p, SMART, None),
    SmartEncoding1080p = "smart_encoding_1080p" => (VodEncoding, R1080p, SMART, None),
    SmartEncoding1440p = "smart_encoding_1440p" => (VodEncoding, R1440p, SMART, None),
    SmartEncoding2160p = "smart_encoding_2160p" => (VodEncoding, R2160p, SMART, None),
    // Live encoding
    LiveEncoding720p = "live_encoding_720p" => (LiveEncoding, R720p, None, None),
    LiveEncoding1080p = "live_encoding_1080p" => (LiveEncoding, R1080p, None, None),
    LiveEncoding1440p = "live_encoding_1440p" => (LiveEncoding, R1440p, None, None),
    LiveEncoding2160p = "live_encoding_2160p" => (LiveEncoding, R2160p, None, None),
    // Smart storage
    SmartStorage720p = "smart_storage_720p" => (Storage, R720p, SMART, HOT),
    SmartStorage1080p = "smart_storage_1080p" => (Storage, R1080p, SMART, HOT),
    SmartStorage1440p = "smart_storage_1440p" => (Storage, R1440p, SMART, HOT),
    SmartStorage2160p = "smart_storage_2160p" => (Storage, R2160p, SMART, HOT),
    SmartColdStorage720p = "smart_cold_storage_720p" => (Storage, R720p, SMART, COLD),
    SmartColdStorage1080p = "smart_cold_storage_1080p" => (Storage, R1080p, SMART, COLD),
    SmartColdStorage1440p = "smart_cold_storage_1440p" => (Storage, R1440p, SMART, COLD),
    SmartColdStorage2160p = "smart_cold_storage_2160p" => (Storage, R2160p, SMART, COLD),
    SmartInfrequentStorage720p = "smart_infrequent_storage_720p" => (Storage, R720p, SMART, INFREQUENT),
    SmartInfrequentStorage1080p = "smart_infrequent_storage_1080p" => (Storage, R1080p, SMART, INFREQUENT),
    SmartInfrequentStorage1440p = "smart_infrequent_storage_1440p" => (Storage, R1440p, SMART, INFREQUENT),
    SmartInfrequentStorage2160p = "smart_infrequent_storage_2160p" => (Storage, R2160p, SMART, INFREQUENT),
    // Baseline storage
    BaselineStorage720p = "baseline_storage_720p" => (Storage, R720p, BASELINE, HOT),
    BaselineStorage1080p = "baseline_storage_1080p" => (Storage, R1080p, BASELINE, HOT),
    BaselineColdStorage720p = "baseline_cold_storage_720p" => (Storage, R720p, BASELINE, COLD),
    BaselineColdStorage1080p = "baseline_cold_storage_1080p" => (Storage, R1080p, BASELINE, COLD),
    BaselineInfrequentStorage720p = "baseline_infrequent_storage_720p" => (Storage, R720p, BASELINE, INFREQUENT),
    BaselineInfrequentStorage1080p = "baseline_infrequent_storage_1080p" => (Storage, R1080p, BASELINE, INFREQUENT),
    // Streaming
    Streaming720p = "streaming_720p" => (Streaming, R720p, None, None),
    Streaming1080p = "streaming_1080p" => (Streaming, R1080p, None, None),
    Streaming1440p = "streaming_1440p" => (Streaming, R1440p, None, None),
    Streaming2160p = "streaming_2160p" => (Streaming, R2160p, None, None),
}

impl Sku {
    pub fn category(self) -> Category {
        self.profile().source.category()
    }
}

impl fmt::Display for Sku {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Sku {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Sku {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// One pricing band of a SKU's schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tier {
    pub sku: Sku,
    pub category: Category,
    /// Inclusive lower bound, in minutes.
    pub start: f64,
    /// Exclusive upper bound; `None` means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,
    /// Unit price within this tier.
    pub price: f64,
    /// Spend accumulated by every lower tier of the same SKU.
    pub previous_tier_spend: f64,
}

impl Tier {
    pub fn contains(&self, usage: f64) -> bool {
        self.start <= usage && self.end.map_or(true, |end| usage < end)
    }

    /// Spend of a fully consumed tier, `None` for the unbounded top tier.
    pub fn max_spend(&self) -> Option<f64> {
        self.end
            .map(|end| self.previous_tier_spend + (end - self.start) * self.price)
    }
}

/// Per-SKU usage quantities in minutes, ordered by SKU.
pub type UsageVector = BTreeMap<Sku, f64>;

/// Priced usage for a single SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendRecord {
    pub category: Category,
    pub sku: Sku,
    pub usage: f64,
    pub effective_rate: f64,
    pub total_spend: f64,
}

/// Spend rolled up by category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendSummary {
    pub encoding: f64,
    pub storage: f64,
    pub streaming: f64,
    pub total: f64,
}

impl SpendSummary {
    pub fn category_total(&self, category: Category) -> f64 {
        match category {
            Category::Encoding => self.encoding,
            Category::Storage => self.storage,
            Category::Streaming => self.streaming,
        }
    }

    /// Sum of the three category subtotals.
    pub fn subtotal(&self) -> f64 {
        self.encoding + self.storage + self.streaming
    }
}

/// Aggregate monthly volumes, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Volumes {
    pub encoding: f64,
    pub live_encoding: f64,
    pub storage: f64,
    pub streaming: f64,
}

impl Default for Volumes {
    fn default() -> Self {
        Self {
            encoding: 1000.0,
            live_encoding: 1000.0,
            storage: 6000.0,
            streaming: 20000.0,
        }
    }
}

impl Volumes {
    pub fn get(&self, source: VolumeSource) -> f64 {
        match source {
            VolumeSource::VodEncoding => self.encoding,
            VolumeSource::LiveEncoding => self.live_encoding,
            VolumeSource::Storage => self.storage,
            VolumeSource::Streaming => self.streaming,
        }
    }
}

/// Inputs for the delivery-only estimate mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandwidthInputs {
    pub bandwidth_gb: f64,
    pub bitrate_mbps: f64,
    pub library_gb: f64,
}

/// Percentage of content at each resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionMix {
    #[serde(rename = "720p")]
    pub r720p: f64,
    #[serde(rename = "1080p")]
    pub r1080p: f64,
    #[serde(rename = "1440p")]
    pub r1440p: f64,
    #[serde(rename = "2160p")]
    pub r2160p: f64,
}

impl Default for ResolutionMix {
    fn default() -> Self {
        Self {
            r720p: 100.0,
            r1080p: 0.0,
            r1440p: 0.0,
            r2160p: 0.0,
        }
    }
}

impl ResolutionMix {
    pub fn percent(&self, resolution: Resolution) -> f64 {
        match resolution {
            Resolution::R720p => self.r720p,
            Resolution::R1080p => self.r1080p,
            Resolution::R1440p => self.r1440p,
            Resolution::R2160p => self.r2160p,
        }
    }

    pub fn sum(&self) -> f64 {
        self.r720p + self.r1080p + self.r1440p + self.r2160p
    }
}

/// Percentage of stored content in each storage class.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageMix {
    pub hot: f64,
    pub cold: f64,
    pub infrequent: f64,
}

impl Default for StorageMix {
    fn default() -> Self {
        Self {
            hot: 30.0,
            cold: 60.0,
            infrequent: 10.0,
        }
    }
}

impl StorageMix {
    pub fn percent(&self, class: StorageClass) -> f64 {
        match class {
            StorageClass::Hot => self.hot,
            StorageClass::Cold => self.cold,
            StorageClass::Infrequent => self.infrequent,
        }
    }

    pub fn sum(&self) -> f64 {
        self.hot + self.cold + self.infrequent
    }
}

/// Everything a caller controls for one estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputParameters {
    pub volumes: Volumes,
    pub resolution_mix: ResolutionMix,
    pub storage_mix: StorageMix,
    /// Bill VOD encoding and storage at the baseline tier instead of smart.
    pub baseline_encoding: bool,
}

impl Default for InputParameters {
    fn default() -> Self {
        Self {
            volumes: Volumes::default(),
            resolution_mix: ResolutionMix::default(),
            storage_mix: StorageMix::default(),
            baseline_encoding: true,
        }
    }
}
