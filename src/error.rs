//! Error types for the pricing core.
//!
//! Loading and conversion failures are fatal to the operation that raised
//! them. [`TierNotFoundError`] is scoped to a single SKU so a pricing pass can
//! report it alongside the records that did price.

use crate::models::{Category, Sku};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Rate table not found at {path}")]
    Missing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed rate table {origin}: {reason}")]
    Malformed { origin: String, reason: String },

    #[error("Rate table contains no tiers")]
    Empty,

    #[error("Tier for {sku} starting at {start} has non-positive width (end {end})")]
    InvalidBounds { sku: Sku, start: f64, end: f64 },

    #[error("Tier for {sku} starting at {start} has invalid price {price}")]
    InvalidPrice { sku: Sku, start: f64, price: f64 },

    #[error("First tier for {sku} starts at {start}, expected 0")]
    NonZeroStart { sku: Sku, start: f64 },

    #[error("Gap in tiers for {sku}: previous tier ends at {expected}, next starts at {found}")]
    Gap { sku: Sku, expected: f64, found: f64 },

    #[error("Overlapping tiers for {sku}: previous tier ends at {expected}, next starts at {found}")]
    Overlap { sku: Sku, expected: f64, found: f64 },

    #[error("Tier starting at {start} for {sku} is unbounded but is not the last tier")]
    UnboundedBeforeEnd { sku: Sku, start: f64 },

    #[error("Last tier for {sku} must be unbounded, ends at {end}")]
    BoundedTop { sku: Sku, end: f64 },

    #[error(
        "Tier for {sku} starting at {start} carries previous spend {found}, expected {expected}"
    )]
    CumulativeMismatch {
        sku: Sku,
        start: f64,
        expected: f64,
        found: f64,
    },

    #[error("Tier for {sku} is listed under {found}, expected {expected}")]
    CategoryMismatch {
        sku: Sku,
        expected: Category,
        found: Category,
    },
}

/// No tier of the SKU's schedule covers the requested quantity.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize)]
#[error("No pricing tier for {sku} covers usage {usage}")]
pub struct TierNotFoundError {
    pub sku: Sku,
    pub usage: f64,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    #[error("Bitrate must be a positive number of Mbps, got {0}")]
    ZeroBitrate(f64),

    #[error("{field} must be a non-negative number of GB, got {value}")]
    InvalidQuantity { field: &'static str, value: f64 },
}

/// A SKU name that is not in the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown SKU '{0}'")]
pub struct UnknownSku(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = LoadError::Gap {
            sku: Sku::Streaming720p,
            expected: 100.0,
            found: 150.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("streaming_720p"));
        assert!(msg.contains("100"));
        assert!(msg.contains("150"));

        let err = TierNotFoundError {
            sku: Sku::SmartEncoding1080p,
            usage: -5.0,
        };
        assert!(err.to_string().contains("smart_encoding_1080p"));

        let err = ConversionError::ZeroBitrate(0.0);
        assert!(err.to_string().contains("Bitrate"));
    }

    #[test]
    fn test_io_error_is_kept_as_source() {
        use std::error::Error;

        let err = LoadError::Missing {
            path: PathBuf::from("/nowhere/rates.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(err.to_string().contains("/nowhere/rates.toml"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_unknown_sku_from_parse() {
        use std::error::Error;

        let err = "4k_encoding".parse::<Sku>().unwrap_err();
        assert_eq!(err, UnknownSku("4k_encoding".to_string()));
        assert_eq!(err.to_string(), "unknown SKU '4k_encoding'");
        assert!(err.source().is_none());
    }
}
