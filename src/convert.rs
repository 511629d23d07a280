//! Bandwidth to minutes conversion.
//!
//! The delivery-only estimate mode takes data sizes instead of minutes. A size
//! in GB becomes megabits (`× 8 × 1024`), then seconds at the given bitrate,
//! then minutes.

use crate::error::ConversionError;
use crate::models::{BandwidthInputs, Volumes};
use tracing::debug;

const MEGABITS_PER_GB: f64 = 8.0 * 1024.0;

/// Convert `(bandwidth_gb, library_gb)` at `bitrate_mbps` into
/// `(storage_minutes, streaming_minutes)`.
pub fn to_minutes(
    bandwidth_gb: f64,
    bitrate_mbps: f64,
    library_gb: f64,
) -> Result<(f64, f64), ConversionError> {
    if !bitrate_mbps.is_finite() || bitrate_mbps <= 0.0 {
        return Err(ConversionError::ZeroBitrate(bitrate_mbps));
    }
    check_quantity("bandwidth_gb", bandwidth_gb)?;
    check_quantity("library_gb", library_gb)?;

    let storage_minutes = gb_to_minutes(library_gb, bitrate_mbps);
    let streaming_minutes = gb_to_minutes(bandwidth_gb, bitrate_mbps);
    debug!(
        bandwidth_gb,
        bitrate_mbps, library_gb, storage_minutes, streaming_minutes, "Converted bandwidth inputs"
    );

    Ok((storage_minutes, streaming_minutes))
}

fn gb_to_minutes(gb: f64, bitrate_mbps: f64) -> f64 {
    gb * MEGABITS_PER_GB / bitrate_mbps / 60.0
}

fn check_quantity(field: &'static str, value: f64) -> Result<(), ConversionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConversionError::InvalidQuantity { field, value })
    }
}

impl Volumes {
    /// Volumes for a storage and delivery estimate. Encoding is not part of
    /// this mode, so both encoding volumes are zero.
    pub fn from_bandwidth(inputs: &BandwidthInputs) -> Result<Self, ConversionError> {
        let (storage, streaming) =
            to_minutes(inputs.bandwidth_gb, inputs.bitrate_mbps, inputs.library_gb)?;
        Ok(Self {
            encoding: 0.0,
            live_encoding: 0.0,
            storage,
            streaming,
        })
    }
}
