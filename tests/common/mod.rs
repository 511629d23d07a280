#![allow(dead_code)]

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// A one-tier table pricing `smart_encoding_720p` at 0.005 per minute.
pub const FLAT_ENCODING_RATES: &str = r#"
[[tier]]
sku = "smart_encoding_720p"
category = "Encoding"
start = 0.0
price = 0.005
previous_tier_spend = 0.0
"#;

/// `streaming_720p` with a gap between its first and second tier.
pub const GAPPED_RATES: &str = r#"
[[tier]]
sku = "streaming_720p"
category = "Streaming"
start = 0.0
end = 100.0
price = 0.0
previous_tier_spend = 0.0

[[tier]]
sku = "streaming_720p"
category = "Streaming"
start = 200.0
price = 0.001
previous_tier_spend = 0.0
"#;

pub fn write_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}
