//! Dataset configuration.

use anyhow::{ensure, Context, Result};
use chrono::{Days, NaiveDate};
use serde::Deserialize;
use std::path::Path;

/// Largest allowed `max_tags` / `max_addresses`.
pub const MAX_ARRAY_LEN: usize = 1 << 16;

/// Settings for a generated dataset.
///
/// Every field has a default, so a config file only needs the fields it
/// changes:
///
/// ```json
/// { "seed": 7, "count": 5000, "max_tags": 3 }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Root seed of the random tree
    pub seed: i32,

    /// Number of records
    pub count: usize,

    /// Key under the root that holds the records
    pub collection: String,

    /// First possible signup date
    pub start_date: NaiveDate,

    /// Number of days signup dates are spread across
    pub days: u32,

    /// Upper bound (inclusive) on tags per record
    pub max_tags: usize,

    /// Upper bound (inclusive) on addresses per record
    pub max_addresses: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            count: 1000,
            collection: "users".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or(NaiveDate::MIN),
            days: 365,
            max_tags: 4,
            max_addresses: 3,
        }
    }
}

impl DatasetConfig {
    /// Load a config from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the settings can be generated.
    pub fn validate(&self) -> Result<()> {
        // Record i is addressed by index i, and indices are 32-bit.
        ensure!(
            self.count <= i32::MAX as usize,
            "count {} exceeds the maximum of {}",
            self.count,
            i32::MAX
        );
        ensure!(self.days > 0, "days must be at least 1");
        ensure!(
            self.start_date
                .checked_add_days(Days::new(u64::from(self.days)))
                .is_some(),
            "start_date {} plus {} days is out of range",
            self.start_date,
            self.days
        );
        ensure!(
            self.max_tags <= MAX_ARRAY_LEN,
            "max_tags {} exceeds the maximum of {}",
            self.max_tags,
            MAX_ARRAY_LEN
        );
        ensure!(
            self.max_addresses <= MAX_ARRAY_LEN,
            "max_addresses {} exceeds the maximum of {}",
            self.max_addresses,
            MAX_ARRAY_LEN
        );
        Ok(())
    }
}
