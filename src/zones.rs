//! Zone source: reading zone records from a file.
//!
//! JSON files hold an array of zones:
//!
//! ```json
//! [{"name": "lawn", "interval": 2, "duration": 15, "group": "A", "splash": ["beds"]}]
//! ```
//!
//! TOML files hold a `[[zone]]` array of tables with the same fields.
//! Records are only parsed here; [`validate_zones`](crate::validation::validate_zones)
//! checks them before planning.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use tracing::debug;

use crate::error::{PlanError, Result};
use crate::models::Zone;

/// Loads zone records, choosing the format by file extension.
pub fn load_zones(path: impl AsRef<Path>) -> Result<Vec<Zone>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let zones: Vec<Zone> = match extension.as_deref() {
        Some("json") => serde_json::from_reader(BufReader::new(File::open(path)?))?,
        Some("toml") => config::Config::builder()
            .add_source(config::File::from(path))
            .build()?
            .get("zone")?,
        _ => {
            return Err(PlanError::Config(format!(
                "unsupported zone file '{}' (expected .json or .toml)",
                path.display()
            )))
        }
    };

    debug!(path = %path.display(), zones = zones.len(), "zones loaded");
    Ok(zones)
}
