//! Application settings (`timetravel.json`).
//!
//! Every field has a default, so a partial or missing file still yields a
//! complete configuration. Command-line flags are applied on top with
//! [`AppSettings::apply_args`]; the result is validated once by
//! [`AppSettings::timeline_settings`].

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::cli::Args;
use crate::core::animation::DEFAULT_TICK_INTERVAL;
use crate::core::controller::TimelineSettings;
use crate::core::error::TimelineError;
use crate::core::filter::{DEFAULT_YEAR_FIELD, YearField};
use crate::core::year::{DEFAULT_MAX_YEAR, DEFAULT_MIN_YEAR, DEFAULT_START_YEAR, YearRange};

/// Settings file name inside the config directory
pub const SETTINGS_FILE: &str = "timetravel.json";

/// 3D buildings with construction year
pub const DEFAULT_SERVICE_URL: &str =
    "https://tiles.arcgis.com/tiles/nSZVuSZjHpEZZbRo/arcgis/rest/services/BAG_3D_WGS/SceneServer";

pub const DEFAULT_API_PORT: u16 = 9876;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    // Data
    pub service_url: String,
    pub year_field: String,

    // Timeline
    pub range_min: i32,
    pub range_max: i32,
    /// Unset means the default start year, moved into the range
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
    pub tick_interval_ms: u64,
    pub loop_enabled: bool,

    // REST API
    pub api_server_enabled: bool,
    pub api_server_port: u16,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.to_string(),
            year_field: DEFAULT_YEAR_FIELD.to_string(),
            range_min: DEFAULT_MIN_YEAR,
            range_max: DEFAULT_MAX_YEAR,
            start_year: None,
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
            loop_enabled: true,
            api_server_enabled: false,
            api_server_port: DEFAULT_API_PORT,
        }
    }
}

impl AppSettings {
    /// Load settings from `path`. A missing file gives defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        let settings = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)
            .with_context(|| format!("Failed to write settings: {}", path.display()))?;
        info!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Override file values with the flags given on the command line.
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(year) = args.year {
            self.start_year = Some(year);
        }
        if let Some(range) = args.range.as_deref()
            && let [min, max] = range
        {
            self.range_min = *min;
            self.range_max = *max;
        }
        if let Some(field) = &args.field {
            self.year_field = field.clone();
        }
        if let Some(url) = &args.service_url {
            self.service_url = url.clone();
        }
        if let Some(ms) = args.interval_ms {
            self.tick_interval_ms = ms;
        }
        if let Some(flag) = args.loop_playback {
            self.loop_enabled = flag != 0;
        }
        if args.api {
            self.api_server_enabled = true;
        }
        if let Some(port) = args.port {
            self.api_server_enabled = true;
            self.api_server_port = port;
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// Year the timeline opens at. An explicit year must lie in `range`.
    pub fn start_year_in(&self, range: YearRange) -> Result<i32, TimelineError> {
        match self.start_year {
            Some(year) => range.check(year),
            None => Ok(range.clamp(DEFAULT_START_YEAR)),
        }
    }

    /// Validate into controller settings.
    pub fn timeline_settings(&self) -> Result<TimelineSettings, TimelineError> {
        let range = YearRange::new(self.range_min, self.range_max)?;
        Ok(TimelineSettings {
            field: YearField::new(self.year_field.clone())?,
            start_year: self.start_year_in(range)?,
            range,
            loop_enabled: self.loop_enabled,
        })
    }
}
