use crate::components::availability::models::{Granularity, SlotOptions};
use crate::error::{config_error, env_error, BookingResult};
use crate::utils::time::today_in;
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::PathBuf;

/// Optional configuration file, read relative to the working directory
pub const CONFIG_FILE: &str = "config/booking.toml";

/// Default location of the data file
pub const DEFAULT_DATA_FILE: &str = "data/booking.json";

/// Default spacing between candidate start times
pub const DEFAULT_SLOT_STEP_MINUTES: u32 = 30;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON file holding providers, services and appointments
    pub data_file: PathBuf,
    /// Step between candidate start times in fine mode
    pub slot_step_minutes: u32,
    /// "fine" or "half-day"
    pub granularity: String,
    /// Timezone used to resolve "today"
    pub timezone: String,
}

/// Values that may be set in the configuration file
#[derive(Debug, Default, Deserialize)]
struct FileOverrides {
    data_file: Option<PathBuf>,
    slot_step_minutes: Option<u32>,
    granularity: Option<String>,
    timezone: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            slot_step_minutes: DEFAULT_SLOT_STEP_MINUTES,
            granularity: String::from("fine"),
            timezone: String::from("UTC"),
        }
    }
}

impl Config {
    /// Load configuration from defaults, the config file and the environment,
    /// later sources winning
    pub fn load() -> BookingResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let mut config = Config::default();

        if let Ok(content) = fs::read_to_string(CONFIG_FILE) {
            config.apply_file(&content)?;
        }

        if let Ok(path) = env::var("BOOKING_DATA_FILE") {
            config.data_file = PathBuf::from(path);
        }

        if let Ok(step) = env::var("SLOT_STEP_MINUTES") {
            config.slot_step_minutes = step
                .trim()
                .parse::<u32>()
                .map_err(|_| env_error("SLOT_STEP_MINUTES"))?;
        }

        if let Ok(granularity) = env::var("SLOT_GRANULARITY") {
            config.granularity = granularity;
        }

        if let Ok(timezone) = env::var("TIMEZONE") {
            config.timezone = timezone;
        }

        config.validate()?;
        Ok(config)
    }

    /// Merge values from a TOML document into this configuration
    pub fn apply_file(&mut self, content: &str) -> BookingResult<()> {
        let overrides: FileOverrides = toml::from_str(content)?;

        if let Some(data_file) = overrides.data_file {
            self.data_file = data_file;
        }
        if let Some(step) = overrides.slot_step_minutes {
            self.slot_step_minutes = step;
        }
        if let Some(granularity) = overrides.granularity {
            self.granularity = granularity;
        }
        if let Some(timezone) = overrides.timezone {
            self.timezone = timezone;
        }

        Ok(())
    }

    /// Check that every value can be used
    pub fn validate(&self) -> BookingResult<()> {
        if self.slot_step_minutes == 0 {
            return Err(config_error("slot_step_minutes must be positive"));
        }
        Granularity::from_name(&self.granularity, self.slot_step_minutes)
            .map_err(|e| config_error(&e.to_string()))?;
        self.timezone
            .parse::<Tz>()
            .map_err(|_| config_error(&format!("Unknown timezone: {}", self.timezone)))?;
        Ok(())
    }

    /// Default slot options for availability queries
    pub fn slot_options(&self) -> BookingResult<SlotOptions> {
        Ok(SlotOptions {
            granularity: Granularity::from_name(&self.granularity, self.slot_step_minutes)?,
            exclude_appointment_id: None,
        })
    }

    /// Today's date in the configured timezone
    pub fn today(&self) -> BookingResult<String> {
        today_in(&self.timezone)
    }
}
