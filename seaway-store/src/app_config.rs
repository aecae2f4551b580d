use std::collections::HashMap;
use std::env;

use serde::Deserialize;

use seaway_shared::ReservationKind;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub search: SearchConfig,
    pub booking: BookingConfig,
    pub retry: RetryConfig,
    pub redis: RedisConfig,
    pub operators: HashMap<String, OperatorConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Operator capacity is volatile; search results go stale fast.
    pub cache_ttl_seconds: u64,
    /// Static reference data (ports, accommodation codes) barely moves.
    pub reference_ttl_seconds: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BookingConfig {
    pub confirm_poll_attempts: u32,
    pub confirm_poll_delay_ms: u64,
    pub hold_margins: HoldMargins,
}

/// Safety-margin expiry windows in minutes, scoped by reservation kind.
/// Deliberately not one global constant: vehicle reservations get a
/// longer window than foot-passenger ones.
#[derive(Debug, Deserialize, Clone)]
pub struct HoldMargins {
    #[serde(default = "default_standard_margin")]
    pub standard: i64,
    #[serde(default = "default_vehicle_margin")]
    pub vehicle: i64,
}

fn default_standard_margin() -> i64 {
    15
}

fn default_vehicle_margin() -> i64 {
    30
}

impl HoldMargins {
    pub fn minutes_for(&self, kind: ReservationKind) -> i64 {
        match kind {
            ReservationKind::Standard => self.standard,
            ReservationKind::Vehicle => self.vehicle,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub base_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OperatorConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_ms: u64,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, not checked in
            .add_source(config::File::with_name("config/local").required(false))
            // `SEAWAY_BOOKING__CONFIRM_POLL_ATTEMPTS=10` etc.
            .add_source(config::Environment::with_prefix("SEAWAY").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
