//! Configuration for Talmid.
//!
//! CLI arguments and environment variable handling using clap.

use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Talmid - internship progress and certification core
#[derive(Parser, Debug, Clone)]
#[command(name = "talmid")]
#[command(about = "Progress and certification core for Lamad internship tracks")]
pub struct Args {
    /// Directory holding the session snapshot
    #[arg(long, env = "TALMID_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Base simulated network latency in milliseconds (0 disables delays)
    #[arg(long, env = "SIMULATED_LATENCY_MS", default_value = "1000")]
    pub simulated_latency_ms: u64,

    /// Notification time-to-live in milliseconds
    #[arg(long, env = "NOTIFY_TTL_MS", default_value = "5000")]
    pub notify_ttl_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// Parse from the process environment, loading `.env` first if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::parse()
    }

    /// Simulated round-trip for login and registration.
    pub fn auth_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Simulated round-trip for step submission.
    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms * 3 / 2)
    }

    /// Simulated round-trip for review decisions.
    pub fn review_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms)
    }

    /// Simulated round-trip for payment confirmation.
    pub fn payment_latency(&self) -> Duration {
        Duration::from_millis(self.simulated_latency_ms * 2)
    }

    /// Notification time-to-live.
    pub fn notify_ttl(&self) -> Duration {
        Duration::from_millis(self.notify_ttl_ms)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.notify_ttl_ms == 0 {
            return Err("NOTIFY_TTL_MS must be positive".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["talmid"]);
        assert_eq!(args.auth_latency(), Duration::from_millis(1000));
        assert_eq!(args.submit_latency(), Duration::from_millis(1500));
        assert_eq!(args.payment_latency(), Duration::from_millis(2000));
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_zero_ttl_is_invalid() {
        let args = Args::parse_from(["talmid", "--notify-ttl-ms", "0"]);
        assert!(args.validate().is_err());
    }
}
