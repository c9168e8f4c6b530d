//! Command line and environment configuration.

use std::time::Duration;

use clap::{builder::NonEmptyStringValueParser, Parser};
use tcbot_sim::tc::DEFAULT_TC_BINARY;

/// The public Telegram Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

#[derive(Parser, Debug, Clone)]
#[command(name = "tcbot")]
#[command(version, about = "Chat-operated netem impairment for VLAN sub-interfaces", long_about = None)]
pub struct Cli {
    /// Telegram bot API token
    #[arg(long, env = "TCBOT_TOKEN", hide_env_values = true, value_parser = NonEmptyStringValueParser::new())]
    pub token: String,

    /// Base URL of the Telegram Bot API
    #[arg(long, env = "TCBOT_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Long polling timeout, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    pub poll_timeout: u64,

    /// Delay before the first reconnection attempt, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 5)]
    pub retry_initial: u64,

    /// Upper bound for the reconnection delay, in seconds
    #[arg(long, value_name = "SECONDS", default_value_t = 300)]
    pub retry_max_delay: u64,

    /// Consecutive reconnection attempts before giving up (0 retries forever)
    #[arg(long, value_name = "COUNT", default_value_t = 0)]
    pub retry_max: usize,

    /// Trusted operator identity. Repeat for several. Disables first-sender bootstrap.
    #[arg(long = "master", value_name = "IDENTITY")]
    pub masters: Vec<String>,

    /// Path to the `tc` executable
    #[arg(long, env = "TCBOT_TC", default_value = DEFAULT_TC_BINARY)]
    pub tc_binary: String,

    /// Log level, overridden by `RUST_LOG`
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Cli {
    pub const fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout)
    }

    pub const fn retry_initial(&self) -> Duration {
        Duration::from_secs(self.retry_initial)
    }

    pub const fn retry_max_delay(&self) -> Duration {
        Duration::from_secs(self.retry_max_delay)
    }
}
