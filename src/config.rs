//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

use crate::{countdown::CountdownConfig, reachability::ReachabilityConfig};

/// CLI argument parsing structure
#[derive(Parser, Debug, Clone)]
#[command(name = "media-monitors")]
#[command(about = "Reachability and sleep-timer monitors for a media-library client")]
#[command(version)]
pub struct Config {
    /// Port to bind the control server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Media server address (host:port) probed for reachability
    #[arg(short, long, default_value = "127.0.0.1:8096")]
    pub server: String,

    /// Interval between reachability probes in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), default_value = "2000")]
    pub probe_interval_ms: u64,

    /// Probe connect timeout in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), default_value = "1500")]
    pub probe_timeout_ms: u64,

    /// Watchdog period in milliseconds
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..), default_value = "3000")]
    pub watchdog_ms: u64,

    /// Offline streak after which the observer is replaced (defaults to twice the watchdog period)
    #[arg(long)]
    pub watchdog_threshold_ms: Option<u64>,

    /// Countdown completion tolerance in milliseconds
    #[arg(long, default_value = "100")]
    pub tick_leeway_ms: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_millis(self.probe_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn reachability(&self) -> ReachabilityConfig {
        let mut config = ReachabilityConfig::with_period(Duration::from_millis(self.watchdog_ms));
        if let Some(threshold) = self.watchdog_threshold_ms {
            config.watchdog_threshold = Duration::from_millis(threshold);
        }
        config
    }

    pub fn countdown(&self) -> CountdownConfig {
        CountdownConfig {
            leeway: Duration::from_millis(self.tick_leeway_ms),
            ..CountdownConfig::default()
        }
    }
}
