//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "sequence-timer")]
#[command(about = "Queue countdown timers and play them back one after another")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Tick cadence of the countdown in milliseconds
    #[arg(long = "tick-ms", default_value = "80", value_parser = clap::value_parser!(u64).range(10..))]
    pub tick_ms: u64,

    /// Preset duration in seconds, may be repeated
    #[arg(long = "preset", value_name = "SECONDS", default_values_t = [60u64, 120, 180, 300, 600, 900])]
    pub presets: Vec<u64>,

    /// Do not play a sound when a timer finishes
    #[arg(short, long)]
    pub silent: bool,

    /// Log notifications instead of showing desktop notifications
    #[arg(long)]
    pub no_notifications: bool,

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

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Preset durations with zero entries dropped
    pub fn presets(&self) -> Vec<u64> {
        self.presets.iter().copied().filter(|&secs| secs > 0).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["sequence-timer"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick_interval(), Duration::from_millis(80));
        assert_eq!(config.presets(), vec![60, 120, 180, 300, 600, 900]);
        assert_eq!(config.log_level(), "info");
        assert!(!config.silent);
    }

    #[test]
    fn repeated_presets_replace_defaults() {
        let config =
            Config::try_parse_from(["sequence-timer", "--preset", "30", "--preset", "0", "--preset", "45"])
                .unwrap();
        assert_eq!(config.presets(), vec![30, 45]);
    }

    #[test]
    fn tick_below_minimum_is_rejected() {
        assert!(Config::try_parse_from(["sequence-timer", "--tick-ms", "5"]).is_err());
        let config = Config::try_parse_from(["sequence-timer", "--tick-ms", "10", "-v"]).unwrap();
        assert_eq!(config.tick_interval(), Duration::from_millis(10));
        assert_eq!(config.log_level(), "debug");
    }
}
