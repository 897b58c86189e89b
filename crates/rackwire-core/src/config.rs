//! Client configuration from the environment.

use crate::framing::WireFormat;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7000;

/// Startup configuration, read once from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Engine host.
    pub host: String,
    /// Engine port.
    pub port: u16,
    /// Frame encoding for outbound traffic.
    pub wire_format: WireFormat,
    /// Unit ids excluded from the visible-unit aggregation.
    pub ignore_units: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            wire_format: WireFormat::default(),
            ignore_units: Vec::new(),
        }
    }
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// - `RACKWIRE_HOST`: engine host (default `127.0.0.1`)
    /// - `RACKWIRE_PORT`: engine port (default `7000`)
    /// - `RACKWIRE_BINARY_FRAMES`: `1`/`true` selects binary framing
    /// - `RACKWIRE_IGNORE_UNITS`: comma-separated unit ids to hide
    pub fn from_env() -> Self {
        let host = std::env::var("RACKWIRE_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env_parse_u16("RACKWIRE_PORT", DEFAULT_PORT);
        let wire_format = std::env::var("RACKWIRE_BINARY_FRAMES")
            .map(|raw| WireFormat::from_selector(&raw))
            .unwrap_or_default();
        let ignore_units = std::env::var("RACKWIRE_IGNORE_UNITS")
            .map(|raw| parse_ignore_list(&raw))
            .unwrap_or_default();
        Self {
            host,
            port,
            wire_format,
            ignore_units,
        }
    }

    /// WebSocket URL for the configured endpoint.
    pub fn url(&self) -> String {
        format!("ws://{}:{}", self.host, self.port)
    }
}

fn env_parse_u16(key: &str, default: u16) -> u16 {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(default)
}

/// Split a comma-separated ignore list, trimming whitespace and dropping
/// empty entries.
pub fn parse_ignore_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_endpoint() {
        let config = Config::default();
        assert_eq!(config.url(), "ws://127.0.0.1:7000");
        assert_eq!(config.wire_format, WireFormat::Text);
        assert!(config.ignore_units.is_empty());
    }

    #[test]
    fn ignore_list_trims_entries() {
        assert_eq!(
            parse_ignore_list(" tuner , cabinet ,ampstack"),
            vec!["tuner", "cabinet", "ampstack"]
        );
    }

    #[test]
    fn ignore_list_drops_empty_entries() {
        assert_eq!(parse_ignore_list(",, , "), Vec::<String>::new());
        assert_eq!(parse_ignore_list(""), Vec::<String>::new());
    }
}
