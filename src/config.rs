use std::env;
use std::time::Duration;

use crate::blockchain::DEFAULT_MINING_INTERVAL_SECS;

/// Process configuration, read from the environment (and `.env` via dotenvy).
/// Unparsable values fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub mining_interval: Duration,
    /// When unset a throwaway wallet is generated at startup.
    pub miner_address: Option<String>,
    pub faucet_enabled: bool,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = lookup("PORT")
            .and_then(|v| v.parse().ok())
            .unwrap_or(8080);
        let interval_secs: u64 = lookup("MINING_INTERVAL_SECS")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MINING_INTERVAL_SECS)
            .max(1);
        let miner_address = lookup("MINER_ADDRESS")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());
        let faucet_enabled = lookup("FAUCET_ENABLED")
            .and_then(|v| parse_bool(&v))
            .unwrap_or(true);

        Self {
            host,
            port,
            mining_interval: Duration::from_secs(interval_secs),
            miner_address,
            faucet_enabled,
        }
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|k| map.get(k).cloned())
    }

    #[test]
    fn defaults() {
        let c = config(&[]);
        assert_eq!(c.host, "127.0.0.1");
        assert_eq!(c.port, 8080);
        assert_eq!(c.mining_interval, Duration::from_secs(10));
        assert_eq!(c.miner_address, None);
        assert!(c.faucet_enabled);
    }

    #[test]
    fn overrides_and_bad_values() {
        let c = config(&[
            ("HOST", "0.0.0.0"),
            ("PORT", "not-a-port"),
            ("MINING_INTERVAL_SECS", "0"),
            ("MINER_ADDRESS", "  abc  "),
            ("FAUCET_ENABLED", "off"),
        ]);
        assert_eq!(c.host, "0.0.0.0");
        assert_eq!(c.port, 8080);
        assert_eq!(c.mining_interval, Duration::from_secs(1));
        assert_eq!(c.miner_address.as_deref(), Some("abc"));
        assert!(!c.faucet_enabled);
    }

    #[test]
    fn blank_miner_address_is_unset() {
        assert_eq!(config(&[("MINER_ADDRESS", " ")]).miner_address, None);
    }
}
