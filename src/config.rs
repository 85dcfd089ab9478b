use crate::domain::Price;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Config {
    pub shop_domain: String,
    pub admin_api_token: String,
    /// Fixed currency step added to a variant's price per cycle.
    pub price_increment: Price,
    pub poll_interval: Duration,
    pub start_marker_mode: StartMarkerMode,
}

/// Where the "deal started" fact is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMarkerMode {
    /// Flip a `started` field on the deal record before the first price step,
    /// so a restart cannot replay the start.
    Remote,
    /// Track starts only in process memory.
    Local,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let shop_domain = env_map
            .get("SHOP_DOMAIN")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("SHOP_DOMAIN".to_string()))?;

        let admin_api_token = env_map
            .get("ADMIN_API_TOKEN")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("ADMIN_API_TOKEN".to_string()))?;

        let price_increment = env_map
            .get("PRICE_INCREMENT")
            .map(|s| s.as_str())
            .unwrap_or("9.99")
            .parse::<Price>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "PRICE_INCREMENT".to_string(),
                    "must be a decimal number".to_string(),
                )
            })?;
        if !price_increment.is_positive() {
            return Err(ConfigError::InvalidValue(
                "PRICE_INCREMENT".to_string(),
                "must be positive".to_string(),
            ));
        }

        let poll_interval_secs = env_map
            .get("POLL_INTERVAL_SECS")
            .map(|s| s.as_str())
            .unwrap_or("30")
            .parse::<u64>()
            .map_err(|_| {
                ConfigError::InvalidValue(
                    "POLL_INTERVAL_SECS".to_string(),
                    "must be a valid u64".to_string(),
                )
            })?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "POLL_INTERVAL_SECS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let start_marker_mode = match env_map
            .get("START_MARKER_MODE")
            .map(|s| s.as_str())
            .unwrap_or("remote")
        {
            "remote" => StartMarkerMode::Remote,
            "local" => StartMarkerMode::Local,
            other => {
                return Err(ConfigError::InvalidValue(
                    "START_MARKER_MODE".to_string(),
                    format!("must be remote or local, got {}", other),
                ))
            }
        };

        Ok(Config {
            shop_domain,
            admin_api_token,
            price_increment,
            poll_interval: Duration::from_secs(poll_interval_secs),
            start_marker_mode,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert(
            "SHOP_DOMAIN".to_string(),
            "example.myshopify.com".to_string(),
        );
        map.insert("ADMIN_API_TOKEN".to_string(), "shpat_test".to_string());
        map
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.price_increment, Price::parse("9.99").unwrap());
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.start_marker_mode, StartMarkerMode::Remote);
    }

    #[test]
    fn test_missing_shop_domain() {
        let mut env_map = setup_required_env();
        env_map.remove("SHOP_DOMAIN");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "SHOP_DOMAIN"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_missing_admin_api_token() {
        let mut env_map = setup_required_env();
        env_map.remove("ADMIN_API_TOKEN");
        match Config::from_env_map(env_map) {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "ADMIN_API_TOKEN"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_both_observed_increments_accepted() {
        let mut env_map = setup_required_env();
        env_map.insert("PRICE_INCREMENT".to_string(), "9.99".to_string());
        let config = Config::from_env_map(env_map.clone()).unwrap();
        assert_eq!(config.price_increment, Price::parse("9.99").unwrap());

        env_map.insert("PRICE_INCREMENT".to_string(), "10".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.price_increment, Price::parse("10.00").unwrap());
    }

    #[test]
    fn test_invalid_increment() {
        let mut env_map = setup_required_env();
        env_map.insert("PRICE_INCREMENT".to_string(), "lots".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PRICE_INCREMENT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_nonpositive_increment_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("PRICE_INCREMENT".to_string(), "0".to_string());
        assert!(Config::from_env_map(env_map.clone()).is_err());
        env_map.insert("PRICE_INCREMENT".to_string(), "-1".to_string());
        assert!(Config::from_env_map(env_map).is_err());
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("POLL_INTERVAL_SECS".to_string(), "0".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "POLL_INTERVAL_SECS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_start_marker_modes() {
        let mut env_map = setup_required_env();
        env_map.insert("START_MARKER_MODE".to_string(), "local".to_string());
        let config = Config::from_env_map(env_map.clone()).unwrap();
        assert_eq!(config.start_marker_mode, StartMarkerMode::Local);

        env_map.insert("START_MARKER_MODE".to_string(), "sticky".to_string());
        match Config::from_env_map(env_map) {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "START_MARKER_MODE"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
