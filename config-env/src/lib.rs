use std::collections::HashMap;

use config_keys::ConfigKey;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigFetchError {
    #[error("missing required config key {0}")]
    KeyNotFound(String),
    #[error("invalid value for config key {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads config keys from environment variables named after the key.
///
/// Values are parsed as JSON first, then as a bare string, so both
/// `CINELOG_POSTS_PER_PAGE=5` and `CINELOG_SERVICE_URL=https://...` work.
/// Unset or empty variables resolve to the key's fallback.
pub struct EnvConfig {
    vars: HashMap<String, String>,
}

impl EnvConfig {
    pub fn from_env() -> EnvConfig {
        EnvConfig {
            vars: std::env::vars().collect(),
        }
    }

    pub fn from_vars<I, K, V>(vars: I) -> EnvConfig
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        EnvConfig {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get<K: ConfigKey>(&self, key: K) -> Result<K::Value, ConfigFetchError> {
        let name = key.to_string();
        let raw = match self.vars.get(&name).map(|v| v.trim()) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                return match <K as ConfigKey>::fallback() {
                    Some(value) => Ok(value),
                    None => Err(ConfigFetchError::KeyNotFound(name)),
                }
            }
        };

        let value = match serde_json::from_str::<K::Value>(raw) {
            Ok(value) => value,
            Err(_) => match serde_json::from_value(Value::String(raw.to_string())) {
                Ok(value) => value,
                Err(source) => return Err(ConfigFetchError::Parse { key: name, source }),
            },
        };
        log::debug!("config key {name} resolved from environment");

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use config_keys::{AccessToken, NewPostRoute, PostsPerPage, ServiceUrl, TopViewedLimit};

    use super::*;

    #[test]
    fn falls_back_when_unset() {
        let config = EnvConfig::from_vars([("CINELOG_TOP_VIEWED_LIMIT", "")]);
        assert_eq!(config.get(PostsPerPage).unwrap(), 5);
        assert_eq!(config.get(TopViewedLimit).unwrap(), 10);
        assert_eq!(config.get(NewPostRoute).unwrap(), "/posts/new");
        assert_eq!(config.get(AccessToken).unwrap(), None);
    }

    #[test]
    fn required_key_missing() {
        let config = EnvConfig::from_vars(Vec::<(String, String)>::new());
        assert!(matches!(
            config.get(ServiceUrl),
            Err(ConfigFetchError::KeyNotFound(name)) if name == "CINELOG_SERVICE_URL"
        ));
    }

    #[test]
    fn parses_json_and_bare_strings() {
        let config = EnvConfig::from_vars([
            ("CINELOG_SERVICE_URL", "https://abc.example.co"),
            ("CINELOG_POSTS_PER_PAGE", "8"),
            ("CINELOG_ACCESS_TOKEN", "eyJhbGciOi"),
            ("CINELOG_NEW_POST_ROUTE", "\"/reviews/new\""),
        ]);
        assert_eq!(config.get(ServiceUrl).unwrap(), "https://abc.example.co");
        assert_eq!(config.get(PostsPerPage).unwrap(), 8);
        assert_eq!(
            config.get(AccessToken).unwrap(),
            Some("eyJhbGciOi".to_string())
        );
        assert_eq!(config.get(NewPostRoute).unwrap(), "/reviews/new");
    }

    #[test]
    fn rejects_bad_numbers() {
        let config = EnvConfig::from_vars([("CINELOG_POSTS_PER_PAGE", "five")]);
        assert!(matches!(
            config.get(PostsPerPage),
            Err(ConfigFetchError::Parse { .. })
        ));
    }
}
