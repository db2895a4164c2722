use std::{env, fmt::Display, str::FromStr};

use thiserror::Error;
use tracing::info;

const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_BIND: &str = "0.0.0.0:7783";
const DEFAULT_DATABASE_URL: &str = "sqlite:secret/weeblist.db";
const DEFAULT_KEY_PATH: &str = "secret/key.pub";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Hosted auth + REST table service.
    Supabase { url: String, anon_key: String },
    /// SQLite tables and a single owner authenticated by API key.
    Local {
        database_url: String,
        key_path: String,
        key_warn_days: u64,
        key_rotate_days: u64,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub backend: Backend,
    pub site_url: String,
    pub bind: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match var("WEEBLIST_BACKEND").as_deref().unwrap_or("supabase") {
            "supabase" => Backend::Supabase {
                url: var("SUPABASE_URL")
                    .ok_or(ConfigError::Missing("SUPABASE_URL"))?
                    .trim_end_matches('/')
                    .to_string(),
                anon_key: var("SUPABASE_ANON_KEY").ok_or(ConfigError::Missing("SUPABASE_ANON_KEY"))?,
            },
            "local" => Backend::Local {
                database_url: or_default(var("WEEBLIST_DATABASE_URL"), "WEEBLIST_DATABASE_URL", DEFAULT_DATABASE_URL),
                key_path: or_default(var("WEEBLIST_KEY_PATH"), "WEEBLIST_KEY_PATH", DEFAULT_KEY_PATH),
                key_warn_days: parse(var("WEEBLIST_KEY_WARN_DAYS"), "WEEBLIST_KEY_WARN_DAYS", 90)?,
                key_rotate_days: parse(var("WEEBLIST_KEY_ROTATE_DAYS"), "WEEBLIST_KEY_ROTATE_DAYS", 365)?,
            },
            other => {
                return Err(ConfigError::Invalid {
                    key: "WEEBLIST_BACKEND",
                    reason: format!("unknown backend '{other}', expected 'supabase' or 'local'"),
                })
            }
        };

        let site_url = or_default(var("SITE_URL"), "SITE_URL", DEFAULT_SITE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            backend,
            site_url,
            bind: or_default(var("WEEBLIST_BIND"), "WEEBLIST_BIND", DEFAULT_BIND),
        })
    }

    /// Where password-reset mails send the user back to.
    pub fn reset_redirect(&self) -> String {
        format!("{}/reset", self.site_url)
    }
}

fn or_default(value: Option<String>, key: &str, default: &str) -> String {
    value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    })
}

fn parse<T>(value: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_supabase_requires_url_and_key() {
        assert_eq!(config(&[]).unwrap_err(), ConfigError::Missing("SUPABASE_URL"));
        assert_eq!(
            config(&[("SUPABASE_URL", "https://x.supabase.co")]).unwrap_err(),
            ConfigError::Missing("SUPABASE_ANON_KEY")
        );
    }

    #[test]
    fn test_supabase_config() {
        let cfg = config(&[
            ("SUPABASE_URL", "https://x.supabase.co/"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("SITE_URL", "https://weeblist.app/"),
        ])
        .unwrap();

        assert_eq!(
            cfg.backend,
            Backend::Supabase {
                url: "https://x.supabase.co".into(),
                anon_key: "anon".into()
            }
        );
        assert_eq!(cfg.reset_redirect(), "https://weeblist.app/reset");
        assert_eq!(cfg.bind, "0.0.0.0:7783");
    }

    #[test]
    fn test_local_defaults() {
        let cfg = config(&[("WEEBLIST_BACKEND", "local")]).unwrap();
        assert_eq!(
            cfg.backend,
            Backend::Local {
                database_url: "sqlite:secret/weeblist.db".into(),
                key_path: "secret/key.pub".into(),
                key_warn_days: 90,
                key_rotate_days: 365,
            }
        );
        assert_eq!(cfg.reset_redirect(), "http://localhost:3000/reset");
    }

    #[test]
    fn test_invalid_values_are_fatal() {
        assert!(matches!(
            config(&[("WEEBLIST_BACKEND", "local"), ("WEEBLIST_KEY_WARN_DAYS", "soon")]),
            Err(ConfigError::Invalid { key: "WEEBLIST_KEY_WARN_DAYS", .. })
        ));
        assert!(matches!(
            config(&[("WEEBLIST_BACKEND", "firebase")]),
            Err(ConfigError::Invalid { key: "WEEBLIST_BACKEND", .. })
        ));
    }
}
