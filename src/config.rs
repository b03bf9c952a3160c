use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::ProvisionError;
use crate::types::byos::Activity;

/// Environment prefix for overriding the built-in defaults,
/// e.g. `BYOS_INSTANCE`, `BYOS_WAREHOUSE_NAME`.
pub const ENV_PREFIX: &str = "BYOS_";

/// Name of the environment variable holding the developer bearer token.
/// Usually populated from `.env` by dotenvy at startup.
pub const ACCESS_TOKEN_VAR: &str = "access_token";

/// Static provisioning configuration, built once at startup and passed by
/// reference to every step. Defaults live in [`Config::default`] and can be
/// overridden per-field through `BYOS_`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Instance host, e.g. `mycompany.domo.com`. Bare hosts are reached over
    /// https; a value already carrying a scheme is used as-is.
    pub instance: String,

    /// Internal name for the account.
    pub account_name: String,
    /// Display name shown in the platform.
    pub display_name: String,

    // Snowflake connection details.
    pub snowflake_account: String,
    pub snowflake_username: String,
    pub snowflake_role: String,

    /// Path to the private key file, read verbatim into the request.
    pub private_key_file: PathBuf,
    /// Key passphrase; empty when the key is not encrypted.
    pub passphrase: String,

    /// Friendly name for the integration; falls back to `display_name`
    /// when empty.
    pub integration_friendly_name: String,
    pub integration_description: String,

    /// Warehouse to assign to the integration. Empty skips the
    /// assignment step entirely.
    pub warehouse_name: String,
    pub warehouse_activities: Vec<Activity>,

    /// Already-provisioned account id. When set, account creation (and the
    /// private key read) is skipped and this id feeds the integration step.
    pub existing_account_id: String,

    /// Optional outbound proxy for all API calls.
    pub proxy: Option<Url>,
    pub loglevel: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            instance: String::new(),
            account_name: String::new(),
            display_name: String::new(),
            snowflake_account: String::new(),
            snowflake_username: String::new(),
            snowflake_role: String::new(),
            private_key_file: PathBuf::new(),
            passphrase: String::new(),
            integration_friendly_name: String::new(),
            integration_description: String::new(),
            warehouse_name: String::new(),
            warehouse_activities: vec![Activity::Query, Activity::Index, Activity::Dataflow],
            existing_account_id: String::new(),
            proxy: None,
            loglevel: "info".to_string(),
            connect_timeout_secs: 5,
            request_timeout_secs: 15,
        }
    }
}

impl Config {
    /// Built-in defaults merged with `BYOS_`-prefixed environment overrides.
    pub fn load() -> Result<Self, ProvisionError> {
        let cfg: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ProvisionError> {
        if self.instance.trim().is_empty() {
            return Err(ProvisionError::Config(
                "instance is required; set BYOS_INSTANCE or fill in the configuration defaults"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL of the configured instance.
    pub fn instance_url(&self) -> Result<Url, ProvisionError> {
        let raw = if self.instance.contains("://") {
            self.instance.clone()
        } else {
            format!("https://{}", self.instance)
        };
        Ok(Url::parse(&raw)?)
    }

    /// Friendly name sent with the integration request.
    pub fn friendly_name(&self) -> &str {
        if self.integration_friendly_name.is_empty() {
            &self.display_name
        } else {
            &self.integration_friendly_name
        }
    }
}

/// Bearer token for the instance, taken verbatim from the process
/// environment. Absent or blank is fatal.
pub fn load_access_token() -> Result<String, ProvisionError> {
    match std::env::var(ACCESS_TOKEN_VAR) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(ProvisionError::Config(format!(
            "{ACCESS_TOKEN_VAR} is not set; add it to .env or the environment"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_an_instance() {
        figment::Jail::expect_with(|_jail| {
            let err = Config::load().expect_err("empty instance must be rejected");
            assert!(matches!(err, ProvisionError::Config(_)));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_reach_the_struct() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BYOS_INSTANCE", "acme.domo.com");
            jail.set_env("BYOS_WAREHOUSE_NAME", "WH_PROD");
            jail.set_env("BYOS_WAREHOUSE_ACTIVITIES", r#"["query","dataflow"]"#);
            let cfg = Config::load().map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(cfg.instance, "acme.domo.com");
            assert_eq!(cfg.warehouse_name, "WH_PROD");
            assert_eq!(
                cfg.warehouse_activities,
                vec![Activity::Query, Activity::Dataflow]
            );
            Ok(())
        });
    }

    #[test]
    fn unknown_activity_is_a_config_error() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("BYOS_INSTANCE", "acme.domo.com");
            jail.set_env("BYOS_WAREHOUSE_ACTIVITIES", r#"["query","transform"]"#);
            let err = Config::load().expect_err("'transform' is not a valid activity");
            assert!(matches!(err, ProvisionError::Figment(_)));
            Ok(())
        });
    }

    #[test]
    fn instance_url_gets_https_prepended() {
        let cfg = Config {
            instance: "acme.domo.com".to_string(),
            ..Config::default()
        };
        assert_eq!(
            cfg.instance_url().unwrap().as_str(),
            "https://acme.domo.com/"
        );
    }

    #[test]
    fn instance_url_keeps_an_explicit_scheme() {
        let cfg = Config {
            instance: "http://127.0.0.1:4567".to_string(),
            ..Config::default()
        };
        assert_eq!(
            cfg.instance_url().unwrap().as_str(),
            "http://127.0.0.1:4567/"
        );
    }

    #[test]
    fn friendly_name_falls_back_to_display_name() {
        let cfg = Config {
            display_name: "Prod Snowflake".to_string(),
            ..Config::default()
        };
        assert_eq!(cfg.friendly_name(), "Prod Snowflake");

        let cfg = Config {
            display_name: "Prod Snowflake".to_string(),
            integration_friendly_name: "Analytics".to_string(),
            ..cfg
        };
        assert_eq!(cfg.friendly_name(), "Analytics");
    }

    #[test]
    fn missing_token_is_fatal() {
        figment::Jail::expect_with(|jail| {
            jail.set_env(ACCESS_TOKEN_VAR, "   ");
            let err = load_access_token().expect_err("blank token must be rejected");
            assert!(matches!(err, ProvisionError::Config(_)));

            jail.set_env(ACCESS_TOKEN_VAR, "tok-1");
            let token = load_access_token().map_err(|e| figment::Error::from(e.to_string()))?;
            assert_eq!(token, "tok-1");
            Ok(())
        });
    }
}
