use secrecy::Secret;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct RecordsConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub mongodb: MongoConfig,
    pub logging: LogConfig,
    pub updates: UpdatePolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    /// Unset leaves the service running without a store; data routes then fail per request.
    pub uri: Option<Secret<String>>,
    pub database: String,
    pub payroll_collection: String,
    pub shipping_collection: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    pub file_path: PathBuf,
    pub level: String,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatePolicy {
    /// `None` accepts any field path.
    pub allowed_fields: Option<Vec<String>>,
}

impl UpdatePolicy {
    pub fn permits(&self, field: &str) -> bool {
        match &self.allowed_fields {
            Some(fields) => fields.iter().any(|allowed| allowed == field),
            None => true,
        }
    }
}

impl RecordsConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let common_config = core_config::Config::load()?;

        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(RecordsConfig {
            common: common_config,
            mongodb: MongoConfig {
                uri: env::var("MONGO_URI")
                    .ok()
                    .filter(|uri| !uri.trim().is_empty())
                    .map(Secret::new),
                database: get_env("MONGO_DATABASE", Some("unisysibmDb"), is_prod)?,
                payroll_collection: get_env("PAYROLL_COLLECTION", Some("unisyseportal"), is_prod)?,
                shipping_collection: get_env("SHIPPING_COLLECTION", Some("ibmzowe"), is_prod)?,
            },
            logging: LogConfig {
                file_path: PathBuf::from(get_env("LOG_FILE", Some("app.log"), false)?),
                level: get_env("LOG_LEVEL", Some("info"), false)?,
                otlp_endpoint: env::var("OTLP_ENDPOINT").ok(),
            },
            updates: UpdatePolicy {
                allowed_fields: env::var("UPDATE_FIELD_ALLOWLIST")
                    .ok()
                    .map(|raw| parse_allowlist(&raw)),
            },
        })
    }
}

fn parse_allowlist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(str::to_string)
        .collect()
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_ignores_blank_entries() {
        assert_eq!(
            parse_allowlist(" status, ,address ,"),
            vec!["status".to_string(), "address".to_string()]
        );
    }

    #[test]
    fn default_policy_is_unrestricted() {
        assert!(UpdatePolicy::default().permits("anything.at.all"));
    }

    #[test]
    fn allowlist_rejects_unknown_fields() {
        let policy = UpdatePolicy {
            allowed_fields: Some(vec!["address".to_string()]),
        };
        assert!(policy.permits("address"));
        assert!(!policy.permits("salary"));
    }
}
