use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

/// Secrets for the two independent cookie sessions. An empty secret means the
/// corresponding session tier cannot authenticate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub admin_session_secret: String,
    pub finance_session_secret: String,
    pub session_expiry_hours: u64,
}

/// Delivery-provider settings. Every field is optional at runtime; a channel
/// with incomplete configuration reports itself as unconfigured instead of
/// failing the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    pub email_api_url: Option<String>,
    pub email_api_key: Option<String>,
    pub email_from: Option<String>,
    pub whatsapp_account_sid: Option<String>,
    pub whatsapp_auth_token: Option<String>,
    pub whatsapp_from: Option<String>,
    pub provider_timeout_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        if let Ok(v) = env::var("ADMIN_SESSION_SECRET") {
            self.security.admin_session_secret = v;
        }
        if let Ok(v) = env::var("FINANCE_SESSION_SECRET") {
            self.security.finance_session_secret = v;
        }
        if let Ok(v) = env::var("SESSION_EXPIRY_HOURS") {
            self.security.session_expiry_hours =
                v.parse().unwrap_or(self.security.session_expiry_hours);
        }

        self.notify.email_api_url = env::var("EMAIL_API_URL").ok().or(self.notify.email_api_url);
        self.notify.email_api_key = env::var("EMAIL_API_KEY").ok().or(self.notify.email_api_key);
        self.notify.email_from = env::var("EMAIL_FROM").ok().or(self.notify.email_from);
        self.notify.whatsapp_account_sid = env::var("WHATSAPP_ACCOUNT_SID")
            .ok()
            .or(self.notify.whatsapp_account_sid);
        self.notify.whatsapp_auth_token = env::var("WHATSAPP_AUTH_TOKEN")
            .ok()
            .or(self.notify.whatsapp_auth_token);
        self.notify.whatsapp_from = env::var("WHATSAPP_FROM").ok().or(self.notify.whatsapp_from);
        if let Ok(v) = env::var("NOTIFY_PROVIDER_TIMEOUT_SECS") {
            self.notify.provider_timeout_secs =
                v.parse().unwrap_or(self.notify.provider_timeout_secs);
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                admin_session_secret: String::new(),
                finance_session_secret: String::new(),
                session_expiry_hours: 24 * 7,
            },
            notify: NotifyConfig {
                email_api_url: None,
                email_api_key: None,
                email_from: None,
                whatsapp_account_sid: None,
                whatsapp_auth_token: None,
                whatsapp_from: None,
                provider_timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        Self {
            database: DatabaseConfig {
                max_connections: 20,
                acquire_timeout_secs: 5,
            },
            security: SecurityConfig {
                session_expiry_hours: 24,
                ..Self::development().security
            },
            environment: Environment::Staging,
            ..Self::development()
        }
    }

    fn production() -> Self {
        Self {
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 3,
            },
            security: SecurityConfig {
                session_expiry_hours: 4,
                ..Self::development().security
            },
            environment: Environment::Production,
            ..Self::development()
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert!(config.is_development());
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.security.session_expiry_hours, 24 * 7);
        assert!(config.notify.email_api_url.is_none());
    }

    #[test]
    fn production_tightens_sessions() {
        let config = AppConfig::production();
        assert!(!config.is_development());
        assert_eq!(config.security.session_expiry_hours, 4);
        assert_eq!(config.database.max_connections, 50);
    }
}
