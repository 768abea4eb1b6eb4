use once_cell::sync::Lazy;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Secret for the short-lived access token. Must be set in production.
    pub access_token_secret: String,
    /// Secret for the long-lived refresh token. Distinct from the access
    /// secret so a leak of one does not compromise the other.
    pub refresh_token_secret: String,
    pub access_token_ttl_hours: i64,
    pub refresh_token_ttl_days: i64,
    pub cookie_secure: bool,
    pub cookie_same_site: CookieSameSite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieSameSite {
    Strict,
    Lax,
    None,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout_secs =
                v.parse().unwrap_or(self.database.connection_timeout_secs);
        }

        // Security overrides
        if let Ok(v) = env::var("ACCESS_TOKEN_SECRET") {
            self.security.access_token_secret = v;
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_SECRET") {
            self.security.refresh_token_secret = v;
        }
        if let Ok(v) = env::var("ACCESS_TOKEN_TTL_HOURS") {
            self.security.access_token_ttl_hours =
                v.parse().unwrap_or(self.security.access_token_ttl_hours);
        }
        if let Ok(v) = env::var("REFRESH_TOKEN_TTL_DAYS") {
            self.security.refresh_token_ttl_days =
                v.parse().unwrap_or(self.security.refresh_token_ttl_days);
        }
        if let Ok(v) = env::var("COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("COOKIE_SAME_SITE") {
            self.security.cookie_same_site = match v.to_ascii_lowercase().as_str() {
                "strict" => CookieSameSite::Strict,
                "none" => CookieSameSite::None,
                _ => CookieSameSite::Lax,
            };
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout_secs: 30,
            },
            security: SecurityConfig {
                // Non-empty defaults so a fresh checkout runs without a .env;
                // production profiles ship empty and must be provided.
                access_token_secret: "taskboard-dev-access-secret".to_string(),
                refresh_token_secret: "taskboard-dev-refresh-secret".to_string(),
                access_token_ttl_hours: 24,
                refresh_token_ttl_days: 7,
                cookie_secure: false,
                cookie_same_site: CookieSameSite::Lax,
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout_secs: 10,
            },
            security: SecurityConfig {
                access_token_secret: String::new(),
                refresh_token_secret: String::new(),
                access_token_ttl_hours: 24,
                refresh_token_ttl_days: 7,
                cookie_secure: true,
                cookie_same_site: CookieSameSite::None,
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout_secs: 5,
            },
            security: SecurityConfig {
                access_token_secret: String::new(),
                refresh_token_secret: String::new(),
                access_token_ttl_hours: 4,
                refresh_token_ttl_days: 7,
                cookie_secure: true,
                cookie_same_site: CookieSameSite::None,
            },
        }
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
    fn development_config_has_usable_secrets() {
        let config = AppConfig::development();
        assert!(!config.security.access_token_secret.is_empty());
        assert!(!config.security.refresh_token_secret.is_empty());
        assert_ne!(
            config.security.access_token_secret,
            config.security.refresh_token_secret
        );
        assert!(!config.security.cookie_secure);
    }

    #[test]
    fn production_config_requires_env_secrets() {
        let config = AppConfig::production();
        assert!(config.security.access_token_secret.is_empty());
        assert!(config.security.refresh_token_secret.is_empty());
        assert!(config.security.cookie_secure);
        assert_eq!(config.security.cookie_same_site, CookieSameSite::None);
    }

    #[test]
    fn token_lifetimes_cover_cookie_lifetimes() {
        let config = AppConfig::development();
        assert_eq!(config.security.access_token_ttl_hours, 24);
        assert_eq!(config.security.refresh_token_ttl_days, 7);
    }
}
