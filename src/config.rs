use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub server: ServerConfig,

    pub database: DatabaseConfig,

    pub site: SiteConfig,

    pub auth: AuthConfig,

    pub email: EmailConfig,

    pub storage: StorageConfig,

    pub cdn: CdnConfig,

    pub rate_limit: RateLimitConfig,

    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// Number of tokio worker threads (default: 2)
    /// Set to 0 to use the number of CPU cores
    pub worker_threads: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    pub cors_allowed_origins: Vec<String>,

    /// Whether to set the Secure flag on session cookies.
    /// Set to false for local development without HTTPS.
    pub secure_cookies: bool,

    /// Admin sessions expire after this much inactivity.
    pub session_inactivity_minutes: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            secure_cookies: true,
            session_inactivity_minutes: 12 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `postgres://...` for the hosted database, `sqlite:...` for local work.
    pub url: String,

    pub max_connections: u32,

    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:data/autosource.db".to_string(),
            max_connections: 5,
            min_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,

    /// Public origin used when building links that leave the site (login e-mails).
    pub base_url: String,

    pub currency_symbol: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "AutoSource".to_string(),
            base_url: "http://localhost:3000".to_string(),
            currency_symbol: "£".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Lifetime of an e-mailed login link.
    pub link_ttl_minutes: i64,

    /// E-mails upserted as admins on every startup.
    pub bootstrap_admins: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            link_ttl_minutes: 15,
            bootstrap_admins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MailProvider {
    /// Write messages to the log instead of sending them.
    Log,
    /// Transactional e-mail HTTP API.
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub provider: MailProvider,

    pub api_url: String,

    pub api_key: String,

    pub from: String,

    /// Inbox that receives new-lead notifications.
    pub notify_to: String,

    pub request_timeout_seconds: u64,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: MailProvider::Log,
            api_url: "https://api.resend.com".to_string(),
            api_key: String::new(),
            from: "AutoSource <no-reply@localhost>".to_string(),
            notify_to: "sales@localhost".to_string(),
            request_timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackendKind {
    Local,
    Cdn,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackendKind,

    /// Directory for the local backend, served under `public_prefix`.
    pub local_dir: String,

    pub public_prefix: String,

    pub max_upload_bytes: usize,

    pub allowed_types: Vec<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackendKind::Local,
            local_dir: "uploads".to_string(),
            public_prefix: "/uploads".to_string(),
            max_upload_bytes: 8 * 1024 * 1024,
            allowed_types: vec![
                "image/jpeg".to_string(),
                "image/png".to_string(),
                "image/webp".to_string(),
                "image/avif".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CdnConfig {
    pub upload_url: String,

    pub api_key: String,

    pub api_secret: String,

    pub folder: String,

    /// Uploaded images are limited to this width by the CDN.
    pub max_width: u32,

    pub request_timeout_seconds: u64,
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            upload_url: "https://api.cloudinary.com/v1_1/demo/image/upload".to_string(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: "vehicles".to_string(),
            max_width: 1600,
            request_timeout_seconds: 60,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct QuotaConfig {
    pub max_requests: u32,

    pub window_seconds: u64,
}

impl Default for QuotaConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_seconds: 10 * 60,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Use the first `X-Forwarded-For` hop as the client identity.
    /// Only enable behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,

    pub contact: QuotaConfig,

    pub login: QuotaConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            trust_forwarded_for: false,
            contact: QuotaConfig::default(),
            login: QuotaConfig {
                max_requests: 5,
                window_seconds: 15 * 60,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub metrics_enabled: bool,

    pub json_logs: bool,

    pub loki_enabled: bool,

    pub loki_url: String,

    pub loki_labels: HashMap<String, String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        let mut labels = HashMap::new();
        labels.insert("app".to_string(), "autosource".to_string());

        Self {
            metrics_enabled: true,
            json_logs: false,
            loki_enabled: false,
            loki_url: "http://localhost:3100".to_string(),
            loki_labels: labels,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            site: SiteConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            storage: StorageConfig::default(),
            cdn: CdnConfig::default(),
            rate_limit: RateLimitConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let paths = Self::config_paths();

        let mut config = None;
        for path in &paths {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Some(Self::load_from_path(path)?);
                break;
            }
        }

        let mut config = config.unwrap_or_else(|| {
            info!("No config file found, using defaults");
            Self::default()
        });
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Secrets usually live in the environment rather than in `config.toml`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("AUTOSOURCE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(key) = non_empty("AUTOSOURCE_EMAIL_API_KEY") {
            self.email.api_key = key;
        }
        if let Some(key) = non_empty("AUTOSOURCE_CDN_API_KEY") {
            self.cdn.api_key = key;
        }
        if let Some(secret) = non_empty("AUTOSOURCE_CDN_API_SECRET") {
            self.cdn.api_secret = secret;
        }
        if let Some(base_url) = non_empty("AUTOSOURCE_BASE_URL") {
            self.site.base_url = base_url;
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        paths.push(PathBuf::from("config.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("autosource").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".autosource").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("config.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.is_empty() {
            anyhow::bail!("database.url cannot be empty");
        }

        url::Url::parse(&self.site.base_url)
            .with_context(|| format!("site.base_url is not a valid URL: {}", self.site.base_url))?;

        if self.email.provider == MailProvider::Http && self.email.api_key.is_empty() {
            anyhow::bail!("email.api_key is required when email.provider = \"http\"");
        }

        if self.storage.backend == StorageBackendKind::Cdn
            && (self.cdn.api_key.is_empty() || self.cdn.api_secret.is_empty())
        {
            anyhow::bail!("cdn.api_key and cdn.api_secret are required for the cdn backend");
        }

        for (name, quota) in [
            ("contact", &self.rate_limit.contact),
            ("login", &self.rate_limit.login),
        ] {
            if quota.max_requests == 0 || quota.window_seconds == 0 {
                anyhow::bail!("rate_limit.{name} must allow at least one request per window");
            }
        }

        if self.auth.link_ttl_minutes <= 0 {
            anyhow::bail!("auth.link_ttl_minutes must be positive");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.email.provider, MailProvider::Log);
        assert_eq!(config.storage.backend, StorageBackendKind::Local);
        assert_eq!(config.rate_limit.contact.max_requests, 5);
        assert_eq!(config.auth.link_ttl_minutes, 15);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[database]"));
        assert!(toml_str.contains("[rate_limit.contact]"));
        assert!(toml_str.contains("[storage]"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            [general]
            log_level = "debug"

            [email]
            provider = "http"
            api_key = "re_123"

            [storage]
            backend = "cdn"
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.log_level, "debug");
        assert_eq!(config.email.provider, MailProvider::Http);
        assert_eq!(config.storage.backend, StorageBackendKind::Cdn);
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_validate_rejects_cdn_without_credentials() {
        let mut config = Config::default();
        config.storage.backend = StorageBackendKind::Cdn;
        assert!(config.validate().is_err());

        config.cdn.api_key = "key".to_string();
        config.cdn.api_secret = "secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_http_mailer_without_key() {
        let mut config = Config::default();
        config.email.provider = MailProvider::Http;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_quota() {
        let mut config = Config::default();
        config.rate_limit.login.max_requests = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides_from(|key| match key {
            "AUTOSOURCE_DATABASE_URL" => Some("postgres://db/site".to_string()),
            "AUTOSOURCE_CDN_API_SECRET" => Some("s3cret".to_string()),
            "AUTOSOURCE_EMAIL_API_KEY" => Some("   ".to_string()),
            _ => None,
        });

        assert_eq!(config.database.url, "postgres://db/site");
        assert_eq!(config.cdn.api_secret, "s3cret");
        assert!(config.email.api_key.is_empty());
    }
}
