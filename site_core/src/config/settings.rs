use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub mail: MailConfig,
    pub rate_limit: RateLimitConfig,
    pub delivery: DeliveryConfig,
    pub uploads: UploadConfig,
    pub bot: BotConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Transactional email provider settings. `api_key` is a deployment
/// secret and defaults to empty; an empty key is reported per-request
/// as the `config` failure reason rather than refusing to start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub endpoint: String,
    pub api_key: String,
    pub from_name: String,
    pub operations_address: String,
    pub cc: Vec<String>,
    pub site_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests: u32,
    pub window_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    pub timeout_ms: u64,
    pub retry_delay_ms: u64,
    pub max_retries: u32,
    pub max_inflight: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_files: usize,
    pub max_file_bytes: u64,
    pub max_total_bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    pub verify_url: String,
    pub secret_key: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            mail: MailConfig::default(),
            rate_limit: RateLimitConfig::default(),
            delivery: DeliveryConfig::default(),
            uploads: UploadConfig::default(),
            bot: BotConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.resend.com/emails".to_string(),
            api_key: String::new(),
            from_name: "Dry Force".to_string(),
            operations_address: "operations@dryforce.co.za".to_string(),
            cc: Vec::new(),
            site_url: "https://dryforce.co.za".to_string(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 3,
            window_secs: 60,
        }
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8000,
            retry_delay_ms: 250,
            max_retries: 1,
            max_inflight: 10,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_files: 5,
            max_file_bytes: 5 * 1024 * 1024,
            max_total_bytes: 15 * 1024 * 1024,
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            verify_url: "https://challenges.cloudflare.com/turnstile/v0/siteverify".to_string(),
            secret_key: String::new(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if std::path::Path::new("config.toml").exists() {
            builder = builder.add_source(File::with_name("config"));
        }

        builder = builder.add_source(
            Environment::with_prefix("SITE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let app_config: AppConfig = config.try_deserialize()?;

        app_config.validate()?;

        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("Server port cannot be 0".to_string()));
        }

        if self.mail.endpoint.is_empty() {
            return Err(ConfigError::Message(
                "Mail endpoint cannot be empty".to_string(),
            ));
        }

        if self.mail.operations_address.is_empty() {
            return Err(ConfigError::Message(
                "Operations address cannot be empty".to_string(),
            ));
        }

        if self.mail.api_key.is_empty() {
            tracing::warn!("Mail API key is not set - form submissions will be rejected");
        }

        if self.rate_limit.max_requests == 0 {
            return Err(ConfigError::Message(
                "Rate limit max requests must be greater than 0".to_string(),
            ));
        }

        if self.rate_limit.window_secs == 0 {
            return Err(ConfigError::Message(
                "Rate limit window must be greater than 0".to_string(),
            ));
        }

        if self.delivery.timeout_ms == 0 {
            return Err(ConfigError::Message(
                "Delivery timeout must be greater than 0".to_string(),
            ));
        }

        if self.delivery.max_inflight == 0 {
            return Err(ConfigError::Message(
                "Delivery max inflight must be greater than 0".to_string(),
            ));
        }

        if self.uploads.max_files == 0 {
            return Err(ConfigError::Message(
                "Upload max files must be greater than 0".to_string(),
            ));
        }

        if self.uploads.max_file_bytes == 0 || self.uploads.max_total_bytes == 0 {
            return Err(ConfigError::Message(
                "Upload size limits must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Sender header in the provider's `Name <address>` form.
    pub fn mail_from(&self) -> String {
        format!("{} <{}>", self.mail.from_name, self.mail.operations_address)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
