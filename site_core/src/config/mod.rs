pub mod settings;

pub use settings::{
    AppConfig, BotConfig, DeliveryConfig, MailConfig, RateLimitConfig, ServerConfig, UploadConfig,
};
