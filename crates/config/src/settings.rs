use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub clerk: ClerkSettings,
    pub email: EmailSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Public origin of the marketing site / portal, used to build
    /// redirect URLs embedded in provider invitations.
    pub public_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub name: String,
    pub max_pool_size: Option<u32>,
    pub min_pool_size: Option<u32>,
}

/// Identity provider (Clerk) settings.
#[derive(Debug, Deserialize, Clone)]
pub struct ClerkSettings {
    /// Backend API secret key (`sk_...`).
    pub secret_key: String,
    /// Webhook signing secret (`whsec_...`).
    pub webhook_secret: String,
    /// Base URL of the backend API. Overridable so tests can point at a stub.
    pub api_base: String,
    /// PEM-encoded RSA public key used to verify session JWTs.
    pub jwt_public_key: String,
    /// Path (relative to `app.public_url`) of the invitation acceptance page.
    pub accept_invite_path: String,
}

/// Transactional email API settings.
#[derive(Debug, Deserialize, Clone)]
pub struct EmailSettings {
    pub api_key: String,
    /// Base URL of the email API. Overridable so tests can point at a stub.
    pub api_base: String,
    pub from: String,
    /// Address that receives internal waitlist notifications.
    pub notify_to: String,
    /// Disable outbound email entirely (local development).
    pub enabled: bool,
}

impl Settings {
    pub fn load() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::default()
                    .separator("__")
                    .prefix("WRENCHLY"),
            )
            .set_default("app.host", "0.0.0.0")?
            .set_default("app.port", 3000)?
            .set_default("app.cors_origins", Vec::<String>::new())?
            .set_default("app.public_url", "http://localhost:3000")?
            .set_default("database.url", "mongodb://localhost:27017")?
            .set_default("database.name", "wrenchly")?
            .set_default("clerk.secret_key", "")?
            .set_default("clerk.webhook_secret", "")?
            .set_default("clerk.api_base", "https://api.clerk.com/v1")?
            .set_default("clerk.jwt_public_key", "")?
            .set_default("clerk.accept_invite_path", "/accept-invite")?
            .set_default("email.api_key", "")?
            .set_default("email.api_base", "https://api.resend.com")?
            .set_default("email.from", "Wrenchly <hello@wrenchly.app>")?
            .set_default("email.notify_to", "team@wrenchly.app")?
            .set_default("email.enabled", false)?
            .build()?;

        config.try_deserialize()
    }
}
