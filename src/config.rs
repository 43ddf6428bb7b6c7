use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub base_url: String,
    pub host: String,
    pub port: u16,

    // Payment processor (checkout sessions)
    pub payments_api_url: String,
    pub payments_secret_key: Secret<String>,
    pub ticket_price_cents: i64,

    // SMTP relay for notification emails (optional; emails are skipped when
    // not configured)
    pub smtp_server: Option<String>,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<Secret<String>>,
    pub email_from_address: Option<String>,
    pub email_from_name: String,

    // Security
    pub session_secret: Secret<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        let config = config::Config::builder()
            .add_source(config::Environment::default().separator("__"))
            .build()?;

        Ok(Self {
            database_url: config.get("database_url")?,
            base_url: config.get("base_url")?,
            host: config.get("host").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: config.get("port")?,

            payments_api_url: config
                .get("payments_api_url")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            payments_secret_key: Secret::new(config.get("payments_secret_key")?),
            ticket_price_cents: config.get("ticket_price_cents").unwrap_or(1000),

            smtp_server: config.get("smtp_server").ok(),
            smtp_port: config.get("smtp_port").unwrap_or(587),
            smtp_username: config.get("smtp_username").ok(),
            smtp_password: config
                .get::<String>("smtp_password")
                .ok()
                .map(Secret::new),
            email_from_address: config.get("email_from_address").ok(),
            email_from_name: config
                .get("email_from_name")
                .unwrap_or_else(|_| "Marquee Events".to_string()),

            session_secret: Secret::new(config.get("session_secret")?),
        })
    }
}
