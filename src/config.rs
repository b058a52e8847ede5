use std::time::Duration;

use lettre::message::Mailbox;
use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Settings {
    pub log_level: String,
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub newsletter: NewsletterSettings,
    #[serde(default)]
    pub delivery: DeliverySettings,
}

#[derive(Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    pub max_body_bytes: usize,
}

#[derive(Deserialize)]
pub struct EmailClientSettings {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub username: String,
    pub password: Secret<String>,
    pub sender_email: String,
    pub sender_name: Option<String>,
    pub timeout_milliseconds: u64,
}

impl EmailClientSettings {
    pub fn sender(&self) -> Result<Mailbox, lettre::address::AddressError> {
        Ok(Mailbox::new(
            self.sender_name.clone(),
            self.sender_email.parse()?,
        ))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SmtpTls {
    /// Plain connection upgraded with STARTTLS.
    Starttls,
    /// Implicit TLS, usually on port 465.
    Tls,
    /// No encryption at all. Only meant for local catch-all relays.
    None,
}

#[derive(Deserialize, Clone, Debug)]
pub struct NewsletterSettings {
    pub team_name: String,
    pub logo_url: Option<String>,
}

#[derive(Deserialize, Clone, Copy, Debug)]
pub struct DeliverySettings {
    pub mode: DeliveryMode,
    pub max_in_flight: usize,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::Sequential,
            max_in_flight: 8,
        }
    }
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// One recipient after the other, the first failure aborts the batch.
    Sequential,
    /// One task per recipient, every outcome is reported.
    Independent,
}

pub enum Environment {
    Local,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{} is not a supported environment. Use either `local` or `production`.",
                other
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("Failed to read the current dir: {e}")))?;
    let configuration_directory = base_path.join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(config::ConfigError::Message)?;
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")))
        .add_source(config::File::from(
            configuration_directory.join(environment_filename),
        ))
        // E.g. `APP_EMAIL_CLIENT__PASSWORD=secret` sets `Settings.email_client.password`
        // and `APP_APPLICATION__ALLOWED_ORIGINS=https://a.com,https://b.com` sets a list.
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("application.allowed_origins"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}
