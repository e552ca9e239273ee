use std::time::Duration;

use secrecy::{ExposeSecret, Secret};
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::marketer_client::{MarketerClient, MarketerCredentials};
use crate::signup_log::SignupLogClient;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub marketer: MarketerSettings,
    pub signup_log: SignupLogSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
    pub environment: Environment,
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:8000".to_owned()]
}

#[derive(serde::Deserialize, Clone)]
pub struct MarketerSettings {
    pub base_url: String,
    pub customer_key: Option<Secret<String>>,
    pub rest_key: Option<Secret<String>>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl MarketerSettings {
    /// Both keys must be present and non-empty, otherwise the relay runs unconfigured.
    pub fn credentials(&self) -> Option<MarketerCredentials> {
        let customer_key = self.customer_key.as_ref().filter(|k| !k.expose_secret().is_empty())?;
        let rest_key = self.rest_key.as_ref().filter(|k| !k.expose_secret().is_empty())?;
        Some(MarketerCredentials::new(customer_key.clone(), rest_key.clone()))
    }
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
    pub fn client(&self) -> Result<MarketerClient, reqwest::Error> {
        MarketerClient::new(self.base_url.clone(), self.credentials(), self.timeout())
    }
}

#[derive(serde::Deserialize, Clone)]
pub struct SignupLogSettings {
    pub url: Option<String>,
    pub source: String,
    pub consent_text: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

impl SignupLogSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_milliseconds)
    }
    pub fn client(&self) -> Result<SignupLogClient, reqwest::Error> {
        SignupLogClient::new(
            self.url.clone().filter(|url| !url.is_empty()),
            self.source.clone(),
            self.consent_text.clone(),
            self.timeout(),
        )
    }
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .expect("Failed to determine current directory")
        .join("configuration");

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_owned())
        .try_into()
        .expect("Failed to parse APP_ENVIRONMENT");
    let environment_filename = format!("{}.yaml", environment.as_str());

    config::Config::builder()
        .add_source(config::File::from(base_path.join("base.yaml")).required(true))
        .add_source(config::File::from(base_path.join(environment_filename)).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("application.allowed_origins"),
        )
        .set_override("application.environment", environment.as_str())?
        .build()
        .and_then(|x| x.try_deserialize())
}

#[derive(serde::Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "String")]
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
            other => Err(format!("Expect local or production found {}", other)),
        }
    }
}
