use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};

use crate::domain::NewSubscriber;

const OPT_IN_PATH: &str = "/api/v1/opt_in_settings/save";

#[derive(Debug)]
pub struct MarketerCredentials {
    customer_key: Secret<String>,
    rest_key: Secret<String>,
}

impl MarketerCredentials {
    pub fn new(customer_key: Secret<String>, rest_key: Secret<String>) -> Self {
        Self {
            customer_key,
            rest_key,
        }
    }
}

pub struct MarketerClient {
    http_client: Client,
    base_url: String,
    credentials: Option<MarketerCredentials>,
}

#[derive(thiserror::Error, Debug)]
pub enum MarketerError {
    #[error("theMarketer credentials are not configured")]
    MissingCredentials,
    #[error("theMarketer responded with status {0}")]
    UnexpectedStatus(StatusCode),
    #[error("Failed to reach theMarketer")]
    Transport(#[from] reqwest::Error),
    #[error("theMarketer returned a body that is not JSON")]
    MalformedReply(#[source] serde_json::Error),
    #[error("theMarketer returned a null body")]
    NullReply,
}

#[derive(Debug)]
pub struct OptInReply(serde_json::Value);

impl OptInReply {
    pub fn is_success(&self) -> bool {
        self.0.get("status").and_then(|s| s.as_str()) == Some("success")
            || self.0.get("success").and_then(|s| s.as_bool()) == Some(true)
    }
}

impl std::fmt::Display for OptInReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl MarketerClient {
    pub fn new(
        base_url: String,
        credentials: Option<MarketerCredentials>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    pub fn is_configured(&self) -> bool {
        self.credentials.is_some()
    }

    #[tracing::instrument(
        name = "Saving opt-in settings on theMarketer",
        skip(self, subscriber),
        fields(subscribe_newsletter = subscriber.subscribe_flag())
    )]
    pub async fn save_opt_in(&self, subscriber: &NewSubscriber) -> Result<OptInReply, MarketerError> {
        let credentials = match &self.credentials {
            Some(credentials) => credentials,
            None => {
                tracing::error!("theMarketer credentials not configured");
                return Err(MarketerError::MissingCredentials);
            }
        };
        let url = format!("{}{}", self.base_url, OPT_IN_PATH);
        let response = self
            .http_client
            .get(&url)
            .header(ACCEPT, "application/json")
            .query(&[
                ("k", credentials.customer_key.expose_secret().as_str()),
                ("u", credentials.rest_key.expose_secret().as_str()),
                ("email_address", subscriber.email.as_ref()),
                ("firstname", subscriber.name.as_ref()),
                ("subscribe_newsletter", subscriber.subscribe_flag()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "theMarketer API error");
            return Err(MarketerError::UnexpectedStatus(status));
        }
        let body = response.bytes().await?;
        let reply: serde_json::Value =
            serde_json::from_slice(&body).map_err(MarketerError::MalformedReply)?;
        if reply.is_null() {
            return Err(MarketerError::NullReply);
        }
        Ok(OptInReply(reply))
    }
}
