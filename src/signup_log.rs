//! Best-effort copy of every valid signup into the campaign spreadsheet.
//!
//! The sink is fire-and-forget: entries are delivered on a detached task and
//! whatever happens to them never reaches the caller of `/api/subscribe`.
use std::time::Duration;

use actix_web::http::header::{HeaderName, REFERER, USER_AGENT};
use actix_web::HttpRequest;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::Instrument;

use crate::domain::NewSubscriber;

pub struct SignupLogClient {
    http_client: Client,
    url: Option<String>,
    source: String,
    consent_text: String,
}

#[derive(serde::Serialize, Debug, Clone, PartialEq)]
pub struct SignupLogEntry {
    pub timestamp: String,
    pub email: String,
    pub firstname: String,
    pub gdpr_consent: &'static str,
    pub gdpr_consent_text: String,
    pub consent_date: String,
    pub ip_address: String,
    pub source: String,
    pub page_url: String,
    pub user_agent: String,
}

#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub ip_address: Option<String>,
    pub page_url: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMetadata {
    pub fn from_request(request: &HttpRequest) -> Self {
        let header = |name: HeaderName| {
            request
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        Self {
            ip_address: request
                .connection_info()
                .realip_remote_addr()
                .map(str::to_owned),
            page_url: header(REFERER),
            user_agent: header(USER_AGENT),
        }
    }
}

impl SignupLogClient {
    pub fn new(
        url: Option<String>,
        source: String,
        consent_text: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url,
            source,
            consent_text,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.url.is_some()
    }

    pub fn entry(
        &self,
        subscriber: &NewSubscriber,
        metadata: RequestMetadata,
        now: DateTime<Utc>,
    ) -> SignupLogEntry {
        let unknown = || "unknown".to_owned();
        SignupLogEntry {
            timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
            email: subscriber.email.as_ref().to_owned(),
            firstname: subscriber.name.as_ref().to_owned(),
            gdpr_consent: if subscriber.gdpr_consent { "Yes" } else { "No" },
            gdpr_consent_text: self.consent_text.clone(),
            consent_date: now.format("%d.%m.%Y, %H:%M:%S").to_string(),
            ip_address: metadata.ip_address.unwrap_or_else(unknown),
            source: self.source.clone(),
            page_url: metadata.page_url.unwrap_or_else(unknown),
            user_agent: metadata.user_agent.unwrap_or_else(unknown),
        }
    }

    pub fn record(&self, entry: SignupLogEntry) {
        let Some(url) = self.url.clone() else {
            return;
        };
        let http_client = self.http_client.clone();
        tokio::spawn(
            async move {
                if let Err(e) = send(&http_client, &url, &entry).await {
                    tracing::warn!(error = %e, "Failed to deliver signup log entry");
                }
            }
            .instrument(tracing::Span::current()),
        );
    }
}

#[tracing::instrument(name = "Sending signup log entry", skip(http_client, url, entry))]
async fn send(http_client: &Client, url: &str, entry: &SignupLogEntry) -> Result<(), reqwest::Error> {
    http_client
        .post(url)
        .json(entry)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
