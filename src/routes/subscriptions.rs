use crate::domain::{NewSubscriber, SubscriberEmail, SubscriberName, SubscriptionOutcome};
use crate::marketer_client::{MarketerClient, MarketerError};
use crate::routes::error_chain_fmt;
use crate::signup_log::{RequestMetadata, SignupLogClient};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

#[derive(serde::Deserialize)]
pub struct SubscribeBody {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub gdpr_consent: Option<bool>,
}

impl TryFrom<SubscribeBody> for NewSubscriber {
    type Error = SubscribeError;
    fn try_from(body: SubscribeBody) -> Result<Self, Self::Error> {
        let email = body.email.filter(|email| !email.is_empty());
        let name = body.firstname.and_then(|name| SubscriberName::parse(name).ok());
        let (Some(email), Some(name)) = (email, name) else {
            return Err(SubscribeError::MissingFields);
        };
        let email = SubscriberEmail::parse(email).map_err(SubscribeError::InvalidEmail)?;
        Ok(Self {
            email,
            name,
            gdpr_consent: body.gdpr_consent.unwrap_or(false),
        })
    }
}

#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Email and firstname are required")]
    MissingFields,
    #[error("{0}")]
    InvalidEmail(String),
    #[error("theMarketer credentials are not configured")]
    Configuration,
    #[error("theMarketer rejected the request with status {0}")]
    Upstream(StatusCode),
    #[error("theMarketer did not confirm the subscription")]
    Declined,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl SubscribeError {
    pub fn public_message(&self) -> &'static str {
        match self {
            SubscribeError::MissingFields => "Email and firstname are required",
            SubscribeError::InvalidEmail(_) => "Invalid email format",
            SubscribeError::Configuration => "Server configuration error",
            SubscribeError::Upstream(_) => "Failed to subscribe to newsletter",
            SubscribeError::Declined => "Subscription failed",
            SubscribeError::UnexpectedError(_) => "Internal server error",
        }
    }
}

impl std::fmt::Debug for SubscribeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            SubscribeError::MissingFields
            | SubscribeError::InvalidEmail(_)
            | SubscribeError::Declined => StatusCode::BAD_REQUEST,
            SubscribeError::Upstream(status) => *status,
            SubscribeError::Configuration | SubscribeError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .json(SubscriptionOutcome::failure(self.public_message()))
    }
}

impl From<MarketerError> for SubscribeError {
    fn from(e: MarketerError) -> Self {
        match e {
            MarketerError::MissingCredentials => SubscribeError::Configuration,
            MarketerError::UnexpectedStatus(status) => SubscribeError::Upstream(
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::BAD_GATEWAY),
            ),
            MarketerError::Transport(_)
            | MarketerError::MalformedReply(_)
            | MarketerError::NullReply => {
                SubscribeError::UnexpectedError(anyhow::Error::new(e))
            }
        }
    }
}

#[tracing::instrument(
    name = "Relaying a new subscription",
    skip(body, request, marketer_client, signup_log),
    fields(
        subscriber_email = ?body.email,
        subscriber_name = ?body.firstname,
    )
)]
pub async fn subscribe(
    body: web::Json<SubscribeBody>,
    request: HttpRequest,
    marketer_client: web::Data<MarketerClient>,
    signup_log: web::Data<SignupLogClient>,
) -> Result<HttpResponse, SubscribeError> {
    let new_subscriber: NewSubscriber = body.into_inner().try_into()?;

    let entry = signup_log.entry(
        &new_subscriber,
        RequestMetadata::from_request(&request),
        chrono::Utc::now(),
    );
    signup_log.record(entry);

    let reply = marketer_client.save_opt_in(&new_subscriber).await?;
    if !reply.is_success() {
        tracing::error!(reply = %reply, "theMarketer returned unsuccessful response");
        return Err(SubscribeError::Declined);
    }

    tracing::info!(subscriber_email = %new_subscriber.email, "Successfully subscribed");
    Ok(HttpResponse::Ok().json(SubscriptionOutcome::subscribed()))
}
