use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::FirstName;
use fake::Fake;
use secrecy::Secret;
use signup_relay::configuration::{get_configuration, Settings};
use signup_relay::startup::Application;
use signup_relay::telemetry::{get_subscriber, init_subscriber};
use std::sync::Once;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT_SUBSCRIBER: Once = Once::new();

pub const ALLOWED_ORIGIN: &str = "http://localhost:8000";
pub const OPT_IN_PATH: &str = "/api/v1/opt_in_settings/save";
pub const SIGNUP_LOG_PATH: &str = "/exec";

pub struct TestApp {
    pub address: String,
    pub marketer_server: MockServer,
    pub signup_log_server: MockServer,
    pub api_client: reqwest::Client,
}

impl TestApp {
    pub async fn post_subscribe(&self, body: &serde_json::Value) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/subscribe", &self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
    pub async fn post_subscribe_from(
        &self,
        origin: &str,
        body: &serde_json::Value,
    ) -> reqwest::Response {
        self.api_client
            .post(&format!("{}/api/subscribe", &self.address))
            .header("Origin", origin)
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
    pub async fn mount_marketer_reply(&self, status: u16, body: serde_json::Value, expected: u64) {
        Mock::given(path(OPT_IN_PATH))
            .and(method("GET"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .expect(expected)
            .mount(&self.marketer_server)
            .await;
    }
    /// The signup log is delivered on a detached task, so poll for a while.
    pub async fn signup_log_requests(&self, expected: usize) -> Vec<wiremock::Request> {
        for _ in 0..50 {
            let received = self
                .signup_log_server
                .received_requests()
                .await
                .unwrap_or_default();
            if received.len() >= expected {
                return received;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.signup_log_server
            .received_requests()
            .await
            .unwrap_or_default()
    }
}

pub fn valid_body() -> serde_json::Value {
    let email: String = SafeEmail().fake();
    let firstname: String = FirstName().fake();
    serde_json::json!({
        "email": email,
        "firstname": firstname,
        "gdpr_consent": true,
    })
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(|_| {}).await
}

pub async fn spawn_app_with(customise: impl FnOnce(&mut Settings)) -> TestApp {
    INIT_SUBSCRIBER.call_once(|| {
        if std::env::var("TEST_LOG").is_ok() {
            init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::stdout));
        } else {
            init_subscriber(get_subscriber("test".into(), "debug".into(), std::io::sink));
        }
    });

    let marketer_server = MockServer::start().await;
    let signup_log_server = MockServer::start().await;

    let configuration = {
        let mut c = get_configuration().expect("Failed to read configuration");
        c.application.port = 0;
        c.application.allowed_origins = vec![ALLOWED_ORIGIN.to_owned()];
        c.marketer.base_url = marketer_server.uri();
        c.marketer.customer_key = Some(Secret::new("customer-key".to_owned()));
        c.marketer.rest_key = Some(Secret::new("rest-key".to_owned()));
        c.marketer.timeout_milliseconds = 2000;
        c.signup_log.url = Some(format!("{}{}", signup_log_server.uri(), SIGNUP_LOG_PATH));
        customise(&mut c);
        c
    };

    let application = Application::build(&configuration)
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", application.port());
    tokio::spawn(application.run_until_stopped());

    TestApp {
        address,
        marketer_server,
        signup_log_server,
        api_client: reqwest::Client::new(),
    }
}
