use crate::admission::{admit_origin, AllowedOrigins};
use crate::configuration::Settings;
use crate::domain::SubscriptionOutcome;
use crate::marketer_client::MarketerClient;
use crate::routes::{health_check, not_found, subscribe};
use crate::signup_log::SignupLogClient;
use actix_web::dev::Server;
use actix_web::error::InternalError;
use actix_web::{web, App, HttpResponse, HttpServer};
use actix_web_lab::middleware::from_fn;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

const MAX_BODY_BYTES: usize = 64 * 1024;

pub struct Application {
    port: u16,
    server: Server,
}
impl Application {
    pub async fn build(configuration: &Settings) -> Result<Self, anyhow::Error> {
        let marketer_client = configuration.marketer.client()?;
        if !marketer_client.is_configured() {
            tracing::warn!("theMarketer credentials not configured, subscriptions will fail");
        }
        let signup_log = configuration.signup_log.client()?;
        let allowed_origins = AllowedOrigins::new(configuration.application.allowed_origins.clone());

        let address = format!(
            "{}:{}",
            configuration.application.host, configuration.application.port
        );
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();
        tracing::info!(
            port,
            signup_log_enabled = signup_log.is_enabled(),
            allowed_origins = %allowed_origins,
            "Signup relay listening"
        );
        let server = run(listener, marketer_client, signup_log, allowed_origins)?;
        Ok(Self { port, server })
    }
    pub fn port(&self) -> u16 {
        self.port
    }
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn run(
    listener: TcpListener,
    marketer_client: MarketerClient,
    signup_log: SignupLogClient,
    allowed_origins: AllowedOrigins,
) -> Result<Server, std::io::Error> {
    let marketer_client = web::Data::new(marketer_client);
    let signup_log = web::Data::new(signup_log);
    let allowed_origins = web::Data::new(allowed_origins);
    let json_config = web::JsonConfig::default()
        .limit(MAX_BODY_BYTES)
        .error_handler(|err, _req| {
            tracing::warn!(error = %err, "Rejected request body");
            let response = HttpResponse::BadRequest()
                .json(SubscriptionOutcome::failure("Invalid request body"));
            InternalError::from_response(err, response).into()
        });
    let server = HttpServer::new(move || {
        App::new()
            .wrap(from_fn(admit_origin))
            .wrap(TracingLogger::default())
            .service(
                web::resource("/health")
                    .route(web::get().to(health_check))
                    .default_service(web::to(not_found)),
            )
            .service(
                web::resource("/api/subscribe")
                    .route(web::post().to(subscribe))
                    .default_service(web::to(not_found)),
            )
            .default_service(web::to(not_found))
            .app_data(json_config.clone())
            .app_data(marketer_client.clone())
            .app_data(signup_log.clone())
            .app_data(allowed_origins.clone())
    })
    .listen(listener)?
    .run();
    Ok(server)
}
