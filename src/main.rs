use signup_relay::configuration::get_configuration;
use signup_relay::startup::Application;
use signup_relay::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber("signup_relay".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let configuration = get_configuration().expect("Failed to read configuration");
    tracing::info!(
        environment = configuration.application.environment.as_str(),
        "Starting signup relay"
    );

    let application = Application::build(&configuration).await?;
    application.run_until_stopped().await?;
    Ok(())
}
