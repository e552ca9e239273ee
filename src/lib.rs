pub mod admission;
pub mod configuration;
pub mod domain;
pub mod marketer_client;
pub mod routes;
pub mod signup_log;
pub mod startup;
pub mod telemetry;
