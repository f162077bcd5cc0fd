use anyhow::Context;
use aws_lambda_events::event::s3::S3Event;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use thumbnailer_core::Config;
use thumbnailer_infra::{init_telemetry, shutdown_telemetry, TelemetryOptions};
use thumbnailer_lambda::{handle_event, HandlerContext};
use thumbnailer_storage::create_storage;

fn load_config() -> anyhow::Result<Config> {
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = load_config().map_err(|e| Error::from(format!("{:#}", e)))?;

    init_telemetry(&TelemetryOptions::lambda(
        "thumbnailer-lambda",
        config.log_format,
    ))
    .map_err(|e| Error::from(e.to_string()))?;

    tracing::info!(
        environment = %config.environment,
        policy = %config.pipeline.policy,
        backend = %config.storage.backend,
        "Starting thumbnailer"
    );

    let storage = create_storage(&config.storage).await?;
    let ctx = HandlerContext::new(storage, &config);

    let result = run(service_fn(|event: LambdaEvent<S3Event>| {
        let ctx = ctx.clone();
        async move { handle_event(&ctx, event).await }
    }))
    .await;

    shutdown_telemetry();
    result
}
