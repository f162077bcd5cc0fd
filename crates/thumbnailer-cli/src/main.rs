//! Thumbnailer CLI: run the pipeline against a local bucket tree or resize a single file.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use thumbnailer_cli::resize_file;
use thumbnailer_core::{Config, LogFormat, PipelineConfig, ResizePolicy, UploadEvent};
use thumbnailer_infra::{init_telemetry, TelemetryOptions};
use thumbnailer_processing::{PipelineOutcome, ThumbnailPipeline};
use thumbnailer_storage::{LocalStorage, ObjectStorage};

#[derive(Parser)]
#[command(name = "thumbnailer", about = "Image thumbnail pipeline")]
struct Cli {
    /// Emit JSON logs
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one upload from a local bucket tree (<root>/<bucket>/<key>)
    Process {
        #[arg(long)]
        bucket: String,
        /// Decoded object key
        #[arg(long)]
        key: String,
        /// Directory holding one folder per bucket (default: LOCAL_STORAGE_PATH or .)
        #[arg(long)]
        root: Option<PathBuf>,
        /// Override THUMBNAIL_SIZE
        #[arg(long)]
        size: Option<u32>,
        /// Override RESIZE_POLICY: fit or crop
        #[arg(long)]
        policy: Option<String>,
    },
    /// Resize a single file; the output format follows the output extension
    Resize {
        input: PathBuf,
        output: PathBuf,
        #[arg(long, default_value = "400")]
        size: u32,
        /// fit or crop
        #[arg(long, default_value = "fit")]
        policy: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let log_format = if cli.json {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_telemetry(&TelemetryOptions::terminal("thumbnailer-cli", log_format))
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    match cli.command {
        Commands::Process {
            bucket,
            key,
            root,
            size,
            policy,
        } => {
            let config = Config::from_env()?;
            let pipeline_config = override_policy(config.pipeline, size, policy)?;
            let root = root
                .or_else(|| config.storage.local_storage_path.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from("."));

            let storage: Arc<dyn ObjectStorage> = Arc::new(LocalStorage::new(root).await?);
            let pipeline = ThumbnailPipeline::new(storage, pipeline_config)?;

            match pipeline.run(&UploadEvent::new(bucket, key)).await? {
                PipelineOutcome::Completed(run) => tracing::info!(
                    source = %run.source,
                    destination = %run.destination,
                    width = run.width,
                    height = run.height,
                    size_bytes = run.content_length,
                    source_deleted = run.source_deleted,
                    "Processed upload"
                ),
                PipelineOutcome::Rejected(rejection) => {
                    tracing::info!(reason = %rejection, "Upload skipped")
                }
            }
        }
        Commands::Resize {
            input,
            output,
            size,
            policy,
        } => {
            let policy = ResizePolicy::from_name(&policy, size)?;
            let (derivative, output) = tokio::task::spawn_blocking(move || {
                resize_file(&input, &output, policy).map(|d| (d, output))
            })
            .await
            .context("Resize task did not complete")??;
            tracing::info!(
                output = %output.display(),
                width = derivative.width,
                height = derivative.height,
                size_bytes = derivative.content_length,
                content_type = %derivative.content_type,
                "Wrote thumbnail"
            );
        }
    }

    Ok(())
}

fn override_policy(
    mut config: PipelineConfig,
    size: Option<u32>,
    policy: Option<String>,
) -> anyhow::Result<PipelineConfig> {
    let size = size.unwrap_or_else(|| config.target_size());
    let name = policy.unwrap_or_else(|| config.policy.name().to_string());
    config.policy = ResizePolicy::from_name(&name, size)?;
    config.validate()?;
    Ok(config)
}
