use thumbnailer_core::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "thumbnailer=info";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryOptions {
    pub service_name: String,
    pub log_format: LogFormat,
    pub default_filter: String,
    pub ansi: bool,
    pub timestamps: bool,
}

impl TelemetryOptions {
    /// CloudWatch adds its own timestamps and renders no colours.
    pub fn lambda(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            default_filter: DEFAULT_FILTER.to_string(),
            ansi: false,
            timestamps: false,
        }
    }

    pub fn terminal(service_name: impl Into<String>, log_format: LogFormat) -> Self {
        Self {
            service_name: service_name.into(),
            log_format,
            default_filter: DEFAULT_FILTER.to_string(),
            ansi: true,
            timestamps: true,
        }
    }

    /// `RUST_LOG` when set, otherwise `default_filter`.
    fn env_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error>> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => self.default_env_filter(),
        }
    }

    fn default_env_filter(&self) -> Result<EnvFilter, Box<dyn std::error::Error>> {
        Ok(EnvFilter::try_new(&self.default_filter)?)
    }
}

/// Install the global tracing subscriber.
///
/// Fails if a subscriber is already installed.
pub fn init_telemetry(options: &TelemetryOptions) -> Result<(), Box<dyn std::error::Error>> {
    let filter = options.env_filter()?;

    // Exactly one of the two layers is active.
    let (text_layer, json_layer) = match options.log_format {
        LogFormat::Text => {
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(options.ansi)
                .with_target(false);
            let layer = if options.timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            };
            (Some(layer), None)
        }
        LogFormat::Json => {
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false)
                .with_target(false);
            let layer = if options.timestamps {
                layer.boxed()
            } else {
                layer.without_time().boxed()
            };
            (None, Some(layer))
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(text_layer)
        .with(json_layer)
        .try_init()?;

    tracing::info!(
        service = %options.service_name,
        log_format = ?options.log_format,
        "Tracing initialized"
    );
    Ok(())
}

pub fn shutdown_telemetry() {
    tracing::debug!("Telemetry shutdown");
}
