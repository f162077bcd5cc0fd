//! Configuration module
//!
//! Configuration is read once per process from the environment (a `.env` file is
//! loaded first when present) and passed into the pipeline at construction. Nothing
//! here is mutated after startup.

use std::env;
use std::str::FromStr;

use crate::constants::{ALLOWED_EXTENSIONS, DEFAULT_TARGET_SIZE};
use crate::key::{ImageKind, KeyValidator};
use crate::policy::ResizePolicy;
use crate::storage_types::StorageBackend;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Pipeline configuration: the derivative size and policy plus the accepted extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub policy: ResizePolicy,
    pub allowed_extensions: Vec<String>,
}

impl PipelineConfig {
    pub fn new(policy: ResizePolicy) -> Self {
        Self {
            policy,
            allowed_extensions: ALLOWED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub fn target_size(&self) -> u32 {
        self.policy.target_size()
    }

    pub fn key_validator(&self) -> Result<KeyValidator, anyhow::Error> {
        KeyValidator::new(self.allowed_extensions.clone())
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.policy.target_size() == 0 {
            return Err(anyhow::anyhow!("THUMBNAIL_SIZE must be greater than 0"));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("At least one image extension must be allowed"));
        }

        for extension in &self.allowed_extensions {
            if !extension.starts_with('.') || ImageKind::from_extension(extension).is_none() {
                return Err(anyhow::anyhow!(
                    "Extension {} cannot be encoded (supported: {:?})",
                    extension,
                    ALLOWED_EXTENSIONS
                ));
            }
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(ResizePolicy::default())
    }
}

/// Storage backend configuration
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_region: Option<String>,
    /// Custom endpoint for S3-compatible providers (MinIO, DigitalOcean Spaces, etc.)
    pub s3_endpoint: Option<String>,
    pub local_storage_path: Option<String>,
}

impl StorageConfig {
    pub fn local(path: impl Into<String>) -> Self {
        Self {
            backend: StorageBackend::Local,
            s3_region: None,
            s3_endpoint: None,
            local_storage_path: Some(path.into()),
        }
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.backend {
            StorageBackend::S3 if self.s3_region.is_none() => Err(anyhow::anyhow!(
                "S3_REGION or AWS_REGION must be set for the s3 storage backend"
            )),
            StorageBackend::Local if self.local_storage_path.is_none() => Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set for the local storage backend"
            )),
            _ => Ok(()),
        }
    }
}

/// Process configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub log_format: LogFormat,
    pub pipeline: PipelineConfig,
    pub storage: StorageConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let log_format = lookup("LOG_FORMAT")
            .map(|s| s.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        let target_size = match lookup("THUMBNAIL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .map_err(|_| anyhow::anyhow!("THUMBNAIL_SIZE must be a valid number"))?,
            None => DEFAULT_TARGET_SIZE,
        };

        let policy_name = lookup("RESIZE_POLICY").unwrap_or_else(|| "fit".to_string());
        let policy = ResizePolicy::from_name(&policy_name, target_size)?;

        let backend = lookup("STORAGE_BACKEND")
            .map(|s| s.parse::<StorageBackend>())
            .transpose()?
            .unwrap_or(StorageBackend::S3);

        let storage = StorageConfig {
            backend,
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
        };

        Ok(Config {
            environment,
            log_format,
            pipeline: PipelineConfig::new(policy),
            storage,
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        matches!(self.environment.to_lowercase().as_str(), "production" | "prod")
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.pipeline.validate()?;
        self.storage.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[("AWS_REGION", "eu-west-1")])).unwrap();
        assert_eq!(config.environment, "development");
        assert_eq!(config.log_format, LogFormat::Text);
        assert_eq!(config.pipeline.policy, ResizePolicy::FitLongestSide(400));
        assert_eq!(
            config.pipeline.allowed_extensions,
            vec![".jpg", ".jpeg", ".png"]
        );
        assert_eq!(config.storage.backend, StorageBackend::S3);
        assert_eq!(config.storage.s3_region.as_deref(), Some("eu-west-1"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_crop_policy_and_size() {
        let config = Config::from_lookup(lookup_from(&[
            ("THUMBNAIL_SIZE", "128"),
            ("RESIZE_POLICY", "Crop"),
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/buckets"),
            ("LOG_FORMAT", "json"),
            ("ENVIRONMENT", "prod"),
        ]))
        .unwrap();
        assert_eq!(config.pipeline.policy, ResizePolicy::CenterCropSquare(128));
        assert_eq!(config.storage, StorageConfig::local("/tmp/buckets"));
        assert_eq!(config.log_format, LogFormat::Json);
        assert!(config.is_production());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values() {
        assert!(Config::from_lookup(lookup_from(&[("THUMBNAIL_SIZE", "big")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("RESIZE_POLICY", "stretch")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("STORAGE_BACKEND", "ftp")])).is_err());
    }

    #[test]
    fn test_zero_size_rejected_by_validate() {
        let config = Config::from_lookup(lookup_from(&[
            ("THUMBNAIL_SIZE", "0"),
            ("AWS_REGION", "us-east-1"),
        ]))
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_backend_requirements() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert!(config.validate().is_err());

        let config =
            Config::from_lookup(lookup_from(&[("STORAGE_BACKEND", "local")])).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unencodable_extension_rejected() {
        let mut pipeline = PipelineConfig::default();
        pipeline.allowed_extensions.push(".gif".to_string());
        assert!(pipeline.validate().is_err());

        let mut pipeline = PipelineConfig::default();
        pipeline.allowed_extensions = vec!["png".to_string()];
        assert!(pipeline.validate().is_err());
    }
}
