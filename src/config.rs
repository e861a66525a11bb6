use crate::store::S3StoreConfig;
use anyhow::{Context, Result};
use clap::Parser;
use std::env;

/// Centralized application configuration.
/// Combines environment variables and CLI arguments.
///
/// Store credentials are intentionally env-only (`AWS_ACCESS_KEY_ID` /
/// `AWS_SECRET_ACCESS_KEY`); when either is absent the availability gate
/// stays closed for the process lifetime.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub bucket: String,
    pub region: String,
    pub endpoint: Option<String>,
    pub allow_http: bool,
    pub memory_store: bool,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug)]
#[command(author, version, about = "Document Locker API over a remote object store")]
pub struct Args {
    /// Host to bind to (overrides DOCLOCKER_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides DOCLOCKER_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Bucket holding all documents (overrides DOCLOCKER_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Store region (overrides DOCLOCKER_REGION)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom store endpoint, e.g. a local MinIO (overrides DOCLOCKER_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Allow plain-HTTP store endpoints
    #[arg(long)]
    pub allow_http: bool,

    /// Use the in-memory store backend instead of S3 (local demo mode)
    #[arg(long)]
    pub memory_store: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig.
    pub fn from_env_and_args() -> Result<Self> {
        // Parse CLI once
        let args = Args::parse();

        // --- Environment fallback ---
        let env_host = env::var("DOCLOCKER_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let env_port = match env::var("DOCLOCKER_PORT") {
            Ok(value) => value
                .parse::<u16>()
                .with_context(|| format!("parsing DOCLOCKER_PORT value `{}`", value))?,
            Err(env::VarError::NotPresent) => 5000,
            Err(err) => return Err(err).context("reading DOCLOCKER_PORT"),
        };
        let env_bucket =
            env::var("DOCLOCKER_BUCKET").unwrap_or_else(|_| "document-locker".into());
        let env_region = env::var("DOCLOCKER_REGION").unwrap_or_else(|_| "us-east-1".into());
        let env_endpoint = env::var("DOCLOCKER_ENDPOINT").ok();
        let env_allow_http = env::var("DOCLOCKER_ALLOW_HTTP")
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        // --- Merge ---
        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            bucket: args.bucket.unwrap_or(env_bucket),
            region: args.region.unwrap_or(env_region),
            endpoint: args.endpoint.or(env_endpoint),
            allow_http: args.allow_http || env_allow_http,
            memory_store: args.memory_store,
            access_key_id: env::var("AWS_ACCESS_KEY_ID").ok().filter(|v| !v.is_empty()),
            secret_access_key: env::var("AWS_SECRET_ACCESS_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
        };

        Ok(cfg)
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Store connection settings, or `None` when credentials are missing
    /// and the availability gate must stay closed.
    pub fn s3_config(&self) -> Option<S3StoreConfig> {
        let access_key_id = self.access_key_id.clone()?;
        let secret_access_key = self.secret_access_key.clone()?;
        Some(S3StoreConfig {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            access_key_id,
            secret_access_key,
            allow_http: self.allow_http,
        })
    }
}
