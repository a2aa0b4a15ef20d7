//! Configuration module
//!
//! Everything is read once from the environment (and an optional `.env` file)
//! into explicit structs. The storage adapter receives its settings at
//! construction; nothing here is process-global.

use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_HOST, DEFAULT_LOCAL_STORAGE_PATH, DEFAULT_PORT, DEFAULT_REGION, MESSAGE_PATH, SSE_PATH,
};
use crate::storage_types::StorageBackend;

/// Connection settings for an S3-compatible endpoint.
#[derive(Clone)]
pub struct S3Settings {
    /// Custom endpoint for S3-compatible providers (MinIO, etc.). `None` means AWS.
    pub endpoint_url: Option<String>,
    pub region: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub force_path_style: bool,
    pub verify_tls: bool,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("endpoint_url", &self.endpoint_url)
            .field("region", &self.region)
            .field("access_key_id", &self.access_key_id)
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(|_| "<redacted>"),
            )
            .field("force_path_style", &self.force_path_style)
            .field("verify_tls", &self.verify_tls)
            .finish()
    }
}

impl S3Settings {
    /// Settings for a plain AWS connection in the given region.
    pub fn for_region(region: impl Into<String>) -> Self {
        Self {
            endpoint_url: None,
            region: region.into(),
            access_key_id: None,
            secret_access_key: None,
            force_path_style: false,
            verify_tls: true,
        }
    }

    pub fn has_static_credentials(&self) -> bool {
        self.access_key_id.is_some() && self.secret_access_key.is_some()
    }
}

/// Which backend to build and how.
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub s3: S3Settings,
    pub local_path: PathBuf,
    /// Caps the number of buckets returned by `list_buckets`.
    pub max_buckets: Option<usize>,
    /// When false, deleting an absent object fails with `NotFound`.
    pub idempotent_delete: bool,
}

/// Transport settings for the SSE server.
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub sse_path: String,
    pub message_path: String,
}

impl ServerSettings {
    /// Resolve `host:port` to the first matching socket address.
    ///
    /// `localhost` always binds IPv4 loopback; other hostnames go through the
    /// system resolver.
    pub fn bind_address(&self) -> Result<SocketAddr, anyhow::Error> {
        let host = match self.host.trim() {
            "localhost" => "127.0.0.1",
            other => other,
        };
        (host, self.port)
            .to_socket_addrs()
            .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", self.host, self.port, e))?
            .next()
            .ok_or_else(|| {
                anyhow::anyhow!("Bind address {}:{} resolved to nothing", self.host, self.port)
            })
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            sse_path: SSE_PATH.to_string(),
            message_path: MESSAGE_PATH.to_string(),
        }
    }
}

/// Full application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub storage: StorageSettings,
}

impl AppConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let backend = match var("S3MCP_STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let endpoint_url = var("S3_ENDPOINT_URL").map(|s| s.trim().to_string());
        let force_path_style = match var("S3_FORCE_PATH_STYLE") {
            Some(raw) => parse_bool("S3_FORCE_PATH_STYLE", &raw)?,
            // MinIO and most self-hosted endpoints only speak path-style
            None => endpoint_url.is_some(),
        };

        let s3 = S3Settings {
            endpoint_url,
            region: var("AWS_REGION")
                .or_else(|| var("AWS_DEFAULT_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            access_key_id: var("AWS_ACCESS_KEY_ID"),
            secret_access_key: var("AWS_SECRET_ACCESS_KEY"),
            force_path_style,
            verify_tls: match var("S3_VERIFY_TLS") {
                Some(raw) => parse_bool("S3_VERIFY_TLS", &raw)?,
                None => true,
            },
        };

        let max_buckets = match var("S3_MAX_BUCKETS") {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
                anyhow::anyhow!("S3_MAX_BUCKETS must be a positive integer: {}", e)
            })?),
            None => None,
        };

        let storage = StorageSettings {
            backend,
            s3,
            local_path: PathBuf::from(
                var("S3MCP_LOCAL_STORAGE_PATH")
                    .unwrap_or_else(|| DEFAULT_LOCAL_STORAGE_PATH.to_string()),
            ),
            max_buckets,
            idempotent_delete: match var("S3MCP_IDEMPOTENT_DELETE") {
                Some(raw) => parse_bool("S3MCP_IDEMPOTENT_DELETE", &raw)?,
                None => false,
            },
        };

        let server = ServerSettings {
            host: var("S3MCP_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: match var("S3MCP_PORT") {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .map_err(|e| anyhow::anyhow!("S3MCP_PORT must be a valid port: {}", e))?,
                None => DEFAULT_PORT,
            },
            ..ServerSettings::default()
        };

        let config = AppConfig { server, storage };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        let s3 = &self.storage.s3;

        if s3.access_key_id.is_some() != s3.secret_access_key.is_some() {
            return Err(anyhow::anyhow!(
                "AWS_ACCESS_KEY_ID and AWS_SECRET_ACCESS_KEY must be set together"
            ));
        }

        if let Some(endpoint) = &s3.endpoint_url {
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(anyhow::anyhow!(
                    "S3_ENDPOINT_URL must start with http:// or https://, got {}",
                    endpoint
                ));
            }
        }

        // the SDK always verifies certificates, so only plain http may opt out
        if self.storage.backend == StorageBackend::S3
            && !s3.verify_tls
            && !s3
                .endpoint_url
                .as_deref()
                .is_some_and(|endpoint| endpoint.starts_with("http://"))
        {
            return Err(anyhow::anyhow!(
                "S3_VERIFY_TLS=false is only supported with an http:// S3_ENDPOINT_URL; \
                 add the endpoint's CA to the system trust store instead"
            ));
        }

        if s3.region.trim().is_empty() {
            return Err(anyhow::anyhow!("AWS_REGION cannot be empty"));
        }

        if self.storage.max_buckets == Some(0) {
            return Err(anyhow::anyhow!("S3_MAX_BUCKETS must be greater than zero"));
        }

        self.server.bind_address()?;

        Ok(())
    }
}

fn parse_bool(name: &str, raw: &str) -> Result<bool, anyhow::Error> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("{} must be a boolean, got {}", name, other)),
    }
}
