use anyhow::{Context, Result, anyhow};
use clap::{Parser, ValueEnum};
use std::{env, str::FromStr};
use url::Url;

const ENV_PREFIX: &str = "TRAVEL_MEMORIES_";
const DEFAULT_DATABASE_URL: &str = "sqlite://./data/meta/travel_memories.db?mode=rwc";
const DEFAULT_MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

/// Which object store receives uploaded images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    S3,
    Local,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "s3" => Ok(Self::S3),
            "local" => Ok(Self::Local),
            other => Err(anyhow!("unknown storage backend `{}`", other)),
        }
    }
}

/// Object store settings. Credentials come from the AWS provider chain.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (MinIO, LocalStack).
    pub endpoint: Option<String>,
    /// Overrides the base of every resolved object URL.
    pub public_base_url: Option<String>,
    pub local_dir: String,
}

/// Centralized application configuration.
/// Built once at startup from environment variables and CLI arguments,
/// then shared read-only with every request.
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageSettings,
    pub database_url: String,
    pub db_table: String,
    pub max_body_bytes: usize,
}

/// Command-line + environment configuration.
#[derive(Parser, Debug, Default)]
#[command(author, version, about = "Travel memory submission service")]
pub struct Args {
    /// Host to bind to (overrides TRAVEL_MEMORIES_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides TRAVEL_MEMORIES_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Object store backend (overrides TRAVEL_MEMORIES_STORAGE_BACKEND)
    #[arg(long, value_enum)]
    pub storage_backend: Option<StorageBackend>,

    /// S3 bucket receiving images (overrides TRAVEL_MEMORIES_S3_BUCKET)
    #[arg(long)]
    pub s3_bucket: Option<String>,

    /// S3 region (overrides TRAVEL_MEMORIES_S3_REGION)
    #[arg(long)]
    pub s3_region: Option<String>,

    /// Custom S3 endpoint (overrides TRAVEL_MEMORIES_S3_ENDPOINT)
    #[arg(long)]
    pub s3_endpoint: Option<String>,

    /// Public base URL for stored images (overrides TRAVEL_MEMORIES_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Directory for the local backend (overrides TRAVEL_MEMORIES_LOCAL_STORAGE_DIR)
    #[arg(long)]
    pub local_storage_dir: Option<String>,

    /// Full database URL (overrides TRAVEL_MEMORIES_DATABASE_URL and the DB_* parts)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Destination table (overrides TRAVEL_MEMORIES_DB_TABLE)
    #[arg(long)]
    pub db_table: Option<String>,

    /// Maximum accepted request body in bytes (overrides TRAVEL_MEMORIES_MAX_BODY_BYTES)
    #[arg(long)]
    pub max_body_bytes: Option<usize>,

    /// Create the submissions table and exit
    #[arg(long)]
    pub ensure_schema: bool,
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and the ensure-schema flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        let args = Args::parse();
        let ensure_schema = args.ensure_schema;
        let cfg = Self::resolve(args, |key| env::var(key).ok())?;
        Ok((cfg, ensure_schema))
    }

    /// Merge CLI arguments over values looked up through `lookup`.
    ///
    /// `lookup` receives unprefixed keys (`PORT`, `S3_BUCKET`, ...).
    pub fn resolve<F>(args: Args, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(&format!("{}{}", ENV_PREFIX, key)).filter(|value| !value.trim().is_empty())
        };

        let host = args
            .host
            .or_else(|| var("HOST"))
            .unwrap_or_else(|| "0.0.0.0".into());
        let port = match args.port {
            Some(port) => port,
            None => parse_var(&var, "PORT")?.unwrap_or(3000),
        };
        let backend = match args.storage_backend {
            Some(backend) => backend,
            None => parse_var(&var, "STORAGE_BACKEND")?.unwrap_or(StorageBackend::S3),
        };

        let storage = StorageSettings {
            backend,
            bucket: args
                .s3_bucket
                .or_else(|| var("S3_BUCKET"))
                .unwrap_or_default(),
            region: args
                .s3_region
                .or_else(|| var("S3_REGION"))
                .unwrap_or_else(|| "us-east-1".into()),
            endpoint: args.s3_endpoint.or_else(|| var("S3_ENDPOINT")),
            public_base_url: args.public_base_url.or_else(|| var("PUBLIC_BASE_URL")),
            local_dir: args
                .local_storage_dir
                .or_else(|| var("LOCAL_STORAGE_DIR"))
                .unwrap_or_else(|| "./data/objects".into()),
        };
        if storage.backend == StorageBackend::S3 && storage.bucket.is_empty() {
            anyhow::bail!("{}S3_BUCKET must be set for the s3 backend", ENV_PREFIX);
        }

        let database_url = match args.database_url.or_else(|| var("DATABASE_URL")) {
            Some(url) => url,
            None => match var("DB_HOST") {
                Some(db_host) => mysql_url(
                    &db_host,
                    parse_var(&var, "DB_PORT")?.unwrap_or(3306),
                    &var("DB_NAME").unwrap_or_else(|| "travel_memories".into()),
                    &var("DB_USER").unwrap_or_else(|| "root".into()),
                    var("DB_PASSWORD").as_deref(),
                )?,
                None => DEFAULT_DATABASE_URL.into(),
            },
        };

        let max_body_bytes = match args.max_body_bytes {
            Some(limit) => limit,
            None => parse_var(&var, "MAX_BODY_BYTES")?.unwrap_or(DEFAULT_MAX_BODY_BYTES),
        };

        Ok(Self {
            host,
            port,
            storage,
            database_url,
            db_table: args
                .db_table
                .or_else(|| var("DB_TABLE"))
                .unwrap_or_else(|| "travel_memories".into()),
            max_body_bytes,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Base URL under which the local backend's objects are served by this process.
    pub fn local_public_base_url(&self) -> String {
        match &self.storage.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => {
                let host = match self.host.as_str() {
                    "0.0.0.0" | "::" => "127.0.0.1",
                    other => other,
                };
                format!("http://{}:{}/objects", host, self.port)
            }
        }
    }

    /// Database URL with any password masked, safe for logs.
    pub fn redacted_database_url(&self) -> String {
        match Url::parse(&self.database_url) {
            Ok(mut url) if url.password().is_some() => {
                let _ = url.set_password(Some("****"));
                url.to_string()
            }
            _ => self.database_url.clone(),
        }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage", &self.storage)
            .field("database_url", &self.redacted_database_url())
            .field("db_table", &self.db_table)
            .field("max_body_bytes", &self.max_body_bytes)
            .finish()
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|err| anyhow!("{}", err))
            .with_context(|| format!("parsing {}{} value `{}`", ENV_PREFIX, key, value)),
        None => Ok(None),
    }
}

/// Build a MySQL connection URL with percent-encoded credentials.
fn mysql_url(host: &str, port: u16, name: &str, user: &str, password: Option<&str>) -> Result<String> {
    let mut url = Url::parse(&format!("mysql://{}:{}/{}", host, port, name))
        .with_context(|| format!("building database url for host `{}`", host))?;
    url.set_username(user)
        .map_err(|_| anyhow!("database user `{}` cannot be placed in a url", user))?;
    if let Some(password) = password {
        url.set_password(Some(password))
            .map_err(|_| anyhow!("database password cannot be placed in a url"))?;
    }
    Ok(url.to_string())
}
