use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub webhook: WebhookConfig,
    pub swagger: SwaggerConfig,
    pub storage: StorageConfig,
    pub change_feed: ChangeFeedConfig,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Externally reachable base URL of this service, used to build download URLs
    pub public_url: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Clone, Debug)]
pub struct AuthConfig {
    pub issuer: String,
    pub audience: String,
    pub jwks_url: String,
    pub jwks_cache_ttl: Duration,
    pub jwt_leeway: Duration,
}

/// Identity provider lifecycle webhook settings
#[derive(Clone, Debug)]
pub struct WebhookConfig {
    /// Signing secret in `whsec_<base64>` form
    pub signing_secret: String,
    /// Maximum allowed clock skew for signed timestamps
    pub tolerance: Duration,
}

#[derive(Debug, Clone)]
pub struct SwaggerConfig {
    pub username: Option<String>,
    pub password: Option<String>,
    pub title: String,
    pub version: String,
    pub description: String,
}

/// MinIO/S3 storage configuration for file uploads
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// MinIO/S3 endpoint URL
    pub endpoint: String,
    /// Endpoint browsers use; presigned URLs are signed against this host
    pub public_endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    /// Key prefix for uploaded objects (e.g., "uploads")
    pub upload_prefix: String,
    /// Presigned URL expiry time in seconds
    pub presigned_url_expiry_secs: u32,
}

#[derive(Debug, Clone)]
pub struct ChangeFeedConfig {
    pub capacity: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        // Load .env file if exists, ignore if not found (optional for production)
        if let Err(e) = dotenvy::dotenv() {
            if !e.to_string().contains("not found") {
                eprintln!("Warning: Error loading .env file: {}", e);
            }
        }

        Ok(Config {
            app: AppConfig::from_env()?,
            database: DatabaseConfig::from_env()?,
            auth: AuthConfig::from_env()?,
            webhook: WebhookConfig::from_env()?,
            swagger: SwaggerConfig::from_env()?,
            storage: StorageConfig::from_env()?,
            change_feed: ChangeFeedConfig::from_env()?,
        })
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|e| format!("Invalid PORT: {}", e))?;

        // Parse CORS allowed origins from comma-separated string
        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let public_url = env::var("APP_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://{}:{}", host, port))
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            host,
            port,
            cors_allowed_origins,
            public_url,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl DatabaseConfig {
    const DEFAULT_MAX_CONNECTIONS: u32 = 10;
    const DEFAULT_MIN_CONNECTIONS: u32 = 1;
    const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
    const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 600; // 10 minutes
    const DEFAULT_MAX_LIFETIME_SECS: u64 = 1800; // 30 minutes

    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set".to_string())?;

        let max_connections = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MAX_CONNECTIONS must be a valid number".to_string())?;

        let min_connections = env::var("DB_MIN_CONNECTIONS")
            .unwrap_or_else(|_| Self::DEFAULT_MIN_CONNECTIONS.to_string())
            .parse::<u32>()
            .map_err(|_| "DB_MIN_CONNECTIONS must be a valid number".to_string())?;

        let acquire_timeout_secs = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_ACQUIRE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_ACQUIRE_TIMEOUT_SECS must be a valid number".to_string())?;

        let idle_timeout_secs = env::var("DB_IDLE_TIMEOUT_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_IDLE_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_IDLE_TIMEOUT_SECS must be a valid number".to_string())?;

        let max_lifetime_secs = env::var("DB_MAX_LIFETIME_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_MAX_LIFETIME_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "DB_MAX_LIFETIME_SECS must be a valid number".to_string())?;

        Ok(Self {
            url,
            max_connections,
            min_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
        })
    }
}

impl AuthConfig {
    const DEFAULT_JWKS_CACHE_TTL_SECS: u64 = 3600; // 1 hour
    const DEFAULT_JWT_LEEWAY_SECS: u64 = 60; // 1 minute

    pub fn from_env() -> Result<Self, String> {
        let issuer = env::var("AUTH_ISSUER")
            .map_err(|_| "AUTH_ISSUER environment variable is required".to_string())?
            .trim_end_matches('/')
            .to_string();

        let audience = env::var("AUTH_AUDIENCE")
            .map_err(|_| "AUTH_AUDIENCE environment variable is required".to_string())?;

        let jwks_url = env::var("AUTH_JWKS_URL")
            .unwrap_or_else(|_| format!("{}/.well-known/jwks.json", issuer));

        let jwks_cache_ttl_secs = env::var("JWKS_CACHE_TTL")
            .unwrap_or_else(|_| Self::DEFAULT_JWKS_CACHE_TTL_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWKS_CACHE_TTL must be a valid number".to_string())?;

        let jwt_leeway_secs = env::var("JWT_LEEWAY")
            .unwrap_or_else(|_| Self::DEFAULT_JWT_LEEWAY_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "JWT_LEEWAY must be a valid number".to_string())?;

        Ok(Self {
            issuer,
            audience,
            jwks_url,
            jwks_cache_ttl: Duration::from_secs(jwks_cache_ttl_secs),
            jwt_leeway: Duration::from_secs(jwt_leeway_secs),
        })
    }
}

impl WebhookConfig {
    const DEFAULT_TOLERANCE_SECS: u64 = 300; // 5 minutes

    pub fn from_env() -> Result<Self, String> {
        let signing_secret = env::var("WEBHOOK_SIGNING_SECRET")
            .map_err(|_| "WEBHOOK_SIGNING_SECRET environment variable is required".to_string())?;

        let tolerance_secs = env::var("WEBHOOK_TOLERANCE_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_TOLERANCE_SECS.to_string())
            .parse::<u64>()
            .map_err(|_| "WEBHOOK_TOLERANCE_SECS must be a valid number".to_string())?;

        Ok(Self {
            signing_secret,
            tolerance: Duration::from_secs(tolerance_secs),
        })
    }
}

impl SwaggerConfig {
    pub fn from_env() -> Result<Self, String> {
        // Only use credentials if they are non-empty
        let username = env::var("SWAGGER_USERNAME").ok().filter(|s| !s.is_empty());
        let password = env::var("SWAGGER_PASSWORD").ok().filter(|s| !s.is_empty());
        let title = env::var("SWAGGER_TITLE").unwrap_or_else(|_| "Fileshare API".to_string());
        let version = env::var("SWAGGER_VERSION").unwrap_or_else(|_| "0.1.0".to_string());
        let description = env::var("SWAGGER_DESCRIPTION")
            .unwrap_or_else(|_| "API documentation for Fileshare".to_string());

        Ok(Self {
            username,
            password,
            title,
            version,
            description,
        })
    }

    /// Returns credentials in "username:password" format if auth is enabled
    pub fn credentials(&self) -> Option<String> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(format!("{}:{}", user, pass)),
            _ => None,
        }
    }
}

impl StorageConfig {
    const DEFAULT_PRESIGNED_URL_EXPIRY_SECS: u32 = 3600; // 1 hour

    pub fn from_env() -> Result<Self, String> {
        let endpoint =
            env::var("MINIO_ENDPOINT").unwrap_or_else(|_| "http://localhost:9000".to_string());

        // Public endpoint defaults to the main endpoint if not specified
        let public_endpoint =
            env::var("MINIO_PUBLIC_ENDPOINT").unwrap_or_else(|_| endpoint.clone());

        let access_key = env::var("MINIO_ACCESS_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let secret_key = env::var("MINIO_SECRET_KEY").unwrap_or_else(|_| "minioadmin".to_string());

        let bucket = env::var("MINIO_BUCKET").unwrap_or_else(|_| "fileshare-uploads".to_string());

        let region = env::var("MINIO_REGION").unwrap_or_else(|_| "us-east-1".to_string());

        let upload_prefix = env::var("MINIO_UPLOAD_PREFIX")
            .unwrap_or_else(|_| "uploads".to_string())
            .trim_matches('/')
            .to_string();

        let presigned_url_expiry_secs = env::var("MINIO_PRESIGNED_URL_EXPIRY_SECS")
            .unwrap_or_else(|_| Self::DEFAULT_PRESIGNED_URL_EXPIRY_SECS.to_string())
            .parse::<u32>()
            .map_err(|_| "MINIO_PRESIGNED_URL_EXPIRY_SECS must be a valid number".to_string())?;

        Ok(Self {
            endpoint,
            public_endpoint,
            access_key,
            secret_key,
            bucket,
            region,
            upload_prefix,
            presigned_url_expiry_secs,
        })
    }
}

impl ChangeFeedConfig {
    const DEFAULT_CAPACITY: usize = 256;

    pub fn from_env() -> Result<Self, String> {
        let capacity = env::var("CHANGE_FEED_CAPACITY")
            .unwrap_or_else(|_| Self::DEFAULT_CAPACITY.to_string())
            .parse::<usize>()
            .map_err(|_| "CHANGE_FEED_CAPACITY must be a valid number".to_string())?;

        if capacity == 0 {
            return Err("CHANGE_FEED_CAPACITY must be greater than zero".to_string());
        }

        Ok(Self { capacity })
    }
}
