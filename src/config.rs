use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Clone)]
pub struct Config {
    // Key material
    pub public_key_path: PathBuf,

    // Redis
    pub redis_url: String,

    // Server
    pub bind_addr: SocketAddr,

    // Image storage
    pub image_dir: PathBuf,

    // Limits
    pub max_body_bytes: usize,
    pub max_image_bytes: usize,

    // Challenge policy (in seconds)
    pub challenge_stale_secs: u64,
    pub rotate_cooldown_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("public_key_path", &self.public_key_path)
            .field("redis_url", &"[REDACTED]")
            .field("bind_addr", &self.bind_addr)
            .field("image_dir", &self.image_dir)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("max_image_bytes", &self.max_image_bytes)
            .field("challenge_stale_secs", &self.challenge_stale_secs)
            .field("rotate_cooldown_secs", &self.rotate_cooldown_secs)
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),

    #[error("Failed to parse {0}: {1}")]
    ParseError(String, String),
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Attempt to load .env file, but don't fail if it doesn't exist
        // (env vars may be set directly in production)
        let _ = dotenvy::dotenv();

        // Public key — required; the verifier cannot run without it
        let public_key_path = env::var("PUBLIC_KEY_PATH")
            .map_err(|_| ConfigError::MissingVar("PUBLIC_KEY_PATH".to_string()))?;

        if public_key_path.is_empty() {
            return Err(ConfigError::InvalidValue(
                "PUBLIC_KEY_PATH".to_string(),
                "cannot be empty".to_string(),
            ));
        }

        // Redis — required to prevent silently serving without a store
        let redis_url =
            env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL".to_string()))?;

        // Server
        let bind_addr_str = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
        let bind_addr = bind_addr_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::ParseError("BIND_ADDR".to_string(), e.to_string()))?;

        // Image storage
        let image_dir = env::var("IMAGE_DIR").unwrap_or_else(|_| "data/images".to_string());

        // Limits
        let max_body_bytes = parse_env_or_default("MAX_BODY_BYTES", 1_000_000)?;
        let max_image_bytes = parse_env_or_default("MAX_IMAGE_BYTES", 50_000_000)?;

        // Challenge policy
        let challenge_stale_secs = parse_env_or_default("CHALLENGE_STALE_SECS", 1_800)?;
        let rotate_cooldown_secs = parse_env_or_default("ROTATE_COOLDOWN_SECS", 600)?;

        Ok(Config {
            public_key_path: PathBuf::from(public_key_path),
            redis_url,
            bind_addr,
            image_dir: PathBuf::from(image_dir),
            max_body_bytes,
            max_image_bytes,
            challenge_stale_secs,
            rotate_cooldown_secs,
        })
    }
}

/// Helper function to parse environment variable with a default value
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(val) => val
            .parse::<T>()
            .map_err(|e| ConfigError::ParseError(key.to_string(), format!("{}: {}", e, val))),
        Err(_) => Ok(default),
    }
}
