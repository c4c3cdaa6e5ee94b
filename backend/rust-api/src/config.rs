use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub bind_addr: String,
    pub redis_uri: String,
    /// "redis" (default) or "memory" for local development without Redis.
    pub cache_backend: String,
    pub cache_ttl_seconds: u64,
    pub content_api_url: String,
    pub content_api_timeout_seconds: u64,
    pub generator_api_url: String,
    pub generator_api_key: String,
    pub generator_model: String,
    pub generator_timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            // Fallback to current directory .env for backward compatibility
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            // Load base config from TOML file
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        let bind_addr = settings
            .get_string("server.bind_addr")
            .or_else(|_| env::var("BIND_ADDR"))
            .unwrap_or_else(|_| "0.0.0.0:8082".to_string());

        let redis_uri = settings
            .get_string("redis.uri")
            .or_else(|_| env::var("REDIS_URI"))
            .unwrap_or_else(|_| {
                let host = env::var("REDIS_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
                let port = env::var("REDIS_PORT").unwrap_or_else(|_| "6379".to_string());
                format!("redis://{}:{}/0", host, port)
            });

        let cache_backend = settings
            .get_string("cache.backend")
            .or_else(|_| env::var("CACHE_BACKEND"))
            .unwrap_or_else(|_| "redis".to_string());

        // TTL for generated question sets. A deployment parameter, not a
        // correctness constraint.
        let cache_ttl_seconds = settings
            .get_int("cache.ttl_seconds")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .or_else(|| {
                env::var("CACHE_TTL_SECONDS")
                    .ok()
                    .and_then(|s| s.parse().ok())
            })
            .unwrap_or(3600);

        let content_api_url = settings
            .get_string("content_api.url")
            .or_else(|_| env::var("CONTENT_API_URL"))
            .unwrap_or_else(|_| "http://localhost:3000/api".to_string());

        let content_api_timeout_seconds = settings
            .get_int("content_api.timeout_seconds")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(5);

        let generator_api_url = settings
            .get_string("generator.url")
            .or_else(|_| env::var("GENERATOR_API_URL"))
            .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".to_string());

        let generator_api_key = settings
            .get_string("generator.api_key")
            .or_else(|_| env::var("GENERATOR_API_KEY"))
            .unwrap_or_else(|_| {
                if env == "prod" {
                    panic!("FATAL: GENERATOR_API_KEY must be set in production!");
                }
                eprintln!("WARNING: GENERATOR_API_KEY not set, live generation will fail over to fallback questions");
                String::new()
            });

        let generator_model = settings
            .get_string("generator.model")
            .or_else(|_| env::var("GENERATOR_MODEL"))
            .unwrap_or_else(|_| "gpt-4o-mini".to_string());

        let generator_timeout_seconds = settings
            .get_int("generator.timeout_seconds")
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .unwrap_or(20);

        Ok(Config {
            bind_addr,
            redis_uri,
            cache_backend,
            cache_ttl_seconds,
            content_api_url,
            content_api_timeout_seconds,
            generator_api_url,
            generator_api_key,
            generator_model,
            generator_timeout_seconds,
        })
    }

    /// Minimal config for tests: memory cache, unreachable upstreams.
    pub fn for_tests() -> Self {
        Config {
            bind_addr: "127.0.0.1:0".to_string(),
            redis_uri: "redis://127.0.0.1:6379/0".to_string(),
            cache_backend: "memory".to_string(),
            cache_ttl_seconds: 60,
            content_api_url: "http://127.0.0.1:1/api".to_string(),
            content_api_timeout_seconds: 1,
            generator_api_url: "http://127.0.0.1:1/v1/chat/completions".to_string(),
            generator_api_key: String::new(),
            generator_model: "test-model".to_string(),
            generator_timeout_seconds: 1,
        }
    }
}
