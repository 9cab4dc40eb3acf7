use std::env;

/// Settings consumed by the token service, the password hasher, and the
/// authentication middleware. Cloned into application state so request
/// handling never touches the process environment.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared secret for HS256 token signing. Process configuration, never
    /// user input.
    pub jwt_secret: String,
    /// Token time-to-live in minutes.
    pub token_ttl_minutes: i64,
    /// bcrypt work factor.
    pub bcrypt_cost: u32,
}

pub struct Config {
    pub database_url: String,
    pub server_port: u16,
    pub server_host: String,
    /// Postgres statement timeout, applied through connect options rather
    /// than application timers.
    pub statement_timeout_ms: u64,
    pub cors_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            statement_timeout_ms: env::var("DB_STATEMENT_TIMEOUT_MS")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .expect("DB_STATEMENT_TIMEOUT_MS must be a number"),
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000".to_string())
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
                token_ttl_minutes: env::var("TOKEN_TTL_MINUTES")
                    .unwrap_or_else(|_| "60".to_string())
                    .parse()
                    .expect("TOKEN_TTL_MINUTES must be a number"),
                bcrypt_cost: env::var("BCRYPT_COST")
                    .unwrap_or_else(|_| "12".to_string())
                    .parse()
                    .expect("BCRYPT_COST must be a number"),
            },
        }
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}
