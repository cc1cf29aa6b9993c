use std::str::FromStr;

use anyhow::Context;
use jsonwebtoken::Algorithm;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key/value source. Missing optional keys fall
    /// back to defaults, unparsable numbers too.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL is not set")?;
        let max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = lookup("APP_PORT")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(8080);

        let algorithm = match lookup("JWT_ALGORITHM") {
            Some(raw) => Algorithm::from_str(raw.trim())
                .with_context(|| format!("unknown JWT_ALGORITHM {raw:?}"))?,
            None => Algorithm::HS256,
        };
        // Keys are built from a shared secret, so only the HMAC family applies.
        if !matches!(
            algorithm,
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512
        ) {
            anyhow::bail!("JWT_ALGORITHM must be one of HS256, HS384, HS512");
        }

        let jwt = JwtConfig {
            secret: lookup("JWT_SECRET").context("JWT_SECRET is not set")?,
            algorithm,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "users-service".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "users-service-clients".into()),
            ttl_minutes: lookup("ACCESS_TOKEN_EXPIRE_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };

        Ok(Self {
            database_url,
            max_connections,
            host,
            port,
            jwt,
        })
    }
}
