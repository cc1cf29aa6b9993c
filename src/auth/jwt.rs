use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::{Map, Value};
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::auth::claims::Claims;
use crate::config::JwtConfig;
use crate::state::AppState;

const RESERVED_CLAIMS: [&str; 5] = ["sub", "iat", "exp", "iss", "aud"];

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Any decode, signature, issuer, audience or expiry failure.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Holds JWT signing and verification keys with config data.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    issuer: String,
    audience: String,
    access_ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            algorithm: cfg.algorithm,
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    /// Signs `subject` plus `extra` claims, expiring `ttl` from now.
    /// Extra entries that collide with registered claims are dropped.
    pub fn issue(
        &self,
        subject: &str,
        mut extra: Map<String, Value>,
        ttl: Duration,
    ) -> Result<String, AuthError> {
        for key in RESERVED_CLAIMS {
            extra.remove(key);
        }
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: subject.to_owned(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            extra,
        };
        let token = encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(AuthError::Signing)?;
        debug!(subject = %subject, "jwt signed");
        Ok(token)
    }

    /// Signs an access token with the configured lifetime.
    pub fn issue_access(
        &self,
        subject: &str,
        extra: Map<String, Value>,
    ) -> Result<String, AuthError> {
        self.issue(subject, extra, self.access_ttl)
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_required_spec_claims(&["exp", "sub", "iss", "aud"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            warn!(error = %e, "jwt rejected");
            AuthError::InvalidCredentials
        })?;
        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.keys.clone()
    }
}
