use jsonwebtoken::{Algorithm, DecodingKey, decode_header};
use moka::future::Cache;
use std::sync::Arc;
use tracing::debug;

use super::jwt::{AuthError, Claims, verify_with_key};

const JWKS_URL_TEMPLATE: &str = "https://{}.supabase.co/auth/v1/.well-known/jwks.json";

#[derive(Clone)]
struct JwkKey {
    x: String,
    y: String,
    algorithm: Algorithm,
}

/// Caching fetcher for the Supabase project's JWKS. Keys are cached by `kid`
/// for an hour; a miss refetches the whole set.
#[derive(Clone)]
pub struct JwksCache {
    cache: Arc<Cache<String, JwkKey>>,
    jwks_url: String,
    client: reqwest::Client,
    anon_key: String,
}

impl JwksCache {
    pub fn new(project_ref: &str, anon_key: &str) -> Self {
        let cache = Arc::new(
            Cache::builder()
                .time_to_live(std::time::Duration::from_secs(3600))
                .max_capacity(10)
                .build(),
        );

        Self {
            cache,
            jwks_url: JWKS_URL_TEMPLATE.replace("{}", project_ref),
            client: reqwest::Client::new(),
            anon_key: anon_key.to_string(),
        }
    }

    async fn fetch_key(&self, kid: &str) -> Result<JwkKey, AuthError> {
        debug!("fetching JWKS from {}", self.jwks_url);

        let response = self
            .client
            .get(&self.jwks_url)
            .header("apikey", &self.anon_key)
            .send()
            .await
            .map_err(|e| AuthError::KeysUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeysUnavailable(format!("HTTP {status}")));
        }

        let jwks: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AuthError::KeysUnavailable(e.to_string()))?;

        let keys = jwks["keys"]
            .as_array()
            .ok_or_else(|| AuthError::KeysUnavailable("no keys in JWKS".to_string()))?;
        let key = keys
            .iter()
            .find(|k| k["kid"].as_str() == Some(kid))
            .ok_or_else(|| AuthError::Rejected(format!("unknown key id {kid}")))?;

        let component = |name: &str| -> Result<String, AuthError> {
            key[name]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| AuthError::KeysUnavailable(format!("JWK missing '{name}'")))
        };

        let algorithm = match key["alg"].as_str() {
            Some("ES384") => Algorithm::ES384,
            _ => Algorithm::ES256,
        };

        Ok(JwkKey {
            x: component("x")?,
            y: component("y")?,
            algorithm,
        })
    }

    async fn key_for(&self, kid: &str) -> Result<JwkKey, AuthError> {
        if let Some(cached) = self.cache.get(kid).await {
            return Ok(cached);
        }
        let key = self.fetch_key(kid).await?;
        self.cache.insert(kid.to_string(), key.clone()).await;
        Ok(key)
    }

    /// Validate a bearer token against the project keyset.
    pub async fn validate_token(&self, token: &str) -> Result<Claims, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::Malformed(e.to_string()))?;
        let kid = header
            .kid
            .ok_or_else(|| AuthError::Malformed("no 'kid' in token header".to_string()))?;

        let key = self.key_for(&kid).await?;
        let decoding_key = DecodingKey::from_ec_components(&key.x, &key.y)
            .map_err(|e| AuthError::KeysUnavailable(e.to_string()))?;

        verify_with_key(token, &decoding_key, key.algorithm)
    }
}
