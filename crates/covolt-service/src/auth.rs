//! Authentication extractor and JWT validation.
//!
//! End users authenticate with identity-provider JWTs. Tokens are validated
//! RS256 against the provider's JWKS, with keys cached in-process. The
//! verifier lives in [`crate::state::AppState`] so each service instance owns
//! its cache and tests never share key state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use covolt_core::UserId;

use crate::error::ApiError;
use crate::state::AppState;

// ============================================================================
// Constants
// ============================================================================

/// How long to cache JWKS keys before refreshing.
const JWKS_CACHE_DURATION: Duration = Duration::from_secs(3600); // 1 hour

/// Timeout for JWKS fetch requests.
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// An authenticated user extracted from a bearer JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user ID.
    pub user_id: UserId,
    /// The raw subject claim from the JWT.
    pub subject: String,
}

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut Parts,
        state: &'life1 Arc<AppState>,
    ) -> ::core::pin::Pin<
        Box<
            dyn ::core::future::Future<Output = Result<Self, Self::Rejection>>
                + ::core::marker::Send
                + 'async_trait,
        >,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let auth_header = parts
                .headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .ok_or(ApiError::Unauthorized)?;

            let token = auth_header
                .strip_prefix("Bearer ")
                .ok_or(ApiError::Unauthorized)?;

            // Test-token bypass, compiled only under #[cfg(test)] or the
            // "test-auth" feature. Release builds never accept these.
            #[cfg(any(test, feature = "test-auth"))]
            if let Some(user_id_str) = token.strip_prefix("test-token:") {
                let user_id = user_id_str
                    .parse::<UserId>()
                    .map_err(|_| ApiError::Unauthorized)?;

                return Ok(AuthUser {
                    user_id,
                    subject: user_id_str.to_string(),
                });
            }

            let claims = state.jwks.validate(token).await?;

            let user_id = claims
                .sub
                .parse::<UserId>()
                .map_err(|_| ApiError::Unauthorized)?;

            Ok(AuthUser {
                user_id,
                subject: claims.sub,
            })
        })
    }
}

/// JWT claims structure for identity-provider tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: String,
    /// Audience (can be string or array).
    #[serde(default)]
    pub aud: Option<serde_json::Value>,
    /// Issuer.
    pub iss: String,
    /// Expiration time.
    pub exp: i64,
    /// Issued at.
    pub iat: i64,
}

// ============================================================================
// JWKS fetching and validation
// ============================================================================

/// JWKS (JSON Web Key Set) response structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwks {
    /// List of JWK keys.
    pub keys: Vec<Jwk>,
}

/// Single JSON Web Key.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    /// Key type (e.g., "RSA").
    pub kty: String,
    /// Key ID.
    pub kid: Option<String>,
    /// Algorithm (e.g., "RS256").
    pub alg: Option<String>,
    /// RSA public key modulus (base64url encoded).
    pub n: Option<String>,
    /// RSA public key exponent (base64url encoded).
    pub e: Option<String>,
    /// Key use (e.g., "sig" for signature).
    #[serde(rename = "use")]
    pub key_use: Option<String>,
}

/// Cached JWKS state.
struct JwksCache {
    /// HTTP client reused across JWKS fetches.
    client: reqwest::Client,
    /// Decoding keys by kid.
    keys: HashMap<String, DecodingKey>,
    /// Fallback key for tokens without a kid.
    default_key: Option<DecodingKey>,
    /// When the keys were last fetched.
    last_updated: Instant,
}

impl JwksCache {
    fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            keys: HashMap::new(),
            default_key: None,
            // Backdate so the first validation always fetches.
            last_updated: Instant::now()
                .checked_sub(JWKS_CACHE_DURATION)
                .unwrap_or_else(Instant::now),
        }
    }

    fn is_expired(&self) -> bool {
        self.last_updated.elapsed() >= JWKS_CACHE_DURATION
    }
}

/// Validates bearer JWTs against the identity provider's JWKS.
pub struct JwtVerifier {
    auth_base_url: String,
    auth_audience: String,
    cache: RwLock<JwksCache>,
}

impl JwtVerifier {
    /// Create a verifier for the given identity provider and audience.
    #[must_use]
    pub fn new(auth_base_url: impl Into<String>, auth_audience: impl Into<String>) -> Self {
        Self {
            auth_base_url: auth_base_url.into(),
            auth_audience: auth_audience.into(),
            cache: RwLock::new(JwksCache::new()),
        }
    }

    /// Validate a JWT token against the JWKS.
    pub(crate) async fn validate(&self, token: &str) -> Result<JwtClaims, ApiError> {
        let header = decode_header(token).map_err(|e| {
            tracing::debug!(error = %e, "Failed to decode JWT header");
            ApiError::Unauthorized
        })?;

        let decoding_key = self.decoding_key(header.kid.as_deref()).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.auth_audience]);
        validation.set_issuer(&[&self.auth_base_url]);

        let token_data = decode::<JwtClaims>(token, &decoding_key, &validation).map_err(|e| {
            tracing::debug!(error = %e, "JWT validation failed");
            ApiError::Unauthorized
        })?;

        Ok(token_data.claims)
    }

    /// Get a decoding key from the cache, refetching the JWKS on a miss.
    async fn decoding_key(&self, kid: Option<&str>) -> Result<DecodingKey, ApiError> {
        {
            let cache_read = self.cache.read().await;
            if !cache_read.is_expired() {
                if let Some(kid) = kid {
                    if let Some(key) = cache_read.keys.get(kid) {
                        return Ok(key.clone());
                    }
                } else if let Some(key) = &cache_read.default_key {
                    return Ok(key.clone());
                }
            }
        }

        // Miss or expired. Refetch and rebuild the whole key map; a miss on
        // a known-fresh cache usually means the provider rotated keys.
        let jwks = self.fetch_jwks().await?;

        let mut cache_write = self.cache.write().await;
        cache_write.keys.clear();
        cache_write.default_key = None;
        cache_write.last_updated = Instant::now();

        for jwk in &jwks.keys {
            if let Some(decoding_key) = jwk_to_decoding_key(jwk) {
                if let Some(ref key_kid) = jwk.kid {
                    cache_write
                        .keys
                        .insert(key_kid.clone(), decoding_key.clone());
                }
                // First usable key doubles as the kid-less fallback.
                if cache_write.default_key.is_none() {
                    cache_write.default_key = Some(decoding_key);
                }
            }
        }

        if let Some(kid) = kid {
            cache_write
                .keys
                .get(kid)
                .cloned()
                .ok_or(ApiError::Unauthorized)
        } else {
            cache_write
                .default_key
                .clone()
                .ok_or(ApiError::Unauthorized)
        }
    }

    /// Fetch the JWKS from the identity provider.
    async fn fetch_jwks(&self) -> Result<Jwks, ApiError> {
        let jwks_url = format!("{}/.well-known/jwks.json", self.auth_base_url);

        tracing::debug!(url = %jwks_url, "Fetching JWKS");

        let client = {
            let cache_read = self.cache.read().await;
            cache_read.client.clone()
        };

        let response = client.get(&jwks_url).send().await.map_err(|e| {
            tracing::error!(error = %e, url = %jwks_url, "Failed to fetch JWKS");
            ApiError::ExternalService("Failed to fetch authentication keys".into())
        })?;

        if !response.status().is_success() {
            tracing::error!(
                status = %response.status(),
                url = %jwks_url,
                "JWKS fetch returned non-success status"
            );
            return Err(ApiError::ExternalService(
                "Failed to fetch authentication keys".into(),
            ));
        }

        let jwks: Jwks = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse JWKS response");
            ApiError::ExternalService("Failed to parse authentication keys".into())
        })?;

        tracing::info!(keys_count = %jwks.keys.len(), "JWKS fetched successfully");

        Ok(jwks)
    }
}

/// Convert a JWK to a `DecodingKey`. Non-RSA keys are skipped; Covolt-ID
/// signs RS256 only.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    if jwk.kty != "RSA" {
        tracing::debug!(kty = %jwk.kty, "Skipping non-RSA JWK");
        return None;
    }

    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;

    DecodingKey::from_rsa_components(n, e).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_rsa_jwk_is_skipped() {
        let jwk = Jwk {
            kty: "EC".to_string(),
            kid: Some("key-1".to_string()),
            alg: Some("ES256".to_string()),
            n: None,
            e: None,
            key_use: Some("sig".to_string()),
        };
        assert!(jwk_to_decoding_key(&jwk).is_none());
    }

    #[test]
    fn rsa_jwk_without_components_is_skipped() {
        let jwk = Jwk {
            kty: "RSA".to_string(),
            kid: Some("key-1".to_string()),
            alg: Some("RS256".to_string()),
            n: None,
            e: None,
            key_use: Some("sig".to_string()),
        };
        assert!(jwk_to_decoding_key(&jwk).is_none());
    }

    #[test]
    fn fresh_verifier_cache_reads_as_expired() {
        let verifier = JwtVerifier::new("http://localhost", "covolt");
        let cache = verifier.cache.blocking_read();
        assert!(cache.is_expired());
    }
}
