//! Session token authentication for the embedded admin.
//!
//! The admin page runs inside Shopify admin and sends an App Bridge session
//! token with every API call:
//!
//! ```text
//! Authorization: Bearer <header>.<claims>.<signature>
//! ```
//!
//! The token is a JWT signed with HS256 using the app's API secret.
//! `jsonwebtoken` checks the signature, `aud` and the `exp`/`nbf` window
//! (with a small leeway). The `dest` host must also be the configured shop.

use axum::{extract::FromRequestParts, http::request::Parts};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Clock skew tolerated on `exp` and `nbf`, in seconds.
pub const CLOCK_LEEWAY_SECS: u64 = 5;

/// Reasons a session token is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionTokenError {
    #[error("Missing session token")]
    Missing,
    #[error("Malformed session token")]
    Malformed,
    #[error("Unsupported session token algorithm")]
    UnsupportedAlgorithm,
    #[error("Invalid session token signature")]
    BadSignature,
    #[error("Session token issued for another app")]
    WrongAudience,
    #[error("Session token expired")]
    Expired,
    #[error("Session token not yet valid")]
    NotYetValid,
    #[error("Session token issued for another shop")]
    WrongShop,
}

impl From<jsonwebtoken::errors::Error> for SessionTokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::InvalidAlgorithm => Self::UnsupportedAlgorithm,
            ErrorKind::InvalidAudience => Self::WrongAudience,
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::ImmatureSignature => Self::NotYetValid,
            _ => Self::Malformed,
        }
    }
}

/// Claims this app reads beyond the ones `jsonwebtoken` validates.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    dest: String,
    #[serde(default)]
    sub: Option<String>,
}

/// The shop and staff user a verified session token was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopSession {
    /// Shop domain, e.g. `your-store.myshopify.com`.
    pub shop: String,
    /// Shopify staff user ID, when the token carries one.
    pub user_id: Option<String>,
}

/// Verifies App Bridge session tokens for one app and one shop.
#[derive(Clone)]
pub struct SessionTokenVerifier {
    api_key: String,
    decoding_key: DecodingKey,
    validation: Validation,
    shop: String,
}

impl std::fmt::Debug for SessionTokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokenVerifier")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("shop", &self.shop)
            .finish()
    }
}

impl SessionTokenVerifier {
    /// Create a verifier for tokens minted for `api_key` and `shop`.
    #[must_use]
    pub fn new(api_key: impl Into<String>, api_secret: &SecretString, shop: impl Into<String>) -> Self {
        let api_key = api_key.into();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&api_key]);
        validation.set_required_spec_claims(&["exp", "nbf", "aud"]);
        validation.validate_nbf = true;
        validation.leeway = CLOCK_LEEWAY_SECS;

        Self {
            decoding_key: DecodingKey::from_secret(api_secret.expose_secret().as_bytes()),
            validation,
            api_key,
            shop: shop.into(),
        }
    }

    /// Verify `token` against the current time.
    ///
    /// # Errors
    ///
    /// Returns the first check the token fails.
    pub fn verify(&self, token: &str) -> Result<ShopSession, SessionTokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?.claims;

        let dest_host = Url::parse(&claims.dest)
            .ok()
            .and_then(|url| url.host_str().map(str::to_owned))
            .ok_or(SessionTokenError::Malformed)?;
        if !dest_host.eq_ignore_ascii_case(&self.shop) {
            return Err(SessionTokenError::WrongShop);
        }

        Ok(ShopSession {
            shop: dest_host,
            user_id: claims.sub,
        })
    }
}

/// Extractor that requires a valid App Bridge session token.
///
/// Rejects with a 401 JSON envelope before the handler runs, so no catalog
/// call is made for unauthenticated requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireShopSession(session): RequireShopSession,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", session.shop)
/// }
/// ```
pub struct RequireShopSession(pub ShopSession);

impl FromRequestParts<AppState> for RequireShopSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(SessionTokenError::Missing)
            .map_err(|e| AppError::Unauthorized(e.to_string()))?;

        let session = state.verifier().verify(token).map_err(|e| {
            tracing::warn!(error = %e, path = %parts.uri.path(), "Rejected session token");
            AppError::Unauthorized(e.to_string())
        })?;

        set_sentry_user(&session.shop, session.user_id.as_deref());
        Ok(Self(session))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    const SECRET: &str = "4f1b9c2e7a6d3085f2c1e9b7a4d6038e";
    const API_KEY: &str = "c0ffee0123456789";
    const SHOP: &str = "test-shop.myshopify.com";

    fn verifier() -> SessionTokenVerifier {
        SessionTokenVerifier::new(API_KEY, &SecretString::from(SECRET), SHOP)
    }

    fn mint(secret: &str, alg: Algorithm, claims: &serde_json::Value) -> String {
        encode(
            &Header::new(alg),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims() -> serde_json::Value {
        let now = chrono::Utc::now().timestamp();
        serde_json::json!({
            "iss": format!("https://{SHOP}/admin"),
            "dest": format!("https://{SHOP}"),
            "aud": API_KEY,
            "sub": "42",
            "exp": now + 60,
            "nbf": now - 60,
            "iat": now - 60,
            "jti": "f8912129-1af6-4cad-9ca3-76b0f7621087",
        })
    }

    #[test]
    fn test_valid_token() {
        let token = mint(SECRET, Algorithm::HS256, &claims());
        let session = verifier().verify(&token).unwrap();
        assert_eq!(session.shop, SHOP);
        assert_eq!(session.user_id.as_deref(), Some("42"));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = mint("another-secret-entirely", Algorithm::HS256, &claims());
        assert_eq!(verifier().verify(&token), Err(SessionTokenError::BadSignature));
    }

    #[test]
    fn test_tampered_claims_rejected() {
        let token = mint(SECRET, Algorithm::HS256, &claims());
        let (header, rest) = token.split_once('.').unwrap();
        let (_, signature) = rest.split_once('.').unwrap();

        let mut forged = claims();
        forged["dest"] = serde_json::json!("https://other-shop.myshopify.com");
        let other = mint("another-secret-entirely", Algorithm::HS256, &forged);
        let forged_claims = other.split('.').nth(1).unwrap();

        let token = format!("{header}.{forged_claims}.{signature}");
        assert_eq!(verifier().verify(&token), Err(SessionTokenError::BadSignature));
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let token = mint(SECRET, Algorithm::HS384, &claims());
        assert_eq!(
            verifier().verify(&token),
            Err(SessionTokenError::UnsupportedAlgorithm)
        );
    }

    #[test]
    fn test_expiry_with_leeway() {
        let now = chrono::Utc::now().timestamp();

        let mut within_leeway = claims();
        within_leeway["exp"] = serde_json::json!(now - 1);
        let token = mint(SECRET, Algorithm::HS256, &within_leeway);
        assert!(verifier().verify(&token).is_ok());

        let mut expired = claims();
        expired["exp"] = serde_json::json!(now - 60);
        let token = mint(SECRET, Algorithm::HS256, &expired);
        assert_eq!(verifier().verify(&token), Err(SessionTokenError::Expired));
    }

    #[test]
    fn test_not_before() {
        let mut early = claims();
        early["nbf"] = serde_json::json!(chrono::Utc::now().timestamp() + 60);
        let token = mint(SECRET, Algorithm::HS256, &early);
        assert_eq!(verifier().verify(&token), Err(SessionTokenError::NotYetValid));
    }

    #[test]
    fn test_missing_expiry_rejected() {
        let mut no_exp = claims();
        no_exp.as_object_mut().unwrap().remove("exp");
        let token = mint(SECRET, Algorithm::HS256, &no_exp);
        assert_eq!(verifier().verify(&token), Err(SessionTokenError::Malformed));
    }

    #[test]
    fn test_audience_and_shop_checked() {
        let mut other_app = claims();
        other_app["aud"] = serde_json::json!("someone-else");
        let token = mint(SECRET, Algorithm::HS256, &other_app);
        assert_eq!(verifier().verify(&token), Err(SessionTokenError::WrongAudience));

        let mut other_shop = claims();
        other_shop["dest"] = serde_json::json!("https://other-shop.myshopify.com");
        let token = mint(SECRET, Algorithm::HS256, &other_shop);
        assert_eq!(verifier().verify(&token), Err(SessionTokenError::WrongShop));
    }

    #[test]
    fn test_malformed_tokens() {
        assert_eq!(verifier().verify("not-a-jwt"), Err(SessionTokenError::Malformed));
        assert_eq!(verifier().verify("a.b.c"), Err(SessionTokenError::Malformed));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let output = format!("{:?}", verifier());
        assert!(output.contains("[REDACTED]"));
        assert!(!output.contains(SECRET));
    }
}
