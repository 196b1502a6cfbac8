use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims embedded in access tokens issued by the authentication service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: external user-account id as a decimal string.
    pub sub: String,
    /// Token type: always `"access"` for tokens this API accepts.
    pub token_type: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
}

/// Generate an access token for the given user account.
///
/// Token issuing belongs to the external authentication service; this
/// function mirrors its token shape for local tooling and tests.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn generate_access_token(
    user_id: i32,
    secret: &str,
    expiration_secs: u64,
) -> anyhow::Result<String> {
    let now = Utc::now();

    #[allow(clippy::cast_possible_wrap)]
    let exp = now.timestamp() + expiration_secs as i64;

    let claims = Claims {
        sub: user_id.to_string(),
        token_type: "access".to_string(),
        exp,
        iat: now.timestamp(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode access token: {e}"))
}

/// Validate an access token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or not an access token.
pub fn validate_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| anyhow::anyhow!("Invalid access token: {e}"))?;

    if token_data.claims.token_type != "access" {
        return Err(anyhow::anyhow!("Token is not an access token"));
    }

    Ok(token_data.claims)
}
