//! Signed refresh/access token pairs (HS256 JWT)

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Which half of the pair a token is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Refresh,
    Access,
}

/// JWT claims carried by both token types
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub token_type: TokenType,
    pub user_id: i32,
    /// Unique token id
    pub jti: String,
    /// Issued at (timestamp)
    pub iat: i64,
    /// Expiration time (timestamp)
    pub exp: i64,
}

impl TokenClaims {
    fn new(token_type: TokenType, user_id: i32, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            token_type,
            user_id,
            jti: Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }
}

/// Token errors
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Token has wrong type")]
    WrongType,
}

/// Signs and verifies tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("access_lifetime", &self.access_lifetime)
            .field("refresh_lifetime", &self.refresh_lifetime)
            .finish_non_exhaustive()
    }
}

impl TokenSigner {
    pub fn new(secret: &[u8], access_lifetime: Duration, refresh_lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_lifetime,
            refresh_lifetime,
        }
    }

    fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }

    fn verify(&self, token: &str, expected: TokenType) -> Result<TokenClaims, TokenError> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.validation)?.claims;
        if claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(claims)
    }

    /// Issue a refresh token for `user_id`.
    pub fn refresh_for_user(&self, user_id: i32) -> Result<RefreshToken<'_>, TokenError> {
        let claims = TokenClaims::new(TokenType::Refresh, user_id, self.refresh_lifetime);
        let encoded = self.sign(&claims)?;
        Ok(RefreshToken {
            signer: self,
            claims,
            encoded,
        })
    }

    /// Check an access token and return its claims.
    pub fn verify_access(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify(token, TokenType::Access)
    }

    /// Check a refresh token and rebuild it so new access tokens can be minted.
    pub fn verify_refresh(&self, token: &str) -> Result<RefreshToken<'_>, TokenError> {
        let claims = self.verify(token, TokenType::Refresh)?;
        Ok(RefreshToken {
            signer: self,
            claims,
            encoded: token.to_string(),
        })
    }
}

/// A signed refresh token that can derive access tokens for the same user.
#[derive(Debug)]
pub struct RefreshToken<'a> {
    signer: &'a TokenSigner,
    claims: TokenClaims,
    encoded: String,
}

impl RefreshToken<'_> {
    pub fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Mint a short-lived access token scoped to the same user.
    pub fn access_token(&self) -> Result<String, TokenError> {
        let claims = TokenClaims::new(
            TokenType::Access,
            self.claims.user_id,
            self.signer.access_lifetime,
        );
        self.signer.sign(&claims)
    }
}
