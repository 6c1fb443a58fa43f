use std::fs;

use gateway_core::context::Identity;
use gateway_core::error::AppError;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AuthSettings, TokenAlgorithm};

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    #[error("token has an empty subject")]
    MissingSubject,
}

/// Turns a bearer credential into the caller identity.
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<Identity, TokenError>;
}

/// Claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verifies signed JWTs with a static key.
pub struct JwtVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(settings: &AuthSettings) -> Result<Self, AppError> {
        let decoding_key = match settings.algorithm {
            TokenAlgorithm::HS256 => {
                let secret = settings.secret.as_ref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("auth.secret is required for HS256"))
                })?;
                DecodingKey::from_secret(secret.expose_secret().as_bytes())
            }
            TokenAlgorithm::RS256 => {
                let path = settings.public_key_path.as_deref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "auth.public_key_path is required for RS256"
                    ))
                })?;
                let pem = fs::read_to_string(path).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "Failed to read public key from {}: {}",
                        path,
                        e
                    ))
                })?;
                DecodingKey::from_rsa_pem(pem.as_bytes()).map_err(|e| {
                    AppError::ConfigError(anyhow::anyhow!("Failed to parse public key: {}", e))
                })?
            }
        };

        tracing::info!(algorithm = ?settings.algorithm, "token verifier initialized");

        Ok(Self {
            decoding_key,
            validation: validation(settings),
        })
    }
}

fn validation(settings: &AuthSettings) -> Validation {
    let algorithm = match settings.algorithm {
        TokenAlgorithm::HS256 => Algorithm::HS256,
        TokenAlgorithm::RS256 => Algorithm::RS256,
    };

    let mut validation = Validation::new(algorithm);
    validation.validate_exp = true;
    validation.leeway = settings.leeway_secs;
    validation.set_required_spec_claims(&["exp", "sub"]);

    if let Some(issuer) = &settings.issuer {
        validation.set_issuer(&[issuer]);
    }
    match &settings.audience {
        Some(audience) => validation.set_audience(&[audience]),
        None => validation.validate_aud = false,
    }

    validation
}

impl TokenVerifier for JwtVerifier {
    fn verify(&self, credential: &str) -> Result<Identity, TokenError> {
        let claims = decode::<Claims>(credential, &self.decoding_key, &self.validation)?.claims;
        if claims.sub.is_empty() {
            return Err(TokenError::MissingSubject);
        }

        Ok(Identity {
            user_id: claims.sub,
            name: claims.name,
            email: claims.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use secrecy::Secret;

    const SECRET: &str = "unit-test-secret";

    fn settings() -> AuthSettings {
        AuthSettings {
            scheme: "Bearer".to_string(),
            algorithm: TokenAlgorithm::HS256,
            secret: Some(Secret::new(SECRET.to_string())),
            public_key_path: None,
            issuer: None,
            audience: None,
            leeway_secs: 0,
        }
    }

    fn sign(sub: &str, exp_offset: i64) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            exp: chrono::Utc::now().timestamp() + exp_offset,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn valid_token_yields_identity() {
        let verifier = JwtVerifier::new(&settings()).unwrap();
        let identity = verifier.verify(&sign("user-1", 600)).unwrap();
        assert_eq!(identity.user_id, "user-1");
        assert_eq!(identity.email, "ada@example.com");
    }

    #[test]
    fn expired_token_is_rejected() {
        let verifier = JwtVerifier::new(&settings()).unwrap();
        assert!(matches!(
            verifier.verify(&sign("user-1", -600)),
            Err(TokenError::Rejected(_))
        ));
    }

    #[test]
    fn empty_subject_is_rejected() {
        let verifier = JwtVerifier::new(&settings()).unwrap();
        assert!(matches!(
            verifier.verify(&sign("", 600)),
            Err(TokenError::MissingSubject)
        ));
    }

    #[test]
    fn hs256_requires_a_secret() {
        let mut settings = settings();
        settings.secret = None;
        assert!(matches!(
            JwtVerifier::new(&settings),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn wrong_audience_is_rejected() {
        let mut settings = settings();
        settings.audience = Some("boards".to_string());
        let verifier = JwtVerifier::new(&settings).unwrap();
        assert!(verifier.verify(&sign("user-1", 600)).is_err());
    }
}
