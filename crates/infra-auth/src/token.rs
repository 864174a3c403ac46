// HS256 JWT TokenService

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use taskhub_core::domain::{Principal, Role};
use taskhub_core::error::{AppError, Result};
use taskhub_core::port::{AccessToken, TimeProvider, TokenService};
use tracing::debug;

const TOKEN_TYPE: &str = "Bearer";

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub ttl_secs: i64,
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    name: String,
    roles: Vec<Role>,
    iss: String,
    iat: i64,
    exp: i64,
}

pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: i64,
    clock: Arc<dyn TimeProvider>,
}

impl JwtTokenService {
    pub fn new(config: JwtConfig, clock: Arc<dyn TimeProvider>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "sub", "iss"]);
        // Expiry is checked against the injected clock
        validation.validate_exp = false;

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer,
            ttl_secs: config.ttl_secs,
            clock,
        }
    }

    fn now_secs(&self) -> i64 {
        self.clock.now_millis() / 1000
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, principal: &Principal) -> Result<AccessToken> {
        let iat = self.now_secs();
        let exp = iat + self.ttl_secs;
        let claims = Claims {
            sub: principal.account_id.clone(),
            name: principal.username.clone(),
            roles: principal.roles.clone(),
            iss: self.issuer.clone(),
            iat,
            exp,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))?;

        Ok(AccessToken {
            token,
            token_type: TOKEN_TYPE.to_string(),
            expires_at: exp,
        })
    }

    fn verify(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "Token rejected");
            match e.kind() {
                ErrorKind::InvalidIssuer => AppError::Unauthorized("token issuer mismatch".into()),
                ErrorKind::InvalidSignature => AppError::Unauthorized("invalid token signature".into()),
                _ => AppError::Unauthorized("invalid token".into()),
            }
        })?;

        let claims = data.claims;
        if claims.exp <= self.now_secs() {
            return Err(AppError::Unauthorized("token expired".into()));
        }

        Ok(Principal {
            account_id: claims.sub,
            username: claims.name,
            roles: claims.roles,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskhub_core::port::time_provider::ManualClock;

    const START: i64 = 1_700_000_000_000;

    fn service(secret: &str, clock: Arc<ManualClock>) -> JwtTokenService {
        JwtTokenService::new(
            JwtConfig {
                secret: secret.to_string(),
                issuer: "taskhub".to_string(),
                ttl_secs: 3600,
            },
            clock,
        )
    }

    fn principal() -> Principal {
        Principal {
            account_id: "u-1".to_string(),
            username: "alice".to_string(),
            roles: vec![Role::User, Role::Admin],
        }
    }

    #[test]
    fn test_issue_then_verify() {
        let clock = Arc::new(ManualClock::new(START));
        let tokens = service("0123456789abcdef0123456789abcdef", clock);

        let token = tokens.issue(&principal()).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_at, START / 1000 + 3600);

        assert_eq!(tokens.verify(&token.token).unwrap(), principal());
    }

    #[test]
    fn test_expired_token_rejected() {
        let clock = Arc::new(ManualClock::new(START));
        let tokens = service("0123456789abcdef0123456789abcdef", clock.clone());
        let token = tokens.issue(&principal()).unwrap();

        clock.advance(3600 * 1000);
        let err = tokens.verify(&token.token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg == "token expired"));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let clock = Arc::new(ManualClock::new(START));
        let ours = service("0123456789abcdef0123456789abcdef", clock.clone());
        let theirs = service("ffffffffffffffffffffffffffffffff", clock);

        let token = theirs.issue(&principal()).unwrap();
        assert!(matches!(
            ours.verify(&token.token),
            Err(AppError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service(
            "0123456789abcdef0123456789abcdef",
            Arc::new(ManualClock::new(START)),
        );
        assert!(matches!(
            tokens.verify("not.a.jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
