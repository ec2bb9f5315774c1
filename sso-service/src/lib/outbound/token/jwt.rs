use auth::JwtHandler;
use chrono::Duration;
use chrono::Utc;

use crate::credentials::errors::TokenError;
use crate::credentials::models::Application;
use crate::credentials::models::TokenClaims;
use crate::credentials::models::User;
use crate::credentials::ports::TokenIssuer;

/// HS256 token issuer keyed by each application's own secret.
///
/// Holds no keys: a handler is derived from the application on every call,
/// so a token can only ever be signed or verified with the secret of the
/// application it names.
#[derive(Debug, Default, Clone, Copy)]
pub struct JwtTokenIssuer;

impl JwtTokenIssuer {
    pub fn new() -> Self {
        Self
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue(
        &self,
        user: &User,
        application: &Application,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let handler = JwtHandler::new(application.secret.as_bytes())?;
        let claims = TokenClaims::new(user, application, Utc::now(), ttl)?;

        Ok(handler.encode(&claims)?)
    }

    fn verify(&self, token: &str, application: &Application) -> Result<TokenClaims, TokenError> {
        let handler = JwtHandler::new(application.secret.as_bytes())?;
        let claims: TokenClaims = handler.decode(token)?;

        if claims.application_id() != application.id {
            return Err(TokenError::ApplicationMismatch {
                expected: application.id,
                actual: claims.application_id(),
            });
        }

        Ok(claims)
    }
}
