use super::model::{AuthenticatedUser, CustomClaims};
use crate::core::error::AppError;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::jwks::JwksClient;

pub struct JwtValidator {
    jwks_client: Arc<JwksClient>,
    issuer: String,
    audience: String,
    leeway: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct Claims {
    // iss/aud/exp/nbf are checked by jsonwebtoken itself
    sub: String,

    /// Roles under the namespaced custom claim configured in the identity provider
    #[serde(rename = "https://cityreport.app/claims", default)]
    custom_claims: Option<CustomClaims>,

    /// Plain `roles` claim, used by providers without namespaced claims
    #[serde(default)]
    roles: Vec<String>,
}

impl Claims {
    fn into_user(self) -> AuthenticatedUser {
        let mut roles = self.custom_claims.map(|c| c.roles).unwrap_or_default();
        for role in self.roles {
            if !roles.contains(&role) {
                roles.push(role);
            }
        }

        AuthenticatedUser {
            sub: self.sub,
            roles,
        }
    }
}

impl JwtValidator {
    pub fn new(
        jwks_client: Arc<JwksClient>,
        issuer: String,
        audience: String,
        leeway: Duration,
    ) -> Self {
        Self {
            jwks_client,
            issuer,
            audience,
            leeway: leeway.as_secs(),
        }
    }

    pub async fn validate_token(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let header = decode_header(token).map_err(|e| AppError::Auth(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(AppError::Auth(format!(
                "Unsupported algorithm: {:?}. Only RS256 is allowed",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| AppError::Auth("Missing kid in token header".to_string()))?;

        let decoding_key = self
            .jwks_client
            .get_key(&kid)
            .await
            .map_err(|e| AppError::Auth(e.to_string()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.leeway = self.leeway;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|e| AppError::Auth(e.to_string()))?;

        tracing::debug!("Validated token for sub={}", token_data.claims.sub);

        Ok(token_data.claims.into_user())
    }
}
