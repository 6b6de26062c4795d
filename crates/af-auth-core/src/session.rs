use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Issuer tag on investor and farmer tokens.
pub const ISSUER: &str = "agrifund";
/// Issuer tag on admin tokens. Checked on parse so a leaked investor token
/// cannot be presented to admin-only routes.
pub const ADMIN_ISSUER: &str = "agrifund-admin";

pub const DEFAULT_SESSION_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("token has expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Principal ID.
    pub sub: String,
    pub wallet_address: String,
    pub role: String,
    pub iss: String,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
}

/// Mints and parses signed, self-contained session tokens (HS256 over a
/// process-wide symmetric secret). Tokens are stateless: there is no
/// server-side session table, so logout is client-side-only and a compromised
/// token stays valid until natural expiry.
pub struct SessionIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: Duration,
}

impl SessionIssuer {
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            lifetime,
        }
    }

    fn mint(
        &self,
        principal_id: &str,
        wallet_address: &str,
        role: &str,
        issuer: &str,
    ) -> Result<String, SessionError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::from_secs(0))
            .as_secs();

        let claims = SessionClaims {
            sub: principal_id.to_owned(),
            wallet_address: wallet_address.to_owned(),
            role: role.to_owned(),
            iss: issuer.to_owned(),
            iat: now,
            nbf: now,
            exp: now + self.lifetime.as_secs(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|err| SessionError::Signing(err.to_string()))
    }

    pub fn mint_investor(
        &self,
        investor_id: &str,
        wallet_address: &str,
    ) -> Result<String, SessionError> {
        self.mint(investor_id, wallet_address, "investor", ISSUER)
    }

    pub fn mint_farmer(
        &self,
        farmer_id: &str,
        wallet_address: &str,
    ) -> Result<String, SessionError> {
        self.mint(farmer_id, wallet_address, "farmer", ISSUER)
    }

    /// `role` is the admin's role string (e.g. `"super_admin"`), carried as a
    /// claim for downstream authorization.
    pub fn mint_admin(
        &self,
        admin_id: &str,
        wallet_address: &str,
        role: &str,
    ) -> Result<String, SessionError> {
        self.mint(admin_id, wallet_address, role, ADMIN_ISSUER)
    }

    fn parse_with(&self, token: &str, issuer: &str) -> Result<SessionClaims, SessionError> {
        // Validation pinned to HS256: a token signed with any other algorithm
        // is rejected outright (algorithm-confusion defense).
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "iss"]);
        validation.set_issuer(&[issuer]);

        match decode::<SessionClaims>(token, &self.decoding_key, &validation) {
            Ok(data) => Ok(data.claims),
            Err(err) => match err.kind() {
                ErrorKind::ExpiredSignature => Err(SessionError::Expired),
                _ => Err(SessionError::Invalid),
            },
        }
    }

    /// Verifies an investor/farmer token and returns its claims.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.parse_with(token, ISSUER)
    }

    /// Verifies an admin token, additionally requiring the admin issuer tag.
    pub fn parse_admin(&self, token: &str) -> Result<SessionClaims, SessionError> {
        self.parse_with(token, ADMIN_ISSUER)
    }
}
