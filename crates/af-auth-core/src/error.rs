use crate::principal::RepositoryError;
use crate::session::SessionError;
use af_store::StoreUnavailable;
use thiserror::Error;

/// Externally visible outcomes of the login flow. Nonce and signature
/// sub-failures are coalesced into [`AuthError::InvalidCredentials`] before
/// they reach a caller, so the HTTP boundary cannot be used as an oracle to
/// distinguish "wrong nonce" from "wrong signature".
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid wallet address format")]
    InvalidWalletAddress,
    #[error("rate limit exceeded")]
    RateLimitExceeded { retry_after_secs: u64 },
    #[error("invalid wallet address or signature")]
    InvalidCredentials,
    #[error("account not found")]
    PrincipalNotFound,
    #[error("account is not approved")]
    AccountNotApproved,
    #[error("account is inactive")]
    AccountInactive,
    #[error(transparent)]
    Store(#[from] StoreUnavailable),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("failed to issue session token: {0}")]
    Token(#[from] SessionError),
}
