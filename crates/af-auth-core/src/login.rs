use crate::error::AuthError;
use crate::nonce::{NonceError, NonceStore};
use crate::principal::{
    AdminRepository, AdminUser, Farmer, FarmerRepository, FarmerStatus, Investor,
    InvestorRepository,
};
use crate::rate_limit::RateLimiter;
use crate::role::Role;
use crate::session::SessionIssuer;
use af_crypto::{SignatureVerifier, WalletAddress};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct NonceBundle {
    pub nonce: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct InvestorSession {
    pub token: String,
    pub investor: Investor,
}

#[derive(Debug, Clone)]
pub struct FarmerSession {
    pub token: String,
    pub farmer: Farmer,
}

#[derive(Debug, Clone)]
pub struct AdminSession {
    pub token: String,
    pub admin: AdminUser,
}

/// Sequences one login attempt:
/// rate-limit check → nonce validate-and-consume → signature verify →
/// principal lookup → status check → token mint → best-effort cleanup.
///
/// The ordering is load-bearing. Rate limiting runs before any store or
/// crypto work so a locked-out caller cannot burn cycles brute-forcing
/// signatures, and nonce validation runs before the more expensive ECDSA
/// recovery so a reused or expired nonce is rejected cheaply.
pub struct AuthService {
    nonces: NonceStore,
    rate_limiter: RateLimiter,
    verifier: SignatureVerifier,
    sessions: SessionIssuer,
    investors: Arc<dyn InvestorRepository>,
    farmers: Arc<dyn FarmerRepository>,
    admins: Arc<dyn AdminRepository>,
}

impl AuthService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        nonces: NonceStore,
        rate_limiter: RateLimiter,
        verifier: SignatureVerifier,
        sessions: SessionIssuer,
        investors: Arc<dyn InvestorRepository>,
        farmers: Arc<dyn FarmerRepository>,
        admins: Arc<dyn AdminRepository>,
    ) -> Self {
        Self {
            nonces,
            rate_limiter,
            verifier,
            sessions,
            investors,
            farmers,
            admins,
        }
    }

    /// The session issuer, shared with the HTTP bearer layer.
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    /// Issues a fresh nonce for the (role, wallet) pair and returns it with
    /// the exact message the wallet must sign.
    pub async fn issue_nonce(
        &self,
        role: Role,
        wallet_address: &str,
    ) -> Result<NonceBundle, AuthError> {
        let wallet = parse_wallet(wallet_address)?;
        let nonce = self.nonces.issue(role, &wallet).await?;
        let message = role.sign_message(&nonce);
        Ok(NonceBundle { nonce, message })
    }

    /// Shared front half of every login: rate limit, nonce, signature.
    /// Returns the parsed wallet on success. Nonce and signature failures are
    /// coalesced into `InvalidCredentials` here — and the rate-limit counter
    /// is deliberately NOT reset on failure, so repeated bad attempts keep
    /// counting against the caller.
    async fn authenticate(
        &self,
        role: Role,
        wallet_address: &str,
        signature: &str,
        nonce: &str,
    ) -> Result<WalletAddress, AuthError> {
        let wallet = parse_wallet(wallet_address)?;
        let identifier = wallet.to_string();

        let decision = self.rate_limiter.check(role, &identifier).await?;
        if !decision.allowed {
            return Err(AuthError::RateLimitExceeded {
                retry_after_secs: decision.retry_after_secs,
            });
        }

        match self.nonces.validate_and_consume(role, &wallet, nonce).await {
            Ok(()) => {}
            Err(NonceError::NotFound | NonceError::Mismatch) => {
                return Err(AuthError::InvalidCredentials);
            }
            Err(NonceError::Store(err)) => return Err(err.into()),
        }

        let message = role.sign_message(nonce);
        if let Err(err) = self.verifier.verify(&identifier, signature, &message) {
            warn!(wallet = %identifier, role = role.as_str(), reason = %err, "signature verification failed");
            return Err(AuthError::InvalidCredentials);
        }

        Ok(wallet)
    }

    /// Best-effort post-success side effect: a failed rate-limit reset is
    /// logged, never propagated — failing the login after the user already
    /// authenticated would be worse.
    async fn reset_rate_limit(&self, role: Role, identifier: &str) {
        if let Err(err) = self.rate_limiter.reset(role, identifier).await {
            warn!(wallet = %identifier, role = role.as_str(), "failed to reset rate limit: {err}");
        }
    }

    pub async fn login_investor(
        &self,
        wallet_address: &str,
        signature: &str,
        nonce: &str,
    ) -> Result<InvestorSession, AuthError> {
        let wallet = self
            .authenticate(Role::Investor, wallet_address, signature, nonce)
            .await?;
        let identifier = wallet.to_string();

        // Just-in-time provisioning: a wallet with a valid signature and no
        // record becomes a new investor instead of failing.
        let investor = match self.investors.find_by_wallet_address(&identifier).await? {
            Some(existing) => existing,
            None => self.investors.create(&identifier).await?,
        };

        let token = self
            .sessions
            .mint_investor(&investor.id, &investor.wallet_address)?;

        self.reset_rate_limit(Role::Investor, &identifier).await;
        if let Err(err) = self.investors.update_last_login(&investor.id).await {
            warn!(investor_id = %investor.id, "failed to update last login: {err}");
        }

        Ok(InvestorSession { token, investor })
    }

    pub async fn login_farmer(
        &self,
        wallet_address: &str,
        signature: &str,
        nonce: &str,
    ) -> Result<FarmerSession, AuthError> {
        let wallet = self
            .authenticate(Role::Farmer, wallet_address, signature, nonce)
            .await?;
        let identifier = wallet.to_string();

        let farmer = self
            .farmers
            .find_by_wallet_address(&identifier)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if farmer.status != FarmerStatus::Approved {
            return Err(AuthError::AccountNotApproved);
        }

        let token = self
            .sessions
            .mint_farmer(&farmer.id, &farmer.wallet_address)?;

        self.reset_rate_limit(Role::Farmer, &identifier).await;
        if let Err(err) = self.farmers.update_last_login(&farmer.id).await {
            warn!(farmer_id = %farmer.id, "failed to update last login: {err}");
        }

        Ok(FarmerSession { token, farmer })
    }

    pub async fn login_admin(
        &self,
        wallet_address: &str,
        signature: &str,
        nonce: &str,
    ) -> Result<AdminSession, AuthError> {
        let wallet = self
            .authenticate(Role::Admin, wallet_address, signature, nonce)
            .await?;
        let identifier = wallet.to_string();

        let admin = self
            .admins
            .find_by_wallet_address(&identifier)
            .await?
            .ok_or(AuthError::PrincipalNotFound)?;

        if !admin.is_active {
            return Err(AuthError::AccountInactive);
        }

        let token = self
            .sessions
            .mint_admin(&admin.id, &admin.wallet_address, &admin.role)?;

        self.reset_rate_limit(Role::Admin, &identifier).await;
        if let Err(err) = self.admins.update_last_login(&admin.id).await {
            warn!(admin_id = %admin.id, "failed to update last login: {err}");
        }

        Ok(AdminSession { token, admin })
    }
}

fn parse_wallet(wallet_address: &str) -> Result<WalletAddress, AuthError> {
    wallet_address
        .parse()
        .map_err(|_| AuthError::InvalidWalletAddress)
}
