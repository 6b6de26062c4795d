mod error;
mod login;
mod nonce;
mod principal;
mod rate_limit;
mod role;
mod session;

pub use error::AuthError;
pub use login::{AdminSession, AuthService, FarmerSession, InvestorSession, NonceBundle};
pub use nonce::{NonceError, NonceStore};
pub use principal::{
    AdminUser, Farmer, FarmerStatus, Investor, MemoryAdminRepository, MemoryFarmerRepository,
    MemoryInvestorRepository, RepositoryError,
};
pub use principal::{AdminRepository, FarmerRepository, InvestorRepository};
pub use rate_limit::{RateLimitDecision, RateLimiter};
pub use role::Role;
pub use session::{SessionClaims, SessionError, SessionIssuer, ADMIN_ISSUER, ISSUER};
