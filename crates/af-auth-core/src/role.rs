/// Principal class behind a login attempt. Each role has its own nonce and
/// rate-limit key namespace and its own sign-message template, so a message
/// signed for one role's prompt can never validate against another's endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Investor,
    Farmer,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Investor => "investor",
            Role::Farmer => "farmer",
            Role::Admin => "admin",
        }
    }

    pub(crate) fn nonce_key_prefix(self) -> &'static str {
        match self {
            Role::Investor => "nonce:",
            Role::Farmer => "farmer_nonce:",
            Role::Admin => "admin_nonce:",
        }
    }

    pub(crate) fn rate_limit_key_prefix(self) -> &'static str {
        match self {
            Role::Investor => "ratelimit:login:",
            Role::Farmer => "ratelimit:farmer_login:",
            Role::Admin => "ratelimit:admin_login:",
        }
    }

    /// The exact text the wallet is asked to sign. Reconstructed identically
    /// by client and server; never persisted.
    pub fn sign_message(self, nonce: &str) -> String {
        match self {
            Role::Investor => {
                format!("Sign this message to login to AgriFund.\n\nNonce: {nonce}")
            }
            Role::Farmer => {
                format!("Sign this message to login to AgriFund as Farmer.\n\nNonce: {nonce}")
            }
            Role::Admin => {
                format!("Sign this message to login to AgriFund Admin.\n\nNonce: {nonce}")
            }
        }
    }
}
