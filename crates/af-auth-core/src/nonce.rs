use crate::role::Role;
use af_crypto::WalletAddress;
use af_store::{StoreUnavailable, TtlStore};
use rand::RngCore;
use rand::rngs::OsRng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub const NONCE_BYTE_LEN: usize = 16;
pub const DEFAULT_NONCE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Error)]
pub enum NonceError {
    #[error("nonce not found or expired")]
    NotFound,
    #[error("nonce mismatch")]
    Mismatch,
    #[error(transparent)]
    Store(#[from] StoreUnavailable),
}

/// One-time random values keyed by role namespace and lowercase wallet
/// address, held in the external TTL store. A nonce lives until TTL expiry or
/// first successful validation, whichever comes first.
pub struct NonceStore {
    store: Arc<dyn TtlStore>,
    ttl: Duration,
}

impl NonceStore {
    pub fn new(store: Arc<dyn TtlStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn key(role: Role, wallet: &WalletAddress) -> String {
        format!("{}{}", role.nonce_key_prefix(), wallet)
    }

    /// Generates a fresh 32-hex-char nonce and stores it, overwriting any
    /// prior nonce for the same (role, address) pair. Issuance can only fail
    /// on the store write.
    pub async fn issue(
        &self,
        role: Role,
        wallet: &WalletAddress,
    ) -> Result<String, StoreUnavailable> {
        let mut bytes = [0u8; NONCE_BYTE_LEN];
        OsRng.fill_bytes(&mut bytes);
        let nonce = hex::encode(bytes);

        self.store
            .set(&Self::key(role, wallet), &nonce, self.ttl)
            .await?;
        Ok(nonce)
    }

    /// Exact-match validation followed by deletion, making the nonce single
    /// use. A concurrent duplicate attempt after the delete lands sees
    /// [`NonceError::NotFound`]. No retries; the caller decides whether the
    /// client may request a fresh nonce.
    pub async fn validate_and_consume(
        &self,
        role: Role,
        wallet: &WalletAddress,
        supplied: &str,
    ) -> Result<(), NonceError> {
        let key = Self::key(role, wallet);
        let stored = self.store.get(&key).await?.ok_or(NonceError::NotFound)?;
        if stored != supplied {
            return Err(NonceError::Mismatch);
        }
        self.store.del(&key).await?;
        Ok(())
    }
}
