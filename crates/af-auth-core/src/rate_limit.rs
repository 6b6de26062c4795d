use crate::role::Role;
use af_store::{StoreUnavailable, TtlStore};
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: i64 = 5;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone, Copy)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: i64,
    pub retry_after_secs: u64,
}

/// Fixed-window counter per (role, identifier). One counter, O(1) per check;
/// the boundary-burst tradeoff is acceptable at 15-minute granularity since
/// lockout is per wallet, not per IP.
pub struct RateLimiter {
    store: Arc<dyn TtlStore>,
    window: Duration,
    max_attempts: i64,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn TtlStore>, window: Duration, max_attempts: i64) -> Self {
        Self {
            store,
            window,
            max_attempts,
        }
    }

    fn key(role: Role, identifier: &str) -> String {
        format!("{}{}", role.rate_limit_key_prefix(), identifier)
    }

    /// Counts this attempt and reports whether it is allowed. The first
    /// attempt in a window arms the counter's expiry.
    pub async fn check(
        &self,
        role: Role,
        identifier: &str,
    ) -> Result<RateLimitDecision, StoreUnavailable> {
        let key = Self::key(role, identifier);
        let count = self.store.incr(&key).await?;
        if count == 1 {
            self.store.expire(&key, self.window).await?;
        }

        if count > self.max_attempts {
            let retry_after_secs = match self.store.ttl(&key).await {
                Ok(Some(ttl)) => ttl.as_secs(),
                // Fall back to the full window when the TTL cannot be read.
                Ok(None) | Err(_) => self.window.as_secs(),
            };
            return Ok(RateLimitDecision {
                allowed: false,
                remaining: 0,
                retry_after_secs,
            });
        }

        Ok(RateLimitDecision {
            allowed: true,
            remaining: self.max_attempts - count,
            retry_after_secs: 0,
        })
    }

    /// Deletes the counter. Called only after a fully successful login, so a
    /// legitimate user's next window starts clean while an attacker's failed
    /// attempts keep counting toward lockout.
    pub async fn reset(&self, role: Role, identifier: &str) -> Result<(), StoreUnavailable> {
        self.store.del(&Self::key(role, identifier)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_store::MemoryTtlStore;

    const WALLET: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";

    fn limiter(max_attempts: i64) -> RateLimiter {
        RateLimiter::new(Arc::new(MemoryTtlStore::new()), DEFAULT_WINDOW, max_attempts)
    }

    #[tokio::test]
    async fn sixth_attempt_is_denied() -> Result<(), StoreUnavailable> {
        let limiter = limiter(5);

        for attempt in 1..=5 {
            let decision = limiter.check(Role::Admin, WALLET).await?;
            assert!(decision.allowed, "attempt {attempt} should be allowed");
            assert_eq!(decision.remaining, 5 - attempt);
        }

        let denied = limiter.check(Role::Admin, WALLET).await?;
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
        assert!(denied.retry_after_secs > 0);
        assert!(denied.retry_after_secs <= DEFAULT_WINDOW.as_secs());
        Ok(())
    }

    #[tokio::test]
    async fn reset_restores_the_full_quota() -> Result<(), StoreUnavailable> {
        let limiter = limiter(5);

        for _ in 0..6 {
            limiter.check(Role::Admin, WALLET).await?;
        }
        assert!(!limiter.check(Role::Admin, WALLET).await?.allowed);

        limiter.reset(Role::Admin, WALLET).await?;

        let fresh = limiter.check(Role::Admin, WALLET).await?;
        assert!(fresh.allowed);
        assert_eq!(fresh.remaining, 4);
        Ok(())
    }

    #[tokio::test]
    async fn identifiers_and_roles_are_counted_independently() -> Result<(), StoreUnavailable> {
        let limiter = limiter(1);

        assert!(limiter.check(Role::Admin, WALLET).await?.allowed);
        assert!(!limiter.check(Role::Admin, WALLET).await?.allowed);

        // Another wallet and another role are untouched.
        let other = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
        assert!(limiter.check(Role::Admin, other).await?.allowed);
        assert!(limiter.check(Role::Farmer, WALLET).await?.allowed);
        Ok(())
    }

    #[tokio::test]
    async fn window_expiry_clears_the_counter() -> Result<(), StoreUnavailable> {
        let store: Arc<dyn TtlStore> = Arc::new(MemoryTtlStore::new());
        let limiter = RateLimiter::new(store, Duration::from_millis(20), 1);

        assert!(limiter.check(Role::Investor, WALLET).await?.allowed);
        assert!(!limiter.check(Role::Investor, WALLET).await?.allowed);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(limiter.check(Role::Investor, WALLET).await?.allowed);
        Ok(())
    }
}
