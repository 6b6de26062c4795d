use crate::config::Config;
use crate::db::PostgresPrincipals;
use af_auth_core::{
    AdminRepository, AuthService, FarmerRepository, InvestorRepository, MemoryAdminRepository,
    MemoryFarmerRepository, MemoryInvestorRepository, NonceStore, RateLimiter, SessionIssuer,
};
use af_crypto::SignatureVerifier;
use af_store::{MemoryTtlStore, RedisTtlStore, TtlStore};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth: Arc<AuthService>,
}

impl AppState {
    pub(crate) async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = build_store(config).await;
        let (investors, farmers, admins) = build_repositories(config).await?;

        let auth = AuthService::new(
            NonceStore::new(store.clone(), config.nonce_ttl),
            RateLimiter::new(
                store,
                config.rate_limit_window,
                config.rate_limit_max_attempts,
            ),
            SignatureVerifier::new(config.eip712_domain.clone()),
            SessionIssuer::new(&config.jwt_secret, config.session_lifetime),
            investors,
            farmers,
            admins,
        );

        Ok(Self {
            auth: Arc::new(auth),
        })
    }

    #[cfg(test)]
    pub(crate) fn for_tests(auth: AuthService) -> Self {
        Self {
            auth: Arc::new(auth),
        }
    }
}

async fn build_store(config: &Config) -> Arc<dyn TtlStore> {
    if let Some(redis_url) = &config.redis_url {
        match RedisTtlStore::connect(redis_url).await {
            Ok(store) => {
                info!("connected to Redis at {}", redis_url);
                return Arc::new(store);
            }
            Err(err) => {
                warn!("redis unavailable, using in-memory store: {}", err);
            }
        }
    } else {
        info!("REDIS_URL not set, using in-memory store");
    }
    Arc::new(MemoryTtlStore::new())
}

type Repositories = (
    Arc<dyn InvestorRepository>,
    Arc<dyn FarmerRepository>,
    Arc<dyn AdminRepository>,
);

async fn build_repositories(config: &Config) -> anyhow::Result<Repositories> {
    if let Some(database_url) = &config.database_url {
        match PostgresPrincipals::connect(database_url).await {
            Ok(pg) => {
                let applied = pg.run_migrations_from_dir(&config.migrations_dir).await?;
                info!("connected to Postgres, applied {} migration files", applied);
                if let Some(wallet) = &config.seed_admin_wallet {
                    pg.seed_admin(wallet, &config.seed_admin_role).await?;
                }
                let pg = Arc::new(pg);
                let investors: Arc<dyn InvestorRepository> = pg.clone();
                let farmers: Arc<dyn FarmerRepository> = pg.clone();
                let admins: Arc<dyn AdminRepository> = pg;
                return Ok((investors, farmers, admins));
            }
            Err(err) => {
                warn!("postgres unavailable, using in-memory repositories: {}", err);
            }
        }
    } else {
        info!("DATABASE_URL not set, using in-memory repositories");
    }

    let admins = MemoryAdminRepository::new();
    if let Some(wallet) = &config.seed_admin_wallet {
        seed_memory_admin(&admins, wallet, &config.seed_admin_role).await?;
    }

    let investors: Arc<dyn InvestorRepository> = Arc::new(MemoryInvestorRepository::new());
    let farmers: Arc<dyn FarmerRepository> = Arc::new(MemoryFarmerRepository::new());
    let admins: Arc<dyn AdminRepository> = Arc::new(admins);
    Ok((investors, farmers, admins))
}

async fn seed_memory_admin(
    admins: &MemoryAdminRepository,
    wallet: &str,
    role: &str,
) -> anyhow::Result<()> {
    let wallet: af_crypto::WalletAddress = wallet
        .parse()
        .map_err(|_| anyhow::anyhow!("SEED_ADMIN_WALLET is not a valid wallet address"))?;
    admins
        .insert(af_auth_core::AdminUser {
            id: uuid::Uuid::new_v4().to_string(),
            wallet_address: wallet.to_string(),
            role: role.to_owned(),
            is_active: true,
        })
        .await;
    info!("seeded admin account for {}", wallet);
    Ok(())
}
