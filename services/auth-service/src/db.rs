use af_auth_core::{
    AdminRepository, AdminUser, Farmer, FarmerRepository, FarmerStatus, Investor,
    InvestorRepository, RepositoryError,
};
use anyhow::Context;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tokio_postgres::{Client, NoTls};
use tracing::warn;
use uuid::Uuid;

/// Postgres-backed principal repositories. One shared client serves all
/// three principal tables.
pub(crate) struct PostgresPrincipals {
    client: Client,
}

fn repo_err(err: tokio_postgres::Error) -> RepositoryError {
    RepositoryError(err.to_string())
}

impl PostgresPrincipals {
    pub(crate) async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let (client, connection) = tokio_postgres::connect(database_url, NoTls)
            .await
            .context("failed to connect to Postgres")?;

        tokio::spawn(async move {
            if let Err(err) = connection.await {
                warn!("postgres connection error: {}", err);
            }
        });

        Ok(Self { client })
    }

    pub(crate) async fn run_migrations_from_dir(
        &self,
        migrations_dir: &str,
    ) -> anyhow::Result<usize> {
        let mut files: Vec<PathBuf> = fs::read_dir(migrations_dir)
            .with_context(|| format!("failed to read migrations directory: {migrations_dir}"))?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|value| value.to_str()) == Some("sql"))
            .collect();

        files.sort();

        for file_path in &files {
            let sql = fs::read_to_string(file_path)
                .with_context(|| format!("failed to read migration file: {}", file_path.display()))?;
            self.client
                .batch_execute(&sql)
                .await
                .with_context(|| format!("failed to execute migration file: {}", file_path.display()))?;
        }

        Ok(files.len())
    }

    /// Idempotent bootstrap admin. Reactivates and updates the role on
    /// conflict so redeploys converge on the configured wallet.
    pub(crate) async fn seed_admin(&self, wallet_address: &str, role: &str) -> anyhow::Result<()> {
        let wallet: af_crypto::WalletAddress = wallet_address
            .parse()
            .map_err(|_| anyhow::anyhow!("SEED_ADMIN_WALLET is not a valid wallet address"))?;

        self.client
            .execute(
                "INSERT INTO admin_users (id, wallet_address, role, is_active, created_at)
                 VALUES ($1, $2, $3, TRUE, NOW())
                 ON CONFLICT (wallet_address)
                 DO UPDATE SET role = EXCLUDED.role, is_active = TRUE",
                &[&Uuid::new_v4().to_string(), &wallet.to_string(), &role],
            )
            .await
            .context("failed to seed admin account")?;

        Ok(())
    }
}

#[async_trait]
impl InvestorRepository for PostgresPrincipals {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<Investor>, RepositoryError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, wallet_address FROM investors WHERE wallet_address = $1",
                &[&wallet_address],
            )
            .await
            .map_err(repo_err)?;

        Ok(row.map(|entry| Investor {
            id: entry.get(0),
            wallet_address: entry.get(1),
        }))
    }

    async fn create(&self, wallet_address: &str) -> Result<Investor, RepositoryError> {
        let id = Uuid::new_v4().to_string();
        self.client
            .execute(
                "INSERT INTO investors (id, wallet_address, created_at)
                 VALUES ($1, $2, NOW())",
                &[&id, &wallet_address],
            )
            .await
            .map_err(repo_err)?;

        Ok(Investor {
            id,
            wallet_address: wallet_address.to_owned(),
        })
    }

    async fn update_last_login(&self, investor_id: &str) -> Result<(), RepositoryError> {
        self.client
            .execute(
                "UPDATE investors SET last_login_at = NOW() WHERE id = $1",
                &[&investor_id],
            )
            .await
            .map_err(repo_err)?;
        Ok(())
    }
}

#[async_trait]
impl FarmerRepository for PostgresPrincipals {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<Farmer>, RepositoryError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, wallet_address, farm_name, status
                 FROM farmers
                 WHERE wallet_address = $1",
                &[&wallet_address],
            )
            .await
            .map_err(repo_err)?;

        row.map(|entry| {
            let status: String = entry.get(3);
            let status = FarmerStatus::parse(&status)
                .ok_or_else(|| RepositoryError(format!("unknown farmer status: {status}")))?;
            Ok(Farmer {
                id: entry.get(0),
                wallet_address: entry.get(1),
                farm_name: entry.get(2),
                status,
            })
        })
        .transpose()
    }

    async fn update_last_login(&self, farmer_id: &str) -> Result<(), RepositoryError> {
        self.client
            .execute(
                "UPDATE farmers SET last_login_at = NOW() WHERE id = $1",
                &[&farmer_id],
            )
            .await
            .map_err(repo_err)?;
        Ok(())
    }
}

#[async_trait]
impl AdminRepository for PostgresPrincipals {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let row = self
            .client
            .query_opt(
                "SELECT id, wallet_address, role, is_active
                 FROM admin_users
                 WHERE wallet_address = $1",
                &[&wallet_address],
            )
            .await
            .map_err(repo_err)?;

        Ok(row.map(|entry| AdminUser {
            id: entry.get(0),
            wallet_address: entry.get(1),
            role: entry.get(2),
            is_active: entry.get(3),
        }))
    }

    async fn update_last_login(&self, admin_id: &str) -> Result<(), RepositoryError> {
        self.client
            .execute(
                "UPDATE admin_users SET last_login_at = NOW() WHERE id = $1",
                &[&admin_id],
            )
            .await
            .map_err(repo_err)?;
        Ok(())
    }
}
