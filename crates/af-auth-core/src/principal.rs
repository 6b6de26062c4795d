use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Infrastructure failure in a principal repository. "No such record" is not
/// an error; lookups return `Option`.
#[derive(Debug, Error)]
#[error("principal repository unavailable: {0}")]
pub struct RepositoryError(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FarmerStatus {
    Pending,
    Approved,
    Rejected,
    Suspended,
    UnderReview,
}

impl FarmerStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            FarmerStatus::Pending => "pending",
            FarmerStatus::Approved => "approved",
            FarmerStatus::Rejected => "rejected",
            FarmerStatus::Suspended => "suspended",
            FarmerStatus::UnderReview => "under_review",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "pending" => Some(FarmerStatus::Pending),
            "approved" => Some(FarmerStatus::Approved),
            "rejected" => Some(FarmerStatus::Rejected),
            "suspended" => Some(FarmerStatus::Suspended),
            "under_review" => Some(FarmerStatus::UnderReview),
            _ => None,
        }
    }
}

/// Auto-provisioned on first successful login; no status gate.
#[derive(Debug, Clone)]
pub struct Investor {
    pub id: String,
    pub wallet_address: String,
}

/// Must pre-exist and be approved before a login succeeds.
#[derive(Debug, Clone)]
pub struct Farmer {
    pub id: String,
    pub wallet_address: String,
    pub farm_name: String,
    pub status: FarmerStatus,
}

/// Must pre-exist and be active before a login succeeds.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: String,
    pub wallet_address: String,
    pub role: String,
    pub is_active: bool,
}

#[async_trait]
pub trait InvestorRepository: Send + Sync {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<Investor>, RepositoryError>;

    /// Creates a record for a wallet seen for the first time. The caller
    /// ensures lookup-then-create; this is not required to be idempotent.
    async fn create(&self, wallet_address: &str) -> Result<Investor, RepositoryError>;

    async fn update_last_login(&self, investor_id: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait FarmerRepository: Send + Sync {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<Farmer>, RepositoryError>;

    async fn update_last_login(&self, farmer_id: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait AdminRepository: Send + Sync {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<AdminUser>, RepositoryError>;

    async fn update_last_login(&self, admin_id: &str) -> Result<(), RepositoryError>;
}

/// In-memory repositories, keyed by lowercase wallet address. Used by tests
/// and by local runs without a database.
#[derive(Default)]
pub struct MemoryInvestorRepository {
    records: RwLock<HashMap<String, Investor>>,
}

impl MemoryInvestorRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InvestorRepository for MemoryInvestorRepository {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<Investor>, RepositoryError> {
        let guard = self.records.read().await;
        Ok(guard.get(wallet_address).cloned())
    }

    async fn create(&self, wallet_address: &str) -> Result<Investor, RepositoryError> {
        let investor = Investor {
            id: Uuid::new_v4().to_string(),
            wallet_address: wallet_address.to_owned(),
        };
        let mut guard = self.records.write().await;
        guard.insert(wallet_address.to_owned(), investor.clone());
        Ok(investor)
    }

    async fn update_last_login(&self, _investor_id: &str) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryFarmerRepository {
    records: RwLock<HashMap<String, Farmer>>,
}

impl MemoryFarmerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, farmer: Farmer) {
        let mut guard = self.records.write().await;
        guard.insert(farmer.wallet_address.clone(), farmer);
    }
}

#[async_trait]
impl FarmerRepository for MemoryFarmerRepository {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<Farmer>, RepositoryError> {
        let guard = self.records.read().await;
        Ok(guard.get(wallet_address).cloned())
    }

    async fn update_last_login(&self, _farmer_id: &str) -> Result<(), RepositoryError> {
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryAdminRepository {
    records: RwLock<HashMap<String, AdminUser>>,
}

impl MemoryAdminRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, admin: AdminUser) {
        let mut guard = self.records.write().await;
        guard.insert(admin.wallet_address.clone(), admin);
    }
}

#[async_trait]
impl AdminRepository for MemoryAdminRepository {
    async fn find_by_wallet_address(
        &self,
        wallet_address: &str,
    ) -> Result<Option<AdminUser>, RepositoryError> {
        let guard = self.records.read().await;
        Ok(guard.get(wallet_address).cloned())
    }

    async fn update_last_login(&self, _admin_id: &str) -> Result<(), RepositoryError> {
        Ok(())
    }
}
