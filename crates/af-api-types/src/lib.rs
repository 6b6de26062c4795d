use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct NonceQuery {
    pub wallet_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub wallet_address: String,
    pub signature: String,
    pub nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorProfile {
    pub id: String,
    pub wallet_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestorLoginResponse {
    pub token: String,
    pub investor: InvestorProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerProfile {
    pub id: String,
    pub wallet_address: String,
    pub farm_name: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmerLoginResponse {
    pub token: String,
    pub farmer: FarmerProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminProfile {
    pub id: String,
    pub wallet_address: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginResponse {
    pub token: String,
    pub admin: AdminProfile,
}

/// Snapshot of the verified session claims, returned by the `/me` probes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub principal_id: String,
    pub wallet_address: String,
    pub role: String,
}
