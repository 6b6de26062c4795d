use crate::error::ApiError;
use crate::extract::{AuthAdmin, AuthFarmer, AuthInvestor};
use crate::state::AppState;
use af_api_types::{
    AdminLoginResponse, AdminProfile, FarmerLoginResponse, FarmerProfile, InvestorLoginResponse,
    InvestorProfile, LoginRequest, NonceQuery, NonceResponse, SessionInfo,
};
use af_auth_core::{Role, SessionClaims};
use axum::Json;
use axum::extract::{Query, State};
use serde::Serialize;

/// Success wrapper shared by every auth endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T> {
    pub(crate) status: &'static str,
    pub(crate) data: T,
}

impl<T> Envelope<T> {
    fn success(data: T) -> Json<Self> {
        Json(Self {
            status: "success",
            data,
        })
    }
}

type ApiResult<T> = Result<Json<Envelope<T>>, ApiError>;

async fn issue_nonce(state: &AppState, role: Role, wallet: &str) -> ApiResult<NonceResponse> {
    let bundle = state.auth.issue_nonce(role, wallet).await?;
    Ok(Envelope::success(NonceResponse {
        nonce: bundle.nonce,
        message: bundle.message,
    }))
}

pub(crate) async fn investor_nonce(
    State(state): State<AppState>,
    Query(query): Query<NonceQuery>,
) -> ApiResult<NonceResponse> {
    issue_nonce(&state, Role::Investor, &query.wallet_address).await
}

pub(crate) async fn farmer_nonce(
    State(state): State<AppState>,
    Query(query): Query<NonceQuery>,
) -> ApiResult<NonceResponse> {
    issue_nonce(&state, Role::Farmer, &query.wallet_address).await
}

pub(crate) async fn admin_nonce(
    State(state): State<AppState>,
    Query(query): Query<NonceQuery>,
) -> ApiResult<NonceResponse> {
    issue_nonce(&state, Role::Admin, &query.wallet_address).await
}

pub(crate) async fn investor_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<InvestorLoginResponse> {
    let session = state
        .auth
        .login_investor(&request.wallet_address, &request.signature, &request.nonce)
        .await?;
    Ok(Envelope::success(InvestorLoginResponse {
        token: session.token,
        investor: InvestorProfile {
            id: session.investor.id,
            wallet_address: session.investor.wallet_address,
        },
    }))
}

pub(crate) async fn farmer_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<FarmerLoginResponse> {
    let session = state
        .auth
        .login_farmer(&request.wallet_address, &request.signature, &request.nonce)
        .await?;
    Ok(Envelope::success(FarmerLoginResponse {
        token: session.token,
        farmer: FarmerProfile {
            id: session.farmer.id,
            wallet_address: session.farmer.wallet_address,
            farm_name: session.farmer.farm_name,
            status: session.farmer.status.as_str().to_owned(),
        },
    }))
}

pub(crate) async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AdminLoginResponse> {
    let session = state
        .auth
        .login_admin(&request.wallet_address, &request.signature, &request.nonce)
        .await?;
    Ok(Envelope::success(AdminLoginResponse {
        token: session.token,
        admin: AdminProfile {
            id: session.admin.id,
            wallet_address: session.admin.wallet_address,
            role: session.admin.role,
        },
    }))
}

fn session_info(claims: SessionClaims) -> Json<Envelope<SessionInfo>> {
    Envelope::success(SessionInfo {
        principal_id: claims.sub,
        wallet_address: claims.wallet_address,
        role: claims.role,
    })
}

pub(crate) async fn investor_me(AuthInvestor(claims): AuthInvestor) -> Json<Envelope<SessionInfo>> {
    session_info(claims)
}

pub(crate) async fn farmer_me(AuthFarmer(claims): AuthFarmer) -> Json<Envelope<SessionInfo>> {
    session_info(claims)
}

pub(crate) async fn admin_me(AuthAdmin(claims): AuthAdmin) -> Json<Envelope<SessionInfo>> {
    session_info(claims)
}
