use crate::auth;
use crate::state::AppState;
use axum::Json;
use axum::Router;
use axum::routing::{get, post};
use serde::Serialize;
use tower_http::cors::CorsLayer;

#[derive(Debug, Serialize)]
struct HealthResponse {
    service: &'static str,
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct VersionResponse {
    service: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        service: "auth-service",
        status: "ok",
    })
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "auth-service",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/api/auth/nonce", get(auth::investor_nonce))
        .route("/api/auth/login", post(auth::investor_login))
        .route("/api/auth/me", get(auth::investor_me))
        .route("/api/farmer/auth/nonce", get(auth::farmer_nonce))
        .route("/api/farmer/auth/login", post(auth::farmer_login))
        .route("/api/farmer/auth/me", get(auth::farmer_me))
        .route("/api/admin/auth/nonce", get(auth::admin_nonce))
        .route("/api/admin/auth/login", post(auth::admin_login))
        .route("/api/admin/auth/me", get(auth::admin_me))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use af_auth_core::{
        AdminUser, AuthService, MemoryAdminRepository, MemoryFarmerRepository,
        MemoryInvestorRepository, NonceStore, RateLimiter, SessionIssuer,
    };
    use af_crypto::{Eip712Domain, SignatureVerifier, address_from_verifying_key};
    use af_store::MemoryTtlStore;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use k256::ecdsa::SigningKey;
    use rand::rngs::OsRng;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_domain() -> Eip712Domain {
        Eip712Domain {
            name: "AgriFund".to_owned(),
            version: "1".to_owned(),
            chain_id: 5000,
        }
    }

    struct Harness {
        app: Router,
        admins: Arc<MemoryAdminRepository>,
        key: SigningKey,
        wallet: String,
    }

    fn harness() -> Harness {
        let store: Arc<MemoryTtlStore> = Arc::new(MemoryTtlStore::new());
        let admins = Arc::new(MemoryAdminRepository::new());

        let service = AuthService::new(
            NonceStore::new(store.clone(), Duration::from_secs(300)),
            RateLimiter::new(store, Duration::from_secs(900), 5),
            SignatureVerifier::new(test_domain()),
            SessionIssuer::new("test-session-secret", Duration::from_secs(3600)),
            Arc::new(MemoryInvestorRepository::new()),
            Arc::new(MemoryFarmerRepository::new()),
            admins.clone(),
        );

        let key = SigningKey::random(&mut OsRng);
        let wallet = address_from_verifying_key(key.verifying_key()).to_string();

        Harness {
            app: router(AppState::for_tests(service)),
            admins,
            key,
            wallet,
        }
    }

    fn sign(key: &SigningKey, message: &str) -> String {
        let digest = test_domain().login_digest(message);
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(&digest)
            .expect("signing should succeed");
        let mut raw = signature.to_bytes().to_vec();
        raw.push(recovery_id.to_byte() + 27);
        format!("0x{}", hex::encode(raw))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("request should complete");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body should be JSON")
        };
        (status, body)
    }

    fn get(path: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("request builds")
    }

    fn get_with_token(path: &str, token: &str) -> Request<Body> {
        Request::builder()
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("request builds")
    }

    fn post_json(path: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request builds")
    }

    async fn fetch_nonce(h: &Harness, base: &str) -> (String, String) {
        let (status, body) = send(
            &h.app,
            get(&format!("{base}/nonce?wallet_address={}", h.wallet)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let nonce = body["data"]["nonce"].as_str().expect("nonce").to_owned();
        let message = body["data"]["message"]
            .as_str()
            .expect("message")
            .to_owned();
        (nonce, message)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let h = harness();
        let (status, body) = send(&h.app, get("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn investor_login_round_trip_over_http() {
        let h = harness();
        let (nonce, message) = fetch_nonce(&h, "/api/auth").await;
        let signature = sign(&h.key, &message);

        let (status, body) = send(
            &h.app,
            post_json(
                "/api/auth/login",
                &json!({
                    "wallet_address": h.wallet,
                    "signature": signature,
                    "nonce": nonce,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["data"]["investor"]["wallet_address"], h.wallet);

        let token = body["data"]["token"].as_str().expect("token");
        let (status, body) = send(&h.app, get_with_token("/api/auth/me", token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["wallet_address"], h.wallet);
        assert_eq!(body["data"]["role"], "investor");
    }

    #[tokio::test]
    async fn nonce_rejects_malformed_wallet() {
        let h = harness();
        let (status, body) = send(&h.app, get("/api/auth/nonce?wallet_address=nonsense")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn login_with_bad_signature_is_unauthorized() {
        let h = harness();
        let (nonce, message) = fetch_nonce(&h, "/api/auth").await;
        let other_key = SigningKey::random(&mut OsRng);
        let signature = sign(&other_key, &message);

        let (status, body) = send(
            &h.app,
            post_json(
                "/api/auth/login",
                &json!({
                    "wallet_address": h.wallet,
                    "signature": signature,
                    "nonce": nonce,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn me_requires_a_bearer_header() {
        let h = harness();
        let (status, _) = send(&h.app, get("/api/auth/me")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn investor_token_is_rejected_by_admin_me() {
        let h = harness();
        let (nonce, message) = fetch_nonce(&h, "/api/auth").await;
        let signature = sign(&h.key, &message);
        let (status, body) = send(
            &h.app,
            post_json(
                "/api/auth/login",
                &json!({
                    "wallet_address": h.wallet,
                    "signature": signature,
                    "nonce": nonce,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let token = body["data"]["token"].as_str().expect("token").to_owned();

        let (status, _) = send(&h.app, get_with_token("/api/admin/auth/me", &token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&h.app, get_with_token("/api/farmer/auth/me", &token)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_login_flow_over_http() {
        let h = harness();
        h.admins
            .insert(AdminUser {
                id: "admin-1".to_owned(),
                wallet_address: h.wallet.clone(),
                role: "super_admin".to_owned(),
                is_active: true,
            })
            .await;

        let (nonce, message) = fetch_nonce(&h, "/api/admin/auth").await;
        let signature = sign(&h.key, &message);
        let (status, body) = send(
            &h.app,
            post_json(
                "/api/admin/auth/login",
                &json!({
                    "wallet_address": h.wallet,
                    "signature": signature,
                    "nonce": nonce,
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["admin"]["role"], "super_admin");

        let token = body["data"]["token"].as_str().expect("token");
        let (status, body) = send(&h.app, get_with_token("/api/admin/auth/me", token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["role"], "super_admin");
    }

    #[tokio::test]
    async fn repeated_failures_return_too_many_requests() {
        let h = harness();
        let (_, message) = fetch_nonce(&h, "/api/auth").await;
        let signature = sign(&h.key, &message);

        for _ in 0..5 {
            let (status, _) = send(
                &h.app,
                post_json(
                    "/api/auth/login",
                    &json!({
                        "wallet_address": h.wallet,
                        "signature": signature,
                        "nonce": "wrong-nonce",
                    }),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
        }

        let (status, body) = send(
            &h.app,
            post_json(
                "/api/auth/login",
                &json!({
                    "wallet_address": h.wallet,
                    "signature": signature,
                    "nonce": "wrong-nonce",
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["status"], "error");
        assert!(body["retry_after_seconds"].as_u64().is_some());
    }
}
