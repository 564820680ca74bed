//! Faucet handlers: payout tiers, faucet screen, claim callback.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::api::dto::{CallbackRequest, ClaimResponse, ScreenRequest, ScreenResponse, TiersResponse};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, FaucetError};
use crate::service::ClaimCallback;

/// `GET /faucet/tiers` — Payout per level.
#[utoipa::path(
    get,
    path = "/api/v1/faucet/tiers",
    tag = "Faucet",
    summary = "List payout tiers",
    description = "Returns the payout table ordered by level, with the claim cooldown.",
    responses(
        (status = 200, description = "Payout table", body = TiersResponse),
    )
)]
pub async fn list_tiers(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.faucet_service;
    Json(TiersResponse::new(
        service.payout_table(),
        service.renderer().currency(),
        service.policy().cooldown().num_seconds(),
    ))
}

/// `POST /faucet/screen` — Show the faucet screen in a chat.
///
/// # Errors
///
/// Returns [`FaucetError::NotRegistered`] for unknown users and
/// [`FaucetError::PersistenceError`] if the store is unavailable.
#[utoipa::path(
    post,
    path = "/api/v1/faucet/screen",
    tag = "Faucet",
    summary = "Show faucet screen",
    description = "Sends the user's faucet stats, the level table and a Claim button \
                   to the chat, and returns the stats.",
    request_body = ScreenRequest,
    responses(
        (status = 200, description = "Screen delivered", body = ScreenResponse),
        (status = 404, description = "User not registered", body = ErrorResponse),
        (status = 503, description = "Store unavailable", body = ErrorResponse),
    )
)]
pub async fn show_screen(
    State(state): State<AppState>,
    Json(req): Json<ScreenRequest>,
) -> Result<Json<ScreenResponse>, FaucetError> {
    let screen = state
        .faucet_service
        .show_faucet_screen(req.chat_id, req.telegram_id)
        .await?;
    Ok(Json(ScreenResponse::from(screen)))
}

/// `POST /faucet/callback` — Handle a Claim button press.
///
/// # Errors
///
/// Returns [`FaucetError::InvalidRequest`] if the callback data is not a
/// faucet claim, or the claim's fault otherwise.
#[utoipa::path(
    post,
    path = "/api/v1/faucet/callback",
    tag = "Faucet",
    summary = "Claim from the faucet",
    description = "Runs a claim for the user who pressed the Claim button and answers \
                   the callback with a pop-up. Ineligible and unregistered claims are \
                   successful responses with a non-`claimed` status.",
    request_body = CallbackRequest,
    responses(
        (status = 200, description = "Claim processed", body = ClaimResponse),
        (status = 400, description = "Not a faucet callback", body = ErrorResponse),
        (status = 500, description = "User level outside the payout table", body = ErrorResponse),
        (status = 503, description = "Store unavailable, nothing written", body = ErrorResponse),
    )
)]
pub async fn handle_callback(
    State(state): State<AppState>,
    Json(req): Json<CallbackRequest>,
) -> Result<Json<ClaimResponse>, FaucetError> {
    let callback = ClaimCallback {
        callback_id: req.callback_id,
        telegram_id: req.telegram_id,
        chat_id: req.chat_id,
        data: req.data,
    };
    let reply = state.faucet_service.handle_claim_action(&callback).await?;
    Ok(Json(ClaimResponse::from(reply)))
}

/// Faucet routes, mounted under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/faucet/tiers", get(list_tiers))
        .route("/faucet/screen", post(show_screen))
        .route("/faucet/callback", post(handle_callback))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use rust_decimal::Decimal;
    use tower::ServiceExt;

    use super::*;
    use crate::clock::{Clock, SystemClock};
    use crate::config::FaucetConfig;
    use crate::domain::TelegramId;
    use crate::persistence::{FaucetStore, MemoryStore};

    async fn app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let Ok(_) = store.register(TelegramId::new(1), 2, Decimal::ZERO).await else {
            panic!("registration failed");
        };
        let Ok(state) = AppState::from_parts(
            Arc::clone(&store) as Arc<dyn FaucetStore>,
            Arc::new(SystemClock) as Arc<dyn Clock>,
            &FaucetConfig::default(),
        ) else {
            panic!("default config is valid");
        };
        (crate::api::build_router().with_state(state), store)
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()));
        let Ok(request) = request else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        let status = response.status();
        let Ok(bytes) = to_bytes(response.into_body(), 1 << 20).await else {
            panic!("readable body");
        };
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    fn field<'a>(json: &'a serde_json::Value, path: &str) -> Option<&'a serde_json::Value> {
        json.pointer(path)
    }

    #[tokio::test]
    async fn tiers_lists_reference_table() {
        let (app, _) = app().await;
        let (status, json) =
            send(app, "GET", "/api/v1/faucet/tiers", serde_json::Value::Null).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(field(&json, "/cooldown_seconds"), Some(&serde_json::json!(3600)));
        assert_eq!(field(&json, "/tiers/0/name"), Some(&serde_json::json!("Stone")));
        assert_eq!(field(&json, "/tiers/7/amount"), Some(&serde_json::json!("15.000")));
    }

    #[tokio::test]
    async fn callback_claims_then_reports_cooldown() {
        let (app, _) = app().await;
        let body = serde_json::json!({
            "callback_id": "q1",
            "telegram_id": 1,
            "chat_id": 1,
            "data": "faucet_claim",
        });

        let (status, json) =
            send(app.clone(), "POST", "/api/v1/faucet/callback", body.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(field(&json, "/status"), Some(&serde_json::json!("claimed")));
        assert_eq!(field(&json, "/amount"), Some(&serde_json::json!("0.005")));

        let (status, json) = send(app, "POST", "/api/v1/faucet/callback", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(field(&json, "/status"), Some(&serde_json::json!("ineligible")));
        assert!(field(&json, "/remaining_seconds").is_some());
    }

    #[tokio::test]
    async fn callback_for_unknown_user_is_not_registered() {
        let (app, store) = app().await;
        let body = serde_json::json!({
            "callback_id": "q2",
            "telegram_id": 404,
            "chat_id": 404,
            "data": "faucet_claim",
        });
        let (status, json) = send(app, "POST", "/api/v1/faucet/callback", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(field(&json, "/status"), Some(&serde_json::json!("not_registered")));
        assert_eq!(store.ledger_len().await, 0);
    }

    #[tokio::test]
    async fn foreign_callback_is_bad_request() {
        let (app, _) = app().await;
        let body = serde_json::json!({
            "callback_id": "q3",
            "telegram_id": 1,
            "chat_id": 1,
            "data": "wallet_deposit",
        });
        let (status, json) = send(app, "POST", "/api/v1/faucet/callback", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(field(&json, "/error/code"), Some(&serde_json::json!(1001)));
    }

    #[tokio::test]
    async fn screen_for_unknown_user_is_404() {
        let (app, _) = app().await;
        let body = serde_json::json!({"telegram_id": 9, "chat_id": 9});
        let (status, json) = send(app, "POST", "/api/v1/faucet/screen", body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(field(&json, "/error/code"), Some(&serde_json::json!(2001)));
    }

    #[tokio::test]
    async fn store_outage_is_503() {
        let (app, store) = app().await;
        store.set_unavailable(true);
        let body = serde_json::json!({"telegram_id": 1, "chat_id": 1});
        let (status, _) = send(app, "POST", "/api/v1/faucet/screen", body).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
