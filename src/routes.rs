// routes.rs
use std::sync::Arc;

use axum::{middleware, routing::{get, post}, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    handler::{gifts, payouts, usage, wallet},
    middleware::auth,
    AppState,
};

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "message": "Server is running"
    }))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let protected_routes = Router::new()
        .route("/wallet", get(wallet::get_balance))
        .route("/wallet/purchase", post(wallet::purchase_credits))
        .route("/wallet/transactions", get(wallet::get_transaction_history))
        .route("/gifts/send", post(gifts::send_gift))
        .route("/payouts", post(payouts::request_payout).get(payouts::get_payout_history))
        .route("/payouts/:payout_id", get(payouts::get_payout_request))
        .route("/usage", get(usage::get_usage_status))
        .route("/usage/can-perform", get(usage::can_perform_action))
        .route("/usage/actions", post(usage::record_action))
        .route("/messages/:recipient_id/can-send", get(usage::can_send_message))
        .route("/messages/:recipient_id", post(usage::record_message))
        .route("/messages/:peer_id/reply", post(usage::record_reply))
        .layer(middleware::from_fn(auth));

    let public_routes = Router::new()
        .route("/gifts", get(gifts::get_catalog))
        .route("/payouts/currencies", get(payouts::get_currencies))
        .route("/payouts/webhook", post(payouts::payout_webhook));

    let api_route = Router::new()
        .merge(protected_routes)
        .merge(public_routes)
        .layer(TraceLayer::new_for_http())
        .layer(Extension(app_state));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_route)
}
