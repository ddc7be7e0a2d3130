use crate::domain::contribution::CreateContributionRequest;
use crate::AppState;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub async fn create_contribution(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateContributionRequest>,
) -> impl IntoResponse {
    match state.contribution_service.create(req, headers).await {
        Ok(resp) => (axum::http::StatusCode::OK, Json(resp)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

#[derive(Debug, Serialize)]
pub struct TransactionView {
    pub transaction_id: Uuid,
    pub company_id: Uuid,
    pub church_id: Uuid,
    pub contributor_id: Uuid,
    pub contributor_name: String,
    pub amount_cents: i64,
    pub payment_method: String,
    pub status: String,
    pub gateway_name: String,
    pub gateway_payment_id: Option<String>,
    pub card_last_digits: Option<String>,
    pub pix_qr_code: Option<String>,
    pub boleto_url: Option<String>,
    pub boleto_digitable_line: Option<String>,
    pub refund_reason: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_contribution(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.transactions_repo.find_by_id(transaction_id).await {
        Ok(Some(tx)) => (
            axum::http::StatusCode::OK,
            Json(TransactionView {
                transaction_id: tx.transaction_id,
                company_id: tx.company_id,
                church_id: tx.church_id,
                contributor_id: tx.contributor_id,
                contributor_name: tx.contributor_name,
                amount_cents: tx.amount_cents,
                payment_method: tx.payment_method,
                status: tx.status,
                gateway_name: tx.gateway_name,
                gateway_payment_id: tx.gateway_transaction_id,
                card_last_digits: tx.card_last_digits,
                pix_qr_code: tx.pix_qr_code,
                boleto_url: tx.boleto_url,
                boleto_digitable_line: tx.boleto_digitable_line,
                refund_reason: tx.refund_reason,
                created_at: tx.created_at,
                updated_at: tx.updated_at,
            }),
        )
            .into_response(),
        Ok(None) => (
            axum::http::StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "transaction not found"})),
        )
            .into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

pub async fn cancel_contribution(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
    Json(req): Json<CancelRequest>,
) -> impl IntoResponse {
    match state.contribution_service.cancel(transaction_id, req.reason).await {
        Ok(view) => (axum::http::StatusCode::OK, Json(view)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

pub async fn sync_contribution(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.contribution_service.sync(transaction_id).await {
        Ok(view) => (axum::http::StatusCode::OK, Json(view)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}
