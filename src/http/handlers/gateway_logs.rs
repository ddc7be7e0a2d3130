use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use uuid::Uuid;

/// Audit trail for one contribution, newest last. Bodies are already
/// sanitized at write time, so this view can be exposed to support staff.
pub async fn list_contribution_logs(
    State(state): State<AppState>,
    Path(transaction_id): Path<Uuid>,
) -> impl IntoResponse {
    let tx = match state.transactions_repo.find_by_id(transaction_id).await {
        Ok(Some(tx)) => tx,
        Ok(None) => {
            return (
                axum::http::StatusCode::NOT_FOUND,
                Json(serde_json::json!({"error": "transaction not found"})),
            )
                .into_response()
        }
        Err(e) => {
            return (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response()
        }
    };

    let Some(payment_id) = tx.gateway_transaction_id else {
        return (axum::http::StatusCode::OK, Json(serde_json::json!([]))).into_response();
    };

    match state.gateway_log_repo.list_for_payment(&payment_id).await {
        Ok(items) => (axum::http::StatusCode::OK, Json(items)).into_response(),
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
