use crate::AppState;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

// ChangeType 1 is a payment status change; other values (fraud analysis,
// recurrence events) are acknowledged and ignored.
const CHANGE_TYPE_STATUS: i32 = 1;

#[derive(Debug, Deserialize)]
pub struct ProviderNotification {
    #[serde(rename = "PaymentId")]
    pub payment_id: String,
    #[serde(rename = "ChangeType")]
    pub change_type: i32,
}

/// Always acknowledges with 200, even on internal failure: the provider
/// retries unacknowledged notifications aggressively and the pending-sync
/// worker will pick up anything missed here.
pub async fn provider_callback(
    State(state): State<AppState>,
    Json(notification): Json<ProviderNotification>,
) -> impl IntoResponse {
    if notification.change_type == CHANGE_TYPE_STATUS {
        if let Err(e) = state
            .contribution_service
            .handle_notification(&notification.payment_id)
            .await
        {
            tracing::error!(
                "notification handling failed for payment {}: {e}",
                notification.payment_id
            );
        }
    }

    (axum::http::StatusCode::OK, Json(serde_json::json!({"received": true})))
}
