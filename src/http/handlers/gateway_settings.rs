use crate::repo::gateway_config_repo::GatewayConfigInput;
use crate::AppState;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Settings view for the admin screen. Merchant keys are write-only: the
/// view reports whether each one is set, never its value.
#[derive(Debug, Serialize)]
pub struct GatewaySettingsView {
    pub company_id: Uuid,
    pub gateway_name: String,
    pub is_active: bool,
    pub environment: String,
    pub prod_merchant_id: Option<String>,
    pub prod_merchant_key_set: bool,
    pub dev_merchant_id: Option<String>,
    pub dev_merchant_key_set: bool,
    pub certificate_set: bool,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn get_settings(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
) -> impl IntoResponse {
    match state.gateway_config_repo.find_for_company(company_id).await {
        Ok(Some(row)) => (
            axum::http::StatusCode::OK,
            Json(GatewaySettingsView {
                company_id: row.company_id,
                gateway_name: row.gateway_name,
                is_active: row.is_active,
                environment: row.environment,
                prod_merchant_id: row.prod_merchant_id,
                prod_merchant_key_set: row.prod_merchant_key.is_some(),
                dev_merchant_id: row.dev_merchant_id,
                dev_merchant_key_set: row.dev_merchant_key.is_some(),
                certificate_set: row.certificate.is_some(),
                updated_at: row.updated_at,
            }),
        )
            .into_response(),
        Ok(None) => (
            axum::http::StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "gateway is not configured for this company"})),
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
pub struct UpdateSettingsRequest {
    pub gateway_name: String,
    pub is_active: bool,
    pub environment: String,
    pub prod_merchant_id: Option<String>,
    pub prod_merchant_key: Option<String>,
    pub dev_merchant_id: Option<String>,
    pub dev_merchant_key: Option<String>,
    pub certificate: Option<String>,
    pub certificate_key: Option<String>,
}

pub async fn update_settings(
    State(state): State<AppState>,
    Path(company_id): Path<Uuid>,
    Json(req): Json<UpdateSettingsRequest>,
) -> impl IntoResponse {
    let input = GatewayConfigInput {
        company_id,
        gateway_name: req.gateway_name,
        is_active: req.is_active,
        environment: req.environment,
        prod_merchant_id: req.prod_merchant_id,
        prod_merchant_key: req.prod_merchant_key,
        dev_merchant_id: req.dev_merchant_id,
        dev_merchant_key: req.dev_merchant_key,
        certificate: req.certificate,
        certificate_key: req.certificate_key,
    };

    match state.gateway_config_repo.upsert(&input).await {
        Ok(()) => {
            // Cached credentials must not outlive a settings edit.
            state.config_resolver.invalidate(company_id).await;
            (axum::http::StatusCode::OK, Json(serde_json::json!({"updated": true}))).into_response()
        }
        Err(e) => (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}
