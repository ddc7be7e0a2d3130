use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct GatewayLogRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct NewGatewayLog {
    pub company_id: Uuid,
    pub direction: String,
    pub operation: String,
    pub http_method: String,
    pub endpoint: String,
    pub gateway_payment_id: Option<String>,
    pub body: Option<serde_json::Value>,
    pub http_status: Option<i32>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredGatewayLog {
    pub id: i64,
    pub company_id: Uuid,
    pub direction: String,
    pub operation: String,
    pub http_method: String,
    pub endpoint: String,
    pub gateway_payment_id: Option<String>,
    pub body: Option<serde_json::Value>,
    pub http_status: Option<i32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl GatewayLogRepo {
    pub async fn insert(&self, entry: &NewGatewayLog) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO gateway_logs (company_id, direction, operation, http_method, endpoint, gateway_payment_id, body, http_status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.company_id)
        .bind(&entry.direction)
        .bind(&entry.operation)
        .bind(&entry.http_method)
        .bind(&entry.endpoint)
        .bind(&entry.gateway_payment_id)
        .bind(&entry.body)
        .bind(entry.http_status)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_for_payment(&self, gateway_payment_id: &str) -> Result<Vec<StoredGatewayLog>> {
        let rows = sqlx::query(
            r#"
            SELECT id, company_id, direction, operation, http_method, endpoint, gateway_payment_id, body, http_status, created_at
            FROM gateway_logs
            WHERE gateway_payment_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(gateway_payment_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| StoredGatewayLog {
                id: r.get("id"),
                company_id: r.get("company_id"),
                direction: r.get("direction"),
                operation: r.get("operation"),
                http_method: r.get("http_method"),
                endpoint: r.get("endpoint"),
                gateway_payment_id: r.get("gateway_payment_id"),
                body: r.get("body"),
                http_status: r.get("http_status"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}
