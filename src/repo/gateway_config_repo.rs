use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct GatewayConfigRepo {
    pub pool: PgPool,
}

#[derive(Debug, Clone)]
pub struct GatewayConfigRow {
    pub company_id: Uuid,
    pub gateway_name: String,
    pub is_active: bool,
    pub environment: String,
    pub prod_merchant_id: Option<String>,
    pub prod_merchant_key: Option<String>,
    pub dev_merchant_id: Option<String>,
    pub dev_merchant_key: Option<String>,
    pub certificate: Option<String>,
    pub certificate_key: Option<String>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub struct GatewayConfigInput {
    pub company_id: Uuid,
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

impl GatewayConfigRepo {
    pub async fn find_for_company(&self, company_id: Uuid) -> Result<Option<GatewayConfigRow>> {
        let row = sqlx::query(
            r#"
            SELECT company_id, gateway_name, is_active, environment,
                   prod_merchant_id, prod_merchant_key, dev_merchant_id, dev_merchant_key,
                   certificate, certificate_key, updated_at
            FROM gateway_configurations
            WHERE company_id = $1
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| GatewayConfigRow {
            company_id: r.get("company_id"),
            gateway_name: r.get("gateway_name"),
            is_active: r.get("is_active"),
            environment: r.get("environment"),
            prod_merchant_id: r.get("prod_merchant_id"),
            prod_merchant_key: r.get("prod_merchant_key"),
            dev_merchant_id: r.get("dev_merchant_id"),
            dev_merchant_key: r.get("dev_merchant_key"),
            certificate: r.get("certificate"),
            certificate_key: r.get("certificate_key"),
            updated_at: r.get("updated_at"),
        }))
    }

    pub async fn upsert(&self, input: &GatewayConfigInput) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO gateway_configurations (
                company_id, gateway_name, is_active, environment,
                prod_merchant_id, prod_merchant_key, dev_merchant_id, dev_merchant_key,
                certificate, certificate_key
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (company_id) DO UPDATE SET
                gateway_name = EXCLUDED.gateway_name,
                is_active = EXCLUDED.is_active,
                environment = EXCLUDED.environment,
                prod_merchant_id = EXCLUDED.prod_merchant_id,
                prod_merchant_key = EXCLUDED.prod_merchant_key,
                dev_merchant_id = EXCLUDED.dev_merchant_id,
                dev_merchant_key = EXCLUDED.dev_merchant_key,
                certificate = EXCLUDED.certificate,
                certificate_key = EXCLUDED.certificate_key,
                updated_at = now()
            "#,
        )
        .bind(input.company_id)
        .bind(&input.gateway_name)
        .bind(input.is_active)
        .bind(&input.environment)
        .bind(&input.prod_merchant_id)
        .bind(&input.prod_merchant_key)
        .bind(&input.dev_merchant_id)
        .bind(&input.dev_merchant_key)
        .bind(&input.certificate)
        .bind(&input.certificate_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
