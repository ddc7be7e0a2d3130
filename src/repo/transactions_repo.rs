use crate::domain::contribution::{ContributionMethod, TransactionStatus};
use anyhow::Result;
use sqlx::{PgPool, Row};
use uuid::Uuid;

#[derive(Clone)]
pub struct TransactionsRepo {
    pub pool: PgPool,
}

pub struct TransactionRecordInput {
    pub transaction_id: Uuid,
    pub company_id: Uuid,
    pub church_id: Uuid,
    pub contributor_id: Uuid,
    pub contributor_name: String,
    pub idempotency_key: String,
    pub request_hash: String,
    pub amount_cents: i64,
    pub method: ContributionMethod,
    pub status: TransactionStatus,
    pub gateway_name: String,
    pub gateway_transaction_id: Option<String>,
    pub card_fingerprint: Option<String>,
    pub card_last_digits: Option<String>,
    pub pix_qr_code: Option<String>,
    pub pix_qr_code_image: Option<String>,
    pub boleto_url: Option<String>,
    pub boleto_digitable_line: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StoredTransaction {
    pub transaction_id: Uuid,
    pub company_id: Uuid,
    pub church_id: Uuid,
    pub contributor_id: Uuid,
    pub contributor_name: String,
    pub idempotency_key: String,
    pub request_hash: String,
    pub amount_cents: i64,
    pub payment_method: String,
    pub status: String,
    pub gateway_name: String,
    pub gateway_transaction_id: Option<String>,
    pub card_last_digits: Option<String>,
    pub pix_qr_code: Option<String>,
    pub pix_qr_code_image: Option<String>,
    pub boleto_url: Option<String>,
    pub boleto_digitable_line: Option<String>,
    pub refund_reason: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

const SELECT_COLUMNS: &str = r#"
    transaction_id, company_id, church_id, contributor_id, contributor_name,
    idempotency_key, request_hash, amount_cents, payment_method, status,
    gateway_name, gateway_transaction_id, card_last_digits, pix_qr_code,
    pix_qr_code_image, boleto_url, boleto_digitable_line, refund_reason,
    created_at, updated_at
"#;

fn map_row(r: sqlx::postgres::PgRow) -> StoredTransaction {
    StoredTransaction {
        transaction_id: r.get("transaction_id"),
        company_id: r.get("company_id"),
        church_id: r.get("church_id"),
        contributor_id: r.get("contributor_id"),
        contributor_name: r.get("contributor_name"),
        idempotency_key: r.get("idempotency_key"),
        request_hash: r.get("request_hash"),
        amount_cents: r.get("amount_cents"),
        payment_method: r.get("payment_method"),
        status: r.get("status"),
        gateway_name: r.get("gateway_name"),
        gateway_transaction_id: r.get("gateway_transaction_id"),
        card_last_digits: r.get("card_last_digits"),
        pix_qr_code: r.get("pix_qr_code"),
        pix_qr_code_image: r.get("pix_qr_code_image"),
        boleto_url: r.get("boleto_url"),
        boleto_digitable_line: r.get("boleto_digitable_line"),
        refund_reason: r.get("refund_reason"),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

impl TransactionsRepo {
    pub async fn insert(&self, input: &TransactionRecordInput) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO transactions (
                transaction_id, company_id, church_id, contributor_id, contributor_name,
                idempotency_key, request_hash, amount_cents, payment_method, status,
                gateway_name, gateway_transaction_id, card_fingerprint, card_last_digits,
                pix_qr_code, pix_qr_code_image, boleto_url, boleto_digitable_line
            ) VALUES (
                $1, $2, $3, $4, $5,
                $6, $7, $8, $9, $10,
                $11, $12, $13, $14,
                $15, $16, $17, $18
            )
            "#,
        )
        .bind(input.transaction_id)
        .bind(input.company_id)
        .bind(input.church_id)
        .bind(input.contributor_id)
        .bind(&input.contributor_name)
        .bind(&input.idempotency_key)
        .bind(&input.request_hash)
        .bind(input.amount_cents)
        .bind(input.method.as_str())
        .bind(input.status.as_str())
        .bind(&input.gateway_name)
        .bind(&input.gateway_transaction_id)
        .bind(&input.card_fingerprint)
        .bind(&input.card_last_digits)
        .bind(&input.pix_qr_code)
        .bind(&input.pix_qr_code_image)
        .bind(&input.boleto_url)
        .bind(&input.boleto_digitable_line)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_id(&self, transaction_id: Uuid) -> Result<Option<StoredTransaction>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE transaction_id = $1"
        ))
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_row))
    }

    pub async fn find_by_gateway_transaction_id(
        &self,
        gateway_transaction_id: &str,
    ) -> Result<Option<StoredTransaction>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE gateway_transaction_id = $1"
        ))
        .bind(gateway_transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_row))
    }

    pub async fn find_by_idempotency(
        &self,
        company_id: Uuid,
        idempotency_key: &str,
    ) -> Result<Option<StoredTransaction>> {
        let row = sqlx::query(&format!(
            "SELECT {SELECT_COLUMNS} FROM transactions WHERE company_id = $1 AND idempotency_key = $2"
        ))
        .bind(company_id)
        .bind(idempotency_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(map_row))
    }

    /// Moves a transaction between statuses only if it is still in the
    /// expected one, so racing updaters (webhook, manual sync, worker) cannot
    /// apply a transition the state machine already ruled out.
    pub async fn update_status(
        &self,
        transaction_id: Uuid,
        expected: TransactionStatus,
        next: TransactionStatus,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE transactions SET status = $3, updated_at = now() WHERE transaction_id = $1 AND status = $2",
        )
        .bind(transaction_id)
        .bind(expected.as_str())
        .bind(next.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn set_refund_reason(&self, transaction_id: Uuid, reason: &str) -> Result<()> {
        sqlx::query(
            "UPDATE transactions SET refund_reason = $2, updated_at = now() WHERE transaction_id = $1",
        )
        .bind(transaction_id)
        .bind(reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn list_unresolved(
        &self,
        grace_secs: i64,
        limit: i64,
    ) -> Result<Vec<StoredTransaction>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM transactions
            WHERE status = 'PENDING'
              AND gateway_transaction_id IS NOT NULL
              AND updated_at <= now() - ($1 * interval '1 second')
            ORDER BY updated_at ASC
            LIMIT $2
            "#
        ))
        .bind(grace_secs)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(map_row).collect())
    }
}
