use crate::domain::card;
use crate::domain::contribution::{
    ContributionInstrument, ContributionMethod, ContributionStatusView,
    CreateContributionRequest, CreateContributionResponse, ErrorEnvelope, ErrorPayload,
    TransactionStatus,
};
use crate::domain::status::{apply_reported, is_terminal, StatusDecision};
use crate::gateways::cielo::CieloClient;
use crate::gateways::mock::MockProvider;
use crate::gateways::{
    BoletoChargeRequest, CardChargeRequest, GatewayError, PaymentProvider, PixChargeRequest,
};
use crate::repo::gateway_log_repo::GatewayLogRepo;
use crate::repo::transactions_repo::{StoredTransaction, TransactionRecordInput, TransactionsRepo};
use crate::service::config_resolver::{GatewayConfigResolver, ResolvedGateway};
use crate::service::gateway_logger::GatewayLogger;
use axum::http::HeaderMap;
use axum::http::StatusCode;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ContributionService {
    pub pool: PgPool,
    pub transactions_repo: TransactionsRepo,
    pub log_repo: GatewayLogRepo,
    pub config_resolver: GatewayConfigResolver,
    pub http_client: reqwest::Client,
    pub gateway_timeout_ms: u64,
    pub boleto_expiration_days: i64,
}

impl ContributionService {
    pub async fn create(
        &self,
        req: CreateContributionRequest,
        headers: HeaderMap,
    ) -> Result<CreateContributionResponse, (StatusCode, ErrorEnvelope)> {
        validate_request(&req)?;

        let idempotency_key = headers
            .get("Idempotency-Key")
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| {
                (
                    StatusCode::BAD_REQUEST,
                    err("MISSING_IDEMPOTENCY_KEY", "Idempotency-Key header is required"),
                )
            })?;

        let request_hash = hash_request(&req);
        if let Some(found) = self
            .transactions_repo
            .find_by_idempotency(req.company_id, &idempotency_key)
            .await
            .map_err(internal)?
        {
            if found.request_hash != request_hash {
                return Err((
                    StatusCode::CONFLICT,
                    err(
                        "IDEMPOTENCY_KEY_REUSED_WITH_DIFFERENT_PAYLOAD",
                        "payload does not match original request",
                    ),
                ));
            }
            return Ok(replay_response(&found));
        }

        let resolved = self
            .config_resolver
            .resolve(req.company_id)
            .await
            .map_err(gateway_err)?;
        let provider = self.provider_for(&resolved);

        let transaction_id = Uuid::new_v4();
        let order_id = transaction_id.to_string();

        let mut input = TransactionRecordInput {
            transaction_id,
            company_id: req.company_id,
            church_id: req.church_id,
            contributor_id: req.contributor_id,
            contributor_name: req.contributor_name.clone(),
            idempotency_key,
            request_hash,
            amount_cents: req.amount_cents,
            method: req.method,
            status: TransactionStatus::Pending,
            gateway_name: resolved.gateway_name.clone(),
            gateway_transaction_id: None,
            card_fingerprint: None,
            card_last_digits: None,
            pix_qr_code: None,
            pix_qr_code_image: None,
            boleto_url: None,
            boleto_digitable_line: None,
        };

        match req.method {
            ContributionMethod::Pix => {
                let charge = provider
                    .create_pix(PixChargeRequest {
                        order_id,
                        payer_name: req.contributor_name.clone(),
                        amount_cents: req.amount_cents,
                    })
                    .await
                    .map_err(gateway_err)?;
                input.status = charge.status;
                input.gateway_transaction_id = Some(charge.payment_id);
                input.pix_qr_code = charge.qr_code;
                input.pix_qr_code_image = charge.qr_code_image;
            }
            ContributionMethod::CreditCard => {
                let ContributionInstrument::CreditCard(card_input) = &req.instrument else {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        err("INVALID_INSTRUMENT", "instrument does not match payment method"),
                    ));
                };
                if !card::luhn_valid(&card_input.number) {
                    return Err((
                        StatusCode::BAD_REQUEST,
                        err("INVALID_CARD_NUMBER", "card number failed validation"),
                    ));
                }
                let brand = card::detect_brand(&card_input.number).ok_or_else(|| {
                    (
                        StatusCode::BAD_REQUEST,
                        err("UNSUPPORTED_CARD_BRAND", "could not determine the card brand"),
                    )
                })?;

                let charge = provider
                    .create_credit_card(CardChargeRequest {
                        order_id,
                        payer_name: req.contributor_name.clone(),
                        amount_cents: req.amount_cents,
                        installments: card_input.installments.max(1),
                        card_number: card::digits_of(&card_input.number),
                        holder: card_input.holder.clone(),
                        expiration: format!("{:02}/{}", card_input.exp_month, card_input.exp_year),
                        security_code: card_input.security_code.clone(),
                        brand: brand.as_str(),
                    })
                    .await
                    .map_err(gateway_err)?;
                input.status = charge.status;
                input.gateway_transaction_id = Some(charge.payment_id);
                input.card_fingerprint = Some(card::fingerprint(&card_input.number));
                input.card_last_digits = Some(card::last_digits(&card_input.number));
            }
            ContributionMethod::Boleto => {
                let charge = provider
                    .create_boleto(BoletoChargeRequest {
                        order_id,
                        payer_name: req.contributor_name.clone(),
                        amount_cents: req.amount_cents,
                        expiration_days: self.boleto_expiration_days,
                    })
                    .await
                    .map_err(gateway_err)?;
                input.status = charge.status;
                input.gateway_transaction_id = Some(charge.payment_id);
                input.boleto_url = charge.url;
                input.boleto_digitable_line = charge.digitable_line;
            }
        }

        self.transactions_repo.insert(&input).await.map_err(internal)?;

        Ok(CreateContributionResponse {
            transaction_id,
            status: input.status,
            method: req.method,
            gateway_payment_id: input.gateway_transaction_id,
            pix_qr_code: input.pix_qr_code,
            pix_qr_code_image: input.pix_qr_code_image,
            boleto_url: input.boleto_url,
            boleto_digitable_line: input.boleto_digitable_line,
        })
    }

    pub async fn cancel(
        &self,
        transaction_id: Uuid,
        reason: Option<String>,
    ) -> Result<ContributionStatusView, (StatusCode, ErrorEnvelope)> {
        let tx = self
            .transactions_repo
            .find_by_id(transaction_id)
            .await
            .map_err(internal)?
            .ok_or_else(not_found)?;

        let current = TransactionStatus::parse(&tx.status);
        if is_terminal(current) {
            return Err((
                StatusCode::CONFLICT,
                err("TRANSACTION_FINAL", "transaction is already in a final status"),
            ));
        }
        let payment_id = tx.gateway_transaction_id.clone().ok_or_else(|| {
            (
                StatusCode::CONFLICT,
                err("NOT_SUBMITTED", "transaction has no gateway payment to cancel"),
            )
        })?;

        let resolved = self
            .config_resolver
            .resolve(tx.company_id)
            .await
            .map_err(gateway_err)?;
        let provider = self.provider_for(&resolved);
        let snapshot = provider.void_payment(&payment_id).await.map_err(gateway_err)?;

        let status = match apply_reported(current, snapshot.status) {
            StatusDecision::Apply(next) => {
                let applied = self
                    .transactions_repo
                    .update_status(transaction_id, current, next)
                    .await
                    .map_err(internal)?;
                if !applied {
                    tracing::warn!("transaction {transaction_id} changed concurrently during cancel");
                }
                next
            }
            StatusDecision::Ignore => current,
        };

        if let Some(reason) = reason {
            self.transactions_repo
                .set_refund_reason(transaction_id, &reason)
                .await
                .map_err(internal)?;
        }

        Ok(ContributionStatusView {
            transaction_id,
            status,
            gateway_payment_id: Some(payment_id),
        })
    }

    pub async fn sync(
        &self,
        transaction_id: Uuid,
    ) -> Result<ContributionStatusView, (StatusCode, ErrorEnvelope)> {
        let tx = self
            .transactions_repo
            .find_by_id(transaction_id)
            .await
            .map_err(internal)?
            .ok_or_else(not_found)?;

        let payment_id = tx.gateway_transaction_id.clone().ok_or_else(|| {
            (
                StatusCode::CONFLICT,
                err("NOT_SUBMITTED", "transaction has no gateway payment to query"),
            )
        })?;

        let status = self.refresh(&tx, &payment_id).await.map_err(gateway_err)?;

        Ok(ContributionStatusView {
            transaction_id,
            status,
            gateway_payment_id: Some(payment_id),
        })
    }

    /// Webhook entry point. Shares the exact status-update path with `sync`:
    /// the notification only tells us *which* payment changed, the query API
    /// remains the source of truth for *what* it changed to.
    pub async fn handle_notification(&self, gateway_payment_id: &str) -> anyhow::Result<()> {
        let Some(tx) = self
            .transactions_repo
            .find_by_gateway_transaction_id(gateway_payment_id)
            .await?
        else {
            tracing::warn!("notification for unknown payment {gateway_payment_id}");
            return Ok(());
        };

        self.refresh(&tx, gateway_payment_id)
            .await
            .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Ok(())
    }

    /// One pass of the pending-sync worker. Per-item failures are logged and
    /// skipped so one broken tenant cannot stall the rest of the batch.
    pub async fn run_pending_sync(&self, grace_secs: i64, batch: i64) -> anyhow::Result<u32> {
        let due = self.transactions_repo.list_unresolved(grace_secs, batch).await?;
        let mut updated = 0u32;

        for tx in due {
            let Some(payment_id) = tx.gateway_transaction_id.clone() else {
                continue;
            };
            let before = TransactionStatus::parse(&tx.status);
            match self.refresh(&tx, &payment_id).await {
                Ok(after) if after != before => updated += 1,
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!("pending sync failed for transaction {}: {e}", tx.transaction_id);
                }
            }
        }

        Ok(updated)
    }

    async fn refresh(
        &self,
        tx: &StoredTransaction,
        payment_id: &str,
    ) -> Result<TransactionStatus, GatewayError> {
        let resolved = self.config_resolver.resolve(tx.company_id).await?;
        let provider = self.provider_for(&resolved);
        let snapshot = provider.query_payment(payment_id).await?;

        let current = TransactionStatus::parse(&tx.status);
        match apply_reported(current, snapshot.status) {
            StatusDecision::Apply(next) => {
                let applied = self
                    .transactions_repo
                    .update_status(tx.transaction_id, current, next)
                    .await
                    .map_err(|e| GatewayError::Storage(e.to_string()))?;
                if applied {
                    Ok(next)
                } else {
                    tracing::warn!(
                        "transaction {} changed concurrently, skipping status update",
                        tx.transaction_id
                    );
                    Ok(current)
                }
            }
            StatusDecision::Ignore => {
                if current != snapshot.status {
                    tracing::warn!(
                        "ignoring out-of-order status {} for transaction {} (currently {})",
                        snapshot.status.as_str(),
                        tx.transaction_id,
                        current.as_str()
                    );
                }
                Ok(current)
            }
        }
    }

    fn provider_for(&self, resolved: &ResolvedGateway) -> Arc<dyn PaymentProvider> {
        // Development tenants can point at the in-memory provider with a
        // gateway name like "mock" or "mock:ALWAYS_REFUSE".
        if let Some(rest) = resolved.gateway_name.strip_prefix("mock") {
            let behavior = rest.strip_prefix(':').unwrap_or("ALWAYS_APPROVE").to_string();
            return Arc::new(MockProvider { behavior });
        }

        let logger = GatewayLogger::database(self.log_repo.clone(), resolved.company_id);
        Arc::new(CieloClient::for_gateway(
            self.http_client.clone(),
            resolved,
            logger,
            self.gateway_timeout_ms,
        ))
    }
}

fn validate_request(
    req: &CreateContributionRequest,
) -> Result<(), (StatusCode, ErrorEnvelope)> {
    if req.amount_cents <= 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            err("INVALID_AMOUNT", "amount_cents must be > 0"),
        ));
    }
    if req.contributor_name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            err("INVALID_CONTRIBUTOR", "contributor_name is required"),
        ));
    }

    let consistent = matches!(
        (req.method, &req.instrument),
        (ContributionMethod::Pix, ContributionInstrument::Pix)
            | (ContributionMethod::CreditCard, ContributionInstrument::CreditCard(_))
            | (ContributionMethod::Boleto, ContributionInstrument::Boleto)
    );
    if !consistent {
        return Err((
            StatusCode::BAD_REQUEST,
            err("INVALID_INSTRUMENT", "instrument does not match payment method"),
        ));
    }

    Ok(())
}

fn replay_response(found: &StoredTransaction) -> CreateContributionResponse {
    CreateContributionResponse {
        transaction_id: found.transaction_id,
        status: TransactionStatus::parse(&found.status),
        method: ContributionMethod::parse(&found.payment_method),
        gateway_payment_id: found.gateway_transaction_id.clone(),
        pix_qr_code: found.pix_qr_code.clone(),
        pix_qr_code_image: found.pix_qr_code_image.clone(),
        boleto_url: found.boleto_url.clone(),
        boleto_digitable_line: found.boleto_digitable_line.clone(),
    }
}

fn hash_request(req: &CreateContributionRequest) -> String {
    let serialized = serde_json::to_string(req).unwrap_or_default();
    let hash = Sha256::digest(serialized.as_bytes());
    hash.iter().map(|b| format!("{:02x}", b)).collect()
}

fn err(code: &str, message: &str) -> ErrorEnvelope {
    ErrorEnvelope {
        error: ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
            details: None,
        },
    }
}

fn not_found() -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::NOT_FOUND,
        err("TRANSACTION_NOT_FOUND", "no transaction with this id"),
    )
}

fn internal(e: anyhow::Error) -> (StatusCode, ErrorEnvelope) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        err("INTERNAL_ERROR", &e.to_string()),
    )
}

fn gateway_err(e: GatewayError) -> (StatusCode, ErrorEnvelope) {
    let (status, code) = match &e {
        GatewayError::NotConfigured => (StatusCode::UNPROCESSABLE_ENTITY, "GATEWAY_NOT_CONFIGURED"),
        GatewayError::Disabled => (StatusCode::UNPROCESSABLE_ENTITY, "GATEWAY_DISABLED"),
        GatewayError::MissingCredentials(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "GATEWAY_CREDENTIALS_MISSING")
        }
        GatewayError::Timeout => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
        GatewayError::Network(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_UNREACHABLE"),
        GatewayError::Provider(_) => (StatusCode::UNPROCESSABLE_ENTITY, "GATEWAY_REFUSED"),
        GatewayError::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    };
    (status, err(code, &e.to_string()))
}
