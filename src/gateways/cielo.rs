use crate::domain::contribution::TransactionStatus;
use crate::gateways::{
    map_provider_status, BoletoCharge, BoletoChargeRequest, CardCharge, CardChargeRequest,
    GatewayError, PaymentProvider, PaymentSnapshot, PixCharge, PixChargeRequest, ProviderBody,
};
use crate::service::config_resolver::{Environment, ResolvedGateway};
use crate::service::gateway_logger::{GatewayLogger, LogOperation};
use reqwest::{Method, StatusCode};
use serde_json::json;

pub const PRODUCTION_API_URL: &str = "https://api.cieloecommerce.cielo.com.br";
pub const PRODUCTION_QUERY_URL: &str = "https://apiquery.cieloecommerce.cielo.com.br";
pub const SANDBOX_API_URL: &str = "https://apisandbox.cieloecommerce.cielo.com.br";
pub const SANDBOX_QUERY_URL: &str = "https://apiquerysandbox.cieloecommerce.cielo.com.br";

pub struct CieloClient {
    pub api_url: String,
    pub query_url: String,
    pub merchant_id: String,
    pub merchant_key: String,
    pub timeout_ms: u64,
    pub client: reqwest::Client,
    pub logger: GatewayLogger,
}

impl CieloClient {
    pub fn for_gateway(
        client: reqwest::Client,
        resolved: &ResolvedGateway,
        logger: GatewayLogger,
        timeout_ms: u64,
    ) -> Self {
        let (api_url, query_url) = match resolved.environment {
            Environment::Production => (PRODUCTION_API_URL, PRODUCTION_QUERY_URL),
            Environment::Development => (SANDBOX_API_URL, SANDBOX_QUERY_URL),
        };
        Self {
            api_url: api_url.to_string(),
            query_url: query_url.to_string(),
            merchant_id: resolved.merchant_id.clone(),
            merchant_key: resolved.merchant_key.clone(),
            timeout_ms,
            client,
            logger,
        }
    }

    async fn exchange(
        &self,
        operation: LogOperation,
        method: Method,
        url: &str,
        payment_id: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> Result<(StatusCode, ProviderBody, String), GatewayError> {
        self.logger
            .log_request(operation, method.as_str(), url, payment_id, body.as_ref());

        let mut request = self
            .client
            .request(method.clone(), url)
            .header("MerchantId", &self.merchant_id)
            .header("MerchantKey", &self.merchant_key)
            .header("Content-Type", "application/json")
            .timeout(std::time::Duration::from_millis(self.timeout_ms));
        if let Some(payload) = &body {
            request = request.json(payload);
        }

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return Err(GatewayError::Timeout),
            Err(e) => return Err(GatewayError::Network(e.to_string())),
        };

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let parsed = ProviderBody::parse(&text);

        let log_body = parsed
            .raw
            .clone()
            .or_else(|| (!text.is_empty()).then(|| json!({ "raw": excerpt(&text) })));
        let known_id = payment_id
            .map(ToString::to_string)
            .or_else(|| parsed.payment_id.clone());
        self.logger.log_response(
            operation,
            method.as_str(),
            url,
            known_id.as_deref(),
            log_body,
            status.as_u16(),
        );

        Ok((status, parsed, text))
    }
}

#[async_trait::async_trait]
impl PaymentProvider for CieloClient {
    fn name(&self) -> &'static str {
        "cielo"
    }

    async fn create_pix(&self, req: PixChargeRequest) -> Result<PixCharge, GatewayError> {
        let url = format!("{}/1/sales", self.api_url);
        let payload = json!({
            "MerchantOrderId": req.order_id,
            "Customer": { "Name": req.payer_name },
            "Payment": {
                "Type": "Pix",
                "Amount": req.amount_cents
            }
        });

        let (status, parsed, text) = self
            .exchange(LogOperation::Pix, Method::POST, &url, None, Some(payload))
            .await?;
        if !status.is_success() {
            return Err(provider_error(status, &parsed, &text));
        }

        Ok(PixCharge {
            payment_id: required_payment_id(&parsed)?,
            status: parsed
                .status_code
                .map(map_provider_status)
                .unwrap_or(TransactionStatus::Pending),
            qr_code: parsed.qr_code,
            qr_code_image: parsed.qr_code_image,
        })
    }

    async fn create_credit_card(&self, req: CardChargeRequest) -> Result<CardCharge, GatewayError> {
        let url = format!("{}/1/sales", self.api_url);
        let payload = json!({
            "MerchantOrderId": req.order_id,
            "Customer": { "Name": req.payer_name },
            "Payment": {
                "Type": "CreditCard",
                "Amount": req.amount_cents,
                "Installments": req.installments,
                "Capture": true,
                "CreditCard": {
                    "CardNumber": req.card_number,
                    "Holder": req.holder,
                    "ExpirationDate": req.expiration,
                    "SecurityCode": req.security_code,
                    "Brand": req.brand
                }
            }
        });

        let (status, parsed, text) = self
            .exchange(LogOperation::CreditCard, Method::POST, &url, None, Some(payload))
            .await?;
        if !status.is_success() {
            return Err(provider_error(status, &parsed, &text));
        }

        Ok(CardCharge {
            payment_id: required_payment_id(&parsed)?,
            status: parsed
                .status_code
                .map(map_provider_status)
                .unwrap_or(TransactionStatus::Pending),
            return_code: parsed.return_code,
            return_message: parsed.return_message,
        })
    }

    async fn create_boleto(&self, req: BoletoChargeRequest) -> Result<BoletoCharge, GatewayError> {
        let url = format!("{}/1/sales", self.api_url);
        let expiration = (chrono::Utc::now() + chrono::Duration::days(req.expiration_days))
            .format("%Y-%m-%d")
            .to_string();
        let payload = json!({
            "MerchantOrderId": req.order_id,
            "Customer": { "Name": req.payer_name },
            "Payment": {
                "Type": "Boleto",
                "Amount": req.amount_cents,
                "ExpirationDate": expiration,
                "Instructions": "Não receber após o vencimento."
            }
        });

        let (status, parsed, text) = self
            .exchange(LogOperation::Boleto, Method::POST, &url, None, Some(payload))
            .await?;
        if !status.is_success() {
            return Err(provider_error(status, &parsed, &text));
        }

        Ok(BoletoCharge {
            payment_id: required_payment_id(&parsed)?,
            status: parsed
                .status_code
                .map(map_provider_status)
                .unwrap_or(TransactionStatus::Pending),
            url: parsed.boleto_url,
            digitable_line: parsed.digitable_line,
            bar_code: parsed.bar_code,
        })
    }

    async fn void_payment(&self, payment_id: &str) -> Result<PaymentSnapshot, GatewayError> {
        let url = format!("{}/1/sales/{}/void", self.api_url, payment_id);
        let (status, parsed, text) = self
            .exchange(LogOperation::Void, Method::PUT, &url, Some(payment_id), None)
            .await?;
        if !status.is_success() {
            return Err(provider_error(status, &parsed, &text));
        }

        Ok(PaymentSnapshot {
            payment_id: payment_id.to_string(),
            status: parsed
                .status_code
                .map(map_provider_status)
                .unwrap_or(TransactionStatus::Refunded),
            provider_status: parsed.status_code,
        })
    }

    async fn query_payment(&self, payment_id: &str) -> Result<PaymentSnapshot, GatewayError> {
        let url = format!("{}/1/sales/{}", self.query_url, payment_id);
        let (status, parsed, text) = self
            .exchange(LogOperation::StatusQuery, Method::GET, &url, Some(payment_id), None)
            .await?;

        // The query API lags behind sale creation, a fresh charge can 404 for
        // a while. Treat it as still pending instead of failing the sync.
        if status == StatusCode::NOT_FOUND {
            return Ok(PaymentSnapshot {
                payment_id: payment_id.to_string(),
                status: TransactionStatus::Pending,
                provider_status: None,
            });
        }
        if !status.is_success() {
            return Err(provider_error(status, &parsed, &text));
        }

        Ok(PaymentSnapshot {
            payment_id: payment_id.to_string(),
            status: parsed
                .status_code
                .map(map_provider_status)
                .unwrap_or(TransactionStatus::Pending),
            provider_status: parsed.status_code,
        })
    }
}

fn excerpt(text: &str) -> String {
    text.chars().take(500).collect()
}

fn provider_error(status: StatusCode, parsed: &ProviderBody, text: &str) -> GatewayError {
    let message = parsed
        .error_message
        .clone()
        .or_else(|| parsed.return_message.clone())
        .unwrap_or_else(|| format!("HTTP {}: {}", status.as_u16(), excerpt(text)));

    if message.to_lowercase().contains("payment method is not enabled") {
        return GatewayError::Provider(
            "this payment method is not enabled for the merchant account, ask the acquirer to enable it before charging".to_string(),
        );
    }

    GatewayError::Provider(message)
}

fn required_payment_id(parsed: &ProviderBody) -> Result<String, GatewayError> {
    parsed
        .payment_id
        .clone()
        .ok_or_else(|| GatewayError::Provider("provider response did not include a payment id".to_string()))
}
