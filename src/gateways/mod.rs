use crate::domain::contribution::TransactionStatus;
use thiserror::Error;

pub mod cielo;
pub mod mock;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("no payment gateway is configured for this organization, set one up in the gateway settings")]
    NotConfigured,
    #[error("the payment gateway is disabled for this organization, enable it in the gateway settings")]
    Disabled,
    #[error("payment gateway credentials are incomplete for the {0} environment")]
    MissingCredentials(&'static str),
    #[error("the payment provider took too long to respond, try again in a few moments")]
    Timeout,
    #[error("could not reach the payment provider: {0}")]
    Network(String),
    #[error("{0}")]
    Provider(String),
    #[error("gateway configuration lookup failed: {0}")]
    Storage(String),
}

#[derive(Debug, Clone)]
pub struct PixChargeRequest {
    pub order_id: String,
    pub payer_name: String,
    pub amount_cents: i64,
}

#[derive(Debug, Clone)]
pub struct PixCharge {
    pub payment_id: String,
    pub status: TransactionStatus,
    pub qr_code: Option<String>,
    pub qr_code_image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CardChargeRequest {
    pub order_id: String,
    pub payer_name: String,
    pub amount_cents: i64,
    pub installments: i32,
    pub card_number: String,
    pub holder: String,
    pub expiration: String,
    pub security_code: String,
    pub brand: &'static str,
}

#[derive(Debug, Clone)]
pub struct CardCharge {
    pub payment_id: String,
    pub status: TransactionStatus,
    pub return_code: Option<String>,
    pub return_message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BoletoChargeRequest {
    pub order_id: String,
    pub payer_name: String,
    pub amount_cents: i64,
    pub expiration_days: i64,
}

#[derive(Debug, Clone)]
pub struct BoletoCharge {
    pub payment_id: String,
    pub status: TransactionStatus,
    pub url: Option<String>,
    pub digitable_line: Option<String>,
    pub bar_code: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PaymentSnapshot {
    pub payment_id: String,
    pub status: TransactionStatus,
    pub provider_status: Option<i64>,
}

#[async_trait::async_trait]
pub trait PaymentProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn create_pix(&self, req: PixChargeRequest) -> Result<PixCharge, GatewayError>;

    async fn create_credit_card(&self, req: CardChargeRequest) -> Result<CardCharge, GatewayError>;

    async fn create_boleto(&self, req: BoletoChargeRequest) -> Result<BoletoCharge, GatewayError>;

    async fn void_payment(&self, payment_id: &str) -> Result<PaymentSnapshot, GatewayError>;

    async fn query_payment(&self, payment_id: &str) -> Result<PaymentSnapshot, GatewayError>;
}

/// Provider status codes: 1 authorized, 2 captured, 3 denied, 10 voided,
/// 11 refunded, 12 pending, 13 aborted, 20 scheduled.
pub fn map_provider_status(code: i64) -> TransactionStatus {
    match code {
        2 => TransactionStatus::Approved,
        3 | 13 => TransactionStatus::Refused,
        10 | 11 => TransactionStatus::Refunded,
        _ => TransactionStatus::Pending,
    }
}

/// Best-effort view over a provider response body. The body is always read as
/// text first; a JSON parse failure produces an empty field set and a warning
/// instead of an error, so response handling never depends on the provider
/// sending well-formed JSON.
#[derive(Debug, Clone, Default)]
pub struct ProviderBody {
    pub payment_id: Option<String>,
    pub status_code: Option<i64>,
    pub qr_code: Option<String>,
    pub qr_code_image: Option<String>,
    pub boleto_url: Option<String>,
    pub digitable_line: Option<String>,
    pub bar_code: Option<String>,
    pub return_code: Option<String>,
    pub return_message: Option<String>,
    pub error_message: Option<String>,
    pub raw: Option<serde_json::Value>,
}

impl ProviderBody {
    pub fn parse(text: &str) -> Self {
        if text.trim().is_empty() {
            return Self::default();
        }
        match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) => Self::from_value(value),
            Err(err) => {
                tracing::warn!("provider response is not valid JSON: {err}");
                Self::default()
            }
        }
    }

    fn from_value(value: serde_json::Value) -> Self {
        // Error responses come as an array of {Code, Message} entries.
        if let Some(items) = value.as_array() {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("Message").and_then(|m| m.as_str()))
                .map(ToString::to_string)
                .collect();
            return Self {
                error_message: if messages.is_empty() { None } else { Some(messages.join("; ")) },
                raw: Some(value),
                ..Default::default()
            };
        }

        // Sale responses nest payment fields under "Payment"; void responses
        // carry them at the top level.
        let payment = value.get("Payment").unwrap_or(&value);
        let field = |key: &str| payment.get(key).and_then(|v| v.as_str()).map(ToString::to_string);

        let payment_id = field("PaymentId");
        let status_code = payment.get("Status").and_then(|v| v.as_i64());
        let qr_code = field("QrCodeString");
        let qr_code_image = field("QrCodeBase64Image");
        let boleto_url = field("Url");
        let digitable_line = field("DigitableLine");
        let bar_code = field("BarCodeNumber");
        let return_code = payment
            .get("ReturnCode")
            .map(|v| v.as_str().map(ToString::to_string).unwrap_or_else(|| v.to_string()));
        let return_message = field("ReturnMessage");

        Self {
            payment_id,
            status_code,
            qr_code,
            qr_code_image,
            boleto_url,
            digitable_line,
            bar_code,
            return_code,
            return_message,
            error_message: None,
            raw: Some(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_payment_fields() {
        let body = ProviderBody::parse(
            r#"{"MerchantOrderId":"x","Payment":{"PaymentId":"abc-123","Status":12,"QrCodeString":"qr"}}"#,
        );
        assert_eq!(body.payment_id.as_deref(), Some("abc-123"));
        assert_eq!(body.status_code, Some(12));
        assert_eq!(body.qr_code.as_deref(), Some("qr"));
    }

    #[test]
    fn parses_error_array() {
        let body = ProviderBody::parse(r#"[{"Code":57,"Message":"Amount is invalid"}]"#);
        assert_eq!(body.error_message.as_deref(), Some("Amount is invalid"));
        assert!(body.payment_id.is_none());
    }

    #[test]
    fn garbage_body_yields_empty_fields_not_error() {
        let body = ProviderBody::parse("<html>502 Bad Gateway</html>");
        assert!(body.payment_id.is_none());
        assert!(body.error_message.is_none());
    }

    #[test]
    fn top_level_status_is_read_for_void_responses() {
        let body = ProviderBody::parse(r#"{"Status":10,"ReturnCode":"9"}"#);
        assert_eq!(body.status_code, Some(10));
        assert_eq!(body.return_code.as_deref(), Some("9"));
    }

    #[test]
    fn status_mapping_covers_the_provider_table() {
        assert_eq!(map_provider_status(2), TransactionStatus::Approved);
        assert_eq!(map_provider_status(3), TransactionStatus::Refused);
        assert_eq!(map_provider_status(13), TransactionStatus::Refused);
        assert_eq!(map_provider_status(10), TransactionStatus::Refunded);
        assert_eq!(map_provider_status(11), TransactionStatus::Refunded);
        assert_eq!(map_provider_status(1), TransactionStatus::Pending);
        assert_eq!(map_provider_status(12), TransactionStatus::Pending);
        assert_eq!(map_provider_status(99), TransactionStatus::Pending);
    }
}
