use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionMethod {
    Pix,
    CreditCard,
    Boleto,
}

impl ContributionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContributionMethod::Pix => "PIX",
            ContributionMethod::CreditCard => "CREDIT_CARD",
            ContributionMethod::Boleto => "BOLETO",
        }
    }

    pub fn parse(s: &str) -> ContributionMethod {
        match s {
            "CREDIT_CARD" => ContributionMethod::CreditCard,
            "BOLETO" => ContributionMethod::Boleto,
            _ => ContributionMethod::Pix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    Pending,
    Approved,
    Refused,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "PENDING",
            TransactionStatus::Approved => "APPROVED",
            TransactionStatus::Refused => "REFUSED",
            TransactionStatus::Refunded => "REFUNDED",
        }
    }

    pub fn parse(s: &str) -> TransactionStatus {
        match s {
            "APPROVED" => TransactionStatus::Approved,
            "REFUSED" => TransactionStatus::Refused,
            "REFUNDED" => TransactionStatus::Refunded,
            _ => TransactionStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardInstrument {
    pub number: String,
    pub holder: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub security_code: String,
    pub installments: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContributionInstrument {
    Pix,
    CreditCard(CardInstrument),
    Boleto,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateContributionRequest {
    pub company_id: Uuid,
    pub church_id: Uuid,
    pub contributor_id: Uuid,
    pub contributor_name: String,
    pub amount_cents: i64,
    pub method: ContributionMethod,
    pub instrument: ContributionInstrument,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateContributionResponse {
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    pub method: ContributionMethod,
    pub gateway_payment_id: Option<String>,
    pub pix_qr_code: Option<String>,
    pub pix_qr_code_image: Option<String>,
    pub boleto_url: Option<String>,
    pub boleto_digitable_line: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContributionStatusView {
    pub transaction_id: Uuid,
    pub status: TransactionStatus,
    pub gateway_payment_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}
