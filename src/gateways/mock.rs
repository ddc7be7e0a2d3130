use crate::domain::contribution::TransactionStatus;
use crate::gateways::{
    BoletoCharge, BoletoChargeRequest, CardCharge, CardChargeRequest, GatewayError,
    PaymentProvider, PaymentSnapshot, PixCharge, PixChargeRequest,
};

/// Stand-in provider for development tenants and tests. Behavior is selected
/// by the configured gateway name suffix, mirroring how a sandbox account
/// would respond.
pub struct MockProvider {
    pub behavior: String,
}

impl MockProvider {
    fn verdict(&self) -> Result<TransactionStatus, GatewayError> {
        match self.behavior.as_str() {
            "ALWAYS_TIMEOUT" => Err(GatewayError::Timeout),
            "ALWAYS_REFUSE" => Ok(TransactionStatus::Refused),
            _ => Ok(TransactionStatus::Approved),
        }
    }
}

#[async_trait::async_trait]
impl PaymentProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_pix(&self, req: PixChargeRequest) -> Result<PixCharge, GatewayError> {
        self.verdict()?;
        Ok(PixCharge {
            payment_id: format!("mock_pix_{}", uuid::Uuid::new_v4()),
            status: TransactionStatus::Pending,
            qr_code: Some(format!("00020101mock{}", req.amount_cents)),
            qr_code_image: None,
        })
    }

    async fn create_credit_card(&self, _req: CardChargeRequest) -> Result<CardCharge, GatewayError> {
        let status = self.verdict()?;
        Ok(CardCharge {
            payment_id: format!("mock_card_{}", uuid::Uuid::new_v4()),
            status,
            return_code: Some(if status == TransactionStatus::Approved { "00" } else { "57" }.to_string()),
            return_message: None,
        })
    }

    async fn create_boleto(&self, _req: BoletoChargeRequest) -> Result<BoletoCharge, GatewayError> {
        self.verdict()?;
        let payment_id = format!("mock_boleto_{}", uuid::Uuid::new_v4());
        Ok(BoletoCharge {
            payment_id: payment_id.clone(),
            status: TransactionStatus::Pending,
            url: Some(format!("https://mock.local/boleto/{payment_id}")),
            digitable_line: Some("00000.00000 00000.000000 00000.000000 0 00000000000000".to_string()),
            bar_code: None,
        })
    }

    async fn void_payment(&self, payment_id: &str) -> Result<PaymentSnapshot, GatewayError> {
        self.verdict()?;
        Ok(PaymentSnapshot {
            payment_id: payment_id.to_string(),
            status: TransactionStatus::Refunded,
            provider_status: Some(10),
        })
    }

    async fn query_payment(&self, payment_id: &str) -> Result<PaymentSnapshot, GatewayError> {
        let status = self.verdict()?;
        Ok(PaymentSnapshot {
            payment_id: payment_id.to_string(),
            status,
            provider_status: Some(if status == TransactionStatus::Approved { 2 } else { 3 }),
        })
    }
}
