use crate::domain::card;
use crate::repo::gateway_log_repo::{GatewayLogRepo, NewGatewayLog};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOperation {
    Pix,
    CreditCard,
    Boleto,
    StatusQuery,
    Void,
}

impl LogOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogOperation::Pix => "pix",
            LogOperation::CreditCard => "credit_card",
            LogOperation::Boleto => "boleto",
            LogOperation::StatusQuery => "status_query",
            LogOperation::Void => "void",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogDirection {
    Request,
    Response,
}

impl LogDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogDirection::Request => "request",
            LogDirection::Response => "response",
        }
    }
}

/// Destination for audit entries. Writes happen off the request path and a
/// sink failure must never reach the payment operation that produced the
/// entry.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: NewGatewayLog);
}

pub struct DbAuditSink {
    pub log_repo: GatewayLogRepo,
}

impl AuditSink for DbAuditSink {
    fn record(&self, entry: NewGatewayLog) {
        let repo = self.log_repo.clone();
        tokio::spawn(async move {
            if let Err(err) = repo.insert(&entry).await {
                tracing::error!("gateway audit log write failed: {err}");
            }
        });
    }
}

pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _entry: NewGatewayLog) {}
}

#[derive(Clone)]
pub struct GatewayLogger {
    sink: Arc<dyn AuditSink>,
    company_id: Uuid,
}

impl GatewayLogger {
    pub fn database(log_repo: GatewayLogRepo, company_id: Uuid) -> Self {
        Self {
            sink: Arc::new(DbAuditSink { log_repo }),
            company_id,
        }
    }

    pub fn noop(company_id: Uuid) -> Self {
        Self {
            sink: Arc::new(NoopAuditSink),
            company_id,
        }
    }

    pub fn log_request(
        &self,
        operation: LogOperation,
        method: &str,
        endpoint: &str,
        payment_id: Option<&str>,
        body: Option<&serde_json::Value>,
    ) {
        self.sink.record(NewGatewayLog {
            company_id: self.company_id,
            direction: LogDirection::Request.as_str().to_string(),
            operation: operation.as_str().to_string(),
            http_method: method.to_string(),
            endpoint: endpoint.to_string(),
            gateway_payment_id: payment_id.map(ToString::to_string),
            body: body.map(|b| sanitize(b.clone())),
            http_status: None,
        });
    }

    pub fn log_response(
        &self,
        operation: LogOperation,
        method: &str,
        endpoint: &str,
        payment_id: Option<&str>,
        body: Option<serde_json::Value>,
        http_status: u16,
    ) {
        self.sink.record(NewGatewayLog {
            company_id: self.company_id,
            direction: LogDirection::Response.as_str().to_string(),
            operation: operation.as_str().to_string(),
            http_method: method.to_string(),
            endpoint: endpoint.to_string(),
            gateway_payment_id: payment_id.map(ToString::to_string),
            body: body.map(sanitize),
            http_status: Some(http_status as i32),
        });
    }
}

const REDACTED: &str = "[redacted]";

fn is_sensitive(normalized_key: &str) -> bool {
    matches!(
        normalized_key,
        "securitycode"
            | "cvv"
            | "merchantid"
            | "merchantkey"
            | "password"
            | "authorization"
            | "accesstoken"
            | "certificate"
            | "certificatekey"
            | "clientsecret"
    )
}

/// Redacts credential and card fields anywhere in a JSON body. Card numbers
/// keep their last four digits so a log entry can still be matched to a
/// transaction; everything else sensitive is replaced wholesale.
pub fn sanitize(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, val) in map {
                let normalized: String = key
                    .chars()
                    .filter(|c| *c != '_' && *c != '-')
                    .collect::<String>()
                    .to_lowercase();
                if normalized == "cardnumber" || normalized == "number" {
                    let masked = val
                        .as_str()
                        .map(card::mask)
                        .unwrap_or_else(|| REDACTED.to_string());
                    out.insert(key, serde_json::Value::String(masked));
                } else if is_sensitive(&normalized) {
                    out.insert(key, serde_json::Value::String(REDACTED.to_string()));
                } else {
                    out.insert(key, sanitize(val));
                }
            }
            serde_json::Value::Object(out)
        }
        serde_json::Value::Array(items) => {
            serde_json::Value::Array(items.into_iter().map(sanitize).collect())
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn card_number_keeps_only_last_four() {
        let body = json!({"Payment": {"CreditCard": {"CardNumber": "4111111111111111", "Holder": "Maria"}}});
        let clean = sanitize(body);
        let number = clean["Payment"]["CreditCard"]["CardNumber"].as_str().unwrap();
        assert_eq!(number, "************1111");
        assert_eq!(clean["Payment"]["CreditCard"]["Holder"], "Maria");
    }

    #[test]
    fn security_code_and_merchant_key_are_redacted() {
        let body = json!({
            "SecurityCode": "123",
            "merchant_key": "super-secret",
            "Amount": 5000
        });
        let clean = sanitize(body);
        assert_eq!(clean["SecurityCode"], REDACTED);
        assert_eq!(clean["merchant_key"], REDACTED);
        assert_eq!(clean["Amount"], 5000);
    }

    #[test]
    fn sanitizes_inside_arrays() {
        let body = json!([{"Cvv": "999"}, {"ok": true}]);
        let clean = sanitize(body);
        assert_eq!(clean[0]["Cvv"], REDACTED);
        assert_eq!(clean[1]["ok"], true);
    }

    #[test]
    fn raw_pan_never_survives() {
        let body = json!({"CreditCard": {"CardNumber": "5555666677778884"}});
        let clean = serde_json::to_string(&sanitize(body)).unwrap();
        assert!(!clean.contains("5555666677778884"));
        assert!(clean.contains("8884"));
    }
}
