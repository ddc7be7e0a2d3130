use contributions_gateway::domain::contribution::TransactionStatus;
use contributions_gateway::gateways::cielo::CieloClient;
use contributions_gateway::gateways::{
    BoletoChargeRequest, CardChargeRequest, GatewayError, PaymentProvider, PixChargeRequest,
};
use contributions_gateway::service::config_resolver::select_credentials;
use contributions_gateway::service::gateway_logger::GatewayLogger;
use httpmock::prelude::*;
use serde_json::json;
use uuid::Uuid;

fn client_for(server: &MockServer, timeout_ms: u64) -> CieloClient {
    CieloClient {
        api_url: server.base_url(),
        query_url: server.base_url(),
        merchant_id: "merchant-id".to_string(),
        merchant_key: "merchant-key".to_string(),
        timeout_ms,
        client: reqwest::Client::new(),
        logger: GatewayLogger::noop(Uuid::new_v4()),
    }
}

fn pix_request() -> PixChargeRequest {
    PixChargeRequest {
        order_id: "order-1".to_string(),
        payer_name: "Maria da Silva".to_string(),
        amount_cents: 5000,
    }
}

fn card_request() -> CardChargeRequest {
    CardChargeRequest {
        order_id: "order-2".to_string(),
        payer_name: "Maria da Silva".to_string(),
        amount_cents: 10_000,
        installments: 1,
        card_number: "4111111111111111".to_string(),
        holder: "MARIA D SILVA".to_string(),
        expiration: "12/2030".to_string(),
        security_code: "123".to_string(),
        brand: "Visa",
    }
}

#[tokio::test]
async fn pix_success_returns_the_provider_payment_id() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/1/sales")
            .header("MerchantId", "merchant-id")
            .header("MerchantKey", "merchant-key");
        then.status(201).json_body(json!({
            "MerchantOrderId": "order-1",
            "Payment": {
                "PaymentId": "pix-abc-123",
                "Status": 12,
                "QrCodeString": "00020101qrdata",
                "QrCodeBase64Image": "aW1hZ2U="
            }
        }));
    });

    let charge = client_for(&server, 15_000)
        .create_pix(pix_request())
        .await
        .unwrap();

    mock.assert();
    assert_eq!(charge.payment_id, "pix-abc-123");
    assert_eq!(charge.status, TransactionStatus::Pending);
    assert_eq!(charge.qr_code.as_deref(), Some("00020101qrdata"));
}

#[tokio::test]
async fn card_charge_takes_the_provider_verdict() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/1/sales");
        then.status(201).json_body(json!({
            "Payment": {
                "PaymentId": "card-xyz",
                "Status": 2,
                "ReturnCode": "00",
                "ReturnMessage": "Operation Successful"
            }
        }));
    });

    let charge = client_for(&server, 15_000)
        .create_credit_card(card_request())
        .await
        .unwrap();

    assert_eq!(charge.payment_id, "card-xyz");
    assert_eq!(charge.status, TransactionStatus::Approved);
    assert_eq!(charge.return_code.as_deref(), Some("00"));
}

#[tokio::test]
async fn boleto_success_returns_the_slip_artifacts() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/1/sales");
        then.status(201).json_body(json!({
            "Payment": {
                "PaymentId": "boleto-1",
                "Status": 1,
                "Url": "https://sandbox.cieloecommerce.cielo.com.br/post/pagador/reenvia.asp/abc",
                "DigitableLine": "00000.00000 11111.111111 22222.222222 3 44440000005000",
                "BarCodeNumber": "00093444400000050000000000111111111122222222"
            }
        }));
    });

    let charge = client_for(&server, 15_000)
        .create_boleto(BoletoChargeRequest {
            order_id: "order-3".to_string(),
            payer_name: "Maria da Silva".to_string(),
            amount_cents: 5000,
            expiration_days: 3,
        })
        .await
        .unwrap();

    assert_eq!(charge.payment_id, "boleto-1");
    assert!(charge.url.is_some());
    assert!(charge.digitable_line.is_some());
}

#[tokio::test]
async fn provider_error_message_is_surfaced_verbatim() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/1/sales");
        then.status(400)
            .json_body(json!([{"Code": 126, "Message": "Credit Card Expiration Date is invalid"}]));
    });

    let err = client_for(&server, 15_000)
        .create_credit_card(card_request())
        .await
        .unwrap_err();

    match err {
        GatewayError::Provider(message) => {
            assert_eq!(message, "Credit Card Expiration Date is invalid")
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn disabled_payment_method_gets_setup_guidance() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/1/sales");
        then.status(400)
            .json_body(json!([{"Code": 308, "Message": "Payment method is not enabled"}]));
    });

    let err = client_for(&server, 15_000)
        .create_pix(pix_request())
        .await
        .unwrap_err();

    match err {
        GatewayError::Provider(message) => {
            assert!(message.contains("not enabled for the merchant account"), "{message}");
            assert!(message.contains("acquirer"));
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_falls_back_to_http_code() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/1/sales");
        then.status(502).body("<html>bad gateway</html>");
    });

    let err = client_for(&server, 15_000)
        .create_pix(pix_request())
        .await
        .unwrap_err();

    match err {
        GatewayError::Provider(message) => {
            assert!(message.starts_with("HTTP 502"), "{message}");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn success_without_a_payment_id_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/1/sales");
        then.status(201).json_body(json!({"Payment": {"Status": 12}}));
    });

    let err = client_for(&server, 15_000)
        .create_pix(pix_request())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Provider(_)));
}

#[tokio::test]
async fn query_404_is_treated_as_still_pending() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/1/sales/fresh-pix");
        then.status(404);
    });

    let snapshot = client_for(&server, 15_000)
        .query_payment("fresh-pix")
        .await
        .unwrap();

    assert_eq!(snapshot.status, TransactionStatus::Pending);
    assert_eq!(snapshot.provider_status, None);
}

#[tokio::test]
async fn query_maps_the_provider_status_table() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/1/sales/paid-charge");
        then.status(200)
            .json_body(json!({"Payment": {"PaymentId": "paid-charge", "Status": 2}}));
    });

    let snapshot = client_for(&server, 15_000)
        .query_payment("paid-charge")
        .await
        .unwrap();

    assert_eq!(snapshot.status, TransactionStatus::Approved);
    assert_eq!(snapshot.provider_status, Some(2));
}

#[tokio::test]
async fn void_reports_the_refunded_state() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(PUT).path("/1/sales/card-xyz/void");
        then.status(200).json_body(json!({"Status": 10, "ReturnCode": "9"}));
    });

    let snapshot = client_for(&server, 15_000)
        .void_payment("card-xyz")
        .await
        .unwrap();

    mock.assert();
    assert_eq!(snapshot.status, TransactionStatus::Refunded);
}

#[tokio::test]
async fn slow_provider_yields_the_timeout_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/1/sales");
        then.status(201)
            .delay(std::time::Duration::from_millis(500))
            .json_body(json!({"Payment": {"PaymentId": "late", "Status": 12}}));
    });

    let err = client_for(&server, 100)
        .create_pix(pix_request())
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Timeout));
    assert!(err.to_string().contains("try again"));
}

#[tokio::test]
async fn disabled_gateway_fails_before_any_request_is_made() {
    let server = MockServer::start();
    let catch_all = server.mock(|when, then| {
        when.any_request();
        then.status(500);
    });

    let row = contributions_gateway::repo::gateway_config_repo::GatewayConfigRow {
        company_id: Uuid::new_v4(),
        gateway_name: "cielo".to_string(),
        is_active: false,
        environment: "production".to_string(),
        prod_merchant_id: Some("id".to_string()),
        prod_merchant_key: Some("key".to_string()),
        dev_merchant_id: None,
        dev_merchant_key: None,
        certificate: None,
        certificate_key: None,
        updated_at: chrono::Utc::now(),
    };

    // Resolution fails first; a client is only ever built from a resolved
    // gateway, so no call can reach the provider.
    assert!(matches!(select_credentials(&row), Err(GatewayError::Disabled)));
    assert_eq!(catch_all.hits(), 0);
}
