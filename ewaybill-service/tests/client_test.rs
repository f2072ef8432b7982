//! Protocol tests for EwbClient against a mock authority endpoint.

use compliance_core::retry::RetryConfig;
use compliance_core::ComplianceError;
use ewaybill_service::config::EwbConfig;
use ewaybill_service::models::{
    CancelEwbRequest, CancelReason, DocumentType, EwbItem, GenerateEwbRequest, SubSupplyType,
    SupplyType, TransportMode, UpdateVehicleRequest, VehicleType,
};
use ewaybill_service::services::crypto;
use ewaybill_service::services::EwbClient;
use rust_decimal_macros::dec;
use secrecy::Secret;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const APP_KEY: &[u8] = b"0123456789abcdef0123456789abcdef";
const SESSION_KEY: &[u8] = b"ffffffff000000001111111122222222";

/// Generating an RSA key is slow; share one across the suite.
fn authority_pem() -> &'static str {
    static PEM: OnceLock<String> = OnceLock::new();
    PEM.get_or_init(|| {
        use rsa::pkcs8::EncodePublicKey;
        let private = rsa::RsaPrivateKey::new(&mut rand::thread_rng(), 2048).unwrap();
        private
            .to_public_key()
            .to_public_key_pem(rsa::pkcs8::LineEnding::LF)
            .unwrap()
    })
}

fn test_client(server: &MockServer) -> EwbClient {
    let config = EwbConfig {
        base_url: server.uri(),
        client_id: Secret::new("test-client".into()),
        client_secret: Secret::new("test-secret".into()),
        gstin: "27AAACW1234B1Z2".into(),
        username: "api_user".into(),
        password: Secret::new("api_pass".into()),
        app_key: Some(Secret::new(
            String::from_utf8(APP_KEY.to_vec()).unwrap(),
        )),
        public_key_pem: authority_pem().to_string(),
        timeout_secs: 5,
    };
    let retry = RetryConfig {
        max_retries: 2,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(5),
        backoff_multiplier: 2.0,
        add_jitter: false,
    };
    EwbClient::with_retry(config, retry).unwrap()
}

/// Authority-side view of the handshake: token plus the session key
/// sealed under the app key, all sealed again as the response data.
fn auth_success_body() -> serde_json::Value {
    let sek = crypto::seal_session_key(APP_KEY, SESSION_KEY).unwrap();
    let payload = serde_json::json!({"authtoken": "tok-1", "sek": sek});
    let data = crypto::seal_payload(APP_KEY, payload.to_string().as_bytes()).unwrap();
    serde_json::json!({"status": 1, "data": data})
}

fn sealed_response(payload: serde_json::Value) -> serde_json::Value {
    let data = crypto::seal_payload(SESSION_KEY, payload.to_string().as_bytes()).unwrap();
    serde_json::json!({"status": 1, "data": data})
}

async fn mount_auth(server: &MockServer, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/auth"))
        .and(header("client-id", "test-client"))
        .and(header("gstin", "27AAACW1234B1Z2"))
        .and(body_partial_json(
            serde_json::json!({"action": "ACCESSTOKEN", "username": "api_user"}),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_success_body()))
        .expect(expected_calls)
        .mount(server)
        .await;
}

fn generate_request() -> GenerateEwbRequest {
    GenerateEwbRequest {
        supply_type: SupplyType::Outward,
        sub_supply_type: SubSupplyType::Supply,
        doc_type: DocumentType::Invoice,
        doc_no: "INV/2526/00042".into(),
        doc_date: "15/06/2025".into(),
        from_gstin: "27AAACW1234B1Z2".into(),
        from_place: "Mumbai".into(),
        from_state_code: 27,
        to_gstin: Some("29ABCDE1234F1Z5".into()),
        to_place: "Bengaluru".into(),
        to_state_code: 29,
        trans_distance: 980,
        trans_mode: Some(TransportMode::Road),
        transporter_id: None,
        vehicle_no: Some("MH12AB1234".into()),
        vehicle_type: Some(VehicleType::Regular),
        item_list: vec![EwbItem {
            product_name: "Laptop".into(),
            hsn_code: "8471".into(),
            quantity: dec!(2),
            qty_unit: "PCS".into(),
            taxable_amount: dec!(100000),
            cgst_rate: dec!(0),
            sgst_rate: dec!(0),
            igst_rate: dec!(18),
            cess_rate: dec!(0),
        }],
        total_value: dec!(100000),
        cgst_value: dec!(0),
        sgst_value: dec!(0),
        igst_value: dec!(18000),
        cess_value: dec!(0),
        total_inv_value: dec!(118000),
    }
}

#[tokio::test]
async fn authenticate_caches_token_and_session_key() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;

    let client = test_client(&server);
    client.authenticate().await.unwrap();

    let session = client.session().await.expect("session cached");
    assert_eq!(session.token, "tok-1");
    assert_eq!(session.session_key, SESSION_KEY);
    assert!(!session.is_expired());
}

#[tokio::test]
async fn rejected_handshake_surfaces_authority_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "error": {"message": "Invalid password for the given user"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.authenticate().await.unwrap_err();
    match err {
        ComplianceError::AuthRejected(message) => {
            assert!(message.contains("Invalid password"), "got {}", message);
        }
        other => panic!("expected AuthRejected, got {:?}", other),
    }
    assert!(client.session().await.is_none());
}

#[tokio::test]
async fn generate_round_trips_encrypted_payload() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ewayapi"))
        .and(header("authtoken", "tok-1"))
        .and(body_partial_json(serde_json::json!({"action": "GENEWAYBILL"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(
            serde_json::json!({
                "ewayBillNo": 321000987654u64,
                "ewayBillDate": "15/06/2025 11:20:00 AM",
                "validUpto": "16/06/2025 11:20:00 AM"
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let response = client.generate(&generate_request()).await.unwrap();
    assert_eq!(response.eway_bill_no, 321000987654);
}

#[tokio::test]
async fn over_distance_request_never_reaches_the_wire() {
    let server = MockServer::start().await;
    // no request of any kind may leave the client
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let mut request = generate_request();
    request.trans_distance = 4500;

    let err = client.generate(&request).await.unwrap_err();
    assert!(matches!(err, ComplianceError::Validation(_)), "got {:?}", err);
}

#[tokio::test]
async fn authority_rejection_propagates_verbatim() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ewayapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 0,
            "error": {"errorCodes": "312", "message": "This eway bill cannot be cancelled"}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .cancel(&CancelEwbRequest {
            ewb_no: 321000987654,
            cancel_rsn_code: CancelReason::DataEntryMistake,
            cancel_rmrk: None,
        })
        .await
        .unwrap_err();

    match err {
        ComplianceError::Rejected(authority) => {
            assert_eq!(authority.code.as_deref(), Some("312"));
            assert_eq!(authority.message, "This eway bill cannot be cancelled");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn update_vehicle_posts_part_b() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ewayapi"))
        .and(body_partial_json(serde_json::json!({"action": "UPDATEVEHICLE"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(
            serde_json::json!({
                "vehUpdDate": "16/06/2025 09:00:00 AM",
                "validUpto": "17/06/2025 09:00:00 AM"
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let response = client
        .update_vehicle(&UpdateVehicleRequest {
            ewb_no: 321000987654,
            vehicle_no: "MH14XY9876".into(),
            from_place: "Pune".into(),
            from_state: 27,
            trans_mode: TransportMode::Road,
            reason_code: None,
            reason_rem: None,
        })
        .await
        .unwrap();
    assert_eq!(response.veh_upd_date, "16/06/2025 09:00:00 AM");
}

#[tokio::test]
async fn fetch_decrypts_bill_detail() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/ewayapi/GetEwayBill"))
        .and(query_param("ewbNo", "321000987654"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(
            serde_json::json!({
                "ewbNo": 321000987654u64,
                "ewbDate": "15/06/2025 11:20:00 AM",
                "status": "ACT",
                "docNo": "INV/2526/00042",
                "fromGstin": "27AAACW1234B1Z2",
                "toGstin": "29ABCDE1234F1Z5",
                "totalInvoiceValue": 118000.0,
                "vehicleNo": "MH12AB1234"
            }),
        )))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let detail = client.fetch(321000987654).await.unwrap();
    assert_eq!(detail.status, "ACT");
    assert_eq!(detail.doc_no, "INV/2526/00042");
    assert_eq!(detail.vehicle_no.as_deref(), Some("MH12AB1234"));
}

#[tokio::test]
async fn concurrent_operations_share_one_handshake() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ewayapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(
            serde_json::json!({
                "ewayBillNo": 321000987654u64,
                "ewayBillDate": "15/06/2025 11:20:00 AM"
            }),
        )))
        .expect(3)
        .mount(&server)
        .await;

    let client = Arc::new(test_client(&server));
    let mut handles = Vec::new();
    for _ in 0..3 {
        let client = Arc::clone(&client);
        handles.push(tokio::spawn(async move {
            client.generate(&generate_request()).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    // mount_auth's expect(1) verifies exactly one handshake on drop
}

#[tokio::test]
async fn server_errors_retry_then_succeed() {
    let server = MockServer::start().await;
    mount_auth(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/ewayapi"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ewayapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sealed_response(
            serde_json::json!({
                "ewayBillNo": 321000987654u64,
                "ewayBillDate": "15/06/2025 11:20:00 AM"
            }),
        )))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let response = client.generate(&generate_request()).await.unwrap();
    assert_eq!(response.eway_bill_no, 321000987654);
}

#[tokio::test]
async fn undecryptable_response_forces_exactly_one_reauth() {
    let server = MockServer::start().await;
    mount_auth(&server, 2).await;
    // data sealed under a key that is not the session key
    let wrong = crypto::seal_payload(b"99999999999999999999999999999999", b"{}").unwrap();
    Mock::given(method("POST"))
        .and(path("/ewayapi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": 1,
            "data": wrong
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.generate(&generate_request()).await.unwrap_err();
    assert!(matches!(err, ComplianceError::Crypto(_)), "got {:?}", err);
    // mock expectations verify: two handshakes, two operation attempts
}
