use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

use task_reward_app::session::NoticeKind;
use task_reward_app::{AppConfig, RefreshOutcome, Session, SyncError};

const ACCOUNT: &str = "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266";
const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

fn rpc_result(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "jsonrpc": "2.0",
        "id": 1,
        "result": result,
    }))
}

async fn node_with_accounts() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_requestAccounts" })))
        .respond_with(rpc_result(json!([ACCOUNT])))
        .mount(&server)
        .await;
    server
}

fn config_for(server: &MockServer) -> AppConfig {
    AppConfig {
        rpc_url: server.uri(),
        contract_address: Some(CONTRACT.to_string()),
        request_timeout_secs: 5,
        ..AppConfig::default()
    }
}

#[tokio::test]
async fn connect_against_empty_contract_publishes_no_tasks() {
    let server = node_with_accounts().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .respond_with(rpc_result(json!(format!("0x{}", "0".repeat(64)))))
        .expect(1)
        .mount(&server)
        .await;

    let config = config_for(&server);
    let contract = config.build_contract().expect("contract");
    let mut session = Session::new(std::sync::Arc::new(contract));

    let outcome = session.connect().await.expect("connect");

    assert!(matches!(outcome, RefreshOutcome::Published { count: 0 }));
    assert_eq!(session.account(), Some(ACCOUNT.parse().expect("address")));
    assert!(session.visible_tasks().is_empty());
}

#[tokio::test]
async fn unavailable_node_is_reported_as_connectivity() {
    let server = node_with_accounts().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "eth_call" })))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let config = config_for(&server);
    let mut session = Session::new(std::sync::Arc::new(config.build_contract().expect("contract")));

    let outcome = session.connect().await.expect("connect");

    let RefreshOutcome::Failed(err) = &outcome else {
        panic!("expected a failed refresh, got {outcome:?}");
    };
    assert!(matches!(err, SyncError::Count(_)));
    let notice = outcome.notice().expect("notice");
    assert_eq!(notice.kind, NoticeKind::Connectivity);
    assert!(session.snapshot().is_none());
}
