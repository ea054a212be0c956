use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use ynab_wise::statement::{APPROVAL_HEADER, SIGNATURE_HEADER};
use ynab_wise::{
    balances_for_all, fetch_balances, fetch_statement, sync_statements, ApiRequest, ApiResponse,
    ApiTransport, DateRange, FetchError, RemoteConfig,
};

/// Replays canned responses in order and records every request it sees.
struct ScriptedTransport {
    responses: Mutex<VecDeque<ApiResponse>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    fn new(responses: Vec<ApiResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiTransport for ScriptedTransport {
    async fn get(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.requests.lock().unwrap().push(request);
        match self.responses.lock().unwrap().pop_front() {
            Some(r) => Ok(r),
            None => bail!("no scripted response left"),
        }
    }
}

const CHALLENGE: &str = "f5a9c1e2-challenge";
// openssl dgst -sha256 -sign tests/fixtures/stepup_key.pem | base64
const SIGNATURE: &str = "PbYTGCbrbMAUAWO7rhHfHJz5bqfB5OV1tThhTJhTYSPKv58XZEaHfvwVH3LQYA3v6V5t7MraTpTE2vQTUf45io1h5lDCz3LhA4YJ58EWwDE7b9rpUYXAHurYto+a/UghiuXjLGymsQZg7P2hfEVJ/KBl6JbxljcV7403Q+rescYysJAbMQegWI9BWYgo7AuO+/l9NQ71X1oMvzSLPGnhqW/aEcoKQ84iSuM4pUgXwzu3h6S80onXlTz3DPZtqg0JIzLx22EYpXcfAM4Qzes4Yb/5qhlOJJ1Bbs33u+aVMBD/GakcX8MQVId3EVD7MEYWmq0r9vAI8WXesJ/TZocMYg==";

const STATEMENT: &str = r#"{
    "accountHolder": {"type": "PERSONAL", "firstName": "Jane", "lastName": "Doe"},
    "transactions": [{
        "type": "DEBIT",
        "date": "2024-03-01T09:15:00.000Z",
        "amount": {"value": -40.00, "currency": "EUR"},
        "totalFees": {"value": 1.20, "currency": "EUR"},
        "details": {"type": "TRANSFER", "description": "Rent, March"},
        "referenceNumber": "TRANSFER-1"
    }]
}"#;

fn key_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/stepup_key.pem")
}

fn config(name: &str, key: Option<PathBuf>) -> RemoteConfig {
    RemoteConfig {
        account_id: "111".into(),
        profile_id: "222".into(),
        currency: "EUR".into(),
        token: "secret".into(),
        name: name.into(),
        private_key_path: key,
        api_url: "http://localhost".into(),
    }
}

fn march() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
    )
    .unwrap()
}

fn rejected() -> ApiResponse {
    ApiResponse::new(403, "")
        .with_header("x-2fa-approval-result", "REJECTED")
        .with_header("x-2fa-approval", CHALLENGE)
}

#[tokio::test]
async fn test_statement_request_shape() {
    let transport = ScriptedTransport::new(vec![ApiResponse::new(200, STATEMENT)]);
    fetch_statement(&transport, &config("jane", None), &march())
        .await
        .unwrap();

    let reqs = transport.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(
        reqs[0].path,
        "/v3/profiles/222/borderless-accounts/111/statement.json"
    );
    assert!(reqs[0].query.contains(&("currency".into(), "EUR".into())));
    assert!(reqs[0]
        .query
        .contains(&("intervalStart".into(), "2024-03-01T00:00:00.000Z".into())));
    assert!(reqs[0]
        .query
        .contains(&("intervalEnd".into(), "2024-03-31T23:59:59.999Z".into())));
    assert_eq!(reqs[0].header_value("authorization"), Some("Bearer secret"));
    assert_eq!(reqs[0].header_value(APPROVAL_HEADER), None);
}

#[tokio::test]
async fn test_debit_becomes_outflow_record() {
    let transport = ScriptedTransport::new(vec![ApiResponse::new(200, STATEMENT)]);
    let statement = fetch_statement(&transport, &config("jane", None), &march())
        .await
        .unwrap();
    assert_eq!(statement.account_holder.canonical_name(), "jane-doe");

    let csv = ynab_core::records_to_csv(&statement.into_records()).unwrap();
    assert_eq!(
        csv,
        "Memo,Inflow,Outflow,Date\nRent March (fees: 1.2),,40,2024-03-01\n"
    );
}

#[tokio::test]
async fn test_step_up_retries_once_with_signature() {
    let transport = ScriptedTransport::new(vec![rejected(), ApiResponse::new(200, STATEMENT)]);
    let statement = fetch_statement(&transport, &config("jane", Some(key_path())), &march())
        .await
        .unwrap();
    assert_eq!(statement.transactions.len(), 1);

    let reqs = transport.requests();
    assert_eq!(reqs.len(), 2, "exactly one retry");
    assert_eq!(reqs[1].header_value(APPROVAL_HEADER), Some(CHALLENGE));
    assert_eq!(reqs[1].header_value(SIGNATURE_HEADER), Some(SIGNATURE));
    // retry is otherwise the identical request
    assert_eq!(reqs[1].path, reqs[0].path);
    assert_eq!(reqs[1].query, reqs[0].query);
}

#[tokio::test]
async fn test_second_rejection_is_terminal() {
    let transport = ScriptedTransport::new(vec![rejected(), rejected(), ApiResponse::new(200, STATEMENT)]);
    let err = fetch_statement(&transport, &config("jane", Some(key_path())), &march())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::StepUpRejected));
    assert_eq!(transport.requests().len(), 2);
}

#[tokio::test]
async fn test_step_up_without_key_is_no_data() {
    let transport = ScriptedTransport::new(vec![rejected()]);
    let err = fetch_statement(&transport, &config("jane", None), &march())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::MissingPrivateKey { .. }));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_http_error_is_no_data() {
    let transport = ScriptedTransport::new(vec![ApiResponse::new(401, "invalid token")]);
    let err = fetch_statement(&transport, &config("jane", None), &march())
        .await
        .unwrap_err();
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid token");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_accounts_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let good = Arc::new(ScriptedTransport::new(vec![rejected(), ApiResponse::new(200, STATEMENT)]));
    let bad = Arc::new(ScriptedTransport::new(vec![ApiResponse::new(500, "boom")]));

    let configs = vec![config("broken", None), config("jane", Some(key_path()))];
    let good_t = good.clone();
    let bad_t = bad.clone();
    let outcomes = sync_statements(configs, march(), dir.path().to_path_buf(), move |cfg| {
        if cfg.name == "broken" {
            bad_t.clone() as Arc<dyn ApiTransport>
        } else {
            good_t.clone() as Arc<dyn ApiTransport>
        }
    })
    .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].account, "broken");
    assert!(outcomes[0].result.is_err());
    assert_eq!(outcomes[1].account, "jane");
    let written = outcomes[1].result.as_ref().unwrap();
    assert_eq!(written, &dir.path().join("jane-doe.csv"));

    let text = std::fs::read_to_string(written).unwrap();
    assert_eq!(text, "Memo,Inflow,Outflow,Date\nRent March (fees: 1.2),,40,2024-03-01\n");
    assert_eq!(good.requests().len(), 2);
    assert_eq!(bad.requests().len(), 1);
}

const BALANCES: &str = r#"[
    {"id": 1, "currency": "EUR", "amount": {"value": 1520.35, "currency": "EUR"}, "type": "STANDARD"}
]"#;

#[tokio::test]
async fn test_balances_request_shape() {
    let transport = ScriptedTransport::new(vec![ApiResponse::new(200, BALANCES)]);
    let balances = fetch_balances(&transport, &config("jane", None)).await.unwrap();
    assert_eq!(balances.len(), 1);
    assert_eq!(balances[0].to_string(), "1520.35 EUR");

    let reqs = transport.requests();
    assert_eq!(reqs.len(), 1);
    assert_eq!(reqs[0].path, "/v4/profiles/222/balances");
    assert_eq!(reqs[0].query, vec![("types".to_string(), "STANDARD".to_string())]);
    assert_eq!(reqs[0].header_value("authorization"), Some("Bearer secret"));
}

#[tokio::test]
async fn test_balances_http_error() {
    let transport = ScriptedTransport::new(vec![ApiResponse::new(403, "forbidden")]);
    let err = fetch_balances(&transport, &config("jane", None)).await.unwrap_err();
    match err {
        FetchError::Status { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "forbidden");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_balance_accounts_are_isolated() {
    let good = Arc::new(ScriptedTransport::new(vec![ApiResponse::new(200, BALANCES)]));
    let bad = Arc::new(ScriptedTransport::new(vec![ApiResponse::new(500, "boom")]));

    let configs = vec![config("broken", None), config("jane", None)];
    let good_t = good.clone();
    let bad_t = bad.clone();
    let outcomes = balances_for_all(configs, move |cfg| {
        if cfg.name == "broken" {
            bad_t.clone() as Arc<dyn ApiTransport>
        } else {
            good_t.clone() as Arc<dyn ApiTransport>
        }
    })
    .await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].account, "broken");
    assert!(outcomes[0].result.is_err());
    assert_eq!(outcomes[1].account, "jane");
    let balances = outcomes[1].result.as_ref().unwrap();
    assert_eq!(balances[0].currency, "EUR");
}

#[tokio::test]
async fn test_no_configured_accounts() {
    let dir = tempfile::tempdir().unwrap();
    let connect = |_: &RemoteConfig| -> Arc<dyn ApiTransport> {
        Arc::new(ScriptedTransport::new(Vec::new()))
    };

    let outcomes = sync_statements(Vec::new(), march(), dir.path().to_path_buf(), connect).await;
    assert!(outcomes.is_empty());
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);

    let outcomes = balances_for_all(Vec::new(), connect).await;
    assert!(outcomes.is_empty());
}
