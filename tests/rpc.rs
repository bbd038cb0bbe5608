//! JSON-RPC chain client against a mock node.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use zigzag::config::ChainConfig;
use zigzag::mint::{MintError, MintService, RpcChainClient};

const MINTER: &str = "0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed";
const CONTRACT: &str = "0xfb6916095ca1df60bb79ce92ce3ea74c37c5d359";
const WALLET: &str = "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB";
const TX_HASH: &str = "0x9fc76417374aa880d4449a1f7f31ec597f00b1f6f3dd2d66f4c9c6c445836d8b";

#[derive(Clone, Copy)]
enum Scenario {
    /// One pending poll, then a successful receipt.
    Mined,
    Reverted,
    Locked,
    NeverMined,
}

struct MockNode {
    scenario: Scenario,
    receipt_polls: AtomicUsize,
    sent: Mutex<Vec<Value>>,
}

async fn handle(State(node): State<Arc<MockNode>>, Json(request): Json<Value>) -> Json<Value> {
    let id = request["id"].clone();
    let result = match request["method"].as_str().unwrap_or_default() {
        "personal_sendTransaction" => {
            node.sent.lock().unwrap().push(request["params"].clone());
            if let Scenario::Locked = node.scenario {
                return Json(json!({
                    "jsonrpc": "2.0",
                    "id": id,
                    "error": {"code": -32000, "message": "could not decrypt key with given password"},
                }));
            }
            json!(TX_HASH)
        }
        "eth_getTransactionReceipt" => {
            let poll = node.receipt_polls.fetch_add(1, Ordering::SeqCst) + 1;
            match node.scenario {
                Scenario::Mined if poll >= 2 => {
                    json!({"transactionHash": TX_HASH, "status": "0x1"})
                }
                Scenario::Reverted => json!({"transactionHash": TX_HASH, "status": "0x0"}),
                _ => Value::Null,
            }
        }
        _ => Value::Null,
    };
    Json(json!({"jsonrpc": "2.0", "id": id, "result": result}))
}

async fn spawn_node(scenario: Scenario) -> (String, Arc<MockNode>) {
    let node = Arc::new(MockNode {
        scenario,
        receipt_polls: AtomicUsize::new(0),
        sent: Mutex::new(Vec::new()),
    });
    let app = Router::new().route("/", post(handle)).with_state(node.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/"), node)
}

fn service(url: String) -> MintService {
    let config = ChainConfig {
        rpc_url: Some(url),
        minter_account: Some(MINTER.into()),
        minter_passphrase: Some("hunter2".into()),
        contract_address: Some(CONTRACT.into()),
        poll_interval_ms: 5,
        max_polls: 3,
        ..ChainConfig::default()
    };
    MintService::new(Arc::new(RpcChainClient::from_config(&config).unwrap()))
}

#[tokio::test]
async fn waits_for_the_receipt() {
    let (url, node) = spawn_node(Scenario::Mined).await;
    let receipt = service(url).mint("piece-1", WALLET).await.unwrap();

    assert_eq!(receipt.transaction_hash, TX_HASH);
    assert_eq!(node.receipt_polls.load(Ordering::SeqCst), 2);

    let sent = node.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let params = &sent[0];
    assert_eq!(params[0]["from"], json!(MINTER));
    assert_eq!(params[0]["to"], json!(CONTRACT));
    assert_eq!(params[1], json!("hunter2"));

    let data = params[0]["data"].as_str().unwrap();
    assert_eq!(data.len(), 2 + 8 + 64 + 64);
    assert!(data.contains(&WALLET[2..].to_lowercase()));
    let token_id: u64 = receipt.token_id.parse().unwrap();
    assert!(data.ends_with(&format!("{token_id:016x}")));
}

#[tokio::test]
async fn reverted_transaction_is_an_error() {
    let (url, _) = spawn_node(Scenario::Reverted).await;
    let err = service(url).mint("piece-1", WALLET).await.unwrap_err();
    assert!(matches!(err, MintError::Reverted(hash) if hash == TX_HASH));
}

#[tokio::test]
async fn rpc_errors_are_reported() {
    let (url, node) = spawn_node(Scenario::Locked).await;
    let err = service(url).mint("piece-1", WALLET).await.unwrap_err();
    assert!(matches!(err, MintError::Rpc { code: -32000, .. }));
    assert_eq!(node.receipt_polls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn gives_up_after_max_polls() {
    let (url, node) = spawn_node(Scenario::NeverMined).await;
    let err = service(url).mint("piece-1", WALLET).await.unwrap_err();
    assert!(matches!(err, MintError::ReceiptTimeout { polls: 3, .. }));
    assert_eq!(node.receipt_polls.load(Ordering::SeqCst), 3);
    // one submission, no retries
    assert_eq!(node.sent.lock().unwrap().len(), 1);
}
