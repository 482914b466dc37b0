//! Telegram client against a mock Bot API.

use docbrief::telegram::{ChatTransport, TelegramClient};
use docbrief::DocBriefError;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "123:abc";

fn client(server: &MockServer) -> TelegramClient {
    TelegramClient::new(server.uri(), TOKEN, 1).expect("client should build")
}

fn ok(result: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"ok": true, "result": result}))
}

fn sent_message(chat_id: i64, text: &str) -> Value {
    json!({"message_id": 99, "chat": {"id": chat_id, "type": "private"}, "date": 0, "text": text})
}

#[tokio::test]
async fn get_updates_sends_offset_and_parses_messages() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .and(body_partial_json(json!({"offset": 7, "timeout": 1, "allowed_updates": ["message"]})))
        .respond_with(ok(json!([
            {"update_id": 7, "message": {
                "message_id": 1, "date": 0,
                "chat": {"id": 42, "type": "private"},
                "from": {"id": 42, "is_bot": false, "first_name": "Анна"},
                "text": "Привет"
            }}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let updates = client(&server).get_updates(Some(7)).await.unwrap();
    assert_eq!(updates.len(), 1);
    let message = updates[0].message.as_ref().unwrap();
    assert_eq!(message.text.as_deref(), Some("Привет"));
    assert_eq!(message.from.as_ref().unwrap().first_name, "Анна");
}

#[tokio::test]
async fn api_refusal_is_a_typed_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getUpdates", TOKEN)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "ok": false, "error_code": 401, "description": "Unauthorized"
        })))
        .mount(&server)
        .await;

    let err = client(&server).get_updates(None).await.unwrap_err();
    match err {
        DocBriefError::TelegramApi {
            method,
            description,
        } => {
            assert_eq!(method, "getUpdates");
            assert_eq!(description, "Unauthorized");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[tokio::test]
async fn menu_carries_reply_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .and(body_partial_json(json!({
            "chat_id": 42,
            "text": "Привет!",
            "reply_markup": {
                "keyboard": [[{"text": "Инфо"}, {"text": "Помощь"}]],
                "resize_keyboard": true
            }
        })))
        .respond_with(ok(sent_message(42, "Привет!")))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .send_menu(42, "Привет!", &["Инфо", "Помощь"])
        .await
        .unwrap();
}

#[tokio::test]
async fn long_text_is_sent_in_chunks() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/sendMessage", TOKEN)))
        .respond_with(ok(sent_message(1, "chunk")))
        .expect(2)
        .mount(&server)
        .await;

    let text = "ы".repeat(5000);
    client(&server).send_text(1, &text).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let total: usize = requests
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            body["text"].as_str().unwrap().chars().count()
        })
        .sum();
    assert_eq!(total, 5000);
}

#[tokio::test]
async fn download_resolves_file_path_then_fetches_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getFile", TOKEN)))
        .and(body_partial_json(json!({"file_id": "FILE1"})))
        .respond_with(ok(json!({"file_id": "FILE1", "file_path": "documents/file_1.pdf"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/file/bot{}/documents/file_1.pdf", TOKEN)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.7 fake".to_vec()))
        .mount(&server)
        .await;

    let bytes = client(&server).download("FILE1").await.unwrap();
    assert_eq!(bytes, b"%PDF-1.7 fake");
}

#[tokio::test]
async fn missing_file_path_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/bot{}/getFile", TOKEN)))
        .respond_with(ok(json!({"file_id": "FILE1"})))
        .mount(&server)
        .await;

    let err = client(&server).download("FILE1").await.unwrap_err();
    assert!(matches!(err, DocBriefError::TelegramApi { .. }));
}

#[tokio::test]
async fn transport_errors_do_not_leak_the_token() {
    let dead_uri = {
        let server = MockServer::start().await;
        server.uri()
    };
    let dead = TelegramClient::new(dead_uri, TOKEN, 1).unwrap();

    let err = dead.get_updates(None).await.unwrap_err();
    assert!(matches!(err, DocBriefError::Http(_)));
    assert!(!err.to_string().contains(TOKEN));
}
