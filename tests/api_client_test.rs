//! Integration tests for the backend API client against a mock server.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use toolboxx_assist::api::ApiClient;
use toolboxx_assist::config::ApiConfig;
use toolboxx_assist::error::AssistError;

fn client_for(server: &MockServer) -> ApiClient {
    let config = ApiConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    };
    ApiClient::new(&config).expect("client init failed")
}

#[tokio::test]
async fn test_chat_sends_null_conversation_id_for_new_conversation() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "message": "What is probate?",
            "conversation_id": null,
            "use_history": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Probate is...",
            "conversation_id": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client.chat("What is probate?", None).await.unwrap();

    assert_eq!(response.answer, "Probate is...");
    assert_eq!(response.conversation_id, 11);
}

#[tokio::test]
async fn test_chat_sends_numeric_conversation_id_when_active() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .and(body_json(json!({
            "message": "And then?",
            "conversation_id": 11,
            "use_history": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Then...",
            "conversation_id": 11
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client.chat("And then?", Some(11)).await.unwrap();
    assert_eq!(response.conversation_id, 11);
}

#[tokio::test]
async fn test_chat_non_success_is_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "detail": "model unavailable"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.chat("hi", None).await.unwrap_err();

    match err.downcast_ref::<AssistError>() {
        Some(AssistError::Api(message)) => assert!(message.contains("model unavailable")),
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_success_returns_token_and_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({
            "email": "user@example.test",
            "password": "secret1"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-abc",
            "token_type": "bearer",
            "user": {
                "id": 9,
                "email": "user@example.test",
                "is_active": true,
                "created_at": "2026-01-01T00:00:00Z"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client.login("user@example.test", "secret1").await.unwrap();

    assert_eq!(response.access_token, "tok-abc");
    assert_eq!(response.user.email, "user@example.test");
}

#[tokio::test]
async fn test_login_rejection_carries_server_detail() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect email or password"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login("user@example.test", "wrong").await.unwrap_err();

    match err.downcast_ref::<AssistError>() {
        Some(AssistError::Authentication(message)) => {
            assert_eq!(message, "Incorrect email or password");
        }
        other => panic!("expected Authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_login_rejection_without_detail_uses_fallback() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.login("user@example.test", "pw").await.unwrap_err();

    match err.downcast_ref::<AssistError>() {
        Some(AssistError::Authentication(message)) => assert_eq!(message, "Login failed"),
        other => panic!("expected Authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_register_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-new",
            "token_type": "bearer",
            "user": { "id": 10, "email": "new@example.test" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client.register("new@example.test", "secret1").await.unwrap();
    assert_eq!(response.user.id, 10);
}

#[tokio::test]
async fn test_conversations_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversations": [
                {
                    "id": 1,
                    "title": "Older",
                    "created_at": "2026-07-01T10:00:00Z",
                    "updated_at": "2026-07-01T10:00:00Z",
                    "message_count": 4
                },
                {
                    "id": 2,
                    "title": "Newer",
                    "created_at": "2026-08-01T10:00:00Z",
                    "updated_at": "2026-08-01T10:00:00Z",
                    "message_count": 2
                }
            ],
            "total": 2
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let conversations = client.conversations().await.unwrap();

    assert_eq!(conversations.len(), 2);
    assert_eq!(conversations[0].id, 1);
    assert_eq!(conversations[1].title.as_deref(), Some("Newer"));
}

#[tokio::test]
async fn test_conversation_messages_bare_array() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/5/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "role": "user", "content": "hello" },
            { "role": "assistant", "content": "hi" }
        ])))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = client.conversation_messages(5).await.unwrap();

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, "user");
    assert_eq!(messages[1].content, "hi");
}

#[tokio::test]
async fn test_conversation_messages_wrapped_object() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/chat/6/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "messages": [ { "role": "assistant", "content": "only one" } ]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let messages = client.conversation_messages(6).await.unwrap();
    assert_eq!(messages.len(), 1);
}

#[tokio::test]
async fn test_delete_conversation() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/conversations/3"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client.delete_conversation(3).await.unwrap();
}

#[tokio::test]
async fn test_submissions_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/submissions"))
        .and(header("authorization", "Bearer tok-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 1,
                "questionnaire_title": "Will Writing",
                "step": 4,
                "is_complete": false
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let submissions = client.submissions("tok-abc").await.unwrap();

    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].questionnaire_title, "Will Writing");
    assert_eq!(submissions[0].step, 4);
}

#[tokio::test]
async fn test_submissions_401_is_authentication_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/submissions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Could not validate credentials"
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.submissions("stale-token").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<AssistError>(),
        Some(AssistError::Authentication(_))
    ));
}

#[tokio::test]
async fn test_unreachable_server_is_http_error() {
    // Port 1 is never listening.
    let config = ApiConfig {
        base_url: "http://127.0.0.1:1/api/v1".to_string(),
        timeout_seconds: 1,
    };
    let client = ApiClient::new(&config).expect("client init failed");

    let err = client.chat("hi", None).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<AssistError>(),
        Some(AssistError::Http(_))
    ));
}
