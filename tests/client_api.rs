mod common;

use std::net::TcpListener;
use std::time::Duration;

use job_chat::build_rocket;
use job_chat::client::{ApiClient, ClientError};
use job_chat::session::{ChatPage, EntryStatus, SessionError};
use job_chat::types::{Sender, UserProfile};

const EMAIL: &str = "casey@example.com";

/// Launch the API on a free local port and wait until it answers
async fn serve(fail_model: bool) -> ApiClient {
    let port = TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let mut config = common::config();
    config.environment.address = "127.0.0.1".to_string();
    config.environment.port = port;

    let rocket = build_rocket(common::app_state(fail_model).await, &config);
    tokio::spawn(rocket.launch());

    let client = ApiClient::new(&format!("http://127.0.0.1:{}", port)).unwrap();
    for _ in 0..50 {
        if client.health().await.is_ok() {
            return client;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("server did not come up on port {}", port);
}

fn profile() -> UserProfile {
    UserProfile {
        name: "Casey Rivera".to_string(),
        email: EMAIL.to_string(),
        phone: "+1-555-0100".to_string(),
        location: "Portland, OR".to_string(),
        skills: vec!["TypeScript".to_string(), "Rust".to_string()],
        experience: vec!["Frontend lead at Widgets".to_string()],
        profile_summary: "Frontend engineer moving to backend".to_string(),
        education: None,
        certifications: Some(vec!["AWS SAA".to_string()]),
        projects: None,
        about: None,
    }
}

fn api_error(error: &anyhow::Error) -> &ClientError {
    error
        .downcast_ref::<ClientError>()
        .expect("error should carry the server envelope")
}

#[tokio::test(flavor = "multi_thread")]
async fn chat_page_against_live_server() {
    let client = serve(false).await;

    let health = client.health().await.unwrap();
    assert!(health.success);
    assert_eq!(health.message, "OK");

    let confirmation = client.confirm_onboarding(&profile()).await.unwrap();
    assert_eq!(confirmation.message, "User onboarded successfully");

    let mut page = ChatPage::new(EMAIL);
    page.load(&client).await.unwrap();
    assert!(page.chats().is_empty());

    page.new_chat(&client).await.unwrap();
    assert_eq!(page.chats().len(), 1);
    let greeting = &page.active().unwrap().entries[0];
    assert!(matches!(greeting.sender, Sender::Bot));
    assert!(greeting.message.starts_with("Hi Casey!"));

    page.send(&client, "Looking for remote Rust roles")
        .await
        .unwrap();
    let active = page.active().unwrap();
    assert_eq!(active.entries.len(), 3);
    assert!(active.entries.iter().all(|e| e.status == EntryStatus::Sent));
    assert_eq!(
        active.entries[2].message,
        "You said: Looking for remote Rust roles"
    );
    assert_eq!(page.chats()[0].chat_name, "Looking for remote Rust roles");

    let chat_id = page.chats()[0].chat_id.clone();
    let transcript = client.chat_messages(EMAIL, &chat_id).await.unwrap();
    assert_eq!(transcript.messages.len(), 3);
    assert_eq!(transcript.chat_name, "Looking for remote Rust roles");

    // a fresh page sees what the first one stored
    let mut reloaded = ChatPage::new(EMAIL);
    reloaded.load(&client).await.unwrap();
    assert_eq!(reloaded.chats()[0].chat_id, chat_id);

    page.delete_chat(&client, &chat_id).await.unwrap();
    assert!(page.chats().is_empty());
    assert!(page.active().is_none());
    assert!(client.chat_history(EMAIL).await.unwrap().chats.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_user_gets_the_error_envelope() {
    let client = serve(false).await;

    let err = client.chat_history("ghost@example.com").await.unwrap_err();
    assert_eq!(
        api_error(&err),
        &ClientError::Api {
            status: 404,
            code: "USER_NOT_FOUND".to_string(),
            message: "User not found".to_string(),
        }
    );

    let mut page = ChatPage::new("ghost@example.com");
    match page.load(&client).await {
        Err(SessionError::Backend(e)) => assert_eq!(api_error(&e).status(), 404),
        other => panic!("unexpected load result: {:?}", other.map(|_| ())),
    }
    assert!(page.last_error().is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn assistant_outage_restores_the_draft() {
    let client = serve(true).await;
    client.confirm_onboarding(&profile()).await.unwrap();

    let mut page = ChatPage::new(EMAIL);
    page.load(&client).await.unwrap();
    page.new_chat(&client).await.unwrap();

    match page.send(&client, "hi there").await {
        Err(SessionError::Backend(e)) => match api_error(&e) {
            ClientError::Api { status, code, .. } => {
                assert_eq!(*status, 502);
                assert_eq!(code, "ASSISTANT_UNAVAILABLE");
            }
            other => panic!("unexpected client error: {}", other),
        },
        other => panic!("unexpected send result: {:?}", other.map(|_| ())),
    }
    assert_eq!(page.draft(), "hi there");
    assert_eq!(page.active().unwrap().entries.len(), 1);
    assert!(!page.is_sending());
}
