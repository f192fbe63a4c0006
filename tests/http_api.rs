mod common;

use job_chat::build_rocket;
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

async fn client_with(fail_model: bool) -> Client {
    Client::tracked(build_rocket(common::app_state(fail_model).await, &common::config()))
        .await
        .unwrap()
}

fn profile(email: &str) -> Value {
    json!({
        "name": "Casey Rivera",
        "email": email,
        "phone": "+1-555-0100",
        "location": "Portland, OR",
        "skills": ["TypeScript", "Rust"],
        "experience": ["Frontend lead at Widgets"],
        "profile_summary": "Frontend engineer moving to backend",
        "certificationsAndAchievementsAndAwards": ["AWS SAA"]
    })
}

async fn onboard(client: &Client, email: &str) -> Value {
    let response = client
        .post("/api/confirmOnboardingDetails")
        .header(ContentType::JSON)
        .body(profile(email).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response.into_json::<Value>().await.unwrap()
}

async fn create_chat(client: &Client, email: &str) -> Value {
    let response = client
        .post("/api/createChat")
        .header(ContentType::JSON)
        .body(json!({ "email": email }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    response.into_json::<Value>().await.unwrap()
}

#[rocket::async_test]
async fn health_reports_ok_with_cors() {
    let client = client_with(false).await;
    let response = client.get("/api/health").dispatch().await;

    assert_eq!(response.status(), Status::Ok);
    assert_eq!(
        response.headers().get_one("Access-Control-Allow-Origin"),
        Some("*")
    );
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["type"], "text");
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "OK");
}

#[rocket::async_test]
async fn options_preflight_is_accepted() {
    let client = client_with(false).await;
    let response = client.options("/api/sendMessage").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
}

#[rocket::async_test]
async fn onboarding_creates_then_updates() {
    let client = client_with(false).await;

    let created = onboard(&client, "casey@example.com").await;
    assert_eq!(created["message"], "User onboarded successfully");
    assert!(created["id"].is_string());

    let updated = onboard(&client, "Casey@Example.com").await;
    assert_eq!(updated["message"], "User details updated successfully");
    assert_eq!(updated["email"], "casey@example.com");
}

#[rocket::async_test]
async fn invalid_email_is_rejected() {
    let client = client_with(false).await;
    let response = client
        .post("/api/confirmOnboardingDetails")
        .header(ContentType::JSON)
        .body(profile("not-an-email").to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::BadRequest);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], "BAD_REQUEST");
}

#[rocket::async_test]
async fn unknown_user_is_not_found() {
    let client = client_with(false).await;

    let response = client
        .get("/api/getSavedJobs?email=ghost@example.com")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error"], "User not found");

    let response = client
        .get("/api/chatHistoryRequest?email=ghost@example.com")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);
}

#[rocket::async_test]
async fn profile_update_requires_fields() {
    let client = client_with(false).await;
    onboard(&client, "casey@example.com").await;

    let empty = client
        .post("/api/updateUserProfile")
        .header(ContentType::JSON)
        .body(json!({ "email": "casey@example.com" }).to_string())
        .dispatch()
        .await;
    assert_eq!(empty.status(), Status::BadRequest);

    let update = client
        .post("/api/updateUserProfile")
        .header(ContentType::JSON)
        .body(json!({ "email": "casey@example.com", "location": "Remote" }).to_string())
        .dispatch()
        .await;
    assert_eq!(update.status(), Status::Ok);
    let body: Value = update.into_json().await.unwrap();
    assert_eq!(body["message"], "User profile updated successfully");
}

#[rocket::async_test]
async fn saved_and_applied_jobs() {
    let client = client_with(false).await;
    onboard(&client, "casey@example.com").await;

    let job = json!({
        "email": "casey@example.com",
        "job_id": "job-1",
        "job_title": "Backend Engineer",
        "company_name": "Acme",
        "job_link": "https://acme.example.com/jobs/1"
    });

    for _ in 0..2 {
        let response = client
            .post("/api/saveJob")
            .header(ContentType::JSON)
            .body(job.to_string())
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
    }

    let saved: Value = client
        .get("/api/getSavedJobs?email=casey@example.com")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(saved["saved_jobs"].as_array().unwrap().len(), 1);
    assert_eq!(saved["saved_jobs"][0]["company_name"], "Acme");

    let applied = client
        .post("/api/applyJob")
        .header(ContentType::JSON)
        .body(job.to_string())
        .dispatch()
        .await;
    let body: Value = applied.into_json().await.unwrap();
    assert_eq!(body["message"], "Job applied successfully");

    client
        .post("/api/unsaveJob")
        .header(ContentType::JSON)
        .body(job.to_string())
        .dispatch()
        .await;

    let saved: Value = client
        .get("/api/getSavedJobs?email=casey@example.com")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert!(saved["saved_jobs"].as_array().unwrap().is_empty());

    let applied: Value = client
        .get("/api/getAppliedJobs?email=casey@example.com")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(applied["applied_jobs"][0]["job_id"], "job-1");
}

#[rocket::async_test]
async fn chat_round_trip() {
    let client = client_with(false).await;
    onboard(&client, "casey@example.com").await;

    let created = create_chat(&client, "casey@example.com").await;
    assert_eq!(created["chat_name"], "New Chat");
    assert!(created["initial_message"]
        .as_str()
        .unwrap()
        .starts_with("Hi Casey!"));
    let chat_id = created["chat_id"].as_str().unwrap().to_string();

    let reply = client
        .post("/api/sendMessage")
        .header(ContentType::JSON)
        .body(
            json!({
                "email": "casey@example.com",
                "chat_id": chat_id,
                "message": "Looking for remote Rust roles"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(reply.status(), Status::Ok);
    let reply: Value = reply.into_json().await.unwrap();
    assert_eq!(reply["message"], "You said: Looking for remote Rust roles");
    assert!(reply["jobs"].is_null());
    assert_eq!(reply["chat_name"], "Looking for remote Rust roles");

    let transcript: Value = client
        .get(format!(
            "/api/getChatMessages?email=casey@example.com&chat_id={}",
            chat_id
        ))
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    let messages = transcript["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0]["sender"], "bot");
    assert_eq!(messages[1]["sender"], "user");

    let history: Value = client
        .get("/api/chatHistoryRequest?email=casey@example.com")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(history["chats"][0]["chat_id"], chat_id.as_str());
    assert_eq!(history["chats"][0]["chat_name"], "Looking for remote Rust roles");

    let deleted = client
        .post(format!(
            "/api/deleteChatSession?email=casey@example.com&chat_id={}",
            chat_id
        ))
        .dispatch()
        .await;
    assert_eq!(deleted.status(), Status::Ok);

    let history: Value = client
        .get("/api/chatHistoryRequest?email=casey@example.com")
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert!(history["chats"].as_array().unwrap().is_empty());
}

#[rocket::async_test]
async fn send_message_errors() {
    let client = client_with(true).await;
    onboard(&client, "casey@example.com").await;
    // profile brief falls back to the digest when the model is down
    let created = create_chat(&client, "casey@example.com").await;
    let chat_id = created["chat_id"].as_str().unwrap().to_string();

    let blank = client
        .post("/api/sendMessage")
        .header(ContentType::JSON)
        .body(json!({"email": "casey@example.com", "chat_id": chat_id, "message": " "}).to_string())
        .dispatch()
        .await;
    assert_eq!(blank.status(), Status::BadRequest);

    let upstream = client
        .post("/api/sendMessage")
        .header(ContentType::JSON)
        .body(json!({"email": "casey@example.com", "chat_id": chat_id, "message": "hi"}).to_string())
        .dispatch()
        .await;
    assert_eq!(upstream.status(), Status::BadGateway);
    let body: Value = upstream.into_json().await.unwrap();
    assert_eq!(body["error_code"], "ASSISTANT_UNAVAILABLE");
    assert_eq!(body["error"], "The assistant is unavailable");

    let unknown_chat = client
        .post("/api/sendMessage")
        .header(ContentType::JSON)
        .body(
            json!({
                "email": "casey@example.com",
                "chat_id": "00000000-0000-4000-8000-000000000000",
                "message": "hi"
            })
            .to_string(),
        )
        .dispatch()
        .await;
    assert_eq!(unknown_chat.status(), Status::NotFound);

    let malformed = client
        .post("/api/deleteChatSession?email=casey@example.com&chat_id=abc")
        .dispatch()
        .await;
    assert_eq!(malformed.status(), Status::BadRequest);

    let transcript: Value = client
        .get(format!(
            "/api/getChatMessages?email=casey@example.com&chat_id={}",
            chat_id
        ))
        .dispatch()
        .await
        .into_json()
        .await
        .unwrap();
    assert_eq!(transcript["messages"].as_array().unwrap().len(), 1);
}

#[rocket::async_test]
async fn malformed_body_uses_error_envelope() {
    let client = client_with(false).await;
    let response = client
        .post("/api/createChat")
        .header(ContentType::JSON)
        .body("{\"nope\": true}")
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::UnprocessableEntity);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["success"], false);
}
