use crate::helpers::{register_body, spawn_app};

#[tokio::test]
async fn test_register_returns_201_with_a_user_id() {
    let app = spawn_app().await;

    let response = app
        .post_register(&register_body(
            "alice@example.com",
            "Passw0rd",
            "alice",
            "Alice A.",
        ))
        .await;

    assert_eq!(response.status().as_u16(), 201);

    let body: serde_json::Value = response.json().await.unwrap();
    let user_id = body["userId"].as_str().unwrap();
    assert!(uuid::Uuid::parse_str(user_id).is_ok());
}

#[tokio::test]
async fn test_register_taken_username_returns_409() {
    let app = spawn_app().await;

    app.post_register(&register_body(
        "alice@example.com",
        "Passw0rd",
        "alice",
        "Alice A.",
    ))
    .await;

    // Same handle, different mailbox.
    let response = app
        .post_register(&register_body(
            "alice2@example.com",
            "Passw0rd",
            "ALICE",
            "Alice B.",
        ))
        .await;

    assert_eq!(response.status().as_u16(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Username is already taken");
}

#[tokio::test]
async fn test_register_taken_email_returns_409() {
    let app = spawn_app().await;

    app.post_register(&register_body(
        "alice@example.com",
        "Passw0rd",
        "alice",
        "Alice A.",
    ))
    .await;

    let response = app
        .post_register(&register_body(
            "Alice@Example.com",
            "Passw0rd",
            "different",
            "Alice B.",
        ))
        .await;

    assert_eq!(response.status().as_u16(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Email is already registered");
}

#[tokio::test]
async fn test_register_rejects_invalid_input_before_any_side_effect() {
    let app = spawn_app().await;

    let cases = [
        (
            register_body("not-an-email", "Passw0rd", "alice", "Alice A."),
            "malformed email",
        ),
        (
            register_body("alice@example.com", "passw0rd", "alice", "Alice A."),
            "password without uppercase",
        ),
        (
            register_body("alice@example.com", "Pw0rd", "alice", "Alice A."),
            "short password",
        ),
        (
            register_body("alice@example.com", "Passw0rd", "al", "Alice A."),
            "short username",
        ),
        (
            register_body("alice@example.com", "Passw0rd", "al ice", "Alice A."),
            "username with a space",
        ),
        (
            register_body("alice@example.com", "Passw0rd", "alice", "   "),
            "blank display name",
        ),
    ];

    for (body, description) in cases {
        let response = app.post_register(&body).await;
        assert_eq!(response.status().as_u16(), 400, "case: {description}");
    }

    // None of the rejected attempts claimed anything.
    let response = app
        .post_register(&register_body(
            "alice@example.com",
            "Passw0rd",
            "alice",
            "Alice A.",
        ))
        .await;
    assert_eq!(response.status().as_u16(), 201);
}
