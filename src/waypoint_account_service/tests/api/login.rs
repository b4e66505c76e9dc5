use crate::helpers::{login_body, register_body, spawn_app};

#[tokio::test]
async fn test_login_returns_tokens_and_profile() {
    let app = spawn_app().await;

    let register_response = app
        .post_register(&register_body(
            "alice@example.com",
            "Passw0rd",
            "alice",
            "Alice A.",
        ))
        .await;
    let registered: serde_json::Value = register_response.json().await.unwrap();

    let response = app
        .post_login(&login_body("alice@example.com", "Passw0rd"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
    let body: serde_json::Value = response.json().await.unwrap();

    assert!(!body["tokens"]["access_token"].as_str().unwrap().is_empty());
    assert!(!body["tokens"]["id_token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["displayName"], "Alice A.");
    assert_eq!(body["user"]["userId"], registered["userId"]);
}

#[tokio::test]
async fn test_login_accepts_differently_cased_email() {
    let app = spawn_app().await;

    app.post_register(&register_body(
        "alice@example.com",
        "Passw0rd",
        "alice",
        "Alice A.",
    ))
    .await;

    let response = app
        .post_login(&login_body("ALICE@example.com", "Passw0rd"))
        .await;

    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_wrong_password_and_unknown_email_are_indistinguishable() {
    let app = spawn_app().await;

    app.post_register(&register_body(
        "alice@example.com",
        "Passw0rd",
        "alice",
        "Alice A.",
    ))
    .await;

    let wrong_password = app
        .post_login(&login_body("alice@example.com", "wrong"))
        .await;
    let unknown_email = app
        .post_login(&login_body("nobody@example.com", "Passw0rd"))
        .await;

    assert_eq!(wrong_password.status().as_u16(), 401);
    assert_eq!(unknown_email.status().as_u16(), 401);

    let wrong_password_body: serde_json::Value = wrong_password.json().await.unwrap();
    let unknown_email_body: serde_json::Value = unknown_email.json().await.unwrap();
    assert_eq!(wrong_password_body, unknown_email_body);
}

#[tokio::test]
async fn test_login_with_empty_password_returns_400() {
    let app = spawn_app().await;

    let response = app.post_login(&login_body("alice@example.com", "")).await;

    assert_eq!(response.status().as_u16(), 400);
}
