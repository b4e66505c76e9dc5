use secrecy::Secret;
use waypoint_account_service::AccountService;
use waypoint_adapters::{InMemoryDirectory, InMemoryIdentityProvider};

pub struct TestApp {
    pub address: String,
    pub http_client: reqwest::Client,
}

/// Spin the service up on a random port over the in-memory adapters.
pub async fn spawn_app() -> TestApp {
    let identity_provider =
        InMemoryIdentityProvider::new(Secret::from("test-signing-key".to_string()));
    let directory = InMemoryDirectory::new();

    let service = AccountService::new(identity_provider, directory);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let address = format!("http://{}", listener.local_addr().unwrap());

    tokio::spawn(service.run_standalone(listener, None));

    TestApp {
        address,
        http_client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub async fn post_register(&self, body: &serde_json::Value) -> reqwest::Response {
        self.http_client
            .post(format!("{}/register", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_login(&self, body: &serde_json::Value) -> reqwest::Response {
        self.http_client
            .post(format!("{}/login", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}

pub fn register_body(email: &str, password: &str, username: &str, display_name: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": password,
        "username": username,
        "displayName": display_name,
    })
}

pub fn login_body(email: &str, password: &str) -> serde_json::Value {
    serde_json::json!({
        "email": email,
        "password": password,
    })
}
