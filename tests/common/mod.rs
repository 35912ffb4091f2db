#![allow(dead_code)]

use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;
use user_service::auth::TokenIssuer;
use user_service::configuration::{JwtSettings, PasswordSettings};
use user_service::startup::run;
use user_service::store::InMemoryUserStore;

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryUserStore>,
    pub tokens: TokenIssuer,
    pub client: reqwest::Client,
}

fn jwt_settings() -> JwtSettings {
    JwtSettings {
        secret: "integration-test-secret-with-enough-length".to_string(),
        issuer: "AuthService".to_string(),
        expiration_hours: 24,
    }
}

pub async fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryUserStore::new());
    let server = run(
        listener,
        store.clone(),
        jwt_settings(),
        PasswordSettings { hash_cost: 4 },
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        tokens: TokenIssuer::new(&jwt_settings()).expect("Failed to build token issuer"),
        client: reqwest::Client::new(),
    }
}

pub fn sign_up_body(email: &str, password: &str) -> Value {
    json!({
        "first_name": "Alice",
        "last_name": "Smith",
        "email": email,
        "phone_number": "0812345678",
        "password": password,
        "birthday": "2000-01-02"
    })
}

impl TestApp {
    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(&format!("{}{}", &self.address, path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn sign_up(&self, body: &Value) -> reqwest::Response {
        self.post_json("/signup", body).await
    }

    pub async fn sign_up_admin(&self, body: &Value) -> reqwest::Response {
        self.post_json("/signup/admin", body).await
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/signin", &json!({ "email": email, "password": password }))
            .await
    }

    /// Register `email` and return its id
    pub async fn create_user(&self, email: &str, password: &str) -> i64 {
        let response = self.sign_up(&sign_up_body(email, password)).await;
        assert_eq!(201, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");
        body["user"]["id"].as_i64().expect("No id in sign-up response")
    }

    /// Register a throwaway account and return a bearer token for it
    pub async fn bearer_token(&self) -> String {
        self.create_user("session@example.com", "hunter2").await;
        let response = self.sign_in("session@example.com", "hunter2").await;
        let body: Value = response.json().await.expect("Failed to parse response");
        body["token"].as_str().expect("No token in response").to_string()
    }

    pub async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(&format!("{}{}", &self.address, path))
            .bearer_auth(token)
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
