mod common;

use common::{sign_up_body, spawn_app};
use serde_json::{json, Value};
use user_service::store::UserStore;

// --- Sign-up Tests ---

#[tokio::test]
async fn signup_returns_201_with_role_user_and_no_password() {
    let app = spawn_app().await;

    let response = app.sign_up(&sign_up_body("a@x.com", "hunter2")).await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Sign-up successful");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["birthday"], "2000-01-02");
    assert!(body["user"]["id"].as_i64().is_some());
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("password_hash").is_none());

    let stored = app.store.find_by_email("a@x.com").await.unwrap().unwrap();
    assert_ne!(stored.password_hash, "hunter2");
}

#[tokio::test]
async fn signup_ignores_role_in_payload() {
    let app = spawn_app().await;
    let mut body = sign_up_body("sneaky@x.com", "hunter2");
    body["role"] = json!("admin");

    let response = app.sign_up(&body).await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["role"], "user");
}

#[tokio::test]
async fn admin_signup_assigns_admin_role() {
    let app = spawn_app().await;
    let mut body = sign_up_body("boss@x.com", "hunter2");
    body["role"] = json!("user");

    let response = app.sign_up_admin(&body).await;

    assert_eq!(201, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["user"]["role"], "admin");
}

#[tokio::test]
async fn signup_returns_409_for_duplicate_email() {
    let app = spawn_app().await;
    let body = sign_up_body("a@x.com", "hunter2");

    let first = app.sign_up(&body).await;
    assert_eq!(201, first.status().as_u16());

    let second = app.sign_up(&body).await;
    assert_eq!(409, second.status().as_u16(), "Should reject duplicate email with 409 Conflict");

    let admin_attempt = app.sign_up_admin(&body).await;
    assert_eq!(409, admin_attempt.status().as_u16());

    assert_eq!(app.store.len(), 1);
}

#[tokio::test]
async fn signup_returns_400_for_missing_fields() {
    let app = spawn_app().await;

    let test_cases = vec![
        ("first_name", "missing first name"),
        ("last_name", "missing last name"),
        ("email", "missing email"),
        ("phone_number", "missing phone number"),
        ("password", "missing password"),
        ("birthday", "missing birthday"),
    ];

    for (field, reason) in test_cases {
        let mut body = sign_up_body("a@x.com", "hunter2");
        body.as_object_mut().unwrap().remove(field);

        let response = app.sign_up(&body).await;

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
        let body: Value = response.json().await.expect("Failed to parse response");
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    assert!(app.store.is_empty());
}

#[tokio::test]
async fn signup_returns_400_for_invalid_values() {
    let app = spawn_app().await;

    let test_cases = vec![
        ("email", json!("notanemail"), "invalid email"),
        ("birthday", json!("31/12/1999"), "unparseable birthday"),
        ("birthday", json!(19991231), "birthday of wrong type"),
        ("phone_number", json!("call me"), "invalid phone number"),
        ("first_name", json!("   "), "blank first name"),
        ("password", json!(""), "empty password"),
    ];

    for (field, value, reason) in test_cases {
        let mut body = sign_up_body("a@x.com", "hunter2");
        body[field] = value;

        let response = app.sign_up(&body).await;

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }

    assert!(app.store.is_empty());
}

// --- Sign-in Tests ---

#[tokio::test]
async fn signin_returns_bearer_token_for_valid_credentials() {
    let app = spawn_app().await;
    let id = app.create_user("a@x.com", "hunter2").await;

    let response = app.sign_in("a@x.com", "hunter2").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["id"], id);
    assert_eq!(body["role"], "user");

    let token = body["token"].as_str().expect("No token in response");
    let claims = app.tokens.validate(token).expect("Token should validate");
    let now = chrono::Utc::now().timestamp();
    assert_eq!(claims.sub, "a@x.com");
    assert_eq!(claims.iss, "AuthService");
    assert!((claims.exp - (now + 24 * 3600)).abs() <= 1);
}

#[tokio::test]
async fn signin_returns_admin_role_for_admin() {
    let app = spawn_app().await;
    app.sign_up_admin(&sign_up_body("boss@x.com", "hunter2")).await;

    let response = app.sign_in("boss@x.com", "hunter2").await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn signin_wrong_password_and_unknown_email_are_indistinguishable() {
    let app = spawn_app().await;
    app.create_user("a@x.com", "hunter2").await;

    let wrong_password = app.sign_in("a@x.com", "wrong").await;
    let unknown_email = app.sign_in("nobody@x.com", "hunter2").await;

    assert_eq!(400, wrong_password.status().as_u16());
    assert_eq!(400, unknown_email.status().as_u16());

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_email: Value = unknown_email.json().await.unwrap();
    assert!(wrong_password.get("token").is_none());
    assert_eq!(wrong_password["code"], unknown_email["code"]);
    assert_eq!(wrong_password["message"], unknown_email["message"]);
    let mut keys_a: Vec<_> = wrong_password.as_object().unwrap().keys().collect();
    let mut keys_b: Vec<_> = unknown_email.as_object().unwrap().keys().collect();
    keys_a.sort();
    keys_b.sort();
    assert_eq!(keys_a, keys_b);
}

#[tokio::test]
async fn signin_email_match_is_case_sensitive() {
    let app = spawn_app().await;
    app.create_user("a@x.com", "hunter2").await;

    let response = app.sign_in("A@X.COM", "hunter2").await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn signin_returns_400_for_missing_fields() {
    let app = spawn_app().await;

    let test_cases = vec![
        (json!({"email": "a@x.com"}), "missing password"),
        (json!({"password": "hunter2"}), "missing email"),
        (json!({}), "missing all fields"),
    ];

    for (body, reason) in test_cases {
        let response = app.post_json("/signin", &body).await;

        assert_eq!(400, response.status().as_u16(), "Should reject request: {}", reason);
    }
}

#[tokio::test]
async fn signup_and_signin_scenario() {
    let app = spawn_app().await;
    let body = sign_up_body("a@x.com", "hunter2");

    let created = app.sign_up(&body).await;
    assert_eq!(201, created.status().as_u16());
    let created: Value = created.json().await.unwrap();
    assert_eq!(created["user"]["role"], "user");

    let repeated = app.sign_up(&body).await;
    assert_eq!(409, repeated.status().as_u16());

    let signed_in = app.sign_in("a@x.com", "hunter2").await;
    assert_eq!(200, signed_in.status().as_u16());
    let signed_in: Value = signed_in.json().await.unwrap();
    assert!(!signed_in["token"].as_str().unwrap_or_default().is_empty());
    assert_eq!(signed_in["role"], "user");

    let rejected = app.sign_in("a@x.com", "wrong").await;
    assert_eq!(400, rejected.status().as_u16());
}
