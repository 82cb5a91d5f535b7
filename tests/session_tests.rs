mod common;

use common::{rating_row_json, TestContext, TOKEN};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::{
    matchers::{body_string_contains, header, method, path},
    Mock, ResponseTemplate,
};

use screenpick::{
    models::{AccountUpdate, TitleId},
    routes::{Admission, Route},
    services::{session::LOGIN_FAILED, SessionPhase},
    AppError,
};

#[tokio::test]
async fn test_login_stores_credential_and_authenticates() {
    let ctx = TestContext::anonymous().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("username=alice"))
        .and(body_string_contains("password=secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh_token",
            "token_type": "bearer"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    assert_eq!(ctx.state.session.phase(), SessionPhase::Anonymous);
    assert_ok!(ctx.state.session.login("alice", "secret").await);

    assert_eq!(ctx.state.session.phase(), SessionPhase::Authenticated);
    assert!(ctx.state.session.is_authenticated());
    assert!(ctx.has_credential());
    assert!(ctx.state.guard.admit(&Route::Account).is_admitted());
}

#[tokio::test]
async fn test_login_with_wrong_credentials_surfaces_server_message() {
    let ctx = TestContext::anonymous().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect username or password"
        })))
        .mount(&ctx.server)
        .await;

    let err = assert_err!(ctx.state.session.login("alice", "wrong").await);

    assert!(matches!(&err, AppError::Unauthorized(msg) if msg == "Incorrect username or password"));
    assert!(!ctx.has_credential());
    assert_eq!(ctx.state.session.phase(), SessionPhase::Anonymous);
    assert_eq!(ctx.state.ratings.rating_count(), 0);
}

#[tokio::test]
async fn test_login_failure_without_detail_uses_default_message() {
    let ctx = TestContext::anonymous().await;

    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&ctx.server)
        .await;

    let err = assert_err!(ctx.state.session.login("alice", "secret").await);
    assert_eq!(err.server_message(), Some(LOGIN_FAILED));
    assert_eq!(ctx.state.session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_register_does_not_log_in() {
    let ctx = TestContext::anonymous().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 3,
            "username": "bob",
            "email": "bob@example.com"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    assert_ok!(
        ctx.state
            .session
            .register("bob", "bob@example.com", "hunter22")
            .await
    );
    assert!(!ctx.has_credential());
    assert_eq!(ctx.state.session.phase(), SessionPhase::Anonymous);
}

#[tokio::test]
async fn test_register_duplicate_user_reports_detail() {
    let ctx = TestContext::anonymous().await;

    Mock::given(method("POST"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Username already registered"
        })))
        .mount(&ctx.server)
        .await;

    let err = assert_err!(
        ctx.state
            .session
            .register("bob", "bob@example.com", "hunter22")
            .await
    );
    assert_eq!(err.server_message(), Some("Username already registered"));
}

#[tokio::test]
async fn test_logout_clears_credential_and_cached_ratings() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_my_ratings(vec![rating_row_json(1, 42, 8.5)]).await;

    assert_ok!(ctx.state.ratings.ensure_loaded().await);
    assert_eq!(ctx.state.ratings.rating_count(), 1);

    assert_ok!(ctx.state.session.logout());

    assert!(!ctx.has_credential());
    assert_eq!(ctx.state.session.phase(), SessionPhase::Anonymous);
    assert_eq!(ctx.state.ratings.rating_count(), 0);
    assert!(ctx.state.ratings.rating(TitleId(42)).is_none());
    assert!(!ctx.state.ratings.is_loaded());

    // Logging out twice is harmless
    assert_ok!(ctx.state.session.logout());
}

#[tokio::test]
async fn test_rejected_credential_forces_logout_and_redirect() {
    let ctx = TestContext::authenticated().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Could not validate credentials"
        })))
        .mount(&ctx.server)
        .await;

    let err = assert_err!(ctx.state.session.current_user().await);
    assert!(err.is_unauthorized());

    assert!(!ctx.has_credential());
    assert_eq!(ctx.state.session.phase(), SessionPhase::Anonymous);
    assert!(matches!(
        ctx.state.navigator().navigate(Route::Recommendations),
        Admission::Redirect(Route::Login)
    ));
}

#[tokio::test]
async fn test_current_user_sends_bearer_credential() {
    let ctx = TestContext::authenticated().await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "alice",
            "email": "alice@example.com"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let profile = assert_ok!(ctx.state.session.current_user().await);
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.email, "alice@example.com");
}

#[tokio::test]
async fn test_update_account_without_current_password_sends_nothing() {
    let ctx = TestContext::authenticated().await;

    Mock::given(method("PUT"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&ctx.server)
        .await;

    let update = AccountUpdate::new("").email("new@example.com");
    let err = assert_err!(ctx.state.session.update_account(&update).await);
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_update_account_sends_only_changed_fields() {
    let ctx = TestContext::authenticated().await;

    Mock::given(method("PUT"))
        .and(path("/me"))
        .and(wiremock::matchers::body_json(json!({
            "current_password": "secret",
            "email": "new@example.com"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "alice",
            "email": "new@example.com"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let update = AccountUpdate::new("secret").username("").email("new@example.com");
    assert_ok!(ctx.state.session.update_account(&update).await);
}

#[tokio::test]
async fn test_failed_login_ends_existing_session() {
    let ctx = TestContext::authenticated().await;
    ctx.mock_my_ratings(vec![rating_row_json(1, 42, 8.5)]).await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Incorrect username or password"
        })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    assert_ok!(ctx.state.ratings.ensure_loaded().await);
    assert_eq!(ctx.state.ratings.rating_count(), 1);

    let err = assert_err!(ctx.state.session.login("bob", "wrong").await);
    assert!(err.is_unauthorized());

    assert!(!ctx.has_credential());
    assert_eq!(ctx.state.session.phase(), SessionPhase::Anonymous);
    assert!(!ctx.state.session.is_authenticated());
    assert_eq!(ctx.state.ratings.rating_count(), 0);
    assert!(matches!(
        ctx.state.guard.admit(&Route::Account),
        Admission::Redirect(Route::Login)
    ));
}
