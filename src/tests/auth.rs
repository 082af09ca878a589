use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_register_and_obtain() {
    let mut app = helper::setup_test_app();

    let (status_code, email, _) =
        helper::maybe_register(&mut app, "Some.One@Example.COM", helper::PASSWORD, helper::PASSWORD)
            .await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some("Some.One@example.com".to_string()), email);

    // the domain part is case insensitive
    let (status_code, tokens, _) =
        helper::maybe_obtain(&mut app, "Some.One@EXAMPLE.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);

    let (access, refresh) = tokens.unwrap();
    assert!(access.len() > 10);
    assert!(refresh.len() > 10);
    assert_ne!(access, refresh);
}

#[tokio::test]
async fn test_register_email_already_exists() {
    let (mut app, storage) = helper::setup_test_app_with_storage();

    helper::register_and_login(&mut app, "a@x.com").await;

    let (status_code, _, error) =
        helper::maybe_register(&mut app, "a@x.com", "other", "other").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Email already exists", error.unwrap().detail);

    // checked before the passwords
    let (status_code, _, error) = helper::maybe_register(&mut app, "a@X.com", "one", "two").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("Email already exists", error.unwrap().detail);

    assert_eq!(1, storage.all_users().await.len());
}

#[tokio::test]
async fn test_register_password_mismatch() {
    let (mut app, storage) = helper::setup_test_app_with_storage();

    let (status_code, _, error) =
        helper::maybe_register(&mut app, "a@x.com", "secret", "secreT").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!(
        "Password and confirm password must be the same",
        error.unwrap().detail
    );

    assert!(storage.all_users().await.is_empty());

    let (status_code, _, error) = helper::maybe_obtain(&mut app, "a@x.com", "secret").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert!(error.is_some());
}

#[tokio::test]
async fn test_register_empty_email() {
    let (mut app, storage) = helper::setup_test_app_with_storage();

    let (status_code, _, error) = helper::maybe_register(&mut app, "  ", "secret", "secret").await;
    assert_eq!(StatusCode::BAD_REQUEST, status_code);
    assert_eq!("The given email must be set", error.unwrap().detail);

    assert!(storage.all_users().await.is_empty());
}

#[tokio::test]
async fn test_obtain_with_wrong_credentials() {
    let mut app = helper::setup_test_app();

    helper::register_and_login(&mut app, "a@x.com").await;

    let (status_code, tokens, error) = helper::maybe_obtain(&mut app, "a@x.com", "wrong").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert!(tokens.is_none());
    assert_eq!(
        "No active account found with the given credentials",
        error.unwrap().detail
    );

    let (status_code, _, error) =
        helper::maybe_obtain(&mut app, "nobody@x.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!(
        "No active account found with the given credentials",
        error.unwrap().detail
    );
}

#[tokio::test]
async fn test_refresh() {
    let mut app = helper::setup_test_app();

    helper::register_and_login(&mut app, "a@x.com").await;
    let (_, tokens, _) = helper::maybe_obtain(&mut app, "a@x.com", helper::PASSWORD).await;
    let (access, refresh) = tokens.unwrap();

    let (status_code, new_access, _) = helper::maybe_refresh(&mut app, &refresh).await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, user, _) =
        helper::current_user(&mut app, &format!("Bearer {}", new_access.unwrap())).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!("a@x.com", user.unwrap().email);

    // an access token does not refresh
    let (status_code, _, _) = helper::maybe_refresh(&mut app, &access).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);

    let (status_code, _, _) = helper::maybe_refresh(&mut app, "garbage").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}

#[tokio::test]
async fn test_refresh_token_does_not_authenticate() {
    let mut app = helper::setup_test_app();

    helper::register_and_login(&mut app, "a@x.com").await;
    let (_, tokens, _) = helper::maybe_obtain(&mut app, "a@x.com", helper::PASSWORD).await;
    let (_, refresh) = tokens.unwrap();

    let (status_code, _, error) =
        helper::current_user(&mut app, &format!("Bearer {refresh}")).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!(
        "Given token not valid for any token type",
        error.unwrap().detail
    );
}

#[tokio::test]
async fn test_verify() {
    let mut app = helper::setup_test_app();

    helper::register_and_login(&mut app, "a@x.com").await;
    let (_, tokens, _) = helper::maybe_obtain(&mut app, "a@x.com", helper::PASSWORD).await;
    let (access, refresh) = tokens.unwrap();

    let (status_code, body, _) = helper::maybe_verify(&mut app, &access).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some(serde_json::json!({})), body);

    let (status_code, _, _) = helper::maybe_verify(&mut app, &refresh).await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, _, error) = helper::maybe_verify(&mut app, "not.a.token").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert!(error.is_some());
}

#[tokio::test]
async fn test_missing_or_invalid_authorization() {
    let mut app = helper::setup_test_app();

    let (status_code, _, error) = helper::current_user(&mut app, "").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
    assert_eq!(
        "Authentication credentials were not provided",
        error.unwrap().detail
    );

    let (status_code, _, _) = helper::current_user(&mut app, "Bearer garbage").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);

    let (status_code, _, _) = helper::list_notebooks(&mut app, "Bearer garbage").await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);
}

#[tokio::test]
async fn test_obtain_with_overflowing_lifetime() {
    let mut app = helper::setup_test_app_with_lifetimes(i64::MAX, i64::MAX);

    let (status_code, _, _) =
        helper::maybe_register(&mut app, "a@x.com", helper::PASSWORD, helper::PASSWORD).await;
    assert_eq!(StatusCode::OK, status_code);

    let (status_code, tokens, error) =
        helper::maybe_obtain(&mut app, "a@x.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status_code);
    assert!(tokens.is_none());
    assert_eq!("Internal server error", error.unwrap().detail);
}
