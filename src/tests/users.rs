use axum::http::StatusCode;

use crate::tests::helper;

#[tokio::test]
async fn test_current_user() {
    let mut app = helper::setup_test_app();

    let access_token = helper::register_and_login(&mut app, "a@x.com").await;

    let (status_code, user, _) = helper::current_user(&mut app, &access_token).await;
    assert_eq!(StatusCode::OK, status_code);

    let user = user.unwrap();
    assert_eq!("a@x.com", user.email);
    assert_eq!("Someone", user.name);
}

#[tokio::test]
async fn test_delete_current_user() {
    let (mut app, storage) = helper::setup_test_app_with_storage();

    let access_token = helper::register_and_login(&mut app, "a@x.com").await;
    let (_, user, _) = helper::current_user(&mut app, &access_token).await;
    let user = user.unwrap();

    let notebook = helper::create_notebook(&mut app, &access_token, "Untitled").await;

    let (status_code, msg, _) = helper::maybe_delete_current_user(&mut app, &access_token).await;
    assert_eq!(StatusCode::OK, status_code);
    assert_eq!(Some("success".to_string()), msg);

    // the token does not work anymore
    let (status_code, _, _) = helper::current_user(&mut app, &access_token).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);

    let (status_code, _, _) = helper::maybe_obtain(&mut app, "a@x.com", helper::PASSWORD).await;
    assert_eq!(StatusCode::UNAUTHORIZED, status_code);

    // the row and the data of the user stay around
    let users = storage.all_users().await;
    let deleted = users.iter().find(|row| row.id == user.id).unwrap();
    assert!(deleted.is_deleted);
    assert!(!deleted.is_active);
    assert!(deleted.deleted_at.is_some());

    let notebooks = storage.all_notebooks().await;
    assert_eq!(notebook.id, notebooks[0].id);
    assert!(!notebooks[0].audit.is_deleted);

    // the email address is free again
    let access_token = helper::register_and_login(&mut app, "a@x.com").await;
    let (_, new_user, _) = helper::current_user(&mut app, &access_token).await;
    assert_ne!(user.id, new_user.unwrap().id);
}
