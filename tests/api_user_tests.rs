//! 用户 API 集成测试

use axum::http::StatusCode;
use myflix_api::error::INVALID_FIELDS_MESSAGE;
use serde_json::json;

mod common;
use common::{
    create_test_app, login, register, register_and_login, send, FIGHT_CLUB_ID, INCEPTION_ID,
    SE7EN_ID, TEST_PASSWORD,
};

#[tokio::test]
async fn test_register_returns_created_user_without_password() {
    let app = create_test_app();

    let response = register(&app, "alice12", TEST_PASSWORD, "Alice@Example.com").await;
    assert_eq!(response.status, StatusCode::CREATED);

    let json = response.json();
    assert_eq!(json["Username"], "alice12");
    assert_eq!(json["Email"], "alice@example.com");
    assert_eq!(json["Birthday"], "1990-04-01");
    assert_eq!(json["FavoriteMovies"], json!([]));
    assert!(json["_id"].is_string());
    assert!(!response.text().contains("argon2"));
}

#[tokio::test]
async fn test_duplicate_username_is_rejected() {
    let app = create_test_app();
    register(&app, "alice12", TEST_PASSWORD, "alice@example.com").await;

    let response = register(&app, "alice12", "Other456?", "other@example.com").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["message"], "alice12 already exists");

    // 原账户的密码不受影响
    let response = login(&app, "alice12", TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_email_in_use_is_validation_failure() {
    let app = create_test_app();
    register(&app, "alice12", TEST_PASSWORD, "alice@example.com").await;

    let response = register(&app, "bobby99", TEST_PASSWORD, "ALICE@example.com").await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json()["error"]["message"], "Email is already in use");
}

#[tokio::test]
async fn test_registration_validation() {
    let app = create_test_app();

    let cases = [
        ("al1", TEST_PASSWORD, "short@example.com"),
        ("alice_12", TEST_PASSWORD, "underscore@example.com"),
        ("alice12", "weakpass", "weak@example.com"),
        ("alice12", TEST_PASSWORD, "not-an-email"),
    ];

    for (username, password, email) in cases {
        let response = register(&app, username, password, email).await;
        assert_eq!(
            response.status,
            StatusCode::UNPROCESSABLE_ENTITY,
            "{} / {} / {}",
            username,
            password,
            email
        );
    }

    let response = send(&app, "GET", "/users", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_register_missing_fields() {
    let app = create_test_app();

    let response = send(&app, "POST", "/users", None, Some(json!({ "Username": "alice12" }))).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.json()["error"]["message"], INVALID_FIELDS_MESSAGE);
}

#[tokio::test]
async fn test_register_with_timestamp_birthday() {
    let app = create_test_app();

    let body = json!({
        "Username": "alice12",
        "Password": TEST_PASSWORD,
        "Email": "alice@example.com",
        "Birthday": "1990-04-01T00:00:00.000Z"
    });
    let response = send(&app, "POST", "/users", None, Some(body)).await;
    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["Birthday"], "1990-04-01");
}

#[tokio::test]
async fn test_unparseable_birthday_does_not_leak_parser_detail() {
    let app = create_test_app();

    let body = json!({
        "Username": "alice12",
        "Password": TEST_PASSWORD,
        "Email": "alice@example.com",
        "Birthday": "first of April"
    });
    let response = send(&app, "POST", "/users", None, Some(body)).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let message = response.json()["error"]["message"].as_str().unwrap().to_string();
    assert_eq!(message, INVALID_FIELDS_MESSAGE);
    assert!(!message.contains("line 1"));
}

#[tokio::test]
async fn test_list_and_get_users() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;
    register(&app, "bobby99", TEST_PASSWORD, "bob@example.com").await;

    let response = send(&app, "GET", "/users", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json().as_array().unwrap().len(), 2);

    let response = send(&app, "GET", "/users/bobby99", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["Username"], "bobby99");

    let response = send(&app, "GET", "/users/ghost123", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_profile() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;

    let response = send(
        &app,
        "PUT",
        "/users/alice12",
        Some(&token),
        Some(json!({ "Email": "new@example.com", "Password": "Changed456?" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["Email"], "new@example.com");

    assert_eq!(login(&app, "alice12", TEST_PASSWORD).await.status, StatusCode::BAD_REQUEST);
    assert_eq!(login(&app, "alice12", "Changed456?").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_update_rejects_weak_password() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;

    let response = send(
        &app,
        "PUT",
        "/users/alice12",
        Some(&token),
        Some(json!({ "Password": "weak" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_rename_onto_existing_username() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;
    register(&app, "bobby99", TEST_PASSWORD, "bob@example.com").await;

    let response = send(
        &app,
        "PUT",
        "/users/alice12",
        Some(&token),
        Some(json!({ "Username": "bobby99" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["error"]["message"], "bobby99 already exists");
}

#[tokio::test]
async fn test_rename_moves_ownership() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;

    let response = send(
        &app,
        "PUT",
        "/users/alice12",
        Some(&token),
        Some(json!({ "Username": "alice13" })),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);

    // 旧令牌的主体仍是 alice12，不再拥有改名后的账户
    let response = send(&app, "DELETE", "/users/alice13", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = login(&app, "alice13", TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_account() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;

    let response = send(&app, "DELETE", "/users/alice12", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.text(), "alice12 was deleted");

    let response = send(&app, "DELETE", "/users/alice12", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = login(&app, "alice12", TEST_PASSWORD).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_favorites_keep_order_and_ignore_duplicates() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;

    for movie in [SE7EN_ID, FIGHT_CLUB_ID, SE7EN_ID] {
        let uri = format!("/users/alice12/favorites/{}", movie);
        let response = send(&app, "POST", &uri, Some(&token), None).await;
        assert_eq!(response.status, StatusCode::CREATED);
    }

    let response = send(&app, "GET", "/users/alice12", Some(&token), None).await;
    assert_eq!(response.json()["FavoriteMovies"], json!([SE7EN_ID, FIGHT_CLUB_ID]));

    let response = send(&app, "GET", "/users/alice12/favorites", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    let favorites = response.json();
    let titles: Vec<&str> = favorites["FavoriteMovies"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["Title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Se7en", "Fight Club"]);
    assert_eq!(favorites["FavoriteMovies"][0]["Genre"]["Name"], "Thriller");
    assert_eq!(favorites["FavoriteMovies"][0]["Director"]["Name"], "David Fincher");
}

#[tokio::test]
async fn test_remove_favorite() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;

    for movie in [FIGHT_CLUB_ID, INCEPTION_ID] {
        let uri = format!("/users/alice12/favorites/{}", movie);
        send(&app, "POST", &uri, Some(&token), None).await;
    }

    let uri = format!("/users/alice12/favorites/{}", FIGHT_CLUB_ID);
    let response = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["FavoriteMovies"], json!([INCEPTION_ID]));

    // 再次移除不报错
    let response = send(&app, "DELETE", &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["FavoriteMovies"], json!([INCEPTION_ID]));
}

#[tokio::test]
async fn test_favorite_unknown_movie() {
    let app = create_test_app();
    let token = register_and_login(&app, "alice12").await;

    let uri = format!("/users/alice12/favorites/{}", uuid::Uuid::new_v4());
    let response = send(&app, "POST", &uri, Some(&token), None).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = send(&app, "POST", "/users/alice12/favorites/not-a-uuid", Some(&token), None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_registration_has_one_winner() {
    let app = create_test_app();

    let attempts = (0..8).map(|i| {
        let app = app.clone();
        async move {
            register(&app, "alice12", TEST_PASSWORD, &format!("a{}@example.com", i))
                .await
                .status
        }
    });
    let statuses = futures::future::join_all(attempts).await;

    let created = statuses.iter().filter(|s| **s == StatusCode::CREATED).count();
    let rejected = statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count();
    assert_eq!(created, 1);
    assert_eq!(rejected, 7);
}
