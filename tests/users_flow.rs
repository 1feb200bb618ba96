mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{acquire_db_lock, body_to_json, TestApp};
use normcontrol::users::{self, ProvisionError};
use serde_json::json;

#[tokio::test]
async fn create_user_rejects_empty_username() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let outcome = app
        .with_conn(|conn| Ok(users::create_user(conn, "   ", None, "pw").err()))
        .await?;
    assert!(matches!(outcome, Some(ProvisionError::EmptyUsername)));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn superuser_always_has_both_flags() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let user = app
        .with_conn(|conn| {
            users::create_superuser(conn, "root", None, "pw")
                .map_err(|err| anyhow::anyhow!("{err}"))
        })
        .await?;
    assert!(user.is_staff);
    assert!(user.is_superuser);

    let rejected = app
        .with_conn(|conn| {
            let flags = users::AccountFlags {
                is_staff: false,
                is_superuser: true,
            };
            Ok(users::create_superuser_with_flags(conn, "root2", None, "pw", flags).err())
        })
        .await?;
    assert!(matches!(
        rejected,
        Some(ProvisionError::InvalidSuperuserFlags)
    ));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn usernames_are_unique() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("dave", "pw", false).await?;
    let outcome = app
        .with_conn(|conn| Ok(users::create_user(conn, "dave", None, "other").err()))
        .await?;
    assert!(matches!(outcome, Some(ProvisionError::UsernameTaken(_))));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn username_is_normalized_before_insert() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let user = app
        .with_conn(|conn| {
            // fullwidth letters plus surrounding whitespace
            users::create_user(conn, " ｅｖｅ ", None, "pw")
                .map_err(|err| anyhow::anyhow!("{err}"))
        })
        .await?;
    assert_eq!(user.username, "eve");

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn password_is_stored_hashed() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let user = app.insert_user("frank", "plaintext", false).await?;
    assert!(user.password_hash.starts_with("$argon2"));
    assert!(!user.password_hash.contains("plaintext"));

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn provisioning_routes_are_staff_only() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin", "pw", true).await?;
    app.insert_user("worker", "pw", false).await?;
    let admin_token = app.login_token("admin", "pw").await?;
    let worker_token = app.login_token("worker", "pw").await?;

    let payload = json!({ "username": "new-user", "password": "pw" });
    let response = app
        .post_json("/api/users", &payload, Some(&worker_token))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json("/api/users", &payload, Some(&admin_token))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await?;
    assert_eq!(body["username"], "new-user");
    assert_eq!(body["is_staff"], false);
    assert_eq!(body["is_superuser"], false);
    assert!(body.get("password_hash").is_none());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn create_user_via_api_rejects_empty_username() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.insert_user("admin", "pw", true).await?;
    let token = app.login_token("admin", "pw").await?;

    let response = app
        .post_json(
            "/api/users",
            &json!({ "username": "", "password": "pw" }),
            Some(&token),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    app.cleanup().await?;
    Ok(())
}
