mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use polymap_api::config::AuthMode;

#[tokio::test]
async fn polygons_are_isolated_between_owners() -> Result<()> {
    let app = common::test_app(AuthMode::Header);

    let response = app
        .clone()
        .oneshot(common::api_json(
            "POST",
            "/api/polygons",
            "alice",
            &json!({"name": "Alice's roof"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = common::body_json(response).await["id"].as_i64().unwrap();
    let uri = format!("/api/polygons/{id}");

    // Bob never sees it
    let response = app
        .clone()
        .oneshot(common::api_empty("GET", "/api/polygons", "bob"))
        .await?;
    assert_eq!(common::body_json(response).await, json!([]));

    // Bob's update is indistinguishable from a miss
    let response = app
        .clone()
        .oneshot(common::api_json("PUT", &uri, "bob", &json!({"name": "Bob's now"})))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Bob's delete hits the ownership check
    let response = app
        .clone()
        .oneshot(common::api_empty("DELETE", &uri, "bob"))
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The record survives, untouched, for Alice
    let response = app
        .clone()
        .oneshot(common::api_empty("GET", "/api/polygons", "alice"))
        .await?;
    let list = common::body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Alice's roof");

    let response = app
        .clone()
        .oneshot(common::api_empty("DELETE", &uri, "alice"))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn client_supplied_owner_fields_are_ignored() -> Result<()> {
    let app = common::test_app(AuthMode::Header);

    // Bob tries to plant a polygon in Alice's space
    let response = app
        .clone()
        .oneshot(common::api_json(
            "POST",
            "/api/polygons",
            "bob",
            &json!({"name": "Planted", "owner_key": "alice", "user_id": "alice"}),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(common::api_empty("GET", "/api/polygons", "alice"))
        .await?;
    assert_eq!(common::body_json(response).await, json!([]));

    let response = app
        .clone()
        .oneshot(common::api_empty("GET", "/api/polygons", "bob"))
        .await?;
    let list = common::body_json(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["name"], "Planted");
    Ok(())
}
