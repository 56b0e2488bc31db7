mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{id_of, TestApp};
use shopping_list_api::database::ItemRepository;

#[tokio::test]
async fn users_see_owned_and_joined_lists_admin_sees_all() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let carol = app.user("carol");

    let alice_list = app.create_list(&alice, "Groceries").await?;
    let bob_list = app.create_list(&bob, "Hardware").await?;
    app.create_list(&carol, "Private").await?;
    app.add_member(&bob, &bob_list, "alice").await?;

    let res = app.get("/api/lists", Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.error_map_is_empty());
    let ids: Vec<String> = res.body["lists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|l| id_of(l).unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&alice_list));
    assert!(ids.contains(&bob_list));

    let res = app.get("/api/lists", Some(&app.admin("root"))).await?;
    assert_eq!(res.body["lists"].as_array().unwrap().len(), 3);
    Ok(())
}

#[tokio::test]
async fn create_sets_owner_and_trims_name() -> Result<()> {
    let app = TestApp::new();

    let res = app.post("/api/lists", &app.user("alice"), json!({ "name": "  Weekend  " })).await?;
    assert_eq!(res.status, StatusCode::OK);
    let list = &res.body["list"];
    assert_eq!(list["name"], "Weekend");
    assert_eq!(list["ownerId"], "alice");
    assert_eq!(list["members"], json!([]));
    assert_eq!(list["isArchived"], false);
    Ok(())
}

#[tokio::test]
async fn create_validates_name() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");

    let res = app.post("/api/lists", &alice, json!({ "name": "" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errorMap"]["lists.create.name"]["message"], "name cannot be empty");

    let res = app.post("/api/lists", &alice, json!({})).await?;
    assert_eq!(res.body["errorMap"]["lists.create.name"]["message"], "name is required");

    let res = app.post("/api/lists", &alice, json!({ "name": "x".repeat(101) })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("lists.create.name"));

    let res = app.post("/api/lists", &alice, json!({ "name": "x".repeat(100) })).await?;
    assert_eq!(res.status, StatusCode::OK);

    let padded = format!("  {}  ", "y".repeat(100));
    let res = app.post("/api/lists", &alice, json!({ "name": padded })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["list"]["name"], json!("y".repeat(100)));
    Ok(())
}

#[tokio::test]
async fn validation_runs_before_authentication() -> Result<()> {
    let app = TestApp::new();

    let res = app
        .request(Method::POST, "/api/lists", None, Some(json!({ "name": "" })))
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("lists.create.name"));
    Ok(())
}

#[tokio::test]
async fn malformed_body_is_reported() -> Result<()> {
    let app = TestApp::new();

    let res = app.post("/api/lists", &app.user("alice"), json!(["not", "an", "object"])).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("lists.create.body"));
    Ok(())
}

#[tokio::test]
async fn single_list_respects_membership() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;

    let res = app.get(&format!("/api/lists?id={}", list_id), Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["list"]["name"], "Groceries");

    let res = app
        .get(&format!("/api/lists?id={}", list_id), Some(&app.user("mallory")))
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.has_error("lists.read.forbidden"));

    let res = app.get("/api/lists?id=garbage", Some(&alice)).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.has_error("lists.read.notFound"));
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_can_rename() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;
    app.add_member(&alice, &list_id, "bob").await?;
    let uri = format!("/api/lists?id={}", list_id);

    let res = app.put(&uri, &app.user("bob"), json!({ "name": "Mine now" })).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.has_error("lists.update.forbidden"));

    let res = app.put(&uri, &alice, json!({ "name": "Food" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["list"]["name"], "Food");
    assert_eq!(res.body["list"]["updatedBy"], "alice");

    let res = app.put(&uri, &app.admin("root"), json!({ "name": "Admin edit" })).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["list"]["ownerId"], "alice");
    Ok(())
}

#[tokio::test]
async fn rename_requires_id_and_existing_list() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");

    let res = app.put("/api/lists", &alice, json!({ "name": "x" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("lists.update.id"));

    let res = app
        .put(&format!("/api/lists?id={}", uuid::Uuid::new_v4()), &alice, json!({ "name": "x" }))
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.has_error("lists.update.notFound"));
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_can_delete() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;
    let uri = format!("/api/lists?id={}", list_id);

    let res = app.delete(&uri, &app.user("bob")).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.has_error("lists.delete.forbidden"));

    let res = app.delete(&uri, &alice).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["_id"], list_id.as_str());
    assert_eq!(res.body["deleted"], true);

    let res = app.delete(&uri, &alice).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn delete_leaves_items_in_place() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;
    let item_id = app.create_item(&alice, &list_id, "Milk").await?;

    let res = app.delete(&format!("/api/lists?id={}", list_id), &alice).await?;
    assert_eq!(res.status, StatusCode::OK);

    let item = app
        .state
        .store
        .find_item(item_id.parse()?)
        .await?;
    assert!(item.is_some());
    Ok(())
}

#[tokio::test]
async fn leave_rules() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let list_id = app.create_list(&alice, "Groceries").await?;
    app.add_member(&alice, &list_id, "bob").await?;
    let uri = format!("/api/lists/leave?id={}", list_id);

    let res = app.patch(&uri, &alice, None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("lists.leave.owner"));

    let res = app.patch(&uri, &app.user("carol"), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.has_error("lists.leave.forbidden"));

    let res = app.patch(&uri, &bob, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["listId"], list_id.as_str());
    assert_eq!(res.body["left"], true);

    // No longer a member
    let res = app.patch(&uri, &bob, None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.get("/api/lists", Some(&bob)).await?;
    assert_eq!(res.body["lists"], json!([]));
    Ok(())
}

#[tokio::test]
async fn leave_requires_id() -> Result<()> {
    let app = TestApp::new();

    let res = app.patch("/api/lists/leave", &app.user("bob"), None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("lists.leave.id"));
    Ok(())
}
