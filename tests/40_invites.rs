mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::json;

use common::{id_of, TestApp};

async fn invite(app: &TestApp, owner: &str, list_id: &str, invitee: &str) -> Result<String> {
    let res = app
        .post(
            "/api/invites",
            owner,
            json!({ "shoppingListId": list_id, "userId": invitee }),
        )
        .await?;
    anyhow::ensure!(res.status == StatusCode::OK, "invite failed: {}", res.body);
    id_of(&res.body["invite"])
}

#[tokio::test]
async fn accept_adds_invitee_to_members() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;

    let res = app
        .post(
            "/api/invites",
            &alice,
            json!({ "shoppingListId": list_id, "userId": "bob", "role": "editor" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["invite"]["role"], "editor");
    assert_eq!(res.body["invite"]["accepted"], false);
    let invite_id = id_of(&res.body["invite"])?;

    let bob = app.user("bob");
    let res = app.patch(&format!("/api/invites?id={}", invite_id), &bob, None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["message"], "Invite accepted");
    assert_eq!(res.body["invite"]["accepted"], true);
    assert!(res.body["invite"]["acceptedAt"].is_string());

    let res = app.get(&format!("/api/lists?id={}", list_id), Some(&bob)).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["list"]["members"], json!(["bob"]));
    Ok(())
}

#[tokio::test]
async fn role_defaults_to_member() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;

    let res = app
        .post("/api/invites", &alice, json!({ "shoppingListId": list_id, "userId": "bob" }))
        .await?;
    assert_eq!(res.body["invite"]["role"], "member");
    assert_eq!(res.body["invite"]["shoppingListId"], list_id.as_str());
    Ok(())
}

#[tokio::test]
async fn someone_elses_invite_cannot_be_accepted() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;
    let invite_id = invite(&app, &alice, &list_id, "bob").await?;
    let uri = format!("/api/invites?id={}", invite_id);

    let res = app.patch(&uri, &app.user("mallory"), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.has_error("invites.accept.forbidden"));

    // Not even the owner or an administrator
    let res = app.patch(&uri, &alice, None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    let res = app.patch(&uri, &app.admin("root"), None).await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn re_accepting_is_idempotent() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let bob = app.user("bob");
    let list_id = app.create_list(&alice, "Groceries").await?;
    let invite_id = invite(&app, &alice, &list_id, "bob").await?;
    let uri = format!("/api/invites?id={}", invite_id);

    let first = app.patch(&uri, &bob, None).await?;
    let second = app.patch(&uri, &bob, None).await?;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["invite"]["acceptedAt"], first.body["invite"]["acceptedAt"]);

    let res = app.get(&format!("/api/lists?id={}", list_id), Some(&bob)).await?;
    assert_eq!(res.body["list"]["members"], json!(["bob"]));
    Ok(())
}

#[tokio::test]
async fn accept_validates_id() -> Result<()> {
    let app = TestApp::new();
    let bob = app.user("bob");

    let res = app.patch("/api/invites", &bob, None).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("invites.accept.id"));

    let res = app.patch("/api/invites?id=nope", &bob, None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.has_error("invites.accept.notFound"));
    Ok(())
}

#[tokio::test]
async fn only_owner_or_admin_can_invite() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;
    app.add_member(&alice, &list_id, "bob").await?;

    let res = app
        .post(
            "/api/invites",
            &app.user("bob"),
            json!({ "shoppingListId": list_id, "userId": "carol" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::FORBIDDEN);
    assert!(res.has_error("invites.create.forbidden"));

    let res = app
        .post(
            "/api/invites",
            &app.admin("root"),
            json!({ "shoppingListId": list_id, "userId": "carol" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn create_validates_payload() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;

    let res = app.post("/api/invites", &alice, json!({ "userId": "" })).await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("invites.create.shoppingListId"));
    assert!(res.has_error("invites.create.userId"));

    let res = app
        .post(
            "/api/invites",
            &alice,
            json!({ "shoppingListId": list_id, "userId": "bob", "role": "owner" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.has_error("invites.create.role"));

    let res = app
        .post(
            "/api/invites",
            &alice,
            json!({ "shoppingListId": uuid::Uuid::new_v4().to_string(), "userId": "bob" }),
        )
        .await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert!(res.has_error("invites.create.listNotFound"));
    Ok(())
}

#[tokio::test]
async fn owner_and_members_cannot_be_invited() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;
    app.add_member(&alice, &list_id, "bob").await?;

    for invitee in ["alice", "bob"] {
        let res = app
            .post(
                "/api/invites",
                &alice,
                json!({ "shoppingListId": list_id, "userId": invitee }),
            )
            .await?;
        assert_eq!(res.status, StatusCode::BAD_REQUEST);
        assert!(res.has_error("invites.create.userId"));
    }
    Ok(())
}

#[tokio::test]
async fn users_see_own_invites_admin_sees_all() -> Result<()> {
    let app = TestApp::new();
    let alice = app.user("alice");
    let list_id = app.create_list(&alice, "Groceries").await?;
    invite(&app, &alice, &list_id, "bob").await?;
    invite(&app, &alice, &list_id, "carol").await?;

    let res = app.get("/api/invites", Some(&app.user("bob"))).await?;
    assert_eq!(res.status, StatusCode::OK);
    let invites = res.body["invites"].as_array().unwrap();
    assert_eq!(invites.len(), 1);
    assert_eq!(invites[0]["userId"], "bob");

    let res = app.get("/api/invites", Some(&app.admin("root"))).await?;
    assert_eq!(res.body["invites"].as_array().unwrap().len(), 2);

    let res = app.get("/api/invites", Some(&alice)).await?;
    assert_eq!(res.body["invites"], json!([]));
    Ok(())
}
