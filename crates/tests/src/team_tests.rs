use serde_json::{Value, json};
use wrenchly_services::dao::invitation::InvitationDao;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn team_listing_shows_owner_and_accepted_invitee() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("teamls").await;
    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    let jane = app
        .seed_user("user_jane_teamls", "jane@example.com", "Jane", "Doe", None)
        .await;
    let resp = app
        .auth_post("/api/invitations/accept", &jane.access_token)
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(
            &format!("/api/portal/shops/{shop_id}/team"),
            &owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let members: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(members.len(), 2);

    let roles: Vec<&str> = members.iter().map(|m| m["role"].as_str().unwrap()).collect();
    assert!(roles.contains(&"owner"));
    assert!(roles.contains(&"mechanic"));

    let mechanic_entry = members
        .iter()
        .find(|m| m["role"] == json!("mechanic"))
        .unwrap();
    assert_eq!(mechanic_entry["email"], json!("jane@example.com"));
    assert_eq!(mechanic_entry["name"], json!("Jane Doe"));
    assert!(
        mechanic_entry["mechanic_id"].is_string(),
        "Accepted invitee should carry the linked mechanic profile"
    );
}

#[tokio::test]
async fn invitation_listing_reports_terminal_states() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("invls").await;

    let pending_token = app
        .seed_invitation(&owner.access_token, &shop_id, "pending@example.com")
        .await;
    let revoked_token = app
        .seed_invitation(&owner.access_token, &shop_id, "revoked@example.com")
        .await;

    let invitations = InvitationDao::new(&app.db);
    let revoked = invitations
        .find_by_token(&revoked_token)
        .await
        .unwrap()
        .unwrap();

    let resp = app
        .auth_delete(
            &format!(
                "/api/portal/shops/{shop_id}/invitations/{}",
                revoked.id.unwrap().to_hex()
            ),
            &owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(
            &format!("/api/portal/shops/{shop_id}/invitations"),
            &owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let listing: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(listing.len(), 2);

    let status_of = |email: &str| {
        listing
            .iter()
            .find(|i| i["email"] == json!(email))
            .map(|i| i["status"].as_str().unwrap().to_string())
            .unwrap()
    };
    assert_eq!(status_of("pending@example.com"), "pending");
    assert_eq!(status_of("revoked@example.com"), "revoked");

    let _ = pending_token;
}

#[tokio::test]
async fn portal_requires_a_shop_role() {
    let app = TestApp::spawn().await;
    let (_, shop_id) = app.seed_shop_owner("guard").await;

    // Plain user: authenticated but no portal role
    let plain = app
        .seed_user("user_plain_guard", "plain@example.com", "Pl", "Ain", None)
        .await;

    let resp = app
        .auth_get(
            &format!("/api/portal/shops/{shop_id}/team"),
            &plain.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // Unauthenticated request redirects to sign-in client-side; the API
    // reports 401
    let resp = app
        .client
        .get(app.url(&format!("/api/portal/shops/{shop_id}/team")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
}

#[tokio::test]
async fn portal_role_without_membership_is_forbidden() {
    let app = TestApp::spawn().await;
    let (_, shop_id) = app.seed_shop_owner("isolated").await;
    let (outsider, _) = app.seed_shop_owner("elsewhere").await;

    let resp = app
        .auth_get(
            &format!("/api/portal/shops/{shop_id}/team"),
            &outsider.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn admin_surface_requires_admin_role() {
    let app = TestApp::spawn().await;
    let (owner, _) = app.seed_shop_owner("adminck").await;

    let resp = app
        .auth_get("/api/admin/shops", &owner.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // Role arrives from provider public metadata
    let admin = app
        .seed_user(
            "user_admin",
            "admin@example.com",
            "Ad",
            "Min",
            Some("admin"),
        )
        .await;

    let resp = app
        .auth_get("/api/admin/shops", &admin.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["total"], json!(1));
}
