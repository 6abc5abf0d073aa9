use bson::{doc, oid::ObjectId};
use serde_json::{Value, json};
use wrenchly_db::models::{InvitationStatus, ShopInvitation, UserRole};
use wrenchly_services::dao::invitation::InvitationDao;
use wrenchly_services::dao::mechanic::MechanicDao;
use wrenchly_services::dao::shop::ShopDao;
use wrenchly_services::dao::user::UserDao;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn invite_creates_mechanic_and_pending_invitation() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("acme").await;

    let resp = app
        .auth_post("/api/invite", &owner.access_token)
        .json(&json!({
            "email": "jane@example.com",
            "role": "mechanic",
            "shop_id": shop_id,
            "first_name": "Jane",
            "last_name": "Doe",
            "title": "Senior Mechanic",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], json!(true));

    let shop_oid = ObjectId::parse_str(&shop_id).unwrap();

    // A mechanic profile was created from the name
    let mechanics = MechanicDao::new(&app.db)
        .list_by_shop(shop_oid)
        .await
        .unwrap();
    assert_eq!(mechanics.len(), 1);
    assert_eq!(mechanics[0].name, "Jane Doe");
    assert_eq!(mechanics[0].title.as_deref(), Some("Senior Mechanic"));

    // A pending invitation referencing it was stored
    let invitation = InvitationDao::new(&app.db)
        .find_pending(shop_oid, "jane@example.com")
        .await
        .unwrap()
        .expect("No pending invitation stored");
    assert_eq!(invitation.status, InvitationStatus::Pending);
    assert_eq!(invitation.mechanic_id, mechanics[0].id);
    assert!(invitation.clerk_invitation_id.is_some());

    // The provider call carried the shop id and the correlation token
    let recorded = app.clerk.recorded_invitations();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0]["email_address"], json!("jane@example.com"));
    assert_eq!(
        recorded[0]["public_metadata"]["shop_id"],
        json!(shop_id.clone())
    );
    assert_eq!(
        recorded[0]["public_metadata"]["invitation_token"],
        json!(invitation.token.clone())
    );
    assert!(
        recorded[0]["redirect_url"]
            .as_str()
            .unwrap()
            .contains(&invitation.token)
    );
}

#[tokio::test]
async fn second_pending_invitation_for_same_email_conflicts() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("dupinv").await;

    app.seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    let resp = app
        .auth_post("/api/invite", &owner.access_token)
        .json(&json!({
            "email": "jane@example.com",
            "role": "mechanic",
            "shop_id": shop_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn accepting_twice_is_idempotent() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("twice").await;
    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    // The account email differs from the invited address, so the webhook
    // upsert cannot auto-reconcile by email; acceptance rides on the
    // bearer token alone.
    let jane = app
        .seed_user("user_jane_twice", "jane.account@example.com", "Jane", "Doe", None)
        .await;

    let resp = app
        .auth_post("/api/invitations/accept", &jane.access_token)
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let first: Value = resp.json().await.unwrap();
    assert_eq!(first["shop_id"], json!(shop_id.clone()));

    // Second call returns the shop id without erroring
    let resp = app
        .auth_post("/api/invitations/accept", &jane.access_token)
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let second: Value = resp.json().await.unwrap();
    assert_eq!(second["shop_id"], json!(shop_id.clone()));

    // Exactly one membership exists
    let shops = ShopDao::new(&app.db);
    let count = shops
        .members
        .count(doc! {
            "shop_id": ObjectId::parse_str(&shop_id).unwrap(),
            "user_id": ObjectId::parse_str(&jane.user_id).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(count, 1);

    // The account role was patched to the shop-mechanic role
    let user = UserDao::new(&app.db)
        .find_by_clerk_id(&jane.clerk_user_id)
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::ShopMechanic);
}

#[tokio::test]
async fn revoked_invitation_cannot_be_accepted() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("revoked").await;
    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    let invitation = InvitationDao::new(&app.db)
        .find_by_token(&token)
        .await
        .unwrap()
        .unwrap();

    let resp = app
        .auth_delete(
            &format!(
                "/api/portal/shops/{shop_id}/invitations/{}",
                invitation.id.unwrap().to_hex()
            ),
            &owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let jane = app
        .seed_user("user_jane_revoked", "jane@example.com", "Jane", "Doe", None)
        .await;

    let resp = app
        .auth_post("/api/invitations/accept", &jane.access_token)
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);

    // No membership was created
    let count = ShopDao::new(&app.db)
        .members
        .count(doc! {
            "shop_id": ObjectId::parse_str(&shop_id).unwrap(),
            "user_id": ObjectId::parse_str(&jane.user_id).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn expired_invitation_fails_even_while_stored_pending() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("expired").await;
    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    // Push the deadline into the past while leaving status as pending
    let past = bson::DateTime::from_millis(
        bson::DateTime::now().timestamp_millis() - 24 * 60 * 60 * 1000,
    );
    app.db
        .collection::<ShopInvitation>(ShopInvitation::COLLECTION)
        .update_one(
            doc! { "token": &token },
            doc! { "$set": { "expires_at": past } },
        )
        .await
        .unwrap();

    let jane = app
        .seed_user("user_jane_expired", "jane@example.com", "Jane", "Doe", None)
        .await;

    let resp = app
        .auth_post("/api/invitations/accept", &jane.access_token)
        .json(&json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);

    // Lazy expiry was persisted
    let invitation = InvitationDao::new(&app.db)
        .find_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Expired);
}

#[tokio::test]
async fn existing_account_gets_metadata_patch_and_can_accept() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("taken").await;

    // The provider already knows this email
    app.clerk.add_existing_user("taken@example.com");

    let resp = app
        .auth_post("/api/invite", &owner.access_token)
        .json(&json!({
            "email": "taken@example.com",
            "role": "mechanic",
            "shop_id": shop_id,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // No provider invitation id, but the local record still exists
    let invitation = InvitationDao::new(&app.db)
        .find_pending(ObjectId::parse_str(&shop_id).unwrap(), "taken@example.com")
        .await
        .unwrap()
        .expect("No pending invitation stored");
    assert!(invitation.clerk_invitation_id.is_none());

    // The existing account's metadata was patched with the same token
    let patches = app.clerk.recorded_patches();
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].0, "user_stub_existing");
    assert_eq!(
        patches[0].1["invitation_token"],
        json!(invitation.token.clone())
    );

    // The account signs in (no user.created fires for existing accounts;
    // here the local mirror comes from a user.updated delivery) and
    // accepts through the page path.
    let existing = app
        .seed_user(
            "user_stub_existing",
            "taken@example.com",
            "Tak",
            "En",
            None,
        )
        .await;

    let resp = app
        .auth_post("/api/invitations/accept", &existing.access_token)
        .json(&json!({ "token": invitation.token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let user = UserDao::new(&app.db)
        .find_by_clerk_id("user_stub_existing")
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::ShopMechanic);
}

#[tokio::test]
async fn revoke_requires_membership_in_owning_shop() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("mine").await;
    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    // A shop owner of a different shop holds a portal role but no
    // membership in this one
    let (outsider, _) = app.seed_shop_owner("other").await;

    let invitation = InvitationDao::new(&app.db)
        .find_by_token(&token)
        .await
        .unwrap()
        .unwrap();

    let resp = app
        .auth_delete(
            &format!(
                "/api/portal/shops/{shop_id}/invitations/{}",
                invitation.id.unwrap().to_hex()
            ),
            &outsider.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);

    // Still pending
    let invitation = InvitationDao::new(&app.db)
        .find_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Pending);
}

#[tokio::test]
async fn acceptance_page_resolution_reports_status() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("page").await;
    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    // Public endpoint, no auth
    let resp = app
        .client
        .get(app.url(&format!("/api/invitations/{token}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], json!("pending"));
    assert_eq!(body["shop_id"], json!(shop_id));
    assert_eq!(body["role"], json!("mechanic"));

    let resp = app
        .client
        .get(app.url("/api/invitations/no-such-token"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}
