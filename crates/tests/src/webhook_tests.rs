use bson::{doc, oid::ObjectId};
use serde_json::json;
use wrenchly_db::models::{InvitationStatus, User, UserRole};
use wrenchly_services::dao::invitation::InvitationDao;
use wrenchly_services::dao::shop::ShopDao;
use wrenchly_services::dao::user::UserDao;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn rejects_bad_signature_without_writing() {
    let app = TestApp::spawn().await;

    let payload = json!({
        "type": "user.created",
        "data": {
            "id": "user_forged",
            "primary_email_address_id": "em_1",
            "email_addresses": [{ "id": "em_1", "email_address": "forged@example.com" }],
        }
    });
    let body = serde_json::to_vec(&payload).unwrap();

    let resp = app
        .client
        .post(app.url("/api/webhooks/clerk"))
        .header("svix-id", "msg_forged")
        .header("svix-timestamp", "1712000000")
        .header("svix-signature", "v1,Zm9yZ2VkLXNpZ25hdHVyZQ==")
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);

    let user = UserDao::new(&app.db).find_by_clerk_id("user_forged").await;
    assert!(user.is_err(), "Forged event must not create a user");
}

#[tokio::test]
async fn user_created_upserts_local_user() {
    let app = TestApp::spawn().await;

    let seeded = app
        .seed_user("user_up_1", "up@example.com", "Upsie", "Daisy", None)
        .await;

    let user = UserDao::new(&app.db)
        .find_by_clerk_id(&seeded.clerk_user_id)
        .await
        .unwrap();
    assert_eq!(user.email, "up@example.com");
    assert_eq!(user.first_name.as_deref(), Some("Upsie"));
    assert_eq!(user.role, UserRole::User);

    // user.updated for the same id updates in place
    let resp = app
        .post_webhook(&json!({
            "type": "user.updated",
            "data": {
                "id": "user_up_1",
                "first_name": "Updated",
                "last_name": "Daisy",
                "primary_email_address_id": "em_1",
                "email_addresses": [{ "id": "em_1", "email_address": "up@example.com" }],
                "public_metadata": {},
            }
        }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let users = UserDao::new(&app.db);
    let user = users.find_by_clerk_id("user_up_1").await.unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Updated"));

    let total = users.base.count(doc! { "clerk_user_id": "user_up_1" }).await.unwrap();
    assert_eq!(total, 1, "Upsert must not duplicate the user");
}

#[tokio::test]
async fn user_event_without_primary_email_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_webhook(&json!({
            "type": "user.created",
            "data": {
                "id": "user_no_email",
                "email_addresses": [],
            }
        }))
        .await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn user_created_with_invitation_token_joins_shop() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("hook").await;
    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    // The provider invitation flow stamps the metadata into the new
    // account, which rides along on user.created
    let resp = app
        .post_webhook(&json!({
            "type": "user.created",
            "data": {
                "id": "user_jane_hook",
                "first_name": "Jane",
                "last_name": "Doe",
                "primary_email_address_id": "em_1",
                "email_addresses": [{ "id": "em_1", "email_address": "jane@example.com" }],
                "public_metadata": {
                    "role": "mechanic",
                    "shop_id": shop_id,
                    "invitation_token": token,
                },
            }
        }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let users = UserDao::new(&app.db);
    let jane = users.find_by_clerk_id("user_jane_hook").await.unwrap();
    assert_eq!(jane.role, UserRole::ShopMechanic);

    let members = ShopDao::new(&app.db)
        .members
        .count(doc! {
            "shop_id": ObjectId::parse_str(&shop_id).unwrap(),
            "user_id": jane.id.unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(members, 1);

    let invitation = InvitationDao::new(&app.db)
        .find_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Accepted);

    // Redelivery of the same event is harmless
    let resp = app
        .post_webhook(&json!({
            "type": "user.created",
            "data": {
                "id": "user_jane_hook",
                "first_name": "Jane",
                "last_name": "Doe",
                "primary_email_address_id": "em_1",
                "email_addresses": [{ "id": "em_1", "email_address": "jane@example.com" }],
                "public_metadata": {
                    "role": "mechanic",
                    "shop_id": shop_id,
                    "invitation_token": token,
                },
            }
        }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let members = ShopDao::new(&app.db)
        .members
        .count(doc! {
            "shop_id": ObjectId::parse_str(&shop_id).unwrap(),
            "user_id": jane.id.unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(members, 1, "Webhook redelivery must not duplicate membership");
}

#[tokio::test]
async fn user_deleted_soft_deletes_local_record() {
    let app = TestApp::spawn().await;
    app.seed_user("user_gone", "gone@example.com", "Go", "Ne", None)
        .await;

    let resp = app
        .post_webhook(&json!({
            "type": "user.deleted",
            "data": { "id": "user_gone" }
        }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    // The record remains but carries the deletion flag
    let raw = app
        .db
        .collection::<User>(User::COLLECTION)
        .find_one(doc! { "clerk_user_id": "user_gone" })
        .await
        .unwrap()
        .expect("Soft-deleted user should still exist");
    assert!(raw.deleted_at.is_some());

    // And the live lookup no longer sees it
    assert!(UserDao::new(&app.db).find_by_clerk_id("user_gone").await.is_err());
}

#[tokio::test]
async fn invitation_accepted_event_reconciles_by_provider_id() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("evt").await;

    // The account exists before the invitation is issued, so the
    // user.created delivery has nothing to reconcile; only the later
    // invitation-accepted event can complete the join.
    let jane = app
        .seed_user("user_jane_evt", "jane@example.com", "Jane", "Doe", None)
        .await;

    let token = app
        .seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    let invitation = InvitationDao::new(&app.db)
        .find_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    let clerk_invitation_id = invitation.clerk_invitation_id.clone().unwrap();

    let resp = app
        .post_webhook(&json!({
            "type": "invitation.accepted",
            "data": {
                "id": clerk_invitation_id,
                "email_address": "jane@example.com",
            }
        }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);

    let invitation = InvitationDao::new(&app.db)
        .find_by_token(&token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(invitation.status, InvitationStatus::Accepted);

    let members = ShopDao::new(&app.db)
        .members
        .count(doc! {
            "shop_id": ObjectId::parse_str(&shop_id).unwrap(),
            "user_id": ObjectId::parse_str(&jane.user_id).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(members, 1);
}

#[tokio::test]
async fn unknown_event_types_are_acknowledged() {
    let app = TestApp::spawn().await;

    let resp = app
        .post_webhook(&json!({
            "type": "email.created",
            "data": { "id": "em_whatever" }
        }))
        .await;
    assert_eq!(resp.status().as_u16(), 200);
}
