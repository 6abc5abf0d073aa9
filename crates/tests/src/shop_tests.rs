use serde_json::{Value, json};
use wrenchly_db::models::UserRole;
use wrenchly_services::dao::shop::ShopDao;
use wrenchly_services::dao::user::UserDao;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn create_shop_retrievable_by_slug_and_promotes_owner() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("slugfresh").await;

    // Retrievable immediately after creation
    let shop = ShopDao::new(&app.db)
        .find_by_slug("slugfresh-auto")
        .await
        .unwrap();
    assert_eq!(shop.id.unwrap().to_hex(), shop_id);
    assert_eq!(shop.name, "slugfresh Auto Repair");

    // Setup flow made the creator a shop owner
    let user = UserDao::new(&app.db)
        .find_by_clerk_id(&owner.clerk_user_id)
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::ShopOwner);

    // And the portal shop route now works for them
    let resp = app
        .auth_get(&format!("/api/portal/shops/{shop_id}"), &owner.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn duplicate_slug_conflicts() {
    let app = TestApp::spawn().await;
    let (_, _) = app.seed_shop_owner("slugdup").await;

    let other = app
        .seed_user("user_slugdup_2", "slugdup2@example.com", "Sec", "Ond", None)
        .await;

    let resp = app
        .auth_post("/api/shops", &other.access_token)
        .json(&json!({
            "name": "Another Garage",
            "slug": "slugdup-auto",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);
}

#[tokio::test]
async fn slug_is_immutable_on_profile_update() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("slugfix").await;

    let resp = app
        .auth_put(&format!("/api/portal/shops/{shop_id}"), &owner.access_token)
        .json(&json!({
            "name": "Renamed Garage",
            "phone": "555-0199",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], json!("Renamed Garage"));
    assert_eq!(body["slug"], json!("slugfix-auto"));
}

#[tokio::test]
async fn invalid_slug_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app
        .seed_user("user_badslug", "badslug@example.com", "Bad", "Slug", None)
        .await;

    for slug in ["Bad Slug", "UPPER", "x", "-leading", "trailing-"] {
        let resp = app
            .auth_post("/api/shops", &user.access_token)
            .json(&json!({ "name": "Shop", "slug": slug }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400, "Slug {slug:?} should be rejected");
    }
}

#[tokio::test]
async fn dashboard_counts_reflect_seeded_data() {
    let app = TestApp::spawn().await;
    let (owner, shop_id) = app.seed_shop_owner("dash").await;
    app.seed_invitation(&owner.access_token, &shop_id, "jane@example.com")
        .await;

    let resp = app
        .auth_post(
            &format!("/api/portal/shops/{shop_id}/jobs"),
            &owner.access_token,
        )
        .json(&json!({
            "customer_name": "Casey Customer",
            "vehicle": "2014 Subaru Outback",
            "description": "Brakes grinding",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let resp = app
        .auth_get(
            &format!("/api/portal/shops/{shop_id}/dashboard"),
            &owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["team_size"], json!(1));
    assert_eq!(body["pending_invitations"], json!(1));
    assert_eq!(body["open_jobs"], json!(1));
    assert_eq!(body["upcoming_appointments"], json!(0));
}
